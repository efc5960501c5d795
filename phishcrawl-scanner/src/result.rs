use crate::task::Label;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One dataset row, produced for every page that was fetched successfully
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub url: String,
    pub label: Label,
    pub depth: usize,
    pub structural_counts: StructuralCounts,
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub metadata: BTreeMap<String, String>,
    pub javascript: JavaScript,
    pub suspicious_links: Vec<String>,
    pub has_obfuscated_js: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralCounts {
    pub num_scripts: usize,
    pub num_iframes: usize,
    pub num_external_links: usize,
    pub num_special_chars: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JavaScript {
    pub inline: Vec<String>,
    pub external: Vec<String>,
}

/// Counters collected over a single crawl run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlStats {
    pub seeds: usize,
    pub skipped_seeds: usize,
    pub pages_emitted: usize,
    pub fetch_failures: usize,
    pub urls_admitted: usize,
    pub tasks_rejected: usize,
    pub obfuscated_pages: usize,
    pub suspicious_links: usize,
    pub pages_by_label: BTreeMap<Label, usize>,
    pub cancelled: bool,
}

impl CrawlStats {
    pub fn record_page(&mut self, record: &FeatureRecord) {
        self.pages_emitted += 1;
        self.suspicious_links += record.suspicious_links.len();
        if record.has_obfuscated_js {
            self.obfuscated_pages += 1;
        }
        *self.pages_by_label.entry(record.label).or_default() += 1;
    }

    /// Fold a worker's counters into the run total
    pub fn merge(&mut self, other: CrawlStats) {
        self.pages_emitted += other.pages_emitted;
        self.fetch_failures += other.fetch_failures;
        self.obfuscated_pages += other.obfuscated_pages;
        self.suspicious_links += other.suspicious_links;
        for (label, count) in other.pages_by_label {
            *self.pages_by_label.entry(label).or_default() += count;
        }
    }
}
