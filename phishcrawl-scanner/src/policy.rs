use crate::task::Label;
use std::collections::{BTreeMap, BTreeSet};

/// Default non-document extensions that are never followed
pub const DEFAULT_EXCLUDED_EXTENSIONS: [&str; 4] = [".jpg", ".png", ".pdf", ".zip"];

/// Maximum crawl depth per label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthPolicy {
    malware: usize,
    phishing: usize,
    benign: usize,
}

impl DepthPolicy {
    pub fn new(malware: usize, phishing: usize, benign: usize) -> Self {
        Self {
            malware,
            phishing,
            benign,
        }
    }

    pub fn max_depth(&self, label: Label) -> usize {
        match label {
            Label::Malware => self.malware,
            Label::Phishing => self.phishing,
            Label::Benign => self.benign,
        }
    }

    pub fn set_max_depth(&mut self, label: Label, depth: usize) {
        match label {
            Label::Malware => self.malware = depth,
            Label::Phishing => self.phishing = depth,
            Label::Benign => self.benign = depth,
        }
    }

    pub fn allows(&self, label: Label, depth: usize) -> bool {
        depth <= self.max_depth(label)
    }

    pub fn as_map(&self) -> BTreeMap<Label, usize> {
        Label::ALL
            .iter()
            .map(|label| (*label, self.max_depth(*label)))
            .collect()
    }
}

impl Default for DepthPolicy {
    fn default() -> Self {
        Self::new(3, 2, 1)
    }
}

/// Which discovered links stay in scope, and which seeds are crawled at all
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopePolicy {
    excluded_extensions: Vec<String>,
    skipped_labels: BTreeSet<Label>,
}

impl ScopePolicy {
    pub fn new<I, S>(excluded_extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let excluded_extensions = excluded_extensions
            .into_iter()
            .filter_map(|ext| normalize_extension(ext.as_ref()))
            .collect();

        Self {
            excluded_extensions,
            skipped_labels: BTreeSet::new(),
        }
    }

    pub fn with_skipped_label(mut self, label: Label) -> Self {
        self.skipped_labels.insert(label);
        self
    }

    pub fn excluded_extensions(&self) -> &[String] {
        &self.excluded_extensions
    }

    pub fn is_excluded_path(&self, path: &str) -> bool {
        let path = path.to_ascii_lowercase();
        self.excluded_extensions
            .iter()
            .any(|ext| path.ends_with(ext.as_str()))
    }

    pub fn skips(&self, label: Label) -> bool {
        self.skipped_labels.contains(&label)
    }
}

impl Default for ScopePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDED_EXTENSIONS)
    }
}

/// Lowercase and ensure a leading dot, so "PDF" and ".pdf" match the same paths
fn normalize_extension(ext: &str) -> Option<String> {
    let ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
    if ext.is_empty() {
        None
    } else {
        Some(format!(".{}", ext))
    }
}
