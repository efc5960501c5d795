use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Classification label carried by a seed and every page crawled from it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Benign,
    Phishing,
    Malware,
}

impl Label {
    pub const ALL: [Label; 3] = [Label::Benign, Label::Phishing, Label::Malware];

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Benign => "benign",
            Label::Phishing => "phishing",
            Label::Malware => "malware",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a label string is not one of the known labels
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown label '{0}' (expected benign, phishing or malware)")]
pub struct UnknownLabel(pub String);

impl FromStr for Label {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "benign" => Ok(Label::Benign),
            "phishing" => Ok(Label::Phishing),
            "malware" => Ok(Label::Malware),
            _ => Err(UnknownLabel(s.to_string())),
        }
    }
}

/// A labeled starting URL supplied by the seed list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedEntry {
    pub url: String,
    pub label: Label,
}

impl SeedEntry {
    pub fn new(url: impl Into<String>, label: Label) -> Self {
        Self {
            url: url.into(),
            label,
        }
    }
}

/// A unit of work handed out by the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    pub url: String,
    pub label: Label,
    pub depth: usize,
}

impl CrawlTask {
    pub fn seed(entry: &SeedEntry) -> Self {
        Self {
            url: entry.url.clone(),
            label: entry.label,
            depth: 0,
        }
    }

    /// Task for a link discovered on this task's page
    pub fn child(&self, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            label: self.label,
            depth: self.depth + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_parse_is_case_insensitive() {
        assert_eq!(" Malware ".parse::<Label>(), Ok(Label::Malware));
        assert_eq!("PHISHING".parse::<Label>(), Ok(Label::Phishing));
        assert_eq!("benign".parse::<Label>(), Ok(Label::Benign));
    }

    #[test]
    fn test_label_parse_rejects_unknown() {
        let err = "defacement".parse::<Label>().unwrap_err();
        assert_eq!(err, UnknownLabel("defacement".to_string()));
        assert_eq!(
            err.to_string(),
            "unknown label 'defacement' (expected benign, phishing or malware)"
        );
        let as_error: &dyn std::error::Error = &err;
        assert!(as_error.source().is_none());
    }

    #[test]
    fn test_label_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Label::Phishing).unwrap(), "\"phishing\"");
    }

    #[test]
    fn test_child_task_inherits_label_and_increments_depth() {
        let seed = CrawlTask::seed(&SeedEntry::new("http://a.com", Label::Malware));
        let child = seed.child("http://a.com/x");
        assert_eq!(child.depth, 1);
        assert_eq!(child.label, Label::Malware);
        assert_eq!(child.child("http://a.com/y").depth, 2);
    }
}
