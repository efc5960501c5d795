// Run configuration: optional JSON config file, then command-line overrides,
// validated into a `RunConfig` before anything is fetched.

use crate::error::{CoreError, Result};
use phishcrawl_scanner::crawler::DEFAULT_USER_AGENT;
use phishcrawl_scanner::{DepthPolicy, Label, ScopePolicy};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const DEFAULT_WORKERS: usize = 10;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Depth ceilings above this are treated as configuration mistakes
pub const MAX_DEPTH: usize = 10;

/// On-disk configuration, every field optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub depth_policy: BTreeMap<String, usize>,
    pub excluded_extensions: Option<Vec<String>>,
    pub skipped_labels: Vec<String>,
    pub workers: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    pub include_text: Option<bool>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| CoreError::ConfigFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| CoreError::ConfigFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// Values given on the command line; these win over the config file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// `LABEL=DEPTH` pairs
    pub depths: Vec<String>,
    /// Replaces the configured extension list when non-empty
    pub excluded_extensions: Vec<String>,
    pub skipped_labels: Vec<String>,
    pub workers: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub include_text: bool,
}

/// Fully validated settings for one crawl run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub depth_policy: DepthPolicy,
    pub scope: ScopePolicy,
    pub workers: usize,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub include_text: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            depth_policy: DepthPolicy::default(),
            scope: ScopePolicy::default(),
            workers: DEFAULT_WORKERS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            include_text: false,
        }
    }
}

impl RunConfig {
    pub fn resolve(file: Option<ConfigFile>, overrides: &ConfigOverrides) -> Result<Self> {
        let file = file.unwrap_or_default();
        let mut config = RunConfig::default();

        for (label, depth) in &file.depth_policy {
            let label = parse_label(label, "depth_policy")?;
            config
                .depth_policy
                .set_max_depth(label, check_depth(*depth, label)?);
        }
        for setting in &overrides.depths {
            let (label, depth) = parse_depth_setting(setting)?;
            config.depth_policy.set_max_depth(label, depth);
        }

        let extensions = if !overrides.excluded_extensions.is_empty() {
            Some(overrides.excluded_extensions.clone())
        } else {
            file.excluded_extensions.clone()
        };
        let mut scope = match extensions {
            Some(extensions) => ScopePolicy::new(extensions),
            None => ScopePolicy::default(),
        };
        for label in file.skipped_labels.iter().chain(&overrides.skipped_labels) {
            scope = scope.with_skipped_label(parse_label(label, "skipped labels")?);
        }
        config.scope = scope;

        config.workers = overrides.workers.or(file.workers).unwrap_or(DEFAULT_WORKERS);
        if config.workers == 0 {
            return Err(CoreError::InvalidConfig(
                "worker count must be at least 1".to_string(),
            ));
        }

        config.timeout_secs = overrides
            .timeout_secs
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if config.timeout_secs == 0 {
            return Err(CoreError::InvalidConfig(
                "timeout must be at least 1 second".to_string(),
            ));
        }

        if let Some(user_agent) = file.user_agent {
            if user_agent.trim().is_empty() {
                return Err(CoreError::InvalidConfig(
                    "user agent must not be empty".to_string(),
                ));
            }
            config.user_agent = user_agent;
        }

        config.include_text = overrides.include_text || file.include_text.unwrap_or(false);
        Ok(config)
    }
}

/// Parse a `LABEL=DEPTH` setting such as `malware=3`
pub fn parse_depth_setting(setting: &str) -> Result<(Label, usize)> {
    let (label, depth) = setting
        .split_once('=')
        .ok_or_else(|| CoreError::InvalidDepth(format!("{} (expected LABEL=DEPTH)", setting)))?;

    let label = parse_label(label, "depth setting")?;
    let depth: usize = depth
        .trim()
        .parse()
        .map_err(|_| CoreError::InvalidDepth(format!("{} (depth must be a number)", setting)))?;

    Ok((label, check_depth(depth, label)?))
}

fn parse_label(label: &str, context: &str) -> Result<Label> {
    label.parse().map_err(|_| CoreError::UnknownLabel {
        label: label.to_string(),
        context: context.to_string(),
    })
}

fn check_depth(depth: usize, label: Label) -> Result<usize> {
    if depth > MAX_DEPTH {
        return Err(CoreError::InvalidDepth(format!(
            "{}={} (maximum is {})",
            label, depth, MAX_DEPTH
        )));
    }
    Ok(depth)
}
