// Tests for run configuration resolution

use phishcrawl_core::CoreError;
use phishcrawl_core::config::{
    ConfigFile, ConfigOverrides, DEFAULT_WORKERS, RunConfig, parse_depth_setting,
};
use phishcrawl_scanner::Label;
use std::io::Write;
use tempfile::NamedTempFile;

// ============================================================================
// Defaults
// ============================================================================

#[test]
fn test_defaults_match_label_policy() {
    let config = RunConfig::resolve(None, &ConfigOverrides::default()).unwrap();

    assert_eq!(config.depth_policy.max_depth(Label::Malware), 3);
    assert_eq!(config.depth_policy.max_depth(Label::Phishing), 2);
    assert_eq!(config.depth_policy.max_depth(Label::Benign), 1);
    assert_eq!(
        config.scope.excluded_extensions(),
        &[".jpg", ".png", ".pdf", ".zip"]
    );
    assert_eq!(config.workers, DEFAULT_WORKERS);
    assert!(!config.include_text);
    assert!(!config.scope.skips(Label::Malware));
}

// ============================================================================
// Depth Settings
// ============================================================================

#[test]
fn test_parse_depth_setting() {
    assert_eq!(parse_depth_setting("malware=4").unwrap(), (Label::Malware, 4));
    assert_eq!(parse_depth_setting(" Benign = 0").unwrap(), (Label::Benign, 0));
}

#[test]
fn test_parse_depth_setting_rejects_bad_input() {
    assert!(matches!(
        parse_depth_setting("malware"),
        Err(CoreError::InvalidDepth(_))
    ));
    assert!(matches!(
        parse_depth_setting("malware=deep"),
        Err(CoreError::InvalidDepth(_))
    ));
    assert!(matches!(
        parse_depth_setting("malware=-1"),
        Err(CoreError::InvalidDepth(_))
    ));
    assert!(matches!(
        parse_depth_setting("malware=99"),
        Err(CoreError::InvalidDepth(_))
    ));
    assert!(matches!(
        parse_depth_setting("spam=2"),
        Err(CoreError::UnknownLabel { .. })
    ));
}

#[test]
fn test_overrides_win_over_file() {
    let file = ConfigFile {
        depth_policy: [("malware".to_string(), 5), ("benign".to_string(), 2)]
            .into_iter()
            .collect(),
        workers: Some(3),
        ..ConfigFile::default()
    };
    let overrides = ConfigOverrides {
        depths: vec!["malware=1".to_string()],
        workers: Some(8),
        ..ConfigOverrides::default()
    };

    let config = RunConfig::resolve(Some(file), &overrides).unwrap();
    assert_eq!(config.depth_policy.max_depth(Label::Malware), 1);
    assert_eq!(config.depth_policy.max_depth(Label::Benign), 2);
    assert_eq!(config.depth_policy.max_depth(Label::Phishing), 2);
    assert_eq!(config.workers, 8);
}

#[test]
fn test_unknown_label_in_file_is_fatal() {
    let file = ConfigFile {
        depth_policy: [("spam".to_string(), 1)].into_iter().collect(),
        ..ConfigFile::default()
    };
    let err = RunConfig::resolve(Some(file), &ConfigOverrides::default()).unwrap_err();
    assert!(matches!(err, CoreError::UnknownLabel { .. }));
    assert!(err.is_config_error());
}

// ============================================================================
// Scope Settings
// ============================================================================

#[test]
fn test_extension_override_replaces_defaults() {
    let overrides = ConfigOverrides {
        excluded_extensions: vec!["exe".to_string(), ".GIF".to_string()],
        ..ConfigOverrides::default()
    };
    let config = RunConfig::resolve(None, &overrides).unwrap();

    assert_eq!(config.scope.excluded_extensions(), &[".exe", ".gif"]);
    assert!(!config.scope.is_excluded_path("/report.pdf"));
}

#[test]
fn test_skipped_labels() {
    let overrides = ConfigOverrides {
        skipped_labels: vec!["Malware".to_string()],
        ..ConfigOverrides::default()
    };
    let config = RunConfig::resolve(None, &overrides).unwrap();
    assert!(config.scope.skips(Label::Malware));
    assert!(!config.scope.skips(Label::Phishing));
}

#[test]
fn test_zero_workers_is_invalid() {
    let overrides = ConfigOverrides {
        workers: Some(0),
        ..ConfigOverrides::default()
    };
    let err = RunConfig::resolve(None, &overrides).unwrap_err();
    assert!(matches!(err, CoreError::InvalidConfig(_)));
}

// ============================================================================
// Config File Loading
// ============================================================================

#[test]
fn test_load_config_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut temp_file = NamedTempFile::new()?;
    write!(
        temp_file,
        r#"{{
            "depth_policy": {{"phishing": 4}},
            "excluded_extensions": [".mp4"],
            "skipped_labels": ["malware"],
            "timeout_secs": 20,
            "user_agent": "dataset-bot/1.0",
            "include_text": true
        }}"#
    )?;

    let file = ConfigFile::load(temp_file.path())?;
    let config = RunConfig::resolve(Some(file), &ConfigOverrides::default())?;

    assert_eq!(config.depth_policy.max_depth(Label::Phishing), 4);
    assert!(config.scope.is_excluded_path("/clip.MP4"));
    assert!(!config.scope.is_excluded_path("/logo.png"));
    assert!(config.scope.skips(Label::Malware));
    assert_eq!(config.timeout_secs, 20);
    assert_eq!(config.user_agent, "dataset-bot/1.0");
    assert!(config.include_text);

    Ok(())
}

#[test]
fn test_config_file_rejects_unknown_fields() {
    let mut temp_file = NamedTempFile::new().unwrap();
    write!(temp_file, r#"{{"max_depth": 3}}"#).unwrap();

    let err = ConfigFile::load(temp_file.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigFile { .. }));
}
