use clap::ArgMatches;
use phishcrawl::handlers::*;
use phishcrawl::command_argument_builder;
use phishcrawl_scanner::{FeatureRecord, Label};
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn crawl_matches(args: &[&str]) -> ArgMatches {
    let mut argv = vec!["phishcrawl", "crawl"];
    argv.extend_from_slice(args);
    let matches = command_argument_builder()
        .try_get_matches_from(argv)
        .expect("arguments should parse");
    let (name, sub) = matches.subcommand().expect("crawl subcommand");
    assert_eq!(name, "crawl");
    sub.clone()
}

// ============================================================================
// Command-line Parsing Tests
// ============================================================================

#[test]
fn test_crawl_requires_seeds() {
    let result = command_argument_builder().try_get_matches_from(["phishcrawl", "crawl"]);
    assert!(result.is_err());
}

#[test]
fn test_subcommand_is_required() {
    let result = command_argument_builder().try_get_matches_from(["phishcrawl"]);
    assert!(result.is_err());
}

#[test]
fn test_skip_label_rejects_unknown_label() {
    let result = command_argument_builder().try_get_matches_from([
        "phishcrawl",
        "crawl",
        "--seeds",
        "seeds.csv",
        "--skip-label",
        "spam",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_global_flags_after_subcommand() {
    let matches = command_argument_builder()
        .try_get_matches_from(["phishcrawl", "crawl", "-s", "seeds.csv", "-q", "-v"])
        .unwrap();
    assert!(matches.get_flag("quiet"));
    assert!(matches.get_flag("verbose"));
}

#[test]
fn test_build_overrides_defaults() {
    let sub = crawl_matches(&["--seeds", "seeds.csv"]);
    let overrides = build_overrides(&sub);

    assert!(overrides.depths.is_empty());
    assert!(overrides.excluded_extensions.is_empty());
    assert!(overrides.skipped_labels.is_empty());
    assert_eq!(overrides.workers, None);
    assert_eq!(overrides.timeout_secs, None);
    assert!(!overrides.include_text);
}

#[test]
fn test_build_overrides_collects_repeated_flags() {
    let sub = crawl_matches(&[
        "--seeds",
        "seeds.csv",
        "-d",
        "malware=4",
        "--depth",
        "benign=0",
        "--exclude-ext",
        "pdf",
        "--exclude-ext",
        ".zip",
        "--skip-label",
        "malware",
        "-t",
        "3",
        "--timeout",
        "5",
        "--include-text",
    ]);
    let overrides = build_overrides(&sub);

    assert_eq!(overrides.depths, vec!["malware=4", "benign=0"]);
    assert_eq!(overrides.excluded_extensions, vec!["pdf", ".zip"]);
    assert_eq!(overrides.skipped_labels, vec!["malware"]);
    assert_eq!(overrides.workers, Some(3));
    assert_eq!(overrides.timeout_secs, Some(5));
    assert!(overrides.include_text);
}

#[test]
fn test_threads_must_be_numeric() {
    let result = command_argument_builder().try_get_matches_from([
        "phishcrawl",
        "crawl",
        "--seeds",
        "seeds.csv",
        "--threads",
        "many",
    ]);
    assert!(result.is_err());
}

// ============================================================================
// Configuration Tests
// ============================================================================

#[test]
fn test_load_run_config_applies_overrides() {
    let sub = crawl_matches(&["--seeds", "seeds.csv", "-d", "phishing=5", "-t", "2"]);
    let config = load_run_config(&sub).unwrap();

    assert_eq!(config.depth_policy.max_depth(Label::Phishing), 5);
    assert_eq!(config.depth_policy.max_depth(Label::Malware), 3);
    assert_eq!(config.workers, 2);
}

#[test]
fn test_load_run_config_flags_win_over_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut config_file = NamedTempFile::new()?;
    write!(
        config_file,
        r#"{{"depth_policy": {{"benign": 2}}, "workers": 4, "include_text": true}}"#
    )?;
    let config_path = config_file.path().display().to_string();

    let sub = crawl_matches(&["--seeds", "seeds.csv", "-c", &config_path, "-t", "8"]);
    let config = load_run_config(&sub)?;

    assert_eq!(config.depth_policy.max_depth(Label::Benign), 2);
    assert_eq!(config.workers, 8);
    assert!(config.include_text);
    Ok(())
}

#[test]
fn test_load_run_config_rejects_bad_depth() {
    let sub = crawl_matches(&["--seeds", "seeds.csv", "-d", "unknown=2"]);
    assert!(load_run_config(&sub).is_err());

    let sub = crawl_matches(&["--seeds", "seeds.csv", "-d", "malware"]);
    assert!(load_run_config(&sub).is_err());
}

#[test]
fn test_load_run_config_missing_file() {
    let sub = crawl_matches(&["--seeds", "seeds.csv", "-c", "/nonexistent/phishcrawl.json"]);
    assert!(load_run_config(&sub).is_err());
}

#[test]
fn test_resolve_path_plain() {
    assert_eq!(resolve_path("seeds.csv"), PathBuf::from("seeds.csv"));
    assert_eq!(resolve_path("/tmp/out.jsonl"), PathBuf::from("/tmp/out.jsonl"));
}

#[test]
fn test_resolve_path_expands_tilde() {
    let resolved = resolve_path("~/seeds.csv");
    assert!(!resolved.to_string_lossy().starts_with('~'));
    assert!(resolved.ends_with("seeds.csv"));
}

// ============================================================================
// Crawl Handler Tests
// ============================================================================

#[tokio::test]
async fn test_handle_crawl_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(
                    r#"<html><head><title>Sign in</title></head>
                    <body><a href="/verify">verify</a></body></html>"#,
                ),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/verify"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string("<html><body><p>Enter your password</p></body></html>"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut seeds = NamedTempFile::new()?;
    writeln!(seeds, "url,type")?;
    writeln!(seeds, "{}/,phishing", mock_server.uri())?;
    let output = NamedTempFile::new()?;

    let seeds_path = seeds.path().display().to_string();
    let output_path = output.path().display().to_string();
    let sub = crawl_matches(&[
        "--seeds",
        &seeds_path,
        "--output",
        &output_path,
        "--threads",
        "2",
        "--include-text",
        "--no-progress",
    ]);

    handle_crawl(&sub, true).await?;

    let records: Vec<FeatureRecord> = std::fs::read_to_string(output.path())?
        .lines()
        .map(serde_json::from_str)
        .collect::<Result<_, _>>()?;
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.label == Label::Phishing));
    assert!(records.iter().any(|r| r.depth == 1 && r.url.ends_with("/verify")));
    assert!(records.iter().all(|r| r.text.is_some()));
    Ok(())
}

#[tokio::test]
async fn test_handle_crawl_missing_seed_file() {
    let sub = crawl_matches(&["--seeds", "/nonexistent/seeds.csv", "--no-progress"]);
    assert!(handle_crawl(&sub, true).await.is_err());
}

#[tokio::test]
async fn test_handle_crawl_bad_label_fails_before_fetching()
-> Result<(), Box<dyn std::error::Error>> {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut seeds = NamedTempFile::new()?;
    writeln!(seeds, "url,type")?;
    writeln!(seeds, "{}/,benign", mock_server.uri())?;
    writeln!(seeds, "{}/other,defacement", mock_server.uri())?;
    let seeds_path = seeds.path().display().to_string();

    let sub = crawl_matches(&["--seeds", &seeds_path, "--no-progress"]);
    assert!(handle_crawl(&sub, true).await.is_err());
    Ok(())
}
