use anyhow::Context;
use clap::ArgMatches;
use colored::Colorize;
use phishcrawl_core::config::{ConfigFile, ConfigOverrides, RunConfig};
use phishcrawl_core::crawl::{
    CrawlOptions, CrawlProgressCallback, execute_crawl, generate_crawl_report,
};
use phishcrawl_core::output::RecordWriter;
use phishcrawl_core::seeds::load_seeds;
use phishcrawl_scanner::CancellationToken;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, warn};

/// Expand a leading `~` in a user-supplied path
pub fn resolve_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Logs go to stderr so stdout stays clean for JSON Lines output
pub fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .try_init();
}

/// Collect the command-line values that take precedence over the config file
pub fn build_overrides(args: &ArgMatches) -> ConfigOverrides {
    let strings = |id: &str| -> Vec<String> {
        args.get_many::<String>(id)
            .map(|values| values.cloned().collect())
            .unwrap_or_default()
    };

    ConfigOverrides {
        depths: strings("depth"),
        excluded_extensions: strings("exclude-ext"),
        skipped_labels: strings("skip-label"),
        workers: args.get_one::<usize>("threads").copied(),
        timeout_secs: args.get_one::<u64>("timeout").copied(),
        include_text: args.get_flag("include-text"),
    }
}

/// Load the optional config file and merge the command-line overrides into it
pub fn load_run_config(args: &ArgMatches) -> anyhow::Result<RunConfig> {
    let file = match args.get_one::<String>("config") {
        Some(path) => Some(ConfigFile::load(&resolve_path(path))?),
        None => None,
    };
    Ok(RunConfig::resolve(file, &build_overrides(args))?)
}

/// Cancel `cancel` on Ctrl-C, and after `deadline` when one is given
pub fn install_cancellation(cancel: &CancellationToken, deadline: Option<Duration>) {
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing in-flight pages");
            on_interrupt.cancel();
        }
    });

    if let Some(deadline) = deadline {
        let on_deadline = cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(deadline) => {
                    warn!("Deadline of {}s reached, stopping crawl", deadline.as_secs());
                    on_deadline.cancel();
                }
                _ = on_deadline.cancelled() => {}
            }
        });
    }
}

pub async fn handle_crawl(sub_matches: &ArgMatches, quiet: bool) -> anyhow::Result<()> {
    // Everything is validated before the first request goes out
    let seeds_arg = sub_matches
        .get_one::<String>("seeds")
        .context("--seeds is required")?;
    let seeds = load_seeds(&resolve_path(seeds_arg))?;
    let config = load_run_config(sub_matches)?;

    let output = sub_matches.get_one::<String>("output").map(|p| resolve_path(p));
    let writer = RecordWriter::create(output.as_deref())
        .with_context(|| format!("cannot open output {}", writer_name(output.as_ref())))?;

    let cancel = CancellationToken::new();
    let deadline = sub_matches
        .get_one::<u64>("deadline")
        .map(|secs| Duration::from_secs(*secs));
    install_cancellation(&cancel, deadline);

    if !quiet {
        eprintln!("\n🕷️  Crawling {} seed(s)", seeds.len());
        eprintln!("Workers: {}", config.workers);
        eprintln!("Timeout: {}s", config.timeout_secs);
        for (label, depth) in config.depth_policy.as_map() {
            let note = if config.scope.skips(label) {
                " (skipped)".yellow().to_string()
            } else {
                String::new()
            };
            eprintln!("Max depth {}: {}{}", label, depth, note);
        }
        eprintln!("Output: {}\n", writer.destination());
    }

    let options = CrawlOptions {
        seeds,
        config: config.clone(),
        writer,
        show_progress_bars: !quiet && !sub_matches.get_flag("no-progress"),
        cancel,
    };

    let progress_callback: CrawlProgressCallback = Arc::new(move |msg: String| {
        if !quiet {
            eprintln!("{}", msg);
        }
    });

    let summary = execute_crawl(options, Some(progress_callback))
        .await
        .context("crawl failed")?;

    if summary.stats.cancelled {
        eprintln!("\n{} Crawl stopped early\n", "!".yellow().bold());
    } else {
        eprintln!("\n{} Crawl complete!\n", "✓".green().bold());
    }
    eprint!("{}", generate_crawl_report(&summary, &config));

    Ok(())
}

fn writer_name(path: Option<&PathBuf>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "stdout".to_string())
}
