use crate::config::RunConfig;
use crate::error::{CoreError, Result};
use crate::output::RecordWriter;
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use phishcrawl_scanner::{CancellationToken, CrawlStats, Crawler, FeatureRecord, SeedEntry};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;
use tracing::error;

/// Records buffered between the crawl workers and the writer
const SINK_CAPACITY: usize = 256;

/// Options for configuring a crawl operation
pub struct CrawlOptions {
    pub seeds: Vec<SeedEntry>,
    pub config: RunConfig,
    pub writer: RecordWriter,
    pub show_progress_bars: bool,
    pub cancel: CancellationToken,
}

/// Callback for reporting crawl progress
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Outcome of a finished (or cancelled) crawl run
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    pub stats: CrawlStats,
    pub records_written: usize,
    pub destination: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Execute a crawl with the given options, streaming records to the writer
pub async fn execute_crawl(
    options: CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<CrawlSummary> {
    let CrawlOptions {
        seeds,
        config,
        writer,
        show_progress_bars,
        cancel,
    } = options;

    let started_at = Utc::now();
    let destination = writer.destination().to_string();

    // Set up single progress bar for overall crawl progress (only if enabled)
    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message("Starting crawl...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let processed_count = Arc::new(AtomicUsize::new(0));

    let internal_progress_callback: phishcrawl_scanner::ProgressCallback = {
        let pb_clone = progress_bar.clone();
        let count_clone = processed_count.clone();
        Arc::new(move |_worker_id: usize, _url: String| {
            let count = count_clone.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(ref pb) = pb_clone {
                pb.set_message(format!("Crawling... {} URLs processed", count));
                pb.tick();
            }
        })
    };

    if let Some(ref callback) = progress_callback {
        callback(format!(
            "Crawling {} seed(s) with {} workers",
            seeds.len(),
            config.workers
        ));
    }

    let crawler = Crawler::with_timeout(config.timeout_secs)
        .with_depth_policy(config.depth_policy.clone())
        .with_scope(config.scope.clone())
        .with_include_text(config.include_text)
        .with_user_agent(config.user_agent.clone())
        .with_progress_callback(internal_progress_callback)
        .with_cancellation(cancel);

    let (tx, rx) = mpsc::channel::<FeatureRecord>(SINK_CAPACITY);
    // File and stdout writes block, so the drain runs on the blocking pool
    let writer_handle = tokio::task::spawn_blocking(move || drain_records(rx, writer));

    let crawl_result = crawler.crawl(&seeds, config.workers, tx).await;

    // A failed writer explains a closed sink, so it is reported first
    let records_written = writer_handle
        .await
        .map_err(|e| CoreError::ScanError(e.into()))??;
    let stats = crawl_result?;

    if let Some(ref pb) = progress_bar {
        let total = processed_count.load(Ordering::Relaxed);
        pb.finish_with_message(format!("Crawl complete! {} URLs processed", total));
    }

    Ok(CrawlSummary {
        stats,
        records_written,
        destination,
        started_at,
        finished_at: Utc::now(),
    })
}

fn drain_records(mut rx: mpsc::Receiver<FeatureRecord>, mut writer: RecordWriter) -> Result<usize> {
    while let Some(record) = rx.blocking_recv() {
        if let Err(e) = writer.write(&record) {
            error!("Failed to write record for {}: {}", record.url, e);
            return Err(e);
        }
    }
    writer.finish()
}

/// Generate a run summary report
pub fn generate_crawl_report(summary: &CrawlSummary, config: &RunConfig) -> String {
    let stats = &summary.stats;
    let elapsed = summary.finished_at - summary.started_at;

    let mut report = String::new();
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str("# Summary:\n");
    report.push_str(&format!(
        "  Seeds: {} ({} skipped)\n",
        stats.seeds, stats.skipped_seeds
    ));
    report.push_str(&format!("  Pages crawled: {}\n", stats.pages_emitted));
    report.push_str(&format!("  Fetch failures: {}\n", stats.fetch_failures));
    report.push_str(&format!("  URLs admitted: {}\n", stats.urls_admitted));
    report.push_str(&format!("  Links not queued: {}\n", stats.tasks_rejected));
    report.push_str(&format!(
        "  Pages with obfuscated JS: {}\n",
        stats.obfuscated_pages
    ));
    report.push_str(&format!(
        "  Suspicious links: {}\n",
        stats.suspicious_links
    ));
    report.push_str(&format!(
        "  Records written: {} -> {}\n",
        summary.records_written, summary.destination
    ));
    report.push_str(&format!(
        "  Duration: {:.1}s\n",
        elapsed.num_milliseconds() as f64 / 1000.0
    ));
    if stats.cancelled {
        report.push_str("  Run was cancelled before the frontier was exhausted\n");
    }

    report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str("## Pages by label\n");
    for (label, max_depth) in config.depth_policy.as_map() {
        let pages = stats.pages_by_label.get(&label).copied().unwrap_or(0);
        let note = if config.scope.skips(label) {
            " (skipped)"
        } else {
            ""
        };
        report.push_str(&format!(
            "  {:<9} {:>6} pages  max depth {}{}\n",
            label.as_str(),
            pages,
            max_depth,
            note
        ));
    }

    report
}
