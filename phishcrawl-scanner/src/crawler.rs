use crate::error::{Result, ScanError};
use crate::extract::{anchor_targets, extract, visible_text};
use crate::frontier::{Frontier, normalize_url};
use crate::link::resolve_followable;
use crate::policy::{DepthPolicy, ScopePolicy};
use crate::result::{CrawlStats, FeatureRecord};
use crate::task::{CrawlTask, SeedEntry};
use reqwest::Client;
use scraper::Html;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

/// Records leave the crawler through this channel, in fetch-completion order
pub type RecordSink = mpsc::Sender<FeatureRecord>;

pub const DEFAULT_USER_AGENT: &str = "phishcrawl/0.1 (dataset crawler)";

pub const MAX_REDIRECTS: usize = 5;

/// Bodies larger than this are dropped as fetch failures
pub const DEFAULT_MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

pub struct Crawler {
    depth_policy: DepthPolicy,
    scope: Arc<ScopePolicy>,
    include_text: bool,
    progress_callback: Option<ProgressCallback>,
    cancel: CancellationToken,
    user_agent: String,
    timeout_secs: u64,
    max_body_bytes: usize,
}

/// What a fetched page yields: its record and the child URLs worth offering
struct PageOutcome {
    record: FeatureRecord,
    children: Vec<String>,
}

impl Crawler {
    pub fn new() -> Self {
        Self::with_timeout(10)
    }

    pub fn with_timeout(timeout_secs: u64) -> Self {
        Self {
            depth_policy: DepthPolicy::default(),
            scope: Arc::new(ScopePolicy::default()),
            include_text: false,
            progress_callback: None,
            cancel: CancellationToken::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_depth_policy(mut self, policy: DepthPolicy) -> Self {
        self.depth_policy = policy;
        self
    }

    pub fn with_scope(mut self, scope: ScopePolicy) -> Self {
        self.scope = Arc::new(scope);
        self
    }

    pub fn with_include_text(mut self, include_text: bool) -> Self {
        self.include_text = include_text;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Cancelling the token stops new fetches; fetches already started run to completion
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Redirects are followed only onto allowlisted hosts; any other target ends the fetch
    fn build_client(&self, allowlist: HashSet<String>) -> Result<Client> {
        let redirect_policy = reqwest::redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() > MAX_REDIRECTS {
                attempt.error("too many redirects")
            } else if attempt
                .url()
                .host_str()
                .is_some_and(|host| allowlist.contains(host))
            {
                attempt.follow()
            } else {
                attempt.stop()
            }
        });

        let client = Client::builder()
            .user_agent(self.user_agent.as_str())
            .timeout(Duration::from_secs(self.timeout_secs))
            .connect_timeout(Duration::from_secs((self.timeout_secs / 2).max(1)))
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(redirect_policy)
            .build()?;
        Ok(client)
    }

    /// Crawl every seed with `workers` concurrent fetchers, sending one record per
    /// successfully fetched page to `sink`.
    pub async fn crawl(
        &self,
        seeds: &[SeedEntry],
        workers: usize,
        sink: RecordSink,
    ) -> Result<CrawlStats> {
        let workers = workers.max(1);
        info!(
            "Starting crawl of {} seed(s) with {} workers",
            seeds.len(),
            workers
        );

        let mut stats = CrawlStats {
            seeds: seeds.len(),
            ..CrawlStats::default()
        };

        let mut frontier = Frontier::new(self.depth_policy.clone());
        let mut admitted_seeds = Vec::with_capacity(seeds.len());
        for seed in seeds {
            if self.scope.skips(seed.label) {
                warn!("Skipping {} seed {}", seed.label, seed.url);
                stats.skipped_seeds += 1;
                continue;
            }
            let host = frontier.register_seed_host(&seed.url)?;
            debug!("Allowing host {} for seed {}", host, seed.url);
            admitted_seeds.push(seed);
        }

        for seed in admitted_seeds {
            if !frontier.enqueue(CrawlTask::seed(seed)).await {
                debug!("Duplicate seed {} ignored", seed.url);
            }
        }

        let client = self.build_client(frontier.allowlist().clone())?;
        let frontier = Arc::new(frontier);
        let mut worker_handles = Vec::with_capacity(workers);

        for worker_id in 0..workers {
            let client = client.clone();
            let frontier = frontier.clone();
            let scope = self.scope.clone();
            let sink = sink.clone();
            let cancel = self.cancel.clone();
            let progress_cb = self.progress_callback.clone();
            let include_text = self.include_text;
            let max_body_bytes = self.max_body_bytes;

            let handle = tokio::spawn(async move {
                debug!("Worker {} started", worker_id);
                let mut local = CrawlStats::default();

                loop {
                    let task = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        task = frontier.next() => task,
                    };
                    let Some(task) = task else {
                        break;
                    };

                    if let Some(ref callback) = progress_cb {
                        callback(worker_id, task.url.clone());
                    }

                    let fetched = Self::fetch_page(&client, &task.url, max_body_bytes).await;
                    let outcome = match fetched {
                        Ok((final_url, body)) => {
                            if Self::claim_final_url(&frontier, &task, &final_url).await {
                                Some(Self::analyze_page(
                                    &body,
                                    &final_url,
                                    &task,
                                    &frontier,
                                    &scope,
                                    include_text,
                                ))
                            } else {
                                debug!("{} redirected to already visited {}", task.url, final_url);
                                None
                            }
                        }
                        Err(e) => {
                            warn!("Fetch failed for {}: {}", task.url, e);
                            local.fetch_failures += 1;
                            None
                        }
                    };

                    if let Some(PageOutcome { record, children }) = outcome {
                        local.record_page(&record);
                        if sink.send(record).await.is_err() {
                            frontier.close().await;
                            frontier.complete().await;
                            return Err(ScanError::SinkClosed);
                        }

                        let mut offered = 0;
                        for child in children {
                            if frontier.enqueue(task.child(child)).await {
                                offered += 1;
                            }
                        }
                        debug!(
                            "[Worker {}] {} new link(s) queued from {}",
                            worker_id, offered, task.url
                        );
                    }

                    frontier.complete().await;
                }

                debug!("Worker {} finished", worker_id);
                Ok(local)
            });

            worker_handles.push(handle);
        }
        drop(sink);

        let outcomes = futures::future::try_join_all(worker_handles).await?;
        for outcome in outcomes {
            stats.merge(outcome?);
        }

        stats.urls_admitted = frontier.visited_count().await;
        stats.tasks_rejected = frontier.rejected_count().await;
        stats.cancelled = self.cancel.is_cancelled();

        info!(
            "Crawl complete. Emitted {} records, {} fetch failures",
            stats.pages_emitted, stats.fetch_failures
        );
        Ok(stats)
    }

    /// A redirected page counts as a visit to its final URL, so that URL is claimed too
    async fn claim_final_url(frontier: &Frontier, task: &CrawlTask, final_url: &str) -> bool {
        if normalize_url(final_url).as_deref() == Some(task.url.as_str()) {
            return true;
        }
        frontier.claim(final_url).await
    }

    /// Fetch a page, returning the final URL after redirects and the body text
    async fn fetch_page(
        client: &Client,
        url: &str,
        max_body_bytes: usize,
    ) -> Result<(String, String)> {
        debug!("Fetching {}", url);

        let mut response = client.get(url).send().await?;
        let status = response.status();
        if status.is_redirection() {
            let location = response
                .headers()
                .get("location")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            return Err(ScanError::OffsiteRedirect {
                url: response.url().to_string(),
                location,
            });
        }
        if !status.is_success() {
            return Err(ScanError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        if let Some(content_type) = content_type
            && !content_type.contains("html")
        {
            return Err(ScanError::NotHtml {
                url: url.to_string(),
                content_type,
            });
        }

        let final_url = response.url().to_string();
        if response
            .content_length()
            .is_some_and(|len| len > max_body_bytes as u64)
        {
            return Err(ScanError::BodyTooLarge {
                url: final_url,
                limit: max_body_bytes,
            });
        }

        // Chunked responses carry no length, so the cap is also enforced while reading
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > max_body_bytes {
                return Err(ScanError::BodyTooLarge {
                    url: final_url,
                    limit: max_body_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }

        Ok((final_url, String::from_utf8_lossy(&body).into_owned()))
    }

    /// Parse and extract a page; kept synchronous because the parsed document is not `Send`
    fn analyze_page(
        body: &str,
        final_url: &str,
        task: &CrawlTask,
        frontier: &Frontier,
        scope: &ScopePolicy,
        include_text: bool,
    ) -> PageOutcome {
        let document = Html::parse_document(body);

        let mut record = extract(&document, final_url, task.label, task.depth);
        if include_text {
            record.text = Some(visible_text(&document));
        }

        let mut children = Vec::new();
        if frontier.policy().allows(task.label, task.depth + 1)
            && let Ok(base) = Url::parse(final_url)
        {
            for href in anchor_targets(&document) {
                if let Some(resolved) =
                    resolve_followable(&base, &href, frontier.allowlist(), scope)
                {
                    children.push(resolved.to_string());
                }
            }
        }

        PageOutcome { record, children }
    }
}

impl Default for Crawler {
    fn default() -> Self {
        Self::new()
    }
}
