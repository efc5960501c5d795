//! The crawl frontier: pending tasks, the visited set and the seed-host allowlist.
//!
//! The frontier is the only owner of crawl-scope state. Workers interact with it
//! through `enqueue`, `next` and `complete`; the allowlist is filled from seeds before
//! the frontier is shared and is read without locking afterwards.

use crate::error::{Result, ScanError};
use crate::policy::DepthPolicy;
use crate::task::CrawlTask;
use std::collections::{HashSet, VecDeque};
use tokio::sync::{Mutex, Notify};
use tracing::debug;
use url::Url;

pub struct Frontier {
    policy: DepthPolicy,
    allowlist: HashSet<String>,
    state: Mutex<FrontierState>,
    notify: Notify,
}

#[derive(Default)]
struct FrontierState {
    queue: VecDeque<CrawlTask>,
    visited: HashSet<String>,
    in_flight: usize,
    rejected: usize,
    closed: bool,
}

impl FrontierState {
    fn is_drained(&self) -> bool {
        self.queue.is_empty() && self.in_flight == 0
    }
}

impl Frontier {
    pub fn new(policy: DepthPolicy) -> Self {
        Self {
            policy,
            allowlist: HashSet::new(),
            state: Mutex::new(FrontierState::default()),
            notify: Notify::new(),
        }
    }

    /// Add a seed's hostname to the allowlist. Only possible before the frontier is shared.
    pub fn register_seed_host(&mut self, seed_url: &str) -> Result<String> {
        let parsed = Url::parse(seed_url)
            .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", seed_url, e)))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| ScanError::InvalidUrl(format!("{}: no hostname", seed_url)))?
            .to_string();

        self.allowlist.insert(host.clone());
        Ok(host)
    }

    pub fn policy(&self) -> &DepthPolicy {
        &self.policy
    }

    pub fn allowlist(&self) -> &HashSet<String> {
        &self.allowlist
    }

    pub fn is_allowed_host(&self, host: &str) -> bool {
        self.allowlist.contains(host)
    }

    /// Admit a task unless it is too deep for its label or its URL was already admitted.
    ///
    /// A task rejected for depth does not mark its URL as visited.
    pub async fn enqueue(&self, task: CrawlTask) -> bool {
        let mut state = self.state.lock().await;

        if !self.policy.allows(task.label, task.depth) {
            state.rejected += 1;
            return false;
        }

        let Some(key) = normalize_url(&task.url) else {
            debug!("Rejecting unparseable URL {}", task.url);
            state.rejected += 1;
            return false;
        };

        if !state.visited.insert(key.clone()) {
            state.rejected += 1;
            return false;
        }

        debug!("Admitted {} at depth {} ({})", key, task.depth, task.label);
        state.queue.push_back(CrawlTask { url: key, ..task });
        drop(state);

        self.notify.notify_waiters();
        true
    }

    /// Mark a URL reached outside `enqueue` (a redirect target) as visited.
    ///
    /// Returns false when the URL was already admitted or claimed.
    pub async fn claim(&self, url: &str) -> bool {
        let Some(key) = normalize_url(url) else {
            return false;
        };

        let mut state = self.state.lock().await;
        if state.visited.insert(key) {
            true
        } else {
            state.rejected += 1;
            false
        }
    }

    /// Take the next task, waiting while other workers may still discover more.
    ///
    /// Returns `None` once the queue is empty with nothing in flight, or after `close`.
    pub async fn next(&self) -> Option<CrawlTask> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.state.lock().await;
                if state.closed {
                    return None;
                }
                if let Some(task) = state.queue.pop_front() {
                    state.in_flight += 1;
                    return Some(task);
                }
                if state.in_flight == 0 {
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Mark one task handed out by `next` as finished
    pub async fn complete(&self) {
        let mut state = self.state.lock().await;
        state.in_flight = state.in_flight.saturating_sub(1);
        let drained = state.is_drained();
        drop(state);

        if drained {
            self.notify.notify_waiters();
        }
    }

    /// Stop handing out tasks; tasks already taken are unaffected
    pub async fn close(&self) {
        self.state.lock().await.closed = true;
        self.notify.notify_waiters();
    }

    pub async fn visited_count(&self) -> usize {
        self.state.lock().await.visited.len()
    }

    pub async fn rejected_count(&self) -> usize {
        self.state.lock().await.rejected
    }

    pub async fn pending_count(&self) -> usize {
        self.state.lock().await.queue.len()
    }
}

/// Canonical form used for the visited set: parsed, serialized, fragment removed
pub fn normalize_url(url: &str) -> Option<String> {
    let mut parsed = Url::parse(url).ok()?;
    parsed.set_fragment(None);
    Some(parsed.to_string())
}
