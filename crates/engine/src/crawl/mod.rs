//! Bounded-frontier website crawler.
//!
//! Discovers a site's page set breadth-first from a seed URL, bounded by
//! page count and depth, restricted to the seed's origin, and validates
//! every fetched page through the parallel dispatcher.
//!
//! Worker discipline: a fixed pool pulls `(url, depth)` units from the
//! shared frontier; the visited set and results map live behind one mutex
//! instance shared by every worker. Termination is drain-based: once all
//! enqueued units are acknowledged, each worker receives one stop signal.

mod frontier;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinSet;
use url::Url;

use sweep_core::{AppConfig, Document, Error, Report};

use crate::dispatch::Dispatcher;
use crate::extract::{LinkFilter, outbound_links};
use crate::fetch::PageFetcher;
use frontier::{Frontier, Signal};

/// Crawl bounds and filters.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Hard ceiling on pages visited.
    pub max_pages: usize,
    /// Maximum link depth from the seed (0 = seed only).
    pub max_depth: usize,
    /// Worker pool size.
    pub workers: usize,
    /// Per-page fetch timeout.
    pub fetch_timeout: Duration,
    /// Regex patterns a discovered URL must match (if any are set).
    pub include_patterns: Vec<String>,
    /// Regex patterns that disqualify a discovered URL.
    pub exclude_patterns: Vec<String>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_pages: 100,
            max_depth: 3,
            workers: 4,
            fetch_timeout: Duration::from_secs(10),
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
        }
    }
}

impl From<&AppConfig> for CrawlConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_pages: config.max_pages,
            max_depth: config.max_depth,
            workers: config.workers,
            fetch_timeout: config.fetch_timeout(),
            include_patterns: config.include_patterns.clone(),
            exclude_patterns: config.exclude_patterns.clone(),
        }
    }
}

#[derive(Default)]
struct CrawlState {
    /// URLs already dequeued. Never shrinks; a URL never regresses to
    /// unvisited.
    visited: HashSet<String>,
    results: HashMap<String, Report>,
}

/// Shared context handed to every crawl worker.
struct CrawlContext {
    fetcher: Arc<dyn PageFetcher>,
    dispatcher: Arc<Dispatcher>,
    frontier: Frontier,
    /// The single lock instance guarding all cross-worker mutable state.
    state: Mutex<CrawlState>,
    filter: LinkFilter,
    config: CrawlConfig,
}

/// Breadth-first site crawler feeding the parallel dispatcher.
pub struct Crawler {
    fetcher: Arc<dyn PageFetcher>,
    dispatcher: Arc<Dispatcher>,
    config: CrawlConfig,
}

impl Crawler {
    pub fn new(fetcher: Arc<dyn PageFetcher>, dispatcher: Arc<Dispatcher>, config: CrawlConfig) -> Self {
        Self { fetcher, dispatcher, config }
    }

    /// Crawl a website starting from `start_url` and validate every page.
    ///
    /// Returns one report per visited URL. Fetch failures appear as
    /// error-only reports; they never abort the crawl.
    ///
    /// # Errors
    ///
    /// Returns an error only for caller misuse: an unparseable or
    /// non-http(s) seed URL, or invalid URL filter patterns.
    pub async fn crawl(&self, start_url: &str) -> Result<HashMap<String, Report>, Error> {
        let seed = Url::parse(start_url).map_err(|e| Error::InvalidUrl(format!("'{start_url}': {e}")))?;
        if seed.scheme() != "http" && seed.scheme() != "https" {
            return Err(Error::InvalidUrl(format!("'{start_url}': scheme must be http or https")));
        }

        let filter = LinkFilter::new(&seed, &self.config.include_patterns, &self.config.exclude_patterns)?;

        let context = Arc::new(CrawlContext {
            fetcher: Arc::clone(&self.fetcher),
            dispatcher: Arc::clone(&self.dispatcher),
            frontier: Frontier::new(),
            state: Mutex::new(CrawlState::default()),
            filter,
            config: self.config.clone(),
        });

        context.frontier.push(seed.to_string(), 0).await;

        let mut workers = JoinSet::new();
        for id in 0..self.config.workers {
            let context = Arc::clone(&context);
            workers.spawn(worker_loop(id, context));
        }

        // Sole termination signal: the frontier fully drained. Then one
        // stop per worker so nothing stays blocked on the empty queue.
        context.frontier.join().await;
        context.frontier.close(self.config.workers).await;
        while workers.join_next().await.is_some() {}

        let mut state = context.state.lock().await;
        tracing::info!(pages = state.results.len(), "crawl finished");
        Ok(std::mem::take(&mut state.results))
    }
}

async fn worker_loop(id: usize, context: Arc<CrawlContext>) {
    loop {
        match context.frontier.pop().await {
            Signal::Page(url, depth) => {
                process_page(&context, &url, depth).await;
                context.frontier.task_done().await;
            }
            Signal::Stop => {
                tracing::debug!(worker = id, "crawl worker stopping");
                break;
            }
        }
    }
}

async fn process_page(context: &CrawlContext, url: &str, depth: usize) {
    // Admission check at dequeue time, before any fetch: skip revisits and
    // stop admitting once the page cap is reached.
    {
        let mut state = context.state.lock().await;
        if state.visited.contains(url) || state.visited.len() >= context.config.max_pages {
            tracing::debug!(url, "discarding frontier entry");
            return;
        }
        state.visited.insert(url.to_string());
    }

    tracing::info!(url, depth, "crawling");

    let fetched = match tokio::time::timeout(context.config.fetch_timeout, context.fetcher.fetch(url)).await {
        Ok(result) => result,
        Err(_) => Err(Error::FetchTimeout(format!(
            "{url} exceeded {}ms",
            context.config.fetch_timeout.as_millis()
        ))),
    };

    let content = match fetched {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(url, error = %e, "fetch failed");
            let mut state = context.state.lock().await;
            state.results.insert(url.to_string(), Report::from_document_error(url, e.to_string()));
            return;
        }
    };

    let report = context.dispatcher.validate_document(Document::new(url, content.clone())).await;

    let links = if depth < context.config.max_depth {
        match Url::parse(url) {
            Ok(page_url) => outbound_links(&content, &page_url, &context.filter),
            Err(_) => Vec::new(),
        }
    } else {
        Vec::new()
    };

    let mut state = context.state.lock().await;
    state.results.insert(url.to_string(), report);
    for link in links {
        if !state.visited.contains(&link) {
            context.frontier.push(link, depth + 1).await;
        }
    }
}
