//! a11ysweep command-line entry point.
//!
//! Thin driver over `sweep-engine`: parses arguments, loads configuration,
//! wires up the dispatcher, and prints per-document or aggregate summaries.
//! Logging goes to stderr so stdout stays clean for report output.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sweep_core::{AppConfig, Report, ReportCache, RuleSet};
use sweep_engine::{BatchProcessor, Crawler, Dispatcher, FetchConfig, HttpFetcher, PageFetcher, aggregate};

#[derive(Parser)]
#[command(name = "a11ysweep", version, about = "Audit HTML documents against WCAG 2.2 rules")]
struct Cli {
    /// Emit JSON instead of a text summary.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a single page by URL.
    Page {
        /// URL to fetch and validate.
        url: String,
    },
    /// Crawl a website from a seed URL and validate every page.
    Crawl {
        /// Seed URL to start crawling from.
        url: String,
    },
    /// Validate a list of HTML files.
    Files {
        /// Paths to HTML files.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Validate every matching file in a directory.
    Dir {
        /// Directory to expand.
        dir: PathBuf,
        /// File name pattern (shell-style wildcards).
        #[arg(long, default_value = "*.html")]
        pattern: String,
    },
    /// Remove cached validation results.
    CacheClear {
        /// Only remove entries older than this many seconds.
        #[arg(long)]
        max_age_secs: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("failed to load configuration")?;

    let failed = match cli.command {
        Command::Page { url } => {
            let dispatcher = build_dispatcher(&config).await?;
            let fetcher = build_fetcher(&config)?;
            let report = dispatcher.validate_url(&fetcher, &url).await;
            print_report(&report, cli.json)?;
            report.has_issues() || report.has_errors()
        }
        Command::Crawl { url } => {
            let dispatcher = build_dispatcher(&config).await?;
            let fetcher: Arc<dyn PageFetcher> = Arc::new(build_fetcher(&config)?);
            let crawler = Crawler::new(fetcher, dispatcher, (&config).into());
            let results = crawler.crawl(&url).await?;
            print_results(&results, cli.json)?
        }
        Command::Files { paths } => {
            let dispatcher = build_dispatcher(&config).await?;
            let processor = BatchProcessor::new(dispatcher, config.batch_size);
            let results = processor.process_files(&paths).await;
            print_results(&results, cli.json)?
        }
        Command::Dir { dir, pattern } => {
            let dispatcher = build_dispatcher(&config).await?;
            let processor = BatchProcessor::new(dispatcher, config.batch_size);
            let results = processor.process_directory(&dir, &pattern).await?;
            print_results(&results, cli.json)?
        }
        Command::CacheClear { max_age_secs } => {
            let cache = ReportCache::open(&config.cache_dir, config.cache_ttl()).await?;
            let removed = cache.clear(max_age_secs.map(Duration::from_secs)).await;
            println!("removed {removed} cache entries");
            false
        }
    };

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

async fn build_dispatcher(config: &AppConfig) -> Result<Arc<Dispatcher>> {
    let rules = RuleSet::from_config(config.conformance_level, &config.include_rules, &config.exclude_rules);
    anyhow::ensure!(!rules.is_empty(), "no rules active after include/exclude filtering");
    tracing::info!(rules = rules.len(), level = %config.conformance_level, "rule set loaded");

    let cache = if config.cache_enabled {
        Some(ReportCache::open(&config.cache_dir, config.cache_ttl()).await?)
    } else {
        None
    };

    Ok(Arc::new(Dispatcher::new(rules, cache, config.workers)))
}

fn build_fetcher(config: &AppConfig) -> Result<HttpFetcher> {
    Ok(HttpFetcher::new(FetchConfig {
        user_agent: config.user_agent.clone(),
        max_bytes: config.max_bytes,
        timeout: config.fetch_timeout(),
        max_redirects: 5,
    })?)
}

fn print_report(report: &Report, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("{}: {} findings, {} errors ({}ms)", report.source_uri, report.total_findings(), report.rule_errors.len(), report.elapsed_ms);
    for (rule_id, findings) in report.findings_by_rule() {
        println!("  {} ({})", rule_id, findings.len());
        for finding in findings {
            println!("    [{}] {} - {}", finding.severity, finding.selector, finding.description);
        }
    }
    for (rule_id, message) in &report.rule_errors {
        println!("  error {rule_id}: {message}");
    }
    Ok(())
}

fn print_results<K>(results: &HashMap<K, Report>, json: bool) -> Result<bool> {
    let merged = aggregate(results);

    if json {
        println!("{}", serde_json::to_string_pretty(&merged)?);
    } else {
        let mut reports: Vec<&Report> = results.values().collect();
        reports.sort_by_key(|report| &report.source_uri);
        for report in reports {
            println!(
                "{}: {} findings, {} errors ({}ms)",
                report.source_uri,
                report.total_findings(),
                report.rule_errors.len(),
                report.elapsed_ms
            );
        }
        println!(
            "total: {} documents, {} findings, {} errors",
            merged.documents,
            merged.findings.len(),
            merged.rule_errors.len()
        );
    }

    Ok(merged.has_issues() || merged.has_errors())
}
