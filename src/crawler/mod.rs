//! Crawler module for listing page fetching and processing
//!
//! This module contains the core ranking pipeline, including:
//! - HTTP fetching of listing pages
//! - Book extraction from listing HTML
//! - Pagination planning from the first page
//! - Concurrent fetch/parse coordination

mod coordinator;
mod fetcher;
mod parser;
mod planner;

pub use coordinator::{Coordinator, FetchedPage, PipelineOutcome, ResultCollection};
pub use fetcher::{build_http_client, fetch_url, HttpFetcher, PageFetcher};
pub use parser::parse_books;
pub use planner::{plan_pages, PageTask};

use crate::config::Config;
use crate::output::write_report;
use crate::BookRankError;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// What a completed run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Tag that was ranked
    pub tag: String,

    /// Number of books in the report
    pub total_books: usize,

    /// Listing pages parsed, including the first page
    pub pages_parsed: usize,

    /// Listing pages whose fetch failed
    pub pages_failed: usize,

    /// Where the report was written
    pub report_path: PathBuf,

    /// Wall-clock time of the run
    pub elapsed: Duration,
}

/// Runs a complete ranking operation
///
/// This is the main entry point. It will:
/// 1. Build the HTTP client
/// 2. Fetch the first listing page and plan the remaining pages
/// 3. Fetch and parse every page concurrently
/// 4. Sort the books by composite score
/// 5. Write the Markdown report
///
/// # Returns
///
/// * `Ok(RunSummary)` - The report was written
/// * `Err(BookRankError::Planning)` - The first page could not be fetched;
///   no report is written
/// * `Err(BookRankError)` - Client construction or report writing failed
///
/// # Example
///
/// ```no_run
/// use bookrank::config::Config;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let summary = bookrank::run(Config::default()).await?;
/// println!("{} books", summary.total_books);
/// # Ok(())
/// # }
/// ```
pub async fn run(config: Config) -> Result<RunSummary, BookRankError> {
    let fetcher = HttpFetcher::from_config(&config.catalog, &config.pipeline)?;
    run_with_fetcher(&config, Arc::new(fetcher)).await
}

/// Same as [`run`] with a caller-supplied fetcher
pub async fn run_with_fetcher<F: PageFetcher + ?Sized + 'static>(
    config: &Config,
    fetcher: Arc<F>,
) -> Result<RunSummary, BookRankError> {
    let start = Instant::now();
    let tag = config.catalog.tag.clone();
    let listing_url = config.listing_url();

    tracing::info!("Getting books of {} ...", tag);

    let body = fetcher
        .fetch(&listing_url)
        .await
        .map_err(|source| BookRankError::Planning {
            url: listing_url.clone(),
            source,
        })?;

    let tasks = plan_pages(&body, &listing_url);
    tracing::info!("Planned {} more pages after {}", tasks.len(), listing_url);

    let first_page = FetchedPage {
        ordinal: 0,
        url: listing_url,
        body,
    };
    let coordinator = Coordinator::new(fetcher, config.pipeline.clone());
    let outcome = coordinator.run(first_page, tasks).await?;

    let report_path = config.output_path();
    write_report(&tag, &outcome.records, &report_path)?;

    let elapsed = start.elapsed();
    tracing::info!(
        "Collected {} books from {} pages in {:.2?} ({} pages failed)",
        outcome.records.len(),
        outcome.pages_parsed,
        elapsed,
        outcome.pages_failed
    );

    Ok(RunSummary {
        tag,
        total_books: outcome.records.len(),
        pages_parsed: outcome.pages_parsed,
        pages_failed: outcome.pages_failed,
        report_path,
        elapsed,
    })
}
