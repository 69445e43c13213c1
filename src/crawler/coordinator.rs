//! Pipeline coordinator - concurrent fetch/parse orchestration
//!
//! Fetch workers and a single parse worker are connected through a bounded
//! channel:
//! - At most `concurrency` fetch workers run at once, dispatched with a small
//!   stagger so the remote server does not see a burst
//! - Each fetch worker handles exactly one [`PageTask`] and pushes its body
//!   into the buffer, waiting while the buffer is full
//! - The parse worker drains the buffer into a [`ResultCollection`]
//! - After every fetch worker has finished, an end-of-stream marker is pushed
//!   and the parse worker stops once it reaches it
//!
//! A failed fetch is logged and its page is simply absent from the results.

use crate::crawler::fetcher::PageFetcher;
use crate::crawler::parser::parse_books;
use crate::crawler::planner::PageTask;
use crate::config::PipelineConfig;
use crate::rating::{sort_books, BookRecord};
use crate::BookRankError;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

/// A fetched listing page waiting to be parsed
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Ordinal of the task that fetched it (0 for the first page)
    pub ordinal: usize,
    pub url: String,
    pub body: String,
}

/// Items carried by the buffer between fetch workers and the parse worker
#[derive(Debug)]
enum PageMessage {
    Body(FetchedPage),
    EndOfStream,
}

/// Shared, append-only collection of parsed books
///
/// Cloning yields another handle to the same collection. `append` takes a
/// lock, so any number of parse workers may write concurrently.
#[derive(Debug, Clone, Default)]
pub struct ResultCollection {
    inner: Arc<Mutex<Vec<BookRecord>>>,
}

impl ResultCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the books of one page
    pub fn append(&self, books: Vec<BookRecord>) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(books);
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Freezes the collection and returns its books in report order
    pub fn into_sorted(self) -> Vec<BookRecord> {
        let mut books = match Arc::try_unwrap(self.inner) {
            Ok(mutex) => mutex.into_inner().unwrap_or_else(PoisonError::into_inner),
            Err(shared) => shared
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        };
        sort_books(&mut books);
        books
    }
}

/// Result of one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// All parsed books, in report order
    pub records: Vec<BookRecord>,

    /// Number of page bodies the parse worker consumed
    pub pages_parsed: usize,

    /// Number of tasks whose fetch failed
    pub pages_failed: usize,
}

/// Runs page tasks through the fetch/parse pipeline
pub struct Coordinator<F: PageFetcher + ?Sized + 'static> {
    fetcher: Arc<F>,
    settings: PipelineConfig,
}

impl<F: PageFetcher + ?Sized + 'static> Coordinator<F> {
    /// Creates a coordinator
    ///
    /// `settings` supplies the worker bound, buffer capacity and dispatch
    /// stagger; it is assumed to be validated.
    pub fn new(fetcher: Arc<F>, settings: PipelineConfig) -> Self {
        Self { fetcher, settings }
    }

    /// Parses `first_page`, fetches and parses every task, and returns the
    /// collected books sorted into report order
    ///
    /// Returns only once every fetch worker has finished and the parse worker
    /// has drained the buffer.
    pub async fn run(
        &self,
        first_page: FetchedPage,
        tasks: Vec<PageTask>,
    ) -> Result<PipelineOutcome, BookRankError> {
        let (tx, rx) = mpsc::channel(self.settings.buffer_capacity.max(1));
        let results = ResultCollection::new();
        let parser = tokio::spawn(parse_worker(rx, results.clone()));

        tracing::info!("process page: {}", first_page.url);
        if tx.send(PageMessage::Body(first_page)).await.is_err() {
            return Err(join_parse_worker(parser).await.err().unwrap_or_else(|| {
                BookRankError::Worker("parse worker stopped early".to_string())
            }));
        }

        let pages_failed = self.dispatch(tasks, &tx).await?;

        // Every fetch worker has finished, so the marker is the last message
        if tx.send(PageMessage::EndOfStream).await.is_err() {
            tracing::warn!("Parse worker stopped before end of stream");
        }
        drop(tx);

        let pages_parsed = join_parse_worker(parser).await?;
        let records = results.into_sorted();

        tracing::debug!(
            "Pipeline finished: {} pages parsed, {} failed, {} books",
            pages_parsed,
            pages_failed,
            records.len()
        );

        Ok(PipelineOutcome {
            records,
            pages_parsed,
            pages_failed,
        })
    }

    /// Starts one fetch worker per task and waits for all of them
    ///
    /// Returns the number of tasks whose page could not be delivered.
    async fn dispatch(
        &self,
        tasks: Vec<PageTask>,
        tx: &mpsc::Sender<PageMessage>,
    ) -> Result<usize, BookRankError> {
        let permits = Arc::new(Semaphore::new(self.settings.concurrency.max(1)));
        let stagger = self.settings.stagger();
        let mut workers = JoinSet::new();

        for (i, task) in tasks.into_iter().enumerate() {
            if i > 0 && !stagger.is_zero() {
                tokio::time::sleep(stagger).await;
            }

            let permit = Arc::clone(&permits)
                .acquire_owned()
                .await
                .map_err(|e| BookRankError::Worker(e.to_string()))?;

            tracing::info!("process page: {}", task.url);
            let fetcher = Arc::clone(&self.fetcher);
            let tx = tx.clone();
            workers.spawn(async move {
                let delivered = fetch_worker(fetcher.as_ref(), task, &tx).await;
                drop(permit);
                delivered
            });
        }

        let mut failed = 0;
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(true) => {}
                Ok(false) => failed += 1,
                Err(e) => {
                    tracing::error!("Fetch worker panicked: {}", e);
                    failed += 1;
                }
            }
        }

        Ok(failed)
    }
}

/// Fetches one page and pushes it into the buffer
///
/// Returns whether the body was delivered to the parse worker.
async fn fetch_worker<F: PageFetcher + ?Sized>(
    fetcher: &F,
    task: PageTask,
    tx: &mpsc::Sender<PageMessage>,
) -> bool {
    let body = match fetcher.fetch(&task.url).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!("Skipping page {}: {}", task.ordinal, e);
            return false;
        }
    };

    let page = FetchedPage {
        ordinal: task.ordinal,
        url: task.url,
        body,
    };

    // Waits here while the buffer is full
    if tx.send(PageMessage::Body(page)).await.is_err() {
        tracing::error!("Parse worker gone, dropping page {}", task.ordinal);
        return false;
    }

    true
}

/// Drains the buffer until the end-of-stream marker, returning the number of
/// pages parsed
async fn parse_worker(mut rx: mpsc::Receiver<PageMessage>, results: ResultCollection) -> usize {
    let mut pages = 0;

    while let Some(message) = rx.recv().await {
        match message {
            PageMessage::Body(page) => {
                let FetchedPage { ordinal, url, body } = page;
                // HTML parsing is CPU-bound; keep it off the runtime workers
                match tokio::task::spawn_blocking(move || parse_books(&body)).await {
                    Ok(books) => {
                        tracing::debug!(
                            "Parsed {} books from page {} ({})",
                            books.len(),
                            ordinal,
                            url
                        );
                        results.append(books);
                        pages += 1;
                    }
                    Err(e) => tracing::error!("Parsing page {} ({}) failed: {}", ordinal, url, e),
                }
            }
            PageMessage::EndOfStream => break,
        }
    }

    pages
}

async fn join_parse_worker(
    handle: tokio::task::JoinHandle<usize>,
) -> Result<usize, BookRankError> {
    handle
        .await
        .map_err(|e| BookRankError::Worker(format!("parse worker failed: {}", e)))
}
