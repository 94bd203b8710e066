//! Extraction pipeline
//!
//! Navigation, collection and per-element extraction for one URL, emitted as a
//! forward-only stream of [`ResultRecord`]s. Each request runs in its own task;
//! the page it opened is closed on every exit path, including the consumer
//! dropping the stream early.

use futures::stream::{Chunks, Stream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, instrument, warn};

use crate::config::{Config, DEFAULT_ELEMENT_SELECTOR};
use crate::extract::attributes::AttributeExtractor;
use crate::extract::best::BestLocatorPolicy;
use crate::extract::collector::ElementCollector;
use crate::extract::navigation::NavigationController;
use crate::extract::record::ResultRecord;
use crate::extract::strategy::{self, LocatorStrategy, DEFAULT_PRIORITY};
use crate::session::{ElementHandle, PageContext, RequestPolicy, SessionManager};
use crate::{Error, Result};

/// Records buffered ahead of a slow consumer
const STREAM_BUFFER: usize = 16;

/// Stream of records for one URL
pub type ResultStream = ReceiverStream<ResultRecord>;

/// Tunables of the pipeline
#[derive(Debug, Clone)]
pub struct ExtractorSettings {
    pub element_cap: usize,
    pub navigation_timeout: Duration,
    pub text_max_len: usize,
    pub attribute_timeout: Duration,
    pub element_selector: String,
    pub priority: Vec<LocatorStrategy>,
    pub request_policy: RequestPolicy,
    pub chunk_size: usize,
    /// Attach Playwright/Selenium snippets to element records
    pub snippets: bool,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            element_cap: 150,
            navigation_timeout: Duration::from_millis(15000),
            text_max_len: 40,
            attribute_timeout: Duration::from_millis(2000),
            element_selector: DEFAULT_ELEMENT_SELECTOR.to_string(),
            priority: DEFAULT_PRIORITY.to_vec(),
            request_policy: RequestPolicy::block_heavy_resources(),
            chunk_size: 30,
            snippets: false,
        }
    }
}

impl ExtractorSettings {
    /// Settings from server configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            element_cap: config.element_cap,
            navigation_timeout: Duration::from_millis(config.navigation_timeout_ms),
            text_max_len: config.text_max_len,
            attribute_timeout: Duration::from_millis(config.attribute_timeout_ms),
            element_selector: config.element_selector.clone(),
            priority: config.priority_order()?,
            request_policy: if config.block_resources {
                RequestPolicy::block_heavy_resources()
            } else {
                RequestPolicy::allow_all()
            },
            chunk_size: config.chunk_size,
            snippets: config.snippets,
        })
    }
}

/// Result of processing one element
#[derive(Debug)]
pub enum ElementOutcome {
    /// Locators were built
    Record(ResultRecord),
    /// The element was unreadable and is left out
    Skip(Error),
}

#[derive(Debug, Default)]
struct ExtractionSummary {
    matched: usize,
    emitted: usize,
    skipped: usize,
    abandoned: bool,
}

/// Locator extraction engine
#[derive(Debug)]
pub struct LocatorExtractor {
    navigation: NavigationController,
    collector: ElementCollector,
    attributes: AttributeExtractor,
    policy: BestLocatorPolicy,
    chunk_size: usize,
    snippets: bool,
}

impl LocatorExtractor {
    /// Create an extractor on top of the shared session manager
    pub fn new(sessions: Arc<dyn SessionManager>, settings: ExtractorSettings) -> Self {
        Self {
            navigation: NavigationController::new(
                sessions,
                settings.navigation_timeout,
                settings.request_policy,
            ),
            collector: ElementCollector::new(settings.element_selector, settings.element_cap),
            attributes: AttributeExtractor::new(settings.text_max_len, settings.attribute_timeout),
            policy: BestLocatorPolicy::new(settings.priority),
            chunk_size: settings.chunk_size.max(1),
            snippets: settings.snippets,
        }
    }

    /// Default records per chunk
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Start extracting `url`
    ///
    /// Yields one record per readable element in document order, or a single
    /// failure record when navigation or collection fails.
    pub fn extract<S: Into<String>>(self: &Arc<Self>, url: S) -> ResultStream {
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let url = url.into();
        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.run(url, tx).await;
        });
        ReceiverStream::new(rx)
    }

    /// Extract `url` into a single list
    pub async fn extract_all<S: Into<String>>(self: &Arc<Self>, url: S) -> Vec<ResultRecord> {
        collect_records(self.extract(url)).await
    }

    /// Extract `url` in batches of `chunk_size` records (default when `None`)
    pub fn extract_chunked<S: Into<String>>(
        self: &Arc<Self>,
        url: S,
        chunk_size: Option<usize>,
    ) -> Chunks<ResultStream> {
        chunked(self.extract(url), chunk_size.unwrap_or(self.chunk_size))
    }

    /// Build the record for one element; failures become a skip
    pub async fn process_element(&self, page: &dyn PageContext, element: &ElementHandle) -> ElementOutcome {
        match self.attributes.extract(page, element).await {
            Ok(bundle) => {
                let all = strategy::build(&bundle);
                let best = self.policy.select_best(&all);
                let record = ResultRecord::element(bundle.tag, best, all);
                ElementOutcome::Record(if self.snippets { record.with_snippets() } else { record })
            }
            Err(e) => ElementOutcome::Skip(e),
        }
    }

    #[instrument(skip(self, tx))]
    async fn run(&self, url: String, tx: mpsc::Sender<ResultRecord>) {
        let page = match self.navigation.open(&url).await {
            Ok(page) => page,
            Err(e) => {
                warn!(kind = e.kind(), "Extraction aborted: {}", e);
                let _ = tx.send(ResultRecord::failure(&url, &e)).await;
                return;
            }
        };

        match self.process_page(page.as_ref(), &url, &tx).await {
            Ok(summary) => info!(
                matched = summary.matched,
                emitted = summary.emitted,
                skipped = summary.skipped,
                abandoned = summary.abandoned,
                "Extraction finished"
            ),
            Err(record) => {
                let _ = tx.send(record).await;
            }
        }

        if let Err(e) = page.close().await {
            warn!(page = %page.id(), "Failed to release page: {}", e);
        }
    }

    async fn process_page(
        &self,
        page: &dyn PageContext,
        url: &str,
        tx: &mpsc::Sender<ResultRecord>,
    ) -> std::result::Result<ExtractionSummary, ResultRecord> {
        if let Err(e) = self.navigation.navigate(page, url).await {
            warn!(kind = e.kind(), "Navigation failed: {}", e);
            let record = ResultRecord::failure(url, &e);
            return Err(match e {
                Error::NavigationTimeout(_) => {
                    record.with_details(format!("budget {}ms", self.navigation.timeout().as_millis()))
                }
                _ => record,
            });
        }

        let elements = self.collector.collect(page).await.map_err(|e| {
            warn!(kind = e.kind(), "Collection failed: {}", e);
            ResultRecord::failure(url, &e).with_details(format!("selector: {}", self.collector.selector()))
        })?;

        let mut summary = ExtractionSummary {
            matched: elements.len(),
            ..ExtractionSummary::default()
        };

        for element in &elements {
            match self.process_element(page, element).await {
                ElementOutcome::Record(record) => {
                    if tx.send(record).await.is_err() {
                        debug!("Consumer went away");
                        summary.abandoned = true;
                        break;
                    }
                    summary.emitted += 1;
                }
                ElementOutcome::Skip(e) => {
                    debug!(index = element.index(), "Skipping element: {}", e);
                    summary.skipped += 1;
                }
            }
        }

        Ok(summary)
    }
}

/// Drain a record stream into a list
pub async fn collect_records<S>(stream: S) -> Vec<ResultRecord>
where
    S: Stream<Item = ResultRecord>,
{
    stream.collect().await
}

/// Group a record stream into batches of `size`; the last batch may be shorter
pub fn chunked<S>(stream: S, size: usize) -> Chunks<S>
where
    S: Stream<Item = ResultRecord>,
{
    stream.chunks(size.max(1))
}
