//! LocatorService gRPC implementation
//!
//! Streams extraction records to the client as the pipeline produces them.

use futures::{Stream, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status};
use tracing::{debug, info, instrument};

use crate::extract::LocatorExtractor;
use crate::services::locator::conversions;
use crate::tracker::JiraClient;
use crate::Error;

use crate::locator_forge::v1::{
    locator_service_server::{LocatorService, LocatorServiceServer},
    ExtractLocatorsBatchedRequest, ExtractLocatorsRequest, ExtractLocatorsResponse,
    GetAcceptanceCriteriaRequest, GetAcceptanceCriteriaResponse, LocatorChunk,
};

/// Messages buffered per response stream
const RESPONSE_BUFFER: usize = 32;

/// Forward `items` into a response stream; stops once the client goes away
fn forward<T, S>(items: S) -> ReceiverStream<Result<T, Status>>
where
    T: Send + 'static,
    S: Stream<Item = T> + Send + 'static,
{
    let (tx, rx) = mpsc::channel(RESPONSE_BUFFER);
    tokio::spawn(async move {
        futures::pin_mut!(items);
        while let Some(item) = items.next().await {
            if tx.send(Ok(item)).await.is_err() {
                debug!("Client disconnected");
                break;
            }
        }
    });
    ReceiverStream::new(rx)
}

/// LocatorService gRPC server
#[derive(Clone)]
pub struct LocatorGrpcService {
    extractor: Arc<LocatorExtractor>,
    tracker: Option<Arc<JiraClient>>,
}

impl LocatorGrpcService {
    /// Create a new LocatorService gRPC server
    pub fn new(extractor: Arc<LocatorExtractor>, tracker: Option<Arc<JiraClient>>) -> Self {
        Self { extractor, tracker }
    }

    /// Convert to tonic server
    pub fn into_server(self) -> LocatorServiceServer<Self> {
        LocatorServiceServer::new(self)
    }
}

#[tonic::async_trait]
impl LocatorService for LocatorGrpcService {
    type ExtractLocatorsStream = ReceiverStream<Result<ExtractLocatorsResponse, Status>>;
    type ExtractLocatorsBatchedStream = ReceiverStream<Result<LocatorChunk, Status>>;

    #[instrument(skip(self, request))]
    async fn extract_locators(
        &self,
        request: Request<ExtractLocatorsRequest>,
    ) -> Result<Response<Self::ExtractLocatorsStream>, Status> {
        let url = request.into_inner().url;
        info!(url = %url, "ExtractLocators request received");

        let records = self
            .extractor
            .extract(url)
            .map(|record| conversions::record_to_proto(&record));
        Ok(Response::new(forward(records)))
    }

    #[instrument(skip(self, request))]
    async fn extract_locators_batched(
        &self,
        request: Request<ExtractLocatorsBatchedRequest>,
    ) -> Result<Response<Self::ExtractLocatorsBatchedStream>, Status> {
        let req = request.into_inner();
        let chunk_size = usize::try_from(req.chunk_size).ok().filter(|size| *size > 0);
        info!(url = %req.url, chunk_size = ?chunk_size, "ExtractLocatorsBatched request received");

        let chunks = self
            .extractor
            .extract_chunked(req.url, chunk_size)
            .enumerate()
            .map(|(index, records)| conversions::chunk_to_proto(index, &records));
        Ok(Response::new(forward(chunks)))
    }

    #[instrument(skip(self, request))]
    async fn get_acceptance_criteria(
        &self,
        request: Request<GetAcceptanceCriteriaRequest>,
    ) -> Result<Response<GetAcceptanceCriteriaResponse>, Status> {
        let issue_id = request.into_inner().issue_id;
        if issue_id.trim().is_empty() {
            return Err(Status::invalid_argument("issue_id is required"));
        }

        let tracker = self.tracker.as_ref().ok_or_else(|| {
            Error::configuration("No issue tracker configured; set JIRA_URL, JIRA_EMAIL and JIRA_TOKEN")
        })?;
        let criteria = tracker.acceptance_criteria(issue_id.trim()).await?;

        Ok(Response::new(GetAcceptanceCriteriaResponse {
            issue: criteria.issue,
            acceptance_criteria_json: serde_json::to_string(&criteria.acceptance_criteria)
                .map_err(Error::from)?,
        }))
    }
}
