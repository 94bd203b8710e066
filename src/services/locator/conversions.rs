//! Record to protobuf conversions

use crate::extract::{ElementRecord, FailureRecord, ResultRecord};
use crate::locator_forge::v1::{
    extract_locators_response::Record, ExtractLocatorsResponse, ExtractionError, LocatorChunk,
    LocatorRecord,
};

/// Convert an element record
pub fn element_to_proto(element: &ElementRecord) -> LocatorRecord {
    LocatorRecord {
        tag: element.tag.clone(),
        best: element.best.clone(),
        all: element
            .all
            .iter()
            .map(|(strategy, expression)| (strategy.key().to_string(), expression.to_string()))
            .collect(),
        json: serde_json::to_string(element).unwrap_or_default(),
        playwright: element
            .snippets
            .as_ref()
            .map(|snippets| snippets.playwright.clone())
            .unwrap_or_default(),
        selenium: element
            .snippets
            .as_ref()
            .map(|snippets| snippets.selenium.clone())
            .unwrap_or_default(),
    }
}

/// Convert a failure record
pub fn failure_to_proto(failure: &FailureRecord) -> ExtractionError {
    ExtractionError {
        kind: failure.kind.clone(),
        error: failure.error.clone(),
        url: failure.url.clone(),
        details: failure.details.clone(),
    }
}

/// Convert any record
pub fn record_to_proto(record: &ResultRecord) -> ExtractLocatorsResponse {
    let record = match record {
        ResultRecord::Element(element) => Record::Locator(element_to_proto(element)),
        ResultRecord::Failure(failure) => Record::Error(failure_to_proto(failure)),
    };
    ExtractLocatorsResponse {
        record: Some(record),
    }
}

/// Convert a batch of records
pub fn chunk_to_proto(index: usize, records: &[ResultRecord]) -> LocatorChunk {
    LocatorChunk {
        index: u32::try_from(index).unwrap_or(u32::MAX),
        records: records.iter().map(record_to_proto).collect(),
    }
}
