//! Result records

use serde::{Deserialize, Serialize};

use crate::extract::snippets::ToolSnippets;
use crate::extract::strategy::LocatorCandidateSet;
use crate::Error;

/// Locators found for one element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRecord {
    /// Lowercase tag name
    pub tag: String,
    /// Highest-priority locator, absent when no strategy applied
    pub best: Option<String>,
    /// Every applicable locator
    pub all: LocatorCandidateSet,
    /// Tool lookups rendered from `all`, when enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippets: Option<ToolSnippets>,
}

/// Pipeline-level failure; no element records accompany it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// Human-readable failure
    pub error: String,
    /// Taxonomy name, e.g. "NavigationTimeout"
    pub kind: String,
    /// Requested URL
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// One item of an extraction stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultRecord {
    Element(ElementRecord),
    Failure(FailureRecord),
}

impl ResultRecord {
    /// Element record
    pub fn element<S: Into<String>>(tag: S, best: Option<String>, all: LocatorCandidateSet) -> Self {
        ResultRecord::Element(ElementRecord {
            tag: tag.into(),
            best,
            all,
            snippets: None,
        })
    }

    /// Render tool snippets into an element record; failures are returned unchanged
    pub fn with_snippets(self) -> Self {
        match self {
            ResultRecord::Element(element) => ResultRecord::Element(ElementRecord {
                snippets: Some(ToolSnippets::from_set(&element.all)),
                ..element
            }),
            failure => failure,
        }
    }

    /// Terminal record for `error` while processing `url`
    pub fn failure<S: Into<String>>(url: S, error: &Error) -> Self {
        ResultRecord::Failure(FailureRecord {
            error: error.to_string(),
            kind: error.kind().to_string(),
            url: url.into(),
            details: None,
        })
    }

    /// Attach details to a failure record; element records are returned unchanged
    pub fn with_details<S: Into<String>>(self, details: S) -> Self {
        match self {
            ResultRecord::Failure(failure) => ResultRecord::Failure(FailureRecord {
                details: Some(details.into()),
                ..failure
            }),
            element => element,
        }
    }

    /// Whether this is a terminal failure
    pub fn is_error(&self) -> bool {
        matches!(self, ResultRecord::Failure(_))
    }

    /// Element record, if this is one
    pub fn as_element(&self) -> Option<&ElementRecord> {
        match self {
            ResultRecord::Element(element) => Some(element),
            ResultRecord::Failure(_) => None,
        }
    }

    /// Failure record, if this is one
    pub fn as_failure(&self) -> Option<&FailureRecord> {
        match self {
            ResultRecord::Failure(failure) => Some(failure),
            ResultRecord::Element(_) => None,
        }
    }
}
