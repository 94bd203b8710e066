//! Element collection

use tracing::debug;

use crate::config::DEFAULT_ELEMENT_SELECTOR;
use crate::session::{ElementHandle, PageContext};
use crate::Error;

/// Queries the page for locator candidates in document order
#[derive(Debug, Clone)]
pub struct ElementCollector {
    selector: String,
    cap: usize,
}

impl ElementCollector {
    /// Create a collector for `selector`, keeping at most `cap` elements
    pub fn new<S: Into<String>>(selector: S, cap: usize) -> Self {
        Self {
            selector: selector.into(),
            cap,
        }
    }

    /// Selector in use
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Maximum number of elements returned
    pub fn cap(&self) -> usize {
        self.cap
    }

    /// The first `cap` matching elements; any query failure is `CollectionFailure`
    pub async fn collect(&self, page: &dyn PageContext) -> Result<Vec<ElementHandle>, Error> {
        let mut handles = page
            .query_all(&self.selector, self.cap)
            .await
            .map_err(|e| match e {
                Error::CollectionFailure(_) => e,
                other => Error::collection_failure(other.to_string()),
            })?;

        if handles.len() > self.cap {
            debug!(matched = handles.len(), cap = self.cap, "Dropping elements beyond cap");
            handles.truncate(self.cap);
        }
        Ok(handles)
    }
}

impl Default for ElementCollector {
    fn default() -> Self {
        Self::new(DEFAULT_ELEMENT_SELECTOR, 150)
    }
}
