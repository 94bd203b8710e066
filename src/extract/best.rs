//! Best-locator selection

use crate::extract::strategy::{LocatorCandidateSet, LocatorStrategy, DEFAULT_PRIORITY};

/// Total order over strategies; the first populated one wins
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestLocatorPolicy {
    order: Vec<LocatorStrategy>,
}

impl BestLocatorPolicy {
    /// Policy with a custom order; strategies left out are never chosen
    pub fn new(order: Vec<LocatorStrategy>) -> Self {
        Self { order }
    }

    /// Strategy order, highest first
    pub fn order(&self) -> &[LocatorStrategy] {
        &self.order
    }

    /// Highest-priority expression in `set`
    pub fn select_best(&self, set: &LocatorCandidateSet) -> Option<String> {
        self.order
            .iter()
            .find_map(|strategy| set.get(*strategy))
            .map(str::to_string)
    }
}

impl Default for BestLocatorPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_PRIORITY.to_vec())
    }
}
