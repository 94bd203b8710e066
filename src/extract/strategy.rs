//! Locator strategies
//!
//! Turns an [`AttributeBundle`] into every locator expression it supports.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::extract::attributes::AttributeBundle;

/// A way of re-finding an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocatorStrategy {
    /// `data-testid` value
    TestId,
    /// `#id`
    Id,
    /// `<role>[name='<text>']`
    Role,
    /// `placeholder` value
    Placeholder,
    /// `name` attribute value
    Label,
    /// `title` value
    Title,
    /// `alt` value
    Alt,
    /// Short visible text
    Text,
    /// `//*[text()='<text>']`
    XPath,
    /// `<tag>.<class1>.<class2>`
    Css,
}

/// Default best-locator order, most stable first
pub const DEFAULT_PRIORITY: [LocatorStrategy; 10] = [
    LocatorStrategy::TestId,
    LocatorStrategy::Id,
    LocatorStrategy::Role,
    LocatorStrategy::Placeholder,
    LocatorStrategy::Label,
    LocatorStrategy::Title,
    LocatorStrategy::Alt,
    LocatorStrategy::Text,
    LocatorStrategy::Css,
    LocatorStrategy::XPath,
];

impl LocatorStrategy {
    /// Key used in records and configuration
    pub const fn key(&self) -> &'static str {
        match self {
            LocatorStrategy::TestId => "testid",
            LocatorStrategy::Id => "id",
            LocatorStrategy::Role => "role",
            LocatorStrategy::Placeholder => "placeholder",
            LocatorStrategy::Label => "label",
            LocatorStrategy::Title => "title",
            LocatorStrategy::Alt => "alt",
            LocatorStrategy::Text => "text",
            LocatorStrategy::XPath => "xpath",
            LocatorStrategy::Css => "css",
        }
    }

    /// Parse a key, ignoring case and surrounding whitespace
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_ascii_lowercase();
        DEFAULT_PRIORITY.iter().copied().find(|strategy| strategy.key() == key)
    }
}

impl std::fmt::Display for LocatorStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Locator expressions keyed by strategy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocatorCandidateSet(BTreeMap<LocatorStrategy, String>);

impl LocatorCandidateSet {
    /// Expression for `strategy`, if the element supports it
    pub fn get(&self, strategy: LocatorStrategy) -> Option<&str> {
        self.0.get(&strategy).map(String::as_str)
    }

    /// Number of populated strategies
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no strategy applies
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Populated strategies and their expressions
    pub fn iter(&self) -> impl Iterator<Item = (LocatorStrategy, &str)> {
        self.0.iter().map(|(strategy, expression)| (*strategy, expression.as_str()))
    }

    fn insert(&mut self, strategy: LocatorStrategy, expression: String) {
        self.0.insert(strategy, expression);
    }
}

/// Every locator the bundle supports; never fails
///
/// Attribute values are substituted verbatim, quotes included.
pub fn build(bundle: &AttributeBundle) -> LocatorCandidateSet {
    let mut set = LocatorCandidateSet::default();

    if let Some(test_id) = &bundle.test_id {
        set.insert(LocatorStrategy::TestId, test_id.clone());
    }
    if let Some(id) = &bundle.id {
        set.insert(LocatorStrategy::Id, format!("#{}", id));
    }
    if let (Some(role), Some(text)) = (&bundle.role, &bundle.text) {
        set.insert(LocatorStrategy::Role, format!("{}[name='{}']", role, text));
    }
    if let Some(placeholder) = &bundle.placeholder {
        set.insert(LocatorStrategy::Placeholder, placeholder.clone());
    }
    if let Some(name) = &bundle.name {
        set.insert(LocatorStrategy::Label, name.clone());
    }
    if let Some(title) = &bundle.title {
        set.insert(LocatorStrategy::Title, title.clone());
    }
    if let Some(alt) = &bundle.alt {
        set.insert(LocatorStrategy::Alt, alt.clone());
    }
    if let Some(text) = &bundle.text {
        set.insert(LocatorStrategy::Text, text.clone());
        set.insert(LocatorStrategy::XPath, format!("//*[text()='{}']", text));
    }
    if !bundle.classes.is_empty() {
        set.insert(
            LocatorStrategy::Css,
            format!("{}.{}", bundle.tag, bundle.classes.join(".")),
        );
    }

    set
}
