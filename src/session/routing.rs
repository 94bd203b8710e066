//! Sub-request routing policy
//!
//! A declarative map from resource kind to allow/abort, consulted for every
//! request the page makes while it is being extracted.

use phf::phf_map;
use std::collections::BTreeSet;

/// Resource kinds as reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKind {
    Document,
    Stylesheet,
    Image,
    Media,
    Font,
    Script,
    TextTrack,
    Xhr,
    Fetch,
    EventSource,
    WebSocket,
    Manifest,
    Other,
}

/// CDP `Network.ResourceType` names
static RESOURCE_KINDS: phf::Map<&'static str, ResourceKind> = phf_map! {
    "Document" => ResourceKind::Document,
    "Stylesheet" => ResourceKind::Stylesheet,
    "Image" => ResourceKind::Image,
    "Media" => ResourceKind::Media,
    "Font" => ResourceKind::Font,
    "Script" => ResourceKind::Script,
    "TextTrack" => ResourceKind::TextTrack,
    "XHR" => ResourceKind::Xhr,
    "Fetch" => ResourceKind::Fetch,
    "EventSource" => ResourceKind::EventSource,
    "WebSocket" => ResourceKind::WebSocket,
    "Manifest" => ResourceKind::Manifest,
};

impl ResourceKind {
    /// Parse a CDP resource type; unknown names are `Other`
    pub fn from_cdp(name: &str) -> Self {
        RESOURCE_KINDS.get(name).copied().unwrap_or(ResourceKind::Other)
    }

    /// CDP resource type name
    pub const fn cdp_name(&self) -> &'static str {
        match self {
            ResourceKind::Document => "Document",
            ResourceKind::Stylesheet => "Stylesheet",
            ResourceKind::Image => "Image",
            ResourceKind::Media => "Media",
            ResourceKind::Font => "Font",
            ResourceKind::Script => "Script",
            ResourceKind::TextTrack => "TextTrack",
            ResourceKind::Xhr => "XHR",
            ResourceKind::Fetch => "Fetch",
            ResourceKind::EventSource => "EventSource",
            ResourceKind::WebSocket => "WebSocket",
            ResourceKind::Manifest => "Manifest",
            ResourceKind::Other => "Other",
        }
    }
}

/// Routing verdict for one sub-request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    Abort,
}

/// Per-kind routing policy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestPolicy {
    blocked: BTreeSet<ResourceKind>,
}

impl RequestPolicy {
    /// Let everything through
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Abort images, media and fonts; they never carry locator attributes
    pub fn block_heavy_resources() -> Self {
        Self::allow_all()
            .block(ResourceKind::Image)
            .block(ResourceKind::Media)
            .block(ResourceKind::Font)
    }

    /// Also abort `kind`; documents are never blocked
    pub fn block(mut self, kind: ResourceKind) -> Self {
        if kind != ResourceKind::Document {
            self.blocked.insert(kind);
        }
        self
    }

    /// Verdict for a sub-request of the given CDP resource type
    pub fn decide(&self, resource_type: &str) -> RouteDecision {
        if self.blocked.contains(&ResourceKind::from_cdp(resource_type)) {
            RouteDecision::Abort
        } else {
            RouteDecision::Allow
        }
    }

    /// Whether no request would ever be aborted
    pub fn is_allow_all(&self) -> bool {
        self.blocked.is_empty()
    }

    /// Kinds that are aborted
    pub fn blocked_kinds(&self) -> impl Iterator<Item = ResourceKind> + '_ {
        self.blocked.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_blocking_policy() {
        let policy = RequestPolicy::block_heavy_resources();

        assert_eq!(policy.decide("Image"), RouteDecision::Abort);
        assert_eq!(policy.decide("Font"), RouteDecision::Abort);
        assert_eq!(policy.decide("Media"), RouteDecision::Abort);
        assert_eq!(policy.decide("Script"), RouteDecision::Allow);
        assert_eq!(policy.decide("Document"), RouteDecision::Allow);
        assert_eq!(policy.decide("Ping"), RouteDecision::Allow);
    }

    #[test]
    fn test_document_never_blocked() {
        let policy = RequestPolicy::allow_all().block(ResourceKind::Document);
        assert!(policy.is_allow_all());
        assert_eq!(policy.decide("Document"), RouteDecision::Allow);
    }

    #[test]
    fn test_unknown_kind_blockable_as_other() {
        let policy = RequestPolicy::allow_all().block(ResourceKind::Other);
        assert_eq!(policy.decide("Ping"), RouteDecision::Abort);
        assert_eq!(policy.decide("XHR"), RouteDecision::Allow);
    }
}
