//! Attribute batch extraction
//!
//! Reads every locator-relevant attribute of an element in a single
//! `Runtime.callFunctionOn` round trip.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::extract::scripts::EXTRACT_ATTRIBUTES_SCRIPT;
use crate::session::{ElementHandle, PageContext};
use crate::Error;

/// Locator-relevant attributes of one element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttributeBundle {
    /// Lowercase tag name
    pub tag: String,
    pub id: Option<String>,
    /// Class tokens, whitespace split
    pub classes: Vec<String>,
    pub role: Option<String>,
    pub placeholder: Option<String>,
    /// `data-testid`
    pub test_id: Option<String>,
    pub title: Option<String>,
    /// `name` attribute
    pub name: Option<String>,
    pub alt: Option<String>,
    /// Trimmed visible text, only when shorter than the snippet limit
    pub text: Option<String>,
}

/// Shape returned by the in-page script
///
/// A field that is not a string (a DOM node serialized as `{}`, say) reads as
/// absent instead of failing the whole element.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAttributes {
    #[serde(default, deserialize_with = "string_or_none")]
    tag: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    id: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    class: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    role: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    placeholder: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    test_id: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    title: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    name: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    alt: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    text: Option<String>,
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(value) => Some(value),
        _ => None,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl AttributeBundle {
    /// Normalize the script's JSON result
    ///
    /// Empty attributes become absent, and text is dropped unless its trimmed
    /// length is below `text_max_len` characters.
    pub fn from_value(value: Value, text_max_len: usize) -> Result<Self, Error> {
        if value.is_null() {
            return Err(Error::extraction_failed("Element is detached from the document"));
        }

        let raw: RawAttributes = serde_json::from_value(value)
            .map_err(|e| Error::extraction_failed(format!("Unexpected attribute payload: {}", e)))?;

        let tag = non_empty(raw.tag)
            .map(|tag| tag.to_ascii_lowercase())
            .ok_or_else(|| Error::extraction_failed("Attribute payload has no tag"))?;

        let classes = raw
            .class
            .map(|class| class.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        let text = raw
            .text
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty() && text.chars().count() < text_max_len);

        Ok(Self {
            tag,
            id: non_empty(raw.id),
            classes,
            role: non_empty(raw.role),
            placeholder: non_empty(raw.placeholder),
            test_id: non_empty(raw.test_id),
            title: non_empty(raw.title),
            name: non_empty(raw.name),
            alt: non_empty(raw.alt),
            text,
        })
    }
}

/// Reads [`AttributeBundle`]s, one bounded round trip per element
#[derive(Debug, Clone)]
pub struct AttributeExtractor {
    text_max_len: usize,
    timeout: Duration,
}

impl AttributeExtractor {
    /// Create an extractor
    pub fn new(text_max_len: usize, timeout: Duration) -> Self {
        Self {
            text_max_len,
            timeout,
        }
    }

    /// Attributes of `element`; every failure is `ExtractionFailed`
    pub async fn extract(
        &self,
        page: &dyn PageContext,
        element: &ElementHandle,
    ) -> Result<AttributeBundle, Error> {
        let call = page.evaluate_on(
            element,
            EXTRACT_ATTRIBUTES_SCRIPT,
            vec![Value::from(self.text_max_len)],
        );

        let value = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => value,
            Ok(Err(e)) => return Err(Error::extraction_failed(e.to_string())),
            Err(_) => {
                return Err(Error::extraction_failed(format!(
                    "No attributes within {}ms",
                    self.timeout.as_millis()
                )))
            }
        };

        AttributeBundle::from_value(value, self.text_max_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::mock::{element_json, MockElement, MockPage, MockPageScript};
    use serde_json::json;

    #[test]
    fn test_from_value_normalizes() {
        let bundle = AttributeBundle::from_value(
            json!({
                "tag": "BUTTON",
                "id": "",
                "class": "  btn   primary ",
                "role": null,
                "testId": "go-btn",
                "text": "  Go  "
            }),
            40,
        )
        .unwrap();

        assert_eq!(bundle.tag, "button");
        assert_eq!(bundle.id, None);
        assert_eq!(bundle.classes, vec!["btn", "primary"]);
        assert_eq!(bundle.test_id.as_deref(), Some("go-btn"));
        assert_eq!(bundle.text.as_deref(), Some("Go"));
    }

    #[test]
    fn test_long_text_dropped() {
        let at_limit = "x".repeat(40);
        let bundle = AttributeBundle::from_value(json!({ "tag": "p", "text": at_limit }), 40).unwrap();
        assert_eq!(bundle.text, None);

        let below = "x".repeat(39);
        let bundle = AttributeBundle::from_value(json!({ "tag": "p", "text": below }), 40).unwrap();
        assert_eq!(bundle.text.map(|t| t.chars().count()), Some(39));
    }

    #[test]
    fn test_text_limit_counts_characters() {
        let text = "é".repeat(30);
        let bundle = AttributeBundle::from_value(json!({ "tag": "a", "text": text }), 40).unwrap();
        assert!(bundle.text.is_some());
    }

    #[test]
    fn test_detached_and_malformed() {
        assert!(matches!(
            AttributeBundle::from_value(Value::Null, 40),
            Err(Error::ExtractionFailed(_))
        ));
        assert!(matches!(
            AttributeBundle::from_value(json!({ "id": "x" }), 40),
            Err(Error::ExtractionFailed(_))
        ));
        assert!(matches!(
            AttributeBundle::from_value(json!("button"), 40),
            Err(Error::ExtractionFailed(_))
        ));
    }

    #[test]
    fn test_non_string_field_reads_as_absent() {
        // <form name="login"> holding <input name="id">
        let bundle = AttributeBundle::from_value(
            json!({ "tag": "form", "id": {}, "class": {}, "name": "login" }),
            40,
        )
        .unwrap();

        assert_eq!(bundle.tag, "form");
        assert_eq!(bundle.id, None);
        assert!(bundle.classes.is_empty());
        assert_eq!(bundle.name.as_deref(), Some("login"));
    }

    #[tokio::test]
    async fn test_extract_from_page() {
        let page = MockPage::new(
            "session",
            MockPageScript::new().with("input", &[("placeholder", "Search"), ("name", "q")]),
        );
        let handles = page.query_all("input", 10).await.unwrap();
        let extractor = AttributeExtractor::new(40, Duration::from_millis(500));

        let bundle = extractor.extract(&page, &handles[0]).await.unwrap();
        assert_eq!(bundle.tag, "input");
        assert_eq!(bundle.placeholder.as_deref(), Some("Search"));
        assert_eq!(bundle.name.as_deref(), Some("q"));
    }

    #[tokio::test]
    async fn test_hung_element_times_out() {
        let page = MockPage::new("session", MockPageScript::new().element(MockElement::Hang));
        let handles = page.query_all("*", 10).await.unwrap();
        let extractor = AttributeExtractor::new(40, Duration::from_millis(50));

        let result = extractor.extract(&page, &handles[0]).await;
        assert!(matches!(result, Err(Error::ExtractionFailed(msg)) if msg.contains("50ms")));
    }

    #[tokio::test]
    async fn test_detached_element_fails() {
        let page = MockPage::new(
            "session",
            MockPageScript::new()
                .element(MockElement::Detached)
                .element(MockElement::Attributes(element_json("a", &[]))),
        );
        let handles = page.query_all("a", 10).await.unwrap();
        let extractor = AttributeExtractor::new(40, Duration::from_millis(500));

        assert!(extractor.extract(&page, &handles[0]).await.is_err());
        assert!(extractor.extract(&page, &handles[1]).await.is_ok());
    }
}
