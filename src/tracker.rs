//! Issue tracker client
//!
//! Fetches Jira issues over the REST API v3 and pulls the acceptance criteria
//! out of a configurable field.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::TrackerConfig;
use crate::{Error, Result};

/// Acceptance criteria of one issue
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcceptanceCriteria {
    /// Issue key, e.g. "PROJ-123"
    pub issue: String,
    /// Raw field value; `null` when the field is missing
    pub acceptance_criteria: Value,
}

/// Value of `fields.<field>` in an issue document, `null` when absent
pub fn field_value(issue: &Value, field: &str) -> Value {
    issue
        .get("fields")
        .and_then(|fields| fields.get(field))
        .cloned()
        .unwrap_or(Value::Null)
}

/// Jira REST client
#[derive(Debug, Clone)]
pub struct JiraClient {
    base_url: String,
    email: String,
    token: String,
    ac_field: String,
    http: reqwest::Client,
}

impl JiraClient {
    /// Create a client
    pub fn new<S: Into<String>>(base_url: S, email: S, token: S, ac_field: S) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            email: email.into(),
            token: token.into(),
            ac_field: ac_field.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Client from configuration; `Ok(None)` when no tracker is configured
    pub fn from_config(config: &TrackerConfig) -> Result<Option<Self>> {
        let Some(base_url) = &config.base_url else {
            return Ok(None);
        };
        let email = config
            .email
            .clone()
            .ok_or_else(|| Error::configuration("JIRA_EMAIL is required when JIRA_URL is set"))?;
        let token = config
            .token
            .clone()
            .ok_or_else(|| Error::configuration("JIRA_TOKEN is required when JIRA_URL is set"))?;

        Ok(Some(Self::new(
            base_url.clone(),
            email,
            token,
            config.ac_field.clone(),
        )))
    }

    /// Field read by [`JiraClient::acceptance_criteria`]
    pub fn ac_field(&self) -> &str {
        &self.ac_field
    }

    /// Full issue document
    #[instrument(skip(self))]
    pub async fn get_issue(&self, issue_id: &str) -> Result<Value> {
        let url = format!(
            "{}/rest/api/3/issue/{}",
            self.base_url,
            urlencoding::encode(issue_id)
        );
        debug!("Fetching {}", url);

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.email, Some(&self.token))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| Error::tracker(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::tracker(format!("Failed: {}: {}", status.as_u16(), body)));
        }

        response
            .json()
            .await
            .map_err(|e| Error::tracker(format!("Invalid issue document: {}", e)))
    }

    /// Acceptance criteria of `issue_id`
    pub async fn acceptance_criteria(&self, issue_id: &str) -> Result<AcceptanceCriteria> {
        let issue = self.get_issue(issue_id).await?;
        Ok(AcceptanceCriteria {
            issue: issue_id.to_string(),
            acceptance_criteria: field_value(&issue, &self.ac_field),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_value() {
        let issue = json!({
            "key": "PROJ-1",
            "fields": { "description": "Given a user", "customfield_10041": null }
        });

        assert_eq!(field_value(&issue, "description"), json!("Given a user"));
        assert_eq!(field_value(&issue, "customfield_10041"), Value::Null);
        assert_eq!(field_value(&issue, "missing"), Value::Null);
        assert_eq!(field_value(&json!({}), "description"), Value::Null);
    }

    #[test]
    fn test_from_config() {
        assert!(JiraClient::from_config(&TrackerConfig::default()).unwrap().is_none());

        let partial = TrackerConfig {
            base_url: Some("https://example.atlassian.net".to_string()),
            ..TrackerConfig::default()
        };
        assert!(matches!(JiraClient::from_config(&partial), Err(Error::Configuration(_))));

        let full = TrackerConfig {
            base_url: Some("https://example.atlassian.net/".to_string()),
            email: Some("qa@example.com".to_string()),
            token: Some("secret".to_string()),
            ..TrackerConfig::default()
        };
        let client = JiraClient::from_config(&full).unwrap().unwrap();
        assert_eq!(client.ac_field(), "description");
    }

    #[tokio::test]
    async fn test_unreachable_tracker() {
        let client = JiraClient::new("http://127.0.0.1:1", "qa@example.com", "secret", "description");
        let result = client.get_issue("PROJ-1").await;
        assert!(matches!(result, Err(Error::Tracker(_))));
    }
}
