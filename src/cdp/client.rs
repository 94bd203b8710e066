//! CDP client implementation
//!
//! This module provides a page-level CDP client with typed methods for common operations.

use super::traits::*;
use super::types::*;
use crate::Error;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// CDP client implementation
#[derive(Debug, Clone)]
pub struct CdpClientImpl {
    /// Underlying CDP connection
    connection: Arc<dyn CdpConnection>,
}

impl CdpClientImpl {
    /// Create a new CDP client
    ///
    /// # Arguments
    /// * `connection` - CDP connection instance
    pub fn new(connection: Arc<dyn CdpConnection>) -> Self {
        Self { connection }
    }

    /// Parse remote object value to evaluation result
    fn parse_remote_object(obj: &RemoteObject) -> EvaluationResult {
        match obj.r#type.as_str() {
            "string" => EvaluationResult::String(
                obj.value
                    .as_ref()
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string(),
            ),
            "number" => EvaluationResult::Number(obj.value.as_ref().and_then(|v| v.as_f64()).unwrap_or(0.0)),
            "boolean" => EvaluationResult::Bool(obj.value.as_ref().and_then(|v| v.as_bool()).unwrap_or(false)),
            "object" => match &obj.value {
                Some(serde_json::Value::Null) | None => EvaluationResult::Null,
                Some(value) => EvaluationResult::Object(value.clone()),
            },
            _ => EvaluationResult::Null,
        }
    }

    /// Decode a `Runtime.*` response, turning a thrown exception into an error
    fn decode_evaluation(result: serde_json::Value) -> Result<RemoteObject, Error> {
        let response: EvaluateResponse = serde_json::from_value(result)
            .map_err(|e| Error::cdp(format!("Failed to parse evaluation response: {}", e)))?;

        if let Some(exception) = response.exception_details {
            return Err(Error::script_execution_failed(exception.message()));
        }
        Ok(response.result)
    }
}

#[async_trait]
impl CdpClient for CdpClientImpl {
    fn connection(&self) -> Arc<dyn CdpConnection> {
        Arc::clone(&self.connection)
    }

    async fn navigate(&self, url: &str) -> Result<NavigationResult, Error> {
        info!("Navigating to {}", url);

        let params = NavigateParams {
            url: url.to_string(),
            referrer: None,
            transition_type: None,
        };

        let result = self
            .call_method("Page.navigate", serde_json::to_value(params)?)
            .await?;
        let response: NavigateResponse = serde_json::from_value(result)
            .map_err(|e| Error::cdp(format!("Failed to parse Page.navigate response: {}", e)))?;

        Ok(NavigationResult {
            frame_id: response.frame_id,
            url: url.to_string(),
            error_text: response.error_text.filter(|text| !text.is_empty()),
        })
    }

    async fn ready_state(&self) -> Result<String, Error> {
        match self.evaluate("document.readyState", false).await? {
            EvaluationResult::String(state) => Ok(state),
            other => Err(Error::cdp(format!("Unexpected document.readyState value: {:?}", other))),
        }
    }

    async fn evaluate(&self, script: &str, await_promise: bool) -> Result<EvaluationResult, Error> {
        debug!("Evaluating script: {}", script);

        let params = EvaluateParams {
            expression: script.to_string(),
            await_promise: Some(await_promise),
            return_by_value: Some(true),
            object_group: None,
        };

        let result = self
            .call_method("Runtime.evaluate", serde_json::to_value(params)?)
            .await?;
        let remote_obj = Self::decode_evaluation(result)?;

        Ok(Self::parse_remote_object(&remote_obj))
    }

    async fn evaluate_handle(&self, script: &str, object_group: &str) -> Result<Option<String>, Error> {
        let params = EvaluateParams {
            expression: script.to_string(),
            await_promise: Some(false),
            return_by_value: Some(false),
            object_group: Some(object_group.to_string()),
        };

        let result = self
            .call_method("Runtime.evaluate", serde_json::to_value(params)?)
            .await?;

        Ok(Self::decode_evaluation(result)?.object_id)
    }

    async fn get_properties(&self, object_id: &str) -> Result<Vec<(String, Option<String>)>, Error> {
        let result = self
            .call_method(
                "Runtime.getProperties",
                serde_json::json!({ "objectId": object_id, "ownProperties": true }),
            )
            .await?;

        let response: GetPropertiesResponse = serde_json::from_value(result)
            .map_err(|e| Error::cdp(format!("Failed to parse Runtime.getProperties response: {}", e)))?;

        Ok(response
            .result
            .into_iter()
            .map(|property| (property.name, property.value.and_then(|v| v.object_id)))
            .collect())
    }

    async fn call_function_on(
        &self,
        object_id: &str,
        function: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, Error> {
        let params = CallFunctionOnParams {
            function_declaration: function.to_string(),
            object_id: object_id.to_string(),
            arguments: args.into_iter().map(|value| CallArgument { value }).collect(),
            return_by_value: true,
            await_promise: false,
        };

        let result = self
            .call_method("Runtime.callFunctionOn", serde_json::to_value(params)?)
            .await?;

        Ok(Self::decode_evaluation(result)?
            .value
            .unwrap_or(serde_json::Value::Null))
    }

    async fn release_object_group(&self, object_group: &str) -> Result<(), Error> {
        self.call_method(
            "Runtime.releaseObjectGroup",
            serde_json::json!({ "objectGroup": object_group }),
        )
        .await?;
        Ok(())
    }

    async fn enable_domain(&self, domain: &str) -> Result<(), Error> {
        debug!("Enabling domain: {}", domain);
        self.call_method(&format!("{}.enable", domain), serde_json::json!({}))
            .await?;
        Ok(())
    }

    async fn call_method(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value, Error> {
        let response = self.connection.send_command(method, params).await?;

        response.result.ok_or_else(|| Error::cdp("No result in response"))
    }

    async fn subscribe_events(&self, event_type: &str) -> Result<tokio::sync::mpsc::Receiver<CdpEvent>, Error> {
        let mut event_receiver = self.connection.listen_events().await?;

        // Filter events by type
        let (tx, rx) = tokio::sync::mpsc::channel(100);
        let filter_event_type = event_type.to_string();

        tokio::spawn(async move {
            while let Some(event) = event_receiver.recv().await {
                if (event.method == filter_event_type || filter_event_type == "*")
                    && tx.send(event).await.is_err()
                {
                    break;
                }
            }
        });

        Ok(rx)
    }
}
