use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::errors::ResourceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum RequestType {
    Create,
    Update,
    Delete,
}

/// Custom-resource event sent by CloudFormation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceRequest {
    pub request_type: RequestType,
    #[serde(rename = "ResponseURL")]
    pub response_url: String,
    pub stack_id: String,
    pub request_id: String,
    pub resource_type: String,
    pub logical_resource_id: String,
    #[serde(default)]
    pub physical_resource_id: Option<String>,
    // Kept raw so malformed properties are reported back instead of failing the invocation.
    #[serde(default)]
    pub resource_properties: serde_json::Value,
    #[serde(default)]
    pub old_resource_properties: Option<serde_json::Value>,
}

impl CustomResourceRequest {
    /// Identifier of the resource this request refers to, if one was ever assigned.
    pub fn existing_resource_id(&self) -> String {
        self.physical_resource_id
            .clone()
            .unwrap_or_else(|| self.request_id.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseData {
    pub data_output: String,
    pub job_name: String,
}

/// Result of a handled operation, before it is addressed to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceOutcome {
    pub physical_resource_id: String,
    pub data: Option<ResponseData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceResponse {
    pub status: ResponseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub physical_resource_id: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    pub no_echo: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl CustomResourceResponse {
    pub fn new(
        request: &CustomResourceRequest,
        result: Result<ResourceOutcome, ResourceError>,
    ) -> Self {
        let (status, reason, physical_resource_id, data) = match result {
            Ok(outcome) => (
                ResponseStatus::Success,
                None,
                outcome.physical_resource_id,
                outcome.data,
            ),
            Err(err) => (
                ResponseStatus::Failed,
                Some(err.to_string()),
                request.existing_resource_id(),
                None,
            ),
        };

        Self {
            status,
            reason,
            physical_resource_id,
            stack_id: request.stack_id.clone(),
            request_id: request.request_id.clone(),
            logical_resource_id: request.logical_resource_id.clone(),
            no_echo: false,
            data,
        }
    }
}

/// Uploads `response` to the presigned URL CloudFormation waits on.
pub async fn send_response(
    http_client: &reqwest::Client,
    response_url: &str,
    response: &CustomResourceResponse,
) -> Result<(), ResourceError> {
    let body = serde_json::to_string(response)?;
    info!("Sending {:?} response for {}", response.status, response.logical_resource_id);

    // The presigned URL is signed without a content type.
    http_client
        .put(response_url)
        .header(CONTENT_TYPE, "")
        .body(body)
        .send()
        .await?
        .error_for_status()?;

    Ok(())
}
