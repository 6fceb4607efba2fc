use async_trait::async_trait;
use aws_sdk_sagemakerruntime::error::DisplayErrorContext;
use aws_sdk_sagemakerruntime::operation::invoke_endpoint::InvokeEndpointError;
use aws_sdk_sagemakerruntime::primitives::Blob;
use thiserror::Error;

pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("model returned status {status}: {message}")]
    Model { status: i32, message: String },
    #[error("endpoint returned an empty response")]
    EmptyResponse,
    #[error("{0}")]
    Service(String),
}

/// A hosted model that accepts a JSON payload and answers with a prediction.
#[async_trait]
pub trait InferenceEndpoint: Send + Sync {
    fn name(&self) -> &str;

    async fn invoke(&self, payload: Vec<u8>) -> Result<Prediction, InvokeError>;
}

/// Errors raised by the model container itself, as opposed to the endpoint.
fn model_failure(err: &InvokeEndpointError) -> Option<InvokeError> {
    match err {
        InvokeEndpointError::ModelError(model_error) => Some(InvokeError::Model {
            status: model_error.original_status_code().unwrap_or_default(),
            message: model_error.original_message().unwrap_or_default().to_owned(),
        }),
        _ => None,
    }
}

pub struct SageMakerEndpoint {
    client: aws_sdk_sagemakerruntime::Client,
    endpoint_name: String,
}

impl SageMakerEndpoint {
    pub fn new(client: aws_sdk_sagemakerruntime::Client, endpoint_name: impl Into<String>) -> Self {
        Self {
            client,
            endpoint_name: endpoint_name.into(),
        }
    }
}

#[async_trait]
impl InferenceEndpoint for SageMakerEndpoint {
    fn name(&self) -> &str {
        &self.endpoint_name
    }

    async fn invoke(&self, payload: Vec<u8>) -> Result<Prediction, InvokeError> {
        let output = self
            .client
            .invoke_endpoint()
            .endpoint_name(&self.endpoint_name)
            .content_type(JSON_CONTENT_TYPE)
            .accept(JSON_CONTENT_TYPE)
            .body(Blob::new(payload))
            .send()
            .await
            .map_err(|err| {
                err.as_service_error()
                    .and_then(model_failure)
                    .unwrap_or_else(|| InvokeError::Service(DisplayErrorContext(&err).to_string()))
            })?;

        let body = output
            .body
            .map(Blob::into_inner)
            .ok_or(InvokeError::EmptyResponse)?;

        Ok(Prediction {
            content_type: output.content_type,
            body,
        })
    }
}
