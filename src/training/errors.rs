use std::fmt::Debug;

use aws_sdk_sagemaker::error::{DisplayErrorContext, SdkError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("unsupported region: {0}")]
    UnsupportedRegion(String),
    /// Carries the service's failure reason verbatim.
    #[error("{0}")]
    JobFailed(String),
    #[error("training job {0} ended without completing")]
    JobStopped(String),
    #[error("training job {job_name} still running after {attempts} status checks")]
    WaitTimedOut { job_name: String, attempts: u32 },
    #[error("{0}")]
    Service(String),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to deliver response: {0}")]
    ResponseDelivery(#[from] reqwest::Error),
}

impl<E, R> From<SdkError<E, R>> for ResourceError
where
    E: std::error::Error + 'static,
    R: Debug,
{
    fn from(err: SdkError<E, R>) -> Self {
        ResourceError::Service(DisplayErrorContext(&err).to_string())
    }
}
