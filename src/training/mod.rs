pub mod errors;
pub mod job;
pub mod registry;
pub mod resource;
pub mod service;
pub mod waiter;

#[cfg(test)]
mod fake;

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use lambda_runtime::Error as LambdaError;
use tracing::info;

use crate::common::utils::required_env;

use self::errors::ResourceError;
use self::job::{artifact_path, job_name, JobStatus, ResourceProperties, TrainingJobRequest};
use self::resource::{CustomResourceRequest, RequestType, ResourceOutcome, ResponseData};
use self::service::TrainingService;
use self::waiter::{wait_for_completion, WaitPolicy};

const REGION_VAR: &str = "AWS_REGION";
const POLL_INTERVAL_VAR: &str = "POLL_INTERVAL_SECS";
const MAX_POLL_ATTEMPTS_VAR: &str = "MAX_POLL_ATTEMPTS";

const POLL_INTERVAL_SECS_DEFAULT: u64 = 30;

/// Reads and parses `name`, falling back to `default` when it is unset.
fn env_or<T>(name: &str, default: T) -> Result<T, LambdaError>
where
    T: FromStr,
    T::Err: Display,
{
    Ok(optional_env(name)?.unwrap_or(default))
}

fn optional_env<T>(name: &str) -> Result<Option<T>, LambdaError>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|err| format!("{name}={value}: {err}").into()),
        Err(_) => Ok(None),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub region: String,
    pub poll_interval: Duration,
    pub max_poll_attempts: Option<u32>,
}

impl Settings {
    pub fn from_env() -> Result<Self, LambdaError> {
        Ok(Self {
            region: required_env(REGION_VAR)?,
            poll_interval: Duration::from_secs(env_or(
                POLL_INTERVAL_VAR,
                POLL_INTERVAL_SECS_DEFAULT,
            )?),
            max_poll_attempts: optional_env(MAX_POLL_ATTEMPTS_VAR)?,
        })
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy::new(self.poll_interval, self.max_poll_attempts)
    }
}

async fn create_resource<S>(
    request: &CustomResourceRequest,
    service: &S,
    settings: &Settings,
    policy: &WaitPolicy,
    started_at: DateTime<Utc>,
) -> Result<ResourceOutcome, ResourceError>
where
    S: TrainingService + ?Sized,
{
    let properties: ResourceProperties = serde_json::from_value(request.resource_properties.clone())?;
    let image = registry::training_image(&settings.region)?;
    let job = TrainingJobRequest::new(job_name(started_at), image, properties);

    info!("Creating training job {} with image {}", job.name, job.image);
    service.create_training_job(&job).await?;

    let description = wait_for_completion(service, &job.name, policy).await?;
    match description.status {
        JobStatus::Completed => {}
        JobStatus::Failed => {
            return Err(ResourceError::JobFailed(
                description
                    .failure_reason
                    .unwrap_or_else(|| format!("training job {} failed", job.name)),
            ))
        }
        _ => return Err(ResourceError::JobStopped(job.name)),
    }

    let output_path = description.output_path.unwrap_or(job.output);
    info!("Training output written to {}", output_path);
    for (name, value) in &description.metrics {
        info!("{}: {}", name, value);
    }

    Ok(ResourceOutcome {
        data: Some(ResponseData {
            data_output: artifact_path(&output_path, &job.name),
            job_name: job.name,
        }),
        physical_resource_id: output_path,
    })
}

/// Runs the create, update or delete operation named by `request`.
///
/// Updates launch a fresh job exactly like creates. Deletes touch nothing
/// remote: finished training jobs cannot be removed.
#[tracing::instrument(skip_all, fields(request_type = ?request.request_type, resource = %request.logical_resource_id))]
pub async fn handle_request<S>(
    request: &CustomResourceRequest,
    service: &S,
    settings: &Settings,
    policy: &WaitPolicy,
    started_at: DateTime<Utc>,
) -> Result<ResourceOutcome, ResourceError>
where
    S: TrainingService + ?Sized,
{
    info!("Handling {} request", request.resource_type);
    match request.request_type {
        RequestType::Create => create_resource(request, service, settings, policy, started_at).await,
        RequestType::Update => {
            info!(
                "Relaunching training job, previous properties: {:?}",
                request.old_resource_properties
            );
            create_resource(request, service, settings, policy, started_at).await
        }
        RequestType::Delete => Ok(ResourceOutcome {
            physical_resource_id: request.existing_resource_id(),
            data: None,
        }),
    }
}
