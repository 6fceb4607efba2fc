use std::time::{Duration, SystemTime, UNIX_EPOCH};

use aws_config::BehaviorVersion;
use chrono::Utc;
use lambda_runtime::{service_fn, Error as LambdaError, LambdaEvent};
use tracing::{error, info};

mod common;
mod training;

use crate::common::utils::init_tracing;
use crate::training::resource::{send_response, CustomResourceRequest, CustomResourceResponse};
use crate::training::service::{SageMakerTrainingService, TrainingService};
use crate::training::{handle_request, Settings};

/// Time left before the platform ends the invocation; `None` when no deadline is set.
fn remaining_time(deadline_ms: u64) -> Option<Duration> {
    if deadline_ms == 0 {
        return None;
    }
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|now| now.as_millis() as u64)
        .unwrap_or_default();

    Some(Duration::from_millis(deadline_ms.saturating_sub(now_ms)))
}

async fn process_event(
    event: LambdaEvent<CustomResourceRequest>,
    service: &dyn TrainingService,
    settings: &Settings,
    http_client: &reqwest::Client,
) -> Result<(), LambdaError> {
    let LambdaEvent {
        payload: request,
        context,
    } = event;

    let mut policy = settings.wait_policy();
    if let Some(remaining) = remaining_time(context.deadline) {
        policy = policy.within(remaining);
    }

    let result = handle_request(&request, service, settings, &policy, Utc::now()).await;
    match &result {
        Ok(outcome) => info!("Resource ready: {}", outcome.physical_resource_id),
        Err(err) => error!("Resource operation failed: {}", err),
    }

    let response = CustomResourceResponse::new(&request, result);
    send_response(http_client, &request.response_url, &response).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    init_tracing();

    let settings = Settings::from_env()?;
    info!("Training jobs will run in {}", settings.region);

    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let service = SageMakerTrainingService::new(aws_sdk_sagemaker::Client::new(&aws_config));
    let http_client = reqwest::Client::new();

    let (service, settings, http_client) = (&service, &settings, &http_client);
    lambda_runtime::run(service_fn(
        move |event: LambdaEvent<CustomResourceRequest>| async move {
            process_event(event, service, settings, http_client).await
        },
    ))
    .await
}
