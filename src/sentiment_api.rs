use aws_config::BehaviorVersion;
use lambda_http::{run, service_fn, Error as LambdaError, Request as LambdaRequest};
use tracing::info;

mod common;
mod inference;

use crate::common::utils::{init_tracing, required_env};
use crate::inference::endpoint::SageMakerEndpoint;

const ENDPOINT_NAME_VAR: &str = "ENDPOINT_NAME";

#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    init_tracing();

    let endpoint_name = required_env(ENDPOINT_NAME_VAR)?;
    info!("Serving predictions from endpoint {}", endpoint_name);

    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let endpoint = SageMakerEndpoint::new(
        aws_sdk_sagemakerruntime::Client::new(&aws_config),
        endpoint_name,
    );
    let endpoint = &endpoint;

    run(service_fn(move |request: LambdaRequest| async move {
        inference::handle(request, endpoint).await
    }))
    .await
}
