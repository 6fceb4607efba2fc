use async_trait::async_trait;
use aws_sdk_sagemaker::operation::create_training_job::builders::CreateTrainingJobFluentBuilder;
use aws_sdk_sagemaker::types::{
    AlgorithmSpecification, Channel, DataSource, MetricData, OutputDataConfig, ResourceConfig,
    S3DataDistribution, S3DataSource, S3DataType, SecondaryStatus, StoppingCondition,
    TrainingInputMode, TrainingInstanceType, TrainingJobStatus,
};
use tracing::info;

use super::errors::ResourceError;
use super::job::{
    JobDescription, JobStatus, TrainingJobRequest, CHANNEL_CONTENT_TYPE, HYPERPARAMETERS,
    INSTANCE_COUNT, MAX_RUNTIME_SECS, VOLUME_SIZE_GB,
};

/// Remote service that runs training jobs.
#[async_trait]
pub trait TrainingService: Send + Sync {
    async fn create_training_job(&self, request: &TrainingJobRequest) -> Result<(), ResourceError>;

    async fn describe_training_job(&self, job_name: &str) -> Result<JobDescription, ResourceError>;
}

pub struct SageMakerTrainingService {
    client: aws_sdk_sagemaker::Client,
}

impl SageMakerTrainingService {
    pub fn new(client: aws_sdk_sagemaker::Client) -> Self {
        Self { client }
    }
}

fn s3_channel(name: &str, location: &str) -> Channel {
    let source = S3DataSource::builder()
        .s3_data_type(S3DataType::S3Prefix)
        .s3_data_distribution_type(S3DataDistribution::FullyReplicated)
        .s3_uri(location)
        .build();

    Channel::builder()
        .channel_name(name)
        .content_type(CHANNEL_CONTENT_TYPE)
        .data_source(DataSource::builder().s3_data_source(source).build())
        .build()
}

/// Fills a `CreateTrainingJob` call with the fixed BlazingText job shape.
fn with_training_job(
    builder: CreateTrainingJobFluentBuilder,
    request: &TrainingJobRequest,
) -> CreateTrainingJobFluentBuilder {
    let algorithm = AlgorithmSpecification::builder()
        .training_image(&request.image)
        .training_input_mode(TrainingInputMode::File)
        .build();
    let resources = ResourceConfig::builder()
        .instance_count(INSTANCE_COUNT)
        .instance_type(TrainingInstanceType::MlC54Xlarge)
        .volume_size_in_gb(VOLUME_SIZE_GB)
        .build();
    let stopping_condition = StoppingCondition::builder()
        .max_runtime_in_seconds(MAX_RUNTIME_SECS)
        .build();
    let output = OutputDataConfig::builder()
        .s3_output_path(&request.output)
        .build();

    let mut builder = builder
        .training_job_name(&request.name)
        .algorithm_specification(algorithm)
        .role_arn(&request.role_arn)
        .resource_config(resources)
        .stopping_condition(stopping_condition)
        .output_data_config(output);
    for (key, value) in HYPERPARAMETERS {
        builder = builder.hyper_parameters(*key, *value);
    }
    for (name, location) in request.channels() {
        builder = builder.input_data_config(s3_channel(name, location));
    }

    builder
}

impl From<&TrainingJobStatus> for JobStatus {
    fn from(status: &TrainingJobStatus) -> Self {
        match status {
            TrainingJobStatus::InProgress => JobStatus::InProgress,
            TrainingJobStatus::Stopping => JobStatus::Stopping,
            TrainingJobStatus::Completed => JobStatus::Completed,
            TrainingJobStatus::Failed => JobStatus::Failed,
            TrainingJobStatus::Stopped => JobStatus::Stopped,
            other => JobStatus::Unknown(other.as_str().to_owned()),
        }
    }
}

fn job_description(
    status: Option<&TrainingJobStatus>,
    secondary_status: Option<&SecondaryStatus>,
    failure_reason: Option<&str>,
    output_path: Option<&str>,
    metrics: &[MetricData],
) -> JobDescription {
    JobDescription {
        status: status.map_or_else(|| JobStatus::Unknown(String::new()), JobStatus::from),
        secondary_status: secondary_status.map(|status| status.as_str().to_owned()),
        failure_reason: failure_reason.map(str::to_owned),
        output_path: output_path.map(str::to_owned),
        metrics: metrics
            .iter()
            .filter_map(|metric| Some((metric.metric_name()?.to_owned(), metric.value()?)))
            .collect(),
    }
}

#[async_trait]
impl TrainingService for SageMakerTrainingService {
    async fn create_training_job(&self, request: &TrainingJobRequest) -> Result<(), ResourceError> {
        let response = with_training_job(self.client.create_training_job(), request)
            .send()
            .await?;
        info!("Training job submitted: {:?}", response.training_job_arn());

        Ok(())
    }

    async fn describe_training_job(&self, job_name: &str) -> Result<JobDescription, ResourceError> {
        let response = self
            .client
            .describe_training_job()
            .training_job_name(job_name)
            .send()
            .await?;

        let status: Option<&TrainingJobStatus> = response.training_job_status().into();
        let output_config: Option<&OutputDataConfig> = response.output_data_config().into();

        Ok(job_description(
            status,
            response.secondary_status(),
            response.failure_reason(),
            output_config.and_then(OutputDataConfig::s3_output_path),
            response.final_metric_data_list(),
        ))
    }
}
