use chrono::{DateTime, Utc};
use serde::Deserialize;

const JOB_NAME_PREFIX: &str = "blazingtext";
const JOB_NAME_TIME_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";
const MODEL_ARTIFACT: &str = "output/model.tar.gz";

pub const TRAIN_CHANNEL: &str = "train";
pub const VALIDATION_CHANNEL: &str = "validation";
pub const CHANNEL_CONTENT_TYPE: &str = "text/plain";

pub const INSTANCE_COUNT: i32 = 1;
pub const VOLUME_SIZE_GB: i32 = 30;
pub const MAX_RUNTIME_SECS: i32 = 60 * 60;

pub const HYPERPARAMETERS: &[(&str, &str)] = &[
    ("mode", "supervised"),
    ("epochs", "10"),
    ("min_count", "2"),
    ("learning_rate", "0.05"),
    ("vector_dim", "10"),
    ("early_stopping", "true"),
    ("patience", "4"),
    ("min_epochs", "5"),
    ("word_ngrams", "2"),
];

/// Properties supplied by the template for the training-job resource.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceProperties {
    #[serde(rename = "S3TrainData")]
    pub train_data: String,
    // Older templates carry the property under a misspelled name.
    #[serde(rename = "S3ValidationData", alias = "S3ValiadtionData")]
    pub validation_data: String,
    #[serde(rename = "S3Output")]
    pub output: String,
    pub execution_role_arn: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingJobRequest {
    pub name: String,
    pub image: String,
    pub role_arn: String,
    pub train_data: String,
    pub validation_data: String,
    pub output: String,
}

impl TrainingJobRequest {
    pub fn new(name: String, image: String, properties: ResourceProperties) -> Self {
        Self {
            name,
            image,
            role_arn: properties.execution_role_arn,
            train_data: properties.train_data,
            validation_data: properties.validation_data,
            output: properties.output,
        }
    }

    /// Input channels as `(channel name, data location)` pairs.
    pub fn channels(&self) -> [(&str, &str); 2] {
        [
            (TRAIN_CHANNEL, self.train_data.as_str()),
            (VALIDATION_CHANNEL, self.validation_data.as_str()),
        ]
    }
}

pub fn job_name(started_at: DateTime<Utc>) -> String {
    format!(
        "{JOB_NAME_PREFIX}-{}",
        started_at.format(JOB_NAME_TIME_FORMAT)
    )
}

/// Location of the model archive written by a job under `output_path`.
pub fn artifact_path(output_path: &str, job_name: &str) -> String {
    format!("{output_path}{job_name}/{MODEL_ARTIFACT}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    InProgress,
    Stopping,
    Completed,
    Failed,
    Stopped,
    Unknown(String),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Stopped)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobDescription {
    pub status: JobStatus,
    pub secondary_status: Option<String>,
    pub failure_reason: Option<String>,
    pub output_path: Option<String>,
    pub metrics: Vec<(String, f32)>,
}
