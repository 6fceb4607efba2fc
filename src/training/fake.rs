use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::errors::ResourceError;
use super::job::{JobDescription, JobStatus, TrainingJobRequest};
use super::service::TrainingService;

/// Replays a scripted status sequence; the last status repeats once the script runs out.
pub struct FakeTrainingService {
    statuses: Mutex<VecDeque<JobStatus>>,
    failure_reason: Option<String>,
    create_error: Option<String>,
    describe_error: Option<String>,
    submitted: Mutex<Vec<TrainingJobRequest>>,
    describe_calls: AtomicU32,
}

impl FakeTrainingService {
    pub fn new(statuses: impl IntoIterator<Item = JobStatus>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into_iter().collect()),
            failure_reason: None,
            create_error: None,
            describe_error: None,
            submitted: Mutex::new(Vec::new()),
            describe_calls: AtomicU32::new(0),
        }
    }

    pub fn with_failure_reason(mut self, reason: &str) -> Self {
        self.failure_reason = Some(reason.to_owned());
        self
    }

    pub fn failing_create(mut self, message: &str) -> Self {
        self.create_error = Some(message.to_owned());
        self
    }

    pub fn failing_describe(mut self, message: &str) -> Self {
        self.describe_error = Some(message.to_owned());
        self
    }

    pub fn submitted(&self) -> Vec<TrainingJobRequest> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn describe_calls(&self) -> u32 {
        self.describe_calls.load(Ordering::SeqCst)
    }

    pub fn remote_calls(&self) -> usize {
        self.submitted().len() + self.describe_calls() as usize
    }
}

#[async_trait]
impl TrainingService for FakeTrainingService {
    async fn create_training_job(&self, request: &TrainingJobRequest) -> Result<(), ResourceError> {
        if let Some(message) = &self.create_error {
            return Err(ResourceError::Service(message.clone()));
        }
        self.submitted.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn describe_training_job(&self, _job_name: &str) -> Result<JobDescription, ResourceError> {
        self.describe_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.describe_error {
            return Err(ResourceError::Service(message.clone()));
        }

        let status = {
            let mut statuses = self.statuses.lock().unwrap();
            if statuses.len() > 1 {
                statuses.pop_front().unwrap()
            } else {
                statuses.front().cloned().unwrap_or(JobStatus::InProgress)
            }
        };
        let failure_reason = match status {
            JobStatus::Failed => self.failure_reason.clone(),
            _ => None,
        };

        Ok(JobDescription {
            status,
            secondary_status: Some("Training".to_owned()),
            failure_reason,
            output_path: self.submitted().last().map(|request| request.output.clone()),
            metrics: vec![("validation:accuracy".to_owned(), 0.87)],
        })
    }
}
