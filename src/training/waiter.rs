use std::time::Duration;

use tokio::time::sleep;
use tracing::info;

use super::errors::ResourceError;
use super::job::JobDescription;
use super::service::TrainingService;

/// Time kept back from the invocation deadline to report the outcome.
pub const RESPONSE_RESERVE: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub interval: Duration,
    /// Upper bound on status checks; `None` polls until the job finishes.
    pub max_attempts: Option<u32>,
}

impl WaitPolicy {
    pub fn new(interval: Duration, max_attempts: Option<u32>) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Caps the attempts so polling ends `RESPONSE_RESERVE` before `remaining` runs out.
    pub fn within(self, remaining: Duration) -> Self {
        let budget = remaining.saturating_sub(RESPONSE_RESERVE);
        let interval = self.interval.as_millis().max(1);
        let fitting = u32::try_from(budget.as_millis() / interval)
            .unwrap_or(u32::MAX)
            .saturating_add(1);

        Self {
            max_attempts: Some(self.max_attempts.map_or(fitting, |max| max.min(fitting))),
            ..self
        }
    }
}

/// Polls `job_name` until it reaches a terminal status.
///
/// The first check happens immediately and later checks are `policy.interval`
/// apart. Dropping the returned future stops polling.
pub async fn wait_for_completion<S>(
    service: &S,
    job_name: &str,
    policy: &WaitPolicy,
) -> Result<JobDescription, ResourceError>
where
    S: TrainingService + ?Sized,
{
    let mut attempts = 0;
    loop {
        let description = service.describe_training_job(job_name).await?;
        attempts += 1;
        info!(
            "Training status: {:?} ({})",
            description.status,
            description.secondary_status.as_deref().unwrap_or("-")
        );

        if description.status.is_terminal() {
            return Ok(description);
        }
        if policy.max_attempts.is_some_and(|max| attempts >= max) {
            return Err(ResourceError::WaitTimedOut {
                job_name: job_name.to_owned(),
                attempts,
            });
        }

        sleep(policy.interval).await;
    }
}
