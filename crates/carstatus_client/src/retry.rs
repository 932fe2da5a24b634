use crate::{ApiResponse, CarStatusError};
use std::future::Future;
use std::time::Duration;

/// Steps of the wake-up sequence for a sleeping vehicle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WakeState {
    Requesting,
    WakingUp,
    Retrying,
    Done,
    Failed,
}

/// Wakes a sleeping vehicle once, then polls at a fixed delay until it answers.
#[derive(Clone, Debug)]
pub struct WakePolicy {
    /// Statuses meaning "asleep or unreachable".
    pub asleep_statuses: Vec<u16>,
    pub retry_delay: Duration,
    /// `None` polls until the vehicle answers.
    pub max_retries: Option<u32>,
}

impl Default for WakePolicy {
    fn default() -> Self {
        Self {
            asleep_statuses: vec![408, 504],
            retry_delay: Self::DEFAULT_RETRY_DELAY,
            max_retries: None,
        }
    }
}

impl WakePolicy {
    pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

    pub fn is_asleep(&self, status: u16) -> bool {
        self.asleep_statuses.contains(&status)
    }

    /// Runs `fetch` until it yields a non-asleep response. `wake` is called once,
    /// on the first asleep response; its failure is logged and otherwise ignored.
    pub async fn run<F, Fut, W, WFut>(
        &self,
        mut fetch: F,
        mut wake: W,
    ) -> Result<ApiResponse, CarStatusError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<ApiResponse, CarStatusError>>,
        W: FnMut() -> WFut,
        WFut: Future<Output = Result<(), CarStatusError>>,
    {
        let mut state = WakeState::Requesting;
        let mut response = fetch().await?;
        let mut retries = 0u32;
        loop {
            state = match state {
                WakeState::Requesting if self.is_asleep(response.status) => {
                    tracing::info!(status = response.status, "vehicle asleep, waking it up");
                    WakeState::WakingUp
                }
                WakeState::Requesting => WakeState::Done,
                WakeState::WakingUp => {
                    if let Err(e) = wake().await {
                        tracing::warn!(error = %e, "wake-up request failed");
                    }
                    WakeState::Retrying
                }
                WakeState::Retrying if self.max_retries.is_some_and(|max| retries >= max) => {
                    tracing::warn!(retries, "vehicle did not wake up, giving up");
                    WakeState::Failed
                }
                WakeState::Retrying => {
                    tokio::time::sleep(self.retry_delay).await;
                    retries += 1;
                    response = fetch().await?;
                    if self.is_asleep(response.status) {
                        tracing::debug!(retries, status = response.status, "vehicle still asleep");
                        WakeState::Retrying
                    } else {
                        tracing::info!(retries, "vehicle awake");
                        WakeState::Done
                    }
                }
                WakeState::Done => return Ok(response),
                WakeState::Failed => {
                    return Err(CarStatusError::VehicleAsleep { attempts: retries });
                }
            };
        }
    }
}
