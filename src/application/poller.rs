//! Deploy Poller
//!
//! Waits for the hosting service to pick up a pushed chunk and to finish
//! deploying it. Both waits are fixed-interval polling loops; the only early
//! exit is the start timeout.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::domain::entities::DeployStatus;
use crate::domain::ports::{Clock, DeployEvent, DeployEventSink, DeployStatusApi, PollTarget};
use crate::error::{FleekDeployError, FleekDeployResult};

/// Delay before every deploy-list query
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(10);
/// Extra delay when the wait condition was not reached yet
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(60);
/// How long a pushed chunk may take to show up as a deploy
pub const DEFAULT_START_TIMEOUT: Duration = Duration::from_secs(600);

/// Polling intervals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub initial_delay: Duration,
    pub retry_delay: Duration,
    pub start_timeout: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            initial_delay: DEFAULT_INITIAL_DELAY,
            retry_delay: DEFAULT_RETRY_DELAY,
            start_timeout: DEFAULT_START_TIMEOUT,
        }
    }
}

impl PollSettings {
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_start_timeout(mut self, timeout: Duration) -> Self {
        self.start_timeout = timeout;
        self
    }
}

/// Polls the deploy list of one site
pub struct DeployPoller<'a, A: DeployStatusApi, C: Clock> {
    api: &'a A,
    clock: &'a C,
    site_id: &'a str,
    settings: PollSettings,
    events: Arc<dyn DeployEventSink>,
}

impl<'a, A: DeployStatusApi, C: Clock> DeployPoller<'a, A, C> {
    pub fn new(
        api: &'a A,
        clock: &'a C,
        site_id: &'a str,
        settings: PollSettings,
        events: Arc<dyn DeployEventSink>,
    ) -> Self {
        Self {
            api,
            clock,
            site_id,
            settings,
            events,
        }
    }

    /// Wait for a deploy that started at or after `threshold` and return its id
    pub fn await_deploy_start(&self, threshold: DateTime<Utc>) -> FleekDeployResult<String> {
        let timeout = chrono::Duration::from_std(self.settings.start_timeout)
            .unwrap_or_else(|_| chrono::Duration::MAX);
        let deadline = threshold.checked_add_signed(timeout).unwrap_or(threshold);

        loop {
            self.clock.sleep(self.settings.initial_delay);

            if self.clock.now() > deadline {
                return Err(FleekDeployError::DeployNotStarted {
                    since: threshold.to_rfc3339(),
                    timeout_secs: self.settings.start_timeout.as_secs(),
                });
            }

            let deploys = self.api.list_deploys(self.site_id)?;
            if let Some(deploy) = deploys.into_iter().find(|d| d.started_at >= threshold) {
                self.events.on_event(DeployEvent::RemoteDeployStarted {
                    deploy_id: deploy.id.clone(),
                });
                return Ok(deploy.id);
            }

            if self.events.wants_detailed_events() {
                self.events.on_event(DeployEvent::DeployPollPending {
                    target: PollTarget::Start,
                    pending: 0,
                });
            }
            self.clock.sleep(self.settings.retry_delay);
        }
    }

    /// Wait until `deploy_id` and every other running deploy has resolved
    pub fn await_deploy_finish(&self, deploy_id: &str) -> FleekDeployResult<()> {
        let started = self.clock.now();

        loop {
            self.clock.sleep(self.settings.initial_delay);

            let deploys = self.api.list_deploys(self.site_id)?;
            let tracked = deploys.iter().find(|d| d.id == deploy_id).ok_or_else(|| {
                FleekDeployError::DeployVanished {
                    deploy_id: deploy_id.to_string(),
                    site_id: self.site_id.to_string(),
                }
            })?;

            match &tracked.status {
                DeployStatus::Cancelled => {
                    return Err(FleekDeployError::DeployCancelled {
                        deploy_id: deploy_id.to_string(),
                    })
                }
                DeployStatus::Failed => {
                    return Err(FleekDeployError::DeployFailed {
                        deploy_id: deploy_id.to_string(),
                    })
                }
                DeployStatus::InProgress | DeployStatus::Succeeded | DeployStatus::Other(_) => {}
            }

            let pending = deploys.iter().filter(|d| d.status.is_pending()).count();
            if pending == 0 {
                let elapsed = self.clock.now() - started;
                self.events.on_event(DeployEvent::RemoteDeployFinished {
                    deploy_id: deploy_id.to_string(),
                    elapsed_secs: elapsed.num_milliseconds() as f64 / 1000.0,
                });
                return Ok(());
            }

            if self.events.wants_detailed_events() {
                self.events.on_event(DeployEvent::DeployPollPending {
                    target: PollTarget::Finish {
                        deploy_id: deploy_id.to_string(),
                    },
                    pending,
                });
            }
            self.clock.sleep(self.settings.retry_delay);
        }
    }
}
