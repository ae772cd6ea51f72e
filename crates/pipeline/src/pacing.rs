use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Decides how long to wait between two consecutive external calls.
pub trait PacePolicy: Send {
    fn next_delay(&mut self, last_succeeded: bool) -> Duration;
}

/// Constant pause regardless of outcome.
#[derive(Debug, Clone, Copy)]
pub struct FixedPause(pub Duration);

impl PacePolicy for FixedPause {
    fn next_delay(&mut self, _last_succeeded: bool) -> Duration {
        self.0
    }
}

/// No waiting at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPause;

impl PacePolicy for NoPause {
    fn next_delay(&mut self, _last_succeeded: bool) -> Duration {
        Duration::ZERO
    }
}

/// Waits `initial` after a success; doubles the wait after each consecutive
/// failure up to `max`.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(initial_ms: u64, max_ms: u64) -> Self {
        let initial = Duration::from_millis(initial_ms);
        Self {
            initial,
            max: Duration::from_millis(max_ms).max(initial),
            current: initial,
        }
    }
}

impl PacePolicy for Backoff {
    fn next_delay(&mut self, last_succeeded: bool) -> Duration {
        if last_succeeded {
            self.current = self.initial;
            return self.current;
        }
        let delay = self.current;
        self.current = std::cmp::min(self.current * 2, self.max);
        delay
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum PaceConfig {
    Fixed { pause_ms: u64 },
    Backoff { initial_ms: u64, max_ms: u64 },
    None,
}

impl Default for PaceConfig {
    fn default() -> Self {
        PaceConfig::Fixed { pause_ms: 2000 }
    }
}

impl PaceConfig {
    pub fn build(&self) -> Box<dyn PacePolicy> {
        match *self {
            PaceConfig::Fixed { pause_ms } => Box::new(FixedPause(Duration::from_millis(pause_ms))),
            PaceConfig::Backoff { initial_ms, max_ms } => Box::new(Backoff::new(initial_ms, max_ms)),
            PaceConfig::None => Box::new(NoPause),
        }
    }

    /// Same policy with its base delay halved, for the lighter per-company
    /// validation calls.
    pub fn halved(&self) -> PaceConfig {
        match *self {
            PaceConfig::Fixed { pause_ms } => PaceConfig::Fixed {
                pause_ms: pause_ms / 2,
            },
            PaceConfig::Backoff { initial_ms, max_ms } => PaceConfig::Backoff {
                initial_ms: initial_ms / 2,
                max_ms,
            },
            PaceConfig::None => PaceConfig::None,
        }
    }
}

/// Sleep for whatever the policy decides.
pub async fn pause(policy: &mut dyn PacePolicy, last_succeeded: bool) {
    let delay = policy.next_delay(last_succeeded);
    if !delay.is_zero() {
        debug!(delay_ms = delay.as_millis() as u64, "Pausing before next call");
        sleep(delay).await;
    }
}
