use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;

/// Per-controller behaviour switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcedureOptions {
    /// Submit as soon as an actionable request is available.
    pub autostart: bool,
    /// Keep showing the previous key's result until the new key finishes.
    pub keep_previous_data: bool,
    /// Gate for every submission and poll.
    pub enabled: bool,
    pub poll_interval_ms: u64,
}

impl ProcedureOptions {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn with_autostart(mut self, autostart: bool) -> Self {
        self.autostart = autostart;
        self
    }

    pub fn with_keep_previous_data(mut self, keep: bool) -> Self {
        self.keep_previous_data = keep;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }
}

impl Default for ProcedureOptions {
    fn default() -> Self {
        Self {
            autostart: true,
            keep_previous_data: false,
            enabled: true,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}
