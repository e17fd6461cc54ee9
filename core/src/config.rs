// fnflow/src/config.rs

//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How `run_parallel_race` treats candidates that fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RacePolicy {
  /// The first candidate to succeed wins. The race fails only once every
  /// candidate has failed, reporting the first failure observed.
  #[default]
  FirstSuccess,
  /// The first candidate to settle decides the race, success or failure.
  FirstSettled,
}

/// Names of the bus signals the control bridge listens for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalNames {
  pub pause: String,
  pub resume: String,
  pub stop: String,
}

impl Default for SignalNames {
  fn default() -> Self {
    Self {
      pause: "ff-pause".to_string(),
      resume: "ff-start".to_string(),
      stop: "ff-stop".to_string(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
  /// Emit step-boundary and state-transition events through `tracing`.
  pub debug: bool,
  /// Sleep after every serial step; also the heartbeat while paused.
  pub inter_step_delay_ms: u64,
  /// Subscribe to pause/resume/stop signals on a `SignalBus`.
  pub signal_bridge: bool,
  pub race_policy: RacePolicy,
  pub signals: SignalNames,
}

impl Default for FlowConfig {
  fn default() -> Self {
    Self {
      debug: false,
      inter_step_delay_ms: 0,
      signal_bridge: false,
      race_policy: RacePolicy::default(),
      signals: SignalNames::default(),
    }
  }
}

impl FlowConfig {
  pub fn with_debug(mut self, debug: bool) -> Self {
    self.debug = debug;
    self
  }

  pub fn with_inter_step_delay_ms(mut self, ms: u64) -> Self {
    self.inter_step_delay_ms = ms;
    self
  }

  pub fn with_signal_bridge(mut self, enabled: bool) -> Self {
    self.signal_bridge = enabled;
    self
  }

  pub fn with_race_policy(mut self, policy: RacePolicy) -> Self {
    self.race_policy = policy;
    self
  }

  pub fn with_signals(mut self, signals: SignalNames) -> Self {
    self.signals = signals;
    self
  }

  pub fn inter_step_delay(&self) -> Duration {
    Duration::from_millis(self.inter_step_delay_ms)
  }
}
