// fnflow/src/trace.rs

//! Opt-in verbose step log. Every method is a no-op unless the engine was
//! configured with `debug = true`; nothing here reads or writes engine state.

use crate::control::state::ControlState;
use crate::engine::action::Strategy;
use std::time::Duration;
use tracing::{event, Level};

pub const TRACE_TARGET: &str = "fnflow::steps";

#[derive(Debug, Clone, Copy, Default)]
pub struct StepTracer {
  enabled: bool,
}

impl StepTracer {
  pub fn new(enabled: bool) -> Self {
    Self { enabled }
  }

  pub fn step_started(&self, strategy: Strategy, index: usize, label: &str) {
    if self.enabled {
      event!(target: TRACE_TARGET, Level::INFO, %strategy, index, label, "step started");
    }
  }

  pub fn step_finished(&self, strategy: Strategy, index: usize, label: &str, elapsed: Duration, replaced_x: bool) {
    if self.enabled {
      event!(
        target: TRACE_TARGET,
        Level::INFO,
        %strategy,
        index,
        label,
        elapsed_ms = elapsed.as_millis() as u64,
        replaced_x,
        "step finished"
      );
    }
  }

  pub fn step_failed(&self, strategy: Strategy, index: usize, label: &str, error: &anyhow::Error) {
    if self.enabled {
      event!(target: TRACE_TARGET, Level::WARN, %strategy, index, label, error = %error, "step failed");
    }
  }

  pub fn race_started(&self, candidates: usize) {
    if self.enabled {
      event!(target: TRACE_TARGET, Level::INFO, candidates, "race started");
    }
  }

  pub fn race_won(&self, index: usize, label: &str, elapsed: Duration) {
    if self.enabled {
      event!(
        target: TRACE_TARGET,
        Level::INFO,
        index,
        label,
        elapsed_ms = elapsed.as_millis() as u64,
        "race won"
      );
    }
  }

  pub fn repeat_iteration(&self, iteration: usize, total: usize, strategy: Strategy) {
    if self.enabled {
      event!(target: TRACE_TARGET, Level::INFO, iteration, total, %strategy, "repeat iteration");
    }
  }

  pub fn checkpoint_paused(&self, index: usize) {
    if self.enabled {
      event!(target: TRACE_TARGET, Level::INFO, index, "paused before step");
    }
  }

  pub fn checkpoint_stopped(&self, index: usize) {
    if self.enabled {
      event!(target: TRACE_TARGET, Level::INFO, index, "stopped before step");
    }
  }

  pub fn state_changed(&self, from: ControlState, to: ControlState) {
    if self.enabled {
      event!(target: TRACE_TARGET, Level::INFO, %from, %to, "control state changed");
    }
  }
}
