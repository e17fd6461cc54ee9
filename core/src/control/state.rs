// fnflow/src/control/state.rs

//! The engine's control state machine and the handle used to drive it.

use crate::trace::StepTracer;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{event, Level};

/// Lifecycle of one engine. Only `Running` lets a step start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
  /// Constructed, no strategy has run yet.
  Ready,
  Running,
  /// Checkpoints block until the state changes again.
  Paused,
  /// The active strategy ends at its next checkpoint.
  Stopped,
}

impl fmt::Display for ControlState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      ControlState::Ready => "ready",
      ControlState::Running => "running",
      ControlState::Paused => "paused",
      ControlState::Stopped => "stopped",
    };
    f.write_str(name)
  }
}

/// A control request, whether issued directly or bridged from a bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
  Pause,
  Resume,
  Stop,
}

/// Cloneable, thread-safe handle onto an engine's control state.
///
/// Every request is accepted; a request that does not apply to the current
/// state is a no-op. Requests never interrupt a step already in flight.
#[derive(Clone)]
pub struct FlowControl {
  tx: Arc<watch::Sender<ControlState>>,
  tracer: StepTracer,
}

impl FlowControl {
  pub(crate) fn new(tracer: StepTracer) -> Self {
    let (tx, _rx) = watch::channel(ControlState::Ready);
    Self { tx: Arc::new(tx), tracer }
  }

  pub fn state(&self) -> ControlState {
    *self.tx.borrow()
  }

  /// `Ready | Running -> Paused`.
  pub fn pause(&self) {
    self.transition(ControlSignal::Pause, |s| match s {
      ControlState::Ready | ControlState::Running => Some(ControlState::Paused),
      _ => None,
    });
  }

  /// `Paused -> Running`.
  pub fn resume(&self) {
    self.transition(ControlSignal::Resume, |s| match s {
      ControlState::Paused => Some(ControlState::Running),
      _ => None,
    });
  }

  pub fn start(&self) {
    self.resume();
  }

  /// Anything but `Stopped` -> `Stopped`.
  pub fn stop(&self) {
    self.transition(ControlSignal::Stop, |s| match s {
      ControlState::Stopped => None,
      _ => Some(ControlState::Stopped),
    });
  }

  pub fn apply(&self, signal: ControlSignal) {
    match signal {
      ControlSignal::Pause => self.pause(),
      ControlSignal::Resume => self.resume(),
      ControlSignal::Stop => self.stop(),
    }
  }

  /// Called when a strategy begins: `Ready | Stopped -> Running`.
  /// A pending pause is kept so the first checkpoint honours it.
  pub(crate) fn begin(&self) {
    self.transition_with("begin", |s| match s {
      ControlState::Ready | ControlState::Stopped => Some(ControlState::Running),
      _ => None,
    });
  }

  pub(crate) fn subscribe(&self) -> watch::Receiver<ControlState> {
    self.tx.subscribe()
  }

  fn transition(&self, signal: ControlSignal, next: impl FnOnce(ControlState) -> Option<ControlState>) {
    let request = match signal {
      ControlSignal::Pause => "pause",
      ControlSignal::Resume => "resume",
      ControlSignal::Stop => "stop",
    };
    self.transition_with(request, next);
  }

  fn transition_with(&self, request: &'static str, next: impl FnOnce(ControlState) -> Option<ControlState>) {
    let mut change = None;
    self.tx.send_if_modified(|state| match next(*state) {
      Some(to) => {
        change = Some((*state, to));
        *state = to;
        true
      }
      None => false,
    });
    match change {
      Some((from, to)) => {
        event!(Level::DEBUG, request, %from, %to, "Control state transition.");
        self.tracer.state_changed(from, to);
      }
      None => {
        event!(Level::TRACE, request, state = %self.state(), "Control request ignored in current state.");
      }
    }
  }
}

impl fmt::Debug for FlowControl {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("FlowControl").field("state", &self.state()).finish()
  }
}
