// fnflow/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

use crate::engine::action::Strategy;

#[derive(Debug, Error)]
pub enum FlowError {
  #[error("{strategy} step #{index} ('{label}') failed: {source}")]
  StepFailed {
    strategy: Strategy,
    index: usize,
    label: String,
    #[source]
    source: AnyhowError,
  },

  #[error("race of {candidates} flow functions failed; first failure from #{index} ('{label}'): {source}")]
  RaceFailed {
    candidates: usize,
    index: usize,
    label: String,
    #[source]
    source: AnyhowError,
  },

  #[error("repeat iteration {iteration} failed: {source}")]
  RepeatFailed {
    iteration: usize,
    #[source]
    source: Box<FlowError>,
  },

  #[error("repeat requested but no flow action has been run yet")]
  NoPriorAction,

  #[error("invalid argument for {operation}: {message}")]
  InvalidArgument { operation: &'static str, message: String },

  #[error("configuration error: {0}")]
  Configuration(String),

  #[error("signal could not be delivered: {0}")]
  SignalDelivery(String),
}

impl FlowError {
  /// Index of the failing flow function, when the failure came from one.
  pub fn step_index(&self) -> Option<usize> {
    match self {
      FlowError::StepFailed { index, .. } | FlowError::RaceFailed { index, .. } => Some(*index),
      FlowError::RepeatFailed { source, .. } => source.step_index(),
      _ => None,
    }
  }

  pub(crate) fn empty_list(operation: &'static str) -> Self {
    FlowError::InvalidArgument {
      operation,
      message: "at least one flow function is required".to_string(),
    }
  }
}

pub type FlowResult<T, E = FlowError> = std::result::Result<T, E>;
