// fnflow/src/engine/action.rs

//! The record `repeat` replays.

use crate::core::step::FlowFn;
use std::fmt;

/// Which execution strategy produced a step or an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
  One,
  Serial,
  Race,
}

impl fmt::Display for Strategy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Strategy::One => "run-one",
      Strategy::Serial => "run-serial",
      Strategy::Race => "run-parallel-race",
    };
    f.write_str(name)
  }
}

/// The most recent strategy call and its arguments.
pub enum LastAction<X, L> {
  One(FlowFn<X, L>),
  Serial(Vec<FlowFn<X, L>>),
  Race(Vec<FlowFn<X, L>>),
}

impl<X, L> LastAction<X, L> {
  pub fn strategy(&self) -> Strategy {
    match self {
      LastAction::One(_) => Strategy::One,
      LastAction::Serial(_) => Strategy::Serial,
      LastAction::Race(_) => Strategy::Race,
    }
  }

  pub fn labels(&self) -> Vec<&str> {
    match self {
      LastAction::One(f) => vec![f.label()],
      LastAction::Serial(fns) | LastAction::Race(fns) => fns.iter().map(|f| f.label()).collect(),
    }
  }
}

impl<X, L> Clone for LastAction<X, L> {
  fn clone(&self) -> Self {
    match self {
      LastAction::One(f) => LastAction::One(f.clone()),
      LastAction::Serial(fns) => LastAction::Serial(fns.clone()),
      LastAction::Race(fns) => LastAction::Race(fns.clone()),
    }
  }
}

impl<X, L> fmt::Debug for LastAction<X, L> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("LastAction")
      .field("strategy", &self.strategy())
      .field("steps", &self.labels())
      .finish()
  }
}
