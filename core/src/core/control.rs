// fnflow/src/core/control.rs

//! Defines the output a flow function hands back to the engine.

/// What a flow function asks the engine to do with the transitional value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition<X> {
  /// Replace `x` with this value before the next step runs.
  Next(X),
  /// Leave `x` untouched. The step ran for its side effects only.
  Keep,
}

impl<X> Transition<X> {
  /// Resolves the transition against the current value.
  pub fn apply(self, current: &mut X) -> bool {
    match self {
      Transition::Next(value) => {
        *current = value;
        true
      }
      Transition::Keep => false,
    }
  }

  pub fn is_keep(&self) -> bool {
    matches!(self, Transition::Keep)
  }
}

impl<X> From<X> for Transition<X> {
  fn from(value: X) -> Self {
    Transition::Next(value)
  }
}
