// fnflow/src/core/context.rs

//! Defines `TransitionalContext<X, L>`: the working value `x` threaded through
//! every step, plus the shared services object `lib`.

use std::sync::Arc;

/// The pipeline's data. Owned by the engine and handed to steps as snapshots.
#[derive(Debug)]
pub struct TransitionalContext<X, L> {
  pub(crate) x: X,
  pub(crate) lib: Arc<L>,
}

impl<X: Clone, L> TransitionalContext<X, L> {
  pub fn new(x: X, lib: L) -> Self {
    Self { x, lib: Arc::new(lib) }
  }

  /// Clones `x` and the `lib` handle for one step invocation.
  pub fn snapshot(&self) -> (X, Arc<L>) {
    (self.x.clone(), Arc::clone(&self.lib))
  }

  pub fn x(&self) -> &X {
    &self.x
  }

  pub fn lib(&self) -> &Arc<L> {
    &self.lib
  }
}
