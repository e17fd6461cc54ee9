// fnflow/src/core/step.rs

//! Defines `FlowFn<X, L>`, a labelled unit of work run by the engine.

use crate::core::control::Transition;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future returned by every flow function once type-erased.
pub type StepFuture<X> = Pin<Box<dyn Future<Output = anyhow::Result<Transition<X>>> + Send>>;

type ErasedStep<X, L> = dyn Fn(X, Arc<L>) -> StepFuture<X> + Send + Sync;

/// A flow function: takes the current transitional value `x` and the shared
/// context `lib`, and produces the next value (or `Transition::Keep`).
///
/// Synchronous and asynchronous closures are both accepted and are driven
/// the same way by every strategy. Cloning is cheap; the closure is shared.
pub struct FlowFn<X, L> {
  label: Arc<str>,
  func: Arc<ErasedStep<X, L>>,
}

impl<X, L> FlowFn<X, L>
where
  X: Send + 'static,
  L: Send + Sync + 'static,
{
  /// Wraps an async closure.
  ///
  /// The closure may resolve to a bare `X` or to an explicit `Transition<X>`.
  pub fn new<F, Fut, T>(label: impl Into<String>, f: F) -> Self
  where
    F: Fn(X, Arc<L>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    T: Into<Transition<X>> + 'static,
  {
    let func: Arc<ErasedStep<X, L>> = Arc::new(move |x: X, lib: Arc<L>| -> StepFuture<X> {
      let fut = f(x, lib);
      Box::pin(async move { fut.await.map(Into::into) })
    });
    Self {
      label: Arc::from(label.into()),
      func,
    }
  }

  /// Wraps a synchronous closure. It runs when the step is polled, never
  /// when the engine merely builds the step future.
  pub fn sync<F, T>(label: impl Into<String>, f: F) -> Self
  where
    F: Fn(X, &L) -> anyhow::Result<T> + Send + Sync + 'static,
    T: Into<Transition<X>> + 'static,
  {
    let f = Arc::new(f);
    let func: Arc<ErasedStep<X, L>> = Arc::new(move |x: X, lib: Arc<L>| -> StepFuture<X> {
      let f = Arc::clone(&f);
      Box::pin(async move { f(x, &*lib).map(Into::into) })
    });
    Self {
      label: Arc::from(label.into()),
      func,
    }
  }
}

impl<X, L> FlowFn<X, L> {
  pub fn label(&self) -> &str {
    &self.label
  }

  /// Starts the step against one snapshot of `x` and `lib`.
  pub fn call(&self, x: X, lib: Arc<L>) -> StepFuture<X> {
    (self.func)(x, lib)
  }
}

impl<X, L> Clone for FlowFn<X, L> {
  fn clone(&self) -> Self {
    Self {
      label: Arc::clone(&self.label),
      func: Arc::clone(&self.func),
    }
  }
}

impl<X, L> fmt::Debug for FlowFn<X, L> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("FlowFn").field("label", &self.label).finish()
  }
}
