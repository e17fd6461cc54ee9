// fnflow/src/engine/definition.rs

//! Contains the `FunctionFlow<X, L>` engine definition: construction,
//! injection, inspection and the direct control calls.

use crate::config::FlowConfig;
use crate::control::bridge::{SignalBridge, SignalBus};
use crate::control::state::{ControlState, FlowControl};
use crate::core::context::TransitionalContext;
use crate::core::context_data::ContextData;
use crate::engine::action::{LastAction, Strategy};
use crate::error::{FlowError, FlowResult};
use crate::trace::StepTracer;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{event, Level};

/// The flow engine.
///
/// One engine drives a single logical pipeline: it owns the transitional
/// value `x` and the shared context `lib`, and runs flow functions over them
/// one strategy call at a time. Concurrent strategy calls on the same engine
/// queue behind each other, so a flow function must never invoke a strategy
/// on the engine that is running it (it may pause, resume or stop it through
/// a [`FlowControl`] handle).
///
/// `X` must be `Clone` because every step receives its own copy of the value
/// and race candidates all start from the same snapshot.
pub struct FunctionFlow<X, L>
where
  X: Clone + Send + Sync + 'static,
  L: Send + Sync + 'static,
{
  pub(crate) config: FlowConfig,
  pub(crate) context: ContextData<TransitionalContext<X, L>>,
  pub(crate) control: FlowControl,
  pub(crate) tracer: StepTracer,
  pub(crate) last_action: Mutex<Option<LastAction<X, L>>>,
  // Held for the whole of a strategy call.
  pub(crate) run_lock: tokio::sync::Mutex<()>,
  _bridge: Option<SignalBridge>,
}

impl<X, L> FunctionFlow<X, L>
where
  X: Clone + Send + Sync + 'static,
  L: Send + Sync + 'static,
{
  /// Creates an engine without a signal bridge.
  ///
  /// Fails with `FlowError::Configuration` if `config.signal_bridge` is set,
  /// since there is no bus to listen on; use [`FunctionFlow::with_signal_bus`].
  pub fn new(config: FlowConfig, x: X, lib: L) -> FlowResult<Self> {
    if config.signal_bridge {
      return Err(FlowError::Configuration(
        "signal_bridge is enabled but no signal bus was supplied".to_string(),
      ));
    }
    Ok(Self::assemble(config, x, lib, None))
  }

  /// Creates an engine that listens for pause/resume/stop signals on `bus`
  /// for its whole lifetime. Must be called inside a tokio runtime.
  ///
  /// The bus is ignored when `config.signal_bridge` is off.
  pub fn with_signal_bus(config: FlowConfig, x: X, lib: L, bus: Arc<dyn SignalBus>) -> FlowResult<Self> {
    if !config.signal_bridge {
      event!(Level::DEBUG, "Signal bus supplied but signal_bridge is disabled; ignoring it.");
      return Ok(Self::assemble(config, x, lib, None));
    }
    let tracer = StepTracer::new(config.debug);
    let control = FlowControl::new(tracer);
    let bridge = SignalBridge::attach(bus.as_ref(), config.signals.clone(), control.clone())?;
    event!(Level::DEBUG, signals = ?config.signals, "Signal bridge attached.");
    Ok(Self::from_parts(config, x, lib, tracer, control, Some(bridge)))
  }

  fn assemble(config: FlowConfig, x: X, lib: L, bridge: Option<SignalBridge>) -> Self {
    let tracer = StepTracer::new(config.debug);
    let control = FlowControl::new(tracer);
    Self::from_parts(config, x, lib, tracer, control, bridge)
  }

  fn from_parts(
    config: FlowConfig,
    x: X,
    lib: L,
    tracer: StepTracer,
    control: FlowControl,
    bridge: Option<SignalBridge>,
  ) -> Self {
    Self {
      config,
      context: ContextData::new(TransitionalContext::new(x, lib)),
      control,
      tracer,
      last_action: Mutex::new(None),
      run_lock: tokio::sync::Mutex::new(()),
      _bridge: bridge,
    }
  }

  // --- Injection ---

  /// Replaces `x`. `lib` is untouched.
  pub fn inject_x(&self, x: X) {
    self.context.write().x = x;
  }

  /// Replaces `lib`. `x` is untouched.
  pub fn inject_lib(&self, lib: L) {
    self.context.write().lib = Arc::new(lib);
  }

  /// Mutates `x` in place, e.g. to patch a single field between runs.
  pub fn update_x<R>(&self, f: impl FnOnce(&mut X) -> R) -> R {
    self.context.modify(|ctx| f(&mut ctx.x))
  }

  // --- Inspection ---

  pub fn x(&self) -> X {
    self.context.map_read(|ctx| &ctx.x).clone()
  }

  pub fn lib(&self) -> Arc<L> {
    Arc::clone(self.context.read().lib())
  }

  pub fn state(&self) -> ControlState {
    self.control.state()
  }

  pub fn config(&self) -> &FlowConfig {
    &self.config
  }

  /// Strategy `repeat` would replay, if any.
  pub fn last_strategy(&self) -> Option<Strategy> {
    self.last_action.lock().as_ref().map(LastAction::strategy)
  }

  // --- Control ---

  /// A handle for controlling this engine from elsewhere, including from
  /// inside a running flow function via `lib`.
  pub fn control(&self) -> FlowControl {
    self.control.clone()
  }

  /// Pauses before the next step. A step already running is not interrupted.
  pub fn pause(&self) {
    self.control.pause();
  }

  pub fn resume(&self) {
    self.control.resume();
  }

  /// Alias for [`FunctionFlow::resume`].
  pub fn start(&self) {
    self.control.start();
  }

  /// Ends the active strategy at its next checkpoint; it returns the last
  /// produced `x` without error.
  pub fn stop(&self) {
    self.control.stop();
  }

  pub(crate) fn record(&self, action: LastAction<X, L>) {
    *self.last_action.lock() = Some(action);
  }
}
