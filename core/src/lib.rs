// src/lib.rs

//! fnflow: a cooperative flow engine for Rust.
//!
//! A [`FunctionFlow`] threads a transitional value `x` through user-supplied
//! flow functions, with a shared services object `lib` visible to every step.
//! It offers:
//!  - Sequential execution (`run_serial`) and single steps (`run_one`).
//!  - First-wins fan-out (`run_parallel_race`); losers are discarded, not cancelled.
//!  - Replay of the previous call (`repeat`).
//!  - Pause, resume and stop, honoured at checkpoints between steps, callable
//!    directly, through a cloneable [`FlowControl`], or via named signals on a
//!    [`SignalBus`].
//!  - Sync and async flow functions, handled the same way.

pub mod config;
pub mod control;
pub mod core;
pub mod engine;
pub mod error;
pub mod trace;

// --- Re-exports for the Public API ---

pub use crate::core::context::TransitionalContext;
pub use crate::core::context_data::ContextData;
pub use crate::core::control::Transition;
pub use crate::core::step::{FlowFn, StepFuture};

pub use crate::control::bridge::{InMemorySignalBus, SignalBus};
pub use crate::control::state::{ControlSignal, ControlState, FlowControl};

pub use crate::config::{FlowConfig, RacePolicy, SignalNames};
pub use crate::engine::{FunctionFlow, LastAction, Strategy};
pub use crate::error::{FlowError, FlowResult};

/*
    Typical use:
    1. Build a `FlowConfig` (delay, debug, signal bridge).
    2. Create `FunctionFlow::new(config, x0, lib)` or, for bus control,
       `FunctionFlow::with_signal_bus(config, x0, lib, bus)`.
    3. Wrap steps with `FlowFn::new` (async) or `FlowFn::sync`.
    4. Await `run_one`, `run_serial`, `run_parallel_race` or `repeat`.
    5. Meanwhile, anyone holding `flow.control()` or the bus may pause,
       resume or stop the run; the engine reacts between steps.
*/
