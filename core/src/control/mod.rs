// fnflow/src/control/mod.rs

//! Control state, the checkpoint handle, and the bus-driven signal bridge.

pub mod bridge;
pub mod state;

pub use bridge::{InMemorySignalBus, SignalBus};
pub use state::{ControlSignal, ControlState, FlowControl};
