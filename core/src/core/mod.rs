pub mod context;
pub mod context_data;
pub mod control;
pub mod step;

// Re-export key types for easier access from other fnflow modules (and lib.rs)
pub use context::TransitionalContext;
pub use context_data::ContextData;
pub use control::Transition;
pub use step::{FlowFn, StepFuture};
