// fnflow/src/engine/mod.rs

//! Defines the `FunctionFlow<X, L>` engine, its construction and control
//! surface, and its execution strategies.

pub mod action;
pub mod definition;
pub mod execution;

// Re-export the main engine struct
pub use action::{LastAction, Strategy};
pub use definition::FunctionFlow;
