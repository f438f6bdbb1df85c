//! Core traits and types for the passweld library.
//!
//! This module contains the fundamental traits and error types that define
//! the single-pass aggregation model.

pub mod error;
pub mod traits;

// Re-export core items
pub use error::{Error, IntoError, Result};
pub use traits::{AnyOutput, Demand, DynFactory, DynSink, Sink, SinkFactory};
