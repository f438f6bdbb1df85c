//! # Single-pass multiplexed aggregation
//!
//! This crate computes several independent aggregates over one source in a
//! single traversal. Each aggregate is a [`Sink`](core::Sink) that consumes
//! elements one at a time and says after each one whether it still needs
//! more; the driver stops pulling from the source as soon as none does.
//!
//! ## Core Concepts
//!
//! - **Sink**: Accumulates one aggregate from elements pushed to it
//! - **SinkFactory**: Stateless description of an aggregate; builds fresh sinks
//! - **Driver**: Pulls each element once and fans it out to every sink
//! - **Request**: Deferred, memoized binding of a source to its aggregates
//!
//! ## Example
//!
//! ```rust
//! use passweld::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let request = vec![3, 1, 4, 1, 5]
//!         .aggregate(HasDuplicates::new())
//!         .add(Min::new())?
//!         .add(Count::new())?;
//!
//!     let (duplicates, min, count) = request.results()?;
//!     assert!(*duplicates);
//!     assert_eq!(*min, 1);
//!     assert_eq!(*count, 5);
//!     Ok(())
//! }
//! ```

pub mod compare;
pub mod core;
pub mod driver;
pub mod outputs;
pub mod plan;
pub mod request;
pub mod sinks;
pub mod util;

// Re-export commonly used items
pub mod prelude {
    pub use crate::compare::{
        natural_order, reverse, Comparer, EqualityComparer, FnEq, NaturalEq, Selector,
    };
    pub use crate::core::{Demand, Error, IntoError, Result, Sink, SinkFactory};
    pub use crate::driver::{DriverConfig, FanOut, Traversal};
    pub use crate::plan::{Outcome, Plan};
    pub use crate::request::{AggregateExt, Request};
    pub use crate::sinks::{
        AllMatch, AnyMatch, Count, First, Fold, HasDuplicates, Max, Min, Optional, Required,
        Sum,
    };
}

// Re-export main error type
pub use crate::core::{Error, Result};

#[cfg(feature = "metrics")]
pub mod metrics;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
