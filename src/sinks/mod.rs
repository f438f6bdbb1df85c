//! Sink factory implementations for the passweld library.
//!
//! Every aggregate here follows the same template: a stateless, shareable
//! factory holding its configuration (selectors, comparers, predicates), and a
//! sink with the per-run state. Factories built with `new()` use natural
//! semantics; the other constructors inject configuration.

pub mod duplicates;
pub mod extrema;
pub mod folds;

pub use duplicates::{HasDuplicates, HasDuplicatesSink};
pub use extrema::{Direction, Extreme, ExtremeSink, Largest, Max, Min, Smallest};
pub use folds::{
    AllMatch, AllMatchSink, AnyMatch, AnyMatchSink, CheckedAdd, Count, CountSink, First,
    FirstSink, Fold, FoldSink, Folder, Sum, SumSink,
};

use crate::core::{Error, Result};

/// What an aggregate yields when it saw no elements.
///
/// Chosen at registration time through the factory's type, so an aggregate
/// over an empty source either fails or returns an absence marker, never both.
pub trait EmptyPolicy<V>: Send + Sync + 'static {
    type Output;

    fn resolve(value: Option<V>) -> Result<Self::Output>;
}

/// Fail with [`Error::EmptySequence`] when nothing was seen.
#[derive(Debug, Clone, Copy, Default)]
pub struct Required;

/// Return `None` when nothing was seen.
#[derive(Debug, Clone, Copy, Default)]
pub struct Optional;

impl<V> EmptyPolicy<V> for Required {
    type Output = V;

    fn resolve(value: Option<V>) -> Result<V> {
        value.ok_or(Error::EmptySequence)
    }
}

impl<V> EmptyPolicy<V> for Optional {
    type Output = Option<V>;

    fn resolve(value: Option<V>) -> Result<Option<V>> {
        Ok(value)
    }
}
