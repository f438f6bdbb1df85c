//! Core traits for the single-pass sink system.
//!
//! A [`Sink`] accumulates one aggregate from elements pushed to it one at a
//! time. After every element it answers with a [`Demand`], which is how the
//! driver knows it may stop pulling from the source early. A [`SinkFactory`]
//! is the stateless, shareable description of an aggregate; it builds a fresh
//! sink for every run.

use std::any::Any;
use std::ops::{BitOr, BitOrAssign};

use crate::core::error::Result;

/// A sink's answer after consuming an element.
///
/// Demands from several sinks are combined with `|`: traversal continues as
/// long as at least one sink still wants input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub enum Demand {
    /// The sink can still use more elements
    More,
    /// The sink's result is final; more elements cannot change it
    Satisfied,
}

impl Demand {
    /// Whether the sink still wants input
    pub fn needs_more(self) -> bool {
        matches!(self, Demand::More)
    }
}

impl From<bool> for Demand {
    fn from(needs_more: bool) -> Self {
        if needs_more {
            Demand::More
        } else {
            Demand::Satisfied
        }
    }
}

impl BitOr for Demand {
    type Output = Demand;

    fn bitor(self, rhs: Demand) -> Demand {
        Demand::from(self.needs_more() || rhs.needs_more())
    }
}

impl BitOrAssign for Demand {
    fn bitor_assign(&mut self, rhs: Demand) {
        *self = *self | rhs;
    }
}

/// A sink accumulates a single aggregate across a full or partial scan.
///
/// The driver calls [`accept_first`](Sink::accept_first) exactly once with the
/// first element of a non-empty source, then [`accept_next`](Sink::accept_next)
/// for each later element in source order, and finally
/// [`finish`](Sink::finish) once traversal has ended. A sink may not have seen
/// the whole source when `finish` is called: traversal stops as soon as every
/// attached sink is [`Demand::Satisfied`].
///
/// # Examples
///
/// ```rust
/// use passweld::core::{Demand, Result, Sink};
///
/// struct Last(Option<i32>);
///
/// impl Sink for Last {
///     type Item = i32;
///     type Output = Option<i32>;
///
///     fn accept_first(&mut self, item: &i32) -> Result<Demand> {
///         self.accept_next(item)
///     }
///
///     fn accept_next(&mut self, item: &i32) -> Result<Demand> {
///         self.0 = Some(*item);
///         Ok(Demand::More)
///     }
///
///     fn finish(self) -> Result<Option<i32>> {
///         Ok(self.0)
///     }
/// }
/// ```
pub trait Sink {
    /// The type of elements this sink consumes
    type Item;
    /// The aggregate this sink produces
    type Output;

    /// Initialize state from the first element of the source.
    fn accept_first(&mut self, item: &Self::Item) -> Result<Demand>;

    /// Update state with a subsequent element.
    fn accept_next(&mut self, item: &Self::Item) -> Result<Demand>;

    /// Produce the aggregate once traversal has ended.
    ///
    /// Called even when `accept_first` never was (empty source); the sink
    /// then either returns its identity value or fails with
    /// [`Error::EmptySequence`](crate::core::Error::EmptySequence).
    fn finish(self) -> Result<Self::Output>;
}

/// A stateless description of an aggregate that builds fresh sinks.
///
/// Factories are registered against a request and shared behind an `Arc`,
/// so building a sink must not mutate the factory.
pub trait SinkFactory<T> {
    /// The aggregate produced by sinks from this factory
    type Output;
    /// The sink type this factory builds
    type Sink: Sink<Item = T, Output = Self::Output>;

    /// Build a sink with empty state for a new run.
    fn sink(&self) -> Self::Sink;
}

/// Boxed aggregate value held in a result slot.
pub type AnyOutput = Box<dyn Any + Send + Sync>;

/// Object-safe view of a [`Sink`] with its output type erased.
///
/// This is what lets one driver run feed sinks with different output types.
/// It is implemented for every sink whose output is `Send + Sync + 'static`.
pub trait DynSink<T> {
    fn feed_first(&mut self, item: &T) -> Result<Demand>;

    fn feed_next(&mut self, item: &T) -> Result<Demand>;

    fn finish_boxed(self: Box<Self>) -> Result<AnyOutput>;
}

impl<S> DynSink<S::Item> for S
where
    S: Sink,
    S::Output: Send + Sync + 'static,
{
    fn feed_first(&mut self, item: &S::Item) -> Result<Demand> {
        self.accept_first(item)
    }

    fn feed_next(&mut self, item: &S::Item) -> Result<Demand> {
        self.accept_next(item)
    }

    fn finish_boxed(self: Box<Self>) -> Result<AnyOutput> {
        let output = (*self).finish()?;
        Ok(Box::new(output))
    }
}

/// Object-safe view of a [`SinkFactory`] with its sink type erased.
pub trait DynFactory<T>: Send + Sync {
    fn create(&self) -> Box<dyn DynSink<T>>;

    /// Type name of the aggregate, used in diagnostics.
    fn output_type(&self) -> &'static str;
}

impl<T, F> DynFactory<T> for F
where
    F: SinkFactory<T> + Send + Sync,
    F::Sink: 'static,
    F::Output: Send + Sync + 'static,
{
    fn create(&self) -> Box<dyn DynSink<T>> {
        Box::new(self.sink())
    }

    fn output_type(&self) -> &'static str {
        std::any::type_name::<F::Output>()
    }
}
