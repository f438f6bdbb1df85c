//! Minimum and maximum.

use std::cmp::Ordering;
use std::marker::PhantomData;
use std::sync::Arc;

use super::{EmptyPolicy, Optional, Required};
use crate::compare::{identity, natural_order, Comparer, Selector};
use crate::core::{Demand, Result, Sink, SinkFactory};

/// Which end of the ordering an [`Extreme`] keeps.
pub trait Direction: Send + Sync + 'static {
    /// A candidate replaces the current best only when it compares this way.
    const REPLACES_ON: Ordering;
}

/// Keep the smallest value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Smallest;

/// Keep the largest value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Largest;

impl Direction for Smallest {
    const REPLACES_ON: Ordering = Ordering::Less;
}

impl Direction for Largest {
    const REPLACES_ON: Ordering = Ordering::Greater;
}

/// Minimum of the source (or of a selected value), earliest on ties.
pub type Min<T, V = T, P = Required> = Extreme<T, V, P, Smallest>;

/// Maximum of the source (or of a selected value), earliest on ties.
pub type Max<T, V = T, P = Required> = Extreme<T, V, P, Largest>;

/// An extremum aggregate, see [`Min`] and [`Max`].
///
/// Each element is projected through the selector (identity by default) and
/// compared with the current best using the comparer (natural order by
/// default). A candidate replaces the best only when strictly better, so ties
/// keep the earliest value. An extremum is never final before the source is
/// exhausted: its sink always reports [`Demand::More`].
///
/// Over an empty source the result is [`Error::EmptySequence`] unless the
/// factory was switched to [`or_none`](Extreme::or_none), in which case the
/// output is an `Option` and the result is `None`.
///
/// For `Option` elements, [`nullable`](Extreme::nullable) treats `None` as
/// "no value": such elements are skipped, and the result is `None` when no
/// element holds a value (an empty source included).
///
/// [`Error::EmptySequence`]: crate::core::Error::EmptySequence
///
/// # Examples
///
/// ```rust
/// use passweld::prelude::*;
///
/// let words = vec!["pear", "fig", "banana"];
/// let request = Request::new(words, Min::by(|w: &&str| w.len()))
///     .add(Max::new())?;
/// let (shortest, last) = request.into_results()?;
/// assert_eq!(shortest, 3);
/// assert_eq!(last, "pear");
/// # Ok::<(), passweld::Error>(())
/// ```
pub struct Extreme<T, V, P, D> {
    select: Projection<T, V>,
    compare: Comparer<V>,
    _marker: PhantomData<fn() -> (P, D)>,
}

impl<T, D> Extreme<T, T, Required, D>
where
    T: Clone + Ord + 'static,
    D: Direction,
{
    /// Extremum of the elements in their natural order.
    pub fn new() -> Self {
        Self::from_selector(identity(), natural_order())
    }
}

impl<T, D> Default for Extreme<T, T, Required, D>
where
    T: Clone + Ord + 'static,
    D: Direction,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, D> Extreme<T, T, Required, D>
where
    T: Clone + 'static,
    D: Direction,
{
    /// Extremum of the elements under `compare`.
    pub fn with_comparer<C>(compare: C) -> Self
    where
        C: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        Self::from_selector(identity(), Arc::new(compare))
    }
}

impl<T, V, D> Extreme<T, V, Required, D>
where
    T: 'static,
    V: Ord + 'static,
    D: Direction,
{
    /// Extremum of `select(element)` in natural order.
    pub fn by<F>(select: F) -> Self
    where
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        Self::from_selector(Arc::new(select), natural_order())
    }
}

impl<T: 'static, V: 'static, D: Direction> Extreme<T, V, Required, D> {
    /// Extremum of `select(element)` under `compare`.
    pub fn by_with<F, C>(select: F, compare: C) -> Self
    where
        F: Fn(&T) -> V + Send + Sync + 'static,
        C: Fn(&V, &V) -> Ordering + Send + Sync + 'static,
    {
        Self::from_selector(Arc::new(select), Arc::new(compare))
    }

    /// Return `None` instead of failing when the source is empty.
    pub fn or_none(self) -> Extreme<T, V, Optional, D> {
        Extreme::from_parts(self.select, self.compare)
    }
}

impl<V, D> Extreme<Option<V>, V, Optional, D>
where
    V: Clone + Ord + 'static,
    D: Direction,
{
    /// Extremum of the present values of `Option` elements in natural order.
    pub fn nullable() -> Self {
        Self::from_parts(Arc::new(Option::<V>::clone), natural_order())
    }
}

impl<V, D> Extreme<Option<V>, V, Optional, D>
where
    V: Clone + 'static,
    D: Direction,
{
    /// Extremum of the present values of `Option` elements under `compare`.
    pub fn nullable_with<C>(compare: C) -> Self
    where
        C: Fn(&V, &V) -> Ordering + Send + Sync + 'static,
    {
        Self::from_parts(Arc::new(Option::<V>::clone), Arc::new(compare))
    }
}

// Projection to the compared value; `None` skips the element.
type Projection<T, V> = Arc<dyn Fn(&T) -> Option<V> + Send + Sync>;

impl<T: 'static, V: 'static, P, D> Extreme<T, V, P, D> {
    fn from_selector(select: Selector<T, V>, compare: Comparer<V>) -> Self {
        Self::from_parts(Arc::new(move |item: &T| Some(select(item))), compare)
    }
}

impl<T, V, P, D> Extreme<T, V, P, D> {
    fn from_parts(select: Projection<T, V>, compare: Comparer<V>) -> Self {
        Self {
            select,
            compare,
            _marker: PhantomData,
        }
    }
}

impl<T, V, P, D> Clone for Extreme<T, V, P, D> {
    fn clone(&self) -> Self {
        Self::from_parts(self.select.clone(), self.compare.clone())
    }
}

impl<T, V, P, D> SinkFactory<T> for Extreme<T, V, P, D>
where
    P: EmptyPolicy<V>,
    D: Direction,
{
    type Output = P::Output;
    type Sink = ExtremeSink<T, V, P, D>;

    fn sink(&self) -> Self::Sink {
        ExtremeSink {
            select: self.select.clone(),
            compare: self.compare.clone(),
            best: None,
            _marker: PhantomData,
        }
    }
}

/// Per-run state of [`Extreme`].
pub struct ExtremeSink<T, V, P, D> {
    select: Projection<T, V>,
    compare: Comparer<V>,
    best: Option<V>,
    _marker: PhantomData<fn() -> (P, D)>,
}

impl<T, V, P, D> Sink for ExtremeSink<T, V, P, D>
where
    P: EmptyPolicy<V>,
    D: Direction,
{
    type Item = T;
    type Output = P::Output;

    fn accept_first(&mut self, item: &T) -> Result<Demand> {
        self.accept_next(item)
    }

    fn accept_next(&mut self, item: &T) -> Result<Demand> {
        let Some(candidate) = (self.select)(item) else {
            return Ok(Demand::More);
        };
        let replace = match &self.best {
            Some(best) => (self.compare)(&candidate, best) == D::REPLACES_ON,
            None => true,
        };
        if replace {
            self.best = Some(candidate);
        }
        Ok(Demand::More)
    }

    fn finish(self) -> Result<P::Output> {
        P::resolve(self.best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Error;
    use crate::sinks::testing::run_alone;

    #[derive(Debug, Clone, PartialEq)]
    struct Reading {
        sensor: &'static str,
        value: u32,
    }

    fn reading(sensor: &'static str, value: u32) -> Reading {
        Reading { sensor, value }
    }

    #[test]
    fn min_of_empty_source_fails() {
        let (result, _) = run_alone(&Min::<i32>::new(), &[]);
        assert!(matches!(result, Err(Error::EmptySequence)));
    }

    #[test]
    fn min_or_none_of_empty_source_is_none() {
        let (result, _) = run_alone(&Min::<i32>::new().or_none(), &[]);
        assert_eq!(result.unwrap(), None);
    }

    #[test]
    fn min_reads_whole_source() {
        let (result, used) = run_alone(&Min::new(), &[3, 1, 4, 1, 5]);
        assert_eq!(result.unwrap(), 1);
        assert_eq!(used, 5);
    }

    #[test]
    fn max_of_values() {
        let (result, _) = run_alone(&Max::new(), &[3, 1, 4, 5, 9, 2]);
        assert_eq!(result.unwrap(), 9);
    }

    #[test]
    fn ties_keep_earliest() {
        let items = [
            reading("a", 5),
            reading("b", 2),
            reading("c", 2),
            reading("d", 9),
            reading("e", 9),
        ];
        let by_value = |a: &Reading, b: &Reading| a.value.cmp(&b.value);

        let (min, _) = run_alone(&Min::with_comparer(by_value), &items);
        assert_eq!(min.unwrap().sensor, "b");

        let (max, _) = run_alone(&Max::with_comparer(by_value), &items);
        assert_eq!(max.unwrap().sensor, "d");
    }

    #[test]
    fn selector_projects_values() {
        let items = [reading("a", 5), reading("b", 2), reading("c", 7)];
        let (result, _) = run_alone(&Min::by(|r: &Reading| r.value), &items);
        assert_eq!(result.unwrap(), 2);
    }

    #[test]
    fn selector_with_comparer() {
        let items = ["apple", "Fig", "banana"];
        let (result, _) = run_alone(
            &Min::by_with(
                |s: &&str| s.to_lowercase(),
                |a: &String, b: &String| b.len().cmp(&a.len()),
            ),
            &items,
        );
        assert_eq!(result.unwrap(), "banana");
    }

    #[test]
    fn optional_returns_value_when_present() {
        let (result, _) = run_alone(&Max::new().or_none(), &[4, 8, 1]);
        assert_eq!(result.unwrap(), Some(8));
    }

    #[test]
    fn nullable_of_empty_source_is_none() {
        let (result, _) = run_alone(&Min::<Option<i32>, i32, Optional>::nullable(), &[]);
        assert_eq!(result.unwrap(), None);
    }

    #[test]
    fn nullable_skips_missing_values() {
        let items = [Some(3), None, Some(1)];

        let (min, used) = run_alone(&Min::nullable(), &items);
        assert_eq!(min.unwrap(), Some(1));
        assert_eq!(used, 3);

        let (max, _) = run_alone(&Max::nullable(), &items);
        assert_eq!(max.unwrap(), Some(3));
    }

    #[test]
    fn nullable_with_only_missing_values_is_none() {
        let (result, _) = run_alone(&Max::<Option<u8>, u8, Optional>::nullable(), &[None, None]);
        assert_eq!(result.unwrap(), None);
    }

    #[test]
    fn nullable_with_comparer_keeps_earliest_tie() {
        let items = [None, Some("Fig"), Some("pear"), Some("fig")];
        let (result, _) = run_alone(
            &Min::nullable_with(|a: &&str, b: &&str| a.len().cmp(&b.len())),
            &items,
        );
        assert_eq!(result.unwrap(), Some("Fig"));
    }
}
