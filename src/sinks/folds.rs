//! Counting, summing, predicates, first element and general folds.

use std::marker::PhantomData;
use std::ops::Add;
use std::sync::Arc;

use super::{EmptyPolicy, Optional, Required};
use crate::compare::{identity, Predicate, Selector};
use crate::core::{Demand, Error, Result, Sink, SinkFactory};

/// Number of elements, or of elements matching a predicate.
pub struct Count<T> {
    predicate: Option<Predicate<T>>,
}

impl<T> Count<T> {
    /// Count every element.
    pub fn new() -> Self {
        Self { predicate: None }
    }

    /// Count elements for which `predicate` holds.
    pub fn matching<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Some(Arc::new(predicate)),
        }
    }
}

impl<T> Default for Count<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Count<T> {
    fn clone(&self) -> Self {
        Self {
            predicate: self.predicate.clone(),
        }
    }
}

impl<T> SinkFactory<T> for Count<T> {
    type Output = usize;
    type Sink = CountSink<T>;

    fn sink(&self) -> Self::Sink {
        CountSink {
            predicate: self.predicate.clone(),
            count: 0,
        }
    }
}

/// Per-run state of [`Count`].
pub struct CountSink<T> {
    predicate: Option<Predicate<T>>,
    count: usize,
}

impl<T> Sink for CountSink<T> {
    type Item = T;
    type Output = usize;

    fn accept_first(&mut self, item: &T) -> Result<Demand> {
        self.accept_next(item)
    }

    fn accept_next(&mut self, item: &T) -> Result<Demand> {
        if self.predicate.as_ref().map_or(true, |p| p(item)) {
            self.count += 1;
        }
        Ok(Demand::More)
    }

    fn finish(self) -> Result<usize> {
        Ok(self.count)
    }
}

/// Sum of the elements, or of a selected value. Zero (`V::default()`) for an
/// empty source.
///
/// Values are combined with `+`, so integer overflow behaves as it does for
/// [`Iterator::sum`]: a panic in debug builds, wrapping in release builds.
/// [`Sum::checked`] fails the traversal instead.
///
/// # Examples
///
/// ```rust
/// use passweld::prelude::*;
///
/// let request = Request::new(vec![i32::MAX, 1], Sum::checked());
/// assert_eq!(request.into_results().unwrap_err().to_string(), "sum overflowed");
/// ```
pub struct Sum<T, V = T> {
    select: Selector<T, V>,
}

impl<T> Sum<T, T>
where
    T: Clone + Default + Add<Output = T> + 'static,
{
    pub fn new() -> Self {
        Self { select: identity() }
    }
}

impl<T> Default for Sum<T, T>
where
    T: Clone + Default + Add<Output = T> + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Sum<T, T>
where
    T: CheckedAdd + Clone + Default + Send + Sync + 'static,
{
    /// Sum that fails with [`Error::Custom`] on overflow.
    pub fn checked() -> Fold<T, T> {
        Fold::new(T::default(), |acc: T, x: &T| {
            acc.checked_add(x.clone())
                .ok_or_else(|| Error::custom("sum overflowed"))
        })
    }
}

/// Addition that reports overflow, for [`Sum::checked`].
pub trait CheckedAdd: Sized {
    fn checked_add(self, rhs: Self) -> Option<Self>;
}

macro_rules! impl_checked_add {
    ($($t:ty),* $(,)?) => {
        $(
            impl CheckedAdd for $t {
                fn checked_add(self, rhs: Self) -> Option<Self> {
                    <$t>::checked_add(self, rhs)
                }
            }
        )*
    };
}

impl_checked_add!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl<T, V> Sum<T, V>
where
    V: Default + Add<Output = V>,
{
    pub fn by<F>(select: F) -> Self
    where
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        Self {
            select: Arc::new(select),
        }
    }
}

impl<T, V> Clone for Sum<T, V> {
    fn clone(&self) -> Self {
        Self {
            select: self.select.clone(),
        }
    }
}

impl<T, V> SinkFactory<T> for Sum<T, V>
where
    V: Default + Add<Output = V>,
{
    type Output = V;
    type Sink = SumSink<T, V>;

    fn sink(&self) -> Self::Sink {
        SumSink {
            select: self.select.clone(),
            total: V::default(),
        }
    }
}

/// Per-run state of [`Sum`].
pub struct SumSink<T, V> {
    select: Selector<T, V>,
    total: V,
}

impl<T, V> Sink for SumSink<T, V>
where
    V: Default + Add<Output = V>,
{
    type Item = T;
    type Output = V;

    fn accept_first(&mut self, item: &T) -> Result<Demand> {
        self.accept_next(item)
    }

    fn accept_next(&mut self, item: &T) -> Result<Demand> {
        let value = (self.select)(item);
        self.total = std::mem::take(&mut self.total) + value;
        Ok(Demand::More)
    }

    fn finish(self) -> Result<V> {
        Ok(self.total)
    }
}

/// Whether any element satisfies a predicate. Final at the first match;
/// `false` for an empty source.
pub struct AnyMatch<T> {
    predicate: Predicate<T>,
}

impl<T> AnyMatch<T> {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
        }
    }
}

impl<T> Clone for AnyMatch<T> {
    fn clone(&self) -> Self {
        Self {
            predicate: self.predicate.clone(),
        }
    }
}

impl<T> SinkFactory<T> for AnyMatch<T> {
    type Output = bool;
    type Sink = AnyMatchSink<T>;

    fn sink(&self) -> Self::Sink {
        AnyMatchSink {
            predicate: self.predicate.clone(),
            matched: false,
        }
    }
}

/// Per-run state of [`AnyMatch`].
pub struct AnyMatchSink<T> {
    predicate: Predicate<T>,
    matched: bool,
}

impl<T> Sink for AnyMatchSink<T> {
    type Item = T;
    type Output = bool;

    fn accept_first(&mut self, item: &T) -> Result<Demand> {
        self.accept_next(item)
    }

    fn accept_next(&mut self, item: &T) -> Result<Demand> {
        if !self.matched {
            self.matched = (self.predicate)(item);
        }
        Ok(Demand::from(!self.matched))
    }

    fn finish(self) -> Result<bool> {
        Ok(self.matched)
    }
}

/// Whether every element satisfies a predicate. Final at the first element
/// that does not; `true` for an empty source.
pub struct AllMatch<T> {
    predicate: Predicate<T>,
}

impl<T> AllMatch<T> {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
        }
    }
}

impl<T> Clone for AllMatch<T> {
    fn clone(&self) -> Self {
        Self {
            predicate: self.predicate.clone(),
        }
    }
}

impl<T> SinkFactory<T> for AllMatch<T> {
    type Output = bool;
    type Sink = AllMatchSink<T>;

    fn sink(&self) -> Self::Sink {
        AllMatchSink {
            predicate: self.predicate.clone(),
            failed: false,
        }
    }
}

/// Per-run state of [`AllMatch`].
pub struct AllMatchSink<T> {
    predicate: Predicate<T>,
    failed: bool,
}

impl<T> Sink for AllMatchSink<T> {
    type Item = T;
    type Output = bool;

    fn accept_first(&mut self, item: &T) -> Result<Demand> {
        self.accept_next(item)
    }

    fn accept_next(&mut self, item: &T) -> Result<Demand> {
        if !self.failed {
            self.failed = !(self.predicate)(item);
        }
        Ok(Demand::from(!self.failed))
    }

    fn finish(self) -> Result<bool> {
        Ok(!self.failed)
    }
}

/// The first element, or the first element matching a predicate.
///
/// Final as soon as it is found. Fails with
/// [`Error::EmptySequence`](crate::core::Error::EmptySequence) when nothing
/// matched, unless switched to [`or_none`](First::or_none).
pub struct First<T, P = Required> {
    predicate: Option<Predicate<T>>,
    _policy: PhantomData<fn() -> P>,
}

impl<T: Clone> First<T, Required> {
    pub fn new() -> Self {
        Self {
            predicate: None,
            _policy: PhantomData,
        }
    }

    pub fn matching<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Some(Arc::new(predicate)),
            _policy: PhantomData,
        }
    }

    /// Return `None` instead of failing when nothing matched.
    pub fn or_none(self) -> First<T, Optional> {
        First {
            predicate: self.predicate,
            _policy: PhantomData,
        }
    }
}

impl<T: Clone> Default for First<T, Required> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P> Clone for First<T, P> {
    fn clone(&self) -> Self {
        Self {
            predicate: self.predicate.clone(),
            _policy: PhantomData,
        }
    }
}

impl<T, P> SinkFactory<T> for First<T, P>
where
    T: Clone,
    P: EmptyPolicy<T>,
{
    type Output = P::Output;
    type Sink = FirstSink<T, P>;

    fn sink(&self) -> Self::Sink {
        FirstSink {
            predicate: self.predicate.clone(),
            found: None,
            _policy: PhantomData,
        }
    }
}

/// Per-run state of [`First`].
pub struct FirstSink<T, P> {
    predicate: Option<Predicate<T>>,
    found: Option<T>,
    _policy: PhantomData<fn() -> P>,
}

impl<T, P> Sink for FirstSink<T, P>
where
    T: Clone,
    P: EmptyPolicy<T>,
{
    type Item = T;
    type Output = P::Output;

    fn accept_first(&mut self, item: &T) -> Result<Demand> {
        self.accept_next(item)
    }

    fn accept_next(&mut self, item: &T) -> Result<Demand> {
        if self.found.is_none() && self.predicate.as_ref().map_or(true, |p| p(item)) {
            self.found = Some(item.clone());
        }
        Ok(Demand::from(self.found.is_none()))
    }

    fn finish(self) -> Result<P::Output> {
        P::resolve(self.found)
    }
}

/// Folding function used by [`Fold`]; its error aborts the traversal.
pub type Folder<A, T> = Arc<dyn Fn(A, &T) -> Result<A> + Send + Sync>;

/// A general left fold from a seed, with a fallible folding function.
///
/// The seed is the result for an empty source. An error from the folding
/// function aborts the whole pass, so no aggregate of the request produces a
/// result for that run.
///
/// # Examples
///
/// ```rust
/// use passweld::prelude::*;
///
/// let checked_sum = Fold::new(0u8, |acc: u8, x: &u8| {
///     acc.checked_add(*x).ok_or_else(|| Error::custom("overflow"))
/// });
/// let request = Request::new(vec![200u8, 100], checked_sum);
/// assert!(request.into_results().is_err());
/// ```
pub struct Fold<T, A> {
    seed: A,
    folder: Folder<A, T>,
}

impl<T, A: Clone> Fold<T, A> {
    pub fn new<F>(seed: A, folder: F) -> Self
    where
        F: Fn(A, &T) -> Result<A> + Send + Sync + 'static,
    {
        Self {
            seed,
            folder: Arc::new(folder),
        }
    }
}

impl<T, A: Clone> Clone for Fold<T, A> {
    fn clone(&self) -> Self {
        Self {
            seed: self.seed.clone(),
            folder: self.folder.clone(),
        }
    }
}

impl<T, A: Clone> SinkFactory<T> for Fold<T, A> {
    type Output = A;
    type Sink = FoldSink<T, A>;

    fn sink(&self) -> Self::Sink {
        FoldSink {
            acc: Some(self.seed.clone()),
            folder: self.folder.clone(),
        }
    }
}

/// Per-run state of [`Fold`].
pub struct FoldSink<T, A> {
    /// Only `None` while the folder runs, or after it failed
    acc: Option<A>,
    folder: Folder<A, T>,
}

impl<T, A> Sink for FoldSink<T, A> {
    type Item = T;
    type Output = A;

    fn accept_first(&mut self, item: &T) -> Result<Demand> {
        self.accept_next(item)
    }

    fn accept_next(&mut self, item: &T) -> Result<Demand> {
        let acc = self
            .acc
            .take()
            .ok_or_else(|| Error::contract("fold used after its folder failed"))?;
        self.acc = Some((self.folder)(acc, item)?);
        Ok(Demand::More)
    }

    fn finish(self) -> Result<A> {
        self.acc
            .ok_or_else(|| Error::contract("fold finished after its folder failed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::testing::run_alone;

    #[test]
    fn count_all_and_matching() {
        let items = [1, 2, 3, 4, 5, 6];
        assert_eq!(run_alone(&Count::new(), &items).0.unwrap(), 6);
        assert_eq!(
            run_alone(&Count::matching(|x: &i32| x % 2 == 0), &items).0.unwrap(),
            3
        );
        assert_eq!(run_alone(&Count::<i32>::new(), &[]).0.unwrap(), 0);
    }

    #[test]
    fn sum_identity_and_selector() {
        assert_eq!(run_alone(&Sum::new(), &[1, 2, 3]).0.unwrap(), 6);
        assert_eq!(run_alone(&Sum::<i64>::new(), &[]).0.unwrap(), 0);
        let words = ["a", "bcd", "ef"];
        assert_eq!(run_alone(&Sum::by(|w: &&str| w.len()), &words).0.unwrap(), 6);
    }

    #[test]
    fn checked_sum_fails_on_overflow() {
        let (result, _) = run_alone(&Sum::checked(), &[i32::MAX, 1]);
        let err = result.unwrap_err();
        assert!(matches!(err, Error::Custom(_)));
        assert_eq!(err.to_string(), "sum overflowed");

        let (result, _) = run_alone(&Sum::checked(), &[u8::MAX - 1, 1]);
        assert_eq!(result.unwrap(), u8::MAX);
        assert_eq!(run_alone(&Sum::<i64>::checked(), &[]).0.unwrap(), 0);
    }

    #[test]
    fn any_stops_at_first_match() {
        let (result, used) = run_alone(&AnyMatch::new(|x: &i32| *x > 2), &[1, 2, 3, 4, 5]);
        assert!(result.unwrap());
        assert_eq!(used, 3);

        let (empty, _) = run_alone(&AnyMatch::new(|_: &i32| true), &[]);
        assert!(!empty.unwrap());
    }

    #[test]
    fn all_stops_at_first_mismatch() {
        let (result, used) = run_alone(&AllMatch::new(|x: &i32| *x < 3), &[1, 2, 3, 4, 5]);
        assert!(!result.unwrap());
        assert_eq!(used, 3);

        let (empty, _) = run_alone(&AllMatch::new(|_: &i32| false), &[]);
        assert!(empty.unwrap());
    }

    #[test]
    fn first_is_satisfied_immediately() {
        let (result, used) = run_alone(&First::new(), &[7, 8, 9]);
        assert_eq!(result.unwrap(), 7);
        assert_eq!(used, 1);
    }

    #[test]
    fn first_matching_and_absence() {
        let (result, used) = run_alone(&First::matching(|x: &i32| *x > 7), &[7, 8, 9]);
        assert_eq!(result.unwrap(), 8);
        assert_eq!(used, 2);

        let (missing, _) = run_alone(&First::matching(|x: &i32| *x > 100), &[7, 8, 9]);
        assert!(matches!(missing, Err(Error::EmptySequence)));

        let (none, _) = run_alone(&First::<i32>::new().or_none(), &[]);
        assert_eq!(none.unwrap(), None);
    }

    #[test]
    fn fold_accumulates_from_seed() {
        let concat = Fold::new(String::new(), |mut acc: String, s: &&str| {
            acc.push_str(s);
            Ok(acc)
        });
        assert_eq!(run_alone(&concat, &["a", "b", "c"]).0.unwrap(), "abc");
        assert_eq!(run_alone(&concat, &[]).0.unwrap(), "");
    }

    #[test]
    fn fold_error_propagates_unchanged() {
        let failing = Fold::new(0, |acc: i32, x: &i32| {
            if *x < 0 {
                Err(Error::custom("negative input"))
            } else {
                Ok(acc + x)
            }
        });
        let (result, used) = run_alone(&failing, &[1, -1, 2]);
        assert!(matches!(result, Err(Error::Custom(msg)) if msg == "negative input"));
        assert_eq!(used, 2);
    }
}
