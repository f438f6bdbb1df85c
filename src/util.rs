//! Utility functions and helper types.
//!
//! [`Tally`] wraps a source and counts how it is used: how many cursors were
//! opened, how many times they were advanced, and how many were released.
//! It is how the single-traversal and early-stop guarantees are observed from
//! the outside.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Counters {
    cursors: AtomicUsize,
    advances: AtomicUsize,
    yielded: AtomicUsize,
    released: AtomicUsize,
}

/// Shared view of a [`Tally`]'s counters; stays readable after the tally
/// has been consumed.
#[derive(Debug, Clone, Default)]
pub struct TallyStats {
    counters: Arc<Counters>,
}

impl TallyStats {
    /// Number of cursors opened (calls to `into_iter`)
    pub fn cursors(&self) -> usize {
        self.counters.cursors.load(Ordering::SeqCst)
    }

    /// Number of calls to `next` on any cursor
    pub fn advances(&self) -> usize {
        self.counters.advances.load(Ordering::SeqCst)
    }

    /// Number of elements produced
    pub fn yielded(&self) -> usize {
        self.counters.yielded.load(Ordering::SeqCst)
    }

    /// Number of cursors dropped
    pub fn released(&self) -> usize {
        self.counters.released.load(Ordering::SeqCst)
    }
}

/// A source wrapper that records cursor usage.
///
/// # Examples
///
/// ```rust
/// use passweld::prelude::*;
/// use passweld::util::Tally;
///
/// let (source, stats) = Tally::new(vec![1, 2, 2, 3, 3, 3]);
/// let request = Request::new(source, HasDuplicates::new());
/// assert_eq!(request.results()?, (&true,));
/// assert_eq!(stats.advances(), 3);
/// assert_eq!(stats.released(), 1);
/// # Ok::<(), passweld::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Tally<I> {
    inner: I,
    stats: TallyStats,
}

impl<I: IntoIterator> Tally<I> {
    /// Wrap `inner`, returning the tally and a handle to its counters
    pub fn new(inner: I) -> (Self, TallyStats) {
        let stats = TallyStats::default();
        let tally = Self {
            inner,
            stats: stats.clone(),
        };
        (tally, stats)
    }

    /// Get a handle to the counters
    pub fn stats(&self) -> TallyStats {
        self.stats.clone()
    }
}

impl<I: IntoIterator> IntoIterator for Tally<I> {
    type Item = I::Item;
    type IntoIter = TallyCursor<I::IntoIter>;

    fn into_iter(self) -> Self::IntoIter {
        self.stats.counters.cursors.fetch_add(1, Ordering::SeqCst);
        TallyCursor {
            inner: self.inner.into_iter(),
            stats: self.stats,
        }
    }
}

/// Cursor handed out by [`Tally`].
#[derive(Debug)]
pub struct TallyCursor<I> {
    inner: I,
    stats: TallyStats,
}

impl<I: Iterator> Iterator for TallyCursor<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        self.stats.counters.advances.fetch_add(1, Ordering::SeqCst);
        let item = self.inner.next();
        if item.is_some() {
            self.stats.counters.yielded.fetch_add(1, Ordering::SeqCst);
        }
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<I> Drop for TallyCursor<I> {
    fn drop(&mut self) {
        self.stats.counters.released.fetch_add(1, Ordering::SeqCst);
    }
}
