//! Duplicate detection.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use crate::compare::{identity, EqualityComparer, NaturalEq, Selector};
use crate::core::{Demand, Result, Sink, SinkFactory};

/// Answers whether any two elements share a key.
///
/// The key is the element itself unless a key selector is given; keys are
/// compared with natural equality unless an [`EqualityComparer`] is given.
/// The answer is final as soon as one duplicate is seen, so the sink reports
/// [`Demand::Satisfied`] at that point. An empty source has no duplicates.
///
/// # Examples
///
/// ```rust
/// use passweld::prelude::*;
///
/// let request = Request::new(vec![3, 1, 4, 1, 5], HasDuplicates::new());
/// let (dupes,) = request.into_results()?;
/// assert!(dupes);
/// # Ok::<(), passweld::Error>(())
/// ```
pub struct HasDuplicates<T, K = T> {
    key: Selector<T, K>,
    comparer: Arc<dyn EqualityComparer<K>>,
}

impl<T> HasDuplicates<T, T>
where
    T: Clone + Hash + Eq + 'static,
{
    /// Detect duplicate elements using natural equality.
    pub fn new() -> Self {
        Self {
            key: identity(),
            comparer: Arc::new(NaturalEq::new()),
        }
    }
}

impl<T> Default for HasDuplicates<T, T>
where
    T: Clone + Hash + Eq + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HasDuplicates<T, T>
where
    T: Clone + 'static,
{
    /// Detect duplicate elements using `comparer`.
    pub fn with_comparer<C>(comparer: C) -> Self
    where
        C: EqualityComparer<T> + 'static,
    {
        Self {
            key: identity(),
            comparer: Arc::new(comparer),
        }
    }
}

impl<T, K> HasDuplicates<T, K>
where
    K: Hash + Eq + 'static,
{
    /// Detect elements whose selected keys are equal.
    pub fn by_key<F>(key: F) -> Self
    where
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        Self {
            key: Arc::new(key),
            comparer: Arc::new(NaturalEq::new()),
        }
    }
}

impl<T, K> HasDuplicates<T, K> {
    /// Detect elements whose selected keys are equal under `comparer`.
    pub fn by_key_with<F, C>(key: F, comparer: C) -> Self
    where
        F: Fn(&T) -> K + Send + Sync + 'static,
        C: EqualityComparer<K> + 'static,
    {
        Self {
            key: Arc::new(key),
            comparer: Arc::new(comparer),
        }
    }
}

impl<T, K> Clone for HasDuplicates<T, K> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            comparer: self.comparer.clone(),
        }
    }
}

impl<T, K> SinkFactory<T> for HasDuplicates<T, K> {
    type Output = bool;
    type Sink = HasDuplicatesSink<T, K>;

    fn sink(&self) -> Self::Sink {
        HasDuplicatesSink {
            key: self.key.clone(),
            comparer: self.comparer.clone(),
            seen: HashMap::new(),
            found: false,
        }
    }
}

/// Per-run state of [`HasDuplicates`].
pub struct HasDuplicatesSink<T, K> {
    key: Selector<T, K>,
    comparer: Arc<dyn EqualityComparer<K>>,
    /// Keys seen so far, bucketed by the comparer's hash
    seen: HashMap<u64, Vec<K>>,
    found: bool,
}

impl<T, K> HasDuplicatesSink<T, K> {
    /// Record `key`; returns true if an equal key was already present.
    fn observe(&mut self, key: K) -> bool {
        let bucket = self.seen.entry(self.comparer.hash(&key)).or_default();
        if bucket.iter().any(|seen| self.comparer.equals(seen, &key)) {
            return true;
        }
        bucket.push(key);
        false
    }
}

impl<T, K> Sink for HasDuplicatesSink<T, K> {
    type Item = T;
    type Output = bool;

    fn accept_first(&mut self, item: &T) -> Result<Demand> {
        let key = (self.key)(item);
        self.observe(key);
        Ok(Demand::More)
    }

    fn accept_next(&mut self, item: &T) -> Result<Demand> {
        if self.found {
            return Ok(Demand::Satisfied);
        }
        let key = (self.key)(item);
        if self.observe(key) {
            self.found = true;
            return Ok(Demand::Satisfied);
        }
        Ok(Demand::More)
    }

    fn finish(self) -> Result<bool> {
        Ok(self.found)
    }
}
