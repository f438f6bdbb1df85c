//! Comparers and selectors injected into sink factories.
//!
//! Every option defaults to natural semantics: identity selection, `Hash + Eq`
//! equality and `Ord` ordering. Closures are held behind `Arc` so a factory can
//! hand them to each sink it builds without cloning user state.

use std::cmp::Ordering;
use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

/// Shared projection from an element to the value an aggregate works on.
pub type Selector<T, V> = Arc<dyn Fn(&T) -> V + Send + Sync>;

/// Shared total ordering over values.
pub type Comparer<V> = Arc<dyn Fn(&V, &V) -> Ordering + Send + Sync>;

/// Shared element predicate.
pub type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Selector that clones the element itself.
pub fn identity<T: Clone + 'static>() -> Selector<T, T> {
    Arc::new(T::clone)
}

/// Comparer using the value's natural order.
pub fn natural_order<V: Ord + 'static>() -> Comparer<V> {
    Arc::new(V::cmp)
}

/// Flip a comparer.
pub fn reverse<V: 'static>(comparer: Comparer<V>) -> Comparer<V> {
    Arc::new(move |a: &V, b: &V| comparer(a, b).reverse())
}

/// Equality over keys, consistent with a hash.
///
/// Keys that compare equal must hash equal. Duplicate detection buckets keys
/// by [`hash`](EqualityComparer::hash) and only calls
/// [`equals`](EqualityComparer::equals) within a bucket.
pub trait EqualityComparer<K: ?Sized>: Send + Sync {
    fn hash(&self, key: &K) -> u64;

    fn equals(&self, a: &K, b: &K) -> bool;
}

/// Natural equality: `Hash` + `Eq`.
#[derive(Debug, Clone, Default)]
pub struct NaturalEq {
    state: RandomState,
}

impl NaturalEq {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K: Hash + Eq + ?Sized> EqualityComparer<K> for NaturalEq {
    fn hash(&self, key: &K) -> u64 {
        self.state.hash_one(key)
    }

    fn equals(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

/// An equality comparer built from a hash closure and an equality closure.
pub struct FnEq<H, E> {
    hash: H,
    eq: E,
}

impl<H, E> FnEq<H, E> {
    /// Create a comparer from `hash` and `eq`; keys equal under `eq` must
    /// produce the same `hash`.
    pub fn new(hash: H, eq: E) -> Self {
        Self { hash, eq }
    }
}

impl<K, H, E> EqualityComparer<K> for FnEq<H, E>
where
    K: ?Sized,
    H: Fn(&K) -> u64 + Send + Sync,
    E: Fn(&K, &K) -> bool + Send + Sync,
{
    fn hash(&self, key: &K) -> u64 {
        (self.hash)(key)
    }

    fn equals(&self, a: &K, b: &K) -> bool {
        (self.eq)(a, b)
    }
}

impl<K: ?Sized, C: EqualityComparer<K> + ?Sized> EqualityComparer<K> for Arc<C> {
    fn hash(&self, key: &K) -> u64 {
        (**self).hash(key)
    }

    fn equals(&self, a: &K, b: &K) -> bool {
        (**self).equals(a, b)
    }
}
