use std::collections::HashMap;
use std::sync::{Condvar, Mutex, MutexGuard};

use tracing::{event, Level};

use crate::error::*;
use crate::multivariate::Monomial;
use crate::multivariate::polynomial::Polynomial;

///
/// The derived invariants of an ideal that are cached.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Invariant {
    GroebnerBasis,
    MinimalBase,
    Dimension,
    Codimension,
    Codimensions,
    Radical,
    PrimaryDecomposition,
    LeadingMonomials,
    IndependentSets,
    IsUnit
}

///
/// A cached value. Which variant is stored is determined by the [`Invariant`].
///
#[derive(Debug, Clone, PartialEq)]
pub enum Derived {
    Polynomials(Vec<Polynomial>),
    Monomials(Vec<Monomial>),
    Integer(i64),
    Integers(Vec<i64>),
    IntegerVectors(Vec<Vec<i64>>),
    Decomposition(Vec<(Vec<Polynomial>, Vec<Polynomial>)>),
    Boolean(bool)
}

enum Slot {
    Computing,
    Cached(Derived)
}

struct CacheState {
    /// incremented on every invalidation, so that computations started before can detect it
    generation: u64,
    slots: HashMap<Invariant, Slot>
}

///
/// Cache of derived invariants, each of which is in one of the states "uncomputed"
/// (no slot), "computing" or "cached".
///
/// If multiple threads request the same uncomputed invariant, only one computes it,
/// and the others wait for the result. Invalidation moves all invariants back to
/// "uncomputed"; the results of computations that were in flight at this time are
/// returned to their caller, but not stored.
///
pub struct PropertyCache {
    state: Mutex<CacheState>,
    changed: Condvar
}

///
/// Removes the "computing" marker if the computation does not finish normally.
///
struct InFlight<'a> {
    cache: &'a PropertyCache,
    key: Invariant,
    generation: u64,
    done: bool
}

impl<'a> InFlight<'a> {

    fn finish(mut self, result: &Result<Derived>) {
        let mut state = self.cache.lock();
        if state.generation == self.generation {
            match result {
                Ok(value) => {
                    _ = state.slots.insert(self.key, Slot::Cached(value.clone()));
                },
                Err(e) => {
                    event!(Level::DEBUG, invariant = ?self.key, error = %e, "computation failed");
                    _ = state.slots.remove(&self.key);
                }
            }
        } else {
            event!(Level::DEBUG, invariant = ?self.key, "discarding result computed before invalidation");
        }
        self.done = true;
        self.cache.changed.notify_all();
    }
}

impl<'a> Drop for InFlight<'a> {

    fn drop(&mut self) {
        if !self.done {
            let mut state = self.cache.lock();
            if state.generation == self.generation {
                _ = state.slots.remove(&self.key);
            }
            self.cache.changed.notify_all();
        }
    }
}

impl PropertyCache {

    pub fn new() -> Self {
        PropertyCache {
            state: Mutex::new(CacheState { generation: 0, slots: HashMap::new() }),
            changed: Condvar::new()
        }
    }

    fn lock(&self) -> MutexGuard<CacheState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, key: Invariant) -> Option<Derived> {
        match self.lock().slots.get(&key) {
            Some(Slot::Cached(value)) => Some(value.clone()),
            _ => None
        }
    }

    pub fn is_cached(&self, key: Invariant) -> bool {
        self.get(key).is_some()
    }

    ///
    /// Returns the cached value for `key`, or computes it using `compute` and caches it.
    /// If another thread is currently computing the value, waits for it instead.
    ///
    /// Errors are not cached, so the next call will try to compute the value again.
    ///
    pub fn get_or_try_init<F>(&self, key: Invariant, compute: F) -> Result<Derived>
        where F: FnOnce() -> Result<Derived>
    {
        let mut state = self.lock();
        loop {
            match state.slots.get(&key) {
                Some(Slot::Cached(value)) => {
                    event!(Level::TRACE, invariant = ?key, "cache hit");
                    return Ok(value.clone());
                },
                Some(Slot::Computing) => {
                    state = self.changed.wait(state).unwrap_or_else(|poisoned| poisoned.into_inner());
                },
                None => break
            }
        }
        event!(Level::DEBUG, invariant = ?key, "cache miss");
        _ = state.slots.insert(key, Slot::Computing);
        let in_flight = InFlight { cache: self, key, generation: state.generation, done: false };
        drop(state);

        let result = compute();
        in_flight.finish(&result);
        return result;
    }

    ///
    /// Clears all cached values. Computations currently in flight will not store their result.
    ///
    pub fn invalidate_all(&self) {
        let mut state = self.lock();
        state.generation += 1;
        state.slots.clear();
        event!(Level::DEBUG, generation = state.generation, "invalidated all cached properties");
        self.changed.notify_all();
    }
}

impl Clone for PropertyCache {

    fn clone(&self) -> Self {
        let state = self.lock();
        PropertyCache {
            state: Mutex::new(CacheState {
                generation: 0,
                slots: state.slots.iter().filter_map(|(key, slot)| match slot {
                    Slot::Cached(value) => Some((*key, Slot::Cached(value.clone()))),
                    Slot::Computing => None
                }).collect()
            }),
            changed: Condvar::new()
        }
    }
}

impl Default for PropertyCache {

    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn test_get_or_try_init() {
    let cache = PropertyCache::new();
    let calls = AtomicUsize::new(0);
    let compute = || { calls.fetch_add(1, Ordering::SeqCst); Ok(Derived::Integer(3)) };
    assert_eq!(Derived::Integer(3), cache.get_or_try_init(Invariant::Dimension, compute).unwrap());
    assert_eq!(Derived::Integer(3), cache.get_or_try_init(Invariant::Dimension, compute).unwrap());
    assert_eq!(1, calls.load(Ordering::SeqCst));
    assert!(cache.is_cached(Invariant::Dimension));
    assert!(!cache.is_cached(Invariant::GroebnerBasis));

    cache.invalidate_all();
    assert!(!cache.is_cached(Invariant::Dimension));
    assert_eq!(Derived::Integer(3), cache.get_or_try_init(Invariant::Dimension, compute).unwrap());
    assert_eq!(2, calls.load(Ordering::SeqCst));
}

#[test]
fn test_errors_are_not_cached() {
    let cache = PropertyCache::new();
    let err = cache.get_or_try_init(Invariant::Radical, || Err(EngineError::timeout("1 s").into())).unwrap_err();
    assert_eq!(AlgebraError::Engine(EngineError::timeout("1 s")), err);
    assert!(!cache.is_cached(Invariant::Radical));
    assert_eq!(Derived::Boolean(true), cache.get_or_try_init(Invariant::Radical, || Ok(Derived::Boolean(true))).unwrap());
}

#[test]
fn test_invalidation_during_computation() {
    let cache = PropertyCache::new();
    let result = cache.get_or_try_init(Invariant::Dimension, || {
        cache.invalidate_all();
        Ok(Derived::Integer(1))
    }).unwrap();
    assert_eq!(Derived::Integer(1), result);
    assert!(!cache.is_cached(Invariant::Dimension));
}

#[test]
fn test_panic_during_computation() {
    let cache = PropertyCache::new();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        cache.get_or_try_init(Invariant::Dimension, || panic!("computation failed"))
    }));
    assert!(result.is_err());
    assert_eq!(Derived::Integer(0), cache.get_or_try_init(Invariant::Dimension, || Ok(Derived::Integer(0))).unwrap());
}

#[test]
fn test_concurrent_readers() {
    let cache = PropertyCache::new();
    let calls = AtomicUsize::new(0);
    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                let value = cache.get_or_try_init(Invariant::GroebnerBasis, || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    std::thread::sleep(std::time::Duration::from_millis(20));
                    Ok(Derived::Integers(vec![1, 2]))
                }).unwrap();
                assert_eq!(Derived::Integers(vec![1, 2]), value);
            });
        }
    });
    assert_eq!(1, calls.load(Ordering::SeqCst));
}

#[test]
fn test_clone() {
    let cache = PropertyCache::new();
    cache.get_or_try_init(Invariant::IsUnit, || Ok(Derived::Boolean(false))).unwrap();
    let cloned = cache.clone();
    cache.invalidate_all();
    assert!(cloned.is_cached(Invariant::IsUnit));
    assert!(!cache.is_cached(Invariant::IsUnit));
}
