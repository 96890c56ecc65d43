//! Optional memoization for the compute facade.
//!
//! # Architecture
//!
//! - `LinkedHashMap` keeps access order for LRU eviction
//! - `parking_lot::RwLock` guards the map (lookups take the write lock
//!   because `get_refresh` reorders)
//! - atomic counters for hits and misses
//!
//! A cache is created by the caller and handed to
//! [`Engine::with_cache`](crate::compute::Engine::with_cache); there is no
//! process-wide instance. Keys include the space's curvature, dimension and
//! backend, so one cache may be shared between engines over different
//! spaces.

use std::sync::atomic::{AtomicU64, Ordering};

use linked_hash_map::LinkedHashMap;
use parking_lot::RwLock;
use serde::Serialize;
use tracing::debug;

use crate::compute::{Argument, ComputeValue, Operation};
use crate::config::NumericBackend;
use crate::error::{GyroError, GyroResult, NumericalInstabilityWarning};
use crate::point::Model;
use crate::space::GyrovectorSpace;

/// Default number of memoized results.
pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

const TAG_POINT: u64 = 1;
const TAG_VECTOR: u64 = 2;
const TAG_SCALAR: u64 = 3;
const TAG_TRANSFORMATION: u64 = 4;

/// Memoization key: operation, model, space parameters and the inputs
/// rounded to `cache_precision` decimal places.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    operation: Operation,
    model: Model,
    backend: NumericBackend,
    curvature: u64,
    dimension: usize,
    inputs: Vec<u64>,
}

impl CacheKey {
    pub fn new(space: &GyrovectorSpace, operation: Operation, model: Model, args: &[Argument]) -> Self {
        let factor = 10f64.powi(space.config().cache_precision as i32);
        let mut inputs = Vec::new();
        let mut push_values = |tag: u64, values: &[f64]| {
            inputs.push(tag);
            inputs.push(values.len() as u64);
            inputs.extend(values.iter().map(|x| quantize(*x, factor)));
        };
        for arg in args {
            match arg {
                Argument::Point(coords) => push_values(TAG_POINT, coords),
                Argument::Vector(coords) => push_values(TAG_VECTOR, coords),
                Argument::Scalar(x) => push_values(TAG_SCALAR, &[*x]),
                Argument::Transformation(t) => push_values(TAG_TRANSFORMATION, &t.components()),
            }
        }

        Self {
            operation,
            model,
            backend: space.backend(),
            curvature: space.curvature().to_bits(),
            dimension: space.dimension(),
            inputs,
        }
    }
}

/// Round `x` to the key precision. Values too large to round safely keep
/// their exact bits.
fn quantize(x: f64, factor: f64) -> u64 {
    let scaled = x * factor;
    let value = if scaled.is_finite() && scaled.abs() < 9.0e15 {
        scaled.round() / factor
    } else {
        x
    };
    // -0.0 and 0.0 share a key
    if value == 0.0 {
        0
    } else {
        value.to_bits()
    }
}

/// Memoized outcome of a computation.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResult {
    pub result: ComputeValue,
    pub warnings: Vec<NumericalInstabilityWarning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub capacity: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Bounded LRU cache of facade results.
pub struct ComputeCache {
    entries: RwLock<LinkedHashMap<CacheKey, CachedResult>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl std::fmt::Debug for ComputeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComputeCache")
            .field("stats", &self.stats())
            .finish()
    }
}

impl ComputeCache {
    /// # Errors
    /// `InvalidConfig` if `capacity` is 0.
    pub fn new(capacity: usize) -> GyroResult<Self> {
        if capacity == 0 {
            return Err(GyroError::InvalidConfig(
                "cache capacity must be > 0".to_string(),
            ));
        }
        Ok(Self {
            entries: RwLock::new(LinkedHashMap::new()),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    /// Look up a result, marking it most recently used.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<CachedResult> {
        let mut entries = self.entries.write();
        match entries.get_refresh(key) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(operation = %key.operation, model = %key.model, "Cache hit");
                Some(entry.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Insert a result, evicting least recently used entries past capacity.
    pub fn insert(&self, key: CacheKey, value: CachedResult) {
        let mut entries = self.entries.write();
        entries.insert(key, value);
        while entries.len() > self.capacity {
            entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
            capacity: self.capacity,
        }
    }
}

impl Default for ComputeCache {
    fn default() -> Self {
        Self {
            entries: RwLock::new(LinkedHashMap::new()),
            capacity: DEFAULT_CACHE_CAPACITY,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }
}
