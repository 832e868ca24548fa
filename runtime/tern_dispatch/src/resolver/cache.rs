//! Call-site cache.
//!
//! Hits are served straight from a `DashMap` without touching the miss lock.
//! A miss takes one coarse lock for the whole cache, checks the map again,
//! runs discovery, and inserts only on success. Two threads missing on the
//! same key therefore discover once; threads missing on different keys
//! serialize behind each other, which is acceptable because misses stop once
//! the working set of call sites is warm.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;
use tern_value::{EvalError, Symbol, TypeHandle, TypeKind};

use super::ResolvedCall;
use crate::introspect::MemberKind;

/// Argument kinds of a call site. Most calls take four or fewer arguments.
pub type Signature = SmallVec<[TypeKind; 4]>;

/// Cache key: everything overload resolution depends on.
///
/// The full argument-kind vector is stored, so two call sites that differ
/// only in argument kinds never share an entry.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct CallSiteKey {
    pub ty: TypeHandle,
    pub symbol: Symbol,
    pub kind: MemberKind,
    pub signature: Signature,
}

impl CallSiteKey {
    pub fn new(ty: TypeHandle, symbol: Symbol, kind: MemberKind, args: &[TypeKind]) -> Self {
        CallSiteKey {
            ty,
            symbol,
            kind,
            signature: args.iter().copied().collect(),
        }
    }
}

/// Counters for diagnostics.
#[derive(Copy, Clone, Default, Eq, PartialEq, Debug)]
pub struct CacheStats {
    /// Lookups answered from the map.
    pub hits: u64,
    /// Lookups that ran discovery.
    pub misses: u64,
    /// Lookups made while the cache was disabled.
    pub bypassed: u64,
    /// Entries currently stored.
    pub entries: usize,
}

/// Concurrent memo from call site to resolved member.
pub struct CallCache {
    entries: DashMap<CallSiteKey, Arc<ResolvedCall>, FxBuildHasher>,
    miss_lock: Mutex<()>,
    enabled: AtomicBool,
    hits: AtomicU64,
    misses: AtomicU64,
    bypassed: AtomicU64,
}

impl CallCache {
    pub fn new(enabled: bool) -> Self {
        CallCache {
            entries: DashMap::with_hasher(FxBuildHasher),
            miss_lock: Mutex::new(()),
            enabled: AtomicBool::new(enabled),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            bypassed: AtomicU64::new(0),
        }
    }

    /// Return the cached entry for `key`, or run `discover` and cache its
    /// result. Errors are returned without being cached.
    pub fn get_or_discover<F>(
        &self,
        key: CallSiteKey,
        discover: F,
    ) -> Result<Arc<ResolvedCall>, EvalError>
    where
        F: FnOnce() -> Result<ResolvedCall, EvalError>,
    {
        // Relaxed: a stale read costs at most one extra lookup or bypass
        if !self.enabled.load(Ordering::Relaxed) {
            self.bypassed.fetch_add(1, Ordering::Relaxed);
            return discover().map(Arc::new);
        }

        // Fast path: lock-free read
        if let Some(hit) = self.entries.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(symbol = %key.symbol, ty = %key.ty, "call cache hit");
            return Ok(Arc::clone(hit.value()));
        }

        // Slow path: serialize discovery
        let _guard = self.miss_lock.lock();

        // Double-check after acquiring the miss lock
        if let Some(hit) = self.entries.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(hit.value()));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(symbol = %key.symbol, ty = %key.ty, kind = ?key.kind, "call cache miss");
        let resolved = Arc::new(discover()?);
        self.entries.insert(key, Arc::clone(&resolved));
        Ok(resolved)
    }

    /// Look up without discovering.
    pub fn peek(&self, key: &CallSiteKey) -> Option<Arc<ResolvedCall>> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Toggle caching. Existing entries are kept and used again once
    /// re-enabled.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&self) {
        let _guard = self.miss_lock.lock();
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            bypassed: self.bypassed.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }
}

impl Default for CallCache {
    fn default() -> Self {
        Self::new(true)
    }
}

impl std::fmt::Debug for CallCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallCache")
            .field("enabled", &self.is_enabled())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
