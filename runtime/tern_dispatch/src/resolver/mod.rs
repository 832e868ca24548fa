//! Caching resolver.
//!
//! Maps (target type, symbol, argument kinds, member kind) to a resolved
//! member handle. Discovery goes through overload resolution at most once per
//! distinct call site; afterwards the handle comes from the cache. Each
//! resolver owns its cache, so independent dispatchers never share entries.

mod cache;

use std::sync::Arc;

use tern_value::{EvalError, Symbol, TargetRef, TypeHandle, TypeKind};

use crate::introspect::{FieldHandle, Introspect, MemberId, MemberKind, MethodHandle};
use crate::overload;

pub use cache::{CacheStats, CallCache, CallSiteKey, Signature};

/// The member a call site resolved to.
#[derive(Clone, Debug)]
pub enum ResolvedMember {
    /// A method or constructor.
    Method(Arc<MethodHandle>),
    Field(Arc<FieldHandle>),
}

/// Immutable cache entry.
///
/// Entries created concurrently for the same key describe the same member,
/// so whichever one ends up stored is equivalent.
#[derive(Clone, Debug)]
pub struct ResolvedCall {
    member: ResolvedMember,
    is_static: bool,
    arity: usize,
}

impl ResolvedCall {
    pub fn method(handle: Arc<MethodHandle>) -> Self {
        ResolvedCall {
            is_static: handle.is_static(),
            arity: handle.arity(),
            member: ResolvedMember::Method(handle),
        }
    }

    pub fn field(handle: Arc<FieldHandle>) -> Self {
        ResolvedCall {
            is_static: handle.is_static(),
            arity: 0,
            member: ResolvedMember::Field(handle),
        }
    }

    #[inline]
    pub fn member(&self) -> &ResolvedMember {
        &self.member
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn member_id(&self) -> MemberId {
        match &self.member {
            ResolvedMember::Method(handle) => handle.id(),
            ResolvedMember::Field(handle) => handle.id(),
        }
    }

    pub fn as_method(&self) -> Option<&Arc<MethodHandle>> {
        match &self.member {
            ResolvedMember::Method(handle) => Some(handle),
            ResolvedMember::Field(_) => None,
        }
    }

    pub fn as_field(&self) -> Option<&Arc<FieldHandle>> {
        match &self.member {
            ResolvedMember::Field(handle) => Some(handle),
            ResolvedMember::Method(_) => None,
        }
    }
}

/// Resolver over one introspection provider with its own call-site cache.
pub struct Resolver {
    provider: Arc<dyn Introspect>,
    cache: CallCache,
}

impl Resolver {
    pub fn new(provider: Arc<dyn Introspect>) -> Self {
        Self::with_cache(provider, true)
    }

    /// Resolver whose cache starts enabled or disabled.
    pub fn with_cache(provider: Arc<dyn Introspect>, cache_enabled: bool) -> Self {
        Resolver {
            provider,
            cache: CallCache::new(cache_enabled),
        }
    }

    /// Resolve a callable member for a call with arguments of kinds `args`.
    #[tracing::instrument(level = "trace", skip(self, target, symbol), fields(symbol = %symbol))]
    pub fn resolve(
        &self,
        target: &TargetRef,
        symbol: &Symbol,
        args: &[TypeKind],
    ) -> Result<Arc<ResolvedCall>, EvalError> {
        let ty = target.type_handle();
        let key = CallSiteKey::new(ty, symbol.clone(), MemberKind::Method, args);
        self.cache.get_or_discover(key, || {
            overload::discover_method(self.provider.as_ref(), ty, symbol, args)
                .map(ResolvedCall::method)
        })
    }

    /// Resolve a field member.
    #[tracing::instrument(level = "trace", skip(self, target, symbol), fields(symbol = %symbol))]
    pub fn resolve_field(
        &self,
        target: &TargetRef,
        symbol: &Symbol,
    ) -> Result<Arc<ResolvedCall>, EvalError> {
        let ty = target.type_handle();
        let key = CallSiteKey::new(ty, symbol.clone(), MemberKind::Field, &[]);
        self.cache.get_or_discover(key, || {
            overload::discover_field(self.provider.as_ref(), ty, symbol).map(ResolvedCall::field)
        })
    }

    /// Resolve a constructor of `ty` for arguments of kinds `args`.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn resolve_constructor(
        &self,
        ty: TypeHandle,
        args: &[TypeKind],
    ) -> Result<Arc<ResolvedCall>, EvalError> {
        let key = CallSiteKey::new(ty, Symbol::new("new"), MemberKind::Constructor, args);
        self.cache.get_or_discover(key, || {
            overload::discover_constructor(self.provider.as_ref(), ty, args)
                .map(ResolvedCall::method)
        })
    }

    #[inline]
    pub fn provider(&self) -> &dyn Introspect {
        self.provider.as_ref()
    }

    #[inline]
    pub fn cache(&self) -> &CallCache {
        &self.cache
    }

    /// Administrative toggle. Entries survive a disable/enable cycle.
    pub fn set_cache_enabled(&self, enabled: bool) {
        self.cache.set_enabled(enabled);
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
