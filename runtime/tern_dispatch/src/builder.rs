//! `DispatcherBuilder` for creating dispatchers with non-default parts.

use std::sync::Arc;

use tern_value::Symbol;

use crate::config::DispatchConfig;
use crate::dispatcher::Dispatcher;
use crate::introspect::Introspect;
use crate::member_functions::MemberFunctions;
use crate::metadata::{MetadataCache, MetadataFactory, StructMetadata};
use crate::resolver::Resolver;

/// Builder for `Dispatcher`.
///
/// Only the introspection provider is required. Everything else defaults:
/// the cache starts enabled unless `TERN_DISPATCH_CACHE` turns it off
/// (see `DispatchConfig::from_env`), the member-function table is
/// `MemberFunctions::standard()`, and metadata comes from `StructMetadata`.
pub struct DispatcherBuilder {
    provider: Arc<dyn Introspect>,
    config: DispatchConfig,
    member_functions: Option<MemberFunctions>,
    metadata_factory: Option<Arc<dyn MetadataFactory>>,
}

impl DispatcherBuilder {
    pub fn new(provider: Arc<dyn Introspect>) -> Self {
        Self {
            provider,
            config: DispatchConfig::from_env(),
            member_functions: None,
            metadata_factory: None,
        }
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Initial state of the administrative cache flag.
    #[must_use]
    pub fn cache_enabled(mut self, enabled: bool) -> Self {
        self.config.cache_enabled = enabled;
        self
    }

    /// Symbol answered with the metadata wrapper.
    #[must_use]
    pub fn introspection_symbol(mut self, symbol: impl Into<Symbol>) -> Self {
        self.config.introspection_symbol = symbol.into();
        self
    }

    /// Replace the member-function table.
    #[must_use]
    pub fn member_functions(mut self, functions: MemberFunctions) -> Self {
        self.member_functions = Some(functions);
        self
    }

    /// Replace the metadata factory.
    #[must_use]
    pub fn metadata_factory(mut self, factory: Arc<dyn MetadataFactory>) -> Self {
        self.metadata_factory = Some(factory);
        self
    }

    pub fn build(self) -> Dispatcher {
        let resolver = Resolver::with_cache(self.provider, self.config.cache_enabled);
        let functions = self.member_functions.unwrap_or_else(MemberFunctions::standard);
        let factory: Arc<dyn MetadataFactory> = match self.metadata_factory {
            Some(factory) => factory,
            None => Arc::new(StructMetadata),
        };
        tracing::debug!(
            cache_enabled = self.config.cache_enabled,
            member_functions = functions.len(),
            "dispatcher built"
        );
        Dispatcher::from_parts(
            resolver,
            functions,
            MetadataCache::new(factory),
            self.config.introspection_symbol,
        )
    }
}
