//! Tern Dispatch - dynamic member resolution and invocation.
//!
//! Given a value, a symbol and call arguments, decide what the symbol means
//! for that value (a field, a container slot or a callable), resolve it, cache
//! the resolution and run it.
//!
//! # Architecture
//!
//! - `Dispatcher`: the `dereference` / `assign` / `dereference_and_invoke`
//!   protocol over every kind of target
//! - `Executor`: runs resolved calls, constructors and field accesses
//! - `Resolver`: call-site cache in front of overload resolution
//! - `overload`: first-assignable-candidate discovery
//! - `Introspect` / `HostRegistry`: the view of host types
//! - `MemberFunctions`: behaviors attached to value categories
//! - `MetadataFactory`: what the introspection symbol returns

mod builder;
mod config;
mod dispatcher;
mod executor;
pub mod introspect;
mod member_functions;
mod metadata;
pub mod overload;
pub mod resolver;

#[cfg(test)]
pub(crate) mod test_helpers;

use std::sync::Once;

pub use builder::DispatcherBuilder;
pub use config::{DispatchConfig, CACHE_ENV_VAR};
pub use dispatcher::Dispatcher;
pub use executor::Executor;
pub use introspect::{
    FieldHandle, HostRegistry, Introspect, MemberId, MemberKind, MethodHandle, TypeBuilder,
};
pub use member_functions::{MemberFn, MemberFunctions};
pub use metadata::{MetadataCache, MetadataFactory, StructMetadata};
pub use resolver::{CacheStats, ResolvedCall, ResolvedMember, Resolver};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing subscriber for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=tern_dispatch=debug` or `RUST_LOG=tern_dispatch=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
