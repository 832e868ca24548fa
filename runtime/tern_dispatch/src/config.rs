//! Dispatcher configuration.

use tern_value::{well_known, Symbol};

/// Environment variable that turns the call-site cache off.
///
/// `off`, `0`, `false` and `no` (any case) disable it; anything else, or
/// leaving it unset, keeps it on.
pub const CACHE_ENV_VAR: &str = "TERN_DISPATCH_CACHE";

/// Settings fixed when a dispatcher is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Initial state of the administrative cache flag.
    pub cache_enabled: bool,
    /// Symbol answered with the metadata wrapper.
    pub introspection_symbol: Symbol,
}

impl DispatchConfig {
    /// Defaults, with the cache flag taken from `TERN_DISPATCH_CACHE`.
    ///
    /// This is what `Dispatcher::new` and `DispatcherBuilder::new` start from.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults, with the cache flag read through `lookup`.
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(raw) = lookup(CACHE_ENV_VAR) {
            config.cache_enabled = parse_flag(&raw);
        }
        config
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        DispatchConfig {
            cache_enabled: true,
            introspection_symbol: Symbol::new(well_known::INTROSPECT),
        }
    }
}

fn parse_flag(raw: &str) -> bool {
    !matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "off" | "0" | "false" | "no"
    )
}
