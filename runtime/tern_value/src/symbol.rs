//! Canonical, case-insensitive names.
//!
//! Every member and key lookup in the runtime goes through a `Symbol`.
//! Equality and hashing use the case-folded form; the original text is kept
//! for display and for use as a literal key in case-preserving containers.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Reserved symbol names with engine-level meaning.
pub mod well_known {
    /// Element count of a sequence or array.
    pub const LENGTH: &str = "length";
    /// Second bring-up phase of a class instance.
    pub const INIT: &str = "init";
    /// Metadata wrapper lookup, answered for every value.
    pub const INTROSPECT: &str = "$meta";

    // Error object allow-list
    pub const MESSAGE: &str = "message";
    pub const DETAIL: &str = "detail";
    pub const TYPE: &str = "type";
    pub const TAG_CONTEXT: &str = "tagContext";
    pub const EXTENDED_INFO: &str = "extendedInfo";

    /// Every symbol an error object answers natively.
    pub const ERROR_FIELDS: &[&str] = &[MESSAGE, DETAIL, TYPE, TAG_CONTEXT, EXTENDED_INFO];
}

/// Immutable canonical name.
///
/// Cheap to clone: both forms are reference counted and share one allocation
/// when the original text is already lowercase.
#[derive(Clone)]
pub struct Symbol {
    text: Arc<str>,
    canonical: Arc<str>,
    index: Option<i64>,
}

impl Symbol {
    /// Create a symbol from its source text.
    pub fn new(text: impl AsRef<str>) -> Self {
        let raw = text.as_ref();
        let text: Arc<str> = Arc::from(raw);
        let folded = raw.to_lowercase();
        let canonical = if folded == raw {
            Arc::clone(&text)
        } else {
            Arc::from(folded)
        };
        Symbol {
            index: parse_index(raw),
            text,
            canonical,
        }
    }

    /// Create a numeric symbol, as produced by `value[3]`.
    pub fn from_index(index: i64) -> Self {
        let text: Arc<str> = Arc::from(index.to_string());
        Symbol {
            canonical: Arc::clone(&text),
            text,
            index: Some(index),
        }
    }

    /// The original text, casing preserved.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The case-folded form used for comparison and cache keys.
    #[inline]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Integer interpretation, if the text is purely numeric.
    #[inline]
    pub fn as_index(&self) -> Option<i64> {
        self.index
    }

    /// Whether the text is purely numeric.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        self.index.is_some()
    }

    /// Case-insensitive comparison against a plain name.
    pub fn is(&self, name: &str) -> bool {
        if name.is_ascii() {
            self.canonical.eq_ignore_ascii_case(name)
        } else {
            *self.canonical == *name.to_lowercase()
        }
    }
}

/// Digits with an optional leading minus sign.
fn parse_index(text: &str) -> Option<i64> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", &*self.text)
    }
}

impl From<&str> for Symbol {
    fn from(text: &str) -> Self {
        Symbol::new(text)
    }
}

impl From<String> for Symbol {
    fn from(text: String) -> Self {
        Symbol::new(text)
    }
}

impl From<i64> for Symbol {
    fn from(index: i64) -> Self {
        Symbol::from_index(index)
    }
}
