//! Error types for member resolution and invocation.
//!
//! `EvalErrorKind` carries structured data for each failure so callers can
//! match on the kind instead of parsing messages. Factory functions
//! (e.g. `key_not_found()`) are the public construction API; they populate
//! both `kind` and `message`.

use std::fmt;
use std::sync::Arc;

use crate::types::TypeKind;
use crate::value::Value;

/// Result of a dispatch operation.
pub type EvalResult = Result<Value, EvalError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    /// Host field absent for the symbol.
    NoField {
        field: String,
        type_name: String,
        available: Vec<String>,
    },
    /// No assignable overload found.
    NoMethod {
        method: String,
        type_name: String,
        arity: usize,
        arg_kinds: Vec<String>,
    },
    /// Container key or object property absent.
    KeyNotFound {
        key: String,
        available: Vec<String>,
    },
    IndexOutOfBounds {
        index: i64,
        len: usize,
    },
    /// Positional container addressed with a non-numeric symbol.
    InvalidIndex {
        key: String,
        type_name: String,
    },
    /// The resolved call raised while executing; the cause is attached.
    InvocationFailure {
        member: String,
        type_name: String,
    },
    /// Constructor resolution or bring-up failed; the cause is attached.
    ConstructionFailure {
        type_name: String,
    },
    /// Instance member used without a bound instance.
    MissingReceiver {
        member: String,
        type_name: String,
    },
    /// Target does not accept writes.
    NotAssignable {
        type_name: String,
    },
    /// Catch-all for errors raised by host code and collaborators.
    Custom {
        message: String,
    },
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[String]) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        f.write_str(item)?;
    }
    f.write_str("]")
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoField {
                field,
                type_name,
                available,
            } => {
                write!(f, "no field '{field}' on type {type_name}; available fields: ")?;
                write_list(f, available)
            }
            Self::NoMethod {
                method,
                type_name,
                arity,
                arg_kinds,
            } => {
                let arg_word = if *arity == 1 { "argument" } else { "arguments" };
                write!(
                    f,
                    "no method '{method}' on type {type_name} accepting {arity} {arg_word} "
                )?;
                write_list(f, arg_kinds)
            }
            Self::KeyNotFound { key, available } => {
                write!(f, "key '{key}' was not found; valid keys are: ")?;
                write_list(f, available)
            }
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for length {len}")
            }
            Self::InvalidIndex { key, type_name } => {
                write!(f, "cannot index {type_name} with non-numeric key '{key}'")
            }
            Self::InvocationFailure { member, type_name } => {
                write!(f, "error invoking {type_name}.{member}")
            }
            Self::ConstructionFailure { type_name } => {
                write!(f, "error constructing {type_name}")
            }
            Self::MissingReceiver { member, type_name } => {
                write!(
                    f,
                    "instance member {type_name}.{member} requires an instance"
                )
            }
            Self::NotAssignable { type_name } => write!(f, "cannot assign into {type_name}"),
            Self::Custom { message } => f.write_str(message),
        }
    }
}

/// Dispatch error.
#[derive(Clone, Debug)]
pub struct EvalError {
    /// Structured error category.
    pub kind: EvalErrorKind,
    /// Human-readable message; equals `kind.to_string()` for factory errors.
    pub message: String,
    /// Original failure this error wraps.
    cause: Option<Arc<EvalError>>,
}

impl EvalError {
    /// Create an error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: EvalErrorKind::Custom {
                message: message.clone(),
            },
            message,
            cause: None,
        }
    }

    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            message,
            cause: None,
        }
    }

    /// Attach the failure this error wraps.
    #[must_use]
    pub fn with_cause(mut self, cause: EvalError) -> Self {
        self.cause = Some(Arc::new(cause));
        self
    }

    /// The wrapped failure, if any.
    pub fn cause(&self) -> Option<&EvalError> {
        self.cause.as_deref()
    }

    /// Innermost failure in the cause chain.
    pub fn root_cause(&self) -> &EvalError {
        let mut current = self;
        while let Some(next) = current.cause() {
            current = next;
        }
        current
    }

    /// Lookup failures that safe mode degrades to the absent marker.
    ///
    /// Failures raised while executing a resolved call are wrapped in
    /// `InvocationFailure` first, so they are never recovered here.
    pub fn is_recoverable_lookup(&self) -> bool {
        matches!(
            self.kind,
            EvalErrorKind::NoField { .. }
                | EvalErrorKind::NoMethod { .. }
                | EvalErrorKind::KeyNotFound { .. }
                | EvalErrorKind::IndexOutOfBounds { .. }
                | EvalErrorKind::InvalidIndex { .. }
        )
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(cause) = &self.cause {
            write!(f, ": {cause}")?;
        }
        Ok(())
    }
}

impl std::error::Error for EvalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

impl PartialEq for EvalError {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.message == other.message
    }
}

// Factory functions

/// Host field absent for the symbol.
#[cold]
pub fn no_such_field(field: &str, type_name: &str, available: Vec<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoField {
        field: field.to_string(),
        type_name: type_name.to_string(),
        available,
    })
}

/// No overload of `method` accepts the argument kinds.
#[cold]
pub fn no_such_method(method: &str, type_name: &str, arg_kinds: &[TypeKind]) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoMethod {
        method: method.to_string(),
        type_name: type_name.to_string(),
        arity: arg_kinds.len(),
        arg_kinds: arg_kinds.iter().map(ToString::to_string).collect(),
    })
}

/// Container key or object property absent.
#[cold]
pub fn key_not_found(key: &str, available: Vec<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::KeyNotFound {
        key: key.to_string(),
        available,
    })
}

/// 1-based index outside `1..=len`.
#[cold]
pub fn index_out_of_bounds(index: i64, len: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IndexOutOfBounds { index, len })
}

/// Positional container addressed with a non-numeric key.
#[cold]
pub fn invalid_index(key: &str, type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidIndex {
        key: key.to_string(),
        type_name: type_name.to_string(),
    })
}

/// A resolved call raised during execution.
#[cold]
pub fn invocation_failure(member: &str, type_name: &str, cause: EvalError) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvocationFailure {
        member: member.to_string(),
        type_name: type_name.to_string(),
    })
    .with_cause(cause)
}

/// Constructor resolution or bring-up failed.
#[cold]
pub fn construction_failure(type_name: &str, cause: EvalError) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ConstructionFailure {
        type_name: type_name.to_string(),
    })
    .with_cause(cause)
}

/// Instance member reached through a static-only target.
#[cold]
pub fn missing_receiver(member: &str, type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MissingReceiver {
        member: member.to_string(),
        type_name: type_name.to_string(),
    })
}

/// Target does not accept writes.
#[cold]
pub fn not_assignable(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotAssignable {
        type_name: type_name.to_string(),
    })
}
