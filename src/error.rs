use thiserror::Error;

use crate::value::ValueKind;

/// Builds an [`Error::Raised`] from a message or a format string.
///
/// Meant for operation and advice bodies that need to fail a call.
///
/// ```rust
/// use crosscut::{raised, Error};
///
/// let err = raised!("balance {} below zero", -5);
/// assert_eq!(err, Error::Raised("balance -5 below zero".to_string()));
/// ```
#[macro_export]
macro_rules! raised {
    // Single string version
    ($msg:expr) => {
        $crate::Error::Raised($msg.to_string())
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::Raised(format!($fmt, $($arg)*))
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// The weaver itself never recovers from or translates an error: whatever an advice body or an
/// original operation returns travels unchanged to the caller of the intercepted operation. The
/// variants below therefore split into two groups, errors the engine detects itself and errors
/// raised by host code that simply pass through it.
///
/// # Error Categories
///
/// ## Weaving and Resolution Errors
/// - [`Error::UnknownOperation`] - An operation name the class does not define
/// - [`Error::MissingAdvice`] - A matching pointcut whose advice has no implementation
/// - [`Error::Predicate`] - A pointcut predicate failed while matching a joinpoint
/// - [`Error::InvalidPattern`] - A pattern pointcut could not be compiled
///
/// ## Host Errors
/// - [`Error::Raised`] - Raised by an operation or advice body
/// - [`Error::TypeMismatch`] - A [`crate::Value`] did not hold the requested kind
///
/// ## Runtime Errors
/// - [`Error::LockError`] - A registry lock was poisoned by a panicking thread
///
/// # Examples
///
/// ```rust
/// use crosscut::{Class, Error, Value};
///
/// let class = Class::builder("Counter")
///     .operation("get", |_this, _args, _block| Ok(Value::Int(1)))
///     .build();
/// let counter = class.instantiate(());
///
/// match counter.call("missing", vec![]) {
///     Err(Error::UnknownOperation { class, operation }) => {
///         assert_eq!(class, "Counter");
///         assert_eq!(operation, "missing");
///     }
///     other => panic!("unexpected: {other:?}"),
/// }
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The operation is not defined by the class.
    ///
    /// Returned when invoking an operation the class does not have, and when applying an aspect
    /// or cut whose literal pointcuts name an operation the class does not define (unless
    /// [`crate::WeaveConfig::validate_operations`] is disabled).
    #[error("Undefined operation '{operation}' for class {class}")]
    UnknownOperation {
        /// Name of the class the lookup was performed on
        class: String,
        /// The operation name that could not be found
        operation: String,
    },

    /// A pointcut matched but its aspect has no implementation for the advice.
    ///
    /// Detected while the advice chain for an operation is built, before any advice runs.
    #[error("Aspect '{aspect}' binds advice '{advice}' but does not implement it")]
    MissingAdvice {
        /// Name of the aspect or cut declaring the binding
        aspect: String,
        /// The advice name without an implementation
        advice: String,
    },

    /// A pointcut predicate failed during matching.
    ///
    /// Matching is not fault-tolerant: the failure aborts the call and nothing is cached for
    /// the operation.
    #[error("Pointcut '{pointcut}' failed: {message}")]
    Predicate {
        /// Description of the failing pointcut
        pointcut: String,
        /// The message reported by the predicate
        message: String,
    },

    /// A pattern pointcut could not be compiled.
    #[error("Invalid operation pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The pattern as given
        pattern: String,
        /// The compiler's message
        message: String,
    },

    /// An error raised by host code, an operation or an advice body.
    #[error("{0}")]
    Raised(String),

    /// A value did not hold the expected kind.
    #[error("Expected a {expected} value, found {found}")]
    TypeMismatch {
        /// The kind that was requested
        expected: ValueKind,
        /// The kind that was actually present
        found: ValueKind,
    },

    /// Failed to lock target.
    ///
    /// A thread panicked while holding one of the registry locks.
    #[error("Failed to lock target")]
    LockError,
}
