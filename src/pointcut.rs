//! Pointcuts decide whether advice applies to a joinpoint.
//!
//! This module defines the [`Pointcut`] trait and its implementations. Every pointcut is
//! evaluated against a runtime [`Joinpoint`]; nothing is resolved at compile time.
//!
//! # Available Pointcuts
//!
//! | Pointcut | Matches |
//! |----------|---------|
//! | [`OperationName`] | Exact operation name |
//! | [`OperationNames`] | Any of a list of operation names |
//! | [`PatternPointcut`] | Operation names matching a regular expression |
//! | [`PredicatePointcut`] | An arbitrary (optionally fallible) function of the joinpoint |
//! | `&'static str` | Shorthand for [`OperationName`] |
//!
//! # Validation
//!
//! Literal pointcuts report the operations they name through [`Pointcut::operations`], which
//! lets the registry reject an aspect or cut that names an operation the class does not
//! define at apply time instead of silently never matching.

use std::{fmt, sync::Arc};

use regex::Regex;

use crate::{joinpoint::Joinpoint, Error, Result};

/// Type alias for fallible pointcut predicates.
pub type PredicateFn = dyn Fn(&Joinpoint) -> Result<bool> + Send + Sync;

/// A boolean test over joinpoints.
///
/// # Implementing Custom Pointcuts
///
/// ```rust
/// use crosscut::{Joinpoint, Pointcut, Result};
///
/// struct Arity(usize);
///
/// impl Pointcut for Arity {
///     fn matches(&self, joinpoint: &Joinpoint) -> Result<bool> {
///         Ok(joinpoint.args().len() == self.0)
///     }
///
///     fn description(&self) -> String {
///         format!("arity={}", self.0)
///     }
/// }
/// ```
///
/// # Thread Safety
///
/// Pointcuts must be `Send + Sync`; aspects are shared across threads.
pub trait Pointcut: Send + Sync {
    /// Tests the joinpoint.
    ///
    /// # Errors
    ///
    /// A failing predicate aborts the intercepted call.
    fn matches(&self, joinpoint: &Joinpoint) -> Result<bool>;

    /// Returns a concise description for debugging and error messages.
    fn description(&self) -> String;

    /// Operation names this pointcut refers to literally, if any.
    ///
    /// `None` means the pointcut is not a literal and cannot be validated up front.
    fn operations(&self) -> Option<Vec<&str>> {
        None
    }
}

/// Matches one operation by exact name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperationName(String);

impl OperationName {
    /// Creates the pointcut.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl Pointcut for OperationName {
    fn matches(&self, joinpoint: &Joinpoint) -> Result<bool> {
        Ok(joinpoint.is(&self.0))
    }

    fn description(&self) -> String {
        format!("operation={}", self.0)
    }

    fn operations(&self) -> Option<Vec<&str>> {
        Some(vec![self.0.as_str()])
    }
}

impl Pointcut for &'static str {
    fn matches(&self, joinpoint: &Joinpoint) -> Result<bool> {
        Ok(joinpoint.is(self))
    }

    fn description(&self) -> String {
        format!("operation={self}")
    }

    fn operations(&self) -> Option<Vec<&str>> {
        Some(vec![*self])
    }
}

/// Matches any operation in a list of names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OperationNames(Vec<String>);

impl OperationNames {
    /// Creates the pointcut.
    ///
    /// ```rust
    /// use crosscut::OperationNames;
    ///
    /// let pointcut = OperationNames::new(["r1", "r2"]);
    /// ```
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }
}

impl Pointcut for OperationNames {
    fn matches(&self, joinpoint: &Joinpoint) -> Result<bool> {
        Ok(self.0.iter().any(|name| joinpoint.is(name)))
    }

    fn description(&self) -> String {
        format!("operations=[{}]", self.0.join(", "))
    }

    fn operations(&self) -> Option<Vec<&str>> {
        Some(self.0.iter().map(String::as_str).collect())
    }
}

/// Matches operation names against a regular expression.
///
/// # Examples
///
/// ```rust
/// use crosscut::PatternPointcut;
///
/// let readers = PatternPointcut::new("^r").unwrap();
/// assert!(PatternPointcut::new("(").is_err());
/// ```
#[derive(Clone, Debug)]
pub struct PatternPointcut(Regex);

impl PatternPointcut {
    /// Compiles the pattern.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if the pattern does not compile.
    pub fn new(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(Self)
            .map_err(|e| Error::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })
    }
}

impl Pointcut for PatternPointcut {
    fn matches(&self, joinpoint: &Joinpoint) -> Result<bool> {
        Ok(self.0.is_match(joinpoint.operation()))
    }

    fn description(&self) -> String {
        format!("pattern=/{}/", self.0.as_str())
    }
}

/// Matches with an arbitrary function of the joinpoint.
///
/// Predicates may inspect the receiver, the arguments and the block. They run once per
/// (class, operation) when the advice chain is first resolved, not on every call, so they
/// should only depend on what stays fixed for an operation.
///
/// # Deadlocks
///
/// A predicate runs while the class's attachment list is read-locked and the cache slot of the
/// operation being resolved is write-locked. Calling a woven operation of the same class from
/// inside a predicate will deadlock; it does not return an error. Applying to that class from
/// inside a predicate deadlocks as well.
///
/// # Examples
///
/// ```rust
/// use crosscut::{raised, PredicatePointcut};
///
/// let getters = PredicatePointcut::new("getters", |jp| jp.operation().starts_with("get_"));
///
/// let strict = PredicatePointcut::fallible("no-admin", |jp| {
///     if jp.is("admin") {
///         Err(raised!("admin is never advised"))
///     } else {
///         Ok(true)
///     }
/// });
/// ```
#[derive(Clone)]
pub struct PredicatePointcut {
    predicate: Arc<PredicateFn>,
    description: String,
}

impl PredicatePointcut {
    /// Creates a pointcut from an infallible predicate.
    pub fn new<F>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Joinpoint) -> bool + Send + Sync + 'static,
    {
        Self::fallible(description, move |jp| Ok(predicate(jp)))
    }

    /// Creates a pointcut from a predicate that can fail.
    ///
    /// Failures surface as [`Error::Predicate`] carrying this pointcut's description.
    pub fn fallible<F>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Joinpoint) -> Result<bool> + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            description: description.into(),
        }
    }
}

impl Pointcut for PredicatePointcut {
    fn matches(&self, joinpoint: &Joinpoint) -> Result<bool> {
        (self.predicate)(joinpoint).map_err(|e| match e {
            Error::Predicate { .. } => e,
            other => Error::Predicate {
                pointcut: self.description.clone(),
                message: other.to_string(),
            },
        })
    }

    fn description(&self) -> String {
        self.description.clone()
    }
}

impl fmt::Debug for PredicatePointcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicatePointcut")
            .field("description", &self.description)
            .finish()
    }
}
