//! Dynamic values passed through intercepted calls.
//!
//! Matching happens at runtime against runtime joinpoint descriptors, so arguments and results
//! cross the interception layer as a single dynamic [`Value`] type. Operations, advice bodies
//! and blocks all consume and produce [`Value`]s.
//!
//! # Conversions
//!
//! | Rust type | Variant |
//! |-----------|---------|
//! | `()` | [`Value::Unit`] |
//! | `bool` | [`Value::Bool`] |
//! | `i32`, `i64` | [`Value::Int`] |
//! | `usize` | [`Value::Int`], saturating at `i64::MAX` |
//! | `f64` | [`Value::Float`] |
//! | `&str`, `String` | [`Value::Str`] |
//! | `Vec<Value>` | [`Value::List`] |

use std::fmt;

use strum::{Display, EnumCount, EnumIter};

use crate::{Error, Result};

/// A runtime value flowing through an intercepted call.
///
/// # Examples
///
/// ```rust
/// use crosscut::Value;
///
/// let v = Value::from("x");
/// assert_eq!(v.as_str().unwrap(), "x");
/// assert_eq!(Value::from(3).as_int().unwrap(), 3);
/// assert_eq!(v.to_string(), "x");
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// No value, the result of operations called for their side effects.
    #[default]
    Unit,

    /// Boolean value.
    Bool(bool),

    /// 64-bit signed integer.
    Int(i64),

    /// 64-bit floating point.
    Float(f64),

    /// UTF-8 string.
    Str(String),

    /// Ordered list of values.
    List(Vec<Value>),
}

/// The kind of a [`Value`], used for error reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, EnumCount)]
#[strum(serialize_all = "lowercase")]
pub enum ValueKind {
    /// [`Value::Unit`]
    Unit,
    /// [`Value::Bool`]
    Bool,
    /// [`Value::Int`]
    Int,
    /// [`Value::Float`]
    Float,
    /// [`Value::Str`]
    Str,
    /// [`Value::List`]
    List,
}

impl Value {
    /// Returns the kind of this value.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Unit => ValueKind::Unit,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Str(_) => ValueKind::Str,
            Value::List(_) => ValueKind::List,
        }
    }

    /// Returns `true` for [`Value::Unit`].
    #[must_use]
    pub fn is_unit(&self) -> bool {
        matches!(self, Value::Unit)
    }

    /// Borrows the contained string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the value is not a [`Value::Str`].
    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::Str(s) => Ok(s),
            other => Err(other.mismatch(ValueKind::Str)),
        }
    }

    /// Returns the contained integer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the value is not a [`Value::Int`].
    pub fn as_int(&self) -> Result<i64> {
        match self {
            Value::Int(i) => Ok(*i),
            other => Err(other.mismatch(ValueKind::Int)),
        }
    }

    /// Returns the contained float, widening integers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the value is neither a [`Value::Float`] nor a
    /// [`Value::Int`].
    pub fn as_float(&self) -> Result<f64> {
        match self {
            Value::Float(f) => Ok(*f),
            #[allow(clippy::cast_precision_loss)]
            Value::Int(i) => Ok(*i as f64),
            other => Err(other.mismatch(ValueKind::Float)),
        }
    }

    /// Returns the contained boolean.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the value is not a [`Value::Bool`].
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(other.mismatch(ValueKind::Bool)),
        }
    }

    /// Borrows the contained list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the value is not a [`Value::List`].
    pub fn as_list(&self) -> Result<&[Value]> {
        match self {
            Value::List(items) => Ok(items),
            other => Err(other.mismatch(ValueKind::List)),
        }
    }

    /// Consumes the value, returning the contained string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the value is not a [`Value::Str`].
    pub fn into_string(self) -> Result<String> {
        match self {
            Value::Str(s) => Ok(s),
            other => Err(other.mismatch(ValueKind::Str)),
        }
    }

    fn mismatch(&self, expected: ValueKind) -> Error {
        Error::TypeMismatch {
            expected,
            found: self.kind(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Value::Unit
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

/// Lengths and counts. Values above `i64::MAX` saturate.
impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_value_kind_names() {
        let names: Vec<String> = ValueKind::iter().map(|k| k.to_string()).collect();
        assert_eq!(names, vec!["unit", "bool", "int", "float", "str", "list"]);
        assert_eq!(ValueKind::COUNT, 6);
    }

    #[test]
    fn test_accessor_mismatch() {
        let err = Value::Int(4).as_str().unwrap_err();
        assert_eq!(
            err,
            Error::TypeMismatch {
                expected: ValueKind::Str,
                found: ValueKind::Int
            }
        );
        assert_eq!(err.to_string(), "Expected a str value, found int");
    }

    #[test]
    fn test_float_widens_int() {
        assert_eq!(Value::Int(2).as_float().unwrap(), 2.0);
        assert!(Value::Str("2".into()).as_float().is_err());
    }

    #[test]
    fn test_display_list() {
        let v = Value::from(vec![Value::from(1), Value::from("a"), Value::Unit]);
        assert_eq!(v.to_string(), "[1, a, ()]");
    }

    #[test]
    fn test_default_is_unit() {
        assert!(Value::default().is_unit());
    }

    #[test]
    fn test_usize_saturates() {
        assert_eq!(Value::from(7_usize), Value::Int(7));
        if usize::BITS >= 64 {
            assert_eq!(Value::from(usize::MAX), Value::Int(i64::MAX));
        }
    }
}
