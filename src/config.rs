//! Weaving configuration.
//!
//! [`WeaveConfig`] controls the registry's apply-time validation, how duplicate advice matches
//! are treated, and per-call tracing. A registry's configuration is fixed when the registry is
//! created.
//!
//! # Example
//!
//! ```rust
//! use crosscut::{Registry, WeaveConfig};
//!
//! // Use a preset
//! let registry = Registry::with_config(WeaveConfig::strict());
//!
//! // Or customize
//! let config = WeaveConfig {
//!     trace_calls: true,
//!     ..WeaveConfig::default()
//! };
//! let registry = Registry::with_config(config);
//! ```

/// Configuration for a [`crate::Registry`] and the weavers it creates.
///
/// # Default Configuration
///
/// | Field | Default |
/// |-------|---------|
/// | `validate_operations` | `true` |
/// | `collapse_duplicate_advice` | `false` |
/// | `trace_calls` | `false` |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeaveConfig {
    /// Reject attachments naming undefined operations.
    ///
    /// When enabled, applying an aspect or cut whose literal pointcuts (or `around` overrides)
    /// name an operation the class does not define fails with
    /// [`crate::Error::UnknownOperation`]. Predicate and pattern pointcuts are never checked.
    pub validate_operations: bool,

    /// Keep at most one layer per advice name and attachment.
    ///
    /// By default an advice bound through several pointcuts that all match an operation
    /// contributes one chain layer per matching pointcut.
    pub collapse_duplicate_advice: bool,

    /// Emit a `trace`-level event for every intercepted call.
    pub trace_calls: bool,
}

impl WeaveConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validation on, duplicates collapsed.
    ///
    /// Suited to hosts that treat every binding as a declaration of intent.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            validate_operations: true,
            collapse_duplicate_advice: true,
            trace_calls: false,
        }
    }

    /// Validation off.
    ///
    /// Suited to generic aspects applied across classes that only define some of the named
    /// operations.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            validate_operations: false,
            ..Self::default()
        }
    }

    /// Sets [`WeaveConfig::validate_operations`].
    #[must_use]
    pub fn with_validate_operations(mut self, enabled: bool) -> Self {
        self.validate_operations = enabled;
        self
    }

    /// Sets [`WeaveConfig::collapse_duplicate_advice`].
    #[must_use]
    pub fn with_collapse_duplicate_advice(mut self, enabled: bool) -> Self {
        self.collapse_duplicate_advice = enabled;
        self
    }

    /// Sets [`WeaveConfig::trace_calls`].
    #[must_use]
    pub fn with_trace_calls(mut self, enabled: bool) -> Self {
        self.trace_calls = enabled;
        self
    }
}

impl Default for WeaveConfig {
    fn default() -> Self {
        Self {
            validate_operations: true,
            collapse_duplicate_advice: false,
            trace_calls: false,
        }
    }
}
