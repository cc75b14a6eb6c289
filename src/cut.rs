//! Cuts: block-scoped wrapping stacked onto a single class.
//!
//! A [`Cut`] is the lighter-weight sibling of an [`Aspect`]. Instead of reusable predicates
//! matched across many classes, a cut is written against one class and mostly overrides
//! operations directly with [`CutBuilder::around`]. Named bindings through
//! [`CutBuilder::join`] are still available for wrapping several operations with one advice.
//!
//! Cuts obey the same ordering rule as aspects: the cut applied last wraps outermost and the
//! class's original operation is always the innermost link.
//!
//! # Examples
//!
//! ```rust
//! use crosscut::{Class, Cut, Registry, Value};
//!
//! let class = Class::builder("F")
//!     .operation("f", |_this, _args, _block| Ok(Value::from("f")))
//!     .build();
//! let registry = Registry::new();
//!
//! let angles = Cut::builder("G")
//!     .around("f", |target| Ok(Value::from(format!("<{}>", target.proceed()?))))
//!     .build();
//! let squares = Cut::builder("Q")
//!     .around("f", |target| Ok(Value::from(format!("[{}]", target.proceed()?))))
//!     .build();
//!
//! registry.apply_cut(&class, angles).unwrap();
//! registry.apply_cut(&class, squares).unwrap();
//!
//! let f = registry.instantiate(&class, ());
//! assert_eq!(f.call("f", vec![]).unwrap(), Value::from("[<f>]"));
//! ```

use std::{any::Any, fmt, sync::Arc};

use crate::{
    aspect::{Aspect, AspectBuilder},
    pointcut::{OperationName, Pointcut},
    target::Continuation,
    value::Value,
    Result,
};

/// A named unit of wrapping logic for one class.
pub struct Cut {
    aspect: Arc<Aspect>,
    overrides: Vec<String>,
}

impl Cut {
    /// Starts building a cut.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> CutBuilder {
        CutBuilder {
            inner: Aspect::builder(name),
            overrides: Vec::new(),
        }
    }

    /// Returns the cut name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.aspect.name()
    }

    /// Operations overridden directly with [`CutBuilder::around`], in declaration order.
    #[must_use]
    pub fn overrides(&self) -> &[String] {
        &self.overrides
    }

    /// The bindings of this cut, as matched by the weaver.
    #[must_use]
    pub fn as_aspect(&self) -> &Arc<Aspect> {
        &self.aspect
    }
}

impl fmt::Debug for Cut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cut")
            .field("name", &self.name())
            .field("overrides", &self.overrides)
            .finish()
    }
}

/// Builder for [`Cut`].
pub struct CutBuilder {
    inner: AspectBuilder,
    overrides: Vec<String>,
}

impl CutBuilder {
    /// Overrides one operation.
    ///
    /// The body receives the continuation for the rest of the chain, which ends at the
    /// class's original implementation. Overriding the same operation again in one cut
    /// replaces the earlier body, so each override contributes exactly one layer.
    ///
    /// The override runs as the advice `around:<operation>`, apart from the names used with
    /// [`CutBuilder::join`] and [`CutBuilder::advice`].
    #[must_use]
    pub fn around<F>(mut self, operation: impl Into<String>, body: F) -> Self
    where
        F: Fn(&Continuation<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        let operation = operation.into();
        self.inner = self.inner.rebind(
            around_advice(&operation),
            OperationName::new(operation.clone()),
            body,
        );
        if !self.overrides.contains(&operation) {
            self.overrides.push(operation);
        }
        self
    }

    /// Binds a pointcut to a named advice.
    #[must_use]
    pub fn join<P>(mut self, advice: impl Into<String>, pointcut: P) -> Self
    where
        P: Pointcut + 'static,
    {
        self.inner = self.inner.join(advice, pointcut);
        self
    }

    /// Implements a named advice.
    #[must_use]
    pub fn advice<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&Continuation<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        self.inner = self.inner.advice(name, body);
        self
    }

    /// Attaches state reachable from every advice of the cut.
    #[must_use]
    pub fn state<S>(mut self, state: S) -> Self
    where
        S: Any + Send + Sync,
    {
        self.inner = self.inner.state(state);
        self
    }

    /// Finishes the cut.
    #[must_use]
    pub fn build(self) -> Arc<Cut> {
        Arc::new(Cut {
            aspect: Arc::new(self.inner.finish()),
            overrides: self.overrides,
        })
    }
}

/// Advice name under which an `around` override is stored.
fn around_advice(operation: &str) -> String {
    format!("around:{operation}")
}
