//! Aspects: reusable bundles of pointcut-to-advice bindings.
//!
//! An [`Aspect`] maps advice names to one or more pointcuts and to the advice bodies that
//! implement them. Aspects are built once, are immutable afterwards, and can be applied to any
//! number of classes.
//!
//! # Examples
//!
//! ```rust
//! use crosscut::{Aspect, Value};
//!
//! // Wraps the result of `x` in braces.
//! let braces = Aspect::builder("braces")
//!     .register("wrap", "x", |target| {
//!         Ok(Value::from(format!("{{{}}}", target.proceed()?)))
//!     })
//!     .build();
//!
//! assert_eq!(braces.advice_names().collect::<Vec<_>>(), vec!["wrap"]);
//! ```

use std::{any::Any, collections::HashMap, fmt, sync::Arc};

use crate::{
    joinpoint::Joinpoint, pointcut::Pointcut, target::Continuation, value::Value, Result,
};

/// Signature of an advice body.
///
/// The body receives the continuation for the rest of the chain. Calling
/// [`Continuation::proceed`] runs the next link; not calling it short-circuits the chain.
pub type AdviceFn = dyn Fn(&Continuation<'_>) -> Result<Value> + Send + Sync;

/// A shared advice body.
pub type Advice = Arc<AdviceFn>;

struct Binding {
    advice: String,
    pointcuts: Vec<Arc<dyn Pointcut>>,
}

/// A named collection of pointcut-to-advice bindings plus the advice implementations.
pub struct Aspect {
    name: String,
    bindings: Vec<Binding>,
    advices: HashMap<String, Advice>,
    state: Option<Arc<dyn Any + Send + Sync>>,
}

impl Aspect {
    /// Starts building an aspect.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> AspectBuilder {
        AspectBuilder {
            name: name.into(),
            bindings: Vec::new(),
            advices: HashMap::new(),
            state: None,
        }
    }

    /// Returns the aspect name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the implementation of an advice.
    #[must_use]
    pub fn advice(&self, name: &str) -> Option<&Advice> {
        self.advices.get(name)
    }

    /// Iterates over bound advice names in declaration order.
    pub fn advice_names(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(|b| b.advice.as_str())
    }

    /// Returns the aspect's own state, if it was given one of type `T`.
    #[must_use]
    pub fn state<T: Any>(&self) -> Option<&T> {
        self.state.as_deref().and_then(|s| s.downcast_ref::<T>())
    }

    /// Returns the advice names whose pointcuts match the joinpoint.
    ///
    /// Pointcuts are evaluated in registration order. An advice appears once per matching
    /// pointcut, so an advice bound through two matching pointcuts is listed twice and
    /// contributes two chain layers.
    ///
    /// # Errors
    ///
    /// Propagates the first failing pointcut; later pointcuts are not evaluated.
    pub fn matching_advices(&self, joinpoint: &Joinpoint) -> Result<Vec<&str>> {
        let mut matched = Vec::new();
        for binding in &self.bindings {
            for pointcut in &binding.pointcuts {
                if joinpoint.matches(pointcut.as_ref())? {
                    matched.push(binding.advice.as_str());
                }
            }
        }
        Ok(matched)
    }

    /// Operation names referenced by literal pointcuts, in declaration order.
    #[must_use]
    pub fn referenced_operations(&self) -> Vec<&str> {
        self.bindings
            .iter()
            .flat_map(|b| b.pointcuts.iter())
            .filter_map(|p| p.operations())
            .flatten()
            .collect()
    }
}

impl fmt::Debug for Aspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bindings: Vec<(&str, Vec<String>)> = self
            .bindings
            .iter()
            .map(|b| {
                (
                    b.advice.as_str(),
                    b.pointcuts.iter().map(|p| p.description()).collect(),
                )
            })
            .collect();

        f.debug_struct("Aspect")
            .field("name", &self.name)
            .field("bindings", &bindings)
            .field("has_state", &self.state.is_some())
            .finish()
    }
}

/// Builder for [`Aspect`].
pub struct AspectBuilder {
    name: String,
    bindings: Vec<Binding>,
    advices: HashMap<String, Advice>,
    state: Option<Arc<dyn Any + Send + Sync>>,
}

impl AspectBuilder {
    /// Binds a pointcut to an advice name.
    ///
    /// Binding the same advice name again accumulates pointcuts; it never replaces earlier
    /// ones.
    #[must_use]
    pub fn join<P>(mut self, advice: impl Into<String>, pointcut: P) -> Self
    where
        P: Pointcut + 'static,
    {
        let advice = advice.into();
        let pointcut: Arc<dyn Pointcut> = Arc::new(pointcut);
        match self.bindings.iter_mut().find(|b| b.advice == advice) {
            Some(binding) => binding.pointcuts.push(pointcut),
            None => self.bindings.push(Binding {
                advice,
                pointcuts: vec![pointcut],
            }),
        }
        self
    }

    /// Implements an advice.
    ///
    /// A later implementation for the same name replaces the earlier one.
    #[must_use]
    pub fn advice<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&Continuation<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        self.advices.insert(name.into(), Arc::new(body));
        self
    }

    /// Binds a pointcut and implements the advice in one step.
    #[must_use]
    pub fn register<P, F>(self, advice: impl Into<String>, pointcut: P, body: F) -> Self
    where
        P: Pointcut + 'static,
        F: Fn(&Continuation<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        let advice = advice.into();
        self.join(advice.clone(), pointcut).advice(advice, body)
    }

    /// Binds a single pointcut and implementation to an advice, replacing any earlier binding
    /// of that name in place.
    pub(crate) fn rebind<P, F>(mut self, advice: impl Into<String>, pointcut: P, body: F) -> Self
    where
        P: Pointcut + 'static,
        F: Fn(&Continuation<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        let advice = advice.into();
        let pointcut: Arc<dyn Pointcut> = Arc::new(pointcut);
        match self.bindings.iter_mut().find(|b| b.advice == advice) {
            Some(binding) => binding.pointcuts = vec![pointcut],
            None => self.bindings.push(Binding {
                advice: advice.clone(),
                pointcuts: vec![pointcut],
            }),
        }
        self.advices.insert(advice, Arc::new(body));
        self
    }

    /// Attaches state that every advice of this aspect can reach through
    /// [`Continuation::aspect`].
    #[must_use]
    pub fn state<S>(mut self, state: S) -> Self
    where
        S: Any + Send + Sync,
    {
        self.state = Some(Arc::new(state));
        self
    }

    /// Finishes the aspect.
    ///
    /// Bindings without an implementation are accepted here and reported as
    /// [`crate::Error::MissingAdvice`] when an advice chain that needs them is built.
    #[must_use]
    pub fn build(self) -> Arc<Aspect> {
        Arc::new(self.finish())
    }

    pub(crate) fn finish(self) -> Aspect {
        Aspect {
            name: self.name,
            bindings: self.bindings,
            advices: self.advices,
            state: self.state,
        }
    }
}
