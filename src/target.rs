//! Continuations: the "rest of the chain" handed to advice.
//!
//! The weaver folds the resolved advice entries into a chain of [`Target`] links. The
//! innermost link calls the original operation through [`Joinpoint::proceed_with`]; every
//! other link runs one advice body and hands it a [`Continuation`] for its inner link.
//!
//! ```text
//!  Continuation (newest attachment) ──► advice body
//!                                          │ proceed()
//!                                          ▼
//!  Continuation (older attachment)  ──► advice body
//!                                          │ proceed()
//!                                          ▼
//!  Target::Original                 ──► original operation
//! ```
//!
//! The chain machinery adds no side effects of its own: an advice body that calls inward gets
//! exactly the next link's result, one that never calls inward keeps the original from running.

use std::any::Any;

use crate::{
    aspect::Aspect, instance::Instance, joinpoint::Joinpoint, value::Value, weaver::ChainEntry,
    Result,
};

/// One link of an advice chain.
pub enum Target<'a> {
    /// The innermost link: the original, unintercepted operation.
    Original,

    /// An advice-backed link wrapping an inner link.
    Advised {
        /// The advice this link runs
        entry: &'a ChainEntry,
        /// The next link inward
        inner: Box<Target<'a>>,
    },
}

impl<'a> Target<'a> {
    /// Folds resolved entries into a chain.
    ///
    /// `entries` is in execution order: the first entry becomes the outermost link.
    #[must_use]
    pub fn chain(entries: &'a [ChainEntry]) -> Self {
        entries.iter().rev().fold(Target::Original, |inner, entry| {
            Target::Advised {
                entry,
                inner: Box::new(inner),
            }
        })
    }

    /// Number of advice layers above the original operation.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut link = self;
        while let Target::Advised { inner, .. } = link {
            depth += 1;
            link = inner;
        }
        depth
    }

    /// Runs this link with the given arguments.
    ///
    /// # Errors
    ///
    /// Returns whatever the advice body or the original operation returns.
    pub fn call(&self, joinpoint: &Joinpoint, args: &[Value]) -> Result<Value> {
        match self {
            Target::Original => joinpoint.proceed_with(args),
            Target::Advised { entry, inner } => {
                let continuation = Continuation {
                    entry,
                    inner,
                    joinpoint,
                    args,
                };
                (entry.body())(&continuation)
            }
        }
    }
}

/// The handle an advice body receives for the rest of the chain.
///
/// # Examples
///
/// ```rust
/// use crosscut::{Aspect, Class, Registry, Value};
///
/// let class = Class::builder("Math")
///     .operation("double", |_this, args, _block| Ok(Value::from(args[0].as_int()? * 2)))
///     .build();
///
/// // Clamp the input, then call inward with the replaced argument.
/// let clamp = Aspect::builder("clamp")
///     .register("clamp", "double", |target| {
///         let n = target.args()[0].as_int()?.min(10);
///         target.proceed_with(vec![Value::from(n)])
///     })
///     .build();
///
/// let registry = Registry::new();
/// registry.apply(&class, clamp).unwrap();
/// let math = registry.instantiate(&class, ());
/// assert_eq!(math.call("double", vec![Value::from(50)]).unwrap(), Value::from(20));
/// ```
pub struct Continuation<'a> {
    entry: &'a ChainEntry,
    inner: &'a Target<'a>,
    joinpoint: &'a Joinpoint,
    args: &'a [Value],
}

impl Continuation<'_> {
    /// Runs the rest of the chain with the current arguments.
    ///
    /// May be called any number of times.
    ///
    /// # Errors
    ///
    /// Returns whatever the inner link returns.
    pub fn proceed(&self) -> Result<Value> {
        self.inner.call(self.joinpoint, self.args)
    }

    /// Runs the rest of the chain with replacement arguments.
    ///
    /// Inner links see the replaced arguments through [`Continuation::args`], and the original
    /// operation is called with them.
    ///
    /// # Errors
    ///
    /// Returns whatever the inner link returns.
    pub fn proceed_with(&self, args: Vec<Value>) -> Result<Value> {
        self.inner.call(self.joinpoint, &args)
    }

    /// The arguments this link was called with.
    #[must_use]
    pub fn args(&self) -> &[Value] {
        self.args
    }

    /// The intercepted call.
    #[must_use]
    pub fn joinpoint(&self) -> &Joinpoint {
        self.joinpoint
    }

    /// The receiver of the intercepted call.
    #[must_use]
    pub fn receiver(&self) -> &Instance {
        self.joinpoint.receiver()
    }

    /// The aspect (or cut) this advice belongs to.
    #[must_use]
    pub fn aspect(&self) -> &Aspect {
        self.entry.aspect()
    }

    /// Shortcut for the aspect's own state.
    #[must_use]
    pub fn state<T: Any>(&self) -> Option<&T> {
        self.entry.aspect().state::<T>()
    }

    /// The name of the advice being run.
    #[must_use]
    pub fn advice_name(&self) -> &str {
        self.entry.advice_name()
    }
}
