//! Minimal host object model.
//!
//! A [`Class`] is a named, immutable table of operations. Each [`Operation`] is the original,
//! unintercepted implementation, captured once when the class is built. The weaver never looks
//! anywhere else for "the real method": [`crate::Joinpoint::proceed`] calls the captured
//! closure directly.
//!
//! # Examples
//!
//! ```rust
//! use crosscut::{Class, Value};
//!
//! let class = Class::builder("X")
//!     .operation("x", |_this, _args, _block| Ok(Value::from("x")))
//!     .operation("q", |this, _args, _block| {
//!         let inner = this.call("x", vec![])?;
//!         Ok(Value::from(format!("<{inner}>")))
//!     })
//!     .build();
//!
//! assert!(class.defines("q"));
//! assert_eq!(class.operation_names().collect::<Vec<_>>(), vec!["x", "q"]);
//! ```

use std::{
    any::Any,
    collections::HashMap,
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use crate::{
    aspect::Aspect, cut::Cut, instance::Instance, registry::Registry, value::Value, Error,
    Result,
};

static NEXT_CLASS_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`Class`].
///
/// Used as the registry key, so two classes with the same name never share attachments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassId(u64);

impl ClassId {
    fn next() -> Self {
        Self(NEXT_CLASS_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Signature of an original operation implementation.
///
/// Receives the instance the call was made on, the call arguments and the optional trailing
/// block. The instance handle is the (possibly woven) receiver, so calls made through it from
/// inside an operation are intercepted like any other call.
pub type OperationFn =
    dyn Fn(&Instance, &[Value], Option<&Block>) -> Result<Value> + Send + Sync;

/// An original operation implementation, shared between the class and every joinpoint.
pub type Operation = Arc<OperationFn>;

/// A trailing callable passed along with an intercepted call.
///
/// Blocks are captured by the joinpoint and handed to the original operation untouched.
///
/// ```rust
/// use crosscut::{Block, Value};
///
/// let double = Block::new(|args| Ok(Value::from(args[0].as_int()? * 2)));
/// assert_eq!(double.call(&[Value::from(21)]).unwrap(), Value::from(42));
/// ```
#[derive(Clone)]
pub struct Block(Arc<dyn Fn(&[Value]) -> Result<Value> + Send + Sync>);

impl Block {
    /// Wraps a closure as a block.
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Self(Arc::new(body))
    }

    /// Invokes the block.
    ///
    /// # Errors
    ///
    /// Returns whatever the block returns.
    pub fn call(&self, args: &[Value]) -> Result<Value> {
        (self.0)(args)
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Block")
    }
}

/// A named table of original operations.
///
/// Classes are immutable once built and shared as `Arc<Class>`. Weaving never modifies a
/// class: attachments live in the [`Registry`], keyed by [`ClassId`].
pub struct Class {
    id: ClassId,
    name: String,
    operations: Vec<(String, Operation)>,
    index: HashMap<String, usize>,
}

impl Class {
    /// Starts building a class with the given name.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder {
            name: name.into(),
            operations: Vec::new(),
        }
    }

    /// Returns the class identity.
    #[must_use]
    pub fn id(&self) -> ClassId {
        self.id
    }

    /// Returns the class name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the original implementation of an operation.
    #[must_use]
    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.index.get(name).map(|&i| &self.operations[i].1)
    }

    /// Looks up an operation, failing with [`Error::UnknownOperation`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownOperation`] if the class does not define `name`.
    pub fn require(&self, name: &str) -> Result<&Operation> {
        self.operation(name).ok_or_else(|| Error::UnknownOperation {
            class: self.name.clone(),
            operation: name.to_string(),
        })
    }

    /// Returns `true` if the class defines the operation.
    #[must_use]
    pub fn defines(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Iterates over operation names in declaration order.
    pub fn operation_names(&self) -> impl Iterator<Item = &str> {
        self.operations.iter().map(|(name, _)| name.as_str())
    }

    /// Creates an instance through the process-wide [`Registry::global`].
    ///
    /// See [`Registry::instantiate`].
    pub fn instantiate<S>(self: &Arc<Self>, state: S) -> Instance
    where
        S: Any + Send + Sync,
    {
        Registry::global().instantiate(self, state)
    }

    /// Applies an aspect through the process-wide [`Registry::global`].
    ///
    /// # Errors
    ///
    /// See [`Registry::apply`].
    pub fn apply(&self, aspect: Arc<Aspect>) -> Result<()> {
        Registry::global().apply(self, aspect)
    }

    /// Applies a cut through the process-wide [`Registry::global`].
    ///
    /// # Errors
    ///
    /// See [`Registry::apply_cut`].
    pub fn apply_cut(&self, cut: Arc<Cut>) -> Result<()> {
        Registry::global().apply_cut(self, cut)
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("operations", &self.operation_names().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`Class`].
pub struct ClassBuilder {
    name: String,
    operations: Vec<(String, Operation)>,
}

impl ClassBuilder {
    /// Defines an operation.
    ///
    /// Defining the same name twice replaces the earlier implementation but keeps its
    /// declaration position.
    #[must_use]
    pub fn operation<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&Instance, &[Value], Option<&Block>) -> Result<Value> + Send + Sync + 'static,
    {
        let name = name.into();
        let body: Operation = Arc::new(body);
        match self.operations.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = body,
            None => self.operations.push((name, body)),
        }
        self
    }

    /// Finishes the class.
    #[must_use]
    pub fn build(self) -> Arc<Class> {
        let index = self
            .operations
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name.clone(), i))
            .collect();

        Arc::new(Class {
            id: ClassId::next(),
            name: self.name,
            operations: self.operations,
            index,
        })
    }
}
