//! Descriptor of one intercepted call.
//!
//! A [`Joinpoint`] is created fresh for every intercepted call and dropped once the call
//! returns. It carries everything a pointcut needs to decide whether advice applies, and the
//! captured original implementation that terminates the advice chain.

use std::{fmt, sync::Arc};

use crate::{
    class::{Block, Class, Operation},
    instance::Instance,
    pointcut::Pointcut,
    value::Value,
    Result,
};

/// An intercepted call: receiver, declaring class, operation, arguments and block.
///
/// Immutable once constructed.
///
/// # Examples
///
/// ```rust
/// use crosscut::{Class, Joinpoint, OperationName, Value};
///
/// let class = Class::builder("X")
///     .operation("x", |_this, _args, _block| Ok(Value::from("x")))
///     .build();
/// let receiver = class.instantiate(());
///
/// let jp = Joinpoint::new(receiver, "x", vec![], None).unwrap();
/// assert!(jp.is("x"));
/// assert!(jp.matches(&OperationName::new("x")).unwrap());
/// assert_eq!(jp.proceed().unwrap(), Value::from("x"));
/// ```
pub struct Joinpoint {
    receiver: Instance,
    class: Arc<Class>,
    operation: String,
    args: Vec<Value>,
    block: Option<Block>,
    original: Operation,
}

impl Joinpoint {
    /// Describes a call of `operation` on `receiver`.
    ///
    /// The original implementation is captured from the receiver's class here, once.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownOperation`] if the receiver's class does not define
    /// `operation`.
    pub fn new(
        receiver: Instance,
        operation: impl Into<String>,
        args: Vec<Value>,
        block: Option<Block>,
    ) -> Result<Self> {
        let operation = operation.into();
        let class = Arc::clone(receiver.class());
        let original = Arc::clone(class.require(&operation)?);

        Ok(Self {
            receiver,
            class,
            operation,
            args,
            block,
            original,
        })
    }

    /// The instance the call was made on.
    #[must_use]
    pub fn receiver(&self) -> &Instance {
        &self.receiver
    }

    /// The class that defines the original operation.
    #[must_use]
    pub fn class(&self) -> &Arc<Class> {
        &self.class
    }

    /// The operation name.
    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// The captured arguments.
    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// The captured trailing block, if any.
    #[must_use]
    pub fn block(&self) -> Option<&Block> {
        self.block.as_ref()
    }

    /// Exact operation-name comparison.
    #[must_use]
    pub fn is(&self, operation: &str) -> bool {
        self.operation == operation
    }

    /// Tests this joinpoint against a pointcut.
    ///
    /// # Errors
    ///
    /// Propagates a failing predicate.
    pub fn matches(&self, pointcut: &dyn Pointcut) -> Result<bool> {
        pointcut.matches(self)
    }

    /// Invokes the original operation with the captured arguments.
    ///
    /// This bypasses the interception layer for this call only; calls the operation makes
    /// through its receiver are intercepted as usual.
    ///
    /// # Errors
    ///
    /// Returns whatever the original operation returns.
    pub fn proceed(&self) -> Result<Value> {
        self.proceed_with(&self.args)
    }

    /// Invokes the original operation with replacement arguments.
    ///
    /// # Errors
    ///
    /// Returns whatever the original operation returns.
    pub fn proceed_with(&self, args: &[Value]) -> Result<Value> {
        (self.original)(&self.receiver, args, self.block.as_ref())
    }
}

impl fmt::Debug for Joinpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Joinpoint")
            .field("receiver", &self.receiver.id())
            .field("class", &self.class.name())
            .field("operation", &self.operation)
            .field("args", &self.args)
            .field("has_block", &self.block.is_some())
            .finish()
    }
}
