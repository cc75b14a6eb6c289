//! Instances: the wrapper values callers interact with.
//!
//! An [`Instance`] pairs receiver state with its [`Class`] and, if the class was woven when the
//! instance was created, the class's [`RegistryEntry`]. Woven and unwoven instances expose the
//! same interface; only woven ones route calls through the weaver.

use std::{
    any::Any,
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use crate::{
    class::{Block, Class},
    joinpoint::Joinpoint,
    registry::RegistryEntry,
    value::Value,
    Result,
};

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

struct Inner {
    id: u64,
    class: Arc<Class>,
    state: Box<dyn Any + Send + Sync>,
    woven: Option<Arc<RegistryEntry>>,
}

/// A receiver of operation calls.
///
/// Cloning an instance is cheap and yields a handle to the same receiver.
///
/// # Examples
///
/// ```rust
/// use std::sync::atomic::{AtomicI64, Ordering};
/// use crosscut::{Class, Registry, Value};
///
/// let class = Class::builder("Counter")
///     .operation("bump", |this, _args, _block| {
///         let count = this.state::<AtomicI64>().unwrap();
///         Ok(Value::from(count.fetch_add(1, Ordering::SeqCst) + 1))
///     })
///     .build();
///
/// let counter = Registry::new().instantiate(&class, AtomicI64::new(0));
/// counter.call("bump", vec![]).unwrap();
/// assert_eq!(counter.call("bump", vec![]).unwrap(), Value::from(2));
/// assert_eq!(counter.operations(), vec!["bump"]);
/// ```
#[derive(Clone)]
pub struct Instance {
    inner: Arc<Inner>,
}

impl Instance {
    pub(crate) fn new(
        class: Arc<Class>,
        state: Box<dyn Any + Send + Sync>,
        woven: Option<Arc<RegistryEntry>>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                id: NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed),
                class,
                state,
                woven,
            }),
        }
    }

    /// Process-unique receiver identity.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// The instance's class.
    #[must_use]
    pub fn class(&self) -> &Arc<Class> {
        &self.inner.class
    }

    /// The receiver state, if it is of type `T`.
    #[must_use]
    pub fn state<T: Any>(&self) -> Option<&T> {
        self.inner.state.downcast_ref::<T>()
    }

    /// Returns `true` if calls on this instance go through the weaver.
    #[must_use]
    pub fn is_woven(&self) -> bool {
        self.inner.woven.is_some()
    }

    /// Returns `true` if both handles refer to the same receiver.
    #[must_use]
    pub fn same(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Calls an operation.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownOperation`] for operations the class does not define,
    /// resolution errors on woven instances, and whatever the advice chain or the original
    /// operation returns.
    pub fn call(&self, operation: &str, args: Vec<Value>) -> Result<Value> {
        self.dispatch(operation, args, None)
    }

    /// Calls an operation with a trailing block.
    ///
    /// # Errors
    ///
    /// See [`Instance::call`].
    pub fn call_with_block(
        &self,
        operation: &str,
        args: Vec<Value>,
        block: Block,
    ) -> Result<Value> {
        self.dispatch(operation, args, Some(block))
    }

    fn dispatch(&self, operation: &str, args: Vec<Value>, block: Option<Block>) -> Result<Value> {
        match &self.inner.woven {
            Some(entry) => {
                let joinpoint = Joinpoint::new(self.clone(), operation, args, block)?;
                entry.invoke(&joinpoint)
            }
            None => {
                let original = self.inner.class.require(operation)?;
                original(self, &args, block.as_ref())
            }
        }
    }

    /// Operation names visible on this instance, in declaration order.
    ///
    /// Weaving never adds or removes names: this is always the class's own operation set.
    #[must_use]
    pub fn operations(&self) -> Vec<&str> {
        self.inner.class.operation_names().collect()
    }

    /// Returns `true` if the instance has the operation.
    #[must_use]
    pub fn responds_to(&self, operation: &str) -> bool {
        self.inner.class.defines(operation)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("id", &self.inner.id)
            .field("class", &self.inner.class.name())
            .field("woven", &self.is_woven())
            .finish()
    }
}
