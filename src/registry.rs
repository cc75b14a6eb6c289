//! Association of classes with their attached aspects and cuts.
//!
//! The [`Registry`] owns one [`RegistryEntry`] per woven class. An entry is created the first
//! time anything is applied to the class (the Unwoven → Woven transition) and lives as long as
//! the registry. Hosts can create registries of their own or use the process-wide
//! [`Registry::global`], which [`Class::apply`] and [`Class::instantiate`] go through.
//!
//! # Lifecycle
//!
//! ```text
//!   Unwoven ── apply / apply_cut ──► Woven ──┐
//!                                      ▲     │ apply / apply_cut
//!                                      └─────┘ (prepends, invalidates nothing)
//! ```
//!
//! Instances capture the entry at construction: instances created while the class is still
//! unwoven keep calling the original operations directly.
//!
//! # Staleness
//!
//! Chains are resolved once per operation and never recomputed on their own. Applying another
//! attachment after an operation has been called does not change that operation's chain until
//! [`Registry::invalidate`] or [`Registry::invalidate_all`] is called.

use std::{
    any::Any,
    fmt,
    sync::{Arc, OnceLock, RwLock},
};

use dashmap::DashMap;
use tracing::{debug, info};

use crate::{
    aspect::Aspect,
    class::{Class, ClassId},
    config::WeaveConfig,
    cut::Cut,
    instance::Instance,
    joinpoint::Joinpoint,
    value::Value,
    weaver::{Attachment, ChainEntry, Weaver},
    Error, Result,
};

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Per-class weaving state: attachments and the resolved chain cache.
pub struct RegistryEntry {
    class: String,
    attachments: RwLock<Vec<Attachment>>,
    weaver: Weaver,
}

impl RegistryEntry {
    fn new(class: &Class, config: Arc<WeaveConfig>) -> Self {
        Self {
            class: class.name().to_string(),
            attachments: RwLock::new(Vec::new()),
            weaver: Weaver::new(class.name(), config),
        }
    }

    /// Routes a call through the class's advice chain.
    pub(crate) fn invoke(&self, joinpoint: &Joinpoint) -> Result<Value> {
        self.weaver.invoke(&self.attachments, joinpoint)
    }

    /// Attachments, most recently applied first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockError`] if the attachment lock is poisoned.
    pub fn attachments(&self) -> Result<Vec<Attachment>> {
        Ok(read_lock!(self.attachments).clone())
    }

    fn attach(&self, attachment: Attachment) -> Result<()> {
        let mut attachments = write_lock!(self.attachments);
        attachments.insert(0, attachment);
        Ok(())
    }
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let attachments: Vec<String> = self
            .attachments
            .read()
            .map(|a| a.iter().map(|a| a.name().to_string()).collect())
            .unwrap_or_default();

        f.debug_struct("RegistryEntry")
            .field("class", &self.class)
            .field("attachments", &attachments)
            .field("weaver", &self.weaver)
            .finish()
    }
}

/// Registry of woven classes.
///
/// # Examples
///
/// ```rust
/// use crosscut::{Aspect, Class, Registry, Value};
///
/// let class = Class::builder("X")
///     .operation("x", |_this, _args, _block| Ok(Value::from("x")))
///     .operation("y", |_this, _args, _block| Ok(Value::from("y")))
///     .build();
///
/// let braces = Aspect::builder("braces")
///     .register("wrap", "x", |target| {
///         Ok(Value::from(format!("{{{}}}", target.proceed()?)))
///     })
///     .build();
/// let angles = Aspect::builder("angles")
///     .register("wrap", "x", |target| {
///         Ok(Value::from(format!("<{}>", target.proceed()?)))
///     })
///     .build();
///
/// let registry = Registry::new();
/// registry.apply(&class, braces).unwrap();
/// registry.apply(&class, angles).unwrap();
///
/// let x = registry.instantiate(&class, ());
/// assert_eq!(x.call("x", vec![]).unwrap(), Value::from("<{x}>"));
/// assert_eq!(x.call("y", vec![]).unwrap(), Value::from("y"));
/// ```
pub struct Registry {
    config: Arc<WeaveConfig>,
    entries: DashMap<ClassId, Arc<RegistryEntry>>,
}

impl Registry {
    /// Creates an empty registry with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(WeaveConfig::default())
    }

    /// Creates an empty registry.
    #[must_use]
    pub fn with_config(config: WeaveConfig) -> Self {
        Self {
            config: Arc::new(config),
            entries: DashMap::new(),
        }
    }

    /// The process-wide registry, created with the default configuration on first use.
    pub fn global() -> &'static Registry {
        GLOBAL.get_or_init(Registry::new)
    }

    /// The registry's configuration.
    #[must_use]
    pub fn config(&self) -> &WeaveConfig {
        &self.config
    }

    /// Applies an aspect to a class.
    ///
    /// The first application weaves the class. Later ones prepend, so the aspect applied last
    /// runs outermost.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownOperation`] if validation is enabled and a literal pointcut of
    /// the aspect names an operation the class does not define. Nothing is attached then.
    pub fn apply(&self, class: &Class, aspect: Arc<Aspect>) -> Result<()> {
        self.attach(class, Attachment::Aspect(aspect))
    }

    /// Applies a cut to a class.
    ///
    /// Cuts and aspects share one ordering: whichever was applied last wraps outermost.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownOperation`] if validation is enabled and the cut overrides or
    /// names an operation the class does not define.
    pub fn apply_cut(&self, class: &Class, cut: Arc<Cut>) -> Result<()> {
        self.attach(class, Attachment::Cut(cut))
    }

    fn attach(&self, class: &Class, attachment: Attachment) -> Result<()> {
        if self.config.validate_operations {
            if let Some(missing) = attachment
                .bindings()
                .referenced_operations()
                .into_iter()
                .find(|op| !class.defines(op))
            {
                return Err(Error::UnknownOperation {
                    class: class.name().to_string(),
                    operation: missing.to_string(),
                });
            }
        }

        let entry = Arc::clone(&*self.entries.entry(class.id()).or_insert_with(|| {
            info!(class = class.name(), id = %class.id(), "weaving class");
            Arc::new(RegistryEntry::new(class, Arc::clone(&self.config)))
        }));

        let kind = match attachment {
            Attachment::Aspect(_) => "aspect",
            Attachment::Cut(_) => "cut",
        };
        debug!(
            class = class.name(),
            attachment = attachment.name(),
            kind,
            "applying"
        );
        entry.attach(attachment)
    }

    /// Creates an instance of a class.
    ///
    /// If the class is woven at this point, the instance routes every call through the weaver;
    /// otherwise it calls the original operations directly for its whole lifetime.
    pub fn instantiate<S>(&self, class: &Arc<Class>, state: S) -> Instance
    where
        S: Any + Send + Sync,
    {
        Instance::new(Arc::clone(class), Box::new(state), self.entry(class))
    }

    /// Returns `true` once anything has been applied to the class.
    #[must_use]
    pub fn is_woven(&self, class: &Class) -> bool {
        self.entries.contains_key(&class.id())
    }

    /// The registry entry of a woven class.
    #[must_use]
    pub fn entry(&self, class: &Class) -> Option<Arc<RegistryEntry>> {
        self.entries.get(&class.id()).map(|e| Arc::clone(&e))
    }

    /// Aspects applied to the class, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockError`] if the attachment lock is poisoned.
    pub fn aspects(&self, class: &Class) -> Result<Vec<Arc<Aspect>>> {
        Ok(self
            .attachments(class)?
            .into_iter()
            .filter_map(|a| match a {
                Attachment::Aspect(aspect) => Some(aspect),
                Attachment::Cut(_) => None,
            })
            .collect())
    }

    /// Cuts applied to the class, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockError`] if the attachment lock is poisoned.
    pub fn cuts(&self, class: &Class) -> Result<Vec<Arc<Cut>>> {
        Ok(self
            .attachments(class)?
            .into_iter()
            .filter_map(|a| match a {
                Attachment::Cut(cut) => Some(cut),
                Attachment::Aspect(_) => None,
            })
            .collect())
    }

    /// Aspects and cuts applied to the class, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockError`] if the attachment lock is poisoned.
    pub fn attachments(&self, class: &Class) -> Result<Vec<Attachment>> {
        match self.entry(class) {
            Some(entry) => entry.attachments(),
            None => Ok(Vec::new()),
        }
    }

    /// Drops the resolved chain of one operation so the next call re-resolves it.
    ///
    /// Returns `true` if a chain was cached.
    pub fn invalidate(&self, class: &Class, operation: &str) -> bool {
        let dropped = self
            .entry(class)
            .is_some_and(|entry| entry.weaver.invalidate(operation));
        if dropped {
            debug!(class = class.name(), operation, "invalidated advice chain");
        }
        dropped
    }

    /// Drops every resolved chain of the class, returning how many were dropped.
    pub fn invalidate_all(&self, class: &Class) -> usize {
        let dropped = self
            .entry(class)
            .map_or(0, |entry| entry.weaver.invalidate_all());
        debug!(class = class.name(), dropped, "invalidated all advice chains");
        dropped
    }

    /// Operations of the class whose chain has been resolved, sorted by name.
    #[must_use]
    pub fn resolved_operations(&self, class: &Class) -> Vec<String> {
        self.entry(class)
            .map(|entry| entry.weaver.resolved_operations())
            .unwrap_or_default()
    }

    /// The resolved chain of an operation, outermost first.
    #[must_use]
    pub fn resolved_chain(&self, class: &Class, operation: &str) -> Option<Vec<ChainEntry>> {
        self.entry(class)
            .and_then(|entry| entry.weaver.resolved(operation))
    }

    /// Number of woven classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no class has been woven.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("woven_classes", &self.entries.len())
            .finish()
    }
}
