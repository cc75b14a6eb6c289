//! The interception layer.
//!
//! For every intercepted call the [`Weaver`] looks up the advice chain for the operation,
//! resolving it on first use, and runs it. Resolution walks the class's attachments
//! most-recently-applied first, asks each for its matching advices, and caches the ordered
//! result under the operation name.
//!
//! # Call Flow
//!
//! ```text
//! Instance::call("x", args)
//!         │
//!         ▼
//! ┌───────────────────┐
//! │  Build joinpoint  │
//! └───────────────────┘
//!         │
//!         ▼
//! ┌───────────────────┐   cached   ┌─────────────────┐
//! │  Cache lookup     │──────────► │  chain entries  │
//! └───────────────────┘            └─────────────────┘
//!         │ miss                            ▲
//!         ▼                                 │
//! ┌───────────────────┐                     │
//! │  Match pointcuts  │─────── publish ─────┘
//! │  (newest first)   │
//! └───────────────────┘
//!         │
//!         ▼
//!  empty chain ──► original operation
//!  otherwise   ──► outermost continuation ──► ... ──► original operation
//! ```
//!
//! # Caching
//!
//! A chain is computed at most once per (class, operation name). The cache entry's shard lock
//! is held while the chain is computed, so concurrent first calls never build two chains and
//! readers never see a partial one. Applying another attachment afterwards does not touch
//! resolved chains; call [`crate::Registry::invalidate`] or
//! [`crate::Registry::invalidate_all`] to pick it up.

use std::{
    fmt,
    sync::{Arc, RwLock},
};

use dashmap::{mapref::entry::Entry, DashMap};
use tracing::{debug, trace};

use crate::{
    aspect::{Advice, Aspect},
    config::WeaveConfig,
    cut::Cut,
    joinpoint::Joinpoint,
    target::Target,
    value::Value,
    Error, Result,
};

/// One resolved layer of an advice chain: an aspect's named advice.
#[derive(Clone)]
pub struct ChainEntry {
    aspect: Arc<Aspect>,
    advice: String,
    body: Advice,
}

impl ChainEntry {
    /// Resolves an advice name against its aspect.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingAdvice`] if the aspect binds `advice` without implementing it.
    pub fn resolve(aspect: Arc<Aspect>, advice: &str) -> Result<Self> {
        let body = aspect
            .advice(advice)
            .cloned()
            .ok_or_else(|| Error::MissingAdvice {
                aspect: aspect.name().to_string(),
                advice: advice.to_string(),
            })?;

        Ok(Self {
            aspect,
            advice: advice.to_string(),
            body,
        })
    }

    /// The aspect the advice belongs to.
    #[must_use]
    pub fn aspect(&self) -> &Aspect {
        &self.aspect
    }

    /// The advice name.
    #[must_use]
    pub fn advice_name(&self) -> &str {
        &self.advice
    }

    /// The advice body.
    #[must_use]
    pub fn body(&self) -> &Advice {
        &self.body
    }
}

impl fmt::Debug for ChainEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.aspect.name(), self.advice)
    }
}

/// Something applied to a class: an aspect or a cut.
///
/// Both kinds share one ordered list per class, so their relative order is the order they were
/// applied in.
#[derive(Clone, Debug)]
pub enum Attachment {
    /// A reusable aspect.
    Aspect(Arc<Aspect>),
    /// A class-specific cut.
    Cut(Arc<Cut>),
}

impl Attachment {
    /// The bindings to match against.
    #[must_use]
    pub fn bindings(&self) -> &Arc<Aspect> {
        match self {
            Attachment::Aspect(aspect) => aspect,
            Attachment::Cut(cut) => cut.as_aspect(),
        }
    }

    /// The aspect or cut name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.bindings().name()
    }
}

/// Resolved chains for one class.
pub(crate) type Chain = Arc<[ChainEntry]>;

/// Per-class chain resolution and invocation.
pub struct Weaver {
    class: String,
    config: Arc<WeaveConfig>,
    cache: DashMap<String, Chain>,
}

impl Weaver {
    pub(crate) fn new(class: impl Into<String>, config: Arc<WeaveConfig>) -> Self {
        Self {
            class: class.into(),
            config,
            cache: DashMap::new(),
        }
    }

    /// Runs an intercepted call through its advice chain.
    ///
    /// # Errors
    ///
    /// Returns resolution errors ([`Error::Predicate`], [`Error::MissingAdvice`]) and, unchanged,
    /// whatever the chain returns.
    pub(crate) fn invoke(
        &self,
        attachments: &RwLock<Vec<Attachment>>,
        joinpoint: &Joinpoint,
    ) -> Result<Value> {
        let chain = self.chain(attachments, joinpoint)?;

        if self.config.trace_calls {
            trace!(
                class = %self.class,
                operation = joinpoint.operation(),
                receiver = joinpoint.receiver().id(),
                layers = chain.len(),
                "intercepted call"
            );
        }

        if chain.is_empty() {
            return joinpoint.proceed();
        }

        Target::chain(&chain).call(joinpoint, joinpoint.args())
    }

    /// Returns the cached chain for the joinpoint's operation, resolving it on first use.
    fn chain(&self, attachments: &RwLock<Vec<Attachment>>, joinpoint: &Joinpoint) -> Result<Chain> {
        if let Some(chain) = self.cache.get(joinpoint.operation()) {
            return Ok(Arc::clone(&chain));
        }

        let attachments = read_lock!(attachments);
        match self.cache.entry(joinpoint.operation().to_string()) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let chain = self.resolve(&attachments, joinpoint)?;
                debug!(
                    class = %self.class,
                    operation = joinpoint.operation(),
                    chain = ?chain,
                    "resolved advice chain"
                );
                Ok(Arc::clone(entry.insert(chain).value()))
            }
        }
    }

    /// Computes the ordered chain entries for a joinpoint.
    ///
    /// Attachments are visited newest first; within an attachment, advices follow pointcut
    /// registration order.
    fn resolve(&self, attachments: &[Attachment], joinpoint: &Joinpoint) -> Result<Chain> {
        let mut entries = Vec::new();

        for attachment in attachments {
            let aspect = attachment.bindings();
            let mut matched = aspect.matching_advices(joinpoint)?;
            if self.config.collapse_duplicate_advice {
                let mut seen = Vec::with_capacity(matched.len());
                matched.retain(|name| {
                    if seen.contains(name) {
                        false
                    } else {
                        seen.push(*name);
                        true
                    }
                });
            }

            for advice in matched {
                entries.push(ChainEntry::resolve(Arc::clone(aspect), advice)?);
            }
        }

        Ok(entries.into())
    }

    /// Drops the resolved chain of one operation.
    pub(crate) fn invalidate(&self, operation: &str) -> bool {
        self.cache.remove(operation).is_some()
    }

    /// Drops every resolved chain, returning how many were dropped.
    pub(crate) fn invalidate_all(&self) -> usize {
        let count = self.cache.len();
        self.cache.clear();
        count
    }

    /// Names of operations with a resolved chain, sorted.
    pub(crate) fn resolved_operations(&self) -> Vec<String> {
        let mut names: Vec<String> = self.cache.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// The resolved chain of an operation, if any.
    pub(crate) fn resolved(&self, operation: &str) -> Option<Vec<ChainEntry>> {
        self.cache.get(operation).map(|chain| chain.to_vec())
    }
}

impl fmt::Debug for Weaver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Weaver")
            .field("class", &self.class)
            .field("resolved", &self.cache.len())
            .finish()
    }
}
