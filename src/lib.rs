// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]

//! # crosscut
//!
//! Runtime method interception and deterministic advice composition.
//!
//! A [`Class`] declares named operations. [`Aspect`]s bind [`Pointcut`]s (predicates over a
//! call) to named advice bodies, and [`Cut`]s are aspects that override specific operations by
//! name. Applying either to a class through a [`Registry`] weaves it: every later
//! [`Instance`] of that class routes calls through an advice chain that the [`Weaver`] resolves
//! once per operation and then caches.
//!
//! ## Features
//!
//! - **Deterministic ordering** - the most recently applied aspect or cut runs outermost
//! - **Per-operation chain caching** - pointcuts are evaluated once per operation, not per call
//! - **Transparent wrapping** - woven instances expose exactly the class's operations, and self
//!   calls made from inside an operation are intercepted as well
//! - **Short-circuiting** - advice may return without proceeding; the original never runs
//! - **Typed capabilities** - [`capabilities!`] turns a list of operation names into a trait
//!
//! ## Quick Start
//!
//! ```rust
//! use crosscut::prelude::*;
//!
//! let class = Class::builder("X")
//!     .operation("x", |_this, _args, _block| Ok(Value::from("x")))
//!     .operation("y", |_this, _args, _block| Ok(Value::from("y")))
//!     .build();
//!
//! let braces = Aspect::builder("braces")
//!     .register("wrap", "x", |target| {
//!         Ok(Value::from(format!("{{{}}}", target.proceed()?)))
//!     })
//!     .build();
//!
//! let registry = Registry::new();
//! registry.apply(&class, braces)?;
//!
//! let x = registry.instantiate(&class, ());
//! assert_eq!(x.call("x", vec![])?, Value::from("{x}"));
//! assert_eq!(x.call("y", vec![])?, Value::from("y"));
//! # Ok::<(), crosscut::Error>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Instance::call("x")
//!   |
//!   v
//! RegistryEntry ---- attachments (newest first) ----+
//!   |                                               |
//!   v                                               v
//! Weaver -- cache hit? --no--> resolve: every attachment x every matching advice
//!   |                                               |
//!   | yes                                           v
//!   +<------------------- Arc<[ChainEntry]> --------+
//!   |
//!   v
//! Target::Advised(newest) -> ... -> Target::Advised(oldest) -> Target::Original
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`](https://docs.rs/tracing) events: `info` when a class is first
//! woven, `debug` for every application and chain resolution, and `trace` for every woven call
//! when [`WeaveConfig::trace_calls`] is set. Install any subscriber to see them.

#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use crosscut::prelude::*;
///
/// let class = Class::builder("Empty").build();
/// let instance = Registry::new().instantiate(&class, ());
/// assert!(instance.operations().is_empty());
/// ```
pub mod prelude;

mod aspect;
mod class;
mod config;
mod cut;
mod instance;
mod joinpoint;
mod pointcut;
mod registry;
mod target;
mod value;
mod weaver;

/// `crosscut` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `crosscut` Error type
///
/// # Examples
///
/// ```rust
/// use crosscut::{Class, Error};
///
/// let class = Class::builder("X").build();
/// match class.instantiate(()).call("x", vec![]) {
///     Err(Error::UnknownOperation { operation, .. }) => assert_eq!(operation, "x"),
///     other => panic!("unexpected {other:?}"),
/// }
/// ```
pub use error::Error;

pub use aspect::{Advice, AdviceFn, Aspect, AspectBuilder};
pub use class::{Block, Class, ClassBuilder, ClassId, Operation, OperationFn};
pub use config::WeaveConfig;
pub use cut::{Cut, CutBuilder};
pub use instance::Instance;
pub use joinpoint::Joinpoint;
pub use pointcut::{
    OperationName, OperationNames, PatternPointcut, Pointcut, PredicateFn, PredicatePointcut,
};
pub use registry::{Registry, RegistryEntry};
pub use target::{Continuation, Target};
pub use value::{Value, ValueKind};
pub use weaver::{Attachment, ChainEntry, Weaver};
