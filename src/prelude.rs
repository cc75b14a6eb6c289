//! # crosscut Prelude
//!
//! Import this module to get quick access to the types needed to declare classes, write
//! aspects and cuts, and weave them.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all crosscut operations
pub use crate::Error;

/// The result type used throughout the crate
pub use crate::Result;

/// Weaving configuration
pub use crate::WeaveConfig;

// ================================================================================================
// Classes and Instances
// ================================================================================================

/// Operation-set declaration and the values flowing through it
pub use crate::{Block, Class, ClassBuilder, Instance, Value, ValueKind};

// ================================================================================================
// Interception
// ================================================================================================

/// Call descriptions and the predicates selecting them
pub use crate::{
    Joinpoint, OperationName, OperationNames, PatternPointcut, Pointcut, PredicatePointcut,
};

/// Advice providers and the continuation handed to each advice body
pub use crate::{Aspect, AspectBuilder, Continuation, Cut, CutBuilder};

/// Weaving entry points
pub use crate::{Registry, RegistryEntry};

// ================================================================================================
// Macros
// ================================================================================================

/// Typed capability-set declaration and error construction
pub use crate::{capabilities, raised};
