#![allow(unused_macros)]

/// Helper macro for reading locked items, propagating poisoning as [`crate::Error::LockError`]
///
/// ```rust, ignore
///  let attachments = read_lock!(entry.attachments);
///  println!("{}", attachments.len());
/// ```
macro_rules! read_lock {
    ($rwlock:expr) => {
        $rwlock.read().map_err(|_| crate::Error::LockError)?
    };
}

/// Helper macro for writing to locked items, propagating poisoning as [`crate::Error::LockError`]
///
/// ```rust, ignore
///  let mut attachments = write_lock!(entry.attachments);
///  attachments.insert(0, attachment);
/// ```
macro_rules! write_lock {
    ($rwlock:expr) => {
        $rwlock.write().map_err(|_| crate::Error::LockError)?
    };
}

/// Declares a typed capability-set for a class.
///
/// Generates a trait with one method per operation, implemented for [`crate::Instance`].
/// Every generated method routes through [`crate::Instance::call`] with the operation's name,
/// so woven instances keep applying their advice while callers get a plain method interface.
///
/// # Reserved names
///
/// Inherent methods win over trait methods, so an operation named after one of
/// [`crate::Instance`]'s own methods (`call`, `call_with_block`, `class`, `id`, `state`,
/// `is_woven`, `same`, `operations`, `responds_to`) cannot be reached through the generated
/// trait with method-call syntax: `instance.id()` still resolves to [`crate::Instance::id`].
/// Call such operations through [`crate::Instance::call`], or use fully qualified syntax
/// (`Trait::id(&instance)`).
///
/// ```rust
/// use crosscut::{capabilities, Class, Value};
///
/// capabilities! {
///     /// Operations of the `Greeter` class.
///     pub trait Greeter {
///         fn greet(name);
///         fn wave();
///     }
/// }
///
/// let class = Class::builder("Greeter")
///     .operation("greet", |_this, args, _block| {
///         Ok(Value::from(format!("hello {}", args[0].as_str()?)))
///     })
///     .operation("wave", |_this, _args, _block| Ok(Value::from("o/")))
///     .build();
///
/// let greeter = class.instantiate(());
/// assert_eq!(greeter.greet(Value::from("bob")).unwrap(), Value::from("hello bob"));
/// assert_eq!(greeter.wave().unwrap(), Value::from("o/"));
/// ```
#[macro_export]
macro_rules! capabilities {
    (
        $(#[$meta:meta])*
        $vis:vis trait $name:ident {
            $(
                $(#[$op_meta:meta])*
                fn $op:ident($($arg:ident),* $(,)?);
            )*
        }
    ) => {
        $(#[$meta])*
        $vis trait $name {
            $(
                $(#[$op_meta])*
                fn $op(&self $(, $arg: $crate::Value)*) -> $crate::Result<$crate::Value>;
            )*
        }

        impl $name for $crate::Instance {
            $(
                fn $op(&self $(, $arg: $crate::Value)*) -> $crate::Result<$crate::Value> {
                    self.call(stringify!($op), vec![$($arg),*])
                }
            )*
        }
    };
}
