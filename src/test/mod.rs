use std::sync::Arc;

use crate::{pointcut::OperationName, Aspect, Class, Cut, Instance, Registry, Value};

// Class "X": x and y return their own names, q wraps a self-call to x in angle brackets
pub fn xyq_class() -> Arc<Class> {
    Class::builder("X")
        .operation("x", |_this, _args, _block| Ok(Value::from("x")))
        .operation("y", |_this, _args, _block| Ok(Value::from("y")))
        .operation("q", |this, _args, _block| {
            let inner = this.call("x", vec![])?;
            Ok(Value::from(format!("<{}>", inner.as_str()?)))
        })
        .build()
}

// Unwoven instance of a fresh "X" class
pub fn xyq_instance() -> Instance {
    Registry::new().instantiate(&xyq_class(), ())
}

fn wrap(open: &str, close: &str, result: Value) -> crate::Result<Value> {
    Ok(Value::from(format!("{open}{}{close}", result.as_str()?)))
}

// Aspect with a single advice "wrap" that surrounds the string result of `operation`
pub fn wrap_aspect(name: &str, operation: &str, open: &str, close: &str) -> Arc<Aspect> {
    let (open, close) = (open.to_string(), close.to_string());
    Aspect::builder(name)
        .register("wrap", OperationName::new(operation), move |target| {
            wrap(&open, &close, target.proceed()?)
        })
        .build()
}

// Cut overriding `operation` with the same surrounding behaviour
pub fn wrap_cut(name: &str, operation: &str, open: &str, close: &str) -> Arc<Cut> {
    let (open, close) = (open.to_string(), close.to_string());
    Cut::builder(name)
        .around(operation, move |target| wrap(&open, &close, target.proceed()?))
        .build()
}
