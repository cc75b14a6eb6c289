//! Integration tests for aspects woven into classes.
//!
//! The `X` class used throughout defines `x`, `y` and `q`, where `q` wraps a self-call to `x`
//! in angle brackets.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use crosscut::{prelude::*, Result};

fn x_class() -> Arc<Class> {
    Class::builder("X")
        .operation("x", |_this, _args, _block| Ok(Value::from("x")))
        .operation("y", |_this, _args, _block| Ok(Value::from("y")))
        .operation("q", |this, _args, _block| {
            Ok(Value::from(format!("<{}>", this.call("x", vec![])?)))
        })
        .build()
}

fn surround(name: &str, open: &'static str, close: &'static str) -> Arc<Aspect> {
    Aspect::builder(name)
        .register("x", "x", move |target| {
            Ok(Value::from(format!("{open}{}{close}", target.proceed()?)))
        })
        .build()
}

fn woven_x() -> Result<Instance> {
    let registry = Registry::new();
    let class = x_class();
    registry.apply(&class, surround("Xa", "{", "}"))?;
    Ok(registry.instantiate(&class, ()))
}

#[test]
fn test_class_identity() -> Result<()> {
    let registry = Registry::new();
    let class = x_class();
    registry.apply(&class, surround("Xa", "{", "}"))?;
    let x1 = registry.instantiate(&class, ());

    assert!(Arc::ptr_eq(x1.class(), &class));
    assert_eq!(x1.class().name(), "X");
    Ok(())
}

#[test]
fn test_public_operations() -> Result<()> {
    let x1 = woven_x()?;
    let operations = x1.operations();
    assert!(operations.contains(&"x"));
    assert!(operations.contains(&"y"));
    assert!(operations.contains(&"q"));
    assert_eq!(operations.len(), 3);
    Ok(())
}

#[test]
fn test_advised_operation() -> Result<()> {
    assert_eq!(woven_x()?.call("x", vec![])?, Value::from("{x}"));
    Ok(())
}

#[test]
fn test_unmatched_operation() -> Result<()> {
    assert_eq!(woven_x()?.call("y", vec![])?, Value::from("y"));
    Ok(())
}

#[test]
fn test_self_call_is_advised() -> Result<()> {
    assert_eq!(woven_x()?.call("q", vec![])?, Value::from("<{x}>"));
    Ok(())
}

#[test]
fn test_latest_aspect_is_outermost() -> Result<()> {
    let registry = Registry::new();
    let class = x_class();
    registry.apply(&class, surround("A", "{", "}"))?;
    registry.apply(&class, surround("B", "<", ">"))?;

    let x1 = registry.instantiate(&class, ());
    assert_eq!(x1.call("x", vec![])?, Value::from("<{x}>"));

    let names: Vec<String> = registry
        .aspects(&class)?
        .iter()
        .map(|a| a.name().to_string())
        .collect();
    assert_eq!(names, vec!["B", "A"]);
    Ok(())
}

#[test]
fn test_unwoven_class_is_untouched() -> Result<()> {
    let registry = Registry::new();
    let class = x_class();
    let plain = registry.instantiate(&class, ());

    assert!(!registry.is_woven(&class));
    assert_eq!(plain.call("x", vec![])?, Value::from("x"));
    assert_eq!(plain.call("q", vec![])?, Value::from("<x>"));
    Ok(())
}

#[test]
fn test_instances_created_before_apply() -> Result<()> {
    let registry = Registry::new();
    let class = x_class();
    let early = registry.instantiate(&class, ());
    registry.apply(&class, surround("Xa", "{", "}"))?;
    let late = registry.instantiate(&class, ());

    assert_eq!(early.call("x", vec![])?, Value::from("x"));
    assert_eq!(late.call("x", vec![])?, Value::from("{x}"));
    Ok(())
}

#[test]
fn test_chain_resolved_once_per_operation() -> Result<()> {
    let evaluations = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&evaluations);
    let counting = Aspect::builder("counting")
        .register(
            "x",
            PredicatePointcut::new("counts evaluations, matches x", move |jp| {
                counter.fetch_add(1, Ordering::SeqCst);
                jp.is("x")
            }),
            |target| Ok(Value::from(format!("{{{}}}", target.proceed()?))),
        )
        .build();

    let registry = Registry::new();
    let class = x_class();
    registry.apply(&class, counting)?;
    let x1 = registry.instantiate(&class, ());
    let x2 = registry.instantiate(&class, ());

    for _ in 0..10 {
        assert_eq!(x1.call("x", vec![])?, Value::from("{x}"));
        assert_eq!(x2.call("x", vec![])?, Value::from("{x}"));
    }
    assert_eq!(evaluations.load(Ordering::SeqCst), 1);

    for _ in 0..3 {
        x1.call("y", vec![])?;
    }
    assert_eq!(evaluations.load(Ordering::SeqCst), 2);
    Ok(())
}

#[test]
fn test_zero_matching_advice_returns_original() -> Result<()> {
    let registry = Registry::new();
    let class = x_class();
    registry.apply(&class, surround("Xa", "{", "}"))?;
    let x1 = registry.instantiate(&class, ());

    assert_eq!(x1.call("y", vec![])?, Value::from("y"));
    assert_eq!(registry.resolved_chain(&class, "y").map(|c| c.len()), Some(0));
    Ok(())
}

#[test]
fn test_short_circuit_prevents_original() -> Result<()> {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let class = Class::builder("Vault")
        .operation("open", move |_this, _args, _block| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(Value::from("opened"))
        })
        .build();
    let guard = Aspect::builder("guard")
        .register("deny", "open", |_target| Err(raised!("access denied")))
        .build();

    let registry = Registry::new();
    registry.apply(&class, guard)?;
    let vault = registry.instantiate(&class, ());

    assert_eq!(
        vault.call("open", vec![]),
        Err(Error::Raised("access denied".to_string()))
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[test]
fn test_advice_rewrites_arguments() -> Result<()> {
    let class = Class::builder("Math")
        .operation("double", |_this, args, _block| {
            Ok(Value::from(args[0].as_int()? * 2))
        })
        .build();
    let clamp = Aspect::builder("clamp")
        .register("clamp", "double", |target| {
            let n = target.args()[0].as_int()?;
            target.proceed_with(vec![Value::from(n.min(10))])
        })
        .build();

    let registry = Registry::new();
    registry.apply(&class, clamp)?;
    let math = registry.instantiate(&class, ());

    assert_eq!(math.call("double", vec![Value::from(4)])?, Value::from(8));
    assert_eq!(math.call("double", vec![Value::from(50)])?, Value::from(20));
    Ok(())
}

#[test]
fn test_aspect_state_reaches_advice() -> Result<()> {
    let tally = Aspect::builder("tally")
        .register("count", OperationNames::new(["x", "y"]), |target| {
            if let Some(hits) = target.state::<AtomicUsize>() {
                hits.fetch_add(1, Ordering::SeqCst);
            }
            target.proceed()
        })
        .state(AtomicUsize::new(0))
        .build();

    let registry = Registry::new();
    let class = x_class();
    registry.apply(&class, Arc::clone(&tally))?;
    let x1 = registry.instantiate(&class, ());

    x1.call("x", vec![])?;
    x1.call("y", vec![])?;
    x1.call("q", vec![])?;
    // q calls x on itself
    assert_eq!(tally.state::<AtomicUsize>().map(|h| h.load(Ordering::SeqCst)), Some(3));
    Ok(())
}

capabilities! {
    /// Typed view of the `X` class.
    trait XOps {
        fn x();
        fn y();
        fn q();
    }
}

#[test]
fn test_capabilities_route_through_weaver() -> Result<()> {
    let x1 = woven_x()?;
    assert_eq!(x1.x()?, Value::from("{x}"));
    assert_eq!(x1.y()?, Value::from("y"));
    assert_eq!(x1.q()?, Value::from("<{x}>"));
    Ok(())
}

#[test]
fn test_global_registry() -> Result<()> {
    let class = Class::builder("GlobalX")
        .operation("x", |_this, _args, _block| Ok(Value::from("x")))
        .build();
    let before = class.instantiate(());
    class.apply(surround("Xa", "{", "}"))?;

    assert!(Registry::global().is_woven(&class));
    assert_eq!(before.call("x", vec![])?, Value::from("x"));
    assert_eq!(class.instantiate(()).call("x", vec![])?, Value::from("{x}"));
    Ok(())
}

#[test]
fn test_traced_registry() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let registry = Registry::with_config(WeaveConfig::strict().with_trace_calls(true));
    let class = x_class();
    registry.apply(&class, surround("Xa", "{", "}"))?;
    let x1 = registry.instantiate(&class, ());

    assert_eq!(x1.call("q", vec![])?, Value::from("<{x}>"));
    assert_eq!(registry.resolved_operations(&class), vec!["q", "x"]);
    Ok(())
}

capabilities! {
    /// Operations whose names collide with `Instance` methods.
    trait Badge {
        fn id();
    }
}

#[test]
fn test_capability_shadowed_by_inherent_method() -> Result<()> {
    let class = Class::builder("Badge")
        .operation("id", |_this, _args, _block| Ok(Value::from("badge-7")))
        .build();
    let badge = Registry::new().instantiate(&class, ());

    // method syntax resolves to the receiver identity
    let receiver: u64 = badge.id();
    assert!(receiver > 0);
    assert_eq!(Badge::id(&badge)?, Value::from("badge-7"));
    assert_eq!(badge.call("id", vec![])?, Value::from("badge-7"));
    Ok(())
}
