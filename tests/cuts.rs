//! Integration tests for cuts: aspects that override operations by name.

use std::sync::Arc;

use crosscut::{prelude::*, Result};

fn enclose(target: &Continuation<'_>, open: &str, close: &str) -> Result<Value> {
    Ok(Value::from(format!("{open}{}{close}", target.proceed()?)))
}

fn f_class() -> Arc<Class> {
    Class::builder("F")
        .operation("f", |_this, _args, _block| Ok(Value::from("f")))
        .build()
}

#[test]
fn test_operation_is_wrapped_by_advice() -> Result<()> {
    let class = Class::builder("X")
        .operation("x", |_this, _args, _block| Ok(Value::from("x")))
        .build();
    let xc = Cut::builder("Xc")
        .around("x", |target| enclose(target, "{", "}"))
        .build();

    let registry = Registry::new();
    registry.apply_cut(&class, xc)?;
    assert_eq!(registry.instantiate(&class, ()).call("x", vec![])?, Value::from("{x}"));
    Ok(())
}

#[test]
fn test_single_cut() -> Result<()> {
    let class = f_class();
    let g = Cut::builder("G")
        .around("f", |target| enclose(target, "<", ">"))
        .build();

    let registry = Registry::new();
    registry.apply_cut(&class, Arc::clone(&g))?;
    let f = registry.instantiate(&class, ());

    assert_eq!(f.call("f", vec![])?, Value::from("<f>"));
    assert!(Arc::ptr_eq(f.class(), &class));
    assert_eq!(g.name(), "G");
    assert_eq!(g.overrides(), ["f".to_string()]);
    Ok(())
}

#[test]
fn test_multiple_cuts() -> Result<()> {
    let class = f_class();
    let g = Cut::builder("G")
        .around("f", |target| enclose(target, "<", ">"))
        .build();
    let q = Cut::builder("Q")
        .around("f", |target| enclose(target, "[", "]"))
        .build();

    let registry = Registry::new();
    registry.apply_cut(&class, g)?;
    registry.apply_cut(&class, q)?;

    let names: Vec<String> = registry
        .cuts(&class)?
        .iter()
        .map(|c| c.name().to_string())
        .collect();
    assert_eq!(names, vec!["Q", "G"]);
    assert_eq!(registry.instantiate(&class, ()).call("f", vec![])?, Value::from("[<f>]"));
    Ok(())
}

#[test]
fn test_dynamic_joins() -> Result<()> {
    let class = Class::builder("C")
        .operation("r1", |_this, _args, _block| Ok(Value::from("r1")))
        .operation("r2", |_this, _args, _block| Ok(Value::from("r2")))
        .operation("r3", |_this, _args, _block| Ok(Value::from("r3")))
        .operation("j1", |_this, _args, _block| Ok(Value::from("j1")))
        .operation("j2", |_this, _args, _block| Ok(Value::from("j2")))
        .build();
    let a = Cut::builder("A")
        .join("wrappy", PatternPointcut::new("^r")?)
        .join("square", "j1")
        .join("flare", "j2")
        .advice("wrappy", |target| enclose(target, "{", "}"))
        .advice("square", |target| enclose(target, "[", "]"))
        .advice("flare", |target| enclose(target, "*", "*"))
        .build();

    let registry = Registry::new();
    registry.apply_cut(&class, a)?;
    let c = registry.instantiate(&class, ());

    assert_eq!(c.call("r1", vec![])?, Value::from("{r1}"));
    assert_eq!(c.call("r2", vec![])?, Value::from("{r2}"));
    assert_eq!(c.call("r3", vec![])?, Value::from("{r3}"));
    assert_eq!(c.call("j1", vec![])?, Value::from("[j1]"));
    assert_eq!(c.call("j2", vec![])?, Value::from("*j2*"));
    Ok(())
}

#[test]
fn test_multi_name_joins_stack() -> Result<()> {
    let class = Class::builder("C")
        .operation("r1", |_this, _args, _block| Ok(Value::from("r1")))
        .operation("r2", |_this, _args, _block| Ok(Value::from("r2")))
        .build();
    let c1 = Cut::builder("C1")
        .join("wrap1", OperationNames::new(["r1", "r2"]))
        .advice("wrap1", |target| enclose(target, "{", "}"))
        .build();
    let c2 = Cut::builder("C2")
        .join("wrap2", OperationNames::new(["r1", "r2"]))
        .advice("wrap2", |target| enclose(target, "[", "]"))
        .build();

    let registry = Registry::new();
    registry.apply_cut(&class, c1)?;
    registry.apply_cut(&class, c2)?;
    let c = registry.instantiate(&class, ());

    assert_eq!(c.call("r1", vec![])?, Value::from("[{r1}]"));
    assert_eq!(c.call("r2", vec![])?, Value::from("[{r2}]"));
    Ok(())
}

#[test]
fn test_cuts_and_aspects_share_ordering() -> Result<()> {
    let class = f_class();
    let inner = Aspect::builder("inner")
        .register("paren", "f", |target| enclose(target, "(", ")"))
        .build();
    let outer = Cut::builder("outer")
        .around("f", |target| enclose(target, "<", ">"))
        .build();

    let registry = Registry::new();
    registry.apply(&class, inner)?;
    registry.apply_cut(&class, outer)?;

    assert_eq!(registry.instantiate(&class, ()).call("f", vec![])?, Value::from("<(f)>"));
    assert_eq!(registry.aspects(&class)?.len(), 1);
    assert_eq!(registry.cuts(&class)?.len(), 1);
    Ok(())
}

#[test]
fn test_cut_for_unknown_operation_is_rejected() {
    let class = f_class();
    let stray = Cut::builder("stray")
        .around("g", |target| target.proceed())
        .build();

    let registry = Registry::new();
    assert_eq!(
        registry.apply_cut(&class, stray),
        Err(Error::UnknownOperation {
            class: "F".to_string(),
            operation: "g".to_string(),
        })
    );
    assert!(!registry.is_woven(&class));
}
