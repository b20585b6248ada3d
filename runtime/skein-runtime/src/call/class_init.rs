//! Construction: calling a class allocates through `__new__`, then runs
//! the initializer. Compat-mode classes skip the `__new__` stage and go
//! straight from allocation to `__init__`.

use std::rc::Rc;

use skein_obj_model::{
    CallResult, ClassObj, Ctx, ObjKind, Raised, Value, builders, class_of, instance_of,
    is_default_init, type_lookup,
};

use crate::call::dispatch::call_value_kw;
use crate::state::metrics::{CONSTRUCT_COUNT, profile_hit};

pub(crate) fn construct(
    ctx: &mut Ctx,
    class_val: &Value,
    class: &ClassObj,
    args: &[Value],
    kw_names: &[Rc<str>],
    kw_values: &[Value],
) -> CallResult {
    profile_hit(&CONSTRUCT_COUNT);
    check_abstract(ctx, class)?;
    let mut had_new = false;
    let inst = if class.legacy {
        builders::instance(class_val)
    } else if let Some(new_fn) = type_lookup(class_val, "__new__") {
        had_new = true;
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push(class_val.clone());
        full.extend_from_slice(args);
        let made = call_value_kw(ctx, &new_fn, &full, kw_names, kw_values)?;
        if !instance_of(&made, class_val) {
            // A foreign value from __new__ is returned as-is, uninitialized.
            return Ok(made);
        }
        made
    } else {
        builders::instance(class_val)
    };
    // __new__ may hand back a subtype; the initializer belongs to the
    // constructed object's class, re-resolved after the subtype check.
    let init_class = if had_new { class_of(&inst) } else { None };
    run_init(
        ctx,
        init_class.as_ref().unwrap_or(class_val),
        class,
        &inst,
        had_new,
        args,
        kw_names,
        kw_values,
    )?;
    Ok(inst)
}

fn check_abstract(ctx: &mut Ctx, class: &ClassObj) -> Result<(), Raised> {
    if class.abstract_methods.is_empty() {
        return Ok(());
    }
    let mut names: Vec<&str> = class.abstract_methods.iter().map(|n| &**n).collect();
    names.sort_unstable();
    let noun = if names.len() == 1 { "method" } else { "methods" };
    let msg = format!(
        "Can't instantiate abstract class {} with abstract {} {}",
        class.name,
        noun,
        names.join(", ")
    );
    Err(ctx.raise_type_error(msg))
}

#[allow(clippy::too_many_arguments)]
fn run_init(
    ctx: &mut Ctx,
    init_class: &Value,
    class: &ClassObj,
    inst: &Value,
    had_new: bool,
    args: &[Value],
    kw_names: &[Rc<str>],
    kw_values: &[Value],
) -> Result<(), Raised> {
    // init_slot caches an __init__ declared directly on the class; the
    // default wrapper means the chain has to be consulted for an
    // inherited one.
    let cached = match init_class.as_obj().map(|o| &o.kind) {
        Some(ObjKind::Class(c)) if c.has_custom_init() => Some(c.init_slot.clone()),
        _ => None,
    };
    let init =
        cached.or_else(|| type_lookup(init_class, "__init__").filter(|v| !is_default_init(v)));
    let Some(init) = init else {
        if !had_new && (!args.is_empty() || !kw_names.is_empty()) {
            let msg = format!("{}() takes no arguments", class.name);
            return Err(ctx.raise_type_error(msg));
        }
        return Ok(());
    };
    invoke_init(ctx, &init, inst, args, kw_names, kw_values)
}

pub(crate) fn invoke_init(
    ctx: &mut Ctx,
    init: &Value,
    inst: &Value,
    args: &[Value],
    kw_names: &[Rc<str>],
    kw_values: &[Value],
) -> Result<(), Raised> {
    let mut full = Vec::with_capacity(args.len() + 1);
    full.push(inst.clone());
    full.extend_from_slice(args);
    let res = call_value_kw(ctx, init, &full, kw_names, kw_values)?;
    if !res.is_none() {
        let msg = format!("__init__() should return None, not '{}'", res.type_name());
        return Err(ctx.raise_type_error(msg));
    }
    Ok(())
}

pub(crate) fn raise_not_callable(ctx: &mut Ctx, v: &Value) -> CallResult {
    let msg = format!("'{}' object is not callable", v.type_name());
    Err(ctx.raise_type_error(msg))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use skein_obj_model::builders::{ClassBuilder, FuncBuilder, instance};
    use skein_obj_model::{Ctx, ExcKind, ObjKind, Value, instance_dict_get, instance_of};

    use crate::call::dispatch::{call_value, call_value_kw};

    fn take_message(ctx: &mut Ctx, kind: ExcKind) -> String {
        let exc = ctx.take_exception().unwrap();
        assert_eq!(exc.kind, kind);
        exc.message
    }

    fn point_class() -> Value {
        let init = FuncBuilder::new("__init__", |_ctx, frame| {
            skein_obj_model::instance_dict_set(&frame[0], "x", frame[1].clone());
            skein_obj_model::instance_dict_set(&frame[0], "y", frame[2].clone());
            Ok(Value::None)
        })
        .params(&["self", "x", "y"])
        .build();
        ClassBuilder::new("Point").set("__init__", init).build()
    }

    #[test]
    fn test_construct_runs_init() {
        let mut ctx = Ctx::new();
        let cls = point_class();
        let inst = call_value(&mut ctx, &cls, &[Value::from_int(3), Value::from_int(4)]).unwrap();
        assert!(instance_of(&inst, &cls));
        assert_eq!(instance_dict_get(&inst, "x").and_then(|v| v.as_int()), Some(3));
        assert_eq!(instance_dict_get(&inst, "y").and_then(|v| v.as_int()), Some(4));
    }

    #[test]
    fn test_construct_with_keywords() {
        let mut ctx = Ctx::new();
        let cls = point_class();
        let inst = call_value_kw(
            &mut ctx,
            &cls,
            &[Value::from_int(1)],
            &["y".into()],
            &[Value::from_int(2)],
        )
        .unwrap();
        assert_eq!(instance_dict_get(&inst, "y").and_then(|v| v.as_int()), Some(2));
    }

    #[test]
    fn test_abstract_class_messages() {
        let mut ctx = Ctx::new();
        let one = ClassBuilder::new("Shape").abstract_method("area").build();
        assert!(call_value(&mut ctx, &one, &[]).is_err());
        assert_eq!(
            take_message(&mut ctx, ExcKind::TypeError),
            "Can't instantiate abstract class Shape with abstract method area"
        );
        let two = ClassBuilder::new("Shape")
            .abstract_method("perimeter")
            .abstract_method("area")
            .build();
        assert!(call_value(&mut ctx, &two, &[]).is_err());
        assert_eq!(
            take_message(&mut ctx, ExcKind::TypeError),
            "Can't instantiate abstract class Shape with abstract methods area, perimeter"
        );
    }

    #[test]
    fn test_init_must_return_none() {
        let mut ctx = Ctx::new();
        let init = FuncBuilder::new("__init__", |_ctx, _frame| Ok(Value::from_int(7)))
            .params(&["self"])
            .build();
        let cls = ClassBuilder::new("Odd").set("__init__", init).build();
        assert!(call_value(&mut ctx, &cls, &[]).is_err());
        assert_eq!(
            take_message(&mut ctx, ExcKind::TypeError),
            "__init__() should return None, not 'int'"
        );
    }

    #[test]
    fn test_failed_init_releases_instance() {
        let mut ctx = Ctx::new();
        let stash: Rc<RefCell<Option<Value>>> = Rc::new(RefCell::new(None));
        let hook = Rc::clone(&stash);
        let init = FuncBuilder::new("__init__", move |_ctx, frame| {
            *hook.borrow_mut() = Some(frame[0].clone());
            Ok(Value::from_int(7))
        })
        .params(&["self"])
        .build();
        let cls = ClassBuilder::new("Odd").set("__init__", init).build();
        assert!(call_value(&mut ctx, &cls, &[]).is_err());
        ctx.clear_exception();
        // The rejected instance is released on every exit path; the stash
        // is the only remaining owner.
        let held = stash.borrow_mut().take().unwrap();
        assert_eq!(Rc::strong_count(held.as_obj().unwrap()), 1);
    }

    #[test]
    fn test_no_init_rejects_arguments() {
        let mut ctx = Ctx::new();
        let cls = ClassBuilder::new("Bare").build();
        assert!(call_value(&mut ctx, &cls, &[]).is_ok());
        assert!(call_value(&mut ctx, &cls, &[Value::from_int(1)]).is_err());
        assert_eq!(
            take_message(&mut ctx, ExcKind::TypeError),
            "Bare() takes no arguments"
        );
    }

    #[test]
    fn test_inherited_init_runs() {
        let mut ctx = Ctx::new();
        let init = FuncBuilder::new("__init__", |_ctx, frame| {
            skein_obj_model::instance_dict_set(&frame[0], "tag", frame[1].clone());
            Ok(Value::None)
        })
        .params(&["self", "tag"])
        .build();
        let base = ClassBuilder::new("Base").set("__init__", init).build();
        let derived = ClassBuilder::new("Derived").base(&base).build();
        let inst = call_value(&mut ctx, &derived, &[Value::from_int(5)]).unwrap();
        assert!(instance_of(&inst, &derived));
        assert_eq!(
            instance_dict_get(&inst, "tag").and_then(|v| v.as_int()),
            Some(5)
        );
    }

    #[test]
    fn test_custom_new_foreign_result_skips_init() {
        let mut ctx = Ctx::new();
        let new_fn = FuncBuilder::new("__new__", |_ctx, _frame| Ok(Value::from_int(42)))
            .params(&["cls"])
            .varargs()
            .build();
        let init = FuncBuilder::new("__init__", |_ctx, _frame| {
            panic!("init must not run for a foreign __new__ result");
        })
        .params(&["self"])
        .varargs()
        .build();
        let cls = ClassBuilder::new("Odd")
            .set("__new__", new_fn)
            .set("__init__", init)
            .build();
        let res = call_value(&mut ctx, &cls, &[]).unwrap();
        assert_eq!(res.as_int(), Some(42));
    }

    #[test]
    fn test_legacy_class_skips_new() {
        let mut ctx = Ctx::new();
        let new_fn = FuncBuilder::new("__new__", |_ctx, _frame| {
            panic!("__new__ must not run for a compat-mode class");
        })
        .params(&["cls"])
        .varargs()
        .build();
        let cls = ClassBuilder::new("Old")
            .legacy()
            .set("__new__", new_fn)
            .build();
        let inst = call_value(&mut ctx, &cls, &[]).unwrap();
        assert!(instance_of(&inst, &cls));
    }

    #[test]
    fn test_new_returning_subtype_runs_subtype_init() {
        let mut ctx = Ctx::new();
        let base = ClassBuilder::new("Base").build();
        let init = FuncBuilder::new("__init__", |_ctx, frame| {
            skein_obj_model::instance_dict_set(&frame[0], "stamped", Value::from_bool(true));
            Ok(Value::None)
        })
        .params(&["self"])
        .build();
        let derived = ClassBuilder::new("Derived")
            .base(&base)
            .set("__init__", init)
            .build();
        let target = derived.clone();
        let new_fn = FuncBuilder::new("__new__", move |_ctx, _frame| Ok(instance(&target)))
            .params(&["cls"])
            .varargs()
            .build();
        if let Some(ObjKind::Class(c)) = base.as_obj().map(|o| &o.kind) {
            c.dict.borrow_mut().insert("__new__".into(), new_fn);
        }
        let made = call_value(&mut ctx, &base, &[]).unwrap();
        assert!(instance_of(&made, &derived));
        assert_eq!(
            instance_dict_get(&made, "stamped").and_then(|v| v.as_bool()),
            Some(true)
        );
    }

    #[test]
    fn test_custom_new_returning_instance_runs_init() {
        let mut ctx = Ctx::new();
        let new_fn = FuncBuilder::new("__new__", |_ctx, frame| Ok(instance(&frame[0])))
            .params(&["cls"])
            .varargs()
            .build();
        let init = FuncBuilder::new("__init__", |_ctx, frame| {
            skein_obj_model::instance_dict_set(&frame[0], "ready", Value::from_bool(true));
            Ok(Value::None)
        })
        .params(&["self"])
        .varargs()
        .build();
        let cls = ClassBuilder::new("Made")
            .set("__new__", new_fn)
            .set("__init__", init)
            .build();
        let inst = call_value(&mut ctx, &cls, &[]).unwrap();
        assert_eq!(
            instance_dict_get(&inst, "ready").and_then(|v| v.as_bool()),
            Some(true)
        );
    }
}
