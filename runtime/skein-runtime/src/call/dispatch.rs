//! The dispatcher: one entry point that routes a callee to its calling
//! convention. Bound methods unwrap to their function with the receiver
//! prepended, classes go to construction, instances fall back to the
//! `__call__` slot on their class.

use std::rc::Rc;

use skein_obj_model::{CallResult, Ctx, ExcKind, ObjKind, Value, instance_of, type_lookup};

use crate::attr;
use crate::call::{bind, class_init, function, lookup_call_slot, native};

/// The closed set of shapes the dispatcher understands. Anything that
/// does not classify is not callable.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CallableKind {
    Function,
    BoundMethod,
    UnboundMethod,
    Native,
    Class,
    LegacyClass,
    CallableInstance,
}

pub fn classify_callable(v: &Value) -> Option<CallableKind> {
    let obj = v.as_obj()?;
    match &obj.kind {
        ObjKind::Function(_) => Some(CallableKind::Function),
        ObjKind::Method(m) if m.receiver.is_some() => Some(CallableKind::BoundMethod),
        ObjKind::Method(_) => Some(CallableKind::UnboundMethod),
        ObjKind::Native(_) => Some(CallableKind::Native),
        ObjKind::Class(c) if c.legacy => Some(CallableKind::LegacyClass),
        ObjKind::Class(_) => Some(CallableKind::Class),
        ObjKind::Instance(inst) => {
            type_lookup(&inst.class, "__call__").map(|_| CallableKind::CallableInstance)
        }
        _ => None,
    }
}

pub fn call_value_kw(
    ctx: &mut Ctx,
    callee: &Value,
    args: &[Value],
    kw_names: &[Rc<str>],
    kw_values: &[Value],
) -> CallResult {
    let Some(obj) = callee.as_obj() else {
        return class_init::raise_not_callable(ctx, callee);
    };
    match &obj.kind {
        ObjKind::Function(f) => {
            if kw_names.is_empty() {
                function::call_function(ctx, f, args)
            } else {
                bind::bind_and_invoke(ctx, f, args, kw_names, kw_values)
            }
        }
        ObjKind::Method(m) => match &m.receiver {
            Some(recv) => {
                let mut full = Vec::with_capacity(args.len() + 1);
                full.push(recv.clone());
                full.extend_from_slice(args);
                call_value_kw(ctx, &m.func, &full, kw_names, kw_values)
            }
            None => {
                check_unbound_receiver(ctx, m, args)?;
                call_value_kw(ctx, &m.func, args, kw_names, kw_values)
            }
        },
        ObjKind::Native(n) => native::call_native(ctx, n, args, kw_names, kw_values),
        ObjKind::Class(c) => class_init::construct(ctx, callee, c, args, kw_names, kw_values),
        ObjKind::Instance(inst) => match lookup_call_slot(&inst.class) {
            Some((owner, slot)) => {
                call_via_slot(ctx, &slot, callee, &owner, args, kw_names, kw_values)
            }
            None => class_init::raise_not_callable(ctx, callee),
        },
        _ => class_init::raise_not_callable(ctx, callee),
    }
}

pub fn call_value(ctx: &mut Ctx, callee: &Value, args: &[Value]) -> CallResult {
    call_value_kw(ctx, callee, args, &[], &[])
}

pub fn call_value0(ctx: &mut Ctx, callee: &Value) -> CallResult {
    call_value(ctx, callee, &[])
}

pub fn call_value1(ctx: &mut Ctx, callee: &Value, arg0: Value) -> CallResult {
    call_value(ctx, callee, &[arg0])
}

pub fn call_value2(ctx: &mut Ctx, callee: &Value, arg0: Value, arg1: Value) -> CallResult {
    call_value(ctx, callee, &[arg0, arg1])
}

fn check_unbound_receiver(
    ctx: &mut Ctx,
    m: &skein_obj_model::MethodObj,
    args: &[Value],
) -> Result<(), skein_obj_model::Raised> {
    let func_name = callable_name(&m.func);
    let class_name = class_name(&m.declaring_class);
    let Some(first) = args.first() else {
        let msg = format!(
            "unbound method {func_name}() must be called with {class_name} instance as first argument (got nothing instead)"
        );
        return Err(ctx.raise_type_error(msg));
    };
    if !instance_of(first, &m.declaring_class) {
        let msg = format!(
            "unbound method {func_name}() must be called with {class_name} instance as first argument (got {} instance instead)",
            first.type_name()
        );
        return Err(ctx.raise_type_error(msg));
    }
    Ok(())
}

/// Re-dispatch through the `__call__` slot, under an explicit guard so a
/// slot chain that never reaches a function still terminates.
#[allow(clippy::too_many_arguments)]
fn call_via_slot(
    ctx: &mut Ctx,
    slot: &Value,
    instance: &Value,
    owner: &Value,
    args: &[Value],
    kw_names: &[Rc<str>],
    kw_values: &[Value],
) -> CallResult {
    if !ctx.recursion_enter() {
        return Err(ctx.raise(ExcKind::RecursionError, "maximum recursion depth exceeded"));
    }
    let res = match attr::descriptor_get(ctx, slot, instance, owner) {
        Ok(bound) => call_value_kw(ctx, &bound, args, kw_names, kw_values),
        Err(raised) => Err(raised),
    };
    ctx.recursion_exit();
    res
}

/// Declared positional arity as seen by a caller, unwinding receiver
/// binding. None for callables with no fixed arity.
pub fn callable_arity(v: &Value) -> Option<usize> {
    let obj = v.as_obj()?;
    match &obj.kind {
        ObjKind::Function(f) => f.is_simple().then_some(f.arity),
        ObjKind::Method(m) => {
            let base = callable_arity(&m.func)?;
            if m.receiver.is_some() {
                Some(base.saturating_sub(1))
            } else {
                Some(base)
            }
        }
        ObjKind::Instance(inst) => {
            let slot = type_lookup(&inst.class, "__call__")?;
            Some(callable_arity(&slot)?.saturating_sub(1))
        }
        _ => None,
    }
}

pub(crate) fn callable_name(v: &Value) -> Rc<str> {
    match v.as_obj().map(|o| &o.kind) {
        Some(ObjKind::Function(f)) => f.name.clone(),
        Some(ObjKind::Native(n)) => n.name.clone(),
        Some(ObjKind::Method(m)) => callable_name(&m.func),
        Some(ObjKind::Class(c)) => c.name.clone(),
        _ => v.type_name(),
    }
}

fn class_name(v: &Value) -> Rc<str> {
    match v.as_obj().map(|o| &o.kind) {
        Some(ObjKind::Class(c)) => c.name.clone(),
        _ => v.type_name(),
    }
}
