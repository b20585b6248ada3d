//! Attribute resolution and the attribute-call fused path.
//!
//! Resolution order for instances: data descriptor on the class chain,
//! then the instance dict, then a non-data descriptor or plain class
//! attribute. `call_method` fuses the common lookup-then-call shape so a
//! plain method call never materializes the bound method object.

use std::rc::Rc;

use skein_obj_model::{
    CallResult, Ctx, ObjKind, Raised, Value, builders, class_of, instance_dict_get, type_lookup,
    type_lookup_with_owner,
};

use crate::call::dispatch::call_value_kw;
use crate::call::{bind, function};
use crate::state::metrics::{FUSED_CALL_COUNT, profile_hit};

pub fn attr_resolve(ctx: &mut Ctx, obj: &Value, name: &str) -> CallResult {
    if let Some(o) = obj.as_obj() {
        // Class attributes come straight off the chain, unbound.
        if matches!(o.kind, ObjKind::Class(_)) {
            if let Some(found) = type_lookup(obj, name) {
                return Ok(found);
            }
            return Err(raise_no_attribute(ctx, obj, name));
        }
    }
    let from_type = class_of(obj).and_then(|c| type_lookup_with_owner(&c, name));
    if let Some((owner, attr)) = &from_type {
        if is_data_descriptor(attr) {
            return descriptor_get(ctx, attr, obj, owner);
        }
    }
    if let Some(found) = instance_dict_get(obj, name) {
        return Ok(found);
    }
    if let Some((owner, attr)) = from_type {
        return descriptor_get(ctx, &attr, obj, &owner);
    }
    Err(raise_no_attribute(ctx, obj, name))
}

pub fn call_method(ctx: &mut Ctx, obj: &Value, name: &str, args: &[Value]) -> CallResult {
    call_method_kw(ctx, obj, name, args, &[], &[])
}

pub fn call_method_kw(
    ctx: &mut Ctx,
    obj: &Value,
    name: &str,
    args: &[Value],
    kw_names: &[Rc<str>],
    kw_values: &[Value],
) -> CallResult {
    if let Some(class) = class_of(obj) {
        if instance_dict_get(obj, name).is_none() {
            if let Some((owner, attr)) = type_lookup_with_owner(&class, name) {
                if let Some(ObjKind::Function(f)) = attr.as_obj().map(|o| &o.kind) {
                    profile_hit(&FUSED_CALL_COUNT);
                    let mut full = Vec::with_capacity(args.len() + 1);
                    full.push(obj.clone());
                    full.extend_from_slice(args);
                    return if kw_names.is_empty() {
                        function::call_function(ctx, f, &full)
                    } else {
                        bind::bind_and_invoke(ctx, f, &full, kw_names, kw_values)
                    };
                }
                let bound = descriptor_get(ctx, &attr, obj, &owner)?;
                return call_value_kw(ctx, &bound, args, kw_names, kw_values);
            }
        }
    }
    let callee = attr_resolve(ctx, obj, name)?;
    call_value_kw(ctx, &callee, args, kw_names, kw_values)
}

pub(crate) fn is_data_descriptor(v: &Value) -> bool {
    let Some(class) = class_of(v) else {
        return false;
    };
    type_lookup(&class, "__set__").is_some() || type_lookup(&class, "__delete__").is_some()
}

/// Binding step of attribute resolution. Functions bind into methods,
/// natives rebind their self slot, instance descriptors run `__get__`.
pub(crate) fn descriptor_get(
    ctx: &mut Ctx,
    attr: &Value,
    instance: &Value,
    owner: &Value,
) -> CallResult {
    match attr.as_obj().map(|o| &o.kind) {
        Some(ObjKind::Function(_)) => Ok(builders::bound_method(
            attr.clone(),
            instance.clone(),
            owner.clone(),
        )),
        Some(ObjKind::Native(n)) => {
            let mut rebound = n.clone();
            rebound.self_val = instance.clone();
            Ok(Value::obj(ObjKind::Native(rebound)))
        }
        Some(ObjKind::Instance(_)) => match class_of(attr).and_then(|c| type_lookup(&c, "__get__")) {
            Some(getter) => call_value_kw(
                ctx,
                &getter,
                &[attr.clone(), instance.clone(), owner.clone()],
                &[],
                &[],
            ),
            None => Ok(attr.clone()),
        },
        _ => Ok(attr.clone()),
    }
}

fn raise_no_attribute(ctx: &mut Ctx, obj: &Value, name: &str) -> Raised {
    ctx.raise_attribute_error(format!(
        "'{}' object has no attribute '{}'",
        obj.type_name(),
        name
    ))
}
