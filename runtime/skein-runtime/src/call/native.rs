//! Entry into native callables. Each shape gets its arguments checked and
//! marshalled here so the natives themselves stay free of arity plumbing.

use std::rc::Rc;

use skein_obj_model::{CallResult, Ctx, ExcKind, NativeImpl, NativeObj, Raised, Value, builders};

pub(crate) fn call_native(
    ctx: &mut Ctx,
    native: &NativeObj,
    args: &[Value],
    kw_names: &[Rc<str>],
    kw_values: &[Value],
) -> CallResult {
    let res = match &native.imp {
        NativeImpl::NoArgs(f) => {
            if !kw_names.is_empty() {
                return Err(no_keywords(ctx, native));
            }
            if !args.is_empty() {
                let msg = format!("{}() takes no arguments ({} given)", native.name, args.len());
                return Err(ctx.raise_type_error(msg));
            }
            f(ctx, &native.self_val)
        }
        NativeImpl::OneArg(f) => {
            if args.len() != 1 || !kw_names.is_empty() {
                let given = args.len() + kw_names.len();
                let msg = format!(
                    "{}() takes exactly one argument ({} given)",
                    native.name, given
                );
                return Err(ctx.raise_type_error(msg));
            }
            f(ctx, &native.self_val, &args[0])
        }
        NativeImpl::VarArgs(f) => {
            if !kw_names.is_empty() {
                return Err(no_keywords(ctx, native));
            }
            let packed = builders::tuple(args.to_vec());
            f(ctx, &native.self_val, &packed)
        }
        NativeImpl::VarArgsKw(f) => {
            let packed = builders::tuple(args.to_vec());
            let kw = builders::kw_dict(kw_names, kw_values);
            f(ctx, &native.self_val, &packed, &kw)
        }
        NativeImpl::FastCall(f) => {
            if !kw_names.is_empty() {
                return Err(no_keywords(ctx, native));
            }
            f(ctx, &native.self_val, args)
        }
        NativeImpl::FastCallKw(f) => f(ctx, &native.self_val, args, kw_names, kw_values),
    };
    check_native_result(ctx, native, res)
}

fn no_keywords(ctx: &mut Ctx, native: &NativeObj) -> Raised {
    ctx.raise_type_error(format!("{}() takes no keyword arguments", native.name))
}

/// A native that returns Ok while leaving an exception pending has a bug;
/// surface it rather than dropping either signal.
fn check_native_result(ctx: &mut Ctx, native: &NativeObj, res: CallResult) -> CallResult {
    match res {
        Ok(v) => {
            if ctx.exception_pending() {
                let msg = format!(
                    "{}() returned a result with an exception set",
                    native.name
                );
                return Err(ctx.raise(ExcKind::SystemError, msg));
            }
            Ok(v)
        }
        Err(raised) => Err(raised),
    }
}
