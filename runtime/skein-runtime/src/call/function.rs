//! Direct entry into compiled functions. The fast path here handles the
//! overwhelmingly common shape (plain positional frame, exact or
//! default-filled arity); everything else goes through the binder.

use skein_obj_model::{CallResult, Ctx, ExcKind, FuncObj, Value};

use crate::call::bind;
use crate::state::metrics::{CALL_DISPATCH_COUNT, profile_hit};

pub(crate) fn call_function(ctx: &mut Ctx, func: &FuncObj, args: &[Value]) -> CallResult {
    if func.is_simple() {
        if args.len() == func.arity {
            return invoke(ctx, func, args.to_vec());
        }
        let required = func.required();
        if args.len() >= required && args.len() < func.arity {
            let mut frame = Vec::with_capacity(func.arity);
            frame.extend_from_slice(args);
            // The first `args.len() - required` defaults were displaced
            // by positional arguments.
            let skip = args.len() - required;
            frame.extend_from_slice(&func.defaults[skip..]);
            return invoke(ctx, func, frame);
        }
    }
    bind::bind_and_invoke(ctx, func, args, &[], &[])
}

/// Runs a bound frame through the function entry, with the recursion
/// guard and frame stack bracketing the call.
pub(crate) fn invoke(ctx: &mut Ctx, func: &FuncObj, frame: Vec<Value>) -> CallResult {
    profile_hit(&CALL_DISPATCH_COUNT);
    if !ctx.recursion_enter() {
        return Err(ctx.raise(ExcKind::RecursionError, "maximum recursion depth exceeded"));
    }
    ctx.frame_push(func.name.clone());
    let res = (func.entry)(ctx, &frame);
    ctx.frame_pop();
    ctx.recursion_exit();
    res
}

#[cfg(test)]
mod tests {
    use skein_obj_model::builders::FuncBuilder;
    use skein_obj_model::{Ctx, ExcKind, ObjKind, Value};

    use crate::call::dispatch::call_value;

    fn add2() -> Value {
        FuncBuilder::new("add2", |_ctx, frame| {
            let a = frame[0].as_int().unwrap_or(0);
            let b = frame[1].as_int().unwrap_or(0);
            Ok(Value::from_int(a + b))
        })
        .params(&["a", "b"])
        .build()
    }

    fn func_obj(v: &Value) -> &skein_obj_model::FuncObj {
        match &v.as_obj().unwrap().kind {
            ObjKind::Function(f) => f,
            _ => panic!("expected function"),
        }
    }

    #[test]
    fn test_exact_arity_call() {
        let mut ctx = Ctx::new();
        let f = add2();
        let res = super::call_function(
            &mut ctx,
            func_obj(&f),
            &[Value::from_int(2), Value::from_int(40)],
        );
        assert_eq!(res.unwrap().as_int(), Some(42));
    }

    #[test]
    fn test_defaults_splice() {
        let mut ctx = Ctx::new();
        let f = FuncBuilder::new("scale", |_ctx, frame| {
            let x = frame[0].as_int().unwrap_or(0);
            let k = frame[1].as_int().unwrap_or(0);
            Ok(Value::from_int(x * k))
        })
        .params(&["x", "k"])
        .defaults(vec![Value::from_int(10)])
        .build();
        let res = super::call_function(&mut ctx, func_obj(&f), &[Value::from_int(7)]);
        assert_eq!(res.unwrap().as_int(), Some(70));
        let res = super::call_function(
            &mut ctx,
            func_obj(&f),
            &[Value::from_int(7), Value::from_int(3)],
        );
        assert_eq!(res.unwrap().as_int(), Some(21));
    }

    #[test]
    fn test_too_many_positional_message() {
        let mut ctx = Ctx::new();
        let f = add2();
        let res = super::call_function(
            &mut ctx,
            func_obj(&f),
            &[Value::from_int(1), Value::from_int(2), Value::from_int(3)],
        );
        assert!(res.is_err());
        let exc = ctx.take_exception().unwrap();
        assert_eq!(exc.kind, ExcKind::TypeError);
        assert_eq!(
            exc.message,
            "add2() takes 2 positional arguments but 3 were given"
        );
    }

    #[test]
    fn test_recursion_limit() {
        let mut ctx = Ctx::with_recursion_limit(16);
        let f = FuncBuilder::new("spin", |ctx, frame| call_value(ctx, &frame[0], frame))
            .params(&["f"])
            .build();
        let res = call_value(&mut ctx, &f, &[f.clone()]);
        assert!(res.is_err());
        let exc = ctx.take_exception().unwrap();
        assert_eq!(exc.kind, ExcKind::RecursionError);
        assert_eq!(exc.message, "maximum recursion depth exceeded");
        assert_eq!(ctx.recursion_depth(), 0);
    }

    #[test]
    fn test_frame_stack_visible_during_call() {
        let mut ctx = Ctx::new();
        let f = FuncBuilder::new("probe", |ctx, _frame| {
            assert_eq!(ctx.frame_names().last().map(|n| &**n), Some("probe"));
            Ok(Value::None)
        })
        .build();
        super::call_function(&mut ctx, func_obj(&f), &[]).unwrap();
        assert!(ctx.frame_names().is_empty());
    }
}
