//! Full argument binding: keywords, defaults, `*args`/`**kwargs` packing,
//! keyword-only parameters, and cell capture. Produces the frame layout
//! the function entry expects: positional slots, the packed-varargs
//! tuple, keyword-only slots, then the packed-keywords dict.

use std::rc::Rc;

use indexmap::IndexMap;

use skein_obj_model::{CallResult, Ctx, FuncObj, Raised, Value, builders};

use crate::call::function;

pub(crate) fn bind_and_invoke(
    ctx: &mut Ctx,
    func: &FuncObj,
    args: &[Value],
    kw_names: &[Rc<str>],
    kw_values: &[Value],
) -> CallResult {
    let frame = bind_frame(ctx, func, args, kw_names, kw_values)?;
    function::invoke(ctx, func, frame)
}

pub(crate) fn bind_frame(
    ctx: &mut Ctx,
    func: &FuncObj,
    args: &[Value],
    kw_names: &[Rc<str>],
    kw_values: &[Value],
) -> Result<Vec<Value>, Raised> {
    let nparams = func.arity;
    let varargs_slot = func.varargs.then_some(nparams);
    let kwonly_base = nparams + usize::from(func.varargs);
    let varkw_slot = func.varkw.then_some(kwonly_base + func.kwonly.len());
    let mut slots: Vec<Option<Value>> = vec![None; func.frame_len()];

    let npos = args.len().min(nparams);
    for (slot, arg) in slots.iter_mut().zip(&args[..npos]) {
        *slot = Some(arg.clone());
    }
    if args.len() > nparams {
        match varargs_slot {
            Some(idx) => slots[idx] = Some(builders::tuple(args[nparams..].to_vec())),
            None => return Err(positional_error(ctx, func, args.len())),
        }
    } else if let Some(idx) = varargs_slot {
        slots[idx] = Some(builders::tuple(Vec::new()));
    }

    let mut extra_kw: IndexMap<Rc<str>, Value> = IndexMap::new();
    for (name, value) in kw_names.iter().zip(kw_values) {
        if let Some(idx) = func.params.iter().position(|p| **p == **name) {
            if slots[idx].is_some() {
                return Err(multiple_values(ctx, func, name));
            }
            slots[idx] = Some(value.clone());
        } else if let Some(k) = func.kwonly.iter().position(|p| **p == **name) {
            let idx = kwonly_base + k;
            if slots[idx].is_some() {
                return Err(multiple_values(ctx, func, name));
            }
            slots[idx] = Some(value.clone());
        } else if func.varkw {
            if extra_kw.insert(name.clone(), value.clone()).is_some() {
                return Err(multiple_values(ctx, func, name));
            }
        } else {
            let msg = format!(
                "{}() got an unexpected keyword argument '{}'",
                func.name, name
            );
            return Err(ctx.raise_type_error(msg));
        }
    }

    let required = func.required();
    for i in required..nparams {
        if slots[i].is_none() {
            slots[i] = Some(func.defaults[i - required].clone());
        }
    }
    let missing: Vec<Rc<str>> = (0..nparams)
        .filter(|&i| slots[i].is_none())
        .map(|i| func.params[i].clone())
        .collect();
    if !missing.is_empty() {
        return Err(missing_error(ctx, func, "positional", &missing));
    }

    let mut missing_kw: Vec<Rc<str>> = Vec::new();
    for (k, name) in func.kwonly.iter().enumerate() {
        let idx = kwonly_base + k;
        if slots[idx].is_none() {
            match func.kw_defaults.get(name) {
                Some(default) => slots[idx] = Some(default.clone()),
                None => missing_kw.push(name.clone()),
            }
        }
    }
    if !missing_kw.is_empty() {
        return Err(missing_error(ctx, func, "keyword-only", &missing_kw));
    }

    if let Some(idx) = varkw_slot {
        slots[idx] = Some(builders::dict(extra_kw));
    }

    let mut frame: Vec<Value> = slots
        .into_iter()
        .map(|slot| slot.unwrap_or(Value::None))
        .collect();
    for &slot in &func.cell_slots {
        if let Some(v) = frame.get_mut(slot) {
            let taken = std::mem::replace(v, Value::None);
            *v = builders::cell(taken);
        }
    }
    Ok(frame)
}

fn positional_error(ctx: &mut Ctx, func: &FuncObj, given: usize) -> Raised {
    let verb = if given == 1 { "was" } else { "were" };
    let msg = if func.defaults.is_empty() {
        let noun = if func.arity == 1 {
            "argument"
        } else {
            "arguments"
        };
        format!(
            "{}() takes {} positional {} but {} {} given",
            func.name, func.arity, noun, given, verb
        )
    } else {
        format!(
            "{}() takes from {} to {} positional arguments but {} {} given",
            func.name,
            func.required(),
            func.arity,
            given,
            verb
        )
    };
    ctx.raise_type_error(msg)
}

fn multiple_values(ctx: &mut Ctx, func: &FuncObj, name: &str) -> Raised {
    let msg = format!(
        "{}() got multiple values for argument '{}'",
        func.name, name
    );
    ctx.raise_type_error(msg)
}

fn missing_error(ctx: &mut Ctx, func: &FuncObj, group: &str, names: &[Rc<str>]) -> Raised {
    let plural = if names.len() == 1 { "" } else { "s" };
    let msg = format!(
        "{}() missing {} required {} argument{}: {}",
        func.name,
        names.len(),
        group,
        plural,
        join_names(names)
    );
    ctx.raise_type_error(msg)
}

fn join_names(names: &[Rc<str>]) -> String {
    match names {
        [one] => format!("'{one}'"),
        [a, b] => format!("'{a}' and '{b}'"),
        _ => {
            let mut out = String::new();
            for (i, name) in names.iter().enumerate() {
                if i + 1 == names.len() {
                    out.push_str(&format!("and '{name}'"));
                } else {
                    out.push_str(&format!("'{name}', "));
                }
            }
            out
        }
    }
}
