//! Heap object kinds and the raw, non-reentrant lookups over them.
//!
//! Anything here that walks a class chain does so without invoking user
//! code; descriptor invocation lives in the runtime crate because it can
//! call back into the dispatcher.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::{CallResult, Ctx, Value};

/// Entry point of a compiled function. The slice is the bound frame
/// prefix: positional slots, then the `*args` tuple, keyword-only slots,
/// and the `**kwargs` dict, in that order, for the slots the function
/// declares.
pub type EntryFn = Rc<dyn Fn(&mut Ctx, &[Value]) -> CallResult>;

pub struct Obj {
    pub kind: ObjKind,
}

pub enum ObjKind {
    Str(Box<str>),
    Tuple(Vec<Value>),
    Dict(RefCell<IndexMap<Rc<str>, Value>>),
    Cell(RefCell<Value>),
    Function(FuncObj),
    Method(MethodObj),
    Native(NativeObj),
    Class(ClassObj),
    Instance(InstanceObj),
}

impl Obj {
    pub fn type_name(&self) -> Rc<str> {
        match &self.kind {
            ObjKind::Str(_) => Rc::from("str"),
            ObjKind::Tuple(_) => Rc::from("tuple"),
            ObjKind::Dict(_) => Rc::from("dict"),
            ObjKind::Cell(_) => Rc::from("cell"),
            ObjKind::Function(_) => Rc::from("function"),
            ObjKind::Method(_) => Rc::from("method"),
            ObjKind::Native(_) => Rc::from("builtin_function_or_method"),
            ObjKind::Class(_) => Rc::from("type"),
            ObjKind::Instance(inst) => match inst.class.as_obj().map(|o| &o.kind) {
                Some(ObjKind::Class(c)) => c.name.clone(),
                _ => Rc::from("object"),
            },
        }
    }
}

pub struct FuncObj {
    pub name: Rc<str>,
    /// Declared positional-parameter count; `params.len() == arity`.
    pub arity: usize,
    pub params: Vec<Rc<str>>,
    /// Trailing defaults for the positional parameters.
    pub defaults: Vec<Value>,
    pub kwonly: Vec<Rc<str>>,
    pub kw_defaults: IndexMap<Rc<str>, Value>,
    pub varargs: bool,
    pub varkw: bool,
    /// Frame slots the binder wraps in cell objects before entry.
    pub cell_slots: Vec<usize>,
    pub entry: EntryFn,
}

impl FuncObj {
    /// Simple binding: a plain positional frame with no packing, no
    /// keyword-only slots, and no cell capture. Only simple functions are
    /// eligible for the direct-entry fast paths.
    pub fn is_simple(&self) -> bool {
        !self.varargs && !self.varkw && self.kwonly.is_empty() && self.cell_slots.is_empty()
    }

    pub fn required(&self) -> usize {
        self.arity.saturating_sub(self.defaults.len())
    }

    pub fn frame_len(&self) -> usize {
        self.arity + usize::from(self.varargs) + self.kwonly.len() + usize::from(self.varkw)
    }
}

pub struct MethodObj {
    pub func: Value,
    /// `Some` for bound methods; `None` means the receiver must arrive as
    /// the first positional argument and pass an instance check.
    pub receiver: Option<Value>,
    pub declaring_class: Value,
}

#[derive(Clone)]
pub enum NativeImpl {
    /// Rejects any arguments.
    NoArgs(Rc<dyn Fn(&mut Ctx, &Value) -> CallResult>),
    /// Exactly one positional argument.
    OneArg(Rc<dyn Fn(&mut Ctx, &Value, &Value) -> CallResult>),
    /// Classic shape: positionals materialized into a tuple.
    VarArgs(Rc<dyn Fn(&mut Ctx, &Value, &Value) -> CallResult>),
    /// Classic shape plus a keyword dict.
    VarArgsKw(Rc<dyn Fn(&mut Ctx, &Value, &Value, &Value) -> CallResult>),
    /// Raw slice, no container allocation.
    FastCall(Rc<dyn Fn(&mut Ctx, &Value, &[Value]) -> CallResult>),
    /// Raw slice plus parallel keyword names/values.
    FastCallKw(Rc<dyn Fn(&mut Ctx, &Value, &[Value], &[Rc<str>], &[Value]) -> CallResult>),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SlotId {
    /// The synthesized default `__init__` wrapper; construction bypasses
    /// it and resolves the declared initializer instead.
    DefaultInit,
}

#[derive(Clone)]
pub struct NativeObj {
    pub name: Rc<str>,
    /// Bound self/context value, `Value::None` when unbound.
    pub self_val: Value,
    pub imp: NativeImpl,
    pub slot: Option<SlotId>,
}

pub struct ClassObj {
    pub name: Rc<str>,
    /// Single-inheritance base chain.
    pub base: Option<Value>,
    pub dict: RefCell<IndexMap<Rc<str>, Value>>,
    /// Unresolved abstract method names; non-empty blocks instantiation.
    pub abstract_methods: Vec<Rc<str>>,
    /// Compat-mode classes construct without a `__new__` stage.
    pub legacy: bool,
    /// Initializer hook: the user `__init__` when declared directly on
    /// this class, otherwise the shared default wrapper.
    pub init_slot: Value,
}

impl ClassObj {
    pub fn has_custom_init(&self) -> bool {
        !is_default_init(&self.init_slot)
    }
}

pub struct InstanceObj {
    pub class: Value,
    pub dict: RefCell<IndexMap<Rc<str>, Value>>,
}

/// The class of an instance; immediates and builtin callable kinds have no
/// class object in this substrate.
pub fn class_of(v: &Value) -> Option<Value> {
    let obj = v.as_obj()?;
    match &obj.kind {
        ObjKind::Instance(inst) => Some(inst.class.clone()),
        _ => None,
    }
}

/// `isinstance` over the single-inheritance chain.
pub fn instance_of(v: &Value, class: &Value) -> bool {
    let Some(mut cur) = class_of(v) else {
        return false;
    };
    loop {
        if cur.ptr_eq(class) {
            return true;
        }
        let next = {
            match cur.as_obj().map(|o| &o.kind) {
                Some(ObjKind::Class(c)) => c.base.clone(),
                _ => None,
            }
        };
        match next {
            Some(base) => cur = base,
            None => return false,
        }
    }
}

/// Walk the class chain dicts for `name`. Never invokes user code.
pub fn type_lookup(class: &Value, name: &str) -> Option<Value> {
    type_lookup_with_owner(class, name).map(|(_, value)| value)
}

/// Like [`type_lookup`], also reporting which class provided the value.
pub fn type_lookup_with_owner(class: &Value, name: &str) -> Option<(Value, Value)> {
    let mut cur = class.clone();
    loop {
        let next = {
            let obj = cur.as_obj()?;
            let ObjKind::Class(c) = &obj.kind else {
                return None;
            };
            if let Some(found) = c.dict.borrow().get(name) {
                return Some((cur.clone(), found.clone()));
            }
            c.base.clone()
        };
        cur = next?;
    }
}

/// Own-dict lookup on an instance; the descriptor-aware resolution in the
/// runtime crate layers on top of this.
pub fn instance_dict_get(v: &Value, name: &str) -> Option<Value> {
    let obj = v.as_obj()?;
    match &obj.kind {
        ObjKind::Instance(inst) => inst.dict.borrow().get(name).cloned(),
        _ => None,
    }
}

/// Own-dict store on an instance; a no-op for anything else.
pub fn instance_dict_set(v: &Value, name: &str, value: Value) {
    if let Some(obj) = v.as_obj() {
        if let ObjKind::Instance(inst) = &obj.kind {
            inst.dict.borrow_mut().insert(Rc::from(name), value);
        }
    }
}

pub fn is_default_init(v: &Value) -> bool {
    match v.as_obj().map(|o| &o.kind) {
        Some(ObjKind::Native(n)) => n.slot == Some(SlotId::DefaultInit),
        _ => false,
    }
}
