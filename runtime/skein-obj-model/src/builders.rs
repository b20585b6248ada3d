//! Builders for callables, classes, and containers. Embedders and tests
//! assemble objects through these instead of spelling out the structs.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::object::{
    ClassObj, FuncObj, InstanceObj, MethodObj, NativeImpl, NativeObj, ObjKind, SlotId,
};
use crate::{CallResult, Ctx, Value};

pub struct FuncBuilder {
    name: Rc<str>,
    params: Vec<Rc<str>>,
    defaults: Vec<Value>,
    kwonly: Vec<Rc<str>>,
    kw_defaults: IndexMap<Rc<str>, Value>,
    varargs: bool,
    varkw: bool,
    cell_slots: Vec<usize>,
    entry: Rc<dyn Fn(&mut Ctx, &[Value]) -> CallResult>,
}

impl FuncBuilder {
    pub fn new(name: &str, entry: impl Fn(&mut Ctx, &[Value]) -> CallResult + 'static) -> Self {
        Self {
            name: Rc::from(name),
            params: Vec::new(),
            defaults: Vec::new(),
            kwonly: Vec::new(),
            kw_defaults: IndexMap::new(),
            varargs: false,
            varkw: false,
            cell_slots: Vec::new(),
            entry: Rc::new(entry),
        }
    }

    pub fn params(mut self, names: &[&str]) -> Self {
        self.params = names.iter().map(|n| Rc::from(*n)).collect();
        self
    }

    /// Trailing defaults for the positional parameters.
    pub fn defaults(mut self, defaults: Vec<Value>) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn kwonly(mut self, name: &str, default: Option<Value>) -> Self {
        let name: Rc<str> = Rc::from(name);
        if let Some(value) = default {
            self.kw_defaults.insert(name.clone(), value);
        }
        self.kwonly.push(name);
        self
    }

    pub fn varargs(mut self) -> Self {
        self.varargs = true;
        self
    }

    pub fn varkw(mut self) -> Self {
        self.varkw = true;
        self
    }

    /// Marks a frame slot for cell capture by the binder.
    pub fn cell_slot(mut self, slot: usize) -> Self {
        self.cell_slots.push(slot);
        self
    }

    pub fn build(self) -> Value {
        debug_assert!(self.defaults.len() <= self.params.len());
        Value::obj(ObjKind::Function(FuncObj {
            name: self.name,
            arity: self.params.len(),
            params: self.params,
            defaults: self.defaults,
            kwonly: self.kwonly,
            kw_defaults: self.kw_defaults,
            varargs: self.varargs,
            varkw: self.varkw,
            cell_slots: self.cell_slots,
            entry: self.entry,
        }))
    }
}

pub struct NativeBuilder {
    name: Rc<str>,
    self_val: Value,
}

impl NativeBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: Rc::from(name),
            self_val: Value::None,
        }
    }

    pub fn bind(mut self, self_val: Value) -> Self {
        self.self_val = self_val;
        self
    }

    pub fn no_args(self, f: impl Fn(&mut Ctx, &Value) -> CallResult + 'static) -> Value {
        self.finish(NativeImpl::NoArgs(Rc::new(f)))
    }

    pub fn one_arg(self, f: impl Fn(&mut Ctx, &Value, &Value) -> CallResult + 'static) -> Value {
        self.finish(NativeImpl::OneArg(Rc::new(f)))
    }

    pub fn var_args(self, f: impl Fn(&mut Ctx, &Value, &Value) -> CallResult + 'static) -> Value {
        self.finish(NativeImpl::VarArgs(Rc::new(f)))
    }

    pub fn var_args_kw(
        self,
        f: impl Fn(&mut Ctx, &Value, &Value, &Value) -> CallResult + 'static,
    ) -> Value {
        self.finish(NativeImpl::VarArgsKw(Rc::new(f)))
    }

    pub fn fast_call(self, f: impl Fn(&mut Ctx, &Value, &[Value]) -> CallResult + 'static) -> Value {
        self.finish(NativeImpl::FastCall(Rc::new(f)))
    }

    pub fn fast_call_kw(
        self,
        f: impl Fn(&mut Ctx, &Value, &[Value], &[Rc<str>], &[Value]) -> CallResult + 'static,
    ) -> Value {
        self.finish(NativeImpl::FastCallKw(Rc::new(f)))
    }

    fn finish(self, imp: NativeImpl) -> Value {
        Value::obj(ObjKind::Native(NativeObj {
            name: self.name,
            self_val: self.self_val,
            imp,
            slot: None,
        }))
    }
}

pub struct ClassBuilder {
    name: Rc<str>,
    base: Option<Value>,
    legacy: bool,
    abstract_methods: Vec<Rc<str>>,
    entries: IndexMap<Rc<str>, Value>,
    init_slot: Option<Value>,
}

impl ClassBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: Rc::from(name),
            base: None,
            legacy: false,
            abstract_methods: Vec::new(),
            entries: IndexMap::new(),
            init_slot: None,
        }
    }

    pub fn base(mut self, class: &Value) -> Self {
        self.base = Some(class.clone());
        self
    }

    /// Compat-mode class: construction allocates and runs `__init__`
    /// without a `__new__` stage.
    pub fn legacy(mut self) -> Self {
        self.legacy = true;
        self
    }

    pub fn abstract_method(mut self, name: &str) -> Self {
        self.abstract_methods.push(Rc::from(name));
        self
    }

    pub fn set(mut self, name: &str, value: Value) -> Self {
        if name == "__init__" {
            self.init_slot = Some(value.clone());
        }
        self.entries.insert(Rc::from(name), value);
        self
    }

    pub fn build(self) -> Value {
        let init_slot = self.init_slot.unwrap_or_else(default_init);
        Value::obj(ObjKind::Class(ClassObj {
            name: self.name,
            base: self.base,
            dict: RefCell::new(self.entries),
            abstract_methods: self.abstract_methods,
            legacy: self.legacy,
            init_slot,
        }))
    }
}

/// The synthesized default initializer wrapper. Never actually invoked:
/// construction recognizes the slot id and resolves the declared
/// `__init__` instead.
pub fn default_init() -> Value {
    Value::obj(ObjKind::Native(NativeObj {
        name: Rc::from("__init__"),
        self_val: Value::None,
        imp: NativeImpl::FastCall(Rc::new(|_ctx, _self_val, _args| Ok(Value::None))),
        slot: Some(SlotId::DefaultInit),
    }))
}

pub fn bound_method(func: Value, receiver: Value, declaring_class: Value) -> Value {
    Value::obj(ObjKind::Method(MethodObj {
        func,
        receiver: Some(receiver),
        declaring_class,
    }))
}

pub fn unbound_method(func: Value, declaring_class: Value) -> Value {
    Value::obj(ObjKind::Method(MethodObj {
        func,
        receiver: None,
        declaring_class,
    }))
}

/// Bare allocation: a fresh instance with an empty dict. The trivial
/// allocator used when a class declares no `__new__`.
pub fn instance(class: &Value) -> Value {
    Value::obj(ObjKind::Instance(InstanceObj {
        class: class.clone(),
        dict: RefCell::new(IndexMap::new()),
    }))
}

pub fn tuple(items: Vec<Value>) -> Value {
    Value::obj(ObjKind::Tuple(items))
}

pub fn dict(entries: IndexMap<Rc<str>, Value>) -> Value {
    Value::obj(ObjKind::Dict(RefCell::new(entries)))
}

/// Keyword mapping from the parallel names/values pair.
pub fn kw_dict(names: &[Rc<str>], values: &[Value]) -> Value {
    let mut entries = IndexMap::with_capacity(names.len());
    for (name, value) in names.iter().zip(values) {
        entries.insert(name.clone(), value.clone());
    }
    dict(entries)
}

pub fn cell(value: Value) -> Value {
    Value::obj(ObjKind::Cell(RefCell::new(value)))
}

pub fn str_value(s: &str) -> Value {
    Value::obj(ObjKind::Str(s.into()))
}
