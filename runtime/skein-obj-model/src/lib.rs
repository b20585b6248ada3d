//! Core object representation for Skein.
//! Values are immediates plus `Rc`-backed heap handles; ownership tracking
//! rides on handle clone/drop instead of manual refcount pairs.

pub mod builders;
mod ctx;
mod object;

pub use ctx::{CallResult, Ctx, DEFAULT_RECURSION_LIMIT, ExcData, ExcKind, Raised};
pub use object::{
    ClassObj, EntryFn, FuncObj, InstanceObj, MethodObj, NativeImpl, NativeObj, Obj, ObjKind,
    SlotId, class_of, instance_dict_get, instance_dict_set, instance_of, is_default_init,
    type_lookup, type_lookup_with_owner,
};

use std::fmt;
use std::rc::Rc;

#[derive(Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Obj(Rc<Obj>),
}

impl Value {
    pub fn none() -> Self {
        Self::None
    }

    pub fn from_int(i: i64) -> Self {
        Self::Int(i)
    }

    pub fn from_bool(b: bool) -> Self {
        Self::Bool(b)
    }

    pub fn from_float(f: f64) -> Self {
        Self::Float(f)
    }

    pub fn obj(kind: ObjKind) -> Self {
        Self::Obj(Rc::new(Obj { kind }))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Self::Int(_))
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_obj(&self) -> Option<&Rc<Obj>> {
        match self {
            Self::Obj(obj) => Some(obj),
            _ => None,
        }
    }

    /// Identity comparison for heap values, value comparison for immediates.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Obj(a), Self::Obj(b)) => Rc::ptr_eq(a, b),
            _ => self == other,
        }
    }

    pub fn type_name(&self) -> Rc<str> {
        match self {
            Self::None => Rc::from("NoneType"),
            Self::Bool(_) => Rc::from("bool"),
            Self::Int(_) => Rc::from("int"),
            Self::Float(_) => Rc::from("float"),
            Self::Obj(obj) => obj.type_name(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Obj(a), Self::Obj(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Obj(obj) => match &obj.kind {
                ObjKind::Str(s) => write!(f, "{s:?}"),
                _ => write!(f, "<{} object>", obj.type_name()),
            },
        }
    }
}
