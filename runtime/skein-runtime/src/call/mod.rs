pub(crate) mod bind;
pub(crate) mod class_init;
pub(crate) mod dispatch;
pub(crate) mod function;
pub(crate) mod native;

use skein_obj_model::{Value, type_lookup_with_owner};

/// `__call__` resolved through the class chain; returns the providing
/// class alongside the raw slot value.
pub(crate) fn lookup_call_slot(class: &Value) -> Option<(Value, Value)> {
    type_lookup_with_owner(class, "__call__")
}
