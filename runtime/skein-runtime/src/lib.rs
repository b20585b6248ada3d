//! Call dispatch for the Skein object VM.
//!
//! One entry point ([`call_value_kw`]) routes any callee to its calling
//! convention: compiled functions, bound and unbound methods, natives,
//! class construction, and the `__call__` fallback for instances.
//! Attribute resolution and the fused attribute-call path sit on top.

mod attr;
mod call;
mod state;

pub use attr::{attr_resolve, call_method, call_method_kw};
pub use call::dispatch::{
    CallableKind, call_value, call_value0, call_value1, call_value2, call_value_kw,
    callable_arity, classify_callable,
};
pub use state::metrics::{
    call_dispatch_count, construct_count, fused_call_count, profile_enabled,
};
