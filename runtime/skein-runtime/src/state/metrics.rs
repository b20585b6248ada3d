//! Opt-in dispatch counters. Gated on SKEIN_PROFILE so the hot paths pay
//! one branch when profiling is off.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use once_cell::sync::Lazy;

pub(crate) static CALL_DISPATCH_COUNT: AtomicU64 = AtomicU64::new(0);
pub(crate) static FUSED_CALL_COUNT: AtomicU64 = AtomicU64::new(0);
pub(crate) static CONSTRUCT_COUNT: AtomicU64 = AtomicU64::new(0);

static PROFILE_ENABLED: Lazy<bool> = Lazy::new(|| {
    std::env::var("SKEIN_PROFILE")
        .map(|val| !val.is_empty() && val != "0")
        .unwrap_or(false)
});

pub fn profile_enabled() -> bool {
    *PROFILE_ENABLED
}

pub(crate) fn profile_hit(counter: &AtomicU64) {
    if profile_enabled() {
        counter.fetch_add(1, AtomicOrdering::Relaxed);
    }
}

pub fn call_dispatch_count() -> u64 {
    CALL_DISPATCH_COUNT.load(AtomicOrdering::Relaxed)
}

pub fn fused_call_count() -> u64 {
    FUSED_CALL_COUNT.load(AtomicOrdering::Relaxed)
}

pub fn construct_count() -> u64 {
    CONSTRUCT_COUNT.load(AtomicOrdering::Relaxed)
}
