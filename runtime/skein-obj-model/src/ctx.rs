//! The ambient execution context: recursion guard, pending exception, and
//! the active frame-name stack. One context per logical thread of
//! execution; nothing here is shared across threads.

use std::rc::Rc;

use crate::Value;

pub const DEFAULT_RECURSION_LIMIT: usize = 1000;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ExcKind {
    TypeError,
    AttributeError,
    RecursionError,
    SystemError,
}

impl ExcKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::TypeError => "TypeError",
            Self::AttributeError => "AttributeError",
            Self::RecursionError => "RecursionError",
            Self::SystemError => "SystemError",
        }
    }
}

#[derive(Debug)]
pub struct ExcData {
    pub kind: ExcKind,
    pub message: String,
}

/// Proof that an exception is pending on the context. Only `Ctx::raise`
/// constructs one, so an `Err` call result implies a set error state.
#[derive(Debug)]
pub struct Raised(());

/// Success carries a live value owned by the caller; failure is the
/// absent-result-plus-pending-exception convention.
pub type CallResult = Result<Value, Raised>;

pub struct Ctx {
    depth: usize,
    limit: usize,
    pending: Option<ExcData>,
    frames: Vec<Rc<str>>,
}

impl Ctx {
    pub fn new() -> Self {
        Self::with_recursion_limit(DEFAULT_RECURSION_LIMIT)
    }

    pub fn with_recursion_limit(limit: usize) -> Self {
        Self {
            depth: 0,
            limit,
            pending: None,
            frames: Vec::new(),
        }
    }

    pub fn raise(&mut self, kind: ExcKind, message: impl Into<String>) -> Raised {
        self.pending = Some(ExcData {
            kind,
            message: message.into(),
        });
        Raised(())
    }

    pub fn raise_type_error(&mut self, message: impl Into<String>) -> Raised {
        self.raise(ExcKind::TypeError, message)
    }

    pub fn raise_attribute_error(&mut self, message: impl Into<String>) -> Raised {
        self.raise(ExcKind::AttributeError, message)
    }

    pub fn exception_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_exception(&self) -> Option<&ExcData> {
        self.pending.as_ref()
    }

    pub fn take_exception(&mut self) -> Option<ExcData> {
        self.pending.take()
    }

    pub fn clear_exception(&mut self) {
        self.pending = None;
    }

    /// Returns false when at the limit, without incrementing.
    pub fn recursion_enter(&mut self) -> bool {
        if self.depth + 1 > self.limit {
            false
        } else {
            self.depth += 1;
            true
        }
    }

    pub fn recursion_exit(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    pub fn recursion_depth(&self) -> usize {
        self.depth
    }

    pub fn recursion_limit(&self) -> usize {
        self.limit
    }

    pub fn set_recursion_limit(&mut self, limit: usize) {
        self.limit = limit;
    }

    pub fn frame_push(&mut self, name: Rc<str>) {
        self.frames.push(name);
    }

    pub fn frame_pop(&mut self) {
        self.frames.pop();
    }

    /// Names of the active compiled-function frames, outermost first.
    pub fn frame_names(&self) -> &[Rc<str>] {
        &self.frames
    }
}

impl Default for Ctx {
    fn default() -> Self {
        Self::new()
    }
}
