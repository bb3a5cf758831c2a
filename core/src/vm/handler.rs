//! file: core/src/vm/handler.rs
//! description: handler trait attached to instructions at run time.
//!
//! A handler implements the semantic effect of one opcode. It is shared
//! between every instruction it was hooked onto, so the environment holds
//! it behind an `Arc` and keeps it alive as long as any instruction does.

use std::fmt;
use std::sync::Arc;

use crate::vm::value::Value;

pub trait Handler: Send + Sync {
    /// Name shown in disassembly and logs (e.g. "IntAdd").
    fn name(&self) -> &str;

    /// Called by the dispatch loop with both resolved operands and the
    /// instruction's result temporary. Operands an opcode does not use are
    /// still resolved and passed in.
    fn call(&self, op1: &Value, op2: &Value, result: &mut Value) -> Result<(), String>;
}

/// Adapter turning a closure into a named handler.
pub struct FnHandler<F> {
    name: String,
    f: F,
}

impl<F> Handler for FnHandler<F>
where
    F: Fn(&Value, &Value, &mut Value) -> Result<(), String> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, op1: &Value, op2: &Value, result: &mut Value) -> Result<(), String> {
        (self.f)(op1, op2, result)
    }
}

impl<F> fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler").field("name", &self.name).finish()
    }
}

pub fn handler_fn<F>(name: impl Into<String>, f: F) -> Arc<dyn Handler>
where
    F: Fn(&Value, &Value, &mut Value) -> Result<(), String> + Send + Sync + 'static,
{
    Arc::new(FnHandler { name: name.into(), f })
}
