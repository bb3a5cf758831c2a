//! file: core/src/vm/host.rs
//! description: built-in handlers for the standard opcodes.
//!
//! `IntAdd` and `IntSub` implement integer arithmetic into the result slot,
//! `Print` writes its first operand to a sink (stdout unless told otherwise).
//! Hosts are free to hook their own handlers instead.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use crate::vm::handler::Handler;
use crate::vm::op::Opcode;
use crate::vm::value::Value;

fn int_operands(name: &str, a: &Value, b: &Value) -> Result<(i64, i64), String> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok((*x, *y)),
        _ => Err(format!(
            "{}: expected two int operands, got {} and {}",
            name,
            a.type_name(),
            b.type_name()
        )),
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct IntAdd;

impl Handler for IntAdd {
    fn name(&self) -> &str {
        "IntAdd"
    }

    fn call(&self, op1: &Value, op2: &Value, result: &mut Value) -> Result<(), String> {
        let (x, y) = int_operands(self.name(), op1, op2)?;
        let sum = x.checked_add(y).ok_or_else(|| format!("integer overflow in {} + {}", x, y))?;
        *result = Value::Int(sum);
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct IntSub;

impl Handler for IntSub {
    fn name(&self) -> &str {
        "IntSub"
    }

    fn call(&self, op1: &Value, op2: &Value, result: &mut Value) -> Result<(), String> {
        let (x, y) = int_operands(self.name(), op1, op2)?;
        let diff = x.checked_sub(y).ok_or_else(|| format!("integer overflow in {} - {}", x, y))?;
        *result = Value::Int(diff);
        Ok(())
    }
}

/// Writes the first operand followed by a newline. Never touches the result slot.
pub struct Print<W> {
    sink: Mutex<W>,
}

impl Print<io::Stdout> {
    pub fn stdout() -> Self {
        Print::new(io::stdout())
    }
}

impl Print<Vec<u8>> {
    /// Print into memory; read it back with [`Print::contents`].
    pub fn buffered() -> Self {
        Print::new(Vec::new())
    }

    pub fn contents(&self) -> String {
        match self.sink.lock() {
            Ok(buf) => String::from_utf8_lossy(&buf).into_owned(),
            Err(poisoned) => String::from_utf8_lossy(&poisoned.into_inner()).into_owned(),
        }
    }
}

impl<W: Write + Send> Print<W> {
    pub fn new(sink: W) -> Self {
        Print { sink: Mutex::new(sink) }
    }
}

impl<W: Write + Send> Handler for Print<W> {
    fn name(&self) -> &str {
        "Print"
    }

    fn call(&self, op1: &Value, _op2: &Value, _result: &mut Value) -> Result<(), String> {
        let mut sink = self.sink.lock().map_err(|_| "print sink poisoned".to_string())?;
        writeln!(sink, "{}", op1).map_err(|e| format!("io error: {}", e))?;
        sink.flush().map_err(|e| format!("io error: {}", e))
    }
}

/// The three conventional handlers, ready to hook.
pub fn builtins() -> [(Opcode, Arc<dyn Handler>); 3] {
    let add: Arc<dyn Handler> = Arc::new(IntAdd);
    let sub: Arc<dyn Handler> = Arc::new(IntSub);
    let print: Arc<dyn Handler> = Arc::new(Print::stdout());
    [(Opcode::Add, add), (Opcode::Sub, sub), (Opcode::Print, print)]
}
