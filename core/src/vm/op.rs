use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::handler::Handler;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    Add,
    Sub,
    Print,
    Jmp,
    Halt,
}

impl Opcode {
    /// Control-flow opcodes are handled by the loop itself and never call a handler.
    pub fn invokes_handler(self) -> bool {
        !matches!(self, Opcode::Jmp | Opcode::Halt)
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Print => "PRINT",
            Opcode::Jmp => "JMP",
            Opcode::Halt => "HALT",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperandKind {
    Const,
    Temp,
}

impl fmt::Display for OperandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperandKind::Const => write!(f, "constant"),
            OperandKind::Temp => write!(f, "temporary"),
        }
    }
}

/// Reference to a constant-pool slot or a temporary slot.
///
/// `JMP` reads `index` as a raw instruction index instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operand {
    pub kind: OperandKind,
    pub index: usize,
}

impl Operand {
    pub const fn constant(index: usize) -> Self {
        Operand { kind: OperandKind::Const, index }
    }

    pub const fn temp(index: usize) -> Self {
        Operand { kind: OperandKind::Temp, index }
    }
}

/// Unused operands point at constant 0 and are never resolved.
impl Default for Operand {
    fn default() -> Self {
        Operand::constant(0)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            OperandKind::Const => write!(f, "c{}", self.index),
            OperandKind::Temp => write!(f, "t{}", self.index),
        }
    }
}

#[derive(Clone)]
pub struct Instruction {
    pub opcode: Opcode,
    pub op1: Operand,
    pub op2: Operand,
    /// Temporary slot handed to the handler as its writable result.
    pub result: usize,
    pub handler: Option<Arc<dyn Handler>>,
}

impl Instruction {
    pub fn new(opcode: Opcode, op1: Operand, op2: Operand, result: usize) -> Self {
        Instruction { opcode, op1, op2, result, handler: None }
    }

    pub fn add(a: Operand, b: Operand, result: usize) -> Self {
        Self::new(Opcode::Add, a, b, result)
    }

    pub fn sub(a: Operand, b: Operand, result: usize) -> Self {
        Self::new(Opcode::Sub, a, b, result)
    }

    /// The second operand repeats `src` so it always resolves.
    pub fn print(src: Operand) -> Self {
        Self::new(Opcode::Print, src, src, 0)
    }

    pub fn jmp(target: usize) -> Self {
        Self::new(Opcode::Jmp, Operand::constant(target), Operand::default(), 0)
    }

    pub fn halt() -> Self {
        Self::new(Opcode::Halt, Operand::default(), Operand::default(), 0)
    }

    /// Attach a handler up front instead of hooking it later.
    pub fn with_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn handler_name(&self) -> Option<&str> {
        self.handler.as_deref().map(|h| h.name())
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instruction")
            .field("opcode", &self.opcode)
            .field("op1", &self.op1)
            .field("op2", &self.op2)
            .field("result", &self.result)
            .field("handler", &self.handler_name())
            .finish()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.opcode {
            Opcode::Add | Opcode::Sub => {
                write!(f, "{} {}, {} -> t{}", self.opcode, self.op1, self.op2, self.result)?
            }
            Opcode::Print => write!(f, "{} {}", self.opcode, self.op1)?,
            Opcode::Jmp => write!(f, "{} @{}", self.opcode, self.op1.index)?,
            Opcode::Halt => write!(f, "{}", self.opcode)?,
        }
        if let Some(name) = self.handler_name() {
            write!(f, " [{}]", name)?;
        }
        Ok(())
    }
}
