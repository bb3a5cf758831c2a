pub mod config;
mod disasm;
pub mod env;
mod exec;
pub mod handler;
pub mod host;
pub mod op;
pub mod value;

pub use config::{RunOptions, RunSummary};
pub use env::{Environment, CPOOL_CAPACITY, INSTS_CAPACITY, TEMPS_CAPACITY};
pub use handler::{handler_fn, Handler};
pub use host::{IntAdd, IntSub, Print};
pub use op::{Instruction, Opcode, Operand, OperandKind};
pub use value::Value;
