pub mod error;
pub mod vm;

pub use error::{Level, StorageArea, VmError, VmResult};
pub use vm::{
    handler_fn, Environment, Handler, Instruction, IntAdd, IntSub, Opcode, Operand, OperandKind,
    Print, RunOptions, RunSummary, Value,
};

pub fn generate_error_report(error: &VmError) -> String {
    let location = match error.pc() {
        Some(pc) => format!("pc {}", pc),
        None => "unknown location".to_string(),
    };

    format!("HOOKVM | {} | {} | {}", error.level(), location, error)
}
