use crate::vm::env::{Environment, CPOOL_CAPACITY, INSTS_CAPACITY, TEMPS_CAPACITY};
use crate::vm::op::Opcode;
use crate::vm::value::Value;

impl Environment {
    /// Render the constant pool and instruction table as a text listing.
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Constants: {}/{}\n", self.cpool.len(), CPOOL_CAPACITY));
        for (i, v) in self.cpool.iter().enumerate() {
            match v {
                Value::Int(n) => out.push_str(&format!("  c{:<3} int {}\n", i, n)),
                Value::Str(s) => out.push_str(&format!("  c{:<3} str {:?}\n", i, s)),
            }
        }
        out.push_str(&format!("Temporaries: {}/{}\n", self.temps.len(), TEMPS_CAPACITY));
        out.push_str(&format!("Instructions: {}/{}\n", self.insts.len(), INSTS_CAPACITY));
        for (i, inst) in self.insts.iter().enumerate() {
            out.push_str(&format!("{:04}  {}", i, inst));
            // flag jumps that would fail at run time
            if inst.opcode == Opcode::Jmp && inst.op1.index >= self.insts.len() {
                out.push_str("  ; target out of range");
            }
            out.push('\n');
        }
        out
    }
}
