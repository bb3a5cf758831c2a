//! file: core/src/vm/env.rs
//! description: execution environment and its append-only builder API.
//!
//! The environment owns three fixed-capacity areas: instructions, the
//! constant pool and the temporaries. Builder calls append to them and fail
//! with `CapacityExceeded` instead of growing past their limit.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::error::{StorageArea, VmError, VmResult};
use crate::vm::handler::Handler;
use crate::vm::op::{Instruction, Opcode, Operand, OperandKind};
use crate::vm::value::Value;

/// Constant pool max size
pub const CPOOL_CAPACITY: usize = 100;

/// Instruction max size
pub const INSTS_CAPACITY: usize = 200;

/// Temporary storage max size
pub const TEMPS_CAPACITY: usize = 150;

pub struct Environment {
    pub(crate) insts: Vec<Instruction>,
    pub(crate) cpool: Vec<Value>,
    pub(crate) temps: Vec<Value>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            insts: Vec::with_capacity(INSTS_CAPACITY),
            cpool: Vec::with_capacity(CPOOL_CAPACITY),
            temps: Vec::with_capacity(TEMPS_CAPACITY),
        }
    }

    /// Append a literal to the constant pool and return its index.
    pub fn add_constant(&mut self, value: impl Into<Value>) -> VmResult<usize> {
        if self.cpool.len() >= CPOOL_CAPACITY {
            return Err(VmError::CapacityExceeded {
                area: StorageArea::ConstantPool,
                capacity: CPOOL_CAPACITY,
            });
        }
        let value = value.into();
        let index = self.cpool.len();
        debug!("cpool[{}] = {:?}", index, value);
        self.cpool.push(value);
        Ok(index)
    }

    /// Append an instruction and return its index.
    ///
    /// Opcodes that call a handler get their result slot reserved in the
    /// temporaries. Nothing is appended when either area is full.
    pub fn add_instruction(&mut self, inst: Instruction) -> VmResult<usize> {
        if self.insts.len() >= INSTS_CAPACITY {
            return Err(VmError::CapacityExceeded {
                area: StorageArea::Instructions,
                capacity: INSTS_CAPACITY,
            });
        }
        if inst.opcode.invokes_handler() {
            self.reserve_temps(inst.result + 1)?;
        }
        let index = self.insts.len();
        debug!("insts[{}] = {}", index, inst);
        self.insts.push(inst);
        Ok(index)
    }

    /// Reserve the next free temporary and return its index.
    pub fn alloc_temp(&mut self) -> VmResult<usize> {
        let index = self.temps.len();
        self.reserve_temps(index + 1)?;
        Ok(index)
    }

    fn reserve_temps(&mut self, len: usize) -> VmResult<()> {
        if len > TEMPS_CAPACITY {
            return Err(VmError::CapacityExceeded {
                area: StorageArea::Temporaries,
                capacity: TEMPS_CAPACITY,
            });
        }
        if len > self.temps.len() {
            debug!("temps reserved up to t{}", len - 1);
            self.temps.resize_with(len, Value::default);
        }
        Ok(())
    }

    /// Bind `handler` to every instruction already present with `opcode`.
    ///
    /// Instructions added afterwards keep whatever handler they were built
    /// with. Returns how many instructions were rebound.
    // FIXME: rescans the whole table on every call; an opcode -> handler
    // index would need to keep the "present instructions only" rule.
    pub fn hook(&mut self, opcode: Opcode, handler: Arc<dyn Handler>) -> usize {
        let mut bound = 0;
        for inst in self.insts.iter_mut().filter(|i| i.opcode == opcode) {
            inst.handler = Some(Arc::clone(&handler));
            bound += 1;
        }
        if bound == 0 {
            warn!("hook {} -> {}: no matching instructions", opcode, handler.name());
        } else {
            info!("hooked {} onto {} {} instruction(s)", handler.name(), bound, opcode);
        }
        bound
    }

    /// Detach handlers from every present instruction with `opcode`.
    pub fn unhook(&mut self, opcode: Opcode) -> usize {
        let mut cleared = 0;
        for inst in self.insts.iter_mut().filter(|i| i.opcode == opcode) {
            if inst.handler.take().is_some() {
                cleared += 1;
            }
        }
        info!("unhooked {} {} instruction(s)", cleared, opcode);
        cleared
    }

    /// Hook `IntAdd`, `IntSub` and a stdout `Print` onto the present program.
    pub fn install_builtins(&mut self) -> usize {
        crate::vm::host::builtins()
            .into_iter()
            .map(|(opcode, handler)| self.hook(opcode, handler))
            .sum()
    }

    /// Look up the value an operand refers to.
    pub fn resolve(&self, operand: &Operand) -> VmResult<&Value> {
        let area = match operand.kind {
            OperandKind::Const => &self.cpool,
            OperandKind::Temp => &self.temps,
        };
        area.get(operand.index).ok_or(VmError::InvalidOperandReference {
            kind: operand.kind,
            index: operand.index,
            len: area.len(),
        })
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.insts
    }

    pub fn constants(&self) -> &[Value] {
        &self.cpool
    }

    pub fn temps(&self) -> &[Value] {
        &self.temps
    }

    pub fn temp(&self, index: usize) -> Option<&Value> {
        self.temps.get(index)
    }

    pub fn instruction_count(&self) -> usize {
        self.insts.len()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
