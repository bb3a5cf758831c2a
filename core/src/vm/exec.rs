//! file: core/src/vm/exec.rs
//! description: dispatch loop.
//!
//! Walks the instruction table from index 0, resolving operands and calling
//! attached handlers, until a HALT is reached or a fatal error aborts the run.
//!
use std::borrow::Cow;

use log::{debug, trace, warn};

use crate::error::{VmError, VmResult};
use crate::vm::config::{RunOptions, RunSummary};
use crate::vm::env::Environment;
use crate::vm::handler::Handler;
use crate::vm::op::{Instruction, Opcode, Operand, OperandKind};
use crate::vm::value::Value;

enum Flow {
    Next,
    Halt,
}

struct ExecState<'a> {
    insts: &'a [Instruction],
    cpool: &'a [Value],
    temps: &'a mut [Value],
    pc: usize,
    steps: usize,
}

/// Constants are borrowed straight from the pool; temporaries are copied so
/// the result slot can be borrowed mutably even when an operand aliases it.
fn load<'a>(cpool: &'a [Value], temps: &[Value], op: &Operand) -> VmResult<Cow<'a, Value>> {
    let (found, len) = match op.kind {
        OperandKind::Const => (cpool.get(op.index).map(Cow::Borrowed), cpool.len()),
        OperandKind::Temp => (temps.get(op.index).cloned().map(Cow::Owned), temps.len()),
    };
    found.ok_or(VmError::InvalidOperandReference { kind: op.kind, index: op.index, len })
}

fn call_handler(state: &mut ExecState, inst: &Instruction, handler: &dyn Handler) -> VmResult<()> {
    let a = load(state.cpool, state.temps, &inst.op1)?;
    let b = load(state.cpool, state.temps, &inst.op2)?;
    let temps_len = state.temps.len();
    let slot = state.temps.get_mut(inst.result).ok_or(VmError::InvalidOperandReference {
        kind: OperandKind::Temp,
        index: inst.result,
        len: temps_len,
    })?;
    handler.call(&a, &b, slot).map_err(|message| VmError::HandlerFailed {
        pc: state.pc,
        opcode: inst.opcode,
        message,
    })
}

fn dispatch_op(state: &mut ExecState) -> VmResult<Flow> {
    let insts = state.insts;
    let inst = insts.get(state.pc).ok_or(VmError::ProgramRanOffEnd { len: insts.len() })?;
    match inst.opcode {
        Opcode::Add | Opcode::Sub | Opcode::Print => {
            if let Some(handler) = inst.handler.as_deref() {
                call_handler(state, inst, handler)?;
            }
            state.pc += 1;
            Ok(Flow::Next)
        }
        Opcode::Jmp => {
            let target = inst.op1.index;
            if target >= insts.len() {
                return Err(VmError::InvalidJumpTarget {
                    pc: state.pc,
                    target,
                    len: insts.len(),
                });
            }
            state.pc = target;
            Ok(Flow::Next)
        }
        Opcode::Halt => Ok(Flow::Halt),
    }
}

impl Environment {
    /// Run with default options: no tracing, no step limit.
    pub fn run(&mut self) -> VmResult<RunSummary> {
        self.run_with(&RunOptions::default())
    }

    pub fn run_with(&mut self, options: &RunOptions) -> VmResult<RunSummary> {
        let mut state = ExecState {
            insts: &self.insts,
            cpool: &self.cpool,
            temps: &mut self.temps,
            pc: 0,
            steps: 0,
        };
        debug!("run: {} instruction(s), options {:?}", state.insts.len(), options);

        let outcome = loop {
            if let Some(limit) = options.step_limit {
                if state.steps >= limit {
                    break Err(VmError::StepLimitExceeded { limit });
                }
            }
            if options.trace {
                match state.insts.get(state.pc) {
                    Some(inst) => trace!("PC {:04}: {}", state.pc, inst),
                    None => trace!("PC {:04}: <end of program>", state.pc),
                }
            }
            state.steps += 1;
            match dispatch_op(&mut state) {
                Ok(Flow::Next) => {}
                Ok(Flow::Halt) => {
                    break Ok(RunSummary {
                        steps: state.steps,
                        halted_at: state.pc,
                    })
                }
                Err(e) => break Err(e),
            }
        };

        match &outcome {
            Ok(summary) => debug!("halted at pc {} after {} step(s)", summary.halted_at, summary.steps),
            Err(e) => warn!("run aborted after {} step(s): {}", state.steps, e),
        }
        outcome
    }
}
