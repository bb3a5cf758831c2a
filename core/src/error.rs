//! file: core/src/error.rs
//! description: error taxonomy for the builder and the dispatch loop.
//!
//! Builder calls fail with `CapacityExceeded`; everything else is raised
//! while a program runs and aborts that run only.

use std::fmt;
use thiserror::Error;

use crate::vm::op::{Opcode, OperandKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Info,
    Warning,
    Error,
    Critical,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level_str = match self {
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        };
        write!(f, "{}", level_str)
    }
}

/// One of the three fixed-capacity storage areas owned by an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageArea {
    ConstantPool,
    Instructions,
    Temporaries,
}

impl fmt::Display for StorageArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StorageArea::ConstantPool => "constant pool",
            StorageArea::Instructions => "instruction table",
            StorageArea::Temporaries => "temporaries",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VmError {
    #[error("{area} is full (capacity {capacity})")]
    CapacityExceeded { area: StorageArea, capacity: usize },

    #[error("{kind} operand index {index} is out of range (occupied: {len})")]
    InvalidOperandReference {
        kind: OperandKind,
        index: usize,
        len: usize,
    },

    #[error("jump at pc {pc} targets {target}, outside program of {len} instructions")]
    InvalidJumpTarget { pc: usize, target: usize, len: usize },

    #[error("execution ran past the last instruction ({len} instructions) without HALT")]
    ProgramRanOffEnd { len: usize },

    #[error("{opcode} handler failed at pc {pc}: {message}")]
    HandlerFailed {
        pc: usize,
        opcode: Opcode,
        message: String,
    },

    #[error("step limit of {limit} exceeded")]
    StepLimitExceeded { limit: usize },
}

impl VmError {
    /// Builder failures leave the environment usable; run-time failures abort a
    /// run. Hitting a configured step limit is a warning, the program itself is sound.
    pub fn level(&self) -> Level {
        match self {
            VmError::CapacityExceeded { .. } => Level::Error,
            VmError::StepLimitExceeded { .. } => Level::Warning,
            _ => Level::Critical,
        }
    }

    /// Program counter the failure was raised at, if it happened during a run.
    pub fn pc(&self) -> Option<usize> {
        match self {
            VmError::InvalidJumpTarget { pc, .. } | VmError::HandlerFailed { pc, .. } => Some(*pc),
            _ => None,
        }
    }
}

pub type VmResult<T> = Result<T, VmError>;
