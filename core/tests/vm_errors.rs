use std::sync::Arc;
use hookvm_core::{
    generate_error_report, Environment, Instruction, IntAdd, IntSub, Level, Opcode, Operand,
    OperandKind, StorageArea, Value, VmError,
};
use hookvm_core::vm::{CPOOL_CAPACITY, INSTS_CAPACITY, TEMPS_CAPACITY};

#[test]
fn constant_pool_fills_to_capacity_then_fails() {
    let mut env = Environment::new();
    for i in 0..CPOOL_CAPACITY {
        assert_eq!(env.add_constant(i as i64).unwrap(), i);
    }
    let err = env.add_constant(Value::str("overflow")).unwrap_err();
    assert_eq!(err, VmError::CapacityExceeded { area: StorageArea::ConstantPool, capacity: 100 });
    assert_eq!(err.level(), Level::Error);
    assert_eq!(env.constants().len(), CPOOL_CAPACITY);
    assert_eq!(env.constants()[CPOOL_CAPACITY - 1], Value::Int(99));
}

#[test]
fn instruction_table_fills_to_capacity_then_fails() {
    let mut env = Environment::new();
    for i in 0..INSTS_CAPACITY {
        assert_eq!(env.add_instruction(Instruction::halt()).unwrap(), i);
    }
    let err = env.add_instruction(Instruction::halt()).unwrap_err();
    assert_eq!(err, VmError::CapacityExceeded { area: StorageArea::Instructions, capacity: 200 });
    assert_eq!(env.instruction_count(), INSTS_CAPACITY);
}

#[test]
fn temporaries_fill_to_capacity_then_fail() {
    let mut env = Environment::new();
    for i in 0..TEMPS_CAPACITY {
        assert_eq!(env.alloc_temp().unwrap(), i);
    }
    let err = env.alloc_temp().unwrap_err();
    assert_eq!(err, VmError::CapacityExceeded { area: StorageArea::Temporaries, capacity: 150 });
}

#[test]
fn result_slot_beyond_temporaries_is_rejected_at_build_time() {
    let mut env = Environment::new();
    env.add_constant(1).unwrap();
    let last = TEMPS_CAPACITY - 1;
    env.add_instruction(Instruction::add(Operand::constant(0), Operand::constant(0), last)).unwrap();
    assert_eq!(env.temps().len(), TEMPS_CAPACITY);

    let err = env
        .add_instruction(Instruction::add(Operand::constant(0), Operand::constant(0), TEMPS_CAPACITY))
        .unwrap_err();
    assert!(matches!(err, VmError::CapacityExceeded { area: StorageArea::Temporaries, .. }));
    assert_eq!(env.instruction_count(), 1);
}

#[test]
fn resolve_rejects_unoccupied_slots() {
    let mut env = Environment::new();
    env.add_constant(7).unwrap();
    assert_eq!(env.resolve(&Operand::constant(0)), Ok(&Value::Int(7)));
    assert_eq!(
        env.resolve(&Operand::constant(1)),
        Err(VmError::InvalidOperandReference { kind: OperandKind::Const, index: 1, len: 1 })
    );
    assert_eq!(
        env.resolve(&Operand::temp(0)),
        Err(VmError::InvalidOperandReference { kind: OperandKind::Temp, index: 0, len: 0 })
    );
}

#[test]
fn bad_operand_aborts_the_run() {
    let mut env = Environment::new();
    env.add_constant(1).unwrap();
    env.add_instruction(Instruction::add(Operand::constant(0), Operand::temp(3), 0)).unwrap();
    env.add_instruction(Instruction::halt()).unwrap();
    env.hook(Opcode::Add, Arc::new(IntAdd));

    let err = env.run().unwrap_err();
    assert_eq!(err, VmError::InvalidOperandReference { kind: OperandKind::Temp, index: 3, len: 1 });
    assert_eq!(err.level(), Level::Critical);
}

#[test]
fn unhandled_instruction_does_not_resolve_operands() {
    let mut env = Environment::new();
    env.add_instruction(Instruction::add(Operand::constant(42), Operand::temp(42), 0)).unwrap();
    env.add_instruction(Instruction::halt()).unwrap();
    assert!(env.run().is_ok());
}

#[test]
fn jump_outside_program_is_rejected() {
    let mut env = Environment::new();
    env.add_instruction(Instruction::jmp(2)).unwrap();
    env.add_instruction(Instruction::halt()).unwrap();
    assert_eq!(env.run().unwrap_err(), VmError::InvalidJumpTarget { pc: 0, target: 2, len: 2 });

    // the last instruction is still a valid target
    env.add_instruction(Instruction::halt()).unwrap();
    assert_eq!(env.run().unwrap().halted_at, 2);
}

#[test]
fn running_off_the_end_is_fatal() {
    let mut env = Environment::new();
    env.add_constant(1).unwrap();
    env.add_instruction(Instruction::add(Operand::constant(0), Operand::constant(0), 0)).unwrap();
    env.hook(Opcode::Add, Arc::new(IntAdd));

    let err = env.run().unwrap_err();
    assert_eq!(err, VmError::ProgramRanOffEnd { len: 1 });
    // effects before the failure are kept
    assert_eq!(env.temp(0), Some(&Value::Int(2)));
}

#[test]
fn empty_program_runs_off_the_end() {
    let mut env = Environment::new();
    assert_eq!(env.run().unwrap_err(), VmError::ProgramRanOffEnd { len: 0 });
}

#[test]
fn handler_errors_carry_pc_and_opcode() {
    let mut env = Environment::new();
    env.add_constant(1).unwrap();
    env.add_constant(Value::str("one")).unwrap();
    env.add_instruction(Instruction::add(Operand::constant(0), Operand::constant(0), 0)).unwrap();
    env.add_instruction(Instruction::sub(Operand::constant(0), Operand::constant(1), 1)).unwrap();
    env.add_instruction(Instruction::halt()).unwrap();
    env.install_builtins();

    let err = env.run().unwrap_err();
    match &err {
        VmError::HandlerFailed { pc, opcode, message } => {
            assert_eq!(*pc, 1);
            assert_eq!(*opcode, Opcode::Sub);
            assert!(message.contains("int and str"), "message: {}", message);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    let report = generate_error_report(&err);
    assert!(report.starts_with("HOOKVM | CRITICAL | pc 1 | SUB handler failed"), "report: {}", report);
}

#[test]
fn integer_overflow_is_a_handler_error() {
    let mut env = Environment::new();
    env.add_constant(i64::MAX).unwrap();
    env.add_constant(i64::MIN).unwrap();
    env.add_constant(1).unwrap();
    env.add_instruction(Instruction::add(Operand::constant(0), Operand::constant(2), 0)).unwrap();
    env.add_instruction(Instruction::halt()).unwrap();
    env.hook(Opcode::Add, Arc::new(IntAdd));
    assert!(matches!(env.run(), Err(VmError::HandlerFailed { pc: 0, opcode: Opcode::Add, .. })));

    let mut env = Environment::new();
    env.add_constant(i64::MIN).unwrap();
    env.add_constant(1).unwrap();
    env.add_instruction(Instruction::sub(Operand::constant(0), Operand::constant(1), 0)).unwrap();
    env.add_instruction(Instruction::halt()).unwrap();
    env.hook(Opcode::Sub, Arc::new(IntSub));
    assert!(matches!(env.run(), Err(VmError::HandlerFailed { opcode: Opcode::Sub, .. })));
}

#[test]
fn failed_run_leaves_program_intact_and_can_rerun_after_fix() {
    let mut env = Environment::new();
    env.add_constant(10).unwrap();
    env.add_constant(4).unwrap();
    env.add_instruction(Instruction::sub(Operand::constant(0), Operand::constant(1), 0)).unwrap();
    env.hook(Opcode::Sub, Arc::new(IntSub));

    assert!(env.run().is_err());
    assert_eq!(env.constants(), &[Value::Int(10), Value::Int(4)]);
    assert_eq!(env.instruction_count(), 1);

    env.add_instruction(Instruction::halt()).unwrap();
    env.run().expect("rerun");
    assert_eq!(env.temp(0), Some(&Value::Int(6)));
}

#[test]
fn builder_error_report_has_no_location() {
    let err = VmError::CapacityExceeded { area: StorageArea::Instructions, capacity: 200 };
    assert_eq!(
        generate_error_report(&err),
        "HOOKVM | ERROR | unknown location | instruction table is full (capacity 200)"
    );
}
