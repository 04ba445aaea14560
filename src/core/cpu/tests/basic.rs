// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut

//! CPU initialization, register file, jumps and branches

use super::super::*;
use super::{load_program, run_steps, PROGRAM_BASE};
use crate::core::memory::Bus;

#[test]
fn test_initial_state() {
    let cpu = CPU::new();

    assert_eq!(cpu.pc(), 0xBFC00000);
    assert_eq!(cpu.reg(0), 0);
    assert_eq!(cpu.cop0_reg(15), 0x00000002); // PRID: R3000A
    assert_ne!(cpu.cop0_reg(12) & (1 << 22), 0); // BEV set at power-on
}

#[test]
fn test_r0_is_hardwired_to_zero() {
    let mut cpu = CPU::new();
    let mut bus = Bus::new();

    cpu.set_reg(0, 0xDEADBEEF);
    assert_eq!(cpu.reg(0), 0);

    load_program(
        &mut cpu,
        &mut bus,
        &[
            0x24000005, // ADDIU r0, r0, 5
            0x00000000, // NOP
            0x00000000, // NOP
        ],
    );
    run_steps(&mut cpu, &mut bus, 3);
    assert_eq!(cpu.reg(0), 0);
}

#[test]
fn test_register_read_write() {
    let mut cpu = CPU::new();

    cpu.set_reg(1, 0x12345678);
    assert_eq!(cpu.reg(1), 0x12345678);

    for i in 1..32 {
        cpu.set_reg(i, i as u32 * 100);
    }
    for i in 1..32u8 {
        assert_eq!(cpu.reg(i), i as u32 * 100);
    }
}

#[test]
fn test_alu_result_visible_to_next_instruction() {
    let mut cpu = CPU::new();
    let mut bus = Bus::new();

    load_program(
        &mut cpu,
        &mut bus,
        &[
            0x24010001, // ADDIU r1, r0, 1
            0x00211021, // ADDU  r2, r1, r1
            0x00000000, // NOP
        ],
    );
    run_steps(&mut cpu, &mut bus, 3);

    assert_eq!(cpu.reg(1), 1);
    assert_eq!(cpu.reg(2), 2);
}

#[test]
fn test_jump_takes_effect_after_delay_slot() {
    let mut cpu = CPU::new();
    let mut bus = Bus::new();

    load_program(
        &mut cpu,
        &mut bus,
        &[
            0x08000800, // J 0x00002000
            0x24010007, // ADDIU r1, r0, 7 (delay slot)
        ],
    );

    run_steps(&mut cpu, &mut bus, 1);
    // Still in the delay slot
    assert_eq!(cpu.pc(), PROGRAM_BASE + 4);

    run_steps(&mut cpu, &mut bus, 1);
    // Jump target within the current 256MB segment
    assert_eq!(cpu.pc(), 0x80002000);

    // Delay slot instruction executed
    run_steps(&mut cpu, &mut bus, 1);
    assert_eq!(cpu.reg(1), 7);
}

#[test]
fn test_jal_links_return_address() {
    let mut cpu = CPU::new();
    let mut bus = Bus::new();

    load_program(
        &mut cpu,
        &mut bus,
        &[
            0x0C000800, // JAL 0x00002000
            0x00000000, // NOP (delay slot)
            0x00000000,
        ],
    );
    run_steps(&mut cpu, &mut bus, 3);

    assert_eq!(cpu.pc(), 0x80002004);
    // r31 = instruction after the delay slot
    assert_eq!(cpu.reg(31), PROGRAM_BASE + 8);
}

#[test]
fn test_jr_jumps_to_register() {
    let mut cpu = CPU::new();
    let mut bus = Bus::new();

    cpu.set_reg(2, 0x80004000);
    load_program(
        &mut cpu,
        &mut bus,
        &[
            0x00400008, // JR r2
            0x00000000, // NOP (delay slot)
        ],
    );
    run_steps(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.pc(), 0x80004000);
}

#[test]
fn test_beq_taken_and_not_taken() {
    let mut cpu = CPU::new();
    let mut bus = Bus::new();

    // Taken: r1 == r2
    cpu.set_reg(1, 5);
    cpu.set_reg(2, 5);
    load_program(
        &mut cpu,
        &mut bus,
        &[
            0x10220002, // BEQ r1, r2, +2
            0x00000000, // NOP (delay slot)
            0x24030001, // ADDIU r3, r0, 1 (skipped)
            0x24040001, // ADDIU r4, r0, 1 (branch target)
        ],
    );
    run_steps(&mut cpu, &mut bus, 3);
    assert_eq!(cpu.pc(), PROGRAM_BASE + 16);

    // Not taken: r1 != r2
    let mut cpu = CPU::new();
    let mut bus = Bus::new();
    cpu.set_reg(1, 5);
    cpu.set_reg(2, 6);
    load_program(
        &mut cpu,
        &mut bus,
        &[
            0x10220002, // BEQ r1, r2, +2
            0x00000000, // NOP
            0x24030001, // ADDIU r3, r0, 1 (falls through here)
            0x00000000,
        ],
    );
    run_steps(&mut cpu, &mut bus, 4);
    assert_eq!(cpu.reg(3), 1);
}

#[test]
fn test_bltzal_links_even_when_not_taken() {
    let mut cpu = CPU::new();
    let mut bus = Bus::new();

    cpu.set_reg(1, 5); // rs >= 0: BLTZAL not taken
    load_program(
        &mut cpu,
        &mut bus,
        &[
            0x04300004, // BLTZAL r1, +4
            0x00000000, // NOP
            0x00000000,
        ],
    );
    run_steps(&mut cpu, &mut bus, 3);

    assert_ne!(cpu.reg(31), 0);
}

#[test]
fn test_lui_ori_builds_constant() {
    let mut cpu = CPU::new();
    let mut bus = Bus::new();

    load_program(
        &mut cpu,
        &mut bus,
        &[
            0x3C011F80, // LUI r1, 0x1F80
            0x34211234, // ORI r1, r1, 0x1234
            0x00000000, // NOP
        ],
    );
    run_steps(&mut cpu, &mut bus, 3);
    assert_eq!(cpu.reg(1), 0x1F801234);
}
