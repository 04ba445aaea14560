// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut

//! Exception mechanism: traps, vectors, mode stack, delay-slot rollback

use super::super::cop0::COP0;
use super::super::*;
use super::{load_program, run_steps, PROGRAM_BASE};
use crate::core::error::EmulatorError;
use crate::core::memory::Bus;

#[test]
fn test_syscall_uses_bootstrap_vector() {
    let mut cpu = CPU::new();
    let mut bus = Bus::new();

    // BEV is set at power-on
    load_program(&mut cpu, &mut bus, &[0x0000000C]); // SYSCALL
    run_steps(&mut cpu, &mut bus, 1);

    assert_eq!(cpu.pc(), 0xBFC00180);
    assert_eq!(cpu.cop0_reg(COP0::EPC), PROGRAM_BASE);
    assert_eq!((cpu.cop0_reg(COP0::CAUSE) >> 2) & 0x1F, 0x8);
}

#[test]
fn test_syscall_uses_normal_vector_when_bev_clear() {
    let mut cpu = CPU::new();
    let mut bus = Bus::new();

    cpu.cop0.regs[COP0::SR] &= !(1 << 22);
    load_program(&mut cpu, &mut bus, &[0x0000000C]); // SYSCALL
    run_steps(&mut cpu, &mut bus, 1);

    assert_eq!(cpu.pc(), 0x80000080);
}

#[test]
fn test_break_trap() {
    let mut cpu = CPU::new();
    let mut bus = Bus::new();

    load_program(&mut cpu, &mut bus, &[0x0000000D]); // BREAK
    run_steps(&mut cpu, &mut bus, 1);

    assert_eq!((cpu.cop0_reg(COP0::CAUSE) >> 2) & 0x1F, 0x9);
}

#[test]
fn test_exception_pushes_mode_stack() {
    let mut cpu = CPU::new();
    let mut bus = Bus::new();

    // IEc set, kernel mode
    cpu.cop0.regs[COP0::SR] = (cpu.cop0.regs[COP0::SR] & !0x3F) | 0x01;
    load_program(&mut cpu, &mut bus, &[0x0000000C]); // SYSCALL
    run_steps(&mut cpu, &mut bus, 1);

    // Current bits pushed to previous, interrupts now disabled
    assert_eq!(cpu.cop0_reg(COP0::SR) & 0x3F, 0x04);
}

#[test]
fn test_rfe_pops_mode_stack() {
    let mut cpu = CPU::new();
    let mut bus = Bus::new();

    cpu.cop0.regs[COP0::SR] = (cpu.cop0.regs[COP0::SR] & !0x3F) | 0x34;
    load_program(&mut cpu, &mut bus, &[0x42000010]); // RFE
    run_steps(&mut cpu, &mut bus, 1);

    assert_eq!(cpu.cop0_reg(COP0::SR) & 0x3F, 0x3D);
}

#[test]
fn test_exception_in_delay_slot_rolls_back_epc() {
    let mut cpu = CPU::new();
    let mut bus = Bus::new();

    load_program(
        &mut cpu,
        &mut bus,
        &[
            0x10000002, // BEQ r0, r0, +2 (always taken)
            0x0000000C, // SYSCALL (delay slot)
            0x00000000, // NOP
            0x00000000, // NOP (branch target)
        ],
    );
    run_steps(&mut cpu, &mut bus, 2);

    let cause = cpu.cop0_reg(COP0::CAUSE);

    // EPC points at the branch, not the trapping delay slot
    assert_eq!(cpu.cop0_reg(COP0::EPC), PROGRAM_BASE);
    // Delay-slot and branch-taken bits for the guest handler
    assert_ne!(cause & (1 << 31), 0);
    assert_ne!(cause & (1 << 30), 0);
    // The branch target is captured for resumption
    assert_eq!(cpu.cop0_reg(COP0::TAR), PROGRAM_BASE + 12);
}

#[test]
fn test_exception_in_untaken_branch_delay_slot() {
    let mut cpu = CPU::new();
    let mut bus = Bus::new();

    cpu.set_reg(1, 1);
    load_program(
        &mut cpu,
        &mut bus,
        &[
            0x10200002, // BEQ r1, r0, +2 (not taken)
            0x0000000C, // SYSCALL (delay slot)
            0x00000000, // NOP
        ],
    );
    run_steps(&mut cpu, &mut bus, 2);

    let cause = cpu.cop0_reg(COP0::CAUSE);
    assert_eq!(cpu.cop0_reg(COP0::EPC), PROGRAM_BASE);
    assert_ne!(cause & (1 << 31), 0);
    // Branch was not taken
    assert_eq!(cause & (1 << 30), 0);
}

#[test]
fn test_unaligned_pc_raises_address_exception() {
    let mut cpu = CPU::new();
    let mut bus = Bus::new();

    cpu.set_pc(0x80000002);
    cpu.step(&mut bus).unwrap();

    assert_eq!((cpu.cop0_reg(COP0::CAUSE) >> 2) & 0x1F, 0x4);
    assert_eq!(cpu.cop0_reg(COP0::EPC), 0x80000002);
    assert_eq!(cpu.cop0_reg(COP0::BADA), 0x80000002);
    assert_eq!(cpu.pc(), 0xBFC00180);
}

#[test]
fn test_unaligned_load_sets_bad_vaddr() {
    let mut cpu = CPU::new();
    let mut bus = Bus::new();

    cpu.set_reg(4, 0x80000001);
    load_program(&mut cpu, &mut bus, &[0x8C850000]); // LW r5, 0(r4)
    run_steps(&mut cpu, &mut bus, 1);

    assert_eq!((cpu.cop0_reg(COP0::CAUSE) >> 2) & 0x1F, 0x4);
    assert_eq!(cpu.cop0_reg(COP0::BADA), 0x80000001);
    // Destination untouched
    assert_eq!(cpu.reg(5), 0);
}

#[test]
fn test_unaligned_store_raises_store_fault() {
    let mut cpu = CPU::new();
    let mut bus = Bus::new();

    cpu.set_reg(4, 0x80000002);
    load_program(&mut cpu, &mut bus, &[0xAC850001]); // SW r5, 1(r4)
    run_steps(&mut cpu, &mut bus, 1);

    assert_eq!((cpu.cop0_reg(COP0::CAUSE) >> 2) & 0x1F, 0x5);
    assert_eq!(cpu.cop0_reg(COP0::BADA), 0x80000003);
}

#[test]
fn test_mfc0_of_unimplemented_register_faults() {
    let mut cpu = CPU::new();
    let mut bus = Bus::new();

    load_program(&mut cpu, &mut bus, &[0x40012000]); // MFC0 r1, cop0r4
    run_steps(&mut cpu, &mut bus, 1);

    assert_eq!((cpu.cop0_reg(COP0::CAUSE) >> 2) & 0x1F, 0xA);
}

#[test]
fn test_undecodable_opcode_is_fatal() {
    let mut cpu = CPU::new();
    let mut bus = Bus::new();

    load_program(&mut cpu, &mut bus, &[0xFC000000]);
    let result = cpu.step(&mut bus);

    assert!(matches!(
        result,
        Err(EmulatorError::UnsupportedInstruction {
            instruction: 0xFC000000,
            ..
        })
    ));
}

#[test]
fn test_gte_opcodes_are_ignored_not_fatal() {
    let mut cpu = CPU::new();
    let mut bus = Bus::new();

    load_program(
        &mut cpu,
        &mut bus,
        &[
            0x4A180001, // COP2 command
            0x00000000, // NOP
        ],
    );
    run_steps(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.pc(), PROGRAM_BASE + 8);
}
