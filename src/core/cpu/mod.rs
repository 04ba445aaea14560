// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::core::error::Result;
use crate::core::memory::Bus;

/// CPU (MIPS R3000A) interpreter
///
/// # Specifications
/// - Architecture: MIPS I (32-bit)
/// - Clock frequency: 33.8688 MHz
/// - Registers: 32 general-purpose registers + HI/LO + COP0
///
/// Branches and loads each have a one-instruction delay slot. The
/// interpreter models both with explicit pipeline state: a PC triple
/// (current/next/in-flight) for branches, and a two-slot load pipeline
/// plus a staged register write that retire at the top of the
/// following step.
///
/// # Example
/// ```
/// use station_core::core::cpu::CPU;
///
/// let mut cpu = CPU::new();
/// cpu.reset();
/// assert_eq!(cpu.reg(0), 0); // r0 is always 0
/// ```
pub struct CPU {
    /// General purpose registers (r0-r31); r0 is hardwired to zero
    regs: [u32; 32],

    /// Program counter of the next fetch
    pc: u32,

    /// PC after that (branch targets land here)
    next_pc: u32,

    /// PC of the instruction currently executing
    current_pc: u32,

    /// Multiply/divide result registers
    hi: u32,
    lo: u32,

    /// Coprocessor 0 (System Control)
    cop0: COP0,

    /// Load issued by the instruction executing now
    pending_load: Option<LoadDelay>,

    /// Load issued by the previous instruction, commits next step
    memory_load: Option<LoadDelay>,

    /// Register write staged by the instruction executing now
    write_back: Option<(u8, u32)>,

    /// The instruction executing now is a branch/jump
    branch: bool,

    /// ... and it was taken
    branch_taken: bool,

    /// The instruction executing now sits in a branch delay slot
    delay_slot: bool,

    /// ... and the branch before it was taken
    branch_taken_delay_slot: bool,

    /// Decoded instruction record, rebuilt every step
    instruction: Instruction,

    /// Line buffer for the BIOS putchar capture
    tty_line: String,
}

/// A load whose destination register is not yet visible
#[derive(Debug, Clone, Copy)]
struct LoadDelay {
    reg: u8,
    value: u32,
}

// Module declarations
mod cop0;
mod decode;
mod instructions;
#[cfg(test)]
mod tests;

// Re-exports
pub use cop0::ExceptionCause;
use cop0::COP0;
pub use decode::Instruction;

impl CPU {
    /// Fixed per-instruction cycle cost; memory access biases come on top
    pub const INSTRUCTION_BIAS: u32 = 2;

    /// Power-on PC (BIOS entry point)
    pub const RESET_VECTOR: u32 = 0xBFC00000;

    /// BIOS shell entry: the side-load injection point
    pub const SHELL_PC: u32 = 0x80010000;

    pub fn new() -> Self {
        Self {
            regs: [0u32; 32],
            pc: Self::RESET_VECTOR,
            next_pc: Self::RESET_VECTOR.wrapping_add(4),
            current_pc: Self::RESET_VECTOR,
            hi: 0,
            lo: 0,
            cop0: COP0::new(),
            pending_load: None,
            memory_load: None,
            write_back: None,
            branch: false,
            branch_taken: false,
            delay_slot: false,
            branch_taken_delay_slot: false,
            instruction: Instruction::new(0),
            tty_line: String::new(),
        }
    }

    /// Reset to the power-on state
    pub fn reset(&mut self) {
        self.regs = [0u32; 32];
        self.pc = Self::RESET_VECTOR;
        self.next_pc = Self::RESET_VECTOR.wrapping_add(4);
        self.current_pc = Self::RESET_VECTOR;
        self.hi = 0;
        self.lo = 0;
        self.cop0.reset();
        self.pending_load = None;
        self.memory_load = None;
        self.write_back = None;
        self.branch = false;
        self.branch_taken = false;
        self.delay_slot = false;
        self.branch_taken_delay_slot = false;
        self.instruction = Instruction::new(0);
        self.tty_line.clear();
    }

    /// Read a general purpose register; r0 always yields 0
    #[inline(always)]
    pub fn reg(&self, index: u8) -> u32 {
        self.regs[index as usize]
    }

    /// Write a general purpose register immediately
    ///
    /// Writes to r0 are discarded. Instruction handlers must not call
    /// this: they stage their write so it retires in pipeline order.
    #[inline(always)]
    pub fn set_reg(&mut self, index: u8, value: u32) {
        if index != 0 {
            self.regs[index as usize] = value;
        }
    }

    /// Stage the single register write an instruction may produce
    #[inline(always)]
    fn stage_write(&mut self, index: u8, value: u32) {
        self.write_back = Some((index, value));
    }

    /// Issue a delayed load: the value becomes visible one step later
    #[inline(always)]
    fn issue_load(&mut self, index: u8, value: u32) {
        self.pending_load = Some(LoadDelay { reg: index, value });
    }

    /// Retire the previous instruction's pipeline state
    ///
    /// The in-flight load commits unless the previous instruction
    /// issued a newer load to the same register (the newer one wins);
    /// the staged register write lands last, so an instruction writing
    /// the register a load targets beats the load.
    fn retire_pipeline(&mut self) {
        if let Some(load) = self.memory_load.take() {
            let superseded = self
                .pending_load
                .is_some_and(|pending| pending.reg == load.reg);
            if !superseded {
                self.set_reg(load.reg, load.value);
            }
        }
        self.memory_load = self.pending_load.take();

        if let Some((reg, value)) = self.write_back.take() {
            self.set_reg(reg, value);
        }
    }

    /// Execute one instruction
    ///
    /// Retires the previous step's pipeline state, fetches and
    /// executes one instruction, runs the kernel-call hook, polls for
    /// pending interrupts, and returns the cycle charge (fixed bias
    /// plus whatever the Bus accumulated for this step's accesses).
    ///
    /// # Errors
    ///
    /// Only fatal configuration errors (undecodable opcode, prohibited
    /// scratchpad mirror access) surface here. Architectural faults
    /// redirect through the exception vector and return `Ok`.
    pub fn step(&mut self, bus: &mut Bus) -> Result<u32> {
        self.retire_pipeline();

        if self.pc == Self::SHELL_PC {
            if let Some(target) = bus.apply_sideload() {
                log::info!("Side-loaded executable, entry at 0x{:08X}", target.pc);
                self.set_reg(28, target.gp);
                self.pc = target.pc;
                self.next_pc = target.pc.wrapping_add(4);
            }
        }

        if self.pc & 3 != 0 {
            log::warn!("Unaligned PC 0x{:08X}", self.pc);
            self.current_pc = self.pc;
            self.cop0.regs[COP0::BADA] = self.pc;
            self.exception(ExceptionCause::BadLoadAddress);
            return Ok(Self::INSTRUCTION_BIAS + bus.take_access_cycles());
        }

        self.instruction = Instruction::new(bus.fetch(self.pc));
        self.current_pc = self.pc;
        self.pc = self.next_pc;
        self.next_pc = self.next_pc.wrapping_add(4);

        self.delay_slot = self.branch;
        self.branch_taken_delay_slot = self.branch_taken;
        self.branch = false;
        self.branch_taken = false;

        self.execute(bus)?;

        self.handle_kernel_calls();
        self.handle_interrupts(bus);

        Ok(Self::INSTRUCTION_BIAS + bus.take_access_cycles())
    }

    /// Redirect control flow through the exception vector
    ///
    /// Pushes the 6-bit kernel/interrupt-enable mode stack, records
    /// the cause, computes the saved PC (rolled back by one
    /// instruction when the fault hit a branch delay slot, with the
    /// branch target captured in TAR), and jumps to the BEV-selected
    /// vector.
    pub fn exception(&mut self, cause: ExceptionCause) {
        let sr = self.cop0.regs[COP0::SR];
        let handler = if sr & (1 << 22) != 0 {
            0xBFC0_0180 // BEV=1: bootstrap vector
        } else {
            0x8000_0080
        };

        // Push KU/IE: current -> previous -> old, enter kernel with
        // interrupts disabled
        self.cop0.regs[COP0::SR] = (sr & !0x3F) | ((sr << 2) & 0x3F);

        self.cop0.regs[COP0::CAUSE] = (cause as u32) << 2;

        if cause == ExceptionCause::Interrupt {
            // Interrupts land between instructions: the saved PC is the
            // instruction about to run, and the delay-slot state is that
            // of the instruction just executed
            self.cop0.regs[COP0::EPC] = self.pc;
            self.delay_slot = self.branch;
            self.branch_taken_delay_slot = self.branch_taken;
        } else {
            self.cop0.regs[COP0::EPC] = self.current_pc;
        }

        if self.delay_slot {
            self.cop0.regs[COP0::EPC] = self.cop0.regs[COP0::EPC].wrapping_sub(4);
            self.cop0.regs[COP0::CAUSE] |= 1 << 31;
            self.cop0.regs[COP0::TAR] = self.pc;

            if self.branch_taken_delay_slot {
                self.cop0.regs[COP0::CAUSE] |= 1 << 30;
            }
        }

        log::debug!(
            "EXCEPTION {:?}: EPC=0x{:08X} handler=0x{:08X} delay_slot={}",
            cause,
            self.cop0.regs[COP0::EPC],
            handler,
            self.delay_slot
        );

        self.pc = handler;
        self.next_pc = handler.wrapping_add(4);
    }

    /// BIOS putchar capture (A-functions via 0xB0, call 0x3D)
    ///
    /// A diagnostic aid: accumulates the characters the boot firmware
    /// prints through its character-output routine and logs whole
    /// lines.
    fn handle_kernel_calls(&mut self) {
        let pc = self.pc & 0x1F_FFFF;
        let call = self.reg(9) & 0xFF;
        if pc != 0xB0 || call != 0x3D {
            return;
        }

        match (self.reg(4) & 0xFF) as u8 {
            b'\r' => {}
            b'\n' => {
                log::info!("TTY: {}", self.tty_line);
                self.tty_line.clear();
            }
            ch => self.tty_line.push(ch as char),
        }
    }

    /// Poll the Bus's aggregated interrupt state once per step
    ///
    /// Mirrors the hardware IRQ line into CAUSE bit 10, then raises an
    /// Interrupt exception if the current-mode enable bit is set and
    /// an unmasked pending bit exists.
    fn handle_interrupts(&mut self, bus: &mut Bus) {
        if bus.irq_active() {
            self.cop0.regs[COP0::CAUSE] |= 0x400;
        } else {
            self.cop0.regs[COP0::CAUSE] &= !0x400;
        }

        let sr = self.cop0.regs[COP0::SR];
        if sr & 0x1 == 0 {
            return;
        }

        let mask = (sr >> 8) & 0xFF;
        let pending = (self.cop0.regs[COP0::CAUSE] >> 8) & 0xFF;
        if mask & pending != 0 {
            self.exception(ExceptionCause::Interrupt);
        }
    }

    /// Current PC value
    pub fn pc(&self) -> u32 {
        self.pc
    }

    /// Redirect execution (used by loaders and tests)
    pub fn set_pc(&mut self, pc: u32) {
        self.pc = pc;
        self.next_pc = pc.wrapping_add(4);
    }

    /// Whether the instruction executing now is in a branch delay slot
    pub fn in_delay_slot(&self) -> bool {
        self.delay_slot
    }

    pub fn hi(&self) -> u32 {
        self.hi
    }

    pub fn lo(&self) -> u32 {
        self.lo
    }

    /// Read a COP0 register (SR, CAUSE, EPC, ...)
    pub fn cop0_reg(&self, index: usize) -> u32 {
        self.cop0.regs[index]
    }

    /// Dump CPU state for debugging
    pub fn dump_registers(&self) {
        println!("CPU Registers:");
        println!("PC: 0x{:08X}  Next PC: 0x{:08X}", self.pc, self.next_pc);
        println!("HI: 0x{:08X}  LO: 0x{:08X}", self.hi, self.lo);
        println!();

        for i in 0..32 {
            if i % 4 == 0 && i > 0 {
                println!();
            }
            print!("r{:2}: 0x{:08X}  ", i, self.reg(i));
        }
        println!("\n");

        println!("COP0 Registers:");
        println!("SR:    0x{:08X}", self.cop0.regs[COP0::SR]);
        println!("CAUSE: 0x{:08X}", self.cop0.regs[COP0::CAUSE]);
        println!("EPC:   0x{:08X}", self.cop0.regs[COP0::EPC]);
        println!("BADA:  0x{:08X}", self.cop0.regs[COP0::BADA]);
        println!("PRID:  0x{:08X}", self.cop0.regs[COP0::PRID]);
    }
}

impl Default for CPU {
    fn default() -> Self {
        Self::new()
    }
}
