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

use super::super::cop0::COP0;
use super::super::{ExceptionCause, CPU};
use crate::core::error::Result;
use crate::core::memory::Bus;

impl CPU {
    // === COP0 Instructions ===

    /// COP0 dispatch (opcode 0x10), selected by the rs field
    pub(crate) fn execute_cop0(&mut self, bus: &mut Bus) -> Result<()> {
        match self.instruction.rs() {
            0x00 => self.op_mfc0(),
            0x04 => self.op_mtc0(bus),
            0x10 => self.op_rfe(),
            sub_op => {
                log::warn!(
                    "Unimplemented COP0 sub-opcode 0x{:02X} at PC=0x{:08X}",
                    sub_op,
                    self.current_pc
                );
                Ok(())
            }
        }
    }

    /// MFC0: rt = cop0[rd], through the load delay pipeline
    ///
    /// Reading a register the R3000A does not implement raises an
    /// illegal-instruction exception.
    pub(crate) fn op_mfc0(&mut self) -> Result<()> {
        let i = self.instruction;
        let rd = i.rd() as usize;

        self.issue_load(i.rt(), self.cop0.regs[rd]);

        let implemented = rd == 3 || (5..=9).contains(&rd) || (11..=15).contains(&rd);
        if !implemented {
            self.exception(ExceptionCause::IllegalInstruction);
        }
        Ok(())
    }

    /// MTC0: cop0[rd] = rt
    ///
    /// CAUSE only accepts the software-interrupt bits. Writing SR
    /// refreshes the Bus's cache-isolation flag, and enabling
    /// interrupts with a software interrupt already pending retriggers
    /// immediately.
    pub(crate) fn op_mtc0(&mut self, bus: &mut Bus) -> Result<()> {
        let i = self.instruction;
        let value = self.reg(i.rt());
        let rd = i.rd() as usize;

        let was_enabled = self.cop0.regs[COP0::SR] & 0x1 == 1;

        if rd == COP0::CAUSE {
            let cause = self.cop0.regs[COP0::CAUSE];
            self.cop0.regs[COP0::CAUSE] = (cause & !0x300) | (value & 0x300);
        } else {
            self.cop0.regs[rd] = value;
        }

        if rd == COP0::SR {
            bus.set_cache_isolated(value & 0x10000 != 0);
        }

        let mask = (value >> 8) & 0x3;
        let pending = (self.cop0.regs[COP0::CAUSE] >> 8) & 0x3;
        if !was_enabled && self.cop0.regs[COP0::SR] & 0x1 == 1 && mask & pending != 0 {
            self.pc = self.next_pc;
            self.exception(ExceptionCause::Interrupt);
        }
        Ok(())
    }

    /// RFE: pop the kernel/interrupt-enable mode stack
    pub(crate) fn op_rfe(&mut self) -> Result<()> {
        if self.instruction.funct() != 0x10 {
            log::warn!(
                "RFE: unmatched COP0 function 0x{:02X} at PC=0x{:08X}",
                self.instruction.funct(),
                self.current_pc
            );
            return Ok(());
        }

        let mode = self.cop0.regs[COP0::SR] & 0x3F;
        self.cop0.regs[COP0::SR] &= !0xF;
        self.cop0.regs[COP0::SR] |= mode >> 2;
        Ok(())
    }
}
