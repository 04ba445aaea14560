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

use super::super::CPU;
use crate::core::error::Result;

impl CPU {
    // === Branch Instructions ===
    //
    // Every branch sets the `branch` flag whether taken or not; the
    // exception handler needs to know the following instruction sits
    // in a delay slot either way.

    /// Take the branch: next_pc = delay-slot pc + offset
    fn take_branch(&mut self) {
        self.branch_taken = true;
        self.next_pc = self.pc.wrapping_add(self.instruction.imm_se() << 2);
    }

    /// BEQ: branch if rs == rt
    pub(crate) fn op_beq(&mut self) -> Result<()> {
        let i = self.instruction;
        self.branch = true;
        if self.reg(i.rs()) == self.reg(i.rt()) {
            self.take_branch();
        }
        Ok(())
    }

    /// BNE: branch if rs != rt
    pub(crate) fn op_bne(&mut self) -> Result<()> {
        let i = self.instruction;
        self.branch = true;
        if self.reg(i.rs()) != self.reg(i.rt()) {
            self.take_branch();
        }
        Ok(())
    }

    /// BGTZ: branch if rs > 0, signed
    pub(crate) fn op_bgtz(&mut self) -> Result<()> {
        self.branch = true;
        if (self.reg(self.instruction.rs()) as i32) > 0 {
            self.take_branch();
        }
        Ok(())
    }

    /// BLEZ: branch if rs <= 0, signed
    pub(crate) fn op_blez(&mut self) -> Result<()> {
        self.branch = true;
        if (self.reg(self.instruction.rs()) as i32) <= 0 {
            self.take_branch();
        }
        Ok(())
    }

    /// REGIMM family: BLTZ/BGEZ/BLTZAL/BGEZAL (opcode 0x01)
    ///
    /// Bit 16 selects the >= 0 test; rt values 0x10-0x11 link r31,
    /// and the link happens whether or not the branch is taken.
    pub(crate) fn op_regimm(&mut self) -> Result<()> {
        let i = self.instruction;
        self.branch = true;
        let rs = self.reg(i.rs()) as i32;

        let taken = if i.bgez() { rs >= 0 } else { rs < 0 };
        if taken {
            self.take_branch();
        }

        if (i.rt() & 0x1E) == 0x10 {
            self.stage_write(31, self.next_pc);
        }
        Ok(())
    }
}
