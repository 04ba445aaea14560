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
    // === Jump Instructions ===
    //
    // Jumps take effect one instruction later: they rewrite next_pc
    // while the delay-slot instruction at pc executes first.

    /// J: jump within the current 256MB segment
    pub(crate) fn op_j(&mut self) -> Result<()> {
        self.branch = true;
        self.branch_taken = true;
        self.next_pc = (self.next_pc & 0xF000_0000) | (self.instruction.target() << 2);
        Ok(())
    }

    /// JAL: link r31 = return address, then jump
    pub(crate) fn op_jal(&mut self) -> Result<()> {
        self.stage_write(31, self.next_pc);
        self.op_j()
    }

    /// JR: jump to register
    pub(crate) fn op_jr(&mut self) -> Result<()> {
        self.branch = true;
        self.branch_taken = true;
        self.next_pc = self.reg(self.instruction.rs());
        Ok(())
    }

    /// JALR: link rd = return address, then jump to rs
    pub(crate) fn op_jalr(&mut self) -> Result<()> {
        self.stage_write(self.instruction.rd(), self.next_pc);
        self.op_jr()
    }
}
