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
    // === Shift Instructions ===

    /// SLL: rd = rt << shamt (shamt 0 with rt/rd 0 encodes NOP)
    pub(crate) fn op_sll(&mut self) -> Result<()> {
        let i = self.instruction;
        let value = self.reg(i.rt()) << i.shamt();
        self.stage_write(i.rd(), value);
        Ok(())
    }

    /// SRL: rd = rt >> shamt, logical
    pub(crate) fn op_srl(&mut self) -> Result<()> {
        let i = self.instruction;
        let value = self.reg(i.rt()) >> i.shamt();
        self.stage_write(i.rd(), value);
        Ok(())
    }

    /// SRA: rd = rt >> shamt, arithmetic
    pub(crate) fn op_sra(&mut self) -> Result<()> {
        let i = self.instruction;
        let value = ((self.reg(i.rt()) as i32) >> i.shamt()) as u32;
        self.stage_write(i.rd(), value);
        Ok(())
    }

    /// SLLV: rd = rt << (rs & 0x1F)
    pub(crate) fn op_sllv(&mut self) -> Result<()> {
        let i = self.instruction;
        let value = self.reg(i.rt()) << (self.reg(i.rs()) & 0x1F);
        self.stage_write(i.rd(), value);
        Ok(())
    }

    /// SRLV: rd = rt >> (rs & 0x1F), logical
    pub(crate) fn op_srlv(&mut self) -> Result<()> {
        let i = self.instruction;
        let value = self.reg(i.rt()) >> (self.reg(i.rs()) & 0x1F);
        self.stage_write(i.rd(), value);
        Ok(())
    }

    /// SRAV: rd = rt >> (rs & 0x1F), arithmetic
    pub(crate) fn op_srav(&mut self) -> Result<()> {
        let i = self.instruction;
        let value = ((self.reg(i.rt()) as i32) >> (self.reg(i.rs()) & 0x1F)) as u32;
        self.stage_write(i.rd(), value);
        Ok(())
    }
}
