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

use super::super::{ExceptionCause, CPU};
use crate::core::error::Result;

impl CPU {
    // === Arithmetic Instructions ===

    /// ADD: rd = rs + rt, overflow exception leaves rd unmodified
    pub(crate) fn op_add(&mut self) -> Result<()> {
        let i = self.instruction;
        let rs = self.reg(i.rs());
        let rt = self.reg(i.rt());
        let value = rs.wrapping_add(rt);

        // Two's-complement overflow: operands agree in sign, result differs
        if ((rs ^ value) & (rt ^ value)) >> 31 != 0 {
            self.exception(ExceptionCause::Overflow);
            return Ok(());
        }
        self.stage_write(i.rd(), value);
        Ok(())
    }

    /// ADDI: rt = rs + sign_extend(imm), with overflow exception
    pub(crate) fn op_addi(&mut self) -> Result<()> {
        let i = self.instruction;
        let rs = self.reg(i.rs());
        let imm = i.imm_se();
        let value = rs.wrapping_add(imm);

        if ((rs ^ value) & (imm ^ value)) >> 31 != 0 {
            self.exception(ExceptionCause::Overflow);
            return Ok(());
        }
        self.stage_write(i.rt(), value);
        Ok(())
    }

    /// ADDU: rd = rs + rt, wrapping
    pub(crate) fn op_addu(&mut self) -> Result<()> {
        let i = self.instruction;
        let value = self.reg(i.rs()).wrapping_add(self.reg(i.rt()));
        self.stage_write(i.rd(), value);
        Ok(())
    }

    /// ADDIU: rt = rs + sign_extend(imm), wrapping
    ///
    /// Despite the name the immediate is sign-extended.
    pub(crate) fn op_addiu(&mut self) -> Result<()> {
        let i = self.instruction;
        let value = self.reg(i.rs()).wrapping_add(i.imm_se());
        self.stage_write(i.rt(), value);
        Ok(())
    }

    /// SUB: rd = rs - rt, overflow exception leaves rd unmodified
    pub(crate) fn op_sub(&mut self) -> Result<()> {
        let i = self.instruction;
        let rs = self.reg(i.rs());
        let rt = self.reg(i.rt());
        let value = rs.wrapping_sub(rt);

        if ((rs ^ value) & (!rt ^ value)) >> 31 != 0 {
            self.exception(ExceptionCause::Overflow);
            return Ok(());
        }
        self.stage_write(i.rd(), value);
        Ok(())
    }

    /// SUBU: rd = rs - rt, wrapping
    pub(crate) fn op_subu(&mut self) -> Result<()> {
        let i = self.instruction;
        let value = self.reg(i.rs()).wrapping_sub(self.reg(i.rt()));
        self.stage_write(i.rd(), value);
        Ok(())
    }

    /// SLT: rd = (rs < rt) signed
    pub(crate) fn op_slt(&mut self) -> Result<()> {
        let i = self.instruction;
        let value = ((self.reg(i.rs()) as i32) < (self.reg(i.rt()) as i32)) as u32;
        self.stage_write(i.rd(), value);
        Ok(())
    }

    /// SLTU: rd = (rs < rt) unsigned
    pub(crate) fn op_sltu(&mut self) -> Result<()> {
        let i = self.instruction;
        let value = (self.reg(i.rs()) < self.reg(i.rt())) as u32;
        self.stage_write(i.rd(), value);
        Ok(())
    }

    /// SLTI: rt = (rs < sign_extend(imm)) signed
    pub(crate) fn op_slti(&mut self) -> Result<()> {
        let i = self.instruction;
        let value = ((self.reg(i.rs()) as i32) < (i.imm_se() as i32)) as u32;
        self.stage_write(i.rt(), value);
        Ok(())
    }

    /// SLTIU: rt = (rs < sign_extend(imm)) unsigned
    pub(crate) fn op_sltiu(&mut self) -> Result<()> {
        let i = self.instruction;
        let value = (self.reg(i.rs()) < i.imm_se()) as u32;
        self.stage_write(i.rt(), value);
        Ok(())
    }
}
