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
    // === Multiply/Divide Instructions ===

    /// MULT: HI:LO = rs * rt, signed
    pub(crate) fn op_mult(&mut self) -> Result<()> {
        let i = self.instruction;
        let rs = self.reg(i.rs()) as i32 as i64;
        let rt = self.reg(i.rt()) as i32 as i64;
        let value = rs.wrapping_mul(rt) as u64;

        self.hi = (value >> 32) as u32;
        self.lo = value as u32;
        Ok(())
    }

    /// MULTU: HI:LO = rs * rt, unsigned
    pub(crate) fn op_multu(&mut self) -> Result<()> {
        let i = self.instruction;
        let rs = self.reg(i.rs()) as u64;
        let rt = self.reg(i.rt()) as u64;
        let value = rs * rt;

        self.hi = (value >> 32) as u32;
        self.lo = value as u32;
        Ok(())
    }

    /// DIV: LO = rs / rt, HI = rs % rt, signed
    ///
    /// Division never traps. Divide-by-zero yields HI = dividend and
    /// LO = -1 for a non-negative dividend, +1 otherwise; the
    /// most-negative dividend divided by -1 yields itself with
    /// remainder 0.
    pub(crate) fn op_div(&mut self) -> Result<()> {
        let i = self.instruction;
        let dividend = self.reg(i.rs()) as i32;
        let divisor = self.reg(i.rt()) as i32;

        if divisor == 0 {
            self.hi = dividend as u32;
            self.lo = if dividend >= 0 { 0xFFFF_FFFF } else { 1 };
        } else if dividend as u32 == 0x8000_0000 && divisor == -1 {
            self.hi = 0;
            self.lo = 0x8000_0000;
        } else {
            self.hi = (dividend % divisor) as u32;
            self.lo = (dividend / divisor) as u32;
        }
        Ok(())
    }

    /// DIVU: LO = rs / rt, HI = rs % rt, unsigned
    ///
    /// Divide-by-zero yields LO = all-ones, HI = dividend.
    pub(crate) fn op_divu(&mut self) -> Result<()> {
        let i = self.instruction;
        let dividend = self.reg(i.rs());
        let divisor = self.reg(i.rt());

        if divisor == 0 {
            self.hi = dividend;
            self.lo = 0xFFFF_FFFF;
        } else {
            self.hi = dividend % divisor;
            self.lo = dividend / divisor;
        }
        Ok(())
    }

    /// MFHI: rd = HI
    pub(crate) fn op_mfhi(&mut self) -> Result<()> {
        let rd = self.instruction.rd();
        self.stage_write(rd, self.hi);
        Ok(())
    }

    /// MFLO: rd = LO
    pub(crate) fn op_mflo(&mut self) -> Result<()> {
        let rd = self.instruction.rd();
        self.stage_write(rd, self.lo);
        Ok(())
    }

    /// MTHI: HI = rs
    pub(crate) fn op_mthi(&mut self) -> Result<()> {
        self.hi = self.reg(self.instruction.rs());
        Ok(())
    }

    /// MTLO: LO = rs
    pub(crate) fn op_mtlo(&mut self) -> Result<()> {
        self.lo = self.reg(self.instruction.rs());
        Ok(())
    }
}
