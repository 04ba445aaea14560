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
    // === Logical Instructions ===

    /// AND: rd = rs & rt
    pub(crate) fn op_and(&mut self) -> Result<()> {
        let i = self.instruction;
        let value = self.reg(i.rs()) & self.reg(i.rt());
        self.stage_write(i.rd(), value);
        Ok(())
    }

    /// ANDI: rt = rs & zero_extend(imm)
    pub(crate) fn op_andi(&mut self) -> Result<()> {
        let i = self.instruction;
        let value = self.reg(i.rs()) & i.imm();
        self.stage_write(i.rt(), value);
        Ok(())
    }

    /// OR: rd = rs | rt
    pub(crate) fn op_or(&mut self) -> Result<()> {
        let i = self.instruction;
        let value = self.reg(i.rs()) | self.reg(i.rt());
        self.stage_write(i.rd(), value);
        Ok(())
    }

    /// ORI: rt = rs | zero_extend(imm)
    pub(crate) fn op_ori(&mut self) -> Result<()> {
        let i = self.instruction;
        let value = self.reg(i.rs()) | i.imm();
        self.stage_write(i.rt(), value);
        Ok(())
    }

    /// XOR: rd = rs ^ rt
    pub(crate) fn op_xor(&mut self) -> Result<()> {
        let i = self.instruction;
        let value = self.reg(i.rs()) ^ self.reg(i.rt());
        self.stage_write(i.rd(), value);
        Ok(())
    }

    /// XORI: rt = rs ^ zero_extend(imm)
    pub(crate) fn op_xori(&mut self) -> Result<()> {
        let i = self.instruction;
        let value = self.reg(i.rs()) ^ i.imm();
        self.stage_write(i.rt(), value);
        Ok(())
    }

    /// NOR: rd = !(rs | rt)
    pub(crate) fn op_nor(&mut self) -> Result<()> {
        let i = self.instruction;
        let value = !(self.reg(i.rs()) | self.reg(i.rt()));
        self.stage_write(i.rd(), value);
        Ok(())
    }

    /// LUI: rt = imm << 16
    pub(crate) fn op_lui(&mut self) -> Result<()> {
        let i = self.instruction;
        self.stage_write(i.rt(), i.imm() << 16);
        Ok(())
    }
}
