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
    // === Load Instructions ===
    //
    // Every load goes through the delay pipeline: the destination
    // register is not visible to the immediately following
    // instruction.

    /// LB: load byte, sign-extended
    pub(crate) fn op_lb(&mut self, bus: &mut Bus) -> Result<()> {
        let i = self.instruction;
        let address = self.reg(i.rs()).wrapping_add(i.imm_se());
        let value = bus.read8(address)? as i8 as u32;
        self.issue_load(i.rt(), value);
        Ok(())
    }

    /// LBU: load byte, zero-extended
    pub(crate) fn op_lbu(&mut self, bus: &mut Bus) -> Result<()> {
        let i = self.instruction;
        let address = self.reg(i.rs()).wrapping_add(i.imm_se());
        let value = bus.read8(address)? as u32;
        self.issue_load(i.rt(), value);
        Ok(())
    }

    /// LH: load halfword, sign-extended; odd address faults
    pub(crate) fn op_lh(&mut self, bus: &mut Bus) -> Result<()> {
        let i = self.instruction;
        let address = self.reg(i.rs()).wrapping_add(i.imm_se());
        if address & 1 != 0 {
            self.cop0.regs[COP0::BADA] = address;
            self.exception(ExceptionCause::BadLoadAddress);
            return Ok(());
        }
        let value = bus.read16(address)? as i16 as u32;
        self.issue_load(i.rt(), value);
        Ok(())
    }

    /// LHU: load halfword, zero-extended; odd address faults
    pub(crate) fn op_lhu(&mut self, bus: &mut Bus) -> Result<()> {
        let i = self.instruction;
        let address = self.reg(i.rs()).wrapping_add(i.imm_se());
        if address & 1 != 0 {
            self.cop0.regs[COP0::BADA] = address;
            self.exception(ExceptionCause::BadLoadAddress);
            return Ok(());
        }
        let value = bus.read16(address)? as u32;
        self.issue_load(i.rt(), value);
        Ok(())
    }

    /// LW: load word; unaligned address faults
    pub(crate) fn op_lw(&mut self, bus: &mut Bus) -> Result<()> {
        let i = self.instruction;
        let address = self.reg(i.rs()).wrapping_add(i.imm_se());
        if address & 3 != 0 {
            self.cop0.regs[COP0::BADA] = address;
            self.exception(ExceptionCause::BadLoadAddress);
            return Ok(());
        }
        let value = bus.read32(address)?;
        self.issue_load(i.rt(), value);
        Ok(())
    }

    /// The register image LWL/LWR merge into
    ///
    /// When the target register has a load still in flight, the merge
    /// uses that in-flight value instead of the committed register
    /// file, so LWL/LWR pairs chain correctly inside load delay slots.
    fn unaligned_base(&self, rt: u8) -> u32 {
        match self.memory_load {
            Some(load) if load.reg == rt => load.value,
            _ => self.reg(rt),
        }
    }

    /// LWL: merge the high bytes of an unaligned word
    pub(crate) fn op_lwl(&mut self, bus: &mut Bus) -> Result<()> {
        let i = self.instruction;
        let address = self.reg(i.rs()).wrapping_add(i.imm_se());
        let value = bus.read32(address & !3)?;
        let pending = self.unaligned_base(i.rt());

        let merged = match address & 3 {
            0 => (pending & 0x00FF_FFFF) | (value << 24),
            1 => (pending & 0x0000_FFFF) | (value << 16),
            2 => (pending & 0x0000_00FF) | (value << 8),
            _ => value,
        };
        self.issue_load(i.rt(), merged);
        Ok(())
    }

    /// LWR: merge the low bytes of an unaligned word
    pub(crate) fn op_lwr(&mut self, bus: &mut Bus) -> Result<()> {
        let i = self.instruction;
        let address = self.reg(i.rs()).wrapping_add(i.imm_se());
        let value = bus.read32(address & !3)?;
        let pending = self.unaligned_base(i.rt());

        let merged = match address & 3 {
            0 => value,
            1 => (pending & 0xFF00_0000) | (value >> 8),
            2 => (pending & 0xFFFF_0000) | (value >> 16),
            _ => (pending & 0xFFFF_FF00) | (value >> 24),
        };
        self.issue_load(i.rt(), merged);
        Ok(())
    }
}
