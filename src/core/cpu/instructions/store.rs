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
    // === Store Instructions ===

    /// SB: store byte
    pub(crate) fn op_sb(&mut self, bus: &mut Bus) -> Result<()> {
        let i = self.instruction;
        let address = self.reg(i.rs()).wrapping_add(i.imm_se());
        bus.write8(address, self.reg(i.rt()) as u8)
    }

    /// SH: store halfword; odd address faults
    pub(crate) fn op_sh(&mut self, bus: &mut Bus) -> Result<()> {
        let i = self.instruction;
        let address = self.reg(i.rs()).wrapping_add(i.imm_se());
        if address & 1 != 0 {
            self.cop0.regs[COP0::BADA] = address;
            self.exception(ExceptionCause::BadStoreAddress);
            return Ok(());
        }
        bus.write16(address, self.reg(i.rt()) as u16)
    }

    /// SW: store word; unaligned address faults
    pub(crate) fn op_sw(&mut self, bus: &mut Bus) -> Result<()> {
        let i = self.instruction;
        let address = self.reg(i.rs()).wrapping_add(i.imm_se());
        if address & 3 != 0 {
            self.cop0.regs[COP0::BADA] = address;
            self.exception(ExceptionCause::BadStoreAddress);
            return Ok(());
        }
        bus.write32(address, self.reg(i.rt()))
    }

    /// SWL: store the high bytes of an unaligned word
    pub(crate) fn op_swl(&mut self, bus: &mut Bus) -> Result<()> {
        let i = self.instruction;
        let address = self.reg(i.rs()).wrapping_add(i.imm_se());
        let aligned = address & !3;
        let value = bus.read32(aligned)?;
        let rt = self.reg(i.rt());

        let merged = match address & 3 {
            0 => (value & 0xFFFF_FF00) | (rt >> 24),
            1 => (value & 0xFFFF_0000) | (rt >> 16),
            2 => (value & 0xFF00_0000) | (rt >> 8),
            _ => rt,
        };
        bus.write32(aligned, merged)
    }

    /// SWR: store the low bytes of an unaligned word
    pub(crate) fn op_swr(&mut self, bus: &mut Bus) -> Result<()> {
        let i = self.instruction;
        let address = self.reg(i.rs()).wrapping_add(i.imm_se());
        let aligned = address & !3;
        let value = bus.read32(aligned)?;
        let rt = self.reg(i.rt());

        let merged = match address & 3 {
            0 => rt,
            1 => (value & 0x0000_00FF) | (rt << 8),
            2 => (value & 0x0000_FFFF) | (rt << 16),
            _ => (value & 0x00FF_FFFF) | (rt << 24),
        };
        bus.write32(aligned, merged)
    }
}
