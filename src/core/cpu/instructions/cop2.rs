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
    // === COP2 (GTE) ===
    //
    // The geometry coprocessor's numeric behavior is out of scope;
    // its opcodes decode but do nothing.

    /// COP2: GTE command or register move, ignored
    pub(crate) fn op_cop2(&mut self) -> Result<()> {
        log::warn!(
            "GTE instruction 0x{:08X} at PC=0x{:08X} ignored",
            self.instruction.code(),
            self.current_pc
        );
        Ok(())
    }

    /// LWC2: load to GTE data register, ignored
    pub(crate) fn op_lwc2(&mut self) -> Result<()> {
        log::warn!("LWC2 at PC=0x{:08X} ignored", self.current_pc);
        Ok(())
    }

    /// SWC2: store from GTE data register, ignored
    pub(crate) fn op_swc2(&mut self) -> Result<()> {
        log::warn!("SWC2 at PC=0x{:08X} ignored", self.current_pc);
        Ok(())
    }
}
