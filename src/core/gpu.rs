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

//! GPU register surface
//!
//! The rasterizer itself is outside this core. What the Bus and the
//! DMA controller see are two 32-bit ports:
//!
//! - **GP0** (0x1F801810 write): command/data sink
//! - **GP1** (0x1F801814 write): control sink
//! - **GPUREAD** (0x1F801810 read): data source for VRAM readback
//! - **GPUSTAT** (0x1F801814 read): status word
//!
//! Commands are swallowed into a bounded FIFO so tests can observe
//! what a transfer delivered; the status word advertises the ready
//! bits the boot firmware polls for.

use std::collections::VecDeque;

/// GPUSTAT with "ready to receive cmd/DMA" and "ready to send VRAM" set
const GPUSTAT_READY: u32 = 0x1C00_0000;

/// How many GP0 words the stub retains for inspection
const COMMAND_FIFO_DEPTH: usize = 1024;

/// GPU register stub: the two 32-bit ports and nothing else
pub struct Gpu {
    /// Most recent GP0 words, oldest first
    command_fifo: VecDeque<u32>,

    /// Words queued for GPUREAD
    read_fifo: VecDeque<u32>,

    /// Last GP1 control word, kept for register read-back tests
    last_control: u32,
}

impl Gpu {
    pub fn new() -> Self {
        Self {
            command_fifo: VecDeque::new(),
            read_fifo: VecDeque::new(),
            last_control: 0,
        }
    }

    pub fn reset(&mut self) {
        self.command_fifo.clear();
        self.read_fifo.clear();
        self.last_control = 0;
    }

    /// GP0 write port (commands and data)
    pub fn write_gp0(&mut self, word: u32) {
        if self.command_fifo.len() == COMMAND_FIFO_DEPTH {
            self.command_fifo.pop_front();
        }
        self.command_fifo.push_back(word);
        log::trace!("GP0 <- 0x{:08X}", word);
    }

    /// GP1 write port (control)
    pub fn write_gp1(&mut self, word: u32) {
        self.last_control = word;
        log::trace!("GP1 <- 0x{:08X}", word);
    }

    /// GPUREAD port
    ///
    /// Drains the read FIFO; an empty FIFO reads as zero, the same
    /// benign default the Bus uses for unserviced reads.
    pub fn read_data(&mut self) -> u32 {
        self.read_fifo.pop_front().unwrap_or(0)
    }

    /// GPUSTAT port
    pub fn status(&self) -> u32 {
        GPUSTAT_READY
    }

    /// Queue a word for GPUREAD (test scaffolding for VRAM readback)
    pub fn push_read_data(&mut self, word: u32) {
        self.read_fifo.push_back(word);
    }

    /// Words received on GP0, oldest first
    pub fn commands(&self) -> impl Iterator<Item = u32> + '_ {
        self.command_fifo.iter().copied()
    }

    pub fn last_control(&self) -> u32 {
        self.last_control
    }
}

impl Default for Gpu {
    fn default() -> Self {
        Self::new()
    }
}
