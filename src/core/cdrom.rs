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

//! CD-ROM register surface
//!
//! The drive's command and seek state machines are outside this core.
//! What remains is the data path the Bus and DMA channel 3 pull from:
//! a byte FIFO filled by whoever models the drive, drained one byte at
//! a time through the register window or four bytes at a time through
//! the DMA word port.

use std::collections::VecDeque;

/// CD-ROM data FIFO stub
pub struct Cdrom {
    data_fifo: VecDeque<u8>,
}

impl Cdrom {
    pub fn new() -> Self {
        Self {
            data_fifo: VecDeque::new(),
        }
    }

    pub fn reset(&mut self) {
        self.data_fifo.clear();
    }

    /// Register-window byte read (data FIFO port)
    pub fn read_data_byte(&mut self) -> u8 {
        self.data_fifo.pop_front().unwrap_or(0)
    }

    /// DMA word port: four FIFO bytes, little-endian
    pub fn dma_read_word(&mut self) -> u32 {
        let mut bytes = [0u8; 4];
        for byte in &mut bytes {
            *byte = self.read_data_byte();
        }
        u32::from_le_bytes(bytes)
    }

    /// Queue sector data for readout (test scaffolding / drive model)
    pub fn push_data(&mut self, bytes: &[u8]) {
        self.data_fifo.extend(bytes);
    }

    pub fn data_len(&self) -> usize {
        self.data_fifo.len()
    }
}

impl Default for Cdrom {
    fn default() -> Self {
        Self::new()
    }
}
