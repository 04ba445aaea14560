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

//! Executable side-loading
//!
//! PS-X EXE files carry a 2048-byte header followed by the code/data
//! image:
//!
//! ```text
//! 0x00-0x07: "PS-X EXE" magic
//! 0x10-0x13: Initial PC (entry point)
//! 0x14-0x17: Initial GP (global pointer)
//! 0x18-0x1B: Load address
//! 0x1C-0x1F: Load size in bytes
//! 0x800+:    Code/data
//! ```
//!
//! A parsed executable is staged on the Bus and injected into RAM once
//! the BIOS shell entry point is reached, mimicking how homebrew is
//! side-loaded on real hardware. BIOS image loading itself lives on
//! the Bus; this module only covers the executable format.

use super::error::{EmulatorError, Result};

/// File offset of the header fields
const HEADER_OFFSET: usize = 0x10;

/// File offset where code/data starts
const DATA_OFFSET: usize = 0x800;

/// Magic bytes at the start of every PS-X EXE
const MAGIC: &[u8; 8] = b"PS-X EXE";

/// A parsed PS-X EXE ready for injection
#[derive(Debug, Clone)]
pub struct Executable {
    /// Entry point
    pub pc: u32,

    /// Initial global pointer (r28)
    pub gp: u32,

    /// RAM address the image is copied to
    pub load_address: u32,

    /// The code/data image
    pub data: Vec<u8>,
}

impl Executable {
    /// Parse a PS-X EXE from raw bytes
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < DATA_OFFSET {
            return Err(EmulatorError::Loader(format!(
                "file too short for a PS-X EXE header: {} bytes",
                bytes.len()
            )));
        }
        if &bytes[0..8] != MAGIC {
            return Err(EmulatorError::Loader("missing PS-X EXE magic".to_string()));
        }

        let field = |index: usize| {
            let offset = HEADER_OFFSET + index * 4;
            u32::from_le_bytes([
                bytes[offset],
                bytes[offset + 1],
                bytes[offset + 2],
                bytes[offset + 3],
            ])
        };
        let pc = field(0);
        let gp = field(1);
        let load_address = field(2);
        let size = field(3) as usize;

        if DATA_OFFSET + size > bytes.len() {
            return Err(EmulatorError::Loader(format!(
                "declared size {} exceeds file contents",
                size
            )));
        }

        Ok(Self {
            pc,
            gp,
            load_address,
            data: bytes[DATA_OFFSET..DATA_OFFSET + size].to_vec(),
        })
    }

    /// Read and parse a PS-X EXE file
    pub fn load(path: &str) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let exe = Self::parse(&bytes)?;
        log::info!(
            "Loaded PS-X EXE: entry=0x{:08X} load=0x{:08X} size={}",
            exe.pc,
            exe.load_address,
            exe.data.len()
        );
        Ok(exe)
    }
}
