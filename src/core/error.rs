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

/// Emulator error types
use thiserror::Error;

/// Result type for emulator operations
pub type Result<T> = std::result::Result<T, EmulatorError>;

/// Main error type for the emulator
///
/// These are fatal configuration errors: they indicate an emulator
/// defect or unsupported input, never a guest-recoverable condition.
/// Guest-visible faults (alignment, overflow, syscall, interrupt) go
/// through the CPU exception mechanism and never appear here.
#[derive(Error, Debug)]
pub enum EmulatorError {
    #[error("BIOS file not found: {0}")]
    BiosNotFound(String),

    #[error("Invalid BIOS size: {got} bytes (expected {expected})")]
    InvalidBiosSize { expected: usize, got: usize },

    #[error("Unsupported instruction: 0x{instruction:08X} at PC=0x{pc:08X}")]
    UnsupportedInstruction { instruction: u32, pc: u32 },

    #[error("Scratchpad access through uncached mirror at 0x{address:08X}")]
    ScratchpadMirror { address: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Loader error: {0}")]
    Loader(String),
}
