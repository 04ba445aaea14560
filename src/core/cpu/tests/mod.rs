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

//! CPU test modules
//!
//! - `basic`: initialization, register file, jumps and branches
//! - `load_delay`: load delay slot pipeline
//! - `exceptions`: exception mechanism, traps, delay-slot rollback
//! - `arithmetic`: overflow and divider edge cases
//! - `memory_ops`: loads/stores through the Bus, unaligned helpers
//! - `interrupts`: interrupt polling against the Bus
//! - `timing`: per-step cycle charges

mod basic;
mod exceptions;
mod memory_ops;

use super::CPU;
use crate::core::memory::Bus;

/// Default location test programs are assembled at (KSEG0 RAM)
pub(super) const PROGRAM_BASE: u32 = 0x80001000;

/// Write a program into RAM and point the CPU at it
pub(super) fn load_program(cpu: &mut CPU, bus: &mut Bus, program: &[u32]) {
    for (index, &word) in program.iter().enumerate() {
        bus.write32(PROGRAM_BASE + (index as u32) * 4, word)
            .expect("program fits in RAM");
    }
    bus.take_access_cycles();
    cpu.set_pc(PROGRAM_BASE);
}

/// Step `count` instructions, panicking on fatal errors
pub(super) fn run_steps(cpu: &mut CPU, bus: &mut Bus, count: usize) {
    for _ in 0..count {
        cpu.step(bus).expect("program executes without fatal errors");
    }
}
