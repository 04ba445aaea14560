// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut

//! System integration test modules
//!
//! - `execution`: run loop, event dispatch, frame cadence
//! - `dma_integration`: MMIO-driven DMA end to end


use super::System;

/// Assemble a program into RAM and point the CPU at it
pub(super) const PROGRAM_BASE: u32 = 0x80001000;

pub(super) fn load_program(system: &mut System, program: &[u32]) {
    for (index, &word) in program.iter().enumerate() {
        system
            .bus_mut()
            .write32(PROGRAM_BASE + (index as u32) * 4, word)
            .expect("program fits in RAM");
    }
    system.bus_mut().take_access_cycles();
    system.cpu_mut().set_pc(PROGRAM_BASE);
}
