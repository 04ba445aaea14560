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

//! System integration
//!
//! Ties the CPU, Bus, Scheduler and DMA controller together and runs
//! the main loop: step the CPU until the scheduler's next deadline,
//! drain due events through the typed dispatcher, repeat until the
//! frame's VBlank fires.

use std::cell::RefCell;
use std::rc::Rc;

use super::cpu::CPU;
use super::dma::DMA;
use super::error::Result;
use super::interrupt::Irq;
use super::loader::Executable;
use super::memory::Bus;
use super::scheduler::{EventKind, Scheduler};

#[cfg(test)]
mod tests;

/// CPU cycles per video frame (NTSC: 33.8688 MHz / 60 Hz)
pub const CYCLES_PER_FRAME: u64 = 564_480;

/// The whole machine
///
/// Components are constructed once and wired by handle at startup; a
/// reset zeroes state in place without reallocating buffers.
///
/// # Example
/// ```no_run
/// use station_core::core::system::System;
///
/// let mut system = System::new();
/// system.load_bios("SCPH1001.BIN").unwrap();
/// system.reset();
/// system.run_frame().unwrap();
/// ```
pub struct System {
    cpu: CPU,
    bus: Bus,
    scheduler: Scheduler,

    /// Shared with the Bus, which dispatches MMIO register access to it
    dma: Rc<RefCell<DMA>>,

    /// Set by the frame event; run_frame runs until it flips
    vblank: bool,

    frames: u64,
}

impl System {
    pub fn new() -> Self {
        let bus = Bus::new();
        let dma = bus.dma();
        let mut scheduler = Scheduler::new();
        scheduler.schedule_event(CYCLES_PER_FRAME, EventKind::VBlank);

        Self {
            cpu: CPU::new(),
            bus,
            scheduler,
            dma,
            vblank: false,
            frames: 0,
        }
    }

    /// Reset every component, as if the console was power-cycled
    ///
    /// The loaded BIOS image survives.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.bus.reset();
        self.scheduler.reset();
        self.dma.borrow_mut().reset();
        self.vblank = false;
        self.frames = 0;
        self.scheduler.schedule_event(CYCLES_PER_FRAME, EventKind::VBlank);
    }

    /// Load a BIOS ROM image (exactly 512KB)
    pub fn load_bios(&mut self, path: &str) -> Result<()> {
        self.bus.load_bios(path)
    }

    /// Stage a PS-X EXE for injection at the BIOS shell entry
    pub fn sideload_exe(&mut self, path: &str) -> Result<()> {
        let exe = Executable::load(path)?;
        self.bus.prepare_sideload(exe);
        Ok(())
    }

    /// Execute one CPU instruction and everything it owes
    ///
    /// Adds the instruction's cycle charge to the shared counter,
    /// services DMA work the instruction activated, and dispatches any
    /// events whose deadline was reached.
    pub fn step(&mut self) -> Result<u32> {
        let cycles = self.cpu.step(&mut self.bus)?;
        self.scheduler.add_cycles(cycles);

        if self.dma.borrow().needs_service() {
            self.service_dma();
        }

        if self.scheduler.target_reached() {
            self.dispatch_events();
        }
        Ok(cycles)
    }

    /// Run until the next VBlank
    ///
    /// The inner loop re-reads the cycle target every iteration: an
    /// event scheduled mid-run (a DMA completion interrupt, say) pulls
    /// the target in and the loop stops in time for it.
    pub fn run_frame(&mut self) -> Result<()> {
        self.vblank = false;

        while !self.vblank {
            while !self.scheduler.target_reached() {
                let cycles = self.cpu.step(&mut self.bus)?;
                self.scheduler.add_cycles(cycles);

                if self.dma.borrow().needs_service() {
                    self.service_dma();
                }
            }
            self.dispatch_events();
        }
        Ok(())
    }

    /// Run pending DMA transfers at the instruction boundary
    fn service_dma(&mut self) {
        let dma = Rc::clone(&self.dma);
        dma.borrow_mut().service(&mut self.bus, &mut self.scheduler);
    }

    /// Resolve due events against the components this driver owns
    fn dispatch_events(&mut self) {
        while let Some(event) = self.scheduler.pop_due() {
            match event {
                EventKind::Interrupt(irq) => self.bus.trigger_interrupt(irq),
                EventKind::VBlank => {
                    self.bus.trigger_interrupt(Irq::VBlank);
                    self.vblank = true;
                    self.frames += 1;
                    // Re-arm for the next frame
                    self.scheduler
                        .schedule_event(CYCLES_PER_FRAME, EventKind::VBlank);
                }
                EventKind::None => {}
            }
        }
    }

    // === Introspection ===

    pub fn pc(&self) -> u32 {
        self.cpu.pc()
    }

    pub fn cycles(&self) -> u64 {
        self.scheduler.cycles()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn cpu(&self) -> &CPU {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut CPU {
        &mut self.cpu
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }
}

impl Default for System {
    fn default() -> Self {
        Self::new()
    }
}
