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

//! Memory bus
//!
//! The Bus is the single point of access control for the whole
//! addressable range. Every CPU or DMA access goes through it:
//!
//! 1. the top 3 address bits select a region mask that collapses the
//!    KUSEG/KSEG0/KSEG1 mirrors onto one physical range;
//! 2. the fastmem page table (top 16 bits) answers "plain RAM/ROM" in
//!    one lookup and serves the access straight from the owned buffer;
//! 3. misses check the scratchpad window, then walk the named
//!    peripheral register ranges with width-specific decode;
//! 4. accesses nobody claims are logged and answered with a benign
//!    default so the machine keeps running with partial peripheral
//!    coverage.
//!
//! # Memory Map
//!
//! | Physical Address Range | Region       | Size   | Access |
//! |------------------------|--------------|--------|--------|
//! | 0x00000000-0x001FFFFF  | RAM          | 2MB    | R/W    |
//! | 0x1F800000-0x1F8003FF  | Scratchpad   | 1KB    | R/W    |
//! | 0x1F801000-0x1F802FFF  | I/O Ports    | 8KB    | R/W    |
//! | 0x1FC00000-0x1FC7FFFF  | BIOS ROM     | 512KB  | R only |
//!
//! # Example
//!
//! ```
//! use station_core::core::memory::Bus;
//!
//! let mut bus = Bus::new();
//!
//! // Write to RAM via KSEG0
//! bus.write32(0x80000000, 0x12345678).unwrap();
//!
//! // The other segments mirror the same physical word
//! assert_eq!(bus.read32(0x00000000).unwrap(), 0x12345678);
//! assert_eq!(bus.read32(0xA0000000).unwrap(), 0x12345678);
//! ```

use std::cell::RefCell;
use std::fs::File;
use std::io::Read;
use std::rc::Rc;

use crate::core::cdrom::Cdrom;
use crate::core::dma::DMA;
use crate::core::error::{EmulatorError, Result};
use crate::core::gpu::Gpu;
use crate::core::interrupt::{InterruptControl, Irq};
use crate::core::loader::Executable;
use crate::core::spu::Spu;

mod fastmem;
mod range;
#[cfg(test)]
mod tests;

use fastmem::Page;
pub use range::Range;

/// Cycle cost charged for an ordinary data access
pub const MEM_ACCESS_BIAS: u32 = 1;

/// Cycle cost charged for BIOS-ROM-resident accesses
pub const BIOS_ACCESS_BIAS: u32 = 21;

/// Per-3-bits-of-address masks collapsing the segment mirrors:
/// KUSEG passes through, KSEG0 drops the top bit, KSEG1 drops three.
const REGION_MASK: [u32; 8] = [
    0xFFFF_FFFF,
    0xFFFF_FFFF,
    0xFFFF_FFFF,
    0xFFFF_FFFF,
    0x7FFF_FFFF,
    0x1FFF_FFFF,
    0xFFFF_FFFF,
    0xFFFF_FFFF,
];

#[inline(always)]
fn read_u16(buffer: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buffer[offset], buffer[offset + 1]])
}

#[inline(always)]
fn read_u32(buffer: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        buffer[offset],
        buffer[offset + 1],
        buffer[offset + 2],
        buffer[offset + 3],
    ])
}

#[inline(always)]
fn write_u16(buffer: &mut [u8], offset: usize, value: u16) {
    buffer[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

#[inline(always)]
fn write_u32(buffer: &mut [u8], offset: usize, value: u32) {
    buffer[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

/// Register state of a prepared side-load handed back to the CPU when
/// the shell entry point is reached.
#[derive(Debug, Clone, Copy)]
pub struct SideloadTarget {
    pub pc: u32,
    pub gp: u32,
}

/// Memory bus owning all addressable memory and the MMIO dispatch
pub struct Bus {
    /// Main RAM (2MB), physical 0x00000000-0x001FFFFF
    ram: Vec<u8>,

    /// BIOS ROM (512KB), physical 0x1FC00000-0x1FC7FFFF
    bios: Vec<u8>,

    /// Scratchpad (1KB fast RAM), physical 0x1F800000-0x1F8003FF
    scratchpad: [u8; 1024],

    /// Fastmem page tables, one descriptor per 64KiB page
    read_pages: Vec<Page>,
    write_pages: Vec<Page>,

    /// Memory control register file (0x1F801000, 36 bytes)
    mem_control: [u32; 9],

    /// RAM_SIZE register (0x1F801060)
    ram_size: u32,

    /// Cache control register (0xFFFE0130)
    cache_control: u32,

    /// Mirror of CPU status bit 16: data reads return 0, data writes
    /// are dropped, instruction fetch is unaffected
    cache_isolated: bool,

    /// Aggregated I_STAT/I_MASK pair
    interrupt: InterruptControl,

    /// Cycle charges accumulated since the CPU last drained them
    access_cycles: u32,

    /// Pending PS-X EXE side-load, applied when the shell is reached
    sideload: Option<Executable>,

    /// DMA controller, shared with the System driver which services
    /// channel activations between instructions
    dma: Rc<RefCell<DMA>>,

    // Peripheral register surfaces
    gpu: Gpu,
    cdrom: Cdrom,
    spu: Spu,
}

impl Bus {
    /// RAM size (2MB)
    pub const RAM_SIZE: usize = 2 * 1024 * 1024;

    /// BIOS size (512KB)
    pub const BIOS_SIZE: usize = 512 * 1024;

    /// Scratchpad size (1KB)
    pub const SCRATCHPAD_SIZE: usize = 1024;

    // Peripheral register windows, as the hardware decodes them
    const MEM_CONTROL: Range = Range::new(0x1F801000, 36);
    const PAD_MEMCARD: Range = Range::new(0x1F801040, 15);
    const RAM_SIZE_REG: Range = Range::new(0x1F801060, 4);
    const INTERRUPT_CONTROL: Range = Range::new(0x1F801070, 8);
    const DMA_REGS: Range = Range::new(0x1F801080, 0x7C);
    const TIMERS: Range = Range::new(0x1F801100, 48);
    const CDROM_REGS: Range = Range::new(0x1F801800, 4);
    const GPU_REGS: Range = Range::new(0x1F801810, 8);
    const SPU_REGS: Range = Range::new(0x1F801C00, 640);
    const EXPANSION_1: Range = Range::new(0x1F000000, 0x80_0000);
    const EXPANSION_2: Range = Range::new(0x1F802000, 0x80);
    const CACHE_CONTROL_REG: Range = Range::new(0xFFFE0130, 4);

    pub fn new() -> Self {
        Self {
            ram: vec![0u8; Self::RAM_SIZE],
            bios: vec![0u8; Self::BIOS_SIZE],
            scratchpad: [0u8; Self::SCRATCHPAD_SIZE],
            read_pages: fastmem::build_read_pages(),
            write_pages: fastmem::build_write_pages(),
            mem_control: [0; 9],
            ram_size: 0,
            cache_control: 0,
            cache_isolated: false,
            interrupt: InterruptControl::new(),
            access_cycles: 0,
            sideload: None,
            dma: Rc::new(RefCell::new(DMA::new())),
            gpu: Gpu::new(),
            cdrom: Cdrom::new(),
            spu: Spu::new(),
        }
    }

    /// Reset to power-on state
    ///
    /// Buffers are zeroed in place, not reallocated; the loaded BIOS
    /// image and the prepared side-load survive a reset.
    pub fn reset(&mut self) {
        self.ram.fill(0);
        self.scratchpad.fill(0);
        self.mem_control = [0; 9];
        self.ram_size = 0;
        self.cache_control = 0;
        self.cache_isolated = false;
        self.interrupt.reset();
        self.access_cycles = 0;
        self.gpu.reset();
        self.cdrom.reset();
        self.spu.reset();
    }

    /// Collapse the three virtual mirrors onto the physical range
    #[inline(always)]
    pub fn mask(address: u32) -> u32 {
        address & REGION_MASK[(address >> 29) as usize]
    }

    // === BIOS / side-load ===

    /// Load a BIOS ROM image from a file
    ///
    /// The file must be exactly 512KB.
    pub fn load_bios(&mut self, path: &str) -> Result<()> {
        let mut file =
            File::open(path).map_err(|_| EmulatorError::BiosNotFound(path.to_string()))?;

        let metadata = file.metadata()?;
        if metadata.len() != Self::BIOS_SIZE as u64 {
            return Err(EmulatorError::InvalidBiosSize {
                expected: Self::BIOS_SIZE,
                got: metadata.len() as usize,
            });
        }

        file.read_exact(&mut self.bios)?;
        log::info!("BIOS loaded from {}", path);
        Ok(())
    }

    /// Install a BIOS image from memory (same size contract)
    pub fn load_bios_image(&mut self, image: &[u8]) -> Result<()> {
        if image.len() != Self::BIOS_SIZE {
            return Err(EmulatorError::InvalidBiosSize {
                expected: Self::BIOS_SIZE,
                got: image.len(),
            });
        }
        self.bios.copy_from_slice(image);
        Ok(())
    }

    /// Stage a PS-X EXE to be injected once the BIOS shell is reached
    pub fn prepare_sideload(&mut self, exe: Executable) {
        log::info!(
            "Side-load staged: entry=0x{:08X} load=0x{:08X} size={}",
            exe.pc,
            exe.load_address,
            exe.data.len()
        );
        self.sideload = Some(exe);
    }

    /// Copy the staged executable into RAM and hand back its entry state
    ///
    /// Called by the CPU when PC reaches the shell entry point.
    pub fn apply_sideload(&mut self) -> Option<SideloadTarget> {
        let exe = self.sideload.take()?;
        let base = Self::mask(exe.load_address) as usize;
        let end = base.saturating_add(exe.data.len());
        if end > Self::RAM_SIZE {
            log::warn!(
                "Side-load does not fit in RAM (load=0x{:08X} size={}), skipped",
                exe.load_address,
                exe.data.len()
            );
            return None;
        }
        self.ram[base..end].copy_from_slice(&exe.data);
        Some(SideloadTarget {
            pc: exe.pc,
            gp: exe.gp,
        })
    }

    // === Interrupts ===

    /// Raise an interrupt status bit
    ///
    /// Called by peripherals and by scheduler-deferred events.
    pub fn trigger_interrupt(&mut self, irq: Irq) {
        self.interrupt.trigger(irq);
    }

    /// The single boolean the CPU polls once per instruction step
    #[inline(always)]
    pub fn irq_active(&self) -> bool {
        self.interrupt.irq_active()
    }

    // === Cycle accounting ===

    /// Drain the cycle charges accumulated by accesses since last call
    ///
    /// The CPU folds this into its per-step cycle count; DMA traffic
    /// never lands here.
    #[inline(always)]
    pub fn take_access_cycles(&mut self) -> u32 {
        std::mem::take(&mut self.access_cycles)
    }

    /// Mirror of CPU status bit 16, maintained by the MTC0 handler
    pub fn set_cache_isolated(&mut self, isolated: bool) {
        if isolated != self.cache_isolated {
            log::debug!("cache isolation {}", if isolated { "on" } else { "off" });
        }
        self.cache_isolated = isolated;
    }

    pub fn cache_isolated(&self) -> bool {
        self.cache_isolated
    }

    // === Instruction fetch ===

    /// Fetch one instruction word
    ///
    /// Fetch bypasses cache isolation and only ever hits the fastmem
    /// path; ROM-resident fetches charge the larger access bias. The
    /// CPU checks PC alignment before calling.
    pub fn fetch(&mut self, address: u32) -> u32 {
        let page = self.read_pages[(address >> 16) as usize];
        let offset = address & 0xFFFF;

        self.access_cycles += match page {
            Page::Bios(_) => BIOS_ACCESS_BIAS,
            _ => MEM_ACCESS_BIAS,
        };

        match page {
            Page::Ram(base) => read_u32(&self.ram, (base + offset) as usize),
            Page::Bios(base) => read_u32(&self.bios, (base + offset) as usize),
            Page::Open => {
                log::warn!("Instruction fetch outside RAM/ROM at 0x{:08X}", address);
                0
            }
        }
    }

    // === Data reads ===

    /// Resolve the scratchpad window, rejecting the uncached mirror
    ///
    /// Scratchpad is reachable through KUSEG and KSEG0 only; touching
    /// it through KSEG1 is an emulator-fatal configuration error, not
    /// a guest fault.
    fn scratchpad_offset(&self, address: u32) -> Result<Option<usize>> {
        let page = address >> 16;
        let offset = (address & 0xFFFF) as usize;
        if offset < Self::SCRATCHPAD_SIZE {
            if page == 0x1F80 || page == 0x9F80 {
                return Ok(Some(offset));
            }
            if page == 0xBF80 {
                return Err(EmulatorError::ScratchpadMirror { address });
            }
        }
        Ok(None)
    }

    pub fn read8(&mut self, address: u32) -> Result<u8> {
        if self.cache_isolated {
            return Ok(0);
        }
        let page = self.read_pages[(address >> 16) as usize];
        let offset = address & 0xFFFF;
        self.access_cycles += match page {
            Page::Bios(_) => BIOS_ACCESS_BIAS,
            _ => MEM_ACCESS_BIAS,
        };

        match page {
            Page::Ram(base) => Ok(self.ram[(base + offset) as usize]),
            Page::Bios(base) => Ok(self.bios[(base + offset) as usize]),
            Page::Open => {
                if let Some(offset) = self.scratchpad_offset(address)? {
                    return Ok(self.scratchpad[offset]);
                }
                Ok(self.io_read8(Self::mask(address)))
            }
        }
    }

    pub fn read16(&mut self, address: u32) -> Result<u16> {
        if self.cache_isolated {
            return Ok(0);
        }
        let page = self.read_pages[(address >> 16) as usize];
        let offset = address & 0xFFFF;
        self.access_cycles += match page {
            Page::Bios(_) => BIOS_ACCESS_BIAS,
            _ => MEM_ACCESS_BIAS,
        };

        match page {
            Page::Ram(base) => Ok(read_u16(&self.ram, (base + offset) as usize)),
            Page::Bios(base) => Ok(read_u16(&self.bios, (base + offset) as usize)),
            Page::Open => {
                if let Some(offset) = self.scratchpad_offset(address)? {
                    return Ok(read_u16(&self.scratchpad, offset));
                }
                Ok(self.io_read16(Self::mask(address)))
            }
        }
    }

    pub fn read32(&mut self, address: u32) -> Result<u32> {
        if self.cache_isolated {
            return Ok(0);
        }
        let page = self.read_pages[(address >> 16) as usize];
        let offset = address & 0xFFFF;
        self.access_cycles += match page {
            Page::Bios(_) => BIOS_ACCESS_BIAS,
            _ => MEM_ACCESS_BIAS,
        };

        match page {
            Page::Ram(base) => Ok(read_u32(&self.ram, (base + offset) as usize)),
            Page::Bios(base) => Ok(read_u32(&self.bios, (base + offset) as usize)),
            Page::Open => {
                if let Some(offset) = self.scratchpad_offset(address)? {
                    return Ok(read_u32(&self.scratchpad, offset));
                }
                Ok(self.io_read32(Self::mask(address)))
            }
        }
    }

    // === Data writes ===

    pub fn write8(&mut self, address: u32, value: u8) -> Result<()> {
        if self.cache_isolated {
            return Ok(());
        }
        self.access_cycles += MEM_ACCESS_BIAS;

        match self.write_pages[(address >> 16) as usize] {
            Page::Ram(base) => {
                self.ram[(base + (address & 0xFFFF)) as usize] = value;
                Ok(())
            }
            Page::Bios(_) => Ok(()),
            Page::Open => {
                if let Some(offset) = self.scratchpad_offset(address)? {
                    self.scratchpad[offset] = value;
                    return Ok(());
                }
                self.io_write8(Self::mask(address), value);
                Ok(())
            }
        }
    }

    pub fn write16(&mut self, address: u32, value: u16) -> Result<()> {
        if self.cache_isolated {
            return Ok(());
        }
        self.access_cycles += MEM_ACCESS_BIAS;

        match self.write_pages[(address >> 16) as usize] {
            Page::Ram(base) => {
                write_u16(&mut self.ram, (base + (address & 0xFFFF)) as usize, value);
                Ok(())
            }
            Page::Bios(_) => Ok(()),
            Page::Open => {
                if let Some(offset) = self.scratchpad_offset(address)? {
                    write_u16(&mut self.scratchpad, offset, value);
                    return Ok(());
                }
                self.io_write16(Self::mask(address), value);
                Ok(())
            }
        }
    }

    pub fn write32(&mut self, address: u32, value: u32) -> Result<()> {
        if self.cache_isolated {
            return Ok(());
        }
        self.access_cycles += MEM_ACCESS_BIAS;

        match self.write_pages[(address >> 16) as usize] {
            Page::Ram(base) => {
                write_u32(&mut self.ram, (base + (address & 0xFFFF)) as usize, value);
                Ok(())
            }
            Page::Bios(_) => Ok(()),
            Page::Open => {
                if let Some(offset) = self.scratchpad_offset(address)? {
                    write_u32(&mut self.scratchpad, offset, value);
                    return Ok(());
                }
                self.io_write32(Self::mask(address), value);
                Ok(())
            }
        }
    }

    // === DMA word path ===
    //
    // DMA bus traffic does not contend with CPU accesses in the timing
    // model: these resolve through the page tables but charge nothing
    // and ignore cache isolation.

    pub fn dma_read32(&mut self, address: u32) -> u32 {
        let offset = address & 0xFFFF;
        match self.read_pages[(address >> 16) as usize] {
            Page::Ram(base) => read_u32(&self.ram, (base + offset) as usize),
            Page::Bios(base) => read_u32(&self.bios, (base + offset) as usize),
            Page::Open => {
                log::warn!("DMA read outside RAM/ROM at 0x{:08X}", address);
                0
            }
        }
    }

    pub fn dma_write32(&mut self, address: u32, value: u32) {
        match self.write_pages[(address >> 16) as usize] {
            Page::Ram(base) => {
                write_u32(&mut self.ram, (base + (address & 0xFFFF)) as usize, value)
            }
            _ => log::warn!("DMA write outside RAM at 0x{:08X}", address),
        }
    }

    // === MMIO dispatch, 8-bit ===

    fn io_read8(&mut self, hw_address: u32) -> u8 {
        if Self::INTERRUPT_CONTROL.contains(hw_address) {
            let offset = Self::INTERRUPT_CONTROL.offset(hw_address);
            return if offset == 0 {
                self.interrupt.read_status() as u8
            } else {
                self.interrupt.read_mask() as u8
            };
        }
        if Self::CACHE_CONTROL_REG.contains(hw_address) {
            return self.cache_control as u8;
        }
        if Self::CDROM_REGS.contains(hw_address) {
            let offset = Self::CDROM_REGS.offset(hw_address);
            // Offset 2 is the data FIFO; the rest of the drive's
            // register file lives outside this core
            return if offset == 2 {
                self.cdrom.read_data_byte()
            } else {
                log::trace!("CDROM read8 at offset {} (stubbed)", offset);
                0
            };
        }
        if Self::PAD_MEMCARD.contains(hw_address) {
            log::trace!("PAD read8 at 0x{:08X} (stubbed)", hw_address);
            return 0;
        }
        if Self::EXPANSION_1.contains(hw_address) || Self::EXPANSION_2.contains(hw_address) {
            // Open bus: no expansion hardware present
            return 0xFF;
        }
        log::warn!("Unknown read8 at address 0x{:08X}", hw_address);
        0
    }

    fn io_write8(&mut self, hw_address: u32, value: u8) {
        if Self::INTERRUPT_CONTROL.contains(hw_address) {
            let offset = Self::INTERRUPT_CONTROL.offset(hw_address);
            if offset == 0 {
                self.interrupt.write_status(value as u32);
            } else {
                self.interrupt.write_mask(value as u32);
            }
            return;
        }
        if Self::DMA_REGS.contains(hw_address) {
            self.dma
                .borrow_mut()
                .write8(Self::DMA_REGS.offset(hw_address), value);
            return;
        }
        if Self::CDROM_REGS.contains(hw_address) {
            log::trace!(
                "CDROM write8 at offset {} = 0x{:02X} (stubbed)",
                Self::CDROM_REGS.offset(hw_address),
                value
            );
            return;
        }
        if Self::PAD_MEMCARD.contains(hw_address) || Self::EXPANSION_2.contains(hw_address) {
            return;
        }
        log::warn!(
            "Unknown write8 at address 0x{:08X} = 0x{:02X}",
            hw_address,
            value
        );
    }

    // === MMIO dispatch, 16-bit ===

    fn io_read16(&mut self, hw_address: u32) -> u16 {
        // TEMP TIMER2 STUB: free-running counter value the firmware polls
        if hw_address == 0x1F801120 {
            return 0x16B0;
        }
        if Self::INTERRUPT_CONTROL.contains(hw_address) {
            let offset = Self::INTERRUPT_CONTROL.offset(hw_address);
            return if offset == 0 {
                self.interrupt.read_status()
            } else {
                self.interrupt.read_mask()
            };
        }
        if Self::CACHE_CONTROL_REG.contains(hw_address) {
            return self.cache_control as u16;
        }
        if Self::TIMERS.contains(hw_address) {
            log::trace!("Timer read16 at 0x{:08X} (stubbed)", hw_address);
            return 0;
        }
        if Self::PAD_MEMCARD.contains(hw_address) {
            return 0;
        }
        if Self::SPU_REGS.contains(hw_address) {
            return self.spu.read16(Self::SPU_REGS.offset(hw_address));
        }
        if Self::CDROM_REGS.contains(hw_address) {
            log::trace!("CDROM read16 at 0x{:08X} (stubbed)", hw_address);
            return 0;
        }
        log::warn!("Unknown read16 at address 0x{:08X}", hw_address);
        0
    }

    fn io_write16(&mut self, hw_address: u32, value: u16) {
        if Self::INTERRUPT_CONTROL.contains(hw_address) {
            let offset = Self::INTERRUPT_CONTROL.offset(hw_address);
            if offset == 0 {
                self.interrupt.write_status(value as u32);
            } else {
                self.interrupt.write_mask(value as u32);
            }
            return;
        }
        if Self::PAD_MEMCARD.contains(hw_address) || Self::TIMERS.contains(hw_address) {
            return;
        }
        if Self::SPU_REGS.contains(hw_address) {
            self.spu.write16(Self::SPU_REGS.offset(hw_address), value);
            return;
        }
        log::warn!(
            "Unknown write16 at address 0x{:08X} = 0x{:04X}",
            hw_address,
            value
        );
    }

    // === MMIO dispatch, 32-bit ===

    fn io_read32(&mut self, hw_address: u32) -> u32 {
        if Self::INTERRUPT_CONTROL.contains(hw_address) {
            let offset = Self::INTERRUPT_CONTROL.offset(hw_address);
            return if offset == 0 {
                self.interrupt.read_status() as u32
            } else {
                self.interrupt.read_mask() as u32
            };
        }
        if Self::CACHE_CONTROL_REG.contains(hw_address) {
            return self.cache_control;
        }
        if Self::TIMERS.contains(hw_address) {
            log::trace!("Timer read32 at 0x{:08X} (stubbed)", hw_address);
            return 0;
        }
        if Self::MEM_CONTROL.contains(hw_address) {
            return self.mem_control[(Self::MEM_CONTROL.offset(hw_address) / 4) as usize];
        }
        if Self::RAM_SIZE_REG.contains(hw_address) {
            return self.ram_size;
        }
        if Self::DMA_REGS.contains(hw_address) {
            return self.dma.borrow().read32(Self::DMA_REGS.offset(hw_address));
        }
        if Self::GPU_REGS.contains(hw_address) {
            return if Self::GPU_REGS.offset(hw_address) == 0 {
                self.gpu.read_data()
            } else {
                self.gpu.status()
            };
        }
        if Self::PAD_MEMCARD.contains(hw_address) {
            return 0;
        }
        log::warn!("Unknown read32 at address 0x{:08X}", hw_address);
        0
    }

    fn io_write32(&mut self, hw_address: u32, value: u32) {
        if Self::INTERRUPT_CONTROL.contains(hw_address) {
            let offset = Self::INTERRUPT_CONTROL.offset(hw_address);
            if offset == 0 {
                self.interrupt.write_status(value);
            } else {
                self.interrupt.write_mask(value);
            }
            return;
        }
        if Self::TIMERS.contains(hw_address) {
            return;
        }
        if Self::MEM_CONTROL.contains(hw_address) {
            self.mem_control[(Self::MEM_CONTROL.offset(hw_address) / 4) as usize] = value;
            return;
        }
        if Self::RAM_SIZE_REG.contains(hw_address) {
            self.ram_size = value;
            return;
        }
        if Self::CACHE_CONTROL_REG.contains(hw_address) {
            self.cache_control = value;
            return;
        }
        if Self::DMA_REGS.contains(hw_address) {
            self.dma
                .borrow_mut()
                .write32(Self::DMA_REGS.offset(hw_address), value);
            return;
        }
        if Self::GPU_REGS.contains(hw_address) {
            if Self::GPU_REGS.offset(hw_address) == 0 {
                self.gpu.write_gp0(value);
            } else {
                self.gpu.write_gp1(value);
            }
            return;
        }
        if Self::EXPANSION_1.contains(hw_address) {
            return;
        }
        log::warn!(
            "Unknown write32 at address 0x{:08X} = 0x{:08X}",
            hw_address,
            value
        );
    }

    // === Peripheral ports and handles ===

    /// DMA controller handle for the System driver
    pub fn dma(&self) -> Rc<RefCell<DMA>> {
        Rc::clone(&self.dma)
    }

    pub(crate) fn gpu_write_gp0(&mut self, word: u32) {
        self.gpu.write_gp0(word);
    }

    pub(crate) fn gpu_read_data(&mut self) -> u32 {
        self.gpu.read_data()
    }

    pub(crate) fn cdrom_dma_read_word(&mut self) -> u32 {
        self.cdrom.dma_read_word()
    }

    pub(crate) fn spu_dma_read16(&mut self) -> u16 {
        self.spu.dma_read16()
    }

    pub(crate) fn spu_dma_push16(&mut self, half: u16) {
        self.spu.dma_push16(half);
    }

    pub fn gpu_mut(&mut self) -> &mut Gpu {
        &mut self.gpu
    }

    pub fn cdrom_mut(&mut self) -> &mut Cdrom {
        &mut self.cdrom
    }

    pub fn spu_mut(&mut self) -> &mut Spu {
        &mut self.spu
    }

    // === Raw buffer access for the bulk loaders ===

    pub fn ram(&self) -> &[u8] {
        &self.ram
    }

    pub fn ram_mut(&mut self) -> &mut [u8] {
        &mut self.ram
    }

    pub fn bios(&self) -> &[u8] {
        &self.bios
    }

    /// Write directly into the BIOS image (test helper)
    #[cfg(test)]
    pub(crate) fn write_bios_for_test(&mut self, offset: usize, data: &[u8]) {
        let end = offset + data.len();
        assert!(
            end <= Self::BIOS_SIZE,
            "BIOS write out of bounds: offset={}, len={}",
            offset,
            data.len()
        );
        self.bios[offset..end].copy_from_slice(data);
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}
