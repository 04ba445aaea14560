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

//! DMA (Direct Memory Access) Controller
//!
//! Seven channels move bulk data between RAM and the peripherals
//! without CPU intervention. Each channel is dedicated to one device:
//!
//! | Channel | Device      | Base Address |
//! |---------|-------------|--------------|
//! | 0       | MDEC In     | 0x1F801080   |
//! | 1       | MDEC Out    | 0x1F801090   |
//! | 2       | GPU         | 0x1F8010A0   |
//! | 3       | CD-ROM     | 0x1F8010B0   |
//! | 4       | SPU         | 0x1F8010C0   |
//! | 5       | PIO         | 0x1F8010D0   |
//! | 6       | OTC         | 0x1F8010E0   |
//!
//! Per channel: **MADR** (+0x0) base address, **BCR** (+0x4) block
//! size/count, **CHCR** (+0x8) control. Globally: **DPCR** (0x70)
//! priorities and **DICR** (0x74) interrupt control.
//!
//! A channel activates when its start bit is set and, for Manual sync,
//! the trigger bit too. Two transfer algorithms exist: a block copy
//! (Manual/Request sync, with per-port specialization) and a
//! linked-list walk (GPU only). Completion raises the per-channel DICR
//! pending bit; a false-to-true transition of the aggregate master
//! flag schedules one deferred Bus interrupt.
//!
//! MMIO register writes land here synchronously, but transfers run at
//! the next instruction boundary when the System services the pending
//! set. DMA bus traffic bypasses CPU cycle accounting.

use crate::core::interrupt::Irq;
use crate::core::memory::Bus;
use crate::core::scheduler::Scheduler;

#[cfg(test)]
mod tests;

/// Cycles between a transfer completing and the IRQ reaching ISTAT
const IRQ_DELAY: u64 = 1000;

/// Channel ports, by channel number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Port {
    MdecIn = 0,
    MdecOut = 1,
    Gpu = 2,
    Cdrom = 3,
    Spu = 4,
    Pio = 5,
    Otc = 6,
}

impl Port {
    fn from_index(index: u32) -> Self {
        match index {
            0 => Port::MdecIn,
            1 => Port::MdecOut,
            2 => Port::Gpu,
            3 => Port::Cdrom,
            4 => Port::Spu,
            5 => Port::Pio,
            _ => Port::Otc,
        }
    }
}

/// Transfer synchronization mode (CHCR bits 9-10)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Whole transfer at once, started by the trigger bit
    #[default]
    Manual,
    /// Block-at-a-time, paced by device requests
    Request,
    /// Follow a chain of headers in RAM (GPU only)
    LinkedList,
}

/// Transfer direction (CHCR bit 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    ToRam,
    FromRam,
}

/// Address step (CHCR bit 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressStep {
    #[default]
    Increment,
    Decrement,
}

/// One DMA channel's decoded register state
#[derive(Debug, Clone, Copy, Default)]
pub struct Channel {
    direction: Direction,
    step: AddressStep,
    sync: SyncMode,

    /// Chopping: part of the register image, no effect on transfers
    chop: bool,
    chop_dma_size: u8,
    chop_cpu_size: u8,

    start: bool,
    trigger: bool,

    /// MADR: RAM base address (24-bit)
    base: u32,

    /// BCR low half: words per block
    block_size: u16,

    /// BCR high half: number of blocks (Request sync)
    block_count: u16,
}

impl Channel {
    /// CHCR read-back, reassembled from the decoded fields
    fn control(&self) -> u32 {
        let mut value = 0;
        value |= match self.direction {
            Direction::ToRam => 0,
            Direction::FromRam => 1,
        };
        value |= match self.step {
            AddressStep::Increment => 0,
            AddressStep::Decrement => 1 << 1,
        };
        if self.chop {
            value |= 1 << 8;
        }
        value |= match self.sync {
            SyncMode::Manual => 0,
            SyncMode::Request => 1 << 9,
            SyncMode::LinkedList => 2 << 9,
        };
        value |= (self.chop_dma_size as u32) << 16;
        value |= (self.chop_cpu_size as u32) << 20;
        if self.start {
            value |= 1 << 24;
        }
        if self.trigger {
            value |= 1 << 28;
        }
        value
    }

    fn set_control(&mut self, value: u32) {
        self.direction = if value & 1 != 0 {
            Direction::FromRam
        } else {
            Direction::ToRam
        };
        self.step = if value & (1 << 1) != 0 {
            AddressStep::Decrement
        } else {
            AddressStep::Increment
        };
        self.chop = value & (1 << 8) != 0;
        self.sync = match (value >> 9) & 3 {
            0 => SyncMode::Manual,
            1 => SyncMode::Request,
            _ => SyncMode::LinkedList,
        };
        self.chop_dma_size = ((value >> 16) & 7) as u8;
        self.chop_cpu_size = ((value >> 20) & 7) as u8;
        self.start = value & (1 << 24) != 0;
        self.trigger = value & (1 << 28) != 0;
    }

    /// Activation rule: start, plus trigger for Manual sync
    fn active(&self) -> bool {
        let triggered = match self.sync {
            SyncMode::Manual => self.trigger,
            _ => true,
        };
        self.start && triggered
    }

    /// Words to move for a block copy
    fn transfer_size(&self) -> u32 {
        match self.sync {
            SyncMode::Manual => self.block_size as u32,
            SyncMode::Request => self.block_size as u32 * self.block_count as u32,
            // Linked-list transfers are bounded by the end marker
            SyncMode::LinkedList => 0,
        }
    }
}

/// DICR: per-channel and master interrupt control
#[derive(Debug, Clone, Copy, Default)]
struct InterruptRegister {
    force_irq: bool,
    /// Per-channel IRQ enable (bits 16-22)
    enable: u8,
    master_enable: bool,
    /// Per-channel IRQ pending (bits 24-30)
    pending: u8,
    master_flag: bool,
}

impl InterruptRegister {
    fn read(&self) -> u32 {
        let mut value = 0;
        value |= (self.force_irq as u32) << 15;
        value |= (self.enable as u32) << 16;
        value |= (self.master_enable as u32) << 23;
        value |= (self.pending as u32) << 24;
        value |= (self.master_flag as u32) << 31;
        value
    }
}

/// DMA controller: 7 channels, DPCR, DICR
pub struct DMA {
    channels: [Channel; 7],

    /// DPCR: channel priorities/enables (register image only)
    control: u32,

    dicr: InterruptRegister,

    /// Channels whose activation is awaiting service, as a bitmask
    pending_channels: u8,

    /// A DICR master-flag edge happened; one deferred IRQ is owed
    irq_edge: bool,
}

impl DMA {
    /// Power-on DPCR value: channel priorities in order
    const DPCR_RESET: u32 = 0x0765_4321;

    pub fn new() -> Self {
        Self {
            channels: [Channel::default(); 7],
            control: Self::DPCR_RESET,
            dicr: InterruptRegister::default(),
            pending_channels: 0,
            irq_edge: false,
        }
    }

    pub fn reset(&mut self) {
        self.channels = [Channel::default(); 7];
        self.control = Self::DPCR_RESET;
        self.dicr = InterruptRegister::default();
        self.pending_channels = 0;
        self.irq_edge = false;
    }

    // === Register file ===

    /// 32-bit register read at an offset inside the DMA window
    pub fn read32(&self, offset: u32) -> u32 {
        match offset {
            0x70 => return self.control,
            0x74 => return self.dicr.read(),
            _ => {}
        }

        let channel = &self.channels[((offset & 0x70) >> 4) as usize];
        match offset & 0xF {
            0x0 => channel.base,
            0x4 => channel.block_size as u32 | ((channel.block_count as u32) << 16),
            0x8 => channel.control(),
            _ => {
                log::warn!("Unhandled DMA read32 at offset 0x{:02X}", offset);
                0
            }
        }
    }

    /// 32-bit register write at an offset inside the DMA window
    pub fn write32(&mut self, offset: u32, value: u32) {
        match offset {
            0x70 => {
                self.control = value;
                return;
            }
            0x74 => {
                self.dicr.force_irq = value & (1 << 15) != 0;
                self.dicr.enable = ((value >> 16) & 0x7F) as u8;
                self.dicr.master_enable = value & (1 << 23) != 0;
                // Pending bits acknowledge by writing 1
                self.dicr.pending &= !((value >> 24) as u8) & 0x7F;
                self.check_irq();
                return;
            }
            _ => {}
        }

        let index = (offset & 0x70) >> 4;
        let channel = &mut self.channels[index as usize];
        match offset & 0xF {
            0x0 => channel.base = value & 0xFF_FFFF,
            0x4 => {
                channel.block_size = value as u16;
                channel.block_count = (value >> 16) as u16;
            }
            0x8 => {
                channel.set_control(value);
                if channel.active() {
                    self.pending_channels |= 1 << index;
                    log::trace!("DMA{} activation pending", index);
                }
            }
            _ => log::warn!(
                "Unhandled DMA write32 at offset 0x{:02X} = 0x{:08X}",
                offset,
                value
            ),
        }
    }

    /// Byte write into the DICR register
    pub fn write8(&mut self, offset: u32, value: u8) {
        if !(0x74..0x78).contains(&offset) {
            log::warn!(
                "Unhandled DMA write8 at offset 0x{:02X} = 0x{:02X}",
                offset,
                value
            );
            return;
        }
        match offset & 3 {
            1 => self.dicr.force_irq = value & 0x80 != 0,
            2 => {
                self.dicr.enable = value & 0x7F;
                self.dicr.master_enable = value & 0x80 != 0;
            }
            3 => self.dicr.pending &= !value & 0x7F,
            _ => {}
        }
        self.check_irq();
    }

    // === Service ===

    /// Whether the System driver has work to do here
    pub fn needs_service(&self) -> bool {
        self.pending_channels != 0 || self.irq_edge
    }

    /// Run pending transfers and deliver the owed deferred interrupt
    ///
    /// Called by the System at the instruction boundary after the
    /// activating register write.
    pub fn service(&mut self, bus: &mut Bus, scheduler: &mut Scheduler) {
        while self.pending_channels != 0 {
            let index = self.pending_channels.trailing_zeros();
            self.pending_channels &= !(1 << index);

            let port = Port::from_index(index);
            if self.channels[index as usize].active() {
                self.run_channel(port, bus);
            }
        }

        if self.irq_edge {
            self.irq_edge = false;
            scheduler.schedule_interrupt(IRQ_DELAY, Irq::Dma);
        }
    }

    fn run_channel(&mut self, port: Port, bus: &mut Bus) {
        let channel = self.channels[port as usize];
        log::debug!(
            "DMA{} transfer: base=0x{:06X} bcr={}x{} chcr=0x{:08X}",
            port as u32,
            channel.base,
            channel.block_count,
            channel.block_size,
            channel.control()
        );

        if channel.sync == SyncMode::LinkedList {
            self.linked_list_copy(port, bus);
        } else {
            self.block_copy(port, bus);
        }
    }

    /// Straight block copy between RAM and a peripheral port
    ///
    /// The OTC channel ignores its direction bits and always builds the
    /// reversed free-list the firmware uses to seed the GPU command
    /// queue.
    fn block_copy(&mut self, port: Port, bus: &mut Bus) {
        let channel = self.channels[port as usize];
        let step: i32 = match channel.step {
            AddressStep::Increment => 4,
            AddressStep::Decrement => -4,
        };

        let mut address = channel.base & 0xFF_FFFF;
        let mut remaining = channel.transfer_size();

        while remaining > 0 {
            let target = address & 0x1F_FFFC;

            match channel.direction {
                Direction::ToRam => {
                    let value = match port {
                        Port::Otc => {
                            if remaining == 1 {
                                // End-of-table marker
                                0xFF_FFFF
                            } else {
                                target.wrapping_sub(4) & 0x1F_FFFC
                            }
                        }
                        Port::Gpu => bus.gpu_read_data(),
                        Port::Cdrom => bus.cdrom_dma_read_word(),
                        Port::Spu => {
                            let low = bus.spu_dma_read16() as u32;
                            let high = bus.spu_dma_read16() as u32;
                            low | (high << 16)
                        }
                        _ => {
                            log::warn!("DMA{} read port not wired", port as u32);
                            0
                        }
                    };
                    bus.dma_write32(target, value);
                }
                Direction::FromRam => {
                    let value = bus.dma_read32(target);
                    match port {
                        Port::Gpu => bus.gpu_write_gp0(value),
                        Port::Spu => {
                            bus.spu_dma_push16(value as u16);
                            bus.spu_dma_push16((value >> 16) as u16);
                        }
                        _ => log::warn!("DMA{} write port not wired", port as u32),
                    }
                }
            }

            address = address.wrapping_add(step as u32);
            remaining -= 1;
        }

        self.transfer_finished(port);
    }

    /// Walk a chain of command nodes in RAM, feeding the GPU port
    ///
    /// Node header: payload word count in the top byte, end-of-chain
    /// flag in bit 23, next-node address in the low bits.
    fn linked_list_copy(&mut self, port: Port, bus: &mut Bus) {
        debug_assert_eq!(port, Port::Gpu, "linked-list sync is GPU-only");
        if port != Port::Gpu {
            log::warn!("DMA{} linked-list transfer ignored", port as u32);
            self.transfer_finished(port);
            return;
        }

        let mut address = self.channels[port as usize].base & 0x1F_FFFC;
        loop {
            let header = bus.dma_read32(address);
            let mut words = header >> 24;

            while words > 0 {
                address = (address + 4) & 0x1F_FFFC;
                let value = bus.dma_read32(address);
                bus.gpu_write_gp0(value);
                words -= 1;
            }

            if header & 0x80_0000 != 0 {
                break;
            }
            address = header & 0x1F_FFFC;
        }

        self.transfer_finished(port);
    }

    /// Completion: clear start/trigger, raise the DICR pending bit
    fn transfer_finished(&mut self, port: Port) {
        let channel = &mut self.channels[port as usize];
        channel.start = false;
        channel.trigger = false;

        if self.dicr.enable & (1 << port as u8) != 0 {
            self.dicr.pending |= 1 << port as u8;
            self.check_irq();
        }
    }

    /// Recompute the master flag; an edge owes one deferred interrupt
    fn check_irq(&mut self) {
        let previous = self.dicr.master_flag;
        self.dicr.master_flag = self.dicr.force_irq
            || (self.dicr.master_enable && (self.dicr.enable & self.dicr.pending) != 0);

        if !previous && self.dicr.master_flag {
            self.irq_edge = true;
        }
    }

    // === Introspection ===

    pub fn channel_control(&self, index: usize) -> u32 {
        self.channels[index].control()
    }

    pub fn interrupt_register(&self) -> u32 {
        self.dicr.read()
    }
}

impl Default for DMA {
    fn default() -> Self {
        Self::new()
    }
}
