// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut

//! Block copy and linked-list transfer algorithms

use super::super::*;
use super::{bcr, chcr, madr, service};
use crate::core::memory::Bus;
use crate::core::scheduler::Scheduler;

#[test]
fn test_otc_builds_reversed_free_list() {
    let mut dma = DMA::new();
    let mut bus = Bus::new();
    let mut scheduler = Scheduler::new();

    dma.write32(madr(6), 0x1000);
    dma.write32(bcr(6), 4);
    // Manual sync, decrementing, start + trigger
    dma.write32(chcr(6), (1 << 24) | (1 << 28) | (1 << 1));
    service(&mut dma, &mut bus, &mut scheduler);

    assert_eq!(bus.dma_read32(0x1000), 0x0FFC);
    assert_eq!(bus.dma_read32(0x0FFC), 0x0FF8);
    assert_eq!(bus.dma_read32(0x0FF8), 0x0FF4);
    assert_eq!(bus.dma_read32(0x0FF4), 0xFF_FFFF);

    // Completion clears start and trigger
    assert_eq!(dma.read32(chcr(6)) & ((1 << 24) | (1 << 28)), 0);
}

#[test]
fn test_manual_channel_runs_once_trigger_arrives() {
    let mut dma = DMA::new();
    let mut bus = Bus::new();
    let mut scheduler = Scheduler::new();

    dma.write32(madr(6), 0x1000);
    dma.write32(bcr(6), 4);

    // Start without trigger: nothing moves
    dma.write32(chcr(6), (1 << 24) | (1 << 1));
    service(&mut dma, &mut bus, &mut scheduler);
    assert_eq!(bus.dma_read32(0x1000), 0);

    // Trigger with start still set: transfer begins
    dma.write32(chcr(6), (1 << 24) | (1 << 28) | (1 << 1));
    service(&mut dma, &mut bus, &mut scheduler);
    assert_eq!(bus.dma_read32(0x1000), 0x0FFC);
}

#[test]
fn test_gpu_block_copy_from_ram() {
    let mut dma = DMA::new();
    let mut bus = Bus::new();
    let mut scheduler = Scheduler::new();

    bus.dma_write32(0x2000, 0xE1000000);
    bus.dma_write32(0x2004, 0xE2000000);
    bus.dma_write32(0x2008, 0xE3000000);
    bus.dma_write32(0x200C, 0xE4000000);

    dma.write32(madr(2), 0x2000);
    dma.write32(bcr(2), (2 << 16) | 2); // 2 blocks of 2 words
    // Request sync, from RAM, incrementing, start
    dma.write32(chcr(2), (1 << 24) | (1 << 9) | 1);
    service(&mut dma, &mut bus, &mut scheduler);

    let commands: Vec<u32> = bus.gpu_mut().commands().collect();
    assert_eq!(commands, [0xE1000000, 0xE2000000, 0xE3000000, 0xE4000000]);
}

#[test]
fn test_gpu_block_copy_to_ram() {
    let mut dma = DMA::new();
    let mut bus = Bus::new();
    let mut scheduler = Scheduler::new();

    bus.gpu_mut().push_read_data(0x11111111);
    bus.gpu_mut().push_read_data(0x22222222);

    dma.write32(madr(2), 0x3000);
    dma.write32(bcr(2), (1 << 16) | 2);
    // Request sync, to RAM, incrementing, start
    dma.write32(chcr(2), (1 << 24) | (1 << 9));
    service(&mut dma, &mut bus, &mut scheduler);

    assert_eq!(bus.dma_read32(0x3000), 0x11111111);
    assert_eq!(bus.dma_read32(0x3004), 0x22222222);
}

#[test]
fn test_gpu_linked_list_walk() {
    let mut dma = DMA::new();
    let mut bus = Bus::new();
    let mut scheduler = Scheduler::new();

    // Node 1 at 0x1000: two payload words, then link to 0x1100
    bus.dma_write32(0x1000, (2 << 24) | 0x1100);
    bus.dma_write32(0x1004, 0x30000001);
    bus.dma_write32(0x1008, 0x30000002);
    // Node 2 at 0x1100: one payload word, end-of-chain marker
    bus.dma_write32(0x1100, (1 << 24) | 0x80_0000);
    bus.dma_write32(0x1104, 0x30000003);

    dma.write32(madr(2), 0x1000);
    // Linked-list sync, from RAM, start
    dma.write32(chcr(2), (1 << 24) | (2 << 9) | 1);
    service(&mut dma, &mut bus, &mut scheduler);

    let commands: Vec<u32> = bus.gpu_mut().commands().collect();
    assert_eq!(commands, [0x30000001, 0x30000002, 0x30000003]);
    assert_eq!(dma.read32(chcr(2)) & (1 << 24), 0);
}

#[test]
fn test_cdrom_block_copy_to_ram() {
    let mut dma = DMA::new();
    let mut bus = Bus::new();
    let mut scheduler = Scheduler::new();

    bus.cdrom_mut().push_data(&[0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88]);

    dma.write32(madr(3), 0x4000);
    dma.write32(bcr(3), (1 << 16) | 2);
    // Request sync, to RAM, start
    dma.write32(chcr(3), (1 << 24) | (1 << 9));
    service(&mut dma, &mut bus, &mut scheduler);

    assert_eq!(bus.dma_read32(0x4000), 0x44332211);
    assert_eq!(bus.dma_read32(0x4004), 0x88776655);
}

#[test]
fn test_spu_round_trip_through_transfer_fifo() {
    let mut dma = DMA::new();
    let mut bus = Bus::new();
    let mut scheduler = Scheduler::new();

    bus.dma_write32(0x5000, 0xAABB_CCDD);

    // RAM -> SPU: the word is split into two halves
    dma.write32(madr(4), 0x5000);
    dma.write32(bcr(4), (1 << 16) | 1);
    dma.write32(chcr(4), (1 << 24) | (1 << 9) | 1);
    service(&mut dma, &mut bus, &mut scheduler);
    assert_eq!(bus.spu_mut().fifo_len(), 2);

    // SPU -> RAM: the halves reassemble little-endian
    dma.write32(madr(4), 0x5100);
    dma.write32(bcr(4), (1 << 16) | 1);
    dma.write32(chcr(4), (1 << 24) | (1 << 9));
    service(&mut dma, &mut bus, &mut scheduler);
    assert_eq!(bus.dma_read32(0x5100), 0xAABB_CCDD);
}

#[test]
fn test_decrementing_block_copy() {
    let mut dma = DMA::new();
    let mut bus = Bus::new();
    let mut scheduler = Scheduler::new();

    bus.gpu_mut().push_read_data(0x1);
    bus.gpu_mut().push_read_data(0x2);

    dma.write32(madr(2), 0x2004);
    dma.write32(bcr(2), (1 << 16) | 2);
    // To RAM, decrementing
    dma.write32(chcr(2), (1 << 24) | (1 << 9) | (1 << 1));
    service(&mut dma, &mut bus, &mut scheduler);

    assert_eq!(bus.dma_read32(0x2004), 0x1);
    assert_eq!(bus.dma_read32(0x2000), 0x2);
}

#[test]
fn test_zero_block_size_moves_nothing() {
    let mut dma = DMA::new();
    let mut bus = Bus::new();
    let mut scheduler = Scheduler::new();

    dma.write32(madr(6), 0x1000);
    dma.write32(bcr(6), 0);
    dma.write32(chcr(6), (1 << 24) | (1 << 28) | (1 << 1));
    service(&mut dma, &mut bus, &mut scheduler);

    assert_eq!(bus.dma_read32(0x1000), 0);
    // The channel still completes and clears its start bit
    assert_eq!(dma.read32(chcr(6)) & (1 << 24), 0);
}
