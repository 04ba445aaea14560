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

//! DMA test modules
//!
//! - `basic`: register file, activation gating
//! - `transfers`: block copy and linked-list algorithms per port
//! - `interrupts`: DICR edge behavior and deferred delivery

mod transfers;

use super::DMA;
use crate::core::memory::Bus;
use crate::core::scheduler::Scheduler;

/// Offset of a channel register inside the DMA window
pub(super) fn madr(channel: u32) -> u32 {
    channel * 0x10
}

pub(super) fn bcr(channel: u32) -> u32 {
    channel * 0x10 + 0x4
}

pub(super) fn chcr(channel: u32) -> u32 {
    channel * 0x10 + 0x8
}

/// Drive pending DMA work the way the System does between instructions
pub(super) fn service(dma: &mut DMA, bus: &mut Bus, scheduler: &mut Scheduler) {
    if dma.needs_service() {
        dma.service(bus, scheduler);
    }
}
