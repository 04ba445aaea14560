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

//! Event scheduler
//!
//! A deadline-ordered queue of deferred events keyed by an absolute
//! cycle counter. The counter is shared with the CPU: the CPU adds its
//! per-instruction and per-access cycle charges here, and the run loop
//! steps the CPU until the scheduler's cycle target is reached, then
//! drains due events.
//!
//! Events carry a typed payload (`EventKind`) rather than a callback;
//! the System dispatcher resolves payloads against the component
//! handles it owns. Events with the same target cycle fire in
//! insertion order (stable FIFO). There is no cancellation primitive:
//! a component that wants a scheduled event to become a no-op must
//! guard against stale state when the event is dispatched.
//!
//! # Example
//!
//! ```
//! use station_core::core::scheduler::{EventKind, Scheduler};
//! use station_core::core::interrupt::Irq;
//!
//! let mut scheduler = Scheduler::new();
//! scheduler.schedule_interrupt(100, Irq::VBlank);
//!
//! scheduler.add_cycles(100);
//! assert_eq!(scheduler.pop_due(), Some(EventKind::Interrupt(Irq::VBlank)));
//! assert_eq!(scheduler.pop_due(), None);
//! ```

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::core::interrupt::Irq;

/// Absolute cycle count since reset
pub type Cycles = u64;

/// Typed event payload
///
/// `None` is the permanent sentinel: it sits at the maximum cycle value
/// so the "next deadline" query is always well-defined, and it never
/// fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Sentinel, never dispatched
    None,
    /// Raise an interrupt on the Bus
    Interrupt(Irq),
    /// End-of-frame: VBlank IRQ plus frame bookkeeping
    VBlank,
}

/// A scheduled event
///
/// Ordered by target cycle, then by insertion sequence so that equal
/// deadlines pop first-in first-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Event {
    target: Cycles,
    seq: u64,
    kind: EventKind,
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.target
            .cmp(&other.target)
            .then(self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Deadline-ordered event queue sharing the CPU's cycle counter
///
/// The scheduler owns both the monotonic cycle counter and the CPU's
/// cycle target (the earliest pending deadline). Scheduling a sooner
/// event tightens the target so the run loop never oversteps a
/// deadline.
pub struct Scheduler {
    /// Absolute cycle counter, never decreases
    cycles: Cycles,

    /// Earliest pending deadline; the CPU runs until this is reached
    cycle_target: Cycles,

    /// Insertion sequence for the FIFO tie-break
    next_seq: u64,

    /// Min-heap of pending events
    events: BinaryHeap<Reverse<Event>>,
}

impl Scheduler {
    pub fn new() -> Self {
        let mut scheduler = Self {
            cycles: 0,
            cycle_target: Cycles::MAX,
            next_seq: 0,
            events: BinaryHeap::new(),
        };
        scheduler.reset();
        scheduler
    }

    /// Clear all events and restart the counter
    ///
    /// Re-inserts the sentinel so the queue is never empty.
    pub fn reset(&mut self) {
        self.cycles = 0;
        self.cycle_target = Cycles::MAX;
        self.next_seq = 0;
        self.events.clear();
        self.push(Cycles::MAX, EventKind::None);
    }

    /// Current value of the shared cycle counter
    #[inline(always)]
    pub fn cycles(&self) -> Cycles {
        self.cycles
    }

    /// Advance the shared cycle counter
    ///
    /// Called by the run loop with the CPU's per-step cycle charge.
    #[inline(always)]
    pub fn add_cycles(&mut self, count: u32) {
        self.cycles += count as Cycles;
    }

    /// The earliest pending deadline
    #[inline(always)]
    pub fn cycle_target(&self) -> Cycles {
        self.cycle_target
    }

    /// Whether the counter has reached the earliest deadline
    #[inline(always)]
    pub fn target_reached(&self) -> bool {
        self.cycles >= self.cycle_target
    }

    /// Schedule an event `delta` cycles from now
    ///
    /// Tightens the cycle target if the new event is sooner than
    /// anything currently pending, so an in-progress run loop stops in
    /// time to dispatch it.
    pub fn schedule_event(&mut self, delta: Cycles, kind: EventKind) {
        let target = self.cycles.saturating_add(delta);
        self.push(target, kind);
        log::trace!("scheduled {:?} at cycle {}", kind, target);
    }

    /// Convenience wrapper: deferred interrupt delivery
    pub fn schedule_interrupt(&mut self, delta: Cycles, irq: Irq) {
        self.schedule_event(delta, EventKind::Interrupt(irq));
    }

    /// Pop the next due event, if any
    ///
    /// Returns events whose target is at or before the current cycle
    /// count, earliest first. Events scheduled while draining are
    /// picked up in the same drain if already due (cycles never
    /// regress, so this is safe). The sentinel is never due.
    pub fn pop_due(&mut self) -> Option<EventKind> {
        let due = self
            .events
            .peek()
            .is_some_and(|Reverse(event)| event.target <= self.cycles);
        if !due {
            return None;
        }

        let Reverse(event) = self.events.pop().expect("sentinel keeps the queue non-empty");
        self.cycle_target = self.next_target();
        Some(event.kind)
    }

    /// Target cycle of the earliest pending event
    ///
    /// Total thanks to the sentinel.
    pub fn next_target(&self) -> Cycles {
        self.events
            .peek()
            .map(|Reverse(event)| event.target)
            .unwrap_or(Cycles::MAX)
    }

    fn push(&mut self, target: Cycles, kind: EventKind) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(Reverse(Event { target, seq, kind }));
        self.cycle_target = self.next_target();
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_keeps_target_defined() {
        let scheduler = Scheduler::new();
        assert_eq!(scheduler.next_target(), Cycles::MAX);
        assert_eq!(scheduler.cycle_target(), Cycles::MAX);
    }

    #[test]
    fn test_event_fires_at_exact_cycle() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_interrupt(100, Irq::Timer0);

        scheduler.add_cycles(99);
        assert_eq!(scheduler.pop_due(), None);

        scheduler.add_cycles(1);
        assert_eq!(scheduler.pop_due(), Some(EventKind::Interrupt(Irq::Timer0)));
        assert_eq!(scheduler.pop_due(), None);
    }

    #[test]
    fn test_events_fire_in_deadline_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_interrupt(300, Irq::Timer2);
        scheduler.schedule_interrupt(100, Irq::Timer0);
        scheduler.schedule_interrupt(200, Irq::Timer1);

        scheduler.add_cycles(300);
        assert_eq!(scheduler.pop_due(), Some(EventKind::Interrupt(Irq::Timer0)));
        assert_eq!(scheduler.pop_due(), Some(EventKind::Interrupt(Irq::Timer1)));
        assert_eq!(scheduler.pop_due(), Some(EventKind::Interrupt(Irq::Timer2)));
        assert_eq!(scheduler.pop_due(), None);
    }

    #[test]
    fn test_equal_deadlines_pop_fifo() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_interrupt(50, Irq::Gpu);
        scheduler.schedule_interrupt(50, Irq::Spu);
        scheduler.schedule_interrupt(50, Irq::Dma);

        scheduler.add_cycles(50);
        assert_eq!(scheduler.pop_due(), Some(EventKind::Interrupt(Irq::Gpu)));
        assert_eq!(scheduler.pop_due(), Some(EventKind::Interrupt(Irq::Spu)));
        assert_eq!(scheduler.pop_due(), Some(EventKind::Interrupt(Irq::Dma)));
    }

    #[test]
    fn test_schedule_tightens_cycle_target() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_interrupt(1000, Irq::VBlank);
        assert_eq!(scheduler.cycle_target(), 1000);

        // A sooner event pulls the target in
        scheduler.schedule_interrupt(10, Irq::Cdrom);
        assert_eq!(scheduler.cycle_target(), 10);
    }

    #[test]
    fn test_event_scheduled_while_draining_is_picked_up() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_interrupt(100, Irq::Timer0);
        scheduler.add_cycles(100);

        assert_eq!(scheduler.pop_due(), Some(EventKind::Interrupt(Irq::Timer0)));

        // An already-due event scheduled mid-drain fires in the same drain
        scheduler.schedule_interrupt(0, Irq::Timer1);
        assert_eq!(scheduler.pop_due(), Some(EventKind::Interrupt(Irq::Timer1)));
        assert_eq!(scheduler.pop_due(), None);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_interrupt(5, Irq::VBlank);
        scheduler.add_cycles(500);
        scheduler.reset();

        assert_eq!(scheduler.cycles(), 0);
        assert_eq!(scheduler.pop_due(), None);
        assert_eq!(scheduler.next_target(), Cycles::MAX);
    }
}
