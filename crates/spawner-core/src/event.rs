//! Typed lifecycle events, queued per kind until the end of each step.
//!
//! Events are emitted while the engine places, processes and retires
//! generators, and delivered in one batch at the end of each step. Each
//! event kind has its own bounded [`EventBuffer`]; delivery empties it. Removal decisions and
//! placements made between steps are delivered with the next step.
//!
//! Suppressed kinds are never buffered.

use crate::fixed::Ticks;
use crate::id::{EntityId, Region};
use crate::position::BlockPos;
use crate::processor::DestroyReason;
use std::collections::VecDeque;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// A generator lifecycle event. All events carry the tick they occurred on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    GeneratorPlaced {
        marker: EntityId,
        region: Region,
        origin: BlockPos,
        interval_ticks: u32,
        tick: Ticks,
    },
    /// A previous generator at the same column was removed by a placement.
    GeneratorReplaced {
        old_marker: EntityId,
        region: Region,
        origin: BlockPos,
        tick: Ticks,
    },
    /// A marker was observed for the first time this run.
    GeneratorDiscovered {
        marker: EntityId,
        region: Region,
        tick: Ticks,
    },
    ItemEmitted {
        marker: EntityId,
        region: Region,
        item_id: String,
        amount: u32,
        tick: Ticks,
    },
    GeneratorDestroyed {
        marker: EntityId,
        region: Region,
        origin: BlockPos,
        reason: DestroyReason,
        tick: Ticks,
    },
    RemovalVetoed {
        marker: EntityId,
        region: Region,
        actor: String,
        tick: Ticks,
    },
    RemovalPermitted {
        marker: EntityId,
        region: Region,
        actor: String,
        tick: Ticks,
    },
}

/// Discriminant tag for event types, used for suppression and subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    GeneratorPlaced,
    GeneratorReplaced,
    GeneratorDiscovered,
    ItemEmitted,
    GeneratorDestroyed,
    RemovalVetoed,
    RemovalPermitted,
}

/// Total number of event kinds.
const EVENT_KIND_COUNT: usize = 7;

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::GeneratorPlaced { .. } => EventKind::GeneratorPlaced,
            Event::GeneratorReplaced { .. } => EventKind::GeneratorReplaced,
            Event::GeneratorDiscovered { .. } => EventKind::GeneratorDiscovered,
            Event::ItemEmitted { .. } => EventKind::ItemEmitted,
            Event::GeneratorDestroyed { .. } => EventKind::GeneratorDestroyed,
            Event::RemovalVetoed { .. } => EventKind::RemovalVetoed,
            Event::RemovalPermitted { .. } => EventKind::RemovalPermitted,
        }
    }

    /// The marker entity this event is about.
    pub fn marker(&self) -> EntityId {
        match self {
            Event::GeneratorPlaced { marker, .. }
            | Event::GeneratorDiscovered { marker, .. }
            | Event::ItemEmitted { marker, .. }
            | Event::GeneratorDestroyed { marker, .. }
            | Event::RemovalVetoed { marker, .. }
            | Event::RemovalPermitted { marker, .. } => *marker,
            Event::GeneratorReplaced { old_marker, .. } => *old_marker,
        }
    }
}

impl EventKind {
    fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// EventBuffer
// ---------------------------------------------------------------------------

/// Events of one kind waiting for the next delivery. Bounded: once full,
/// each new event evicts the oldest pending one.
#[derive(Debug)]
pub struct EventBuffer {
    pending: VecDeque<Event>,
    capacity: usize,
    total_written: u64,
    evicted: u64,
}

impl EventBuffer {
    /// A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            pending: VecDeque::new(),
            capacity: capacity.max(1),
            total_written: 0,
            evicted: 0,
        }
    }

    pub fn push(&mut self, event: Event) {
        if self.pending.len() == self.capacity {
            self.pending.pop_front();
            self.evicted += 1;
        }
        self.pending.push_back(event);
        self.total_written += 1;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Events pushed out before anyone saw them.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.pending.iter()
    }

    /// Hand over everything pending, leaving the buffer empty.
    fn take(&mut self) -> VecDeque<Event> {
        std::mem::take(&mut self.pending)
    }
}

// ---------------------------------------------------------------------------
// Listeners
// ---------------------------------------------------------------------------

/// A passive listener receives events read-only.
pub type PassiveListener = Box<dyn FnMut(&Event)>;

/// Optional predicate that filters events for a listener.
pub type EventFilter = Box<dyn Fn(&Event) -> bool>;

/// Priority level for listeners. Lower priorities run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ListenerPriority {
    Pre = 0,
    Normal = 1,
    Post = 2,
}

struct ListenerEntry {
    listener: PassiveListener,
    priority: ListenerPriority,
    filter: Option<EventFilter>,
    insertion_order: u64,
}

impl std::fmt::Debug for ListenerEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerEntry")
            .field("priority", &self.priority)
            .field("filtered", &self.filter.is_some())
            .field("insertion_order", &self.insertion_order)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// One pending queue per event kind, listener lists and suppression flags.
pub struct EventBus {
    buffers: [Option<EventBuffer>; EVENT_KIND_COUNT],
    suppressed: [bool; EVENT_KIND_COUNT],
    listeners: [Vec<ListenerEntry>; EVENT_KIND_COUNT],
    default_capacity: usize,
    next_insertion_order: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("buffers", &self.buffers)
            .field("suppressed", &self.suppressed)
            .field("default_capacity", &self.default_capacity)
            .finish_non_exhaustive()
    }
}

impl EventBus {
    pub fn new(default_capacity: usize) -> Self {
        Self {
            buffers: Default::default(),
            suppressed: [false; EVENT_KIND_COUNT],
            listeners: Default::default(),
            default_capacity,
            next_insertion_order: 0,
        }
    }

    /// Suppress an event kind and drop its buffer.
    pub fn suppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = true;
        self.buffers[kind.index()] = None;
    }

    pub fn is_suppressed(&self, kind: EventKind) -> bool {
        self.suppressed[kind.index()]
    }

    /// Buffer an event for the next delivery. Buffers are allocated on
    /// first use.
    pub fn emit(&mut self, event: Event) {
        let idx = event.kind().index();
        if self.suppressed[idx] {
            return;
        }
        let capacity = self.default_capacity;
        self.buffers[idx]
            .get_or_insert_with(|| EventBuffer::new(capacity))
            .push(event);
    }

    /// Register a listener with normal priority and no filter.
    pub fn on_passive(&mut self, kind: EventKind, listener: PassiveListener) {
        self.on_passive_filtered(kind, ListenerPriority::Normal, None, listener);
    }

    pub fn on_passive_filtered(
        &mut self,
        kind: EventKind,
        priority: ListenerPriority,
        filter: Option<EventFilter>,
        listener: PassiveListener,
    ) {
        let order = self.next_insertion_order;
        self.next_insertion_order += 1;
        let list = &mut self.listeners[kind.index()];
        list.push(ListenerEntry {
            listener,
            priority,
            filter,
            insertion_order: order,
        });
        list.sort_by_key(|entry| (entry.priority, entry.insertion_order));
    }

    /// Deliver all buffered events to listeners, oldest first, then clear
    /// the buffers.
    pub fn deliver(&mut self) {
        for idx in 0..EVENT_KIND_COUNT {
            let Some(buffer) = self.buffers[idx].as_mut() else {
                continue;
            };
            let events = buffer.take();
            if events.is_empty() {
                continue;
            }
            for entry in &mut self.listeners[idx] {
                for event in &events {
                    if let Some(filter) = &entry.filter
                        && !filter(event)
                    {
                        continue;
                    }
                    (entry.listener)(event);
                }
            }
        }
    }

    pub fn buffer(&self, kind: EventKind) -> Option<&EventBuffer> {
        self.buffers[kind.index()].as_ref()
    }

    pub fn buffered_count(&self, kind: EventKind) -> usize {
        self.buffers[kind.index()]
            .as_ref()
            .map_or(0, EventBuffer::len)
    }

    /// Total events ever emitted for a kind, including delivered ones.
    pub fn total_emitted(&self, kind: EventKind) -> u64 {
        self.buffers[kind.index()]
            .as_ref()
            .map_or(0, EventBuffer::total_written)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
