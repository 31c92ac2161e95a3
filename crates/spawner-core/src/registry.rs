//! In-memory index of live generators.
//!
//! Each discovered marker gets a [`GeneratorEntry`] holding its decoded tag
//! and an explicit [`CountdownState`]. The marker's label is only a display
//! projection of that state. Entries live for one run: a reloaded world
//! starts every generator from `Uninitialized` again.

use crate::codec::{CodecError, DecodedTag, decode_tag};
use crate::id::{EntityId, Region};
use crate::scan::Discovered;
use slotmap::SecondaryMap;
use std::collections::HashSet;

/// Countdown state of one generator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CountdownState {
    /// Seen, but the countdown has not been set this run.
    #[default]
    Uninitialized,
    /// Ticks left until the next emission, in `1..=interval`.
    Counting(u32),
    /// Retired this tick. Terminal.
    Destroyed,
}

/// Cached state for one marker.
#[derive(Debug, Clone)]
pub struct GeneratorEntry {
    pub region: Region,
    /// The generator tag this entry was decoded from.
    pub tag: String,
    pub decoded: Result<DecodedTag, CodecError>,
    pub state: CountdownState,
}

impl GeneratorEntry {
    pub fn new(region: Region, tag: String, prefix: &str) -> Self {
        let decoded = decode_tag(prefix, &tag);
        Self {
            region,
            tag,
            decoded,
            state: CountdownState::Uninitialized,
        }
    }

    /// Ticks until the next emission, if counting.
    pub fn remaining(&self) -> Option<u32> {
        match self.state {
            CountdownState::Counting(r) => Some(r),
            _ => None,
        }
    }
}

/// Generator index keyed by marker entity.
#[derive(Debug, Default)]
pub struct GeneratorRegistry {
    entries: SecondaryMap<EntityId, GeneratorEntry>,
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the index in line with this tick's scan.
    ///
    /// Entries for markers that vanished are dropped. A marker whose tag
    /// changed since it was cached is decoded again and restarts from
    /// `Uninitialized`. Returns the markers seen for the first time.
    pub fn reconcile(&mut self, discovered: &[Discovered], prefix: &str) -> Vec<EntityId> {
        let live: HashSet<EntityId> = discovered.iter().map(|d| d.entity).collect();
        self.entries.retain(|id, _| live.contains(&id));

        let mut fresh = Vec::new();
        for found in discovered {
            let stale = match self.entries.get(found.entity) {
                Some(entry) => entry.tag != found.tag || entry.region != found.region,
                None => {
                    fresh.push(found.entity);
                    true
                }
            };
            if stale {
                self.entries.insert(
                    found.entity,
                    GeneratorEntry::new(found.region, found.tag.clone(), prefix),
                );
            }
        }
        fresh
    }

    /// Register a marker created by placement so the next tick picks it up
    /// without a fresh decode.
    pub fn insert(&mut self, entity: EntityId, entry: GeneratorEntry) {
        self.entries.insert(entity, entry);
    }

    pub fn remove(&mut self, entity: EntityId) -> Option<GeneratorEntry> {
        self.entries.remove(entity)
    }

    /// Drop every entry retired this tick.
    pub fn purge_destroyed(&mut self) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, e| e.state != CountdownState::Destroyed);
        before - self.entries.len()
    }

    pub fn get(&self, entity: EntityId) -> Option<&GeneratorEntry> {
        self.entries.get(entity)
    }

    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut GeneratorEntry> {
        self.entries.get_mut(entity)
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.entries.contains_key(entity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &GeneratorEntry)> {
        self.entries.iter()
    }
}
