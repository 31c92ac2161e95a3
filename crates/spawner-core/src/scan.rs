//! Per-tick generator discovery.
//!
//! A full scan: every entity in every region, every tag on each entity.
//! The cost is O(entities x tags) per tick. Nothing is indexed here; the
//! [`crate::registry::GeneratorRegistry`] caches decoded state on top of
//! the scan but never replaces it, so markers created outside the engine
//! (a reloaded world, another tool) are always found.

use crate::id::{EntityId, Region};
use crate::world::World;

/// One generator marker found by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovered {
    pub entity: EntityId,
    pub region: Region,
    /// The first tag on the entity that starts with the generator prefix.
    pub tag: String,
}

/// Find every generator marker. Regions are visited in [`Region::ALL`]
/// order, entities in host order. An entity with several generator tags
/// contributes only the first.
///
/// The result is an owned snapshot: callers mutate the world while walking
/// it without affecting what this tick processes.
pub fn scan_generators<W: World + ?Sized>(world: &W, prefix: &str) -> Vec<Discovered> {
    let mut found = Vec::new();
    for region in Region::ALL {
        for entity in world.entities(region) {
            if let Some(tag) = world.tags(entity).iter().find(|t| t.starts_with(prefix)) {
                found.push(Discovered {
                    entity,
                    region,
                    tag: tag.clone(),
                });
            }
        }
    }
    found
}
