//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::engine::{Engine, StepReport};
use crate::id::{EntityId, Region};
use crate::item::ItemCatalog;
use crate::placement::{GeneratorHandle, GeneratorRequest};
use crate::position::BlockPos;
use crate::sim_world::SimWorld;
use crate::world::World;

// ===========================================================================
// Worlds
// ===========================================================================

/// An empty world that knows the vanilla items.
pub fn test_world() -> SimWorld {
    SimWorld::new(ItemCatalog::vanilla())
}

/// A default engine and an empty vanilla world.
pub fn test_setup() -> (Engine, SimWorld) {
    (Engine::default(), test_world())
}

// ===========================================================================
// Requests
// ===========================================================================

pub fn diamond_request(interval: u32) -> GeneratorRequest {
    request(interval, "minecraft:diamond", 1)
}

pub fn request(interval: u32, item_id: &str, count: u32) -> GeneratorRequest {
    GeneratorRequest::new(interval.to_string(), item_id, count.to_string())
}

// ===========================================================================
// Placement and stepping
// ===========================================================================

/// Place a generator, panicking on failure.
pub fn place_at(
    engine: &mut Engine,
    world: &mut SimWorld,
    region: Region,
    origin: BlockPos,
    request: &GeneratorRequest,
) -> GeneratorHandle {
    engine
        .place_generator(world, region, origin, request)
        .expect("placement should succeed")
}

/// Run `n` steps and return every report.
pub fn step_n(engine: &mut Engine, world: &mut SimWorld, n: usize) -> Vec<StepReport> {
    (0..n).map(|_| engine.step(world)).collect()
}

/// The step indices (0-based) at which `marker` emitted.
pub fn emission_steps(reports: &[StepReport], marker: EntityId) -> Vec<usize> {
    reports
        .iter()
        .enumerate()
        .filter(|(_, r)| {
            matches!(
                r.outcome(marker),
                Some(crate::processor::TickOutcome::Emitted { .. })
            )
        })
        .map(|(i, _)| i)
        .collect()
}

/// Plant a bare marker carrying `tag` on an anchor above `origin`, the way
/// a world loaded from disk would contain one.
pub fn plant_marker(engine: &Engine, world: &mut SimWorld, region: Region, origin: BlockPos, tag: &str) -> EntityId {
    let config = engine.config();
    let fp = engine.footprint(origin).expect("origin should leave room for a generator");
    world.set_block(region, fp.anchor, &config.anchor_block);
    let marker = world
        .spawn_entity(region, &config.marker_entity, fp.marker.bottom_center())
        .expect("marker type should be spawnable");
    world.add_tag(marker, tag);
    marker
}
