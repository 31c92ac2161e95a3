//! Removal protection for generator structures.
//!
//! A removal at `pos` touches a generator when `pos` is the targeted block
//! of one (anchor at `pos + offset`) or is the anchor itself. In both cases
//! the anchor block must be present and a generator marker must stand on
//! it. Only unrestricted actors may remove such blocks.

use crate::config::SpawnerConfig;
use crate::id::{EntityId, Region};
use crate::placement::generator_markers_at;
use crate::position::BlockPos;
use crate::processor::Footprint;
use crate::world::World;
use serde::{Deserialize, Serialize};

/// Privilege mode of an actor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    #[default]
    Survival,
    Creative,
    Adventure,
    Spectator,
}

impl GameMode {
    pub fn is_unrestricted(self) -> bool {
        matches!(self, GameMode::Creative)
    }
}

/// Someone attempting a removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
    pub mode: GameMode,
}

impl Actor {
    pub fn new(name: impl Into<String>, mode: GameMode) -> Self {
        Self {
            name: name.into(),
            mode,
        }
    }
}

/// A generator structure affected by a removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtectedStructure {
    pub marker: EntityId,
    pub region: Region,
    pub origin: BlockPos,
    pub anchor: BlockPos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalDecision {
    /// The block is not part of any generator.
    Unprotected,
    Permitted(ProtectedStructure),
    Vetoed(ProtectedStructure),
}

impl RemovalDecision {
    pub fn is_vetoed(&self) -> bool {
        matches!(self, RemovalDecision::Vetoed(_))
    }

    pub fn structure(&self) -> Option<&ProtectedStructure> {
        match self {
            RemovalDecision::Unprotected => None,
            RemovalDecision::Permitted(s) | RemovalDecision::Vetoed(s) => Some(s),
        }
    }
}

/// The generator structure that a removal at `pos` would touch, if any.
pub fn find_protected<W: World + ?Sized>(
    world: &W,
    config: &SpawnerConfig,
    region: Region,
    pos: BlockPos,
) -> Option<ProtectedStructure> {
    let as_origin = Footprint::from_origin(pos, config);
    let as_anchor = pos
        .checked_below(config.anchor_offset)
        .and_then(|origin| Footprint::from_origin(origin, config));

    [as_origin, as_anchor].into_iter().flatten().find_map(|fp| {
        if world.block_at(region, fp.anchor) != Some(config.anchor_block.as_str()) {
            return None;
        }
        let marker = generator_markers_at(world, config, region, fp.marker)
            .into_iter()
            .next()?;
        Some(ProtectedStructure {
            marker,
            region,
            origin: fp.origin,
            anchor: fp.anchor,
        })
    })
}

/// Decide whether `actor` may remove the block at `pos`.
pub fn check_removal<W: World + ?Sized>(
    world: &W,
    config: &SpawnerConfig,
    region: Region,
    pos: BlockPos,
    actor: &Actor,
) -> RemovalDecision {
    match find_protected(world, config, region, pos) {
        None => RemovalDecision::Unprotected,
        Some(s) if actor.mode.is_unrestricted() => RemovalDecision::Permitted(s),
        Some(s) => RemovalDecision::Vetoed(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::GeneratorConfig;
    use crate::item::ItemCatalog;
    use crate::placement::place;
    use crate::sim_world::SimWorld;

    fn setup() -> (SimWorld, SpawnerConfig, ProtectedStructure) {
        let config = SpawnerConfig::default();
        let mut world = SimWorld::new(ItemCatalog::vanilla());
        let gen_config = GeneratorConfig {
            interval_ticks: 20,
            item_id: "minecraft:iron_ingot".to_string(),
            item_count: 1,
        };
        let placed = place(
            &mut world,
            &config,
            Region::Overworld,
            BlockPos::new(10, 64, 10),
            &gen_config,
        )
        .unwrap();
        let h = placed.handle;
        let s = ProtectedStructure {
            marker: h.marker,
            region: h.region,
            origin: h.origin,
            anchor: h.anchor,
        };
        (world, config, s)
    }

    #[test]
    fn survival_removal_of_origin_is_vetoed() {
        let (world, config, s) = setup();
        let steve = Actor::new("steve", GameMode::Survival);
        let d = check_removal(&world, &config, Region::Overworld, s.origin, &steve);
        assert_eq!(d, RemovalDecision::Vetoed(s));
        assert!(d.is_vetoed());
    }

    #[test]
    fn creative_removal_is_permitted() {
        let (world, config, s) = setup();
        let alex = Actor::new("alex", GameMode::Creative);
        assert_eq!(
            check_removal(&world, &config, Region::Overworld, s.origin, &alex),
            RemovalDecision::Permitted(s)
        );
    }

    #[test]
    fn anchor_itself_is_protected() {
        let (world, config, s) = setup();
        let steve = Actor::new("steve", GameMode::Adventure);
        let d = check_removal(&world, &config, Region::Overworld, s.anchor, &steve);
        assert_eq!(d.structure(), Some(&s));
        assert!(d.is_vetoed());
    }

    #[test]
    fn unrelated_blocks_are_unprotected() {
        let (world, config, s) = setup();
        let steve = Actor::new("steve", GameMode::Survival);
        for pos in [
            s.origin.checked_above(1).unwrap(),
            s.origin.checked_below(1).unwrap(),
            BlockPos::new(11, 64, 10),
            BlockPos::new(0, i32::MIN, 0),
            BlockPos::new(0, i32::MAX, 0),
        ] {
            assert_eq!(
                check_removal(&world, &config, Region::Overworld, pos, &steve),
                RemovalDecision::Unprotected
            );
        }
        assert_eq!(
            check_removal(&world, &config, Region::Nether, s.origin, &steve),
            RemovalDecision::Unprotected
        );
    }

    #[test]
    fn no_protection_without_marker_or_anchor() {
        let (mut world, config, s) = setup();
        world.kill_entity(s.marker);
        assert_eq!(find_protected(&world, &config, Region::Overworld, s.origin), None);

        let (mut world, config, s) = setup();
        world.clear_block(Region::Overworld, s.anchor);
        assert_eq!(find_protected(&world, &config, Region::Overworld, s.origin), None);
    }

    #[test]
    fn only_creative_is_unrestricted() {
        assert!(GameMode::Creative.is_unrestricted());
        for m in [GameMode::Survival, GameMode::Adventure, GameMode::Spectator] {
            assert!(!m.is_unrestricted());
        }
    }
}
