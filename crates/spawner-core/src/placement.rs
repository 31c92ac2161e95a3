//! Turning an operator's request into an anchor block and a marker entity.
//!
//! Validation happens before any world mutation. Placing over a column that
//! already holds a generator replaces it: the old marker is killed first.

use crate::codec::{ConfigError, DecodedTag, GeneratorConfig, encode_tag, parse_whole};
use crate::config::SpawnerConfig;
use crate::id::{EntityId, Region};
use crate::processor::Footprint;
use crate::position::BlockPos;
use crate::world::{World, WorldError};

/// A configuration request as typed by the operator.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GeneratorRequest {
    pub interval: String,
    pub item_id: String,
    pub item_count: String,
}

impl GeneratorRequest {
    pub fn new(
        interval: impl Into<String>,
        item_id: impl Into<String>,
        item_count: impl Into<String>,
    ) -> Self {
        Self {
            interval: interval.into(),
            item_id: item_id.into(),
            item_count: item_count.into(),
        }
    }

    /// Check the raw fields. Surrounding whitespace is ignored.
    pub fn validate(&self, namespace: &str) -> Result<GeneratorConfig, ConfigError> {
        DecodedTag {
            interval_ticks: parse_whole(self.interval.trim()),
            item_id: self.item_id.trim().to_string(),
            item_count: parse_whole(self.item_count.trim()),
            origin: None,
        }
        .validate(namespace)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error("invalid generator request: {0}")]
    InvalidRequest(#[from] ConfigError),
    #[error("world refused the generator: {0}")]
    World(#[from] WorldError),
    #[error("no room for a generator above {0}")]
    OutOfBounds(BlockPos),
}

/// Where a freshly placed generator lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorHandle {
    pub marker: EntityId,
    pub region: Region,
    pub origin: BlockPos,
    pub anchor: BlockPos,
}

/// Result of a successful placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Placement {
    pub handle: GeneratorHandle,
    /// Generator markers that occupied the same spot and were killed.
    pub replaced: Vec<EntityId>,
}

/// Build the structure for `config` above `origin`.
pub(crate) fn place<W: World + ?Sized>(
    world: &mut W,
    spawner: &SpawnerConfig,
    region: Region,
    origin: BlockPos,
    config: &GeneratorConfig,
) -> Result<Placement, PlacementError> {
    let footprint = Footprint::from_origin(origin, spawner)
        .filter(|fp| fp.emission_point(spawner).is_some())
        .ok_or(PlacementError::OutOfBounds(origin))?;

    let replaced = generator_markers_at(world, spawner, region, footprint.marker);
    for &old in &replaced {
        world.kill_entity(old);
    }

    let previous_block = world.block_at(region, footprint.anchor).map(str::to_string);
    world.set_block(region, footprint.anchor, &spawner.anchor_block);

    let marker = match world.spawn_entity(
        region,
        &spawner.marker_entity,
        footprint.marker.bottom_center(),
    ) {
        Ok(marker) => marker,
        Err(e) => {
            match previous_block {
                Some(block) => world.set_block(region, footprint.anchor, &block),
                None => world.clear_block(region, footprint.anchor),
            }
            return Err(e.into());
        }
    };

    world.set_label(marker, &config.interval_ticks.to_string());
    world.add_tag(marker, &encode_tag(&spawner.tag_prefix, config, origin));

    tracing::info!(
        %origin,
        %region,
        interval = config.interval_ticks,
        item = %config.item_id,
        count = config.item_count,
        replaced = replaced.len(),
        "generator placed"
    );

    Ok(Placement {
        handle: GeneratorHandle {
            marker,
            region,
            origin,
            anchor: footprint.anchor,
        },
        replaced,
    })
}

/// Markers carrying a generator tag whose position floors to `block`.
pub(crate) fn generator_markers_at<W: World + ?Sized>(
    world: &W,
    spawner: &SpawnerConfig,
    region: Region,
    block: BlockPos,
) -> Vec<EntityId> {
    world
        .entities(region)
        .into_iter()
        .filter(|&e| world.entity_position(e).is_some_and(|p| p.floor() == block))
        .filter(|&e| world.tags(e).iter().any(|t| t.starts_with(&spawner.tag_prefix)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode_tag;
    use crate::item::ItemCatalog;
    use crate::position::EntityPos;
    use crate::sim_world::SimWorld;

    fn diamond() -> GeneratorConfig {
        GeneratorConfig {
            interval_ticks: 200,
            item_id: "minecraft:diamond".to_string(),
            item_count: 1,
        }
    }

    #[test]
    fn request_validation() {
        let ok = GeneratorRequest::new(" 200 ", "minecraft:diamond", "1");
        assert_eq!(ok.validate("minecraft"), Ok(diamond()));

        let cases = [
            (GeneratorRequest::new("abc", "minecraft:diamond", "1"), ConfigError::IntervalNotANumber),
            (GeneratorRequest::new("0", "minecraft:diamond", "1"), ConfigError::IntervalOutOfRange(0)),
            (GeneratorRequest::new("5", "minecraft:diamond", "x"), ConfigError::CountNotANumber),
            (GeneratorRequest::new("5", "minecraft:diamond", "-1"), ConfigError::CountOutOfRange(-1)),
            (GeneratorRequest::new("5", "", "1"), ConfigError::EmptyItemId),
        ];
        for (req, err) in cases {
            assert_eq!(req.validate("minecraft"), Err(err));
        }
        assert!(matches!(
            GeneratorRequest::new("5", "diamond", "1").validate("minecraft"),
            Err(ConfigError::ItemNamespace { .. })
        ));
        assert!(matches!(
            GeneratorRequest::new("5", "minecraft:", "1").validate("minecraft"),
            Err(ConfigError::ItemNamespace { .. })
        ));
    }

    #[test]
    fn place_builds_anchor_and_marker() {
        let spawner = SpawnerConfig::default();
        let mut world = SimWorld::new(ItemCatalog::vanilla());
        let origin = BlockPos::new(3, 64, -4);
        let placed = place(&mut world, &spawner, Region::Overworld, origin, &diamond()).unwrap();

        assert!(placed.replaced.is_empty());
        assert_eq!(placed.handle.anchor, BlockPos::new(3, 159, -4));
        assert_eq!(
            world.block_at(Region::Overworld, placed.handle.anchor),
            Some("minecraft:barrier")
        );
        let marker = placed.handle.marker;
        assert_eq!(
            world.entity_position(marker),
            Some(EntityPos::from_f64(3.5, 160.0, -3.5))
        );
        assert_eq!(world.label(marker), Some("200"));
        let decoded = decode_tag("gen:", &world.tags(marker)[0]).unwrap();
        assert_eq!(decoded.validate("minecraft"), Ok(diamond()));
        assert_eq!(decoded.origin, Some(origin));
    }

    #[test]
    fn placing_twice_replaces_the_marker() {
        let spawner = SpawnerConfig::default();
        let mut world = SimWorld::new(ItemCatalog::vanilla());
        let origin = BlockPos::new(0, 64, 0);
        let first = place(&mut world, &spawner, Region::Overworld, origin, &diamond()).unwrap();
        // A bystander at the same spot without a generator tag survives.
        let bystander = world
            .spawn_entity(Region::Overworld, "minecraft:pig", EntityPos::from_f64(0.2, 160.3, 0.7))
            .unwrap();

        let second = place(&mut world, &spawner, Region::Overworld, origin, &diamond()).unwrap();
        assert_eq!(second.replaced, vec![first.handle.marker]);
        assert!(world.entity(first.handle.marker).is_none());
        assert!(world.entity(bystander).is_some());
        assert_eq!(
            generator_markers_at(
                &world,
                &spawner,
                Region::Overworld,
                second.handle.anchor.checked_above(1).unwrap()
            ),
            vec![second.handle.marker]
        );
    }

    #[test]
    fn other_regions_are_untouched_by_replacement() {
        let spawner = SpawnerConfig::default();
        let mut world = SimWorld::new(ItemCatalog::vanilla());
        let origin = BlockPos::new(0, 64, 0);
        let nether = place(&mut world, &spawner, Region::Nether, origin, &diamond()).unwrap();
        place(&mut world, &spawner, Region::Overworld, origin, &diamond()).unwrap();
        assert!(world.entity(nether.handle.marker).is_some());
    }

    #[test]
    fn failed_spawn_restores_previous_block() {
        let spawner = SpawnerConfig {
            marker_entity: "not namespaced".to_string(),
            ..SpawnerConfig::default()
        };
        let mut world = SimWorld::new(ItemCatalog::vanilla());
        let origin = BlockPos::new(0, 64, 0);
        let anchor = origin.checked_above(spawner.anchor_offset).unwrap();
        world.set_block(Region::Overworld, anchor, "minecraft:glass");

        let err = place(&mut world, &spawner, Region::Overworld, origin, &diamond()).unwrap_err();
        assert!(matches!(err, PlacementError::World(WorldError::UnknownEntityType(_))));
        assert_eq!(world.block_at(Region::Overworld, anchor), Some("minecraft:glass"));
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn origins_at_the_column_edges_are_rejected() {
        let spawner = SpawnerConfig::default();
        let mut world = SimWorld::new(ItemCatalog::vanilla());
        for y in [i32::MIN, i32::MIN + 1, i32::MAX - 95, i32::MAX] {
            let origin = BlockPos::new(0, y, 0);
            assert_eq!(
                place(&mut world, &spawner, Region::Overworld, origin, &diamond()),
                Err(PlacementError::OutOfBounds(origin))
            );
        }
        assert_eq!(world.entity_count(), 0);
        assert!(place(&mut world, &spawner, Region::Overworld, BlockPos::new(0, i32::MIN + 2, 0), &diamond()).is_ok());
    }
}
