//! World snapshots.
//!
//! A [`SimWorld`] is saved as a bitcode payload behind a versioned header.
//! Generators need nothing beyond what the world already stores (tags,
//! labels, blocks), so a reloaded world resumes every generator; only the
//! engine's in-memory countdown state starts over.

use crate::fixed::Ticks;
use crate::id::{EntityId, Region};
use crate::item::ItemCatalog;
use crate::position::BlockPos;
use crate::sim_world::{EntityRecord, SimWorld};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use std::collections::BTreeMap;

/// Magic number identifying a world snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0x5EED_0001;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
}

/// Header prepended to every snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
    /// Engine tick at which the snapshot was taken.
    pub tick: Ticks,
}

impl SnapshotHeader {
    pub fn new(tick: Ticks) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
            tick,
        }
    }

    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(SnapshotError::InvalidMagic(self.magic));
        }
        if self.version != FORMAT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

/// The persisted portion of a world. The catalog and pending broadcasts
/// are runtime-only.
#[derive(Debug, Serialize, Deserialize)]
struct WorldSnapshot {
    header: SnapshotHeader,
    entities: SlotMap<EntityId, EntityRecord>,
    blocks: BTreeMap<(Region, BlockPos), String>,
}

impl SimWorld {
    /// Serialize the world.
    pub fn save(&self, tick: Ticks) -> Result<Vec<u8>, SnapshotError> {
        let snapshot = WorldSnapshot {
            header: SnapshotHeader::new(tick),
            entities: self.entities.clone(),
            blocks: self.blocks.clone(),
        };
        bitcode::serialize(&snapshot).map_err(|e| SnapshotError::Encode(e.to_string()))
    }

    /// Restore a world saved with [`SimWorld::save`].
    pub fn load(
        data: &[u8],
        catalog: ItemCatalog,
    ) -> Result<(Self, SnapshotHeader), SnapshotError> {
        let snapshot: WorldSnapshot =
            bitcode::deserialize(data).map_err(|e| SnapshotError::Decode(e.to_string()))?;
        snapshot.header.validate()?;
        tracing::debug!(
            tick = snapshot.header.tick,
            entities = snapshot.entities.len(),
            "loaded world snapshot"
        );
        let world = SimWorld {
            entities: snapshot.entities,
            blocks: snapshot.blocks,
            catalog,
            broadcasts: Vec::new(),
        };
        Ok((world, snapshot.header))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::EntityPos;
    use crate::world::World;

    #[test]
    fn save_load_preserves_tags_labels_and_blocks() {
        let mut w = SimWorld::new(ItemCatalog::vanilla());
        let e = w
            .spawn_entity(
                Region::Nether,
                "minecraft:armor_stand",
                EntityPos::from_f64(0.5, 160.0, 0.5),
            )
            .unwrap();
        w.add_tag(e, "gen:5,minecraft:quartz,2,0,64,0");
        w.set_label(e, "3");
        w.set_block(Region::Nether, BlockPos::new(0, 159, 0), "minecraft:barrier");
        w.broadcast("not persisted");

        let bytes = w.save(42).unwrap();
        let (loaded, header) = SimWorld::load(&bytes, ItemCatalog::vanilla()).unwrap();

        assert_eq!(header.tick, 42);
        assert_eq!(loaded.entity(e), w.entity(e));
        assert_eq!(
            loaded.block_at(Region::Nether, BlockPos::new(0, 159, 0)),
            Some("minecraft:barrier")
        );
        assert!(loaded.broadcasts().is_empty());
        assert!(loaded.catalog().contains("minecraft:quartz"));
    }

    #[test]
    fn garbage_fails_to_decode() {
        let result = SimWorld::load(&[1, 2, 3], ItemCatalog::vanilla());
        assert!(matches!(result, Err(SnapshotError::Decode(_))));
    }

    #[test]
    fn header_rejects_wrong_magic_and_version() {
        let mut h = SnapshotHeader::new(0);
        h.magic = 0xDEAD_BEEF;
        assert!(matches!(h.validate(), Err(SnapshotError::InvalidMagic(0xDEAD_BEEF))));

        let mut h = SnapshotHeader::new(0);
        h.version = FORMAT_VERSION + 1;
        assert!(matches!(h.validate(), Err(SnapshotError::UnsupportedVersion(_))));
    }
}
