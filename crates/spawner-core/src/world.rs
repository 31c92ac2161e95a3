//! The host world seam.
//!
//! The engine never owns world state. Every block, entity, tag and label
//! lives behind the [`World`] trait, which a host implements over its own
//! store. [`crate::sim_world::SimWorld`] is the in-memory implementation.

use crate::id::{EntityId, Region};
use crate::item::{ItemError, ItemStack};
use crate::position::{BlockPos, EntityPos};
use serde::{Deserialize, Serialize};

/// Kinds of status effect the engine applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Invisibility,
}

/// A timed status effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: EffectKind,
    pub duration_ticks: u32,
    pub amplifier: u8,
    pub show_particles: bool,
}

impl StatusEffect {
    /// Particle-free invisibility used to hide generator markers.
    pub fn hidden_invisibility(duration_ticks: u32) -> Self {
        Self {
            kind: EffectKind::Invisibility,
            duration_ticks,
            amplifier: 0,
            show_particles: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    #[error("entity type '{0}' cannot be spawned")]
    UnknownEntityType(String),
}

/// Operations the engine needs from the host world.
///
/// Calls addressing an entity that no longer exists are no-ops (or return
/// `None`/`false`), never errors: entities may disappear between ticks.
pub trait World {
    /// The block type at `pos`, or `None` for air.
    fn block_at(&self, region: Region, pos: BlockPos) -> Option<&str>;

    fn set_block(&mut self, region: Region, pos: BlockPos, block_type: &str);

    /// Replace the block at `pos` with air.
    fn clear_block(&mut self, region: Region, pos: BlockPos);

    fn spawn_entity(
        &mut self,
        region: Region,
        entity_type: &str,
        pos: EntityPos,
    ) -> Result<EntityId, WorldError>;

    /// Remove an entity. Returns whether it existed.
    fn kill_entity(&mut self, entity: EntityId) -> bool;

    /// Every entity currently in `region`, in host enumeration order.
    fn entities(&self, region: Region) -> Vec<EntityId>;

    fn entity_position(&self, entity: EntityId) -> Option<EntityPos>;

    /// Tags on an entity, in the order they were added.
    fn tags(&self, entity: EntityId) -> &[String];

    fn add_tag(&mut self, entity: EntityId, tag: &str) -> bool;

    fn remove_tag(&mut self, entity: EntityId, tag: &str) -> bool;

    /// The entity's display label (name tag).
    fn label(&self, entity: EntityId) -> Option<&str>;

    fn set_label(&mut self, entity: EntityId, label: &str);

    fn apply_effect(&mut self, entity: EntityId, effect: &StatusEffect);

    /// Construct an item entity from `stack` at `pos`. The host item system
    /// may reject the stack.
    fn spawn_item(
        &mut self,
        region: Region,
        stack: &ItemStack,
        pos: EntityPos,
    ) -> Result<EntityId, ItemError>;

    /// Send a message to every player.
    fn broadcast(&mut self, message: &str);

    /// Whether `entity` carries `tag`.
    fn has_tag(&self, entity: EntityId, tag: &str) -> bool {
        self.tags(entity).iter().any(|t| t == tag)
    }
}
