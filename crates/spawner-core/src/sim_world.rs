//! In-memory [`World`] implementation.
//!
//! `SimWorld` stores blocks in a sparse map and entities in a slot map. It
//! is deterministic: entity enumeration follows slot order, and nothing
//! happens between calls. Used by the headless runner and by every test.

use crate::id::{EntityId, Region};
use crate::item::{ItemCatalog, ItemError, ItemStack, is_namespaced};
use crate::position::{BlockPos, EntityPos};
use crate::world::{EffectKind, StatusEffect, World, WorldError};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use std::collections::BTreeMap;

/// Entity type given to dropped item stacks.
pub const ITEM_ENTITY_TYPE: &str = "minecraft:item";

/// Everything the world knows about one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub region: Region,
    pub entity_type: String,
    pub position: EntityPos,
    pub tags: Vec<String>,
    pub label: Option<String>,
    /// Active effects, at most one per kind.
    pub effects: Vec<StatusEffect>,
    /// The carried stack, for item entities.
    pub item: Option<ItemStack>,
}

/// A dropped item, as seen by queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DroppedItem<'a> {
    pub entity: EntityId,
    pub region: Region,
    pub position: EntityPos,
    pub stack: &'a ItemStack,
}

#[derive(Debug, Clone, Default)]
pub struct SimWorld {
    pub(crate) entities: SlotMap<EntityId, EntityRecord>,
    pub(crate) blocks: BTreeMap<(Region, BlockPos), String>,
    pub(crate) catalog: ItemCatalog,
    pub(crate) broadcasts: Vec<String>,
}

impl SimWorld {
    pub fn new(catalog: ItemCatalog) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    pub fn entity(&self, entity: EntityId) -> Option<&EntityRecord> {
        self.entities.get(entity)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Entities whose floored position is `pos`.
    pub fn entities_at(&self, region: Region, pos: BlockPos) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|(_, e)| e.region == region && e.position.floor() == pos)
            .map(|(id, _)| id)
            .collect()
    }

    /// Every dropped item stack in `region`.
    pub fn dropped_items(&self, region: Region) -> Vec<DroppedItem<'_>> {
        self.entities
            .iter()
            .filter(|(_, e)| e.region == region)
            .filter_map(|(id, e)| {
                e.item.as_ref().map(|stack| DroppedItem {
                    entity: id,
                    region,
                    position: e.position,
                    stack,
                })
            })
            .collect()
    }

    /// Total amount of `item_id` lying around in `region`.
    pub fn dropped_total(&self, region: Region, item_id: &str) -> u32 {
        self.dropped_items(region)
            .iter()
            .filter(|d| d.stack.item_id == item_id)
            .map(|d| d.stack.amount)
            .sum()
    }

    /// Remove every dropped item (as if players picked them up).
    pub fn collect_items(&mut self) -> usize {
        let before = self.entities.len();
        self.entities.retain(|_, e| e.item.is_none());
        before - self.entities.len()
    }

    pub fn broadcasts(&self) -> &[String] {
        &self.broadcasts
    }

    pub fn take_broadcasts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.broadcasts)
    }

    /// The active effect of `kind` on an entity.
    pub fn effect(&self, entity: EntityId, kind: EffectKind) -> Option<&StatusEffect> {
        self.entities
            .get(entity)?
            .effects
            .iter()
            .find(|e| e.kind == kind)
    }
}

impl World for SimWorld {
    fn block_at(&self, region: Region, pos: BlockPos) -> Option<&str> {
        self.blocks.get(&(region, pos)).map(String::as_str)
    }

    fn set_block(&mut self, region: Region, pos: BlockPos, block_type: &str) {
        self.blocks.insert((region, pos), block_type.to_string());
    }

    fn clear_block(&mut self, region: Region, pos: BlockPos) {
        self.blocks.remove(&(region, pos));
    }

    fn spawn_entity(
        &mut self,
        region: Region,
        entity_type: &str,
        pos: EntityPos,
    ) -> Result<EntityId, WorldError> {
        if !is_namespaced(entity_type) || entity_type == ITEM_ENTITY_TYPE {
            return Err(WorldError::UnknownEntityType(entity_type.to_string()));
        }
        Ok(self.entities.insert(EntityRecord {
            region,
            entity_type: entity_type.to_string(),
            position: pos,
            tags: Vec::new(),
            label: None,
            effects: Vec::new(),
            item: None,
        }))
    }

    fn kill_entity(&mut self, entity: EntityId) -> bool {
        self.entities.remove(entity).is_some()
    }

    fn entities(&self, region: Region) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|(_, e)| e.region == region)
            .map(|(id, _)| id)
            .collect()
    }

    fn entity_position(&self, entity: EntityId) -> Option<EntityPos> {
        self.entities.get(entity).map(|e| e.position)
    }

    fn tags(&self, entity: EntityId) -> &[String] {
        self.entities
            .get(entity)
            .map(|e| e.tags.as_slice())
            .unwrap_or(&[])
    }

    fn add_tag(&mut self, entity: EntityId, tag: &str) -> bool {
        let Some(e) = self.entities.get_mut(entity) else {
            return false;
        };
        if e.tags.iter().any(|t| t == tag) {
            return false;
        }
        e.tags.push(tag.to_string());
        true
    }

    fn remove_tag(&mut self, entity: EntityId, tag: &str) -> bool {
        let Some(e) = self.entities.get_mut(entity) else {
            return false;
        };
        let before = e.tags.len();
        e.tags.retain(|t| t != tag);
        e.tags.len() != before
    }

    fn label(&self, entity: EntityId) -> Option<&str> {
        self.entities.get(entity)?.label.as_deref()
    }

    fn set_label(&mut self, entity: EntityId, label: &str) {
        if let Some(e) = self.entities.get_mut(entity) {
            e.label = Some(label.to_string());
        }
    }

    fn apply_effect(&mut self, entity: EntityId, effect: &StatusEffect) {
        if let Some(e) = self.entities.get_mut(entity) {
            e.effects.retain(|active| active.kind != effect.kind);
            e.effects.push(*effect);
        }
    }

    fn spawn_item(
        &mut self,
        region: Region,
        stack: &ItemStack,
        pos: EntityPos,
    ) -> Result<EntityId, ItemError> {
        if !self.catalog.contains(&stack.item_id) {
            return Err(ItemError::UnknownItem(stack.item_id.clone()));
        }
        Ok(self.entities.insert(EntityRecord {
            region,
            entity_type: ITEM_ENTITY_TYPE.to_string(),
            position: pos,
            tags: Vec::new(),
            label: None,
            effects: Vec::new(),
            item: Some(stack.clone()),
        }))
    }

    fn broadcast(&mut self, message: &str) {
        self.broadcasts.push(message.to_string());
    }
}
