//! Engine configuration.
//!
//! Every field has a default, and `#[serde(default)]` lets settings files
//! override only what they care about.

use serde::{Deserialize, Serialize};

/// Tunable constants for the generator lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnerConfig {
    /// Prefix that marks an entity tag as a generator encoding.
    pub tag_prefix: String,
    /// Tag added to a marker once its countdown has been initialized.
    pub init_tag: String,
    /// Block type used for the anchor.
    pub anchor_block: String,
    /// Entity type used for markers.
    pub marker_entity: String,
    /// Anchor sits this many blocks above the targeted block.
    pub anchor_offset: i32,
    /// Items spawn this many blocks below the marker.
    pub emission_drop: i32,
    /// Item ids accepted from operators must live in this namespace.
    pub item_namespace: String,
    /// Duration of the invisibility effect refreshed on markers every tick.
    pub invisibility_ticks: u32,
    /// Per-kind cap on events pending delivery.
    pub event_capacity: usize,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            tag_prefix: "gen:".to_string(),
            init_tag: "gen_init".to_string(),
            anchor_block: "minecraft:barrier".to_string(),
            marker_entity: "minecraft:armor_stand".to_string(),
            anchor_offset: 95,
            emission_drop: 98,
            item_namespace: "minecraft".to_string(),
            invisibility_ticks: 40,
            event_capacity: 256,
        }
    }
}
