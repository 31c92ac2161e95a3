//! Per-generator tick processing.
//!
//! Each tick, every discovered marker runs through the same sequence:
//!
//! 1. Refresh the marker's invisibility.
//! 2. Structural check: the anchor block must sit one unit below the marker.
//! 3. Countdown initialization on first observation this run.
//! 4. Countdown decrement.
//! 5. Emission when the countdown reaches zero.
//! 6. Label update.
//!
//! Any failure in 2 or 5 (or an unusable interval in 3) retires the
//! generator: anchor cleared, marker killed, diagnostic broadcast. Failures
//! never escape this module; the next generator is processed regardless.

use crate::codec::{CodecError, ConfigError};
use crate::config::SpawnerConfig;
use crate::id::{EntityId, Region};
use crate::item::{ItemError, ItemStack};
use crate::position::{BlockPos, EntityPos};
use crate::registry::{CountdownState, GeneratorEntry};
use crate::scan::Discovered;
use crate::world::{StatusEffect, World};
use std::fmt;

/// Why a generator was retired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestroyReason {
    /// The anchor block below the marker is gone.
    AnchorMissing,
    /// The marker's generator tag could not be decoded.
    MalformedTag(CodecError),
    /// The tag decoded but its interval is unusable.
    InvalidConfig(ConfigError),
    /// The item system refused to build or place the configured stack.
    InvalidItem(ItemError),
    /// An authorized actor removed the structure.
    Dismantled,
    /// The structure or its emission point falls outside the world's
    /// coordinate range.
    OutOfBounds,
}

impl fmt::Display for DestroyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DestroyReason::AnchorMissing => f.write_str("anchor block missing"),
            DestroyReason::MalformedTag(e) => write!(f, "malformed tag: {e}"),
            DestroyReason::InvalidConfig(e) => write!(f, "invalid configuration: {e}"),
            DestroyReason::InvalidItem(e) => write!(f, "invalid item: {e}"),
            DestroyReason::Dismantled => f.write_str("dismantled"),
            DestroyReason::OutOfBounds => f.write_str("outside the world's coordinate range"),
        }
    }
}

/// What happened to one generator during one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Counting {
        remaining: u32,
    },
    Emitted {
        item_entity: EntityId,
        stack: ItemStack,
        position: EntityPos,
    },
    Destroyed {
        /// The targeted block, or the marker's own block when the marker
        /// had no room for a structure below it.
        origin: BlockPos,
        reason: DestroyReason,
    },
    /// The marker disappeared between the scan and its turn.
    Vanished,
}

/// Block positions derived from a marker's location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footprint {
    /// The block the operator targeted.
    pub origin: BlockPos,
    pub anchor: BlockPos,
    pub marker: BlockPos,
}

impl Footprint {
    /// `None` when the anchor or marker would leave the column.
    pub fn from_origin(origin: BlockPos, config: &SpawnerConfig) -> Option<Self> {
        let anchor = origin.checked_above(config.anchor_offset)?;
        Some(Self {
            origin,
            anchor,
            marker: anchor.checked_above(1)?,
        })
    }

    pub fn from_marker(marker: EntityPos, config: &SpawnerConfig) -> Option<Self> {
        let marker = marker.floor();
        let anchor = marker.checked_below(1)?;
        Some(Self {
            origin: anchor.checked_below(config.anchor_offset)?,
            anchor,
            marker,
        })
    }

    /// Where items from a marker standing at the centre of this footprint
    /// land.
    pub fn emission_point(&self, config: &SpawnerConfig) -> Option<EntityPos> {
        self.marker.bottom_center().checked_lowered(config.emission_drop)
    }
}

/// Run one tick for one generator and store the resulting state.
pub(crate) fn process_generator<W: World + ?Sized>(
    world: &mut W,
    config: &SpawnerConfig,
    found: &Discovered,
    entry: &mut GeneratorEntry,
) -> TickOutcome {
    let (state, outcome) = advance(world, config, found, entry);
    entry.state = state;
    outcome
}

fn advance<W: World + ?Sized>(
    world: &mut W,
    config: &SpawnerConfig,
    found: &Discovered,
    entry: &GeneratorEntry,
) -> (CountdownState, TickOutcome) {
    let marker = found.entity;
    let region = found.region;

    world.apply_effect(
        marker,
        &StatusEffect::hidden_invisibility(config.invisibility_ticks),
    );

    let Some(marker_pos) = world.entity_position(marker) else {
        return (CountdownState::Destroyed, TickOutcome::Vanished);
    };
    let Some(footprint) = Footprint::from_marker(marker_pos, config) else {
        return retire_stray(world, marker, region, marker_pos);
    };

    if world.block_at(region, footprint.anchor) != Some(config.anchor_block.as_str()) {
        return retire(world, config, marker, region, footprint, DestroyReason::AnchorMissing);
    }

    let tag = match &entry.decoded {
        Ok(tag) => tag,
        Err(e) => {
            let reason = DestroyReason::MalformedTag(e.clone());
            return retire(world, config, marker, region, footprint, reason);
        }
    };
    let interval = match tag.interval() {
        Ok(interval) => interval,
        Err(e) => {
            return retire(world, config, marker, region, footprint, DestroyReason::InvalidConfig(e));
        }
    };

    let mut remaining = match entry.state {
        CountdownState::Counting(cached) => match countdown_from_label(world.label(marker), cached, interval) {
            Some(current) => current - 1,
            None => {
                world.set_label(marker, &interval.to_string());
                return (
                    CountdownState::Counting(interval),
                    TickOutcome::Counting { remaining: interval },
                );
            }
        },
        CountdownState::Uninitialized | CountdownState::Destroyed => {
            world.add_tag(marker, &config.init_tag);
            interval - 1
        }
    };
    let mut outcome = TickOutcome::Counting { remaining };

    if remaining == 0 {
        remaining = interval;
        let Some(position) = marker_pos.checked_lowered(config.emission_drop) else {
            return retire(world, config, marker, region, footprint, DestroyReason::OutOfBounds);
        };
        let spawned = ItemStack::try_new(&tag.item_id, tag.item_count).and_then(|stack| {
            world
                .spawn_item(region, &stack, position)
                .map(|item_entity| (item_entity, stack))
        });
        match spawned {
            Ok((item_entity, stack)) => {
                tracing::debug!(
                    origin = %footprint.origin,
                    %region,
                    %position,
                    item = %stack.item_id,
                    amount = stack.amount,
                    "generator emitted"
                );
                outcome = TickOutcome::Emitted {
                    item_entity,
                    stack,
                    position,
                };
            }
            Err(e) => {
                return retire(world, config, marker, region, footprint, DestroyReason::InvalidItem(e));
            }
        }
    }

    world.set_label(marker, &remaining.to_string());
    (CountdownState::Counting(remaining), outcome)
}

/// The countdown to decrement from. The cached value stands unless the
/// label was edited out of band, in which case a numeric label is adopted
/// after clamping into `1..=interval`. `None` means the label is missing or
/// not a number and the countdown restarts at `interval` without ticking.
fn countdown_from_label(label: Option<&str>, cached: u32, interval: u32) -> Option<u32> {
    let cached = cached.clamp(1, interval);
    let label = label?;
    if label == cached.to_string() {
        return Some(cached);
    }
    let v = label.parse::<i64>().ok()?;
    u32::try_from(v.clamp(1, i64::from(interval))).ok()
}

fn retire<W: World + ?Sized>(
    world: &mut W,
    config: &SpawnerConfig,
    marker: EntityId,
    region: Region,
    footprint: Footprint,
    reason: DestroyReason,
) -> (CountdownState, TickOutcome) {
    remove_structure(world, config, region, footprint.anchor, marker);
    world.broadcast(&format!(
        "[spawner] generator at {} in {region} removed: {reason}",
        footprint.origin
    ));
    tracing::warn!(origin = %footprint.origin, %region, %reason, "generator destroyed");
    (
        CountdownState::Destroyed,
        TickOutcome::Destroyed {
            origin: footprint.origin,
            reason,
        },
    )
}

/// A marker too close to the edge of the column to have a structure at all.
fn retire_stray<W: World + ?Sized>(
    world: &mut W,
    marker: EntityId,
    region: Region,
    position: EntityPos,
) -> (CountdownState, TickOutcome) {
    let block = position.floor();
    let reason = DestroyReason::OutOfBounds;
    world.kill_entity(marker);
    world.broadcast(&format!("[spawner] generator marker at {block} in {region} removed: {reason}"));
    tracing::warn!(marker = %block, %region, %reason, "generator destroyed");
    (
        CountdownState::Destroyed,
        TickOutcome::Destroyed { origin: block, reason },
    )
}

/// Clear the anchor (only if it is still an anchor block) and kill the marker.
pub(crate) fn remove_structure<W: World + ?Sized>(
    world: &mut W,
    config: &SpawnerConfig,
    region: Region,
    anchor: BlockPos,
    marker: EntityId,
) {
    if world.block_at(region, anchor) == Some(config.anchor_block.as_str()) {
        world.clear_block(region, anchor);
    }
    world.kill_entity(marker);
}
