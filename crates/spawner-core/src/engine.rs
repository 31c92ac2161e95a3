//! The generator engine: owns the registry cache and runs the per-tick
//! lifecycle pipeline over a host [`World`].
//!
//! # Architecture
//!
//! The `Engine` owns:
//! - A [`SpawnerConfig`] (tag format, geometry, block and entity types)
//! - A [`GeneratorRegistry`] (decoded tags and countdown state per marker)
//! - An [`EventBus`] for typed lifecycle events
//! - The tick counter
//!
//! The world itself stays with the host; every entry point borrows it.
//!
//! # Tick Pipeline
//!
//! Each `step()` runs:
//! 1. **Scan** -- find every marker with a generator tag, in every region
//! 2. **Reconcile** -- sync the registry cache with the scan
//! 3. **Process** -- validate structure, count down, emit items, retire
//!    broken generators
//! 4. **Post-tick** -- drop retired entries, deliver buffered events
//! 5. **Bookkeeping** -- increment the tick counter

use crate::codec::GeneratorConfig;
use crate::config::SpawnerConfig;
use crate::event::{Event, EventBus, EventKind, PassiveListener};
use crate::fixed::Ticks;
use crate::guard::{Actor, ProtectedStructure, RemovalDecision, check_removal};
use crate::id::{EntityId, Region};
use crate::placement::{GeneratorHandle, GeneratorRequest, PlacementError, place};
use crate::position::BlockPos;
use crate::processor::{DestroyReason, Footprint, TickOutcome, process_generator, remove_structure};
use crate::registry::{CountdownState, GeneratorEntry, GeneratorRegistry};
use crate::scan::scan_generators;
use crate::world::World;

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Everything that happened during one [`Engine::step`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    /// The tick that was processed.
    pub tick: Ticks,
    /// One outcome per generator processed, in scan order.
    pub outcomes: Vec<(EntityId, TickOutcome)>,
}

impl StepReport {
    pub fn emitted_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, TickOutcome::Emitted { .. }))
            .count()
    }

    /// Markers retired this step, with their reasons.
    pub fn destroyed(&self) -> impl Iterator<Item = (EntityId, &DestroyReason)> {
        self.outcomes.iter().filter_map(|(id, o)| match o {
            TickOutcome::Destroyed { reason, .. } => Some((*id, reason)),
            _ => None,
        })
    }

    pub fn outcome(&self, marker: EntityId) -> Option<&TickOutcome> {
        self.outcomes
            .iter()
            .find(|(id, _)| *id == marker)
            .map(|(_, o)| o)
    }
}

/// A read-only view of one registered generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorInfo {
    pub marker: EntityId,
    pub region: Region,
    /// `None` if the tag is malformed or invalid.
    pub config: Option<GeneratorConfig>,
    pub origin: Option<BlockPos>,
    pub state: CountdownState,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Drives every generator in a world, one tick at a time.
///
/// The engine holds no world state of its own beyond the registry cache:
/// the world passed to [`Engine::step`] is the source of truth.
#[derive(Debug)]
pub struct Engine {
    config: SpawnerConfig,
    registry: GeneratorRegistry,
    /// Typed event bus for lifecycle events.
    pub event_bus: EventBus,
    tick: Ticks,
}

impl Engine {
    pub fn new(config: SpawnerConfig) -> Self {
        let event_bus = EventBus::new(config.event_capacity);
        Self {
            config,
            registry: GeneratorRegistry::new(),
            event_bus,
            tick: 0,
        }
    }

    pub fn config(&self) -> &SpawnerConfig {
        &self.config
    }

    /// The number of completed steps.
    pub fn tick(&self) -> Ticks {
        self.tick
    }

    pub fn registry(&self) -> &GeneratorRegistry {
        &self.registry
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    pub fn suppress_event(&mut self, kind: EventKind) {
        self.event_bus.suppress(kind);
    }

    pub fn on_passive(&mut self, kind: EventKind, listener: PassiveListener) {
        self.event_bus.on_passive(kind, listener);
    }

    // -----------------------------------------------------------------------
    // Step
    // -----------------------------------------------------------------------

    /// Advance every generator in `world` by one tick.
    ///
    /// 1. **Scan**: snapshot every generator marker.
    /// 2. **Reconcile**: sync the registry with the snapshot.
    /// 3. **Process**: run each generator; failures are isolated.
    /// 4. **Post-tick**: drop retired entries and deliver events.
    /// 5. **Bookkeeping**: increment the tick counter.
    pub fn step<W: World + ?Sized>(&mut self, world: &mut W) -> StepReport {
        let tick = self.tick;
        let discovered = scan_generators(&*world, &self.config.tag_prefix);

        for marker in self.registry.reconcile(&discovered, &self.config.tag_prefix) {
            if let Some(entry) = self.registry.get(marker) {
                self.event_bus.emit(Event::GeneratorDiscovered {
                    marker,
                    region: entry.region,
                    tick,
                });
            }
        }

        let mut outcomes = Vec::with_capacity(discovered.len());
        for found in &discovered {
            let Some(entry) = self.registry.get_mut(found.entity) else {
                continue;
            };
            if entry.state == CountdownState::Destroyed {
                continue;
            }
            let outcome = process_generator(world, &self.config, found, entry);
            match &outcome {
                TickOutcome::Emitted { stack, .. } => self.event_bus.emit(Event::ItemEmitted {
                    marker: found.entity,
                    region: found.region,
                    item_id: stack.item_id.clone(),
                    amount: stack.amount,
                    tick,
                }),
                TickOutcome::Destroyed { origin, reason } => {
                    self.event_bus.emit(Event::GeneratorDestroyed {
                        marker: found.entity,
                        region: found.region,
                        origin: *origin,
                        reason: reason.clone(),
                        tick,
                    })
                }
                TickOutcome::Counting { .. } | TickOutcome::Vanished => {}
            }
            outcomes.push((found.entity, outcome));
        }

        self.registry.purge_destroyed();
        self.event_bus.deliver();
        self.tick += 1;

        StepReport { tick, outcomes }
    }

    // -----------------------------------------------------------------------
    // Placement
    // -----------------------------------------------------------------------

    /// Validate `request` and build a generator above `origin`.
    ///
    /// An invalid request leaves the world untouched.
    pub fn place_generator<W: World + ?Sized>(
        &mut self,
        world: &mut W,
        region: Region,
        origin: BlockPos,
        request: &GeneratorRequest,
    ) -> Result<GeneratorHandle, PlacementError> {
        let config = request.validate(&self.config.item_namespace)?;
        let placement = place(world, &self.config, region, origin, &config)?;

        for old_marker in placement.replaced {
            self.registry.remove(old_marker);
            self.event_bus.emit(Event::GeneratorReplaced {
                old_marker,
                region,
                origin,
                tick: self.tick,
            });
        }

        let handle = placement.handle;
        if let Some(tag) = world.tags(handle.marker).first().cloned() {
            self.registry.insert(
                handle.marker,
                GeneratorEntry::new(region, tag, &self.config.tag_prefix),
            );
        }
        self.event_bus.emit(Event::GeneratorPlaced {
            marker: handle.marker,
            region,
            origin,
            interval_ticks: config.interval_ticks,
            tick: self.tick,
        });
        Ok(handle)
    }

    // -----------------------------------------------------------------------
    // Removal
    // -----------------------------------------------------------------------

    /// Decide an attempted removal of the block at `pos`. Nothing is
    /// removed here; on a permitted decision the caller follows up with
    /// [`Engine::dismantle`].
    pub fn on_block_removal<W: World + ?Sized>(
        &mut self,
        world: &W,
        region: Region,
        pos: BlockPos,
        actor: &Actor,
    ) -> RemovalDecision {
        let decision = check_removal(world, &self.config, region, pos, actor);
        match decision {
            RemovalDecision::Vetoed(s) => {
                tracing::info!(actor = %actor.name, origin = %s.origin, %region, "removal vetoed");
                self.event_bus.emit(Event::RemovalVetoed {
                    marker: s.marker,
                    region,
                    actor: actor.name.clone(),
                    tick: self.tick,
                });
            }
            RemovalDecision::Permitted(s) => {
                self.event_bus.emit(Event::RemovalPermitted {
                    marker: s.marker,
                    region,
                    actor: actor.name.clone(),
                    tick: self.tick,
                });
            }
            RemovalDecision::Unprotected => {}
        }
        decision
    }

    /// Remove a generator's anchor and marker.
    pub fn dismantle<W: World + ?Sized>(&mut self, world: &mut W, structure: &ProtectedStructure) {
        remove_structure(
            world,
            &self.config,
            structure.region,
            structure.anchor,
            structure.marker,
        );
        self.registry.remove(structure.marker);
        tracing::info!(origin = %structure.origin, region = %structure.region, "generator dismantled");
        self.event_bus.emit(Event::GeneratorDestroyed {
            marker: structure.marker,
            region: structure.region,
            origin: structure.origin,
            reason: DestroyReason::Dismantled,
            tick: self.tick,
        });
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Every generator known to the registry. Markers placed outside the
    /// engine appear after the next step.
    pub fn generators(&self) -> Vec<GeneratorInfo> {
        self.registry
            .iter()
            .map(|(marker, entry)| {
                let decoded = entry.decoded.as_ref().ok();
                GeneratorInfo {
                    marker,
                    region: entry.region,
                    config: decoded.and_then(|d| d.validate(&self.config.item_namespace).ok()),
                    origin: decoded.and_then(|d| d.origin),
                    state: entry.state,
                }
            })
            .collect()
    }

    /// Ticks until `marker` next emits.
    pub fn countdown(&self, marker: EntityId) -> Option<u32> {
        self.registry.get(marker).and_then(GeneratorEntry::remaining)
    }

    /// Where the generator standing on `origin` would have its parts, if it
    /// fits in the column.
    pub fn footprint(&self, origin: BlockPos) -> Option<Footprint> {
        Footprint::from_origin(origin, &self.config)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(SpawnerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::GameMode;
    use crate::item::ItemCatalog;
    use crate::position::EntityPos;
    use crate::sim_world::SimWorld;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn setup() -> (Engine, SimWorld) {
        (Engine::default(), SimWorld::new(ItemCatalog::vanilla()))
    }

    fn request(interval: &str, item: &str, count: &str) -> GeneratorRequest {
        GeneratorRequest::new(interval, item, count)
    }

    #[test]
    fn interval_one_emits_every_step() {
        let (mut engine, mut world) = setup();
        let h = engine
            .place_generator(
                &mut world,
                Region::Overworld,
                BlockPos::new(0, 64, 0),
                &request("1", "minecraft:diamond", "1"),
            )
            .unwrap();

        let report = engine.step(&mut world);
        assert_eq!(report.tick, 0);
        assert_eq!(report.emitted_count(), 1);
        let items = world.dropped_items(Region::Overworld);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].position, EntityPos::from_f64(0.5, 62.0, 0.5));
        assert_eq!(items[0].stack.item_id, "minecraft:diamond");
        assert_eq!(world.label(h.marker), Some("1"));
        assert_eq!(engine.countdown(h.marker), Some(1));
        assert_eq!(engine.tick(), 1);
    }

    #[test]
    fn invalid_request_changes_nothing() {
        let (mut engine, mut world) = setup();
        let err = engine
            .place_generator(
                &mut world,
                Region::Overworld,
                BlockPos::new(0, 64, 0),
                &request("soon", "minecraft:diamond", "1"),
            )
            .unwrap_err();
        assert!(matches!(err, PlacementError::InvalidRequest(_)));
        assert_eq!(world.entity_count(), 0);
        assert_eq!(world.block_count(), 0);
        assert!(engine.registry().is_empty());
    }

    #[test]
    fn destroyed_generators_leave_the_registry() {
        let (mut engine, mut world) = setup();
        let origin = BlockPos::new(0, 64, 0);
        let h = engine
            .place_generator(&mut world, Region::Overworld, origin, &request("3", "minecraft:diamond", "1"))
            .unwrap();
        engine.step(&mut world);
        world.clear_block(Region::Overworld, h.anchor);

        let report = engine.step(&mut world);
        let destroyed: Vec<_> = report.destroyed().collect();
        assert_eq!(destroyed, vec![(h.marker, &DestroyReason::AnchorMissing)]);
        assert!(engine.registry().is_empty());
        assert!(engine.step(&mut world).outcomes.is_empty());
    }

    #[test]
    fn one_failure_does_not_stop_the_others() {
        let (mut engine, mut world) = setup();
        let bad = engine
            .place_generator(&mut world, Region::Overworld, BlockPos::new(0, 64, 0), &request("1", "minecraft:nope", "1"))
            .unwrap();
        let good = engine
            .place_generator(&mut world, Region::Overworld, BlockPos::new(5, 64, 0), &request("1", "minecraft:coal", "1"))
            .unwrap();

        let report = engine.step(&mut world);
        assert!(matches!(report.outcome(bad.marker), Some(TickOutcome::Destroyed { .. })));
        assert!(matches!(report.outcome(good.marker), Some(TickOutcome::Emitted { .. })));
    }

    #[test]
    fn markers_from_outside_are_discovered() {
        let (mut engine, mut world) = setup();
        let config = engine.config().clone();
        let fp = engine.footprint(BlockPos::new(1, 70, 1)).unwrap();
        world.set_block(Region::End, fp.anchor, &config.anchor_block);
        let marker = world
            .spawn_entity(Region::End, &config.marker_entity, fp.marker.bottom_center())
            .unwrap();
        world.add_tag(marker, "gen:2,minecraft:ender_pearl,1,1,70,1");

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        engine.on_passive(
            EventKind::GeneratorDiscovered,
            Box::new(move |e: &Event| sink.borrow_mut().push(e.marker())),
        );

        assert_eq!(engine.step(&mut world).emitted_count(), 0);
        assert_eq!(engine.step(&mut world).emitted_count(), 1);
        assert_eq!(*seen.borrow(), vec![marker]);
        assert_eq!(world.dropped_total(Region::End, "minecraft:ender_pearl"), 1);

        let info = engine.generators();
        assert_eq!(info.len(), 1);
        assert_eq!(info[0].origin, Some(BlockPos::new(1, 70, 1)));
        assert_eq!(info[0].config.as_ref().map(|c| c.interval_ticks), Some(2));
    }

    #[test]
    fn vetoed_and_permitted_removals() {
        let (mut engine, mut world) = setup();
        let origin = BlockPos::new(0, 64, 0);
        let h = engine
            .place_generator(&mut world, Region::Overworld, origin, &request("5", "minecraft:diamond", "1"))
            .unwrap();

        let steve = Actor::new("steve", GameMode::Survival);
        let decision = engine.on_block_removal(&world, Region::Overworld, origin, &steve);
        assert!(decision.is_vetoed());
        assert_eq!(engine.event_bus.buffered_count(EventKind::RemovalVetoed), 1);

        let alex = Actor::new("alex", GameMode::Creative);
        let RemovalDecision::Permitted(s) =
            engine.on_block_removal(&world, Region::Overworld, origin, &alex)
        else {
            panic!("creative removal should be permitted");
        };
        engine.dismantle(&mut world, &s);
        assert!(world.entity(h.marker).is_none());
        assert_eq!(world.block_at(Region::Overworld, h.anchor), None);
        assert!(engine.registry().is_empty());
        assert_eq!(engine.event_bus.total_emitted(EventKind::GeneratorDestroyed), 1);
    }

    #[test]
    fn suppressed_kinds_are_not_buffered() {
        let (mut engine, mut world) = setup();
        engine.suppress_event(EventKind::GeneratorPlaced);
        engine
            .place_generator(&mut world, Region::Overworld, BlockPos::new(0, 64, 0), &request("5", "minecraft:diamond", "1"))
            .unwrap();
        assert_eq!(engine.event_bus.buffered_count(EventKind::GeneratorPlaced), 0);
    }
}
