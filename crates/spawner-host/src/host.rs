//! The host adapter: a world, an engine, and the people poking at them.

use crate::error::HostError;
use crate::form::FormResponse;
use crate::interaction::{FormRequest, Interaction, ItemUse, handle_item_use};
use crate::settings::HostSettings;
use spawner_core::engine::{Engine, StepReport};
use spawner_core::guard::{Actor, RemovalDecision};
use spawner_core::id::Region;
use spawner_core::item::ItemCatalog;
use spawner_core::placement::GeneratorHandle;
use spawner_core::position::BlockPos;
use spawner_core::sim_world::SimWorld;
use spawner_core::world::World;
use std::collections::HashMap;

/// Result of a block break attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakOutcome {
    /// The block was removed. `dismantled` is set when a generator went
    /// with it.
    Removed { dismantled: bool },
    Vetoed,
}

/// Owns the world and the engine and routes host events into them.
#[derive(Debug)]
pub struct Host {
    settings: HostSettings,
    world: SimWorld,
    engine: Engine,
    /// Open forms, by actor name.
    pending: HashMap<String, FormRequest>,
    /// Messages addressed to one actor, oldest first.
    notifications: HashMap<String, Vec<String>>,
}

impl Host {
    pub fn new(settings: HostSettings, catalog: ItemCatalog) -> Self {
        Self::with_world(settings, SimWorld::new(catalog))
    }

    pub fn with_world(settings: HostSettings, world: SimWorld) -> Self {
        let engine = Engine::new(settings.spawner.clone());
        Self {
            settings,
            world,
            engine,
            pending: HashMap::new(),
            notifications: HashMap::new(),
        }
    }

    pub fn settings(&self) -> &HostSettings {
        &self.settings
    }

    pub fn world(&self) -> &SimWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut SimWorld {
        &mut self.world
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    // -----------------------------------------------------------------------
    // Host events
    // -----------------------------------------------------------------------

    /// An actor used an item on a block. Opens a form if the trigger item
    /// was used; a form already open for the same actor is replaced.
    pub fn use_item(&mut self, item_use: &ItemUse) -> Interaction {
        let interaction = handle_item_use(&self.settings, item_use);
        if let Some(request) = &interaction.form {
            tracing::debug!(actor = %item_use.actor.name, target = %request.target, "opened generator form");
            self.pending
                .insert(item_use.actor.name.clone(), request.clone());
        }
        interaction
    }

    /// The actor closed their form. Invalid input is reported to the actor
    /// and returned as an error; the world is left unchanged.
    pub fn submit_form(
        &mut self,
        actor: &Actor,
        response: FormResponse,
    ) -> Result<Option<GeneratorHandle>, HostError> {
        let request = self
            .pending
            .remove(&actor.name)
            .ok_or_else(|| HostError::NoPendingForm {
                actor: actor.name.clone(),
            })?;

        let Some(generator) = response.into_request()? else {
            return Ok(None);
        };

        match self
            .engine
            .place_generator(&mut self.world, request.region, request.target, &generator)
        {
            Ok(handle) => {
                self.notify(
                    &actor.name,
                    format!("Generator placed at {} in {}.", handle.origin, handle.region),
                );
                Ok(Some(handle))
            }
            Err(e) => {
                self.notify(&actor.name, format!("Generator rejected: {e}"));
                Err(e.into())
            }
        }
    }

    /// An actor tries to break the block at `pos`.
    pub fn break_block(&mut self, actor: &Actor, region: Region, pos: BlockPos) -> BreakOutcome {
        match self.engine.on_block_removal(&self.world, region, pos, actor) {
            RemovalDecision::Vetoed(_) => {
                self.notify(&actor.name, "This block is protected by a generator.".to_string());
                BreakOutcome::Vetoed
            }
            RemovalDecision::Permitted(structure) => {
                self.world.clear_block(region, pos);
                self.engine.dismantle(&mut self.world, &structure);
                BreakOutcome::Removed { dismantled: true }
            }
            RemovalDecision::Unprotected => {
                self.world.clear_block(region, pos);
                BreakOutcome::Removed { dismantled: false }
            }
        }
    }

    /// Run one engine step.
    pub fn tick(&mut self) -> StepReport {
        self.engine.step(&mut self.world)
    }

    // -----------------------------------------------------------------------
    // Notifications
    // -----------------------------------------------------------------------

    fn notify(&mut self, actor: &str, message: String) {
        self.notifications
            .entry(actor.to_string())
            .or_default()
            .push(message);
    }

    pub fn notifications(&self, actor: &str) -> &[String] {
        self.notifications
            .get(actor)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn take_notifications(&mut self, actor: &str) -> Vec<String> {
        self.notifications.remove(actor).unwrap_or_default()
    }

    pub fn has_pending_form(&self, actor: &str) -> bool {
        self.pending.contains_key(actor)
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Snapshot the world.
    pub fn save(&self) -> Result<Vec<u8>, HostError> {
        Ok(self.world.save(self.engine.tick())?)
    }

    /// Replace the world with a snapshot. The engine starts over: every
    /// generator is rediscovered and its countdown re-initialized.
    pub fn reload(&mut self, data: &[u8]) -> Result<(), HostError> {
        let (world, header) = SimWorld::load(data, self.world.catalog().clone())?;
        tracing::info!(tick = header.tick, "world reloaded");
        self.world = world;
        self.engine = Engine::new(self.settings.spawner.clone());
        self.pending.clear();
        Ok(())
    }
}
