//! Spawner Core -- the lifecycle engine for periodic item generators.
//!
//! A generator is an anchor block high above a targeted block, with a
//! marker entity standing on it. The marker's tag is the generator's only
//! durable state; its label shows the countdown to the next emission.
//!
//! [`engine::Engine::step`] advances every generator by one tick; the
//! engine module documents the pipeline.
//!
//! # Key Types
//!
//! - [`engine::Engine`] -- Pipeline orchestrator, placement and removal
//!   entry points.
//! - [`world::World`] -- The host world contract.
//!   [`sim_world::SimWorld`] implements it in memory.
//! - [`codec`] -- The `gen:` tag format.
//! - [`registry::GeneratorRegistry`] -- Cached decoded tags and explicit
//!   countdown states.
//! - [`guard`] -- Removal protection for generator structures.
//! - [`event::EventBus`] -- Typed lifecycle events with buffered delivery.
//! - [`serialize`] -- Versioned world snapshots via bitcode.

pub mod codec;
pub mod config;
pub mod engine;
pub mod event;
pub mod fixed;
pub mod guard;
pub mod id;
pub mod item;
pub mod placement;
pub mod position;
pub mod processor;
pub mod registry;
pub mod scan;
pub mod serialize;
pub mod sim_world;
pub mod world;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
