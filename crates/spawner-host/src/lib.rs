//! Spawner Host -- adapters between a game host and the spawner engine.
//!
//! - [`settings`] -- Settings files (RON, TOML or JSON) with defaults.
//! - [`form`] -- The three-field configuration form.
//! - [`interaction`] -- Trigger-item use.
//! - [`host::Host`] -- Routes item use, form submissions, block breaks and
//!   ticks into a world and an engine.
//! - [`scenario`] -- Scripted runs for the headless runner.

pub mod error;
pub mod form;
pub mod host;
pub mod interaction;
pub mod scenario;
pub mod settings;

pub use error::{HostError, ScenarioError, SettingsError};
