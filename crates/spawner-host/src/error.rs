use spawner_core::item::ItemError;
use spawner_core::placement::PlacementError;
use spawner_core::serialize::SnapshotError;
use std::path::PathBuf;

/// Errors that can occur while loading a settings file.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// An extra item id is not namespaced.
    #[error("invalid extra item: {0}")]
    InvalidItem(#[from] ItemError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by the host adapter.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// A form was submitted but none was open for this actor.
    #[error("no configuration form is open for '{actor}'")]
    NoPendingForm { actor: String },

    /// The host returned the wrong number of form values.
    #[error("expected {expected} form values, got {found}")]
    FormShape { expected: usize, found: usize },

    #[error(transparent)]
    Placement(#[from] PlacementError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Errors that can occur while loading or running a scenario.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// Failed to parse a scenario file.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// A scripted action failed.
    #[error("scenario '{title}' failed at tick {tick}: {source}")]
    Action {
        title: String,
        tick: u64,
        source: HostError,
    },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
