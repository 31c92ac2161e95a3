//! Host settings: engine configuration plus the adapter's own knobs.
//!
//! Settings files may be RON, TOML or JSON; the format is detected from the
//! extension. Every field is optional and falls back to its default.

use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use spawner_core::config::SpawnerConfig;
use spawner_core::item::ItemCatalog;
use std::path::Path;

// ===========================================================================
// Settings
// ===========================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostSettings {
    pub spawner: SpawnerConfig,
    /// Item that opens the configuration form when used on a block.
    pub trigger_item: String,
    pub form: FormDefaults,
    /// Items known on top of the vanilla catalog, e.g. from mods.
    pub extra_items: Vec<String>,
    /// Default log filter when `RUST_LOG` is not set.
    pub log_level: String,
}

impl HostSettings {
    /// The vanilla catalog extended with `extra_items`.
    pub fn item_catalog(&self) -> Result<ItemCatalog, SettingsError> {
        let mut builder = ItemCatalog::vanilla().into_builder();
        for id in &self.extra_items {
            builder.register(id)?;
        }
        Ok(builder.build())
    }
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            spawner: SpawnerConfig::default(),
            trigger_item: "minecraft:blaze_rod".to_string(),
            form: FormDefaults::default(),
            extra_items: Vec::new(),
            log_level: "info".to_string(),
        }
    }
}

/// Values pre-filled in the configuration form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormDefaults {
    pub interval: String,
    pub item_id: String,
    pub item_count: String,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            interval: "200".to_string(),
            item_id: "minecraft:diamond".to_string(),
            item_count: "1".to_string(),
        }
    }
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported settings file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, SettingsError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(SettingsError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// Loading
// ===========================================================================

/// Read and parse a settings file.
pub fn load_settings(path: &Path) -> Result<HostSettings, SettingsError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    let settings = parse_settings(&content, format).map_err(|detail| SettingsError::Parse {
        file: path.to_path_buf(),
        detail,
    })?;
    tracing::debug!(file = %path.display(), ?format, "loaded settings");
    Ok(settings)
}

/// Parse settings text in the given format.
pub fn parse_settings(content: &str, format: Format) -> Result<HostSettings, String> {
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| e.to_string()),
        Format::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        Format::Toml => toml::from_str(content).map_err(|e| e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn format_from_extension() {
        assert_eq!(detect_format(Path::new("a.ron")).unwrap(), Format::Ron);
        assert_eq!(detect_format(Path::new("a.toml")).unwrap(), Format::Toml);
        assert_eq!(detect_format(Path::new("a.json")).unwrap(), Format::Json);
        assert!(matches!(
            detect_format(Path::new("a.yaml")),
            Err(SettingsError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn empty_documents_are_all_defaults() {
        assert_eq!(parse_settings(r#"(log_level: "info")"#, Format::Ron).unwrap(), HostSettings::default());
        assert_eq!(parse_settings("", Format::Toml).unwrap(), HostSettings::default());
        assert_eq!(parse_settings("{}", Format::Json).unwrap(), HostSettings::default());
    }

    #[test]
    fn partial_overrides_keep_other_defaults() {
        let toml = r#"
trigger_item = "minecraft:stick"

[spawner]
anchor_offset = 10
"#;
        let s = parse_settings(toml, Format::Toml).unwrap();
        assert_eq!(s.trigger_item, "minecraft:stick");
        assert_eq!(s.spawner.anchor_offset, 10);
        assert_eq!(s.spawner.emission_drop, 98);
        assert_eq!(s.form, FormDefaults::default());

        let json = r#"{ "form": { "interval": "20" } }"#;
        let s = parse_settings(json, Format::Json).unwrap();
        assert_eq!(s.form.interval, "20");
        assert_eq!(s.form.item_id, "minecraft:diamond");

        let ron = r#"(spawner: (tag_prefix: "spawner:"), log_level: "debug")"#;
        let s = parse_settings(ron, Format::Ron).unwrap();
        assert_eq!(s.spawner.tag_prefix, "spawner:");
        assert_eq!(s.log_level, "debug");
    }

    #[test]
    fn extra_items_extend_the_catalog() {
        let s = parse_settings(r#"extra_items = ["mymod:ruby"]"#, Format::Toml).unwrap();
        let catalog = s.item_catalog().unwrap();
        assert!(catalog.contains("mymod:ruby"));
        assert!(catalog.contains("minecraft:diamond"));

        let bad = parse_settings(r#"{ "extra_items": ["ruby"] }"#, Format::Json).unwrap();
        assert!(matches!(bad.item_catalog(), Err(SettingsError::InvalidItem(_))));
    }

    #[test]
    fn load_reports_missing_files() {
        let path = PathBuf::from("/definitely/not/here/settings.ron");
        assert!(matches!(load_settings(&path), Err(SettingsError::Io(_))));
    }

    #[test]
    fn load_reports_parse_errors_with_file() {
        let dir = std::env::temp_dir().join("spawner-host-settings-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        match load_settings(&path) {
            Err(SettingsError::Parse { file, .. }) => assert_eq!(file, path),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
