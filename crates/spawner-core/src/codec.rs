//! Generator configuration codec.
//!
//! A generator is persisted as a single entity tag:
//!
//! ```text
//! gen:<interval>,<item_id>,<item_count>,<x>,<y>,<z>
//! ```
//!
//! where `(x, y, z)` is the block the operator targeted. Decoding is strict
//! about the comma layout but lenient about the numbers: a numeric field
//! that does not parse decodes as `None` and is rejected later by whoever
//! needs the value. Decoding never panics.

use crate::position::BlockPos;

/// Number of comma-separated fields after the prefix.
pub const TAG_FIELD_COUNT: usize = 6;

/// A fully validated generator configuration.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GeneratorConfig {
    /// Ticks between emissions. Always at least 1.
    pub interval_ticks: u32,
    /// Namespaced item identifier, e.g. `minecraft:diamond`.
    pub item_id: String,
    /// Items per emission. Always at least 1.
    pub item_count: u32,
}

/// The raw contents of a generator tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTag {
    pub interval_ticks: Option<i64>,
    pub item_id: String,
    pub item_count: Option<i64>,
    /// The targeted block, if all three coordinates parsed.
    pub origin: Option<BlockPos>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("tag '{tag}' does not start with '{prefix}'")]
    MissingPrefix { tag: String, prefix: String },
    #[error("expected {TAG_FIELD_COUNT} comma-separated fields, found {found}")]
    FieldCount { found: usize },
}

/// Why a configuration (from a tag or from user input) is unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("interval must be a whole number")]
    IntervalNotANumber,
    #[error("interval must be at least 1 tick, got {0}")]
    IntervalOutOfRange(i64),
    #[error("item count must be a whole number")]
    CountNotANumber,
    #[error("item count must be at least 1, got {0}")]
    CountOutOfRange(i64),
    #[error("item id is empty")]
    EmptyItemId,
    #[error("item id '{id}' must look like '{namespace}:<name>'")]
    ItemNamespace { id: String, namespace: String },
}

/// Encode a generator configuration into its tag string.
pub fn encode_tag(prefix: &str, config: &GeneratorConfig, origin: BlockPos) -> String {
    format!(
        "{prefix}{},{},{},{},{},{}",
        config.interval_ticks, config.item_id, config.item_count, origin.x, origin.y, origin.z
    )
}

/// Decode a tag string. Only the exact `prefix` + six comma fields layout
/// is accepted.
pub fn decode_tag(prefix: &str, tag: &str) -> Result<DecodedTag, CodecError> {
    let body = tag
        .strip_prefix(prefix)
        .ok_or_else(|| CodecError::MissingPrefix {
            tag: tag.to_string(),
            prefix: prefix.to_string(),
        })?;

    let fields: Vec<&str> = body.split(',').collect();
    if fields.len() != TAG_FIELD_COUNT {
        return Err(CodecError::FieldCount {
            found: fields.len(),
        });
    }

    let coord = |field: &str| parse_whole(field).and_then(|v| i32::try_from(v).ok());
    let origin = match (coord(fields[3]), coord(fields[4]), coord(fields[5])) {
        (Some(x), Some(y), Some(z)) => Some(BlockPos::new(x, y, z)),
        _ => None,
    };

    Ok(DecodedTag {
        interval_ticks: parse_whole(fields[0]),
        item_id: fields[1].to_string(),
        item_count: parse_whole(fields[2]),
        origin,
    })
}

/// Strict base-10 integer parse. `None` stands in for "not a number".
pub fn parse_whole(field: &str) -> Option<i64> {
    field.parse::<i64>().ok()
}

impl DecodedTag {
    /// The emission interval, if it is a usable positive number.
    pub fn interval(&self) -> Result<u32, ConfigError> {
        positive(
            self.interval_ticks,
            ConfigError::IntervalNotANumber,
            ConfigError::IntervalOutOfRange,
        )
    }

    /// Validate every field and produce a [`GeneratorConfig`].
    pub fn validate(&self, namespace: &str) -> Result<GeneratorConfig, ConfigError> {
        let interval_ticks = self.interval()?;
        check_item_id(&self.item_id, namespace)?;
        let item_count = positive(
            self.item_count,
            ConfigError::CountNotANumber,
            ConfigError::CountOutOfRange,
        )?;
        Ok(GeneratorConfig {
            interval_ticks,
            item_id: self.item_id.clone(),
            item_count,
        })
    }
}

/// Check that `id` is `<namespace>:<name>` with a non-empty name.
pub fn check_item_id(id: &str, namespace: &str) -> Result<(), ConfigError> {
    if id.is_empty() {
        return Err(ConfigError::EmptyItemId);
    }
    let name = id
        .strip_prefix(namespace)
        .and_then(|rest| rest.strip_prefix(':'));
    match name {
        Some(name) if !name.is_empty() && !name.contains([':', ',']) => Ok(()),
        _ => Err(ConfigError::ItemNamespace {
            id: id.to_string(),
            namespace: namespace.to_string(),
        }),
    }
}

fn positive(
    value: Option<i64>,
    nan: ConfigError,
    out_of_range: fn(i64) -> ConfigError,
) -> Result<u32, ConfigError> {
    let v = value.ok_or(nan)?;
    match u32::try_from(v) {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(out_of_range(v)),
    }
}
