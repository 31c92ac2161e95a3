//! Item stacks and the item catalog.
//!
//! The catalog follows a two-phase lifecycle: items are registered on an
//! [`ItemCatalogBuilder`], then the builder is frozen into an immutable
//! [`ItemCatalog`]. Worlds consult the catalog when asked to spawn a stack,
//! which is how a well-formed but non-existent identifier gets rejected.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Largest amount a single stack may hold.
pub const MAX_STACK_SIZE: u32 = 255;

/// A stack of identical items ready to be placed in the world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item_id: String,
    pub amount: u32,
}

impl ItemStack {
    /// Build a stack, applying the same checks the host item system does.
    ///
    /// `amount` is `None` when the configured count was not a number.
    pub fn try_new(item_id: &str, amount: Option<i64>) -> Result<Self, ItemError> {
        if !is_namespaced(item_id) {
            return Err(ItemError::MalformedId(item_id.to_string()));
        }
        let amount = amount.ok_or(ItemError::AmountNotANumber)?;
        let amount = u32::try_from(amount)
            .ok()
            .filter(|n| (1..=MAX_STACK_SIZE).contains(n))
            .ok_or(ItemError::AmountOutOfRange(amount))?;
        Ok(Self {
            item_id: item_id.to_string(),
            amount,
        })
    }
}

/// `<namespace>:<name>` with both halves non-empty and no whitespace.
pub fn is_namespaced(id: &str) -> bool {
    match id.split_once(':') {
        Some((ns, name)) => {
            !ns.is_empty()
                && !name.is_empty()
                && !name.contains(':')
                && !id.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemError {
    #[error("'{0}' is not a namespaced item id")]
    MalformedId(String),
    #[error("unknown item '{0}'")]
    UnknownItem(String),
    #[error("item amount is not a number")]
    AmountNotANumber,
    #[error("item amount {0} is outside 1..={MAX_STACK_SIZE}")]
    AmountOutOfRange(i64),
}

/// Builder for an immutable [`ItemCatalog`].
#[derive(Debug, Default)]
pub struct ItemCatalogBuilder {
    items: BTreeSet<String>,
}

impl ItemCatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an item identifier. Duplicates are ignored.
    pub fn register(&mut self, id: &str) -> Result<&mut Self, ItemError> {
        if !is_namespaced(id) {
            return Err(ItemError::MalformedId(id.to_string()));
        }
        self.items.insert(id.to_string());
        Ok(self)
    }

    pub fn build(self) -> ItemCatalog {
        ItemCatalog { items: self.items }
    }
}

/// Immutable set of item identifiers the world knows how to construct.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemCatalog {
    items: BTreeSet<String>,
}

const VANILLA_ITEMS: &[&str] = &[
    "minecraft:apple",
    "minecraft:arrow",
    "minecraft:bone",
    "minecraft:bread",
    "minecraft:coal",
    "minecraft:cobblestone",
    "minecraft:copper_ingot",
    "minecraft:diamond",
    "minecraft:dirt",
    "minecraft:emerald",
    "minecraft:ender_pearl",
    "minecraft:gold_ingot",
    "minecraft:gunpowder",
    "minecraft:iron_ingot",
    "minecraft:lapis_lazuli",
    "minecraft:netherite_scrap",
    "minecraft:oak_log",
    "minecraft:quartz",
    "minecraft:redstone",
    "minecraft:stone",
    "minecraft:string",
];

impl ItemCatalog {
    /// A catalog of common vanilla items.
    pub fn vanilla() -> Self {
        Self {
            items: VANILLA_ITEMS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    /// Reopen the catalog to register more items.
    pub fn into_builder(self) -> ItemCatalogBuilder {
        ItemCatalogBuilder { items: self.items }
    }
}
