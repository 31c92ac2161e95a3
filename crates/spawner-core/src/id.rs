use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use std::fmt;

new_key_type! {
    /// Identifies an entity (generator marker or dropped item) in a world.
    pub struct EntityId;
}

/// One of the world's parallel dimensions. Generators in different regions
/// never interact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    Overworld,
    Nether,
    End,
}

impl Region {
    /// Every region, in scan order.
    pub const ALL: [Region; 3] = [Region::Overworld, Region::Nether, Region::End];

    /// Host-facing dimension identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Region::Overworld => "overworld",
            Region::Nether => "nether",
            Region::End => "the_end",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
