//! Block-aligned and continuous world coordinates.
//!
//! Blocks live on the integer lattice ([`BlockPos`]); entities float freely
//! ([`EntityPos`]). Matching an entity to a block always floors, so an
//! entity centred at `(0.5, 160.0, 0.5)` occupies block `(0, 160, 0)`.

use crate::fixed::{Fixed64, f64_to_fixed64, fixed64_to_f64};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An integer block coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The block `n` units higher in the same column, if it exists.
    pub fn checked_above(self, n: i32) -> Option<Self> {
        Some(Self {
            y: self.y.checked_add(n)?,
            ..self
        })
    }

    /// The block `n` units lower in the same column, if it exists.
    pub fn checked_below(self, n: i32) -> Option<Self> {
        Some(Self {
            y: self.y.checked_sub(n)?,
            ..self
        })
    }

    /// The horizontal centre of this block at its bottom face.
    pub fn bottom_center(self) -> EntityPos {
        let half = Fixed64::from_num(0.5);
        EntityPos {
            x: Fixed64::from_num(self.x) + half,
            y: Fixed64::from_num(self.y),
            z: Fixed64::from_num(self.z) + half,
        }
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// A continuous entity coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityPos {
    pub x: Fixed64,
    pub y: Fixed64,
    pub z: Fixed64,
}

impl EntityPos {
    pub fn new(x: Fixed64, y: Fixed64, z: Fixed64) -> Self {
        Self { x, y, z }
    }

    pub fn from_f64(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: f64_to_fixed64(x),
            y: f64_to_fixed64(y),
            z: f64_to_fixed64(z),
        }
    }

    /// The block this position falls inside.
    pub fn floor(&self) -> BlockPos {
        BlockPos {
            x: self.x.floor().to_num::<i32>(),
            y: self.y.floor().to_num::<i32>(),
            z: self.z.floor().to_num::<i32>(),
        }
    }

    /// This position moved `dy` units straight down, or `None` if that
    /// leaves the coordinate range.
    pub fn checked_lowered(self, dy: i32) -> Option<Self> {
        Some(Self {
            y: self.y.checked_sub(Fixed64::checked_from_num(dy)?)?,
            ..self
        })
    }
}

impl fmt::Display for EntityPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.2}, {:.2}, {:.2})",
            fixed64_to_f64(self.x),
            fixed64_to_f64(self.y),
            fixed64_to_f64(self.z)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_pos_display() {
        let p = EntityPos::from_f64(0.5, 62.0, -3.25);
        assert_eq!(p.to_string(), "(0.50, 62.00, -3.25)");
    }

    #[test]
    fn above_and_below_stay_in_column() {
        let p = BlockPos::new(3, 64, -7);
        let up = p.checked_above(95).unwrap();
        assert_eq!(up, BlockPos::new(3, 159, -7));
        assert_eq!(up.checked_below(95), Some(p));
    }

    #[test]
    fn bottom_center_floors_back_to_block() {
        let p = BlockPos::new(-4, 70, 12);
        let c = p.bottom_center();
        assert_eq!(c, EntityPos::from_f64(-3.5, 70.0, 12.5));
        assert_eq!(c.floor(), p);
    }

    #[test]
    fn floor_handles_negative_fractions() {
        let e = EntityPos::from_f64(-0.25, 63.999, -10.5);
        assert_eq!(e.floor(), BlockPos::new(-1, 63, -11));
    }

    #[test]
    fn lowered_keeps_horizontal_offset() {
        let e = EntityPos::from_f64(0.5, 160.0, 0.5).checked_lowered(98);
        assert_eq!(e, Some(EntityPos::from_f64(0.5, 62.0, 0.5)));
    }

    #[test]
    fn column_edges_have_no_neighbours() {
        assert_eq!(BlockPos::new(0, i32::MAX - 1, 0).checked_above(10), None);
        assert_eq!(BlockPos::new(0, i32::MIN, 0).checked_below(1), None);
        let bottom = BlockPos::new(0, i32::MIN + 5, 0).bottom_center();
        assert_eq!(bottom.checked_lowered(98), None);
        assert!(bottom.checked_lowered(5).is_some());
    }
}
