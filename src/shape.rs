//! Shapes, cell tags and block sides.
//!
//! Cell tags are never checked here. Whoever builds a `Shape` is
//! responsible for giving it `x * y * z` cells.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-cell tag of a structure shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellTag {
    Empty,
    Floor,
    Solid,
}

impl CellTag {
    /// Numeric code used by the client encoding. Shares the code space
    /// of [`BlockShape`].
    pub fn code(self) -> u8 {
        match self {
            CellTag::Empty => 0,
            CellTag::Floor => 1,
            CellTag::Solid => 2,
        }
    }
}

/// Structure footprint in cells plus one tag per cell, x fastest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    pub size: [u32; 3],
    pub cells: Vec<CellTag>,
}

impl Shape {
    pub fn new(x: u32, y: u32, z: u32, cells: Vec<CellTag>) -> Self {
        Self { size: [x, y, z], cells }
    }

    /// A shape whose every cell is `solid`. `None` when the cell count
    /// does not fit in `usize`.
    pub fn solid(x: u32, y: u32, z: u32) -> Option<Self> {
        Self::filled(x, y, z, CellTag::Solid)
    }

    pub fn filled(x: u32, y: u32, z: u32, tag: CellTag) -> Option<Self> {
        let count = usize::try_from(x)
            .ok()?
            .checked_mul(usize::try_from(y).ok()?)?
            .checked_mul(usize::try_from(z).ok()?)?;
        Some(Self::new(x, y, z, vec![tag; count]))
    }

    /// One solid cell.
    pub fn unit() -> Self {
        Self::new(1, 1, 1, vec![CellTag::Solid])
    }

    pub fn codes(&self) -> Vec<u8> {
        self.cells.iter().map(|c| c.code()).collect()
    }
}

/// Whole-block shape of a terrain block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockShape {
    Empty,
    Floor,
    #[default]
    Solid,
    RampE,
    RampW,
    RampS,
    RampN,
    RampTop,
}

impl BlockShape {
    pub fn code(self) -> u8 {
        match self {
            BlockShape::Empty => 0,
            BlockShape::Floor => 1,
            BlockShape::Solid => 2,
            BlockShape::RampE => 3,
            BlockShape::RampW => 4,
            BlockShape::RampS => 5,
            BlockShape::RampN => 6,
            BlockShape::RampTop => 7,
        }
    }
}

/// One face of a terrain block.
///
/// The declaration order is the canonical side order: `Ord`, [`Side::ALL`]
/// and every encoding follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Bottom,
    North,
    South,
    East,
    West,
}

impl Side {
    pub const ALL: [Side; 6] = [
        Side::Top,
        Side::Bottom,
        Side::North,
        Side::South,
        Side::East,
        Side::West,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Bottom => "bottom",
            Side::North => "north",
            Side::South => "south",
            Side::East => "east",
            Side::West => "west",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_shape_cell_count() {
        let s = Shape::solid(3, 1, 2).unwrap();
        assert_eq!(s.cells.len(), 6);
        assert!(s.codes().iter().all(|&c| c == 2));
        assert_eq!(Shape::unit(), Shape::solid(1, 1, 1).unwrap());
    }

    #[test]
    fn test_oversized_footprint_is_rejected() {
        assert_eq!(Shape::solid(u32::MAX, u32::MAX, u32::MAX), None);
        assert_eq!(Shape::filled(0, u32::MAX, 4, CellTag::Floor).map(|s| s.cells.len()), Some(0));
    }

    #[test]
    fn test_side_order_is_canonical() {
        let mut sides = vec![Side::West, Side::Top, Side::North, Side::Bottom];
        sides.sort();
        assert_eq!(sides, vec![Side::Top, Side::Bottom, Side::North, Side::West]);
    }

    #[test]
    fn test_block_shape_serde_names() {
        let json = serde_json::to_string(&BlockShape::RampTop).unwrap();
        assert_eq!(json, r#""ramp_top""#);
        assert_eq!(BlockShape::RampTop.code(), 7);
    }
}
