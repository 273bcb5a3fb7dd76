use std::f64::consts::TAU;
use std::fmt;

use bevy::math::DVec2;

use crate::geodetic::Geodetic2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quad {
    NorthWest = 0,
    NorthEast = 1,
    SouthWest = 2,
    SouthEast = 3,
}
impl Quad {
    pub const ALL: [Quad; 4] = [
        Quad::NorthWest,
        Quad::NorthEast,
        Quad::SouthWest,
        Quad::SouthEast,
    ];
    pub fn from_index(i: usize) -> Self {
        return Quad::ALL[i % 4];
    }
    pub fn is_east(&self) -> bool {
        return *self as usize % 2 == 1;
    }
    pub fn is_north(&self) -> bool {
        return (*self as usize) < 2;
    }
}

/// Quadtree address. Level `L` has `2^L` columns and `2^(L-1)` rows, row 0 is the
/// northernmost. The two hemisphere roots live at level 1.
#[derive(Default, Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct TileIndex {
    pub x: u32,
    pub y: u32,
    pub level: u32,
}
impl TileIndex {
    pub const WEST_ROOT: TileIndex = TileIndex { x: 0, y: 0, level: 1 };
    pub const EAST_ROOT: TileIndex = TileIndex { x: 1, y: 0, level: 1 };

    pub fn new(x: u32, y: u32, level: u32) -> Self {
        Self { x, y, level }
    }
    pub fn from_geodetic(point: Geodetic2, level: u32) -> Self {
        let num_tiles = (1u64 << level) as f64;
        let u = 0.5 + point.lon / TAU;
        let v = 0.25 - point.lat / TAU;
        let columns = 1u64 << level;
        let rows = (columns / 2).max(1);
        let x = ((num_tiles * u).floor().max(0.0) as u64).min(columns - 1);
        let y = ((num_tiles * v).floor().max(0.0) as u64).min(rows - 1);
        return TileIndex::new(x as u32, y as u32, level);
    }
    pub fn is_valid(&self) -> bool {
        if self.level < 1 || self.level > 31 {
            return false;
        }
        let columns = 1u64 << self.level;
        return (self.x as u64) < columns && (self.y as u64) < columns / 2;
    }
    /// The hemisphere roots have no parent.
    pub fn parent(&self) -> Option<TileIndex> {
        if self.level <= 1 {
            return None;
        }
        Some(TileIndex::new(self.x / 2, self.y / 2, self.level - 1))
    }
    pub fn child(&self, quad: Quad) -> TileIndex {
        let q = quad as u32;
        return TileIndex::new(2 * self.x + q % 2, 2 * self.y + q / 2, self.level + 1);
    }
    pub fn children(&self) -> [TileIndex; 4] {
        return Quad::ALL.map(|q| self.child(q));
    }
    pub fn is_east_child(&self) -> bool {
        return self.x % 2 == 1;
    }
    pub fn is_north_child(&self) -> bool {
        return self.y % 2 == 0;
    }
    /// Offset of this tile inside its parent in uv space, v pointing north.
    pub fn position_relative_parent(&self) -> DVec2 {
        return DVec2::new(
            if self.is_east_child() { 0.5 } else { 0.0 },
            if self.is_north_child() { 0.5 } else { 0.0 },
        );
    }
}
impl fmt::Display for TileIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(x: {}, y: {}, level: {})", self.x, self.y, self.level)
    }
}
