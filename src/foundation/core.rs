use std::fmt;

pub use image::Rgba;

/// Side length of the square pixel grid scanned in every layer.
pub const GRID_SIZE: u32 = 64;

/// Exact color that marks a temple in the `Temples` layer.
pub const TEMPLE_MARKER: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// Color returned for cells outside a layer's pixel extent.
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// A cell on the grid, addressed in layer-local pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coord {
    /// Column, `0..GRID_SIZE`.
    pub x: u8,
    /// Row, `0..GRID_SIZE`.
    pub y: u8,
}

impl Coord {
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// Every grid cell in scan order: `x` outer, `y` inner.
    pub fn scan_order() -> impl Iterator<Item = Coord> {
        (0..GRID_SIZE as u8).flat_map(|x| (0..GRID_SIZE as u8).map(move |y| Coord::new(x, y)))
    }
}

impl From<(u8, u8)> for Coord {
    fn from((x, y): (u8, u8)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
