//! The two-dimensional [Hilbert curve](https://en.wikipedia.org/wiki/Hilbert_curve) over a
//! power-of-two grid.

use crate::error::{Error, Result};

use acap::chebyshev::chebyshev_distance;
use acap::coords::Coordinates;

/// The side length `n` of an `n`x`n` grid.  Always a power of two.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct GridSize(u32);

impl GridSize {
    /// Create a GridSize, rejecting anything that isn't a positive power of two.
    pub fn new(n: u32) -> Result<Self> {
        if n.is_power_of_two() {
            Ok(Self(n))
        } else {
            Err(Error::InvalidGridSize(n.into()))
        }
    }

    /// Create a GridSize of `2^order`.
    pub fn from_bits(order: u32) -> Result<Self> {
        1u32.checked_shl(order)
            .map(Self)
            .ok_or(Error::InvalidGridSize(2u64.saturating_pow(order)))
    }

    /// The side length.
    pub fn get(self) -> u32 {
        self.0
    }

    /// log_2 of the side length.
    pub fn bits(self) -> u32 {
        self.0.trailing_zeros()
    }

    /// The number of cells in the grid, which is also the length of the curve.
    pub fn cells(self) -> u64 {
        let n = u64::from(self.0);
        n * n
    }

    /// Check whether a signed coordinate lies in `[0, n)`.
    pub fn contains(self, coord: i64) -> bool {
        coord >= 0 && coord < i64::from(self.0)
    }
}

impl TryFrom<u32> for GridSize {
    type Error = Error;

    fn try_from(n: u32) -> Result<Self> {
        Self::new(n)
    }
}

/// A discrete position on the grid.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct GridCell {
    pub x: u32,
    pub y: u32,
}

impl GridCell {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Make a cell from signed coordinates, failing if either lies outside the grid.
    pub fn checked(n: GridSize, x: i64, y: i64) -> Result<Self> {
        for coord in [x, y] {
            if !n.contains(coord) {
                return Err(Error::InvalidGridCoordinate { coord, n: n.get() });
            }
        }

        Ok(Self::new(x as u32, y as u32))
    }

    /// The [Chebyshev distance](https://en.wikipedia.org/wiki/Chebyshev_distance) to another
    /// cell.  Consecutive cells along the curve are always at distance 1.
    pub fn distance(self, other: Self) -> u32 {
        chebyshev_distance(self, other) as u32
    }
}

impl Coordinates for GridCell {
    type Value = f64;

    fn dims(&self) -> usize {
        2
    }

    fn coord(&self, i: usize) -> f64 {
        match i {
            0 => self.x.into(),
            1 => self.y.into(),
            _ => panic!("grid cells have 2 coordinates, not {}", i + 1),
        }
    }
}

/// Rotate/reflect a point inside an `s`x`s` subgrid so that the sub-curve it belongs to is
/// traversed in the canonical orientation.
fn rotate(s: u32, x: u32, y: u32, rx: u32, ry: u32) -> (u32, u32) {
    debug_assert!(x < s && y < s);

    if ry != 0 {
        return (x, y);
    }

    let (x, y) = if rx != 0 {
        (s - 1 - x, s - 1 - y)
    } else {
        (x, y)
    };

    (y, x)
}

/// Compute the position of `cell` along the Hilbert curve filling an `n`x`n` grid.
///
/// The result is in `[0, n²)`.  Cell `(0, 0)` is always the start of the curve, and the curve
/// ends at `(n - 1, 0)`.
pub fn hilbert_index(n: GridSize, cell: GridCell) -> Result<u64> {
    let GridCell { mut x, mut y } = GridCell::checked(n, cell.x.into(), cell.y.into())?;

    let mut d = 0;
    let mut s = n.get() / 2;
    while s > 0 {
        let rx = ((x & s) != 0) as u32;
        let ry = ((y & s) != 0) as u32;

        // 3 * rx ^ ry ranks the quadrants 0, 1, 2, 3 in traversal order
        let s2 = u64::from(s) * u64::from(s);
        d += s2 * u64::from((3 * rx) ^ ry);

        // Drop the bit we just consumed, then reorient within the quadrant
        (x, y) = rotate(s, x & (s - 1), y & (s - 1), rx, ry);
        s /= 2;
    }

    Ok(d)
}

/// The inverse of [hilbert_index()], for an index known to be in range.
fn cell_at(n: u32, index: u64) -> GridCell {
    let mut x = 0;
    let mut y = 0;
    let mut t = index;

    let mut s = 1;
    while s < n {
        let rx = (1 & (t / 2)) as u32;
        let ry = (1 & (t ^ u64::from(rx))) as u32;
        (x, y) = rotate(s, x, y, rx, ry);
        x += s * rx;
        y += s * ry;
        t /= 4;
        s *= 2;
    }

    GridCell::new(x, y)
}

/// Find the cell at position `index` along the Hilbert curve filling an `n`x`n` grid.
pub fn hilbert_cell(n: GridSize, index: u64) -> Result<GridCell> {
    if index < n.cells() {
        Ok(cell_at(n.get(), index))
    } else {
        Err(Error::InvalidHilbertIndex { index, n: n.get() })
    }
}

/// Iterate over every cell of the grid in curve order.
pub fn curve(n: GridSize) -> impl Iterator<Item = GridCell> {
    let side = n.get();
    (0..n.cells()).map(move |d| cell_at(side, d))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;

    fn grid(n: u32) -> GridSize {
        GridSize::new(n).unwrap()
    }

    fn index(n: u32, x: u32, y: u32) -> u64 {
        hilbert_index(grid(n), GridCell::new(x, y)).unwrap()
    }

    /// Quadrant-recursive formulation: translate into the quadrant, then swap and reflect.
    /// Ranks quadrants with |3·qx - qy| instead of the xor.
    fn quadrant_index(n: u32, mut x: u32, mut y: u32) -> u64 {
        let mut d = 0;
        let mut s = n / 2;
        while s > 0 {
            let qx = x / s;
            let qy = y / s;
            let rank = (3 * i64::from(qx) - i64::from(qy)).unsigned_abs();
            d += u64::from(s) * u64::from(s) * rank;

            x -= s * qx;
            y -= s * qy;
            if qy == 0 {
                std::mem::swap(&mut x, &mut y);
                if qx == 1 {
                    x = s - x - 1;
                    y = s - y - 1;
                }
            }

            s /= 2;
        }
        d
    }

    #[test]
    fn test_grid_size() {
        assert_eq!(grid(1).bits(), 0);
        assert_eq!(grid(16).bits(), 4);
        assert_eq!(grid(16).cells(), 256);
        assert_eq!(GridSize::from_bits(5).unwrap(), grid(32));

        assert!(matches!(GridSize::new(0), Err(Error::InvalidGridSize(0))));
        assert!(matches!(GridSize::new(6), Err(Error::InvalidGridSize(6))));
        assert!(GridSize::try_from(12u32).is_err());
        assert!(GridSize::from_bits(32).is_err());
    }

    #[test]
    fn test_small_grid() {
        assert_eq!(index(4, 0, 0), 0);
        assert_eq!(index(4, 1, 0), 1);
        assert_eq!(index(4, 1, 1), 2);
        assert_eq!(index(4, 0, 1), 3);
        assert_eq!(index(4, 3, 0), 15);

        assert_eq!(index(1, 0, 0), 0);
        assert_eq!(index(2, 1, 0), 3);
    }

    #[test]
    fn test_quadrant_ranks() {
        for rx in 0..2u32 {
            for ry in 0..2u32 {
                let xor = (3 * rx) ^ ry;
                let abs = (3 * rx as i32 - ry as i32).unsigned_abs();
                assert_eq!(xor, abs, "rx = {}, ry = {}", rx, ry);
            }
        }
    }

    #[test]
    fn test_bijective() {
        for bits in 0..6 {
            let n = GridSize::from_bits(bits).unwrap();
            let mut seen = HashSet::new();
            for x in 0..n.get() {
                for y in 0..n.get() {
                    let d = hilbert_index(n, GridCell::new(x, y)).unwrap();
                    assert!(d < n.cells());
                    assert!(
                        seen.insert(d),
                        "index {} repeated on a {}x{} grid",
                        d,
                        n.get(),
                        n.get()
                    );
                }
            }
            assert_eq!(seen.len() as u64, n.cells());
        }
    }

    #[test]
    fn test_quadrant_formulation_agrees() {
        for n in [2, 4, 8, 16] {
            for x in 0..n {
                for y in 0..n {
                    assert_eq!(
                        index(n, x, y),
                        quadrant_index(n, x, y),
                        "({}, {}) on a {}x{} grid",
                        x,
                        y,
                        n,
                        n,
                    );
                }
            }
        }
    }

    #[test]
    fn test_inverse() {
        let n = grid(32);
        for (d, cell) in curve(n).enumerate() {
            assert_eq!(hilbert_index(n, cell).unwrap(), d as u64);
            assert_eq!(hilbert_cell(n, d as u64).unwrap(), cell);
        }
    }

    #[test]
    fn test_locality() {
        let cells: Vec<_> = curve(grid(8)).collect();
        assert_eq!(cells.len(), 64);
        for pair in cells.windows(2) {
            assert_eq!(pair[0].distance(pair[1]), 1, "{:?} -> {:?}", pair[0], pair[1]);
        }

        assert_eq!(cells.first(), Some(&GridCell::new(0, 0)));
        assert_eq!(cells.last(), Some(&GridCell::new(7, 0)));
    }

    #[test]
    fn test_out_of_range() {
        let n = grid(8);

        assert!(matches!(
            hilbert_index(n, GridCell::new(8, 0)),
            Err(Error::InvalidGridCoordinate { coord: 8, n: 8 })
        ));
        assert!(matches!(
            hilbert_index(n, GridCell::new(0, 100)),
            Err(Error::InvalidGridCoordinate { coord: 100, n: 8 })
        ));
        assert!(matches!(
            GridCell::checked(n, -1, 3),
            Err(Error::InvalidGridCoordinate { coord: -1, n: 8 })
        ));
        assert!(matches!(
            hilbert_cell(n, 64),
            Err(Error::InvalidHilbertIndex { index: 64, n: 8 })
        ));
    }
}
