//! Mapping continuous coordinates onto the grid.

use crate::error::{Error, Result};
use crate::hilbert::{GridCell, GridSize};

/// Quantize a coordinate in `[0, c_max]` to a grid coordinate `floor((n - 1) * c / c_max)`.
///
/// Coordinates outside `[0, c_max]` are rejected even when they would round onto the grid; the
/// error reports a grid coordinate just past the edge they overshoot.
pub fn quantize(n: GridSize, c: f64, c_max: f64) -> Result<u32> {
    if !(c_max.is_finite() && c_max > 0.0) {
        return Err(Error::InvalidAxisMaximum(c_max));
    }
    if !c.is_finite() {
        return Err(Error::NonFiniteCoordinate(c));
    }

    let q = (f64::from(n.get() - 1) * c / c_max).floor() as i64;
    let side = i64::from(n.get());
    if c < 0.0 {
        return Err(Error::InvalidGridCoordinate {
            coord: q.min(-1),
            n: n.get(),
        });
    }
    if c > c_max {
        return Err(Error::InvalidGridCoordinate {
            coord: q.max(side),
            n: n.get(),
        });
    }

    debug_assert!(q < side);
    Ok(q as u32)
}

/// Maps positions in `[0, x_max]`x`[0, y_max]` onto the cells of an `n`x`n` grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quantizer {
    grid: GridSize,
    x_max: f64,
    y_max: f64,
}

impl Quantizer {
    /// Create a Quantizer for the given grid and axis maxima.
    pub fn new(grid: GridSize, x_max: f64, y_max: f64) -> Result<Self> {
        for max in [x_max, y_max] {
            if !(max.is_finite() && max > 0.0) {
                return Err(Error::InvalidAxisMaximum(max));
            }
        }

        Ok(Self { grid, x_max, y_max })
    }

    pub fn grid(&self) -> GridSize {
        self.grid
    }

    pub fn x_max(&self) -> f64 {
        self.x_max
    }

    pub fn y_max(&self) -> f64 {
        self.y_max
    }

    /// Find the grid cell containing a position.
    pub fn cell(&self, x: f64, y: f64) -> Result<GridCell> {
        let x = quantize(self.grid, x, self.x_max)?;
        let y = quantize(self.grid, y, self.y_max)?;
        Ok(GridCell::new(x, y))
    }
}
