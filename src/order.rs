//! Ordering the entities of a frame along the Hilbert curve.

use crate::error::Result;
use crate::hilbert::{hilbert_index, GridCell, GridSize};
use crate::quantize::Quantizer;
use crate::trajectory::{check_variable, Layout};

use ndarray::ArrayView2;

/// Rank entities by the Hilbert index of their cells.
///
/// Returns entity indices sorted by ascending index.  Entities sharing a cell keep their
/// original relative order.
pub fn frame_permutation(grid: GridSize, cells: &[GridCell]) -> Result<Vec<usize>> {
    let keys = cells
        .iter()
        .map(|&cell| hilbert_index(grid, cell))
        .collect::<Result<Vec<_>>>()?;

    let mut permutation: Vec<usize> = (0..cells.len()).collect();
    // sort_by_key() is stable
    permutation.sort_by_key(|&i| keys[i]);
    Ok(permutation)
}

/// Computes the permutation of each frame from its raw samples.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameOrderer {
    quantizer: Quantizer,
    layout: Layout,
}

impl FrameOrderer {
    pub fn new(quantizer: Quantizer, layout: Layout) -> Self {
        Self { quantizer, layout }
    }

    pub fn quantizer(&self) -> &Quantizer {
        &self.quantizer
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Quantize the position of every entity in an `(entities, variables)` frame.
    pub fn cells(&self, frame: ArrayView2<'_, f64>) -> Result<Vec<GridCell>> {
        let variables = frame.ncols();
        check_variable(variables, self.layout.x)?;
        check_variable(variables, self.layout.y)?;

        frame
            .outer_iter()
            .map(|sample| self.quantizer.cell(sample[self.layout.x], sample[self.layout.y]))
            .collect()
    }

    /// Compute the permutation of an `(entities, variables)` frame.
    pub fn order(&self, frame: ArrayView2<'_, f64>) -> Result<Vec<usize>> {
        let cells = self.cells(frame)?;
        frame_permutation(self.quantizer.grid(), &cells)
    }
}
