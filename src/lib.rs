//! Motion rugs: visualizing collective motion by ordering each frame's entities along a
//! Hilbert curve.
//!
//! Each frame's positions are quantized onto an `n`x`n` grid, ranked by their Hilbert index,
//! and the chosen attribute is written out in that order as one column of the rug.  Rows of the
//! rug therefore track spatial proximity rather than entity identity.

pub mod error;
pub mod hilbert;
pub mod order;
pub mod quantize;
pub mod render;
pub mod rug;
pub mod trajectory;

pub use crate::error::{Error, Result};
pub use crate::hilbert::{hilbert_cell, hilbert_index, GridCell, GridSize};
pub use crate::order::{frame_permutation, FrameOrderer};
pub use crate::quantize::Quantizer;
pub use crate::render::Palette;
pub use crate::rug::{Rug, RugAssembler};
pub use crate::trajectory::{Layout, Trajectories};
