//! Trajectory data, indexed by `[frame][entity][variable]`.

pub mod synthetic;

use crate::error::{Error, Result};

use ndarray::{s, Array3, ArrayView2, ArrayView3};

use std::io::Read;

/// Which variable slots hold the position of an entity.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Layout {
    pub x: usize,
    pub y: usize,
}

impl Default for Layout {
    fn default() -> Self {
        Self { x: 0, y: 1 }
    }
}

/// Samples of every entity in every frame.
///
/// Entities are only identified by their position within a frame; entity `i` of one frame need
/// not be entity `i` of the next.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectories {
    data: Array3<f64>,
}

impl Trajectories {
    /// Wrap an existing `(frames, entities, variables)` array.
    pub fn new(data: Array3<f64>) -> Self {
        Self { data }
    }

    /// Build the tensor from nested per-frame, per-entity samples.  Every frame must have the
    /// same number of entities, and every sample the same number of variables.
    pub fn from_frames(frames: Vec<Vec<Vec<f64>>>) -> Result<Self> {
        let entities = frames.first().map_or(0, Vec::len);
        let variables = frames
            .iter()
            .flatten()
            .next()
            .map_or(0, Vec::len);

        for (f, frame) in frames.iter().enumerate() {
            if frame.len() != entities {
                return Err(Error::InconsistentEntityCount {
                    frame: f,
                    expected: entities,
                    found: frame.len(),
                });
            }

            for (e, sample) in frame.iter().enumerate() {
                if sample.len() != variables {
                    return Err(Error::InconsistentVariableCount {
                        frame: f,
                        entity: e,
                        expected: variables,
                        found: sample.len(),
                    });
                }
            }
        }

        let shape = (frames.len(), entities, variables);
        let data = Array3::from_shape_fn(shape, |(f, e, v)| frames[f][e][v]);
        Ok(Self { data })
    }

    /// Parse JSON of the form `[[[x, y, attr, ...], ...], ...]`.
    pub fn from_json<R: Read>(reader: R) -> Result<Self> {
        let frames: Vec<Vec<Vec<f64>>> = serde_json::from_reader(reader)?;
        Self::from_frames(frames)
    }

    pub fn frames(&self) -> usize {
        self.data.dim().0
    }

    pub fn entities(&self) -> usize {
        self.data.dim().1
    }

    pub fn variables(&self) -> usize {
        self.data.dim().2
    }

    pub fn view(&self) -> ArrayView3<'_, f64> {
        self.data.view()
    }

    /// The `(entities, variables)` samples of a single frame.
    pub fn frame(&self, f: usize) -> ArrayView2<'_, f64> {
        self.data.slice(s![f, .., ..])
    }

    /// Fail unless samples have a variable at `index`.
    pub fn check_variable(&self, index: usize) -> Result<()> {
        check_variable(self.variables(), index)
    }

    /// The largest value a variable takes across all frames and entities.
    pub fn max(&self, variable: usize) -> Result<f64> {
        self.check_variable(variable)?;

        Ok(self
            .data
            .slice(s![.., .., variable])
            .fold(f64::NEG_INFINITY, |max, &v| max.max(v)))
    }
}

/// Fail unless `index` is a valid slot among `count` variables.
pub(crate) fn check_variable(count: usize, index: usize) -> Result<()> {
    if index < count {
        Ok(())
    } else {
        Err(Error::MissingVariable { index, count })
    }
}
