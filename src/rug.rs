//! Motion rugs: one column per frame, one row per rank along the Hilbert curve.

use crate::error::{Error, Result};
use crate::order::FrameOrderer;
use crate::render::{self, Palette};
use crate::trajectory::{check_variable, Trajectories};

use image::{GrayImage, RgbImage};

use log::{debug, trace};

use ndarray::{Array2, ArrayView2, ArrayView3, ArrayViewMut1, ArrayViewMut2, Axis};

use rayon::prelude::*;

use std::time::Instant;

/// A motion rug.  Row `r` of column `f` holds the attribute of whichever entity has rank `r`
/// along the curve in frame `f`; rows follow spatial position, not entity identity.
#[derive(Clone, Debug, PartialEq)]
pub struct Rug {
    image: Array2<f64>,
}

impl Rug {
    /// Wrap an `(entities, frames)` matrix.
    pub fn new(image: Array2<f64>) -> Self {
        Self { image }
    }

    pub fn entities(&self) -> usize {
        self.image.nrows()
    }

    pub fn frames(&self) -> usize {
        self.image.ncols()
    }

    pub fn image(&self) -> ArrayView2<'_, f64> {
        self.image.view()
    }

    pub fn into_inner(self) -> Array2<f64> {
        self.image
    }

    /// Rescale the rug so its maximum maps to 255.
    pub fn gray_scale(&self) -> Result<Array2<f64>> {
        render::gray_scale(self.image.view())
    }

    /// Render the rescaled rug as an 8-bit grayscale image.
    pub fn to_gray_image(&self) -> Result<GrayImage> {
        let scaled = self.gray_scale()?;
        Ok(render::to_gray_image(scaled.view()))
    }

    /// Render the rug with a palette, binning values over `[min, max]` (by default the rug's
    /// own range).
    pub fn color_map(
        &self,
        palette: &Palette,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Result<RgbImage> {
        render::color_map(self.image.view(), palette, min, max)
    }
}

/// Builds rugs from trajectories, one attribute at a time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RugAssembler {
    orderer: FrameOrderer,
    attr: usize,
}

impl RugAssembler {
    /// Create a RugAssembler that visualizes the variable in slot `attr`.
    pub fn new(orderer: FrameOrderer, attr: usize) -> Self {
        Self { orderer, attr }
    }

    pub fn attr(&self) -> usize {
        self.attr
    }

    /// Fill one column of a rug from frame number `f`.
    pub fn column(
        &self,
        f: usize,
        frame: ArrayView2<'_, f64>,
        mut column: ArrayViewMut1<'_, f64>,
    ) -> Result<()> {
        check_variable(frame.ncols(), self.attr)?;

        if frame.nrows() != column.len() {
            return Err(Error::InconsistentEntityCount {
                frame: f,
                expected: column.len(),
                found: frame.nrows(),
            });
        }

        let permutation = self.orderer.order(frame).map_err(|e| Error::Frame {
            frame: f,
            source: Box::new(e),
        })?;
        for (value, &e) in column.iter_mut().zip(&permutation) {
            *value = frame[[e, self.attr]];
        }

        trace!("Frame {}: ordered {} entities", f, permutation.len());
        Ok(())
    }

    /// Fill the columns of `image` from `frames`, in parallel.  `first` is the number of the
    /// first frame, for error reporting.
    ///
    /// If several frames fail, the error from the earliest one is returned.
    pub fn assemble_into(
        &self,
        first: usize,
        frames: ArrayView3<'_, f64>,
        mut image: ArrayViewMut2<'_, f64>,
    ) -> Result<()> {
        let (count, entities, _) = frames.dim();
        if image.ncols() != count {
            return Err(Error::InconsistentFrameCount {
                expected: image.ncols(),
                found: count,
            });
        }
        if image.nrows() != entities {
            return Err(Error::InconsistentEntityCount {
                frame: first,
                expected: image.nrows(),
                found: entities,
            });
        }

        image
            .axis_iter_mut(Axis(1))
            .into_par_iter()
            .zip(frames.axis_iter(Axis(0)).into_par_iter())
            .enumerate()
            .map(|(i, (column, frame))| self.column(first + i, frame, column))
            .collect::<Vec<_>>()
            .into_iter()
            .collect()
    }

    /// Build the whole rug.
    pub fn assemble(&self, trajectories: &Trajectories) -> Result<Rug> {
        let start = Instant::now();

        let mut image = Array2::zeros((trajectories.entities(), trajectories.frames()));
        self.assemble_into(0, trajectories.view(), image.view_mut())?;

        debug!(
            "Assembled a {}x{} rug of variable {} in {:?}",
            image.nrows(),
            image.ncols(),
            self.attr,
            start.elapsed(),
        );

        Ok(Rug::new(image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::hilbert::GridSize;
    use crate::quantize::Quantizer;
    use crate::trajectory::synthetic::Flock;
    use crate::trajectory::Layout;

    use ndarray::{array, s};

    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    fn assembler(n: u32, max: f64, attr: usize) -> RugAssembler {
        let grid = GridSize::new(n).unwrap();
        let quantizer = Quantizer::new(grid, max, max).unwrap();
        RugAssembler::new(FrameOrderer::new(quantizer, Layout::default()), attr)
    }

    #[test]
    fn test_small_rug() {
        let trajectories = Trajectories::from_frames(vec![
            vec![
                vec![0.0, 3.0, 10.0],
                vec![3.0, 0.0, 20.0],
                vec![0.0, 0.0, 30.0],
            ],
            vec![
                vec![3.0, 0.0, 11.0],
                vec![1.0, 1.0, 21.0],
                vec![0.0, 1.0, 31.0],
            ],
        ])
        .unwrap();

        let rug = assembler(4, 3.0, 2).assemble(&trajectories).unwrap();
        assert_eq!(rug.entities(), 3);
        assert_eq!(rug.frames(), 2);
        assert_eq!(
            rug.image(),
            array![[30.0, 21.0], [10.0, 31.0], [20.0, 11.0]]
        );
    }

    #[test]
    fn test_shape() {
        for (frames, entities) in [(0, 0), (3, 0), (0, 5), (17, 9)] {
            let flock = Flock {
                frames,
                entities,
                ..Flock::default()
            };
            let trajectories = flock.simulate(&mut Pcg64::seed_from_u64(3));
            let rug = assembler(16, 100.0, 2).assemble(&trajectories).unwrap();
            assert_eq!(rug.image().dim(), (entities, frames));
        }
    }

    #[test]
    fn test_matches_sequential() {
        let flock = Flock {
            frames: 64,
            entities: 40,
            ..Flock::default()
        };
        let trajectories = flock.simulate(&mut Pcg64::seed_from_u64(42));

        let assembler = assembler(32, 100.0, 2);
        let rug = assembler.assemble(&trajectories).unwrap();

        for f in 0..trajectories.frames() {
            let frame = trajectories.frame(f);
            let permutation = assembler.orderer.order(frame).unwrap();
            for (r, &e) in permutation.iter().enumerate() {
                assert_eq!(rug.image()[[r, f]], frame[[e, 2]]);
            }
        }
    }

    #[test]
    fn test_chunks() {
        let flock = Flock {
            frames: 30,
            entities: 12,
            ..Flock::default()
        };
        let trajectories = flock.simulate(&mut Pcg64::seed_from_u64(9));
        let assembler = assembler(8, 100.0, 2);

        let whole = assembler.assemble(&trajectories).unwrap();

        let mut image = Array2::zeros((12, 30));
        for start in (0..30).step_by(7) {
            let end = (start + 7).min(30);
            assembler
                .assemble_into(
                    start,
                    trajectories.view().slice(s![start..end, .., ..]),
                    image.slice_mut(s![.., start..end]),
                )
                .unwrap();
        }

        assert_eq!(whole.image(), image.view());
    }

    #[test]
    fn test_errors() {
        let trajectories = Trajectories::from_frames(vec![
            vec![vec![0.0, 0.0, 1.0]],
            vec![vec![5.0, 0.0, 1.0]],
        ])
        .unwrap();

        match assembler(4, 3.0, 2).assemble(&trajectories) {
            Err(Error::Frame { frame: 1, source }) => assert!(matches!(
                *source,
                Error::InvalidGridCoordinate { coord: 5, n: 4 }
            )),
            other => panic!("unexpected result {:?}", other),
        }
        assert!(matches!(
            assembler(4, 3.0, 3).assemble(&trajectories),
            Err(Error::MissingVariable { index: 3, count: 3 })
        ));

        let mut image = Array2::zeros((2, 2));
        assert!(matches!(
            assembler(4, 10.0, 2).assemble_into(4, trajectories.view(), image.view_mut()),
            Err(Error::InconsistentEntityCount {
                frame: 4,
                expected: 2,
                found: 1,
            })
        ));

        let mut image = Array2::zeros((1, 3));
        assert!(matches!(
            assembler(4, 10.0, 2).assemble_into(0, trajectories.view(), image.view_mut()),
            Err(Error::InconsistentFrameCount {
                expected: 3,
                found: 2,
            })
        ));
    }

    #[test]
    fn test_earliest_error() {
        let mut frames = Vec::new();
        for f in 0..64 {
            let x = if f % 5 == 3 { 50.0 + f as f64 } else { 1.0 };
            frames.push(vec![vec![x, 1.0, 0.0], vec![2.0, 2.0, 0.0]]);
        }
        let trajectories = Trajectories::from_frames(frames).unwrap();
        let assembler = assembler(8, 10.0, 2);

        for _ in 0..8 {
            match assembler.assemble(&trajectories) {
                Err(Error::Frame { frame, source }) => {
                    assert_eq!(frame, 3);
                    assert!(matches!(*source, Error::InvalidGridCoordinate { n: 8, .. }));
                }
                other => panic!("unexpected result {:?}", other),
            }
        }
    }
}
