//! Errors.

/// Result type for motion rug operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while building or rendering a motion rug.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("grid size {0} is not a positive power of two")]
    InvalidGridSize(u64),

    #[error("grid coordinate {coord} is outside [0, {n})")]
    InvalidGridCoordinate { coord: i64, n: u32 },

    #[error("coordinate {0} is not a finite number")]
    NonFiniteCoordinate(f64),

    #[error("Hilbert index {index} is outside a {n}x{n} grid")]
    InvalidHilbertIndex { index: u64, n: u32 },

    #[error("axis maximum {0} must be finite and positive")]
    InvalidAxisMaximum(f64),

    #[error("frame {frame} has {found} entities, expected {expected}")]
    InconsistentEntityCount {
        frame: usize,
        expected: usize,
        found: usize,
    },

    #[error("{found} frames given, expected {expected}")]
    InconsistentFrameCount { expected: usize, found: usize },

    #[error("frame {frame}, entity {entity} has {found} variables, expected {expected}")]
    InconsistentVariableCount {
        frame: usize,
        entity: usize,
        expected: usize,
        found: usize,
    },

    #[error("variable {index} requested, but samples only have {count}")]
    MissingVariable { index: usize, count: usize },

    #[error("cannot rescale an image whose maximum is 0")]
    DegenerateRange,

    #[error("value {value} falls in color bin {bin}, outside the palette")]
    InvalidColorRange { value: f64, bin: f64 },

    #[error("cannot color the non-finite value {0}")]
    NonFiniteValue(f64),

    #[error("frame {frame}: {source}")]
    Frame {
        frame: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("malformed trajectory data: {0}")]
    Json(#[from] serde_json::Error),
}
