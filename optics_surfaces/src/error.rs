use super::*;

/// Errors that can occur when building a surface from invalid parameters.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConstructionError {
    #[error("Coordinates and parameters must be finite")]
    NonFinite,

    #[error("Segment endpoints must be distinct")]
    DegenerateSegment,

    #[error("Arc radius must be positive, got {0}")]
    NonPositiveRadius(Float),

    #[error("Angular range must not be empty, got {start}..{end}")]
    EmptyRange { start: Float, end: Float },

    #[error("Refractive indices must be positive, got {n1} and {n2}")]
    InvalidIndices { n1: Float, n2: Float },

    #[error("Prism vertices must not be collinear")]
    DegenerateTriangle,
}

/// Result type for surface construction.
pub type ConstructionResult<T> = Result<T, ConstructionError>;
