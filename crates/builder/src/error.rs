use crate::builder::BuilderPhase;
use crate::label::StreamLabel;
use thiserror::Error;

/// Errors raised synchronously by the profile resolver and the graph builder.
///
/// Process failures are not represented here; they surface as exit data in
/// [`crate::runner::ExitReport`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("CRF value must be between 0 and 51. You provided {crf}")]
    Configuration { crf: i64 },

    #[error("concat needs at least 2 active streams, found {found}")]
    InsufficientStreams { found: usize },

    #[error("resize target must be positive, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("stream label {label} is already defined earlier in the filter graph")]
    LabelReuse { label: StreamLabel },

    #[error("{operation} is not allowed while the builder is in the {phase:?} phase")]
    Sequencing {
        operation: &'static str,
        phase: BuilderPhase,
    },
}
