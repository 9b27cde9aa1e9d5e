// Symbolic stream labels used inside the filter graph

use std::fmt;

/// Extension appended to a label when it is written out as a file.
pub const OUTPUT_EXTENSION: &str = "mp4";

/// A named video stream in the filter graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamLabel {
    /// Video stream of the input registered at this position.
    Input(usize),
    /// Output of the resize chain applied to the stream at this position.
    Resized(usize),
    /// Single output of a concat stage.
    Concatenated,
}

impl StreamLabel {
    /// File name the stream is mapped to, e.g. `[concatenated].mp4`.
    pub fn output_filename(&self) -> String {
        format!("{}.{}", self, OUTPUT_EXTENSION)
    }
}

impl fmt::Display for StreamLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamLabel::Input(i) => write!(f, "[{}:v]", i),
            StreamLabel::Resized(i) => write!(f, "[resized{}]", i),
            StreamLabel::Concatenated => write!(f, "[concatenated]"),
        }
    }
}
