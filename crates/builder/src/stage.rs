// Structured filter chains and their ffmpeg filter_complex rendering

use crate::label::StreamLabel;

/// Separator between filter chains in a filter graph.
pub const CHAIN_SEPARATOR: &str = ";";

/// Operation requested by a caller; expands into one or more [`FilterChain`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageSpec {
    Resize { width: u32, height: u32 },
    Concat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Fit inside `width`x`height` keeping aspect ratio, pad to the exact
    /// size with the content centered, then force a square sample aspect.
    ScalePad { width: u32, height: u32 },
    /// Join `segments` video-only streams end to end.
    Concat { segments: usize },
}

/// One filter chain: labelled inputs, an operation, labelled outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChain {
    pub inputs: Vec<StreamLabel>,
    pub op: FilterOp,
    pub outputs: Vec<StreamLabel>,
}

impl FilterChain {
    pub fn scale_pad(input: StreamLabel, width: u32, height: u32, output: StreamLabel) -> Self {
        Self {
            inputs: vec![input],
            op: FilterOp::ScalePad { width, height },
            outputs: vec![output],
        }
    }

    pub fn concat(inputs: Vec<StreamLabel>) -> Self {
        let segments = inputs.len();
        Self {
            inputs,
            op: FilterOp::Concat { segments },
            outputs: vec![StreamLabel::Concatenated],
        }
    }

    /// Render this chain in filter_complex syntax.
    pub fn render(&self) -> String {
        let inputs: String = self.inputs.iter().map(StreamLabel::to_string).collect();
        let outputs: String = self.outputs.iter().map(StreamLabel::to_string).collect();

        let filter = match self.op {
            FilterOp::ScalePad { width, height } => format!(
                "scale={w}:{h}:force_original_aspect_ratio=decrease,\
                 pad={w}:{h}:(ow-iw)/2:(oh-ih)/2,setsar=1",
                w = width,
                h = height
            ),
            FilterOp::Concat { segments } => format!("concat=n={}:v=1", segments),
        };

        format!("{}{}{}", inputs, filter, outputs)
    }
}

/// Serialize chains in insertion order into a single filter graph expression.
pub fn format_filter_graph(chains: &[FilterChain]) -> String {
    chains
        .iter()
        .map(FilterChain::render)
        .collect::<Vec<_>>()
        .join(CHAIN_SEPARATOR)
}
