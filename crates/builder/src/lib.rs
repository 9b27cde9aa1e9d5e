// Filter-graph command builder for ffmpeg

pub mod builder;
pub mod config;
pub mod error;
pub mod graph;
pub mod label;
pub mod runner;
pub mod stage;

// Re-export commonly used types
pub use builder::{BuilderPhase, CommandBuilder};
pub use config::{create_profile, EncodingOptions, EncodingProfile, PipelineConfig, SequencingPolicy};
pub use error::GraphError;
pub use label::StreamLabel;
pub use runner::{ffmpeg_version, ExitReport, FfmpegRunner};
