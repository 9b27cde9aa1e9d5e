use crate::error::GraphError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
pub const DEFAULT_CRF: u8 = 18;
pub const DEFAULT_PIXEL_FORMAT: &str = "yuv420p";
pub const MAX_CRF: i64 = 51;

/// Caller-supplied encoding options. Unset fields fall back to defaults in
/// [`create_profile`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcodec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crf: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pix_fmt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overwrite: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipe_output: Option<bool>,
}

/// Resolved, immutable output encoding settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodingProfile {
    pub video_codec: String,
    pub crf: u8,
    pub pixel_format: String,
    pub overwrite_existing: bool,
    pub stream_output: bool,
}

impl EncodingProfile {
    /// Encoding tokens repeated in front of every output mapping.
    pub fn output_params(&self) -> Vec<String> {
        vec![
            "-vcodec".to_string(),
            self.video_codec.clone(),
            "-pix_fmt".to_string(),
            self.pixel_format.clone(),
            "-crf".to_string(),
            self.crf.to_string(),
        ]
    }
}

impl Default for EncodingProfile {
    fn default() -> Self {
        Self {
            video_codec: DEFAULT_VIDEO_CODEC.to_string(),
            crf: DEFAULT_CRF,
            pixel_format: DEFAULT_PIXEL_FORMAT.to_string(),
            overwrite_existing: true,
            stream_output: false,
        }
    }
}

/// Merge `options` over the defaults, rejecting a CRF outside `[0, 51]`.
pub fn create_profile(options: &EncodingOptions) -> Result<EncodingProfile, GraphError> {
    let defaults = EncodingProfile::default();

    let crf = match options.crf {
        Some(crf) if !(0..=MAX_CRF).contains(&crf) => {
            return Err(GraphError::Configuration { crf });
        }
        // In range, so the narrowing is lossless
        Some(crf) => crf as u8,
        None => defaults.crf,
    };

    Ok(EncodingProfile {
        video_codec: options.vcodec.clone().unwrap_or(defaults.video_codec),
        crf,
        pixel_format: options.pix_fmt.clone().unwrap_or(defaults.pixel_format),
        overwrite_existing: options.overwrite.unwrap_or(defaults.overwrite_existing),
        stream_output: options.pipe_output.unwrap_or(defaults.stream_output),
    })
}

/// How strictly the builder enforces call ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequencingPolicy {
    /// Only the concat cardinality check applies.
    #[default]
    Permissive,
    /// Out-of-order calls fail with [`GraphError::Sequencing`].
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub ffmpeg_path: PathBuf,
    pub sequencing: SequencingPolicy,
    pub encoding: EncodingOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            sequencing: SequencingPolicy::Permissive,
            encoding: EncodingOptions::default(),
        }
    }
}

pub fn load_config(path: Option<&std::path::Path>) -> Result<PipelineConfig> {
    let config = if let Some(config_path) = path {
        if config_path.exists() {
            let contents = std::fs::read_to_string(config_path)
                .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

            toml::from_str::<PipelineConfig>(&contents)
                .map_err(|e| anyhow::anyhow!("Failed to parse TOML config: {}", e))?
        } else {
            tracing::warn!("Config file not found at {:?}, using defaults", config_path);
            PipelineConfig::default()
        }
    } else {
        tracing::info!("No config path provided, using defaults");
        PipelineConfig::default()
    };

    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &PipelineConfig) -> Result<()> {
    if config.ffmpeg_path.as_os_str().is_empty() {
        anyhow::bail!("ffmpeg_path cannot be empty");
    }

    create_profile(&config.encoding)?;

    Ok(())
}
