use anyhow::Result;
use clap::Parser;
use ffgraph_builder::{create_profile, ffmpeg_version, CommandBuilder, FfmpegRunner};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ffgraph")]
#[command(about = "Resize and concatenate videos through one ffmpeg filter graph", long_about = None)]
#[command(version)]
struct Args {
    /// Input video files, in playback order
    #[arg(value_name = "INPUT", default_values = ["./1.mp4", "./2.mp4", "./3.mp4"])]
    inputs: Vec<String>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Target frame width
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// Target frame height
    #[arg(long, default_value_t = 1080)]
    height: u32,

    /// Keep each input at its original size
    #[arg(long)]
    no_resize: bool,

    /// Write one output per input instead of concatenating
    #[arg(long)]
    no_concat: bool,

    /// Override the configured CRF (0-51)
    #[arg(long)]
    crf: Option<i64>,

    /// Print the ffmpeg command instead of running it
    #[arg(long)]
    print: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    let args = Args::parse();

    let mut config = match ffgraph_builder::config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };
    if args.crf.is_some() {
        config.encoding.crf = args.crf;
    }

    let profile = create_profile(&config.encoding)?;
    info!(
        "Encoding with {} ({}), CRF {}",
        profile.video_codec, profile.pixel_format, profile.crf
    );
    let stream_output = profile.stream_output;

    let mut builder = CommandBuilder::with_profile(profile, config.sequencing);
    builder.register_inputs(args.inputs.iter().cloned())?;
    if !args.no_resize {
        builder.apply_resize_filter(args.width, args.height)?;
    }
    if !args.no_concat && builder.active_streams().len() >= 2 {
        builder.apply_concat_filter()?;
    }
    builder.finalize_filter_graph()?.finalize_output_mapping()?;

    let command = builder.into_args();

    if args.print {
        println!("{} {}", config.ffmpeg_path.display(), command.join(" "));
        return Ok(());
    }

    info!("Checking FFmpeg version...");
    match ffmpeg_version(&config.ffmpeg_path) {
        Ok(version) => {
            info!("FFmpeg version: {}.{}.{}", version.0, version.1, version.2);
        }
        Err(e) => {
            error!("Failed to check FFmpeg version: {}", e);
            return Err(e);
        }
    }

    let runner = FfmpegRunner::new(&config.ffmpeg_path);
    let report = runner.run(&command, stream_output).await?;

    if !report.success() {
        error!(
            "ffmpeg failed with code {:?} and signal {:?}",
            report.code, report.signal
        );
        anyhow::bail!("ffmpeg did not complete");
    }

    println!("Done");
    Ok(())
}
