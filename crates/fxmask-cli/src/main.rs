use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use fxmask_core::{ColorChannel, MaskConfig, MaskController, MaskLayer, SceneHost, SnapshotHost};
use fxmask_skia::{DepthBuffer, DepthMaskContainer};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the scene snapshot JSON
    #[arg(value_name = "SCENE")]
    scene: PathBuf,

    /// Output PNG path for the depth buffer
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Override the scene's invert flag
    #[arg(long, value_enum)]
    polarity: Option<PolarityArg>,

    /// Channel the mask is written into
    #[arg(long, value_enum, default_value_t = ChannelArg::Blue)]
    channel: ChannelArg,

    /// Print the mask commands as JSON to stdout
    #[arg(long)]
    commands: bool,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum PolarityArg {
    Normal,
    Inverted,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum ChannelArg {
    Red,
    Green,
    Blue,
    Alpha,
}

impl From<ChannelArg> for ColorChannel {
    fn from(arg: ChannelArg) -> Self {
        match arg {
            ChannelArg::Red => ColorChannel::Red,
            ChannelArg::Green => ColorChannel::Green,
            ChannelArg::Blue => ColorChannel::Blue,
            ChannelArg::Alpha => ColorChannel::Alpha,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum LogFormat {
    Pretty,
    Json,
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from(cli.log_level).into())
        .from_env_lossy();

    let subscriber_builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match cli.log_format {
        LogFormat::Json => subscriber_builder.json().init(),
        LogFormat::Pretty => subscriber_builder.pretty().init(),
    }

    if let Err(e) = run(cli) {
        error!("Mask render failed: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let output_path = cli.output.clone().unwrap_or_else(|| {
        let mut p = cli.scene.clone();
        p.set_extension("mask.png");
        p
    });

    info!("Scene: {:?}", cli.scene);
    info!("Output: {:?}", output_path);

    let config = MaskConfig {
        channel: cli.channel.into(),
        ..MaskConfig::default()
    };

    let mut host = SnapshotHost::load(&cli.scene)
        .with_context(|| format!("loading scene snapshot {:?}", cli.scene))?;
    if let Some(polarity) = cli.polarity {
        let scene = host
            .scene_mut()
            .ok_or_else(|| anyhow!("snapshot has no scene"))?;
        let invert = serde_json::Value::Bool(polarity == PolarityArg::Inverted);
        scene.flags.set(&config.namespace, &config.invert_flag, invert);
    }

    let canvas = host
        .canvas_rect()
        .ok_or_else(|| anyhow!("scene has no dimensions"))?;
    let width = canvas.x1.ceil().max(1.0) as u32;
    let height = canvas.y1.ceil().max(1.0) as u32;

    let mut controller = MaskController::new(host, DepthMaskContainer::new(), config);
    controller.rebuild()?;

    let node = controller
        .layer()
        .installed()
        .ok_or_else(|| anyhow!("no mask installed"))?;
    info!(commands = node.mask.len(), polarity = ?node.polarity, "Mask built");

    if cli.commands {
        println!("{}", serde_json::to_string_pretty(&node.mask)?);
    }

    let mut buffer = DepthBuffer::new(width, height)?;
    controller.layer().render(&mut buffer)?;

    let image = image::RgbaImage::from_raw(width, height, buffer.into_pixels())
        .ok_or_else(|| anyhow!("depth buffer does not match {}x{}", width, height))?;
    image
        .save(&output_path)
        .with_context(|| format!("writing {:?}", output_path))?;

    info!("Render complete.");
    Ok(())
}
