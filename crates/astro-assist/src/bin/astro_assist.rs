use std::path::PathBuf;

use astro_assist::core::SampleRegion;
use astro_assist::drift::{Axis, DriftEvent, DriftParams, Hemisphere, OuterStep};
use astro_assist::frame::{load_luma, logical_source};
use astro_assist::hfd::{measure, SignatureParams, StarSignature, StarThreshold};
use astro_assist::{DriftResult, PolarAlignWizard, WizardInput};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(
    name = "astro-assist",
    version,
    about = "Star signatures and drift-alignment replay on still frames"
)]
struct Cli {
    /// Log verbosity on stderr
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the star signature of one region as JSON
    Signature(SignatureArgs),
    /// Replay frames through one drift leg and print events and the result as JSON
    Drift(DriftArgs),
}

#[derive(Args, Debug)]
struct SignatureArgs {
    /// Frame to read; converted to 8-bit luma
    image: PathBuf,
    /// Region centre, in frame pixels
    #[arg(long)]
    x: i32,
    #[arg(long)]
    y: i32,
    #[arg(long, default_value_t = 30)]
    radius: i32,
    /// Bright-pixel band below the peak, percent of full scale
    #[arg(long, default_value_t = 15, value_parser = clap::value_parser!(u8).range(1..=15))]
    star_threshold: u8,
    /// Absolute bright-pixel band in levels; overrides --star-threshold
    #[arg(long)]
    levels: Option<i32>,
    /// Noise floor, percent of the peak
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u8).range(1..=70))]
    background: u8,
}

#[derive(Args, Debug)]
struct DriftArgs {
    /// Frames in capture order; any size, scaled to the 720x480 screen
    #[arg(required = true)]
    frames: Vec<PathBuf>,
    #[arg(long, value_enum, default_value_t = AxisArg::Azimuth)]
    axis: AxisArg,
    #[arg(long, value_enum, default_value_t = HemisphereArg::Northern)]
    hemisphere: HemisphereArg,
    /// Number of polls per frame
    #[arg(long, default_value_t = 1)]
    repeat: u32,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AxisArg {
    Azimuth,
    Altitude,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum HemisphereArg {
    Northern,
    Southern,
}

#[derive(Serialize)]
struct SignatureReport {
    signature: StarSignature,
    detected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct FrameEvent {
    frame: usize,
    poll: u32,
    pulses: u8,
    #[serde(flatten)]
    event: DriftEvent,
}

#[derive(Serialize)]
struct DriftReport {
    axis: Axis,
    events: Vec<FrameEvent>,
    skipped: usize,
    result: Option<DriftResult>,
}

fn run_signature(args: &SignatureArgs) -> Result<(), Box<dyn std::error::Error>> {
    let img = load_luma(&args.image)?;
    let view = astro_assist::frame::gray_view(&img);
    let mut params = SignatureParams::from_percentages(args.star_threshold, args.background);
    if let Some(levels) = args.levels {
        params.star_threshold = StarThreshold::Levels(levels);
    }
    let region = SampleRegion::new(args.x, args.y, args.radius);
    let report = match measure(&view, &region, &params) {
        Ok(signature) => SignatureReport {
            signature,
            detected: true,
            error: None,
        },
        Err(e) => SignatureReport {
            signature: e.sentinel(),
            detected: false,
            error: Some(e.to_string()),
        },
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_drift(args: &DriftArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (axis, step) = match args.axis {
        AxisArg::Azimuth => (Axis::Azimuth, OuterStep::Azimuth),
        AxisArg::Altitude => (Axis::Altitude, OuterStep::Altitude),
    };
    let hemisphere = match args.hemisphere {
        HemisphereArg::Northern => Hemisphere::Northern,
        HemisphereArg::Southern => Hemisphere::Southern,
    };
    let mut wizard = PolarAlignWizard::new(DriftParams {
        hemisphere,
        tutorial: false,
        ..DriftParams::default()
    });
    wizard.input(WizardInput::RealignAzimuth);
    while wizard.state().step != step {
        wizard.input(WizardInput::NextOuterStep);
    }

    let mut events = Vec::new();
    let mut skipped = 0;
    for (frame, path) in args.frames.iter().enumerate() {
        let img = load_luma(path)?;
        let source = logical_source(&img)?;
        for poll in 1..=args.repeat {
            match wizard.poll(&source) {
                Ok(Some(event)) => events.push(FrameEvent {
                    frame,
                    poll,
                    pulses: event.pulses(),
                    event,
                }),
                Ok(None) => {}
                Err(e) => {
                    log::warn!("{}: {e}", path.display());
                    skipped += 1;
                }
            }
        }
        log::info!(
            "{}: {:?} streak={}",
            path.display(),
            wizard.state().drift_step,
            wizard.state().hysteresis
        );
    }

    let report = DriftReport {
        axis,
        events,
        skipped,
        result: wizard.session().result,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    #[cfg(feature = "tracing")]
    {
        astro_assist::core::init_tracing(false);
        log::set_max_level(cli.log_level.into());
    }
    #[cfg(not(feature = "tracing"))]
    astro_assist::core::init_with_level(cli.log_level.into()).map_err(|e| e.to_string())?;

    match &cli.command {
        Command::Signature(args) => run_signature(args),
        Command::Drift(args) => run_drift(args),
    }
}
