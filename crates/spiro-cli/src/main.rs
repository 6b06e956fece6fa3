mod config;
mod render;
mod simulate;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::{debug, info};
use spiro_lib::{
    analyze,
    features::RiskFeatures,
    integrate,
    io::{csv as csv_io, request as request_io, text as text_io},
    plot::{figure_from_flow_time, figure_from_flow_volume},
    resample, summary_statistics, time_axis, to_flow,
};
use std::{
    io::{self, Read},
    path::{Path, PathBuf},
};

use crate::{
    config::Overrides,
    simulate::{synthesize, BlowProfile},
};

#[derive(Parser)]
#[command(
    name = "spiro",
    version,
    about = "Spirometry metrics from raw breath-flow captures"
)]
struct Cli {
    /// Logging verbosity (e.g., debug, info, warn); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// Where to read the voltage capture from.
#[derive(clap::Args, Debug, Clone)]
struct CaptureArgs {
    /// Newline/comma-delimited voltages (stdin when omitted)
    #[arg(long)]
    input: Option<PathBuf>,
    /// Treat --input as CSV and read this column
    #[arg(long)]
    csv_column: Option<String>,
    #[arg(long, default_value_t = ',')]
    csv_delimiter: char,
}

/// Pipeline configuration: TOML file plus flag overrides.
#[derive(clap::Args, Debug, Clone)]
struct PipelineArgs {
    #[arg(long)]
    config: Option<PathBuf>,
    /// Calibration constant K (L/s per volt)
    #[arg(long)]
    gain: Option<f64>,
    /// Voltage at zero airflow
    #[arg(long)]
    baseline: Option<f64>,
    /// Seconds between samples
    #[arg(long)]
    interval: Option<f64>,
    /// Exhalation produces negative flow
    #[arg(long)]
    exhale_negative: bool,
    /// Also compute the downsampled summary
    #[arg(long)]
    resample: bool,
    #[arg(long)]
    source_rate: Option<f64>,
    #[arg(long)]
    target_rate: Option<f64>,
}

impl PipelineArgs {
    fn resolve(&self) -> Result<spiro_lib::SpiroConfig> {
        let overrides = Overrides {
            gain: self.gain,
            baseline: self.baseline,
            interval_s: self.interval,
            exhale_negative: self.exhale_negative,
            resample: self.resample,
            source_rate_hz: self.source_rate,
            target_rate_hz: self.target_rate,
        };
        config::resolve(self.config.as_deref(), &overrides)
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum PlotKind {
    #[value(name = "flow-volume")]
    FlowVolume,
    #[value(name = "flow-time")]
    FlowTime,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute FEV1, FVC, PEF, FEF25-75% and blow duration for one capture
    Summary {
        #[command(flatten)]
        capture: CaptureArgs,
        #[command(flatten)]
        pipeline: PipelineArgs,
        /// Print only the metric set instead of the full report
        #[arg(long)]
        metrics_only: bool,
    },
    /// Anti-alias filter and decimate calibrated flow; prints one sample per line
    Resample {
        #[command(flatten)]
        capture: CaptureArgs,
        #[arg(long, default_value_t = 200.0)]
        source_rate: f64,
        #[arg(long, default_value_t = 100.0)]
        target_rate: f64,
        #[arg(long, default_value_t = 1.0)]
        gain: f64,
        #[arg(long, default_value_t = 0.0)]
        baseline: f64,
    },
    /// Build the risk-model feature row from a JSON capture request
    Features {
        #[arg(long)]
        request: PathBuf,
        #[command(flatten)]
        pipeline: PipelineArgs,
    },
    /// Render flow-volume or flow-time PNG
    Plot {
        #[command(flatten)]
        capture: CaptureArgs,
        #[command(flatten)]
        pipeline: PipelineArgs,
        #[arg(long, default_value = "flow-volume")]
        kind: PlotKind,
        #[arg(long, default_value_t = 2048)]
        max_points: usize,
        #[arg(long)]
        out: PathBuf,
    },
    /// Generate a synthetic forced-exhalation capture as voltages
    Simulate {
        #[arg(long, default_value_t = 1200)]
        samples: usize,
        #[arg(long, default_value_t = 0.005)]
        interval: f64,
        #[arg(long, default_value_t = 0.2)]
        lead_in: f64,
        #[arg(long, default_value_t = 8.0)]
        peak_flow: f64,
        #[arg(long, default_value_t = 0.1)]
        rise: f64,
        #[arg(long, default_value_t = 0.9)]
        decay: f64,
        #[arg(long, default_value_t = 0.0)]
        noise: f64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value_t = 1.0)]
        gain: f64,
        #[arg(long, default_value_t = 0.0)]
        baseline: f64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(cli.log_level.as_str())).init();
    match cli.command {
        Commands::Summary {
            capture,
            pipeline,
            metrics_only,
        } => cmd_summary(&capture, &pipeline, metrics_only)?,
        Commands::Resample {
            capture,
            source_rate,
            target_rate,
            gain,
            baseline,
        } => cmd_resample(&capture, source_rate, target_rate, gain, baseline)?,
        Commands::Features { request, pipeline } => cmd_features(&request, &pipeline)?,
        Commands::Plot {
            capture,
            pipeline,
            kind,
            max_points,
            out,
        } => cmd_plot(&capture, &pipeline, kind, max_points, &out)?,
        Commands::Simulate {
            samples,
            interval,
            lead_in,
            peak_flow,
            rise,
            decay,
            noise,
            seed,
            gain,
            baseline,
        } => {
            let profile = BlowProfile {
                samples,
                interval_s: interval,
                lead_in_s: lead_in,
                peak_flow,
                rise_s: rise,
                decay_s: decay,
                noise,
                seed,
            };
            cmd_simulate(&profile, gain, baseline)?
        }
    }
    Ok(())
}

fn read_capture(args: &CaptureArgs) -> Result<Vec<f64>> {
    let samples = match (&args.input, &args.csv_column) {
        (Some(path), Some(column)) => {
            csv_io::read_voltage_column(path, column, delimiter_byte(args.csv_delimiter)?)?
        }
        (Some(path), None) => text_io::read_f64_series(path)?,
        (None, Some(column)) => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            csv_io::parse_voltage_column(buf.as_bytes(), column, delimiter_byte(args.csv_delimiter)?)?
        }
        (None, None) => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            text_io::parse_f64_series(&buf)?
        }
    };
    debug!("read {} samples", samples.len());
    Ok(samples)
}

fn delimiter_byte(c: char) -> Result<u8> {
    u8::try_from(c).map_err(|_| anyhow!("CSV delimiter must be a single ASCII character"))
}

fn cmd_summary(capture: &CaptureArgs, pipeline: &PipelineArgs, metrics_only: bool) -> Result<()> {
    let voltages = read_capture(capture)?;
    let cfg = pipeline.resolve()?;
    let js = if metrics_only {
        serde_json::to_string(&summary_statistics(&voltages, &cfg)?)?
    } else {
        let report = analyze(&voltages, &cfg)?;
        info!(
            "onset {} end {} over {} samples",
            report.onset_index, report.metrics.end_index, report.sample_count
        );
        serde_json::to_string(&report)?
    };
    println!("{}", js);
    Ok(())
}

fn cmd_resample(
    capture: &CaptureArgs,
    source_rate: f64,
    target_rate: f64,
    gain: f64,
    baseline: f64,
) -> Result<()> {
    let voltages = read_capture(capture)?;
    let calibration = spiro_lib::Calibration {
        gain,
        baseline_voltage: baseline,
    };
    let flow = to_flow(&voltages, &calibration)?;
    let out = resample(&flow, source_rate, target_rate)?;
    print!("{}", text_io::format_f64_series(&out));
    Ok(())
}

fn cmd_features(request: &Path, pipeline: &PipelineArgs) -> Result<()> {
    let req = request_io::read_capture_request(request)?;
    let subject = req.subject()?;
    let cfg = pipeline.resolve()?;
    let metrics = summary_statistics(&req.breath_data, &cfg)?;
    let features = RiskFeatures::assemble(&metrics, &subject)?;
    println!("{}", serde_json::to_string(&features)?);
    Ok(())
}

fn cmd_plot(
    capture: &CaptureArgs,
    pipeline: &PipelineArgs,
    kind: PlotKind,
    max_points: usize,
    out: &Path,
) -> Result<()> {
    let voltages = read_capture(capture)?;
    let cfg = pipeline.resolve()?;
    let flow = to_flow(&voltages, &cfg.calibration)?;
    let dt = cfg.sampling_interval_s;
    let fig = match kind {
        PlotKind::FlowVolume => {
            let (volume, onset) = integrate(&flow, dt, None, cfg.exhale_positive, &cfg.onset);
            let signed = spiro_lib::signed_flow(&flow, cfg.exhale_positive);
            figure_from_flow_volume(&signed, &volume, onset, max_points)
        }
        PlotKind::FlowTime => figure_from_flow_time(&flow, &time_axis(dt, flow.len()), max_points),
    };
    render::draw_figure(out, &fig)?;
    info!("wrote {}", out.display());
    Ok(())
}

fn cmd_simulate(profile: &BlowProfile, gain: f64, baseline: f64) -> Result<()> {
    if gain == 0.0 {
        return Err(anyhow!("gain must be non-zero"));
    }
    let voltages = synthesize(profile, gain, baseline);
    print!("{}", text_io::format_f64_series(&voltages));
    Ok(())
}
