// src/main.rs

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use log::{error, info};

use gpr_plot::constants::DEFAULT_SAVE_DPI;
use gpr_plot::data_input::loader::DefaultLoader;
use gpr_plot::orchestrator::{run, PreviewSink};
use gpr_plot::PlotRequest;

#[derive(Parser)]
#[command(author, version, about = "Plot radargrams, trace profiles or pick power of GPR records")]
struct Args {
    /// Input files
    #[arg(required = true, value_name = "FNS")]
    fns: Vec<PathBuf>,
    /// Plot traces instead of the radargram: one index, or a pair like "5,9"
    #[arg(long = "tr", value_name = "TRACES")]
    traces: Option<String>,
    /// Plot return power of this pick number on a map
    #[arg(long, value_name = "PICK")]
    power: Option<String>,
    /// Inputs are native processed records (default)
    #[arg(long, default_value_t = false)]
    native: bool,
    /// Inputs are GSSI files
    #[arg(long, default_value_t = false)]
    gssi: bool,
    /// Inputs are PulseEKKO files
    #[arg(long, default_value_t = false)]
    pe: bool,
    /// Save one image per input instead of showing a preview
    #[arg(short, long, default_value_t = false)]
    save: bool,
    /// Output file extension when saving
    #[arg(long, default_value = "png")]
    ftype: String,
    /// Output resolution when saving
    #[arg(long, default_value_t = DEFAULT_SAVE_DPI)]
    dpi: u32,
    /// Horizontal axis: tnum or dist
    #[arg(long, default_value = "tnum")]
    xd: String,
    /// Vertical axis: twtt or depth
    #[arg(long, default_value = "twtt")]
    yd: String,
    /// First and last trace of the radargram window; -1 runs to the last trace
    #[arg(
        long = "x-range",
        num_args = 2,
        value_names = ["START", "END"],
        allow_negative_numbers = true,
        default_values_t = [0, -1]
    )]
    x_range: Vec<i64>,
    /// Radargram colormap: gray or viridis
    #[arg(long, default_value = "gray")]
    cmap: String,
    /// Keep processing remaining inputs after one fails
    #[arg(long, default_value_t = false)]
    keep_going: bool,
    /// Where the show-mode preview is written
    #[arg(long, value_name = "PATH")]
    preview: Option<PathBuf>,
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let (start, end) = match args.x_range.as_slice() {
        [start, end] => (*start, *end),
        _ => (0, -1),
    };

    let mut builder = PlotRequest::builder()
        .inputs(args.fns)
        .native(args.native)
        .gssi(args.gssi)
        .pulse_ekko(args.pe)
        .vertical(args.yd)
        .horizontal(args.xd)
        .trace_range(start, end)
        .colormap(args.cmap)
        .save(args.save)
        .output_format(args.ftype)
        .dpi(args.dpi)
        .keep_going(args.keep_going);
    if let Some(traces) = args.traces {
        builder = builder.trace(traces);
    }
    if let Some(pick) = args.power {
        builder = builder.power(pick);
    }
    let request = builder.build().context("invalid plot request")?;

    let mut sink = match args.preview {
        Some(path) => PreviewSink::new(path),
        None => PreviewSink::default(),
    };
    let report = run(&request, &DefaultLoader, &mut sink).context("plotting failed")?;

    for path in &report.saved {
        info!("Wrote {}", path.display());
    }
    if report.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        for (path, err) in &report.failures {
            error!("{}: {}", path.display(), err);
        }
        Ok(ExitCode::FAILURE)
    }
}

// src/main.rs
