//! # Credibility Development Kit Executable
//!
//! Command line front end of the toolkit:
//! - `translate` converts simulation result files into signals
//! - `pose` resolves a road coordinate of an OpenDRIVE map
//! - `marks` samples the road marks of a lane
//! - `stats` summarises an OpenDRIVE map
//! - `check` checks an OpenDRIVE map for gaps and undefined references
//!
//! Results are printed to stdout as JSON.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Parameters for the executable.
mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Result};
use log::{debug, info, warn};
use std::{
    path::{Path, PathBuf},
    str::FromStr,
};
use structopt::{clap::AppSettings, StructOpt};

// Internal
use odr_reader::{checks, MapStatistics, OdrReader};
use std::collections::BTreeMap;
use params::CdkExecParams;
use util::logger::{logger_init, LevelFilter};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "cdk_exec", about = "Credibility Development Kit command line tool")]
struct Opt {
    /// Include debug records in the log
    #[structopt(short, long)]
    verbose: bool,

    /// Also write the log to this file
    #[structopt(long, parse(from_os_str))]
    log_file: Option<PathBuf>,

    /// Parameter file, relative paths are resolved in `$CDK_ROOT/params`
    #[structopt(long, default_value = "cdk_exec.toml")]
    params: String,

    #[structopt(subcommand)]
    cmd: Command,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
enum Command {
    /// Translate a simulation result file into signals.
    #[structopt(name = "translate")]
    Translate {
        /// Tool that wrote the file, `esmini` or `openmcx`
        #[structopt(short, long, default_value = "esmini")]
        format: ResultFormat,

        /// Only translate this signal (esmini only)
        #[structopt(short, long)]
        signal: Option<String>,

        /// The CSV result file
        #[structopt(parse(from_os_str))]
        csv: PathBuf,
    },

    /// Resolve the pose of a road coordinate.
    #[structopt(name = "pose", setting = AppSettings::AllowNegativeNumbers)]
    Pose {
        /// The OpenDRIVE map
        #[structopt(parse(from_os_str))]
        xodr: PathBuf,

        road: String,

        /// Position along the road in metres
        s: f64,

        /// Lateral position in metres, positive to the left
        #[structopt(default_value = "0")]
        t: f64,
    },

    /// Sample the road marks of a lane.
    #[structopt(name = "marks", setting = AppSettings::AllowNegativeNumbers)]
    Marks {
        /// The OpenDRIVE map
        #[structopt(parse(from_os_str))]
        xodr: PathBuf,

        road: String,

        lane: i32,

        s_start: f64,

        s_end: f64,

        /// Sampling step in metres, overrides the parameter file
        #[structopt(long)]
        ds: Option<f64>,
    },

    /// Summarise an OpenDRIVE map.
    #[structopt(name = "stats")]
    Stats {
        /// The OpenDRIVE map
        #[structopt(parse(from_os_str))]
        xodr: PathBuf,
    },

    /// Check an OpenDRIVE map for gaps and undefined references.
    #[structopt(name = "check")]
    Check {
        /// The OpenDRIVE map
        #[structopt(parse(from_os_str))]
        xodr: PathBuf,
    },
}

#[derive(Debug, Clone, Copy)]
enum ResultFormat {
    Esmini,
    OpenMcx,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FromStr for ResultFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "esmini" => Ok(ResultFormat::Esmini),
            "openmcx" => Ok(ResultFormat::OpenMcx),
            _ => Err(format!("Unknown result format {:?}", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<()> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    util::session::init_epoch().wrap_err("Failed to start the session")?;

    let level = if opt.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    logger_init(level, opt.log_file.as_ref()).wrap_err("Failed to initialise logging")?;

    info!("Credibility Development Kit Executable");
    debug!("CLI arguments: {:?}", opt);

    // ---- LOAD PARAMETERS ----

    let params: CdkExecParams = util::params::load(&opt.params)
        .wrap_err_with(|| format!("Could not load parameters from {:?}", opt.params))?;

    info!("Parameters loaded");

    // ---- RUN COMMAND ----

    match opt.cmd {
        Command::Translate {
            format,
            signal,
            csv,
        } => translate(format, signal.as_deref(), &csv, params.verbose_signals),
        Command::Pose { xodr, road, s, t } => {
            let reader = load_map(&xodr)?;
            let pose = reader.get_pose(&road, s, t).wrap_err_with(|| {
                format!("Could not resolve s = {}, t = {} on road {}", s, t, road)
            })?;

            info!("Pose: {}", pose);
            print_json(&pose)
        }
        Command::Marks {
            xodr,
            road,
            lane,
            s_start,
            s_end,
            ds,
        } => {
            let reader = load_map(&xodr)?;

            let mut marks_params = params.marks;
            if let Some(ds) = ds {
                marks_params.ds = ds;
            }

            let points = reader
                .get_lane_marking_points_with(&road, s_start, s_end, lane, &marks_params)
                .wrap_err("Could not sample the lane marks")?;

            info!("Sampled {} marking points", points.len());
            print_json(&points)
        }
        Command::Stats { xodr } => {
            let reader = load_map(&xodr)?;
            let stats = MapStatistics::compute(&reader, &params.stats)
                .wrap_err("Could not compute the map statistics")?;

            print_json(&stats)
        }
        Command::Check { xodr } => {
            let reader = load_map(&xodr)?;

            let mut results = BTreeMap::new();
            results.insert(
                "offsets",
                checks::check_offsets(&reader, &params.checks.offset_threshold)
                    .wrap_err("Could not check the map offsets")?,
            );
            results.insert("references", checks::check_references(&reader));

            for (name, check) in results.iter().filter(|(_, c)| !c.passed) {
                warn!("Map check {} failed: {}", name, check.log);
            }

            print_json(&results)
        }
    }
}

fn translate(
    format: ResultFormat,
    signal: Option<&str>,
    csv: &Path,
    verbose: bool,
) -> Result<()> {
    let signals = match format {
        ResultFormat::Esmini => adapters::esmini::translate(csv, signal),
        ResultFormat::OpenMcx => adapters::openmcx::translate(csv),
    }
    .wrap_err_with(|| format!("Could not translate {:?}", csv))?;

    info!("Translated {} signals from {:?}", signals.len(), csv);

    for s in signals.iter() {
        println!("{}", s.print(verbose).wrap_err("Could not print the signal")?);
    }

    Ok(())
}

fn load_map(xodr: &Path) -> Result<OdrReader> {
    OdrReader::from_file(xodr).wrap_err_with(|| format!("Could not read the map {:?}", xodr))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).wrap_err("Could not serialise the result")?
    );

    Ok(())
}
