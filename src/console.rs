//! Handling the command line interface
//!
//! This module handles the command line parsing and drives an accumulation run over a list of frame files.
use crate::{
    accumulator::Accumulator,
    config::{AccumulatorConfig, GridMode},
    error::{AccumResult, AccumulatorError},
    frame::Frame,
    get_version,
    grid::{AxisDef, Grid},
};
use clap::{builder::Str, Parser};
use log::{error, info};
use std::path::{Path, PathBuf};

/// Validated arguments of an accumulation run.
#[derive(Debug, Clone)]
pub struct Args {
    /// intensity frames (csv files) in the order of accumulation
    pub frames: Vec<PathBuf>,
    /// accumulation settings
    pub config: AccumulatorConfig,
    /// checkpoint to resume the accumulation from
    pub resume: Option<PathBuf>,
    /// checkpoint file written at the end of the run
    pub output: Option<PathBuf>,
    /// csv file the averaged frame is exported to
    pub export: Option<PathBuf>,
}

#[derive(Parser)]
#[command(author, version = Str::from(get_version()), about, long_about = None)]
pub struct PartialArgs {
    /// intensity frames (csv files) to accumulate
    #[arg(required = true)]
    frames: Vec<String>,

    /// configuration file (yaml)
    #[arg(short, long)]
    config: Option<String>,

    /// checkpoint to resume from. The final checkpoint is written back to it if no output is given
    #[arg(short, long)]
    resume: Option<String>,

    /// destination of the final checkpoint
    #[arg(short, long)]
    output: Option<String>,

    /// export the averaged frame as csv
    #[arg(short, long)]
    export: Option<String>,

    /// fixed merge grid as "x_start,x_end,nx,y_start,y_end,ny". Overrides the configured grid mode
    #[arg(short, long)]
    grid: Option<String>,
}

/// Parses a grid definition of the form `x_start,x_end,nx,y_start,y_end,ny`.
///
/// # Errors
///
/// This function will return an error if the string does not contain six valid comma separated values
/// or the resulting axes are invalid.
pub fn parse_grid(grid: &str) -> AccumResult<Grid> {
    let fields: Vec<&str> = grid.split(',').map(str::trim).collect();
    if fields.len() != 6 {
        return Err(AccumulatorError::Console(format!(
            "grid definition '{grid}' must contain 6 comma separated values"
        )));
    }
    let float = |s: &str| {
        s.parse::<f64>()
            .map_err(|e| AccumulatorError::Console(format!("invalid grid value '{s}': {e}")))
    };
    let count = |s: &str| {
        s.parse::<usize>()
            .map_err(|e| AccumulatorError::Console(format!("invalid number of points '{s}': {e}")))
    };
    Ok(Grid::new(
        AxisDef::new(float(fields[0])?, float(fields[1])?, count(fields[2])?)?,
        AxisDef::new(float(fields[3])?, float(fields[4])?, count(fields[5])?)?,
    ))
}

fn existing_file(path: &str) -> AccumResult<PathBuf> {
    let path = PathBuf::from(path);
    if path.is_file() {
        Ok(path)
    } else {
        Err(AccumulatorError::Console(format!(
            "file {} does not exist",
            path.display()
        )))
    }
}

impl TryFrom<PartialArgs> for Args {
    type Error = AccumulatorError;

    fn try_from(part_args: PartialArgs) -> AccumResult<Self> {
        let frames = part_args
            .frames
            .iter()
            .map(|f| existing_file(f))
            .collect::<AccumResult<Vec<PathBuf>>>()?;
        let mut config = match part_args.config.as_deref() {
            Some(path) => AccumulatorConfig::from_file(Path::new(path))?,
            None => AccumulatorConfig::default(),
        };
        if let Some(grid) = part_args.grid.as_deref() {
            config.set_grid_mode(GridMode::Merged(parse_grid(grid)?));
        }
        let resume = part_args.resume.as_deref().map(existing_file).transpose()?;
        Ok(Self {
            frames,
            config,
            resume,
            output: part_args.output.map(PathBuf::from),
            export: part_args.export.map(PathBuf::from),
        })
    }
}

/// Performs an accumulation run.
///
/// Frames whose shape does not match the current average are reported and skipped. The final state is
/// written to the output checkpoint (or back to the resumed checkpoint) and optionally exported as csv.
///
/// # Errors
///
/// This function will return an error if
///   - the resumed checkpoint cannot be restored.
///   - a frame file cannot be read.
///   - resampling of a frame fails.
///   - the checkpoint or the export cannot be written.
pub fn run(args: &Args) -> AccumResult<Accumulator> {
    let mut accumulator = Accumulator::new(args.config.clone());
    info!("grid mode: {}", accumulator.config().grid_mode());
    if let Some(resume) = &args.resume {
        accumulator.restore_from_file(resume)?;
    }
    for path in &args.frames {
        let frame = Frame::from_csv(path)?;
        match accumulator.accumulate(&frame) {
            Ok(()) => info!(
                "accumulated {} (total: {} wavefronts)",
                path.display(),
                accumulator.total_count()
            ),
            Err(e @ AccumulatorError::ShapeMismatch { .. }) => {
                error!("skipping {}: {e}", path.display());
            }
            Err(e) => return Err(e),
        }
    }
    if accumulator.state().is_empty() {
        info!("no frame accumulated. Nothing to save.");
        return Ok(accumulator);
    }
    if let Some(output) = &args.output {
        accumulator.checkpoint_to_file(output)?;
        info!("checkpoint written to {}", output.display());
    } else if accumulator.checkpoint_file().is_some() {
        accumulator.save()?;
    }
    if let (Some(export), Some(average)) = (&args.export, accumulator.average()) {
        average.to_csv(export)?;
        info!("average exported to {}", export.display());
    }
    Ok(accumulator)
}
