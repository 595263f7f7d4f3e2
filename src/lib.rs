//! This is the documentation for the **wavefront_accumulator** package.
//!
//! The package collects intensity frames of simulated wavefronts (as produced by a wave optics
//! propagation code) and keeps a running average of them. Frames can either be accumulated on their native
//! grid or resampled onto a fixed grid using bicubic spline interpolation. The accumulated state can be
//! written to a checkpoint file and restored later on in order to continue the accumulation.
//!
//! The main entry point is the [`Accumulator`](accumulator::Accumulator).
#![allow(clippy::module_name_repetitions)]

pub mod accumulator;
pub mod checkpoint;
pub mod config;
pub mod console;
pub mod error;
pub mod frame;
pub mod grid;
pub mod interpolation;
pub mod statistics;
pub mod utils;

use checkpoint::CHECKPOINT_FILE_VERSION;

/// Returns the version string of this package including the supported checkpoint file version.
#[must_use]
pub fn get_version() -> String {
    format!(
        "{} (checkpoint format {})",
        env!("CARGO_PKG_VERSION"),
        CHECKPOINT_FILE_VERSION
    )
}
