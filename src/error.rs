#![warn(missing_docs)]
//! Accumulator specific error structures
use std::{error::Error, fmt::Display};

/// Application specific Result type
pub type AccumResult<T> = std::result::Result<T, AccumulatorError>;

/// Errors that can be returned by the accumulation functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccumulatorError {
    /// a frame does not have the shape of the current average. Shapes are given as `(rows, columns)`.
    ShapeMismatch {
        /// shape of the current average
        expected: (usize, usize),
        /// shape of the rejected frame
        found: (usize, usize),
    },
    /// invalid axis or grid definitions
    Grid(String),
    /// errors while constructing or reading a frame
    Frame(String),
    /// errors during spline construction or resampling
    Interpolation(String),
    /// errors while writing or restoring a checkpoint
    Checkpoint(String),
    /// errors in connection with the configuration
    Config(String),
    /// errors console io
    Console(String),
    /// errors not falling in one of the categories above
    Other(String),
}

impl Display for AccumulatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ShapeMismatch { expected, found } => {
                write!(
                    f,
                    "ShapeMismatch:expected {}x{} but frame has {}x{}",
                    expected.0, expected.1, found.0, found.1
                )
            }
            Self::Grid(m) => {
                write!(f, "Grid:{m}")
            }
            Self::Frame(m) => {
                write!(f, "Frame:{m}")
            }
            Self::Interpolation(m) => {
                write!(f, "Interpolation:{m}")
            }
            Self::Checkpoint(m) => {
                write!(f, "Checkpoint:{m}")
            }
            Self::Config(m) => {
                write!(f, "Config:{m}")
            }
            Self::Console(m) => {
                write!(f, "Console:{m}")
            }
            Self::Other(m) => write!(f, "Accumulator Error:Other:{m}"),
        }
    }
}
impl Error for AccumulatorError {}

impl std::convert::From<String> for AccumulatorError {
    fn from(msg: String) -> Self {
        Self::Other(msg)
    }
}
