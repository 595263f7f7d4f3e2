#![warn(missing_docs)]
//! Persistence of the accumulated state.
//!
//! A [`Checkpoint`] stores the averaged intensity, its axes and the number of contributing wavefronts.
//! The document is organized in three top level groups:
//! - `coordinates`: the horizontal (`x`) and vertical (`y`) axis
//! - `plot`: the averaged `intensity`, one list per row (vertical position)
//! - `attributes`: the wavefront count and bookkeeping information
//!
//! Restoring a checkpoint continues the running average: the stored count becomes the prior count of the
//! new session.
use crate::{
    accumulator::AccumulatedState,
    error::{AccumResult, AccumulatorError},
    frame::Frame,
};
use chrono::{DateTime, Utc};
use log::warn;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::Path,
};
use uuid::Uuid;

/// Version of the checkpoint document layout.
pub const CHECKPOINT_FILE_VERSION: &str = "1.0";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
struct Coordinates {
    x: Vec<f64>,
    y: Vec<f64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
struct PlotData {
    intensity: Vec<Vec<f64>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
struct Attributes {
    wavefront_count: usize,
    file_version: String,
    session: Uuid,
    created: DateTime<Utc>,
}

/// Serializable snapshot of an [`AccumulatedState`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Checkpoint {
    coordinates: Coordinates,
    plot: PlotData,
    attributes: Attributes,
}
impl Checkpoint {
    /// Creates a [`Checkpoint`] of the given state.
    ///
    /// # Errors
    ///
    /// This function will return an error if the state is empty.
    pub fn from_state(state: &AccumulatedState, session: Uuid) -> AccumResult<Self> {
        let average = state.average().ok_or_else(|| {
            AccumulatorError::Checkpoint("cannot checkpoint an empty accumulator".into())
        })?;
        let intensity: Vec<Vec<f64>> = average
            .intensity()
            .row_iter()
            .map(|row| row.iter().copied().collect::<Vec<f64>>())
            .collect();
        Ok(Self {
            coordinates: Coordinates {
                x: average.x_axis().iter().copied().collect(),
                y: average.y_axis().iter().copied().collect(),
            },
            plot: PlotData { intensity },
            attributes: Attributes {
                wavefront_count: state.total_count(),
                file_version: CHECKPOINT_FILE_VERSION.to_string(),
                session,
                created: Utc::now(),
            },
        })
    }
    /// Converts this [`Checkpoint`] into an [`AccumulatedState`] continuing the stored average.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - the stored wavefront count is zero.
    ///   - the intensity rows do not match the stored axes.
    ///   - the stored data does not form a valid frame.
    pub fn into_state(self) -> AccumResult<AccumulatedState> {
        if self.attributes.wavefront_count == 0 {
            return Err(AccumulatorError::Checkpoint(
                "checkpoint does not contain any wavefront".into(),
            ));
        }
        let (nx, ny) = (self.coordinates.x.len(), self.coordinates.y.len());
        if self.plot.intensity.len() != ny || self.plot.intensity.iter().any(|row| row.len() != nx)
        {
            return Err(AccumulatorError::Checkpoint(format!(
                "intensity data does not match the stored {ny}x{nx} grid"
            )));
        }
        let values: Vec<f64> = self.plot.intensity.into_iter().flatten().collect();
        let frame = Frame::new(
            DMatrix::from_row_slice(ny, nx, &values),
            DVector::from_vec(self.coordinates.x),
            DVector::from_vec(self.coordinates.y),
        )
        .map_err(|e| AccumulatorError::Checkpoint(format!("invalid frame data: {e}")))?;
        Ok(AccumulatedState::resumed(
            frame,
            self.attributes.wavefront_count,
        ))
    }
    /// Returns the number of wavefronts contributing to the stored average.
    #[must_use]
    pub const fn wavefront_count(&self) -> usize {
        self.attributes.wavefront_count
    }
    /// Returns the id of the session that wrote this [`Checkpoint`].
    #[must_use]
    pub const fn session(&self) -> Uuid {
        self.attributes.session
    }
    /// Returns the creation time of this [`Checkpoint`].
    #[must_use]
    pub const fn created(&self) -> DateTime<Utc> {
        self.attributes.created
    }
    /// Creates a [`Checkpoint`] from the given file.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - the given path is not found or readable.
    ///   - the parsing of the file failed.
    pub fn from_file(path: &Path) -> AccumResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            AccumulatorError::Checkpoint(format!("cannot read file {} : {}", path.display(), e))
        })?;
        Self::from_yaml_str(&contents)
    }
    /// Creates a [`Checkpoint`] from the given YAML string.
    ///
    /// # Errors
    ///
    /// This function will return an error if the parsing of the string failed.
    pub fn from_yaml_str(contents: &str) -> AccumResult<Self> {
        let checkpoint: Self = serde_yaml::from_str(contents).map_err(|e| {
            AccumulatorError::Checkpoint(format!("parsing of checkpoint failed: {e}"))
        })?;
        if checkpoint.attributes.file_version != CHECKPOINT_FILE_VERSION {
            warn!(
                "checkpoint version '{}' does not match program version '{}'. The restored data might not be correct.",
                checkpoint.attributes.file_version, CHECKPOINT_FILE_VERSION
            );
        }
        Ok(checkpoint)
    }
    /// Returns the YAML representation of this [`Checkpoint`].
    ///
    /// # Errors
    ///
    /// This function will return an error if the serialization failed.
    pub fn to_yaml_string(&self) -> AccumResult<String> {
        serde_yaml::to_string(self).map_err(|e| {
            AccumulatorError::Checkpoint(format!("serialization of checkpoint failed: {e}"))
        })
    }
    /// Saves this [`Checkpoint`] to a file with the given path.
    ///
    /// The call returns after the file content has been flushed.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - the serialization failed.
    ///   - the file cannot be created.
    ///   - it cannot write into the file (e.g. no space).
    pub fn save_to_file(&self, path: &Path) -> AccumResult<()> {
        let serialized = self.to_yaml_string()?;
        let mut output = File::create(path).map_err(|e| {
            AccumulatorError::Checkpoint(format!(
                "could not create file path: {}: {}",
                path.display(),
                e
            ))
        })?;
        write!(output, "{serialized}")
            .and_then(|()| output.sync_all())
            .map_err(|e| {
                AccumulatorError::Checkpoint(format!(
                    "writing to file path {} failed: {}",
                    path.display(),
                    e
                ))
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utils::test_helper::test_helper::{check_warnings, frame_from_matrix};
    use assert_matches::assert_matches;
    use nalgebra::{dmatrix, dvector};
    use tempfile::NamedTempFile;

    fn state_of(frames: &[Frame]) -> AccumulatedState {
        let mut state = AccumulatedState::default();
        for frame in frames {
            state.accumulate(frame).unwrap();
        }
        state
    }
    #[test]
    fn from_state() {
        let state = state_of(&[
            frame_from_matrix(dmatrix![1.0, 2.0, 3.0; 4.0, 5.0, 6.0]),
            frame_from_matrix(dmatrix![1.0, 2.0, 3.0; 4.0, 5.0, 6.0]),
        ]);
        let session = Uuid::new_v4();
        let checkpoint = Checkpoint::from_state(&state, session).unwrap();
        assert_eq!(checkpoint.wavefront_count(), 2);
        assert_eq!(checkpoint.session(), session);
        assert_eq!(checkpoint.coordinates.x, vec![0.0, 1.0, 2.0]);
        assert_eq!(checkpoint.coordinates.y, vec![0.0, 1.0]);
        assert_eq!(
            checkpoint.plot.intensity,
            vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]
        );
    }
    #[test]
    fn from_empty_state() {
        assert_matches!(
            Checkpoint::from_state(&AccumulatedState::default(), Uuid::new_v4()),
            Err(AccumulatorError::Checkpoint(_))
        );
    }
    #[test]
    fn into_state() {
        let state = state_of(&[frame_from_matrix(dmatrix![1.0, 2.0; 3.0, 4.0])]);
        let restored = Checkpoint::from_state(&state, Uuid::new_v4())
            .unwrap()
            .into_state()
            .unwrap();
        assert_eq!(restored.prior_count(), 1);
        assert_eq!(restored.current_count(), 0);
        assert_eq!(restored.total_count(), 1);
        assert_eq!(restored.average(), state.average());
        assert_eq!(restored.horizontal_profile(), &dvector![4.0, 6.0]);
    }
    #[test]
    fn into_state_inconsistent() {
        let state = state_of(&[frame_from_matrix(dmatrix![1.0, 2.0; 3.0, 4.0])]);
        let mut checkpoint = Checkpoint::from_state(&state, Uuid::new_v4()).unwrap();
        checkpoint.plot.intensity[1].pop();
        assert_matches!(checkpoint.into_state(), Err(AccumulatorError::Checkpoint(_)));

        let mut checkpoint = Checkpoint::from_state(&state, Uuid::new_v4()).unwrap();
        checkpoint.attributes.wavefront_count = 0;
        assert_matches!(checkpoint.into_state(), Err(AccumulatorError::Checkpoint(_)));

        let mut checkpoint = Checkpoint::from_state(&state, Uuid::new_v4()).unwrap();
        checkpoint.coordinates.x = vec![1.0, 0.0];
        assert_matches!(checkpoint.into_state(), Err(AccumulatorError::Checkpoint(_)));
    }
    #[test]
    fn yaml_round_trip() {
        let state = state_of(&[
            frame_from_matrix(dmatrix![0.1, 0.2; 0.3, 0.4]),
            frame_from_matrix(dmatrix![1.0 / 3.0, 0.0; 2.5e-17, 7.0e12]),
        ]);
        let checkpoint = Checkpoint::from_state(&state, Uuid::new_v4()).unwrap();
        let serialized = checkpoint.to_yaml_string().unwrap();
        assert!(serialized.contains("coordinates:"));
        assert!(serialized.contains("plot:"));
        assert!(serialized.contains("attributes:"));
        assert!(serialized.contains("wavefront_count: 2"));
        assert_eq!(Checkpoint::from_yaml_str(&serialized).unwrap(), checkpoint);
    }
    #[test]
    fn from_yaml_str_corrupt() {
        assert_matches!(
            Checkpoint::from_yaml_str("coordinates: [1, 2"),
            Err(AccumulatorError::Checkpoint(_))
        );
        assert_matches!(
            Checkpoint::from_yaml_str("plot:\n  intensity: []\n"),
            Err(AccumulatorError::Checkpoint(_))
        );
    }
    #[test]
    fn version_mismatch_warning() {
        testing_logger::setup();
        let state = state_of(&[frame_from_matrix(dmatrix![1.0])]);
        let mut checkpoint = Checkpoint::from_state(&state, Uuid::new_v4()).unwrap();
        checkpoint.attributes.file_version = "0.1".into();
        let serialized = checkpoint.to_yaml_string().unwrap();
        assert!(Checkpoint::from_yaml_str(&serialized).is_ok());
        check_warnings(vec![
            "checkpoint version '0.1' does not match program version '1.0'. The restored data might not be correct.",
        ]);
    }
    #[test]
    fn file_round_trip() {
        let state = state_of(&[frame_from_matrix(dmatrix![1.0, 2.0; 3.0, 4.0])]);
        let checkpoint = Checkpoint::from_state(&state, Uuid::new_v4()).unwrap();
        let file = NamedTempFile::new().unwrap();
        checkpoint.save_to_file(file.path()).unwrap();
        assert_eq!(Checkpoint::from_file(file.path()).unwrap(), checkpoint);
    }
    #[test]
    fn file_errors() {
        assert_matches!(
            Checkpoint::from_file(Path::new("./invalid_file_path/ckpt.yaml")),
            Err(AccumulatorError::Checkpoint(_))
        );
        let state = state_of(&[frame_from_matrix(dmatrix![1.0])]);
        let checkpoint = Checkpoint::from_state(&state, Uuid::new_v4()).unwrap();
        assert_matches!(
            checkpoint.save_to_file(Path::new("./invalid_file_path/ckpt.yaml")),
            Err(AccumulatorError::Checkpoint(_))
        );
    }
}
