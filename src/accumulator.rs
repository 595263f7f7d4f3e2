#![warn(missing_docs)]
//! The wavefront accumulation point.
//!
//! An [`Accumulator`] receives single-electron intensity frames one at a time and maintains their running
//! average together with the number of contributions. The average is updated with the plain recurrence
//!
//! `new_average = (old_average * (n - 1) + frame) / n`
//!
//! where `n` is the total number of wavefronts including those restored from a checkpoint. This
//! recurrence accumulates rounding errors over many frames. It is kept for compatibility with existing
//! checkpoints and results.
use crate::{
    checkpoint::Checkpoint,
    config::{AccumulatorConfig, GridMode},
    error::{AccumResult, AccumulatorError},
    frame::Frame,
    interpolation::resample,
    statistics::FrameStatistics,
    utils::usize_to_f64,
};
use log::{debug, info, warn};
use nalgebra::DVector;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Absolute tolerance for comparing the axes of a new frame with the current average.
const AXIS_TOLERANCE: f64 = 1.0e-12;

/// Running average of all frames accumulated so far.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AccumulatedState {
    average: Option<Frame>,
    horizontal_profile: DVector<f64>,
    vertical_profile: DVector<f64>,
    current_count: usize,
    prior_count: usize,
}
impl AccumulatedState {
    /// Creates a state continuing from an already averaged frame of `prior_count` wavefronts.
    ///
    /// The marginal histograms are recomputed from the given average.
    #[must_use]
    pub fn resumed(average: Frame, prior_count: usize) -> Self {
        Self {
            horizontal_profile: average.horizontal_profile(),
            vertical_profile: average.vertical_profile(),
            average: Some(average),
            current_count: 0,
            prior_count,
        }
    }
    /// Adds a frame to the running average.
    ///
    /// The first frame after construction or [`reset`](Self::reset) is adopted as average.
    ///
    /// # Errors
    ///
    /// This function will return an [`AccumulatorError::ShapeMismatch`] if the frame does not have the shape of
    /// the current average. In this case the state stays unchanged.
    pub fn accumulate(&mut self, frame: &Frame) -> AccumResult<()> {
        let Some(average) = self.average.as_mut() else {
            self.horizontal_profile = frame.horizontal_profile();
            self.vertical_profile = frame.vertical_profile();
            self.average = Some(frame.clone());
            self.current_count = 1;
            return Ok(());
        };
        if average.shape() != frame.shape() {
            return Err(AccumulatorError::ShapeMismatch {
                expected: average.shape(),
                found: frame.shape(),
            });
        }
        if !average.same_axes(frame, AXIS_TOLERANCE) {
            warn!("axes of accumulated frame differ from the current average. Accumulating anyway.");
        }
        let n = usize_to_f64(self.prior_count + self.current_count + 1);
        let intensity = average.intensity_mut();
        *intensity = (&*intensity * (n - 1.0) + frame.intensity()) / n;
        self.horizontal_profile =
            (&self.horizontal_profile * (n - 1.0) + frame.horizontal_profile()) / n;
        self.vertical_profile = (&self.vertical_profile * (n - 1.0) + frame.vertical_profile()) / n;
        self.current_count += 1;
        Ok(())
    }
    /// Clears the average and all counters.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
    /// Returns the current average, if any frame was accumulated.
    #[must_use]
    pub const fn average(&self) -> Option<&Frame> {
        self.average.as_ref()
    }
    /// Returns the running average of the horizontal marginal histogram.
    #[must_use]
    pub const fn horizontal_profile(&self) -> &DVector<f64> {
        &self.horizontal_profile
    }
    /// Returns the running average of the vertical marginal histogram.
    #[must_use]
    pub const fn vertical_profile(&self) -> &DVector<f64> {
        &self.vertical_profile
    }
    /// Returns the number of frames accumulated in this session.
    #[must_use]
    pub const fn current_count(&self) -> usize {
        self.current_count
    }
    /// Returns the number of frames carried over from a restored checkpoint.
    #[must_use]
    pub const fn prior_count(&self) -> usize {
        self.prior_count
    }
    /// Returns the total number of frames contributing to the average.
    #[must_use]
    pub const fn total_count(&self) -> usize {
        self.prior_count + self.current_count
    }
    /// Returns `true` if no frame has been accumulated or restored.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.average.is_none()
    }
    /// Calculates the [`FrameStatistics`] of the current average.
    #[must_use]
    pub fn statistics(&self) -> Option<FrameStatistics> {
        self.average.as_ref().map(|average| {
            FrameStatistics::from_profiles(average, &self.horizontal_profile, &self.vertical_profile)
        })
    }
}

/// Stateful accumulation point consuming frames one at a time.
#[derive(Clone, Debug)]
pub struct Accumulator {
    config: AccumulatorConfig,
    state: AccumulatedState,
    statistics: Option<FrameStatistics>,
    checkpoint_file: Option<PathBuf>,
    session: Uuid,
}
impl Default for Accumulator {
    fn default() -> Self {
        Self::new(AccumulatorConfig::default())
    }
}
impl Accumulator {
    /// Creates a new, empty [`Accumulator`] with the given configuration.
    #[must_use]
    pub fn new(config: AccumulatorConfig) -> Self {
        Self {
            config,
            state: AccumulatedState::default(),
            statistics: None,
            checkpoint_file: None,
            session: Uuid::new_v4(),
        }
    }
    /// Adds a frame to the running average.
    ///
    /// In [`GridMode::Merged`] the frame is resampled onto the configured grid first. After a successful
    /// step the statistics are updated and, if configured, a checkpoint is written.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - the resampling fails.
    ///   - the frame shape does not match the current average ([`AccumulatorError::ShapeMismatch`]).
    ///   - the autosave checkpoint could not be written. The frame is accumulated nevertheless.
    pub fn accumulate(&mut self, frame: &Frame) -> AccumResult<()> {
        match self.config.grid_mode() {
            GridMode::Native => self.state.accumulate(frame)?,
            GridMode::Merged(grid) => {
                let resampled = resample(frame, grid, self.config.edge_policy())?;
                self.state.accumulate(&resampled)?;
            }
        }
        self.statistics = self.state.statistics();
        debug!(
            "accumulated wavefront #{} (session {})",
            self.state.total_count(),
            self.session
        );
        if let Some(autosave) = self.config.autosave() {
            if autosave.is_due(self.state.total_count()) {
                let path = autosave.path().to_path_buf();
                Checkpoint::from_state(&self.state, self.session)?.save_to_file(&path)?;
                info!(
                    "autosaved {} wavefronts to {}",
                    self.state.total_count(),
                    path.display()
                );
            }
        }
        Ok(())
    }
    /// Clears the accumulated state and discards any checkpoint file association.
    pub fn reset(&mut self) {
        self.state.reset();
        self.statistics = None;
        self.checkpoint_file = None;
        self.session = Uuid::new_v4();
        debug!("accumulator reset");
    }
    /// Replaces the accumulated state by the content of a [`Checkpoint`].
    ///
    /// Any checkpoint file association is discarded.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - the checkpoint is inconsistent.
    ///   - in [`GridMode::Merged`], the restored average does not lie on the configured grid.
    ///
    /// The accumulator stays unchanged in these cases.
    pub fn restore(&mut self, checkpoint: Checkpoint) -> AccumResult<()> {
        let session = checkpoint.session();
        let state = checkpoint.into_state()?;
        if let (GridMode::Merged(grid), Some(average)) = (self.config.grid_mode(), state.average()) {
            let on_grid = Frame::from_grid(average.intensity().clone(), grid)
                .is_ok_and(|f| f.same_axes(average, AXIS_TOLERANCE));
            if !on_grid {
                let (rows, cols) = average.shape();
                return Err(AccumulatorError::Checkpoint(format!(
                    "restored average ({rows}x{cols}) does not lie on the configured merge grid {grid}"
                )));
            }
        }
        self.statistics = state.statistics();
        self.state = state;
        self.session = session;
        self.checkpoint_file = None;
        Ok(())
    }
    /// Restores the accumulated state from a checkpoint file and associates this file with the accumulator.
    ///
    /// # Errors
    ///
    /// This function will return an error if the file is missing or corrupt. The accumulator stays unchanged
    /// in this case.
    pub fn restore_from_file(&mut self, path: &Path) -> AccumResult<()> {
        let checkpoint = Checkpoint::from_file(path)?;
        self.restore(checkpoint)?;
        self.checkpoint_file = Some(path.to_path_buf());
        info!(
            "restored {} wavefronts from {}",
            self.state.prior_count(),
            path.display()
        );
        Ok(())
    }
    /// Returns a [`Checkpoint`] of the current state.
    ///
    /// # Errors
    ///
    /// This function will return an error if nothing has been accumulated yet.
    pub fn checkpoint(&self) -> AccumResult<Checkpoint> {
        Checkpoint::from_state(&self.state, self.session)
    }
    /// Writes a checkpoint to the given file and associates this file with the accumulator.
    ///
    /// # Errors
    ///
    /// This function will return an error if nothing has been accumulated yet or the file could not be written.
    pub fn checkpoint_to_file(&mut self, path: &Path) -> AccumResult<()> {
        self.checkpoint()?.save_to_file(path)?;
        self.checkpoint_file = Some(path.to_path_buf());
        Ok(())
    }
    /// Writes a checkpoint to the associated file.
    ///
    /// # Errors
    ///
    /// This function will return an error if no file is associated or the checkpoint could not be written.
    pub fn save(&self) -> AccumResult<()> {
        let path = self.checkpoint_file.as_ref().ok_or_else(|| {
            AccumulatorError::Checkpoint("no checkpoint file associated with accumulator".into())
        })?;
        self.checkpoint()?.save_to_file(path)
    }
    /// Returns the accumulated state.
    #[must_use]
    pub const fn state(&self) -> &AccumulatedState {
        &self.state
    }
    /// Returns the current average, if any.
    #[must_use]
    pub const fn average(&self) -> Option<&Frame> {
        self.state.average()
    }
    /// Returns the statistics of the current average, if any.
    #[must_use]
    pub const fn statistics(&self) -> Option<&FrameStatistics> {
        self.statistics.as_ref()
    }
    /// Returns the total number of accumulated wavefronts.
    #[must_use]
    pub const fn total_count(&self) -> usize {
        self.state.total_count()
    }
    /// Returns the configuration of this [`Accumulator`].
    #[must_use]
    pub const fn config(&self) -> &AccumulatorConfig {
        &self.config
    }
    /// Returns the checkpoint file associated with this [`Accumulator`], if any.
    #[must_use]
    pub fn checkpoint_file(&self) -> Option<&Path> {
        self.checkpoint_file.as_deref()
    }
    /// Returns the session id of this [`Accumulator`].
    ///
    /// The id is renewed on [`reset`](Self::reset) and taken over from restored checkpoints.
    #[must_use]
    pub const fn session(&self) -> Uuid {
        self.session
    }
}
