#![warn(missing_docs)]
//! Configuration of an accumulation session.
//!
//! The configuration can be built programmatically or read from a YAML file:
//! ```yaml
//! grid_mode: Native
//! edge_policy: Extrapolate
//! autosave:
//!   path: accumulated.yaml
//!   every: 10
//! ```
//! A fixed merge grid is given as a tagged map:
//! ```yaml
//! grid_mode: !Merged
//!   horizontal:
//!     start: -0.001
//!     end: 0.001
//!     points: 101
//!   vertical:
//!     start: -0.0005
//!     end: 0.0005
//!     points: 51
//! edge_policy: Clamp
//! ```
//! Invalid axis definitions are rejected when the file is read.
use crate::{
    error::{AccumResult, AccumulatorError},
    grid::Grid,
    interpolation::EdgePolicy,
};
use serde::{Deserialize, Serialize};
use std::{
    fmt::Display,
    fs,
    path::{Path, PathBuf},
};

/// Selection of the grid the frames are accumulated on.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub enum GridMode {
    /// adopt the grid of the first frame. All following frames must have the same shape.
    #[default]
    Native,
    /// resample every frame onto the given fixed grid before accumulation
    Merged(Grid),
}
impl Display for GridMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Native => write!(f, "native"),
            Self::Merged(grid) => write!(f, "merged ({grid})"),
        }
    }
}

/// Periodic writing of checkpoints during accumulation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AutosaveConfig {
    path: PathBuf,
    every: usize,
}
impl AutosaveConfig {
    /// Creates a new [`AutosaveConfig`] writing a checkpoint to `path` every `every` wavefronts.
    ///
    /// # Errors
    ///
    /// This function will return an error if `every` is zero.
    pub fn new(path: &Path, every: usize) -> AccumResult<Self> {
        if every == 0 {
            return Err(AccumulatorError::Config(
                "autosave interval must be at least 1".into(),
            ));
        }
        Ok(Self {
            path: path.to_path_buf(),
            every,
        })
    }
    /// Returns the checkpoint path of this [`AutosaveConfig`].
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
    /// Returns the autosave interval (in number of accumulated wavefronts).
    #[must_use]
    pub const fn every(&self) -> usize {
        self.every
    }
    /// Returns `true` if a checkpoint is due after `total_count` wavefronts.
    #[must_use]
    pub const fn is_due(&self, total_count: usize) -> bool {
        total_count > 0 && total_count % self.every == 0
    }
}

/// Settings of an [`Accumulator`](crate::accumulator::Accumulator).
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct AccumulatorConfig {
    grid_mode: GridMode,
    edge_policy: EdgePolicy,
    autosave: Option<AutosaveConfig>,
}
impl AccumulatorConfig {
    /// Creates a new [`AccumulatorConfig`].
    #[must_use]
    pub const fn new(
        grid_mode: GridMode,
        edge_policy: EdgePolicy,
        autosave: Option<AutosaveConfig>,
    ) -> Self {
        Self {
            grid_mode,
            edge_policy,
            autosave,
        }
    }
    /// Reads an [`AccumulatorConfig`] from a YAML file.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - the given path is not found or readable.
    ///   - the parsing of the file failed.
    pub fn from_file(path: &Path) -> AccumResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            AccumulatorError::Config(format!("cannot read file {} : {}", path.display(), e))
        })?;
        Self::from_yaml_str(&contents)
    }
    /// Parses an [`AccumulatorConfig`] from a YAML string.
    ///
    /// # Errors
    ///
    /// This function will return an error if the parsing failed or the autosave interval is zero.
    pub fn from_yaml_str(contents: &str) -> AccumResult<Self> {
        let config: Self = serde_yaml::from_str(contents).map_err(|e| {
            AccumulatorError::Config(format!("parsing of configuration failed: {e}"))
        })?;
        if let Some(autosave) = &config.autosave {
            AutosaveConfig::new(&autosave.path, autosave.every)?;
        }
        Ok(config)
    }
    /// Returns the YAML representation of this [`AccumulatorConfig`].
    ///
    /// # Errors
    ///
    /// This function will return an error if the serialization failed.
    pub fn to_yaml_string(&self) -> AccumResult<String> {
        serde_yaml::to_string(self).map_err(|e| {
            AccumulatorError::Config(format!("serialization of configuration failed: {e}"))
        })
    }
    /// Returns the [`GridMode`] of this [`AccumulatorConfig`].
    #[must_use]
    pub const fn grid_mode(&self) -> &GridMode {
        &self.grid_mode
    }
    /// Sets the [`GridMode`] of this [`AccumulatorConfig`].
    pub fn set_grid_mode(&mut self, grid_mode: GridMode) {
        self.grid_mode = grid_mode;
    }
    /// Returns the [`EdgePolicy`] used when resampling.
    #[must_use]
    pub const fn edge_policy(&self) -> EdgePolicy {
        self.edge_policy
    }
    /// Returns the [`AutosaveConfig`], if any.
    #[must_use]
    pub const fn autosave(&self) -> Option<&AutosaveConfig> {
        self.autosave.as_ref()
    }
    /// Sets the [`AutosaveConfig`] of this [`AccumulatorConfig`].
    pub fn set_autosave(&mut self, autosave: Option<AutosaveConfig>) {
        self.autosave = autosave;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::grid::AxisDef;
    use assert_matches::assert_matches;
    use std::io::Write;
    use tempfile::NamedTempFile;
    #[test]
    fn default() {
        let config = AccumulatorConfig::default();
        assert_eq!(config.grid_mode(), &GridMode::Native);
        assert_eq!(config.edge_policy(), EdgePolicy::Extrapolate);
        assert!(config.autosave().is_none());
    }
    #[test]
    fn autosave_new() {
        let autosave = AutosaveConfig::new(Path::new("test.yaml"), 5).unwrap();
        assert_eq!(autosave.path(), Path::new("test.yaml"));
        assert_eq!(autosave.every(), 5);
        assert_matches!(
            AutosaveConfig::new(Path::new("test.yaml"), 0),
            Err(AccumulatorError::Config(_))
        );
    }
    #[test]
    fn autosave_is_due() {
        let autosave = AutosaveConfig::new(Path::new("test.yaml"), 3).unwrap();
        assert!(!autosave.is_due(0));
        assert!(!autosave.is_due(2));
        assert!(autosave.is_due(3));
        assert!(autosave.is_due(6));
    }
    #[test]
    fn from_yaml_str() {
        let config = AccumulatorConfig::from_yaml_str(
            "grid_mode: Native\nedge_policy: Clamp\nautosave:\n  path: out.yaml\n  every: 10\n",
        )
        .unwrap();
        assert_eq!(config.edge_policy(), EdgePolicy::Clamp);
        assert_eq!(
            config.autosave(),
            Some(&AutosaveConfig::new(Path::new("out.yaml"), 10).unwrap())
        );
    }
    #[test]
    fn from_yaml_str_defaults() {
        let config = AccumulatorConfig::from_yaml_str("edge_policy: Zero\n").unwrap();
        assert_eq!(config.grid_mode(), &GridMode::Native);
        assert_eq!(config.edge_policy(), EdgePolicy::Zero);
    }
    #[test]
    fn from_yaml_str_wrong() {
        assert_matches!(
            AccumulatorConfig::from_yaml_str("edge_policy: Sideways\n"),
            Err(AccumulatorError::Config(_))
        );
        assert_matches!(
            AccumulatorConfig::from_yaml_str("autosave:\n  path: out.yaml\n  every: 0\n"),
            Err(AccumulatorError::Config(_))
        );
        let empty_axis = "grid_mode: !Merged
  horizontal:
    start: 0.0
    end: 1.0
    points: 0
  vertical:
    start: 0.0
    end: 1.0
    points: 3
";
        assert_matches!(
            AccumulatorConfig::from_yaml_str(empty_axis),
            Err(AccumulatorError::Config(_))
        );
        let reversed_axis = "grid_mode: !Merged
  horizontal:
    start: 0.0
    end: 1.0
    points: 3
  vertical:
    start: 1.0
    end: 0.0
    points: 3
";
        assert_matches!(
            AccumulatorConfig::from_yaml_str(reversed_axis),
            Err(AccumulatorError::Config(_))
        );
    }
    #[test]
    fn from_yaml_str_merged() {
        let config = AccumulatorConfig::from_yaml_str(
            "grid_mode: !Merged
  horizontal:
    start: -0.001
    end: 0.001
    points: 101
  vertical:
    start: -0.0005
    end: 0.0005
    points: 51
edge_policy: Clamp
",
        )
        .unwrap();
        let grid = Grid::new(
            AxisDef::new(-0.001, 0.001, 101).unwrap(),
            AxisDef::new(-0.0005, 0.0005, 51).unwrap(),
        );
        assert_eq!(config.grid_mode(), &GridMode::Merged(grid));
        assert_eq!(config.edge_policy(), EdgePolicy::Clamp);
    }
    #[test]
    fn merged_grid_round_trip() {
        let grid = Grid::new(
            AxisDef::new(-1.0e-3, 1.0e-3, 101).unwrap(),
            AxisDef::new(-5.0e-4, 5.0e-4, 51).unwrap(),
        );
        let config = AccumulatorConfig::new(GridMode::Merged(grid), EdgePolicy::Zero, None);
        let serialized = config.to_yaml_string().unwrap();
        assert_eq!(AccumulatorConfig::from_yaml_str(&serialized).unwrap(), config);
    }
    #[test]
    fn from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "grid_mode: Native").unwrap();
        let config = AccumulatorConfig::from_file(file.path()).unwrap();
        assert_eq!(config, AccumulatorConfig::default());
        assert_matches!(
            AccumulatorConfig::from_file(Path::new("./invalid_file_path/config.yaml")),
            Err(AccumulatorError::Config(_))
        );
    }
    #[test]
    fn grid_mode_display() {
        assert_eq!(format!("{}", GridMode::Native), "native");
        let grid = Grid::new(
            AxisDef::new(0.0, 1.0, 2).unwrap(),
            AxisDef::new(0.0, 1.0, 2).unwrap(),
        );
        assert_eq!(
            format!("{}", GridMode::Merged(grid)),
            "merged (x: [0, 1] (2 pts), y: [0, 1] (2 pts))"
        );
    }
}
