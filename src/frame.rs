#![warn(missing_docs)]
//! Single intensity frame of a wavefront calculation.
//!
//! A [`Frame`] is produced by each source or propagation run and stays immutable afterwards. The
//! intensity matrix follows the `nalgebra` convention used throughout this crate: rows correspond to
//! the vertical (y) axis, columns to the horizontal (x) axis.
use crate::{
    error::{AccumResult, AccumulatorError},
    grid::{AxisDef, Grid},
    utils::griddata::is_strictly_increasing,
};
use csv::{ReaderBuilder, WriterBuilder};
use nalgebra::{DMatrix, DVector};
use std::path::Path;

/// Delimiter of the frame csv files.
const CSV_DELIMITER: u8 = b';';

/// A 2D intensity distribution together with its horizontal and vertical axis.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    intensity: DMatrix<f64>,
    x_axis: DVector<f64>,
    y_axis: DVector<f64>,
}
impl Frame {
    /// Creates a new [`Frame`].
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - the intensity matrix is empty.
    ///   - the axis lengths do not match the number of columns (x) or rows (y).
    ///   - the axes are not finite and strictly increasing.
    ///   - the intensity contains non-finite values.
    pub fn new(
        intensity: DMatrix<f64>,
        x_axis: DVector<f64>,
        y_axis: DVector<f64>,
    ) -> AccumResult<Self> {
        let (rows, cols) = intensity.shape();
        if rows == 0 || cols == 0 {
            return Err(AccumulatorError::Frame("intensity matrix is empty".into()));
        }
        if x_axis.len() != cols {
            return Err(AccumulatorError::Frame(format!(
                "x axis has {} points but intensity has {cols} columns",
                x_axis.len()
            )));
        }
        if y_axis.len() != rows {
            return Err(AccumulatorError::Frame(format!(
                "y axis has {} points but intensity has {rows} rows",
                y_axis.len()
            )));
        }
        if !is_strictly_increasing(x_axis.as_slice()) || !is_strictly_increasing(y_axis.as_slice())
        {
            return Err(AccumulatorError::Frame(
                "axes must be finite and strictly increasing".into(),
            ));
        }
        if intensity.iter().any(|v| !v.is_finite()) {
            return Err(AccumulatorError::Frame(
                "intensity contains non-finite values".into(),
            ));
        }
        Ok(Self {
            intensity,
            x_axis,
            y_axis,
        })
    }
    /// Creates a new [`Frame`] with the axes given by a [`Grid`].
    ///
    /// # Errors
    ///
    /// This function will return an error if the grid coordinates cannot be generated or the
    /// shape of the intensity does not match the grid.
    pub fn from_grid(intensity: DMatrix<f64>, grid: &Grid) -> AccumResult<Self> {
        Self::new(
            intensity,
            grid.horizontal().coordinates()?,
            grid.vertical().coordinates()?,
        )
    }
    /// Returns the intensity distribution of this [`Frame`].
    #[must_use]
    pub const fn intensity(&self) -> &DMatrix<f64> {
        &self.intensity
    }
    /// Returns the horizontal (x) coordinates of this [`Frame`].
    #[must_use]
    pub const fn x_axis(&self) -> &DVector<f64> {
        &self.x_axis
    }
    /// Returns the vertical (y) coordinates of this [`Frame`].
    #[must_use]
    pub const fn y_axis(&self) -> &DVector<f64> {
        &self.y_axis
    }
    /// Returns the shape of the intensity distribution in pixels
    ///
    /// The order of the returned tuple is `(rows, columns)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        self.intensity.shape()
    }
    /// Returns the [`Grid`] spanned by the axes of this [`Frame`].
    ///
    /// # Errors
    ///
    /// This function will return an error if an axis could not be converted.
    pub fn grid(&self) -> AccumResult<Grid> {
        Ok(Grid::new(
            AxisDef::from_coordinates(&self.x_axis)?,
            AxisDef::from_coordinates(&self.y_axis)?,
        ))
    }
    /// Returns the horizontal marginal histogram (sum over all rows, one entry per column).
    #[must_use]
    pub fn horizontal_profile(&self) -> DVector<f64> {
        self.intensity.row_sum().transpose()
    }
    /// Returns the vertical marginal histogram (sum over all columns, one entry per row).
    #[must_use]
    pub fn vertical_profile(&self) -> DVector<f64> {
        self.intensity.column_sum()
    }
    /// Returns `true` if both axes of `self` and `other` have the same length and coincide within
    /// the given absolute tolerance.
    #[must_use]
    pub fn same_axes(&self, other: &Self, tolerance: f64) -> bool {
        let close = |a: &DVector<f64>, b: &DVector<f64>| {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(u, v)| (u - v).abs() <= tolerance)
        };
        close(&self.x_axis, &other.x_axis) && close(&self.y_axis, &other.y_axis)
    }
    pub(crate) fn intensity_mut(&mut self) -> &mut DMatrix<f64> {
        &mut self.intensity
    }
    /// Reads a [`Frame`] from a `;`-separated csv file.
    ///
    /// The first record contains a label cell followed by the x coordinates. Every following
    /// record starts with the y coordinate of the row followed by the intensity values of that row.
    ///
    /// # Errors
    ///
    /// This function will return an error if the file cannot be read, a value cannot be parsed, the
    /// rows have different lengths or the resulting frame is invalid.
    pub fn from_csv(path: &Path) -> AccumResult<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .delimiter(CSV_DELIMITER)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| {
                AccumulatorError::Frame(format!("cannot read file {} : {}", path.display(), e))
            })?;
        let mut records = reader.records();
        let header = records
            .next()
            .ok_or_else(|| AccumulatorError::Frame("no csv data was found in file".into()))?
            .map_err(|e| AccumulatorError::Frame(e.to_string()))?;
        let x_axis = header
            .iter()
            .skip(1)
            .map(parse_value)
            .collect::<AccumResult<Vec<f64>>>()?;
        let mut y_axis = Vec::new();
        let mut values = Vec::new();
        for record in records {
            let record = record.map_err(|e| AccumulatorError::Frame(e.to_string()))?;
            if record.len() != x_axis.len() + 1 {
                return Err(AccumulatorError::Frame(format!(
                    "row {} has {} values but {} x coordinates were given",
                    y_axis.len(),
                    record.len().saturating_sub(1),
                    x_axis.len()
                )));
            }
            let mut fields = record.iter();
            if let Some(y) = fields.next() {
                y_axis.push(parse_value(y)?);
            }
            for field in fields {
                values.push(parse_value(field)?);
            }
        }
        if y_axis.is_empty() {
            return Err(AccumulatorError::Frame(
                "no intensity rows were found in file".into(),
            ));
        }
        let intensity = DMatrix::from_row_slice(y_axis.len(), x_axis.len(), &values);
        Self::new(
            intensity,
            DVector::from_vec(x_axis),
            DVector::from_vec(y_axis),
        )
    }
    /// Writes this [`Frame`] to a `;`-separated csv file in the format read by [`Frame::from_csv`].
    ///
    /// # Errors
    ///
    /// This function will return an error if the file cannot be created or written.
    pub fn to_csv(&self, path: &Path) -> AccumResult<()> {
        let mut writer = WriterBuilder::new()
            .delimiter(CSV_DELIMITER)
            .from_path(path)
            .map_err(|e| {
                AccumulatorError::Frame(format!(
                    "could not create file path: {}: {}",
                    path.display(),
                    e
                ))
            })?;
        let write_err = |e: csv::Error| {
            AccumulatorError::Frame(format!("writing to file path {} failed: {}", path.display(), e))
        };
        let header = std::iter::once("y\\x".to_string())
            .chain(self.x_axis.iter().map(ToString::to_string));
        writer.write_record(header).map_err(write_err)?;
        for (y, row) in self.y_axis.iter().zip(self.intensity.row_iter()) {
            let record =
                std::iter::once(y.to_string()).chain(row.iter().map(ToString::to_string));
            writer.write_record(record).map_err(write_err)?;
        }
        writer.flush().map_err(|e| {
            AccumulatorError::Frame(format!("flushing file {} failed: {}", path.display(), e))
        })?;
        Ok(())
    }
}

fn parse_value(field: &str) -> AccumResult<f64> {
    field
        .parse::<f64>()
        .map_err(|e| AccumulatorError::Frame(format!("cannot parse value '{field}': {e}")))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utils::test_helper::test_helper::frame_from_matrix;
    use assert_matches::assert_matches;
    use nalgebra::{dmatrix, dvector};
    use std::io::Write;
    use tempfile::NamedTempFile;
    #[test]
    fn new() {
        let frame = Frame::new(
            dmatrix![1.0, 2.0, 3.0; 4.0, 5.0, 6.0],
            dvector![-1.0, 0.0, 1.0],
            dvector![0.0, 0.5],
        )
        .unwrap();
        assert_eq!(frame.shape(), (2, 3));
        assert_eq!(frame.x_axis(), &dvector![-1.0, 0.0, 1.0]);
        assert_eq!(frame.y_axis(), &dvector![0.0, 0.5]);
        assert_eq!(frame.intensity()[(1, 2)], 6.0);
    }
    #[test]
    fn new_wrong_axes() {
        assert_matches!(
            Frame::new(dmatrix![1.0, 2.0], dvector![0.0], dvector![0.0]),
            Err(AccumulatorError::Frame(_))
        );
        assert_matches!(
            Frame::new(dmatrix![1.0, 2.0], dvector![0.0, 1.0], dvector![0.0, 1.0]),
            Err(AccumulatorError::Frame(_))
        );
        assert_matches!(
            Frame::new(dmatrix![1.0, 2.0], dvector![1.0, 0.0], dvector![0.0]),
            Err(AccumulatorError::Frame(_))
        );
        assert_matches!(
            Frame::new(DMatrix::zeros(0, 0), DVector::zeros(0), DVector::zeros(0)),
            Err(AccumulatorError::Frame(_))
        );
    }
    #[test]
    fn new_non_finite_intensity() {
        assert_matches!(
            Frame::new(dmatrix![1.0, f64::NAN], dvector![0.0, 1.0], dvector![0.0]),
            Err(AccumulatorError::Frame(_))
        );
    }
    #[test]
    fn from_grid() {
        let grid = Grid::new(
            AxisDef::new(0.0, 2.0, 3).unwrap(),
            AxisDef::new(-1.0, 1.0, 2).unwrap(),
        );
        let frame = Frame::from_grid(DMatrix::from_element(2, 3, 1.0), &grid).unwrap();
        assert_eq!(frame.x_axis(), &dvector![0.0, 1.0, 2.0]);
        assert_eq!(frame.y_axis(), &dvector![-1.0, 1.0]);
        assert_eq!(frame.grid().unwrap(), grid);
        assert!(Frame::from_grid(DMatrix::from_element(3, 3, 1.0), &grid).is_err());
    }
    #[test]
    fn profiles() {
        let frame = frame_from_matrix(dmatrix![1.0, 2.0, 3.0; 4.0, 5.0, 6.0]);
        assert_eq!(frame.horizontal_profile(), dvector![5.0, 7.0, 9.0]);
        assert_eq!(frame.vertical_profile(), dvector![6.0, 15.0]);
    }
    #[test]
    fn same_axes() {
        let a = frame_from_matrix(dmatrix![1.0, 2.0; 3.0, 4.0]);
        let b = Frame::new(
            dmatrix![1.0, 2.0; 3.0, 4.0],
            dvector![0.0, 1.0 + 1e-12],
            dvector![0.0, 1.0],
        )
        .unwrap();
        let c = Frame::new(
            dmatrix![1.0, 2.0; 3.0, 4.0],
            dvector![0.0, 2.0],
            dvector![0.0, 1.0],
        )
        .unwrap();
        assert!(a.same_axes(&b, 1e-9));
        assert!(!a.same_axes(&c, 1e-9));
    }
    #[test]
    fn from_csv() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "y\\x; -1.0; 0.0; 1.0").unwrap();
        writeln!(file, "0.0; 1; 2; 3").unwrap();
        writeln!(file, "2.0; 4; 5; 6").unwrap();
        let frame = Frame::from_csv(file.path()).unwrap();
        assert_eq!(frame.intensity(), &dmatrix![1.0, 2.0, 3.0; 4.0, 5.0, 6.0]);
        assert_eq!(frame.x_axis(), &dvector![-1.0, 0.0, 1.0]);
        assert_eq!(frame.y_axis(), &dvector![0.0, 2.0]);
    }
    #[test]
    fn from_csv_wrong() {
        assert_matches!(
            Frame::from_csv(Path::new("./invalid_file_path/frame.csv")),
            Err(AccumulatorError::Frame(_))
        );
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "y\\x;0.0;1.0").unwrap();
        writeln!(file, "0.0;1;a").unwrap();
        assert_matches!(Frame::from_csv(file.path()), Err(AccumulatorError::Frame(_)));
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "y\\x;0.0;1.0").unwrap();
        assert_matches!(Frame::from_csv(file.path()), Err(AccumulatorError::Frame(_)));
        let empty = NamedTempFile::new().unwrap();
        assert_matches!(Frame::from_csv(empty.path()), Err(AccumulatorError::Frame(_)));
    }
    #[test]
    fn from_csv_ragged() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "y\\x;0.0;1.0").unwrap();
        writeln!(file, "0.0;1;2").unwrap();
        writeln!(file, "1.0;1").unwrap();
        assert_matches!(Frame::from_csv(file.path()), Err(AccumulatorError::Frame(_)));
    }
    #[test]
    fn to_csv() {
        let frame = Frame::new(
            dmatrix![1.5, 2.0; 3.0, 4.25],
            dvector![-0.5, 0.5],
            dvector![1.0, 2.0],
        )
        .unwrap();
        let file = NamedTempFile::new().unwrap();
        frame.to_csv(file.path()).unwrap();
        let content = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(content, "y\\x;-0.5;0.5\n1;1.5;2\n2;3;4.25\n");
        assert_eq!(Frame::from_csv(file.path()).unwrap(), frame);
    }
}
