//! various helper functions used to simplify unit tests.
//!
//! **Note**: This module is only compiled and used during testing. Hence, there might be no
//! further documentation show up.

#[cfg(test)]
pub mod test_helper {
    use log::Level;
    use nalgebra::{DMatrix, DVector};

    use crate::frame::Frame;

    pub fn check_warnings(expected_warnings: Vec<&str>) {
        testing_logger::validate(|captured_logs| {
            let captured_logs: Vec<_> = captured_logs
                .iter()
                .filter(|l| l.level == Level::Warn)
                .collect();
            assert_eq!(captured_logs.len(), expected_warnings.len());
            for log in captured_logs.iter().zip(expected_warnings.clone()) {
                assert_eq!(log.0.body, log.1);
            }
        });
    }
    /// Frame with the given constant value on a unit spaced `rows` x `cols` grid starting at zero.
    pub fn constant_frame(rows: usize, cols: usize, value: f64) -> Frame {
        Frame::new(
            DMatrix::from_element(rows, cols, value),
            DVector::from_fn(cols, |i, _| i as f64),
            DVector::from_fn(rows, |i, _| i as f64),
        )
        .unwrap()
    }
    /// Frame on a unit spaced grid with the given intensity matrix.
    pub fn frame_from_matrix(intensity: DMatrix<f64>) -> Frame {
        let (rows, cols) = intensity.shape();
        Frame::new(
            intensity,
            DVector::from_fn(cols, |i, _| i as f64),
            DVector::from_fn(rows, |i, _| i as f64),
        )
        .unwrap()
    }
}
