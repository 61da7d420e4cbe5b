use std::fmt;
use std::path::Path;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::errors::{HaralickError, Result};
use crate::haralick::{self, TextureMetrics};
use crate::image_io;
use crate::image_utils::{in_bounds, GrayscaleImage};

/// Offset directions supported by the co-occurrence builder.
///
/// Angles follow the usual GLCM convention: 0 looks right along the row,
/// 90 looks up, 45 and 135 along the two diagonals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OffsetAngle {
    #[serde(rename = "0")]
    Deg0,
    #[serde(rename = "45")]
    Deg45,
    #[serde(rename = "90")]
    Deg90,
    #[serde(rename = "135")]
    Deg135,
}

impl OffsetAngle {
    /// Angle in radians
    pub fn radians(self) -> f64 {
        match self {
            OffsetAngle::Deg0 => 0.0,
            OffsetAngle::Deg45 => std::f64::consts::FRAC_PI_4,
            OffsetAngle::Deg90 => std::f64::consts::FRAC_PI_2,
            OffsetAngle::Deg135 => 3.0 * std::f64::consts::FRAC_PI_4,
        }
    }

    /// Angle in degrees
    pub fn degrees(self) -> u32 {
        match self {
            OffsetAngle::Deg0 => 0,
            OffsetAngle::Deg45 => 45,
            OffsetAngle::Deg90 => 90,
            OffsetAngle::Deg135 => 135,
        }
    }

    /// (row, col) displacement of the offset neighbor at the given distance
    pub fn offset(self, distance: usize) -> (i64, i64) {
        let d = distance as i64;
        match self {
            OffsetAngle::Deg0 => (0, d),
            OffsetAngle::Deg45 => (-d, d),
            OffsetAngle::Deg90 => (-d, 0),
            OffsetAngle::Deg135 => (-d, -d),
        }
    }
}

impl fmt::Display for OffsetAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.degrees())
    }
}

/// Parameters for the co-occurrence matrix calculation
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CoOccurrenceParams {
    /// Number of quantization levels
    pub n_levels: usize,
    /// Pixel distance between the reference pixel and its neighbor
    pub distance: usize,
    /// Direction of the offset
    pub angle: OffsetAngle,
}

impl Default for CoOccurrenceParams {
    fn default() -> Self {
        Self {
            n_levels: 256,
            distance: 1,
            angle: OffsetAngle::Deg0,
        }
    }
}

impl CoOccurrenceParams {
    /// Validate parameter invariants
    pub fn validate(&self) -> Result<()> {
        if self.n_levels < 2 {
            return Err(HaralickError::InvalidParams(format!(
                "n_levels must be >= 2, got {}",
                self.n_levels
            )));
        }

        if self.distance < 1 {
            return Err(HaralickError::InvalidParams(
                "distance must be >= 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Quantize a [0, 1] sample to an integer gray level in [0, n_levels - 1]
#[inline]
fn quantize(value: f64, n_levels: usize) -> usize {
    let level = (value * (n_levels - 1) as f64).floor();
    (level.max(0.0) as usize).min(n_levels - 1)
}

/// A gray level co-occurrence matrix: a symmetric joint probability table
/// over pairs of quantized gray levels at a fixed pixel offset.
///
/// The table is immutable after construction. `data()` hands out a copy so
/// downstream consumers can never mutate the shared table.
#[derive(Debug, Clone, PartialEq)]
pub struct CoOccurrenceMatrix {
    data: DMatrix<f64>,
}

impl CoOccurrenceMatrix {
    /// Build a normalized symmetric co-occurrence matrix from a grayscale image.
    ///
    /// Each pixel is paired with its offset neighbor; both `(i, j)` and
    /// `(j, i)` are counted, so the table is symmetric by construction.
    /// Pixels whose neighbor falls outside the image contribute nothing.
    pub fn from_image(image: &GrayscaleImage, params: &CoOccurrenceParams) -> Result<Self> {
        params.validate()?;

        let n = params.n_levels;
        let (height, width) = (image.height(), image.width());
        let (d_row, d_col) = params.angle.offset(params.distance);

        // Quantize once up front; the scan below only touches levels
        let levels: Vec<usize> = (0..height)
            .flat_map(|row| (0..width).map(move |col| (row, col)))
            .map(|(row, col)| quantize(image.get(row, col), n))
            .collect();

        let mut data = DMatrix::<f64>::zeros(n, n);
        let mut total = 0.0;

        for row in 0..height {
            for col in 0..width {
                let neighbor_row = row as i64 + d_row;
                let neighbor_col = col as i64 + d_col;

                if !in_bounds(neighbor_row, neighbor_col, height, width) {
                    continue;
                }

                let i = levels[row * width + col];
                let j = levels[neighbor_row as usize * width + neighbor_col as usize];

                data[(i, j)] += 1.0;
                data[(j, i)] += 1.0;
                total += 2.0;
            }
        }

        if total <= 0.0 {
            return Err(HaralickError::EmptyMatrix);
        }

        data /= total;

        Ok(Self { data })
    }

    /// Build a co-occurrence matrix straight from an image file
    pub fn from_file<P: AsRef<Path>>(path: P, params: &CoOccurrenceParams) -> Result<Self> {
        let image = image_io::load_grayscale(path)?;
        Self::from_image(&image, params)
    }

    /// Wrap an existing probability table, enforcing the square/symmetric invariants
    pub fn from_table(data: DMatrix<f64>) -> Result<Self> {
        haralick::validate_table(&data)?;
        Ok(Self { data })
    }

    /// Obtain a defensive copy of the probability table
    pub fn data(&self) -> DMatrix<f64> {
        self.data.clone()
    }

    /// Number of gray levels (table side length)
    pub fn n_levels(&self) -> usize {
        self.data.nrows()
    }

    /// Compute all seven Haralick metrics from the table
    pub fn metrics(&self) -> Result<TextureMetrics> {
        TextureMetrics::from_table(&self.data)
    }

    /// Angular Second Moment of the table
    pub fn haralick_asm(&self) -> Result<f64> {
        haralick::asm(&self.data)
    }

    /// Energy of the table
    pub fn haralick_energy(&self) -> Result<f64> {
        haralick::energy(&self.data)
    }

    /// Contrast of the table
    pub fn haralick_contrast(&self) -> Result<f64> {
        haralick::contrast(&self.data)
    }

    /// Correlation of the table
    pub fn haralick_correlation(&self) -> Result<f64> {
        haralick::correlation(&self.data)
    }

    /// Homogeneity of the table
    pub fn haralick_homogeneity(&self) -> Result<f64> {
        haralick::homogeneity(&self.data)
    }

    /// Gray-level mean of the table
    pub fn haralick_mean(&self) -> Result<f64> {
        haralick::mean(&self.data)
    }

    /// Gray-level standard deviation of the table
    pub fn haralick_std(&self) -> Result<f64> {
        haralick::std_dev(&self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn checkerboard() -> GrayscaleImage {
        GrayscaleImage::new(
            4,
            2,
            vec![1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0],
        )
        .unwrap()
    }

    #[test]
    fn checkerboard_distance_two() {
        // The pattern repeats every 2 columns, so every horizontal pair at
        // distance 2 preserves its gray level.
        let params = CoOccurrenceParams {
            n_levels: 2,
            distance: 2,
            angle: OffsetAngle::Deg0,
        };
        let matrix = CoOccurrenceMatrix::from_image(&checkerboard(), &params).unwrap();

        let data = matrix.data();
        assert_approx_eq!(data[(0, 0)], 0.5);
        assert_approx_eq!(data[(1, 1)], 0.5);
        assert_approx_eq!(data[(0, 1)], 0.0);
        assert_approx_eq!(data[(1, 0)], 0.0);
    }

    #[test]
    fn checkerboard_distance_one_alternates() {
        let params = CoOccurrenceParams {
            n_levels: 2,
            distance: 1,
            angle: OffsetAngle::Deg0,
        };
        let matrix = CoOccurrenceMatrix::from_image(&checkerboard(), &params).unwrap();

        // Every horizontal neighbor pair flips gray level
        let data = matrix.data();
        assert_approx_eq!(data[(0, 1)], 0.5);
        assert_approx_eq!(data[(1, 0)], 0.5);
        assert_approx_eq!(data[(0, 0)], 0.0);
        assert_approx_eq!(data[(1, 1)], 0.0);
    }

    #[test]
    fn matrix_is_symmetric_and_normalized() {
        let image = GrayscaleImage::new(
            3,
            3,
            vec![0.0, 0.2, 0.4, 0.35, 0.6, 0.8, 0.1, 0.9, 1.0],
        )
        .unwrap();
        let params = CoOccurrenceParams {
            n_levels: 8,
            distance: 1,
            angle: OffsetAngle::Deg45,
        };
        let matrix = CoOccurrenceMatrix::from_image(&image, &params).unwrap();
        let data = matrix.data();

        for i in 0..8 {
            for j in 0..8 {
                assert_approx_eq!(data[(i, j)], data[(j, i)], 1e-12);
                assert!(data[(i, j)] >= 0.0);
            }
        }
        assert_approx_eq!(data.sum(), 1.0, 1e-12);
    }

    #[test]
    fn angle_offsets() {
        assert_eq!(OffsetAngle::Deg0.offset(3), (0, 3));
        assert_eq!(OffsetAngle::Deg45.offset(3), (-3, 3));
        assert_eq!(OffsetAngle::Deg90.offset(3), (-3, 0));
        assert_eq!(OffsetAngle::Deg135.offset(3), (-3, -3));
    }

    #[test]
    fn vertical_offset_pairs_rows() {
        // Two identical rows: every vertical pair preserves its level
        let image =
            GrayscaleImage::new(2, 2, vec![0.0, 1.0, 0.0, 1.0]).unwrap();
        let params = CoOccurrenceParams {
            n_levels: 2,
            distance: 1,
            angle: OffsetAngle::Deg90,
        };
        let matrix = CoOccurrenceMatrix::from_image(&image, &params).unwrap();

        let data = matrix.data();
        assert_approx_eq!(data[(0, 0)], 0.5);
        assert_approx_eq!(data[(1, 1)], 0.5);
    }

    #[test]
    fn quantize_clamps_to_level_range() {
        assert_eq!(quantize(0.0, 4), 0);
        assert_eq!(quantize(1.0, 4), 3);
        assert_eq!(quantize(0.5, 2), 0);
        assert_eq!(quantize(0.999, 256), 254);
    }

    #[test]
    fn image_narrower_than_distance_is_empty() {
        let image = GrayscaleImage::new(2, 2, vec![0.1, 0.2, 0.3, 0.4]).unwrap();
        let params = CoOccurrenceParams {
            n_levels: 4,
            distance: 2,
            angle: OffsetAngle::Deg0,
        };
        let result = CoOccurrenceMatrix::from_image(&image, &params);
        assert!(matches!(result, Err(HaralickError::EmptyMatrix)));
    }

    #[test]
    fn single_pixel_image_is_empty() {
        let image = GrayscaleImage::new(1, 1, vec![0.5]).unwrap();
        let result =
            CoOccurrenceMatrix::from_image(&image, &CoOccurrenceParams::default());
        assert!(matches!(result, Err(HaralickError::EmptyMatrix)));
    }

    #[test]
    fn invalid_params_rejected() {
        let image = checkerboard();
        let too_few_levels = CoOccurrenceParams {
            n_levels: 1,
            distance: 1,
            angle: OffsetAngle::Deg0,
        };
        assert!(matches!(
            CoOccurrenceMatrix::from_image(&image, &too_few_levels),
            Err(HaralickError::InvalidParams(_))
        ));

        let zero_distance = CoOccurrenceParams {
            n_levels: 2,
            distance: 0,
            angle: OffsetAngle::Deg0,
        };
        assert!(matches!(
            CoOccurrenceMatrix::from_image(&image, &zero_distance),
            Err(HaralickError::InvalidParams(_))
        ));
    }

    #[test]
    fn data_returns_defensive_copy() {
        let params = CoOccurrenceParams {
            n_levels: 2,
            distance: 2,
            angle: OffsetAngle::Deg0,
        };
        let matrix = CoOccurrenceMatrix::from_image(&checkerboard(), &params).unwrap();

        let mut copy = matrix.data();
        copy[(0, 0)] = 42.0;

        assert_approx_eq!(matrix.data()[(0, 0)], 0.5);
    }

    #[test]
    fn from_table_rejects_asymmetric() {
        let mut table = DMatrix::<f64>::zeros(3, 3);
        table[(0, 1)] = 0.7;
        table[(1, 0)] = 0.3;
        assert!(matches!(
            CoOccurrenceMatrix::from_table(table),
            Err(HaralickError::Shape(_))
        ));
    }

    #[test]
    fn angle_radians_match_degrees() {
        assert_approx_eq!(OffsetAngle::Deg0.radians(), 0.0);
        assert_approx_eq!(OffsetAngle::Deg45.radians(), std::f64::consts::FRAC_PI_4);
        assert_approx_eq!(OffsetAngle::Deg90.radians(), std::f64::consts::FRAC_PI_2);
        assert_approx_eq!(
            OffsetAngle::Deg135.radians(),
            3.0 * std::f64::consts::FRAC_PI_4
        );
    }
}
