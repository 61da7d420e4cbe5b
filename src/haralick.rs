use nalgebra::DMatrix;
use serde::Serialize;

use crate::errors::{HaralickError, Result};

/// Maximum allowed |M[i,j] - M[j,i]| for a table to count as symmetric
pub const SYMMETRY_TOLERANCE: f64 = 1e-8;

/// Standard deviations below this are treated as a degenerate
/// single-level distribution when computing correlation
const SIGMA_FLOOR: f64 = 1e-15;

/// Check that a co-occurrence table is square and symmetric.
///
/// Every reducer entry point runs this first; the metrics below are only
/// meaningful on a symmetric joint distribution.
pub fn validate_table(table: &DMatrix<f64>) -> Result<()> {
    let (rows, cols) = table.shape();

    if rows != cols {
        return Err(HaralickError::Shape(format!(
            "table must be square, got {}x{}",
            rows, cols
        )));
    }

    if rows == 0 {
        return Err(HaralickError::Shape("table is empty".to_string()));
    }

    for i in 0..rows {
        for j in (i + 1)..cols {
            let diff = (table[(i, j)] - table[(j, i)]).abs();
            if diff > SYMMETRY_TOLERANCE {
                return Err(HaralickError::Shape(format!(
                    "table is asymmetric at ({}, {}): |{} - {}| = {:e}",
                    i,
                    j,
                    table[(i, j)],
                    table[(j, i)],
                    diff
                )));
            }
        }
    }

    Ok(())
}

/// Angular Second Moment: sum of squared probabilities
pub fn asm(table: &DMatrix<f64>) -> Result<f64> {
    validate_table(table)?;
    Ok(asm_unchecked(table))
}

/// Energy: square root of the ASM
pub fn energy(table: &DMatrix<f64>) -> Result<f64> {
    validate_table(table)?;
    Ok(asm_unchecked(table).sqrt())
}

/// Contrast: probabilities weighted by squared gray-level difference
pub fn contrast(table: &DMatrix<f64>) -> Result<f64> {
    validate_table(table)?;
    Ok(contrast_unchecked(table))
}

/// Homogeneity: inverse-difference weighting, complementary to contrast
pub fn homogeneity(table: &DMatrix<f64>) -> Result<f64> {
    validate_table(table)?;
    Ok(homogeneity_unchecked(table))
}

/// Gray-level mean over the row index.
///
/// The table is symmetric, so this equals the column-index mean.
pub fn mean(table: &DMatrix<f64>) -> Result<f64> {
    validate_table(table)?;
    Ok(mean_unchecked(table))
}

/// Gray-level standard deviation about the mean
pub fn std_dev(table: &DMatrix<f64>) -> Result<f64> {
    validate_table(table)?;
    Ok(std_dev_unchecked(table, mean_unchecked(table)))
}

/// Correlation of gray levels across the offset, in [-1, 1].
///
/// Defined as 0 for a degenerate single-level distribution (sigma == 0)
/// rather than NaN.
pub fn correlation(table: &DMatrix<f64>) -> Result<f64> {
    validate_table(table)?;
    Ok(correlation_unchecked(table))
}

fn asm_unchecked(table: &DMatrix<f64>) -> f64 {
    table.iter().map(|p| p * p).sum()
}

fn contrast_unchecked(table: &DMatrix<f64>) -> f64 {
    let mut value = 0.0;
    for i in 0..table.nrows() {
        for j in 0..table.ncols() {
            let diff = i as f64 - j as f64;
            value += table[(i, j)] * diff * diff;
        }
    }
    value
}

fn homogeneity_unchecked(table: &DMatrix<f64>) -> f64 {
    let mut value = 0.0;
    for i in 0..table.nrows() {
        for j in 0..table.ncols() {
            let diff = i as f64 - j as f64;
            value += table[(i, j)] / (1.0 + diff * diff);
        }
    }
    value
}

fn mean_unchecked(table: &DMatrix<f64>) -> f64 {
    let mut mu = 0.0;
    for i in 0..table.nrows() {
        for j in 0..table.ncols() {
            mu += i as f64 * table[(i, j)];
        }
    }
    mu
}

fn std_dev_unchecked(table: &DMatrix<f64>, mu: f64) -> f64 {
    let mut variance = 0.0;
    for i in 0..table.nrows() {
        for j in 0..table.ncols() {
            let dev = i as f64 - mu;
            variance += table[(i, j)] * dev * dev;
        }
    }
    variance.sqrt()
}

fn correlation_unchecked(table: &DMatrix<f64>) -> f64 {
    let mu = mean_unchecked(table);
    let sigma = std_dev_unchecked(table, mu);

    if sigma < SIGMA_FLOOR {
        return 0.0;
    }

    let mut value = 0.0;
    for i in 0..table.nrows() {
        for j in 0..table.ncols() {
            value += table[(i, j)] * (i as f64 - mu) * (j as f64 - mu);
        }
    }
    value / (sigma * sigma)
}

/// The seven Haralick texture metrics of one co-occurrence table.
///
/// Each field is an independent closed-form reduction over the same table;
/// nothing is cached across metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextureMetrics {
    pub asm: f64,
    pub energy: f64,
    pub contrast: f64,
    pub correlation: f64,
    pub homogeneity: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl TextureMetrics {
    /// Compute all seven metrics, validating the table once
    pub fn from_table(table: &DMatrix<f64>) -> Result<Self> {
        validate_table(table)?;

        let asm = asm_unchecked(table);
        let mu = mean_unchecked(table);

        Ok(Self {
            asm,
            energy: asm.sqrt(),
            contrast: contrast_unchecked(table),
            correlation: correlation_unchecked(table),
            homogeneity: homogeneity_unchecked(table),
            mean: mu,
            std_dev: std_dev_unchecked(table, mu),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    /// Probability mass split evenly across the two diagonal cells
    fn diagonal_table() -> DMatrix<f64> {
        DMatrix::from_row_slice(2, 2, &[0.5, 0.0, 0.0, 0.5])
    }

    /// Probability mass split evenly across the two off-diagonal cells
    fn antidiagonal_table() -> DMatrix<f64> {
        DMatrix::from_row_slice(2, 2, &[0.0, 0.5, 0.5, 0.0])
    }

    /// Everything in one cell: a uniform-value image
    fn single_entry_table() -> DMatrix<f64> {
        DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 0.0])
    }

    #[test]
    fn diagonal_metrics() {
        let table = diagonal_table();
        assert_approx_eq!(asm(&table).unwrap(), 0.5);
        assert_approx_eq!(energy(&table).unwrap(), 0.5f64.sqrt());
        assert_approx_eq!(contrast(&table).unwrap(), 0.0);
        assert_approx_eq!(homogeneity(&table).unwrap(), 1.0);
        assert_approx_eq!(mean(&table).unwrap(), 0.5);
        assert_approx_eq!(std_dev(&table).unwrap(), 0.5);
        assert_approx_eq!(correlation(&table).unwrap(), 1.0);
    }

    #[test]
    fn antidiagonal_metrics() {
        let table = antidiagonal_table();
        assert_approx_eq!(contrast(&table).unwrap(), 1.0);
        assert_approx_eq!(homogeneity(&table).unwrap(), 0.5);
        assert_approx_eq!(correlation(&table).unwrap(), -1.0);
    }

    #[test]
    fn single_entry_metrics_do_not_raise() {
        let table = single_entry_table();
        assert_approx_eq!(asm(&table).unwrap(), 1.0);
        assert_approx_eq!(energy(&table).unwrap(), 1.0);
        assert_approx_eq!(contrast(&table).unwrap(), 0.0);
        assert_approx_eq!(homogeneity(&table).unwrap(), 1.0);
        assert_approx_eq!(mean(&table).unwrap(), 0.0);
        assert_approx_eq!(std_dev(&table).unwrap(), 0.0);
    }

    #[test]
    fn degenerate_sigma_gives_zero_correlation() {
        // sigma == 0 must special-case to 0, never NaN
        let value = correlation(&single_entry_table()).unwrap();
        assert!(value == 0.0 && !value.is_nan());
    }

    #[test]
    fn energy_is_sqrt_of_asm() {
        let table = DMatrix::from_row_slice(
            3,
            3,
            &[0.2, 0.05, 0.0, 0.05, 0.3, 0.1, 0.0, 0.1, 0.2],
        );
        assert_approx_eq!(
            energy(&table).unwrap(),
            asm(&table).unwrap().sqrt(),
            1e-12
        );
    }

    #[test]
    fn correlation_stays_bounded() {
        let table = DMatrix::from_row_slice(
            3,
            3,
            &[0.2, 0.05, 0.0, 0.05, 0.3, 0.1, 0.0, 0.1, 0.2],
        );
        let value = correlation(&table).unwrap();
        assert!((-1.0..=1.0).contains(&value), "correlation = {}", value);
    }

    #[test]
    fn metrics_are_idempotent() {
        let table = DMatrix::from_row_slice(
            3,
            3,
            &[0.2, 0.05, 0.0, 0.05, 0.3, 0.1, 0.0, 0.1, 0.2],
        );
        // Bit-identical across repeated evaluation of the same table
        assert_eq!(contrast(&table).unwrap(), contrast(&table).unwrap());
        assert_eq!(correlation(&table).unwrap(), correlation(&table).unwrap());
        assert_eq!(
            TextureMetrics::from_table(&table).unwrap(),
            TextureMetrics::from_table(&table).unwrap()
        );
    }

    #[test]
    fn non_square_table_rejected() {
        let table = DMatrix::<f64>::zeros(2, 3);
        assert!(matches!(asm(&table), Err(HaralickError::Shape(_))));
    }

    #[test]
    fn asymmetric_table_rejected() {
        let mut table = DMatrix::<f64>::zeros(2, 2);
        table[(0, 1)] = 0.6;
        table[(1, 0)] = 0.4;
        assert!(matches!(mean(&table), Err(HaralickError::Shape(_))));
        assert!(matches!(
            TextureMetrics::from_table(&table),
            Err(HaralickError::Shape(_))
        ));
    }

    #[test]
    fn asymmetry_within_tolerance_accepted() {
        let mut table = DMatrix::from_row_slice(2, 2, &[0.5, 0.25, 0.25, 0.0]);
        table[(0, 1)] += SYMMETRY_TOLERANCE / 2.0;
        assert!(asm(&table).is_ok());
    }

    #[test]
    fn from_table_matches_individual_metrics() {
        let table = diagonal_table();
        let metrics = TextureMetrics::from_table(&table).unwrap();
        assert_eq!(metrics.asm, asm(&table).unwrap());
        assert_eq!(metrics.energy, energy(&table).unwrap());
        assert_eq!(metrics.contrast, contrast(&table).unwrap());
        assert_eq!(metrics.correlation, correlation(&table).unwrap());
        assert_eq!(metrics.homogeneity, homogeneity(&table).unwrap());
        assert_eq!(metrics.mean, mean(&table).unwrap());
        assert_eq!(metrics.std_dev, std_dev(&table).unwrap());
    }
}
