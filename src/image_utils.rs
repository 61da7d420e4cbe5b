use image::imageops;
use image::{ImageBuffer, Luma};

use crate::errors::{HaralickError, Result};

/// Single-channel f32 buffer as produced by `DynamicImage::to_luma32f`
pub type LumaF32Image = ImageBuffer<Luma<f32>, Vec<f32>>;

/// A 2D grayscale intensity array with samples in [0, 1].
///
/// This is the read-only input of the co-occurrence builder. Samples are
/// stored row-major; `get(row, col)` addresses them the way the matrix
/// indices do.
#[derive(Debug, Clone, PartialEq)]
pub struct GrayscaleImage {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl GrayscaleImage {
    /// Create an image from row-major samples
    pub fn new(width: usize, height: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != width * height {
            return Err(HaralickError::InvalidParams(format!(
                "sample buffer has {} values, expected {} ({}x{})",
                data.len(),
                width * height,
                width,
                height
            )));
        }

        Ok(Self { width, height, data })
    }

    /// Convert a decoded luma buffer, clamping samples into [0, 1]
    pub fn from_luma32f(image: &LumaF32Image) -> Self {
        let (width, height) = image.dimensions();
        let data = image
            .pixels()
            .map(|p| f64::from(p[0]).clamp(0.0, 1.0))
            .collect();

        Self {
            width: width as usize,
            height: height as usize,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Sample at (row, col); callers must stay in bounds
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.width + col]
    }
}

/// Resize a luma buffer to the specified dimensions
pub fn resize_image(image: &LumaF32Image, dimensions: [u32; 2]) -> LumaF32Image {
    let (width, height) = (dimensions[0], dimensions[1]);
    imageops::resize(image, width, height, imageops::FilterType::Triangle)
}

/// Check if a point is inside the image bounds
#[inline]
pub fn in_bounds(row: i64, col: i64, height: usize, width: usize) -> bool {
    row >= 0 && col >= 0 && (row as usize) < height && (col as usize) < width
}
