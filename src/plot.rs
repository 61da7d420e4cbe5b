use bresenham::Bresenham;
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use crate::errors::Result;
use crate::font::{self, GLYPH_HEIGHT};
use crate::glcm::CoOccurrenceMatrix;
use crate::haralick::TextureMetrics;

/// Default rendered size of the heat-map in pixels (square)
pub const DEFAULT_TARGET_SIZE: u32 = 512;

const OVERLAY_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);
const BOX_FILL: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BOX_BORDER: Rgba<u8> = Rgba([0, 0, 0, 255]);
const TEXT_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Viridis-style gradient anchors, low probability to high
const COLOR_ANCHORS: [[u8; 3]; 5] = [
    [68, 1, 84],
    [59, 82, 139],
    [33, 145, 140],
    [94, 201, 98],
    [253, 231, 37],
];

/// Map a normalized value in [0, 1] onto the gradient
fn colormap(t: f64) -> Rgba<u8> {
    let t = t.clamp(0.0, 1.0);
    let scaled = t * (COLOR_ANCHORS.len() - 1) as f64;
    let idx = (scaled.floor() as usize).min(COLOR_ANCHORS.len() - 2);
    let frac = scaled - idx as f64;

    let lo = COLOR_ANCHORS[idx];
    let hi = COLOR_ANCHORS[idx + 1];
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;

    Rgba([lerp(lo[0], hi[0]), lerp(lo[1], hi[1]), lerp(lo[2], hi[2]), 255])
}

/// Render a co-occurrence matrix as an annotated heat-map.
///
/// Cells are scaled so the output is roughly `target_size` pixels square
/// (at least one pixel per cell). Two black segments overlay the map: one
/// along the diagonal spanning one standard deviation either side of the
/// mean, one across it spanning sqrt(contrast). An annotation box in the
/// top-right corner prints the mean, standard deviation and contrast.
///
/// Rendering is presentation only; the matrix is never mutated.
pub fn render_matrix(matrix: &CoOccurrenceMatrix, target_size: u32) -> Result<RgbaImage> {
    let table = matrix.data();
    let metrics = TextureMetrics::from_table(&table)?;

    let n = table.nrows() as u32;
    let scale = (target_size / n).max(1);
    let size = n * scale;

    let peak = table.iter().cloned().fold(0.0_f64, f64::max);

    let mut image = RgbaImage::new(size, size);
    for i in 0..table.nrows() {
        for j in 0..table.ncols() {
            let t = if peak > 0.0 { table[(i, j)] / peak } else { 0.0 };
            let color = colormap(t);

            // Row index i maps to y, column index j to x
            let x0 = j as u32 * scale;
            let y0 = i as u32 * scale;
            for dy in 0..scale {
                for dx in 0..scale {
                    image.put_pixel(x0 + dx, y0 + dy, color);
                }
            }
        }
    }

    let mu = metrics.mean;
    let sigma = metrics.std_dev;
    let spread = metrics.contrast.sqrt();

    // Diagonal segment one standard deviation either side of the mean
    draw_level_segment(&mut image, scale, (mu - sigma, mu - sigma), (mu + sigma, mu + sigma));
    // Anti-diagonal segment one sqrt(contrast) either side of the mean
    draw_level_segment(&mut image, scale, (mu - spread, mu + spread), (mu + spread, mu - spread));

    draw_annotation_box(&mut image, &metrics);

    Ok(image)
}

/// Map a (fractional) gray level to the pixel center of its cell
fn level_to_pixel(level: f64, scale: u32, size: u32) -> isize {
    let px = (level + 0.5) * scale as f64;
    px.round().clamp(0.0, (size - 1) as f64) as isize
}

/// Draw a straight segment between two gray-level coordinates (x, y)
fn draw_level_segment(image: &mut RgbaImage, scale: u32, from: (f64, f64), to: (f64, f64)) {
    let size = image.width();
    let start = (
        level_to_pixel(from.0, scale, size),
        level_to_pixel(from.1, scale, size),
    );
    let end = (
        level_to_pixel(to.0, scale, size),
        level_to_pixel(to.1, scale, size),
    );

    for (x, y) in Bresenham::new(start, end) {
        if x >= 0 && y >= 0 && (x as u32) < size && (y as u32) < size {
            image.put_pixel(x as u32, y as u32, OVERLAY_COLOR);
        }
    }
    // Bresenham stops one short of the end point
    image.put_pixel(end.0 as u32, end.1 as u32, OVERLAY_COLOR);
}

/// Draw the metric annotation box in the top-right corner
fn draw_annotation_box(image: &mut RgbaImage, metrics: &TextureMetrics) {
    let size = image.width();
    let ts = (size / 256).max(1);

    let lines = [
        format!("Mean = {:.3}", metrics.mean),
        format!("Std Dev = {:.3}", metrics.std_dev),
        format!("Contrast = {:.3}", metrics.contrast),
    ];

    let pad = 3 * ts;
    let margin = 4 * ts;
    let line_height = (GLYPH_HEIGHT + 2) * ts;
    let text_width = lines
        .iter()
        .map(|line| font::text_width(line, ts))
        .max()
        .unwrap_or(0);

    let box_width = text_width + 2 * pad;
    let box_height = lines.len() as u32 * line_height + 2 * pad;

    // Skip the annotation when the render is too small to hold it
    if box_width + margin >= size || box_height + margin >= size {
        return;
    }

    let box_x = size - box_width - margin;
    let box_y = margin;

    let rect = Rect::at(box_x as i32, box_y as i32).of_size(box_width, box_height);
    draw_filled_rect_mut(image, rect, BOX_FILL);
    draw_hollow_rect_mut(image, rect, BOX_BORDER);

    for (idx, line) in lines.iter().enumerate() {
        font::draw_text_bitmap(
            image,
            line,
            box_x + pad,
            box_y + pad + idx as u32 * line_height,
            ts,
            TEXT_COLOR,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    fn diagonal_matrix() -> CoOccurrenceMatrix {
        CoOccurrenceMatrix::from_table(DMatrix::from_row_slice(
            2,
            2,
            &[0.5, 0.0, 0.0, 0.5],
        ))
        .unwrap()
    }

    #[test]
    fn render_has_target_dimensions() {
        let image = render_matrix(&diagonal_matrix(), 64).unwrap();
        assert_eq!(image.dimensions(), (64, 64));
    }

    #[test]
    fn render_keeps_one_pixel_per_cell_minimum() {
        let image = render_matrix(&diagonal_matrix(), 1).unwrap();
        assert_eq!(image.dimensions(), (2, 2));
    }

    #[test]
    fn render_does_not_mutate_matrix() {
        let matrix = diagonal_matrix();
        let before = matrix.data();
        let _ = render_matrix(&matrix, 128).unwrap();
        assert_eq!(matrix.data(), before);
    }

    #[test]
    fn colormap_hits_gradient_endpoints() {
        assert_eq!(colormap(0.0), Rgba([68, 1, 84, 255]));
        assert_eq!(colormap(1.0), Rgba([253, 231, 37, 255]));
        assert_eq!(colormap(-0.5), colormap(0.0));
        assert_eq!(colormap(2.0), colormap(1.0));
    }
}
