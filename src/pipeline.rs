use std::path::Path;

use crate::config::Config;
use crate::errors::Result;
use crate::glcm::CoOccurrenceMatrix;
use crate::image_io::{save_image, InputImage};
use crate::image_utils::{resize_image, GrayscaleImage};
use crate::output::{write_metrics_csv, write_metrics_json};
use crate::plot::render_matrix;

/// Process a single image: build the co-occurrence matrix, reduce it to the
/// seven Haralick metrics, and write the configured outputs.
pub fn process_image(input_image: InputImage, config: &Config, debug: bool) -> Result<()> {
    let InputImage {
        image,
        path: _,
        filename,
    } = input_image;

    // Step 1: Resize if configured
    let processed_image = if let Some(dimensions) = config.resize_dimensions {
        resize_image(&image, dimensions)
    } else {
        image
    };

    // Step 2: Convert to the [0, 1] grayscale sample model
    let grayscale = GrayscaleImage::from_luma32f(&processed_image);

    // Step 3: Build the co-occurrence matrix
    let params = config.co_occurrence_params();
    println!(
        "Building {}x{} co-occurrence matrix (distance = {}, angle = {} deg) for {}...",
        params.n_levels, params.n_levels, params.distance, params.angle, filename
    );
    let matrix = CoOccurrenceMatrix::from_image(&grayscale, &params)?;

    // Step 4: Reduce to the Haralick metrics
    let metrics = matrix.metrics()?;

    if debug {
        println!("Haralick metrics for {}:", filename);
        println!("  ASM: {:.6}", metrics.asm);
        println!("  Energy: {:.6}", metrics.energy);
        println!("  Contrast: {:.6}", metrics.contrast);
        println!("  Correlation: {:.6}", metrics.correlation);
        println!("  Homogeneity: {:.6}", metrics.homogeneity);
        println!("  Mean: {:.6}", metrics.mean);
        println!("  Std Dev: {:.6}", metrics.std_dev);
    }

    // Step 5: Write metric outputs
    write_metrics_csv(&metrics, &params, &config.output_base_dir, &filename)?;

    if config.write_json {
        write_metrics_json(&metrics, &params, &config.output_base_dir, &filename)?;
    }

    // Step 6: Render and save the annotated heat-map
    if config.save_plots {
        let plot = render_matrix(&matrix, config.plot_target_size)?;
        let plot_path = Path::new(&config.output_base_dir)
            .join("plots")
            .join(format!("{}.png", filename));
        save_image(&plot, &plot_path)?;

        if debug {
            println!("Saved heat-map to {}", plot_path.display());
        }
    }

    Ok(())
}
