mod config;
mod errors;
mod font;
mod glcm;
mod haralick;
mod image_io;
mod image_utils;
mod output;
mod pipeline;
mod plot;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use rayon::prelude::*;

use config::Config;
use errors::HaralickError;
use glcm::OffsetAngle;
use image_io::{get_image_files_in_dir, load_image};
use pipeline::process_image;

/// Command-line arguments
#[derive(Parser, Debug)]
#[clap(author, version, about = "GLCM Haralick - Grayscale Texture Analysis")]
struct Args {
    /// Path to input file or directory
    #[clap(short, long)]
    input: Option<String>,

    /// Path to output directory
    #[clap(short, long)]
    output: Option<String>,

    /// Path to configuration file
    #[clap(short, long, default_value = "config.toml")]
    config: String,

    /// Number of gray levels (overwrites config)
    #[clap(short = 'l', long)]
    levels: Option<usize>,

    /// Offset distance in pixels (overwrites config)
    #[clap(short = 'd', long)]
    distance: Option<usize>,

    /// Offset angle in degrees (overwrites config)
    #[clap(short = 'a', long)]
    angle: Option<AngleArg>,

    /// Skip heat-map rendering
    #[clap(long)]
    no_plots: bool,

    /// Enable debug mode (print per-metric detail)
    #[clap(long)]
    debug: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AngleArg {
    #[value(name = "0")]
    Deg0,
    #[value(name = "45")]
    Deg45,
    #[value(name = "90")]
    Deg90,
    #[value(name = "135")]
    Deg135,
}

/// Main function
fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    // Load configuration
    let mut config = Config::from_file(&args.config)
        .with_context(|| format!("loading configuration from {}", args.config))?;

    // Override config with command-line arguments
    if let Some(input) = args.input.clone() {
        config.input_path = input;
    }

    if let Some(output) = args.output.clone() {
        config.output_base_dir = output;
    }

    if let Some(levels) = args.levels {
        config.n_levels = levels;
    }

    if let Some(distance) = args.distance {
        config.distance = distance;
    }

    if let Some(angle) = args.angle {
        config.angle = match angle {
            AngleArg::Deg0 => OffsetAngle::Deg0,
            AngleArg::Deg45 => OffsetAngle::Deg45,
            AngleArg::Deg90 => OffsetAngle::Deg90,
            AngleArg::Deg135 => OffsetAngle::Deg135,
        };
    }

    if args.no_plots {
        config.save_plots = false;
    }

    // Validate configuration
    config.validate()?;

    // Start timing
    let start_time = Instant::now();

    // Process input
    let input_path = PathBuf::from(&config.input_path);

    if input_path.is_file() {
        // Process single file
        println!("Processing single file: {}", input_path.display());
        let input_image = load_image(&input_path)?;
        process_image(input_image, &config, args.debug)?;
    } else if input_path.is_dir() {
        // Process all image files in directory
        println!("Processing directory: {}", input_path.display());
        let image_files = get_image_files_in_dir(&input_path)?;

        println!("Found {} image files", image_files.len());

        if config.use_parallel {
            // Process files in parallel
            let results: Vec<_> = image_files
                .par_iter()
                .map(|path| {
                    println!("Processing: {}", path.display());
                    match load_image(path) {
                        Ok(input_image) => process_image(input_image, &config, args.debug),
                        Err(e) => {
                            eprintln!("Error loading {}: {}", path.display(), e);
                            Err(e)
                        }
                    }
                })
                .collect();

            let failures = results.iter().filter(|r| r.is_err()).count();
            if failures > 0 {
                eprintln!("{} of {} files failed", failures, results.len());
            }
        } else {
            // Process files sequentially
            for path in &image_files {
                println!("Processing: {}", path.display());
                let input_image = load_image(path)?;
                process_image(input_image, &config, args.debug)?;
            }
        }
    } else {
        return Err(HaralickError::InvalidPath(input_path).into());
    }

    // Report elapsed time
    let elapsed = start_time.elapsed();
    println!("Processing completed in {:.2} seconds", elapsed.as_secs_f64());

    Ok(())
}
