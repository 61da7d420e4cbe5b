// src/lib.rs - Library interface for GLCM Haralick texture analysis

pub mod config;
pub mod errors;
pub mod font;
pub mod glcm;
pub mod haralick;
pub mod image_io;
pub mod image_utils;
pub mod output;
pub mod pipeline;
pub mod plot;

// Re-export commonly used types and functions
pub use errors::{HaralickError, Result};
pub use config::Config;
pub use pipeline::process_image;
pub use image_io::{InputImage, load_grayscale, load_image, save_image};

// Re-export the co-occurrence builder
pub use glcm::{CoOccurrenceMatrix, CoOccurrenceParams, OffsetAngle};

// Re-export the Haralick statistic reducers
pub use haralick::{
    TextureMetrics,
    asm,
    contrast,
    correlation,
    energy,
    homogeneity,
    mean,
    std_dev,
};

// Re-export the grayscale data model
pub use image_utils::GrayscaleImage;

// Re-export plotting helpers
pub use plot::{render_matrix, DEFAULT_TARGET_SIZE};
