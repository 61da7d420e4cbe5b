use std::fs;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};

use crate::errors::{HaralickError, Result};
use crate::image_utils::{GrayscaleImage, LumaF32Image};

/// File extensions accepted by the directory scanner
const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "tif", "tiff"];

/// Represents an input image with its metadata
pub struct InputImage {
    pub image: LumaF32Image,
    pub path: PathBuf,
    pub filename: String,
}

/// Get all image files from a directory (recursively)
pub fn get_image_files_in_dir<P: AsRef<Path>>(dir_path: P) -> Result<Vec<PathBuf>> {
    let dir_path = dir_path.as_ref();

    if !dir_path.exists() {
        return Err(HaralickError::InvalidPath(dir_path.to_path_buf()));
    }

    if !dir_path.is_dir() {
        return Err(HaralickError::Config(format!(
            "{} is not a directory",
            dir_path.display()
        )));
    }

    let mut image_files = Vec::new();
    find_image_files_recursive(dir_path, &mut image_files)?;

    Ok(image_files)
}

/// Helper function to recursively search for image files
fn find_image_files_recursive(dir_path: &Path, result: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir_path).map_err(HaralickError::Io)?;

    for entry in entries {
        let entry = entry.map_err(HaralickError::Io)?;
        let path = entry.path();

        if path.is_dir() {
            // Recursively search subdirectories
            find_image_files_recursive(&path, result)?;
        } else if path.is_file() {
            if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
                let ext = ext.to_ascii_lowercase();
                if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
                    result.push(path);
                }
            }
        }
    }

    Ok(())
}

/// Load an image and convert it to single-channel f32 luma in [0, 1]
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<InputImage> {
    let path = path.as_ref();

    // Get filename without extension
    let filename = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| HaralickError::InvalidPath(path.to_path_buf()))?
        .to_string();

    // Load the image
    let img = image::open(path).map_err(HaralickError::Image)?;

    // Convert to grayscale
    let luma_img = img.to_luma32f();

    Ok(InputImage {
        image: luma_img,
        path: path.to_path_buf(),
        filename,
    })
}

/// Load an image directly into the grayscale sample model
pub fn load_grayscale<P: AsRef<Path>>(path: P) -> Result<GrayscaleImage> {
    let input = load_image(path)?;
    Ok(GrayscaleImage::from_luma32f(&input.image))
}

/// Save an RGBA image to the specified path
pub fn save_image<P: AsRef<Path>>(image: &RgbaImage, path: P) -> Result<()> {
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(HaralickError::Image)?;

    Ok(())
}
