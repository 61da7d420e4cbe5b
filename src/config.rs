use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{HaralickError, Result};
use crate::glcm::{CoOccurrenceParams, OffsetAngle};
use crate::plot::DEFAULT_TARGET_SIZE;

/// Configuration for GLCM Haralick analysis
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub input_path: String,
    pub output_base_dir: String,

    /// Number of gray levels used for quantization
    #[serde(default = "default_n_levels")]
    pub n_levels: usize,

    /// Pixel offset distance between co-occurring pairs
    #[serde(default = "default_distance")]
    pub distance: usize,

    /// Offset direction, one of "0", "45", "90", "135" (degrees)
    #[serde(default = "default_angle")]
    pub angle: OffsetAngle,

    /// Optional [width, height] to resize inputs to before analysis
    pub resize_dimensions: Option<[u32; 2]>,

    #[serde(default = "default_parallel")]
    pub use_parallel: bool,

    /// Render a heat-map PNG per input
    #[serde(default = "default_save_plots")]
    pub save_plots: bool,

    /// Also emit metrics as JSON next to the CSV
    #[serde(default = "default_write_json")]
    pub write_json: bool,

    /// Approximate pixel size of the rendered heat-map
    #[serde(default = "default_plot_target_size")]
    pub plot_target_size: u32,
}

fn default_n_levels() -> usize {
    256
}

fn default_distance() -> usize {
    1
}

fn default_angle() -> OffsetAngle {
    OffsetAngle::Deg0
}

fn default_parallel() -> bool {
    true
}

fn default_save_plots() -> bool {
    true
}

fn default_write_json() -> bool {
    false
}

fn default_plot_target_size() -> u32 {
    DEFAULT_TARGET_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: "./input".to_string(),
            output_base_dir: "./output".to_string(),
            n_levels: default_n_levels(),
            distance: default_distance(),
            angle: default_angle(),
            resize_dimensions: None,
            use_parallel: default_parallel(),
            save_plots: default_save_plots(),
            write_json: default_write_json(),
            plot_target_size: default_plot_target_size(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            HaralickError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| HaralickError::ConfigLoad {
            source: e,
            path: path.to_path_buf(),
        })?;

        Ok(config)
    }

    /// Assemble the co-occurrence builder parameters
    pub fn co_occurrence_params(&self) -> CoOccurrenceParams {
        CoOccurrenceParams {
            n_levels: self.n_levels,
            distance: self.distance,
            angle: self.angle,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        // Check input path exists
        let input_path = PathBuf::from(&self.input_path);
        if !input_path.exists() {
            return Err(HaralickError::InvalidPath(input_path));
        }

        // Builder parameter invariants
        self.co_occurrence_params().validate()?;

        if let Some([width, height]) = self.resize_dimensions {
            if width == 0 || height == 0 {
                return Err(HaralickError::Config(
                    "resize_dimensions must be non-zero".to_string(),
                ));
            }
        }

        if self.plot_target_size == 0 {
            return Err(HaralickError::Config(
                "plot_target_size must be > 0".to_string(),
            ));
        }

        // Create output directories if they don't exist
        let base_dir = PathBuf::from(&self.output_base_dir);
        let metrics_dir = base_dir.join("metrics");

        fs::create_dir_all(&metrics_dir).map_err(|e| {
            HaralickError::Config(format!("Failed to create metrics output directory: {}", e))
        })?;

        if self.save_plots {
            let plots_dir = base_dir.join("plots");
            fs::create_dir_all(&plots_dir).map_err(|e| {
                HaralickError::Config(format!("Failed to create plots output directory: {}", e))
            })?;
        }

        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| HaralickError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content).map_err(HaralickError::Io)?;

        Ok(())
    }
}
