use std::fs;
use std::fs::File;
use std::path::Path;

use csv::Writer;
use serde::Serialize;

use crate::errors::{HaralickError, Result};
use crate::glcm::CoOccurrenceParams;
use crate::haralick::TextureMetrics;

/// Write the seven Haralick metrics for one image to CSV
pub fn write_metrics_csv<P: AsRef<Path>>(
    metrics: &TextureMetrics,
    params: &CoOccurrenceParams,
    output_dir: P,
    filename: &str,
) -> Result<()> {
    let output_path = output_dir
        .as_ref()
        .join("metrics")
        .join(format!("{}.csv", filename));

    // Create directory if it doesn't exist
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).map_err(HaralickError::Io)?;
    }

    // Create CSV writer
    let mut writer = Writer::from_path(&output_path).map_err(HaralickError::CsvOutput)?;

    // Write header
    writer
        .write_record([
            "Filename",
            "N_Levels",
            "Distance",
            "Angle_Deg",
            "ASM",
            "Energy",
            "Contrast",
            "Correlation",
            "Homogeneity",
            "Mean",
            "Std_Dev",
        ])
        .map_err(HaralickError::CsvOutput)?;

    // Write data
    writer
        .write_record([
            filename.to_string(),
            params.n_levels.to_string(),
            params.distance.to_string(),
            params.angle.degrees().to_string(),
            format!("{:.6}", metrics.asm),
            format!("{:.6}", metrics.energy),
            format!("{:.6}", metrics.contrast),
            format!("{:.6}", metrics.correlation),
            format!("{:.6}", metrics.homogeneity),
            format!("{:.6}", metrics.mean),
            format!("{:.6}", metrics.std_dev),
        ])
        .map_err(HaralickError::CsvOutput)?;

    // Flush writer
    writer
        .flush()
        .map_err(|e| HaralickError::CsvOutput(csv::Error::from(e)))?;

    Ok(())
}

/// Serialized form of one image's analysis result
#[derive(Debug, Serialize)]
struct MetricsRecord<'a> {
    filename: &'a str,
    params: &'a CoOccurrenceParams,
    metrics: &'a TextureMetrics,
}

/// Write the metrics for one image as pretty-printed JSON
pub fn write_metrics_json<P: AsRef<Path>>(
    metrics: &TextureMetrics,
    params: &CoOccurrenceParams,
    output_dir: P,
    filename: &str,
) -> Result<()> {
    let output_path = output_dir
        .as_ref()
        .join("metrics")
        .join(format!("{}.json", filename));

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).map_err(HaralickError::Io)?;
    }

    let record = MetricsRecord {
        filename,
        params,
        metrics,
    };

    let file = File::create(&output_path).map_err(HaralickError::Io)?;
    serde_json::to_writer_pretty(file, &record).map_err(HaralickError::Json)?;

    Ok(())
}
