//! Batch orchestration.
//!
//! Per frame the call order is: load → split → peak detection per channel →
//! correspondence search → deduplication. The batch runner owns the aggregate
//! accumulator and hands each finished frame to the reporter; reporting side
//! effects never feed back into detection.

use std::path::{Path, PathBuf};

use crate::channels::DualViewImage;
use crate::config::DetectConfig;
use crate::dedup::deduplicate;
use crate::error::Error;
use crate::matching::{match_pairs, Pair};
use crate::peaks::{find_peaks, Peak};
use crate::report::Reporter;

/// Full detection record for a single calibration frame.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ImageResult {
    /// Source image path.
    pub source: PathBuf,
    /// Per-channel dimensions [width, height].
    pub channel_size: [u32; 2],
    /// Peaks detected in the donor (left) channel.
    pub donor_peaks: Vec<Peak>,
    /// Peaks detected in the acceptor (right) channel.
    pub acceptor_peaks: Vec<Peak>,
    /// All candidate pairs within the matching radius.
    pub candidates: Vec<Pair>,
    /// Pairs surviving two-stage deduplication.
    pub cleaned: Vec<Pair>,
}

/// Accumulated results across one run.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct BatchResult {
    /// Per-image records in processing order.
    pub images: Vec<ImageResult>,
    /// Cleaned pairs from all images, in processing order.
    pub aggregate: Vec<Pair>,
}

/// Enumerate calibration frames in `dir`: `.tif`/`.tiff`/`.png`,
/// case-insensitive, sorted by path for a reproducible processing order.
pub fn list_calibration_images(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        if matches!(ext.as_deref(), Some("tif" | "tiff" | "png")) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Run the detection pipeline on one split frame.
///
/// Pure function of the frame and the configuration; `source` is carried
/// through for reporting only.
pub fn process_image(image: &DualViewImage, config: &DetectConfig, source: &Path) -> ImageResult {
    let donor_peaks = find_peaks(&image.donor, config.threshold_donor, config.neighborhood);
    let acceptor_peaks = find_peaks(
        &image.acceptor,
        config.threshold_acceptor,
        config.neighborhood,
    );
    let candidates = match_pairs(&donor_peaks, &acceptor_peaks, config.max_distance);
    let cleaned = deduplicate(candidates.clone());

    if cleaned.is_empty() {
        tracing::warn!(
            "{}: no unambiguous pairs ({} donor / {} acceptor peaks, {} candidates)",
            source.display(),
            donor_peaks.len(),
            acceptor_peaks.len(),
            candidates.len(),
        );
    }

    ImageResult {
        source: source.to_path_buf(),
        channel_size: image.channel_size(),
        donor_peaks,
        acceptor_peaks,
        candidates,
        cleaned,
    }
}

/// Process every frame in `paths`, accumulating cleaned pairs across the run.
///
/// Configuration is validated before any image is touched. An unreadable or
/// unsplittable frame aborts the whole run; an empty detection result does
/// not. The reporter sees each image as it finishes and the batch once more
/// at the end.
pub fn run_batch(
    paths: &[PathBuf],
    config: &DetectConfig,
    reporter: &mut dyn Reporter,
) -> Result<BatchResult, Error> {
    config.validate()?;

    let mut batch = BatchResult::default();
    for path in paths {
        let image = DualViewImage::load(path)?;
        let result = process_image(&image, config, path);
        tracing::info!(
            "{}: {} donor peaks, {} acceptor peaks, {} candidates, {} cleaned",
            path.display(),
            result.donor_peaks.len(),
            result.acceptor_peaks.len(),
            result.candidates.len(),
            result.cleaned.len(),
        );
        batch.aggregate.extend_from_slice(&result.cleaned);
        reporter.image_done(&image, &result)?;
        batch.images.push(result);
    }

    tracing::info!(
        "Batch complete: {} images, {} cleaned pairs",
        batch.images.len(),
        batch.aggregate.len(),
    );
    reporter.batch_done(&batch)?;
    Ok(batch)
}
