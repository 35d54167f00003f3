//! Overlay plot rendering.
//!
//! Per-image plots show the summed two-channel intensity as background with
//! detected peaks and matched pairs drawn on top; the aggregate plot is a
//! scatter of every cleaned pair across the run. Rendering is split from
//! saving so tests can inspect the canvas directly.

use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_cross_mut, draw_hollow_circle_mut, draw_line_segment_mut};

use crate::channels::{DualViewImage, Gray16Image};
use crate::error::Error;
use crate::matching::Pair;
use crate::pipeline::{BatchResult, ImageResult};
use crate::report::Reporter;

const DONOR_COLOR: Rgb<u8> = Rgb([0, 200, 0]);
const ACCEPTOR_COLOR: Rgb<u8> = Rgb([220, 40, 40]);
const PAIR_DONOR_COLOR: Rgb<u8> = Rgb([70, 70, 255]);
const PAIR_ACCEPTOR_COLOR: Rgb<u8> = Rgb([0, 220, 220]);

/// Scale the summed 16-bit intensity into an 8-bit gray background.
fn background(summed: &Gray16Image) -> RgbImage {
    let max = summed.as_raw().iter().copied().max().unwrap_or(0).max(1) as f32;
    let (w, h) = summed.dimensions();
    RgbImage::from_fn(w, h, |x, y| {
        let v = (summed.get_pixel(x, y)[0] as f32 / max * 255.0) as u8;
        Rgb([v, v, v])
    })
}

/// Render one frame: peak circles per channel, cleaned pairs as connected
/// cross marks on the summed-intensity background.
pub fn render_overlay(image: &DualViewImage, result: &ImageResult) -> RgbImage {
    let mut canvas = background(&image.summed());

    for p in &result.donor_peaks {
        draw_hollow_circle_mut(&mut canvas, (p.x.round() as i32, p.y.round() as i32), 3, DONOR_COLOR);
    }
    for p in &result.acceptor_peaks {
        draw_hollow_circle_mut(
            &mut canvas,
            (p.x.round() as i32, p.y.round() as i32),
            3,
            ACCEPTOR_COLOR,
        );
    }
    for q in &result.cleaned {
        draw_line_segment_mut(
            &mut canvas,
            (q.donor_x as f32, q.donor_y as f32),
            (q.acceptor_x as f32, q.acceptor_y as f32),
            PAIR_ACCEPTOR_COLOR,
        );
        draw_cross_mut(
            &mut canvas,
            PAIR_DONOR_COLOR,
            q.donor_x.round() as i32,
            q.donor_y.round() as i32,
        );
        draw_cross_mut(
            &mut canvas,
            PAIR_ACCEPTOR_COLOR,
            q.acceptor_x.round() as i32,
            q.acceptor_y.round() as i32,
        );
    }
    canvas
}

/// Render the run-wide scatter of cleaned pairs on a blank canvas of the
/// channel dimensions.
pub fn render_aggregate(channel_size: [u32; 2], aggregate: &[Pair]) -> RgbImage {
    let mut canvas = RgbImage::new(channel_size[0].max(1), channel_size[1].max(1));
    for q in aggregate {
        draw_cross_mut(
            &mut canvas,
            DONOR_COLOR,
            q.donor_x.round() as i32,
            q.donor_y.round() as i32,
        );
        draw_cross_mut(
            &mut canvas,
            ACCEPTOR_COLOR,
            q.acceptor_x.round() as i32,
            q.acceptor_y.round() as i32,
        );
    }
    canvas
}

/// Saves a per-image overlay PNG per processed frame and/or an aggregate
/// scatter (`aggregate_maxima.png`) at the end of the run.
pub struct PlotReporter {
    out_dir: PathBuf,
    per_image: bool,
    aggregate: bool,
    channel_size: Option<[u32; 2]>,
}

impl PlotReporter {
    /// Reporter producing both per-image overlays and the aggregate scatter.
    pub fn new(out_dir: &Path) -> Self {
        Self::with_outputs(out_dir, true, true)
    }

    /// Select which plot outputs to produce.
    pub fn with_outputs(out_dir: &Path, per_image: bool, aggregate: bool) -> Self {
        Self {
            out_dir: out_dir.to_path_buf(),
            per_image,
            aggregate,
            channel_size: None,
        }
    }
}

impl Reporter for PlotReporter {
    fn image_done(&mut self, image: &DualViewImage, result: &ImageResult) -> Result<(), Error> {
        self.channel_size.get_or_insert(result.channel_size);
        if !self.per_image {
            return Ok(());
        }

        let stem = result
            .source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "frame".to_string());
        let path = self.out_dir.join(format!("{stem}.png"));

        let canvas = render_overlay(image, result);
        canvas.save(&path).map_err(std::io::Error::other)?;
        tracing::info!("Overlay plot written to {}", path.display());
        Ok(())
    }

    fn batch_done(&mut self, batch: &BatchResult) -> Result<(), Error> {
        if !self.aggregate {
            return Ok(());
        }
        let Some(channel_size) = self.channel_size else {
            return Ok(());
        };
        let path = self.out_dir.join("aggregate_maxima.png");
        let canvas = render_aggregate(channel_size, &batch.aggregate);
        canvas.save(&path).map_err(std::io::Error::other)?;
        tracing::info!("Aggregate plot written to {}", path.display());
        Ok(())
    }
}
