//! Local-maxima peak detection for a single channel.
//!
//! A pixel is a maximum candidate when its value equals the maximum of a
//! square neighborhood centered on it, and is retained only when the local
//! max-min spread exceeds the contrast threshold. Retained pixels are grouped
//! into 4-connected components; each component yields one peak at the centroid
//! of its inclusive bounding box. Bead images saturate a small plateau rather
//! than a single pixel, which is why the component step is needed.

use crate::channels::Gray16Image;

/// A detected bead centroid in channel pixel coordinates.
///
/// Coordinates come from integer bounding boxes, so they are exact multiples
/// of 0.5 and safe to compare with exact equality downstream.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Peak {
    /// X coordinate (pixels).
    pub x: f64,
    /// Y coordinate (pixels).
    pub y: f64,
}

/// Square filter window for side `n`: offsets `-(n/2) ..= n-1-n/2`.
///
/// Matches the centered footprint convention of separable max/min filters;
/// odd `n` gives the symmetric window. Windows are clipped at image borders,
/// so border components are detected as-is.
#[inline]
fn window_bounds(center: usize, extent: usize, left: usize, right: usize) -> (usize, usize) {
    let lo = center.saturating_sub(left);
    let hi = (center + right).min(extent - 1);
    (lo, hi)
}

/// Detect local-maxima peaks.
///
/// Returns peaks in row-major component-discovery order (deterministic).
/// A flat image, or one whose contrast never exceeds `threshold`, yields an
/// empty vector.
pub fn find_peaks(channel: &Gray16Image, threshold: u16, neighborhood: usize) -> Vec<Peak> {
    let (w, h) = channel.dimensions();
    let (w, h) = (w as usize, h as usize);
    if w == 0 || h == 0 || neighborhood == 0 {
        return Vec::new();
    }
    let data = channel.as_raw();
    let left = neighborhood / 2;
    let right = neighborhood - 1 - left;

    // Maximum-candidate mask: pixel equals its window max and the window
    // max-min spread strictly exceeds the contrast threshold.
    let mut mask = vec![false; w * h];
    for y in 0..h {
        let (y_lo, y_hi) = window_bounds(y, h, left, right);
        for x in 0..w {
            let (x_lo, x_hi) = window_bounds(x, w, left, right);
            let mut wmax = u16::MIN;
            let mut wmin = u16::MAX;
            for wy in y_lo..=y_hi {
                let row = wy * w;
                for wx in x_lo..=x_hi {
                    let v = data[row + wx];
                    if v > wmax {
                        wmax = v;
                    }
                    if v < wmin {
                        wmin = v;
                    }
                }
            }
            mask[y * w + x] = data[y * w + x] == wmax && (wmax - wmin) > threshold;
        }
    }

    // Label 4-connected components, one peak per component at the centroid
    // of the inclusive bounding box.
    let mut visited = vec![false; w * h];
    let mut peaks = Vec::new();
    let mut stack = Vec::new();
    for start in 0..w * h {
        if !mask[start] || visited[start] {
            continue;
        }
        visited[start] = true;
        stack.push(start);
        let (mut x_min, mut x_max) = (start % w, start % w);
        let (mut y_min, mut y_max) = (start / w, start / w);

        while let Some(idx) = stack.pop() {
            let (x, y) = (idx % w, idx / w);
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);

            let mut visit = |nidx: usize| {
                if mask[nidx] && !visited[nidx] {
                    visited[nidx] = true;
                    stack.push(nidx);
                }
            };
            if x > 0 {
                visit(idx - 1);
            }
            if x + 1 < w {
                visit(idx + 1);
            }
            if y > 0 {
                visit(idx - w);
            }
            if y + 1 < h {
                visit(idx + w);
            }
        }

        peaks.push(Peak {
            x: (x_min + x_max) as f64 / 2.0,
            y: (y_min + y_max) as f64 / 2.0,
        });
    }
    peaks
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn image_with_spots(w: u32, h: u32, spots: &[(u32, u32, u16)]) -> Gray16Image {
        let mut img = Gray16Image::new(w, h);
        for &(x, y, v) in spots {
            img.put_pixel(x, y, Luma([v]));
        }
        img
    }

    #[test]
    fn test_flat_image_has_no_peaks() {
        let img = Gray16Image::from_pixel(16, 16, Luma([700]));
        assert!(find_peaks(&img, 1, 5).is_empty());
    }

    #[test]
    fn test_single_bright_pixel_is_one_peak() {
        let img = image_with_spots(11, 9, &[(4, 3, 500)]);
        let peaks = find_peaks(&img, 300, 5);
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0], Peak { x: 4.0, y: 3.0 });
    }

    #[test]
    fn test_contrast_threshold_is_strict() {
        // Spread equals the threshold: rejected. One unit below: kept.
        let img = image_with_spots(9, 9, &[(4, 4, 300)]);
        assert!(find_peaks(&img, 300, 5).is_empty());
        assert_eq!(find_peaks(&img, 299, 5).len(), 1);
    }

    #[test]
    fn test_plateau_centroid_is_half_pixel() {
        // Two equal maximal pixels side by side form one component with
        // centroid midway between them.
        let img = image_with_spots(12, 7, &[(5, 3, 900), (6, 3, 900)]);
        let peaks = find_peaks(&img, 300, 5);
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0], Peak { x: 5.5, y: 3.0 });
    }

    #[test]
    fn test_diagonal_maxima_are_separate_peaks() {
        // Diagonal neighbors are not 4-connected: two components.
        let img = image_with_spots(12, 12, &[(4, 4, 900), (5, 5, 900)]);
        let mut peaks = find_peaks(&img, 300, 5);
        peaks.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap());
        assert_eq!(peaks, vec![Peak { x: 4.0, y: 4.0 }, Peak { x: 5.0, y: 5.0 }]);
    }

    #[test]
    fn test_border_peak_is_included() {
        let img = image_with_spots(10, 10, &[(0, 0, 800)]);
        let peaks = find_peaks(&img, 300, 5);
        assert_eq!(peaks, vec![Peak { x: 0.0, y: 0.0 }]);
    }

    #[test]
    fn test_two_well_separated_beads() {
        let img = image_with_spots(32, 32, &[(5, 6, 1000), (25, 20, 1500)]);
        let peaks = find_peaks(&img, 300, 5);
        assert_eq!(
            peaks,
            vec![Peak { x: 5.0, y: 6.0 }, Peak { x: 25.0, y: 20.0 }]
        );
    }
}
