//! Dual-view channel handling.
//!
//! A calibration frame records both detection channels side by side on one
//! sensor: donor emission on the left half, acceptor emission on the right.
//! Splitting happens at exactly half the frame width; a frame whose width is
//! not evenly splittable is rejected.

use std::path::Path;

use image::{ImageBuffer, Luma};

use crate::error::Error;

/// 16-bit grayscale buffer, the working intensity format for camera frames.
pub type Gray16Image = ImageBuffer<Luma<u16>, Vec<u16>>;

/// A calibration frame split into its donor and acceptor halves.
#[derive(Debug, Clone)]
pub struct DualViewImage {
    /// Left half of the frame.
    pub donor: Gray16Image,
    /// Right half of the frame.
    pub acceptor: Gray16Image,
}

impl DualViewImage {
    /// Load a frame from disk and split it at half width.
    ///
    /// Any format the `image` crate decodes is accepted; pixel data is
    /// converted to 16-bit grayscale first.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let frame = image::open(path)
            .map_err(|source| Error::Image {
                path: path.to_path_buf(),
                source,
            })?
            .to_luma16();
        Self::split(&frame, path)
    }

    /// Split a loaded frame at half width. `path` is used for error context only.
    pub fn split(frame: &Gray16Image, path: &Path) -> Result<Self, Error> {
        let (w, h) = frame.dimensions();
        if w == 0 || w % 2 != 0 {
            return Err(Error::OddWidth {
                path: path.to_path_buf(),
                width: w,
            });
        }
        let half = w / 2;

        let mut donor = Gray16Image::new(half, h);
        let mut acceptor = Gray16Image::new(half, h);
        for y in 0..h {
            for x in 0..half {
                donor.put_pixel(x, y, *frame.get_pixel(x, y));
                acceptor.put_pixel(x, y, *frame.get_pixel(x + half, y));
            }
        }
        Ok(Self { donor, acceptor })
    }

    /// Channel dimensions [width, height] (both halves share them).
    pub fn channel_size(&self) -> [u32; 2] {
        let (w, h) = self.donor.dimensions();
        [w, h]
    }

    /// Saturating per-pixel sum of the two channels, used as plot background.
    pub fn summed(&self) -> Gray16Image {
        let (w, h) = self.donor.dimensions();
        let mut out = Gray16Image::new(w, h);
        for (x, y, px) in out.enumerate_pixels_mut() {
            let d = self.donor.get_pixel(x, y)[0];
            let a = self.acceptor.get_pixel(x, y)[0];
            *px = Luma([d.saturating_add(a)]);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn frame_from_fn(w: u32, h: u32, f: impl Fn(u32, u32) -> u16) -> Gray16Image {
        Gray16Image::from_fn(w, h, |x, y| Luma([f(x, y)]))
    }

    #[test]
    fn test_split_halves_preserve_pixels() {
        // Left half holds x, right half holds 1000 + x offset from the boundary.
        let frame = frame_from_fn(8, 3, |x, _| if x < 4 { x as u16 } else { 1000 + x as u16 });
        let dual = DualViewImage::split(&frame, &PathBuf::from("test.tif")).unwrap();

        assert_eq!(dual.channel_size(), [4, 3]);
        assert_eq!(dual.donor.get_pixel(2, 1)[0], 2);
        assert_eq!(dual.acceptor.get_pixel(2, 1)[0], 1006);
    }

    #[test]
    fn test_odd_width_rejected() {
        let frame = frame_from_fn(7, 4, |_, _| 0);
        let err = DualViewImage::split(&frame, &PathBuf::from("odd.tif")).unwrap_err();
        match err {
            Error::OddWidth { width, .. } => assert_eq!(width, 7),
            other => panic!("expected OddWidth, got {other:?}"),
        }
    }

    #[test]
    fn test_summed_saturates() {
        let frame = frame_from_fn(2, 1, |_, _| u16::MAX);
        let dual = DualViewImage::split(&frame, &PathBuf::from("sat.tif")).unwrap();
        assert_eq!(dual.summed().get_pixel(0, 0)[0], u16::MAX);
    }
}
