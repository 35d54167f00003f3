//! Result persistence.
//!
//! Reporters observe the batch from the outside: once per finished image and
//! once when the whole run is done. Detection never depends on reporter state,
//! so reporters can be stacked freely (the CLI combines the TSV table with
//! optional plots).

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::channels::DualViewImage;
use crate::error::Error;
use crate::pipeline::{BatchResult, ImageResult};

/// Batch observer: called after each image and after the full run.
pub trait Reporter {
    fn image_done(&mut self, image: &DualViewImage, result: &ImageResult) -> Result<(), Error>;
    fn batch_done(&mut self, batch: &BatchResult) -> Result<(), Error>;
}

/// Reporter that discards everything. Useful in tests and library embedding.
pub struct NullReporter;

impl Reporter for NullReporter {
    fn image_done(&mut self, _image: &DualViewImage, _result: &ImageResult) -> Result<(), Error> {
        Ok(())
    }

    fn batch_done(&mut self, _batch: &BatchResult) -> Result<(), Error> {
        Ok(())
    }
}

/// Fans every callback out to a list of reporters, in push order.
#[derive(Default)]
pub struct CompositeReporter {
    reporters: Vec<Box<dyn Reporter>>,
}

impl CompositeReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, reporter: Box<dyn Reporter>) {
        self.reporters.push(reporter);
    }
}

impl Reporter for CompositeReporter {
    fn image_done(&mut self, image: &DualViewImage, result: &ImageResult) -> Result<(), Error> {
        for reporter in &mut self.reporters {
            reporter.image_done(image, result)?;
        }
        Ok(())
    }

    fn batch_done(&mut self, batch: &BatchResult) -> Result<(), Error> {
        for reporter in &mut self.reporters {
            reporter.batch_done(batch)?;
        }
        Ok(())
    }
}

/// Writes the run-wide coordinate table: one header line, then one
/// tab-separated row per cleaned pair, appended image by image.
///
/// The header and file are created up front, so a run whose every image
/// comes up empty still leaves a well-formed (header-only) table.
pub struct TsvReporter {
    path: PathBuf,
}

impl TsvReporter {
    /// Create the table file in `out_dir`, named by the run date
    /// (`calib<YYYY-MM-DD>_result.txt`), and write the header.
    pub fn create(out_dir: &Path) -> Result<Self, Error> {
        let date = chrono::Local::now().format("%Y-%m-%d");
        Self::with_name(out_dir, &format!("calib{date}_result.txt"))
    }

    /// Create the table file with an explicit name.
    pub fn with_name(out_dir: &Path, name: &str) -> Result<Self, Error> {
        let path = out_dir.join(name);
        let mut file = File::create(&path)?;
        writeln!(file, "posx_o\tposy_o\tposx\tposy\tdifx\tdify")?;
        Ok(Self { path })
    }

    /// Path of the table file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Reporter for TsvReporter {
    fn image_done(&mut self, _image: &DualViewImage, result: &ImageResult) -> Result<(), Error> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        for q in &result.cleaned {
            writeln!(
                file,
                "{}\t{}\t{}\t{}\t{}\t{}",
                q.donor_x, q.donor_y, q.acceptor_x, q.acceptor_y, q.dx, q.dy
            )?;
        }
        Ok(())
    }

    fn batch_done(&mut self, _batch: &BatchResult) -> Result<(), Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::Gray16Image;
    use crate::matching::Pair;
    use crate::peaks::Peak;

    fn dummy_image() -> DualViewImage {
        let frame = Gray16Image::new(8, 4);
        DualViewImage::split(&frame, Path::new("dummy.tif")).unwrap()
    }

    fn result_with_pairs(cleaned: Vec<Pair>) -> ImageResult {
        ImageResult {
            source: PathBuf::from("dummy.tif"),
            channel_size: [4, 4],
            donor_peaks: Vec::new(),
            acceptor_peaks: Vec::new(),
            candidates: cleaned.clone(),
            cleaned,
        }
    }

    #[test]
    fn test_tsv_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut reporter = TsvReporter::with_name(dir.path(), "calib_test.txt").unwrap();

        let pair = Pair::new(Peak { x: 1.5, y: 2.0 }, Peak { x: 3.0, y: 4.0 });
        reporter
            .image_done(&dummy_image(), &result_with_pairs(vec![pair]))
            .unwrap();

        let content = std::fs::read_to_string(reporter.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "posx_o\tposy_o\tposx\tposy\tdifx\tdify");
        assert_eq!(lines[1], "1.5\t2\t3\t4\t1.5\t2");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_tsv_empty_image_leaves_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let mut reporter = TsvReporter::with_name(dir.path(), "calib_empty.txt").unwrap();
        reporter
            .image_done(&dummy_image(), &result_with_pairs(Vec::new()))
            .unwrap();

        let content = std::fs::read_to_string(reporter.path()).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn test_tsv_appends_across_images() {
        let dir = tempfile::tempdir().unwrap();
        let mut reporter = TsvReporter::with_name(dir.path(), "calib_multi.txt").unwrap();

        let a = Pair::new(Peak { x: 0.0, y: 0.0 }, Peak { x: 1.0, y: 1.0 });
        let b = Pair::new(Peak { x: 5.0, y: 5.0 }, Peak { x: 6.0, y: 4.0 });
        reporter
            .image_done(&dummy_image(), &result_with_pairs(vec![a]))
            .unwrap();
        reporter
            .image_done(&dummy_image(), &result_with_pairs(vec![b]))
            .unwrap();

        let content = std::fs::read_to_string(reporter.path()).unwrap();
        assert_eq!(content.lines().count(), 3);
        assert!(content.lines().last().unwrap().starts_with("5\t5\t6\t4"));
    }
}
