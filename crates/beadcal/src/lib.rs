//! beadcal — dual-view bead detection for TIRF calibration slides.
//!
//! A calibration frame images the same field of fluorescent beads through two
//! spectrally separated detection channels, recorded side by side: donor on
//! the left half, acceptor on the right. The pipeline stages are:
//!
//! 1. **Split** – divide the frame at half width into donor/acceptor channels.
//! 2. **Peaks** – local-maxima detection per channel (max/min filter contrast
//!    test + connected-component centroids).
//! 3. **Matching** – exhaustive donor/acceptor pairing within a pixel radius.
//! 4. **Dedup** – two-stage removal of ambiguously matched pairs, leaving a
//!    mutually one-to-one set.
//! 5. **Report** – per-image and run-wide coordinate/offset tables (TSV for
//!    external analysis import) and optional overlay plots.
//!
//! # Public API
//! [`run_batch`] with a [`DetectConfig`] and a [`Reporter`] drives whole
//! directories; [`process_image`] runs the pure per-frame pipeline; the stage
//! functions ([`find_peaks`], [`match_pairs`], [`deduplicate`]) are exposed
//! for embedding and testing.

mod channels;
mod config;
mod dedup;
mod error;
mod matching;
mod peaks;
mod pipeline;
mod plot;
mod report;

pub use channels::{DualViewImage, Gray16Image};
pub use config::DetectConfig;
pub use dedup::deduplicate;
pub use error::Error;
pub use matching::{match_pairs, Pair};
pub use peaks::{find_peaks, Peak};
pub use pipeline::{list_calibration_images, process_image, run_batch, BatchResult, ImageResult};
pub use plot::{render_aggregate, render_overlay, PlotReporter};
pub use report::{CompositeReporter, NullReporter, Reporter, TsvReporter};
