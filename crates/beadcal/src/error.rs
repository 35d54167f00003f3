use core::fmt;
use std::path::PathBuf;

/// Errors surfaced at the batch boundary.
///
/// Empty detection results are not errors: an image with zero peaks or zero
/// surviving pairs still yields a well-formed (empty) table.
#[derive(Debug)]
pub enum Error {
    /// The image file could not be read or decoded.
    Image {
        path: PathBuf,
        source: image::ImageError,
    },
    /// The frame width cannot be split into two equal channel halves.
    OddWidth { path: PathBuf, width: u32 },
    /// A configuration parameter is non-positive or nonsensical.
    Config(String),
    /// Filesystem failure while scanning inputs or writing reports.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image { path, source } => {
                write!(f, "failed to read image {}: {}", path.display(), source)
            }
            Self::OddWidth { path, width } => write!(
                f,
                "{}: width {} cannot be split into two equal channel halves",
                path.display(),
                width
            ),
            Self::Config(msg) => write!(f, "invalid configuration: {msg}"),
            Self::Io(e) => write!(f, "i/o error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Image { source, .. } => Some(source),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
