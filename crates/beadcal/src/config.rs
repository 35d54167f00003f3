use crate::error::Error;

/// Detection and matching parameters for one calibration run.
///
/// Thresholds are contrast values in raw intensity units: a candidate maximum
/// survives only if the local max-min spread in its neighborhood exceeds the
/// channel threshold. `max_distance` is the pairing radius in pixels.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DetectConfig {
    /// Contrast threshold for the donor (left) channel.
    pub threshold_donor: u16,
    /// Contrast threshold for the acceptor (right) channel.
    pub threshold_acceptor: u16,
    /// Side length of the square max/min filter window (pixels).
    pub neighborhood: usize,
    /// Matching radius: donor/acceptor peaks pair up when strictly closer
    /// than this (pixels).
    pub max_distance: f64,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            threshold_donor: 300,
            threshold_acceptor: 300,
            neighborhood: 5,
            max_distance: 10.0,
        }
    }
}

impl DetectConfig {
    /// Reject nonsensical parameters before any image is touched.
    pub fn validate(&self) -> Result<(), Error> {
        if self.threshold_donor == 0 {
            return Err(Error::Config("threshold_donor must be positive".into()));
        }
        if self.threshold_acceptor == 0 {
            return Err(Error::Config("threshold_acceptor must be positive".into()));
        }
        if self.neighborhood == 0 {
            return Err(Error::Config("neighborhood must be positive".into()));
        }
        if !self.max_distance.is_finite() || self.max_distance <= 0.0 {
            return Err(Error::Config(format!(
                "max_distance must be finite and positive, got {}",
                self.max_distance
            )));
        }
        Ok(())
    }
}
