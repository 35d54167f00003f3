//! Donor/acceptor correspondence search.
//!
//! Exhaustive pairing: every donor peak within the matching radius of an
//! acceptor peak produces one candidate pair. Bead counts per calibration
//! image are small (tens to low hundreds), so the O(|donors|·|acceptors|)
//! scan is fine and keeps the output order fully deterministic.

use crate::peaks::Peak;

/// A donor/acceptor pairing with its channel offset.
///
/// `dx`/`dy` are the acceptor position minus the donor position. The same
/// struct represents both raw candidates and cleaned (deduplicated) pairs.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Pair {
    /// Donor x coordinate (pixels).
    pub donor_x: f64,
    /// Donor y coordinate (pixels).
    pub donor_y: f64,
    /// Acceptor x coordinate (pixels).
    pub acceptor_x: f64,
    /// Acceptor y coordinate (pixels).
    pub acceptor_y: f64,
    /// Offset `acceptor_x - donor_x`.
    pub dx: f64,
    /// Offset `acceptor_y - donor_y`.
    pub dy: f64,
}

impl Pair {
    /// Build a pair from two peaks, deriving the offset fields.
    pub fn new(donor: Peak, acceptor: Peak) -> Self {
        Self {
            donor_x: donor.x,
            donor_y: donor.y,
            acceptor_x: acceptor.x,
            acceptor_y: acceptor.y,
            dx: acceptor.x - donor.x,
            dy: acceptor.y - donor.y,
        }
    }

    /// Euclidean length of the offset.
    pub fn distance(&self) -> f64 {
        (self.dx * self.dx + self.dy * self.dy).sqrt()
    }
}

/// Emit a candidate pair for every (acceptor, donor) combination strictly
/// closer than `max_distance`.
///
/// Iteration order is acceptors outer, donors inner, both in detection
/// order, so the output sequence is reproducible across runs.
pub fn match_pairs(donor: &[Peak], acceptor: &[Peak], max_distance: f64) -> Vec<Pair> {
    let mut pairs = Vec::new();
    for a in acceptor {
        for d in donor {
            let dx = a.x - d.x;
            let dy = a.y - d.y;
            if (dx * dx + dy * dy).sqrt() < max_distance {
                pairs.push(Pair::new(*d, *a));
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Peak {
        Peak { x, y }
    }

    #[test]
    fn test_pairs_within_radius_only() {
        let donor = [p(0.0, 0.0), p(50.0, 50.0)];
        let acceptor = [p(1.0, 1.0)];
        let pairs = match_pairs(&donor, &acceptor, 5.0);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].donor_x, 0.0);
        assert_eq!(pairs[0].acceptor_x, 1.0);
    }

    #[test]
    fn test_threshold_is_strict() {
        // Distance exactly equal to the radius does not match; neither does
        // a coincident pair at radius zero.
        let donor = [p(0.0, 0.0)];
        let acceptor = [p(3.0, 4.0)];
        assert!(match_pairs(&donor, &acceptor, 5.0).is_empty());
        assert_eq!(match_pairs(&donor, &acceptor, 5.0 + 1e-9).len(), 1);

        let coincident = [p(2.0, 2.0)];
        assert!(match_pairs(&coincident, &coincident, 0.0).is_empty());
    }

    #[test]
    fn test_offsets_are_acceptor_minus_donor() {
        let pairs = match_pairs(&[p(1.0, 2.0)], &[p(4.0, 0.0)], 10.0);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].dx, 3.0);
        assert_eq!(pairs[0].dy, -2.0);
    }

    #[test]
    fn test_iteration_order_acceptor_outer() {
        // Two acceptors each matching both donors: output groups by acceptor.
        let donor = [p(0.0, 0.0), p(1.0, 0.0)];
        let acceptor = [p(0.5, 1.0), p(0.5, 2.0)];
        let pairs = match_pairs(&donor, &acceptor, 10.0);
        let acceptor_ys: Vec<f64> = pairs.iter().map(|q| q.acceptor_y).collect();
        assert_eq!(acceptor_ys, vec![1.0, 1.0, 2.0, 2.0]);
        let donor_xs: Vec<f64> = pairs.iter().map(|q| q.donor_x).collect();
        assert_eq!(donor_xs, vec![0.0, 1.0, 0.0, 1.0]);
    }
}
