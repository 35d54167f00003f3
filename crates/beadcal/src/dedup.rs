//! Ambiguity removal for matched pairs.
//!
//! Two-stage filter, stage order mandatory: first drop every pair whose
//! acceptor coordinate is claimed by more than one candidate, then, among the
//! survivors, drop every pair whose donor coordinate is still claimed more
//! than once. The stages are not commutative when ambiguity chains through a
//! point (an acceptor shared by two donors can transitively free up a donor
//! that otherwise looked ambiguous), so a symmetric single pass would change
//! the result.
//!
//! Grouping keys on exact coordinate equality. Peak centroids come from
//! integer bounding boxes, so identical beads produce bit-identical values
//! and no epsilon is needed (or wanted).

use std::collections::HashMap;

use crate::matching::Pair;

#[inline]
fn coord_key(x: f64, y: f64) -> (u64, u64) {
    (x.to_bits(), y.to_bits())
}

/// Keep only the pairs whose key occurs exactly once, preserving input order.
fn retain_unique<F>(pairs: Vec<Pair>, key: F) -> Vec<Pair>
where
    F: Fn(&Pair) -> (u64, u64),
{
    let mut counts: HashMap<(u64, u64), usize> = HashMap::new();
    for pair in &pairs {
        *counts.entry(key(pair)).or_insert(0) += 1;
    }
    pairs
        .into_iter()
        .filter(|pair| counts[&key(pair)] == 1)
        .collect()
}

/// Reduce candidate pairs to a mutually one-to-one set.
///
/// Ambiguity is resolved by exclusion, not by picking a best match: any point
/// involved in a conflict at its stage is dropped together with all its
/// pairs. Empty input yields an empty output.
pub fn deduplicate(pairs: Vec<Pair>) -> Vec<Pair> {
    let acceptor_unique = retain_unique(pairs, |p| coord_key(p.acceptor_x, p.acceptor_y));
    retain_unique(acceptor_unique, |p| coord_key(p.donor_x, p.donor_y))
}
