//! Candidate ranking shared by the structural and compressed matchers.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use super::options::MatchOptions;
use super::recent::RecentlyUsed;

/// Offset added to the best distance before computing sampling weights so
/// an exact match does not divide by zero.
const MIN_DISTANCE_FLOOR: f32 = 0.001;

/// Apply the recent-use penalty and sort ascending.
///
/// The sort is stable, so equal distances keep corpus order.
pub(crate) fn rank(
    mut distances: Vec<(usize, f32)>,
    recent: Option<&RecentlyUsed>,
    penalty: f32,
) -> Vec<(usize, f32)> {
    if let Some(recent) = recent.filter(|r| !r.is_empty()) {
        for (index, dist) in distances.iter_mut() {
            if recent.contains(*index) {
                *dist *= penalty;
            }
        }
    }
    distances.sort_by(|a, b| a.1.total_cmp(&b.1));
    distances
}

/// Diversity weights for a ranked top-K slice: `1 / sqrt(d / minDist + 0.1)`.
pub(crate) fn diversity_weights(top: &[(usize, f32)]) -> Vec<f32> {
    let min_dist = top.first().map_or(0.0, |c| c.1) + MIN_DISTANCE_FLOOR;
    top.iter()
        .map(|&(_, d)| 1.0 / (d / min_dist + 0.1).sqrt())
        .collect()
}

/// Pick one entry from the ranked list per `options.diversity`.
///
/// Returns `None` only for an empty list.
pub(crate) fn select<R: Rng + ?Sized>(
    distances: Vec<(usize, f32)>,
    recent: Option<&RecentlyUsed>,
    options: &MatchOptions,
    rng: &mut R,
) -> Option<(usize, f32)> {
    let ranked = rank(distances, recent, options.recent_penalty);
    if options.diversity <= 1 || ranked.len() <= 1 {
        return ranked.first().copied();
    }

    let top = &ranked[..options.diversity.min(ranked.len())];
    match WeightedIndex::new(diversity_weights(top)) {
        Ok(dist) => top.get(dist.sample(rng)).copied(),
        // Non-finite distances leave no valid weights; fall back to best
        Err(_) => top.first().copied(),
    }
}
