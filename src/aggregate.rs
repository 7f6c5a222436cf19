// src/aggregate.rs
//! Turns a neighbor set into a ranked list of candidate spots.
//!
//! The top-k most similar neighbors vote with their ratings, weighted by
//! similarity; spots backed by too few distinct neighbors are dropped.

use std::collections::{HashMap, HashSet};

use crate::models::{Neighbor, Rating};

/// A candidate spot with its aggregated score, before catalog attributes
/// are attached.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredSpot {
    pub spot_id: i64,
    /// Similarity-weighted average of the neighbors' grades.
    pub grade: f64,
    /// Distinct top-k neighbors who rated the spot.
    pub num: usize,
}

/// Aggregates `neighbor_ratings` over the top-`k` entries of `neighbors`.
///
/// Neighbor ranking ties on similarity break by ascending user id; the
/// final ranking is grade descending, then support descending, then spot
/// id ascending, so identical inputs always produce identical output.
/// Duplicate `(user, spot)` rating rows each contribute to the weighted
/// sums, but `num` counts each neighbor once.
///
/// Spots listed in `exclude` are dropped before ranking.
pub fn aggregate(
    neighbors: &[Neighbor],
    neighbor_ratings: &[Rating],
    k: usize,
    min_neighbor_support: usize,
    m: usize,
    exclude: Option<&HashSet<i64>>,
) -> Vec<ScoredSpot> {
    let mut ranked: Vec<&Neighbor> = neighbors.iter().collect();
    ranked.sort_by(|a, b| {
        b.similarity
            .total_cmp(&a.similarity)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    ranked.truncate(k);

    let sim_by_user: HashMap<i64, f64> = ranked
        .iter()
        .map(|n| (n.user_id, n.similarity))
        .collect();

    struct Accumulator {
        weighted_sum: f64,
        sim_sum: f64,
        raters: HashSet<i64>,
    }

    let mut by_spot: HashMap<i64, Accumulator> = HashMap::new();
    for rating in neighbor_ratings {
        let Some(&sim) = sim_by_user.get(&rating.user_id) else {
            continue;
        };
        if exclude.is_some_and(|set| set.contains(&rating.spot_id)) {
            continue;
        }
        let acc = by_spot.entry(rating.spot_id).or_insert(Accumulator {
            weighted_sum: 0.0,
            sim_sum: 0.0,
            raters: HashSet::new(),
        });
        acc.weighted_sum += rating.grade * sim;
        acc.sim_sum += sim;
        acc.raters.insert(rating.user_id);
    }

    let mut scored: Vec<ScoredSpot> = by_spot
        .into_iter()
        .filter(|(_, acc)| acc.raters.len() >= min_neighbor_support && acc.sim_sum > 0.0)
        .map(|(spot_id, acc)| ScoredSpot {
            spot_id,
            grade: acc.weighted_sum / acc.sim_sum,
            num: acc.raters.len(),
        })
        .collect();

    scored.sort_by(|a, b| {
        b.grade
            .total_cmp(&a.grade)
            .then_with(|| b.num.cmp(&a.num))
            .then_with(|| a.spot_id.cmp(&b.spot_id))
    });
    scored.truncate(m);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neighbor(user_id: i64, similarity: f64) -> Neighbor {
        Neighbor {
            user_id,
            similarity,
            shared_count: 3,
        }
    }

    fn rating(user_id: i64, spot_id: i64, grade: f64) -> Rating {
        Rating {
            user_id,
            spot_id,
            grade,
        }
    }

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn weighted_average_over_two_neighbors() {
        let neighbors = vec![neighbor(2, 0.95), neighbor(3, 0.92)];
        let ratings = vec![rating(2, 100, 5.0), rating(3, 100, 3.0)];
        let scored = aggregate(&neighbors, &ratings, 10, 2, 5, None);
        assert_eq!(scored.len(), 1);
        let expected = (5.0 * 0.95 + 3.0 * 0.92) / (0.95 + 0.92);
        assert!((scored[0].grade - expected).abs() < TOLERANCE);
        assert_eq!(scored[0].num, 2);
    }

    #[test]
    fn support_filter_drops_singly_rated_spots() {
        let neighbors = vec![neighbor(2, 0.95), neighbor(3, 0.92)];
        let ratings = vec![
            rating(2, 100, 5.0),
            rating(3, 100, 3.0),
            rating(2, 200, 5.0),
        ];
        let scored = aggregate(&neighbors, &ratings, 10, 2, 5, None);
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].spot_id, 100);
    }

    #[test]
    fn output_is_bounded_by_m() {
        let neighbors = vec![neighbor(2, 0.95), neighbor(3, 0.92)];
        let mut ratings = Vec::new();
        for spot in 0..20 {
            ratings.push(rating(2, spot, 4.0));
            ratings.push(rating(3, spot, 4.0));
        }
        let scored = aggregate(&neighbors, &ratings, 10, 2, 5, None);
        assert_eq!(scored.len(), 5);
    }

    #[test]
    fn only_top_k_neighbors_vote() {
        let neighbors = vec![neighbor(2, 0.99), neighbor(3, 0.95), neighbor(4, 0.91)];
        // User 4 is cut at k=2, so spot 300 loses its second supporter.
        let ratings = vec![
            rating(2, 300, 5.0),
            rating(4, 300, 5.0),
            rating(2, 100, 4.0),
            rating(3, 100, 4.0),
        ];
        let scored = aggregate(&neighbors, &ratings, 2, 2, 5, None);
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].spot_id, 100);
    }

    #[test]
    fn neighbor_ties_break_by_ascending_user_id() {
        // Equal similarity; k=1 must deterministically keep user 2.
        let neighbors = vec![neighbor(3, 0.95), neighbor(2, 0.95)];
        let ratings = vec![rating(2, 100, 5.0), rating(3, 200, 5.0)];
        let scored = aggregate(&neighbors, &ratings, 1, 1, 5, None);
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].spot_id, 100);
    }

    #[test]
    fn ranking_breaks_grade_ties_by_support_then_spot_id() {
        let neighbors = vec![neighbor(2, 0.95), neighbor(3, 0.95), neighbor(4, 0.95)];
        let ratings = vec![
            // Spot 100: grade 4.0, three supporters.
            rating(2, 100, 4.0),
            rating(3, 100, 4.0),
            rating(4, 100, 4.0),
            // Spots 200 and 300: grade 4.0, two supporters each.
            rating(2, 200, 4.0),
            rating(3, 200, 4.0),
            rating(2, 300, 4.0),
            rating(3, 300, 4.0),
        ];
        let scored = aggregate(&neighbors, &ratings, 10, 2, 5, None);
        let order: Vec<i64> = scored.iter().map(|s| s.spot_id).collect();
        assert_eq!(order, vec![100, 200, 300]);
    }

    #[test]
    fn duplicate_rating_rows_weigh_twice_but_count_once() {
        let neighbors = vec![neighbor(2, 0.95), neighbor(3, 0.92)];
        let ratings = vec![
            rating(2, 100, 5.0),
            rating(2, 100, 5.0),
            rating(3, 100, 3.0),
        ];
        let scored = aggregate(&neighbors, &ratings, 10, 2, 5, None);
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].num, 2);
        let expected = (5.0 * 0.95 * 2.0 + 3.0 * 0.92) / (0.95 * 2.0 + 0.92);
        assert!((scored[0].grade - expected).abs() < TOLERANCE);
    }

    #[test]
    fn excluded_spots_are_dropped() {
        let neighbors = vec![neighbor(2, 0.95), neighbor(3, 0.92)];
        let ratings = vec![
            rating(2, 100, 5.0),
            rating(3, 100, 3.0),
            rating(2, 200, 4.0),
            rating(3, 200, 4.0),
        ];
        let exclude: HashSet<i64> = [100].into_iter().collect();
        let scored = aggregate(&neighbors, &ratings, 10, 2, 5, Some(&exclude));
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].spot_id, 200);
    }

    #[test]
    fn empty_neighbors_yield_empty_output() {
        let ratings = vec![rating(2, 100, 5.0)];
        assert!(aggregate(&[], &ratings, 10, 1, 5, None).is_empty());
    }
}
