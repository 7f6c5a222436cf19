// src/similarity.rs
//! Pairwise user similarity from shared rating history.
//!
//! Cosine similarity is computed over the two users' rating vectors
//! restricted to the spots both have rated, not the full catalog. The
//! function is pure over already-fetched rating rows, so all derived
//! similarity state is request-local by construction.

use std::collections::HashMap;

use crate::models::{Neighbor, Rating};

/// Computes the neighbor set of `target_user`.
///
/// `target_ratings` are the target's own rating rows; `candidate_ratings`
/// are rating rows of other users (rows carrying `target_user`'s id are
/// skipped, so the target can never appear as its own neighbor). A
/// candidate qualifies when it co-rated at least `min_co_rated` spots with
/// the target and its cosine similarity strictly exceeds `min_similarity`.
///
/// Duplicate `(user, spot)` rows are not deduplicated on either side:
/// every (target row, candidate row) pair on a shared spot contributes to
/// the sums and to `shared_count`.
///
/// No ordering is guaranteed beyond grouping by user; ranking is the
/// aggregator's job.
pub fn compute_neighbors(
    target_user: i64,
    target_ratings: &[Rating],
    candidate_ratings: &[Rating],
    min_co_rated: usize,
    min_similarity: f64,
) -> Vec<Neighbor> {
    let mut target_rows: HashMap<i64, Vec<f64>> = HashMap::new();
    for rating in target_ratings {
        target_rows
            .entry(rating.spot_id)
            .or_default()
            .push(rating.grade);
    }
    if target_rows.is_empty() {
        return Vec::new();
    }

    let mut by_user: HashMap<i64, Vec<&Rating>> = HashMap::new();
    for rating in candidate_ratings {
        if rating.user_id == target_user {
            continue;
        }
        by_user.entry(rating.user_id).or_default().push(rating);
    }

    let candidate_count = by_user.len();
    let mut neighbors = Vec::new();
    for (user_id, ratings) in by_user {
        let mut dot = 0.0;
        let mut target_norm_sq = 0.0;
        let mut candidate_norm_sq = 0.0;
        let mut shared_count = 0usize;

        for rating in ratings {
            let Some(target_grades) = target_rows.get(&rating.spot_id) else {
                continue;
            };
            for &target_grade in target_grades {
                dot += target_grade * rating.grade;
                target_norm_sq += target_grade * target_grade;
                candidate_norm_sq += rating.grade * rating.grade;
                shared_count += 1;
            }
        }

        if shared_count < min_co_rated {
            continue;
        }
        // Grades are strictly positive so a zero magnitude should be
        // unreachable, but the division is guarded anyway.
        let denom = target_norm_sq.sqrt() * candidate_norm_sq.sqrt();
        if denom == 0.0 {
            continue;
        }
        let similarity = dot / denom;
        if similarity <= min_similarity {
            continue;
        }

        neighbors.push(Neighbor {
            user_id,
            similarity,
            shared_count,
        });
    }

    tracing::debug!(
        target_user,
        candidates = candidate_count,
        neighbors = neighbors.len(),
        "computed neighbor set"
    );
    neighbors
}
