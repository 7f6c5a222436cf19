// src/models.rs
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::RecommendError;

/// One rating edge: a user graded a parking spot.
///
/// Grades are on a fixed 1.0–5.0 scale and assumed strictly positive.
/// Duplicate `(user, spot)` pairs are passed through untouched; uniqueness
/// is the store's policy, not the core's.
#[derive(Serialize, Deserialize, Clone, Debug, FromRow)]
pub struct Rating {
    pub user_id: i64,
    pub spot_id: i64,
    pub grade: f64,
}

/// Catalog entry for a parking spot. All attributes besides `id` are
/// opaque pass-through fields: the core never interprets them, it only
/// carries them into the output record.
#[derive(Serialize, Deserialize, Clone, Debug, FromRow)]
pub struct ParkingSpot {
    pub id: i64,
    pub driving_distance: f64,
    pub walking_distance: f64,
    pub found_time: i32,
    pub parking_space_size: i32,
    pub parking_difficulty: String,
    pub near_elevator: bool,
    pub has_surveillance: bool,
    pub fee: f64,
    pub parking_type: String,
    pub longitude: f64,
    pub latitude: f64,
}

/// A user whose rating vector over shared spots is similar to the target's.
///
/// Derived and ephemeral: computed fresh per request in local memory,
/// never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct Neighbor {
    pub user_id: i64,
    pub similarity: f64,
    /// Number of rating-row pairs over shared spots; equals the number of
    /// co-rated spots when neither side holds duplicate ratings.
    pub shared_count: usize,
}

/// Output-only record: the aggregated score plus the spot's pass-through
/// attributes, flattened on serialization.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RecommendationRecord {
    #[serde(flatten)]
    pub spot: ParkingSpot,
    /// Similarity-weighted average of the neighbors' grades for this spot.
    pub grade: f64,
    /// Distinct top-k neighbors who rated this spot.
    pub num: usize,
}

/// Tunable thresholds for one recommendation request. Deserializes with
/// per-field defaults so callers can override any subset.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct RecommendParams {
    /// Neighborhood size: the top `k` most similar users are consulted.
    pub k: usize,
    /// Minimum number of co-rated spots for a user to count as a neighbor.
    pub min_co_rated: usize,
    /// Minimum distinct neighbors that must have rated a candidate spot.
    pub min_neighbor_support: usize,
    /// Similarity must strictly exceed this to qualify a neighbor.
    pub min_similarity: f64,
    /// Maximum number of records returned.
    pub m: usize,
    /// Drop spots the target user has already rated. Off by default.
    pub exclude_rated: bool,
}

impl Default for RecommendParams {
    fn default() -> Self {
        Self {
            k: 10,
            min_co_rated: 3,
            min_neighbor_support: 2,
            min_similarity: 0.9,
            m: 5,
            exclude_rated: false,
        }
    }
}

impl RecommendParams {
    /// Rejects out-of-domain thresholds before any store query runs.
    pub fn validate(&self) -> Result<(), RecommendError> {
        if self.k == 0 {
            return Err(RecommendError::InvalidParameter("k must be >= 1".into()));
        }
        if self.m == 0 {
            return Err(RecommendError::InvalidParameter("m must be >= 1".into()));
        }
        if self.min_co_rated == 0 {
            return Err(RecommendError::InvalidParameter(
                "min_co_rated must be >= 1".into(),
            ));
        }
        if self.min_neighbor_support == 0 {
            return Err(RecommendError::InvalidParameter(
                "min_neighbor_support must be >= 1".into(),
            ));
        }
        if !self.min_similarity.is_finite() || !(-1.0..=1.0).contains(&self.min_similarity) {
            return Err(RecommendError::InvalidParameter(
                "min_similarity must lie in [-1, 1]".into(),
            ));
        }
        Ok(())
    }
}
