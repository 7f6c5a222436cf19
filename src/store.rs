// src/store.rs
//! The rating-store boundary the core consumes.
//!
//! The store holds `(user, spot, grade)` triples and the spot catalog. The
//! core only ever reads from it; derived similarity state never goes back
//! in.

use std::collections::{HashMap, HashSet};

use crate::error::RecommendError;
use crate::models::{ParkingSpot, Rating};

/// Read-only traversal interface over users, spots and rating edges.
///
/// `co_rater_ratings` is the one non-obvious method: instead of a per-spot
/// "who rated this" lookup it returns, in a single round trip, every
/// rating row of every *other* user who shares at least one rated spot
/// with the target. That is exactly the input the similarity engine needs.
pub trait RatingStore {
    fn user_exists(
        &self,
        user_id: i64,
    ) -> impl Future<Output = Result<bool, RecommendError>> + Send;

    fn ratings_by_user(
        &self,
        user_id: i64,
    ) -> impl Future<Output = Result<Vec<Rating>, RecommendError>> + Send;

    fn co_rater_ratings(
        &self,
        user_id: i64,
    ) -> impl Future<Output = Result<Vec<Rating>, RecommendError>> + Send;

    fn spot_attributes(
        &self,
        spot_id: i64,
    ) -> impl Future<Output = Result<Option<ParkingSpot>, RecommendError>> + Send;
}

/// Hash-map backed store for tests and embedders that do not need a
/// database.
#[derive(Clone, Debug, Default)]
pub struct MemoryRatingStore {
    users: HashSet<i64>,
    spots: HashMap<i64, ParkingSpot>,
    ratings: Vec<Rating>,
}

impl MemoryRatingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&mut self, user_id: i64) {
        self.users.insert(user_id);
    }

    pub fn add_spot(&mut self, spot: ParkingSpot) {
        self.spots.insert(spot.id, spot);
    }

    /// Records a rating edge. The user is registered implicitly; duplicate
    /// `(user, spot)` pairs are kept as-is, mirroring a store without a
    /// uniqueness constraint.
    pub fn add_rating(&mut self, user_id: i64, spot_id: i64, grade: f64) {
        self.users.insert(user_id);
        self.ratings.push(Rating {
            user_id,
            spot_id,
            grade,
        });
    }
}

impl RatingStore for MemoryRatingStore {
    async fn user_exists(&self, user_id: i64) -> Result<bool, RecommendError> {
        Ok(self.users.contains(&user_id))
    }

    async fn ratings_by_user(&self, user_id: i64) -> Result<Vec<Rating>, RecommendError> {
        Ok(self
            .ratings
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn co_rater_ratings(&self, user_id: i64) -> Result<Vec<Rating>, RecommendError> {
        let target_spots: HashSet<i64> = self
            .ratings
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.spot_id)
            .collect();

        let co_raters: HashSet<i64> = self
            .ratings
            .iter()
            .filter(|r| r.user_id != user_id && target_spots.contains(&r.spot_id))
            .map(|r| r.user_id)
            .collect();

        Ok(self
            .ratings
            .iter()
            .filter(|r| co_raters.contains(&r.user_id))
            .cloned()
            .collect())
    }

    async fn spot_attributes(&self, spot_id: i64) -> Result<Option<ParkingSpot>, RecommendError> {
        Ok(self.spots.get(&spot_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn co_rater_ratings_returns_full_history_of_sharing_users() {
        let mut store = MemoryRatingStore::new();
        store.add_rating(1, 10, 5.0);
        store.add_rating(2, 10, 4.0); // shares spot 10 with user 1
        store.add_rating(2, 20, 3.0); // unshared row still returned
        store.add_rating(3, 30, 5.0); // no overlap with user 1

        let rows = store.co_rater_ratings(1).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.user_id == 2));
    }

    #[tokio::test]
    async fn co_rater_ratings_excludes_the_target_rows() {
        let mut store = MemoryRatingStore::new();
        store.add_rating(1, 10, 5.0);
        store.add_rating(2, 10, 4.0);

        let rows = store.co_rater_ratings(1).await.unwrap();
        assert!(rows.iter().all(|r| r.user_id != 1));
    }

    #[tokio::test]
    async fn unknown_user_has_no_ratings() {
        let store = MemoryRatingStore::new();
        assert!(!store.user_exists(7).await.unwrap());
        assert!(store.ratings_by_user(7).await.unwrap().is_empty());
        assert!(store.co_rater_ratings(7).await.unwrap().is_empty());
    }
}
