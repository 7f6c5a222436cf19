// src/db.rs
//! Postgres-backed rating store.
//!
//! Every query binds its parameters; user input never reaches the SQL text.

use sqlx::PgPool;

use crate::error::RecommendError;
use crate::models::{ParkingSpot, Rating};
use crate::store::RatingStore;

#[derive(Clone, Debug)]
pub struct PgRatingStore {
    pool: PgPool,
}

impl PgRatingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, RecommendError> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub async fn connect_with(config: &crate::config::Config) -> Result<Self, RecommendError> {
        Self::connect(&config.database_url).await
    }
}

impl RatingStore for PgRatingStore {
    async fn user_exists(&self, user_id: i64) -> Result<bool, RecommendError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn ratings_by_user(&self, user_id: i64) -> Result<Vec<Rating>, RecommendError> {
        let rows = sqlx::query_as::<_, Rating>(
            "SELECT user_id, spot_id, grade FROM ratings WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn co_rater_ratings(&self, user_id: i64) -> Result<Vec<Rating>, RecommendError> {
        // Full rating history of every other user who co-rated at least one
        // spot with the target, in one round trip.
        let rows = sqlx::query_as::<_, Rating>(
            "SELECT r.user_id, r.spot_id, r.grade
             FROM ratings r
             WHERE r.user_id <> $1
               AND r.user_id IN (
                   SELECT other.user_id
                   FROM ratings mine
                   JOIN ratings other ON other.spot_id = mine.spot_id
                   WHERE mine.user_id = $1 AND other.user_id <> $1
               )",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn spot_attributes(&self, spot_id: i64) -> Result<Option<ParkingSpot>, RecommendError> {
        let spot = sqlx::query_as::<_, ParkingSpot>(
            "SELECT id, driving_distance, walking_distance, found_time, parking_space_size,
                    parking_difficulty, near_elevator, has_surveillance, fee, parking_type,
                    longitude, latitude
             FROM parking_spots WHERE id = $1",
        )
        .bind(spot_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(spot)
    }
}
