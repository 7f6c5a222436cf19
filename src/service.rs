// src/service.rs
//! Orchestrates one recommendation request end to end.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::aggregate::aggregate;
use crate::config::Config;
use crate::error::RecommendError;
use crate::models::{RecommendParams, RecommendationRecord};
use crate::similarity::compute_neighbors;
use crate::store::RatingStore;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Stateless front door of the core: validates parameters, checks that the
/// user exists, then runs similarity and aggregation over a snapshot of
/// rating rows fetched for this request only.
///
/// The service holds no per-request state between calls; every call
/// recomputes from the current rating set.
#[derive(Clone, Debug)]
pub struct RecommendationService<S> {
    store: S,
    timeout: Duration,
}

impl<S: RatingStore> RecommendationService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Builds a service whose request deadline comes from the loaded
    /// configuration (`REQUEST_TIMEOUT_SECS`).
    pub fn from_config(store: S, config: &Config) -> Self {
        Self {
            store,
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    /// Overrides the request-level deadline covering store I/O and scoring.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns at most `params.m` recommendations for `user_id`, best first.
    ///
    /// An unknown user is [`RecommendError::UserNotFound`]; a known user
    /// with no qualifying neighbors or spots gets an empty list.
    pub async fn recommend(
        &self,
        user_id: i64,
        params: &RecommendParams,
    ) -> Result<Vec<RecommendationRecord>, RecommendError> {
        params.validate()?;

        tokio::time::timeout(self.timeout, self.recommend_inner(user_id, params))
            .await
            .map_err(|_| RecommendError::Timeout(self.timeout))?
    }

    async fn recommend_inner(
        &self,
        user_id: i64,
        params: &RecommendParams,
    ) -> Result<Vec<RecommendationRecord>, RecommendError> {
        let started = Instant::now();

        if !self.store.user_exists(user_id).await? {
            return Err(RecommendError::UserNotFound(user_id));
        }

        let target_ratings = self.store.ratings_by_user(user_id).await?;
        if target_ratings.is_empty() {
            tracing::info!(user_id, "user has no ratings, nothing to recommend");
            return Ok(Vec::new());
        }

        let candidate_ratings = self.store.co_rater_ratings(user_id).await?;
        let neighbors = compute_neighbors(
            user_id,
            &target_ratings,
            &candidate_ratings,
            params.min_co_rated,
            params.min_similarity,
        );
        if neighbors.is_empty() {
            tracing::info!(user_id, "no users cleared the similarity thresholds");
            return Ok(Vec::new());
        }

        let rated_by_target: HashSet<i64> =
            target_ratings.iter().map(|r| r.spot_id).collect();
        let exclude = params.exclude_rated.then_some(&rated_by_target);

        let scored = aggregate(
            &neighbors,
            &candidate_ratings,
            params.k,
            params.min_neighbor_support,
            params.m,
            exclude,
        );

        let mut records = Vec::with_capacity(scored.len());
        for entry in scored {
            let spot = self
                .store
                .spot_attributes(entry.spot_id)
                .await?
                .ok_or(RecommendError::SpotNotFound(entry.spot_id))?;
            records.push(RecommendationRecord {
                spot,
                grade: entry.grade,
                num: entry.num,
            });
        }

        tracing::info!(
            user_id,
            neighbors = neighbors.len(),
            recommendations = records.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "recommendation request served"
        );
        Ok(records)
    }
}
