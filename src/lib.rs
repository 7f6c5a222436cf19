//! User-based collaborative filtering for parking spot recommendations.
//!
//! The pipeline is: find other users whose rating history over shared spots
//! is cosine-similar to the target user's ([`similarity`]), then aggregate
//! the top-k neighbors' ratings into a similarity-weighted score per
//! candidate spot ([`aggregate`]). [`service::RecommendationService`] ties
//! the two together over a [`store::RatingStore`].
//!
//! All derived similarity state lives on the request's stack; nothing is
//! written back to the store, so concurrent requests never observe each
//! other's scratch data.
//!
//! # Quick start
//!
//! ```no_run
//! use parking_recommender::{
//!     MemoryRatingStore, RecommendParams, RecommendationService,
//! };
//!
//! # async fn run() -> Result<(), parking_recommender::RecommendError> {
//! let store = MemoryRatingStore::new();
//! let service = RecommendationService::new(store);
//! let recs = service.recommend(1, &RecommendParams::default()).await?;
//! for rec in recs {
//!     println!("spot {} grade {:.2} ({} neighbors)", rec.spot.id, rec.grade, rec.num);
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;
pub mod similarity;
pub mod store;

pub use config::Config;
pub use db::PgRatingStore;
pub use error::RecommendError;
pub use models::{Neighbor, ParkingSpot, Rating, RecommendParams, RecommendationRecord};
pub use service::RecommendationService;
pub use store::{MemoryRatingStore, RatingStore};
