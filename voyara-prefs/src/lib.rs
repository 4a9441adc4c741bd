//! Traveler preference and scoring engine.
//!
//! Learns per-route booking patterns, aggregates them into route
//! familiarity and global preferences, and scores live offers against
//! what it has learned. Persistence is behind the [`store::PatternStore`]
//! trait; this crate never talks to a database directly.

pub mod learning;
pub mod model;
pub mod recommend;
pub mod scoring;
pub mod store;

pub use learning::PreferenceEngine;
pub use model::{
    AirlinePreference, BookingData, DepartureWindow, FamiliarityLevel, OfferScore,
    RouteFamiliarity, ScoreBreakdown, UserPreferences,
};
pub use recommend::{generate_price_insight, Recommendation, ScoredOffer};
pub use scoring::score_offer;
pub use store::{PatternStore, PrefError, StoreError};
