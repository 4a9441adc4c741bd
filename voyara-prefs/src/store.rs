use async_trait::async_trait;

use crate::model::{BookingData, RouteFamiliarity, UserPreferences};

/// Boxed transport error from a store implementation.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum PrefError {
    #[error("pattern store failure: {0}")]
    Store(String),
}

impl From<StoreError> for PrefError {
    fn from(err: StoreError) -> Self {
        PrefError::Store(err.to_string())
    }
}

/// Persistence contract for booking patterns and learned aggregates.
///
/// Keys are `(user_id, route)` for route-scoped rows and `user_id` for
/// global rows. Implementations own any transactional guarantees;
/// concurrent learn calls for the same user are an accepted race.
#[async_trait]
pub trait PatternStore: Send + Sync {
    async fn append_pattern(&self, user_id: &str, booking: &BookingData) -> Result<(), StoreError>;

    /// All pattern rows for one route, oldest first.
    async fn patterns_for_route(
        &self,
        user_id: &str,
        route: &str,
    ) -> Result<Vec<BookingData>, StoreError>;

    /// The user's most recent rows across all routes, newest first.
    async fn recent_patterns(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<BookingData>, StoreError>;

    async fn put_route_familiarity(
        &self,
        user_id: &str,
        data: &RouteFamiliarity,
    ) -> Result<(), StoreError>;

    async fn get_route_familiarity(
        &self,
        user_id: &str,
        route: &str,
    ) -> Result<Option<RouteFamiliarity>, StoreError>;

    async fn put_preferences(
        &self,
        user_id: &str,
        prefs: &UserPreferences,
    ) -> Result<(), StoreError>;

    async fn get_preferences(&self, user_id: &str) -> Result<Option<UserPreferences>, StoreError>;
}
