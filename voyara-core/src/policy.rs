use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::search::CabinClass;

/// Flattened offer view consumed by the external corporate travel-policy
/// evaluator. The evaluation itself is outside this core; we only
/// guarantee that every canonical offer converts into this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyOfferView {
    pub price: f64,
    pub currency: String,
    pub cabin: CabinClass,
    pub stops: u32,
    pub airline_code: String,
    pub departure_time: DateTime<Utc>,
    pub refundable: bool,
    pub origin: String,
    pub destination: String,
}
