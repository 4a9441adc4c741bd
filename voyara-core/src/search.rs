use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Cabin of service requested for a search or carried on a segment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CabinClass {
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl Default for CabinClass {
    fn default() -> Self {
        CabinClass::Economy
    }
}

/// Canonical search request handed to the supply layer.
///
/// `airline` is optional; when set it drives airline-specific (NDC style)
/// routing in the rules engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplySearchParams {
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub passengers: u32,
    pub cabin: CabinClass,
    pub airline: Option<String>,
    pub max_results: usize,
    pub currency: String,
}

impl SupplySearchParams {
    /// Route key in `"ORIGIN-DEST"` form, shared with the preference engine.
    pub fn route(&self) -> String {
        format!("{}-{}", self.origin, self.destination)
    }

    pub fn is_round_trip(&self) -> bool {
        self.return_date.is_some()
    }
}
