use chrono::{DateTime, Duration, Utc, Weekday};
use serde::{Deserialize, Serialize};
use voyara_core::CabinClass;

/// One learned booking, the only write path into the engine. `route` is
/// the `"ORIGIN-DEST"` key shared with the supply layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingData {
    pub route: String,
    pub airline_code: String,
    pub airline_name: String,
    pub flight_number: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub day_of_week: Weekday,
    pub price: f64,
    pub currency: String,
    pub cabin: CabinClass,
    pub seat: Option<String>,
    pub days_before_departure: u32,
}

impl BookingData {
    /// When the booking was made, reconstructed from the departure and
    /// the recorded advance window.
    pub fn booked_at(&self) -> DateTime<Utc> {
        self.departure_time - Duration::days(self.days_before_departure as i64)
    }
}

/// Five fixed departure windows, ordered within the day. Adjacency in
/// this ordering drives the partial-credit branch of the time score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepartureWindow {
    EarlyMorning,
    Morning,
    Afternoon,
    Evening,
    LateEvening,
}

impl DepartureWindow {
    /// Bucket an hour of day. Off-hours fold into the nearest window:
    /// 0-4 count as early morning, 23 as late evening.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=7 => DepartureWindow::EarlyMorning,
            8..=11 => DepartureWindow::Morning,
            12..=15 => DepartureWindow::Afternoon,
            16..=19 => DepartureWindow::Evening,
            20..=23 => DepartureWindow::LateEvening,
            _ => DepartureWindow::EarlyMorning,
        }
    }

    fn position(self) -> i8 {
        match self {
            DepartureWindow::EarlyMorning => 0,
            DepartureWindow::Morning => 1,
            DepartureWindow::Afternoon => 2,
            DepartureWindow::Evening => 3,
            DepartureWindow::LateEvening => 4,
        }
    }

    pub fn is_adjacent(self, other: Self) -> bool {
        (self.position() - other.position()).abs() == 1
    }

    pub fn label(self) -> &'static str {
        match self {
            DepartureWindow::EarlyMorning => "early morning",
            DepartureWindow::Morning => "morning",
            DepartureWindow::Afternoon => "afternoon",
            DepartureWindow::Evening => "evening",
            DepartureWindow::LateEvening => "late evening",
        }
    }
}

/// How well the engine knows a traveler on a given route. Gates how
/// assertive recommendations are allowed to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FamiliarityLevel {
    Discovery,
    Learning,
    Autopilot,
}

impl FamiliarityLevel {
    pub fn from_times_booked(times_booked: u32) -> Self {
        match times_booked {
            0..=2 => FamiliarityLevel::Discovery,
            3..=5 => FamiliarityLevel::Learning,
            _ => FamiliarityLevel::Autopilot,
        }
    }
}

/// Per (user, route) aggregate, recomputed in full from the route's
/// pattern rows on every learn call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteFamiliarity {
    pub route: String,
    pub times_booked: u32,
    pub last_booked: Option<DateTime<Utc>>,
    pub avg_price_paid: f64,
    pub min_price_paid: f64,
    pub max_price_paid: f64,
    pub preferred_airline_code: Option<String>,
    pub preferred_airline_name: Option<String>,
    pub preferred_flight_number: Option<String>,
    pub preferred_window: Option<DepartureWindow>,
    pub avg_days_before_departure: f64,
    pub level: FamiliarityLevel,
}

/// One entry in the ranked preferred-airline list. Scores are recency
/// weighted and normalized so the top airline is 1.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirlinePreference {
    pub code: String,
    pub name: String,
    pub score: f64,
}

/// Global per-user aggregate, recomputed from the most recent booking
/// patterns across all routes.
///
/// `window_by_weekday` is indexed by `Weekday::num_days_from_monday`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPreferences {
    pub home_airport: Option<String>,
    pub airlines: Vec<AirlinePreference>,
    pub window_by_weekday: [Option<DepartureWindow>; 7],
    pub preferred_seat: Option<String>,
    pub preferred_cabin: Option<CabinClass>,
    pub meal_preference: Option<String>,
    pub checked_bags: Option<u32>,
    /// 0 = always picks the cheapest, 1 = price-insensitive.
    pub price_sensitivity: f64,
    pub avg_advance_days: f64,
    pub communication_style: String,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            home_airport: None,
            airlines: Vec::new(),
            window_by_weekday: [None; 7],
            preferred_seat: None,
            preferred_cabin: None,
            meal_preference: None,
            checked_bags: None,
            price_sensitivity: 0.5,
            avg_advance_days: 0.0,
            communication_style: "standard".to_string(),
        }
    }
}

/// Per-component score breakdown, kept for explainability. The fields
/// sum to the unclamped total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub airline: f64,
    pub time_window: f64,
    pub price: f64,
    pub exact_flight: f64,
    pub seat: f64,
}

impl ScoreBreakdown {
    pub fn sum(&self) -> f64 {
        self.airline + self.time_window + self.price + self.exact_flight + self.seat
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OfferScore {
    pub total: f64,
    pub breakdown: ScoreBreakdown,
}

impl OfferScore {
    pub fn from_breakdown(breakdown: ScoreBreakdown) -> Self {
        Self {
            total: breakdown.sum().clamp(0.0, 100.0),
            breakdown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_bucketing_edges() {
        assert_eq!(DepartureWindow::from_hour(5), DepartureWindow::EarlyMorning);
        assert_eq!(DepartureWindow::from_hour(7), DepartureWindow::EarlyMorning);
        assert_eq!(DepartureWindow::from_hour(8), DepartureWindow::Morning);
        assert_eq!(DepartureWindow::from_hour(11), DepartureWindow::Morning);
        assert_eq!(DepartureWindow::from_hour(12), DepartureWindow::Afternoon);
        assert_eq!(DepartureWindow::from_hour(16), DepartureWindow::Evening);
        assert_eq!(DepartureWindow::from_hour(20), DepartureWindow::LateEvening);
        assert_eq!(DepartureWindow::from_hour(23), DepartureWindow::LateEvening);
        // Small hours fold into early morning
        assert_eq!(DepartureWindow::from_hour(0), DepartureWindow::EarlyMorning);
        assert_eq!(DepartureWindow::from_hour(4), DepartureWindow::EarlyMorning);
    }

    #[test]
    fn test_window_adjacency() {
        assert!(DepartureWindow::Morning.is_adjacent(DepartureWindow::EarlyMorning));
        assert!(DepartureWindow::Morning.is_adjacent(DepartureWindow::Afternoon));
        assert!(!DepartureWindow::Morning.is_adjacent(DepartureWindow::Morning));
        assert!(!DepartureWindow::EarlyMorning.is_adjacent(DepartureWindow::LateEvening));
    }

    #[test]
    fn test_familiarity_thresholds() {
        assert_eq!(FamiliarityLevel::from_times_booked(0), FamiliarityLevel::Discovery);
        assert_eq!(FamiliarityLevel::from_times_booked(2), FamiliarityLevel::Discovery);
        assert_eq!(FamiliarityLevel::from_times_booked(3), FamiliarityLevel::Learning);
        assert_eq!(FamiliarityLevel::from_times_booked(5), FamiliarityLevel::Learning);
        assert_eq!(FamiliarityLevel::from_times_booked(6), FamiliarityLevel::Autopilot);
        assert_eq!(FamiliarityLevel::from_times_booked(40), FamiliarityLevel::Autopilot);
    }

    #[test]
    fn test_score_clamped_breakdown_preserved() {
        let breakdown = ScoreBreakdown {
            airline: 30.0,
            time_window: 25.0,
            price: 25.0,
            exact_flight: 10.0,
            seat: 10.0,
        };
        // Weights sum to 100 at most, but keep the clamp honest
        let score = OfferScore::from_breakdown(ScoreBreakdown {
            airline: 60.0,
            ..breakdown
        });
        assert_eq!(score.total, 100.0);
        assert_eq!(score.breakdown.airline, 60.0);
    }
}
