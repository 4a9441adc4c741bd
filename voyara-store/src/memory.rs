use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use voyara_prefs::store::{PatternStore, StoreError};
use voyara_prefs::{BookingData, RouteFamiliarity, UserPreferences};

/// In-memory pattern store. Pattern rows are kept per user in append
/// order; route and recency reads are whole-list scans, which is fine
/// at per-user booking volumes.
#[derive(Default)]
pub struct MemoryPatternStore {
    patterns: RwLock<HashMap<String, Vec<BookingData>>>,
    familiarity: RwLock<HashMap<(String, String), RouteFamiliarity>>,
    preferences: RwLock<HashMap<String, UserPreferences>>,
}

impl MemoryPatternStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PatternStore for MemoryPatternStore {
    async fn append_pattern(&self, user_id: &str, booking: &BookingData) -> Result<(), StoreError> {
        self.patterns
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .push(booking.clone());
        Ok(())
    }

    async fn patterns_for_route(
        &self,
        user_id: &str,
        route: &str,
    ) -> Result<Vec<BookingData>, StoreError> {
        let patterns = self.patterns.read().await;
        Ok(patterns
            .get(user_id)
            .map(|rows| {
                rows.iter()
                    .filter(|r| r.route == route)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn recent_patterns(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<BookingData>, StoreError> {
        let patterns = self.patterns.read().await;
        Ok(patterns
            .get(user_id)
            .map(|rows| rows.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn put_route_familiarity(
        &self,
        user_id: &str,
        data: &RouteFamiliarity,
    ) -> Result<(), StoreError> {
        self.familiarity
            .write()
            .await
            .insert((user_id.to_string(), data.route.clone()), data.clone());
        Ok(())
    }

    async fn get_route_familiarity(
        &self,
        user_id: &str,
        route: &str,
    ) -> Result<Option<RouteFamiliarity>, StoreError> {
        let familiarity = self.familiarity.read().await;
        Ok(familiarity
            .get(&(user_id.to_string(), route.to_string()))
            .cloned())
    }

    async fn put_preferences(
        &self,
        user_id: &str,
        prefs: &UserPreferences,
    ) -> Result<(), StoreError> {
        self.preferences
            .write()
            .await
            .insert(user_id.to_string(), prefs.clone());
        Ok(())
    }

    async fn get_preferences(&self, user_id: &str) -> Result<Option<UserPreferences>, StoreError> {
        Ok(self.preferences.read().await.get(user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{Datelike, TimeZone, Utc};
    use voyara_core::{CabinClass, FlightOffer, FlightStop, PriceBreakdown, Segment};
    use voyara_prefs::{
        generate_price_insight, DepartureWindow, FamiliarityLevel, PreferenceEngine,
    };

    fn booking(route: &str, airline: (&str, &str), flight: &str, day: u32, hour: u32, price: f64) -> BookingData {
        let departure = Utc.with_ymd_and_hms(2026, 9, day, hour, 15, 0).unwrap();
        BookingData {
            route: route.to_string(),
            airline_code: airline.0.to_string(),
            airline_name: airline.1.to_string(),
            flight_number: flight.to_string(),
            departure_time: departure,
            arrival_time: departure + chrono::Duration::minutes(150),
            day_of_week: departure.weekday(),
            price,
            currency: "INR".to_string(),
            cabin: CabinClass::Economy,
            seat: Some("12A".to_string()),
            days_before_departure: 10,
        }
    }

    fn offer(airline: &str, flight: &str, hour: u32, total: f64) -> FlightOffer {
        let departs = Utc.with_ymd_and_hms(2026, 10, 5, hour, 0, 0).unwrap();
        let segment = Segment {
            airline_name: airline.to_string(),
            airline_code: airline.to_string(),
            flight_number: flight.to_string(),
            departure: FlightStop {
                airport_code: "BLR".to_string(),
                airport_name: None,
                at: departs,
                terminal: None,
            },
            arrival: FlightStop {
                airport_code: "DEL".to_string(),
                airport_name: None,
                at: departs + chrono::Duration::minutes(150),
                terminal: None,
            },
            duration: "PT2H30M".to_string(),
            cabin: CabinClass::Economy,
            aircraft: None,
        };
        FlightOffer::new(
            "mock",
            flight,
            vec![segment],
            1,
            "PT2H30M".to_string(),
            PriceBreakdown {
                base_fare: total * 0.8,
                taxes_and_fees: total * 0.2,
                total,
                currency: "INR".to_string(),
                markup: None,
                service_fee: None,
            },
        )
    }

    fn engine() -> PreferenceEngine {
        PreferenceEngine::new(Arc::new(MemoryPatternStore::new()))
    }

    #[tokio::test]
    async fn test_recent_patterns_newest_first() {
        let store = MemoryPatternStore::new();
        store.append_pattern("u1", &booking("BLR-DEL", ("6E", "IndiGo"), "6E204", 7, 6, 4500.0)).await.unwrap();
        store.append_pattern("u1", &booking("BLR-BOM", ("AI", "Air India"), "AI501", 9, 18, 3800.0)).await.unwrap();

        let recent = store.recent_patterns("u1", 10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].route, "BLR-BOM");

        let limited = store.recent_patterns("u1", 1).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].route, "BLR-BOM");

        let route_rows = store.patterns_for_route("u1", "BLR-DEL").await.unwrap();
        assert_eq!(route_rows.len(), 1);
        assert!(store.recent_patterns("ghost", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_familiarity_thresholds_as_bookings_accumulate() {
        let engine = engine();
        for i in 0..2 {
            engine
                .learn_from_booking("u1", booking("BLR-DEL", ("6E", "IndiGo"), "6E204", 7 + i, 6, 4500.0))
                .await
                .unwrap();
        }
        let data = engine.get_route_familiarity("u1", "BLR-DEL").await.unwrap().unwrap();
        assert_eq!(data.level, FamiliarityLevel::Discovery);

        engine
            .learn_from_booking("u1", booking("BLR-DEL", ("6E", "IndiGo"), "6E204", 10, 6, 4700.0))
            .await
            .unwrap();
        let data = engine.get_route_familiarity("u1", "BLR-DEL").await.unwrap().unwrap();
        assert_eq!(data.times_booked, 3);
        assert_eq!(data.level, FamiliarityLevel::Learning);

        for i in 0..3 {
            engine
                .learn_from_booking("u1", booking("BLR-DEL", ("6E", "IndiGo"), "6E204", 11 + i, 6, 4600.0))
                .await
                .unwrap();
        }
        let data = engine.get_route_familiarity("u1", "BLR-DEL").await.unwrap().unwrap();
        assert_eq!(data.times_booked, 6);
        assert_eq!(data.level, FamiliarityLevel::Autopilot);
    }

    #[tokio::test]
    async fn test_relearning_same_history_keeps_modes_stable() {
        let engine = engine();
        let history = vec![
            booking("BLR-DEL", ("6E", "IndiGo"), "6E204", 7, 6, 4500.0),
            booking("BLR-DEL", ("6E", "IndiGo"), "6E204", 14, 6, 5500.0),
            booking("BLR-DEL", ("AI", "Air India"), "AI501", 21, 18, 5000.0),
        ];
        for row in &history {
            engine.learn_from_booking("u1", row.clone()).await.unwrap();
        }
        let first = engine.get_route_familiarity("u1", "BLR-DEL").await.unwrap().unwrap();

        // The same history again doubles the count but leaves every
        // aggregate untouched
        for row in &history {
            engine.learn_from_booking("u1", row.clone()).await.unwrap();
        }
        let second = engine.get_route_familiarity("u1", "BLR-DEL").await.unwrap().unwrap();

        assert_eq!(second.times_booked, first.times_booked * 2);
        assert_eq!(second.avg_price_paid, first.avg_price_paid);
        assert_eq!(second.min_price_paid, first.min_price_paid);
        assert_eq!(second.preferred_airline_code, first.preferred_airline_code);
        assert_eq!(second.preferred_flight_number, first.preferred_flight_number);
        assert_eq!(second.preferred_window, first.preferred_window);
        assert_eq!(second.level, FamiliarityLevel::Autopilot);
    }

    #[tokio::test]
    async fn test_preferences_learned_across_routes() {
        let engine = engine();
        engine.learn_from_booking("u1", booking("BLR-DEL", ("AI", "Air India"), "AI501", 7, 18, 5000.0)).await.unwrap();
        engine.learn_from_booking("u1", booking("BLR-BOM", ("6E", "IndiGo"), "6E331", 9, 6, 3200.0)).await.unwrap();
        engine.learn_from_booking("u1", booking("BLR-DEL", ("6E", "IndiGo"), "6E204", 14, 6, 4500.0)).await.unwrap();

        let prefs = engine.get_preferences("u1").await.unwrap().unwrap();
        // 6E holds ranks 0 and 1 of the recency ordering
        assert_eq!(prefs.airlines[0].code, "6E");
        assert_eq!(prefs.airlines[0].score, 1.0);
        assert_eq!(prefs.home_airport.as_deref(), Some("BLR"));
        let monday = 0;
        assert_eq!(prefs.window_by_weekday[monday], Some(DepartureWindow::EarlyMorning));
        assert!(prefs.price_sensitivity > 0.0 && prefs.price_sensitivity <= 1.0);
    }

    #[tokio::test]
    async fn test_recommendation_gated_by_familiarity() {
        let engine = engine();
        let offers = vec![
            offer("6E", "6E204", 6, 4500.0),
            offer("AI", "AI501", 9, 4800.0),
            offer("BA", "BA118", 13, 5200.0),
            offer("LH", "LH755", 16, 6100.0),
            offer("EK", "EK565", 20, 5900.0),
            offer("6E", "6E218", 21, 4400.0),
        ];

        // No history: discovery, five offers, no commentary
        let rec = engine.get_recommendation("u1", "BLR-DEL", offers.clone()).await.unwrap();
        assert_eq!(rec.level, FamiliarityLevel::Discovery);
        assert_eq!(rec.offers.len(), 5);
        assert!(rec.message.is_none());

        // Four bookings: learning, three offers, airline sentence
        for day in [1, 2, 3, 4] {
            engine.learn_from_booking("u1", booking("BLR-DEL", ("6E", "IndiGo"), "6E204", day, 6, 4500.0)).await.unwrap();
        }
        let rec = engine.get_recommendation("u1", "BLR-DEL", offers.clone()).await.unwrap();
        assert_eq!(rec.level, FamiliarityLevel::Learning);
        assert_eq!(rec.offers.len(), 3);
        assert!(rec.message.as_deref().unwrap().contains("IndiGo"));

        // Seven bookings: autopilot, single best offer, times-booked sentence
        for day in [5, 6, 7] {
            engine.learn_from_booking("u1", booking("BLR-DEL", ("6E", "IndiGo"), "6E204", day, 6, 4500.0)).await.unwrap();
        }
        let rec = engine.get_recommendation("u1", "BLR-DEL", offers).await.unwrap();
        assert_eq!(rec.level, FamiliarityLevel::Autopilot);
        assert_eq!(rec.offers.len(), 1);
        assert!(rec.message.as_deref().unwrap().contains("7 times"));
        // The learned airline and flight should rank on top
        let top = rec.offers[0].offer.first_segment().unwrap();
        assert_eq!(top.flight_number, "6E204");
    }

    #[tokio::test]
    async fn test_price_insight_against_learned_history() {
        let engine = engine();
        engine.learn_from_booking("u1", booking("BLR-DEL", ("6E", "IndiGo"), "6E204", 7, 6, 4500.0)).await.unwrap();
        engine.learn_from_booking("u1", booking("BLR-DEL", ("6E", "IndiGo"), "6E204", 14, 6, 5500.0)).await.unwrap();

        let data = engine.get_route_familiarity("u1", "BLR-DEL").await.unwrap();
        assert_eq!(data.as_ref().unwrap().avg_price_paid, 5000.0);

        let lowest = generate_price_insight(4500.0, data.as_ref()).unwrap();
        assert!(lowest.contains("lowest price"));
        let above = generate_price_insight(5600.0, data.as_ref()).unwrap();
        assert!(above.contains("more than you usually pay"));
        let average = generate_price_insight(5020.0, data.as_ref()).unwrap();
        assert!(average.contains("About average"));
    }
}
