use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use chrono::Timelike;
use tracing::debug;

use crate::model::{
    AirlinePreference, BookingData, DepartureWindow, FamiliarityLevel, RouteFamiliarity,
    UserPreferences,
};
use crate::store::{PatternStore, PrefError};

/// How many of the user's most recent patterns feed the global
/// preference rebuild.
pub(crate) const RECENT_WINDOW: usize = 20;

/// Offset added to the price-sensitivity heuristic so travelers who
/// consistently book near their route minimum still land below 0.5.
const SENSITIVITY_OFFSET: f64 = 0.3;

const DEFAULT_SENSITIVITY: f64 = 0.5;

/// Learns from booking events and rebuilds the per-route and global
/// aggregates. Recompute-from-scratch on every learn call: idempotent
/// given the same history, at the cost of re-reading the route's rows.
pub struct PreferenceEngine {
    pub(crate) store: Arc<dyn PatternStore>,
}

impl PreferenceEngine {
    pub fn new(store: Arc<dyn PatternStore>) -> Self {
        Self { store }
    }

    /// Record one booking and rebuild both aggregates from the stored
    /// history. The appended row is part of the history it aggregates.
    pub async fn learn_from_booking(
        &self,
        user_id: &str,
        booking: BookingData,
    ) -> Result<(), PrefError> {
        self.store.append_pattern(user_id, &booking).await?;

        let rows = self.store.patterns_for_route(user_id, &booking.route).await?;
        let familiarity = build_route_familiarity(&booking.route, &rows);
        debug!(
            route = %booking.route,
            times_booked = familiarity.times_booked,
            level = ?familiarity.level,
            "route familiarity rebuilt"
        );
        self.store.put_route_familiarity(user_id, &familiarity).await?;

        let recent = self.store.recent_patterns(user_id, RECENT_WINDOW).await?;
        let prefs = build_preferences(&recent);
        self.store.put_preferences(user_id, &prefs).await?;
        Ok(())
    }

    pub async fn get_preferences(&self, user_id: &str) -> Result<Option<UserPreferences>, PrefError> {
        Ok(self.store.get_preferences(user_id).await?)
    }

    pub async fn get_route_familiarity(
        &self,
        user_id: &str,
        route: &str,
    ) -> Result<Option<RouteFamiliarity>, PrefError> {
        Ok(self.store.get_route_familiarity(user_id, route).await?)
    }
}

/// Statistical mode with a deterministic tie-break: the value that
/// reached the maximum count first wins.
pub(crate) fn mode<T, I>(values: I) -> Option<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut order: Vec<T> = Vec::new();
    let mut counts: HashMap<T, usize> = HashMap::new();
    for value in values {
        let entry = counts.entry(value.clone()).or_insert(0);
        if *entry == 0 {
            order.push(value);
        }
        *entry += 1;
    }

    let mut best: Option<(T, usize)> = None;
    for value in order {
        let count = counts[&value];
        match &best {
            Some((_, best_count)) if count <= *best_count => {}
            _ => best = Some((value, count)),
        }
    }
    best.map(|(value, _)| value)
}

/// Rebuild the (user, route) aggregate from every stored row for the
/// route.
pub(crate) fn build_route_familiarity(route: &str, rows: &[BookingData]) -> RouteFamiliarity {
    let times_booked = rows.len() as u32;
    if rows.is_empty() {
        return RouteFamiliarity {
            route: route.to_string(),
            times_booked: 0,
            last_booked: None,
            avg_price_paid: 0.0,
            min_price_paid: 0.0,
            max_price_paid: 0.0,
            preferred_airline_code: None,
            preferred_airline_name: None,
            preferred_flight_number: None,
            preferred_window: None,
            avg_days_before_departure: 0.0,
            level: FamiliarityLevel::Discovery,
        };
    }

    let total: f64 = rows.iter().map(|r| r.price).sum();
    let min = rows.iter().map(|r| r.price).fold(f64::INFINITY, f64::min);
    let max = rows.iter().map(|r| r.price).fold(f64::NEG_INFINITY, f64::max);

    let preferred_airline_code = mode(rows.iter().map(|r| r.airline_code.clone()));
    let preferred_airline_name = preferred_airline_code.as_ref().and_then(|code| {
        rows.iter()
            .find(|r| &r.airline_code == code)
            .map(|r| r.airline_name.clone())
    });

    RouteFamiliarity {
        route: route.to_string(),
        times_booked,
        last_booked: rows.iter().map(|r| r.booked_at()).max(),
        avg_price_paid: total / rows.len() as f64,
        min_price_paid: min,
        max_price_paid: max,
        preferred_airline_code,
        preferred_airline_name,
        preferred_flight_number: mode(rows.iter().map(|r| r.flight_number.clone())),
        preferred_window: mode(
            rows.iter()
                .map(|r| DepartureWindow::from_hour(r.departure_time.hour())),
        ),
        avg_days_before_departure: rows
            .iter()
            .map(|r| r.days_before_departure as f64)
            .sum::<f64>()
            / rows.len() as f64,
        level: FamiliarityLevel::from_times_booked(times_booked),
    }
}

/// Rebuild the global preference profile from the user's most recent
/// rows, newest first. Airline scores decay as `1/(rank+1)` and are
/// normalized so the top airline is 1.0.
pub(crate) fn build_preferences(recent: &[BookingData]) -> UserPreferences {
    if recent.is_empty() {
        return UserPreferences::default();
    }
    let rows = &recent[..recent.len().min(RECENT_WINDOW)];

    let mut weights: HashMap<&str, (&str, f64)> = HashMap::new();
    for (rank, row) in rows.iter().enumerate() {
        let weight = 1.0 / (rank as f64 + 1.0);
        weights
            .entry(&row.airline_code)
            .or_insert((&row.airline_name, 0.0))
            .1 += weight;
    }
    let top = weights
        .values()
        .map(|(_, w)| *w)
        .fold(f64::NEG_INFINITY, f64::max);
    let mut airlines: Vec<AirlinePreference> = weights
        .into_iter()
        .map(|(code, (name, weight))| AirlinePreference {
            code: code.to_string(),
            name: name.to_string(),
            score: weight / top,
        })
        .collect();
    airlines.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.code.cmp(&b.code))
    });

    let mut window_by_weekday: [Option<DepartureWindow>; 7] = [None; 7];
    for (slot, window) in window_by_weekday.iter_mut().enumerate() {
        *window = mode(
            rows.iter()
                .filter(|r| r.day_of_week.num_days_from_monday() as usize == slot)
                .map(|r| DepartureWindow::from_hour(r.departure_time.hour())),
        );
    }

    let avg_price: f64 = rows.iter().map(|r| r.price).sum::<f64>() / rows.len() as f64;
    let min_price = rows.iter().map(|r| r.price).fold(f64::INFINITY, f64::min);
    let price_sensitivity = if avg_price > 0.0 {
        (1.0 - min_price / avg_price + SENSITIVITY_OFFSET).clamp(0.0, 1.0)
    } else {
        DEFAULT_SENSITIVITY
    };

    UserPreferences {
        home_airport: mode(
            rows.iter()
                .filter_map(|r| r.route.split('-').next().map(str::to_string)),
        ),
        airlines,
        window_by_weekday,
        preferred_seat: mode(rows.iter().filter_map(|r| r.seat.clone())),
        preferred_cabin: mode(rows.iter().map(|r| r.cabin)),
        meal_preference: None,
        checked_bags: None,
        price_sensitivity,
        avg_advance_days: rows
            .iter()
            .map(|r| r.days_before_departure as f64)
            .sum::<f64>()
            / rows.len() as f64,
        communication_style: "standard".to_string(),
    }
}
