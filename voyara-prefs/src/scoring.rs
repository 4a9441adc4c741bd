use chrono::{Datelike, Timelike};

use voyara_core::FlightOffer;

use crate::model::{DepartureWindow, OfferScore, RouteFamiliarity, ScoreBreakdown, UserPreferences};

const AIRLINE_TOP: f64 = 30.0;
const AIRLINE_SECOND: f64 = 20.0;
const AIRLINE_KNOWN: f64 = 10.0;
const AIRLINE_BASELINE: f64 = 5.0;

const WINDOW_EXACT: f64 = 25.0;
const WINDOW_ADJACENT: f64 = 15.0;
const WINDOW_NEUTRAL: f64 = 12.0;

const PRICE_GOOD: f64 = 25.0;
const PRICE_FAIR: f64 = 15.0;
const PRICE_POOR: f64 = 5.0;
const PRICE_BASELINE: f64 = 15.0;
const PRICE_FAIR_RATIO: f64 = 1.2;

const FLIGHT_EXACT: f64 = 10.0;
const FLIGHT_SAME_AIRLINE: f64 = 5.0;

const SEAT_FAMILIAR: f64 = 7.0;
const SEAT_DEFAULT: f64 = 3.0;

const DEFAULT_SENSITIVITY: f64 = 0.5;

/// Score one offer against what has been learned. Pure: both aggregates
/// are optional and every component degrades to a neutral baseline when
/// its data is missing.
pub fn score_offer(
    offer: &FlightOffer,
    prefs: Option<&UserPreferences>,
    route: Option<&RouteFamiliarity>,
) -> OfferScore {
    let Some(first) = offer.first_segment() else {
        return OfferScore::from_breakdown(ScoreBreakdown {
            airline: AIRLINE_BASELINE,
            time_window: WINDOW_NEUTRAL,
            price: PRICE_BASELINE,
            exact_flight: 0.0,
            seat: SEAT_DEFAULT,
        });
    };

    let ranked = prefs.map(|p| p.airlines.as_slice()).unwrap_or(&[]);
    let airline = match ranked.iter().position(|a| a.code == first.airline_code) {
        Some(0) => AIRLINE_TOP,
        Some(1) => AIRLINE_SECOND,
        Some(_) => AIRLINE_KNOWN,
        None => AIRLINE_BASELINE,
    };

    // Weekday-specific preference wins over the route aggregate.
    let offer_window = DepartureWindow::from_hour(first.departure.at.hour());
    let weekday = first.departure.at.weekday().num_days_from_monday() as usize;
    let preferred_window = prefs
        .and_then(|p| p.window_by_weekday[weekday])
        .or_else(|| route.and_then(|r| r.preferred_window));
    let time_window = match preferred_window {
        Some(w) if w == offer_window => WINDOW_EXACT,
        Some(w) if w.is_adjacent(offer_window) => WINDOW_ADJACENT,
        Some(_) => 0.0,
        None => WINDOW_NEUTRAL,
    };

    let price = match route.filter(|r| r.times_booked > 0 && r.avg_price_paid > 0.0) {
        Some(r) => {
            let ratio = offer.price.total / r.avg_price_paid;
            let raw = if ratio <= 1.0 {
                PRICE_GOOD
            } else if ratio <= PRICE_FAIR_RATIO {
                PRICE_FAIR
            } else {
                PRICE_POOR
            };
            let sensitivity = prefs
                .map(|p| p.price_sensitivity)
                .unwrap_or(DEFAULT_SENSITIVITY);
            raw * (0.5 + (1.0 - sensitivity) * 0.5)
        }
        None => PRICE_BASELINE,
    };

    let preferred_airline = route
        .and_then(|r| r.preferred_airline_code.as_deref())
        .or_else(|| ranked.first().map(|a| a.code.as_str()));
    let same_airline = preferred_airline == Some(first.airline_code.as_str());

    let exact_flight = if route.and_then(|r| r.preferred_flight_number.as_deref())
        == Some(first.flight_number.as_str())
    {
        FLIGHT_EXACT
    } else if same_airline {
        FLIGHT_SAME_AIRLINE
    } else {
        0.0
    };

    let seat = if same_airline { SEAT_FAMILIAR } else { SEAT_DEFAULT };

    OfferScore::from_breakdown(ScoreBreakdown {
        airline,
        time_window,
        price,
        exact_flight,
        seat,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AirlinePreference, FamiliarityLevel};
    use chrono::{TimeZone, Utc};
    use voyara_core::{CabinClass, FlightStop, PriceBreakdown, Segment};

    fn offer(airline_code: &str, flight_number: &str, hour: u32, total: f64) -> FlightOffer {
        // 2026-09-14 is a Monday
        let departs = Utc.with_ymd_and_hms(2026, 9, 14, hour, 10, 0).unwrap();
        let segment = Segment {
            airline_name: airline_code.to_string(),
            airline_code: airline_code.to_string(),
            flight_number: flight_number.to_string(),
            departure: FlightStop {
                airport_code: "BLR".to_string(),
                airport_name: None,
                at: departs,
                terminal: None,
            },
            arrival: FlightStop {
                airport_code: "DEL".to_string(),
                airport_name: None,
                at: departs + chrono::Duration::minutes(160),
                terminal: None,
            },
            duration: "PT2H40M".to_string(),
            cabin: CabinClass::Economy,
            aircraft: None,
        };
        FlightOffer::new(
            "mock",
            "o1",
            vec![segment],
            1,
            "PT2H40M".to_string(),
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

    fn prefs(airlines: &[(&str, f64)], sensitivity: f64) -> UserPreferences {
        UserPreferences {
            airlines: airlines
                .iter()
                .map(|(code, score)| AirlinePreference {
                    code: code.to_string(),
                    name: code.to_string(),
                    score: *score,
                })
                .collect(),
            price_sensitivity: sensitivity,
            ..UserPreferences::default()
        }
    }

    fn route(avg: f64, airline: &str, flight: &str, window: DepartureWindow) -> RouteFamiliarity {
        RouteFamiliarity {
            route: "BLR-DEL".to_string(),
            times_booked: 6,
            last_booked: None,
            avg_price_paid: avg,
            min_price_paid: avg * 0.9,
            max_price_paid: avg * 1.1,
            preferred_airline_code: Some(airline.to_string()),
            preferred_airline_name: Some(airline.to_string()),
            preferred_flight_number: Some(flight.to_string()),
            preferred_window: Some(window),
            avg_days_before_departure: 10.0,
            level: FamiliarityLevel::Autopilot,
        }
    }

    #[test]
    fn test_no_data_is_neutral() {
        let score = score_offer(&offer("6E", "6E204", 6, 4500.0), None, None);
        assert_eq!(score.breakdown.airline, 5.0);
        assert_eq!(score.breakdown.time_window, 12.0);
        assert_eq!(score.breakdown.price, 15.0);
        assert_eq!(score.breakdown.exact_flight, 0.0);
        assert_eq!(score.breakdown.seat, 3.0);
        assert_eq!(score.total, score.breakdown.sum());
    }

    #[test]
    fn test_full_match_scores_high() {
        let p = prefs(&[("6E", 1.0), ("AI", 0.6)], 0.0);
        let mut r = route(5000.0, "6E", "6E204", DepartureWindow::EarlyMorning);
        // Exact airline, exact window, under average, exact flight
        let score = score_offer(&offer("6E", "6E204", 6, 4500.0), Some(&p), Some(&r));
        assert_eq!(score.breakdown.airline, 30.0);
        assert_eq!(score.breakdown.time_window, 25.0);
        assert_eq!(score.breakdown.price, 25.0);
        assert_eq!(score.breakdown.exact_flight, 10.0);
        assert_eq!(score.breakdown.seat, 7.0);
        assert_eq!(score.total, 97.0);

        // Second-ranked airline, no exact flight
        r.preferred_airline_code = Some("AI".to_string());
        r.preferred_flight_number = Some("AI501".to_string());
        let score = score_offer(&offer("AI", "AI707", 6, 4500.0), Some(&p), Some(&r));
        assert_eq!(score.breakdown.airline, 20.0);
        assert_eq!(score.breakdown.exact_flight, 5.0);
        assert_eq!(score.breakdown.seat, 7.0);
    }

    #[test]
    fn test_score_bounds_and_breakdown_sum() {
        let p = prefs(&[("6E", 1.0)], 0.0);
        let r = route(5000.0, "6E", "6E204", DepartureWindow::EarlyMorning);
        for (code, flight, hour, total) in [
            ("6E", "6E204", 6, 4500.0),
            ("AI", "AI501", 13, 9000.0),
            ("BA", "BA118", 22, 5100.0),
        ] {
            let score = score_offer(&offer(code, flight, hour, total), Some(&p), Some(&r));
            assert!(score.total >= 0.0 && score.total <= 100.0);
            assert_eq!(score.total, score.breakdown.sum().clamp(0.0, 100.0));
        }
    }

    #[test]
    fn test_adjacent_window_partial_credit() {
        let r = route(5000.0, "6E", "6E204", DepartureWindow::EarlyMorning);
        // Morning is adjacent to early morning
        let score = score_offer(&offer("6E", "6E204", 9, 4500.0), None, Some(&r));
        assert_eq!(score.breakdown.time_window, 15.0);
        // Afternoon is two positions away
        let score = score_offer(&offer("6E", "6E204", 13, 4500.0), None, Some(&r));
        assert_eq!(score.breakdown.time_window, 0.0);
    }

    #[test]
    fn test_weekday_window_overrides_route_aggregate() {
        let mut p = prefs(&[], 0.5);
        // Monday preference says evening even though the route says mornings
        p.window_by_weekday[0] = Some(DepartureWindow::Evening);
        let r = route(5000.0, "6E", "6E204", DepartureWindow::EarlyMorning);
        let score = score_offer(&offer("6E", "6E204", 18, 4500.0), Some(&p), Some(&r));
        assert_eq!(score.breakdown.time_window, 25.0);
    }

    #[test]
    fn test_price_sensitivity_rescales() {
        let r = route(5000.0, "6E", "6E204", DepartureWindow::EarlyMorning);
        // Cheapest-always traveler gets the full swing
        let eager = prefs(&[], 0.0);
        let score = score_offer(&offer("6E", "6E204", 6, 4500.0), Some(&eager), Some(&r));
        assert_eq!(score.breakdown.price, 25.0);

        // Price-insensitive traveler is pulled to half
        let relaxed = prefs(&[], 1.0);
        let score = score_offer(&offer("6E", "6E204", 6, 4500.0), Some(&relaxed), Some(&r));
        assert_eq!(score.breakdown.price, 12.5);

        // Ratio branches: 1.1 is fair, 1.5 is poor
        let score = score_offer(&offer("6E", "6E204", 6, 5500.0), Some(&eager), Some(&r));
        assert_eq!(score.breakdown.price, 15.0);
        let score = score_offer(&offer("6E", "6E204", 6, 7500.0), Some(&eager), Some(&r));
        assert_eq!(score.breakdown.price, 5.0);
    }
}
