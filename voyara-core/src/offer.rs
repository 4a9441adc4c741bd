use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::policy::PolicyOfferView;
use crate::search::CabinClass;

/// One endpoint of a segment (departure or arrival).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightStop {
    pub airport_code: String,
    pub airport_name: Option<String>,
    pub at: DateTime<Utc>,
    pub terminal: Option<String>,
}

/// One physical flight (single takeoff and landing) within a slice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub airline_name: String,
    pub airline_code: String,
    pub flight_number: String,
    pub departure: FlightStop,
    pub arrival: FlightStop,
    /// ISO-8601 duration as reported by the supplier, e.g. `PT2H30M`.
    pub duration: String,
    pub cabin: CabinClass,
    pub aircraft: Option<String>,
}

/// Fare amounts in the offer currency.
///
/// `markup` and `service_fee` are filled in by the external pricing
/// collaborator; once applied, `total >= base_fare + taxes_and_fees`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub base_fare: f64,
    pub taxes_and_fees: f64,
    pub total: f64,
    pub currency: String,
    pub markup: Option<f64>,
    pub service_fee: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conditions {
    pub refundable: bool,
    pub changeable: bool,
    pub change_fee: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaggageAllowance {
    pub checked_bags: u32,
    pub cabin_bags: u32,
}

/// One bookable itinerary from one supplier, in canonical form.
///
/// Constructed fresh on every search call and never mutated afterwards.
/// The id is prefixed with the supplier name so ids from different
/// backends can never collide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightOffer {
    pub id: String,
    pub supplier: String,
    pub supplier_offer_id: String,
    pub segments: Vec<Segment>,
    pub slice_count: usize,
    pub total_duration: String,
    pub stops: u32,
    pub price: PriceBreakdown,
    pub seats_remaining: Option<u32>,
    pub expires_at: Option<DateTime<Utc>>,
    pub conditions: Option<Conditions>,
    pub baggage: Option<BaggageAllowance>,
}

impl FlightOffer {
    /// Assemble a canonical offer, deriving the prefixed id and the stop
    /// count (`segments - slices`, never negative).
    pub fn new(
        supplier: &str,
        supplier_offer_id: &str,
        segments: Vec<Segment>,
        slice_count: usize,
        total_duration: String,
        price: PriceBreakdown,
    ) -> Self {
        let stops = segments.len().saturating_sub(slice_count) as u32;
        Self {
            id: format!("{}-{}", supplier, supplier_offer_id),
            supplier: supplier.to_string(),
            supplier_offer_id: supplier_offer_id.to_string(),
            segments,
            slice_count,
            total_duration,
            stops,
            price,
            seats_remaining: None,
            expires_at: None,
            conditions: None,
            baggage: None,
        }
    }

    /// Supplier-declared expiry; expired offers must be re-validated
    /// through `get_offer_details` before booking.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(at) => Utc::now() > at,
            None => false,
        }
    }

    pub fn first_segment(&self) -> Option<&Segment> {
        self.segments.first()
    }

    pub fn departure_time(&self) -> Option<DateTime<Utc>> {
        self.first_segment().map(|s| s.departure.at)
    }

    /// Flattened view consumed by the external travel-policy evaluator.
    pub fn policy_view(&self) -> Option<PolicyOfferView> {
        let first = self.first_segment()?;
        let last = self.segments.last()?;
        Some(PolicyOfferView {
            price: self.price.total,
            currency: self.price.currency.clone(),
            cabin: first.cabin,
            stops: self.stops,
            airline_code: first.airline_code.clone(),
            departure_time: first.departure.at,
            refundable: self.conditions.as_ref().map(|c| c.refundable).unwrap_or(false),
            origin: first.departure.airport_code.clone(),
            destination: last.arrival.airport_code.clone(),
        })
    }
}
