use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use tokio::sync::RwLock;

use voyara_core::{
    BaggageAllowance, BookingStatus, CancellationResult, Conditions, FlightOffer, FlightStop,
    PassengerInfo, PaymentInfo, PriceBreakdown, Segment, SupplierAdapter, SupplyBooking,
    SupplyError, SupplyResult, SupplySearchParams,
};

use super::{format_duration_minutes, strip_supplier_prefix, MOCK};

const AIRLINES: &[(&str, &str)] = &[
    ("6E", "IndiGo"),
    ("AI", "Air India"),
    ("BA", "British Airways"),
    ("LH", "Lufthansa"),
    ("EK", "Emirates"),
];

const DEPARTURE_SLOTS: &[(u32, u32)] = &[(6, 15), (9, 40), (13, 5), (17, 30), (21, 10)];

/// In-memory supplier used in development and tests. Offers are generated
/// per search with light price jitter; bookings live for the process
/// lifetime so the full contract can be exercised without a backend.
pub struct MockAdapter {
    offers: RwLock<HashMap<String, FlightOffer>>,
    bookings: RwLock<HashMap<String, SupplyBooking>>,
    booking_seq: AtomicU64,
}

impl MockAdapter {
    pub fn new() -> Self {
        Self {
            offers: RwLock::new(HashMap::new()),
            bookings: RwLock::new(HashMap::new()),
            booking_seq: AtomicU64::new(1),
        }
    }

    fn build_segment(
        airline: (&str, &str),
        flight_number: &str,
        from: &str,
        to: &str,
        departs: DateTime<Utc>,
        minutes: i64,
        cabin: voyara_core::CabinClass,
    ) -> Segment {
        Segment {
            airline_name: airline.1.to_string(),
            airline_code: airline.0.to_string(),
            flight_number: flight_number.to_string(),
            departure: FlightStop {
                airport_code: from.to_string(),
                airport_name: None,
                at: departs,
                terminal: Some("1".to_string()),
            },
            arrival: FlightStop {
                airport_code: to.to_string(),
                airport_name: None,
                at: departs + Duration::minutes(minutes),
                terminal: None,
            },
            duration: format_duration_minutes(minutes as u32),
            cabin,
            aircraft: Some("Airbus A320neo".to_string()),
        }
    }

    fn generate_offer(&self, params: &SupplySearchParams, index: usize) -> FlightOffer {
        let airline = match &params.airline {
            Some(code) => AIRLINES
                .iter()
                .find(|(c, _)| c == code)
                .copied()
                .unwrap_or((code.as_str(), "Partner Airline")),
            None => AIRLINES[index % AIRLINES.len()],
        };

        let (hour, minute) = DEPARTURE_SLOTS[index % DEPARTURE_SLOTS.len()];
        let departs = params
            .departure_date
            .and_hms_opt(hour, minute, 0)
            .expect("static departure slots are valid times")
            .and_utc();

        let flight_number = format!("{}{}", airline.0, 100 + index * 37);
        let with_connection = index % 2 == 1;

        let mut segments = Vec::new();
        let mut leg_minutes: u32 = 135 + index as u32 * 20;
        if with_connection {
            let half = leg_minutes as i64 / 2;
            segments.push(Self::build_segment(
                airline,
                &flight_number,
                &params.origin,
                "BOM",
                departs,
                half,
                params.cabin,
            ));
            segments.push(Self::build_segment(
                airline,
                &format!("{}{}", airline.0, 200 + index * 41),
                "BOM",
                &params.destination,
                departs + Duration::minutes(half + 55),
                half,
                params.cabin,
            ));
            leg_minutes += 55;
        } else {
            segments.push(Self::build_segment(
                airline,
                &flight_number,
                &params.origin,
                &params.destination,
                departs,
                leg_minutes as i64,
                params.cabin,
            ));
        }

        let mut slice_count = 1;
        let mut total_minutes = leg_minutes;
        if let Some(return_date) = params.return_date {
            let returns = return_date
                .and_hms_opt(18, 20, 0)
                .expect("static return slot is a valid time")
                .and_utc();
            segments.push(Self::build_segment(
                airline,
                &format!("{}{}", airline.0, 300 + index * 13),
                &params.destination,
                &params.origin,
                returns,
                135,
                params.cabin,
            ));
            slice_count = 2;
            total_minutes += 135;
        }

        let jitter: f64 = rand::thread_rng().gen_range(0.0..150.0);
        let base = 3200.0 + index as f64 * 450.0 + jitter;
        let taxes = (base * 0.18).round();
        let price = PriceBreakdown {
            base_fare: base,
            taxes_and_fees: taxes,
            total: base + taxes,
            currency: params.currency.clone(),
            markup: None,
            service_fee: None,
        };

        let native_id = format!("mk-{}{}-{}", params.origin, params.destination, index);
        let mut offer = FlightOffer::new(
            MOCK,
            &native_id,
            segments,
            slice_count,
            format_duration_minutes(total_minutes),
            price,
        );
        offer.seats_remaining = Some(9 - (index as u32 % 4));
        offer.expires_at = Some(Utc::now() + Duration::minutes(20));
        offer.conditions = Some(Conditions {
            refundable: index % 3 == 0,
            changeable: true,
            change_fee: Some(1500.0),
        });
        offer.baggage = Some(BaggageAllowance {
            checked_bags: 1,
            cabin_bags: 1,
        });
        offer
    }
}

impl Default for MockAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SupplierAdapter for MockAdapter {
    fn name(&self) -> &str {
        MOCK
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn search_flights(&self, params: &SupplySearchParams) -> SupplyResult<Vec<FlightOffer>> {
        let count = params.max_results.clamp(1, 5);
        let offers: Vec<FlightOffer> = (0..count)
            .map(|i| self.generate_offer(params, i))
            .collect();

        let mut store = self.offers.write().await;
        for offer in &offers {
            store.insert(offer.id.clone(), offer.clone());
        }
        Ok(offers)
    }

    async fn get_offer_details(&self, offer_id: &str) -> SupplyResult<FlightOffer> {
        let native = strip_supplier_prefix(offer_id, MOCK);
        let store = self.offers.read().await;
        store
            .get(&format!("{}-{}", MOCK, native))
            .cloned()
            .ok_or_else(|| SupplyError::offer_details_failed(MOCK, format!("unknown offer {}", offer_id)))
    }

    async fn create_booking(
        &self,
        offer_id: &str,
        passengers: &[PassengerInfo],
        _payment: &PaymentInfo,
    ) -> SupplyResult<SupplyBooking> {
        let offer = {
            let native = strip_supplier_prefix(offer_id, MOCK);
            let store = self.offers.read().await;
            store.get(&format!("{}-{}", MOCK, native)).cloned()
        }
        .ok_or_else(|| {
            SupplyError::offer_expired(MOCK, format!("offer {} not found, search again", offer_id))
        })?;

        if offer.is_expired() {
            return Err(SupplyError::offer_expired(MOCK, format!("offer {} has expired", offer.id)));
        }
        if offer.seats_remaining == Some(0) {
            return Err(SupplyError::sold_out(MOCK, format!("offer {} is sold out", offer.id)));
        }
        if passengers.is_empty() {
            return Err(SupplyError::booking_failed(MOCK, "at least one passenger is required"));
        }

        let seq = self.booking_seq.fetch_add(1, Ordering::SeqCst);
        let native_booking_id = format!("bkg_{:06}", seq);
        let booking = SupplyBooking {
            id: format!("{}-{}", MOCK, native_booking_id),
            supplier: MOCK.to_string(),
            supplier_booking_id: native_booking_id,
            confirmation_code: format!("VY{:06}", seq),
            status: BookingStatus::Confirmed,
            total_price: offer.price.total,
            currency: offer.price.currency.clone(),
            offer,
            passengers: passengers.to_vec(),
            booked_at: Utc::now(),
        };

        self.bookings
            .write()
            .await
            .insert(booking.id.clone(), booking.clone());
        Ok(booking)
    }

    async fn cancel_booking(&self, booking_id: &str) -> SupplyResult<CancellationResult> {
        let native = strip_supplier_prefix(booking_id, MOCK);
        let key = format!("{}-{}", MOCK, native);
        let mut store = self.bookings.write().await;
        let booking = store.get_mut(&key).ok_or_else(|| {
            SupplyError::cancellation_failed(MOCK, format!("unknown booking {}", booking_id))
        })?;

        if booking.status == BookingStatus::Cancelled {
            // Repeated cancellation reports success without a second refund
            return Ok(CancellationResult {
                cancelled: true,
                refund_amount: None,
                refund_currency: None,
            });
        }

        booking.status = BookingStatus::Cancelled;
        Ok(CancellationResult {
            cancelled: true,
            refund_amount: Some((booking.total_price * 0.6).round()),
            refund_currency: Some(booking.currency.clone()),
        })
    }

    async fn get_booking(&self, booking_id: &str) -> SupplyResult<SupplyBooking> {
        let native = strip_supplier_prefix(booking_id, MOCK);
        let store = self.bookings.read().await;
        store
            .get(&format!("{}-{}", MOCK, native))
            .cloned()
            .ok_or_else(|| {
                SupplyError::booking_retrieval_failed(MOCK, format!("unknown booking {}", booking_id))
            })
    }
}
