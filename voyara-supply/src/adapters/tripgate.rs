use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use voyara_core::{
    BookingStatus, CabinClass, CancellationResult, Conditions, FlightOffer, FlightStop,
    PassengerInfo, PaymentInfo, PriceBreakdown, Segment, SupplierAdapter, SupplyBooking,
    SupplyError, SupplyErrorCode, SupplyResult, SupplySearchParams,
};

use crate::config::SupplierCredentials;

use super::{format_duration_minutes, strip_supplier_prefix, TRIPGATE};

/// Tripgate GDS integration. The backend returns a flat per-leg array
/// with a parallel fare table; legs are regrouped into itineraries and
/// slices here. Offer refresh is not part of the Tripgate API, so
/// `get_offer_details` fails with `NOT_SUPPORTED`.
pub struct TripgateAdapter {
    credentials: Option<SupplierCredentials>,
    client: reqwest::Client,
}

impl TripgateAdapter {
    pub fn new(credentials: Option<SupplierCredentials>) -> Self {
        Self {
            credentials,
            client: reqwest::Client::new(),
        }
    }

    fn creds(&self, code: SupplyErrorCode) -> SupplyResult<&SupplierCredentials> {
        self.credentials
            .as_ref()
            .ok_or_else(|| SupplyError::new(TRIPGATE, code, "tripgate credentials not configured"))
    }

    async fn read_error(resp: reqwest::Response, default: SupplyErrorCode) -> SupplyError {
        let status = resp.status().as_u16();
        let body: Option<TripgateErrorBody> = resp.json().await.ok();

        let (code, message) = match body {
            Some(b) => {
                let code = match b.error_code.as_str() {
                    "SEGMENT_SOLD_OUT" | "NO_SEATS" => SupplyErrorCode::SoldOut,
                    "FARE_EXPIRED" | "SESSION_EXPIRED" => SupplyErrorCode::OfferExpired,
                    _ => default,
                };
                (code, b.error_text)
            }
            None => (default, format!("tripgate returned HTTP {}", status)),
        };

        let mut err = SupplyError::new(TRIPGATE, code, message);
        err.status = status;
        err
    }
}

#[async_trait]
impl SupplierAdapter for TripgateAdapter {
    fn name(&self) -> &str {
        TRIPGATE
    }

    fn is_available(&self) -> bool {
        self.credentials.is_some()
    }

    async fn search_flights(&self, params: &SupplySearchParams) -> SupplyResult<Vec<FlightOffer>> {
        let creds = self.creds(SupplyErrorCode::SearchFailed)?;
        let body = TripgateSearchRequest {
            from: &params.origin,
            to: &params.destination,
            date: params.departure_date,
            return_date: params.return_date,
            pax: params.passengers,
            cabin_code: cabin_to_code(params.cabin),
            currency: &params.currency,
            limit: params.max_results,
        };

        let resp = self
            .client
            .post(format!("{}/gds/availability", creds.base_url))
            .header("X-Api-Key", &creds.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SupplyError::search_failed(TRIPGATE, e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Self::read_error(resp, SupplyErrorCode::SearchFailed).await);
        }

        let parsed: TripgateSearchResponse = resp
            .json()
            .await
            .map_err(|e| SupplyError::search_failed(TRIPGATE, e.to_string()))?;

        let mut offers = map_search_response(parsed);
        offers.truncate(params.max_results);
        Ok(offers)
    }

    async fn get_offer_details(&self, _offer_id: &str) -> SupplyResult<FlightOffer> {
        Err(SupplyError::not_supported(TRIPGATE, "offer refresh"))
    }

    async fn create_booking(
        &self,
        offer_id: &str,
        passengers: &[PassengerInfo],
        payment: &PaymentInfo,
    ) -> SupplyResult<SupplyBooking> {
        let creds = self.creds(SupplyErrorCode::BookingFailed)?;
        let native_ref = strip_supplier_prefix(offer_id, TRIPGATE);

        let body = TripgateBookingRequest {
            itinerary_ref: native_ref,
            passengers: passengers
                .iter()
                .map(|p| TripgatePassenger {
                    surname: &p.last_name,
                    given_name: &p.first_name,
                    dob: p.date_of_birth,
                })
                .collect(),
            form_of_payment: TripgateFop {
                fop_type: &payment.method,
                token: &payment.token,
            },
        };

        let resp = self
            .client
            .post(format!("{}/gds/pnr", creds.base_url))
            .header("X-Api-Key", &creds.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SupplyError::booking_failed(TRIPGATE, e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Self::read_error(resp, SupplyErrorCode::BookingFailed).await);
        }

        let pnr: TripgatePnr = resp
            .json()
            .await
            .map_err(|e| SupplyError::booking_failed(TRIPGATE, e.to_string()))?;

        map_pnr(pnr, passengers).map_err(|reason| SupplyError::booking_failed(TRIPGATE, reason))
    }

    async fn cancel_booking(&self, booking_id: &str) -> SupplyResult<CancellationResult> {
        let creds = self.creds(SupplyErrorCode::CancellationFailed)?;
        let native = strip_supplier_prefix(booking_id, TRIPGATE);

        let resp = self
            .client
            .delete(format!("{}/gds/pnr/{}", creds.base_url, native))
            .header("X-Api-Key", &creds.api_key)
            .send()
            .await
            .map_err(|e| SupplyError::cancellation_failed(TRIPGATE, e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Self::read_error(resp, SupplyErrorCode::CancellationFailed).await);
        }

        let parsed: TripgateCancellation = resp
            .json()
            .await
            .map_err(|e| SupplyError::cancellation_failed(TRIPGATE, e.to_string()))?;

        Ok(CancellationResult {
            cancelled: parsed.cancelled,
            refund_amount: parsed.refund,
            refund_currency: parsed.refund_currency,
        })
    }

    async fn get_booking(&self, booking_id: &str) -> SupplyResult<SupplyBooking> {
        let creds = self.creds(SupplyErrorCode::BookingRetrievalFailed)?;
        let native = strip_supplier_prefix(booking_id, TRIPGATE);

        let resp = self
            .client
            .get(format!("{}/gds/pnr/{}", creds.base_url, native))
            .header("X-Api-Key", &creds.api_key)
            .send()
            .await
            .map_err(|e| SupplyError::booking_retrieval_failed(TRIPGATE, e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Self::read_error(resp, SupplyErrorCode::BookingRetrievalFailed).await);
        }

        let pnr: TripgatePnr = resp
            .json()
            .await
            .map_err(|e| SupplyError::booking_retrieval_failed(TRIPGATE, e.to_string()))?;

        map_pnr(pnr, &[]).map_err(|reason| SupplyError::booking_retrieval_failed(TRIPGATE, reason))
    }
}

// ---------------------------------------------------------------------------
// Native wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct TripgateSearchRequest<'a> {
    from: &'a str,
    to: &'a str,
    date: NaiveDate,
    return_date: Option<NaiveDate>,
    pax: u32,
    cabin_code: &'static str,
    currency: &'a str,
    limit: usize,
}

#[derive(Debug, Deserialize)]
struct TripgateSearchResponse {
    #[allow(dead_code)]
    session_id: String,
    legs: Vec<TripgateLeg>,
    fares: Vec<TripgateFare>,
}

#[derive(Debug, Clone, Deserialize)]
struct TripgateLeg {
    itinerary_ref: String,
    direction: String,
    carrier_code: String,
    carrier_name: String,
    flight_no: String,
    dep_airport: String,
    dep_airport_name: Option<String>,
    dep_terminal: Option<String>,
    dep_time: DateTime<Utc>,
    arr_airport: String,
    arr_airport_name: Option<String>,
    arr_terminal: Option<String>,
    arr_time: DateTime<Utc>,
    duration_minutes: u32,
    cabin_code: String,
    equipment: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct TripgateFare {
    itinerary_ref: String,
    base: f64,
    taxes: f64,
    total: f64,
    currency: String,
    seats_left: Option<u32>,
    refundable: Option<bool>,
}

#[derive(Debug, Serialize)]
struct TripgateBookingRequest<'a> {
    itinerary_ref: &'a str,
    passengers: Vec<TripgatePassenger<'a>>,
    form_of_payment: TripgateFop<'a>,
}

#[derive(Debug, Serialize)]
struct TripgatePassenger<'a> {
    surname: &'a str,
    given_name: &'a str,
    dob: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
struct TripgateFop<'a> {
    #[serde(rename = "type")]
    fop_type: &'a str,
    token: &'a str,
}

#[derive(Debug, Deserialize)]
struct TripgatePnr {
    record_locator: String,
    status: String,
    legs: Vec<TripgateLeg>,
    fare: TripgateFare,
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct TripgateCancellation {
    cancelled: bool,
    refund: Option<f64>,
    refund_currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TripgateErrorBody {
    error_code: String,
    error_text: String,
}

// ---------------------------------------------------------------------------
// Canonical mapping
// ---------------------------------------------------------------------------

fn cabin_to_code(cabin: CabinClass) -> &'static str {
    match cabin {
        CabinClass::Economy => "Y",
        CabinClass::PremiumEconomy => "W",
        CabinClass::Business => "C",
        CabinClass::First => "F",
    }
}

fn cabin_from_code(code: &str) -> CabinClass {
    match code {
        "W" => CabinClass::PremiumEconomy,
        "C" => CabinClass::Business,
        "F" => CabinClass::First,
        _ => CabinClass::Economy,
    }
}

fn leg_to_segment(leg: TripgateLeg) -> Segment {
    Segment {
        airline_name: leg.carrier_name,
        airline_code: leg.carrier_code,
        flight_number: leg.flight_no,
        departure: FlightStop {
            airport_code: leg.dep_airport,
            airport_name: leg.dep_airport_name,
            at: leg.dep_time,
            terminal: leg.dep_terminal,
        },
        arrival: FlightStop {
            airport_code: leg.arr_airport,
            airport_name: leg.arr_airport_name,
            at: leg.arr_time,
            terminal: leg.arr_terminal,
        },
        duration: format_duration_minutes(leg.duration_minutes),
        cabin: cabin_from_code(&leg.cabin_code),
        aircraft: leg.equipment,
    }
}

/// Regroup the flat leg array by itinerary reference, preserving the
/// backend's ordering, and join each group with its fare row. Itineraries
/// without a fare are dropped rather than failing the whole search.
fn map_search_response(response: TripgateSearchResponse) -> Vec<FlightOffer> {
    let mut grouped: Vec<(String, Vec<TripgateLeg>)> = Vec::new();
    for leg in response.legs {
        match grouped.iter_mut().find(|(r, _)| *r == leg.itinerary_ref) {
            Some((_, legs)) => legs.push(leg),
            None => grouped.push((leg.itinerary_ref.clone(), vec![leg])),
        }
    }

    let mut offers = Vec::new();
    for (itinerary_ref, legs) in grouped {
        let Some(fare) = response
            .fares
            .iter()
            .find(|f| f.itinerary_ref == itinerary_ref)
        else {
            tracing::warn!(
                supplier = TRIPGATE,
                itinerary = %itinerary_ref,
                "itinerary has no fare row, dropping"
            );
            continue;
        };
        offers.push(build_offer(&itinerary_ref, legs, fare.clone()));
    }
    offers
}

fn build_offer(itinerary_ref: &str, legs: Vec<TripgateLeg>, fare: TripgateFare) -> FlightOffer {
    let mut directions: Vec<String> = Vec::new();
    for leg in &legs {
        if !directions.contains(&leg.direction) {
            directions.push(leg.direction.clone());
        }
    }
    let slice_count = directions.len().max(1);
    let total_minutes: u32 = legs.iter().map(|l| l.duration_minutes).sum();
    let segments: Vec<Segment> = legs.into_iter().map(leg_to_segment).collect();

    let price = PriceBreakdown {
        base_fare: fare.base,
        taxes_and_fees: fare.taxes,
        total: fare.total,
        currency: fare.currency,
        markup: None,
        service_fee: None,
    };

    let mut offer = FlightOffer::new(
        TRIPGATE,
        itinerary_ref,
        segments,
        slice_count,
        format_duration_minutes(total_minutes),
        price,
    );
    offer.seats_remaining = fare.seats_left;
    if let Some(refundable) = fare.refundable {
        offer.conditions = Some(Conditions {
            refundable,
            changeable: refundable,
            change_fee: None,
        });
    }
    offer
}

fn map_pnr(pnr: TripgatePnr, passengers: &[PassengerInfo]) -> Result<SupplyBooking, String> {
    if pnr.legs.is_empty() {
        return Err(format!("PNR {} carries no legs", pnr.record_locator));
    }
    let status = match pnr.status.as_str() {
        "OK" | "HK" => BookingStatus::Confirmed,
        "PN" => BookingStatus::Pending,
        "XX" | "HX" => BookingStatus::Cancelled,
        _ => BookingStatus::Failed,
    };

    let itinerary_ref = pnr.legs[0].itinerary_ref.clone();
    let offer = build_offer(&itinerary_ref, pnr.legs, pnr.fare);

    Ok(SupplyBooking {
        id: format!("{}-{}", TRIPGATE, pnr.record_locator),
        supplier: TRIPGATE.to_string(),
        supplier_booking_id: pnr.record_locator.clone(),
        confirmation_code: pnr.record_locator,
        status,
        total_price: offer.price.total,
        currency: offer.price.currency.clone(),
        offer,
        passengers: passengers.to_vec(),
        booked_at: pnr.created_at.unwrap_or_else(Utc::now),
    })
}
