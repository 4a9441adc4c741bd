use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use voyara_core::{
    BaggageAllowance, BookingStatus, CabinClass, CancellationResult, Conditions, FlightOffer,
    FlightStop, PassengerInfo, PaymentInfo, PriceBreakdown, Segment, SupplierAdapter,
    SupplyBooking, SupplyError, SupplyErrorCode, SupplyResult, SupplySearchParams,
};

use crate::config::SupplierCredentials;

use super::{format_duration_minutes, parse_iso8601_duration, strip_supplier_prefix, SKYHOP};

/// Skyhop NDC integration. Native responses nest offer -> slice -> segment
/// with ISO-8601 durations and string money amounts; all of that is
/// flattened into the canonical model here and nowhere else.
pub struct SkyhopAdapter {
    credentials: Option<SupplierCredentials>,
    client: reqwest::Client,
}

impl SkyhopAdapter {
    pub fn new(credentials: Option<SupplierCredentials>) -> Self {
        Self {
            credentials,
            client: reqwest::Client::new(),
        }
    }

    fn creds(&self, code: SupplyErrorCode) -> SupplyResult<&SupplierCredentials> {
        self.credentials
            .as_ref()
            .ok_or_else(|| SupplyError::new(SKYHOP, code, "skyhop credentials not configured"))
    }

    async fn read_error(resp: reqwest::Response, default: SupplyErrorCode) -> SupplyError {
        let status = resp.status().as_u16();
        let body: Option<SkyhopErrorBody> = resp.json().await.ok();
        let native = body.and_then(|b| b.errors.into_iter().next());

        let (code, message) = match native {
            Some(err) => {
                let code = match err.code.as_str() {
                    "offer_expired" | "offer_no_longer_available" => SupplyErrorCode::OfferExpired,
                    "sold_out" | "no_availability" => SupplyErrorCode::SoldOut,
                    _ if status == 410 => SupplyErrorCode::OfferExpired,
                    _ => default,
                };
                (code, err.title)
            }
            None if status == 410 => (SupplyErrorCode::OfferExpired, "offer gone".to_string()),
            None => (default, format!("skyhop returned HTTP {}", status)),
        };

        let mut err = SupplyError::new(SKYHOP, code, message);
        // Preserve the real transport status over the code's default hint
        err.status = status;
        err
    }
}

#[async_trait]
impl SupplierAdapter for SkyhopAdapter {
    fn name(&self) -> &str {
        SKYHOP
    }

    fn is_available(&self) -> bool {
        self.credentials.is_some()
    }

    async fn search_flights(&self, params: &SupplySearchParams) -> SupplyResult<Vec<FlightOffer>> {
        let creds = self.creds(SupplyErrorCode::SearchFailed)?;
        let body = SkyhopSearchRequest {
            origin: &params.origin,
            destination: &params.destination,
            departure_date: params.departure_date,
            return_date: params.return_date,
            passengers: params.passengers,
            cabin_class: cabin_to_native(params.cabin),
            max_offers: params.max_results,
            currency: &params.currency,
        };

        let resp = self
            .client
            .post(format!("{}/v1/air/search", creds.base_url))
            .bearer_auth(&creds.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SupplyError::search_failed(SKYHOP, e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Self::read_error(resp, SupplyErrorCode::SearchFailed).await);
        }

        let parsed: SkyhopSearchResponse = resp
            .json()
            .await
            .map_err(|e| SupplyError::search_failed(SKYHOP, e.to_string()))?;

        let mut offers = Vec::new();
        for native in parsed.offers {
            match map_offer(native) {
                Ok(offer) => offers.push(offer),
                Err(reason) => {
                    tracing::warn!(supplier = SKYHOP, %reason, "dropping unmappable offer");
                }
            }
        }
        offers.truncate(params.max_results);
        Ok(offers)
    }

    async fn get_offer_details(&self, offer_id: &str) -> SupplyResult<FlightOffer> {
        let creds = self.creds(SupplyErrorCode::OfferDetailsFailed)?;
        let native_id = strip_supplier_prefix(offer_id, SKYHOP);

        let resp = self
            .client
            .get(format!("{}/v1/air/offers/{}", creds.base_url, native_id))
            .bearer_auth(&creds.api_key)
            .send()
            .await
            .map_err(|e| SupplyError::offer_details_failed(SKYHOP, e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Self::read_error(resp, SupplyErrorCode::OfferDetailsFailed).await);
        }

        let parsed: SkyhopOfferEnvelope = resp
            .json()
            .await
            .map_err(|e| SupplyError::offer_details_failed(SKYHOP, e.to_string()))?;

        map_offer(parsed.offer).map_err(|reason| SupplyError::offer_details_failed(SKYHOP, reason))
    }

    async fn create_booking(
        &self,
        offer_id: &str,
        passengers: &[PassengerInfo],
        payment: &PaymentInfo,
    ) -> SupplyResult<SupplyBooking> {
        let creds = self.creds(SupplyErrorCode::BookingFailed)?;
        let native_id = strip_supplier_prefix(offer_id, SKYHOP);

        let body = SkyhopOrderRequest {
            offer_id: native_id,
            passengers: passengers
                .iter()
                .map(|p| SkyhopPassenger {
                    given_name: &p.first_name,
                    family_name: &p.last_name,
                    born_on: p.date_of_birth,
                    email: p.email.as_deref(),
                })
                .collect(),
            payment: SkyhopPayment {
                method: &payment.method,
                token: &payment.token,
            },
        };

        let resp = self
            .client
            .post(format!("{}/v1/air/orders", creds.base_url))
            .bearer_auth(&creds.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SupplyError::booking_failed(SKYHOP, e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Self::read_error(resp, SupplyErrorCode::BookingFailed).await);
        }

        let order: SkyhopOrder = resp
            .json()
            .await
            .map_err(|e| SupplyError::booking_failed(SKYHOP, e.to_string()))?;

        map_order(order, passengers).map_err(|reason| SupplyError::booking_failed(SKYHOP, reason))
    }

    async fn cancel_booking(&self, booking_id: &str) -> SupplyResult<CancellationResult> {
        let creds = self.creds(SupplyErrorCode::CancellationFailed)?;
        let native_id = strip_supplier_prefix(booking_id, SKYHOP);

        let resp = self
            .client
            .post(format!(
                "{}/v1/air/orders/{}/cancellation",
                creds.base_url, native_id
            ))
            .bearer_auth(&creds.api_key)
            .send()
            .await
            .map_err(|e| SupplyError::cancellation_failed(SKYHOP, e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Self::read_error(resp, SupplyErrorCode::CancellationFailed).await);
        }

        let parsed: SkyhopCancellation = resp
            .json()
            .await
            .map_err(|e| SupplyError::cancellation_failed(SKYHOP, e.to_string()))?;

        let refund_amount = match parsed.refund_amount {
            Some(raw) => Some(raw.parse::<f64>().map_err(|_| {
                SupplyError::cancellation_failed(SKYHOP, format!("bad refund amount {:?}", raw))
            })?),
            None => None,
        };
        Ok(CancellationResult {
            cancelled: true,
            refund_amount,
            refund_currency: parsed.refund_currency,
        })
    }

    async fn get_booking(&self, booking_id: &str) -> SupplyResult<SupplyBooking> {
        let creds = self.creds(SupplyErrorCode::BookingRetrievalFailed)?;
        let native_id = strip_supplier_prefix(booking_id, SKYHOP);

        let resp = self
            .client
            .get(format!("{}/v1/air/orders/{}", creds.base_url, native_id))
            .bearer_auth(&creds.api_key)
            .send()
            .await
            .map_err(|e| SupplyError::booking_retrieval_failed(SKYHOP, e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Self::read_error(resp, SupplyErrorCode::BookingRetrievalFailed).await);
        }

        let order: SkyhopOrder = resp
            .json()
            .await
            .map_err(|e| SupplyError::booking_retrieval_failed(SKYHOP, e.to_string()))?;

        map_order(order, &[]).map_err(|reason| SupplyError::booking_retrieval_failed(SKYHOP, reason))
    }
}

// ---------------------------------------------------------------------------
// Native wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct SkyhopSearchRequest<'a> {
    origin: &'a str,
    destination: &'a str,
    departure_date: NaiveDate,
    return_date: Option<NaiveDate>,
    passengers: u32,
    cabin_class: &'static str,
    max_offers: usize,
    currency: &'a str,
}

#[derive(Debug, Deserialize)]
struct SkyhopSearchResponse {
    #[allow(dead_code)]
    request_id: String,
    offers: Vec<SkyhopOffer>,
}

#[derive(Debug, Deserialize)]
struct SkyhopOfferEnvelope {
    offer: SkyhopOffer,
}

#[derive(Debug, Deserialize)]
struct SkyhopOffer {
    id: String,
    expires_at: Option<DateTime<Utc>>,
    base_amount: String,
    tax_amount: String,
    total_amount: String,
    total_currency: String,
    available_seats: Option<u32>,
    refundable: Option<bool>,
    changeable: Option<bool>,
    change_fee: Option<String>,
    checked_bags: Option<u32>,
    cabin_bags: Option<u32>,
    slices: Vec<SkyhopSlice>,
}

#[derive(Debug, Deserialize)]
struct SkyhopSlice {
    duration: String,
    segments: Vec<SkyhopSegment>,
}

#[derive(Debug, Deserialize)]
struct SkyhopSegment {
    marketing_carrier: SkyhopCarrier,
    flight_number: String,
    origin: SkyhopAirport,
    destination: SkyhopAirport,
    departing_at: DateTime<Utc>,
    arriving_at: DateTime<Utc>,
    duration: String,
    cabin_class: String,
    aircraft: Option<SkyhopAircraft>,
}

#[derive(Debug, Deserialize)]
struct SkyhopCarrier {
    iata_code: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct SkyhopAirport {
    iata_code: String,
    name: Option<String>,
    terminal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SkyhopAircraft {
    name: String,
}

#[derive(Debug, Serialize)]
struct SkyhopOrderRequest<'a> {
    offer_id: &'a str,
    passengers: Vec<SkyhopPassenger<'a>>,
    payment: SkyhopPayment<'a>,
}

#[derive(Debug, Serialize)]
struct SkyhopPassenger<'a> {
    given_name: &'a str,
    family_name: &'a str,
    born_on: Option<NaiveDate>,
    email: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct SkyhopPayment<'a> {
    method: &'a str,
    token: &'a str,
}

#[derive(Debug, Deserialize)]
struct SkyhopOrder {
    id: String,
    booking_reference: String,
    status: String,
    offer: SkyhopOffer,
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct SkyhopCancellation {
    refund_amount: Option<String>,
    refund_currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SkyhopErrorBody {
    errors: Vec<SkyhopApiError>,
}

#[derive(Debug, Deserialize)]
struct SkyhopApiError {
    code: String,
    title: String,
}

// ---------------------------------------------------------------------------
// Canonical mapping
// ---------------------------------------------------------------------------

fn cabin_to_native(cabin: CabinClass) -> &'static str {
    match cabin {
        CabinClass::Economy => "economy",
        CabinClass::PremiumEconomy => "premium_economy",
        CabinClass::Business => "business",
        CabinClass::First => "first",
    }
}

fn cabin_from_native(raw: &str) -> CabinClass {
    match raw {
        "premium_economy" => CabinClass::PremiumEconomy,
        "business" => CabinClass::Business,
        "first" => CabinClass::First,
        _ => CabinClass::Economy,
    }
}

fn parse_amount(raw: &str, field: &str) -> Result<f64, String> {
    raw.parse::<f64>()
        .map_err(|_| format!("unparsable {} {:?}", field, raw))
}

fn map_offer(native: SkyhopOffer) -> Result<FlightOffer, String> {
    if native.slices.is_empty() {
        return Err(format!("offer {} has no slices", native.id));
    }

    let base_fare = parse_amount(&native.base_amount, "base_amount")?;
    let taxes_and_fees = parse_amount(&native.tax_amount, "tax_amount")?;
    let total = parse_amount(&native.total_amount, "total_amount")?;

    let slice_count = native.slices.len();
    let mut total_minutes: u32 = 0;
    for slice in &native.slices {
        match parse_iso8601_duration(&slice.duration) {
            Some(minutes) => total_minutes += minutes,
            None => {
                return Err(format!(
                    "offer {} has unparsable slice duration {:?}",
                    native.id, slice.duration
                ))
            }
        }
    }

    let mut segments = Vec::new();
    for slice in native.slices {
        for seg in slice.segments {
            segments.push(Segment {
                airline_name: seg.marketing_carrier.name,
                airline_code: seg.marketing_carrier.iata_code,
                flight_number: seg.flight_number,
                departure: FlightStop {
                    airport_code: seg.origin.iata_code,
                    airport_name: seg.origin.name,
                    at: seg.departing_at,
                    terminal: seg.origin.terminal,
                },
                arrival: FlightStop {
                    airport_code: seg.destination.iata_code,
                    airport_name: seg.destination.name,
                    at: seg.arriving_at,
                    terminal: seg.destination.terminal,
                },
                duration: seg.duration,
                cabin: cabin_from_native(&seg.cabin_class),
                aircraft: seg.aircraft.map(|a| a.name),
            });
        }
    }
    if segments.is_empty() {
        return Err(format!("offer {} has no segments", native.id));
    }

    let price = PriceBreakdown {
        base_fare,
        taxes_and_fees,
        total,
        currency: native.total_currency,
        markup: None,
        service_fee: None,
    };

    let mut offer = FlightOffer::new(
        SKYHOP,
        &native.id,
        segments,
        slice_count,
        format_duration_minutes(total_minutes),
        price,
    );
    offer.seats_remaining = native.available_seats;
    offer.expires_at = native.expires_at;
    if native.refundable.is_some() || native.changeable.is_some() {
        let change_fee = match native.change_fee {
            Some(raw) => Some(parse_amount(&raw, "change_fee")?),
            None => None,
        };
        offer.conditions = Some(Conditions {
            refundable: native.refundable.unwrap_or(false),
            changeable: native.changeable.unwrap_or(false),
            change_fee,
        });
    }
    if native.checked_bags.is_some() || native.cabin_bags.is_some() {
        offer.baggage = Some(BaggageAllowance {
            checked_bags: native.checked_bags.unwrap_or(0),
            cabin_bags: native.cabin_bags.unwrap_or(0),
        });
    }
    Ok(offer)
}

fn map_order(order: SkyhopOrder, passengers: &[PassengerInfo]) -> Result<SupplyBooking, String> {
    let status = match order.status.as_str() {
        "confirmed" => BookingStatus::Confirmed,
        "pending" | "on_hold" => BookingStatus::Pending,
        "cancelled" => BookingStatus::Cancelled,
        _ => BookingStatus::Failed,
    };
    let offer = map_offer(order.offer)?;

    Ok(SupplyBooking {
        id: format!("{}-{}", SKYHOP, order.id),
        supplier: SKYHOP.to_string(),
        supplier_booking_id: order.id,
        confirmation_code: order.booking_reference,
        status,
        total_price: offer.price.total,
        currency: offer.price.currency.clone(),
        offer,
        passengers: passengers.to_vec(),
        booked_at: order.created_at.unwrap_or_else(Utc::now),
    })
}
