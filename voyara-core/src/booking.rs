use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::offer::FlightOffer;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Confirmed,
    Pending,
    Cancelled,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassengerInfo {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub email: Option<String>,
}

/// Opaque payment handle passed through to the supplier. The token is a
/// gateway reference, never raw card data, and must not be logged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub method: String,
    pub token: String,
}

/// Result of a successful booking against one supplier.
///
/// Created once per booking attempt; the status only changes through
/// cancellation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplyBooking {
    pub id: String,
    pub supplier: String,
    pub supplier_booking_id: String,
    pub confirmation_code: String,
    pub status: BookingStatus,
    pub offer: FlightOffer,
    pub passengers: Vec<PassengerInfo>,
    pub total_price: f64,
    pub currency: String,
    pub booked_at: DateTime<Utc>,
}

/// Outcome of a cancellation, idempotent from the caller's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancellationResult {
    pub cancelled: bool,
    pub refund_amount: Option<f64>,
    pub refund_currency: Option<String>,
}
