use async_trait::async_trait;

use crate::booking::{CancellationResult, PassengerInfo, PaymentInfo, SupplyBooking};
use crate::error::SupplyResult;
use crate::offer::FlightOffer;
use crate::search::SupplySearchParams;

/// Contract implemented by every supplier backend.
///
/// All backend-specific parsing and error mapping lives behind this
/// trait; no other component may contain supplier-native logic. Search
/// results carry no ordering guarantee.
#[async_trait]
pub trait SupplierAdapter: Send + Sync {
    /// Stable supplier name, used for offer id prefixes and routing.
    fn name(&self) -> &str;

    /// True iff required credentials/config are present. Never errors.
    fn is_available(&self) -> bool;

    /// Zero or more canonical offers. "No results" is `Ok(vec![])`;
    /// errors are reserved for transport or auth failure.
    async fn search_flights(&self, params: &SupplySearchParams) -> SupplyResult<Vec<FlightOffer>>;

    /// Re-fetch a single offer to validate price freshness before
    /// booking. Adapters without offer refresh fail with `NOT_SUPPORTED`.
    async fn get_offer_details(&self, offer_id: &str) -> SupplyResult<FlightOffer>;

    /// Book an offer. Failures carry a typed code (`OFFER_EXPIRED`,
    /// `SOLD_OUT`, `BOOKING_FAILED`, ...) so callers can branch on cause.
    async fn create_booking(
        &self,
        offer_id: &str,
        passengers: &[PassengerInfo],
        payment: &PaymentInfo,
    ) -> SupplyResult<SupplyBooking>;

    async fn cancel_booking(&self, booking_id: &str) -> SupplyResult<CancellationResult>;

    /// Retrieval only, no side effects.
    async fn get_booking(&self, booking_id: &str) -> SupplyResult<SupplyBooking>;
}
