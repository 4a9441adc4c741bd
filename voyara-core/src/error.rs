use serde::{Deserialize, Serialize};

/// Canonical error codes shared by every supplier integration.
///
/// Adapters translate backend-native failures into one of these before
/// anything crosses the adapter boundary, so callers can branch on cause
/// without knowing which backend produced it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SupplyErrorCode {
    SearchFailed,
    OfferExpired,
    SoldOut,
    BookingFailed,
    NotSupported,
    OfferDetailsFailed,
    CancellationFailed,
    BookingRetrievalFailed,
    Unknown,
}

impl SupplyErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupplyErrorCode::SearchFailed => "SEARCH_FAILED",
            SupplyErrorCode::OfferExpired => "OFFER_EXPIRED",
            SupplyErrorCode::SoldOut => "SOLD_OUT",
            SupplyErrorCode::BookingFailed => "BOOKING_FAILED",
            SupplyErrorCode::NotSupported => "NOT_SUPPORTED",
            SupplyErrorCode::OfferDetailsFailed => "OFFER_DETAILS_FAILED",
            SupplyErrorCode::CancellationFailed => "CANCELLATION_FAILED",
            SupplyErrorCode::BookingRetrievalFailed => "BOOKING_RETRIEVAL_FAILED",
            SupplyErrorCode::Unknown => "UNKNOWN",
        }
    }

    /// HTTP-style status hint. 410 on expiry/sell-out signals the caller
    /// that a fresh search is required.
    pub fn status_hint(&self) -> u16 {
        match self {
            SupplyErrorCode::OfferExpired | SupplyErrorCode::SoldOut => 410,
            SupplyErrorCode::NotSupported => 501,
            _ => 502,
        }
    }
}

/// Canonical supply-layer error: human message, originating supplier,
/// stable code and an HTTP-style status hint.
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize)]
#[error("[{supplier}] {}: {message}", .code.as_str())]
pub struct SupplyError {
    pub message: String,
    pub supplier: String,
    pub code: SupplyErrorCode,
    pub status: u16,
}

impl SupplyError {
    pub fn new(supplier: &str, code: SupplyErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            supplier: supplier.to_string(),
            code,
            status: code.status_hint(),
        }
    }

    pub fn search_failed(supplier: &str, message: impl Into<String>) -> Self {
        Self::new(supplier, SupplyErrorCode::SearchFailed, message)
    }

    pub fn offer_expired(supplier: &str, message: impl Into<String>) -> Self {
        Self::new(supplier, SupplyErrorCode::OfferExpired, message)
    }

    pub fn sold_out(supplier: &str, message: impl Into<String>) -> Self {
        Self::new(supplier, SupplyErrorCode::SoldOut, message)
    }

    pub fn booking_failed(supplier: &str, message: impl Into<String>) -> Self {
        Self::new(supplier, SupplyErrorCode::BookingFailed, message)
    }

    pub fn not_supported(supplier: &str, capability: &str) -> Self {
        Self::new(
            supplier,
            SupplyErrorCode::NotSupported,
            format!("{} does not support {}", supplier, capability),
        )
    }

    pub fn offer_details_failed(supplier: &str, message: impl Into<String>) -> Self {
        Self::new(supplier, SupplyErrorCode::OfferDetailsFailed, message)
    }

    pub fn cancellation_failed(supplier: &str, message: impl Into<String>) -> Self {
        Self::new(supplier, SupplyErrorCode::CancellationFailed, message)
    }

    pub fn booking_retrieval_failed(supplier: &str, message: impl Into<String>) -> Self {
        Self::new(supplier, SupplyErrorCode::BookingRetrievalFailed, message)
    }

    pub fn unknown(supplier: &str, message: impl Into<String>) -> Self {
        Self::new(supplier, SupplyErrorCode::Unknown, message)
    }
}

pub type SupplyResult<T> = Result<T, SupplyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_hints() {
        assert_eq!(SupplyError::offer_expired("skyhop", "gone").status, 410);
        assert_eq!(SupplyError::sold_out("skyhop", "none left").status, 410);
        assert_eq!(SupplyError::not_supported("tripgate", "offer refresh").status, 501);
        assert_eq!(SupplyError::search_failed("mock", "boom").status, 502);
    }

    #[test]
    fn test_display_carries_supplier_and_code() {
        let err = SupplyError::booking_failed("tripgate", "PNR rejected");
        let text = err.to_string();
        assert!(text.contains("tripgate"));
        assert!(text.contains("BOOKING_FAILED"));
        assert!(text.contains("PNR rejected"));
    }
}
