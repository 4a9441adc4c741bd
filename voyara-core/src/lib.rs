pub mod booking;
pub mod error;
pub mod offer;
pub mod policy;
pub mod pricing;
pub mod search;
pub mod supplier;

pub use booking::{BookingStatus, CancellationResult, PassengerInfo, PaymentInfo, SupplyBooking};
pub use error::{SupplyError, SupplyErrorCode, SupplyResult};
pub use offer::{BaggageAllowance, Conditions, FlightOffer, FlightStop, PriceBreakdown, Segment};
pub use policy::PolicyOfferView;
pub use pricing::PriceAdjuster;
pub use search::{CabinClass, SupplySearchParams};
pub use supplier::SupplierAdapter;
