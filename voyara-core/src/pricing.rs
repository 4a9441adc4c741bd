use async_trait::async_trait;

use crate::error::SupplyResult;
use crate::offer::FlightOffer;

/// External pricing collaborator: takes a canonical offer and returns a
/// price-adjusted copy (markup / service fee applied). Invoked by the
/// backward-compatible priced search in the supply manager.
#[async_trait]
pub trait PriceAdjuster: Send + Sync {
    async fn adjust(&self, offer: FlightOffer) -> SupplyResult<FlightOffer>;
}
