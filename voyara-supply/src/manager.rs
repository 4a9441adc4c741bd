use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::{info, warn};

use voyara_core::{
    CancellationResult, FlightOffer, PassengerInfo, PaymentInfo, PriceAdjuster, SupplierAdapter,
    SupplyBooking, SupplyError, SupplyResult, SupplySearchParams,
};

use crate::registry::AdapterRegistry;
use crate::rules::{resolve_suppliers, RoutingRule};

/// Search result with provenance: `source` names the supplier the offers
/// came from, or the last supplier attempted when everything came back
/// empty. Callers must check `offers` for emptiness; exhaustion is not
/// an error.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub offers: Vec<FlightOffer>,
    pub source: String,
}

/// Orchestrates supplier adapters using the routing rules. Stateless
/// apart from the injected registry, so one manager serves all requests.
pub struct SupplyManager {
    registry: Arc<AdapterRegistry>,
    rules: Vec<RoutingRule>,
}

impl SupplyManager {
    pub fn new(registry: Arc<AdapterRegistry>, rules: Vec<RoutingRule>) -> Self {
        Self { registry, rules }
    }

    /// Sequential fallback search: try suppliers in rule order, skip
    /// unavailable ones, swallow and log per-supplier failures, stop at
    /// the first supplier returning at least one offer. A failing
    /// supplier never aborts the whole search.
    pub async fn search_flights(&self, params: &SupplySearchParams) -> SearchOutcome {
        let order = resolve_suppliers(params, &self.rules);
        let mut last_attempted = String::new();

        for name in order {
            let Some(adapter) = self.registry.get(&name) else {
                warn!(supplier = %name, "routing rule names an unregistered supplier");
                continue;
            };
            if !adapter.is_available() {
                info!(supplier = %name, "supplier unavailable, falling through");
                continue;
            }

            last_attempted = name.clone();
            match adapter.search_flights(params).await {
                Ok(offers) if !offers.is_empty() => {
                    info!(supplier = %name, count = offers.len(), "search served");
                    return SearchOutcome { offers, source: name };
                }
                Ok(_) => {
                    info!(supplier = %name, "no offers, falling through");
                }
                Err(err) => {
                    warn!(supplier = %name, error = %err, "supplier search failed, falling through");
                }
            }
        }

        SearchOutcome {
            offers: Vec::new(),
            source: last_attempted,
        }
    }

    /// Parallel fan-out across an explicit supplier list. Failures are
    /// isolated per branch and contribute an empty list; results are
    /// combined only after every branch settles, then de-duplicated by
    /// `(flight number, departure time)` with the first supplier in the
    /// given order winning.
    pub async fn search_flights_parallel(
        &self,
        suppliers: &[String],
        params: &SupplySearchParams,
    ) -> Vec<FlightOffer> {
        let branches = suppliers.iter().filter_map(|name| {
            let Some(adapter) = self.registry.get(name) else {
                warn!(supplier = %name, "fan-out list names an unregistered supplier");
                return None;
            };
            if !adapter.is_available() {
                info!(supplier = %name, "supplier unavailable, excluded from fan-out");
                return None;
            }
            let name = name.clone();
            Some(async move {
                match adapter.search_flights(params).await {
                    Ok(offers) => offers,
                    Err(err) => {
                        warn!(supplier = %name, error = %err, "fan-out branch failed");
                        Vec::new()
                    }
                }
            })
        });

        let settled: Vec<Vec<FlightOffer>> = join_all(branches).await;

        let mut seen: HashSet<(String, DateTime<Utc>)> = HashSet::new();
        let mut merged = Vec::new();
        for offers in settled {
            for offer in offers {
                let Some(first) = offer.first_segment() else {
                    continue;
                };
                let key = (first.flight_number.clone(), first.departure.at);
                if seen.insert(key) {
                    merged.push(offer);
                }
            }
        }
        merged
    }

    /// Backward-compatible priced view: fallback search, then every offer
    /// run through the external pricing collaborator (markup/service fee).
    pub async fn search_flights_priced(
        &self,
        params: &SupplySearchParams,
        adjuster: &dyn PriceAdjuster,
    ) -> SupplyResult<SearchOutcome> {
        let outcome = self.search_flights(params).await;
        let mut priced = Vec::with_capacity(outcome.offers.len());
        for offer in outcome.offers {
            priced.push(adjuster.adjust(offer).await?);
        }
        Ok(SearchOutcome {
            offers: priced,
            source: outcome.source,
        })
    }

    /// Booking-path operations delegate to one named supplier and
    /// propagate its canonical error unchanged; there is no fallback
    /// mid-booking.
    pub async fn get_offer_details(
        &self,
        supplier: &str,
        offer_id: &str,
    ) -> SupplyResult<FlightOffer> {
        self.adapter(supplier)?.get_offer_details(offer_id).await
    }

    pub async fn create_booking(
        &self,
        supplier: &str,
        offer_id: &str,
        passengers: &[PassengerInfo],
        payment: &PaymentInfo,
    ) -> SupplyResult<SupplyBooking> {
        self.adapter(supplier)?
            .create_booking(offer_id, passengers, payment)
            .await
    }

    pub async fn cancel_booking(
        &self,
        supplier: &str,
        booking_id: &str,
    ) -> SupplyResult<CancellationResult> {
        self.adapter(supplier)?.cancel_booking(booking_id).await
    }

    pub async fn get_booking(&self, supplier: &str, booking_id: &str) -> SupplyResult<SupplyBooking> {
        self.adapter(supplier)?.get_booking(booking_id).await
    }

    fn adapter(&self, supplier: &str) -> SupplyResult<Arc<dyn SupplierAdapter>> {
        self.registry
            .get(supplier)
            .ok_or_else(|| SupplyError::unknown(supplier, format!("no adapter registered for {}", supplier)))
    }
}
