use std::cmp::Ordering;

use tracing::debug;
use voyara_core::FlightOffer;

use crate::learning::PreferenceEngine;
use crate::model::{FamiliarityLevel, OfferScore, RouteFamiliarity};
use crate::scoring::score_offer;
use crate::store::PrefError;

/// Price difference (in local currency units) still read as "about
/// average".
const ABOUT_AVERAGE_BAND: f64 = 50.0;
/// Above this difference the phrasing hardens from "more than average"
/// to "more than usual".
const NOTICEABLY_ABOVE: f64 = 200.0;

#[derive(Debug, Clone)]
pub struct ScoredOffer {
    pub offer: FlightOffer,
    pub score: OfferScore,
}

/// Familiarity-gated recommendation: the better the engine knows the
/// route, the shorter and more assertive the output.
#[derive(Debug, Clone)]
pub struct Recommendation {
    pub level: FamiliarityLevel,
    pub offers: Vec<ScoredOffer>,
    pub message: Option<String>,
}

impl PreferenceEngine {
    /// Score and rank offers for one route, then cut the list according
    /// to familiarity: autopilot keeps the single best with a confidence
    /// sentence, learning keeps three, discovery keeps five with no
    /// commentary.
    pub async fn get_recommendation(
        &self,
        user_id: &str,
        route: &str,
        offers: Vec<FlightOffer>,
    ) -> Result<Recommendation, PrefError> {
        let prefs = self.store.get_preferences(user_id).await?;
        let familiarity = self.store.get_route_familiarity(user_id, route).await?;

        let mut scored: Vec<ScoredOffer> = offers
            .into_iter()
            .map(|offer| {
                let score = score_offer(&offer, prefs.as_ref(), familiarity.as_ref());
                ScoredOffer { offer, score }
            })
            .collect();
        scored.sort_by(|a, b| {
            b.score
                .total
                .partial_cmp(&a.score.total)
                .unwrap_or(Ordering::Equal)
        });

        let level = familiarity
            .as_ref()
            .map(|f| f.level)
            .unwrap_or(FamiliarityLevel::Discovery);
        debug!(%route, ?level, candidates = scored.len(), "assembling recommendation");

        let (keep, message) = match level {
            FamiliarityLevel::Autopilot => {
                let message = familiarity.as_ref().map(|f| {
                    format!(
                        "You have booked this route {} times; this matches how you usually fly it.",
                        f.times_booked
                    )
                });
                (1, message)
            }
            FamiliarityLevel::Learning => {
                let message = familiarity
                    .as_ref()
                    .and_then(|f| f.preferred_airline_name.as_deref())
                    .map(|name| format!("On your recent trips you have tended to pick {}.", name));
                (3, message)
            }
            FamiliarityLevel::Discovery => (5, None),
        };
        scored.truncate(keep);

        Ok(Recommendation {
            level,
            offers: scored,
            message,
        })
    }
}

/// Compare a live price to route history. Returns nothing below two
/// historical bookings; one data point is not a trend.
pub fn generate_price_insight(price: f64, route: Option<&RouteFamiliarity>) -> Option<String> {
    let route = route?;
    if route.times_booked < 2 {
        return None;
    }

    if price <= route.min_price_paid {
        return Some("This is the lowest price you have seen on this route.".to_string());
    }

    let diff = price - route.avg_price_paid;
    let insight = if diff < -ABOUT_AVERAGE_BAND {
        format!("{:.0} less than you usually pay on this route.", -diff)
    } else if diff.abs() <= ABOUT_AVERAGE_BAND {
        "About average for this route.".to_string()
    } else if diff > NOTICEABLY_ABOVE {
        format!("{:.0} more than you usually pay on this route.", diff)
    } else {
        "A bit more than average for this route.".to_string()
    };
    Some(insight)
}
