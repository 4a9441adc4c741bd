use serde::{Deserialize, Serialize};

use voyara_core::{CabinClass, SupplySearchParams};

use crate::adapters::{MOCK, SKYHOP, TRIPGATE};

/// One routing rule. Every predicate set is optional; an unset predicate
/// matches everything, a set predicate must contain the request's value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingRule {
    pub name: String,
    pub airlines: Option<Vec<String>>,
    pub origins: Option<Vec<String>>,
    pub destinations: Option<Vec<String>>,
    pub cabins: Option<Vec<CabinClass>>,
    pub suppliers: Vec<String>,
}

/// Resolve the ordered supplier list for a search. Rules are evaluated
/// top to bottom and the first full match wins, its supplier list
/// returned verbatim; no match falls through to the catch-all order.
pub fn resolve_suppliers(params: &SupplySearchParams, rules: &[RoutingRule]) -> Vec<String> {
    for rule in rules {
        if rule_matches(rule, params) {
            return rule.suppliers.clone();
        }
    }
    catch_all_suppliers()
}

/// Hard-coded fallback chain used when no rule matches.
pub fn catch_all_suppliers() -> Vec<String> {
    vec![SKYHOP.to_string(), TRIPGATE.to_string(), MOCK.to_string()]
}

fn rule_matches(rule: &RoutingRule, params: &SupplySearchParams) -> bool {
    // A rule that filters on airline never matches a request without one,
    // so airline-specific NDC rules cannot swallow generic traffic.
    if let Some(airlines) = &rule.airlines {
        match &params.airline {
            Some(code) if airlines.iter().any(|a| a == code) => {}
            _ => return false,
        }
    }
    if let Some(origins) = &rule.origins {
        if !origins.iter().any(|o| o == &params.origin) {
            return false;
        }
    }
    if let Some(destinations) = &rule.destinations {
        if !destinations.iter().any(|d| d == &params.destination) {
            return false;
        }
    }
    if let Some(cabins) = &rule.cabins {
        if !cabins.contains(&params.cabin) {
            return false;
        }
    }
    true
}

/// Shipped routing table. Airline-specific NDC integrations are added by
/// inserting a higher-priority rule here, with zero orchestration changes.
pub fn default_rules() -> Vec<RoutingRule> {
    vec![
        RoutingRule {
            name: "ndc-direct-airlines".to_string(),
            airlines: Some(vec!["BA".to_string(), "AF".to_string(), "KL".to_string()]),
            origins: None,
            destinations: None,
            cabins: None,
            suppliers: vec![SKYHOP.to_string(), TRIPGATE.to_string()],
        },
        RoutingRule {
            name: "premium-cabins-gds-first".to_string(),
            airlines: None,
            origins: None,
            destinations: None,
            cabins: Some(vec![CabinClass::Business, CabinClass::First]),
            suppliers: vec![TRIPGATE.to_string(), SKYHOP.to_string(), MOCK.to_string()],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn params(airline: Option<&str>, cabin: CabinClass) -> SupplySearchParams {
        SupplySearchParams {
            origin: "BLR".to_string(),
            destination: "DEL".to_string(),
            departure_date: NaiveDate::from_ymd_opt(2026, 9, 14).unwrap(),
            return_date: None,
            passengers: 1,
            cabin,
            airline: airline.map(|a| a.to_string()),
            max_results: 10,
            currency: "INR".to_string(),
        }
    }

    #[test]
    fn test_airline_rule_never_matches_airline_less_request() {
        let rules = vec![RoutingRule {
            name: "ba-only".to_string(),
            airlines: Some(vec!["BA".to_string()]),
            origins: Some(vec!["BLR".to_string()]),
            destinations: Some(vec!["DEL".to_string()]),
            cabins: None,
            suppliers: vec!["skyhop".to_string()],
        }];

        // Every other predicate matches, but no airline on the request.
        let resolved = resolve_suppliers(&params(None, CabinClass::Economy), &rules);
        assert_eq!(resolved, catch_all_suppliers());

        let resolved = resolve_suppliers(&params(Some("BA"), CabinClass::Economy), &rules);
        assert_eq!(resolved, vec!["skyhop".to_string()]);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let rules = vec![
            RoutingRule {
                name: "first".to_string(),
                airlines: None,
                origins: Some(vec!["BLR".to_string()]),
                destinations: None,
                cabins: None,
                suppliers: vec!["tripgate".to_string()],
            },
            RoutingRule {
                name: "second".to_string(),
                airlines: None,
                origins: Some(vec!["BLR".to_string()]),
                destinations: Some(vec!["DEL".to_string()]),
                cabins: None,
                suppliers: vec!["mock".to_string()],
            },
        ];

        let resolved = resolve_suppliers(&params(None, CabinClass::Economy), &rules);
        assert_eq!(resolved, vec!["tripgate".to_string()]);
    }

    #[test]
    fn test_no_match_returns_catch_all() {
        let rules = vec![RoutingRule {
            name: "lhr-only".to_string(),
            airlines: None,
            origins: Some(vec!["LHR".to_string()]),
            destinations: None,
            cabins: None,
            suppliers: vec!["skyhop".to_string()],
        }];

        let resolved = resolve_suppliers(&params(None, CabinClass::Economy), &rules);
        assert_eq!(resolved, catch_all_suppliers());
    }

    #[test]
    fn test_cabin_predicate() {
        let resolved = resolve_suppliers(&params(None, CabinClass::Business), &default_rules());
        assert_eq!(resolved.first().map(String::as_str), Some(TRIPGATE));
    }
}
