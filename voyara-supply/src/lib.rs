pub mod adapters;
pub mod config;
pub mod manager;
pub mod registry;
pub mod rules;

pub use config::{SupplierCredentials, SupplyConfig};
pub use manager::{SearchOutcome, SupplyManager};
pub use registry::AdapterRegistry;
pub use rules::{default_rules, resolve_suppliers, RoutingRule};
