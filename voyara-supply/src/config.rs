use serde::Deserialize;
use std::env;

/// Credentials for one real supplier integration. An adapter whose
/// section is absent reports itself unavailable and is skipped by the
/// supply manager.
#[derive(Debug, Deserialize, Clone)]
pub struct SupplierCredentials {
    pub base_url: String,
    pub api_key: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SupplyConfig {
    #[serde(default)]
    pub skyhop: Option<SupplierCredentials>,
    #[serde(default)]
    pub tripgate: Option<SupplierCredentials>,
}

impl SupplyConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            // Environment-specific file, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // E.g. VOYARA_SKYHOP__API_KEY=... sets skyhop.api_key
            .add_source(config::Environment::with_prefix("VOYARA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
