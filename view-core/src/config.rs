use serde::Deserialize;

use crate::url::encode_query_value;

pub const DEFAULT_FLASH_SCRUB_DELAY_MS: u32 = 100;

/// Query parameters carrying one-time success/error notices.
pub const FLASH_PARAMS: [&str; 8] = [
    "link_success",
    "link_error",
    "unlink_success",
    "unlink_error",
    "copy_success",
    "copy_error",
    "stop_success",
    "stop_error",
];

/// Runtime settings for the dashboard scripts. Every field has a default so
/// a partial (or absent) host-provided config is always usable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DashboardConfig {
    /// Prefix for JSON endpoints; empty means same origin.
    pub api_base: String,
    pub flash_scrub_delay_ms: u32,
    pub flash_params: Vec<String>,
    /// Prepended to every durable storage key.
    pub storage_prefix: String,
    /// Currency code used when rendering aggregate PnL figures.
    pub currency: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            flash_scrub_delay_ms: DEFAULT_FLASH_SCRUB_DELAY_MS,
            flash_params: FLASH_PARAMS.iter().map(|p| p.to_string()).collect(),
            storage_prefix: String::new(),
            currency: "USD".to_string(),
        }
    }
}

impl DashboardConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// `GET` URL of the server list for `broker_code`.
    pub fn server_list_url(&self, broker_code: &str) -> String {
        format!(
            "{}/accounts/servers?brokerCode={}",
            self.api_base.trim_end_matches('/'),
            encode_query_value(broker_code)
        )
    }
}
