//! System configuration document.
//!
//! Stored as a single JSON object under the `config` key. Missing fields
//! fall back to defaults so older documents keep loading.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub system_name: String,
    pub version: String,
    /// While set, only admins may write records.
    pub maintenance: bool,
    /// While unset, self-registration is refused.
    pub registration_open: bool,
    /// Accepted email hosts. Empty accepts any host.
    pub institutional_domains: Vec<String>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            system_name: "Research Records".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            maintenance: false,
            registration_open: true,
            institutional_domains: vec![
                "uleam.edu.ec".to_string(),
                "est.uleam.edu.ec".to_string(),
            ],
        }
    }
}
