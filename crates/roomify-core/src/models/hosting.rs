use serde::{Deserialize, Serialize};

use crate::constants::HOSTING_DOMAIN_SUFFIX;

/// Hosting configuration persisted under the hosting config key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostingConfig {
    pub subdomain: String,
}

impl HostingConfig {
    pub fn new(subdomain: impl Into<String>) -> Self {
        Self {
            subdomain: subdomain.into(),
        }
    }

    /// Fully qualified host name, e.g. `roomify-abc.puter.site`.
    pub fn host(&self) -> String {
        format!("{}{}", self.subdomain, HOSTING_DOMAIN_SUFFIX)
    }
}

/// A publicly reachable asset on the hosted site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedAsset {
    pub url: String,
}
