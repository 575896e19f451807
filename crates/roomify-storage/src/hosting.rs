//! Hosting configuration and slug helpers.
//!
//! The hosting configuration lives in the key-value store under
//! [`HOSTING_CONFIG_KEY`]. It is fetched once and created when absent.

use rand::Rng;
use roomify_core::constants::{HOSTING_CONFIG_KEY, HOSTING_SLUG_PREFIX, HOSTING_SLUG_RANDOM_LEN};
use roomify_core::{HostedAsset, HostingConfig};

use crate::traits::{KeyValueStore, KvResult};

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36_DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    // Only ASCII digits and lowercase letters were pushed
    digits.into_iter().map(char::from).collect()
}

/// Assemble a slug from a millisecond timestamp and a random suffix.
pub fn format_hosting_slug(timestamp_millis: u64, random_suffix: &str) -> String {
    format!(
        "{}-{}-{}",
        HOSTING_SLUG_PREFIX,
        to_base36(timestamp_millis),
        random_suffix
    )
}

/// Generate a new hosting slug: `roomify-<millis base36>-<6 random base36 chars>`.
///
/// Not guaranteed unique; two calls within the same millisecond collide with
/// probability 36^-6.
pub fn create_hosting_slug() -> String {
    let millis = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default();
    let mut rng = rand::rng();
    let suffix: String = (0..HOSTING_SLUG_RANDOM_LEN)
        .map(|_| char::from(BASE36_DIGITS[rng.random_range(0..BASE36_DIGITS.len())]))
        .collect();
    format_hosting_slug(millis, &suffix)
}

/// Fetch the stored hosting configuration.
///
/// Returns `None` when the key is absent, the stored document does not parse,
/// or its subdomain is empty.
#[tracing::instrument(skip(store))]
pub async fn get_hosting_config(store: &dyn KeyValueStore) -> KvResult<Option<HostingConfig>> {
    let Some(value) = store.get(HOSTING_CONFIG_KEY).await? else {
        return Ok(None);
    };

    match serde_json::from_value::<HostingConfig>(value) {
        Ok(config) if !config.subdomain.trim().is_empty() => Ok(Some(config)),
        Ok(_) => {
            tracing::warn!(key = HOSTING_CONFIG_KEY, "Stored hosting config has an empty subdomain");
            Ok(None)
        }
        Err(e) => {
            tracing::warn!(
                key = HOSTING_CONFIG_KEY,
                error = %e,
                "Stored hosting config is malformed"
            );
            Ok(None)
        }
    }
}

/// Return the stored hosting configuration, creating and persisting one when absent.
#[tracing::instrument(skip(store))]
pub async fn get_or_create_hosting_config(store: &dyn KeyValueStore) -> KvResult<HostingConfig> {
    if let Some(existing) = get_hosting_config(store).await? {
        tracing::debug!(subdomain = %existing.subdomain, "Using existing hosting config");
        return Ok(existing);
    }

    let config = HostingConfig::new(create_hosting_slug());
    store
        .set(HOSTING_CONFIG_KEY, serde_json::to_value(&config)?)
        .await?;

    tracing::info!(
        subdomain = %config.subdomain,
        backend = %store.backend_type(),
        "Created hosting config"
    );

    Ok(config)
}

/// Public URL of the hosted site for `config`.
pub fn hosted_asset(config: &HostingConfig) -> HostedAsset {
    HostedAsset {
        url: format!("https://{}", config.host()),
    }
}
