//! # Marketplace Configuration
//!
//! A typed configuration struct loaded once at startup. Every timer has its
//! default baked in, so no business path carries a fallback constant.
//!
//! ## Layering
//!
//! Later sources override earlier ones:
//!
//! ```text
//! defaults → YAML file → key/value rows → AGRIMART_* environment
//! ```
//!
//! Key/value rows use the upper-case key names (`DISPUTE_RESPONSE_MINUTES`)
//! so that a row-oriented store can feed [`MarketConfig::apply_entries`]
//! directly.
//!
//! ## Sharing
//!
//! [`SharedConfig`] wraps the live config in a lock. The lazy timing gate on
//! the request path and the eager sweeps read through the same handle, so an
//! admin update is observed by both.

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "AGRIMART_";

/// The recognised configuration keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    /// Minimum dwell between `shipped` and `delivered`.
    ShippedToDeliveredMinutes,
    /// Window after delivery before automatic receipt, and the dispute
    /// creation window for delivered/received orders.
    DeliveredToReceivedMinutes,
    /// How long a seller has to respond to a dispute before escalation.
    DisputeResponseMinutes,
    /// Delivery estimate applied at first shipment when none was supplied.
    DefaultDeliveryEstimateDays,
    /// Cadence of the background sweeps.
    SweepIntervalSeconds,
}

impl ConfigKey {
    /// Every key, in documentation order.
    pub const ALL: [ConfigKey; 5] = [
        Self::ShippedToDeliveredMinutes,
        Self::DeliveredToReceivedMinutes,
        Self::DisputeResponseMinutes,
        Self::DefaultDeliveryEstimateDays,
        Self::SweepIntervalSeconds,
    ];

    /// Largest accepted value: a year of minutes, ten years of days, a day
    /// of sweep interval.
    pub fn max_value(&self) -> u32 {
        match self {
            Self::ShippedToDeliveredMinutes
            | Self::DeliveredToReceivedMinutes
            | Self::DisputeResponseMinutes => 525_600,
            Self::DefaultDeliveryEstimateDays => 3_650,
            Self::SweepIntervalSeconds => 86_400,
        }
    }

    /// Upper-case key name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShippedToDeliveredMinutes => "SHIPPED_TO_DELIVERED_MINUTES",
            Self::DeliveredToReceivedMinutes => "DELIVERED_TO_RECEIVED_MINUTES",
            Self::DisputeResponseMinutes => "DISPUTE_RESPONSE_MINUTES",
            Self::DefaultDeliveryEstimateDays => "DEFAULT_DELIVERY_ESTIMATE_DAYS",
            Self::SweepIntervalSeconds => "SWEEP_INTERVAL_SECONDS",
        }
    }
}

impl std::fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == upper)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

/// Typed marketplace configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarketConfig {
    /// Minutes an item must stay `shipped` before it may become `delivered`.
    pub shipped_to_delivered_minutes: u32,
    /// Minutes after delivery before the order is auto-confirmed as received.
    pub delivered_to_received_minutes: u32,
    /// Minutes a seller has to respond to a dispute.
    pub dispute_response_minutes: u32,
    /// Days added to the first shipment time when no estimate was supplied.
    pub default_delivery_estimate_days: u32,
    /// Seconds between sweep runs.
    pub sweep_interval_seconds: u32,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            shipped_to_delivered_minutes: 10,
            delivered_to_received_minutes: 10,
            dispute_response_minutes: 10,
            default_delivery_estimate_days: 7,
            sweep_interval_seconds: 60,
        }
    }
}

impl MarketConfig {
    /// Read a value by key.
    pub fn get(&self, key: ConfigKey) -> u32 {
        match key {
            ConfigKey::ShippedToDeliveredMinutes => self.shipped_to_delivered_minutes,
            ConfigKey::DeliveredToReceivedMinutes => self.delivered_to_received_minutes,
            ConfigKey::DisputeResponseMinutes => self.dispute_response_minutes,
            ConfigKey::DefaultDeliveryEstimateDays => self.default_delivery_estimate_days,
            ConfigKey::SweepIntervalSeconds => self.sweep_interval_seconds,
        }
    }

    /// Set a value by key. Zero and values above [`ConfigKey::max_value`]
    /// are rejected.
    pub fn set(&mut self, key: ConfigKey, value: u32) -> Result<(), ConfigError> {
        check_range(key, value)?;
        let slot = match key {
            ConfigKey::ShippedToDeliveredMinutes => &mut self.shipped_to_delivered_minutes,
            ConfigKey::DeliveredToReceivedMinutes => &mut self.delivered_to_received_minutes,
            ConfigKey::DisputeResponseMinutes => &mut self.dispute_response_minutes,
            ConfigKey::DefaultDeliveryEstimateDays => &mut self.default_delivery_estimate_days,
            ConfigKey::SweepIntervalSeconds => &mut self.sweep_interval_seconds,
        };
        *slot = value;
        Ok(())
    }

    /// Parse and set a raw string value.
    pub fn set_raw(&mut self, key: &str, raw: &str) -> Result<(), ConfigError> {
        let key: ConfigKey = key.parse()?;
        let value = raw
            .trim()
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidValue {
                key: key.as_str().to_string(),
                value: raw.to_string(),
            })?;
        self.set(key, value)
    }

    /// Apply key/value rows on top of the current values.
    pub fn apply_entries<'a, I>(&mut self, entries: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (key, value) in entries {
            self.set_raw(key, value)?;
        }
        Ok(())
    }

    /// Apply `AGRIMART_<KEY>` variables from an environment listing.
    /// Variables without the prefix are ignored.
    pub fn apply_env<I>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in vars {
            if let Some(key) = name.strip_prefix(ENV_PREFIX) {
                if key.parse::<ConfigKey>().is_ok() {
                    self.set_raw(key, &value)?;
                }
            }
        }
        Ok(())
    }

    /// Parse a YAML document. Missing keys keep their defaults.
    pub fn from_yaml_str(yaml: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        Self::from_yaml_str(&content, &display)
    }

    /// Full startup load: defaults, then the optional file, then the process
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_yaml_file(p)?,
            None => Self::default(),
        };
        config.apply_env(std::env::vars())?;
        tracing::debug!(?config, "marketplace configuration loaded");
        Ok(config)
    }

    /// Reject zero or out-of-range values that may have come from a file.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for key in ConfigKey::ALL {
            check_range(key, self.get(key))?;
        }
        Ok(())
    }

    /// Key/value listing in documentation order.
    pub fn entries(&self) -> Vec<(ConfigKey, u32)> {
        ConfigKey::ALL.iter().map(|k| (*k, self.get(*k))).collect()
    }
}

fn check_range(key: ConfigKey, value: u32) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            key: key.as_str().to_string(),
            value: value.to_string(),
        });
    }
    if value > key.max_value() {
        return Err(ConfigError::OutOfRange {
            key: key.as_str().to_string(),
            value,
            max: key.max_value(),
        });
    }
    Ok(())
}

/// Live, shared configuration handle.
#[derive(Debug, Clone, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<MarketConfig>>,
}

impl SharedConfig {
    /// Wrap a loaded configuration.
    pub fn new(config: MarketConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// A copy of the current values.
    pub fn snapshot(&self) -> MarketConfig {
        self.inner.read().clone()
    }

    /// Update one key at runtime.
    pub fn set(&self, key: ConfigKey, value: u32) -> Result<(), ConfigError> {
        self.inner.write().set(key, value)?;
        tracing::info!(key = key.as_str(), value, "configuration updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = MarketConfig::default();
        assert_eq!(c.get(ConfigKey::ShippedToDeliveredMinutes), 10);
        assert_eq!(c.get(ConfigKey::DeliveredToReceivedMinutes), 10);
        assert_eq!(c.get(ConfigKey::DisputeResponseMinutes), 10);
        assert_eq!(c.get(ConfigKey::DefaultDeliveryEstimateDays), 7);
        assert_eq!(c.get(ConfigKey::SweepIntervalSeconds), 60);
    }

    #[test]
    fn key_parse_accepts_any_case() {
        assert_eq!(
            "dispute_response_minutes".parse::<ConfigKey>().unwrap(),
            ConfigKey::DisputeResponseMinutes
        );
        assert!("MAX_CART_SIZE".parse::<ConfigKey>().is_err());
    }

    #[test]
    fn entries_override_defaults() {
        let mut c = MarketConfig::default();
        c.apply_entries([("SHIPPED_TO_DELIVERED_MINUTES", "30"), ("DISPUTE_RESPONSE_MINUTES", " 45 ")])
            .unwrap();
        assert_eq!(c.shipped_to_delivered_minutes, 30);
        assert_eq!(c.dispute_response_minutes, 45);
        assert_eq!(c.delivered_to_received_minutes, 10);
    }

    #[test]
    fn entries_reject_non_positive_values() {
        let mut c = MarketConfig::default();
        assert!(c.apply_entries([("SHIPPED_TO_DELIVERED_MINUTES", "0")]).is_err());
        assert!(c.apply_entries([("SHIPPED_TO_DELIVERED_MINUTES", "-5")]).is_err());
        assert!(c.apply_entries([("SHIPPED_TO_DELIVERED_MINUTES", "ten")]).is_err());
        assert!(c.apply_entries([("NOT_A_KEY", "5")]).is_err());
    }

    #[test]
    fn env_overrides_only_prefixed_known_keys() {
        let mut c = MarketConfig::default();
        c.apply_env(vec![
            ("AGRIMART_DELIVERED_TO_RECEIVED_MINUTES".to_string(), "1440".to_string()),
            ("DISPUTE_RESPONSE_MINUTES".to_string(), "99".to_string()),
            ("AGRIMART_LOG_FORMAT".to_string(), "json".to_string()),
        ])
        .unwrap();
        assert_eq!(c.delivered_to_received_minutes, 1440);
        assert_eq!(c.dispute_response_minutes, 10);
    }

    #[test]
    fn yaml_partial_document_keeps_defaults() {
        let c = MarketConfig::from_yaml_str("dispute_response_minutes: 120\n", "inline").unwrap();
        assert_eq!(c.dispute_response_minutes, 120);
        assert_eq!(c.shipped_to_delivered_minutes, 10);
    }

    #[test]
    fn yaml_rejects_unknown_fields_and_zero() {
        assert!(MarketConfig::from_yaml_str("max_cart: 3\n", "inline").is_err());
        assert!(MarketConfig::from_yaml_str("sweep_interval_seconds: 0\n", "inline").is_err());
    }

    #[test]
    fn values_above_the_key_maximum_are_rejected() {
        let mut c = MarketConfig::default();
        let err = c.set(ConfigKey::DefaultDeliveryEstimateDays, u32::MAX).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { max: 3_650, .. }));
        assert_eq!(c.default_delivery_estimate_days, 7);
        c.set(ConfigKey::DefaultDeliveryEstimateDays, 3_650).unwrap();
        assert!(MarketConfig::from_yaml_str("sweep_interval_seconds: 86401\n", "inline").is_err());
    }

    #[test]
    fn yaml_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agrimart.yaml");
        std::fs::write(&path, "shipped_to_delivered_minutes: 5\nsweep_interval_seconds: 15\n").unwrap();
        let c = MarketConfig::from_yaml_file(&path).unwrap();
        assert_eq!(c.shipped_to_delivered_minutes, 5);
        assert_eq!(c.sweep_interval_seconds, 15);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = MarketConfig::from_yaml_file(Path::new("/nonexistent/agrimart.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn shared_config_updates_are_visible_to_clones() {
        let shared = SharedConfig::new(MarketConfig::default());
        let reader = shared.clone();
        shared.set(ConfigKey::DisputeResponseMinutes, 3).unwrap();
        assert_eq!(reader.snapshot().dispute_response_minutes, 3);
        assert!(shared.set(ConfigKey::DisputeResponseMinutes, 0).is_err());
        assert_eq!(reader.snapshot().dispute_response_minutes, 3);
    }

    mod props {
        use super::super::*;
        use proptest::prelude::*;

        fn any_key() -> impl Strategy<Value = ConfigKey> {
            prop::sample::select(ConfigKey::ALL.to_vec())
        }

        proptest! {
            #[test]
            fn positive_value_is_read_back(
                (key, value) in any_key().prop_flat_map(|k| (Just(k), 1u32..=k.max_value()))
            ) {
                let mut c = MarketConfig::default();
                c.set_raw(&key.as_str().to_ascii_lowercase(), &value.to_string()).unwrap();
                prop_assert_eq!(c.get(key), value);
                prop_assert!(c.validate().is_ok());
            }

            #[test]
            fn failed_entry_leaves_other_keys_alone(key in any_key()) {
                let mut c = MarketConfig::default();
                prop_assert!(c.apply_entries([(key.as_str(), "0")]).is_err());
                prop_assert_eq!(c, MarketConfig::default());
            }
        }
    }
}
