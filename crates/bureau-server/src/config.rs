//! Server configuration
//!
//! Read from the environment (a `.env` file is honoured) at start-up.

use anyhow::{Context, Result};
use bureau::DomainConfig;

/// Longest default signature window accepted, in days
pub const MAX_SIGNATURE_EXPIRY_DAYS: i64 = 36_500;

/// Configuration for the HTTP server and the stores behind it
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind_addr: String,
    /// Bearer token required on `/bureau` routes; `None` disables auth
    pub api_key: Option<String>,
    /// Seconds between signature expiry sweeps; 0 disables the sweep
    pub expiry_sweep_secs: u64,
    /// Validation rules and defaults handed to the application services
    pub domain: DomainConfig,
}

impl ServerConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!("No .env file loaded: {}", e);
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup, starting from the defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(addr) = lookup("BUREAU_BIND_ADDR") {
            config = config.with_bind_addr(addr);
        }
        if let Some(key) = lookup("BUREAU_API_KEY").filter(|k| !k.trim().is_empty()) {
            config = config.with_api_key(key);
        }
        if let Some(secs) = lookup("BUREAU_EXPIRY_SWEEP_SECS") {
            config.expiry_sweep_secs = secs
                .parse()
                .with_context(|| format!("BUREAU_EXPIRY_SWEEP_SECS is not a number: {secs}"))?;
        }
        if let Some(days) = lookup("BUREAU_SIGNATURE_EXPIRY_DAYS") {
            let days: i64 = days
                .parse()
                .with_context(|| format!("BUREAU_SIGNATURE_EXPIRY_DAYS is not a number: {days}"))?;
            anyhow::ensure!(days > 0, "BUREAU_SIGNATURE_EXPIRY_DAYS must be positive");
            anyhow::ensure!(
                days <= MAX_SIGNATURE_EXPIRY_DAYS,
                "BUREAU_SIGNATURE_EXPIRY_DAYS must be at most {MAX_SIGNATURE_EXPIRY_DAYS}"
            );
            config.domain = config.domain.with_signature_expiry_days(days);
        }
        if let Some(bytes) = lookup("BUREAU_MAX_UPLOAD_BYTES") {
            let bytes: u64 = bytes
                .parse()
                .with_context(|| format!("BUREAU_MAX_UPLOAD_BYTES is not a number: {bytes}"))?;
            config.domain = config.domain.with_max_upload_bytes(bytes);
        }
        if let Some(types) = lookup("BUREAU_ALLOWED_MIME_TYPES") {
            let types = types
                .split(',')
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect();
            config.domain = config.domain.with_allowed_mime_types(types);
        }

        Ok(config)
    }

    pub fn with_bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_domain(mut self, domain: DomainConfig) -> Self {
        self.domain = domain;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            api_key: None,
            expiry_sweep_secs: 300,
            domain: DomainConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert!(config.api_key.is_none());
        assert_eq!(config.domain.signature_expiry_days, 30);
    }

    #[test]
    fn test_environment_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("BUREAU_BIND_ADDR", "127.0.0.1:9000"),
            ("BUREAU_API_KEY", "secret"),
            ("BUREAU_SIGNATURE_EXPIRY_DAYS", "7"),
            ("BUREAU_MAX_UPLOAD_BYTES", "1024"),
            ("BUREAU_ALLOWED_MIME_TYPES", "application/pdf, image/png"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.domain.signature_expiry_days, 7);
        assert_eq!(config.domain.max_upload_bytes, 1024);
        assert_eq!(config.domain.allowed_mime_types, vec!["application/pdf", "image/png"]);
    }

    #[test]
    fn test_bad_numbers_are_reported() {
        assert!(ServerConfig::from_lookup(lookup(&[("BUREAU_SIGNATURE_EXPIRY_DAYS", "soon")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[("BUREAU_SIGNATURE_EXPIRY_DAYS", "0")])).is_err());
        // Blank key means auth stays off
        let config = ServerConfig::from_lookup(lookup(&[("BUREAU_API_KEY", "  ")])).unwrap();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_signature_expiry_days_are_bounded() {
        let config =
            ServerConfig::from_lookup(lookup(&[("BUREAU_SIGNATURE_EXPIRY_DAYS", "36500")])).unwrap();
        assert_eq!(config.domain.signature_expiry_days, MAX_SIGNATURE_EXPIRY_DAYS);

        let err = ServerConfig::from_lookup(lookup(&[("BUREAU_SIGNATURE_EXPIRY_DAYS", "36501")]))
            .unwrap_err();
        assert!(err.to_string().contains("at most"));
        assert!(ServerConfig::from_lookup(lookup(&[(
            "BUREAU_SIGNATURE_EXPIRY_DAYS",
            "200000000000000"
        )]))
        .is_err());
    }
}
