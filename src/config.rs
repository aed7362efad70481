//! Scan configuration
//!
//! Tuning knobs for the pipeline plus the [`Capabilities`] value that decides
//! which lookup backends are wired in at construction.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which enrichment backends are enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// NS/A/AAAA/MX lookups
    pub dns: bool,
    /// Registration date lookups
    pub whois: bool,
    /// `Server` header of `http://<candidate>/`
    pub http_banner: bool,
    /// Greeting of the candidate's mail exchanger
    pub smtp_banner: bool,
}

impl Capabilities {
    /// Everything off. The pipeline still runs but finds nothing.
    pub fn none() -> Self {
        Self {
            dns: false,
            whois: false,
            http_banner: false,
            smtp_banner: false,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            dns: true,
            whois: true,
            http_banner: false,
            smtp_banner: false,
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Candidates enriched concurrently
    pub concurrency: usize,

    /// Deadline for each DNS query
    #[serde(with = "millis")]
    pub dns_timeout: Duration,

    /// Deadline for the WHOIS query
    #[serde(with = "millis")]
    pub whois_timeout: Duration,

    /// Deadline for each banner grab
    #[serde(with = "millis")]
    pub banner_timeout: Duration,

    /// Deadline for a candidate's whole enrichment chain
    #[serde(with = "millis")]
    pub candidate_timeout: Duration,

    /// Cap on candidates per watched domain (unlimited if not specified)
    pub max_variants: Option<usize>,

    /// Enabled backends
    pub capabilities: Capabilities,
}

impl ScanConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.concurrency == 0 {
            return Err(crate::Error::config("concurrency must be at least 1"));
        }

        for (name, value) in [
            ("dns_timeout", self.dns_timeout),
            ("whois_timeout", self.whois_timeout),
            ("banner_timeout", self.banner_timeout),
            ("candidate_timeout", self.candidate_timeout),
        ] {
            if value.is_zero() {
                return Err(crate::Error::config(format!("{name} must be non-zero")));
            }
        }

        Ok(())
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            concurrency: 16,
            dns_timeout: Duration::from_secs(1),
            whois_timeout: Duration::from_secs(5),
            banner_timeout: Duration::from_secs(2),
            candidate_timeout: Duration::from_secs(15),
            max_variants: None,
            capabilities: Capabilities::default(),
        }
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ScanConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.dns_timeout, Duration::from_secs(1));
        assert_eq!(config.whois_timeout, Duration::from_secs(5));
        assert!(config.capabilities.dns);
        assert!(!config.capabilities.http_banner);
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let config = ScanConfig {
            concurrency: 0,
            ..ScanConfig::default()
        };
        assert!(matches!(config.validate(), Err(crate::Error::Config(_))));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: ScanConfig =
            serde_json::from_str(r#"{"concurrency": 4, "dns_timeout": 250}"#).unwrap();
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.dns_timeout, Duration::from_millis(250));
        assert_eq!(config.whois_timeout, Duration::from_secs(5));
        assert_eq!(config.capabilities, Capabilities::default());
    }
}
