//! Domain name syntax: the candidate validator and the parsed watched domain.

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

use crate::error::{Error, Result};

const MAX_DOMAIN_LEN: usize = 255;

lazy_static! {
    // ASCII only; IDNs are not supported.
    static ref DOMAIN_RE: Regex =
        Regex::new(r"(?i-u)\A([a-z0-9]+(-[a-z0-9]+)*\.)+[a-z]{2,}\z").unwrap();
}

/// Whether `domain` is a well-formed domain name.
///
/// One trailing dot is allowed. The length limit applies to the input as
/// given.
pub fn is_valid_domain(domain: &str) -> bool {
    if domain.len() > MAX_DOMAIN_LEN {
        return false;
    }
    let domain = domain.strip_suffix('.').unwrap_or(domain);
    DOMAIN_RE.is_match(domain)
}

/// Validate and canonicalize: lowercase, trailing dot removed.
pub fn normalize_domain(domain: &str) -> Option<String> {
    if !is_valid_domain(domain) {
        return None;
    }
    let domain = domain.strip_suffix('.').unwrap_or(domain);
    Some(domain.to_ascii_lowercase())
}

/// A watched domain split into the part that gets mutated and its TLD.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BaseDomain {
    label: String,
    tld: String,
}

impl BaseDomain {
    /// Parse a watched domain. Everything before the last dot is the label.
    pub fn parse(input: &str) -> Result<Self> {
        let domain = normalize_domain(input.trim())
            .ok_or_else(|| Error::invalid_domain(input.to_string()))?;

        match domain.rfind('.') {
            Some(dot_pos) => Ok(Self {
                label: domain[..dot_pos].to_string(),
                tld: domain[dot_pos + 1..].to_string(),
            }),
            None => Err(Error::invalid_domain(input.to_string())),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn tld(&self) -> &str {
        &self.tld
    }

    /// Reattach the TLD to a mutated label
    pub fn qualify(&self, label: &str) -> String {
        format!("{}.{}", label, self.tld)
    }
}

impl fmt::Display for BaseDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.label, self.tld)
    }
}
