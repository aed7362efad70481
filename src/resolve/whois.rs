//! WHOIS transport seam, the port-43 client, and registration date parsing.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::error::LookupError;

/// Registration timestamps; each absent when unknown
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhoisRecord {
    pub created: Option<String>,
    pub updated: Option<String>,
}

/// Fetches the raw WHOIS response for a domain
#[async_trait]
pub trait WhoisTransport: Send + Sync {
    async fn query(&self, domain: &str) -> Result<String, LookupError>;
}

/// Plain-text WHOIS over TCP port 43, server picked by TLD
pub struct TcpWhoisTransport {
    timeout: Duration,
}

impl TcpWhoisTransport {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl WhoisTransport for TcpWhoisTransport {
    async fn query(&self, domain: &str) -> Result<String, LookupError> {
        let tld = domain.rsplit('.').next().unwrap_or("");
        let server = whois_server(tld);
        let raw = fetch(server, domain, self.timeout).await?;

        if server != IANA_SERVER {
            return Ok(raw);
        }

        // IANA only knows the TLD; ask the registry it points at
        let registry = iana_referral(&raw).ok_or_else(|| {
            LookupError::Whois(format!("no registry referral for .{}", tld))
        })?;
        fetch(&format!("{}:43", registry), domain, self.timeout).await
    }
}

const IANA_SERVER: &str = "whois.iana.org:43";

/// One WHOIS exchange: send `domain`, read until the server closes.
async fn fetch(server: &str, domain: &str, limit: Duration) -> Result<String, LookupError> {
    let mut stream = timeout(limit, TcpStream::connect(server))
        .await
        .map_err(|_| LookupError::Timeout)??;

    let query = format!("{}\r\n", domain);
    timeout(limit, stream.write_all(query.as_bytes()))
        .await
        .map_err(|_| LookupError::Timeout)??;

    let mut response = Vec::new();
    timeout(limit, stream.read_to_end(&mut response))
        .await
        .map_err(|_| LookupError::Timeout)??;

    Ok(String::from_utf8_lossy(&response).into_owned())
}

fn whois_server(tld: &str) -> &'static str {
    match tld {
        "com" | "net" => "whois.verisign-grs.com:43",
        "org" => "whois.pir.org:43",
        "info" => "whois.afilias.net:43",
        "biz" => "whois.neulevel.biz:43",
        "us" => "whois.nic.us:43",
        "co" => "whois.nic.co:43",
        "io" => "whois.nic.io:43",
        "me" => "whois.nic.me:43",
        "uk" => "whois.nic.uk:43",
        "ca" => "whois.cira.ca:43",
        "de" => "whois.denic.de:43",
        "fr" => "whois.afnic.fr:43",
        "ru" => "whois.tcinet.ru:43",
        "cn" => "whois.cnnic.net.cn:43",
        "jp" => "whois.jprs.jp:43",
        "au" => "whois.auda.org.au:43",
        "br" => "whois.registro.br:43",
        "tk" => "whois.dot.tk:43",
        "ml" => "whois.dot.ml:43",
        "ga" => "whois.dot.ga:43",
        "cf" => "whois.dot.cf:43",
        "app" | "dev" => "whois.nic.google:43",
        "tech" => "whois.nic.tech:43",
        _ => IANA_SERVER,
    }
}

/// Whether `raw` is IANA's record for a TLD rather than a registry answer
fn is_iana_tld_record(raw: &str) -> bool {
    raw.lines()
        .any(|line| line.trim_start().starts_with("% IANA WHOIS server"))
}

/// Registry server named by the `refer:` line of an IANA response
fn iana_referral(raw: &str) -> Option<String> {
    raw.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        if !key.trim().eq_ignore_ascii_case("refer") {
            return None;
        }
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}

/// Pull creation and last-update dates out of a raw response.
///
/// The first parseable value for each key wins. Timestamps are rendered as
/// `YYYY-MM-DDTHH:MM:SS`, date-only values as `YYYY-MM-DD`.
pub fn parse_registration_dates(raw: &str) -> Result<WhoisRecord, LookupError> {
    if is_iana_tld_record(raw) {
        return Err(LookupError::Whois("IANA TLD record, not a domain record".to_string()));
    }

    let lower = raw.to_lowercase();
    if lower.contains("no match")
        || lower.contains("not found")
        || lower.contains("no entries found")
        || lower.contains("no data found")
    {
        return Err(LookupError::Whois("domain not registered".to_string()));
    }

    let mut record = WhoisRecord::default();

    for line in raw.lines() {
        let Some((key, value)) = line.trim().split_once(':') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        let value = value.trim();

        match key.as_str() {
            "creation date" | "created" | "created on" | "registered on"
            | "registration time" | "domain registration date" => {
                if record.created.is_none() {
                    record.created = parse_timestamp(value);
                }
            }
            "updated date" | "last updated" | "last-update" | "changed" | "last modified"
            | "updated on" | "domain last updated date" => {
                if record.updated.is_none() {
                    record.updated = parse_timestamp(value);
                }
            }
            _ => {}
        }
    }

    if record.created.is_none() && record.updated.is_none() {
        return Err(LookupError::Whois("no registration dates".to_string()));
    }

    Ok(record)
}

fn parse_timestamp(value: &str) -> Option<String> {
    const OUTPUT: &str = "%Y-%m-%dT%H:%M:%S";

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc().format(OUTPUT).to_string());
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S", "%Y.%m.%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.format(OUTPUT).to_string());
        }
    }

    for format in ["%Y-%m-%d", "%d-%b-%Y", "%Y.%m.%d", "%Y/%m/%d", "%d.%m.%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }

    None
}
