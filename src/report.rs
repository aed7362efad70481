//! Rendering: one info line per candidate, one message per watched domain.

use crate::notify::Notification;
use crate::resolve::Enrichment;
use crate::store::DiscoveredDomain;

/// Render the enrichment of one candidate.
///
/// Empty when no DNS record answered; such candidates are not discoveries.
pub fn format_info(enrichment: &Enrichment) -> String {
    let dns = &enrichment.dns;
    if dns.is_empty() {
        return String::new();
    }

    let mut info = String::new();

    if let Some(a) = &dns.a {
        info.push_str(a);
        if let Some(country) = &enrichment.country {
            info.push('/');
            info.push_str(country);
        }
        if let Some(banner) = &enrichment.http_banner {
            info.push_str(&format!(" HTTP:\"{}\"", banner));
        }
    } else if let Some(ns) = &dns.ns {
        info.push_str("NS:");
        info.push_str(ns);
    }

    if let Some(aaaa) = &dns.aaaa {
        info.push(' ');
        info.push_str(aaaa);
    }

    if let Some(mx) = &dns.mx {
        info.push_str(" MX:");
        info.push_str(mx);
        if let Some(banner) = &enrichment.smtp_banner {
            info.push_str(&format!(" SMTP:\"{}\"", banner));
        }
    }

    let whois = &enrichment.whois;
    match (&whois.created, &whois.updated) {
        (Some(created), Some(updated)) if created == updated => {
            info.push_str(" Created/Updated:");
            info.push_str(created);
        }
        (created, updated) => {
            if let Some(created) = created {
                info.push_str(" Created:");
                info.push_str(created);
            }
            if let Some(updated) = updated {
                info.push_str(" Updated:");
                info.push_str(updated);
            }
        }
    }

    info
}

/// Subject line for the alert about `watched`
pub fn subject_for(watched: &str) -> String {
    format!("squatwatch - New Entries for {}", watched)
}

/// Alert body: one `"\r\n\r\n<domain> - <info>"` block per discovery
pub fn body_for(discoveries: &[DiscoveredDomain]) -> String {
    discoveries
        .iter()
        .map(|d| format!("\r\n\r\n{} - {}", d.domain, d.info))
        .collect()
}

/// The alert for one watched domain, or `None` when nothing new was found
pub fn build_notification(
    recipient: &str,
    watched: &str,
    discoveries: &[DiscoveredDomain],
) -> Option<Notification> {
    if discoveries.is_empty() {
        return None;
    }

    Some(Notification {
        recipient: recipient.to_string(),
        subject: subject_for(watched),
        body: body_for(discoveries),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::{ResolutionRecord, WhoisRecord};

    fn with_dns(dns: ResolutionRecord) -> Enrichment {
        Enrichment {
            dns,
            ..Default::default()
        }
    }

    #[test]
    fn address_only() {
        let e = with_dns(ResolutionRecord {
            ns: Some("ns1.example.net".to_string()),
            a: Some("93.184.216.34".to_string()),
            ..Default::default()
        });
        assert_eq!(format_info(&e), "93.184.216.34");
    }

    #[test]
    fn ns_used_when_no_address() {
        let e = with_dns(ResolutionRecord {
            ns: Some("ns1.example.net".to_string()),
            ..Default::default()
        });
        assert_eq!(format_info(&e), "NS:ns1.example.net");
    }

    #[test]
    fn full_record_in_fixed_order() {
        let e = Enrichment {
            dns: ResolutionRecord {
                ns: Some("ns1.example.net".to_string()),
                a: Some("192.0.2.1".to_string()),
                aaaa: Some("2001:db8::1".to_string()),
                mx: Some("mx.example.net".to_string()),
            },
            whois: WhoisRecord {
                created: Some("2019-01-01T00:00:00".to_string()),
                updated: Some("2020-06-01T00:00:00".to_string()),
            },
            country: Some("US".to_string()),
            http_banner: Some("nginx".to_string()),
            smtp_banner: Some("mx.example.net ESMTP".to_string()),
        };
        assert_eq!(
            format_info(&e),
            "192.0.2.1/US HTTP:\"nginx\" 2001:db8::1 MX:mx.example.net SMTP:\"mx.example.net ESMTP\" \
             Created:2019-01-01T00:00:00 Updated:2020-06-01T00:00:00"
        );
    }

    #[test]
    fn equal_timestamps_are_combined() {
        let e = Enrichment {
            dns: ResolutionRecord {
                a: Some("93.184.216.34".to_string()),
                ..Default::default()
            },
            whois: WhoisRecord {
                created: Some("2020-01-01".to_string()),
                updated: Some("2020-01-01".to_string()),
            },
            ..Default::default()
        };
        assert_eq!(format_info(&e), "93.184.216.34 Created/Updated:2020-01-01");
    }

    #[test]
    fn single_timestamp() {
        let e = Enrichment {
            dns: ResolutionRecord {
                ns: Some("ns1.example.net".to_string()),
                ..Default::default()
            },
            whois: WhoisRecord {
                created: None,
                updated: Some("2020-01-01".to_string()),
            },
            ..Default::default()
        };
        assert_eq!(format_info(&e), "NS:ns1.example.net Updated:2020-01-01");
    }

    #[test]
    fn no_dns_presence_is_empty_even_with_whois() {
        let e = Enrichment {
            whois: WhoisRecord {
                created: Some("2020-01-01".to_string()),
                updated: None,
            },
            http_banner: Some("nginx".to_string()),
            ..Default::default()
        };
        assert_eq!(format_info(&e), "");
    }

    #[test]
    fn banners_need_their_records() {
        let e = Enrichment {
            dns: ResolutionRecord {
                ns: Some("ns1.example.net".to_string()),
                ..Default::default()
            },
            http_banner: Some("nginx".to_string()),
            smtp_banner: Some("hello".to_string()),
            ..Default::default()
        };
        assert_eq!(format_info(&e), "NS:ns1.example.net");
    }

    #[test]
    fn notification_body_concatenates_discoveries() {
        let discoveries = vec![
            DiscoveredDomain::new("examp1e.com", "93.184.216.34"),
            DiscoveredDomain::new("exampel.com", "NS:ns1.example.net"),
        ];
        let n = build_notification("ops@example.com", "example.com", &discoveries).unwrap();
        assert_eq!(n.recipient, "ops@example.com");
        assert_eq!(n.subject, "squatwatch - New Entries for example.com");
        assert_eq!(
            n.body,
            "\r\n\r\nexamp1e.com - 93.184.216.34\r\n\r\nexampel.com - NS:ns1.example.net"
        );
    }

    #[test]
    fn no_discoveries_no_notification() {
        assert!(build_notification("ops@example.com", "example.com", &[]).is_none());
    }
}
