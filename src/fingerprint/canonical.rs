//! Canonical fingerprint construction.
//!
//! # Responsibilities
//! - Build the HTTP/2 fingerprint `<settings>|0|<pseudo-header order>`
//! - Digest JA3, JA3N and the HTTP/2 fingerprint
//! - Fail with `FingerprintUnavailable` when no handshake was captured

use crate::error::ProxyError;
use crate::fingerprint::digest::digest;
use crate::fingerprint::observation::{Http2Observation, Setting, TlsObservation};

/// Everything the access decision needs to know about one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFingerprint {
    pub negotiated_protocol: String,
    pub tls_version: u16,
    pub user_agent: String,
    pub order_headers: Vec<String>,
    pub ja3: String,
    pub ja3n: String,
    pub ja3_hash: String,
    pub ja3n_hash: String,
    pub http2_fingerprint: String,
    pub http2_fingerprint_hash: String,
}

/// Derive a [`ParsedFingerprint`] from raw observations.
///
/// A missing HTTP/2 observation (HTTP/1.1 over TLS) is treated as empty
/// settings and an empty order, giving the fingerprint `|0|`.
pub fn canonicalize(
    tls: Option<&TlsObservation>,
    http2: Option<&Http2Observation>,
    user_agent: &str,
) -> Result<ParsedFingerprint, ProxyError> {
    let tls = tls.ok_or(ProxyError::FingerprintUnavailable)?;

    let (settings, order): (&[Setting], &[String]) = match http2 {
        Some(h2) => (h2.settings.as_slice(), h2.pseudo_header_order.as_slice()),
        None => (&[][..], &[][..]),
    };

    let http2_fingerprint = format!(
        "{}|0|{}",
        settings_string(settings),
        abbreviate_pseudo_headers(order)
    );

    Ok(ParsedFingerprint {
        negotiated_protocol: tls.negotiated_protocol.clone(),
        tls_version: tls.tls_version,
        user_agent: user_agent.to_string(),
        order_headers: order.to_vec(),
        ja3_hash: digest(&tls.ja3),
        ja3n_hash: digest(&tls.ja3n),
        ja3: tls.ja3.clone(),
        ja3n: tls.ja3n.clone(),
        http2_fingerprint_hash: digest(&http2_fingerprint),
        http2_fingerprint,
    })
}

/// `id:value` pairs joined with commas, in receipt order.
pub fn settings_string(settings: &[Setting]) -> String {
    settings
        .iter()
        .map(|s| format!("{}:{}", s.id, s.value))
        .collect::<Vec<_>>()
        .join(",")
}

/// Single-letter codes for known pseudo-headers; unknown names are dropped.
pub fn abbreviate_pseudo_headers(order: &[String]) -> String {
    order
        .iter()
        .filter_map(|name| pseudo_header_code(name))
        .collect::<Vec<_>>()
        .join(",")
}

fn pseudo_header_code(name: &str) -> Option<&'static str> {
    match name {
        ":method" => Some("m"),
        ":authority" => Some("a"),
        ":scheme" => Some("s"),
        ":path" => Some("p"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tls() -> TlsObservation {
        TlsObservation {
            negotiated_protocol: "h2".into(),
            tls_version: 0x0304,
            ja3: "771,4865-4866-4867,0-23-65281-10-11,29-23-24,0".into(),
            ja3n: "771,4865-4866-4867,0-10-11-23-65281,29-23-24,0".into(),
        }
    }

    fn h2(settings: &[(u16, u32)], order: &[&str]) -> Http2Observation {
        Http2Observation {
            settings: settings.iter().map(|&(id, v)| Setting::new(id, v)).collect(),
            pseudo_header_order: order.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn http2_fingerprint_preserves_order_and_drops_unknown() {
        let obs = h2(&[(4, 100), (3, 50)], &[":method", ":path", "unknown-header"]);
        let fp = canonicalize(Some(&tls()), Some(&obs), "ua").unwrap();

        assert_eq!(fp.http2_fingerprint, "4:100,3:50|0|m,p");
        assert_eq!(fp.order_headers, vec![":method", ":path", "unknown-header"]);
    }

    #[test]
    fn settings_are_not_deduplicated() {
        assert_eq!(
            settings_string(&[Setting::new(1, 1), Setting::new(1, 1), Setting::new(2, 0)]),
            "1:1,1:1,2:0"
        );
    }

    #[test]
    fn unknown_leading_header_leaves_no_separator() {
        let order: Vec<String> = ["x-foo", ":authority", ":scheme"].iter().map(|s| s.to_string()).collect();
        assert_eq!(abbreviate_pseudo_headers(&order), "a,s");
    }

    #[test]
    fn missing_http2_observation_is_empty_fingerprint() {
        let fp = canonicalize(Some(&tls()), None, "curl/8.0").unwrap();
        assert_eq!(fp.http2_fingerprint, "|0|");
        assert!(fp.order_headers.is_empty());
    }

    #[test]
    fn missing_tls_is_unavailable() {
        let err = canonicalize(None, None, "ua").unwrap_err();
        assert!(matches!(err, ProxyError::FingerprintUnavailable));
    }

    #[test]
    fn hashes_follow_strings() {
        let obs = h2(&[(1, 65536), (4, 6291456)], &[":method", ":authority", ":scheme", ":path"]);
        let fp = canonicalize(Some(&tls()), Some(&obs), "Mozilla/5.0").unwrap();

        assert_eq!(fp.ja3_hash, digest(&fp.ja3));
        assert_eq!(fp.ja3n_hash, digest(&fp.ja3n));
        assert_eq!(fp.http2_fingerprint_hash, digest("1:65536,4:6291456|0|m,a,s,p"));
        assert_ne!(fp.ja3_hash, fp.ja3n_hash);
        assert_eq!(fp.user_agent, "Mozilla/5.0");
        assert_eq!(fp.negotiated_protocol, "h2");
        assert_eq!(fp.tls_version, 0x0304);
    }
}
