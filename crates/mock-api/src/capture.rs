//! Request metadata captured for logging and parking.

use chrono::{DateTime, Utc};
use hyper::HeaderMap;
use std::collections::BTreeMap;
use std::net::IpAddr;

/// Header name to every value received for it
pub type HeaderMultiMap = BTreeMap<String, Vec<String>>;

/// Separator for repeated query parameters
pub const QUERY_VALUE_SEPARATOR: &str = ",";

/// Everything recorded about an inbound request
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedRequest {
    pub timestamp: DateTime<Utc>,
    pub method: String,
    pub path: String,
    pub headers: HeaderMultiMap,
    pub query_params: BTreeMap<String, String>,
    pub body: String,
    pub direct_ip: String,
    /// Raw `X-Forwarded-For` value, empty when absent
    pub forwarded_ip: String,
}

impl CapturedRequest {
    pub fn new(
        method: &str,
        path: &str,
        query: Option<&str>,
        headers: &HeaderMap,
        body: String,
        peer_ip: IpAddr,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            method: method.to_string(),
            path: path.to_string(),
            headers: header_multimap(headers),
            query_params: flatten_query(query.unwrap_or("")),
            body,
            direct_ip: normalize_ip(&peer_ip.to_string()),
            forwarded_ip: headers
                .get("x-forwarded-for")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string(),
        }
    }
}

/// Convert IPv6 loopback to `127.0.0.1` and strip the IPv4-mapped prefix.
pub fn normalize_ip(ip: &str) -> String {
    if ip == "::1" {
        return "127.0.0.1".to_string();
    }
    match ip.strip_prefix("::ffff:") {
        Some(v4) if v4.contains('.') => v4.to_string(),
        _ => ip.to_string(),
    }
}

/// Group header values by canonical (Title-Case) name
pub fn header_multimap(headers: &HeaderMap) -> HeaderMultiMap {
    let mut map = HeaderMultiMap::new();
    for (name, value) in headers {
        map.entry(canonical_header_name(name.as_str()))
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    map
}

/// `x-forwarded-for` -> `X-Forwarded-For`
pub fn canonical_header_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join("-")
}

/// Decode a query string, keeping single values as-is and joining repeated
/// keys with [`QUERY_VALUE_SEPARATOR`].
pub fn flatten_query(query: &str) -> BTreeMap<String, String> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for pair in query.split('&').filter(|s| !s.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        grouped
            .entry(decode_component(key))
            .or_default()
            .push(decode_component(value));
    }
    grouped
        .into_iter()
        .map(|(key, values)| (key, values.join(QUERY_VALUE_SEPARATOR)))
        .collect()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(spaced)
}
