//! Small helpers shared by the handlers.

use axum::http::HeaderMap;
use std::net::IpAddr;

/// Extract a client IP for rate limiting from common proxy headers.
pub(super) fn extract_client_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if forwarded.is_some() {
        return forwarded.map(str::to_string);
    }
    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Resolve the rate-limit key for a request.
///
/// Proxy headers are only honored when the gateway is told it sits behind a
/// trusted proxy; otherwise the socket peer address is used.
pub(super) fn client_ip(
    headers: &HeaderMap,
    peer: Option<IpAddr>,
    trust_forwarded_for: bool,
) -> Option<String> {
    if trust_forwarded_for {
        if let Some(ip) = extract_client_ip(headers) {
            return Some(ip);
        }
    }
    peer.map(|ip| ip.to_string())
}
