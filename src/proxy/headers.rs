use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Uri};
use url::Url;

/// Identity of the caller as seen by backends. Only the gateway may set it;
/// backends must not be reachable any other way.
pub const X_AUTHENTICATED_USERID: HeaderName = HeaderName::from_static("x-authenticated-userid");
pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");

const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Drop hop-by-hop headers, including any listed in `Connection`
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
}

/// Rewrite inbound headers for the backend hop.
///
/// The original host comes from `Host`, or from the request authority when
/// the client sent none (HTTP/2). A client-supplied `X-Forwarded-Host` never
/// reaches the backend.
pub fn rewrite_request_headers(headers: &mut HeaderMap, uri: &Uri, target: &Url, subject: &str) {
    let original_host = headers
        .get(header::HOST)
        .cloned()
        .or_else(|| uri.authority().and_then(|a| HeaderValue::from_str(a.as_str()).ok()));
    strip_hop_by_hop(headers);

    headers.remove(X_FORWARDED_HOST);
    if let Some(host) = original_host {
        headers.insert(X_FORWARDED_HOST, host);
    }
    if let Some(host) = host_header(target) {
        headers.insert(header::HOST, host);
    }

    match HeaderValue::from_str(subject) {
        Ok(value) => {
            headers.insert(X_AUTHENTICATED_USERID, value);
        }
        Err(_) => {
            // A subject that cannot be a header value must not let a client-sent one through
            headers.remove(X_AUTHENTICATED_USERID);
        }
    }
}

fn host_header(target: &Url) -> Option<HeaderValue> {
    let host = target.host_str()?;
    let value = match target.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };
    HeaderValue::from_str(&value).ok()
}
