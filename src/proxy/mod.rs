//! Reverse proxy dispatcher.
//!
//! Resolves the target module on every request, rewrites the trust-boundary
//! headers and streams both bodies through without buffering. There are no
//! retries: a failed registry read or backend round-trip is reported to the
//! caller straight away.

pub mod headers;
pub mod path;

use axum::{
    body::{Body, HttpBody},
    extract::Request,
    response::Response,
};
use futures::TryStreamExt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::ProxyConfig;
use crate::error::ApiError;
use crate::registry::ModuleRegistry;

pub use headers::{X_AUTHENTICATED_USERID, X_FORWARDED_HOST};
pub use path::{forward_url, split_module_path};

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("invalid target url '{url}': {reason}")]
    InvalidTarget { url: String, reason: String },

    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),

    #[error("failed to build response: {0}")]
    Response(#[from] axum::http::Error),
}

/// Upstream HTTP client shared by every proxied request
#[derive(Clone)]
pub struct ProxyClient {
    client: reqwest::Client,
    upstream_timeout: Duration,
}

impl ProxyClient {
    pub fn new(config: &ProxyConfig) -> Result<Self, ProxyError> {
        // Redirects and compression are passed to the caller untouched
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .redirect(reqwest::redirect::Policy::none())
            .no_gzip()
            .tcp_keepalive(Duration::from_secs(30))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self {
            client,
            upstream_timeout: Duration::from_secs(config.upstream_timeout_secs),
        })
    }

    /// Forward `request` to `target` and stream the backend response back
    pub async fn forward(&self, target: url::Url, request: Request, subject: &str) -> Result<Response, ProxyError> {
        let (mut parts, body) = request.into_parts();
        let with_body = has_body(&body);
        headers::rewrite_request_headers(&mut parts.headers, &parts.uri, &target, subject);

        info!(method = %parts.method, target = %target, "Proxying request");

        let mut upstream = self.client.request(parts.method, target).headers(parts.headers);
        if with_body {
            upstream = upstream.body(reqwest::Body::wrap_stream(body.into_data_stream()));
        }

        // The deadline covers connect + response headers; the body then streams freely.
        let response = tokio::time::timeout(self.upstream_timeout, upstream.send())
            .await
            .map_err(|_| ProxyError::Timeout(self.upstream_timeout))??;

        let status = response.status();
        debug!(status = %status, "Upstream responded");

        let mut response_headers = response.headers().clone();
        headers::strip_hop_by_hop(&mut response_headers);

        let stream = response
            .bytes_stream()
            .inspect_err(|e| warn!("Upstream body stream failed: {}", e));

        let mut builder = Response::builder().status(status);
        if let Some(headers) = builder.headers_mut() {
            *headers = response_headers;
        }
        Ok(builder.body(Body::from_stream(stream))?)
    }
}

/// Resolve the module named in the path and proxy the request to it
pub async fn dispatch(
    registry: &dyn ModuleRegistry,
    client: &ProxyClient,
    config: &ProxyConfig,
    request: Request,
    subject: &str,
) -> Result<Response, ApiError> {
    let path = request.uri().path().to_string();
    let (module_name, proxy_path) = split_module_path(&config.route_prefix, &path)
        .ok_or_else(|| ApiError::not_found("Not found"))?;

    debug!(user = %subject, module = %module_name, "Proxying request for user");

    let module = registry.resolve(module_name).await?;

    if module.trim_name {
        debug!(module = %module.name, "Trimming module name from forwarded path");
    }
    let target = forward_url(&module, proxy_path, request.uri().query())?;

    Ok(client.forward(target, request, subject).await?)
}

/// Whether the inbound request carries a body worth streaming upstream.
///
/// Decided from the body itself: HTTP/2 requests stream data frames without
/// `Content-Length` or `Transfer-Encoding`.
fn has_body(body: &Body) -> bool {
    !body.is_end_stream()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    #[test]
    fn body_detection() {
        assert!(!has_body(&Body::empty()));
        assert!(has_body(&Body::from("hello")));

        let chunks = stream::iter([Ok::<_, std::io::Error>("hello "), Ok("world")]);
        assert!(has_body(&Body::from_stream(chunks)));
    }

    #[test]
    fn client_builds_from_config() {
        let config = crate::config::AppConfig::development().proxy;
        assert!(ProxyClient::new(&config).is_ok());
    }
}
