use url::Url;

use super::ProxyError;
use crate::registry::Module;

/// Split `{prefix}/{module}/{rest}` into the module name and `/{rest}`.
///
/// Returns `None` when the path is outside the prefix or names no module.
/// The remainder is empty when the request targets the module root.
pub fn split_module_path<'a>(prefix: &str, path: &'a str) -> Option<(&'a str, &'a str)> {
    let rest = path.strip_prefix(prefix)?;
    let rest = rest.strip_prefix('/')?;

    let (module, proxy_path) = match rest.find('/') {
        Some(idx) => rest.split_at(idx),
        None => (rest, ""),
    };
    if module.is_empty() {
        return None;
    }
    Some((module, proxy_path))
}

/// Build the backend URL for a request.
///
/// The forwarding base is the target's own path followed by `/{name}`; with
/// `trim_name` one literal `/{name}` is removed from that base. The request
/// remainder and query are appended unchanged.
pub fn forward_url(module: &Module, proxy_path: &str, query: Option<&str>) -> Result<Url, ProxyError> {
    let mut url = Url::parse(&module.target_base_url).map_err(|e| ProxyError::InvalidTarget {
        url: module.target_base_url.clone(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ProxyError::InvalidTarget {
            url: module.target_base_url.clone(),
            reason: "expected an http(s) URL with a host".to_string(),
        });
    }

    let segment = format!("/{}", module.name);
    let mut base = format!("{}{}", url.path().trim_end_matches('/'), segment);
    if module.trim_name {
        base = base.replacen(&segment, "", 1);
    }

    let path = format!("{}{}", base, proxy_path);
    url.set_path(if path.is_empty() { "/" } else { &path });
    url.set_query(query);
    url.set_fragment(None);
    Ok(url)
}
