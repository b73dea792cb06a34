//! Lifelink edge API gateway.
//!
//! Authenticates every inbound request with a signed bearer token, resolves
//! the target backend from the module registry and reverse-proxies the
//! request, telling the backend who the caller is through
//! `X-Authenticated-Userid`.

pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod proxy;
pub mod registry;
pub mod state;
