// handlers/mod.rs - Handler tiers
//
// Public (no auth) → Protected (bearer token, proxied) → Admin (trusted network only)
//
// The admin tier is served on its own listener. It performs no
// authentication itself; it must only be reachable from trusted callers.
pub mod admin;
pub mod protected;
pub mod public;
