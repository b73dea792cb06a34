// handlers/admin/mod.rs - Admin handlers (trusted upstream callers)
//
// Security Level: network-level only (private admin listener)
pub mod token;

pub use token::{token_post, TokenRequest};
