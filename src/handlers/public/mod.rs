// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Security Level: None
// Middleware: None (CORS and tracing only)
pub mod health;

pub use health::{health, not_found};
