// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Security Level: valid token; admin token where the admin policy requires it
// Middleware: jwt_auth_middleware (injects AuthenticatedUser)
pub mod proxy;

pub use proxy::proxy_handler;
