pub mod auth;
pub mod cors;

pub use auth::{auth_middleware, require_super_admin, CurrentUser};
pub use cors::cors_middleware;
