//! API middleware components

pub mod auth;
pub mod logging;
pub mod rate_limit;

pub use auth::authorize;
pub use logging::logging_middleware;
pub use rate_limit::enforce_quota;
