//! Infrastructure layer - External service implementations

pub mod api_key;
pub mod logging;
pub mod mail;
pub mod storage;
pub mod user;
pub mod verification;
