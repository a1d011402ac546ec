//! API layer - HTTP endpoints and middleware

pub mod health;
pub mod mail;
pub mod middleware;
pub mod pages;
pub mod router;
pub mod state;
pub mod types;

pub use router::{create_mail_router, create_router};
pub use state::{AppState, RelaySettings};
