//! User infrastructure module
//!
//! In-memory and PostgreSQL user repositories, and the user service that
//! registers tenants and resolves API keys.

mod postgres_repository;
mod repository;
mod service;

pub use postgres_repository::PostgresUserRepository;
pub use repository::InMemoryUserRepository;
pub use service::{UserService, NO_KEY};
