//! Persistence layer.
//!
//! The [`store::Storage`] trait is the single data-access interface for the
//! service. Two implementations exist: [`store::PostgresStorage`] backed by a
//! sqlx connection pool, and [`store::MemoryStorage`] used when the database
//! is unreachable or disabled by configuration. The backend is selected once
//! at startup and injected into the application state; both must satisfy the
//! same behavioral contract.

pub mod errors;
pub mod models;
pub mod store;
