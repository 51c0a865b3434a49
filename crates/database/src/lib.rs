//! # Dashboard Database Crate
//!
//! This crate is the read-only adapter to the MySQL price store, which holds
//! one table per ticker.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** All SQL lives here. The rest of the application only ever sees
//!   `PriceRecord`s.
//! - **Fail Fast:** A malformed table aborts the load with an error naming the
//!   table. No partial data reaches the metrics pipeline.
//! - **Asynchronous & Pooled:** Uses a `sqlx` connection pool (`MySqlPool`).
//!
//! ## Public API
//!
//! - `connect`: Establishes the connection pool from `DATABASE_URL`.
//! - `DbRepository`: Enumerates ticker tables and loads their price records.
//! - `DbError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, connect_lazy, database_url};
pub use error::DbError;
pub use repository::{DbRepository, LoadProgress, ticker_from_table};
