//! PostgreSQL request store for Encore.
//!
//! Implements the [`encore_core::RequestStore`] trait on top of a `PgPool`.
//! The status column is the `request_status` Postgres enum, so the closed
//! status set is enforced by the database as well as by the type system.
//!
//! # Example
//!
//! ```no_run
//! use encore_postgres::PostgresRequestStore;
//! use sqlx::PgPool;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = PgPool::connect("postgresql://localhost/encore").await?;
//! let store = PostgresRequestStore::new(pool);
//! store.migrate().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod store;

pub use store::PostgresRequestStore;
