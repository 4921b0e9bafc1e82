//! Common utilities and shared types for tribune.
//!
//! This crate provides foundational components used across all tribune crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Patch requests**: nullable-field deserialization via [`serde_helpers::double_option`]
//!
//! # Example
//!
//! ```no_run
//! use tribune_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Listening on {}:{} as {id}", config.server.host, config.server.port);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod serde_helpers;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
