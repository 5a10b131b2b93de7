//! Common utilities and shared types for castroom.
//!
//! This crate provides foundational components used across all castroom crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//!
//! # Example
//!
//! ```no_run
//! use castroom_common::{AppResult, Config, IdGenerator};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     config.validate()?;
//!     let id_gen = IdGenerator::new();
//!     println!("Generated ID: {}", id_gen.generate());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;

pub use config::{Config, DatabaseConfig, ExportConfig, GenerationConfig, LengthPolicy};
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
