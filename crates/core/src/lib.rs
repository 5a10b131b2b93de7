//! Core business logic for castroom.

pub mod services;

pub use services::*;
