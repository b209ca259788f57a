//! Application layer: services and use cases
//!
//! This layer orchestrates domain logic behind the calls the presentation layer makes.

pub mod error;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
