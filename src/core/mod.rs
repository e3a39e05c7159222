//! Core invoice model, validation, errors and configuration.
//!
//! This module holds the plain data types shared by the UBL writer and the
//! e-Factura client, plus the crate-wide [`AnafError`].

mod builder;
pub mod config;
mod error;
mod types;
mod validation;

pub use builder::*;
pub use config::{AnafConfig, EfacturaEndpoints, LookupEndpoints, Profile};
pub use error::*;
pub use types::*;
pub use validation::*;
