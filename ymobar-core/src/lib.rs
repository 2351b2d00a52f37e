// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `ymobar` Core
//!
//! Core types and models shared by the `ymobar` crates.
//!
//! ## Key Types
//!
//! - [`UsageSnapshot`] - Data allowance figures scraped from the portal, with
//!   derived totals computed on demand
//! - [`SessionCredentials`] - Transient login identifier and secret
//! - [`LoginOrigin`] - Whether a login was started by the user or automatically
//! - [`round2`] - Two-decimal rounding used for the remaining allowance

pub mod models;

pub use models::{round2, LoginOrigin, SessionCredentials, UsageSnapshot};
