//! Domain models for `ymobar`.
//!
//! ## Submodules
//!
//! - [`usage`] - The usage snapshot produced by each successful fetch
//! - [`credentials`] - Login credentials and login origin

mod credentials;
mod usage;

pub use credentials::{LoginOrigin, SessionCredentials};
pub use usage::{round2, UsageSnapshot};

#[cfg(test)]
mod serde_tests;
