// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `ymobar` Store
//!
//! State management for the ymobar application.
//!
//! This crate provides:
//!
//! - **CredentialStore**: Remembered login credentials (system keychain or memory)
//! - **SettingsStore**: User preferences with persistence
//! - **SessionController**: Serialized login/refresh/logout intents with an
//!   observable view state
//! - **Persistence**: File I/O helpers for JSON data
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use ymobar_fetch::PortalSession;
//! use ymobar_store::{KeychainCredentialStore, SessionController, SettingsStore};
//!
//! let settings = SettingsStore::load_default().await.get().await;
//! let portal = PortalSession::new(settings.endpoints(), &settings.session_options())?;
//! let controller = SessionController::new(
//!     Arc::new(portal),
//!     Arc::new(KeychainCredentialStore::new()),
//! );
//!
//! let mut rx = controller.subscribe();
//! controller.auto_login().await?;
//! println!("{:?}", rx.borrow_and_update().data);
//! ```

pub mod controller;
pub mod credentials;
pub mod error;
pub mod persistence;
pub mod settings_store;

pub use controller::{SessionController, ViewState};
pub use credentials::{CredentialStore, KeychainCredentialStore, MemoryCredentialStore};
pub use error::StoreError;
pub use persistence::{
    default_config_dir, default_settings_path, ensure_dir, load_json, load_json_or_default,
    save_json,
};
pub use settings_store::{
    LogLevel, MIN_REFRESH_INTERVAL_SECS, MIN_TIMEOUT_SECS, Settings, SettingsStore,
};

#[cfg(test)]
mod persistence_tests;
