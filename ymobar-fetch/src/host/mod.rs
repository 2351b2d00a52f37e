//! Host APIs for the portal session.
//!
//! - [`cookies`] - Host-scoped in-memory cookie store
//! - [`http`] - HTTP client bound to one cookie store

pub mod cookies;
pub mod http;

pub use cookies::{SessionCookieStore, StoredCookie};
pub use http::{HttpClient, PageResponse};
