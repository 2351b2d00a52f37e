// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `ymobar` Fetch
//!
//! Authenticated scraping client for the Y!mobile customer portal.
//!
//! ## Components
//!
//! - [`host::cookies`] - Host-scoped cookie store shared by every request
//! - [`extract`] - Pure functions locating hidden form tokens and usage
//!   figures in portal HTML
//! - [`session`] - The authentication and data-retrieval handshakes
//! - [`recovery`] - Relogin-and-retry-once wrapper around the data flow
//!
//! ## Example
//!
//! ```ignore
//! use ymobar_fetch::{fetch_with_recovery, PortalEndpoints, PortalSession, SessionOptions};
//! use ymobar_core::SessionCredentials;
//!
//! let session = PortalSession::new(PortalEndpoints::default(), &SessionOptions::default())?;
//! let creds = SessionCredentials::new("09012345678", "password");
//!
//! session.login(&creds).await?;
//! let snapshot = fetch_with_recovery(&session, Some(&creds)).await?;
//! println!("{} GB left", snapshot.remaining_gb());
//! ```

pub mod endpoints;
pub mod error;
pub mod extract;
pub mod host;
pub mod options;
pub mod recovery;
pub mod session;

// Errors
pub use error::{ExtractError, RejectReason, SessionError, Step};

// Host APIs
pub use host::{HttpClient, PageResponse, SessionCookieStore, StoredCookie};

// Extraction
pub use extract::{
    extract_first_hidden_input_value, extract_hidden_token_pair, extract_usage_snapshot,
    extract_usage_snapshot_at, parse_gb,
};

// Session
pub use endpoints::{PortalEndpoints, DEFAULT_PORTAL_DOMAIN};
pub use options::SessionOptions;
pub use recovery::fetch_with_recovery;
pub use session::{PortalSession, UsagePortal};
