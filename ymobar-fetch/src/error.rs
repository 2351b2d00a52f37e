//! Session and extraction error types.

use std::fmt;

use thiserror::Error;

// ============================================================================
// Wire Steps
// ============================================================================

/// The four requests of the portal handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// GET of the login entry page that issues the ticket.
    TicketFetch,
    /// POST of identifier, secret and ticket.
    CredentialSubmit,
    /// GET of the page that issues the token pair.
    TokenFetch,
    /// POST of the token pair to the usage summary page.
    UsagePage,
}

impl Step {
    /// Returns a short human-readable name for this step.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::TicketFetch => "ticket fetch",
            Self::CredentialSubmit => "credential submit",
            Self::TokenFetch => "token fetch",
            Self::UsagePage => "usage page",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Extract Error
// ============================================================================

/// Structural failure while extracting values from a portal page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// No hidden input exists in the document.
    #[error("No hidden input found")]
    NotFound,

    /// Fewer than two hidden inputs exist in the document.
    #[error("Missing hidden inputs (found: {found}, names: [{}])", names.join(", "))]
    InsufficientTokens {
        /// Number of hidden inputs found.
        found: usize,
        /// `name` attributes of the hidden inputs found.
        names: Vec<String>,
    },

    /// The usage content container is absent.
    #[error("Usage container not found (selector: {selector})")]
    ContainerNotFound {
        /// The selector that failed to match.
        selector: String,
    },

    /// The usage container holds fewer than four tables.
    #[error("Insufficient tables (found: {found})")]
    InsufficientTables {
        /// Number of tables found in the container.
        found: usize,
    },
}

// ============================================================================
// Login Rejection
// ============================================================================

/// Why the authentication flow ended in the rejected state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    /// The login entry page answered with a non-2xx status.
    #[error("login page returned HTTP {0}")]
    TicketPageStatus(u16),

    /// The login entry page carried no ticket.
    #[error("login page carried no ticket")]
    TicketMissing,

    /// The credential submit answered with a non-2xx status.
    #[error("credential submit returned HTTP {0}")]
    SubmitStatus(u16),

    /// The portal redirected back to the login page.
    #[error("redirected back to the login page ({final_url})")]
    RedirectedToLogin {
        /// The final URL after redirects.
        final_url: String,
    },
}

// ============================================================================
// Session Error
// ============================================================================

/// Error type for portal session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Network-level failure: DNS, TLS, connect, read or timeout.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A step answered with a non-2xx status.
    #[error("{step} failed: HTTP {status}")]
    HttpStatus {
        /// The failing step.
        step: Step,
        /// The HTTP status code.
        status: u16,
    },

    /// A step answered with an empty body.
    #[error("{step} failed: empty body")]
    EmptyBody {
        /// The failing step.
        step: Step,
    },

    /// A page did not have the expected structure.
    #[error("{step} failed: {source}")]
    Extract {
        /// The step whose page failed to parse.
        step: Step,
        /// The underlying extraction failure.
        #[source]
        source: ExtractError,
    },

    /// The portal refused the credentials.
    #[error("Authentication rejected: {0}")]
    AuthRejected(RejectReason),

    /// Another operation already owns the session.
    #[error("Another operation is in progress")]
    Busy,
}

impl SessionError {
    /// Returns true if the portal refused the credentials.
    pub fn is_auth_rejected(&self) -> bool {
        matches!(self, Self::AuthRejected(_))
    }
}

// ============================================================================
// Tests
// ============================================================================
