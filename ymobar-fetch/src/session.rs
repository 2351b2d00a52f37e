//! Portal session client.
//!
//! Two flows share one cookie session:
//!
//! **Authentication**: GET the login entry page, take the ticket from its
//! first hidden input, POST the credentials with the ticket, then inspect
//! the final URL. Landing back on `login.php` means the credentials were
//! rejected, whatever the status code.
//!
//! **Data retrieval**: GET the token page, take the first two hidden inputs,
//! POST them to the usage summary page and extract the usage tables. This
//! flow trusts the cookie session and does not check for a prior login.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};
use ymobar_core::{SessionCredentials, UsageSnapshot};

use crate::endpoints::PortalEndpoints;
use crate::error::{RejectReason, SessionError, Step};
use crate::extract::{
    extract_first_hidden_input_value, extract_hidden_token_pair, extract_usage_snapshot,
};
use crate::host::cookies::SessionCookieStore;
use crate::host::http::{HttpClient, PageResponse};
use crate::options::SessionOptions;

// ============================================================================
// Portal Trait
// ============================================================================

/// The flows of a portal session.
///
/// The relogin policy and the session controller work against this trait
/// rather than the concrete client.
#[async_trait]
pub trait UsagePortal: Send + Sync {
    /// Runs the authentication flow.
    async fn login(&self, credentials: &SessionCredentials) -> Result<(), SessionError>;

    /// Runs the data-retrieval flow.
    async fn fetch_usage(&self) -> Result<UsageSnapshot, SessionError>;

    /// Forgets the session, so the next fetch starts unauthenticated.
    fn logout(&self);
}

// ============================================================================
// Portal Session
// ============================================================================

/// Form field names expected by the credential submit endpoint.
mod fields {
    pub const IDENTIFIER: &str = "telnum";
    pub const SECRET: &str = "password";
    pub const TICKET: &str = "ticket";
    pub const TOKEN_FIRST: &str = "mfiv";
    pub const TOKEN_SECOND: &str = "mfym";
}

/// A cookie session against the portal.
///
/// One instance is one session: its cookie store lives exactly as long as
/// the instance. Flows must not interleave on the same instance.
#[derive(Debug, Clone)]
pub struct PortalSession {
    http: HttpClient,
    endpoints: PortalEndpoints,
}

impl PortalSession {
    /// Creates a session with an empty cookie store.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Transport`] if the HTTP client cannot be built.
    pub fn new(endpoints: PortalEndpoints, options: &SessionOptions) -> Result<Self, SessionError> {
        let cookies = Arc::new(SessionCookieStore::new());
        let http = HttpClient::new(options, cookies)?;
        Ok(Self { http, endpoints })
    }

    /// The endpoints this session talks to.
    pub fn endpoints(&self) -> &PortalEndpoints {
        &self.endpoints
    }

    /// The session's cookie store.
    pub fn cookies(&self) -> &Arc<SessionCookieStore> {
        self.http.cookies()
    }

    /// Drops the session's cookies.
    pub fn logout(&self) {
        self.http.cookies().clear();
        info!("Session cookies cleared");
    }

    fn ensure_page(step: Step, page: &PageResponse) -> Result<(), SessionError> {
        if !page.is_success() {
            warn!(%step, status = page.status, "Unexpected status");
            return Err(SessionError::HttpStatus {
                step,
                status: page.status,
            });
        }
        if page.is_empty() {
            warn!(%step, "Empty body");
            return Err(SessionError::EmptyBody { step });
        }
        Ok(())
    }

    /// Runs the authentication flow.
    ///
    /// # Errors
    ///
    /// - [`SessionError::AuthRejected`] when the ticket page fails, carries no
    ///   ticket, or the portal sends the browser back to the login page
    /// - [`SessionError::Transport`] on network failures
    #[instrument(skip_all, name = "login")]
    pub async fn login(&self, credentials: &SessionCredentials) -> Result<(), SessionError> {
        // 1. Login entry page issues the ticket
        let entry = self.http.get(&self.endpoints.ticket).await?;
        if !entry.is_success() {
            warn!(status = entry.status, "Login entry page failed");
            return Err(SessionError::AuthRejected(RejectReason::TicketPageStatus(
                entry.status,
            )));
        }

        let ticket = extract_first_hidden_input_value(&entry.body).map_err(|e| {
            warn!(error = %e, "No ticket on login entry page");
            SessionError::AuthRejected(RejectReason::TicketMissing)
        })?;
        debug!("Ticket obtained");

        // 2. Credential submit
        let form = [
            (fields::IDENTIFIER, credentials.identifier.as_str()),
            (fields::SECRET, credentials.secret.as_str()),
            (fields::TICKET, ticket.as_str()),
        ];
        let submitted = self.http.post_form(&self.endpoints.login, &form).await?;
        if !submitted.is_success() {
            warn!(status = submitted.status, "Credential submit failed");
            return Err(SessionError::AuthRejected(RejectReason::SubmitStatus(
                submitted.status,
            )));
        }

        // 3. The portal redirects back to the login page on bad credentials
        if PortalEndpoints::is_login_page(&submitted.final_url) {
            warn!(final_url = %submitted.final_url, "Redirected back to login page");
            return Err(SessionError::AuthRejected(RejectReason::RedirectedToLogin {
                final_url: submitted.final_url.to_string(),
            }));
        }

        info!(final_url = %submitted.final_url, "Authenticated");
        Ok(())
    }

    /// Runs the data-retrieval flow.
    ///
    /// # Errors
    ///
    /// - [`SessionError::HttpStatus`] / [`SessionError::EmptyBody`] when a page
    ///   cannot be fetched
    /// - [`SessionError::Extract`] when a page lacks the expected structure
    /// - [`SessionError::Transport`] on network failures
    #[instrument(skip_all, name = "fetch_usage")]
    pub async fn fetch_usage(&self) -> Result<UsageSnapshot, SessionError> {
        // 1. Token page
        let token_page = self.http.get(&self.endpoints.token).await?;
        Self::ensure_page(Step::TokenFetch, &token_page)?;

        let (first, second) =
            extract_hidden_token_pair(&token_page.body).map_err(|source| {
                warn!(error = %source, "Token pair missing");
                SessionError::Extract {
                    step: Step::TokenFetch,
                    source,
                }
            })?;
        debug!("Token pair obtained");

        // 2. Usage summary page
        let form = [
            (fields::TOKEN_FIRST, first.as_str()),
            (fields::TOKEN_SECOND, second.as_str()),
        ];
        let usage_page = self.http.post_form(&self.endpoints.usage, &form).await?;
        Self::ensure_page(Step::UsagePage, &usage_page)?;

        // 3. Extraction
        let snapshot = extract_usage_snapshot(&usage_page.body).map_err(|source| {
            warn!(error = %source, "Usage page did not parse");
            SessionError::Extract {
                step: Step::UsagePage,
                source,
            }
        })?;

        info!(
            remaining_gb = snapshot.remaining_gb(),
            total_gb = snapshot.total_gb(),
            "Usage fetched"
        );
        Ok(snapshot)
    }
}

#[async_trait]
impl UsagePortal for PortalSession {
    async fn login(&self, credentials: &SessionCredentials) -> Result<(), SessionError> {
        PortalSession::login(self, credentials).await
    }

    async fn fetch_usage(&self) -> Result<UsageSnapshot, SessionError> {
        PortalSession::fetch_usage(self).await
    }

    fn logout(&self) {
        PortalSession::logout(self);
    }
}
