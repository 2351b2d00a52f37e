//! Relogin-and-retry policy for usage fetches.
//!
//! The portal session can expire between a login and a later refresh. When
//! a fetch fails and credentials are at hand, the policy logs in again and
//! retries the fetch exactly once. There is no backoff and no further retry.

use tracing::{info, instrument, warn};
use ymobar_core::{SessionCredentials, UsageSnapshot};

use crate::error::SessionError;
use crate::session::UsagePortal;

/// Fetches usage, recovering once from an expired session.
///
/// 1. Fetch. Success returns immediately.
/// 2. On failure with complete credentials, log in once.
/// 3. If that login succeeds, fetch once more and return that result as final.
/// 4. Otherwise return the first fetch's error. The relogin error is only
///    logged, so the caller sees the root cause.
///
/// # Errors
///
/// Returns the first fetch's error when recovery is impossible or the
/// relogin fails, and the second fetch's error when the retry fails.
#[instrument(skip_all, name = "fetch_with_recovery")]
pub async fn fetch_with_recovery<P>(
    portal: &P,
    credentials: Option<&SessionCredentials>,
) -> Result<UsageSnapshot, SessionError>
where
    P: UsagePortal + ?Sized,
{
    let first_error = match portal.fetch_usage().await {
        Ok(snapshot) => return Ok(snapshot),
        Err(e) => e,
    };

    let Some(credentials) = credentials.filter(|c| c.is_complete()) else {
        warn!(error = %first_error, "Fetch failed and no credentials are available for relogin");
        return Err(first_error);
    };

    info!(error = %first_error, "Fetch failed, logging in again");
    if let Err(relogin_error) = portal.login(credentials).await {
        warn!(error = %relogin_error, "Relogin failed, reporting the original fetch error");
        return Err(first_error);
    }

    portal.fetch_usage().await.inspect_err(|e| {
        warn!(error = %e, "Fetch failed again after relogin");
    })
}

// ============================================================================
// Tests
// ============================================================================
