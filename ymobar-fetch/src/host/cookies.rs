//! In-memory, host-scoped cookie store.
//!
//! Every response that carries `Set-Cookie` headers replaces the cookie
//! list stored for its host. The login flow is strictly sequential and each
//! step's response carries the complete cookie set for its host, so there is
//! no per-name merge.
//!
//! The store plugs into reqwest through [`reqwest::cookie::CookieStore`],
//! which means it is consulted on every request and every redirect hop.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::header::HeaderValue;
use tracing::{debug, trace};
use url::Url;

// ============================================================================
// Stored Cookie
// ============================================================================

/// A cookie together with the rules deciding which requests receive it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
    /// Domain the cookie belongs to (lowercase, no leading dot).
    pub domain: String,
    /// Whether only the exact `domain` host receives the cookie.
    pub host_only: bool,
    /// Path prefix the request path must match.
    pub path: String,
    /// Whether the cookie is only sent over https.
    pub secure: bool,
    /// Absolute expiry; `None` for session cookies.
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredCookie {
    /// Parses a `Set-Cookie` header value received from `url`.
    ///
    /// Returns `None` for unparsable headers and for cookies whose `Domain`
    /// attribute does not cover the responding host.
    pub fn parse(header: &str, url: &Url) -> Option<Self> {
        Self::parse_at(header, url, Utc::now())
    }

    fn parse_at(header: &str, url: &Url, now: DateTime<Utc>) -> Option<Self> {
        let parsed = cookie::Cookie::parse(header).ok()?;
        let host = url.host_str()?.to_ascii_lowercase();

        let (domain, host_only) = match parsed.domain() {
            Some(d) if !d.is_empty() => {
                let d = d.trim_start_matches('.').to_ascii_lowercase();
                if !domain_matches(&host, &d) {
                    trace!(cookie = parsed.name(), domain = %d, host = %host, "Cookie domain does not cover host");
                    return None;
                }
                (d, false)
            }
            _ => (host, true),
        };

        let path = match parsed.path() {
            Some(p) if p.starts_with('/') => p.to_string(),
            _ => default_path(url),
        };

        // Max-Age takes precedence over Expires; an unrepresentable one never expires
        let expires_at = if let Some(max_age) = parsed.max_age() {
            TimeDelta::try_seconds(max_age.whole_seconds())
                .and_then(|delta| now.checked_add_signed(delta))
        } else {
            parsed
                .expires_datetime()
                .and_then(|dt| DateTime::from_timestamp(dt.unix_timestamp(), 0))
        };

        Some(Self {
            name: parsed.name().to_string(),
            value: parsed.value().to_string(),
            domain,
            host_only,
            path,
            secure: parsed.secure().unwrap_or(false),
            expires_at,
        })
    }

    /// Returns true if this cookie should be sent with a request to `url`.
    pub fn matches(&self, url: &Url) -> bool {
        self.matches_at(url, Utc::now())
    }

    fn matches_at(&self, url: &Url, now: DateTime<Utc>) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();

        let domain_ok = if self.host_only {
            host == self.domain
        } else {
            domain_matches(&host, &self.domain)
        };

        domain_ok
            && path_matches(url.path(), &self.path)
            && (!self.secure || url.scheme() == "https")
            && self.expires_at.is_none_or(|at| at > now)
    }
}

/// RFC 6265 domain match.
fn domain_matches(host: &str, domain: &str) -> bool {
    host == domain
        || (host.len() > domain.len()
            && host.ends_with(domain)
            && host.as_bytes()[host.len() - domain.len() - 1] == b'.')
}

/// RFC 6265 path match.
fn path_matches(request_path: &str, cookie_path: &str) -> bool {
    if request_path == cookie_path {
        return true;
    }
    request_path.starts_with(cookie_path)
        && (cookie_path.ends_with('/')
            || request_path.as_bytes().get(cookie_path.len()) == Some(&b'/'))
}

/// Default cookie path: the request path up to, not including, its last `/`.
fn default_path(url: &Url) -> String {
    let path = url.path();
    match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => path[..idx].to_string(),
    }
}

// ============================================================================
// Session Cookie Store
// ============================================================================

/// Host-scoped cookie container for one portal session.
#[derive(Debug, Default)]
pub struct SessionCookieStore {
    hosts: RwLock<HashMap<String, Vec<StoredCookie>>>,
}

impl SessionCookieStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the cookie list for `host`.
    pub fn store(&self, host: &str, cookies: Vec<StoredCookie>) {
        debug!(host = %host, count = cookies.len(), "Storing cookies");
        self.hosts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(host.to_ascii_lowercase(), cookies);
    }

    /// Returns the cookies stored for the URL's host that match the URL.
    pub fn load(&self, url: &Url) -> Vec<StoredCookie> {
        let Some(host) = url.host_str() else {
            return Vec::new();
        };
        let hosts = self.hosts.read().unwrap_or_else(PoisonError::into_inner);
        hosts
            .get(&host.to_ascii_lowercase())
            .map(|cookies| cookies.iter().filter(|c| c.matches(url)).cloned().collect())
            .unwrap_or_default()
    }

    /// Drops every stored cookie.
    pub fn clear(&self) {
        self.hosts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        debug!("Cleared cookie store");
    }

    /// Number of hosts with a stored cookie list.
    pub fn host_count(&self) -> usize {
        self.hosts.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.host_count() == 0
    }
}

impl reqwest::cookie::CookieStore for SessionCookieStore {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let Some(host) = url.host_str() else {
            return;
        };

        let cookies: Vec<StoredCookie> = cookie_headers
            .filter_map(|value| {
                let parsed = value.to_str().ok().and_then(|s| StoredCookie::parse(s, url));
                if parsed.is_none() {
                    trace!(host = %host, "Skipping unparsable Set-Cookie header");
                }
                parsed
            })
            .collect();

        if !cookies.is_empty() {
            self.store(host, cookies);
        }
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let header = self
            .load(url)
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ");

        if header.is_empty() {
            None
        } else {
            HeaderValue::from_str(&header).ok()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
