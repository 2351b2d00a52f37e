//! Portal endpoint URLs.
//!
//! The four URLs form a fixed wire contract with the portal. They are kept
//! in one value so tests can point the whole handshake at a local server.

use url::Url;

/// Production portal domain.
pub const DEFAULT_PORTAL_DOMAIN: &str = "ymobile.jp";

/// Login entry page, issues the ticket.
const TICKET_PATH: &str = "/muc/d/webLink/doSend/MWBWL0130";

/// Credential submit endpoint.
const LOGIN_PATH: &str = "/sbid_auth/type1/2.0/login.php";

/// Page issuing the token pair.
const TOKEN_PATH: &str = "/muc/d/webLink/doSend/MRERE0000";

/// Usage summary page.
const USAGE_PATH: &str = "/resfe/top/";

/// Final path segment of the login page; a login that ends here was rejected.
pub const LOGIN_PAGE_MARKER: &str = "login.php";

/// Absolute URLs of the four handshake requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalEndpoints {
    /// GET, login entry page.
    pub ticket: String,
    /// POST, credential submit.
    pub login: String,
    /// GET, token pair page.
    pub token: String,
    /// POST, usage summary page.
    pub usage: String,
}

impl PortalEndpoints {
    /// Builds the endpoint set for a portal domain such as `ymobile.jp`.
    pub fn for_domain(domain: &str) -> Self {
        Self {
            ticket: format!("https://my.{domain}{TICKET_PATH}"),
            login: format!("https://id.my.{domain}{LOGIN_PATH}"),
            token: format!("https://my.{domain}{TOKEN_PATH}"),
            usage: format!("https://re61.my.{domain}{USAGE_PATH}"),
        }
    }

    /// Builds the endpoint set with every path under one base URL.
    ///
    /// Used to run the handshake against a mock server.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            ticket: format!("{base}{TICKET_PATH}"),
            login: format!("{base}{LOGIN_PATH}"),
            token: format!("{base}{TOKEN_PATH}"),
            usage: format!("{base}{USAGE_PATH}"),
        }
    }

    /// Returns true if `url` points at the login page.
    pub fn is_login_page(url: &Url) -> bool {
        url.path().ends_with(LOGIN_PAGE_MARKER)
    }

    /// Path of the login entry page.
    pub fn ticket_path() -> &'static str {
        TICKET_PATH
    }

    /// Path of the credential submit endpoint.
    pub fn login_path() -> &'static str {
        LOGIN_PATH
    }

    /// Path of the token pair page.
    pub fn token_path() -> &'static str {
        TOKEN_PATH
    }

    /// Path of the usage summary page.
    pub fn usage_path() -> &'static str {
        USAGE_PATH
    }
}

impl Default for PortalEndpoints {
    fn default() -> Self {
        Self::for_domain(DEFAULT_PORTAL_DOMAIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_endpoints() {
        let endpoints = PortalEndpoints::default();
        assert_eq!(
            endpoints.ticket,
            "https://my.ymobile.jp/muc/d/webLink/doSend/MWBWL0130"
        );
        assert_eq!(
            endpoints.login,
            "https://id.my.ymobile.jp/sbid_auth/type1/2.0/login.php"
        );
        assert_eq!(
            endpoints.token,
            "https://my.ymobile.jp/muc/d/webLink/doSend/MRERE0000"
        );
        assert_eq!(endpoints.usage, "https://re61.my.ymobile.jp/resfe/top/");
    }

    #[test]
    fn test_with_base() {
        let endpoints = PortalEndpoints::with_base("http://127.0.0.1:8080/");
        assert_eq!(endpoints.usage, "http://127.0.0.1:8080/resfe/top/");
    }

    #[test]
    fn test_is_login_page() {
        let rejected = Url::parse("https://id.my.ymobile.jp/sbid_auth/type1/2.0/login.php?err=1").unwrap();
        let accepted = Url::parse("https://my.ymobile.jp/muc/d/top").unwrap();
        assert!(PortalEndpoints::is_login_page(&rejected));
        assert!(!PortalEndpoints::is_login_page(&accepted));
    }
}
