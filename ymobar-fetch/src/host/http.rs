//! HTTP client with tracing and a shared cookie session.
//!
//! This module wraps reqwest with:
//! - The session's [`SessionCookieStore`] on every request and redirect hop
//! - Bounded connect and read timeouts
//! - Request/response tracing
//! - Eager body reading, so callers see status, final URL and text together

use std::sync::Arc;

use reqwest::{Client, Response};
use tracing::{debug, instrument};
use url::Url;

use super::cookies::SessionCookieStore;
use crate::options::SessionOptions;

// ============================================================================
// Page Response
// ============================================================================

/// A fully read response.
#[derive(Debug, Clone)]
pub struct PageResponse {
    /// HTTP status code.
    pub status: u16,
    /// URL after following redirects.
    pub final_url: Url,
    /// Response body as text.
    pub body: String,
}

impl PageResponse {
    /// Returns true for 2xx responses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns true if the body is empty or whitespace only.
    pub fn is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }

    async fn read(response: Response) -> Result<Self, reqwest::Error> {
        let status = response.status().as_u16();
        let final_url = response.url().clone();
        debug!(status, final_url = %final_url, "Response received");
        let body = response.text().await?;
        Ok(Self {
            status,
            final_url,
            body,
        })
    }
}

// ============================================================================
// HTTP Client
// ============================================================================

/// HTTP client bound to one cookie session.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    cookies: Arc<SessionCookieStore>,
}

impl HttpClient {
    /// Creates a client that reads and writes `cookies`.
    ///
    /// # Errors
    ///
    /// Returns the reqwest error if the client cannot be built, which only
    /// happens with a broken TLS configuration.
    pub fn new(
        options: &SessionOptions,
        cookies: Arc<SessionCookieStore>,
    ) -> Result<Self, reqwest::Error> {
        let inner = Client::builder()
            .cookie_provider(Arc::clone(&cookies))
            .connect_timeout(options.connect_timeout)
            .read_timeout(options.read_timeout)
            .user_agent(options.user_agent.as_str())
            .build()?;

        Ok(Self { inner, cookies })
    }

    /// Performs a GET request and reads the body.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get(&self, url: &str) -> Result<PageResponse, reqwest::Error> {
        debug!("GET request");
        let response = self.inner.get(url).send().await?;
        PageResponse::read(response).await
    }

    /// Performs a POST request with form data and reads the body.
    ///
    /// Form values are never logged.
    #[instrument(skip(self, form), fields(url = %url))]
    pub async fn post_form<T: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        form: &T,
    ) -> Result<PageResponse, reqwest::Error> {
        debug!("POST request with form data");
        let response = self.inner.post(url).form(form).send().await?;
        PageResponse::read(response).await
    }

    /// The cookie store shared with this client.
    pub fn cookies(&self) -> &Arc<SessionCookieStore> {
        &self.cookies
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn page(status: u16, body: &str) -> PageResponse {
        PageResponse {
            status,
            final_url: Url::parse("https://my.example.jp/").unwrap(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_page_response_success() {
        assert!(page(200, "x").is_success());
        assert!(page(204, "").is_success());
        assert!(!page(302, "x").is_success());
        assert!(!page(500, "x").is_success());
    }

    #[test]
    fn test_page_response_empty() {
        assert!(page(200, "").is_empty());
        assert!(page(200, " \n\t").is_empty());
        assert!(!page(200, "<html>").is_empty());
    }

    #[test]
    fn test_client_builds() {
        let cookies = Arc::new(SessionCookieStore::new());
        let client = HttpClient::new(&SessionOptions::default(), Arc::clone(&cookies)).unwrap();
        assert!(Arc::ptr_eq(client.cookies(), &cookies));
    }
}
