//! End-to-end handshake tests against a mock portal.

use std::time::Duration;

use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use ymobar_core::SessionCredentials;
use ymobar_fetch::{
    fetch_with_recovery, ExtractError, PortalEndpoints, PortalSession, RejectReason,
    SessionError, SessionOptions, Step,
};

const TICKET_PAGE: &str = r#"<html><body><form>
    <input type="hidden" name="ticket" value="TICKET-1">
    <input type="text" name="telnum">
</form></body></html>"#;

const TOKEN_PAGE: &str = r#"<html><body><form>
    <input type="hidden" name="mfiv" value="IV-1">
    <input type="hidden" name="mfym" value="YM-1">
</form></body></html>"#;

const USAGE_PAGE: &str = r#"<html><body>
<div class="list-toggle-content js-toggle-content m-top-20">
  <table><tbody><tr><td>
      1.23GB
  </td></tr></tbody></table>
  <table><tbody><tr><th>基本</th></tr><tr><td>3.00GB</td></tr></tbody></table>
  <table><tbody><tr><td>0.50GB</td></tr></tbody></table>
  <table><tbody><tr><td>	2.10GB	</td></tr></tbody></table>
</div>
</body></html>"#;

fn creds() -> SessionCredentials {
    SessionCredentials::new("09012345678", "pass word")
}

fn session(server: &MockServer) -> PortalSession {
    let options = SessionOptions::default()
        .with_connect_timeout(Duration::from_secs(5))
        .with_read_timeout(Duration::from_secs(5));
    PortalSession::new(PortalEndpoints::with_base(&server.uri()), &options).unwrap()
}

async fn mount_ticket_page(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(PortalEndpoints::ticket_path()))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "ENTRY=e1; Path=/")
                .set_body_string(TICKET_PAGE),
        )
        .mount(server)
        .await;
}

async fn mount_accepting_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(PortalEndpoints::login_path()))
        .and(header("cookie", "ENTRY=e1"))
        .and(body_string_contains("telnum=09012345678"))
        .and(body_string_contains("password=pass+word"))
        .and(body_string_contains("ticket=TICKET-1"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", "/muc/d/top")
                .insert_header("set-cookie", "SESSION=auth; Path=/"),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/muc/d/top"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>welcome</html>"))
        .mount(server)
        .await;
}

async fn mount_data_pages(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(PortalEndpoints::token_path()))
        .and(header("cookie", "SESSION=auth"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TOKEN_PAGE))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(PortalEndpoints::usage_path()))
        .and(header("cookie", "SESSION=auth"))
        .and(body_string_contains("mfiv=IV-1"))
        .and(body_string_contains("mfym=YM-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(USAGE_PAGE))
        .mount(server)
        .await;
}

// ============================================================================
// Authentication flow
// ============================================================================

#[tokio::test]
async fn test_login_accepted_after_redirect() {
    let server = MockServer::start().await;
    mount_ticket_page(&server).await;
    mount_accepting_login(&server).await;

    let session = session(&server);
    session.login(&creds()).await.unwrap();

    assert_eq!(session.cookies().host_count(), 1);
}

#[tokio::test]
async fn test_login_rejected_when_left_on_login_page_with_200() {
    let server = MockServer::start().await;
    mount_ticket_page(&server).await;
    Mock::given(method("POST"))
        .and(path(PortalEndpoints::login_path()))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>bad password</html>"))
        .mount(&server)
        .await;

    let err = session(&server).login(&creds()).await.unwrap_err();

    assert!(matches!(
        err,
        SessionError::AuthRejected(RejectReason::RedirectedToLogin { ref final_url })
            if final_url.ends_with("login.php")
    ));
}

#[tokio::test]
async fn test_login_rejected_when_redirected_back_to_login() {
    let server = MockServer::start().await;
    mount_ticket_page(&server).await;
    Mock::given(method("POST"))
        .and(path(PortalEndpoints::login_path()))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", "/sbid_auth/type1/2.0/login.php?err=1"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PortalEndpoints::login_path()))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let err = session(&server).login(&creds()).await.unwrap_err();
    assert!(err.is_auth_rejected());
}

#[tokio::test]
async fn test_login_rejected_without_ticket() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PortalEndpoints::ticket_path()))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(PortalEndpoints::login_path()))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = session(&server).login(&creds()).await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::AuthRejected(RejectReason::TicketMissing)
    ));
}

#[tokio::test]
async fn test_login_rejected_on_ticket_page_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PortalEndpoints::ticket_path()))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = session(&server).login(&creds()).await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::AuthRejected(RejectReason::TicketPageStatus(503))
    ));
}

#[tokio::test]
async fn test_transport_failure_is_not_rejection() {
    // Nothing listens on port 1.
    let endpoints = PortalEndpoints::with_base("http://127.0.0.1:1");
    let options = SessionOptions::default().with_connect_timeout(Duration::from_secs(2));
    let session = PortalSession::new(endpoints, &options).unwrap();

    let err = session.login(&creds()).await.unwrap_err();
    assert!(matches!(err, SessionError::Transport(_)));
    assert!(!err.is_auth_rejected());

    let err = session.fetch_usage().await.unwrap_err();
    assert!(matches!(err, SessionError::Transport(_)));
}

// ============================================================================
// Data-retrieval flow
// ============================================================================

#[tokio::test]
async fn test_login_then_fetch() {
    let server = MockServer::start().await;
    mount_ticket_page(&server).await;
    mount_accepting_login(&server).await;
    mount_data_pages(&server).await;

    let session = session(&server);
    session.login(&creds()).await.unwrap();
    let snapshot = session.fetch_usage().await.unwrap();

    assert_eq!(snapshot.carry_over_gb(), 1.23);
    assert_eq!(snapshot.base_allowance_gb(), 3.0);
    assert_eq!(snapshot.purchased_extra_gb(), 0.5);
    assert_eq!(snapshot.used_gb(), 2.1);
    assert_eq!(snapshot.remaining_gb(), 2.13);
}

#[tokio::test]
async fn test_fetch_without_session_cookie_fails_with_status() {
    let server = MockServer::start().await;
    mount_data_pages(&server).await;

    let err = session(&server).fetch_usage().await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::HttpStatus {
            step: Step::TokenFetch,
            status: 404
        }
    ));
}

#[tokio::test]
async fn test_fetch_empty_token_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PortalEndpoints::token_path()))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = session(&server).fetch_usage().await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::EmptyBody {
            step: Step::TokenFetch
        }
    ));
}

#[tokio::test]
async fn test_fetch_reports_found_hidden_inputs() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PortalEndpoints::token_path()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<input type="hidden" name="mfiv" value="only">"#),
        )
        .mount(&server)
        .await;

    let err = session(&server).fetch_usage().await.unwrap_err();
    match err {
        SessionError::Extract {
            step: Step::TokenFetch,
            source: ExtractError::InsufficientTokens { found, names },
        } => {
            assert_eq!(found, 1);
            assert_eq!(names, vec!["mfiv".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_usage_page_without_container() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PortalEndpoints::token_path()))
        .respond_with(ResponseTemplate::new(200).set_body_string(TOKEN_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(PortalEndpoints::usage_path()))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>renewal</body></html>"))
        .mount(&server)
        .await;

    let err = session(&server).fetch_usage().await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Extract {
            step: Step::UsagePage,
            source: ExtractError::ContainerNotFound { .. }
        }
    ));
}

// ============================================================================
// Recovery
// ============================================================================

#[tokio::test]
async fn test_recovery_relogs_in_after_expired_session() {
    let server = MockServer::start().await;
    mount_ticket_page(&server).await;
    mount_accepting_login(&server).await;
    mount_data_pages(&server).await;

    // No login yet: the first fetch fails, relogin succeeds, retry succeeds.
    let session = session(&server);
    let snapshot = fetch_with_recovery(&session, Some(&creds())).await.unwrap();
    assert_eq!(snapshot.used_gb(), 2.1);
}

#[tokio::test]
async fn test_recovery_without_credentials_keeps_original_error() {
    let server = MockServer::start().await;
    mount_data_pages(&server).await;
    Mock::given(method("GET"))
        .and(path(PortalEndpoints::ticket_path()))
        .respond_with(ResponseTemplate::new(200).set_body_string(TICKET_PAGE))
        .expect(0)
        .mount(&server)
        .await;

    let err = fetch_with_recovery(&session(&server), None).await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::HttpStatus {
            step: Step::TokenFetch,
            status: 404
        }
    ));
}

#[tokio::test]
async fn test_logout_clears_cookies() {
    let server = MockServer::start().await;
    mount_ticket_page(&server).await;
    mount_accepting_login(&server).await;

    let session = session(&server);
    session.login(&creds()).await.unwrap();
    assert!(!session.cookies().is_empty());

    session.logout();
    assert!(session.cookies().is_empty());
}
