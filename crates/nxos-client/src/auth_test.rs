//! Unit tests for aaaLogin / aaaRefresh / aaaLogout handling

#[cfg(test)]
mod tests {
    use crate::auth::{parse_refresh_timeout, LOGIN_PATH, LOGOUT_PATH, REFRESH_PATH};
    use crate::config::ClientOptions;
    use crate::error::NxError;
    use crate::mock::MockTransport;
    use crate::session::ClientSession;
    use crate::transport::Method;
    use serde_json::Value;
    use std::time::Duration;

    fn login_reply(token: &str, refresh: &str) -> String {
        format!(
            r#"{{"imdata":[{{"aaaLogin":{{"attributes":{{"token":"{}","refreshTimeoutSeconds":"{}","userName":"admin"}}}}}}]}}"#,
            token, refresh
        )
    }

    const LOGIN_DENIED: &str = r#"{"imdata":[{"error":{"attributes":{"code":"401","text":"Username or password is not correct"}}}]}"#;

    fn session(mock: &MockTransport, hosts: &[&str]) -> ClientSession {
        let hosts = hosts.iter().map(|h| h.to_string()).collect();
        let opts = ClientOptions::new(hosts, "admin", "s3cr\"t");
        ClientSession::with_transport(opts, mock.clone()).expect("session")
    }

    #[tokio::test]
    async fn test_login_stores_token_and_refresh_timeout() {
        let mock = MockTransport::new();
        mock.push_reply("n9k", login_reply("T", "120"));
        let mut s = session(&mock, &["n9k"]);
        assert!(!s.is_authenticated());
        assert_eq!(s.refresh_deadline(), None);

        s.login().await.expect("login");

        assert_eq!(s.token(), "T");
        assert!(s.is_authenticated());
        assert_eq!(s.refresh_timeout(), Duration::from_secs(120));
        let at = s.refreshed_at().expect("refreshed_at");
        assert_eq!(s.refresh_deadline(), Some(at + chrono::Duration::seconds(120)));
    }

    #[tokio::test]
    async fn test_login_request_carries_credentials() {
        let mock = MockTransport::new();
        mock.push_reply("n9k", login_reply("T", "120"));
        let mut s = session(&mock, &["n9k"]);

        s.login().await.expect("login");

        let req = mock.last_request().expect("request");
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.url.path(), LOGIN_PATH);
        let body: Value = serde_json::from_str(req.body.as_deref().expect("body")).expect("json");
        assert_eq!(body["aaaUser"]["attributes"]["name"], "admin");
        assert_eq!(body["aaaUser"]["attributes"]["pwd"], "s3cr\"t");
    }

    #[tokio::test]
    async fn test_unparsable_refresh_timeout_defaults_to_sixty_seconds() {
        let mock = MockTransport::new();
        mock.push_reply("n9k", login_reply("T", "abc"));
        let mut s = session(&mock, &["n9k"]);

        s.login().await.expect("login still succeeds");
        assert_eq!(s.token(), "T");
        assert_eq!(s.refresh_timeout(), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_login_error_envelope_is_auth_error() {
        let mock = MockTransport::new();
        mock.push_reply("n9k", LOGIN_DENIED);
        let mut s = session(&mock, &["n9k"]);

        match s.login().await {
            Err(NxError::Auth { code, text }) => {
                assert_eq!(code, "401");
                assert_eq!(text, "Username or password is not correct");
            }
            other => panic!("expected auth error, got {:?}", other),
        }
        assert!(!s.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_auth_error_does_not_fail_over() {
        let mock = MockTransport::new();
        mock.push_reply("h1", LOGIN_DENIED);
        let mut s = session(&mock, &["h1", "h2"]);

        assert!(matches!(s.login().await, Err(NxError::Auth { .. })));
        assert_eq!(mock.requests().len(), 1);
        assert_eq!(s.host_index(), 0);
    }

    #[tokio::test]
    async fn test_login_unknown_reply_is_protocol_error() {
        let mock = MockTransport::new();
        mock.push_reply("n9k", r#"{"imdata":[]}"#);
        let mut s = session(&mock, &["n9k"]);
        assert!(matches!(s.login().await, Err(NxError::Protocol(_))));

        mock.push_reply("n9k", "<html>login</html>");
        assert!(matches!(s.login().await, Err(NxError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_login_reply_without_token_is_rejected() {
        let mock = MockTransport::new();
        mock.push_reply(
            "n9k",
            r#"{"imdata":[{"aaaLogin":{"attributes":{"refreshTimeoutSeconds":"600"}}}]}"#,
        );
        let mut s = session(&mock, &["n9k"]);

        assert!(matches!(s.login().await, Err(NxError::Protocol(_))));
        assert!(!s.is_authenticated());
        assert_eq!(s.refreshed_at(), None);
    }

    #[tokio::test]
    async fn test_refresh_uses_sticky_host_without_failover() {
        let mock = MockTransport::new();
        mock.set_host_down("h1");
        mock.push_reply("h2", login_reply("T1", "300"));
        let mut s = session(&mock, &["h1", "h2", "h3"]);
        s.login().await.expect("login via h2");

        mock.push_reply("h2", login_reply("T2", "90"));
        s.refresh().await.expect("refresh");
        let req = mock.last_request().expect("request");
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.url.host_str(), Some("h2"));
        assert_eq!(req.url.path(), REFRESH_PATH);
        assert_eq!(s.token(), "T2");
        assert_eq!(s.refresh_timeout(), Duration::from_secs(90));

        // h2 going away is reported as is; h3 is never tried
        mock.set_host_down("h2");
        let before = mock.requests().len();
        let err = s.refresh().await.expect_err("refresh fails");
        assert!(err.is_transport());
        assert_eq!(mock.requests().len(), before + 1);
        assert_eq!(s.current_host(), "h2");
    }

    #[tokio::test]
    async fn test_refresh_rejected_logs_session_out() {
        let mock = MockTransport::new();
        mock.push_reply("n9k", login_reply("T", "600"));
        let mut s = session(&mock, &["n9k"]);
        s.login().await.expect("login");

        mock.push_reply(
            "n9k",
            r#"{"imdata":[{"error":{"attributes":{"code":"403","text":"Token was invalid"}}}]}"#,
        );
        assert!(matches!(s.refresh().await, Err(NxError::Auth { ref code, .. }) if code == "403"));
        assert!(!s.is_authenticated());
        assert_eq!(s.refreshed_at(), None);
    }

    #[tokio::test]
    async fn test_logout_posts_credentials_and_clears_token() {
        let mock = MockTransport::new();
        mock.push_reply("n9k", login_reply("T", "600"));
        let mut s = session(&mock, &["n9k"]);
        s.login().await.expect("login");

        s.logout().await;

        let req = mock.last_request().expect("request");
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.url.path(), LOGOUT_PATH);
        assert!(req.body.as_deref().unwrap_or_default().contains("aaaUser"));
        assert!(!s.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_swallows_errors() {
        let mock = MockTransport::new();
        mock.push_reply("n9k", login_reply("T", "600"));
        let mut s = session(&mock, &["n9k"]);
        s.login().await.expect("login");

        mock.set_host_down("n9k");
        s.logout().await;
        assert!(!s.is_authenticated());
    }

    #[test]
    fn test_parse_refresh_timeout() {
        assert_eq!(parse_refresh_timeout("600"), Duration::from_secs(600));
        assert_eq!(parse_refresh_timeout(""), Duration::from_secs(60));
        assert_eq!(parse_refresh_timeout("-5"), Duration::from_secs(60));
        assert_eq!(parse_refresh_timeout("1.5"), Duration::from_secs(60));
    }
}
