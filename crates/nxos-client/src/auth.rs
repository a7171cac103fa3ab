//! aaaLogin / aaaRefresh / aaaLogout
//!
//! Login posts the credentials to each candidate host in turn until one
//! answers; refresh and logout go to whichever host login settled on.
//! Nothing refreshes the session in the background: callers must call
//! [`ClientSession::refresh`] more often than
//! [`ClientSession::refresh_timeout`].

use crate::envelope::{parse_login_reply, LoginReply};
use crate::error::NxError;
use crate::models::ManagedObject;
use crate::session::{ClientSession, DEFAULT_REFRESH_TIMEOUT};
use crate::transport::Method;
use chrono::Utc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// aaaLogin endpoint
pub const LOGIN_PATH: &str = "/api/aaaLogin.json";
/// aaaRefresh endpoint
pub const REFRESH_PATH: &str = "/api/aaaRefresh.json";
/// aaaLogout endpoint
pub const LOGOUT_PATH: &str = "/api/aaaLogout.json";

impl ClientSession {
    /// Open a session with aaaLogin.
    ///
    /// Tries each host from the current cursor onwards; the first host that
    /// answers becomes the host for every later request.
    pub async fn login(&mut self) -> Result<(), NxError> {
        let body = self.aaa_user_body()?;
        debug!("login: api={} user={}", LOGIN_PATH, self.user());

        let reply = self.execute_with_failover("login", LOGIN_PATH, body).await?;
        let login = parse_login_reply(&reply)?;
        self.apply_login_reply(login);

        info!(
            "Logged in to Nexus host {} as {} (refresh every {:?})",
            self.current_host(),
            self.user(),
            self.refresh_timeout()
        );
        Ok(())
    }

    /// Reset the session timer with aaaRefresh.
    ///
    /// Goes to the current host only. If the switch rejects the refresh the
    /// session is considered logged out.
    pub async fn refresh(&mut self) -> Result<(), NxError> {
        let reply = self
            .execute_credentials("refresh", Method::GET, REFRESH_PATH, None)
            .await?;

        match parse_login_reply(&reply) {
            Ok(login) => {
                self.apply_login_reply(login);
                Ok(())
            }
            Err(e @ NxError::Auth { .. }) => {
                self.clear_token();
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Close the session with aaaLogout.
    ///
    /// Best effort: failures are logged, never returned. The token is
    /// dropped either way.
    pub async fn logout(&mut self) {
        match self.aaa_user_body() {
            Ok(body) => {
                let result = self
                    .execute_credentials("logout", Method::POST, LOGOUT_PATH, Some(body))
                    .await;
                match result {
                    Ok(_) => debug!("logout: user={} host={}", self.user(), self.current_host()),
                    Err(e) => warn!("Failed to logout user {}: {}", self.user(), e),
                }
            }
            Err(e) => warn!("Failed to build logout body for {}: {}", self.user(), e),
        }

        self.clear_token();
    }

    fn aaa_user_body(&self) -> Result<String, NxError> {
        ManagedObject::new("aaaUser")
            .attr("name", self.user())
            .attr("pwd", self.pass())
            .to_json()
    }

    fn apply_login_reply(&mut self, reply: LoginReply) {
        self.token = reply.token;
        self.refresh_timeout = parse_refresh_timeout(&reply.refresh_timeout_seconds);
        self.refreshed_at = Some(Utc::now());
        debug!("refresh: timeout={:?}", self.refresh_timeout);
    }
}

/// Parse `refreshTimeoutSeconds`, falling back to 60s
#[must_use]
pub fn parse_refresh_timeout(raw: &str) -> Duration {
    match raw.parse::<u64>() {
        Ok(secs) => Duration::from_secs(secs),
        Err(e) => {
            warn!("bad refresh timeout '{}': {}, using {:?}", raw, e, DEFAULT_REFRESH_TIMEOUT);
            DEFAULT_REFRESH_TIMEOUT
        }
    }
}
