//! NX-API client session
//!
//! A [`ClientSession`] holds everything a conversation with one switch (or
//! one set of redundant switches) needs: the candidate hosts and the cursor
//! into them, the credentials, the aaaLogin token and refresh period, and the
//! cookie store. All state changes happen as a side effect of requests, and
//! every request takes `&mut self`, so two requests through one session can
//! never race on cookies or the host cursor. Share a session between tasks by
//! wrapping it in a `tokio::sync::Mutex`.
//!
//! Only authentication fails over between hosts. Once a host has answered
//! aaaLogin the cursor stays on it, and every later request goes there.

use crate::common::{make_url, API_SCHEME, CONFIG_ROOT_PATH};
use crate::config::ClientOptions;
use crate::envelope::{parse_envelope_attributes, parse_envelope_error, preview};
use crate::error::NxError;
use crate::models::{AttributeRecord, ManagedObject};
use crate::transport::{ApiRequest, HttpTransport, Method, ReqwestTransport, Url};
use chrono::{DateTime, Utc};
use reqwest::cookie::{CookieStore, Jar};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Refresh period assumed until the switch reports one
pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(60);

/// Session with a Nexus switch
pub struct ClientSession {
    hosts: Vec<String>,
    host: usize,
    user: String,
    pass: String,
    debug: bool,
    cookie_name: String,
    pub(crate) token: String,
    pub(crate) refresh_timeout: Duration,
    pub(crate) refreshed_at: Option<DateTime<Utc>>,
    jar: Jar,
    transport: Box<dyn HttpTransport>,
}

impl fmt::Debug for ClientSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSession")
            .field("hosts", &self.hosts)
            .field("host", &self.host)
            .field("user", &self.user)
            .field("debug", &self.debug)
            .field("cookie_name", &self.cookie_name)
            .field("authenticated", &self.is_authenticated())
            .field("refresh_timeout", &self.refresh_timeout)
            .finish_non_exhaustive()
    }
}

impl ClientSession {
    /// Create a session talking HTTPS to real switches.
    ///
    /// Unset options are filled from the `NEXUS_*` environment variables.
    /// No request is made until [`login`](Self::login).
    pub fn new(options: ClientOptions) -> Result<Self, NxError> {
        let options = options.resolve()?;
        let transport = ReqwestTransport::new(&options.tls, &options.timeouts)?;
        Ok(Self::assemble(options, Box::new(transport)))
    }

    /// Create a session over a custom transport (e.g. a mock)
    pub fn with_transport<T>(options: ClientOptions, transport: T) -> Result<Self, NxError>
    where
        T: HttpTransport + 'static,
    {
        let options = options.resolve()?;
        Ok(Self::assemble(options, Box::new(transport)))
    }

    fn assemble(options: ClientOptions, transport: Box<dyn HttpTransport>) -> Self {
        let cookie_name = options.cookie_name().to_string();
        debug!(
            "new client: hosts={:?} user={} cookie={}",
            options.hosts, options.user, cookie_name
        );

        Self {
            hosts: options.hosts,
            host: 0,
            user: options.user,
            pass: options.pass,
            debug: options.debug,
            cookie_name,
            token: String::new(),
            refresh_timeout: DEFAULT_REFRESH_TIMEOUT,
            refreshed_at: None,
            jar: Jar::default(),
            transport,
        }
    }

    /// Candidate hosts in failover order
    #[must_use]
    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    /// Index of the host requests currently go to
    #[must_use]
    pub fn host_index(&self) -> usize {
        self.host
    }

    /// Host requests currently go to
    #[must_use]
    pub fn current_host(&self) -> &str {
        self.hosts.get(self.host).map_or("", String::as_str)
    }

    /// Username
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    pub(crate) fn pass(&self) -> &str {
        &self.pass
    }

    /// Whether request bodies and replies are logged
    #[must_use]
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Name of the session cookie learned from replies
    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Token from the last successful login/refresh, empty when logged out
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// True between a successful login and logout
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }

    /// Session timeout reported by the last login/refresh.
    ///
    /// Call [`refresh`](Self::refresh) more often than this to keep the
    /// session alive.
    #[must_use]
    pub fn refresh_timeout(&self) -> Duration {
        self.refresh_timeout
    }

    /// When the token was last issued or renewed
    #[must_use]
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    /// Point in time after which the switch drops the session
    #[must_use]
    pub fn refresh_deadline(&self) -> Option<DateTime<Utc>> {
        let timeout = chrono::Duration::from_std(self.refresh_timeout).ok()?;
        self.refreshed_at.map(|at| at + timeout)
    }

    /// `Cookie` header value the session would send to the current host
    #[must_use]
    pub fn cookie_header(&self) -> Option<String> {
        let url = Url::parse(&make_url(API_SCHEME, self.current_host(), "/")).ok()?;
        self.cookies_for(&url)
    }

    pub(crate) fn clear_token(&mut self) {
        self.token.clear();
        self.refreshed_at = None;
    }

    /// GET `path` on the current host
    pub async fn execute_get(&mut self, op: &str, path: &str) -> Result<Vec<u8>, NxError> {
        self.execute(op, Method::GET, path, None, Payload::Loggable).await
    }

    /// DELETE `path` on the current host
    pub async fn execute_delete(&mut self, op: &str, path: &str) -> Result<Vec<u8>, NxError> {
        self.execute(op, Method::DELETE, path, None, Payload::Loggable).await
    }

    /// POST a JSON body to `path` on the current host
    pub async fn execute_post(
        &mut self,
        op: &str,
        path: &str,
        body: String,
    ) -> Result<Vec<u8>, NxError> {
        self.execute(op, Method::POST, path, Some(body), Payload::Loggable).await
    }

    /// Run an aaa* exchange on the current host. The body carries the
    /// password and the reply the token, so neither is logged.
    pub(crate) async fn execute_credentials(
        &mut self,
        op: &str,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<Vec<u8>, NxError> {
        self.execute(op, method, path, body, Payload::Secret).await
    }

    /// POST `body` to `path`, starting at the current host and moving down
    /// the host list on transport failures.
    ///
    /// The cursor is left on the host that answered. When every remaining
    /// host has failed the cursor is rewound to the first host and
    /// [`NxError::AllHostsExhausted`] carries the last failure.
    ///
    /// Only authentication fails over, so the body and reply are treated as
    /// credentials and never logged.
    pub async fn execute_with_failover(
        &mut self,
        op: &str,
        path: &str,
        body: String,
    ) -> Result<Vec<u8>, NxError> {
        let mut last = None;

        while self.host < self.hosts.len() {
            let attempt = self
                .execute(op, Method::POST, path, Some(body.clone()), Payload::Secret)
                .await;
            match attempt {
                Ok(reply) => return Ok(reply),
                Err(e) if e.is_transport() => {
                    debug!("{}: host {} failed: {}", op, self.current_host(), e);
                    last = Some(e);
                    self.host += 1;
                }
                Err(e) => return Err(e),
            }
        }

        self.host = 0;
        let last = last.unwrap_or_else(|| NxError::Protocol("no Nexus hosts to try".to_string()));
        Err(NxError::AllHostsExhausted { last: Box::new(last) })
    }

    async fn execute(
        &mut self,
        op: &str,
        method: Method,
        path: &str,
        body: Option<String>,
        payload: Payload,
    ) -> Result<Vec<u8>, NxError> {
        let url = self.resolve_url(path)?;
        debug!("{}: {} endpoint: {}", op, method, url);
        if let Some(body) = &body {
            match payload {
                Payload::Loggable if self.debug => debug!("{}: body: {}", op, body),
                Payload::Secret if self.debug => debug!("{}: body: <redacted>", op),
                _ => {}
            }
        }

        let cookie = self.cookies_for(&url);
        match &cookie {
            Some(header) => debug!("{}: cookies to send: {}", op, cookie_names(header)),
            None => debug!("{}: no cookies to send url={}", op, url),
        }

        let response = self
            .transport
            .execute(ApiRequest {
                method,
                url: url.clone(),
                body,
                cookie,
            })
            .await?;

        self.learn_cookies(&url, &response.cookies);

        match payload {
            Payload::Loggable if self.debug => {
                debug!("{}: reply ({}): {}", op, response.status, preview(&response.body));
            }
            Payload::Secret if self.debug => {
                debug!("{}: reply ({}): <redacted>", op, response.status);
            }
            _ => {}
        }

        Ok(response.body)
    }

    fn resolve_url(&self, path: &str) -> Result<Url, NxError> {
        if !path.starts_with('/') {
            return Err(NxError::Protocol(format!("bad api path: {}", path)));
        }

        let raw = make_url(API_SCHEME, self.current_host(), path);
        let url = Url::parse(&raw).map_err(|e| NxError::transport(raw.as_str(), e))?;
        if url.scheme() != API_SCHEME {
            return Err(NxError::Protocol(format!("bad URL: {}", url)));
        }
        Ok(url)
    }

    fn cookies_for(&self, url: &Url) -> Option<String> {
        self.jar
            .cookies(url)
            .and_then(|header| header.to_str().ok().map(str::to_string))
    }

    fn learn_cookies(&self, url: &Url, cookies: &[(String, String)]) {
        for (name, value) in cookies {
            debug!("learnCookies: seen: url={} cookie={}", url, name);
            if *name == self.cookie_name {
                self.jar
                    .add_cookie_str(&format!("{}={}; Path=/", name, value), url);
                debug!("learnCookies: learnt: url={} cookie={}", url, name);
                break;
            }
        }
    }
}

/// Generic configuration and query calls
impl ClientSession {
    /// Post `children` wrapped in `topSystem` to `/api/mo.json` and check
    /// the reply for an `error` item
    pub async fn post_config(
        &mut self,
        op: &str,
        children: Vec<ManagedObject>,
    ) -> Result<(), NxError> {
        let body = ManagedObject::top_system(children).to_json()?;
        let reply = self.execute_post(op, CONFIG_ROOT_PATH, body).await?;
        parse_envelope_error(&reply)
    }

    /// GET `path` and return the attributes of every `class` object in the reply
    pub async fn query_class(
        &mut self,
        op: &str,
        path: &str,
        class: &str,
    ) -> Result<Vec<AttributeRecord>, NxError> {
        let reply = self.execute_get(op, path).await?;
        parse_envelope_attributes(&reply, class)
    }

    /// DELETE the object at `path` and check the reply for an `error` item
    pub async fn delete_object(&mut self, op: &str, path: &str) -> Result<(), NxError> {
        let reply = self.execute_delete(op, path).await?;
        parse_envelope_error(&reply)
    }
}

/// Whether a request body and its reply may appear in debug logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Payload {
    Loggable,
    /// Credentials in the body or a token in the reply
    Secret,
}

fn cookie_names(header: &str) -> String {
    header
        .split(';')
        .filter_map(|pair| pair.split('=').next())
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(",")
}
