//! Client options
//!
//! Hosts, credentials and the debug flag can be given explicitly or picked up
//! from the environment:
//!
//! | Variable       | Meaning                                                 |
//! |----------------|---------------------------------------------------------|
//! | `NEXUS_HOSTS`  | Comma-separated hostnames or addresses, tried in order  |
//! | `NEXUS_USER`   | Username                                                |
//! | `NEXUS_PASS`   | Password                                                |
//! | `NEXUS_DEBUG`  | Any value enables reply logging                         |
//! | `NEXUS_COOKIE` | Name of the session cookie (default `APIC-cookie`)      |

use crate::error::NxError;
use std::fmt;
use std::time::Duration;

/// Env var: list of Nexus hostnames, e.g. `"1.1.1.1,2.2.2.2"`
pub const NEXUS_HOSTS: &str = "NEXUS_HOSTS";
/// Env var: username
pub const NEXUS_USER: &str = "NEXUS_USER";
/// Env var: password
pub const NEXUS_PASS: &str = "NEXUS_PASS";
/// Env var: enables debug logging of request bodies and replies when set
pub const NEXUS_DEBUG: &str = "NEXUS_DEBUG";
/// Env var: overrides the session cookie name
pub const NEXUS_COOKIE: &str = "NEXUS_COOKIE";

/// Session cookie set by aaaLogin
pub const DEFAULT_AUTH_COOKIE: &str = "APIC-cookie";

/// TLS protocol versions the switch transport can be pinned to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsVersion {
    /// TLS 1.0
    Tls1_0,
    /// TLS 1.1
    Tls1_1,
    /// TLS 1.2
    Tls1_2,
}

impl TlsVersion {
    pub(crate) fn to_reqwest(self) -> reqwest::tls::Version {
        match self {
            Self::Tls1_0 => reqwest::tls::Version::TLS_1_0,
            Self::Tls1_1 => reqwest::tls::Version::TLS_1_1,
            Self::Tls1_2 => reqwest::tls::Version::TLS_1_2,
        }
    }
}

/// TLS settings for talking to switch management interfaces.
///
/// The default matches what Nexus management ports ship with: self-signed
/// certificates and TLS 1.1 only. Tighten it for switches that support
/// more.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPolicy {
    /// Skip certificate and hostname verification
    pub accept_invalid_certs: bool,
    /// Lowest TLS version offered, `None` for the backend default
    pub min_version: Option<TlsVersion>,
    /// Highest TLS version offered, `None` for the backend default
    pub max_version: Option<TlsVersion>,
}

impl Default for TlsPolicy {
    fn default() -> Self {
        Self {
            accept_invalid_certs: true,
            min_version: Some(TlsVersion::Tls1_1),
            max_version: Some(TlsVersion::Tls1_1),
        }
    }
}

/// Per-request timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// TCP connect
    pub connect: Duration,
    /// TLS handshake, added to `connect` since the client bounds both as one phase
    pub tls_handshake: Duration,
    /// Wait for response headers (applied as a read timeout)
    pub response_header: Duration,
    /// Whole request including the body
    pub request: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(5),
            tls_handshake: Duration::from_secs(10),
            response_header: Duration::from_secs(10),
            request: Duration::from_secs(15),
        }
    }
}

/// Options for [`ClientSession`](crate::ClientSession)
#[derive(Clone, Default)]
pub struct ClientOptions {
    /// Candidate switch hosts, tried in order during login
    pub hosts: Vec<String>,
    /// Username for aaaLogin
    pub user: String,
    /// Password for aaaLogin, never logged
    pub pass: String,
    /// Log request bodies and replies at debug level
    pub debug: bool,
    /// Session cookie name, defaults to [`DEFAULT_AUTH_COOKIE`]
    pub cookie_name: Option<String>,
    /// TLS settings for the HTTPS transport
    pub tls: TlsPolicy,
    /// Per-request timeouts
    pub timeouts: Timeouts,
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("hosts", &self.hosts)
            .field("user", &self.user)
            .field("pass", &"<redacted>")
            .field("debug", &self.debug)
            .field("cookie_name", &self.cookie_name)
            .field("tls", &self.tls)
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

impl ClientOptions {
    /// Options for the given hosts and credentials with default TLS and timeouts
    pub fn new(hosts: Vec<String>, user: impl Into<String>, pass: impl Into<String>) -> Self {
        Self {
            hosts,
            user: user.into(),
            pass: pass.into(),
            ..Self::default()
        }
    }

    /// Fill unset fields from the process environment and validate
    pub fn resolve(self) -> Result<Self, NxError> {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    /// Fill unset fields from `lookup` and validate.
    ///
    /// Fails if hosts, user or password are still unset, or if any host
    /// entry is blank.
    pub fn resolve_with<F>(mut self, lookup: F) -> Result<Self, NxError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.hosts.is_empty() {
            let hosts = lookup(NEXUS_HOSTS).unwrap_or_default();
            if hosts.is_empty() {
                return Err(NxError::InvalidConfig(format!(
                    "missing Nexus hosts: set {} or pass hosts explicitly",
                    NEXUS_HOSTS
                )));
            }
            self.hosts = hosts.split(',').map(|h| h.trim().to_string()).collect();
        }

        if let Some(blank) = self.hosts.iter().position(|h| h.trim().is_empty()) {
            return Err(NxError::InvalidConfig(format!(
                "blank Nexus hostname at position {} in {:?}",
                blank, self.hosts
            )));
        }

        if self.user.is_empty() {
            self.user = lookup(NEXUS_USER).unwrap_or_default();
            if self.user.is_empty() {
                return Err(NxError::InvalidConfig(format!("missing Nexus user: {}", NEXUS_USER)));
            }
        }

        if self.pass.is_empty() {
            self.pass = lookup(NEXUS_PASS).unwrap_or_default();
            if self.pass.is_empty() {
                return Err(NxError::InvalidConfig(format!("missing Nexus pass: {}", NEXUS_PASS)));
            }
        }

        if !self.debug {
            self.debug = lookup(NEXUS_DEBUG).is_some();
        }

        if self.cookie_name.is_none() {
            self.cookie_name = lookup(NEXUS_COOKIE).filter(|c| !c.is_empty());
        }

        Ok(self)
    }

    /// Effective session cookie name
    #[must_use]
    pub fn cookie_name(&self) -> &str {
        self.cookie_name.as_deref().unwrap_or(DEFAULT_AUTH_COOKIE)
    }
}
