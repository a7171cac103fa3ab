//! Mock transport for unit testing
//!
//! Replies are scripted per host. A host marked down fails every request at
//! the transport level; a host with nothing queued answers with an empty
//! envelope (`{"imdata":[]}`). Every request is recorded, so tests can check
//! which host and path a call went to and which cookie it carried.

use crate::error::NxError;
use crate::transport::{ApiRequest, ApiResponse, HttpTransport};
use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::sync::{Arc, Mutex};

/// Body returned when nothing is queued for a host
pub const EMPTY_ENVELOPE: &str = r#"{"imdata":[]}"#;

/// One scripted reply
#[derive(Debug, Clone)]
pub enum MockReply {
    /// 200 with a body and optional cookies
    Body {
        /// Response body
        body: String,
        /// `(name, value)` pairs returned as `Set-Cookie`
        cookies: Vec<(String, String)>,
    },
    /// Transport failure (connection refused)
    Fail(String),
}

/// Mock HttpTransport for testing
///
/// Cloning shares the script and the request log, so a test can keep one
/// handle while the session owns another.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    replies: Arc<Mutex<HashMap<String, VecDeque<MockReply>>>>,
    down: Arc<Mutex<HashSet<String>>>,
    requests: Arc<Mutex<Vec<ApiRequest>>>,
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every request to `host`
    pub fn set_host_down(&self, host: &str) {
        self.down.lock().unwrap().insert(host.to_string());
    }

    /// Let requests to `host` through again
    pub fn set_host_up(&self, host: &str) {
        self.down.lock().unwrap().remove(host);
    }

    /// Queue a reply body for `host`
    pub fn push_reply(&self, host: &str, body: impl Into<String>) {
        self.push(host, MockReply::Body {
            body: body.into(),
            cookies: Vec::new(),
        });
    }

    /// Queue a reply body that also sets a cookie
    pub fn push_reply_with_cookie(
        &self,
        host: &str,
        body: impl Into<String>,
        name: &str,
        value: &str,
    ) {
        self.push(host, MockReply::Body {
            body: body.into(),
            cookies: vec![(name.to_string(), value.to_string())],
        });
    }

    /// Queue a single transport failure for `host`
    pub fn push_failure(&self, host: &str, message: impl Into<String>) {
        self.push(host, MockReply::Fail(message.into()));
    }

    /// All requests seen so far, in order
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Most recent request, if any
    pub fn last_request(&self) -> Option<ApiRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    fn push(&self, host: &str, reply: MockReply) {
        self.replies
            .lock()
            .unwrap()
            .entry(host.to_string())
            .or_default()
            .push_back(reply);
    }
}

#[async_trait::async_trait]
impl HttpTransport for MockTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, NxError> {
        self.requests.lock().unwrap().push(request.clone());

        let host = request.url.host_str().unwrap_or_default().to_string();
        let refused = |msg: &str| {
            NxError::transport(
                request.url.as_str(),
                io::Error::new(io::ErrorKind::ConnectionRefused, msg.to_string()),
            )
        };

        if self.down.lock().unwrap().contains(&host) {
            return Err(refused("connection refused"));
        }

        let next = self
            .replies
            .lock()
            .unwrap()
            .get_mut(&host)
            .and_then(VecDeque::pop_front);

        match next {
            Some(MockReply::Body { body, cookies }) => Ok(ApiResponse {
                status: 200,
                cookies,
                body: body.into_bytes(),
            }),
            Some(MockReply::Fail(msg)) => Err(refused(&msg)),
            None => Ok(ApiResponse {
                status: 200,
                cookies: Vec::new(),
                body: EMPTY_ENVELOPE.as_bytes().to_vec(),
            }),
        }
    }
}
