//! NX-API response envelope
//!
//! Every NX-API reply, whether it carries data, an error, or nothing at all,
//! is wrapped in the same shape:
//!
//! ```json
//! {"imdata": [ {"<class>": {"attributes": {...}}}, ... ]}
//! ```
//!
//! An error reply is an envelope whose first item has an `error` key:
//!
//! ```json
//! {"imdata": [ {"error": {"attributes": {"code": "400", "text": "..."}}} ]}
//! ```
//!
//! Attribute values are coerced to strings; anything that is not a JSON
//! string (or is missing) becomes `""`.

use crate::error::NxError;
use crate::models::AttributeRecord;
use serde::Deserialize;
use serde_json::Value;

/// Class key of an error item
pub const ERROR_CLASS: &str = "error";

/// Class key of a successful aaaLogin/aaaRefresh item
pub const LOGIN_CLASS: &str = "aaaLogin";

/// Decoded `imdata` list
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    imdata: Vec<Value>,
}

/// Error code and text reported by the switch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFault {
    /// Vendor error code
    pub code: String,
    /// Vendor error text
    pub text: String,
}

/// Token and advertised refresh period from an `aaaLogin` item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginReply {
    /// Session token
    pub token: String,
    /// Raw `refreshTimeoutSeconds`, parsed by the session
    pub refresh_timeout_seconds: String,
}

/// Semantic reading of a single envelope item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeItem {
    /// `{"error": {...}}`
    Error(RemoteFault),
    /// `{"aaaLogin": {...}}`
    Login(LoginReply),
    /// Any other object
    Success,
    /// Not a JSON object
    Unrecognised,
}

impl Envelope {
    /// Decode a raw response body
    pub fn decode(body: &[u8]) -> Result<Self, NxError> {
        serde_json::from_slice(body).map_err(|e| {
            NxError::MalformedResponse(format!(
                "imdata envelope: {} - Response (first 500 chars): {}",
                e,
                preview(body)
            ))
        })
    }

    /// Number of items in `imdata`
    #[must_use]
    pub fn len(&self) -> usize {
        self.imdata.len()
    }

    /// True when `imdata` is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.imdata.is_empty()
    }

    /// Classify the first item, if any
    #[must_use]
    pub fn first(&self) -> Option<EnvelopeItem> {
        self.imdata.first().map(EnvelopeItem::classify)
    }

    /// Attribute maps of every item carrying `class`, in order
    #[must_use]
    pub fn records(&self, class: &str) -> Vec<AttributeRecord> {
        self.imdata
            .iter()
            .filter_map(|item| item.get(class))
            .map(attributes_of)
            .collect()
    }
}

impl EnvelopeItem {
    fn classify(item: &Value) -> Self {
        let Some(obj) = item.as_object() else {
            return Self::Unrecognised;
        };

        if let Some(err) = obj.get(ERROR_CLASS) {
            let attrs = attributes_of(err);
            return Self::Error(RemoteFault {
                code: attrs.get("code").cloned().unwrap_or_default(),
                text: attrs.get("text").cloned().unwrap_or_default(),
            });
        }

        if let Some(login) = obj.get(LOGIN_CLASS) {
            let attrs = attributes_of(login);
            return Self::Login(LoginReply {
                token: attrs.get("token").cloned().unwrap_or_default(),
                refresh_timeout_seconds: attrs
                    .get("refreshTimeoutSeconds")
                    .cloned()
                    .unwrap_or_default(),
            });
        }

        Self::Success
    }
}

/// Check a write/delete reply for an `error` item.
///
/// Only the first item is inspected. An empty `imdata` is success.
pub fn parse_envelope_error(body: &[u8]) -> Result<(), NxError> {
    match Envelope::decode(body)?.first() {
        Some(EnvelopeItem::Error(fault)) => Err(NxError::Remote {
            code: fault.code,
            text: fault.text,
        }),
        _ => Ok(()),
    }
}

/// Extract the attribute maps of every item keyed by `class`.
///
/// Items without `class` are skipped.
pub fn parse_envelope_attributes(
    body: &[u8],
    class: &str,
) -> Result<Vec<AttributeRecord>, NxError> {
    Ok(Envelope::decode(body)?.records(class))
}

/// Interpret an aaaLogin or aaaRefresh reply.
///
/// A login item without a token is a protocol error.
pub fn parse_login_reply(body: &[u8]) -> Result<LoginReply, NxError> {
    match Envelope::decode(body)?.first() {
        Some(EnvelopeItem::Login(reply)) if reply.token.is_empty() => Err(NxError::Protocol(
            format!("{} response carries no token", LOGIN_CLASS),
        )),
        Some(EnvelopeItem::Login(reply)) => Ok(reply),
        Some(EnvelopeItem::Error(fault)) => Err(NxError::Auth {
            code: fault.code,
            text: fault.text,
        }),
        _ => Err(NxError::Protocol(format!(
            "could not find {} response: {}",
            LOGIN_CLASS,
            preview(body)
        ))),
    }
}

fn attributes_of(object: &Value) -> AttributeRecord {
    object
        .get("attributes")
        .and_then(Value::as_object)
        .map(|attrs| {
            attrs
                .iter()
                .map(|(k, v)| (k.clone(), v.as_str().unwrap_or_default().to_string()))
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn preview(body: &[u8]) -> String {
    String::from_utf8_lossy(body).chars().take(500).collect()
}
