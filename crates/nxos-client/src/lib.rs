//! Cisco Nexus NX-API REST Client
//!
//! A Rust client library for configuring and querying Nexus switches through
//! the NX-API REST (DME) interface: aaaLogin sessions with host failover,
//! VLANs, trunk interfaces, switchport mode and vPC membership.
//!
//! # Example
//!
//! ```no_run
//! use nxos_client::{ClientOptions, ClientSession};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Hosts are tried in order until one accepts the login
//! let options = ClientOptions::new(
//!     vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()],
//!     "admin",
//!     "secret",
//! );
//! let mut session = ClientSession::new(options)?;
//! session.login().await?;
//!
//! // Create VLAN 129 mapped to VXLAN segment 5000
//! session.add_vlan("129", "5000").await?;
//!
//! // Allow it on a trunk
//! session.add_trunk_vlan("ethernet:1/3", "+129", "").await?;
//!
//! for vlan in session.get_vlan("").await? {
//!     println!("{} {}", vlan["id"], vlan["accEncap"]);
//! }
//!
//! session.logout().await;
//! # Ok(())
//! # }
//! ```
//!
//! # Sessions
//!
//! - **Failover**: login walks the host list; the host that answers is kept
//!   for every later request
//! - **Cookies**: the aaaLogin session cookie is learned from replies and
//!   sent back automatically
//! - **Refresh**: nothing runs in the background; call
//!   [`ClientSession::refresh`] before [`ClientSession::refresh_deadline`]

pub mod auth;
pub mod common;
pub mod config;
pub mod envelope;
pub mod error;
pub mod interface;
pub mod models;
pub mod session;
pub mod transport;
pub mod vlan;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

#[cfg(test)]
mod auth_test;

pub use config::{ClientOptions, Timeouts, TlsPolicy, TlsVersion};
pub use envelope::{parse_envelope_attributes, parse_envelope_error};
pub use error::NxError;
pub use interface::split_interface_name;
pub use models::*;
pub use session::ClientSession;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, ReqwestTransport};
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockTransport;
