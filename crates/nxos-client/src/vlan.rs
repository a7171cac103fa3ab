//! VLAN (bridge domain) operations
//!
//! A VLAN is an `l2BD` object under `sys/bd`. Adding one with a VNI maps it
//! to a VXLAN segment through `accEncap`.

use crate::common::query::subtree_query;
use crate::error::NxError;
use crate::models::{AttributeRecord, ManagedObject};
use crate::session::ClientSession;
use tracing::debug;

/// Managed object class of a VLAN
pub const VLAN_CLASS: &str = "l2BD";

/// DN of one VLAN
#[must_use]
pub fn vlan_path(id: &str) -> String {
    format!("/api/mo/sys/bd/bd-[vlan-{}].json", id)
}

/// Subtree query listing every VLAN
#[must_use]
pub fn all_vlans_path() -> String {
    subtree_query("/api/mo/sys/bd/.json", VLAN_CLASS)
}

/// `bdEntity` subtree creating VLAN `id`, optionally mapped to VNI `vni`
#[must_use]
pub fn vlan_entity(id: &str, vni: &str) -> ManagedObject {
    let mut bd = ManagedObject::new(VLAN_CLASS)
        .attr("fabEncap", format!("vlan-{}", id))
        .attr("pcTag", "1")
        .attr("adminSt", "active");
    if !vni.is_empty() {
        bd = bd.attr("accEncap", format!("vxlan-{}", vni));
    }

    ManagedObject::new("bdEntity").child(bd)
}

fn require_vlan_id(id: &str) -> Result<(), NxError> {
    if id.trim().is_empty() {
        return Err(NxError::InvalidIdentifier("VLAN id must not be empty".to_string()));
    }
    Ok(())
}

impl ClientSession {
    /// Create VLAN `id`. Pass an empty `vni` for a plain VLAN.
    pub async fn add_vlan(&mut self, id: &str, vni: &str) -> Result<(), NxError> {
        require_vlan_id(id)?;
        debug!("Adding VLAN {} (vni '{}')", id, vni);
        self.post_config("add_vlan", vec![vlan_entity(id, vni)]).await
    }

    /// Fetch VLAN `id`, or every VLAN when `id` is empty
    pub async fn get_vlan(&mut self, id: &str) -> Result<Vec<AttributeRecord>, NxError> {
        let path = if id.is_empty() {
            all_vlans_path()
        } else {
            vlan_path(id)
        };
        self.query_class("get_vlan", &path, VLAN_CLASS).await
    }

    /// Delete VLAN `id`
    pub async fn delete_vlan(&mut self, id: &str) -> Result<(), NxError> {
        require_vlan_id(id)?;
        debug!("Deleting VLAN {}", id);
        self.delete_object("delete_vlan", &vlan_path(id)).await
    }
}
