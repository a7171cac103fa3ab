//! Interface operations
//!
//! Interfaces are named `<type>[:<id>]`, e.g. `ethernet:1/3`,
//! `port-channel:5`, or just `ethernet` to mean every ethernet interface.

use crate::common::query::subtree_query;
use crate::error::NxError;
use crate::models::{
    AttributeRecord, InterfaceKind, ManagedObject, NativeVlan, SwitchportMode, TrunkVlanOp,
};
use crate::session::ClientSession;
use tracing::debug;

/// Split an interface name into type and id.
///
/// `ethernet:1/12` gives `("ethernet", "1/12")`, `ethernet` gives
/// `("ethernet", "")`. More than one `:` is rejected.
pub fn split_interface_name(name: &str) -> Result<(String, String), NxError> {
    let parts: Vec<&str> = name.split(':').collect();
    match parts.as_slice() {
        [if_type] => Ok(((*if_type).to_string(), String::new())),
        [if_type, id] => Ok(((*if_type).to_string(), (*id).to_string())),
        _ => Err(NxError::InvalidIdentifier(format!(
            "unexpected interface value {}, expected e.g. ethernet:1/3, port-channel:5, ethernet or port-channel",
            name
        ))),
    }
}

/// DN of one interface
#[must_use]
pub fn interface_path(kind: InterfaceKind, id: &str) -> String {
    match kind {
        InterfaceKind::Ethernet => format!("/api/mo/sys/intf/phys-[eth{}].json", id),
        InterfaceKind::PortChannel => format!("/api/mo/sys/intf/aggr-[po{}].json", id),
    }
}

/// Subtree query listing every interface of `kind`
#[must_use]
pub fn all_interfaces_path(kind: InterfaceKind) -> String {
    subtree_query("/api/mo/sys/intf.json", kind.class())
}

/// `interfaceEntity` subtree putting an interface in trunk mode with the
/// given allowed list and native VLAN. An allowed list of `None` clears it.
#[must_use]
pub fn trunk_entity(
    kind: InterfaceKind,
    id: &str,
    allowed: &str,
    native: &NativeVlan,
) -> ManagedObject {
    let allowed = if allowed == "None" { "" } else { allowed };

    let mut intf = ManagedObject::new(kind.class())
        .attr("id", kind.interface_id(id))
        .attr("mode", SwitchportMode::Trunk.as_str());
    if let Some(native) = native.attribute_value() {
        intf = intf.attr("nativeVlan", native);
    }
    intf = intf.attr("trunkVlans", allowed);

    ManagedObject::new("interfaceEntity").child(intf)
}

/// `stpEntity` subtree setting `switchport mode` on an interface
#[must_use]
pub fn switchport_mode_entity(
    kind: InterfaceKind,
    id: &str,
    mode: SwitchportMode,
) -> ManagedObject {
    let stp_if = ManagedObject::new("stpIf")
        .attr("id", kind.interface_id(id))
        .attr("mode", mode.as_str());

    ManagedObject::new("stpEntity").child(ManagedObject::new("stpInst").child(stp_if))
}

/// `vpcEntity` subtree making port-channel `po_id` a vPC of the same number
#[must_use]
pub fn vpc_entity(po_id: &str) -> ManagedObject {
    let conf = ManagedObject::new("vpcRsVpcConf")
        .attr("tDn", format!("sys/intf/aggr-[po{}]", po_id));
    let vpc_if = ManagedObject::new("vpcIf").attr("id", po_id).child(conf);

    ManagedObject::new("vpcEntity").child(
        ManagedObject::new("vpcInst").child(ManagedObject::new("vpcDom").child(vpc_if)),
    )
}

/// Parse a name that must address a single interface
fn single_interface(name: &str) -> Result<(InterfaceKind, String), NxError> {
    let (if_type, id) = split_interface_name(name)?;
    let kind = InterfaceKind::from_type_name(&if_type)?;
    if id.is_empty() {
        return Err(NxError::InvalidIdentifier(format!(
            "interface {} has no id, expected e.g. {}:1",
            name, if_type
        )));
    }
    Ok((kind, id))
}

impl ClientSession {
    /// Configure trunk VLANs on an interface.
    ///
    /// `allowed` is the NX-API trunk list (`+129` adds, `-129` removes,
    /// `129,136` replaces, `None` clears). `native` follows
    /// [`NativeVlan::from_arg`]: empty leaves it, `None` resets to VLAN 1.
    pub async fn add_trunk_vlan(
        &mut self,
        if_name: &str,
        allowed: &str,
        native: &str,
    ) -> Result<(), NxError> {
        let (kind, id) = single_interface(if_name)?;
        let entity = trunk_entity(kind, &id, allowed, &NativeVlan::from_arg(native));
        debug!("Trunk VLAN update on {}: allowed='{}' native='{}'", if_name, allowed, native);
        self.post_config("add_trunk_vlan", vec![entity]).await
    }

    /// Add, remove or replace trunk VLANs on an interface
    pub async fn modify_trunk_vlans(
        &mut self,
        if_name: &str,
        op: TrunkVlanOp,
        vlans: &str,
        native: &str,
    ) -> Result<(), NxError> {
        let (kind, id) = single_interface(if_name)?;
        let entity = trunk_entity(kind, &id, &op.allowed_list(vlans), &op.native(native));
        debug!("Trunk VLAN {:?} on {}: vlans='{}' native='{}'", op, if_name, vlans, native);
        self.post_config("modify_trunk_vlans", vec![entity]).await
    }

    /// Fetch one interface (`ethernet:1/3`) or every interface of a type
    /// (`ethernet`)
    pub async fn get_interface(&mut self, if_name: &str) -> Result<Vec<AttributeRecord>, NxError> {
        let (if_type, id) = split_interface_name(if_name)?;
        let kind = InterfaceKind::from_type_name(&if_type)?;
        let path = if id.is_empty() {
            all_interfaces_path(kind)
        } else {
            interface_path(kind, &id)
        };
        self.query_class("get_interface", &path, kind.class()).await
    }

    /// Set `switchport mode` on an interface
    pub async fn set_switchport_mode(
        &mut self,
        if_name: &str,
        mode: SwitchportMode,
    ) -> Result<(), NxError> {
        let (kind, id) = single_interface(if_name)?;
        debug!("Setting switchport mode {} on {}", mode, if_name);
        self.post_config("set_switchport_mode", vec![switchport_mode_entity(kind, &id, mode)])
            .await
    }

    /// Make a port-channel a vPC (`interface port-channel N; vpc N`)
    pub async fn add_vpc(&mut self, po_id: &str) -> Result<(), NxError> {
        if po_id.trim().is_empty() {
            return Err(NxError::InvalidIdentifier("port-channel id must not be empty".to_string()));
        }
        debug!("Adding vPC on port-channel {}", po_id);
        self.post_config("add_vpc", vec![vpc_entity(po_id)]).await
    }
}
