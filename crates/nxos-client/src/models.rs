//! NX-API models
//!
//! Request bodies are trees of managed objects. Each node serializes as
//! `{"<class>": {"attributes": {...}, "children": [...]}}`, with empty
//! `attributes`/`children` left out, which is the shape `/api/mo.json` expects.

use crate::error::NxError;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Flattened `attributes` of one managed object, all values as strings
pub type AttributeRecord = BTreeMap<String, String>;

/// Root class every configuration write is wrapped in
pub const TOP_SYSTEM_CLASS: &str = "topSystem";

/// A managed object node in a configuration body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedObject {
    class: String,
    attributes: Vec<(String, String)>,
    children: Vec<ManagedObject>,
}

impl ManagedObject {
    /// Create an empty node of the given class (e.g. `l2BD`)
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Wrap children under `topSystem`
    #[must_use]
    pub fn top_system(children: Vec<ManagedObject>) -> Self {
        Self::new(TOP_SYSTEM_CLASS).children(children)
    }

    /// Set an attribute, keeping insertion order. Setting a name twice
    /// replaces the earlier value in place.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
        self
    }

    /// Append one child
    #[must_use]
    pub fn child(mut self, child: ManagedObject) -> Self {
        self.children.push(child);
        self
    }

    /// Append several children
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = ManagedObject>) -> Self {
        self.children.extend(children);
        self
    }

    /// Class name of this node
    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Look up an attribute value
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Child nodes in order
    #[must_use]
    pub fn child_nodes(&self) -> &[ManagedObject] {
        &self.children
    }

    /// Serialize to the JSON text sent on the wire
    pub fn to_json(&self) -> Result<String, NxError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Serialize for ManagedObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.class, &NodeBody(self))?;
        map.end()
    }
}

struct NodeBody<'a>(&'a ManagedObject);

impl Serialize for NodeBody<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mo = self.0;
        let len = usize::from(!mo.attributes.is_empty()) + usize::from(!mo.children.is_empty());
        let mut map = serializer.serialize_map(Some(len))?;
        if !mo.attributes.is_empty() {
            map.serialize_entry("attributes", &Attributes(&mo.attributes))?;
        }
        if !mo.children.is_empty() {
            map.serialize_entry("children", &mo.children)?;
        }
        map.end()
    }
}

struct Attributes<'a>(&'a [(String, String)]);

impl Serialize for Attributes<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (k, v)))
    }
}

/// Interface family addressed by an `ethernet:1/3` / `port-channel:5` name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterfaceKind {
    /// Physical port (`l1PhysIf`)
    Ethernet,
    /// Port-channel (`pcAggrIf`)
    PortChannel,
}

impl InterfaceKind {
    /// Map a type name to a kind. Accepts `ethernet`/`enet` and
    /// `port-channel`/`po`.
    pub fn from_type_name(name: &str) -> Result<Self, NxError> {
        match name {
            "ethernet" | "enet" => Ok(Self::Ethernet),
            "port-channel" | "po" => Ok(Self::PortChannel),
            other => Err(NxError::InvalidIdentifier(format!(
                "unexpected interface type '{}', expected ethernet or port-channel",
                other
            ))),
        }
    }

    /// Managed object class (`l1PhysIf` / `pcAggrIf`)
    #[must_use]
    pub fn class(self) -> &'static str {
        match self {
            Self::Ethernet => "l1PhysIf",
            Self::PortChannel => "pcAggrIf",
        }
    }

    /// Interface id prefix (`eth` / `po`)
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Ethernet => "eth",
            Self::PortChannel => "po",
        }
    }

    /// Switch-side interface id, e.g. `eth1/3` or `po5`
    #[must_use]
    pub fn interface_id(self, id: &str) -> String {
        format!("{}{}", self.prefix(), id)
    }
}

/// `switchport mode <mode>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchportMode {
    /// `switchport mode trunk`
    Trunk,
    /// `switchport mode access`
    Access,
    /// `spanning-tree port type edge`
    Edge,
}

impl SwitchportMode {
    /// Value of the `mode` attribute
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trunk => "trunk",
            Self::Access => "access",
            Self::Edge => "edge",
        }
    }
}

impl fmt::Display for SwitchportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do with `switchport trunk native vlan`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeVlan {
    /// Leave the native VLAN untouched (field omitted)
    Keep,
    /// Reset to VLAN 1
    Reset,
    /// Set to the given VLAN id
    Vlan(String),
}

impl NativeVlan {
    /// Parse the command-line form: empty keeps, `None` resets, anything
    /// else is a VLAN id.
    #[must_use]
    pub fn from_arg(arg: &str) -> Self {
        match arg {
            "" => Self::Keep,
            "None" => Self::Reset,
            id => Self::Vlan(id.to_string()),
        }
    }

    /// Value of the `nativeVlan` attribute, if it is to be sent
    #[must_use]
    pub fn attribute_value(&self) -> Option<String> {
        match self {
            Self::Keep => None,
            Self::Reset => Some("vlan-1".to_string()),
            Self::Vlan(id) => Some(format!("vlan-{}", id)),
        }
    }
}

/// Edit applied to `switchport trunk allowed vlan`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrunkVlanOp {
    /// `allowed vlan add`
    Add,
    /// `allowed vlan remove`
    Remove,
    /// `allowed vlan <list>`
    Replace,
}

impl TrunkVlanOp {
    /// Prefix the VLAN list the way NX-API encodes add/remove
    #[must_use]
    pub fn allowed_list(self, vlans: &str) -> String {
        match self {
            Self::Add => format!("+{}", vlans),
            Self::Remove => format!("-{}", vlans),
            Self::Replace => vlans.to_string(),
        }
    }

    /// Native VLAN to send alongside this edit. Removing with a native
    /// value given resets the native VLAN.
    #[must_use]
    pub fn native(self, native: &str) -> NativeVlan {
        match self {
            Self::Remove if !native.is_empty() => NativeVlan::Reset,
            _ => NativeVlan::from_arg(native),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_managed_object_shape() {
        let body = ManagedObject::top_system(vec![ManagedObject::new("bdEntity").child(
            ManagedObject::new("l2BD")
                .attr("fabEncap", "vlan-10")
                .attr("adminSt", "active"),
        )]);

        let value = serde_json::to_value(&body).expect("serialize");
        assert_eq!(
            value,
            json!({"topSystem": {"children": [
                {"bdEntity": {"children": [
                    {"l2BD": {"attributes": {"fabEncap": "vlan-10", "adminSt": "active"}}}
                ]}}
            ]}})
        );
    }

    #[test]
    fn test_attribute_order_and_replace() {
        let mo = ManagedObject::new("aaaUser")
            .attr("name", "admin")
            .attr("pwd", "x")
            .attr("name", "oper");
        assert_eq!(mo.to_json().expect("json"), r#"{"aaaUser":{"attributes":{"name":"oper","pwd":"x"}}}"#);
        assert_eq!(mo.attribute("pwd"), Some("x"));
        assert_eq!(mo.attribute("missing"), None);
    }

    #[test]
    fn test_attribute_values_are_escaped() {
        let mo = ManagedObject::new("aaaUser").attr("pwd", r#"p"w\d"#);
        let back: serde_json::Value = serde_json::from_str(&mo.to_json().expect("json")).expect("parse");
        assert_eq!(back["aaaUser"]["attributes"]["pwd"], r#"p"w\d"#);
    }

    #[test]
    fn test_interface_kind() {
        assert_eq!(InterfaceKind::from_type_name("enet").expect("kind"), InterfaceKind::Ethernet);
        assert_eq!(InterfaceKind::from_type_name("po").expect("kind"), InterfaceKind::PortChannel);
        assert!(matches!(
            InterfaceKind::from_type_name("vlan"),
            Err(NxError::InvalidIdentifier(_))
        ));
        assert_eq!(InterfaceKind::Ethernet.interface_id("1/3"), "eth1/3");
        assert_eq!(InterfaceKind::PortChannel.class(), "pcAggrIf");
    }

    #[test]
    fn test_native_vlan_and_trunk_ops() {
        assert_eq!(NativeVlan::from_arg("").attribute_value(), None);
        assert_eq!(NativeVlan::from_arg("None").attribute_value().as_deref(), Some("vlan-1"));
        assert_eq!(NativeVlan::from_arg("129").attribute_value().as_deref(), Some("vlan-129"));

        assert_eq!(TrunkVlanOp::Add.allowed_list("129,136"), "+129,136");
        assert_eq!(TrunkVlanOp::Remove.allowed_list("129"), "-129");
        assert_eq!(TrunkVlanOp::Replace.allowed_list("129"), "129");
        assert_eq!(TrunkVlanOp::Remove.native("129"), NativeVlan::Reset);
        assert_eq!(TrunkVlanOp::Remove.native(""), NativeVlan::Keep);
        assert_eq!(TrunkVlanOp::Add.native("5"), NativeVlan::Vlan("5".to_string()));
    }
}
