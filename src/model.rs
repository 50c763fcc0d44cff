// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Redfish Fabric resource types.
//!
//! This module defines every entity the provisioning engine persists, in the
//! JSON shape the Redfish Fabric schema uses on the wire.
//!
//! # Resource Types
//!
//! - [`Fabric`] - Switches and pod of one controller fabric (read-only here)
//! - [`AddressPool`] - IPv4 gateway and VLAN range allocations
//! - [`Endpoint`] - A redundant set of switch ports bound to a policy group
//! - [`Zone`] - Default, ZoneOfZones or ZoneOfEndpoints provisioning unit
//! - [`AciDomainData`] - Controller domain identifiers cached per ZoneOfZones
//!
//! Request bodies ([`ZoneRequest`], [`EndpointRequest`], [`AddressPoolRequest`])
//! keep their link lists as plain vectors so duplicate and cardinality checks
//! see exactly what the client sent. Stored links are sets.
//!
//! # Example
//!
//! ```rust
//! use fabric_provisioner::model::{AddressPoolRequest, EthernetBlock, Ipv4Block, VlanRange};
//!
//! let request = AddressPoolRequest {
//!     name: Some("tenant-a".to_string()),
//!     description: None,
//!     ethernet: Some(EthernetBlock {
//!         ipv4: Some(Ipv4Block {
//!             gateway_ip_address: Some("10.0.0.1/24".to_string()),
//!             vlan_identifier_address_range: Some(VlanRange { lower: 10, upper: 10 }),
//!         }),
//!     }),
//! };
//! assert!(request.ethernet.is_some());
//! ```

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    ADDRESS_POOLS_SEGMENT, ENDPOINTS_SEGMENT, FABRICS_COLLECTION_URI, STATUS_HEALTH_OK,
    STATUS_STATE_ENABLED, ZONES_SEGMENT,
};

/// A Redfish navigation link.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Link {
    /// URI of the referenced resource
    #[serde(rename = "@odata.id")]
    pub odata_id: String,
}

impl Link {
    /// Create a link to `uri`.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            odata_id: uri.into().trim_end_matches('/').to_string(),
        }
    }

    /// The referenced URI.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.odata_id
    }
}

/// Redfish resource status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Status {
    /// Lifecycle state
    pub state: String,
    /// Health rollup
    pub health: String,
}

impl Default for Status {
    fn default() -> Self {
        Self {
            state: STATUS_STATE_ENABLED.to_string(),
            health: STATUS_HEALTH_OK.to_string(),
        }
    }
}

// ============================================================================
// URIs
// ============================================================================

/// URI of a fabric.
#[must_use]
pub fn fabric_uri(fabric_id: &str) -> String {
    format!("{FABRICS_COLLECTION_URI}/{fabric_id}")
}

/// URI of the zone collection of a fabric.
#[must_use]
pub fn zones_uri(fabric_id: &str) -> String {
    format!("{}/{ZONES_SEGMENT}", fabric_uri(fabric_id))
}

/// URI of the endpoint collection of a fabric.
#[must_use]
pub fn endpoints_uri(fabric_id: &str) -> String {
    format!("{}/{ENDPOINTS_SEGMENT}", fabric_uri(fabric_id))
}

/// URI of the address pool collection of a fabric.
#[must_use]
pub fn address_pools_uri(fabric_id: &str) -> String {
    format!("{}/{ADDRESS_POOLS_SEGMENT}", fabric_uri(fabric_id))
}

// ============================================================================
// Fabric
// ============================================================================

/// A controller fabric. Created by discovery and read-only to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Fabric {
    /// Resource URI
    #[serde(rename = "@odata.id")]
    pub odata_id: String,
    /// Fabric identifier
    pub id: String,
    /// Redfish identifiers of the fabric's switches, in discovery order
    #[serde(rename = "SwitchIDs")]
    pub switch_ids: Vec<String>,
    /// Controller pod the switches belong to
    #[serde(rename = "PodID")]
    pub pod_id: String,
}

impl Fabric {
    /// Build a fabric record.
    #[must_use]
    pub fn new(fabric_id: &str, pod_id: &str, switch_ids: Vec<String>) -> Self {
        Self {
            odata_id: fabric_uri(fabric_id),
            id: fabric_id.to_string(),
            switch_ids,
            pod_id: pod_id.to_string(),
        }
    }
}

// ============================================================================
// AddressPool
// ============================================================================

/// Inclusive VLAN identifier range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VlanRange {
    /// First VLAN of the range
    pub lower: u16,
    /// Last VLAN of the range
    pub upper: u16,
}

impl VlanRange {
    /// True when the range holds exactly one VLAN.
    #[must_use]
    pub fn is_single(&self) -> bool {
        self.lower == self.upper
    }

    /// True when `other` lies entirely inside this range.
    #[must_use]
    pub fn contains(&self, other: &VlanRange) -> bool {
        self.lower <= other.lower && other.upper <= self.upper
    }
}

impl fmt::Display for VlanRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.lower, self.upper)
    }
}

/// IPv4 block of an address pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipv4Block {
    /// Gateway address in CIDR notation
    #[serde(
        rename = "GatewayIPAddress",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub gateway_ip_address: Option<String>,
    /// VLAN allocation range
    #[serde(
        rename = "VLANIdentifierAddressRange",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub vlan_identifier_address_range: Option<VlanRange>,
}

/// Ethernet block of an address pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthernetBlock {
    /// IPv4 allocations
    #[serde(rename = "IPv4", default, skip_serializing_if = "Option::is_none")]
    pub ipv4: Option<Ipv4Block>,
}

/// Links of an address pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AddressPoolLinks {
    /// Zones consuming the pool
    #[serde(default)]
    pub zones: BTreeSet<Link>,
}

/// An IPv4/VLAN allocation block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AddressPool {
    /// Resource URI
    #[serde(rename = "@odata.id")]
    pub odata_id: String,
    /// Resource type
    #[serde(rename = "@odata.type")]
    pub odata_type: String,
    /// Pool identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ethernet allocations
    pub ethernet: EthernetBlock,
    /// Consumers of the pool
    #[serde(default)]
    pub links: AddressPoolLinks,
    /// Resource status
    #[serde(default)]
    pub status: Status,
}

impl AddressPool {
    /// VLAN range of the pool, when configured.
    #[must_use]
    pub fn vlan_range(&self) -> Option<VlanRange> {
        self.ethernet
            .ipv4
            .as_ref()
            .and_then(|ipv4| ipv4.vlan_identifier_address_range)
    }

    /// Gateway of the pool, when configured.
    #[must_use]
    pub fn gateway(&self) -> Option<&str> {
        self.ethernet
            .ipv4
            .as_ref()
            .and_then(|ipv4| ipv4.gateway_ip_address.as_deref())
            .filter(|gateway| !gateway.is_empty())
    }
}

/// Body of an address pool creation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AddressPoolRequest {
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Ethernet allocations
    #[serde(default)]
    pub ethernet: Option<EthernetBlock>,
}

// ============================================================================
// Endpoint
// ============================================================================

/// A redundancy group of ports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Redundancy {
    /// Redundancy mode (e.g. `Sharing`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Member ports
    #[serde(default)]
    pub redundancy_set: Vec<Link>,
}

/// Links of an endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EndpointLinks {
    /// Zones the endpoint is a member of
    #[serde(default)]
    pub zones: BTreeSet<Link>,
    /// Address pools of the zones the endpoint is a member of
    #[serde(default)]
    pub address_pools: BTreeSet<Link>,
}

/// Controller identifiers of an endpoint's policy group.
///
/// Cached with the endpoint so deletion and zone attachment never re-derive names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AciPolicyGroupData {
    /// Node IDs joined by `-`
    pub switch_pattern: String,
    /// `<card>-<low>-ports-<high>`
    pub port_pattern: String,
    /// Interface policy group name
    pub policy_group_name: String,
    /// Interface policy group DN
    pub policy_group_dn: String,
    /// Fabric path DN used by static path bindings
    pub path_dn: String,
    /// Interface profile DN
    pub interface_profile_dn: String,
    /// Access port selector DN
    pub port_selector_dn: String,
    /// LACP policy DN
    pub lacp_policy_dn: String,
    /// Leaf profile DN
    pub leaf_profile_dn: String,
}

/// A logical port group bound to a controller policy group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Endpoint {
    /// Resource URI
    #[serde(rename = "@odata.id")]
    pub odata_id: String,
    /// Resource type
    #[serde(rename = "@odata.type")]
    pub odata_type: String,
    /// Endpoint identifier
    pub id: String,
    /// Display name, unique within the fabric
    pub name: String,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Redundant port sets
    pub redundancy: Vec<Redundancy>,
    /// Memberships
    #[serde(default)]
    pub links: EndpointLinks,
    /// Controller policy group identifiers
    #[serde(rename = "ACIPolicyGroupData")]
    pub aci_policy_group: AciPolicyGroupData,
    /// Resource status
    #[serde(default)]
    pub status: Status,
}

impl Endpoint {
    /// All member port URIs across redundancy groups.
    pub fn port_uris(&self) -> impl Iterator<Item = &str> {
        self.redundancy
            .iter()
            .flat_map(|r| r.redundancy_set.iter())
            .map(Link::uri)
    }
}

/// Body of an endpoint creation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EndpointRequest {
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Redundant port sets
    #[serde(default)]
    pub redundancy: Vec<Redundancy>,
}

// ============================================================================
// Zone
// ============================================================================

/// Zone subtype, which fixes its position in the containment tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneType {
    /// Root zone, maps to a controller tenant
    Default,
    /// Maps to an application profile and VRF under the tenant
    ZoneOfZones,
    /// Maps to a bridge domain and endpoint group
    ZoneOfEndpoints,
}

impl fmt::Display for ZoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Default => "Default",
            Self::ZoneOfZones => "ZoneOfZones",
            Self::ZoneOfEndpoints => "ZoneOfEndpoints",
        };
        f.write_str(name)
    }
}

/// Links of a zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ZoneLinks {
    /// Parent zone (at most one)
    #[serde(default)]
    pub contained_by_zones: BTreeSet<Link>,
    /// Child zones
    #[serde(default)]
    pub contains_zones: BTreeSet<Link>,
    /// Address pools of the zone
    #[serde(default)]
    pub address_pools: BTreeSet<Link>,
    /// Member endpoints
    #[serde(default)]
    pub endpoints: BTreeSet<Link>,
}

/// A provisioning unit of the fabric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Zone {
    /// Resource URI
    #[serde(rename = "@odata.id")]
    pub odata_id: String,
    /// Resource type
    #[serde(rename = "@odata.type")]
    pub odata_type: String,
    /// Zone identifier
    pub id: String,
    /// Display name, also the controller object name
    pub name: String,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Zone subtype
    pub zone_type: ZoneType,
    /// Relationships
    #[serde(default)]
    pub links: ZoneLinks,
    /// Resource status
    #[serde(default)]
    pub status: Status,
}

impl Zone {
    /// Number of child zones.
    #[must_use]
    pub fn contains_zones_count(&self) -> usize {
        self.links.contains_zones.len()
    }

    /// The single parent zone URI, if any.
    #[must_use]
    pub fn parent_uri(&self) -> Option<&str> {
        self.links.contained_by_zones.iter().next().map(Link::uri)
    }

    /// The single address pool URI, if any.
    #[must_use]
    pub fn address_pool_uri(&self) -> Option<&str> {
        self.links.address_pools.iter().next().map(Link::uri)
    }
}

/// Links of a zone request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ZoneRequestLinks {
    /// Parent zone
    #[serde(default)]
    pub contained_by_zones: Vec<Link>,
    /// Address pools
    #[serde(default)]
    pub address_pools: Vec<Link>,
    /// Member endpoints
    #[serde(default)]
    pub endpoints: Vec<Link>,
}

/// Body of a zone creation or update request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ZoneRequest {
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Zone subtype
    #[serde(default)]
    pub zone_type: Option<ZoneType>,
    /// Relationships
    #[serde(default)]
    pub links: Option<ZoneRequestLinks>,
}

// ============================================================================
// Zone domain cross reference
// ============================================================================

/// Controller domain identifiers created for a ZoneOfZones.
///
/// ZoneOfEndpoints children attach their EPG and member policy groups to these objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AciDomainData {
    /// URI of the owning ZoneOfZones
    pub zone_uri: String,
    /// Physical domain DN
    pub physical_domain_dn: String,
    /// VLAN pool DN
    pub vlan_pool_dn: String,
    /// Attachable entity profile DN
    pub entity_profile_dn: String,
    /// VLAN range of the pool
    pub vlan_range: VlanRange,
}
