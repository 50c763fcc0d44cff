// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the fabric provisioner.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Redfish Resource Tree
// ============================================================================

/// Root of the Redfish service
pub const REDFISH_ROOT: &str = "/redfish/v1";

/// Collection URI of all fabrics
pub const FABRICS_COLLECTION_URI: &str = "/redfish/v1/Fabrics";

/// Collection segment for zones under a fabric
pub const ZONES_SEGMENT: &str = "Zones";

/// Collection segment for endpoints under a fabric
pub const ENDPOINTS_SEGMENT: &str = "Endpoints";

/// Collection segment for address pools under a fabric
pub const ADDRESS_POOLS_SEGMENT: &str = "AddressPools";

/// Collection segment for switches under a fabric
pub const SWITCHES_SEGMENT: &str = "Switches";

/// Collection segment for ports under a switch
pub const PORTS_SEGMENT: &str = "Ports";

/// `@odata.type` of zone resources
pub const ZONE_ODATA_TYPE: &str = "#Zone.v1_6_1.Zone";

/// `@odata.type` of endpoint resources
pub const ENDPOINT_ODATA_TYPE: &str = "#Endpoint.v1_8_0.Endpoint";

/// `@odata.type` of address pool resources
pub const ADDRESS_POOL_ODATA_TYPE: &str = "#AddressPool.v1_2_1.AddressPool";

/// `@odata.type` of fabric resources
pub const FABRIC_ODATA_TYPE: &str = "#Fabric.v1_3_0.Fabric";

// ============================================================================
// Resource Store Tables
// ============================================================================

/// Table holding fabric snapshots
pub const TABLE_FABRIC: &str = "Fabric";

/// Table holding zone snapshots
pub const TABLE_ZONE: &str = "Zone";

/// Table holding endpoint snapshots
pub const TABLE_ENDPOINT: &str = "Endpoint";

/// Table holding address pool snapshots
pub const TABLE_ADDRESS_POOL: &str = "AddressPool";

/// Table holding zone to controller-domain cross references
pub const TABLE_ZONE_DOMAIN: &str = "ACIZoneDomain";

/// Separator between the components of a store key or set key
pub const KEY_SEPARATOR: char = ':';

// ============================================================================
// VLAN Constraints
// ============================================================================

/// Lowest assignable VLAN identifier
pub const VLAN_MIN: u16 = 2;

/// Highest assignable VLAN identifier
pub const VLAN_MAX: u16 = 4094;

/// First VLAN of the reserved block
pub const VLAN_RESERVED_START: u16 = 1002;

/// Last VLAN of the reserved block
pub const VLAN_RESERVED_END: u16 = 1005;

// ============================================================================
// Resource Status
// ============================================================================

/// Redfish `Status.State` of provisioned resources
pub const STATUS_STATE_ENABLED: &str = "Enabled";

/// Redfish `Status.Health` of provisioned resources
pub const STATUS_HEALTH_OK: &str = "OK";

// ============================================================================
// Controller Object Naming
// ============================================================================

/// Separator between the low and high port of a port pattern
pub const PORT_PATTERN_SEPARATOR: &str = "-ports-";

/// Prefix of controller interface names (e.g. `eth1-5`)
pub const INTERFACE_NAME_PREFIX: &str = "eth";

/// Suffix of endpoint group names
pub const SUFFIX_EPG: &str = "-EPG";

/// Suffix of VRF names
pub const SUFFIX_VRF: &str = "-VRF";

/// Suffix of contract names
pub const SUFFIX_CONTRACT: &str = "-Con";

/// Suffix of contract subject names
pub const SUFFIX_SUBJECT: &str = "-Subj";

/// Suffix of physical domain names
pub const SUFFIX_PHYSICAL_DOMAIN: &str = "-PhysDom";

/// Suffix of VLAN pool names
pub const SUFFIX_VLAN_POOL: &str = "-VlanPool";

/// Suffix of attachable entity profile names
pub const SUFFIX_ENTITY_PROFILE: &str = "-AEP";

/// Suffix of interface policy group names
pub const SUFFIX_POLICY_GROUP: &str = "-PolGrp";

/// Suffix of interface profile names
pub const SUFFIX_INTERFACE_PROFILE: &str = "-IntProf";

/// Suffix of access port selector names
pub const SUFFIX_PORT_SELECTOR: &str = "-PortSel";

/// Suffix of access port block names
pub const SUFFIX_PORT_BLOCK: &str = "-PortBlk";

/// Suffix of LACP policy names
pub const SUFFIX_LACP_POLICY: &str = "-LacpPol";

/// Suffix of leaf profile names
pub const SUFFIX_LEAF_PROFILE: &str = "-LeafProf";

/// Suffix of leaf (switch association) selector names
pub const SUFFIX_LEAF_SELECTOR: &str = "-LeafSel";

/// Suffix of node block names
pub const SUFFIX_NODE_BLOCK: &str = "-NodeBlk";

/// Filter bound to every zone contract subject
pub const DEFAULT_FILTER_NAME: &str = "default";

/// LACP mode used for port-channel policies
pub const LACP_MODE_ACTIVE: &str = "active";

/// Aggregation type of a single-switch port channel
pub const LAG_TYPE_PORT_CHANNEL: &str = "link";

/// Aggregation type of a two-switch virtual port channel
pub const LAG_TYPE_VIRTUAL_PORT_CHANNEL: &str = "node";

/// Maximum number of switches an endpoint may span
pub const MAX_ENDPOINT_SWITCHES: usize = 2;

// ============================================================================
// Service Defaults
// ============================================================================

/// Default listen address of the Redfish API
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:45020";

/// Default capacity of the outbound event queue
pub const DEFAULT_EVENT_QUEUE_CAPACITY: usize = 1024;

/// Default timeout for a single controller HTTP request (30 seconds)
pub const DEFAULT_CONTROLLER_TIMEOUT_SECS: u64 = 30;

/// Session cookie name used by the controller REST API
pub const CONTROLLER_SESSION_COOKIE: &str = "APIC-cookie";
