// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Controller object names and distinguished names.
//!
//! Every controller object the engine creates gets its name from a zone name or
//! from an endpoint's [`SwitchPortPattern`]. The same function is used when the
//! object is created and when it is deleted, so the two can never drift apart.
//!
//! | Object | Name |
//! |--------|------|
//! | Tenant | `<default zone>` |
//! | Application profile | `<zone of zones>` |
//! | VRF | `<zone of zones>-VRF` |
//! | Bridge domain | `<zone of endpoints>` |
//! | EPG | `<zone of endpoints>-EPG` |
//! | Policy group | `<switches>_<ports>-PolGrp` |

use crate::constants::{
    SUFFIX_CONTRACT, SUFFIX_ENTITY_PROFILE, SUFFIX_EPG, SUFFIX_INTERFACE_PROFILE,
    SUFFIX_LACP_POLICY, SUFFIX_LEAF_PROFILE, SUFFIX_LEAF_SELECTOR, SUFFIX_NODE_BLOCK,
    SUFFIX_PHYSICAL_DOMAIN, SUFFIX_POLICY_GROUP, SUFFIX_PORT_BLOCK, SUFFIX_PORT_SELECTOR,
    SUFFIX_SUBJECT, SUFFIX_VLAN_POOL, SUFFIX_VRF,
};
use crate::topology::SwitchPortPattern;

// ============================================================================
// Zone object names
// ============================================================================

/// Names of the controller objects owned by a ZoneOfZones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneOfZonesNames {
    /// Tenant of the parent Default zone
    pub tenant: String,
    /// Application profile
    pub application_profile: String,
    /// VRF
    pub vrf: String,
    /// Contract
    pub contract: String,
    /// Contract subject
    pub subject: String,
    /// Physical domain
    pub physical_domain: String,
    /// VLAN pool
    pub vlan_pool: String,
    /// Attachable entity profile
    pub entity_profile: String,
}

impl ZoneOfZonesNames {
    /// Derive all names from the tenant and the zone name.
    #[must_use]
    pub fn new(tenant: &str, zone_name: &str) -> Self {
        Self {
            tenant: tenant.to_string(),
            application_profile: zone_name.to_string(),
            vrf: format!("{zone_name}{SUFFIX_VRF}"),
            contract: format!("{zone_name}{SUFFIX_CONTRACT}"),
            subject: format!("{zone_name}{SUFFIX_SUBJECT}"),
            physical_domain: format!("{zone_name}{SUFFIX_PHYSICAL_DOMAIN}"),
            vlan_pool: format!("{zone_name}{SUFFIX_VLAN_POOL}"),
            entity_profile: format!("{zone_name}{SUFFIX_ENTITY_PROFILE}"),
        }
    }
}

/// Names of the controller objects owned by a ZoneOfEndpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneOfEndpointsNames {
    /// Tenant of the grandparent Default zone
    pub tenant: String,
    /// Application profile of the parent ZoneOfZones
    pub application_profile: String,
    /// VRF of the parent ZoneOfZones
    pub vrf: String,
    /// Bridge domain
    pub bridge_domain: String,
    /// Endpoint group
    pub epg: String,
}

impl ZoneOfEndpointsNames {
    /// Derive all names from the ancestor zone names and the zone name.
    #[must_use]
    pub fn new(tenant: &str, zone_of_zones: &str, zone_name: &str) -> Self {
        let parent = ZoneOfZonesNames::new(tenant, zone_of_zones);
        Self {
            tenant: parent.tenant,
            application_profile: parent.application_profile,
            vrf: parent.vrf,
            bridge_domain: zone_name.to_string(),
            epg: format!("{zone_name}{SUFFIX_EPG}"),
        }
    }
}

// ============================================================================
// Endpoint object names
// ============================================================================

/// Names of the access-policy objects that materialize an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointNames {
    /// Interface profile
    pub interface_profile: String,
    /// Access port selector
    pub port_selector: String,
    /// Access port block
    pub port_block: String,
    /// LACP policy
    pub lacp_policy: String,
    /// PC/vPC interface policy group
    pub policy_group: String,
    /// Leaf profile
    pub leaf_profile: String,
    /// Leaf (switch association) selector
    pub leaf_selector: String,
}

impl EndpointNames {
    /// Derive all names from the endpoint's switch/port pattern.
    #[must_use]
    pub fn new(pattern: &SwitchPortPattern) -> Self {
        let prefix = pattern.to_string();
        let switches = pattern.switch_pattern();
        Self {
            interface_profile: format!("{prefix}{SUFFIX_INTERFACE_PROFILE}"),
            port_selector: format!("{prefix}{SUFFIX_PORT_SELECTOR}"),
            port_block: format!("{}{SUFFIX_PORT_BLOCK}", pattern.port_pattern()),
            lacp_policy: format!("{prefix}{SUFFIX_LACP_POLICY}"),
            policy_group: format!("{prefix}{SUFFIX_POLICY_GROUP}"),
            leaf_profile: format!("{switches}{SUFFIX_LEAF_PROFILE}"),
            leaf_selector: format!("{switches}{SUFFIX_LEAF_SELECTOR}"),
        }
    }
}

/// Name of the node block selecting one switch.
#[must_use]
pub fn node_block_name(node: u32) -> String {
    format!("{node}{SUFFIX_NODE_BLOCK}")
}

/// Controller encapsulation of a VLAN.
#[must_use]
pub fn vlan_encap(vlan: u16) -> String {
    format!("vlan-{vlan}")
}

// ============================================================================
// Distinguished names
// ============================================================================

/// Distinguished-name builders for every controller object class the engine touches.
pub mod dn {
    /// `uni/tn-<tenant>`
    #[must_use]
    pub fn tenant(tenant: &str) -> String {
        format!("uni/tn-{tenant}")
    }

    /// `uni/tn-<tenant>/ap-<ap>`
    #[must_use]
    pub fn application_profile(tenant: &str, ap: &str) -> String {
        format!("{}/ap-{ap}", self::tenant(tenant))
    }

    /// `uni/tn-<tenant>/ctx-<vrf>`
    #[must_use]
    pub fn vrf(tenant: &str, vrf: &str) -> String {
        format!("{}/ctx-{vrf}", self::tenant(tenant))
    }

    /// `uni/tn-<tenant>/ctx-<vrf>/any`
    #[must_use]
    pub fn vrf_any(tenant: &str, vrf: &str) -> String {
        format!("{}/any", self::vrf(tenant, vrf))
    }

    /// Consumer contract relation of the VRF "any" rule.
    #[must_use]
    pub fn vrf_any_consumer(tenant: &str, vrf: &str, contract: &str) -> String {
        format!("{}/rsanyToCons-{contract}", vrf_any(tenant, vrf))
    }

    /// Provider contract relation of the VRF "any" rule.
    #[must_use]
    pub fn vrf_any_provider(tenant: &str, vrf: &str, contract: &str) -> String {
        format!("{}/rsanyToProv-{contract}", vrf_any(tenant, vrf))
    }

    /// `uni/tn-<tenant>/brc-<contract>`
    #[must_use]
    pub fn contract(tenant: &str, contract: &str) -> String {
        format!("{}/brc-{contract}", self::tenant(tenant))
    }

    /// `uni/tn-<tenant>/brc-<contract>/subj-<subject>`
    #[must_use]
    pub fn contract_subject(tenant: &str, contract: &str, subject: &str) -> String {
        format!("{}/subj-{subject}", self::contract(tenant, contract))
    }

    /// Filter binding of a contract subject.
    #[must_use]
    pub fn subject_filter(tenant: &str, contract: &str, subject: &str, filter: &str) -> String {
        format!(
            "{}/rssubjFiltAtt-{filter}",
            contract_subject(tenant, contract, subject)
        )
    }

    /// `uni/phys-<domain>`
    #[must_use]
    pub fn physical_domain(domain: &str) -> String {
        format!("uni/phys-{domain}")
    }

    /// VLAN pool relation of a physical domain.
    #[must_use]
    pub fn domain_vlan_pool_relation(domain: &str) -> String {
        format!("{}/rsvlanNs", physical_domain(domain))
    }

    /// `uni/infra/vlanns-[<pool>]-static`
    #[must_use]
    pub fn vlan_pool(pool: &str) -> String {
        format!("uni/infra/vlanns-[{pool}]-static")
    }

    /// Encapsulation block of a VLAN pool.
    #[must_use]
    pub fn vlan_block(pool: &str, lower: u16, upper: u16) -> String {
        format!(
            "{}/from-[vlan-{lower}]-to-[vlan-{upper}]",
            vlan_pool(pool)
        )
    }

    /// `uni/infra/attentp-<aep>`
    #[must_use]
    pub fn entity_profile(aep: &str) -> String {
        format!("uni/infra/attentp-{aep}")
    }

    /// Domain relation of an attachable entity profile.
    #[must_use]
    pub fn entity_profile_domain_relation(aep: &str, domain: &str) -> String {
        format!("{}/rsdomP-[{}]", entity_profile(aep), physical_domain(domain))
    }

    /// `uni/tn-<tenant>/BD-<bd>`
    #[must_use]
    pub fn bridge_domain(tenant: &str, bd: &str) -> String {
        format!("{}/BD-{bd}", self::tenant(tenant))
    }

    /// `uni/tn-<tenant>/BD-<bd>/subnet-[<gateway>]`
    #[must_use]
    pub fn subnet(tenant: &str, bd: &str, gateway: &str) -> String {
        format!("{}/subnet-[{gateway}]", bridge_domain(tenant, bd))
    }

    /// VRF relation of a bridge domain.
    #[must_use]
    pub fn bridge_domain_vrf_relation(tenant: &str, bd: &str) -> String {
        format!("{}/rsctx", bridge_domain(tenant, bd))
    }

    /// `uni/tn-<tenant>/ap-<ap>/epg-<epg>`
    #[must_use]
    pub fn epg(tenant: &str, ap: &str, epg: &str) -> String {
        format!("{}/epg-{epg}", application_profile(tenant, ap))
    }

    /// Bridge domain relation of an EPG.
    #[must_use]
    pub fn epg_bridge_domain_relation(epg_dn: &str) -> String {
        format!("{epg_dn}/rsbd")
    }

    /// Domain relation of an EPG.
    #[must_use]
    pub fn epg_domain_relation(epg_dn: &str, domain_dn: &str) -> String {
        format!("{epg_dn}/rsdomAtt-[{domain_dn}]")
    }

    /// Static path binding of a fabric path into an EPG.
    #[must_use]
    pub fn static_path(epg_dn: &str, path_dn: &str) -> String {
        format!("{epg_dn}/rspathAtt-[{path_dn}]")
    }

    /// `uni/infra/accportprof-<profile>`
    #[must_use]
    pub fn interface_profile(profile: &str) -> String {
        format!("uni/infra/accportprof-{profile}")
    }

    /// Access port selector of an interface profile.
    #[must_use]
    pub fn port_selector(profile: &str, selector: &str) -> String {
        format!("{}/hports-{selector}-typ-range", interface_profile(profile))
    }

    /// Access port block of a port selector.
    #[must_use]
    pub fn port_block(selector_dn: &str, block: &str) -> String {
        format!("{selector_dn}/portblk-{block}")
    }

    /// Policy group relation of a port selector.
    #[must_use]
    pub fn selector_policy_group_relation(selector_dn: &str) -> String {
        format!("{selector_dn}/rsaccBaseGrp")
    }

    /// `uni/infra/lacplagp-<policy>`
    #[must_use]
    pub fn lacp_policy(policy: &str) -> String {
        format!("uni/infra/lacplagp-{policy}")
    }

    /// `uni/infra/funcprof/accbundle-<group>`
    #[must_use]
    pub fn policy_group(group: &str) -> String {
        format!("uni/infra/funcprof/accbundle-{group}")
    }

    /// LACP relation of a policy group.
    #[must_use]
    pub fn policy_group_lacp_relation(policy_group_dn: &str) -> String {
        format!("{policy_group_dn}/rslacpPol")
    }

    /// Attachable entity profile relation of a policy group.
    #[must_use]
    pub fn policy_group_entity_profile_relation(policy_group_dn: &str) -> String {
        format!("{policy_group_dn}/rsattEntP")
    }

    /// `uni/infra/nprof-<profile>`
    #[must_use]
    pub fn leaf_profile(profile: &str) -> String {
        format!("uni/infra/nprof-{profile}")
    }

    /// Leaf selector of a leaf profile.
    #[must_use]
    pub fn leaf_selector(profile: &str, selector: &str) -> String {
        format!("{}/leaves-{selector}-typ-range", leaf_profile(profile))
    }

    /// Node block of a leaf selector.
    #[must_use]
    pub fn node_block(selector_dn: &str, block: &str) -> String {
        format!("{selector_dn}/nodeblk-{block}")
    }

    /// Interface profile relation of a leaf profile.
    #[must_use]
    pub fn leaf_interface_profile_relation(profile: &str, interface_profile_dn: &str) -> String {
        format!("{}/rsaccPortP-[{interface_profile_dn}]", leaf_profile(profile))
    }

    /// Fabric path of a port channel (one node) or virtual port channel (two nodes).
    #[must_use]
    pub fn fabric_path(pod_id: &str, nodes: &[u32], policy_group: &str) -> String {
        let joined = nodes
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join("-");
        let kind = if nodes.len() > 1 { "protpaths" } else { "paths" };
        format!("topology/pod-{pod_id}/{kind}-{joined}/pathep-[{policy_group}]")
    }
}
