// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Controller object builder.
//!
//! This module turns names from [`crate::naming`] into concrete controller
//! objects and applies them in order.
//!
//! # Ensure-exists
//!
//! [`ensure`] reads an object by DN and creates it only when the read reports
//! [`ControllerError::NotFound`]. Any other read failure aborts. A create that
//! races another workflow is tolerated because workflows on the same resource
//! are serialized by [`crate::locks`].
//!
//! # Provisioning plans
//!
//! Workflows are expressed as a [`ProvisioningPlan`]: an ordered list of
//! [`ProvisioningStep`]s, each of which knows its inverse. Executing a plan stops
//! at the first failing step and returns its error. Steps already applied stay
//! on the controller. Re-executing the same plan converges because every
//! ensure step skips objects that exist, but zone workflows guard their first
//! object with [`ensure_vacant`], so a retried zone create fails with a conflict
//! until the leftovers are removed. [`ProvisioningPlan::inverse`] yields the
//! delete sequence undoing a plan, newest step first.

use tracing::{debug, error, info};

use crate::constants::{LACP_MODE_ACTIVE, LAG_TYPE_PORT_CHANNEL, LAG_TYPE_VIRTUAL_PORT_CHANNEL};
use crate::controller::{Controller, ControllerError, ManagedObject};
use crate::errors::FabricError;
use crate::model::VlanRange;
use crate::naming::{dn, node_block_name, vlan_encap, EndpointNames, ZoneOfZonesNames};
use crate::topology::SwitchPortPattern;

// ============================================================================
// Tenant objects
// ============================================================================

/// `fvTenant`
#[must_use]
pub fn tenant(name: &str) -> ManagedObject {
    ManagedObject::new("fvTenant", dn::tenant(name)).with("name", name)
}

/// `fvAp`
#[must_use]
pub fn application_profile(tenant: &str, name: &str) -> ManagedObject {
    ManagedObject::new("fvAp", dn::application_profile(tenant, name)).with("name", name)
}

/// `fvCtx`
#[must_use]
pub fn vrf(tenant: &str, name: &str) -> ManagedObject {
    ManagedObject::new("fvCtx", dn::vrf(tenant, name)).with("name", name)
}

/// `vzRsAnyToCons`: the VRF consumes `contract` for all its EPGs.
#[must_use]
pub fn vrf_any_consumer(tenant: &str, vrf: &str, contract: &str) -> ManagedObject {
    ManagedObject::new(
        "vzRsAnyToCons",
        dn::vrf_any_consumer(tenant, vrf, contract),
    )
    .with("tnVzBrCPName", contract)
}

/// `vzRsAnyToProv`: the VRF provides `contract` for all its EPGs.
#[must_use]
pub fn vrf_any_provider(tenant: &str, vrf: &str, contract: &str) -> ManagedObject {
    ManagedObject::new(
        "vzRsAnyToProv",
        dn::vrf_any_provider(tenant, vrf, contract),
    )
    .with("tnVzBrCPName", contract)
}

/// `vzBrCP` scoped to the VRF.
#[must_use]
pub fn contract(tenant: &str, name: &str) -> ManagedObject {
    ManagedObject::new("vzBrCP", dn::contract(tenant, name))
        .with("name", name)
        .with("scope", "context")
}

/// `vzSubj`
#[must_use]
pub fn contract_subject(tenant: &str, contract: &str, name: &str) -> ManagedObject {
    ManagedObject::new("vzSubj", dn::contract_subject(tenant, contract, name)).with("name", name)
}

/// `vzRsSubjFiltAtt`
#[must_use]
pub fn subject_filter(tenant: &str, contract: &str, subject: &str, filter: &str) -> ManagedObject {
    ManagedObject::new(
        "vzRsSubjFiltAtt",
        dn::subject_filter(tenant, contract, subject, filter),
    )
    .with("tnVzFilterName", filter)
}

/// `fvBD`
#[must_use]
pub fn bridge_domain(tenant: &str, name: &str) -> ManagedObject {
    ManagedObject::new("fvBD", dn::bridge_domain(tenant, name)).with("name", name)
}

/// `fvSubnet` with the gateway address as its IP.
#[must_use]
pub fn subnet(tenant: &str, bridge_domain: &str, gateway: &str) -> ManagedObject {
    ManagedObject::new("fvSubnet", dn::subnet(tenant, bridge_domain, gateway)).with("ip", gateway)
}

/// `fvRsCtx`
#[must_use]
pub fn bridge_domain_vrf_relation(tenant: &str, bridge_domain: &str, vrf: &str) -> ManagedObject {
    ManagedObject::new(
        "fvRsCtx",
        dn::bridge_domain_vrf_relation(tenant, bridge_domain),
    )
    .with("tnFvCtxName", vrf)
}

/// `fvAEPg`
#[must_use]
pub fn epg(tenant: &str, application_profile: &str, name: &str) -> ManagedObject {
    ManagedObject::new("fvAEPg", dn::epg(tenant, application_profile, name)).with("name", name)
}

/// `fvRsBd`
#[must_use]
pub fn epg_bridge_domain_relation(epg_dn: &str, bridge_domain: &str) -> ManagedObject {
    ManagedObject::new("fvRsBd", dn::epg_bridge_domain_relation(epg_dn))
        .with("tnFvBDName", bridge_domain)
}

/// `fvRsDomAtt`
#[must_use]
pub fn epg_domain_relation(epg_dn: &str, domain_dn: &str) -> ManagedObject {
    ManagedObject::new("fvRsDomAtt", dn::epg_domain_relation(epg_dn, domain_dn))
        .with("tDn", domain_dn)
}

/// `fvRsPathAtt` binding a fabric path into an EPG on one VLAN.
#[must_use]
pub fn static_path(epg_dn: &str, path_dn: &str, vlan: u16) -> ManagedObject {
    ManagedObject::new("fvRsPathAtt", dn::static_path(epg_dn, path_dn))
        .with("tDn", path_dn)
        .with("encap", vlan_encap(vlan))
}

// ============================================================================
// Domain objects
// ============================================================================

/// `physDomP`
#[must_use]
pub fn physical_domain(name: &str) -> ManagedObject {
    ManagedObject::new("physDomP", dn::physical_domain(name)).with("name", name)
}

/// `infraRsVlanNs`
#[must_use]
pub fn domain_vlan_pool_relation(domain: &str, vlan_pool: &str) -> ManagedObject {
    ManagedObject::new("infraRsVlanNs", dn::domain_vlan_pool_relation(domain))
        .with("tDn", dn::vlan_pool(vlan_pool))
}

/// Static `fvnsVlanInstP`
#[must_use]
pub fn vlan_pool(name: &str) -> ManagedObject {
    ManagedObject::new("fvnsVlanInstP", dn::vlan_pool(name))
        .with("name", name)
        .with("allocMode", "static")
}

/// `fvnsEncapBlk` covering `range`.
#[must_use]
pub fn vlan_block(pool: &str, range: VlanRange) -> ManagedObject {
    ManagedObject::new(
        "fvnsEncapBlk",
        dn::vlan_block(pool, range.lower, range.upper),
    )
    .with("from", vlan_encap(range.lower))
    .with("to", vlan_encap(range.upper))
}

/// `infraAttEntityP`
#[must_use]
pub fn entity_profile(name: &str) -> ManagedObject {
    ManagedObject::new("infraAttEntityP", dn::entity_profile(name)).with("name", name)
}

/// `infraRsDomP`
#[must_use]
pub fn entity_profile_domain_relation(entity_profile: &str, domain: &str) -> ManagedObject {
    ManagedObject::new(
        "infraRsDomP",
        dn::entity_profile_domain_relation(entity_profile, domain),
    )
    .with("tDn", dn::physical_domain(domain))
}

// ============================================================================
// Access policy objects
// ============================================================================

/// `infraAccPortP`
#[must_use]
pub fn interface_profile(name: &str) -> ManagedObject {
    ManagedObject::new("infraAccPortP", dn::interface_profile(name)).with("name", name)
}

/// `infraHPortS` of type range.
#[must_use]
pub fn port_selector(profile: &str, name: &str) -> ManagedObject {
    ManagedObject::new("infraHPortS", dn::port_selector(profile, name))
        .with("name", name)
        .with("type", "range")
}

/// `infraPortBlk` spanning the pattern's ports.
#[must_use]
pub fn port_block(selector_dn: &str, name: &str, pattern: &SwitchPortPattern) -> ManagedObject {
    let card = pattern.card.to_string();
    ManagedObject::new("infraPortBlk", dn::port_block(selector_dn, name))
        .with("name", name)
        .with("fromCard", card.clone())
        .with("toCard", card)
        .with("fromPort", pattern.low_port.to_string())
        .with("toPort", pattern.high_port.to_string())
}

/// `infraRsAccBaseGrp`
#[must_use]
pub fn selector_policy_group_relation(selector_dn: &str, policy_group_dn: &str) -> ManagedObject {
    ManagedObject::new(
        "infraRsAccBaseGrp",
        dn::selector_policy_group_relation(selector_dn),
    )
    .with("tDn", policy_group_dn)
}

/// Active-mode `lacpLagPol`
#[must_use]
pub fn lacp_policy(name: &str) -> ManagedObject {
    ManagedObject::new("lacpLagPol", dn::lacp_policy(name))
        .with("name", name)
        .with("mode", LACP_MODE_ACTIVE)
}

/// `infraAccBndlGrp`: a port channel, or a virtual port channel across two switches.
#[must_use]
pub fn policy_group(name: &str, virtual_port_channel: bool) -> ManagedObject {
    let lag_type = if virtual_port_channel {
        LAG_TYPE_VIRTUAL_PORT_CHANNEL
    } else {
        LAG_TYPE_PORT_CHANNEL
    };
    ManagedObject::new("infraAccBndlGrp", dn::policy_group(name))
        .with("name", name)
        .with("lagT", lag_type)
}

/// `infraRsLacpPol`
#[must_use]
pub fn policy_group_lacp_relation(policy_group_dn: &str, lacp_policy: &str) -> ManagedObject {
    ManagedObject::new(
        "infraRsLacpPol",
        dn::policy_group_lacp_relation(policy_group_dn),
    )
    .with("tnLacpLagPolName", lacp_policy)
}

/// `infraRsAttEntP`
#[must_use]
pub fn policy_group_entity_profile_relation(
    policy_group_dn: &str,
    entity_profile_dn: &str,
) -> ManagedObject {
    ManagedObject::new(
        "infraRsAttEntP",
        dn::policy_group_entity_profile_relation(policy_group_dn),
    )
    .with("tDn", entity_profile_dn)
}

/// `infraNodeP`
#[must_use]
pub fn leaf_profile(name: &str) -> ManagedObject {
    ManagedObject::new("infraNodeP", dn::leaf_profile(name)).with("name", name)
}

/// `infraLeafS` of type range.
#[must_use]
pub fn leaf_selector(profile: &str, name: &str) -> ManagedObject {
    ManagedObject::new("infraLeafS", dn::leaf_selector(profile, name))
        .with("name", name)
        .with("type", "range")
}

/// `infraNodeBlk` selecting exactly one switch.
#[must_use]
pub fn node_block(selector_dn: &str, node: u32) -> ManagedObject {
    let name = node_block_name(node);
    ManagedObject::new("infraNodeBlk", dn::node_block(selector_dn, &name))
        .with("name", name)
        .with("from_", node.to_string())
        .with("to_", node.to_string())
}

/// `infraRsAccPortP`
#[must_use]
pub fn leaf_interface_profile_relation(profile: &str, interface_profile_dn: &str) -> ManagedObject {
    ManagedObject::new(
        "infraRsAccPortP",
        dn::leaf_interface_profile_relation(profile, interface_profile_dn),
    )
    .with("tDn", interface_profile_dn)
}

// ============================================================================
// Ensure-exists
// ============================================================================

/// What [`ensure`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The object was missing and has been created
    Created,
    /// The object already existed and was left untouched
    AlreadyPresent,
    /// The object has been deleted
    Deleted,
}

/// Create `object` unless it already exists.
///
/// # Errors
///
/// Returns the read error if it is not [`ControllerError::NotFound`], or the
/// create error.
pub async fn ensure(
    controller: &dyn Controller,
    object: &ManagedObject,
) -> Result<StepOutcome, ControllerError> {
    match controller.read(&object.dn).await {
        Ok(_) => {
            debug!(dn = %object.dn, class = %object.class, "Controller object already present");
            Ok(StepOutcome::AlreadyPresent)
        }
        Err(e) if e.is_not_found() => {
            controller.create(object).await?;
            info!(dn = %object.dn, class = %object.class, "Created controller object");
            Ok(StepOutcome::Created)
        }
        Err(e) => Err(e),
    }
}

/// Fail with a conflict if an object exists at `dn`.
///
/// Used before a workflow claims a controller name that must be new.
///
/// # Errors
///
/// Returns [`FabricError::Conflict`] if the object exists, or
/// [`FabricError::Upstream`] if the read fails for another reason.
pub async fn ensure_vacant(
    controller: &dyn Controller,
    dn: &str,
    what: &str,
) -> Result<(), FabricError> {
    match controller.read(dn).await {
        Ok(_) => Err(FabricError::already_exists(
            format!("{what} {dn} already exists on the fabric controller"),
            vec![dn.to_string()],
        )),
        Err(e) if e.is_not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

// ============================================================================
// Provisioning plans
// ============================================================================

/// The forward action of a [`ProvisioningStep`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    /// Create the object unless it exists
    Ensure(ManagedObject),
    /// Delete the object and its subtree
    Delete(String),
}

/// One ordered controller action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningStep {
    /// Short human-readable label, used in logs
    pub description: String,
    /// What the step does
    pub action: StepAction,
}

impl ProvisioningStep {
    /// A step creating `object` unless it exists.
    pub fn ensure(description: impl Into<String>, object: ManagedObject) -> Self {
        Self {
            description: description.into(),
            action: StepAction::Ensure(object),
        }
    }

    /// A step deleting the object at `dn`.
    pub fn delete(description: impl Into<String>, dn: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            action: StepAction::Delete(dn.into()),
        }
    }

    /// DN the step acts on.
    #[must_use]
    pub fn dn(&self) -> &str {
        match &self.action {
            StepAction::Ensure(object) => &object.dn,
            StepAction::Delete(dn) => dn,
        }
    }

    /// The step undoing this one, if it can be undone without a snapshot.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        match &self.action {
            StepAction::Ensure(object) => Some(Self::delete(
                format!("undo {}", self.description),
                object.dn.clone(),
            )),
            StepAction::Delete(_) => None,
        }
    }

    /// Apply the step.
    ///
    /// # Errors
    ///
    /// Returns the controller error of the failing call.
    pub async fn apply(&self, controller: &dyn Controller) -> Result<StepOutcome, ControllerError> {
        match &self.action {
            StepAction::Ensure(object) => ensure(controller, object).await,
            StepAction::Delete(dn) => {
                controller.delete(dn).await?;
                info!(dn = %dn, "Deleted controller object");
                Ok(StepOutcome::Deleted)
            }
        }
    }
}

/// Result of a successful [`ProvisioningPlan::execute`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanReport {
    /// DNs created by the plan
    pub created: Vec<String>,
    /// DNs that already existed
    pub already_present: Vec<String>,
    /// DNs deleted by the plan
    pub deleted: Vec<String>,
}

/// An ordered, non-transactional sequence of controller steps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisioningPlan {
    name: String,
    steps: Vec<ProvisioningStep>,
}

impl ProvisioningPlan {
    /// Create an empty plan.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step that creates `object` unless it exists.
    pub fn ensure(&mut self, description: impl Into<String>, object: ManagedObject) -> &mut Self {
        self.steps.push(ProvisioningStep::ensure(description, object));
        self
    }

    /// Append a step that deletes `dn`.
    pub fn delete(&mut self, description: impl Into<String>, dn: impl Into<String>) -> &mut Self {
        self.steps.push(ProvisioningStep::delete(description, dn));
        self
    }

    /// Append every step of `other`.
    pub fn extend(&mut self, other: ProvisioningPlan) -> &mut Self {
        self.steps.extend(other.steps);
        self
    }

    /// Plan name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Steps in execution order.
    #[must_use]
    pub fn steps(&self) -> &[ProvisioningStep] {
        &self.steps
    }

    /// DNs in execution order.
    #[must_use]
    pub fn dns(&self) -> Vec<&str> {
        self.steps.iter().map(ProvisioningStep::dn).collect()
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True when the plan has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The plan undoing this one: inverses of all reversible steps, newest first.
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            name: format!("undo {}", self.name),
            steps: self
                .steps
                .iter()
                .rev()
                .filter_map(ProvisioningStep::inverse)
                .collect(),
        }
    }

    /// Apply every step in order, stopping at the first failure.
    ///
    /// Steps applied before the failure are not undone.
    ///
    /// # Errors
    ///
    /// Returns the controller error of the first failing step.
    pub async fn execute(&self, controller: &dyn Controller) -> Result<PlanReport, ControllerError> {
        let mut report = PlanReport::default();
        for (index, step) in self.steps.iter().enumerate() {
            match step.apply(controller).await {
                Ok(StepOutcome::Created) => report.created.push(step.dn().to_string()),
                Ok(StepOutcome::AlreadyPresent) => {
                    report.already_present.push(step.dn().to_string());
                }
                Ok(StepOutcome::Deleted) => report.deleted.push(step.dn().to_string()),
                Err(e) => {
                    error!(
                        plan = %self.name,
                        step = index + 1,
                        total = self.steps.len(),
                        description = %step.description,
                        dn = %step.dn(),
                        error = %e,
                        "Provisioning step failed, aborting plan"
                    );
                    return Err(e);
                }
            }
        }
        debug!(
            plan = %self.name,
            created = report.created.len(),
            already_present = report.already_present.len(),
            deleted = report.deleted.len(),
            "Provisioning plan complete"
        );
        Ok(report)
    }
}

// ============================================================================
// Workflow plans
// ============================================================================

/// Access policies materializing an endpoint's policy group.
///
/// Order: interface profile, port selector, port block, LACP policy, policy
/// group, group/selector relation, group/LACP relation, leaf profile, switch
/// association, one node block per switch, leaf/interface profile relation.
#[must_use]
pub fn endpoint_plan(pattern: &SwitchPortPattern) -> ProvisioningPlan {
    let names = EndpointNames::new(pattern);
    let selector_dn = dn::port_selector(&names.interface_profile, &names.port_selector);
    let policy_group_dn = dn::policy_group(&names.policy_group);
    let interface_profile_dn = dn::interface_profile(&names.interface_profile);
    let leaf_selector_dn = dn::leaf_selector(&names.leaf_profile, &names.leaf_selector);

    let mut plan = ProvisioningPlan::new(format!("endpoint {pattern}"));
    plan.ensure(
        "interface profile",
        interface_profile(&names.interface_profile),
    )
    .ensure(
        "access port selector",
        port_selector(&names.interface_profile, &names.port_selector),
    )
    .ensure(
        "access port block",
        port_block(&selector_dn, &names.port_block, pattern),
    )
    .ensure("LACP policy", lacp_policy(&names.lacp_policy))
    .ensure(
        "interface policy group",
        policy_group(&names.policy_group, pattern.is_virtual_port_channel()),
    )
    .ensure(
        "policy group to selector",
        selector_policy_group_relation(&selector_dn, &policy_group_dn),
    )
    .ensure(
        "policy group to LACP policy",
        policy_group_lacp_relation(&policy_group_dn, &names.lacp_policy),
    )
    .ensure("leaf profile", leaf_profile(&names.leaf_profile))
    .ensure(
        "switch association",
        leaf_selector(&names.leaf_profile, &names.leaf_selector),
    );
    for node in &pattern.nodes {
        plan.ensure("node block", node_block(&leaf_selector_dn, *node));
    }
    plan.ensure(
        "leaf profile to interface profile",
        leaf_interface_profile_relation(&names.leaf_profile, &interface_profile_dn),
    );
    plan
}

/// Tenant-side and domain objects of a ZoneOfZones.
///
/// Order: application profile, VRF, contract with subject and default filter,
/// VRF "any" consumer and provider, physical domain, VLAN pool with its block,
/// domain/pool relation, entity profile, entity profile/domain relation.
#[must_use]
pub fn zone_of_zones_plan(
    names: &ZoneOfZonesNames,
    filter: &str,
    range: VlanRange,
) -> ProvisioningPlan {
    let tenant = names.tenant.as_str();
    let mut plan = ProvisioningPlan::new(format!("zone of zones {}", names.application_profile));
    plan.ensure(
        "application profile",
        application_profile(tenant, &names.application_profile),
    )
    .ensure("VRF", vrf(tenant, &names.vrf))
    .ensure("contract", contract(tenant, &names.contract))
    .ensure(
        "contract subject",
        contract_subject(tenant, &names.contract, &names.subject),
    )
    .ensure(
        "subject filter",
        subject_filter(tenant, &names.contract, &names.subject, filter),
    )
    .ensure(
        "VRF any consumer",
        vrf_any_consumer(tenant, &names.vrf, &names.contract),
    )
    .ensure(
        "VRF any provider",
        vrf_any_provider(tenant, &names.vrf, &names.contract),
    )
    .ensure("physical domain", physical_domain(&names.physical_domain))
    .ensure("VLAN pool", vlan_pool(&names.vlan_pool))
    .ensure("VLAN block", vlan_block(&names.vlan_pool, range))
    .ensure(
        "domain to VLAN pool",
        domain_vlan_pool_relation(&names.physical_domain, &names.vlan_pool),
    )
    .ensure("entity profile", entity_profile(&names.entity_profile))
    .ensure(
        "entity profile to domain",
        entity_profile_domain_relation(&names.entity_profile, &names.physical_domain),
    );
    plan
}

/// Objects binding one endpoint into an EPG: the static path at `vlan`, and the
/// policy group's attachment to the zone's entity profile.
#[must_use]
pub fn endpoint_binding_plan(
    epg_dn: &str,
    path_dn: &str,
    vlan: u16,
    policy_group_dn: &str,
    entity_profile_dn: &str,
) -> ProvisioningPlan {
    let mut plan = ProvisioningPlan::new(format!("bind {policy_group_dn}"));
    plan.ensure("static path", static_path(epg_dn, path_dn, vlan))
        .ensure(
            "policy group to entity profile",
            policy_group_entity_profile_relation(policy_group_dn, entity_profile_dn),
        );
    plan
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod builder_tests;
