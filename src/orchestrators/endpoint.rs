// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Endpoint lifecycle.
//!
//! An endpoint is a redundant set of switch ports. Creating one unifies its
//! ports into a [`SwitchPortPattern`], materializes the access policies of a
//! PC/vPC policy group on the controller and caches every derived DN in the
//! stored record as [`AciPolicyGroupData`].
//!
//! Deleting an endpoint removes its port selector and policy group. It is
//! rejected while any zone still links to the endpoint.

use std::collections::BTreeSet;

use tracing::info;

use super::{ensure_distinct, new_resource_id, observed, RESOURCE_ENDPOINT};
use crate::builder::{endpoint_plan, ProvisioningPlan};
use crate::constants::ENDPOINT_ODATA_TYPE;
use crate::context::Context;
use crate::errors::FabricError;
use crate::events::EventKind;
use crate::model::{
    endpoints_uri, AciPolicyGroupData, Endpoint, EndpointLinks, EndpointRequest, Fabric, Link,
    Status,
};
use crate::naming::{dn, EndpointNames};
use crate::topology::{PortRef, SwitchPortPattern};

/// URI of an endpoint.
#[must_use]
pub fn endpoint_uri(fabric_id: &str, endpoint_id: &str) -> String {
    format!("{}/{endpoint_id}", endpoints_uri(fabric_id))
}

/// Lock key guarding an endpoint name.
fn name_lock_key(name: &str) -> String {
    format!("name:{name}")
}

/// Controller identifiers of the policy group built for `pattern`.
#[must_use]
pub fn policy_group_data(pod_id: &str, pattern: &SwitchPortPattern) -> AciPolicyGroupData {
    let names = EndpointNames::new(pattern);
    AciPolicyGroupData {
        switch_pattern: pattern.switch_pattern(),
        port_pattern: pattern.port_pattern(),
        policy_group_dn: dn::policy_group(&names.policy_group),
        path_dn: dn::fabric_path(pod_id, &pattern.nodes, &names.policy_group),
        interface_profile_dn: dn::interface_profile(&names.interface_profile),
        port_selector_dn: dn::port_selector(&names.interface_profile, &names.port_selector),
        lacp_policy_dn: dn::lacp_policy(&names.lacp_policy),
        leaf_profile_dn: dn::leaf_profile(&names.leaf_profile),
        policy_group_name: names.policy_group,
    }
}

/// Parse every port of a request and check it belongs to the fabric.
fn resolve_ports(fabric: &Fabric, links: &[Link]) -> Result<Vec<PortRef>, FabricError> {
    let mut ports = Vec::with_capacity(links.len());
    for link in links {
        let port = PortRef::parse(link.uri())?;
        if port.fabric_id != fabric.id {
            return Err(FabricError::value_conflict(
                format!(
                    "Port {} does not belong to fabric {}",
                    link.uri(),
                    fabric.id
                ),
                vec![link.uri().to_string(), fabric.id.clone()],
            ));
        }
        if !fabric.switch_ids.iter().any(|id| id == &port.switch_id) {
            return Err(FabricError::not_found("Switch", port.switch_id));
        }
        ports.push(port);
    }
    Ok(ports)
}

/// Validate a request, provision its policy group and store the endpoint.
///
/// # Errors
///
/// - [`FabricError::Validation`] for a missing name, an empty or repeating port set
/// - [`FabricError::MalformedTopology`] when the ports cannot form one pattern
/// - [`FabricError::NotFound`] for an unknown fabric or switch
/// - [`FabricError::Conflict`] for a taken name or port
/// - [`FabricError::Upstream`] when the controller fails
pub async fn create_endpoint(
    ctx: &Context,
    fabric_id: &str,
    request: EndpointRequest,
) -> Result<Endpoint, FabricError> {
    observed(
        RESOURCE_ENDPOINT,
        "create",
        create_inner(ctx, fabric_id, request),
    )
    .await
}

async fn create_inner(
    ctx: &Context,
    fabric_id: &str,
    request: EndpointRequest,
) -> Result<Endpoint, FabricError> {
    let fabric = ctx.repos.fabric(fabric_id).await?;

    let links: Vec<Link> = request
        .redundancy
        .iter()
        .flat_map(|r| r.redundancy_set.iter().cloned())
        .collect();
    if links.is_empty() {
        return Err(FabricError::missing_property("Redundancy.RedundancySet"));
    }
    ensure_distinct(&links, "RedundancySet")?;

    let name = request
        .name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| FabricError::missing_property("Name"))?;

    let ports = resolve_ports(&fabric, &links)?;
    let pattern = SwitchPortPattern::derive(&ports)?;

    let mut lock_keys: Vec<String> = links.iter().map(|l| l.uri().to_string()).collect();
    lock_keys.push(name_lock_key(&name));
    let _guard = ctx.locks.acquire(fabric_id, lock_keys).await;

    let requested: BTreeSet<&str> = links.iter().map(Link::uri).collect();
    for existing in ctx.repos.endpoints.list(fabric_id).await? {
        if existing.name == name {
            return Err(FabricError::already_exists(
                format!("Endpoint name {name} is already used by {}", existing.odata_id),
                vec![name.clone(), existing.odata_id],
            ));
        }
        if let Some(port) = existing.port_uris().find(|uri| requested.contains(uri)) {
            return Err(FabricError::already_exists(
                format!("Port {port} already belongs to endpoint {}", existing.odata_id),
                vec![port.to_string(), existing.odata_id.clone()],
            ));
        }
    }

    endpoint_plan(&pattern).execute(ctx.controller.as_ref()).await?;

    let id = new_resource_id();
    let uri = endpoint_uri(fabric_id, &id);
    let endpoint = Endpoint {
        odata_id: uri.clone(),
        odata_type: ENDPOINT_ODATA_TYPE.to_string(),
        id,
        name,
        description: request.description,
        redundancy: request.redundancy,
        links: EndpointLinks::default(),
        aci_policy_group: policy_group_data(&fabric.pod_id, &pattern),
        status: Status::default(),
    };
    ctx.repos.endpoints.save(fabric_id, &endpoint).await?;

    info!(
        fabric_id = %fabric_id,
        uri = %uri,
        pattern = %pattern,
        policy_group = %endpoint.aci_policy_group.policy_group_dn,
        "Created endpoint"
    );
    ctx.events.notify(EventKind::ResourceAdded, &uri);
    Ok(endpoint)
}

/// Remove an endpoint's port selector and policy group, then its record.
///
/// # Errors
///
/// Returns [`FabricError::NotFound`] for an unknown endpoint,
/// [`FabricError::CannotDelete`] while zones link to it and
/// [`FabricError::Upstream`] when the controller fails.
pub async fn delete_endpoint(
    ctx: &Context,
    fabric_id: &str,
    endpoint_id: &str,
) -> Result<(), FabricError> {
    observed(
        RESOURCE_ENDPOINT,
        "delete",
        delete_inner(ctx, fabric_id, endpoint_id),
    )
    .await
}

async fn delete_inner(
    ctx: &Context,
    fabric_id: &str,
    endpoint_id: &str,
) -> Result<(), FabricError> {
    let uri = endpoint_uri(fabric_id, endpoint_id);
    let _guard = ctx.locks.acquire(fabric_id, [uri.as_str()]).await;

    let endpoint = ctx.repos.endpoints.get(fabric_id, &uri).await?;
    if !endpoint.links.address_pools.is_empty() || !endpoint.links.zones.is_empty() {
        return Err(FabricError::cannot_delete(
            &uri,
            format!("Endpoint {uri} is still linked to a zone"),
        ));
    }

    let data = &endpoint.aci_policy_group;
    let mut plan = ProvisioningPlan::new(format!("delete endpoint {}", endpoint.name));
    plan.delete("access port selector", data.port_selector_dn.as_str())
        .delete("interface policy group", data.policy_group_dn.as_str());
    plan.execute(ctx.controller.as_ref()).await?;

    ctx.repos.endpoints.delete(fabric_id, &uri).await?;
    info!(fabric_id = %fabric_id, uri = %uri, "Deleted endpoint");
    ctx.events.notify(EventKind::ResourceRemoved, &uri);
    Ok(())
}

/// Read one endpoint.
///
/// # Errors
///
/// Returns [`FabricError::NotFound`] for an unknown endpoint.
pub async fn get_endpoint(
    ctx: &Context,
    fabric_id: &str,
    endpoint_id: &str,
) -> Result<Endpoint, FabricError> {
    ctx.repos
        .endpoints
        .get(fabric_id, &endpoint_uri(fabric_id, endpoint_id))
        .await
}

/// List the endpoints of a fabric.
///
/// # Errors
///
/// Returns [`FabricError::NotFound`] for an unknown fabric.
pub async fn list_endpoints(ctx: &Context, fabric_id: &str) -> Result<Vec<Endpoint>, FabricError> {
    ctx.repos.fabric(fabric_id).await?;
    ctx.repos.endpoints.list(fabric_id).await
}

#[cfg(test)]
#[path = "endpoint_tests.rs"]
mod endpoint_tests;
