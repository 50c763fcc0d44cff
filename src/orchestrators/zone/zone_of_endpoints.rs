// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! ZoneOfEndpoints: a bridge domain and EPG binding a set of endpoints.
//!
//! The zone draws one VLAN and one gateway from a single-VLAN address pool.
//! Every member endpoint gets a static path into the EPG at that VLAN, and its
//! policy group is attached to the parent ZoneOfZones' entity profile.
//!
//! Membership is mirrored on each endpoint (`Links.Zones`, `Links.AddressPools`)
//! so an endpoint cannot be deleted while a zone still binds it.

use std::collections::BTreeSet;

use tracing::debug;

use super::validation::{parent_of, single_link, zone_of_type, zone_name};
use super::{attach_child, detach_child, new_zone, set_pool_link};
use crate::builder::{self, endpoint_binding_plan, ensure_vacant, ProvisioningPlan};
use crate::context::Context;
use crate::errors::FabricError;
use crate::model::{
    AciDomainData, AddressPool, Endpoint, Link, VlanRange, Zone, ZoneLinks, ZoneRequest,
    ZoneRequestLinks, ZoneType,
};
use crate::naming::{dn, ZoneOfEndpointsNames};
use crate::orchestrators::ensure_distinct;
use crate::status_reasons::REASON_RESOURCE_IN_USE;

/// Everything a ZoneOfEndpoints binds into, resolved from its ancestors.
struct Scope {
    names: ZoneOfEndpointsNames,
    zone_of_zones_uri: String,
    domain: AciDomainData,
}

impl Scope {
    /// Resolve the ZoneOfZones at `parent`, its Default parent and its domain.
    async fn resolve(
        ctx: &Context,
        fabric_id: &str,
        parent: &Zone,
        name: &str,
    ) -> Result<Self, FabricError> {
        let tenant = parent_of(ctx, fabric_id, parent, ZoneType::Default).await?;
        let domain = ctx
            .repos
            .zone_domains
            .get(fabric_id, &parent.odata_id)
            .await?;
        Ok(Self {
            names: ZoneOfEndpointsNames::new(&tenant.name, &parent.name, name),
            zone_of_zones_uri: parent.odata_id.clone(),
            domain,
        })
    }

    fn epg_dn(&self) -> String {
        dn::epg(
            &self.names.tenant,
            &self.names.application_profile,
            &self.names.epg,
        )
    }

    /// Static path and entity profile attachment of one endpoint.
    fn bind(&self, endpoint: &Endpoint, vlan: u16) -> ProvisioningPlan {
        let data = &endpoint.aci_policy_group;
        endpoint_binding_plan(
            &self.epg_dn(),
            &data.path_dn,
            vlan,
            &data.policy_group_dn,
            &self.domain.entity_profile_dn,
        )
    }
}

/// The gateway and VLAN of a pool usable by a ZoneOfEndpoints.
fn pool_binding(pool: &AddressPool) -> Result<(String, u16), FabricError> {
    let conflict = |message: String| {
        FabricError::value_conflict(message, vec![pool.odata_id.clone()])
    };
    let gateway = pool
        .gateway()
        .ok_or_else(|| conflict(format!("Address pool {} has no gateway", pool.odata_id)))?;
    let range = pool
        .vlan_range()
        .filter(|range| range.is_single())
        .ok_or_else(|| {
            conflict(format!(
                "Address pool {} must hold exactly one VLAN",
                pool.odata_id
            ))
        })?;
    Ok((gateway.to_string(), range.lower))
}

/// Load every endpoint of a link list.
async fn endpoints(
    ctx: &Context,
    fabric_id: &str,
    uris: &[String],
) -> Result<Vec<Endpoint>, FabricError> {
    let mut endpoints = Vec::with_capacity(uris.len());
    for uri in uris {
        endpoints.push(ctx.repos.endpoints.get(fabric_id, uri).await?);
    }
    Ok(endpoints)
}

/// Add or remove the zone and its pool in an endpoint's links.
async fn set_membership(
    ctx: &Context,
    fabric_id: &str,
    mut endpoint: Endpoint,
    zone: &Zone,
    member: bool,
) -> Result<(), FabricError> {
    let zone_link = Link::new(&zone.odata_id);
    if member {
        endpoint.links.zones.insert(zone_link);
        endpoint
            .links
            .address_pools
            .extend(zone.links.address_pools.iter().cloned());
    } else {
        endpoint.links.zones.remove(&zone_link);
        for pool in &zone.links.address_pools {
            endpoint.links.address_pools.remove(pool);
        }
    }
    ctx.repos.endpoints.update(fabric_id, &endpoint).await
}

/// True when another zone under the same ZoneOfZones still binds `endpoint`,
/// and therefore still needs its entity profile attachment.
async fn attachment_shared(
    ctx: &Context,
    fabric_id: &str,
    endpoint: &Endpoint,
    zone_uri: &str,
    zone_of_zones_uri: &str,
) -> Result<bool, FabricError> {
    for link in &endpoint.links.zones {
        if link.uri() == zone_uri {
            continue;
        }
        if let Some(other) = ctx.repos.zones.find(fabric_id, link.uri()).await? {
            if other.parent_uri() == Some(zone_of_zones_uri) {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

/// Reject an endpoint bound by a zone under another ZoneOfZones.
///
/// A policy group carries a single entity profile attachment, so every zone
/// binding one endpoint must share the same ZoneOfZones.
async fn ensure_attachable(
    ctx: &Context,
    fabric_id: &str,
    endpoint: &Endpoint,
    zone_of_zones_uri: &str,
) -> Result<(), FabricError> {
    for link in &endpoint.links.zones {
        let Some(other) = ctx.repos.zones.find(fabric_id, link.uri()).await? else {
            continue;
        };
        if let Some(other_parent) = other.parent_uri() {
            if other_parent != zone_of_zones_uri {
                return Err(FabricError::Conflict {
                    reason: REASON_RESOURCE_IN_USE,
                    message: format!(
                        "Endpoint {} is attached to zone {} under {other_parent}",
                        endpoint.odata_id, other.odata_id
                    ),
                    args: vec![endpoint.odata_id.clone(), other.odata_id.clone()],
                });
            }
        }
    }
    Ok(())
}

/// Steps unbinding one endpoint from the zone's EPG.
async fn unbind(
    ctx: &Context,
    fabric_id: &str,
    scope: &Scope,
    endpoint: &Endpoint,
    zone_uri: &str,
    include_static_path: bool,
) -> Result<ProvisioningPlan, FabricError> {
    let data = &endpoint.aci_policy_group;
    let mut plan = ProvisioningPlan::new(format!("unbind {}", data.policy_group_dn));
    if include_static_path {
        plan.delete("static path", dn::static_path(&scope.epg_dn(), &data.path_dn));
    }
    if attachment_shared(ctx, fabric_id, endpoint, zone_uri, &scope.zone_of_zones_uri).await? {
        debug!(
            endpoint = %endpoint.odata_id,
            "Entity profile attachment still used by a sibling zone"
        );
    } else {
        plan.delete(
            "policy group to entity profile",
            dn::policy_group_entity_profile_relation(&data.policy_group_dn),
        );
    }
    Ok(plan)
}

/// Provision and store a ZoneOfEndpoints under a ZoneOfZones.
pub(super) async fn create(
    ctx: &Context,
    fabric_id: &str,
    name: &str,
    description: Option<String>,
    links: &ZoneRequestLinks,
) -> Result<Zone, FabricError> {
    let parent_link = single_link(&links.contained_by_zones, "Links.ContainedByZones")?;
    let pool_link = single_link(&links.address_pools, "Links.AddressPools")?;
    ensure_distinct(&links.endpoints, "Links.Endpoints")?;

    let mut lock_keys = vec![parent_link.uri(), pool_link.uri()];
    lock_keys.extend(links.endpoints.iter().map(Link::uri));
    let _guard = ctx.locks.acquire(fabric_id, lock_keys).await;

    let parent = zone_of_type(ctx, fabric_id, parent_link.uri(), ZoneType::ZoneOfZones).await?;
    let mut pool = ctx.repos.address_pools.get(fabric_id, pool_link.uri()).await?;
    let (gateway, vlan) = pool_binding(&pool)?;

    for consumer in &pool.links.zones {
        let other = ctx.repos.zones.find(fabric_id, consumer.uri()).await?;
        if other.is_some_and(|z| z.zone_type == ZoneType::ZoneOfEndpoints) {
            return Err(FabricError::Conflict {
                reason: REASON_RESOURCE_IN_USE,
                message: format!(
                    "Address pool {} is already used by zone {}",
                    pool.odata_id,
                    consumer.uri()
                ),
                args: vec![pool.odata_id.clone(), consumer.uri().to_string()],
            });
        }
    }

    let scope = Scope::resolve(ctx, fabric_id, &parent, name).await?;
    let single = VlanRange {
        lower: vlan,
        upper: vlan,
    };
    if !scope.domain.vlan_range.contains(&single) {
        return Err(FabricError::value_conflict(
            format!(
                "VLAN {vlan} lies outside range {} of zone {}",
                scope.domain.vlan_range, parent.odata_id
            ),
            vec![vlan.to_string(), scope.domain.vlan_range.to_string()],
        ));
    }

    let member_uris: Vec<String> = links
        .endpoints
        .iter()
        .map(|link| link.uri().to_string())
        .collect();
    let members = endpoints(ctx, fabric_id, &member_uris).await?;
    for endpoint in &members {
        ensure_attachable(ctx, fabric_id, endpoint, &scope.zone_of_zones_uri).await?;
    }

    let names = &scope.names;
    let controller = ctx.controller.as_ref();
    ensure_vacant(
        controller,
        &dn::bridge_domain(&names.tenant, &names.bridge_domain),
        "Bridge domain",
    )
    .await?;

    let epg_dn = scope.epg_dn();
    let mut plan = ProvisioningPlan::new(format!("zone of endpoints {name}"));
    plan.ensure(
        "bridge domain",
        builder::bridge_domain(&names.tenant, &names.bridge_domain),
    )
    .ensure(
        "subnet",
        builder::subnet(&names.tenant, &names.bridge_domain, &gateway),
    )
    .ensure(
        "bridge domain to VRF",
        builder::bridge_domain_vrf_relation(&names.tenant, &names.bridge_domain, &names.vrf),
    )
    .ensure(
        "EPG",
        builder::epg(&names.tenant, &names.application_profile, &names.epg),
    )
    .ensure(
        "EPG to bridge domain",
        builder::epg_bridge_domain_relation(&epg_dn, &names.bridge_domain),
    )
    .ensure(
        "EPG to domain",
        builder::epg_domain_relation(&epg_dn, &scope.domain.physical_domain_dn),
    );
    for endpoint in &members {
        plan.extend(scope.bind(endpoint, vlan));
    }
    plan.execute(controller).await?;

    let mut zone_links = ZoneLinks::default();
    zone_links.contained_by_zones.insert(parent_link.clone());
    zone_links.address_pools.insert(pool_link.clone());
    zone_links
        .endpoints
        .extend(members.iter().map(|e| Link::new(&e.odata_id)));
    let zone = new_zone(
        fabric_id,
        name,
        description,
        ZoneType::ZoneOfEndpoints,
        zone_links,
    );

    ctx.repos.zones.save(fabric_id, &zone).await?;
    attach_child(ctx, fabric_id, parent, &zone.odata_id).await?;
    pool.links.zones.insert(Link::new(&zone.odata_id));
    ctx.repos.address_pools.update(fabric_id, &pool).await?;
    for endpoint in members {
        set_membership(ctx, fabric_id, endpoint, &zone, true).await?;
    }

    Ok(zone)
}

/// Apply a PATCH: bind added endpoints, unbind removed ones.
pub(super) async fn update(
    ctx: &Context,
    fabric_id: &str,
    zone_uri: &str,
    request: ZoneRequest,
) -> Result<Zone, FabricError> {
    let requested = request.links.as_ref().map(|links| &links.endpoints);
    if let Some(requested) = requested {
        ensure_distinct(requested, "Links.Endpoints")?;
    }

    let snapshot = ctx.repos.zones.get(fabric_id, zone_uri).await?;
    let mut lock_keys: BTreeSet<&str> = BTreeSet::new();
    lock_keys.insert(zone_uri);
    lock_keys.extend(snapshot.links.endpoints.iter().map(Link::uri));
    if let Some(requested) = requested {
        lock_keys.extend(requested.iter().map(Link::uri));
    }
    let _guard = ctx.locks.acquire(fabric_id, lock_keys).await;

    let mut zone = ctx.repos.zones.get(fabric_id, zone_uri).await?;
    if let Some(name) = request.name.as_deref() {
        if zone_name(Some(name))? != zone.name {
            return Err(FabricError::value_conflict(
                format!("Zone {zone_uri} cannot be renamed"),
                vec!["Name".to_string(), name.to_string()],
            ));
        }
    }
    if request
        .zone_type
        .is_some_and(|zone_type| zone_type != zone.zone_type)
    {
        return Err(FabricError::value_conflict(
            format!("Zone {zone_uri} cannot change type"),
            vec!["ZoneType".to_string()],
        ));
    }

    if let Some(requested) = requested {
        let current: BTreeSet<&str> = zone.links.endpoints.iter().map(Link::uri).collect();
        let wanted: BTreeSet<&str> = requested.iter().map(Link::uri).collect();
        let added_uris: Vec<String> = wanted.difference(&current).map(|s| s.to_string()).collect();
        let removed_uris: Vec<String> =
            current.difference(&wanted).map(|s| s.to_string()).collect();
        let added = endpoints(ctx, fabric_id, &added_uris).await?;
        let removed = endpoints(ctx, fabric_id, &removed_uris).await?;

        if !added.is_empty() || !removed.is_empty() {
            let parent = parent_of(ctx, fabric_id, &zone, ZoneType::ZoneOfZones).await?;
            let scope = Scope::resolve(ctx, fabric_id, &parent, &zone.name).await?;
            let pool_uri = zone.address_pool_uri().ok_or_else(|| {
                FabricError::value_conflict(
                    format!("Zone {zone_uri} has no address pool"),
                    vec![zone_uri.to_string()],
                )
            })?;
            let pool = ctx.repos.address_pools.get(fabric_id, pool_uri).await?;
            let (_, vlan) = pool_binding(&pool)?;
            for endpoint in &added {
                ensure_attachable(ctx, fabric_id, endpoint, &scope.zone_of_zones_uri).await?;
            }

            let mut plan = ProvisioningPlan::new(format!("update zone of endpoints {}", zone.name));
            for endpoint in &added {
                plan.extend(scope.bind(endpoint, vlan));
            }
            for endpoint in &removed {
                plan.extend(unbind(ctx, fabric_id, &scope, endpoint, zone_uri, true).await?);
            }
            plan.execute(ctx.controller.as_ref()).await?;

            zone.links.endpoints = wanted.iter().copied().map(Link::new).collect();
            for endpoint in added {
                set_membership(ctx, fabric_id, endpoint, &zone, true).await?;
            }
            for endpoint in removed {
                set_membership(ctx, fabric_id, endpoint, &zone, false).await?;
            }
        }
    }

    if request.description.is_some() {
        zone.description = request.description;
    }
    ctx.repos.zones.update(fabric_id, &zone).await?;
    Ok(zone)
}

/// Unbind every endpoint, remove the EPG and bridge domain, then unlink and
/// remove the zone.
pub(super) async fn delete(ctx: &Context, fabric_id: &str, zone: &Zone) -> Result<(), FabricError> {
    let parent = parent_of(ctx, fabric_id, zone, ZoneType::ZoneOfZones).await?;
    let scope = Scope::resolve(ctx, fabric_id, &parent, &zone.name).await?;
    let names = &scope.names;

    let mut members = Vec::new();
    for link in &zone.links.endpoints {
        if let Some(endpoint) = ctx.repos.endpoints.find(fabric_id, link.uri()).await? {
            members.push(endpoint);
        }
    }

    // Static paths go with the EPG subtree.
    let mut plan = ProvisioningPlan::new(format!("delete zone of endpoints {}", zone.name));
    for endpoint in &members {
        plan.extend(unbind(ctx, fabric_id, &scope, endpoint, &zone.odata_id, false).await?);
    }
    plan.delete("EPG", scope.epg_dn()).delete(
        "bridge domain",
        dn::bridge_domain(&names.tenant, &names.bridge_domain),
    );
    plan.execute(ctx.controller.as_ref()).await?;

    detach_child(ctx, fabric_id, &parent.odata_id, &zone.odata_id).await?;
    if let Some(pool_uri) = zone.address_pool_uri() {
        set_pool_link(ctx, fabric_id, pool_uri, &zone.odata_id, false).await?;
    }
    for endpoint in members {
        set_membership(ctx, fabric_id, endpoint, zone, false).await?;
    }
    ctx.repos.zones.delete(fabric_id, &zone.odata_id).await
}

#[cfg(test)]
#[path = "zone_of_endpoints_tests.rs"]
mod zone_of_endpoints_tests;
