// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! ZoneOfZones: an application profile and VRF under the parent tenant.
//!
//! Besides the tenant-side objects, a ZoneOfZones owns the physical domain,
//! VLAN pool and attachable entity profile its ZoneOfEndpoints children attach
//! to. Their DNs are cached as [`AciDomainData`] keyed by the zone URI.

use tracing::debug;

use crate::builder::{ensure_vacant, zone_of_zones_plan, ProvisioningPlan};
use crate::constants::DEFAULT_FILTER_NAME;
use crate::context::Context;
use crate::errors::FabricError;
use crate::model::{
    AciDomainData, Link, VlanRange, Zone, ZoneLinks, ZoneRequestLinks, ZoneType,
};
use crate::naming::{dn, ZoneOfZonesNames};

use super::validation::{no_links, parent_of, single_link, zone_of_type};
use super::{attach_child, detach_child, new_zone, set_pool_link};

/// Domain identifiers of the objects provisioned for `names`.
#[must_use]
pub fn domain_data(zone_uri: &str, names: &ZoneOfZonesNames, range: VlanRange) -> AciDomainData {
    AciDomainData {
        zone_uri: zone_uri.to_string(),
        physical_domain_dn: dn::physical_domain(&names.physical_domain),
        vlan_pool_dn: dn::vlan_pool(&names.vlan_pool),
        entity_profile_dn: dn::entity_profile(&names.entity_profile),
        vlan_range: range,
    }
}

/// Provision and store a ZoneOfZones under a Default zone.
pub(super) async fn create(
    ctx: &Context,
    fabric_id: &str,
    name: &str,
    description: Option<String>,
    links: &ZoneRequestLinks,
) -> Result<Zone, FabricError> {
    let parent_link = single_link(&links.contained_by_zones, "Links.ContainedByZones")?;
    let pool_link = single_link(&links.address_pools, "Links.AddressPools")?;
    no_links(&links.endpoints, "Links.Endpoints", ZoneType::ZoneOfZones)?;

    let _guard = ctx
        .locks
        .acquire(fabric_id, [parent_link.uri(), pool_link.uri()])
        .await;

    let parent = zone_of_type(ctx, fabric_id, parent_link.uri(), ZoneType::Default).await?;
    let mut pool = ctx.repos.address_pools.get(fabric_id, pool_link.uri()).await?;
    let range = pool.vlan_range().ok_or_else(|| {
        FabricError::value_conflict(
            format!("Address pool {} has no VLAN range", pool.odata_id),
            vec![pool.odata_id.clone()],
        )
    })?;

    let names = ZoneOfZonesNames::new(&parent.name, name);
    let controller = ctx.controller.as_ref();
    ensure_vacant(
        controller,
        &dn::application_profile(&names.tenant, &names.application_profile),
        "Application profile",
    )
    .await?;
    ensure_vacant(controller, &dn::vrf(&names.tenant, &names.vrf), "VRF").await?;

    zone_of_zones_plan(&names, DEFAULT_FILTER_NAME, range)
        .execute(controller)
        .await?;

    let mut zone_links = ZoneLinks::default();
    zone_links.contained_by_zones.insert(parent_link.clone());
    zone_links.address_pools.insert(pool_link.clone());
    let zone = new_zone(fabric_id, name, description, ZoneType::ZoneOfZones, zone_links);

    ctx.repos.zones.save(fabric_id, &zone).await?;
    attach_child(ctx, fabric_id, parent, &zone.odata_id).await?;
    pool.links.zones.insert(Link::new(&zone.odata_id));
    ctx.repos.address_pools.update(fabric_id, &pool).await?;
    ctx.repos
        .zone_domains
        .save(fabric_id, &domain_data(&zone.odata_id, &names, range))
        .await?;

    Ok(zone)
}

/// Remove the objects of a childless ZoneOfZones, then unlink and remove it.
pub(super) async fn delete(ctx: &Context, fabric_id: &str, zone: &Zone) -> Result<(), FabricError> {
    let parent = parent_of(ctx, fabric_id, zone, ZoneType::Default).await?;
    let names = ZoneOfZonesNames::new(&parent.name, &zone.name);
    let tenant = names.tenant.as_str();

    let mut plan = ProvisioningPlan::new(format!("delete zone of zones {}", zone.name));
    plan.delete(
        "application profile",
        dn::application_profile(tenant, &names.application_profile),
    )
    .delete("VRF", dn::vrf(tenant, &names.vrf))
    .delete("contract", dn::contract(tenant, &names.contract))
    .delete("entity profile", dn::entity_profile(&names.entity_profile))
    .delete("physical domain", dn::physical_domain(&names.physical_domain))
    .delete("VLAN pool", dn::vlan_pool(&names.vlan_pool));
    plan.execute(ctx.controller.as_ref()).await?;

    if let Some(pool_uri) = zone.address_pool_uri() {
        set_pool_link(ctx, fabric_id, pool_uri, &zone.odata_id, false).await?;
    }
    ctx.repos.zones.delete(fabric_id, &zone.odata_id).await?;
    match ctx.repos.zone_domains.delete(fabric_id, &zone.odata_id).await {
        Ok(()) => {}
        Err(FabricError::NotFound { .. }) => {
            debug!(uri = %zone.odata_id, "Zone domain cross reference already gone");
        }
        Err(e) => return Err(e),
    }
    detach_child(ctx, fabric_id, &parent.odata_id, &zone.odata_id).await
}

#[cfg(test)]
#[path = "zone_of_zones_tests.rs"]
mod zone_of_zones_tests;
