// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Default zones: the roots of the zone tree, one controller tenant each.
//!
//! Tenant names are global on the controller, so a Default zone name must be
//! unique across every fabric, not just its own.

use crate::builder::{self, ProvisioningPlan};
use crate::context::Context;
use crate::errors::FabricError;
use crate::model::{Zone, ZoneLinks, ZoneRequestLinks, ZoneType};
use crate::naming::dn;

use super::validation::no_links;
use super::new_zone;

/// Lock scope of Default zone names, which span fabrics
const GLOBAL_SCOPE: &str = "*";

/// Provision the tenant of a new Default zone and store the zone.
pub(super) async fn create(
    ctx: &Context,
    fabric_id: &str,
    name: &str,
    description: Option<String>,
    links: &ZoneRequestLinks,
) -> Result<Zone, FabricError> {
    no_links(&links.contained_by_zones, "Links.ContainedByZones", ZoneType::Default)?;
    no_links(&links.address_pools, "Links.AddressPools", ZoneType::Default)?;
    no_links(&links.endpoints, "Links.Endpoints", ZoneType::Default)?;

    let _guard = ctx
        .locks
        .acquire(GLOBAL_SCOPE, [format!("{}:{name}", ZoneType::Default)])
        .await;

    let taken = ctx
        .repos
        .zones
        .list_all()
        .await?
        .into_iter()
        .find(|zone| zone.zone_type == ZoneType::Default && zone.name == name);
    if let Some(existing) = taken {
        return Err(FabricError::already_exists(
            format!("Default zone name {name} is already used by {}", existing.odata_id),
            vec![name.to_string(), existing.odata_id],
        ));
    }

    let mut plan = ProvisioningPlan::new(format!("default zone {name}"));
    plan.ensure("tenant", builder::tenant(name));
    plan.execute(ctx.controller.as_ref()).await?;

    let zone = new_zone(
        fabric_id,
        name,
        description,
        ZoneType::Default,
        ZoneLinks::default(),
    );
    ctx.repos.zones.save(fabric_id, &zone).await?;
    Ok(zone)
}

/// Remove the tenant of a childless Default zone, then the zone.
pub(super) async fn delete(ctx: &Context, fabric_id: &str, zone: &Zone) -> Result<(), FabricError> {
    let mut plan = ProvisioningPlan::new(format!("delete default zone {}", zone.name));
    plan.delete("tenant", dn::tenant(&zone.name));
    plan.execute(ctx.controller.as_ref()).await?;

    ctx.repos.zones.delete(fabric_id, &zone.odata_id).await
}

#[cfg(test)]
#[path = "default_tests.rs"]
mod default_tests;
