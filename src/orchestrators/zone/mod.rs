// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone lifecycle.
//!
//! Zones form a two-level tree, and each level owns different controller objects:
//!
//! ```text
//! Default            tenant
//! └── ZoneOfZones    application profile, VRF, contract, domain, VLAN pool, AEP
//!     └── ZoneOfEndpoints   bridge domain, subnet, EPG, static paths
//! ```
//!
//! [`create_zone`] and [`delete_zone`] dispatch on the zone type to
//! [`default`], [`zone_of_zones`] and [`zone_of_endpoints`]. Only a
//! ZoneOfEndpoints can be updated. A zone with children can never be deleted.

pub mod default;
pub mod zone_of_endpoints;
pub mod zone_of_zones;
mod validation;

use std::collections::BTreeSet;

use tracing::info;

use super::{new_resource_id, observed, RESOURCE_ZONE};
use crate::constants::ZONE_ODATA_TYPE;
use crate::context::Context;
use crate::errors::FabricError;
use crate::events::EventKind;
use crate::model::{zones_uri, Link, Status, Zone, ZoneLinks, ZoneRequest, ZoneType};

/// URI of a zone.
#[must_use]
pub fn zone_uri(fabric_id: &str, zone_id: &str) -> String {
    format!("{}/{zone_id}", zones_uri(fabric_id))
}

/// A fresh zone record with a new identifier.
fn new_zone(
    fabric_id: &str,
    name: &str,
    description: Option<String>,
    zone_type: ZoneType,
    links: ZoneLinks,
) -> Zone {
    let id = new_resource_id();
    Zone {
        odata_id: zone_uri(fabric_id, &id),
        odata_type: ZONE_ODATA_TYPE.to_string(),
        id,
        name: name.to_string(),
        description,
        zone_type,
        links,
        status: Status::default(),
    }
}

// ============================================================================
// Cross-resource link bookkeeping
// ============================================================================

/// Record `child` in the parent's `ContainsZones`.
async fn attach_child(
    ctx: &Context,
    fabric_id: &str,
    mut parent: Zone,
    child_uri: &str,
) -> Result<(), FabricError> {
    parent.links.contains_zones.insert(Link::new(child_uri));
    ctx.repos.zones.update(fabric_id, &parent).await
}

/// Drop `child` from the parent's `ContainsZones`. A vanished parent is ignored.
async fn detach_child(
    ctx: &Context,
    fabric_id: &str,
    parent_uri: &str,
    child_uri: &str,
) -> Result<(), FabricError> {
    if let Some(mut parent) = ctx.repos.zones.find(fabric_id, parent_uri).await? {
        if parent.links.contains_zones.remove(&Link::new(child_uri)) {
            ctx.repos.zones.update(fabric_id, &parent).await?;
        }
    }
    Ok(())
}

/// Add or remove `zone_uri` in the `Links.Zones` of a pool.
async fn set_pool_link(
    ctx: &Context,
    fabric_id: &str,
    pool_uri: &str,
    zone_uri: &str,
    linked: bool,
) -> Result<(), FabricError> {
    let Some(mut pool) = ctx.repos.address_pools.find(fabric_id, pool_uri).await? else {
        return Ok(());
    };
    let link = Link::new(zone_uri);
    let changed = if linked {
        pool.links.zones.insert(link)
    } else {
        pool.links.zones.remove(&link)
    };
    if changed {
        ctx.repos.address_pools.update(fabric_id, &pool).await?;
    }
    Ok(())
}

/// Lock keys touched by a delete or update of `zone`.
fn zone_lock_keys(zone: &Zone) -> BTreeSet<String> {
    let mut keys = BTreeSet::new();
    keys.insert(zone.odata_id.clone());
    keys.extend(zone.links.contained_by_zones.iter().map(|l| l.odata_id.clone()));
    keys.extend(zone.links.address_pools.iter().map(|l| l.odata_id.clone()));
    keys.extend(zone.links.endpoints.iter().map(|l| l.odata_id.clone()));
    keys
}

// ============================================================================
// Operations
// ============================================================================

/// Create a zone of any type.
///
/// # Errors
///
/// - [`FabricError::Validation`] for a missing name or type, or malformed links
/// - [`FabricError::NotFound`] for an unknown fabric or referenced resource
/// - [`FabricError::Conflict`] when the name or a controller object is taken
/// - [`FabricError::Upstream`] when the controller fails
pub async fn create_zone(
    ctx: &Context,
    fabric_id: &str,
    request: ZoneRequest,
) -> Result<Zone, FabricError> {
    observed(RESOURCE_ZONE, "create", create_inner(ctx, fabric_id, request)).await
}

async fn create_inner(
    ctx: &Context,
    fabric_id: &str,
    request: ZoneRequest,
) -> Result<Zone, FabricError> {
    ctx.repos.fabric(fabric_id).await?;

    let name = validation::zone_name(request.name.as_deref())?;
    let zone_type = request
        .zone_type
        .ok_or_else(|| FabricError::missing_property("ZoneType"))?;
    let links = request.links.unwrap_or_default();
    let description = request.description;

    let zone = match zone_type {
        ZoneType::Default => default::create(ctx, fabric_id, &name, description, &links).await?,
        ZoneType::ZoneOfZones => {
            zone_of_zones::create(ctx, fabric_id, &name, description, &links).await?
        }
        ZoneType::ZoneOfEndpoints => {
            zone_of_endpoints::create(ctx, fabric_id, &name, description, &links).await?
        }
    };

    info!(
        fabric_id = %fabric_id,
        uri = %zone.odata_id,
        zone_type = %zone.zone_type,
        name = %zone.name,
        "Created zone"
    );
    ctx.events.notify(EventKind::ResourceAdded, &zone.odata_id);
    Ok(zone)
}

/// Update a ZoneOfEndpoints' description and member endpoints.
///
/// # Errors
///
/// Returns [`FabricError::NotFound`] for an unknown zone or endpoint,
/// [`FabricError::MethodNotAllowed`] for any other zone type,
/// [`FabricError::Validation`] for a rename and [`FabricError::Upstream`] when
/// the controller fails.
pub async fn update_zone(
    ctx: &Context,
    fabric_id: &str,
    zone_id: &str,
    request: ZoneRequest,
) -> Result<Zone, FabricError> {
    observed(
        RESOURCE_ZONE,
        "update",
        update_inner(ctx, fabric_id, zone_id, request),
    )
    .await
}

async fn update_inner(
    ctx: &Context,
    fabric_id: &str,
    zone_id: &str,
    request: ZoneRequest,
) -> Result<Zone, FabricError> {
    let uri = zone_uri(fabric_id, zone_id);
    let zone = ctx.repos.zones.get(fabric_id, &uri).await?;
    if zone.zone_type != ZoneType::ZoneOfEndpoints {
        return Err(FabricError::MethodNotAllowed {
            action: "PATCH".to_string(),
            target: uri,
        });
    }

    let zone = zone_of_endpoints::update(ctx, fabric_id, &uri, request).await?;

    info!(fabric_id = %fabric_id, uri = %uri, "Updated zone");
    ctx.events.notify(EventKind::ResourceUpdated, &uri);
    Ok(zone)
}

/// Delete a childless zone and every controller object it owns.
///
/// # Errors
///
/// Returns [`FabricError::NotFound`] for an unknown zone,
/// [`FabricError::CannotDelete`] while the zone has children and
/// [`FabricError::Upstream`] when the controller fails.
pub async fn delete_zone(ctx: &Context, fabric_id: &str, zone_id: &str) -> Result<(), FabricError> {
    observed(RESOURCE_ZONE, "delete", delete_inner(ctx, fabric_id, zone_id)).await
}

async fn delete_inner(ctx: &Context, fabric_id: &str, zone_id: &str) -> Result<(), FabricError> {
    let uri = zone_uri(fabric_id, zone_id);
    let snapshot = ctx.repos.zones.get(fabric_id, &uri).await?;
    let _guard = ctx
        .locks
        .acquire(fabric_id, zone_lock_keys(&snapshot))
        .await;

    let zone = ctx.repos.zones.get(fabric_id, &uri).await?;
    if zone.contains_zones_count() > 0 {
        return Err(FabricError::cannot_delete(
            &uri,
            format!(
                "Zone {uri} still contains {} zone(s)",
                zone.contains_zones_count()
            ),
        ));
    }

    match zone.zone_type {
        ZoneType::Default => default::delete(ctx, fabric_id, &zone).await?,
        ZoneType::ZoneOfZones => zone_of_zones::delete(ctx, fabric_id, &zone).await?,
        ZoneType::ZoneOfEndpoints => zone_of_endpoints::delete(ctx, fabric_id, &zone).await?,
    }

    info!(fabric_id = %fabric_id, uri = %uri, zone_type = %zone.zone_type, "Deleted zone");
    ctx.events.notify(EventKind::ResourceRemoved, &uri);
    Ok(())
}

/// Read one zone.
///
/// # Errors
///
/// Returns [`FabricError::NotFound`] for an unknown zone.
pub async fn get_zone(ctx: &Context, fabric_id: &str, zone_id: &str) -> Result<Zone, FabricError> {
    ctx.repos
        .zones
        .get(fabric_id, &zone_uri(fabric_id, zone_id))
        .await
}

/// List the zones of a fabric.
///
/// # Errors
///
/// Returns [`FabricError::NotFound`] for an unknown fabric.
pub async fn list_zones(ctx: &Context, fabric_id: &str) -> Result<Vec<Zone>, FabricError> {
    ctx.repos.fabric(fabric_id).await?;
    ctx.repos.zones.list(fabric_id).await
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod mod_tests;
