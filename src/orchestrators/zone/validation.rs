// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Request and reference checks shared by the zone types.

use crate::context::Context;
use crate::errors::FabricError;
use crate::model::{Link, Zone, ZoneType};

/// Trimmed, non-empty zone name.
pub(super) fn zone_name(name: Option<&str>) -> Result<String, FabricError> {
    name.map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| FabricError::missing_property("Name"))
}

/// The one link of a list that must hold exactly one.
pub(super) fn single_link<'a>(links: &'a [Link], property: &str) -> Result<&'a Link, FabricError> {
    match links {
        [] => Err(FabricError::missing_property(property)),
        [link] => Ok(link),
        _ => Err(FabricError::value_conflict(
            format!("{property} must hold exactly one link, got {}", links.len()),
            vec![property.to_string(), links.len().to_string()],
        )),
    }
}

/// Reject a non-empty link list on a zone type that does not use it.
pub(super) fn no_links(links: &[Link], property: &str, zone_type: ZoneType) -> Result<(), FabricError> {
    if links.is_empty() {
        Ok(())
    } else {
        Err(FabricError::value_conflict(
            format!("A {zone_type} zone does not accept {property}"),
            vec![property.to_string(), zone_type.to_string()],
        ))
    }
}

/// Load a zone and check its type.
pub(super) async fn zone_of_type(
    ctx: &Context,
    fabric_id: &str,
    uri: &str,
    expected: ZoneType,
) -> Result<Zone, FabricError> {
    let zone = ctx.repos.zones.get(fabric_id, uri).await?;
    if zone.zone_type != expected {
        return Err(FabricError::value_conflict(
            format!(
                "Zone {uri} is a {} zone, expected {expected}",
                zone.zone_type
            ),
            vec![uri.to_string(), zone.zone_type.to_string()],
        ));
    }
    Ok(zone)
}

/// The parent of a zone, checked against its expected type.
pub(super) async fn parent_of(
    ctx: &Context,
    fabric_id: &str,
    zone: &Zone,
    expected: ZoneType,
) -> Result<Zone, FabricError> {
    let parent_uri = zone.parent_uri().ok_or_else(|| {
        FabricError::value_conflict(
            format!("Zone {} has no parent zone", zone.odata_id),
            vec![zone.odata_id.clone()],
        )
    })?;
    zone_of_type(ctx, fabric_id, parent_uri, expected).await
}

