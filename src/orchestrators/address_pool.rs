// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! AddressPool lifecycle.
//!
//! A pool carries one VLAN range and, for pools meant for a ZoneOfEndpoints,
//! one gateway. Validation rules:
//!
//! - both VLAN bounds lie in `2..=4094` and outside the reserved `1002..=1005`
//! - `lower <= upper`
//! - a gateway must be IPv4 CIDR, requires a single-VLAN range and must be
//!   unique among the fabric's pools
//!
//! A pool can only be deleted once no zone links to it.

use ipnet::Ipv4Net;
use tracing::info;

use super::{new_resource_id, observed, RESOURCE_ADDRESS_POOL};
use crate::constants::{
    ADDRESS_POOLS_SEGMENT, ADDRESS_POOL_ODATA_TYPE, VLAN_MAX, VLAN_MIN, VLAN_RESERVED_END,
    VLAN_RESERVED_START,
};
use crate::context::Context;
use crate::errors::FabricError;
use crate::events::EventKind;
use crate::model::{
    address_pools_uri, AddressPool, AddressPoolLinks, AddressPoolRequest, EthernetBlock,
    Ipv4Block, Status, VlanRange,
};

/// True when `vlan` may be allocated.
#[must_use]
pub fn is_valid_vlan(vlan: u16) -> bool {
    (VLAN_MIN..=VLAN_MAX).contains(&vlan)
        && !(VLAN_RESERVED_START..=VLAN_RESERVED_END).contains(&vlan)
}

/// Check both bounds and their order.
///
/// # Errors
///
/// Returns [`FabricError::Validation`] for an out-of-range or reserved bound,
/// or for `lower > upper`.
pub fn validate_vlan_range(range: &VlanRange) -> Result<(), FabricError> {
    for (property, value) in [("Lower", range.lower), ("Upper", range.upper)] {
        if !is_valid_vlan(value) {
            return Err(FabricError::invalid_format(
                &format!("VLANIdentifierAddressRange.{property}"),
                &value.to_string(),
            ));
        }
    }
    if range.lower > range.upper {
        return Err(FabricError::value_conflict(
            format!(
                "VLAN range lower bound {} exceeds upper bound {}",
                range.lower, range.upper
            ),
            vec![range.lower.to_string(), range.upper.to_string()],
        ));
    }
    Ok(())
}

/// Parse a gateway in CIDR notation.
///
/// # Errors
///
/// Returns [`FabricError::Validation`] if `gateway` is not IPv4 CIDR.
pub fn parse_gateway(gateway: &str) -> Result<Ipv4Net, FabricError> {
    gateway
        .trim()
        .parse::<Ipv4Net>()
        .map_err(|_| FabricError::invalid_format("GatewayIPAddress", gateway))
}

/// URI of a pool.
#[must_use]
pub fn address_pool_uri(fabric_id: &str, pool_id: &str) -> String {
    format!("{}/{pool_id}", address_pools_uri(fabric_id))
}

/// Validate and store a new pool.
///
/// # Errors
///
/// Returns [`FabricError::NotFound`] for an unknown fabric, a validation error
/// for a malformed block and [`FabricError::Conflict`] for a duplicate gateway.
pub async fn create_address_pool(
    ctx: &Context,
    fabric_id: &str,
    request: AddressPoolRequest,
) -> Result<AddressPool, FabricError> {
    observed(
        RESOURCE_ADDRESS_POOL,
        "create",
        create_inner(ctx, fabric_id, request),
    )
    .await
}

async fn create_inner(
    ctx: &Context,
    fabric_id: &str,
    request: AddressPoolRequest,
) -> Result<AddressPool, FabricError> {
    ctx.repos.fabric(fabric_id).await?;

    let ipv4 = request
        .ethernet
        .and_then(|ethernet| ethernet.ipv4)
        .ok_or_else(|| FabricError::missing_property("Ethernet.IPv4"))?;
    let range = ipv4.vlan_identifier_address_range.ok_or_else(|| {
        FabricError::missing_property("Ethernet.IPv4.VLANIdentifierAddressRange")
    })?;
    validate_vlan_range(&range)?;

    let gateway = ipv4
        .gateway_ip_address
        .map(|gateway| gateway.trim().to_string())
        .filter(|gateway| !gateway.is_empty());
    let gateway_net = gateway.as_deref().map(parse_gateway).transpose()?;
    if gateway.is_some() && !range.is_single() {
        return Err(FabricError::value_conflict(
            format!("A pool with a gateway needs a single VLAN, got {range}"),
            vec![range.to_string(), "GatewayIPAddress".to_string()],
        ));
    }

    // Gateway uniqueness spans the whole collection.
    let _guard = ctx.locks.acquire(fabric_id, [ADDRESS_POOLS_SEGMENT]).await;

    if let (Some(gateway), Some(net)) = (gateway.as_deref(), gateway_net) {
        for existing in ctx.repos.address_pools.list(fabric_id).await? {
            let duplicate = existing
                .gateway()
                .and_then(|other| parse_gateway(other).ok())
                .is_some_and(|other| other.addr() == net.addr());
            if duplicate {
                return Err(FabricError::already_exists(
                    format!(
                        "Gateway {gateway} is already assigned to address pool {}",
                        existing.odata_id
                    ),
                    vec![gateway.to_string(), existing.odata_id],
                ));
            }
        }
    }

    let id = new_resource_id();
    let uri = address_pool_uri(fabric_id, &id);
    let pool = AddressPool {
        odata_id: uri.clone(),
        odata_type: ADDRESS_POOL_ODATA_TYPE.to_string(),
        name: request.name.unwrap_or_else(|| id.clone()),
        id,
        description: request.description,
        ethernet: EthernetBlock {
            ipv4: Some(Ipv4Block {
                gateway_ip_address: gateway,
                vlan_identifier_address_range: Some(range),
            }),
        },
        links: AddressPoolLinks::default(),
        status: Status::default(),
    };
    ctx.repos.address_pools.save(fabric_id, &pool).await?;

    info!(fabric_id = %fabric_id, uri = %uri, vlans = %range, "Created address pool");
    ctx.events.notify(EventKind::ResourceAdded, &uri);
    Ok(pool)
}

/// Delete a pool no zone links to.
///
/// # Errors
///
/// Returns [`FabricError::NotFound`] for an unknown pool and
/// [`FabricError::CannotDelete`] while zones link to it.
pub async fn delete_address_pool(
    ctx: &Context,
    fabric_id: &str,
    pool_id: &str,
) -> Result<(), FabricError> {
    observed(
        RESOURCE_ADDRESS_POOL,
        "delete",
        delete_inner(ctx, fabric_id, pool_id),
    )
    .await
}

async fn delete_inner(ctx: &Context, fabric_id: &str, pool_id: &str) -> Result<(), FabricError> {
    let uri = address_pool_uri(fabric_id, pool_id);
    let _guard = ctx.locks.acquire(fabric_id, [uri.as_str()]).await;

    let pool = ctx.repos.address_pools.get(fabric_id, &uri).await?;
    if !pool.links.zones.is_empty() {
        return Err(FabricError::cannot_delete(
            &uri,
            format!(
                "Address pool {uri} is still used by {} zone(s)",
                pool.links.zones.len()
            ),
        ));
    }

    ctx.repos.address_pools.delete(fabric_id, &uri).await?;
    info!(fabric_id = %fabric_id, uri = %uri, "Deleted address pool");
    ctx.events.notify(EventKind::ResourceRemoved, &uri);
    Ok(())
}

/// Read one pool.
///
/// # Errors
///
/// Returns [`FabricError::NotFound`] for an unknown pool.
pub async fn get_address_pool(
    ctx: &Context,
    fabric_id: &str,
    pool_id: &str,
) -> Result<AddressPool, FabricError> {
    ctx.repos
        .address_pools
        .get(fabric_id, &address_pool_uri(fabric_id, pool_id))
        .await
}

/// List the pools of a fabric.
///
/// # Errors
///
/// Returns [`FabricError::NotFound`] for an unknown fabric.
pub async fn list_address_pools(
    ctx: &Context,
    fabric_id: &str,
) -> Result<Vec<AddressPool>, FabricError> {
    ctx.repos.fabric(fabric_id).await?;
    ctx.repos.address_pools.list(fabric_id).await
}

#[cfg(test)]
#[path = "address_pool_tests.rs"]
mod address_pool_tests;
