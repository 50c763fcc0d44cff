// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Fixtures shared by the orchestrator unit tests.

use std::sync::Arc;

use crate::context::Context;
use crate::controller::memory::MemoryController;
use crate::events::{EventPublisher, EventQueue};
use crate::model::{
    AddressPool, AddressPoolRequest, Endpoint, EndpointRequest, EthernetBlock, Fabric, Ipv4Block,
    Link, Redundancy, VlanRange, Zone, ZoneRequest, ZoneRequestLinks, ZoneType,
};
use crate::orchestrators::address_pool::create_address_pool;
use crate::orchestrators::endpoint::create_endpoint;
use crate::orchestrators::zone::create_zone;
use crate::store::MemoryStore;

/// Fabric seeded by [`harness`]
pub(crate) const FABRIC: &str = "f1";
/// Pod of the seeded fabric
pub(crate) const POD: &str = "1";
/// Node IDs of the seeded fabric's switches
pub(crate) const NODES: [u32; 3] = [101, 102, 103];

/// A context over in-memory collaborators.
pub(crate) struct Harness {
    pub ctx: Context,
    pub controller: Arc<MemoryController>,
    pub store: Arc<MemoryStore>,
    pub events: EventQueue,
}

impl Harness {
    /// Every event published so far.
    pub(crate) fn drain_events(&mut self) -> Vec<crate::events::ResourceEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

/// Redfish identifier of the switch with `node`.
pub(crate) fn switch_id(node: u32) -> String {
    format!("a1b2c3:{node}")
}

/// URI of port `eth1-<port>` on switch `node` of the seeded fabric.
pub(crate) fn port_uri(node: u32, port: u32) -> String {
    format!(
        "/redfish/v1/Fabrics/{FABRIC}/Switches/{}/Ports/a1b2c3:eth1-{port}",
        switch_id(node)
    )
}

/// A context with one fabric holding [`NODES`].
pub(crate) async fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let controller = Arc::new(MemoryController::new());
    let (publisher, events) = EventPublisher::channel(256);
    let ctx = Context::new(store.clone(), controller.clone(), publisher);

    let fabric = Fabric::new(FABRIC, POD, NODES.iter().map(|n| switch_id(*n)).collect());
    ctx.repos
        .fabrics
        .save(FABRIC, &fabric)
        .await
        .expect("seed fabric");

    Harness {
        ctx,
        controller,
        store,
        events,
    }
}

pub(crate) fn pool_request(lower: u16, upper: u16, gateway: Option<&str>) -> AddressPoolRequest {
    AddressPoolRequest {
        name: None,
        description: None,
        ethernet: Some(EthernetBlock {
            ipv4: Some(Ipv4Block {
                gateway_ip_address: gateway.map(str::to_string),
                vlan_identifier_address_range: Some(VlanRange { lower, upper }),
            }),
        }),
    }
}

pub(crate) fn endpoint_request(name: &str, ports: &[String]) -> EndpointRequest {
    EndpointRequest {
        name: Some(name.to_string()),
        description: None,
        redundancy: vec![Redundancy {
            mode: Some("Sharing".to_string()),
            redundancy_set: ports.iter().map(Link::new).collect(),
        }],
    }
}

pub(crate) fn zone_request(
    name: &str,
    zone_type: ZoneType,
    parent: Option<&str>,
    pool: Option<&str>,
    endpoints: &[&str],
) -> ZoneRequest {
    ZoneRequest {
        name: Some(name.to_string()),
        description: None,
        zone_type: Some(zone_type),
        links: Some(ZoneRequestLinks {
            contained_by_zones: parent.into_iter().map(Link::new).collect(),
            address_pools: pool.into_iter().map(Link::new).collect(),
            endpoints: endpoints.iter().copied().map(Link::new).collect(),
        }),
    }
}

/// A Default zone with one ZoneOfZones, two endpoints and a gateway pool.
pub(crate) struct Tree {
    pub default: Zone,
    pub zone_of_zones: Zone,
    pub range_pool: AddressPool,
    pub gateway_pool: AddressPool,
    pub endpoints: Vec<Endpoint>,
}

/// Provision a [`Tree`]: tenant `blue`, ZoneOfZones `app` over VLANs 10-20,
/// a `10.0.0.1/24` pool on VLAN 10 and endpoints on switch 103 ports 1 and 2.
pub(crate) async fn tree(h: &Harness) -> Tree {
    let ctx = &h.ctx;
    let default = create_zone(ctx, FABRIC, zone_request("blue", ZoneType::Default, None, None, &[]))
        .await
        .expect("default zone");
    let range_pool = create_address_pool(ctx, FABRIC, pool_request(10, 20, None))
        .await
        .expect("range pool");
    let zone_of_zones = create_zone(
        ctx,
        FABRIC,
        zone_request(
            "app",
            ZoneType::ZoneOfZones,
            Some(default.odata_id.as_str()),
            Some(range_pool.odata_id.as_str()),
            &[],
        ),
    )
    .await
    .expect("zone of zones");
    let gateway_pool = create_address_pool(ctx, FABRIC, pool_request(10, 10, Some("10.0.0.1/24")))
        .await
        .expect("gateway pool");

    let mut endpoints = Vec::new();
    for (name, port) in [("web", 1), ("db", 2)] {
        let endpoint = create_endpoint(ctx, FABRIC, endpoint_request(name, &[port_uri(103, port)]))
            .await
            .expect("endpoint");
        endpoints.push(endpoint);
    }

    Tree {
        default: reload_zone(h, &default).await,
        zone_of_zones: reload_zone(h, &zone_of_zones).await,
        range_pool: reload_pool(h, &range_pool).await,
        gateway_pool,
        endpoints,
    }
}

pub(crate) async fn reload_zone(h: &Harness, zone: &Zone) -> Zone {
    h.ctx
        .repos
        .zones
        .get(FABRIC, &zone.odata_id)
        .await
        .expect("zone")
}

pub(crate) async fn reload_pool(h: &Harness, pool: &AddressPool) -> AddressPool {
    h.ctx
        .repos
        .address_pools
        .get(FABRIC, &pool.odata_id)
        .await
        .expect("pool")
}

pub(crate) async fn reload_endpoint(h: &Harness, endpoint: &Endpoint) -> Endpoint {
    h.ctx
        .repos
        .endpoints
        .get(FABRIC, &endpoint.odata_id)
        .await
        .expect("endpoint")
}
