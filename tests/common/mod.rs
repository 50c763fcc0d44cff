// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Common fixtures for the scenario tests

#![allow(dead_code)]

use std::sync::Arc;

use fabric_provisioner::context::Context;
use fabric_provisioner::controller::memory::MemoryController;
use fabric_provisioner::events::{EventPublisher, EventQueue};
use fabric_provisioner::model::{
    AddressPoolRequest, EndpointRequest, EthernetBlock, Fabric, Ipv4Block, Link, Redundancy,
    VlanRange, ZoneRequest, ZoneRequestLinks, ZoneType,
};
use fabric_provisioner::store::MemoryStore;

pub const FABRIC: &str = "fabric1";

/// Context over in-memory collaborators with one seeded fabric.
pub struct TestFabric {
    pub ctx: Context,
    pub controller: Arc<MemoryController>,
    pub events: EventQueue,
}

pub async fn test_fabric() -> TestFabric {
    let controller = Arc::new(MemoryController::new());
    let (publisher, events) = EventPublisher::channel(1024);
    let ctx = Context::new(Arc::new(MemoryStore::new()), controller.clone(), publisher);
    let switches = [101, 102, 103, 104]
        .iter()
        .map(|node| format!("5c7d1e:{node}"))
        .collect();
    ctx.repos
        .fabrics
        .save(FABRIC, &Fabric::new(FABRIC, "1", switches))
        .await
        .expect("seed fabric");

    TestFabric {
        ctx,
        controller,
        events,
    }
}

/// URI of `eth1-<port>` on switch `node`.
pub fn port(node: u32, port: u32) -> String {
    format!("/redfish/v1/Fabrics/{FABRIC}/Switches/5c7d1e:{node}/Ports/5c7d1e:eth1-{port}")
}

pub fn address_pool(lower: u16, upper: u16, gateway: Option<&str>) -> AddressPoolRequest {
    AddressPoolRequest {
        ethernet: Some(EthernetBlock {
            ipv4: Some(Ipv4Block {
                gateway_ip_address: gateway.map(str::to_string),
                vlan_identifier_address_range: Some(VlanRange { lower, upper }),
            }),
        }),
        ..AddressPoolRequest::default()
    }
}

pub fn endpoint(name: &str, ports: &[String]) -> EndpointRequest {
    EndpointRequest {
        name: Some(name.to_string()),
        description: None,
        redundancy: vec![Redundancy {
            mode: Some("Sharing".to_string()),
            redundancy_set: ports.iter().map(Link::new).collect(),
        }],
    }
}

pub fn zone(
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
