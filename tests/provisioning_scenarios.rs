// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! End-to-end provisioning scenarios against in-memory collaborators.
//!
//! Each test drives the public orchestration API the way the HTTP layer does
//! and checks both the stored resources and the controller objects.
//!
//! Run with: cargo test --test provisioning_scenarios

mod common;

use common::{address_pool, endpoint, port, test_fabric, zone, FABRIC};
use fabric_provisioner::events::EventKind;
use fabric_provisioner::model::{ZoneRequest, ZoneType};
use fabric_provisioner::orchestrators::address_pool::{
    create_address_pool, delete_address_pool, get_address_pool, is_valid_vlan,
};
use fabric_provisioner::orchestrators::endpoint::{create_endpoint, delete_endpoint, get_endpoint};
use fabric_provisioner::orchestrators::zone::{create_zone, delete_zone, get_zone, update_zone};
use fabric_provisioner::status_reasons::{
    REASON_ACTION_NOT_SUPPORTED, REASON_PROPERTY_VALUE_CONFLICT, REASON_RESOURCE_ALREADY_EXISTS,
    REASON_RESOURCE_CANNOT_BE_DELETED,
};

const VPC_GROUP: &str = "101-102_1-5-ports-6-PolGrp";

// ============================================================================
// Address pools
// ============================================================================

#[test]
fn vlan_bounds_match_the_permitted_set() {
    for vlan in 0..=u16::MAX {
        let expected = (2..=4094).contains(&vlan) && !(1002..=1005).contains(&vlan);
        assert_eq!(is_valid_vlan(vlan), expected, "VLAN {vlan}");
    }
}

#[tokio::test]
async fn reserved_vlan_bound_is_rejected_without_storing() {
    let f = test_fabric().await;

    for (lower, upper) in [(1, 10), (1000, 1003), (1005, 1010), (4000, 4095)] {
        let err = create_address_pool(&f.ctx, FABRIC, address_pool(lower, upper, None))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400, "{lower}-{upper}");
    }
    assert!(f.ctx.repos.address_pools.list(FABRIC).await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_gateway_conflicts() {
    let f = test_fabric().await;
    create_address_pool(&f.ctx, FABRIC, address_pool(10, 10, Some("10.1.0.1/24")))
        .await
        .unwrap();

    let err = create_address_pool(&f.ctx, FABRIC, address_pool(11, 11, Some("10.1.0.1/24")))
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 409);
    assert_eq!(err.reason(), REASON_RESOURCE_ALREADY_EXISTS);
}

#[tokio::test]
async fn concurrent_duplicate_gateways_admit_one() {
    let f = test_fabric().await;

    let (first, second) = tokio::join!(
        create_address_pool(&f.ctx, FABRIC, address_pool(20, 20, Some("10.2.0.1/24"))),
        create_address_pool(&f.ctx, FABRIC, address_pool(21, 21, Some("10.2.0.1/24"))),
    );

    assert_eq!(
        u8::from(first.is_ok()) + u8::from(second.is_ok()),
        1,
        "exactly one pool may claim the gateway"
    );
    assert_eq!(f.ctx.repos.address_pools.list(FABRIC).await.unwrap().len(), 1);
}

// ============================================================================
// Endpoints
// ============================================================================

#[tokio::test]
async fn repeated_port_is_a_value_conflict() {
    let f = test_fabric().await;

    let err = create_endpoint(&f.ctx, FABRIC, endpoint("web", &[port(101, 1), port(101, 1)]))
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 400);
    assert_eq!(err.reason(), REASON_PROPERTY_VALUE_CONFLICT);
    assert!(f.controller.created_dns().is_empty());
}

#[tokio::test]
async fn port_bound_to_another_endpoint_conflicts() {
    let f = test_fabric().await;
    create_endpoint(&f.ctx, FABRIC, endpoint("web", &[port(101, 1), port(101, 2)]))
        .await
        .unwrap();

    let err = create_endpoint(&f.ctx, FABRIC, endpoint("db", &[port(101, 2)]))
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 409);
    assert_eq!(err.reason(), REASON_RESOURCE_ALREADY_EXISTS);
}

// ============================================================================
// Zones
// ============================================================================

#[tokio::test]
async fn patch_is_limited_to_zones_of_endpoints() {
    let f = test_fabric().await;
    let tenant = create_zone(&f.ctx, FABRIC, zone("red", ZoneType::Default, None, None, &[]))
        .await
        .unwrap();
    let pool = create_address_pool(&f.ctx, FABRIC, address_pool(100, 199, None))
        .await
        .unwrap();
    let app = create_zone(
        &f.ctx,
        FABRIC,
        zone(
            "erp",
            ZoneType::ZoneOfZones,
            Some(tenant.odata_id.as_str()),
            Some(pool.odata_id.as_str()),
            &[],
        ),
    )
    .await
    .unwrap();

    for target in [&tenant, &app] {
        let err = update_zone(
            &f.ctx,
            FABRIC,
            &target.id,
            ZoneRequest {
                description: Some("changed".to_string()),
                ..ZoneRequest::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.status_code(), 405);
        assert_eq!(err.reason(), REASON_ACTION_NOT_SUPPORTED);
    }
}

/// Default zone, ZoneOfZones over VLANs 10-20, a vPC endpoint and a
/// ZoneOfEndpoints on VLAN 10, then teardown in reverse order.
#[tokio::test]
async fn full_zone_tree_round_trip() {
    let mut f = test_fabric().await;
    let ctx = &f.ctx;

    let tenant = create_zone(ctx, FABRIC, zone("acme", ZoneType::Default, None, None, &[]))
        .await
        .unwrap();
    let range_pool = create_address_pool(ctx, FABRIC, address_pool(10, 20, None))
        .await
        .unwrap();
    let app = create_zone(
        ctx,
        FABRIC,
        zone(
            "shop",
            ZoneType::ZoneOfZones,
            Some(tenant.odata_id.as_str()),
            Some(range_pool.odata_id.as_str()),
            &[],
        ),
    )
    .await
    .unwrap();
    assert!(f
        .controller
        .contains("uni/infra/vlanns-[shop-VlanPool]-static/from-[vlan-10]-to-[vlan-20]"));

    let gateway_pool = create_address_pool(ctx, FABRIC, address_pool(10, 10, Some("10.0.0.1/24")))
        .await
        .unwrap();
    let server = create_endpoint(
        ctx,
        FABRIC,
        endpoint(
            "server",
            &[port(101, 5), port(101, 6), port(102, 5), port(102, 6)],
        ),
    )
    .await
    .unwrap();
    assert_eq!(server.aci_policy_group.policy_group_name, VPC_GROUP);

    let tier = create_zone(
        ctx,
        FABRIC,
        zone(
            "frontend",
            ZoneType::ZoneOfEndpoints,
            Some(app.odata_id.as_str()),
            Some(gateway_pool.odata_id.as_str()),
            &[server.odata_id.as_str()],
        ),
    )
    .await
    .unwrap();

    let path = f
        .controller
        .get(&format!(
            "uni/tn-acme/ap-shop/epg-frontend-EPG/rspathAtt-[topology/pod-1/protpaths-101-102/pathep-[{VPC_GROUP}]]"
        ))
        .expect("static path");
    assert_eq!(path.attribute("encap"), Some("vlan-10"));
    assert!(f
        .controller
        .contains("uni/tn-acme/BD-frontend/subnet-[10.0.0.1/24]"));

    // Everything in use refuses deletion and stays untouched.
    for err in [
        delete_zone(ctx, FABRIC, &tenant.id).await.unwrap_err(),
        delete_zone(ctx, FABRIC, &app.id).await.unwrap_err(),
        delete_address_pool(ctx, FABRIC, &gateway_pool.id).await.unwrap_err(),
        delete_endpoint(ctx, FABRIC, &server.id).await.unwrap_err(),
    ] {
        assert_eq!(err.status_code(), 406, "{err}");
        assert_eq!(err.reason(), REASON_RESOURCE_CANNOT_BE_DELETED);
    }
    assert_eq!(
        get_endpoint(ctx, FABRIC, &server.id).await.unwrap().links.zones.len(),
        1
    );

    delete_zone(ctx, FABRIC, &tier.id).await.unwrap();
    delete_zone(ctx, FABRIC, &app.id).await.unwrap();

    let tenant = get_zone(ctx, FABRIC, &tenant.id).await.unwrap();
    assert!(tenant.links.contains_zones.is_empty());
    assert!(get_address_pool(ctx, FABRIC, &range_pool.id)
        .await
        .unwrap()
        .links
        .zones
        .is_empty());
    assert!(get_address_pool(ctx, FABRIC, &gateway_pool.id)
        .await
        .unwrap()
        .links
        .zones
        .is_empty());

    delete_endpoint(ctx, FABRIC, &server.id).await.unwrap();
    delete_address_pool(ctx, FABRIC, &gateway_pool.id).await.unwrap();
    delete_address_pool(ctx, FABRIC, &range_pool.id).await.unwrap();
    delete_zone(ctx, FABRIC, &tenant.id).await.unwrap();
    assert!(!f.controller.contains("uni/tn-acme"));

    let mut removed = Vec::new();
    while let Some(event) = f.events.try_recv() {
        if event.event_type == EventKind::ResourceRemoved {
            removed.push(event.origin_of_condition);
        }
    }
    assert_eq!(removed.len(), 6);
    assert!(removed.contains(&tier.odata_id));
}
