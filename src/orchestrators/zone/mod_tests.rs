// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `orchestrators/zone/mod.rs`

#[cfg(test)]
mod tests {
    use crate::events::EventKind;
    use crate::model::{ZoneRequest, ZoneType};
    use crate::orchestrators::test_support::{harness, tree, zone_request, FABRIC};
    use crate::orchestrators::zone::{
        create_zone, delete_zone, get_zone, list_zones, update_zone,
    };
    use crate::status_reasons::{
        REASON_ACTION_NOT_SUPPORTED, REASON_PROPERTY_MISSING, REASON_RESOURCE_CANNOT_BE_DELETED,
    };

    #[tokio::test]
    async fn test_create_requires_name_and_type() {
        let h = harness().await;

        let err = create_zone(
            &h.ctx,
            FABRIC,
            ZoneRequest {
                name: Some("  ".to_string()),
                ..zone_request("x", ZoneType::Default, None, None, &[])
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.reason(), REASON_PROPERTY_MISSING);

        let err = create_zone(
            &h.ctx,
            FABRIC,
            ZoneRequest {
                zone_type: None,
                ..zone_request("x", ZoneType::Default, None, None, &[])
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.reason(), REASON_PROPERTY_MISSING);
        assert!(h.controller.created_dns().is_empty());
    }

    #[tokio::test]
    async fn test_create_in_unknown_fabric() {
        let h = harness().await;

        let err = create_zone(
            &h.ctx,
            "missing",
            zone_request("blue", ZoneType::Default, None, None, &[]),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_patch_is_only_allowed_on_zone_of_endpoints() {
        let h = harness().await;
        let t = tree(&h).await;

        for zone in [&t.default, &t.zone_of_zones] {
            let err = update_zone(
                &h.ctx,
                FABRIC,
                &zone.id,
                ZoneRequest {
                    description: Some("new".to_string()),
                    ..ZoneRequest::default()
                },
            )
            .await
            .unwrap_err();

            assert_eq!(err.status_code(), 405, "PATCH on {}", zone.zone_type);
            assert_eq!(err.reason(), REASON_ACTION_NOT_SUPPORTED);
        }
    }

    #[tokio::test]
    async fn test_patch_unknown_zone() {
        let h = harness().await;

        let err = update_zone(&h.ctx, FABRIC, "nope", ZoneRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_zone_with_children_cannot_be_deleted() {
        let h = harness().await;
        let t = tree(&h).await;
        let zone_of_endpoints = create_zone(
            &h.ctx,
            FABRIC,
            zone_request(
                "frontend",
                ZoneType::ZoneOfEndpoints,
                Some(t.zone_of_zones.odata_id.as_str()),
                Some(t.gateway_pool.odata_id.as_str()),
                &[],
            ),
        )
        .await
        .unwrap();
        h.controller.clear_journal();

        for zone in [&t.default, &t.zone_of_zones] {
            let err = delete_zone(&h.ctx, FABRIC, &zone.id).await.unwrap_err();
            assert_eq!(err.status_code(), 406, "delete {}", zone.zone_type);
            assert_eq!(err.reason(), REASON_RESOURCE_CANNOT_BE_DELETED);
        }
        assert!(h.controller.deleted_dns().is_empty());

        // A ZoneOfEndpoints never has children, but the rule still holds if one is recorded.
        let mut leaf = get_zone(&h.ctx, FABRIC, &zone_of_endpoints.id).await.unwrap();
        leaf.links
            .contains_zones
            .insert(crate::model::Link::new("/redfish/v1/Fabrics/f1/Zones/stray"));
        h.ctx.repos.zones.update(FABRIC, &leaf).await.unwrap();
        let err = delete_zone(&h.ctx, FABRIC, &leaf.id).await.unwrap_err();
        assert_eq!(err.status_code(), 406);
    }

    #[tokio::test]
    async fn test_get_and_list() {
        let mut h = harness().await;
        let t = tree(&h).await;

        let zone = get_zone(&h.ctx, FABRIC, &t.zone_of_zones.id)
            .await
            .unwrap();
        assert_eq!(zone, t.zone_of_zones);
        assert_eq!(list_zones(&h.ctx, FABRIC).await.unwrap().len(), 2);

        let added: Vec<_> = h
            .drain_events()
            .into_iter()
            .filter(|e| e.event_type == EventKind::ResourceAdded)
            .map(|e| e.origin_of_condition)
            .collect();
        assert!(added.contains(&t.default.odata_id));
        assert!(added.contains(&t.zone_of_zones.odata_id));
    }

    #[tokio::test]
    async fn test_delete_unknown_zone() {
        let h = harness().await;

        let err = delete_zone(&h.ctx, FABRIC, "nope").await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }
}
