// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `orchestrators/zone/default.rs`

#[cfg(test)]
mod tests {
    use crate::model::{Fabric, ZoneType};
    use crate::orchestrators::test_support::{harness, zone_request, FABRIC};
    use crate::orchestrators::zone::{create_zone, delete_zone, get_zone};
    use crate::status_reasons::{REASON_PROPERTY_VALUE_CONFLICT, REASON_RESOURCE_ALREADY_EXISTS};

    #[tokio::test]
    async fn test_create_default_zone_creates_tenant() {
        let h = harness().await;

        let zone = create_zone(
            &h.ctx,
            FABRIC,
            zone_request("blue", ZoneType::Default, None, None, &[]),
        )
        .await
        .unwrap();

        assert_eq!(zone.zone_type, ZoneType::Default);
        assert_eq!(zone.status.health, "OK");
        assert!(zone.links.contained_by_zones.is_empty());
        assert_eq!(h.controller.created_dns(), vec!["uni/tn-blue"]);
        assert_eq!(get_zone(&h.ctx, FABRIC, &zone.id).await.unwrap(), zone);
    }

    #[tokio::test]
    async fn test_existing_tenant_is_adopted() {
        let h = harness().await;
        h.controller.insert(crate::builder::tenant("blue"));

        create_zone(
            &h.ctx,
            FABRIC,
            zone_request("blue", ZoneType::Default, None, None, &[]),
        )
        .await
        .unwrap();

        assert!(h.controller.created_dns().is_empty());
    }

    #[tokio::test]
    async fn test_name_is_unique_across_fabrics() {
        let h = harness().await;
        h.ctx
            .repos
            .fabrics
            .save("f2", &Fabric::new("f2", "2", Vec::new()))
            .await
            .unwrap();
        create_zone(
            &h.ctx,
            FABRIC,
            zone_request("blue", ZoneType::Default, None, None, &[]),
        )
        .await
        .unwrap();

        let err = create_zone(
            &h.ctx,
            "f2",
            zone_request("blue", ZoneType::Default, None, None, &[]),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status_code(), 409);
        assert_eq!(err.reason(), REASON_RESOURCE_ALREADY_EXISTS);

        create_zone(
            &h.ctx,
            "f2",
            zone_request("green", ZoneType::Default, None, None, &[]),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_default_zone_rejects_parent() {
        let h = harness().await;

        let err = create_zone(
            &h.ctx,
            FABRIC,
            zone_request(
                "blue",
                ZoneType::Default,
                Some("/redfish/v1/Fabrics/f1/Zones/other"),
                None,
                &[],
            ),
        )
        .await
        .unwrap_err();

        assert_eq!(err.reason(), REASON_PROPERTY_VALUE_CONFLICT);
    }

    #[tokio::test]
    async fn test_delete_default_zone_removes_tenant() {
        let h = harness().await;
        let zone = create_zone(
            &h.ctx,
            FABRIC,
            zone_request("blue", ZoneType::Default, None, None, &[]),
        )
        .await
        .unwrap();

        delete_zone(&h.ctx, FABRIC, &zone.id).await.unwrap();

        assert_eq!(h.controller.deleted_dns(), vec!["uni/tn-blue"]);
        assert!(!h.controller.contains("uni/tn-blue"));
        assert_eq!(
            get_zone(&h.ctx, FABRIC, &zone.id)
                .await
                .unwrap_err()
                .status_code(),
            404
        );
    }
}
