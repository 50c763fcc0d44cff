// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `repository.rs`

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::errors::FabricError;
    use crate::model::Fabric;
    use crate::repository::{entity_key, Repositories};
    use crate::store::{MemoryStore, ResourceStore};

    fn fabric(id: &str) -> Fabric {
        Fabric::new(id, "1", vec![format!("{id}-sw:101")])
    }

    #[test]
    fn test_entity_key() {
        assert_eq!(
            entity_key("f1", "/redfish/v1/Fabrics/f1"),
            "f1:/redfish/v1/Fabrics/f1"
        );
    }

    #[tokio::test]
    async fn test_save_and_get_fabric() {
        let repos = Repositories::new(Arc::new(MemoryStore::new()));
        repos.fabrics.save("f1", &fabric("f1")).await.unwrap();

        let stored = repos.fabric("f1").await.unwrap();
        assert_eq!(stored, fabric("f1"));
        assert_eq!(
            repos.fabrics.list_uris("f1").await.unwrap(),
            vec!["/redfish/v1/Fabrics/f1"]
        );
    }

    #[tokio::test]
    async fn test_unknown_fabric_is_not_found() {
        let repos = Repositories::new(Arc::new(MemoryStore::new()));
        let err = repos.fabric("missing").await.unwrap_err();
        assert_eq!(err.status_code(), 404);
        assert!(matches!(err, FabricError::NotFound { kind: "Fabric", .. }));
    }

    #[tokio::test]
    async fn test_save_twice_conflicts() {
        let repos = Repositories::new(Arc::new(MemoryStore::new()));
        repos.fabrics.save("f1", &fabric("f1")).await.unwrap();

        let err = repos.fabrics.save("f1", &fabric("f1")).await.unwrap_err();
        assert_eq!(err.status_code(), 409);
    }

    #[tokio::test]
    async fn test_delete_removes_membership() {
        let repos = Repositories::new(Arc::new(MemoryStore::new()));
        repos.fabrics.save("f1", &fabric("f1")).await.unwrap();
        repos
            .fabrics
            .delete("f1", "/redfish/v1/Fabrics/f1")
            .await
            .unwrap();

        assert!(repos.fabrics.list("f1").await.unwrap().is_empty());
        let err = repos
            .fabrics
            .delete("f1", "/redfish/v1/Fabrics/f1")
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let repos = Repositories::new(Arc::new(MemoryStore::new()));
        let err = repos.fabrics.update("f1", &fabric("f1")).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_list_all_spans_fabrics() {
        let repos = Repositories::new(Arc::new(MemoryStore::new()));
        repos.fabrics.save("f1", &fabric("f1")).await.unwrap();
        repos.fabrics.save("f2", &fabric("f2")).await.unwrap();

        assert_eq!(repos.fabrics.list_all().await.unwrap().len(), 2);
        assert_eq!(repos.fabrics.list("f2").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_reported() {
        let store = Arc::new(MemoryStore::new());
        store
            .create("Fabric", "f1:/redfish/v1/Fabrics/f1", "{not json")
            .await
            .unwrap();
        let repos = Repositories::new(store);

        let err = repos.fabric("f1").await.unwrap_err();
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn test_store_outage_is_500() {
        let store = Arc::new(MemoryStore::new());
        store.set_available(false);
        let repos = Repositories::new(store);

        let err = repos.fabric("f1").await.unwrap_err();
        assert!(matches!(err, FabricError::StoreUnavailable(_)));
        assert_eq!(err.status_code(), 500);
    }
}
