// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `store.rs`

#[cfg(test)]
mod tests {
    use crate::store::{glob_match, MemoryStore, ResourceStore, StoreError};

    #[test]
    fn test_glob_match() {
        assert!(glob_match("*", "anything"));
        assert!(glob_match("f1:*", "f1:/redfish/v1/Fabrics/f1/Zones/z"));
        assert!(!glob_match("f1:*", "f2:/redfish/v1/Fabrics/f2/Zones/z"));
        assert!(glob_match("*:*/Zones/*", "f1:/redfish/v1/Fabrics/f1/Zones/z"));
        assert!(glob_match("exact", "exact"));
        assert!(!glob_match("exact", "exactly"));
        assert!(!glob_match("ab*ba", "aba"));
    }

    #[tokio::test]
    async fn test_create_get_update_delete() {
        let store = MemoryStore::new();

        store.create("Zone", "k", "v1").await.unwrap();
        assert_eq!(store.get("Zone", "k").await.unwrap(), "v1");

        store.update("Zone", "k", "v2").await.unwrap();
        assert_eq!(store.get("Zone", "k").await.unwrap(), "v2");

        store.delete("Zone", "k").await.unwrap();
        assert!(matches!(
            store.get("Zone", "k").await,
            Err(StoreError::NotFound { .. })
        ));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_create_twice_is_rejected() {
        let store = MemoryStore::new();
        store.create("Zone", "k", "v").await.unwrap();

        let result = store.create("Zone", "k", "other").await;
        assert!(matches!(result, Err(StoreError::AlreadyExists { .. })));
        assert_eq!(store.get("Zone", "k").await.unwrap(), "v");
    }

    #[tokio::test]
    async fn test_update_missing_is_rejected() {
        let store = MemoryStore::new();
        let result = store.update("Zone", "missing", "v").await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_sets() {
        let store = MemoryStore::new();
        store.add_to_set("pools", "b").await.unwrap();
        store.add_to_set("pools", "a").await.unwrap();
        store.add_to_set("pools", "a").await.unwrap();

        assert_eq!(store.list_set("pools").await.unwrap(), vec!["a", "b"]);

        store.remove_from_set("pools", "a").await.unwrap();
        store.remove_from_set("pools", "missing").await.unwrap();
        assert_eq!(store.list_set("pools").await.unwrap(), vec!["b"]);
        assert!(store.list_set("unknown").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_keys_matching() {
        let store = MemoryStore::new();
        store.create("Zone", "f1:a", "1").await.unwrap();
        store.create("Zone", "f1:b", "2").await.unwrap();
        store.create("Zone", "f2:c", "3").await.unwrap();

        assert_eq!(
            store.list_keys_matching("Zone", "f1:*").await.unwrap(),
            vec!["f1:a", "f1:b"]
        );
        assert_eq!(store.list_keys_matching("Zone", "*").await.unwrap().len(), 3);
        assert!(store
            .list_keys_matching("Endpoint", "*")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_store() {
        let store = MemoryStore::new();
        store.set_available(false);

        assert!(matches!(
            store.get("Zone", "k").await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(
            store.add_to_set("s", "m").await,
            Err(StoreError::Unavailable(_))
        ));

        store.set_available(true);
        assert!(store.create("Zone", "k", "v").await.is_ok());
    }
}
