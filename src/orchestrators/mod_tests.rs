// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `orchestrators/mod.rs`

#[cfg(test)]
mod tests {
    use crate::errors::FabricError;
    use crate::model::Link;
    use crate::orchestrators::{ensure_distinct, new_resource_id, observed};
    use crate::status_reasons::REASON_PROPERTY_VALUE_CONFLICT;

    #[test]
    fn test_new_resource_ids_are_unique() {
        assert_ne!(new_resource_id(), new_resource_id());
    }

    #[test]
    fn test_ensure_distinct() {
        let links = vec![Link::new("/a"), Link::new("/b")];
        assert!(ensure_distinct(&links, "Endpoints").is_ok());

        let repeated = vec![Link::new("/a"), Link::new("/a/")];
        let err = ensure_distinct(&repeated, "Endpoints").unwrap_err();
        assert_eq!(err.reason(), REASON_PROPERTY_VALUE_CONFLICT);
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_observed_passes_result_through() {
        let ok: Result<u8, FabricError> = observed("TestObserved", "create", async { Ok(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        let err: Result<u8, FabricError> = observed("TestObserved", "delete", async {
            Err(FabricError::not_found("Zone", "z"))
        })
        .await;
        assert_eq!(err.unwrap_err().status_code(), 404);
    }
}
