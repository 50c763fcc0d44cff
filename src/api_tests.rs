// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `api.rs`

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::api::router;
    use crate::context::Context;
    use crate::controller::memory::MemoryController;
    use crate::events::{EventPublisher, EventQueue};
    use crate::model::Fabric;
    use crate::store::MemoryStore;

    const FABRICS: &str = "/redfish/v1/Fabrics/f1";

    async fn app() -> (Router, Arc<MemoryController>, EventQueue) {
        let controller = Arc::new(MemoryController::new());
        let (publisher, queue) = EventPublisher::channel(64);
        let ctx = Context::new(Arc::new(MemoryStore::new()), controller.clone(), publisher);
        ctx.repos
            .fabrics
            .save("f1", &Fabric::new("f1", "1", vec!["a1b2c3:101".to_string()]))
            .await
            .unwrap();
        (router(Arc::new(ctx)), controller, queue)
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_get_fabric() {
        let (app, _, _queue) = app().await;

        let (status, body) = send(&app, Method::GET, FABRICS, None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["Id"], "f1");
        assert_eq!(body["PodID"], "1");
    }

    #[tokio::test]
    async fn test_unknown_fabric_payload() {
        let (app, _, _queue) = app().await;

        let (status, body) = send(&app, Method::GET, "/redfish/v1/Fabrics/nope/Zones", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["statusMessage"], "ResourceNotFound");
        assert!(body["errorMessage"].as_str().unwrap().contains("nope"));
        assert!(body["args"].is_array());
    }

    #[tokio::test]
    async fn test_zone_lifecycle() {
        let (app, controller, _queue) = app().await;
        let zones = format!("{FABRICS}/Zones");

        let (status, zone) = send(
            &app,
            Method::POST,
            &zones,
            Some(json!({"Name": "blue", "ZoneType": "Default"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(controller.contains("uni/tn-blue"));
        let uri = zone["@odata.id"].as_str().unwrap().to_string();

        let (status, collection) = send(&app, Method::GET, &zones, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(collection["Members@odata.count"], 1);
        assert_eq!(collection["Members"][0]["@odata.id"], uri.as_str());

        let (status, body) = send(
            &app,
            Method::PATCH,
            &uri,
            Some(json!({"Description": "tenant"})),
        )
        .await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["statusMessage"], "ActionNotSupported");

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_address_pool_conflict() {
        let (app, _, _queue) = app().await;
        let pools = format!("{FABRICS}/AddressPools");
        let pool = json!({
            "Ethernet": {"IPv4": {
                "GatewayIPAddress": "10.0.0.1/24",
                "VLANIdentifierAddressRange": {"Lower": 10, "Upper": 10}
            }}
        });

        let (status, _) = send(&app, Method::POST, &pools, Some(pool.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = send(&app, Method::POST, &pools, Some(pool)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["statusMessage"], "ResourceAlreadyExists");
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let (app, _, _queue) = app().await;

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("{FABRICS}/Zones"),
            Some(json!({"Name": "blue", "ZoneType": "Galaxy"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["statusMessage"], "MalformedJSON");
    }

    #[tokio::test]
    async fn test_endpoint_patch_is_not_routed() {
        let (app, _, _queue) = app().await;

        let (status, _) = send(
            &app,
            Method::PATCH,
            &format!("{FABRICS}/Endpoints/e1"),
            Some(json!({})),
        )
        .await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let (app, _, _queue) = app().await;
        send(&app, Method::GET, &format!("{FABRICS}/Zones"), None).await;

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
