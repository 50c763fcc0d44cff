// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP surface of the provisioner.
//!
//! A thin axum router over the orchestrators. Handlers only extract path
//! parameters and bodies, call one orchestration operation and serialize the
//! result; every failure becomes an [`ErrorPayload`] with the status from
//! [`FabricError::status_code`].
//!
//! ## Routes
//!
//! | Method | Path |
//! |--------|------|
//! | GET | `/redfish/v1/Fabrics/{fabric_id}` |
//! | GET, POST | `/redfish/v1/Fabrics/{fabric_id}/Zones` |
//! | GET, PATCH, DELETE | `/redfish/v1/Fabrics/{fabric_id}/Zones/{zone_id}` |
//! | GET, POST | `/redfish/v1/Fabrics/{fabric_id}/Endpoints` |
//! | GET, DELETE | `/redfish/v1/Fabrics/{fabric_id}/Endpoints/{endpoint_id}` |
//! | GET, POST | `/redfish/v1/Fabrics/{fabric_id}/AddressPools` |
//! | GET, DELETE | `/redfish/v1/Fabrics/{fabric_id}/AddressPools/{pool_id}` |
//! | GET | `/metrics` |

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::{error, warn};

use crate::context::Context;
use crate::errors::{ErrorPayload, FabricError};
use crate::metrics::gather_metrics;
use crate::model::{
    address_pools_uri, endpoints_uri, zones_uri, AddressPool, AddressPoolRequest, Endpoint,
    EndpointRequest, Fabric, Link, Zone, ZoneRequest,
};
use crate::orchestrators::{address_pool, endpoint, zone};
use crate::status_reasons::REASON_MALFORMED_JSON;

// ============================================================================
// Responses
// ============================================================================

/// Failure returned by a handler.
#[derive(Debug)]
pub enum ApiError {
    /// An orchestration operation failed
    Fabric(FabricError),
    /// The request body was not valid JSON for the resource
    Body(JsonRejection),
}

impl From<FabricError> for ApiError {
    fn from(err: FabricError) -> Self {
        Self::Fabric(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        Self::Body(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, payload) = match self {
            Self::Fabric(err) => {
                let status = StatusCode::from_u16(err.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (status, err.payload())
            }
            Self::Body(rejection) => (
                StatusCode::BAD_REQUEST,
                ErrorPayload {
                    status_message: REASON_MALFORMED_JSON.to_string(),
                    error_message: rejection.body_text(),
                    args: Vec::new(),
                },
            ),
        };
        if status.is_server_error() {
            error!(status = %status, error = %payload.error_message, "Request failed");
        } else {
            warn!(status = %status, reason = %payload.status_message, "Request rejected");
        }
        (status, Json(payload)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Redfish resource collection body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collection {
    /// Collection URI
    #[serde(rename = "@odata.id")]
    pub odata_id: String,
    /// Number of members
    #[serde(rename = "Members@odata.count")]
    pub count: usize,
    /// Member links
    #[serde(rename = "Members")]
    pub members: Vec<Link>,
}

impl Collection {
    fn new(odata_id: String, members: impl IntoIterator<Item = String>) -> Self {
        let members: Vec<Link> = members.into_iter().map(Link::new).collect();
        Self {
            odata_id,
            count: members.len(),
            members,
        }
    }
}

// ============================================================================
// Router
// ============================================================================

/// Build the router serving the fabric resource tree and `/metrics`.
pub fn router(ctx: Arc<Context>) -> Router {
    Router::new()
        .route("/redfish/v1/Fabrics/{fabric_id}", get(get_fabric))
        .route(
            "/redfish/v1/Fabrics/{fabric_id}/Zones",
            get(list_zones).post(create_zone),
        )
        .route(
            "/redfish/v1/Fabrics/{fabric_id}/Zones/{zone_id}",
            get(get_zone).patch(update_zone).delete(delete_zone),
        )
        .route(
            "/redfish/v1/Fabrics/{fabric_id}/Endpoints",
            get(list_endpoints).post(create_endpoint),
        )
        .route(
            "/redfish/v1/Fabrics/{fabric_id}/Endpoints/{endpoint_id}",
            get(get_endpoint).delete(delete_endpoint),
        )
        .route(
            "/redfish/v1/Fabrics/{fabric_id}/AddressPools",
            get(list_address_pools).post(create_address_pool),
        )
        .route(
            "/redfish/v1/Fabrics/{fabric_id}/AddressPools/{pool_id}",
            get(get_address_pool).delete(delete_address_pool),
        )
        .route("/metrics", get(metrics))
        .with_state(ctx)
}

// ============================================================================
// Handlers
// ============================================================================

async fn get_fabric(
    State(ctx): State<Arc<Context>>,
    Path(fabric_id): Path<String>,
) -> ApiResult<Json<Fabric>> {
    Ok(Json(ctx.repos.fabric(&fabric_id).await?))
}

async fn list_zones(
    State(ctx): State<Arc<Context>>,
    Path(fabric_id): Path<String>,
) -> ApiResult<Json<Collection>> {
    let zones = zone::list_zones(&ctx, &fabric_id).await?;
    Ok(Json(Collection::new(
        zones_uri(&fabric_id),
        zones.into_iter().map(|z| z.odata_id),
    )))
}

async fn create_zone(
    State(ctx): State<Arc<Context>>,
    Path(fabric_id): Path<String>,
    body: Result<Json<ZoneRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Zone>)> {
    let Json(request) = body?;
    let zone = zone::create_zone(&ctx, &fabric_id, request).await?;
    Ok((StatusCode::CREATED, Json(zone)))
}

async fn get_zone(
    State(ctx): State<Arc<Context>>,
    Path((fabric_id, zone_id)): Path<(String, String)>,
) -> ApiResult<Json<Zone>> {
    Ok(Json(zone::get_zone(&ctx, &fabric_id, &zone_id).await?))
}

async fn update_zone(
    State(ctx): State<Arc<Context>>,
    Path((fabric_id, zone_id)): Path<(String, String)>,
    body: Result<Json<ZoneRequest>, JsonRejection>,
) -> ApiResult<Json<Zone>> {
    let Json(request) = body?;
    Ok(Json(
        zone::update_zone(&ctx, &fabric_id, &zone_id, request).await?,
    ))
}

async fn delete_zone(
    State(ctx): State<Arc<Context>>,
    Path((fabric_id, zone_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    zone::delete_zone(&ctx, &fabric_id, &zone_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_endpoints(
    State(ctx): State<Arc<Context>>,
    Path(fabric_id): Path<String>,
) -> ApiResult<Json<Collection>> {
    let endpoints = endpoint::list_endpoints(&ctx, &fabric_id).await?;
    Ok(Json(Collection::new(
        endpoints_uri(&fabric_id),
        endpoints.into_iter().map(|e| e.odata_id),
    )))
}

async fn create_endpoint(
    State(ctx): State<Arc<Context>>,
    Path(fabric_id): Path<String>,
    body: Result<Json<EndpointRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Endpoint>)> {
    let Json(request) = body?;
    let endpoint = endpoint::create_endpoint(&ctx, &fabric_id, request).await?;
    Ok((StatusCode::CREATED, Json(endpoint)))
}

async fn get_endpoint(
    State(ctx): State<Arc<Context>>,
    Path((fabric_id, endpoint_id)): Path<(String, String)>,
) -> ApiResult<Json<Endpoint>> {
    Ok(Json(
        endpoint::get_endpoint(&ctx, &fabric_id, &endpoint_id).await?,
    ))
}

async fn delete_endpoint(
    State(ctx): State<Arc<Context>>,
    Path((fabric_id, endpoint_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    endpoint::delete_endpoint(&ctx, &fabric_id, &endpoint_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_address_pools(
    State(ctx): State<Arc<Context>>,
    Path(fabric_id): Path<String>,
) -> ApiResult<Json<Collection>> {
    let pools = address_pool::list_address_pools(&ctx, &fabric_id).await?;
    Ok(Json(Collection::new(
        address_pools_uri(&fabric_id),
        pools.into_iter().map(|p| p.odata_id),
    )))
}

async fn create_address_pool(
    State(ctx): State<Arc<Context>>,
    Path(fabric_id): Path<String>,
    body: Result<Json<AddressPoolRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AddressPool>)> {
    let Json(request) = body?;
    let pool = address_pool::create_address_pool(&ctx, &fabric_id, request).await?;
    Ok((StatusCode::CREATED, Json(pool)))
}

async fn get_address_pool(
    State(ctx): State<Arc<Context>>,
    Path((fabric_id, pool_id)): Path<(String, String)>,
) -> ApiResult<Json<AddressPool>> {
    Ok(Json(
        address_pool::get_address_pool(&ctx, &fabric_id, &pool_id).await?,
    ))
}

async fn delete_address_pool(
    State(ctx): State<Arc<Context>>,
    Path((fabric_id, pool_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    address_pool::delete_address_pool(&ctx, &fabric_id, &pool_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Prometheus text exposition of [`crate::metrics::METRICS_REGISTRY`].
async fn metrics() -> Response {
    match gather_metrics() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod api_tests;
