//! HTTP route handlers for the address service.
//!
//! Routes are grouped by rate-limit tier:
//! - Static routes (`/`, `/health`) — no rate limit
//! - Mutation routes (`POST`/`PATCH`/`DELETE`) — 10 req/sec, burst 20
//! - Read routes (`GET` lookups and listings) — 30 req/sec, burst 60
//!
//! All handlers return JSON. Error bodies use the [`StatusResponse`]
//! envelope; successful deletes return `204 No Content` with an empty body.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Json, Router,
};
use sqlx::Pool;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tracing::{error, info};
use uuid::Uuid;

use crate::{db, models::*};

/// Path parameters longer than this are rejected outright. Address ids are
/// 36-character UUIDs and university ids are at most 8 characters, so the
/// guard only trips on garbage.
const MAX_ID_PARAM_LEN: usize = 64;

/// Builds the application router with all routes and middleware layers.
///
/// Middleware applied globally (innermost → outermost):
/// - `DefaultBodyLimit` — rejects bodies over 64 KB before reaching handlers
/// - `TraceLayer` — structured request/response tracing
/// - Security headers — `X-Frame-Options`, `X-Content-Type-Options`,
///   `Referrer-Policy`, `Content-Security-Policy`
pub fn router(pool: Arc<Pool<sqlx::Sqlite>>) -> Router {
    // Rate limiting: 10 requests per second per IP for mutations
    let mutation_rate_limit = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .finish()
            .unwrap(),
    );

    // Reads are cheap; allow a higher rate before throttling
    let read_rate_limit = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(30)
            .burst_size(60)
            .finish()
            .unwrap(),
    );

    let static_routes = Router::new()
        .route("/", get(api_root))
        .route("/health", get(health_check));

    let mutation_routes = Router::new()
        .route("/addresses", post(create_address_handler))
        .route(
            "/customers/:university_id/addresses/:address_id",
            patch(update_address_handler).delete(delete_address_handler),
        )
        .route(
            "/customers/:university_id/addresses",
            delete(delete_university_addresses_handler),
        )
        .layer(GovernorLayer {
            config: mutation_rate_limit,
        });

    let read_routes = Router::new()
        .route("/addresses/:address_id", get(get_address_handler))
        .route(
            "/customers/:university_id/addresses",
            get(list_university_addresses_handler),
        )
        .layer(GovernorLayer {
            config: read_rate_limit,
        });

    Router::new()
        .merge(static_routes)
        .merge(mutation_routes)
        .merge(read_routes)
        .with_state(pool)
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(64 * 1024))
                .layer(tower_http::trace::TraceLayer::new_for_http())
                .layer(tower_http::set_header::SetResponseHeaderLayer::if_not_present(
                    header::X_FRAME_OPTIONS,
                    HeaderValue::from_static("DENY"),
                ))
                .layer(tower_http::set_header::SetResponseHeaderLayer::if_not_present(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(tower_http::set_header::SetResponseHeaderLayer::if_not_present(
                    header::REFERRER_POLICY,
                    HeaderValue::from_static("no-referrer"),
                ))
                .layer(tower_http::set_header::SetResponseHeaderLayer::if_not_present(
                    header::CONTENT_SECURITY_POLICY,
                    HeaderValue::from_static("default-src 'none'"),
                )),
        )
}

// --- Shared response helpers ---

/// Current time as an RFC 3339 UTC string, the format stored in the
/// database and returned on the wire.
fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .expect("failed to format RFC 3339 timestamp")
}

/// Best-effort lookup of the host's outbound IP address.
///
/// "Connecting" a UDP socket sends no packet; the OS just resolves which
/// local endpoint it would route from. Falls back to loopback when the
/// host has no usable route.
fn local_ip_address() -> String {
    std::net::UdpSocket::bind(("0.0.0.0", 0))
        .and_then(|socket| {
            socket.connect(("8.8.8.8", 80))?;
            socket.local_addr()
        })
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|_| "127.0.0.1".to_string())
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(StatusResponse {
            status: "error",
            message: message.to_string(),
        }),
    )
        .into_response()
}

fn not_found(message: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(StatusResponse {
            status: "error",
            message: message.to_string(),
        }),
    )
        .into_response()
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(StatusResponse {
            status: "error",
            message: "Internal server error".to_string(),
        }),
    )
        .into_response()
}

// --- Static handlers ---

/// `GET /` — returns API metadata as JSON.
async fn api_root() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "Customer Address Atomic Microservice",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Atomic service for managing address data (keyed by address_id, linked by university_id).",
        "endpoints": {
            "health": "GET /health",
            "create_address": "POST /addresses",
            "get_address": "GET /addresses/:address_id",
            "list_customer_addresses": "GET /customers/:university_id/addresses",
            "update_address": "PATCH /customers/:university_id/addresses/:address_id",
            "delete_address": "DELETE /customers/:university_id/addresses/:address_id",
            "delete_customer_addresses": "DELETE /customers/:university_id/addresses"
        }
    }))
}

/// `GET /health` — liveness probe with basic host introspection.
async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: 200,
        status_message: "OK",
        timestamp: now_rfc3339(),
        ip_address: local_ip_address(),
    })
}

// --- API handlers ---

/// `POST /addresses` — stores a new address.
///
/// The server generates the `address_id` (UUID v4) and both timestamps;
/// an id supplied by the client is ignored.
///
/// # Responses
/// - `201 Created` — returns the stored [`AddressResponse`]
/// - `400 Bad Request` — validation failed
/// - `500 Internal Server Error` — database error
async fn create_address_handler(
    State(pool): State<Arc<Pool<sqlx::Sqlite>>>,
    Json(req): Json<AddressCreate>,
) -> impl IntoResponse {
    if let Err(e) = req.validate() {
        return bad_request(e);
    }

    let now = now_rfc3339();
    let row = AddressRow {
        address_id: Uuid::new_v4().to_string(),
        university_id: req.university_id,
        street: req.street,
        city: req.city,
        state: req.state,
        postal_code: req.postal_code,
        country: req.country,
        created_at: now.clone(),
        updated_at: now,
    };

    match db::insert_address(&pool, &row).await {
        Ok(()) => {
            info!("Address created with ID: {}", row.address_id);
            (StatusCode::CREATED, Json(AddressResponse::from(row))).into_response()
        }
        Err(e) => {
            error!("Failed to store address: {:?}", e);
            internal_error()
        }
    }
}

/// `GET /addresses/:address_id` — fetches a single address by id.
///
/// Lookup is by primary key only; ownership is not checked on direct
/// fetches.
///
/// # Responses
/// - `200 OK` — returns [`AddressResponse`]
/// - `400 Bad Request` — path parameter exceeds the length guard
/// - `404 Not Found` — no such address
/// - `500 Internal Server Error` — database error
async fn get_address_handler(
    State(pool): State<Arc<Pool<sqlx::Sqlite>>>,
    Path(address_id): Path<String>,
) -> impl IntoResponse {
    if address_id.len() > MAX_ID_PARAM_LEN {
        return bad_request("Invalid address ID");
    }

    match db::fetch_address(&pool, &address_id).await {
        Ok(Some(row)) => (StatusCode::OK, Json(AddressResponse::from(row))).into_response(),
        Ok(None) => not_found("Address not found"),
        Err(e) => {
            error!("Database error fetching {}: {}", address_id, e);
            internal_error()
        }
    }
}

/// `GET /customers/:university_id/addresses` — lists a customer's addresses.
///
/// An empty result is reported as `404`, not as an empty array.
///
/// # Responses
/// - `200 OK` — non-empty array of [`AddressResponse`], oldest first
/// - `400 Bad Request` — path parameter exceeds the length guard
/// - `404 Not Found` — the customer has no addresses
/// - `500 Internal Server Error` — database error
async fn list_university_addresses_handler(
    State(pool): State<Arc<Pool<sqlx::Sqlite>>>,
    Path(university_id): Path<String>,
) -> impl IntoResponse {
    if university_id.len() > MAX_ID_PARAM_LEN {
        return bad_request("Invalid university ID");
    }

    match db::list_addresses_for_university(&pool, &university_id).await {
        Ok(rows) if rows.is_empty() => not_found("No addresses found for this university_id"),
        Ok(rows) => {
            let body: Vec<AddressResponse> = rows.into_iter().map(AddressResponse::from).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            error!("Database error listing addresses for {}: {}", university_id, e);
            internal_error()
        }
    }
}

/// `PATCH /customers/:university_id/addresses/:address_id` — partial update.
///
/// Only the supplied fields change; the owning customer cannot be changed.
/// An empty patch body succeeds and refreshes `updated_at` only. The
/// update is scoped: an address owned by a different customer is reported
/// as missing and left untouched.
///
/// # Responses
/// - `200 OK` — returns the updated [`AddressResponse`]
/// - `400 Bad Request` — validation failed or path parameter too long
/// - `404 Not Found` — no such address for this customer
/// - `500 Internal Server Error` — database error
async fn update_address_handler(
    State(pool): State<Arc<Pool<sqlx::Sqlite>>>,
    Path((university_id, address_id)): Path<(String, String)>,
    Json(update): Json<AddressUpdate>,
) -> impl IntoResponse {
    if university_id.len() > MAX_ID_PARAM_LEN || address_id.len() > MAX_ID_PARAM_LEN {
        return bad_request("Invalid address or university ID");
    }

    if let Err(e) = update.validate() {
        return bad_request(e);
    }

    match db::update_address(&pool, &university_id, &address_id, &update, &now_rfc3339()).await {
        Ok(Some(row)) => (StatusCode::OK, Json(AddressResponse::from(row))).into_response(),
        Ok(None) => not_found("Address not found for this university_id"),
        Err(e) => {
            error!("Database error updating {}: {}", address_id, e);
            internal_error()
        }
    }
}

/// `DELETE /customers/:university_id/addresses/:address_id` — deletes one
/// address, scoped by its owning customer.
///
/// # Responses
/// - `204 No Content` — deleted
/// - `400 Bad Request` — path parameter too long
/// - `404 Not Found` — no such address for this customer
/// - `500 Internal Server Error` — database error
async fn delete_address_handler(
    State(pool): State<Arc<Pool<sqlx::Sqlite>>>,
    Path((university_id, address_id)): Path<(String, String)>,
) -> impl IntoResponse {
    if university_id.len() > MAX_ID_PARAM_LEN || address_id.len() > MAX_ID_PARAM_LEN {
        return bad_request("Invalid address or university ID");
    }

    match db::delete_address(&pool, &university_id, &address_id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => not_found("Address not found for this university_id"),
        Err(e) => {
            error!("Database error deleting {}: {}", address_id, e);
            internal_error()
        }
    }
}

/// `DELETE /customers/:university_id/addresses` — removes every address a
/// customer owns.
///
/// Succeeds with `204` even when the customer has no addresses; the
/// operation is idempotent.
///
/// # Responses
/// - `204 No Content` — all matching addresses removed (possibly zero)
/// - `400 Bad Request` — path parameter too long
/// - `500 Internal Server Error` — database error
async fn delete_university_addresses_handler(
    State(pool): State<Arc<Pool<sqlx::Sqlite>>>,
    Path(university_id): Path<String>,
) -> impl IntoResponse {
    if university_id.len() > MAX_ID_PARAM_LEN {
        return bad_request("Invalid university ID");
    }

    match db::delete_addresses_for_university(&pool, &university_id).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!("Database error deleting addresses for {}: {}", university_id, e);
            internal_error()
        }
    }
}
