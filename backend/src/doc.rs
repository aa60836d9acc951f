//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct which generates the OpenAPI specification
//! for the REST API: the order endpoints, the health probes, and the shared
//! error envelope.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::orders::{CreateOrderRequest, CreateOrderResponse, OrderResponse};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Kitchen shelf API",
        description = "HTTP interface for order intake, pickup, and health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::orders::create_order,
        crate::inbound::http::orders::pickup_order,
        crate::inbound::http::orders::get_order,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(CreateOrderRequest, CreateOrderResponse, OrderResponse, Error, ErrorCode)),
    tags(
        (name = "orders", description = "Order intake and pickup"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
