//! Order HTTP handlers.
//!
//! ```text
//! POST /api/v1/orders
//! GET  /api/v1/orders/pickup
//! GET  /api/v1/orders/{id}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{ApiResult, Error, Order, OrderId, OrderValidationError, Temperature};
use crate::inbound::http::state::HttpState;

/// Request payload for creating an order.
///
/// Clients may supply `id` so that retried submissions stay idempotent; when
/// absent the server generates one.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub id: Option<Uuid>,
    #[schema(example = "Cheese Pizza")]
    pub name: String,
    pub temp: Temperature,
    /// Base shelf life in seconds before decay is applied.
    pub shelf_life: u32,
    /// Decay factor; higher values spoil the order sooner.
    pub decay_rate: f64,
}

/// Response payload confirming order acceptance.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub id: String,
}

/// Response payload describing an order.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: String,
    pub name: String,
    pub temp: Temperature,
    pub shelf_life: u32,
    pub decay_rate: f64,
    pub created_at: String,
}

impl From<Order> for OrderResponse {
    fn from(value: Order) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
            temp: value.temperature,
            shelf_life: value.shelf_life_seconds,
            decay_rate: value.decay_rate,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

fn map_validation_error(error: OrderValidationError) -> Error {
    let field = match &error {
        OrderValidationError::EmptyName => "name",
        OrderValidationError::InvalidTemperature { .. } => "temp",
        OrderValidationError::InvalidDecayRate { .. } => "decayRate",
    };
    Error::invalid_request(error.to_string()).with_details(json!({ "field": field }))
}

/// Accept an order and queue it for shelf placement.
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    tags = ["orders"],
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order accepted and queued", body = CreateOrderResponse),
        (status = 400, description = "Validation failed", body = Error),
        (status = 503, description = "Queue or store unavailable", body = Error)
    )
)]
#[post("/orders")]
pub async fn create_order(
    state: web::Data<HttpState>,
    payload: web::Json<CreateOrderRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let id = payload.id.map_or_else(OrderId::random, OrderId::new);
    let order = Order::try_new(
        id,
        payload.name,
        payload.temp,
        payload.shelf_life,
        payload.decay_rate,
        state.clock.utc(),
    )
    .map_err(map_validation_error)?;

    let id = state.orders.create_order(&order).await?;
    state.orders.enqueue_for_placement(id).await?;

    Ok(HttpResponse::Created().json(CreateOrderResponse { id: id.to_string() }))
}

/// Hand the order closest to expiry to a courier.
#[utoipa::path(
    get,
    path = "/api/v1/orders/pickup",
    tags = ["orders"],
    responses(
        (status = 200, description = "Order claimed for delivery", body = OrderResponse),
        (status = 404, description = "No order is ready for pickup", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    )
)]
#[get("/orders/pickup")]
pub async fn pickup_order(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let order = state.orders.pickup_order().await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// Fetch a single order by id.
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    tags = ["orders"],
    params(("id" = Uuid, Path, description = "Order identifier")),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "No such order", body = Error)
    )
)]
#[get("/orders/{id}")]
pub async fn get_order(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let order = state.orders.get_order(OrderId::new(path.into_inner())).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// Register order routes under `/api/v1`.
///
/// `pickup` is registered before the `{id}` matcher so the literal segment
/// wins.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(create_order)
            .service(pickup_order)
            .service(get_order),
    );
}
