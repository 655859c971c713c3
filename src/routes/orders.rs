use anyhow::Context;
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    infra::{
        app_error::{AppError, ErrorBody, ValidationErrorBody},
        app_state::AppState,
    },
    models::{CreateOrderEntity, OrderRecord},
    payments::{self, PaymentDescriptor},
    pricing::compute_total_cents,
    repository,
    validation::{CreateOrderReq, validate_create_order},
};

/// Currency marker of every monetary amount returned by the API.
pub const CURRENCY: &str = "cents";

/// Label returned by the create endpoint. The stored record starts as `pending`;
/// the two labels are deliberately left as they are.
pub const CREATED_STATUS: &str = "created";

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(utoipa_axum::routes!(create_order))
        .routes(utoipa_axum::routes!(get_order))
}

#[derive(Serialize, Debug, ToSchema)]
pub struct CreateOrderRes {
    #[serde(rename = "orderId")]
    pub order_id: i64,
    /// Order total in cents.
    pub total: i64,
    #[schema(example = "cents")]
    pub currency: String,
    #[schema(example = "created")]
    pub status: String,
    pub payment: Option<PaymentDescriptor>,
}

/// Validate, price and store a new order.
#[utoipa::path(
    post,
    path = "/orders",
    tags = ["Orders"],
    request_body = CreateOrderReq,
    responses(
        (status = 201, description = "Created order successfully", body = CreateOrderRes),
        (status = 400, description = "Invalid submission", body = ValidationErrorBody),
        (status = 429, description = "Rate limit exceeded", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
async fn create_order(
    State(state): State<AppState>,
    body: Result<Json<CreateOrderReq>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateOrderRes>), AppError> {
    let Json(body) = body.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    let order = validate_create_order(body).map_err(AppError::Validation)?;
    let total_cents = compute_total_cents(&order.items)?;
    let payment_method = order.payment_method;

    let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let entity = CreateOrderEntity::from_new_order(order, total_cents, created_at)
        .context("Failed to encode order")?;

    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let created = repository::insert_order(conn, entity)
        .await
        .context("Failed to create order")?;

    tracing::info!(
        "Order #{} created ({} cents, {})",
        created.id,
        created.total_cents,
        payment_method
    );

    let payment = payments::payment_for(
        payment_method,
        created.id,
        created.total_cents,
        &state.config.payment.url_base,
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateOrderRes {
            order_id: created.id,
            total: created.total_cents,
            currency: CURRENCY.to_string(),
            status: CREATED_STATUS.to_string(),
            payment,
        }),
    ))
}

/// Fetch a single order by id.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    tags = ["Orders"],
    params(
        ("id" = i64, Path, description = "Order ID to fetch")
    ),
    responses(
        (status = 200, description = "Get order successfully", body = OrderRecord),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 404, description = "No such order", body = ErrorBody)
    )
)]
async fn get_order(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<OrderRecord>, AppError> {
    let id = parse_order_id(&id).ok_or_else(|| AppError::BadRequest("Invalid id".into()))?;

    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let order = repository::find_order(conn, id)
        .await
        .context("Failed to get order")?
        .ok_or_else(|| AppError::NotFound("Order not found".into()))?;

    Ok(Json(OrderRecord::try_from(order)?))
}

/// Positive decimal integers only.
fn parse_order_id(raw: &str) -> Option<i64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<i64>().ok().filter(|id| *id > 0)
}
