use crate::{internal_error, AppState};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use storefront_core::domain::cart::Cart;
use storefront_core::storage::carts;

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: i64,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order_id: i64,
}

pub async fn get_cart(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
) -> Result<Json<Cart>, StatusCode> {
    let Some(pool) = &state.pool else {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };

    let cart = carts::cart_with_lines(pool, &customer_id)
        .await
        .map_err(internal_error)?;
    Ok(Json(cart))
}

pub async fn add_item(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<Cart>, StatusCode> {
    let Some(pool) = &state.pool else {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };
    if req.quantity <= 0 {
        return Err(StatusCode::BAD_REQUEST);
    }

    carts::add_item(pool, &customer_id, req.product_id, req.quantity)
        .await
        .map_err(internal_error)?;

    let cart = carts::cart_with_lines(pool, &customer_id)
        .await
        .map_err(internal_error)?;
    Ok(Json(cart))
}

pub async fn update_quantity(
    State(state): State<AppState>,
    Path((customer_id, line_id)): Path<(String, i64)>,
    Json(req): Json<UpdateQuantityRequest>,
) -> Result<Json<Cart>, StatusCode> {
    let Some(pool) = &state.pool else {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };

    // Negative quantities clamp to removal, matching the storefront UI.
    carts::update_quantity(pool, &customer_id, line_id, req.quantity.max(0))
        .await
        .map_err(internal_error)?;

    let cart = carts::cart_with_lines(pool, &customer_id)
        .await
        .map_err(internal_error)?;
    Ok(Json(cart))
}

pub async fn remove_item(
    State(state): State<AppState>,
    Path((customer_id, line_id)): Path<(String, i64)>,
) -> Result<Json<Cart>, StatusCode> {
    let Some(pool) = &state.pool else {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };

    carts::remove_item(pool, &customer_id, line_id)
        .await
        .map_err(internal_error)?;

    let cart = carts::cart_with_lines(pool, &customer_id)
        .await
        .map_err(internal_error)?;
    Ok(Json(cart))
}

pub async fn clear_cart(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    let Some(pool) = &state.pool else {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };

    carts::clear_cart(pool, &customer_id)
        .await
        .map_err(internal_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn checkout(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
) -> Result<Json<CheckoutResponse>, StatusCode> {
    let Some(pool) = &state.pool else {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };

    let order_id = carts::checkout(pool, &customer_id)
        .await
        .map_err(internal_error)?
        .ok_or(StatusCode::CONFLICT)?;

    Ok(Json(CheckoutResponse { order_id }))
}
