use crate::{internal_error, AppState};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use storefront_core::domain::order::Order;

pub async fn list_for_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
) -> Result<Json<Vec<Order>>, StatusCode> {
    let Some(pool) = &state.pool else {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };

    let orders = storefront_core::storage::orders::orders_for_customer(pool, &customer_id)
        .await
        .map_err(internal_error)?;

    Ok(Json(orders))
}
