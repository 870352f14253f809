use crate::{internal_error, AppState};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use storefront_core::domain::product::Product;

#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    pub category: Option<String>,
    pub q: Option<String>,
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
) -> Result<Json<Vec<Product>>, StatusCode> {
    let Some(pool) = &state.pool else {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };

    let products = storefront_core::storage::products::list_active_products(
        pool,
        query.category.as_deref(),
        query.q.as_deref(),
    )
    .await
    .map_err(internal_error)?;

    Ok(Json(products))
}
