use crate::{internal_error, AppState};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use storefront_core::analytics::{aggregate, SalesAnalysisData};
use storefront_core::domain::insight::SalesInsight;

const MAX_WINDOW_DAYS: i64 = 365;

#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    #[serde(default = "default_days")]
    pub days: i64,
}

fn default_days() -> i64 {
    30
}

impl WindowQuery {
    fn days_clamped(&self) -> i64 {
        self.days.clamp(1, MAX_WINDOW_DAYS)
    }
}

#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub days_back: i64,
    pub sales_data: SalesAnalysisData,
    pub insight: SalesInsight,
}

#[derive(Debug, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub revenue: Vec<f64>,
    pub orders: Vec<u64>,
}

async fn load_sales_data(pool: &PgPool, days: i64) -> anyhow::Result<SalesAnalysisData> {
    let cutoff = Utc::now() - Duration::days(days);
    let orders = storefront_core::storage::orders::orders_since(pool, cutoff).await?;
    let catalog = storefront_core::storage::products::all_products(pool).await?;
    Ok(aggregate::analyze_orders(&orders, &catalog))
}

pub async fn sales_data(
    State(state): State<AppState>,
    Query(window): Query<WindowQuery>,
) -> Result<Json<SalesAnalysisData>, StatusCode> {
    let Some(pool) = &state.pool else {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };

    let data = load_sales_data(pool, window.days_clamped())
        .await
        .map_err(internal_error)?;
    Ok(Json(data))
}

/// Full pipeline: aggregate, prompt, completion call, parse. A missing or
/// failing completion service yields the placeholder insight; the endpoint
/// itself only errors when the database read fails.
pub async fn insights(
    State(state): State<AppState>,
    Query(window): Query<WindowQuery>,
) -> Result<Json<InsightsResponse>, StatusCode> {
    let Some(pool) = &state.pool else {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };

    let days = window.days_clamped();
    let sales_data = load_sales_data(pool, days).await.map_err(internal_error)?;

    let insight = match &state.completer {
        Some(completer) => {
            storefront_core::analytics::generate_sales_insight(
                completer.as_ref(),
                &sales_data,
                days,
                &state.completion_options,
            )
            .await
        }
        None => SalesInsight::degraded(Utc::now()),
    };

    Ok(Json(InsightsResponse {
        days_back: days,
        sales_data,
        insight,
    }))
}

/// Date-labeled daily series for the revenue/orders chart.
pub async fn chart_data(
    State(state): State<AppState>,
    Query(window): Query<WindowQuery>,
) -> Result<Json<ChartData>, StatusCode> {
    let Some(pool) = &state.pool else {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };

    let data = load_sales_data(pool, window.days_clamped())
        .await
        .map_err(internal_error)?;

    let mut chart = ChartData {
        labels: Vec::with_capacity(data.daily_sales.len()),
        revenue: Vec::with_capacity(data.daily_sales.len()),
        orders: Vec::with_capacity(data.daily_sales.len()),
    };
    for day in &data.daily_sales {
        chart.labels.push(day.date.format("%b %d").to_string());
        chart.revenue.push(day.revenue);
        chart.orders.push(day.order_count);
    }

    Ok(Json(chart))
}
