pub mod aggregate;
pub mod parse;
pub mod prompt;

use crate::domain::insight::SalesInsight;
use crate::llm::{ChatCompleter, CompletionOptions};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Summary statistics over the trailing analysis window. Derived fresh on
/// every request from the raw orders and the current catalog; never stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SalesAnalysisData {
    pub total_orders: u64,
    pub total_revenue: f64,
    pub average_order_value: f64,
    pub top_products: Vec<ProductSales>,
    pub daily_sales: Vec<DailySales>,
    pub orders_by_status: HashMap<String, u64>,
    pub category_performance: HashMap<String, CategoryPerformance>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySales {
    pub date: NaiveDate,
    pub order_count: u64,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSales {
    pub name: String,
    pub quantity_sold: u64,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPerformance {
    pub category: String,
    pub product_count: u64,
    pub units_sold: u64,
    pub revenue: f64,
    pub average_price: f64,
}

/// Runs the aggregate → prompt → completion → parse pipeline for one window.
///
/// The completion call is the only suspension point. Failures of any kind
/// (configuration, network, provider) are logged and swallowed into a
/// placeholder insight; this function never returns an error to the caller.
/// Empty windows still go through the completion call with an empty-data
/// prompt, so the behavior is uniform regardless of order volume.
pub async fn generate_sales_insight(
    completer: &dyn ChatCompleter,
    data: &SalesAnalysisData,
    days_back: i64,
    options: &CompletionOptions,
) -> SalesInsight {
    let user_prompt = prompt::build_analysis_prompt(data, days_back);

    match completer
        .complete(prompt::SYSTEM_PROMPT, &user_prompt, options)
        .await
    {
        Ok(reply) => {
            let mut insight = parse::parse_insight_response(&reply);
            insight.generated_at = chrono::Utc::now();
            insight
        }
        Err(err) => {
            tracing::error!(error = %err, days_back, "sales insight generation failed");
            SalesInsight::degraded(chrono::Utc::now())
        }
    }
}
