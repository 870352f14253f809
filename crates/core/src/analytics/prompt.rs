use crate::analytics::SalesAnalysisData;
use std::fmt::Write;

/// Fixed persona for the analytics path.
pub const SYSTEM_PROMPT: &str = "You are a retail sales analytics expert helping sales teams \
maximize revenue. Analyze sales data and provide actionable insights in a clear, concise manner. \
Focus on specific, measurable recommendations that sales representatives can act on immediately. \
Use direct, action-oriented language targeted at sellers.";

const TOP_CATEGORY_LIMIT: usize = 5;
const TOP_PRODUCT_LIMIT: usize = 5;
const DAILY_TREND_DAYS: usize = 7;

/// Renders the aggregate into the user prompt. Section order is fixed and the
/// trailing instruction block is the output contract the parser relies on:
/// SUMMARY/TRENDS/RECOMMENDATIONS headers plus the repeated RECOMMENDATION
/// micro-format. Rendering is deterministic for a given aggregate (maps are
/// sorted before being written out).
pub fn build_analysis_prompt(data: &SalesAnalysisData, days_back: i64) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Analyze the following sales data from the last {days_back} days and provide insights:"
    );
    out.push('\n');
    out.push_str("**Overall Metrics:**\n");
    let _ = writeln!(out, "- Total Orders: {}", data.total_orders);
    let _ = writeln!(out, "- Total Revenue: ${:.2}", data.total_revenue);
    let _ = writeln!(out, "- Average Order Value: ${:.2}", data.average_order_value);
    out.push('\n');

    if !data.orders_by_status.is_empty() {
        out.push_str("**Orders by Status:**\n");
        let mut statuses: Vec<_> = data.orders_by_status.iter().collect();
        statuses.sort_by(|a, b| a.0.cmp(b.0));
        for (status, count) in statuses {
            let _ = writeln!(out, "- {status}: {count} orders");
        }
        out.push('\n');
    }

    if !data.category_performance.is_empty() {
        out.push_str("**Category Performance:**\n");
        let mut categories: Vec<_> = data.category_performance.values().collect();
        categories.sort_by(|a, b| {
            b.revenue
                .partial_cmp(&a.revenue)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.category.cmp(&b.category))
        });
        for perf in categories.into_iter().take(TOP_CATEGORY_LIMIT) {
            let _ = writeln!(
                out,
                "- {}: {} units sold, ${:.2} revenue, avg price ${:.2}",
                perf.category, perf.units_sold, perf.revenue, perf.average_price
            );
        }
        out.push('\n');
    }

    if !data.top_products.is_empty() {
        let _ = writeln!(out, "**Top {TOP_PRODUCT_LIMIT} Products:**");
        for product in data.top_products.iter().take(TOP_PRODUCT_LIMIT) {
            let _ = writeln!(
                out,
                "- {}: {} units, ${:.2} revenue",
                product.name, product.quantity_sold, product.revenue
            );
        }
        out.push('\n');
    }

    if !data.daily_sales.is_empty() {
        let _ = writeln!(out, "**Daily Sales Trend (last {DAILY_TREND_DAYS} days):**");
        let skip = data.daily_sales.len().saturating_sub(DAILY_TREND_DAYS);
        for day in data.daily_sales.iter().skip(skip) {
            let _ = writeln!(
                out,
                "- {}: {} orders, ${:.2}",
                day.date.format("%b %d"),
                day.order_count,
                day.revenue
            );
        }
        out.push('\n');
    }

    out.push_str(concat!(
        "Please provide:\n",
        "1. SUMMARY: A brief overview (2-3 sentences) of the sales performance\n",
        "2. TRENDS: Key trends and patterns you observe in the data\n",
        "3. RECOMMENDATIONS: Provide exactly 3-5 specific, actionable recommendations for the sales team.\n",
        "\n",
        "For RECOMMENDATIONS, format each as follows (use this exact format):\n",
        "RECOMMENDATION:\n",
        "Title: [Short actionable title]\n",
        "Description: [Brief explanation why this matters]\n",
        "Action: [Specific action to take]\n",
        "Category: [One of: Upsell, Pricing, Marketing, Inventory, Customer]\n",
        "Priority: [One of: High, Medium, Low]\n",
        "\n",
        "Focus on actionable, seller-focused language. Examples:\n",
        "- Focus on upselling high-margin products\n",
        "- Adjust pricing strategy for specific categories\n",
        "- Target marketing campaigns for underperforming segments\n",
        "- Bundle complementary products\n",
        "- Improve conversion for specific product categories\n",
        "\n",
        "Format your response with clear section headers.\n",
    ));

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{CategoryPerformance, DailySales, ProductSales};
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn sample_data() -> SalesAnalysisData {
        let mut orders_by_status = HashMap::new();
        orders_by_status.insert("Paid".to_string(), 8);
        orders_by_status.insert("Created".to_string(), 2);

        let mut category_performance = HashMap::new();
        category_performance.insert(
            "Electronics".to_string(),
            CategoryPerformance {
                category: "Electronics".to_string(),
                product_count: 3,
                units_sold: 12,
                revenue: 540.0,
                average_price: 45.0,
            },
        );

        SalesAnalysisData {
            total_orders: 10,
            total_revenue: 1234.5,
            average_order_value: 123.45,
            top_products: vec![ProductSales {
                name: "Electronics Item 1".to_string(),
                quantity_sold: 5,
                revenue: 250.0,
            }],
            daily_sales: (1..=10)
                .map(|d| DailySales {
                    date: NaiveDate::from_ymd_opt(2026, 1, d).unwrap(),
                    order_count: 1,
                    revenue: 100.0,
                })
                .collect(),
            orders_by_status,
            category_performance,
        }
    }

    #[test]
    fn renders_sections_in_fixed_order() {
        let prompt = build_analysis_prompt(&sample_data(), 30);

        let metrics = prompt.find("**Overall Metrics:**").unwrap();
        let status = prompt.find("**Orders by Status:**").unwrap();
        let categories = prompt.find("**Category Performance:**").unwrap();
        let products = prompt.find("**Top 5 Products:**").unwrap();
        let trend = prompt.find("**Daily Sales Trend (last 7 days):**").unwrap();
        assert!(metrics < status && status < categories);
        assert!(categories < products && products < trend);
    }

    #[test]
    fn includes_output_contract_markers() {
        let prompt = build_analysis_prompt(&sample_data(), 30);
        for marker in [
            "1. SUMMARY:",
            "2. TRENDS:",
            "3. RECOMMENDATIONS:",
            "RECOMMENDATION:\n",
            "Title:",
            "Description:",
            "Action:",
            "Category: [One of: Upsell, Pricing, Marketing, Inventory, Customer]",
            "Priority: [One of: High, Medium, Low]",
        ] {
            assert!(prompt.contains(marker), "missing marker: {marker}");
        }
    }

    #[test]
    fn empty_data_omits_optional_sections() {
        let prompt = build_analysis_prompt(&SalesAnalysisData::default(), 30);
        assert!(prompt.contains("- Total Orders: 0"));
        assert!(!prompt.contains("**Orders by Status:**"));
        assert!(!prompt.contains("**Category Performance:**"));
        assert!(!prompt.contains("**Top 5 Products:**"));
        assert!(!prompt.contains("**Daily Sales Trend"));
        // The output contract is always present.
        assert!(prompt.contains("RECOMMENDATION:\n"));
    }

    #[test]
    fn daily_trend_limited_to_last_seven_days() {
        let prompt = build_analysis_prompt(&sample_data(), 30);
        // Ten daily entries in the fixture; only Jan 04..Jan 10 should render.
        assert!(!prompt.contains("Jan 03"));
        assert!(prompt.contains("Jan 04"));
        assert!(prompt.contains("Jan 10"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let data = sample_data();
        assert_eq!(
            build_analysis_prompt(&data, 30),
            build_analysis_prompt(&data, 30)
        );
    }
}
