use crate::analytics::{CategoryPerformance, DailySales, ProductSales, SalesAnalysisData};
use crate::domain::order::Order;
use crate::domain::product::Product;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

const TOP_PRODUCT_LIMIT: usize = 10;

/// Reduces the selected orders plus the current catalog into summary
/// statistics. Pure function of its inputs: the caller decides the window
/// (orders are assumed to be pre-filtered by creation time) and this never
/// touches storage. An empty order set degrades to zeros and empty
/// collections.
pub fn analyze_orders(orders: &[Order], catalog: &[Product]) -> SalesAnalysisData {
    let total_orders = orders.len() as u64;
    let total_revenue: f64 = orders.iter().map(|o| o.total).sum();
    let average_order_value = if orders.is_empty() {
        0.0
    } else {
        total_revenue / orders.len() as f64
    };

    let mut orders_by_status: HashMap<String, u64> = HashMap::new();
    for order in orders {
        *orders_by_status
            .entry(order.status.as_str().to_string())
            .or_insert(0) += 1;
    }

    // BTreeMap keeps the daily series in ascending date order.
    let mut daily: BTreeMap<chrono::NaiveDate, (u64, f64)> = BTreeMap::new();
    for order in orders {
        let entry = daily.entry(order.created_utc.date_naive()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += order.total;
    }
    let daily_sales = daily
        .into_iter()
        .map(|(date, (order_count, revenue))| DailySales {
            date,
            order_count,
            revenue,
        })
        .collect();

    SalesAnalysisData {
        total_orders,
        total_revenue,
        average_order_value,
        top_products: top_products(orders),
        daily_sales,
        orders_by_status,
        category_performance: category_performance(orders, catalog),
    }
}

/// Order lines grouped by the product-name snapshot, ranked by revenue.
fn top_products(orders: &[Order]) -> Vec<ProductSales> {
    let mut by_name: HashMap<&str, (u64, f64)> = HashMap::new();
    for line in orders.iter().flat_map(|o| o.lines.iter()) {
        let entry = by_name.entry(line.name.as_str()).or_insert((0, 0.0));
        entry.0 += line.quantity.max(0) as u64;
        entry.1 += line.unit_price * f64::from(line.quantity);
    }

    let mut products: Vec<ProductSales> = by_name
        .into_iter()
        .map(|(name, (quantity_sold, revenue))| ProductSales {
            name: name.to_string(),
            quantity_sold,
            revenue,
        })
        .collect();

    // Revenue descending; name as a deterministic tie-break.
    products.sort_by(|a, b| {
        b.revenue
            .partial_cmp(&a.revenue)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    products.truncate(TOP_PRODUCT_LIMIT);
    products
}

/// Per-category rollup. Lines are joined to the *current* catalog by SKU;
/// lines whose SKU no longer exists in the catalog are dropped. Note the
/// category comes from the live product record, not the order-time snapshot,
/// so recategorized products move their historical revenue with them.
fn category_performance(
    orders: &[Order],
    catalog: &[Product],
) -> HashMap<String, CategoryPerformance> {
    let by_sku: HashMap<&str, &Product> =
        catalog.iter().map(|p| (p.sku.as_str(), p)).collect();

    struct Accum<'a> {
        skus: HashSet<&'a str>,
        units: u64,
        revenue: f64,
        unit_price_sum: f64,
        line_count: u64,
    }

    let mut by_category: HashMap<&str, Accum<'_>> = HashMap::new();
    for line in orders.iter().flat_map(|o| o.lines.iter()) {
        let Some(product) = by_sku.get(line.sku.as_str()) else {
            continue;
        };
        let acc = by_category
            .entry(product.category.as_str())
            .or_insert_with(|| Accum {
                skus: HashSet::new(),
                units: 0,
                revenue: 0.0,
                unit_price_sum: 0.0,
                line_count: 0,
            });
        acc.skus.insert(line.sku.as_str());
        acc.units += line.quantity.max(0) as u64;
        acc.revenue += line.unit_price * f64::from(line.quantity);
        acc.unit_price_sum += line.unit_price;
        acc.line_count += 1;
    }

    by_category
        .into_iter()
        .map(|(category, acc)| {
            let average_price = if acc.line_count == 0 {
                0.0
            } else {
                acc.unit_price_sum / acc.line_count as f64
            };
            (
                category.to_string(),
                CategoryPerformance {
                    category: category.to_string(),
                    product_count: acc.skus.len() as u64,
                    units_sold: acc.units,
                    revenue: acc.revenue,
                    average_price,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{OrderLine, OrderStatus};
    use chrono::{TimeZone, Utc};

    fn product(sku: &str, category: &str, price: f64) -> Product {
        Product {
            id: 0,
            sku: sku.to_string(),
            name: format!("{sku} name"),
            description: String::new(),
            category: category.to_string(),
            price,
            currency: "USD".to_string(),
            is_active: true,
        }
    }

    fn line(sku: &str, name: &str, unit_price: f64, quantity: i32) -> OrderLine {
        OrderLine {
            sku: sku.to_string(),
            name: name.to_string(),
            unit_price,
            quantity,
        }
    }

    fn order(day: u32, status: OrderStatus, lines: Vec<OrderLine>) -> Order {
        let total = lines
            .iter()
            .map(|l| l.unit_price * f64::from(l.quantity))
            .sum();
        Order {
            id: 0,
            customer_id: "c1".to_string(),
            created_utc: Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap(),
            status,
            total,
            lines,
        }
    }

    #[test]
    fn empty_window_degrades_to_zeros() {
        let data = analyze_orders(&[], &[]);
        assert_eq!(data.total_orders, 0);
        assert_eq!(data.total_revenue, 0.0);
        assert_eq!(data.average_order_value, 0.0);
        assert!(data.top_products.is_empty());
        assert!(data.daily_sales.is_empty());
        assert!(data.orders_by_status.is_empty());
        assert!(data.category_performance.is_empty());
    }

    #[test]
    fn average_times_count_equals_revenue() {
        let orders = vec![
            order(1, OrderStatus::Paid, vec![line("A", "A", 10.0, 2)]),
            order(2, OrderStatus::Paid, vec![line("B", "B", 7.5, 1)]),
            order(3, OrderStatus::Shipped, vec![line("A", "A", 10.0, 1)]),
        ];
        let data = analyze_orders(&orders, &[]);
        assert_eq!(data.total_orders, 3);
        let reconstructed = data.average_order_value * data.total_orders as f64;
        assert!((reconstructed - data.total_revenue).abs() < 1e-9);
    }

    #[test]
    fn daily_sales_are_ascending_by_date() {
        let orders = vec![
            order(9, OrderStatus::Paid, vec![line("A", "A", 1.0, 1)]),
            order(2, OrderStatus::Paid, vec![line("A", "A", 1.0, 1)]),
            order(2, OrderStatus::Paid, vec![line("A", "A", 1.0, 1)]),
            order(5, OrderStatus::Paid, vec![line("A", "A", 1.0, 1)]),
        ];
        let data = analyze_orders(&orders, &[]);
        assert_eq!(data.daily_sales.len(), 3);
        for pair in data.daily_sales.windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
        assert_eq!(data.daily_sales[0].order_count, 2);
    }

    #[test]
    fn orders_grouped_by_status() {
        let orders = vec![
            order(1, OrderStatus::Paid, vec![]),
            order(1, OrderStatus::Paid, vec![]),
            order(2, OrderStatus::Created, vec![]),
        ];
        let data = analyze_orders(&orders, &[]);
        assert_eq!(data.orders_by_status.get("Paid"), Some(&2));
        assert_eq!(data.orders_by_status.get("Created"), Some(&1));
        assert_eq!(data.orders_by_status.get("Shipped"), None);
    }

    #[test]
    fn top_products_sorted_by_revenue_and_capped_at_ten() {
        let lines: Vec<OrderLine> = (0..15)
            .map(|i| line(&format!("S{i}"), &format!("P{i:02}"), (i + 1) as f64, 1))
            .collect();
        let orders = vec![order(1, OrderStatus::Paid, lines)];
        let data = analyze_orders(&orders, &[]);

        assert_eq!(data.top_products.len(), 10);
        for pair in data.top_products.windows(2) {
            assert!(pair[0].revenue >= pair[1].revenue);
        }
        assert_eq!(data.top_products[0].name, "P14");
    }

    #[test]
    fn top_product_revenue_ties_break_by_name() {
        let orders = vec![order(
            1,
            OrderStatus::Paid,
            vec![line("B", "Bravo", 5.0, 2), line("A", "Alpha", 10.0, 1)],
        )];
        let data = analyze_orders(&orders, &[]);
        assert_eq!(data.top_products[0].name, "Alpha");
        assert_eq!(data.top_products[1].name, "Bravo");
    }

    #[test]
    fn unknown_skus_are_excluded_from_categories() {
        let catalog = vec![product("A", "Electronics", 10.0)];
        let orders = vec![order(
            1,
            OrderStatus::Paid,
            vec![
                line("A", "Known", 10.0, 2),
                line("GONE", "Discontinued", 99.0, 1),
            ],
        )];
        let data = analyze_orders(&orders, &catalog);

        assert_eq!(data.category_performance.len(), 1);
        let perf = &data.category_performance["Electronics"];
        assert_eq!(perf.units_sold, 2);
        assert_eq!(perf.product_count, 1);
        assert!((perf.revenue - 20.0).abs() < 1e-9);
    }

    #[test]
    fn category_average_price_is_line_weighted() {
        let catalog = vec![product("A", "Home", 10.0), product("B", "Home", 30.0)];
        let orders = vec![order(
            1,
            OrderStatus::Paid,
            vec![line("A", "A", 10.0, 5), line("B", "B", 30.0, 1)],
        )];
        let data = analyze_orders(&orders, &catalog);
        let perf = &data.category_performance["Home"];
        // Two lines at 10 and 30: the average is over lines, not units.
        assert!((perf.average_price - 20.0).abs() < 1e-9);
        assert_eq!(perf.units_sold, 6);
        assert_eq!(perf.product_count, 2);
    }

    #[test]
    fn category_uses_current_catalog_not_line_snapshot() {
        // The line was sold as "Gadget" but the catalog now files the SKU
        // under Accessories; revenue follows the live category.
        let catalog = vec![product("A", "Accessories", 10.0)];
        let orders = vec![order(1, OrderStatus::Paid, vec![line("A", "Gadget", 10.0, 1)])];
        let data = analyze_orders(&orders, &catalog);
        assert!(data.category_performance.contains_key("Accessories"));
    }
}
