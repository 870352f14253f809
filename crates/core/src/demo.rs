//! Demo-order generation for exercising the analytics pipeline without real
//! traffic. Generated customers carry the `testuser_` prefix so cleanup can
//! find them again.

use crate::domain::order::{NewOrder, OrderLine, OrderStatus};
use crate::domain::product::Product;
use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use sqlx::PgPool;

pub const DEMO_CUSTOMER_PREFIX: &str = "testuser_";

const DEMO_WINDOW_DAYS: i64 = 30;

// Weighted toward Paid/Shipped so aggregates look like a live store.
const STATUS_POOL: [OrderStatus; 6] = [
    OrderStatus::Created,
    OrderStatus::Paid,
    OrderStatus::Paid,
    OrderStatus::Paid,
    OrderStatus::Shipped,
    OrderStatus::Shipped,
];

#[derive(Debug, Clone)]
pub struct DemoSeedSummary {
    pub orders_created: usize,
    pub order_lines_created: usize,
    pub total_revenue: f64,
    pub earliest_order: DateTime<Utc>,
    pub latest_order: DateTime<Utc>,
}

/// Pure generator: `count` orders spread uniformly over the trailing 30 days,
/// each with 1-5 distinct products at quantity 1-3. Totals always equal the
/// sum of the line amounts.
pub fn build_demo_orders<R: Rng>(
    products: &[Product],
    count: usize,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<NewOrder> {
    let window_secs = DEMO_WINDOW_DAYS * 24 * 3600;
    let mut orders = Vec::with_capacity(count);

    for _ in 0..count {
        let customer_id = format!("{DEMO_CUSTOMER_PREFIX}{}", rng.gen_range(1000..10000));
        let created_utc = now - Duration::seconds(rng.gen_range(0..window_secs));

        let product_count = rng.gen_range(1..=5).min(products.len());
        let selected: Vec<&Product> = products
            .choose_multiple(rng, product_count)
            .collect();

        let mut lines = Vec::with_capacity(selected.len());
        let mut total = 0.0;
        for product in selected {
            let quantity = rng.gen_range(1..=3);
            total += product.price * f64::from(quantity);
            lines.push(OrderLine {
                sku: product.sku.clone(),
                name: product.name.clone(),
                unit_price: product.price,
                quantity,
            });
        }

        orders.push(NewOrder {
            customer_id,
            created_utc,
            status: *STATUS_POOL
                .choose(rng)
                .unwrap_or(&OrderStatus::Paid),
            total,
            lines,
        });
    }

    orders
}

pub async fn seed_demo_orders(pool: &PgPool, count: usize) -> anyhow::Result<DemoSeedSummary> {
    let products = crate::storage::products::list_active_products(pool, None, None).await?;
    anyhow::ensure!(
        !products.is_empty(),
        "no active products available to generate demo orders"
    );

    let now = Utc::now();
    let orders = build_demo_orders(&products, count, now, &mut rand::thread_rng());

    let mut order_lines_created = 0;
    let mut total_revenue = 0.0;
    for order in &orders {
        crate::storage::orders::insert_order(pool, order)
            .await
            .context("insert demo order failed")?;
        order_lines_created += order.lines.len();
        total_revenue += order.total;
    }

    tracing::info!(
        orders = orders.len(),
        lines = order_lines_created,
        "seeded demo orders"
    );

    Ok(DemoSeedSummary {
        orders_created: orders.len(),
        order_lines_created,
        total_revenue,
        earliest_order: now - Duration::days(DEMO_WINDOW_DAYS),
        latest_order: now,
    })
}

pub async fn cleanup_demo_orders(pool: &PgPool) -> anyhow::Result<u64> {
    let deleted =
        crate::storage::orders::delete_orders_with_customer_prefix(pool, DEMO_CUSTOMER_PREFIX)
            .await?;
    tracing::info!(deleted, "removed demo orders");
    Ok(deleted)
}

/// Inserts a small default catalog when the products table is empty, so a
/// fresh database can serve the storefront and the seeder immediately.
pub async fn ensure_demo_catalog(pool: &PgPool) -> anyhow::Result<u64> {
    if crate::storage::products::count_products(pool).await? > 0 {
        return Ok(0);
    }

    let mut inserted = 0;
    for product in default_catalog() {
        crate::storage::products::upsert_product(pool, &product).await?;
        inserted += 1;
    }
    tracing::info!(inserted, "seeded default catalog");
    Ok(inserted)
}

fn default_catalog() -> Vec<Product> {
    let entries: [(&str, &str, &str, f64); 12] = [
        ("ELEC-001", "Wireless Earbuds", "Electronics", 59.99),
        ("ELEC-002", "Portable Speaker", "Electronics", 89.99),
        ("ELEC-003", "USB-C Charger", "Electronics", 24.99),
        ("APRL-001", "Cotton T-Shirt", "Apparel", 14.99),
        ("APRL-002", "Hooded Sweatshirt", "Apparel", 39.99),
        ("FOOT-001", "Running Shoes", "Footwear", 79.99),
        ("FOOT-002", "Canvas Sneakers", "Footwear", 44.99),
        ("HOME-001", "Ceramic Mug", "Home", 9.99),
        ("HOME-002", "Throw Blanket", "Home", 29.99),
        ("ACCS-001", "Leather Wallet", "Accessories", 34.99),
        ("ACCS-002", "Canvas Tote Bag", "Accessories", 19.99),
        ("BEAU-001", "Hand Cream", "Beauty", 12.99),
    ];

    entries
        .into_iter()
        .map(|(sku, name, category, price)| Product {
            id: 0,
            sku: sku.to_string(),
            name: name.to_string(),
            description: format!("{name} from our {category} range."),
            category: category.to_string(),
            price,
            currency: "USD".to_string(),
            is_active: true,
        })
        .collect()
}
