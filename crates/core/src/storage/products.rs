use crate::domain::product::Product;
use anyhow::Context;
use sqlx::PgPool;

type ProductRow = (i64, String, String, String, String, f64, String, bool);

fn into_product(row: ProductRow) -> Product {
    let (id, sku, name, description, category, price, currency, is_active) = row;
    Product {
        id,
        sku,
        name,
        description,
        category,
        price,
        currency,
        is_active,
    }
}

/// Active catalog, optionally filtered by category and/or a naive name /
/// description substring search.
pub async fn list_active_products(
    pool: &PgPool,
    category: Option<&str>,
    query: Option<&str>,
) -> anyhow::Result<Vec<Product>> {
    let pattern = query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(|q| format!("%{q}%"));

    let rows = sqlx::query_as::<_, ProductRow>(
        "SELECT id, sku, name, description, category, price, currency, is_active \
         FROM products \
         WHERE is_active \
           AND ($1::text IS NULL OR category = $1) \
           AND ($2::text IS NULL OR name ILIKE $2 OR description ILIKE $2) \
         ORDER BY category, name",
    )
    .bind(category)
    .bind(pattern)
    .fetch_all(pool)
    .await
    .context("select products failed")?;

    Ok(rows.into_iter().map(into_product).collect())
}

/// Full catalog including inactive rows, used to enrich analytics with
/// category data.
pub async fn all_products(pool: &PgPool) -> anyhow::Result<Vec<Product>> {
    let rows = sqlx::query_as::<_, ProductRow>(
        "SELECT id, sku, name, description, category, price, currency, is_active \
         FROM products \
         ORDER BY id",
    )
    .fetch_all(pool)
    .await
    .context("select all products failed")?;

    Ok(rows.into_iter().map(into_product).collect())
}

pub async fn get_product(pool: &PgPool, id: i64) -> anyhow::Result<Option<Product>> {
    let row = sqlx::query_as::<_, ProductRow>(
        "SELECT id, sku, name, description, category, price, currency, is_active \
         FROM products \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("select product by id failed")?;

    Ok(row.map(into_product))
}

pub async fn upsert_product(pool: &PgPool, product: &Product) -> anyhow::Result<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO products (sku, name, description, category, price, currency, is_active) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         ON CONFLICT (sku) DO UPDATE SET \
           name = EXCLUDED.name, \
           description = EXCLUDED.description, \
           category = EXCLUDED.category, \
           price = EXCLUDED.price, \
           currency = EXCLUDED.currency, \
           is_active = EXCLUDED.is_active \
         RETURNING id",
    )
    .bind(&product.sku)
    .bind(&product.name)
    .bind(&product.description)
    .bind(&product.category)
    .bind(product.price)
    .bind(&product.currency)
    .bind(product.is_active)
    .fetch_one(pool)
    .await
    .context("upsert product failed")?;

    Ok(id)
}

pub async fn count_products(pool: &PgPool) -> anyhow::Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await
        .context("count products failed")?;
    Ok(count)
}
