use crate::domain::order::{NewOrder, Order, OrderLine, OrderStatus};
use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;

type OrderRow = (i64, String, DateTime<Utc>, String, f64);
type LineRow = (i64, String, String, f64, i32);

/// Orders created at or after the cutoff, with their lines attached. This is
/// the read side of the analytics pipeline; it never mutates anything.
pub async fn orders_since(pool: &PgPool, cutoff: DateTime<Utc>) -> anyhow::Result<Vec<Order>> {
    let rows = sqlx::query_as::<_, OrderRow>(
        "SELECT id, customer_id, created_utc, status, total \
         FROM orders \
         WHERE created_utc >= $1 \
         ORDER BY created_utc",
    )
    .bind(cutoff)
    .fetch_all(pool)
    .await
    .context("select orders since cutoff failed")?;

    attach_lines(pool, rows).await
}

pub async fn orders_for_customer(pool: &PgPool, customer_id: &str) -> anyhow::Result<Vec<Order>> {
    let rows = sqlx::query_as::<_, OrderRow>(
        "SELECT id, customer_id, created_utc, status, total \
         FROM orders \
         WHERE customer_id = $1 \
         ORDER BY created_utc DESC",
    )
    .bind(customer_id)
    .fetch_all(pool)
    .await
    .context("select orders for customer failed")?;

    attach_lines(pool, rows).await
}

async fn attach_lines(pool: &PgPool, rows: Vec<OrderRow>) -> anyhow::Result<Vec<Order>> {
    let ids: Vec<i64> = rows.iter().map(|r| r.0).collect();

    let line_rows = sqlx::query_as::<_, LineRow>(
        "SELECT order_id, sku, name, unit_price, quantity \
         FROM order_lines \
         WHERE order_id = ANY($1) \
         ORDER BY id",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await
    .context("select order lines failed")?;

    let mut lines_by_order: HashMap<i64, Vec<OrderLine>> = HashMap::new();
    for (order_id, sku, name, unit_price, quantity) in line_rows {
        lines_by_order.entry(order_id).or_default().push(OrderLine {
            sku,
            name,
            unit_price,
            quantity,
        });
    }

    let mut orders = Vec::with_capacity(rows.len());
    for (id, customer_id, created_utc, status, total) in rows {
        let status = OrderStatus::parse(&status)
            .with_context(|| format!("unknown order status in DB for order {id}: {status}"))?;
        orders.push(Order {
            id,
            customer_id,
            created_utc,
            status,
            total,
            lines: lines_by_order.remove(&id).unwrap_or_default(),
        });
    }
    Ok(orders)
}

pub async fn insert_order(pool: &PgPool, order: &NewOrder) -> anyhow::Result<i64> {
    let mut tx = pool.begin().await.context("begin transaction failed")?;
    let order_id = insert_order_tx(&mut tx, order).await?;
    tx.commit().await.context("commit transaction failed")?;
    Ok(order_id)
}

pub(crate) async fn insert_order_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    order: &NewOrder,
) -> anyhow::Result<i64> {
    let order_id: i64 = sqlx::query_scalar(
        "INSERT INTO orders (customer_id, created_utc, status, total) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id",
    )
    .bind(&order.customer_id)
    .bind(order.created_utc)
    .bind(order.status.as_str())
    .bind(order.total)
    .fetch_one(&mut **tx)
    .await
    .context("insert order failed")?;

    for line in &order.lines {
        sqlx::query(
            "INSERT INTO order_lines (order_id, sku, name, unit_price, quantity) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(order_id)
        .bind(&line.sku)
        .bind(&line.name)
        .bind(line.unit_price)
        .bind(line.quantity)
        .execute(&mut **tx)
        .await
        .context("insert order line failed")?;
    }

    Ok(order_id)
}

/// Deletes orders whose customer id carries the given prefix; lines cascade.
pub async fn delete_orders_with_customer_prefix(
    pool: &PgPool,
    prefix: &str,
) -> anyhow::Result<u64> {
    let result = sqlx::query("DELETE FROM orders WHERE customer_id LIKE $1 || '%'")
        .bind(prefix)
        .execute(pool)
        .await
        .context("delete orders by customer prefix failed")?;
    Ok(result.rows_affected())
}
