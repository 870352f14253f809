use crate::domain::cart::{Cart, CartLine};
use crate::domain::order::{NewOrder, OrderLine, OrderStatus};
use anyhow::Context;
use chrono::Utc;
use sqlx::PgPool;

type CartLineRow = (i64, i64, String, String, f64, i32);

pub async fn cart_with_lines(pool: &PgPool, customer_id: &str) -> anyhow::Result<Cart> {
    let cart_id = get_or_create_cart(pool, customer_id).await?;

    let rows = sqlx::query_as::<_, CartLineRow>(
        "SELECT id, product_id, sku, name, unit_price, quantity \
         FROM cart_lines \
         WHERE cart_id = $1 \
         ORDER BY id",
    )
    .bind(cart_id)
    .fetch_all(pool)
    .await
    .context("select cart lines failed")?;

    let lines = rows
        .into_iter()
        .map(|(id, product_id, sku, name, unit_price, quantity)| CartLine {
            id,
            product_id,
            sku,
            name,
            unit_price,
            quantity,
        })
        .collect();

    Ok(Cart {
        id: cart_id,
        customer_id: customer_id.to_string(),
        lines,
    })
}

async fn get_or_create_cart(pool: &PgPool, customer_id: &str) -> anyhow::Result<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO carts (customer_id) VALUES ($1) \
         ON CONFLICT (customer_id) DO UPDATE SET customer_id = EXCLUDED.customer_id \
         RETURNING id",
    )
    .bind(customer_id)
    .fetch_one(pool)
    .await
    .context("get-or-create cart failed")?;
    Ok(id)
}

/// Adds a product to the cart, snapshotting name and unit price. Adding the
/// same product again increments the existing line.
pub async fn add_item(
    pool: &PgPool,
    customer_id: &str,
    product_id: i64,
    quantity: i32,
) -> anyhow::Result<()> {
    anyhow::ensure!(quantity > 0, "quantity must be positive");

    let product = crate::storage::products::get_product(pool, product_id)
        .await?
        .with_context(|| format!("product {product_id} not found"))?;
    anyhow::ensure!(product.is_active, "product {} is not active", product.sku);

    let cart_id = get_or_create_cart(pool, customer_id).await?;

    sqlx::query(
        "INSERT INTO cart_lines (cart_id, product_id, sku, name, unit_price, quantity) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (cart_id, product_id) \
         DO UPDATE SET quantity = cart_lines.quantity + EXCLUDED.quantity",
    )
    .bind(cart_id)
    .bind(product.id)
    .bind(&product.sku)
    .bind(&product.name)
    .bind(product.price)
    .bind(quantity)
    .execute(pool)
    .await
    .context("insert cart line failed")?;

    Ok(())
}

/// Sets an absolute quantity; zero (or below) removes the line.
pub async fn update_quantity(
    pool: &PgPool,
    customer_id: &str,
    line_id: i64,
    quantity: i32,
) -> anyhow::Result<()> {
    if quantity <= 0 {
        return remove_item(pool, customer_id, line_id).await;
    }

    sqlx::query(
        "UPDATE cart_lines SET quantity = $1 \
         WHERE id = $2 \
           AND cart_id = (SELECT id FROM carts WHERE customer_id = $3)",
    )
    .bind(quantity)
    .bind(line_id)
    .bind(customer_id)
    .execute(pool)
    .await
    .context("update cart line quantity failed")?;

    Ok(())
}

pub async fn remove_item(pool: &PgPool, customer_id: &str, line_id: i64) -> anyhow::Result<()> {
    sqlx::query(
        "DELETE FROM cart_lines \
         WHERE id = $1 \
           AND cart_id = (SELECT id FROM carts WHERE customer_id = $2)",
    )
    .bind(line_id)
    .bind(customer_id)
    .execute(pool)
    .await
    .context("remove cart line failed")?;

    Ok(())
}

pub async fn clear_cart(pool: &PgPool, customer_id: &str) -> anyhow::Result<()> {
    sqlx::query(
        "DELETE FROM cart_lines \
         WHERE cart_id = (SELECT id FROM carts WHERE customer_id = $1)",
    )
    .bind(customer_id)
    .execute(pool)
    .await
    .context("clear cart failed")?;

    Ok(())
}

/// Converts the cart into an order (status Created) and removes the checked-out
/// lines, all in one transaction. The lines are snapshotted with `FOR UPDATE`
/// and deleted by id, so a line added concurrently stays in the cart rather
/// than vanishing without joining the order. Returns the new order id, or
/// `None` for an empty cart.
pub async fn checkout(pool: &PgPool, customer_id: &str) -> anyhow::Result<Option<i64>> {
    let cart_id = get_or_create_cart(pool, customer_id).await?;

    let mut tx = pool.begin().await.context("begin checkout failed")?;

    let rows = sqlx::query_as::<_, CartLineRow>(
        "SELECT id, product_id, sku, name, unit_price, quantity \
         FROM cart_lines \
         WHERE cart_id = $1 \
         ORDER BY id \
         FOR UPDATE",
    )
    .bind(cart_id)
    .fetch_all(&mut *tx)
    .await
    .context("select cart lines for checkout failed")?;

    if rows.is_empty() {
        return Ok(None);
    }

    let (order, line_ids) = order_from_cart_rows(customer_id, &rows);

    let order_id = crate::storage::orders::insert_order_tx(&mut tx, &order).await?;
    sqlx::query("DELETE FROM cart_lines WHERE id = ANY($1)")
        .bind(&line_ids)
        .execute(&mut *tx)
        .await
        .context("empty cart after checkout failed")?;
    tx.commit().await.context("commit checkout failed")?;

    Ok(Some(order_id))
}

fn order_from_cart_rows(customer_id: &str, rows: &[CartLineRow]) -> (NewOrder, Vec<i64>) {
    let line_ids: Vec<i64> = rows.iter().map(|row| row.0).collect();
    let lines: Vec<OrderLine> = rows
        .iter()
        .map(|(_, _, sku, name, unit_price, quantity)| OrderLine {
            sku: sku.clone(),
            name: name.clone(),
            unit_price: *unit_price,
            quantity: *quantity,
        })
        .collect();
    let total = lines
        .iter()
        .map(|l| l.unit_price * f64::from(l.quantity))
        .sum();

    let order = NewOrder {
        customer_id: customer_id.to_string(),
        created_utc: Utc::now(),
        status: OrderStatus::Created,
        total,
        lines,
    };
    (order, line_ids)
}
