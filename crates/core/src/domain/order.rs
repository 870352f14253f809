use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Created,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "Created",
            OrderStatus::Paid => "Paid",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            s if s.eq_ignore_ascii_case("Created") => Some(OrderStatus::Created),
            s if s.eq_ignore_ascii_case("Paid") => Some(OrderStatus::Paid),
            s if s.eq_ignore_ascii_case("Shipped") => Some(OrderStatus::Shipped),
            s if s.eq_ignore_ascii_case("Delivered") => Some(OrderStatus::Delivered),
            s if s.eq_ignore_ascii_case("Cancelled") => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A line captures the product name and unit price as they were when the
/// order was placed, keyed back to the catalog only by SKU.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub sku: String,
    pub name: String,
    pub unit_price: f64,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub customer_id: String,
    pub created_utc: DateTime<Utc>,
    pub status: OrderStatus,
    pub total: f64,
    pub lines: Vec<OrderLine>,
}

/// Order payload before it has been assigned an id by the database.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: String,
    pub created_utc: DateTime<Utc>,
    pub status: OrderStatus,
    pub total: f64,
    pub lines: Vec<OrderLine>,
}
