use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub id: i64,
    pub product_id: i64,
    pub sku: String,
    pub name: String,
    pub unit_price: f64,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub id: i64,
    pub customer_id: String,
    pub lines: Vec<CartLine>,
}

impl Cart {
    pub fn total(&self) -> f64 {
        self.lines
            .iter()
            .map(|l| l.unit_price * f64::from(l.quantity))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_sums_line_amounts() {
        let cart = Cart {
            id: 1,
            customer_id: "guest".to_string(),
            lines: vec![
                CartLine {
                    id: 1,
                    product_id: 10,
                    sku: "A".to_string(),
                    name: "A".to_string(),
                    unit_price: 2.5,
                    quantity: 2,
                },
                CartLine {
                    id: 2,
                    product_id: 11,
                    sku: "B".to_string(),
                    name: "B".to_string(),
                    unit_price: 10.0,
                    quantity: 1,
                },
            ],
        };
        assert!((cart.total() - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_cart_totals_zero() {
        let cart = Cart {
            id: 1,
            customer_id: "guest".to_string(),
            lines: vec![],
        };
        assert_eq!(cart.total(), 0.0);
    }
}
