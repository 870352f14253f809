use serde::{Deserialize, Serialize};

/// Catalog record. Orders snapshot name/price at purchase time, so a product
/// row can change without rewriting order history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub sku: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub currency: String,
    pub is_active: bool,
}

impl Product {
    pub fn price_display(&self) -> String {
        let symbol = match self.currency.as_str() {
            "GBP" => "£",
            _ => "$",
        };
        format!("{symbol}{:.2}", self.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(currency: &str, price: f64) -> Product {
        Product {
            id: 1,
            sku: "SKU-1".to_string(),
            name: "Thing".to_string(),
            description: String::new(),
            category: "Home".to_string(),
            price,
            currency: currency.to_string(),
            is_active: true,
        }
    }

    #[test]
    fn formats_usd_and_gbp_prices() {
        assert_eq!(product("USD", 12.5).price_display(), "$12.50");
        assert_eq!(product("GBP", 9.99).price_display(), "£9.99");
    }
}
