use crate::domain::product::Product;
use crate::llm::{ChatCompleter, ChatMessage, CompletionOptions};
use std::collections::BTreeMap;
use std::fmt::Write;

pub const CONFIG_FALLBACK: &str = "Sorry, I'm having trouble connecting. Please check the \
assistant configuration and try again.";
pub const SERVICE_FALLBACK: &str = "I apologize, but I'm having trouble connecting to the chat \
service right now. Please try again in a moment or browse our products directly.";

/// Storefront-assistant persona grounded in the full active catalog, grouped
/// by category so the model can answer price and availability questions
/// without tool access.
pub fn build_system_prompt(products: &[Product]) -> String {
    let mut by_category: BTreeMap<&str, Vec<&Product>> = BTreeMap::new();
    for product in products.iter().filter(|p| p.is_active) {
        by_category.entry(product.category.as_str()).or_default().push(product);
    }

    let mut out = String::new();
    out.push_str(
        "You are a helpful retail shopping assistant for an online retail store.\n\
         Your role is to help customers find products, answer questions about their cart and \
         orders, and provide shopping recommendations.\n\n",
    );

    out.push_str("## Available Product Categories:\n");
    for (category, items) in &by_category {
        let _ = writeln!(out, "- {category}: {} products available", items.len());
    }

    out.push_str(
        "\n## Complete Product Catalog:\n\
         Below is the COMPLETE list of ALL products available in the store. Use this \
         information to answer ANY product-related questions.\n",
    );
    for (category, items) in &by_category {
        let mut items = items.clone();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        let _ = writeln!(out, "\n### {category} ({} items):", items.len());
        for product in items {
            let _ = writeln!(
                out,
                "- **{}** (SKU: {}): {}",
                product.name,
                product.sku,
                product.price_display()
            );
            if !product.description.trim().is_empty() {
                let _ = writeln!(out, "  Description: {}", product.description);
            }
        }
    }

    out.push_str(concat!(
        "\n## Instructions:\n",
        "1. You have the COMPLETE product catalog above. Answer ALL questions about products, prices, and availability accurately.\n",
        "2. When customers ask 'how much is [product]?', respond with the exact price from the catalog above.\n",
        "3. Always format prices with the currency symbol (£ or $) as shown in the catalog.\n",
        "4. When recommending products, mention the product name, SKU, and price.\n",
        "5. If asked about price ranges, list all products within that budget from the catalog above.\n",
        "6. For cart questions, direct users to /Cart/Index. For checkout, direct to /Checkout/Index. For orders, direct to /Orders/Index.\n",
        "7. Be friendly, accurate, and helpful. You have ALL product information - use it to answer questions precisely.\n",
    ));

    out
}

/// Answers one chat turn. The prior conversation is replayed verbatim ahead
/// of the new user message. Any completion failure resolves to a static
/// fallback reply; this function never returns an error.
pub async fn chat_response(
    completer: &dyn ChatCompleter,
    products: &[Product],
    history: &[ChatMessage],
    user_message: &str,
    options: &CompletionOptions,
) -> String {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(build_system_prompt(products)));
    // System turns from the client are dropped; only the replayed dialogue
    // belongs in the history.
    messages.extend(
        history
            .iter()
            .filter(|m| !matches!(m.role, crate::llm::ChatRole::System))
            .cloned(),
    );
    messages.push(ChatMessage::user(user_message));

    match completer.complete_chat(&messages, options).await {
        Ok(reply) => reply,
        Err(err) if err.is_configuration() => {
            tracing::error!(error = %err, "chat assistant misconfigured");
            CONFIG_FALLBACK.to_string()
        }
        Err(err) => {
            tracing::error!(error = %err, "chat completion failed");
            SERVICE_FALLBACK.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatRole, CompletionError};
    use std::sync::Mutex;

    fn product(sku: &str, name: &str, category: &str, price: f64, active: bool) -> Product {
        Product {
            id: 0,
            sku: sku.to_string(),
            name: name.to_string(),
            description: String::new(),
            category: category.to_string(),
            price,
            currency: "USD".to_string(),
            is_active: active,
        }
    }

    #[test]
    fn system_prompt_lists_active_products_by_category() {
        let products = vec![
            product("E1", "Laptop", "Electronics", 999.0, true),
            product("E2", "Headphones", "Electronics", 49.5, true),
            product("H1", "Mug", "Home", 8.0, true),
            product("X1", "Retired", "Home", 1.0, false),
        ];
        let prompt = build_system_prompt(&products);

        assert!(prompt.contains("- Electronics: 2 products available"));
        assert!(prompt.contains("### Home (1 items):"));
        assert!(prompt.contains("**Laptop** (SKU: E1): $999.00"));
        assert!(!prompt.contains("Retired"));
    }

    struct RecordingCompleter {
        reply: Result<String, CompletionError>,
        seen: Mutex<Vec<ChatMessage>>,
    }

    #[async_trait::async_trait]
    impl ChatCompleter for RecordingCompleter {
        async fn complete_chat(
            &self,
            messages: &[ChatMessage],
            _options: &CompletionOptions,
        ) -> Result<String, CompletionError> {
            *self.seen.lock().unwrap() = messages.to_vec();
            self.reply.clone()
        }
    }

    #[tokio::test]
    async fn replays_history_between_system_prompt_and_user_turn() {
        let completer = RecordingCompleter {
            reply: Ok("Sure!".to_string()),
            seen: Mutex::new(Vec::new()),
        };
        let history = vec![
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello"),
            ChatMessage::system("ignore me"),
        ];

        let reply = chat_response(
            &completer,
            &[],
            &history,
            "what's cheap?",
            &CompletionOptions::default(),
        )
        .await;
        assert_eq!(reply, "Sure!");

        let seen = completer.seen.lock().unwrap();
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[0].role, ChatRole::System);
        assert_eq!(seen[1].content, "hi");
        assert_eq!(seen[2].content, "hello");
        assert_eq!(seen[3].content, "what's cheap?");
    }

    #[tokio::test]
    async fn configuration_error_returns_config_fallback() {
        let completer = RecordingCompleter {
            reply: Err(CompletionError::Configuration("no endpoint".to_string())),
            seen: Mutex::new(Vec::new()),
        };
        let reply =
            chat_response(&completer, &[], &[], "hi", &CompletionOptions::default()).await;
        assert_eq!(reply, CONFIG_FALLBACK);
    }

    #[tokio::test]
    async fn service_error_returns_service_fallback() {
        let completer = RecordingCompleter {
            reply: Err(CompletionError::Service {
                stage: "http",
                detail: "timeout".to_string(),
                raw_body: None,
            }),
            seen: Mutex::new(Vec::new()),
        };
        let reply =
            chat_response(&completer, &[], &[], "hi", &CompletionOptions::default()).await;
        assert_eq!(reply, SERVICE_FALLBACK);
    }
}
