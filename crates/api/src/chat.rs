use crate::{internal_error, AppState};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use storefront_core::llm::ChatMessage;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Shopping-assistant turn. Completion failures surface as a friendly
/// fallback reply, never as an error status; only a database failure (the
/// catalog feeds the system prompt) produces a 5xx.
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, StatusCode> {
    let Some(pool) = &state.pool else {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };
    if req.message.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let products = storefront_core::storage::products::list_active_products(pool, None, None)
        .await
        .map_err(internal_error)?;

    let reply = match &state.completer {
        Some(completer) => {
            storefront_core::chat::chat_response(
                completer.as_ref(),
                &products,
                &req.history,
                &req.message,
                &state.completion_options,
            )
            .await
        }
        None => storefront_core::chat::CONFIG_FALLBACK.to_string(),
    };

    Ok(Json(ChatResponse { reply }))
}
