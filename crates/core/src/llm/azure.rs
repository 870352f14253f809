use crate::config::Settings;
use crate::llm::{ChatCompleter, ChatMessage, CompletionError, CompletionOptions};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_API_VERSION: &str = "2024-02-15-preview";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Azure OpenAI chat-completions client. Constructed once at startup from
/// `Settings` and injected wherever a `ChatCompleter` is needed; there is no
/// lazily initialized global handle.
#[derive(Debug, Clone)]
pub struct AzureOpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    deployment: String,
    api_version: String,
}

impl AzureOpenAiClient {
    pub fn from_settings(settings: &Settings) -> Result<Self, CompletionError> {
        let endpoint = settings
            .azure_openai_endpoint
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                CompletionError::Configuration("AZURE_OPENAI_ENDPOINT is not set".to_string())
            })?
            .to_string();
        let api_key = settings
            .azure_openai_api_key
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                CompletionError::Configuration("AZURE_OPENAI_API_KEY is not set".to_string())
            })?
            .to_string();
        let deployment = settings
            .azure_openai_deployment
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                CompletionError::Configuration("AZURE_OPENAI_DEPLOYMENT is not set".to_string())
            })?
            .to_string();

        let api_version = std::env::var("AZURE_OPENAI_API_VERSION")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        let timeout_secs = std::env::var("AZURE_OPENAI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| CompletionError::Service {
                stage: "build_client",
                detail: e.to_string(),
                raw_body: None,
            })?;

        Ok(Self {
            http,
            endpoint,
            api_key,
            deployment,
            api_version,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.deployment,
            self.api_version
        )
    }

    fn headers(&self) -> Result<HeaderMap, CompletionError> {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(&self.api_key).map_err(|e| {
            CompletionError::Configuration(format!("API key is not a valid header value: {e}"))
        })?;
        headers.insert("api-key", value);
        Ok(headers)
    }
}

#[async_trait::async_trait]
impl ChatCompleter for AzureOpenAiClient {
    async fn complete_chat(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String, CompletionError> {
        let req = ChatCompletionRequest {
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        let res = self
            .http
            .post(self.url())
            .headers(self.headers()?)
            .json(&req)
            .send()
            .await
            .map_err(|e| CompletionError::Service {
                stage: "http",
                detail: e.to_string(),
                raw_body: None,
            })?;

        let status = res.status();
        let text = res.text().await.map_err(|e| CompletionError::Service {
            stage: "read_body",
            detail: e.to_string(),
            raw_body: None,
        })?;

        if !status.is_success() {
            return Err(CompletionError::Service {
                stage: "http",
                detail: format!("status={status}"),
                raw_body: Some(text),
            });
        }

        let parsed = serde_json::from_str::<ChatCompletionResponse>(&text).map_err(|e| {
            CompletionError::Service {
                stage: "decode",
                detail: e.to_string(),
                raw_body: Some(text.clone()),
            }
        })?;

        let reply = parsed
            .choices
            .into_iter()
            .find_map(|c| c.message.map(|m| m.content))
            .ok_or(CompletionError::Service {
                stage: "decode",
                detail: "response contained no choices".to_string(),
                raw_body: Some(text),
            })?;

        Ok(reply)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}
