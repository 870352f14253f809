pub mod analytics;
pub mod chat;
pub mod demo;
pub mod domain;
pub mod llm;
pub mod storage;

pub mod config {
    use anyhow::Context;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub database_url: Option<String>,
        pub azure_openai_endpoint: Option<String>,
        pub azure_openai_api_key: Option<String>,
        pub azure_openai_deployment: Option<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                database_url: std::env::var("DATABASE_URL").ok(),
                azure_openai_endpoint: std::env::var("AZURE_OPENAI_ENDPOINT").ok(),
                azure_openai_api_key: std::env::var("AZURE_OPENAI_API_KEY").ok(),
                azure_openai_deployment: std::env::var("AZURE_OPENAI_DEPLOYMENT").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }

        pub fn require_database_url(&self) -> anyhow::Result<&str> {
            self.database_url
                .as_deref()
                .context("DATABASE_URL is required")
        }
    }
}
