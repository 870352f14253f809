use std::fmt;

/// Failure taxonomy for the completion boundary. Configuration problems are
/// distinguishable from provider/network failures so callers can log them
/// differently, but both degrade to a placeholder result rather than
/// propagating.
#[derive(Debug, Clone)]
pub enum CompletionError {
    Configuration(String),
    Service {
        stage: &'static str,
        detail: String,
        raw_body: Option<String>,
    },
}

impl CompletionError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, CompletionError::Configuration(_))
    }
}

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionError::Configuration(detail) => {
                write!(f, "completion service not configured: {detail}")
            }
            CompletionError::Service { stage, detail, .. } => {
                write!(f, "completion service error (stage={stage}): {detail}")
            }
        }
    }
}

impl std::error::Error for CompletionError {}
