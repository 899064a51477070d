use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider rejected request (HTTP {status}{}): {message}", code_suffix(.code))]
    Rejected {
        status: u16,
        code: Option<i64>,
        message: String,
    },

    #[error("unexpected provider response: {0}")]
    Decode(String),
}

fn code_suffix(code: &Option<i64>) -> String {
    match code {
        Some(code) => format!(", code {}", code),
        None => String::new(),
    }
}

impl ProviderError {
    /// Failures worth another attempt. Message and call creation is not
    /// idempotent, so a transport error only qualifies when the connection
    /// was never established. A timeout on an open connection may follow an
    /// accepted request.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Transport(e) => e.is_connect(),
            ProviderError::Rejected { status, .. } => *status == 429 || *status >= 500,
            ProviderError::Decode(_) => false,
        }
    }
}
