#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} responded with status {status}")]
    UnexpectedStatus { service: &'static str, status: u16 },

    #[error("circuit breaker open for {0}")]
    CircuitOpen(&'static str),

    #[error("invalid collaborator URL: {0}")]
    InvalidUrl(String),

    #[error("token rejected")]
    Unauthorized,
}
