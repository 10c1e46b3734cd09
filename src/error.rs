use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request failed: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    #[error("invalid response body: {0}")]
    Json(#[from] serde_json::Error),

    /// Error payload returned by the content API
    #[error("{name} ({status}): {message}")]
    Api {
        status: u16,
        name: String,
        message: String,
    },

    #[error("clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
