use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("unsupported url scheme: {0}")]
    UnsupportedScheme(String),
    #[error("url cannot carry a path: {0}")]
    CannotBeABase(String),
}

impl ApiError {
    /// HTTP status of a 4xx/5xx response, if that is what failed.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
