use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("group id is required")]
    EmptyGroupId,
    #[error("invalid group id: {0}")]
    InvalidGroupId(String),
    #[error("access token is required")]
    EmptyAccessToken,
    #[error("invalid phone number: {0}")]
    InvalidPhoneNumber(String),
    #[error("invalid country code: {0}")]
    InvalidCountryCode(String),
}
