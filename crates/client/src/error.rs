use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("the server did not accept the {0}")]
    Rejected(&'static str),

    #[error("cookie store error: {0}")]
    Cookie(#[from] std::io::Error),

    #[error("malformed cookie store: {0}")]
    CookieFormat(#[from] serde_json::Error),

    #[error("{0}")]
    Invalid(String),

    #[error("not logged in")]
    NotAuthenticated,

    #[error("idea {0} not found")]
    UnknownIdea(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
