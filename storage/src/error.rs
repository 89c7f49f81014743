use std::fmt;

use serde::Deserialize;

/// An error object reported by the store itself.
///
/// Mirrors the body PostgREST answers with on a failed request; Postgres
/// database errors are mapped onto the same shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiError {
    /// Human readable description.
    #[serde(default)]
    pub message: String,

    /// SQLSTATE or PostgREST error code.
    #[serde(default)]
    pub code: Option<String>,

    /// Additional details.
    #[serde(default)]
    pub details: Option<String>,

    /// Hint suggested by the store.
    #[serde(default)]
    pub hint: Option<String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({code})", self.message)?,
            None => write!(f, "{}", self.message)?,
        }

        if let Some(details) = &self.details {
            write!(f, ": {details}")?;
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum Error {
    #[error("store rejected the request: {0}")]
    Rejected(ApiError),

    #[error(transparent)]
    PgError(sqlx::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("{0:?} is not a valid table or column name")]
    InvalidIdentifier(String),
}

impl From<sqlx::Error> for Error {
    fn from(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::Database(e) => Self::Rejected(ApiError {
                message: e.message().to_string(),
                code: e.code().map(|c| c.into_owned()),
                details: None,
                hint: None,
            }),
            e => Self::PgError(e),
        }
    }
}

/// Crate result type.
pub type Result<T> = std::result::Result<T, Error>;
