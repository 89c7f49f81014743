#![deny(unused_crate_dependencies)]
#![warn(missing_docs)]
#![warn(unused_extern_crates)]
#![warn(unused_imports)]

//! Exercise storage operations.
//!
//! The [`Store`] trait is the narrow surface the reset tool needs from a
//! data store: a filtered bulk delete and a filtered count. It is
//! implemented for a direct Postgres connection ([`PgStore`]) and for a
//! hosted PostgREST endpoint ([`RestStore`]).

use async_trait::async_trait;

mod error;
mod postgres;
mod rest;

pub use error::{ApiError, Error, Result};
pub use postgres::PgStore;
pub use rest::RestStore;

/// Identifier that no real record carries.
///
/// Filtering on `id != SENTINEL_ID` matches every row, which lets stores
/// that refuse unfiltered deletes perform a bulk delete.
pub const SENTINEL_ID: &str = "00000000-0000-0000-0000-000000000000";

/// Name of the table holding exercises.
pub const EXERCISES_TABLE: &str = "exercises";

/// Column identifying a record.
pub const ID_COLUMN: &str = "id";

/// A data store exposing filtered deletes on named tables.
#[async_trait]
pub trait Store: Send + Sync {
    /// Delete every row of `table` whose `column` is not equal to `value`.
    ///
    /// Returns the number of deleted rows if the store reports it.
    async fn delete_where_ne(&self, table: &str, column: &str, value: &str)
        -> Result<Option<u64>>;

    /// Count rows of `table` whose `column` is not equal to `value`.
    async fn count_where_ne(&self, table: &str, column: &str, value: &str) -> Result<Option<u64>>;
}

/// Checks that `name` is a plain SQL identifier so that it can be put into a
/// query or a URL path verbatim.
pub fn validate_identifier(name: &str) -> Result<&str> {
    let mut chars = name.chars();

    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if valid {
        Ok(name)
    } else {
        Err(Error::InvalidIdentifier(name.to_string()))
    }
}
