use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    ConnectOptions, PgPool,
};
use url::Url;

use crate::{validate_identifier, Result, Store};

/// [`Store`] backed by a direct Postgres connection.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the database at `url` with a single connection.
    pub async fn connect(url: &Url) -> Result<Self> {
        let options = PgConnectOptions::from_str(url.as_str())?.disable_statement_logging();

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Ok(Self::new(pool))
    }
}

// Cast to text so the comparison works for both uuid and text id columns.
fn delete_sql(table: &str, column: &str) -> Result<String> {
    let table = validate_identifier(table)?;
    let column = validate_identifier(column)?;

    Ok(format!(r#"DELETE FROM "{table}" WHERE "{column}"::text <> $1"#))
}

fn count_sql(table: &str, column: &str) -> Result<String> {
    let table = validate_identifier(table)?;
    let column = validate_identifier(column)?;

    Ok(format!(
        r#"SELECT COUNT(*) FROM "{table}" WHERE "{column}"::text <> $1"#
    ))
}

#[async_trait]
impl Store for PgStore {
    async fn delete_where_ne(
        &self,
        table: &str,
        column: &str,
        value: &str,
    ) -> Result<Option<u64>> {
        let sql = delete_sql(table, column)?;

        let res = sqlx::query(&sql).bind(value).execute(&self.pool).await?;

        tracing::debug!("{} rows deleted from {table}", res.rows_affected());

        Ok(Some(res.rows_affected()))
    }

    async fn count_where_ne(&self, table: &str, column: &str, value: &str) -> Result<Option<u64>> {
        let sql = count_sql(table, column)?;

        let count: i64 = sqlx::query_scalar(&sql)
            .bind(value)
            .fetch_one(&self.pool)
            .await?;

        Ok(Some(count as u64))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{count_sql, delete_sql};
    use crate::Error;

    #[test]
    fn renders_delete() {
        assert_eq!(
            delete_sql("exercises", "id").unwrap(),
            r#"DELETE FROM "exercises" WHERE "id"::text <> $1"#
        );
    }

    #[test]
    fn renders_count() {
        assert_eq!(
            count_sql("exercises", "id").unwrap(),
            r#"SELECT COUNT(*) FROM "exercises" WHERE "id"::text <> $1"#
        );
    }

    #[test]
    fn refuses_to_render_bad_names() {
        assert!(matches!(
            delete_sql("exercises\"; --", "id"),
            Err(Error::InvalidIdentifier(_))
        ));
        assert!(matches!(
            count_sql("exercises", "id or 1=1"),
            Err(Error::InvalidIdentifier(_))
        ));
    }
}
