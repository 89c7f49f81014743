use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE},
    Client, ClientBuilder, Response,
};
use url::Url;

use crate::{validate_identifier, ApiError, Error, Result, Store};

const API_KEY_HEADER: &str = "apikey";
const PREFER_HEADER: &str = "prefer";
const REST_PATH: &str = "rest/v1/";

/// [`Store`] backed by a PostgREST endpoint, such as the REST API of a hosted
/// Postgres project.
#[derive(Debug, Clone)]
pub struct RestStore {
    client: Client,
    url: Url,
}

impl RestStore {
    /// Create a client for the project at `url`, authenticating every request
    /// with `api_key`.
    ///
    /// A path on `url` is kept as a prefix of every request path.
    pub fn new(mut url: Url, api_key: &str) -> Result<Self> {
        // `Url::join` replaces the last segment of a path without a trailing slash.
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        let mut headers = HeaderMap::new();

        let mut key = HeaderValue::from_str(api_key)?;
        key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key);

        let mut bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let client = ClientBuilder::new().default_headers(headers).build()?;

        Ok(Self { client, url })
    }

    fn table_url(&self, table: &str) -> Result<Url> {
        let table = validate_identifier(table)?;

        Ok(self.url.join(REST_PATH)?.join(table)?)
    }
}

/// Extracts the total from a `Content-Range` value such as `0-24/573` or `*/0`.
fn parse_content_range(value: &str) -> Option<u64> {
    value.rsplit_once('/')?.1.parse().ok()
}

fn total_count(res: &Response) -> Option<u64> {
    res.headers()
        .get(CONTENT_RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_content_range)
}

async fn rejection(res: Response) -> Error {
    let status = res.status();

    let body = match res.text().await {
        Ok(body) => body,
        Err(e) => return e.into(),
    };

    let api_error = match serde_json::from_str::<ApiError>(&body) {
        Ok(e) if !e.message.is_empty() => e,
        _ => ApiError {
            message: format!("HTTP {status}"),
            details: (!body.is_empty()).then_some(body),
            ..Default::default()
        },
    };

    Error::Rejected(api_error)
}

#[async_trait]
impl Store for RestStore {
    async fn delete_where_ne(
        &self,
        table: &str,
        column: &str,
        value: &str,
    ) -> Result<Option<u64>> {
        let column = validate_identifier(column)?;

        let res = self
            .client
            .delete(self.table_url(table)?)
            .query(&[(column, format!("neq.{value}"))])
            .header(PREFER_HEADER, "return=minimal,count=exact")
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(rejection(res).await);
        }

        let deleted = total_count(&res);

        tracing::debug!("delete on {table} answered {}, {deleted:?} rows", res.status());

        Ok(deleted)
    }

    async fn count_where_ne(&self, table: &str, column: &str, value: &str) -> Result<Option<u64>> {
        let column = validate_identifier(column)?;

        let res = self
            .client
            .head(self.table_url(table)?)
            .query(&[("select", column.to_string()), (column, format!("neq.{value}"))])
            .header(PREFER_HEADER, "count=exact")
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(rejection(res).await);
        }

        Ok(total_count(&res))
    }
}
