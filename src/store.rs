//! Client for the hosted table store: a PostgREST-style REST surface
//! reached with a project URL and an API key. The store owns the surrogate
//! `id` column; callers upsert on a configured natural key instead.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid store configuration: {0}")]
    Config(String),
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("store rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Write seam for the loader, so the upsert loop can be exercised without a
/// live store.
#[allow(async_fn_in_trait)]
pub trait RecordSink {
    async fn upsert(&self, record: &Map<String, Value>) -> Result<(), StoreError>;
}

#[derive(Debug)]
pub struct TableStore {
    client: reqwest::Client,
    rest_url: String,
    table_name: String,
    conflict_key: String,
}

impl TableStore {
    pub fn new(
        supabase_url: &str,
        supabase_key: &str,
        table_name: &str,
        conflict_key: &str,
    ) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(supabase_key)
            .map_err(|_| StoreError::Config("API key contains invalid header bytes".into()))?;
        headers.insert("apikey", api_key);
        let bearer = HeaderValue::from_str(&format!("Bearer {supabase_key}"))
            .map_err(|_| StoreError::Config("API key contains invalid header bytes".into()))?;
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder().default_headers(headers).build()?;
        let rest_url = format!(
            "{}/rest/v1/{}",
            supabase_url.trim_end_matches('/'),
            table_name
        );

        Ok(Self {
            client,
            rest_url,
            table_name: table_name.to_string(),
            conflict_key: conflict_key.to_string(),
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub async fn select_all(&self) -> Result<Vec<Value>, StoreError> {
        let response = self
            .client
            .get(&self.rest_url)
            .query(&[("select", "*")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Rejected { status, body });
        }

        Ok(response.json().await?)
    }
}

impl RecordSink for TableStore {
    async fn upsert(&self, record: &Map<String, Value>) -> Result<(), StoreError> {
        let response = self
            .client
            .post(&self.rest_url)
            .query(&[("on_conflict", self.conflict_key.as_str())])
            .header("Prefer", "resolution=merge-duplicates")
            .json(record)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Rejected { status, body });
        }

        Ok(())
    }
}
