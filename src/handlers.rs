use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::info;

use crate::analytics;
use crate::models::{ClusterBucketRow, DailyCountRow, DailyScoreRow, FraudRecord, SearchHit};
use crate::store::{StoreError, TableStore};

pub const SEARCH_PROMPT: &str = "Enter a search term to explore the fraud dataset.";

/// The rows fetched from the store in one round trip. Views compute from the
/// typed records; the full-table endpoint returns the raw rows untouched.
pub struct Snapshot {
    pub rows: Vec<Value>,
    pub records: Vec<FraudRecord>,
}

impl Snapshot {
    pub fn from_rows(rows: Vec<Value>) -> Self {
        let records = rows
            .iter()
            .map(|row| serde_json::from_value(row.clone()).unwrap_or_default())
            .collect();
        Self { rows, records }
    }
}

pub struct Dashboard {
    store: TableStore,
    snapshot: RwLock<Option<Arc<Snapshot>>>,
}

impl Dashboard {
    pub fn new(store: TableStore) -> Self {
        Self {
            store,
            snapshot: RwLock::new(None),
        }
    }

    /// Fetch-all from the store and replace the cached snapshot.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, StoreError> {
        let rows = self.store.select_all().await?;
        info!(rows = rows.len(), table = self.store.table_name(), "fetched table snapshot");
        let snapshot = Arc::new(Snapshot::from_rows(rows));
        *self.snapshot.write().await = Some(snapshot.clone());
        Ok(snapshot)
    }

    /// The cached snapshot, fetched lazily on first use. Every view in a
    /// session reads the same snapshot; only an explicit refresh re-fetches.
    pub async fn current_snapshot(&self) -> Result<Arc<Snapshot>, StoreError> {
        if let Some(snapshot) = self.snapshot.read().await.clone() {
            return Ok(snapshot);
        }
        self.refresh().await
    }

    fn empty_banner(&self) -> String {
        format!("No data found in table '{}'.", self.store.table_name())
    }
}

/// Missing store configuration leaves the server running; every data
/// endpoint answers with a persistent error banner instead.
#[derive(Clone)]
pub enum AppState {
    Ready(Arc<Dashboard>),
    Unconfigured(Arc<String>),
}

type ViewResult<T> = Result<Json<T>, (StatusCode, String)>;

#[derive(Serialize)]
#[serde(untagged)]
pub enum ViewResponse<T> {
    Banner { banner: String },
    Data(T),
}

impl<T> ViewResponse<T> {
    fn banner(message: impl Into<String>) -> Self {
        Self::Banner {
            banner: message.into(),
        }
    }
}

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum SearchResponse {
    Prompt { prompt: String },
    Results { count: usize, results: Vec<SearchHit> },
}

#[derive(Serialize)]
pub struct OverviewResponse {
    pub table: String,
    pub row_count: usize,
    pub banner: Option<String>,
}

fn require_configured(state: &AppState) -> Result<&Arc<Dashboard>, (StatusCode, String)> {
    match state {
        AppState::Ready(dashboard) => Ok(dashboard),
        AppState::Unconfigured(reason) => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            format!("Store credentials missing: {reason}"),
        )),
    }
}

fn store_error(e: StoreError) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

pub async fn root() -> Json<Value> {
    Json(json!({
        "service": "fraud-dashboard",
        "title": "OCC Overview",
        "description": "Fraud trends, clustering, and text insight over the hosted fraud table.",
    }))
}

pub async fn get_overview(State(state): State<AppState>) -> ViewResult<OverviewResponse> {
    let dashboard = require_configured(&state)?;
    let snapshot = dashboard.current_snapshot().await.map_err(store_error)?;
    let banner = snapshot.rows.is_empty().then(|| dashboard.empty_banner());

    Ok(Json(OverviewResponse {
        table: dashboard.store.table_name().to_string(),
        row_count: snapshot.rows.len(),
        banner,
    }))
}

pub async fn refresh_snapshot(State(state): State<AppState>) -> ViewResult<OverviewResponse> {
    let dashboard = require_configured(&state)?;
    let snapshot = dashboard.refresh().await.map_err(store_error)?;
    let banner = snapshot.rows.is_empty().then(|| dashboard.empty_banner());

    Ok(Json(OverviewResponse {
        table: dashboard.store.table_name().to_string(),
        row_count: snapshot.rows.len(),
        banner,
    }))
}

pub async fn get_daily_counts(
    State(state): State<AppState>,
) -> ViewResult<ViewResponse<Vec<DailyCountRow>>> {
    let dashboard = require_configured(&state)?;
    let snapshot = dashboard.current_snapshot().await.map_err(store_error)?;

    if snapshot.rows.is_empty() {
        return Ok(Json(ViewResponse::banner(dashboard.empty_banner())));
    }
    if !snapshot.records.iter().any(|r| r.date.is_some()) {
        return Ok(Json(ViewResponse::banner(
            "No date column present; trend unavailable.",
        )));
    }

    Ok(Json(ViewResponse::Data(analytics::daily_counts(
        &snapshot.records,
    ))))
}

pub async fn get_daily_average_scores(
    State(state): State<AppState>,
) -> ViewResult<ViewResponse<Vec<DailyScoreRow>>> {
    let dashboard = require_configured(&state)?;
    let snapshot = dashboard.current_snapshot().await.map_err(store_error)?;

    if snapshot.rows.is_empty() {
        return Ok(Json(ViewResponse::banner(dashboard.empty_banner())));
    }
    let scorable = snapshot
        .records
        .iter()
        .any(|r| r.date.is_some() && r.fraud_score.is_some());
    if !scorable {
        return Ok(Json(ViewResponse::banner(
            "No dated fraud_score values present; trend unavailable.",
        )));
    }

    Ok(Json(ViewResponse::Data(analytics::daily_average_scores(
        &snapshot.records,
    ))))
}

pub async fn get_cluster_histogram(
    State(state): State<AppState>,
) -> ViewResult<ViewResponse<Vec<ClusterBucketRow>>> {
    let dashboard = require_configured(&state)?;
    let snapshot = dashboard.current_snapshot().await.map_err(store_error)?;

    if snapshot.rows.is_empty() {
        return Ok(Json(ViewResponse::banner(dashboard.empty_banner())));
    }
    if !snapshot.records.iter().any(|r| r.kmeans_cluster.is_some()) {
        return Ok(Json(ViewResponse::banner(
            "No kmeans_cluster column present; histogram unavailable.",
        )));
    }

    Ok(Json(ViewResponse::Data(analytics::cluster_histogram(
        &snapshot.records,
    ))))
}

pub async fn search_records(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ViewResult<SearchResponse> {
    let dashboard = require_configured(&state)?;

    if params.q.trim().is_empty() {
        return Ok(Json(SearchResponse::Prompt {
            prompt: SEARCH_PROMPT.to_string(),
        }));
    }

    let snapshot = dashboard.current_snapshot().await.map_err(store_error)?;
    let results: Vec<SearchHit> = analytics::search(&snapshot.records, &params.q)
        .into_iter()
        .map(analytics::search_hit)
        .collect();

    Ok(Json(SearchResponse::Results {
        count: results.len(),
        results,
    }))
}

pub async fn get_full_table(State(state): State<AppState>) -> ViewResult<ViewResponse<Vec<Value>>> {
    let dashboard = require_configured(&state)?;
    let snapshot = dashboard.current_snapshot().await.map_err(store_error)?;

    if snapshot.rows.is_empty() {
        return Ok(Json(ViewResponse::banner(dashboard.empty_banner())));
    }

    Ok(Json(ViewResponse::Data(snapshot.rows.clone())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn snapshot_parses_rows_and_keeps_raw_columns() {
        let rows = vec![
            json!({ "link": "http://x.test", "fraud_score": 0.8, "extra_column": "kept" }),
            json!({ "date": "garbage" }),
        ];
        let snapshot = Snapshot::from_rows(rows);

        assert_eq!(snapshot.records.len(), 2);
        assert_eq!(snapshot.records[0].link.as_deref(), Some("http://x.test"));
        assert!(snapshot.records[1].date.is_none());
        assert_eq!(snapshot.rows[0]["extra_column"], "kept");
    }

    #[test]
    fn view_response_banner_serializes_flat() {
        let response: ViewResponse<Vec<DailyCountRow>> = ViewResponse::banner("no data");
        let rendered = serde_json::to_value(&response).unwrap();
        assert_eq!(rendered, json!({ "banner": "no data" }));
    }

    #[test]
    fn search_response_shapes() {
        let prompt = SearchResponse::Prompt {
            prompt: SEARCH_PROMPT.to_string(),
        };
        let rendered = serde_json::to_value(&prompt).unwrap();
        assert_eq!(rendered["prompt"], SEARCH_PROMPT);

        let results = SearchResponse::Results {
            count: 0,
            results: vec![],
        };
        let rendered = serde_json::to_value(&results).unwrap();
        assert_eq!(rendered, json!({ "count": 0, "results": [] }));
    }

    #[tokio::test]
    async fn empty_query_returns_prompt_without_touching_the_store() {
        // The store points at nothing routable; the prompt path must never
        // reach for it.
        let store = TableStore::new("http://127.0.0.1:9", "key", "websites", "link").unwrap();
        let state = AppState::Ready(Arc::new(Dashboard::new(store)));

        let response = search_records(State(state), Query(SearchParams { q: "  ".into() }))
            .await
            .unwrap();
        match response.0 {
            SearchResponse::Prompt { prompt } => assert_eq!(prompt, SEARCH_PROMPT),
            SearchResponse::Results { .. } => panic!("search ran for an empty query"),
        }
    }

    #[test]
    fn unconfigured_state_yields_persistent_banner() {
        let state = AppState::Unconfigured(Arc::new("missing SUPABASE_URL".to_string()));
        let err = require_configured(&state).err().unwrap();
        assert_eq!(err.0, StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.1.contains("missing SUPABASE_URL"));
    }
}
