use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::handlers::{self, AppState};

pub fn create_router(state: AppState) -> Router {
    let cors = create_cors_layer();

    Router::new()
        .route("/", get(handlers::root))
        .route("/api/overview", get(handlers::get_overview))
        .route("/api/refresh", post(handlers::refresh_snapshot))
        .route("/api/trends/daily_counts", get(handlers::get_daily_counts))
        .route(
            "/api/trends/daily_avg_score",
            get(handlers::get_daily_average_scores),
        )
        .route("/api/clusters", get(handlers::get_cluster_histogram))
        .route("/api/search", get(handlers::search_records))
        .route("/api/records", get(handlers::get_full_table))
        .with_state(state)
        .layer(cors)
}

fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
}
