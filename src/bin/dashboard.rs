use std::sync::Arc;

use tracing::{error, info};

use fraud_dashboard::config;
use fraud_dashboard::handlers::{AppState, Dashboard};
use fraud_dashboard::routes::create_router;
use fraud_dashboard::store::TableStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // Missing credentials keep the server up; every data endpoint then
    // answers with a persistent configuration banner.
    let (state, server_address) = match config::load_config() {
        Ok(config) => {
            let state = match TableStore::new(
                &config.supabase_url,
                &config.supabase_key,
                &config.table_name,
                &config.conflict_key,
            ) {
                Ok(store) => AppState::Ready(Arc::new(Dashboard::new(store))),
                Err(e) => {
                    error!("starting without a store connection: {e}");
                    AppState::Unconfigured(Arc::new(e.to_string()))
                }
            };
            (state, config.server_address)
        }
        Err(e) => {
            error!("starting without a store connection: {e}");
            let state = AppState::Unconfigured(Arc::new(e.to_string()));
            (state, config::server_address())
        }
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    info!("dashboard listening on {server_address}");
    axum::serve(listener, app).await?;

    Ok(())
}
