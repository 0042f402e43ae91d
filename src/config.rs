use dotenv::dotenv;
use std::env;
use thiserror::Error;

pub const DEFAULT_TABLE: &str = "websites";
pub const DEFAULT_CONFLICT_KEY: &str = "link";
pub const DEFAULT_SERVER_ADDRESS: &str = "0.0.0.0:8000";

#[derive(Debug, Clone)]
pub struct Config {
    pub supabase_url: String,
    pub supabase_key: String,
    pub table_name: String,
    pub conflict_key: String,
    pub server_address: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    MissingVar(&'static str),
}

pub fn load_config() -> Result<Config, ConfigError> {
    dotenv().ok();

    let supabase_url =
        env::var("SUPABASE_URL").map_err(|_| ConfigError::MissingVar("SUPABASE_URL"))?;
    let supabase_key =
        env::var("SUPABASE_KEY").map_err(|_| ConfigError::MissingVar("SUPABASE_KEY"))?;
    let table_name = env::var("SUPABASE_TABLE").unwrap_or_else(|_| DEFAULT_TABLE.to_string());
    let conflict_key =
        env::var("SUPABASE_CONFLICT_KEY").unwrap_or_else(|_| DEFAULT_CONFLICT_KEY.to_string());
    let server_address = server_address();

    Ok(Config {
        supabase_url,
        supabase_key,
        table_name,
        conflict_key,
        server_address,
    })
}

/// Bind address for the dashboard, also used when the Supabase vars are
/// absent and the server starts in its unconfigured mode.
pub fn server_address() -> String {
    env::var("SERVER_ADDRESS").unwrap_or_else(|_| DEFAULT_SERVER_ADDRESS.to_string())
}
