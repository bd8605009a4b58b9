//! P3 API Server - Main entry point

use anyhow::Result;
use p3_common::logging::{init_logging, LogConfig};
use tracing::info;

use p3_server::{api, config::Config};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let log_config = LogConfig::builder()
        .log_file_prefix("p3-server")
        .filter_directives("p3_server=debug,tower_http=debug,sqlx=info")
        .build()
        .with_env_overrides()?;

    let _log_guard = init_logging(&log_config)?;

    info!("Starting P3 API Server");

    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );
    info!(
        backend = ?config.sequences.backend,
        batch_size = config.sequences.batch_size,
        on_lookup_failure = ?config.sequences.on_lookup_failure,
        content = %config.content.directory.display(),
        "Serializer configuration"
    );

    api::serve(config).await
}
