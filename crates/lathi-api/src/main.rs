//! Lathi API server entry point.
//!
//! `lathi-api` serves the HTTP API; `lathi-api seed <pack.yaml>...` imports
//! content packs and exits.

use axum::http::HeaderValue;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use lathi_api::config::{Config, LogFormat};
use lathi_api::error::AppError;
use lathi_api::routes;
use lathi_api::state::AppState;
use lathi_content::application::command_handlers::handle_import_content_pack;
use lathi_content::domain::commands::ImportContentPack;
use lathi_store::PgContentStore;
use lathi_story::application::assets::AssetUrlResolver;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("../../migrations").run(&pool).await?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.split_first() {
        Some((command, files)) if command == "seed" => seed(&pool, files).await,
        Some((command, _)) => Err(AppError::Config(format!(
            "unknown command `{command}`, expected `seed <pack.yaml>...`"
        ))),
        None => serve(&config, &pool).await,
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}

async fn serve(config: &Config, pool: &PgPool) -> Result<(), AppError> {
    tracing::info!("Starting Lathi API server");

    let assets = AssetUrlResolver::new(&config.asset_public_url, &config.asset_bucket);
    let app_state = AppState::postgres(pool, assets);

    let app = routes::app_router()
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config.cors_allowed_origin.as_deref())?)
        .with_state(app_state);

    let addr = config.bind_address()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn cors_layer(allowed_origin: Option<&str>) -> Result<CorsLayer, AppError> {
    let Some(origin) = allowed_origin else {
        return Ok(CorsLayer::permissive());
    };
    let origin = HeaderValue::from_str(origin)
        .map_err(|e| AppError::Config(format!("CORS_ALLOWED_ORIGIN is not a valid origin: {e}")))?;
    Ok(CorsLayer::permissive().allow_origin(AllowOrigin::exact(origin)))
}

async fn seed(pool: &PgPool, files: &[String]) -> Result<(), AppError> {
    if files.is_empty() {
        return Err(AppError::Config(
            "seed needs at least one content pack path".into(),
        ));
    }

    let writer = PgContentStore::new(pool.clone());
    for path in files {
        let source = tokio::fs::read_to_string(path).await?;
        let command = ImportContentPack {
            correlation_id: Uuid::new_v4(),
            origin: path.clone(),
            source,
        };
        let report = handle_import_content_pack(&command, &writer).await?;
        tracing::info!(
            pack = %path,
            vocabulary = report.vocabulary,
            imported = ?report.imported,
            unchanged = ?report.unchanged,
            "content pack seeded"
        );
    }
    Ok(())
}
