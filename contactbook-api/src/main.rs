use actix_cors::Cors;
use actix_web::{get, web, App, HttpResponse, HttpServer, Responder};
use clap::Parser;
use contactbook_api::config::ApiConfig;
use contactbook_api::storage::{LocalBlobStore, SqliteContactStore};
use contactbook_api::{handlers, helpers, Database, InterchangeService};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::prelude::*;

#[get("/health")]
async fn health(db: web::Data<Arc<Database>>) -> impl Responder {
    match db.ping().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "status": "healthy",
            "database": "connected"
        })),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "status": "unhealthy",
                "database": "disconnected"
            }))
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long)]
    log_file_path: Option<String>,

    /// Path to api.toml; defaults to the user config directory
    #[arg(long)]
    config: Option<PathBuf>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if let Some(log_path) = args.log_file_path {
        let log_path = std::path::Path::new(&log_path);
        let file_appender = tracing_appender::rolling::never(
            log_path.parent().unwrap_or(std::path::Path::new(".")),
            log_path
                .file_name()
                .unwrap_or(std::ffi::OsStr::new("contactbook-api.log")),
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        std::mem::forget(guard);

        tracing_subscriber::registry()
            .with(env_filter.clone())
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(true)
                    .with_writer(std::io::stdout),
            )
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    // Load config
    let (config, config_path) =
        ApiConfig::load(args.config.as_deref()).expect("Failed to load config");
    tracing::info!("Using config at {:?}", config_path);

    let server_config = config.server();
    let storage_config = config.storage();
    let photo_config = config.photos();
    let (host, port) = (server_config.host.clone(), server_config.port);

    // Initialize database
    let db_path = helpers::database::get_db_path(storage_config.database_path.as_deref())
        .expect("Failed to resolve database path");
    let db = helpers::database::initialize_database(&db_path)
        .expect("Failed to initialize database");
    tracing::info!("Database initialized at: {:?}", db_path);

    // Photo storage, served back under /photos
    let photo_dir =
        helpers::database::get_photo_dir(storage_config.photo_dir.as_deref(), &db_path);
    let public_base_url = storage_config
        .public_base_url
        .clone()
        .unwrap_or_else(|| format!("http://{}:{}", host, port));
    let blob_store = Arc::new(
        LocalBlobStore::new(photo_dir.clone(), &public_base_url, photo_config.fetch_timeout())
            .expect("Failed to initialize photo storage")
            .with_trusted_origins(photo_config.trusted_origins.clone()),
    );
    tracing::info!(
        "Photos stored in {:?}, served from {}/photos",
        photo_dir,
        public_base_url
    );

    let contact_store = Arc::new(SqliteContactStore::new(db.async_connection.clone()));
    let service = InterchangeService::new(contact_store, blob_store.clone(), photo_config.options());

    tracing::info!("Starting server on {}:{}", host, port);

    let server = HttpServer::new(move || {
        // Configure CORS
        let cors = if let Some(cors_config) = &config.cors {
            let mut cors_builder = Cors::default();
            for origin in &cors_config.allowed_origins {
                cors_builder = cors_builder.allowed_origin(origin);
            }
            cors_builder
                .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                .allowed_headers(vec!["Authorization", "Accept", "Content-Type"])
                .expose_headers(vec!["Content-Disposition"])
                .max_age(3600)
        } else {
            Cors::default()
                .allow_any_origin()
                .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                .allowed_headers(vec!["Authorization", "Accept", "Content-Type"])
                .expose_headers(vec!["Content-Disposition"])
                .max_age(3600)
        };

        App::new()
            .wrap(cors)
            .app_data(web::Data::new(db.clone()))
            .app_data(web::Data::new(blob_store.clone()))
            .app_data(web::Data::new(service.clone()))
            .service(health)
            .configure(handlers::configure)
    })
    .bind((host.as_str(), port))?
    .run();

    let handle = server.handle();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }

        tracing::info!("Ctrl+C received, shutting down...");
        handle.stop(true).await;
    });

    server.await
}
