mod api;
mod metrics;
mod models;
mod seeds;
mod store;
mod tribute;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::env;
use std::sync::Arc;

use api::AppState;
use metrics::MetricsCollector;
use store::Store;
use tribute::TributeComposer;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    // Load environment variables
    dotenvy::dotenv().ok();

    // Get configuration from environment
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8090".to_string())
        .parse()
        .expect("PORT must be a number");

    let db_path = env::var("DATABASE_PATH").unwrap_or_else(|_| "memorial.db".to_string());

    // Initialize the record store. If the on-disk database cannot be
    // opened, serve from an in-memory store instead of refusing to boot:
    // reads fall back to seed data either way, and a memorial page that
    // loads beats one that 500s.
    let store = match Store::new(&db_path) {
        Ok(store) => {
            log::info!("Database: {}", db_path);
            store
        }
        Err(e) => {
            log::warn!(
                "Failed to open database at {} ({}), continuing with in-memory store",
                db_path,
                e
            );
            Store::in_memory().expect("Failed to initialize in-memory store")
        }
    };
    let store = Arc::new(store);

    // Initialize the tribute composition gateway
    let composer = Arc::new(TributeComposer::from_env());

    // Initialize request metrics
    let metrics_collector = MetricsCollector::new();

    // Create the server
    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(middleware::Logger::default())
            .wrap(cors)
            .wrap(metrics_collector.clone())
            .app_data(web::Data::new(metrics_collector.clone()))
            .app_data(web::Data::new(AppState {
                store: store.clone(),
                composer: composer.clone(),
            }))
            .configure(api::configure_routes)
    })
    .workers(1); // Single worker for minimal memory

    log::info!("Starting memorial-api server on port {}", port);

    server.bind(("0.0.0.0", port))?.run().await
}
