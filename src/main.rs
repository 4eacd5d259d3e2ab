use actix_cors::Cors;
use actix_web::{middleware, App, HttpServer};
use arangetram_planner::auth::IdentityContext;
use arangetram_planner::config::{ServerSettings, Settings};
use arangetram_planner::core::{BookingPolicy, Recommender};
use arangetram_planner::routes::{configure_app, AppState};
use arangetram_planner::services::{AssistantGateway, CacheManager, PostgresStore};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn cors_for(server: &ServerSettings) -> Cors {
    if server.cors_origins.iter().any(|origin| origin == "*") {
        return Cors::permissive();
    }

    server
        .cors_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Arangetram planner service...");

    let settings = Settings::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    info!("Configuration loaded successfully");

    if settings.auth.jwt_secret == "change-me" {
        warn!("Using the placeholder JWT secret; set JWT_SECRET outside development");
    }

    let store = PostgresStore::from_settings(&settings.database)
        .await
        .map_err(|e| {
            error!("Failed to connect to PostgreSQL: {}", e);
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e.to_string())
        })?;

    info!("PostgreSQL store initialized");

    // Redis is optional; fall back to the in-process tier alone
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(300);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);

    let cache = match settings.cache.redis_url.as_deref() {
        Some(url) => match CacheManager::new(url, l1_cache_size, cache_ttl).await {
            Ok(c) => {
                info!("Cache manager initialized (L1: {} entries, TTL: {}s, L2: redis)", l1_cache_size, cache_ttl);
                c
            }
            Err(e) => {
                warn!("Failed to connect to Redis ({}), running with in-process cache only", e);
                CacheManager::in_memory(l1_cache_size, cache_ttl)
            }
        },
        None => {
            info!("Cache manager initialized (L1: {} entries, TTL: {}s)", l1_cache_size, cache_ttl);
            CacheManager::in_memory(l1_cache_size, cache_ttl)
        }
    };

    let assistant = AssistantGateway::new(&settings.assistant).map_err(|e| {
        error!("Failed to build assistant client: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    let policy = BookingPolicy {
        require_event_owner: settings.bookings.require_event_owner,
    };

    info!(
        "Recommendations capped at {} per category; owner-only bookings: {}",
        settings.recommendation.max_per_category, policy.require_event_owner
    );

    let app_state = AppState::new(
        store,
        Arc::new(cache),
        Arc::new(assistant),
        IdentityContext::from_settings(&settings.auth),
        Recommender::new(settings.recommendation.max_per_category),
        policy,
    );

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);
    let server_settings = settings.server.clone();

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(cors_for(&server_settings))
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(configure_app(app_state.clone()))
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
