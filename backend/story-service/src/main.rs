use actix_web::{web, App, HttpResponse, HttpServer};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use story_service::db::{ContentStore, PgStoryRepo};
use story_service::handlers;
use story_service::jobs::StoryCleaner;
use story_service::services::StoriesService;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

struct HealthState {
    db_pool: PgPool,
}

async fn health_summary(state: web::Data<HealthState>) -> HttpResponse {
    match sqlx::query("SELECT 1").fetch_one(&state.db_pool).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "story-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "story-service"
        })),
    }
}

async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Story Service
///
/// Serves an author's live stories, publishing, reposts, replies and view
/// tracking, and soft-deletes stories once they leave the 24 hour window.
///
/// # Routes
///
/// - `/api/v1/users/{author_id}/stories` - live stories of an author
/// - `/api/v1/stories/*` - publish, repost, reply, views
/// - `/api/v1/health*`, `/metrics`
#[actix_web::main]
async fn main() -> io::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = match story_service::Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {:#}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting story-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database.url)
        .await
        .map_err(|e| {
            tracing::error!("Database pool creation failed: {:#}", e);
            io::Error::new(io::ErrorKind::Other, format!("Failed to connect to database: {e}"))
        })?;

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("Migration failed: {e}")))?;
    tracing::info!("Connected to database, migrations applied");

    let settings = config.playback.settings();
    let store: Arc<dyn ContentStore> = Arc::new(PgStoryRepo::new(db_pool.clone()));
    let stories = web::Data::new(StoriesService::new(store.clone(), settings));
    let health_state = web::Data::new(HealthState {
        db_pool: db_pool.clone(),
    });

    let cleaner = StoryCleaner::new(
        store,
        settings,
        Duration::from_secs(config.cleanup.interval_secs),
    );
    let cleaner_task = tokio::spawn(cleaner.run());

    let http_bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", http_bind_address);

    let result = HttpServer::new(move || {
        App::new()
            .app_data(stories.clone())
            .app_data(health_state.clone())
            .wrap(tracing_actix_web::TracingLogger::default())
            .route(
                "/metrics",
                web::get().to(story_service::metrics::serve_metrics),
            )
            .route("/api/v1/health", web::get().to(health_summary))
            .route("/api/v1/health/live", web::get().to(liveness_check))
            .configure(handlers::configure)
    })
    .bind(&http_bind_address)?
    .workers(4)
    .run()
    .await;

    cleaner_task.abort();
    tracing::info!("story-service stopped");
    result
}
