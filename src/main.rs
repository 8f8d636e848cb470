use axum::Router;
use http::header;
use splitbook::api::openapi::ApiDoc;
use splitbook::auth::jwt::JwtService;
use splitbook::config::CONFIG;
use splitbook::{
    AppState, InMemoryCache, InMemoryJournal, InMemoryLedger, InMemoryPushChannel, LedgerViewService, api_routes,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn load_ledger() -> Result<InMemoryLedger, Box<dyn std::error::Error>> {
    match &CONFIG.seed_path {
        Some(path) => {
            let seed = std::fs::read_to_string(path)?;
            let ledger = InMemoryLedger::from_seed_json(&seed)?;
            info!("Seeded ledger from {}", path);
            Ok(ledger)
        }
        None => Ok(InMemoryLedger::new()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&CONFIG.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    info!("Starting with {:?}", *CONFIG);

    let push = InMemoryPushChannel::new();
    let service = Arc::new(LedgerViewService::new(
        load_ledger()?,
        push.clone(),
        InMemoryCache::new(),
        InMemoryJournal::new(),
        Some(CONFIG.fetch_timeout),
    ));
    let state = AppState::new(service, push, JwtService::new(CONFIG.jwt_secret.clone()));

    let app = Router::new()
        .route("/", axum::routing::get(|| async { "OK" }))
        .nest("/api", api_routes(state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([http::Method::GET, http::Method::POST, http::Method::DELETE])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([127, 0, 0, 1], CONFIG.port));
    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
