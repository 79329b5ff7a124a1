use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use bookflow::config::AppConfig;
use bookflow::handlers;
use bookflow::services::api::http::HttpBookingApi;
use bookflow::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let api = HttpBookingApi::new(&config.api_base_url)?;
    tracing::info!("using booking backend at {}", config.api_base_url);

    let state = Arc::new(AppState::new(config.clone(), Box::new(api)));

    let mut app = Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/api/business/:business_url/services",
            get(handlers::catalog::get_catalog),
        )
        .route(
            "/api/business/:business_url/policies",
            get(handlers::catalog::get_policies),
        )
        .route(
            "/api/business/:business_url/slots",
            get(handlers::catalog::get_slots),
        )
        .route(
            "/api/business/:business_url/dates",
            get(handlers::catalog::get_dates),
        )
        .route(
            "/api/business/:business_url/wizard",
            post(handlers::wizard::create_wizard),
        )
        .route("/api/wizard/:id", get(handlers::wizard::get_wizard))
        .route(
            "/api/wizard/:id/services",
            post(handlers::wizard::add_services),
        )
        .route(
            "/api/wizard/:id/services/:service_id",
            delete(handlers::wizard::remove_service),
        )
        .route(
            "/api/wizard/:id/confirm-services",
            post(handlers::wizard::confirm_services),
        )
        .route("/api/wizard/:id/back", post(handlers::wizard::back_to_services))
        .route(
            "/api/wizard/:id/datetime",
            put(handlers::wizard::select_date_time),
        )
        .route("/api/wizard/:id/slots", get(handlers::wizard::get_wizard_slots))
        .route(
            "/api/wizard/:id/contact",
            post(handlers::wizard::open_contact).delete(handlers::wizard::close_contact),
        )
        .route("/api/wizard/:id/submit", post(handlers::wizard::submit))
        .route("/api/wizard/:id/reset", post(handlers::wizard::reset))
        .route("/api/bookings/:id", get(handlers::manage::get_booking))
        .route(
            "/api/bookings/:id/cancel",
            post(handlers::manage::cancel_booking),
        )
        .route(
            "/api/bookings/:id/reschedule",
            post(handlers::manage::reschedule_booking),
        )
        .route(
            "/api/bookings/:id/no-show",
            post(handlers::manage::mark_no_show),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if config.cors_allow_any_origin {
        tracing::warn!("CORS allows any origin");
        app = app.layer(CorsLayer::permissive());
    }

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
