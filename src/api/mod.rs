use crate::provider::VerificationProvider;
use anyhow::{anyhow, Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{header::CONTENT_TYPE, HeaderName, HeaderValue, Method, Request},
    routing::{get, options},
    Extension, Json, Router,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use url::Url;
use utoipa_axum::router::OpenApiRouter;

pub mod handlers;
mod openapi;

pub use handlers::{
    rate_limit::{
        FixedWindowRateLimiter, NoopRateLimiter, RateLimitDecision, RateLimiter,
        StackedRateLimiter,
    },
    GatewayState,
};
pub use openapi::openapi;

/// Origins allowed to call the gateway when none are configured.
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];

/// Build the API router with all documented routes registered.
#[must_use]
pub fn router() -> OpenApiRouter {
    openapi::api_router()
}

/// Listener and policy settings for the gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub rate_limit: u32,
    pub rate_limit_window: Duration,
    /// Submissions allowed per address per hour; `0` turns the cap off.
    pub hourly_rate_limit: u32,
    pub trust_forwarded_for: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: 5001,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.map(str::to_string).to_vec(),
            rate_limit: handlers::rate_limit::DEFAULT_LIMIT,
            rate_limit_window: handlers::rate_limit::DEFAULT_WINDOW,
            hourly_rate_limit: handlers::rate_limit::DEFAULT_HOURLY_LIMIT,
            trust_forwarded_for: false,
        }
    }
}

/// Start the server
/// # Errors
/// Return error if the CORS origins are invalid or the server fails to start
pub async fn new(config: GatewayConfig, provider: Arc<dyn VerificationProvider>) -> Result<()> {
    let rate_limiter = rate_limiter(&config);
    let state = Arc::new(
        GatewayState::new(provider, rate_limiter)
            .with_trust_forwarded_for(config.trust_forwarded_for),
    );

    let cors = cors_layer(&config.allowed_origins)?;
    let app = app(state, cors);

    let listener = TcpListener::bind(format!("::0:{}", config.port)).await?;

    info!("Listening on [::]:{}", config.port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Gracefully shutdown");
    })
    .await?;

    Ok(())
}

/// Per-address limiter for `/submit`: the burst window, plus the hourly cap
/// unless it is disabled.
#[must_use]
pub fn rate_limiter(config: &GatewayConfig) -> Arc<dyn RateLimiter> {
    let burst = FixedWindowRateLimiter::new(config.rate_limit, config.rate_limit_window);
    info!(
        "Rate limit: {} per {}s",
        burst.limit(),
        burst.window().as_secs()
    );

    if config.hourly_rate_limit == 0 {
        return Arc::new(burst);
    }

    let hourly = FixedWindowRateLimiter::new(
        config.hourly_rate_limit,
        handlers::rate_limit::HOURLY_WINDOW,
    );
    info!("Hourly rate limit: {}", hourly.limit());

    let limiters: Vec<Arc<dyn RateLimiter>> = vec![Arc::new(burst), Arc::new(hourly)];
    Arc::new(StackedRateLimiter::new(limiters))
}

/// Assemble the documented routes, the undocumented extras and the middleware stack.
#[must_use]
pub fn app(state: Arc<GatewayState>, cors: CorsLayer) -> Router {
    let (router, openapi) = router().split_for_parts();
    router
        .route("/health", options(handlers::health))
        .route(
            "/openapi.json",
            get(move || {
                let doc = openapi.clone();
                async move { Json(doc) }
            }),
        )
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(state)),
        )
}

/// CORS policy for the browser form.
///
/// # Errors
/// Returns an error if an origin is not a valid URL with a host.
pub fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    let origins = allowed_origins
        .iter()
        .map(|origin| frontend_origin(origin))
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_headers([CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_origin(AllowOrigin::list(origins)))
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

fn frontend_origin(frontend_base_url: &str) -> Result<HeaderValue> {
    let parsed = Url::parse(frontend_base_url.trim())
        .with_context(|| format!("Invalid allowed origin: {frontend_base_url}"))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| anyhow!("Allowed origin must include a valid host: {frontend_base_url}"))?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let origin = format!("{}://{}{}", parsed.scheme(), host, port);
    HeaderValue::from_str(&origin).context("Failed to build allowed origin header")
}
