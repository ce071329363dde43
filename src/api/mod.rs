use crate::{
    auth::{AuthService, TokenService},
    cache::MemoryCache,
    middleware::{audit, auth_gate, metrics::Metrics, rate_limit::RateLimiter, recovery, security_headers},
    store::PgUserStore,
    users::UserService,
};
use anyhow::{anyhow, Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, Request,
    },
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Extension, Router,
};
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tokio::signal;
use tower::{util::MapResponseLayer, ServiceBuilder};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use url::Url;

pub(crate) mod handlers;
pub mod response;

/// Shared services, injected into handlers via `Extension`.
pub struct AppState {
    pub auth: AuthService,
    pub users: UserService,
    pub tokens: TokenService,
}

/// Runtime knobs collected by the CLI.
pub struct ApiConfig {
    pub jwt_secret: SecretString,
    pub access_token_ttl: Duration,
    pub rate_limit_rps: u32,
    pub rate_limit_burst: u32,
    pub cors_origin: String,
}

/// Assemble the router and its middleware pipeline.
///
/// Order matters: request-id stamping comes first so every later layer can
/// log it, rate limiting sits before CORS and tracing so rejected floods
/// stay cheap, and panic recovery wraps the handlers themselves.
#[must_use]
pub fn app(
    state: Arc<AppState>,
    limiter: Arc<RateLimiter>,
    metrics: Arc<Metrics>,
    cors: CorsLayer,
) -> Router {
    let protected = Router::new()
        .route("/users", get(handlers::users::list))
        .route(
            "/users/profile",
            get(handlers::users::profile).put(handlers::users::update_profile),
        )
        .route("/users/:id", get(handlers::users::get))
        .route("/users/:id", put(handlers::users::update))
        .route("/users/:id", delete(handlers::users::delete))
        .route_layer(from_fn_with_state(
            state.clone(),
            auth_gate::require_bearer,
        ));

    let api = Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .merge(protected);

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(from_fn_with_state(
                    metrics,
                    crate::middleware::metrics::track,
                ))
                .layer(from_fn(security_headers::apply))
                .layer(from_fn_with_state(limiter, crate::middleware::rate_limit::limit))
                .layer(cors)
                .layer(MapResponseLayer::new(|response: axum::response::Response<_>| {
                    response.map(Body::new)
                }))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(from_fn(audit::trail))
                .layer(CatchPanicLayer::custom(recovery::handle_panic)),
        )
        .layer(Extension(state))
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, dsn: String, config: ApiConfig) -> Result<()> {
    // Connect to database
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    let store = Arc::new(PgUserStore::new(pool));
    let cache = Arc::new(MemoryCache::new());
    let tokens = TokenService::new(&config.jwt_secret, config.access_token_ttl);

    let state = Arc::new(AppState {
        auth: AuthService::new(store.clone(), tokens.clone()),
        users: UserService::new(store, cache),
        tokens,
    });

    let limiter = Arc::new(RateLimiter::new(
        config.rate_limit_rps,
        config.rate_limit_burst,
    ));
    RateLimiter::spawn_sweeper(limiter.clone());

    let metrics = Arc::new(Metrics::new());
    let cors = cors_layer(&config.cors_origin)?;

    let router = app(state, limiter, metrics, cors);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Gracefully shutdown");
}

/// Build the CORS layer for a single allowed origin.
/// # Errors
/// Return error if the origin is not a valid URL with a host.
pub fn cors_layer(origin: &str) -> Result<CorsLayer> {
    let parsed =
        Url::parse(origin).with_context(|| format!("Invalid CORS origin: {origin}"))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| anyhow!("CORS origin must include a valid host: {origin}"))?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let exact = format!("{}://{}{}", parsed.scheme(), host, port);
    let exact =
        HeaderValue::from_str(&exact).context("Failed to build CORS origin header")?;

    Ok(CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_origin(AllowOrigin::exact(exact)))
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
