use std::net::SocketAddr;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::handlers::{admin, auth, health, products};
use crate::middleware as app_middleware;
use crate::state::AppState;

pub struct FurnishServer {
    addr: SocketAddr,
    app: Router,
}

pub fn build_app(cfg: &AppConfig, state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/products", post(admin::create).get(products::list))
        .route("/products/{id}", put(admin::update).delete(admin::delete))
        .route("/products/{id}/stock", put(admin::update_stock))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            app_middleware::require_admin,
        ));

    Router::new()
        .route("/", get(health::root))
        .route("/api/health", get(health::health))
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/products", get(products::list))
        .route("/api/products/search", get(products::search))
        .route("/api/products/{id}", get(products::get))
        .route(
            "/api/profile",
            get(auth::profile).layer(middleware::from_fn_with_state(
                state.clone(),
                app_middleware::require_auth,
            )),
        )
        .nest("/api/admin", admin_routes)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let req_id = req
                        .extensions()
                        .get::<axum::http::HeaderValue>()
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                        request_id = %req_id
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        // Outermost, so the id is in place before the request span forms.
        .layer(middleware::from_fn(app_middleware::request_id))
        .layer(axum::extract::DefaultBodyLimit::max(cfg.server.body_limit_bytes))
        .with_state(state)
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
    state: AppState,
}

impl ServerBuilder {
    pub fn new(config: AppConfig, state: AppState) -> Self {
        Self {
            addr: config.addr(),
            config,
            state,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn build(self) -> FurnishServer {
        let app = build_app(&self.config, self.state);
        FurnishServer {
            addr: self.addr,
            app,
        }
    }
}

impl FurnishServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
