//! Server 应用装配：路由、鉴权中间件、CORS 与监听。

use std::sync::Arc;

use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware,
    routing::{get, post, put},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::{
    auth::{clock::SystemClock, handlers::auth_login_handler, middleware::require_bearer},
    config::Config,
    products::handlers::{
        create_product_handler, delete_product_handler, get_product_handler,
        list_products_handler, update_product_handler,
    },
    state::AppState,
};

/// Server 入口：按配置启动 HTTP 路由。
pub(crate) async fn run(config: Config) -> anyhow::Result<()> {
    config.warn_insecure_defaults();
    let state = AppState::new(&config, Arc::new(SystemClock));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.addr).await?;
    info!(
        ttl_sec = config.token_ttl_sec,
        "productd listening on {}", config.addr
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// 构建路由：读接口公开，写接口经 `require_bearer` 保护。
pub(crate) fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    let protected = Router::new()
        .route("/v1/products", post(create_product_handler))
        .route(
            "/v1/products/{id}",
            put(update_product_handler)
                .patch(update_product_handler)
                .delete(delete_product_handler),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_bearer,
        ));

    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/auth/login", post(auth_login_handler))
        .route("/v1/products", get(list_products_handler))
        .route("/v1/products/{id}", get(get_product_handler))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// 健康检查接口。
async fn healthz() -> &'static str {
    "ok"
}

/// 等待 Ctrl-C 后优雅退出。
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
