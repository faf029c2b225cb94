pub mod dtos;
pub mod handlers;

use axum::{Router, routing::get};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{app_state::AppState, health::health_check, middleware::security_headers_middleware};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/feed.xml", get(handlers::feed_xml))
        .route("/sitemap.xml", get(handlers::sitemap_xml))
        .route("/api/articles", get(handlers::list_articles))
        .route("/healthz", get(health_check))
        .with_state(state)
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
