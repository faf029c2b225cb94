use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::{
    app_state::AppState,
    catalog::{self, CatalogError},
    feed::{self, FEED_CACHE_CONTROL, FEED_CONTENT_TYPE, FeedError},
    routes::dtos::{ArticleSummary, ErrorResponse},
    sitemap::{self, SitemapError},
};

/// Anything that turns a request into a 500.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Feed(#[from] FeedError),
    #[error(transparent)]
    Sitemap(#[from] SitemapError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!(error = %self, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// `GET /feed.xml`
pub async fn feed_xml(State(state): State<AppState>) -> Result<Response, AppError> {
    let xml = feed::generate(&state.config).await?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, FEED_CONTENT_TYPE),
            (header::CACHE_CONTROL, FEED_CACHE_CONTROL),
        ],
        xml,
    )
        .into_response())
}

/// `GET /sitemap.xml`
pub async fn sitemap_xml(State(state): State<AppState>) -> Result<Response, AppError> {
    let entries = sitemap::generate(&state.config).await?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/xml")],
        sitemap::to_xml(&entries),
    )
        .into_response())
}

/// `GET /api/articles`: the article index, newest first.
pub async fn list_articles(
    State(state): State<AppState>,
) -> Result<Json<Vec<ArticleSummary>>, AppError> {
    let catalog = catalog::build(state.config.content_dir()).await?;
    let site_url = state.config.site_url();
    Ok(Json(
        catalog
            .articles()
            .iter()
            .map(|article| ArticleSummary::from_article(article, site_url))
            .collect(),
    ))
}
