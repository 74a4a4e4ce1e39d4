use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::classify::Category;
use crate::dedup::PublishedArticle;
use crate::service::{NewsService, Origin};

pub const ORIGIN_HEADER: HeaderName = HeaderName::from_static("x-news-origin");

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<NewsService>,
}

impl AppState {
    pub fn new(service: Arc<NewsService>) -> Self {
        Self { service }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/news", get(news))
        .route("/news/search", get(search))
        .route("/admin/clear-cache", post(clear_cache))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
        }
    }
}

fn parse_category(raw: Option<&str>) -> Result<Category, ApiError> {
    raw.unwrap_or("all").parse().map_err(ApiError::BadRequest)
}

#[derive(Deserialize)]
struct NewsQuery {
    category: Option<String>,
    #[serde(default)]
    force_refresh: bool,
}

#[derive(Serialize)]
struct NewsBody {
    origin: Origin,
    count: usize,
    articles: Vec<PublishedArticle>,
}

async fn news(State(state): State<AppState>, Query(q): Query<NewsQuery>) -> Result<Response, ApiError> {
    let category = parse_category(q.category.as_deref())?;
    let resp = state.service.fetch_news(category, q.force_refresh).await;
    let header = HeaderValue::from_static(resp.origin.as_str());
    let body = NewsBody {
        origin: resp.origin,
        count: resp.articles.len(),
        articles: resp.articles,
    };
    Ok(([(ORIGIN_HEADER, header)], Json(body)).into_response())
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

async fn search(State(state): State<AppState>, Query(q): Query<SearchQuery>) -> Json<Vec<PublishedArticle>> {
    Json(state.service.search_news(&q.q).await)
}

#[derive(Deserialize)]
struct ClearQuery {
    category: Option<String>,
}

async fn clear_cache(State(state): State<AppState>, Query(q): Query<ClearQuery>) -> Result<&'static str, ApiError> {
    match q.category.as_deref() {
        None => state.service.clear_cache(),
        Some(raw) => state.service.clear_category(parse_category(Some(raw))?),
    }
    tracing::info!(target: "news", category = ?q.category, "cache cleared via admin route");
    Ok("cleared")
}
