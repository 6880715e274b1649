use crate::api::models::SentQuery;
use crate::render::{render_page, PageContext};
use crate::services::{DashboardService, DashboardSnapshot};
use axum::{
    extract::{Query, State},
    response::{Html, Json},
};

/// GET /
pub async fn page(
    State(service): State<DashboardService>,
    Query(query): Query<SentQuery>,
) -> Html<String> {
    let snapshot = service.current().await;
    let ctx = PageContext {
        // Unknown values are ignored rather than rejected
        sent: query.sent.and_then(|s| s.parse().ok()),
    };
    Html(render_page(&snapshot, service.settings(), &ctx))
}

/// GET /api/v1/dashboard
pub async fn snapshot(State(service): State<DashboardService>) -> Json<DashboardSnapshot> {
    Json(service.current().await)
}
