use crate::api::models::ReadingsQuery;
use crate::error::Result;
use crate::models::Reading;
use crate::services::dashboard::EnergyTotal;
use crate::services::DashboardService;
use axum::{
    extract::{Query, State},
    response::Json,
};

/// GET /api/v1/readings?limit=N
pub async fn list(
    State(service): State<DashboardService>,
    Query(params): Query<ReadingsQuery>,
) -> Result<Json<Vec<Reading>>> {
    let limit = params.limit.unwrap_or(service.settings().fetch_limit);
    let readings = service.recent_readings(limit).await?;
    Ok(Json(readings))
}

/// GET /api/v1/energy/total
pub async fn energy_total(State(service): State<DashboardService>) -> Result<Json<EnergyTotal>> {
    Ok(Json(service.energy_total().await?))
}
