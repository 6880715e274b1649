use crate::api::models::{CommandRequest, CommandResponse};
use crate::error::Result;
use crate::models::Command;
use crate::services::DashboardService;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Json, Redirect},
};

/// POST /api/v1/commands
pub async fn create(
    State(service): State<DashboardService>,
    Json(request): Json<CommandRequest>,
) -> Result<(StatusCode, Json<CommandResponse>)> {
    service.ensure_controls()?;
    let command: Command = request.command.parse()?;
    service.send_command(command).await?;

    // Accepted: the actuator picks it up later
    Ok((StatusCode::ACCEPTED, Json(CommandResponse::queued(command))))
}

/// POST /commands/:command from the page buttons
pub async fn submit_form(
    State(service): State<DashboardService>,
    Path(command): Path<String>,
) -> Result<Redirect> {
    service.ensure_controls()?;
    let command: Command = command.parse()?;
    service.send_command(command).await?;
    Ok(Redirect::to(&format!("/?sent={}", command)))
}
