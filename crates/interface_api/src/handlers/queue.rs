//! Role queue, payroll export and reporting handlers

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use domain_evp::{ExportedTrack, ProjectedView, ReportingSummary};

use super::parse_segment;
use crate::auth::Actor;
use crate::{error::ApiError, AppState};

/// Submissions as the caller's role sees them
pub async fn role_queue(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<ProjectedView>>, ApiError> {
    let views = state.service.project_for_role(actor.role).await?;
    Ok(Json(views))
}

/// Tracks of one type ready for payroll
pub async fn export_approved(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(track_type): Path<String>,
) -> Result<Json<Vec<ExportedTrack>>, ApiError> {
    let track_type = parse_segment("track type", &track_type)?;
    let exported = state.service.export_approved_tracks(actor.role, track_type).await?;
    Ok(Json(exported))
}

pub async fn reporting_summary(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<ReportingSummary>, ApiError> {
    let summary = state.service.reporting_summary(actor.role).await?;
    Ok(Json(summary))
}
