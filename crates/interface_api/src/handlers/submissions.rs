//! Submission and track handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use core_kernel::SubmissionId;
use domain_evp::{
    ClaimTrack, DecideCommand, SubmitClaim, TrackEvent, TrackProjection, TrackType,
};

use super::parse_segment;
use crate::auth::Actor;
use crate::dto::evp::*;
use crate::{error::ApiError, AppState};

fn track_path(id: &str, track_type: &str) -> Result<(SubmissionId, TrackType), ApiError> {
    Ok((
        parse_segment("submission id", id)?,
        parse_segment("track type", track_type)?,
    ))
}

/// Opens a submission for an employee
pub async fn open_submission(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<OpenSubmissionRequest>,
) -> Result<(StatusCode, Json<SubmissionResponse>), ApiError> {
    request.validate()?;

    let submission = state
        .service
        .open_submission(actor.role, request.employee(), actor.user_id, &request.drafts())
        .await?;

    Ok((StatusCode::CREATED, Json(submission.into())))
}

/// Gets a submission with both of its tracks
pub async fn get_submission(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    let id = parse_segment("submission id", &id)?;
    let submission = state.service.get_submission(id).await?;
    Ok(Json(submission.into()))
}

/// Adds the missing sibling track
pub async fn attach_track(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(request): Json<TrackDraftRequest>,
) -> Result<(StatusCode, Json<ClaimTrack>), ApiError> {
    request.validate()?;
    let id = parse_segment("submission id", &id)?;

    let track = state
        .service
        .attach_track(actor.role, id, request.track_type, request.amount)
        .await?;

    Ok((StatusCode::CREATED, Json(track)))
}

/// Submits or resubmits a track
pub async fn submit_track(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((id, track_type)): Path<(String, String)>,
    Json(request): Json<SubmitClaimRequest>,
) -> Result<Json<ClaimTrack>, ApiError> {
    request.validate()?;
    let (submission_id, track_type) = track_path(&id, &track_type)?;

    let track = state
        .service
        .submit_claim(SubmitClaim {
            submission_id,
            track_type,
            actor: actor.role,
            amount: request.amount,
            expected_version: request.expected_version,
        })
        .await?;

    Ok(Json(track))
}

/// Approves or rejects a track
pub async fn decide(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((id, track_type)): Path<(String, String)>,
    Json(request): Json<DecisionRequest>,
) -> Result<Json<TrackProjection>, ApiError> {
    request.validate()?;
    let (submission_id, track_type) = track_path(&id, &track_type)?;

    let mut command = DecideCommand::new(submission_id, track_type, actor.role, request.action);
    command.comment = request.comment;
    command.expected_version = request.expected_version;

    let projection = state.service.decide_retrying_once(command).await?;
    Ok(Json(projection))
}

/// Audit trail of one track
pub async fn track_history(
    State(state): State<AppState>,
    Path((id, track_type)): Path<(String, String)>,
) -> Result<Json<Vec<TrackEvent>>, ApiError> {
    let (submission_id, track_type) = track_path(&id, &track_type)?;
    let events = state.service.track_history(submission_id, track_type).await?;
    Ok(Json(events))
}
