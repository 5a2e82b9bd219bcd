use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::audit::{self, AuditKind};
use crate::error::HotlineError;
use crate::middleware::auth::RequireKeyAuth;
use crate::middleware::json::AppJson;
use crate::router::HotlineState;

#[derive(Debug, Deserialize)]
pub struct BlockRequest {
    pub number: String,
    pub blocked_by: Option<String>,
}

/// GET /hotlines/{slug}/blocklist
pub async fn list(
    State(state): State<HotlineState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, HotlineError> {
    let hotline = state.db.get_hotline(&slug).await?;
    let blocked = state.db.list_blocked(hotline.id).await?;
    Ok(Json(blocked))
}

/// POST /hotlines/{slug}/blocklist
pub async fn block(
    _auth: RequireKeyAuth,
    State(state): State<HotlineState>,
    Path(slug): Path<String>,
    AppJson(req): AppJson<BlockRequest>,
) -> Result<impl IntoResponse, HotlineError> {
    let hotline = state.db.get_hotline(&slug).await?;
    let entry = state
        .db
        .block_number(hotline.id, &req.number, req.blocked_by.as_deref())
        .await?;

    audit::log(
        &state.db,
        AuditKind::NumberBlocked,
        Some(hotline.id),
        req.blocked_by.as_deref(),
        format!("Blocked {} from the hotline.", entry.number),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// DELETE /hotlines/{slug}/blocklist/{number}
pub async fn unblock(
    _auth: RequireKeyAuth,
    State(state): State<HotlineState>,
    Path((slug, number)): Path<(String, String)>,
) -> Result<impl IntoResponse, HotlineError> {
    let hotline = state.db.get_hotline(&slug).await?;
    state.db.unblock_number(hotline.id, &number).await?;

    audit::log(
        &state.db,
        AuditKind::NumberUnblocked,
        Some(hotline.id),
        None,
        format!("Unblocked {number}."),
    )
    .await?;

    Ok(StatusCode::NO_CONTENT)
}
