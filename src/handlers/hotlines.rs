use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::info;

use crate::audit::{self, AuditKind};
use crate::config::CONFIG;
use crate::db::models::{NewAuditEntry, NewHotline, NumberFeatures};
use crate::error::HotlineError;
use crate::middleware::auth::RequireKeyAuth;
use crate::middleware::json::AppJson;
use crate::router::HotlineState;

#[derive(Debug, Deserialize)]
pub struct CreateHotlineRequest {
    #[serde(flatten)]
    pub hotline: NewHotline,
    /// Identity to attribute the change to in the audit log.
    pub user: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDetailsRequest {
    pub name: String,
    pub voice_greeting: Option<String>,
    pub user: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssignNumberRequest {
    pub number: String,
    pub country: Option<String>,
    pub features: Option<NumberFeatures>,
    pub user: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<i64>,
}

/// GET /hotlines
pub async fn list(State(state): State<HotlineState>) -> Result<impl IntoResponse, HotlineError> {
    let hotlines = state.db.list_hotlines().await?;
    Ok(Json(hotlines))
}

/// POST /hotlines
pub async fn create(
    _auth: RequireKeyAuth,
    State(state): State<HotlineState>,
    AppJson(req): AppJson<CreateHotlineRequest>,
) -> Result<impl IntoResponse, HotlineError> {
    let mut new = req.hotline;
    if new.country.is_none() {
        new.country = Some(CONFIG.country.clone());
    }
    let hotline = state.db.create_hotline(new).await?;

    audit::log(
        &state.db,
        AuditKind::HotlineCreated,
        Some(hotline.id),
        req.user.as_deref(),
        format!(
            "{} created the hotline.",
            req.user.as_deref().unwrap_or("unknown")
        ),
    )
    .await?;

    info!(slug = %hotline.slug, "hotline created");
    Ok((StatusCode::CREATED, Json(hotline)))
}

/// GET /hotlines/{slug}
pub async fn get(
    State(state): State<HotlineState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, HotlineError> {
    let hotline = state.db.get_hotline(&slug).await?;
    Ok(Json(hotline))
}

/// PUT /hotlines/{slug}/details
pub async fn update_details(
    _auth: RequireKeyAuth,
    State(state): State<HotlineState>,
    Path(slug): Path<String>,
    AppJson(req): AppJson<UpdateDetailsRequest>,
) -> Result<impl IntoResponse, HotlineError> {
    let hotline = state
        .db
        .update_hotline_details(&slug, &req.name, req.voice_greeting.as_deref())
        .await?;

    audit::log(
        &state.db,
        AuditKind::HotlineModified,
        Some(hotline.id),
        req.user.as_deref(),
        format!(
            "{} updated the hotline details.",
            req.user.as_deref().unwrap_or("unknown")
        ),
    )
    .await?;

    Ok(Json(hotline))
}

/// POST /hotlines/{slug}/number — provision a number row and make it the
/// hotline's primary number.
pub async fn assign_number(
    _auth: RequireKeyAuth,
    State(state): State<HotlineState>,
    Path(slug): Path<String>,
    AppJson(req): AppJson<AssignNumberRequest>,
) -> Result<impl IntoResponse, HotlineError> {
    let country = req.country.as_deref().unwrap_or(&CONFIG.country);
    let features = req.features.unwrap_or_default();
    let number = state
        .db
        .create_number(&req.number, country, features)
        .await?;
    let hotline = state.db.assign_primary_number(&slug, number.id).await?;

    state
        .db
        .record_audit(
            AuditKind::NumberAssigned,
            NewAuditEntry {
                description: Some(format!("Assigned {} as the primary number.", number.number)),
                hotline_id: Some(hotline.id),
                user: req.user.clone(),
                metadata: Some(serde_json::to_string(&features)?),
                ..NewAuditEntry::default()
            },
        )
        .await?;

    info!(slug = %hotline.slug, number = %number.number, "primary number assigned");
    Ok(Json(hotline))
}

/// DELETE /hotlines/{slug}/number — release the primary number assignment.
pub async fn release_number(
    _auth: RequireKeyAuth,
    State(state): State<HotlineState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, HotlineError> {
    let hotline = state.db.get_hotline(&slug).await?;
    let released = hotline
        .primary_number
        .ok_or(HotlineError::NotFound("primary number"))?;

    let updated = state.db.release_primary_number(&slug).await?;

    audit::log(
        &state.db,
        AuditKind::NumberReleased,
        Some(updated.id),
        None,
        format!("Released {released}."),
    )
    .await?;

    info!(slug = %updated.slug, number = %released, "primary number released");
    Ok(Json(updated))
}

/// DELETE /hotlines/{slug}
pub async fn delete(
    _auth: RequireKeyAuth,
    State(state): State<HotlineState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, HotlineError> {
    state.db.delete_hotline(&slug).await?;
    info!(slug = %slug, "hotline deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /hotlines/{slug}/auditlog
pub async fn auditlog(
    State(state): State<HotlineState>,
    Path(slug): Path<String>,
    Query(query): Query<AuditQuery>,
) -> Result<impl IntoResponse, HotlineError> {
    let hotline = state.db.get_hotline(&slug).await?;
    let entries = state
        .db
        .list_audit(hotline.id, query.limit.unwrap_or(50))
        .await?;
    Ok(Json(entries))
}
