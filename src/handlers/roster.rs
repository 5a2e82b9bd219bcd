//! Member and admin roster management for a hotline.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::audit::{self, AuditKind};
use crate::db::models::{NewAdmin, NewMember};
use crate::error::HotlineError;
use crate::middleware::auth::RequireKeyAuth;
use crate::middleware::json::AppJson;
use crate::router::HotlineState;

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    #[serde(flatten)]
    pub member: NewMember,
    pub user: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddAdminRequest {
    #[serde(flatten)]
    pub admin: NewAdmin,
    pub user: Option<String>,
}

/// GET /hotlines/{slug}/members
pub async fn list_members(
    State(state): State<HotlineState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, HotlineError> {
    let hotline = state.db.get_hotline(&slug).await?;
    let members = state.db.list_members(hotline.id).await?;
    Ok(Json(members))
}

/// POST /hotlines/{slug}/members — members start unverified.
pub async fn add_member(
    _auth: RequireKeyAuth,
    State(state): State<HotlineState>,
    Path(slug): Path<String>,
    AppJson(req): AppJson<AddMemberRequest>,
) -> Result<impl IntoResponse, HotlineError> {
    let hotline = state.db.get_hotline(&slug).await?;
    let member = state.db.add_member(hotline.id, req.member).await?;

    audit::log(
        &state.db,
        AuditKind::MemberAdded,
        Some(hotline.id),
        req.user.as_deref(),
        format!("Added {} to the hotline.", member.name),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(member)))
}

/// POST /hotlines/{slug}/members/{id}/verify
pub async fn verify_member(
    _auth: RequireKeyAuth,
    State(state): State<HotlineState>,
    Path((slug, id)): Path<(String, i64)>,
) -> Result<impl IntoResponse, HotlineError> {
    let hotline = state.db.get_hotline(&slug).await?;
    state.db.verify_member(hotline.id, id).await?;

    audit::log(
        &state.db,
        AuditKind::MemberVerified,
        Some(hotline.id),
        None,
        format!("Member {id} verified their number."),
    )
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /hotlines/{slug}/members/{id}
pub async fn remove_member(
    _auth: RequireKeyAuth,
    State(state): State<HotlineState>,
    Path((slug, id)): Path<(String, i64)>,
) -> Result<impl IntoResponse, HotlineError> {
    let hotline = state.db.get_hotline(&slug).await?;
    state.db.remove_member(hotline.id, id).await?;

    audit::log(
        &state.db,
        AuditKind::MemberRemoved,
        Some(hotline.id),
        None,
        format!("Removed member {id} from the hotline."),
    )
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /hotlines/{slug}/admins
pub async fn list_admins(
    State(state): State<HotlineState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, HotlineError> {
    let hotline = state.db.get_hotline(&slug).await?;
    let admins = state.db.list_admins(hotline.id).await?;
    Ok(Json(admins))
}

/// POST /hotlines/{slug}/admins
pub async fn add_admin(
    _auth: RequireKeyAuth,
    State(state): State<HotlineState>,
    Path(slug): Path<String>,
    AppJson(req): AppJson<AddAdminRequest>,
) -> Result<impl IntoResponse, HotlineError> {
    let hotline = state.db.get_hotline(&slug).await?;
    let admin = state.db.add_admin(hotline.id, req.admin).await?;
    Ok((StatusCode::CREATED, Json(admin)))
}

/// DELETE /hotlines/{slug}/admins/{id}
pub async fn remove_admin(
    _auth: RequireKeyAuth,
    State(state): State<HotlineState>,
    Path((slug, id)): Path<(String, i64)>,
) -> Result<impl IntoResponse, HotlineError> {
    let hotline = state.db.get_hotline(&slug).await?;
    state.db.remove_admin(hotline.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
