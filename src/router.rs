use axum::{
    Router,
    routing::{delete, get, post, put},
};
use std::sync::Arc;

use crate::db::sqlite::HotlineStorage;
use crate::handlers::{blocklist, hotlines, roster};

#[derive(Clone)]
pub struct HotlineState {
    pub db: HotlineStorage,
    /// Shared key for write endpoints. Empty disables auth.
    pub api_key: Arc<str>,
}

impl HotlineState {
    pub fn new(db: HotlineStorage, api_key: Arc<str>) -> Self {
        Self { db, api_key }
    }
}

pub fn hotline_router(state: HotlineState) -> Router {
    Router::new()
        .route("/hotlines", get(hotlines::list).post(hotlines::create))
        .route(
            "/hotlines/{slug}",
            get(hotlines::get).delete(hotlines::delete),
        )
        .route("/hotlines/{slug}/details", put(hotlines::update_details))
        .route(
            "/hotlines/{slug}/number",
            post(hotlines::assign_number).delete(hotlines::release_number),
        )
        .route("/hotlines/{slug}/auditlog", get(hotlines::auditlog))
        .route(
            "/hotlines/{slug}/members",
            get(roster::list_members).post(roster::add_member),
        )
        .route(
            "/hotlines/{slug}/members/{id}/verify",
            post(roster::verify_member),
        )
        .route(
            "/hotlines/{slug}/members/{id}",
            delete(roster::remove_member),
        )
        .route(
            "/hotlines/{slug}/admins",
            get(roster::list_admins).post(roster::add_admin),
        )
        .route("/hotlines/{slug}/admins/{id}", delete(roster::remove_admin))
        .route(
            "/hotlines/{slug}/blocklist",
            get(blocklist::list).post(blocklist::block),
        )
        .route(
            "/hotlines/{slug}/blocklist/{number}",
            delete(blocklist::unblock),
        )
        .with_state(state)
}
