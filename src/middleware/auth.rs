use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use subtle::ConstantTimeEq;

use crate::error::HotlineError;
use crate::router::HotlineState;

/// Ensure the inbound request carries the shared API key.
/// Accepts either:
/// - Header: `x-hotline-key: ...`
/// - Header: `Authorization: Bearer <key>`
///
/// An empty configured key disables the check (local development).
pub fn ensure_authorized(headers: &HeaderMap, expected: &str) -> Result<(), HotlineError> {
    if expected.is_empty() {
        return Ok(());
    }

    if let Some(hv) = headers.get("x-hotline-key").and_then(|v| v.to_str().ok())
        && bool::from(hv.as_bytes().ct_eq(expected.as_bytes()))
    {
        return Ok(());
    }

    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        let auth = auth.trim();
        if let Some(token) = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            && bool::from(token.as_bytes().ct_eq(expected.as_bytes()))
        {
            return Ok(());
        }
    }

    Err(HotlineError::Unauthorized)
}

/// Extractor guarding write endpoints.
#[derive(Debug, Clone, Copy)]
pub struct RequireKeyAuth;

impl FromRequestParts<HotlineState> for RequireKeyAuth {
    type Rejection = HotlineError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &HotlineState,
    ) -> Result<Self, Self::Rejection> {
        ensure_authorized(&parts.headers, &state.api_key)?;
        Ok(Self)
    }
}
