use axum::Json;
use axum::extract::{FromRequest, Request, rejection::JsonRejection};

use crate::error::HotlineError;

/// `axum::Json` with the crate's error envelope: a body that fails to parse
/// rejects as [`HotlineError::BadRequest`] instead of axum's plain-text
/// rejection.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = HotlineError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(HotlineError::BadRequest(rejection.body_text())),
        }
    }
}
