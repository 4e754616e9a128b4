//! Caller identity extractor.
//!
//! Real authentication lives in front of this service; the trusted proxy
//! forwards the resolved user id in the `X-User-Id` header. Local
//! development may fall back to a configured anonymous id.

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let header = req
            .headers()
            .get("X-User-Id")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        if let Some(id) = header {
            return ready(Ok(CurrentUser { id: id.to_string() }));
        }

        let fallback = req
            .app_data::<web::Data<AppState>>()
            .filter(|state| state.config.allow_anon)
            .map(|state| state.config.default_user_id.clone());

        ready(match fallback {
            Some(id) => Ok(CurrentUser { id }),
            None => Err(AppError::Unauthorized),
        })
    }
}
