//! Axum extractors for request-scoped bridge state.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;

use super::{Context, RemoteAddr};

const MISSING: (StatusCode, &str) = (
    StatusCode::INTERNAL_SERVER_ERROR,
    "request context missing: bridge middleware not installed",
);

impl<S: Send + Sync> FromRequestParts<S> for Context {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Context>().cloned().ok_or(MISSING)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for RemoteAddr {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<RemoteAddr>().cloned().ok_or(MISSING)
    }
}
