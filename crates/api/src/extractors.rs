//! Request extractors.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use domus_core::Caller;

/// Authenticated caller extractor.
///
/// The auth middleware resolves the bearer token and stores the caller in
/// request extensions; routes that take this extractor reject anonymous
/// requests outright.
#[derive(Debug, Clone)]
pub struct AuthCaller(pub Caller);

impl<S> FromRequestParts<S> for AuthCaller
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Caller>()
            .cloned()
            .map(AuthCaller)
            .ok_or((StatusCode::UNAUTHORIZED, "Unauthorized"))
    }
}
