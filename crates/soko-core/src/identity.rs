//! Caller identity forwarded by the upstream gateway.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use http::request::Parts;
use uuid::Uuid;

pub const X_SOKO_USER_ID: &str = "x-soko-user-id";

/// The signed-in user on whose behalf a request is made, if any.
///
/// The gateway injects `x-soko-user-id` for authenticated sessions. Storefront
/// checkouts may be anonymous, so a missing or unparsable header yields
/// `MaybeUser(None)` rather than a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaybeUser(pub Option<Uuid>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    // Read the header up front so the returned future does not borrow `parts`.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let user_id = parts
            .headers
            .get(X_SOKO_USER_ID)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<Uuid>().ok());

        async move { Ok(Self(user_id)) }
    }
}
