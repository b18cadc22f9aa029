use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::services::helplines::Region;

pub const REGION_HEADER: &str = "x-user-region";

/// Caller region from the `x-user-region` header. Missing, non-UTF-8 and
/// unknown values all resolve to the default region; extraction never fails.
#[derive(Debug, Clone, Copy)]
pub struct UserRegion(pub Region);

impl<S> FromRequestParts<S> for UserRegion
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let region = parts
            .headers
            .get(REGION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(Region::from_code)
            .unwrap_or(Region::Default);

        Ok(Self(region))
    }
}
