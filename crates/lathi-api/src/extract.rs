//! Request extractors.

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::error::{ApiError, ErrorBody};

/// Header carrying the authenticated user's id, set by the gateway in front
/// of this service.
pub const USER_ID_HEADER: &str = "x-user-id";

/// `axum::Json` whose rejections answer with the `{error, message}` body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Path` whose rejections answer with the `{error, message}`
/// body.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// The user the request acts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub Uuid);

/// Rejection for a missing or malformed user header.
#[derive(Debug)]
pub struct Unauthenticated(&'static str);

impl IntoResponse for Unauthenticated {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: "unauthorized",
            message: self.0.to_owned(),
        };
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Unauthenticated;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or(Unauthenticated("x-user-id header is required"))?;
        raw.to_str()
            .ok()
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .map(Self)
            .ok_or(Unauthenticated("x-user-id header must be a UUID"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Result<CurrentUser, Unauthenticated> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(USER_ID_HEADER, value);
        }
        let (mut parts, ()) = builder.body(()).unwrap().into_parts();
        CurrentUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_valid_header_yields_user() {
        let user_id = Uuid::new_v4();

        let user = extract(Some(&user_id.to_string())).await.unwrap();

        assert_eq!(user, CurrentUser(user_id));
    }

    #[tokio::test]
    async fn test_missing_or_malformed_header_is_401() {
        for header in [None, Some("not-a-uuid")] {
            let response = extract(header).await.unwrap_err().into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }
}
