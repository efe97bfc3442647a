//! Bearer-token authentication for API handlers.
//!
//! Any handler taking a [`CurrentUser`] argument requires a valid token;
//! role checks happen inside the handler via `CurrentUser::require_role`.

use axum::{async_trait, extract::FromRequestParts, http::header, http::request::Parts};

use crate::errors::KitchenError;
use crate::server::app::AppState;
use crate::services::auth_service::CurrentUser;
use crate::services::AuthService;

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = KitchenError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        let token = bearer_token(header)
            .ok_or_else(|| KitchenError::unauthorized("Missing auth token"))?;
        AuthService::new(state.db.clone()).authenticate(token).await
    }
}

fn bearer_token(header: Option<&str>) -> Option<&str> {
    let (scheme, token) = header?.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") {
        let token = token.trim();
        (!token.is_empty()).then_some(token)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc123")), Some("abc123"));
        assert_eq!(bearer_token(Some("bearer abc123")), Some("abc123"));
        assert_eq!(bearer_token(Some("Bearer   abc123  ")), Some("abc123"));
        assert_eq!(bearer_token(Some("Basic abc123")), None);
        assert_eq!(bearer_token(Some("Bearer ")), None);
        assert_eq!(bearer_token(Some("abc123")), None);
        assert_eq!(bearer_token(None), None);
    }
}
