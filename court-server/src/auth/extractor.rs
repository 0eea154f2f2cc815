//! JWT Extractor
//!
//! Handlers take a [`CurrentUser`] argument; the token is validated before the
//! handler body runs.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;
use shared::AppError;

/// Validate a raw token and build the caller context
///
/// Shared by the HTTP extractor and the socket handshake.
pub fn authenticate(jwt: &JwtService, token: &str, uri: &str) -> Result<CurrentUser, AppError> {
    match jwt.validate_token(token) {
        Ok(claims) => CurrentUser::try_from(claims).map_err(|e| {
            security_log!("WARN", "auth_malformed_claims", error = e.as_str(), uri = uri);
            AppError::invalid_token(format!("Malformed JWT claims: {}", e))
        }),
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = uri
            );

            match e {
                JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let auth_header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let token = match auth_header {
            Some(header) => JwtService::extract_from_header(header)
                .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
            None => {
                security_log!("WARN", "auth_missing", uri = parts.uri.to_string());
                return Err(AppError::unauthorized());
            }
        };

        let user = authenticate(&state.get_jwt_service(), token, &parts.uri.to_string())?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}
