use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::headers::authorization::{Authorization, Bearer};
use axum_extra::headers::HeaderMapExt;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;

use crate::state::AppState;

/// Role claim carried by a session token. Session issuance lives
/// elsewhere; this core only reads the acting role out of the token.
#[derive(Debug, Deserialize)]
struct SessionClaims {
    role: String,
}

/// The acting role, used for editor-view selection. An opaque uppercase
/// label; requests without a valid bearer token act under the
/// configured default role.
#[derive(Debug, Clone)]
pub struct ActingRole(pub String);

impl FromRequestParts<AppState> for ActingRole {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let role = parts
            .headers
            .typed_get::<Authorization<Bearer>>()
            .and_then(|auth| {
                decode::<SessionClaims>(
                    auth.token(),
                    &DecodingKey::from_secret(state.config().jwt_secret.as_bytes()),
                    &Validation::default(),
                )
                .ok()
            })
            .map(|token| token.claims.role.to_uppercase())
            .unwrap_or_else(|| state.config().default_role.clone());
        Ok(ActingRole(role))
    }
}
