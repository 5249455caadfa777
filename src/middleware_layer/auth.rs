use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_cookies::Cookies;

use crate::{
    crypto::token::{TokenCodec, TokenStatus},
    error::{AppError, Result},
    models::identity::Identity,
    services::session::ACCESS_TOKEN_COOKIE,
    state::AppState,
};

/// The identity resolved for a public route. `None` means anonymous.
#[derive(Debug, Clone, Default)]
pub struct CurrentIdentity(pub Option<Identity>);

/// Resolves the session artifact of a request into an identity.
///
/// A missing or empty artifact is anonymous (`Ok(None)`), not an error.
/// Expired and malformed tokens are reported as `AppError::TokenExpired` and
/// `AppError::TokenMalformed`. Never touches the session itself.
pub fn resolve(codec: &TokenCodec, artifact: Option<&str>) -> Result<Option<Identity>> {
    let Some(token) = artifact.filter(|value| !value.is_empty()) else {
        return Ok(None);
    };

    match codec.verify(token) {
        TokenStatus::Valid(identity) => Ok(Some(identity)),
        TokenStatus::Expired => Err(AppError::TokenExpired),
        TokenStatus::Malformed => Err(AppError::TokenMalformed),
    }
}

/// Extracts the session token from the request cookies.
fn extract_session_token(cookies: &Cookies) -> Option<String> {
    cookies
        .get(ACCESS_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

/// A middleware that attaches the optional current identity to the request.
///
/// A stale or forged cookie is cleared and the request continues as
/// anonymous.
pub async fn resolve_identity(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = extract_session_token(&cookies);

    let identity = match resolve(state.sessions.codec(), token.as_deref()) {
        Ok(identity) => identity,
        Err(e) => {
            tracing::debug!("Treating request as anonymous: {}", e);
            state.sessions.clear_session(&cookies);
            None
        }
    };

    request.extensions_mut().insert(CurrentIdentity(identity));
    next.run(request).await
}

/// A middleware that requires a valid session to be present.
///
/// On success the resolved `Identity` is inserted into the request
/// extensions. Expired and malformed sessions are rejected with 401 and the
/// cookie is cleared.
pub async fn require_auth(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    tracing::debug!("🔐 Checking authentication...");

    let token = extract_session_token(&cookies);

    match resolve(state.sessions.codec(), token.as_deref()) {
        Ok(Some(identity)) => {
            tracing::debug!("✅ User authenticated: {}", identity.id);
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Ok(None) => {
            tracing::debug!("❌ No access_token cookie found");
            AppError::Unauthorized.into_response()
        }
        Err(e) => {
            state.sessions.clear_session(&cookies);
            e.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, Duration};

    use super::*;
    use crate::clock::ManualClock;
    use crate::crypto::token::TokenConfig;

    fn codec() -> (TokenCodec, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        ));
        let config = TokenConfig::new("resolver-test-secret-0123456789abcdef", "HS256").unwrap();
        (TokenCodec::new(config, clock.clone()), clock)
    }

    #[test]
    fn missing_artifact_is_anonymous() {
        let (codec, _) = codec();

        assert_eq!(resolve(&codec, None), Ok(None));
    }

    #[test]
    fn cleared_artifact_is_anonymous() {
        let (codec, _) = codec();

        assert_eq!(resolve(&codec, Some("")), Ok(None));
    }

    #[test]
    fn valid_token_resolves_to_identity() {
        let (codec, _) = codec();
        let token = codec.mint("u-1", "alice", None).unwrap();

        assert_eq!(
            resolve(&codec, Some(&token)),
            Ok(Some(Identity::new("u-1", "alice")))
        );
    }

    #[test]
    fn expired_and_malformed_are_distinct_errors() {
        let (codec, clock) = codec();
        let token = codec.mint("u-1", "alice", None).unwrap();

        assert_eq!(resolve(&codec, Some("garbage")), Err(AppError::TokenMalformed));

        clock.advance(Duration::minutes(16));
        assert_eq!(resolve(&codec, Some(&token)), Err(AppError::TokenExpired));
    }
}
