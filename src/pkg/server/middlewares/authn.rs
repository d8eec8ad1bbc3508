use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::{
    pkg::{internal::auth::Session, server::state::AppState},
    prelude::{Error, Result},
};

pub const SESSION_COOKIE: &str = "_Host_session";

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Resolves the bearer credential (Authorization header, session cookie as
/// fallback) to a [`User`](crate::pkg::internal::auth::User) and attaches
/// it to the request. Role and college always come from this resolution,
/// never from the request body.
pub async fn authenticate(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let jar = CookieJar::from_headers(&headers);
    let credential = bearer_token(&headers).or_else(|| {
        jar.get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
    });
    if let Some(credential) = credential {
        match Session::resolve(&state, &credential).await {
            Ok(user) => {
                request.extensions_mut().insert(Arc::new(user));
                return Ok(next.run(request).await);
            }
            // a live session pointing at no user row is a 404, a dead
            // store is a 500; only a bad credential falls through to 401
            Err(Error::Unauthenticated) => {}
            Err(other) => return Err(other),
        }
    }
    tracing::warn!("credential missing or invalid, authentication denied");
    Err(Error::Unauthenticated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_requires_the_scheme_prefix() {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_static("Bearer 6e1ad199-dd8a-4d1a-9072-5a7e8f7c11ab"),
        );
        assert_eq!(
            bearer_token(&headers).as_deref(),
            Some("6e1ad199-dd8a-4d1a-9072-5a7e8f7c11ab")
        );

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_static("6e1ad199-dd8a-4d1a-9072-5a7e8f7c11ab"),
        );
        assert_eq!(bearer_token(&headers), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
