//! Access gate middleware.
//!
//! Resolves the `session_token` cookie to an identity, asks the gate for a
//! decision, and either forwards the request (with the identity attached as
//! an extension) or redirects.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::warn;

use inkform_access::Decision;
use inkform_core::identity::{Identity, SessionResolver};

use crate::state::AppState;

/// The identity attached to a forwarded request. `None` for anonymous
/// callers on paths the gate lets through without a session.
#[derive(Clone)]
pub struct Caller(pub Option<Identity>);

pub async fn access_gate(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = match session_token(&request) {
        Some(token) => match state.directory.resolve(&token).await {
            Ok(identity) => identity,
            Err(e) => {
                warn!(error = %e, "session resolution failed");
                None
            }
        },
        None => None,
    };

    let path = request.uri().path().to_owned();
    match state.gate.evaluate(identity.as_ref(), &path).await {
        Decision::Allow => {
            request.extensions_mut().insert(Caller(identity));
            next.run(request).await
        }
        Decision::Redirect(target) => Redirect::temporary(target).into_response(),
    }
}

fn session_token(request: &Request) -> Option<String> {
    let cookies = request
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())?;

    cookies
        .split(';')
        .map(|c| c.trim())
        .find_map(|c| c.strip_prefix("session_token="))
        .map(|t| t.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with_cookie(cookie: &str) -> Request {
        Request::builder()
            .uri("/studio")
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn extracts_session_token_among_other_cookies() {
        let request = request_with_cookie("theme=dark; session_token=abc123; lang=it");
        assert_eq!(session_token(&request), Some("abc123".to_owned()));
    }

    #[test]
    fn missing_cookie_header_yields_none() {
        let request = Request::builder()
            .uri("/studio")
            .body(Body::empty())
            .unwrap();
        assert_eq!(session_token(&request), None);
    }

    #[test]
    fn unrelated_cookies_yield_none() {
        let request = request_with_cookie("theme=dark; lang=it");
        assert_eq!(session_token(&request), None);
    }
}
