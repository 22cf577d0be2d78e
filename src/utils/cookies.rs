// src/utils/cookies.rs

use axum::{
    body::Body,
    http::{HeaderValue, Request, header},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "quiz_session";

/// The per-browser session token, injected into request extensions by
/// [`session_middleware`]. Handlers use it to key the `SessionStore`.
#[derive(Debug, Clone, Copy)]
pub struct SessionToken(pub Uuid);

/// Axum Middleware: session identification.
///
/// Reads the `quiz_session` cookie, minting a fresh UUID when the request
/// carries none (or an unparseable one), and injects the token into the
/// request extensions. New tokens are sent back via `Set-Cookie`.
pub async fn session_middleware(mut req: Request<Body>, next: Next) -> Response {
    let existing = req
        .headers()
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_session_cookie);

    let (token, is_new) = match existing {
        Some(token) => (token, false),
        None => (Uuid::new_v4(), true),
    };

    req.extensions_mut().insert(SessionToken(token));
    let mut response = next.run(req).await;

    if is_new {
        let cookie = format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax");
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }

    response
}

fn parse_session_cookie(header: &str) -> Option<Uuid> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value).ok())
}
