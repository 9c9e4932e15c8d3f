use std::collections::HashMap;

use axum::http::Uri;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::config::{CSRF_COOKIE, CSRF_PARAM, SAVED_REQUEST_COOKIE, SESSION_COOKIE};
use crate::error::AppError;
use crate::models::{AppState, Session};
use crate::services::{random_token, Authorization};
use crate::utils::is_local_redirect;

pub fn session_id_from_jar(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE).map(|c| c.value().to_string())
}

pub fn current_session_from_jar(state: &AppState, jar: &CookieJar) -> Option<Session> {
    match state.gate.authorize(session_id_from_jar(jar).as_deref()) {
        Authorization::Authenticated(session) => Some(session),
        Authorization::Unauthenticated => None,
    }
}

pub fn session_cookie(session: &Session) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, session.id.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

pub fn clear_session_cookie(jar: CookieJar) -> CookieJar {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    jar.remove(cookie)
}

/// Remember where an unauthenticated GET was headed so login can send the
/// client back there.
pub fn save_request(jar: CookieJar, uri: &Uri) -> CookieJar {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    if !is_local_redirect(&target) {
        return jar;
    }
    let mut cookie = Cookie::new(SAVED_REQUEST_COOKIE, urlencoding::encode(&target).into_owned());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(time::Duration::minutes(10));
    jar.add(cookie)
}

pub fn saved_request(jar: &CookieJar) -> Option<String> {
    let raw = jar.get(SAVED_REQUEST_COOKIE)?.value().to_string();
    let target = urlencoding::decode(&raw).ok()?.into_owned();
    is_local_redirect(&target).then_some(target)
}

pub fn clear_saved_request(jar: CookieJar) -> CookieJar {
    if jar.get(SAVED_REQUEST_COOKIE).is_none() {
        return jar;
    }
    let mut cookie = Cookie::new(SAVED_REQUEST_COOKIE, "");
    cookie.set_path("/");
    jar.remove(cookie)
}

/// Where to send the client after a successful login.
pub fn success_target(state: &AppState, jar: &CookieJar) -> String {
    if state.config.always_use_default_success_url {
        return state.config.default_success_url.clone();
    }
    saved_request(jar)
        .filter(|t| !state.gate.is_permitted(t.split('?').next().unwrap_or(t.as_str())))
        .unwrap_or_else(|| state.config.default_success_url.clone())
}

/// Returns the CSRF token for the login form, issuing a cookie when the
/// client does not have one yet. `None` when protection is disabled.
pub fn ensure_csrf_token(state: &AppState, jar: CookieJar) -> (CookieJar, Option<String>) {
    if !state.config.csrf_protection {
        return (jar, None);
    }
    if let Some(existing) = jar.get(CSRF_COOKIE).map(|c| c.value().to_string()) {
        if !existing.is_empty() {
            return (jar, Some(existing));
        }
    }
    let token = random_token();
    let mut cookie = Cookie::new(CSRF_COOKIE, token.clone());
    cookie.set_path("/");
    cookie.set_same_site(SameSite::Strict);
    (jar.add(cookie), Some(token))
}

/// Double-submit check: the form field must equal the cookie.
pub fn verify_csrf(
    state: &AppState,
    jar: &CookieJar,
    fields: &HashMap<String, Vec<String>>,
) -> Result<(), AppError> {
    if !state.config.csrf_protection {
        return Ok(());
    }
    let cookie = jar.get(CSRF_COOKIE).map(|c| c.value().to_string());
    let submitted = fields.get(CSRF_PARAM).and_then(|v| v.first());
    match (cookie, submitted) {
        (Some(c), Some(s)) if !c.is_empty() && &c == s => Ok(()),
        _ => Err(AppError::CsrfMismatch),
    }
}
