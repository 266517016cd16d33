use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;
use crate::store::sessions;

/// The user a request's session cookie resolves to.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub username: String,
}

/// Extractor that requires a live session. Rejects with `Unauthorized`,
/// which redirects to the login page.
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = get_cookie_value(parts, &state.config.auth.cookie_name)
            .ok_or(AppError::Unauthorized)?
            .to_string();

        match sessions::find_username(&state.db, &token)? {
            Some(username) => Ok(CurrentUser { username }),
            None => Err(AppError::Unauthorized),
        }
    }
}

/// Optional user extractor — anonymous requests become `MaybeUser(None)`
/// instead of a rejection, leaving the per-route redirect to the handler.
pub struct MaybeUser(pub Option<CurrentUser>);

impl MaybeUser {
    pub fn username(&self) -> Option<&str> {
        self.0.as_ref().map(|u| u.username.as_str())
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = get_cookie_value(parts, &state.config.auth.cookie_name) else {
            return Ok(MaybeUser(None));
        };
        let token = token.to_string();

        // A broken database still fails loudly; only a missing or stale
        // session is anonymous.
        match sessions::find_username(&state.db, &token)? {
            Some(username) => Ok(MaybeUser(Some(CurrentUser { username }))),
            None => Ok(MaybeUser(None)),
        }
    }
}

/// The raw session token, if the request carries the session cookie at all.
/// Used by logout, which needs the token itself rather than the user.
pub struct SessionToken(pub Option<String>);

impl FromRequestParts<AppState> for SessionToken {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(SessionToken(
            get_cookie_value(parts, &state.config.auth.cookie_name).map(str::to_string),
        ))
    }
}

fn get_cookie_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .map(|s| s.trim())
        .find_map(|cookie| {
            let mut split = cookie.splitn(2, '=');
            let key = split.next()?.trim();
            let val = split.next()?.trim();
            if key == name {
                Some(val)
            } else {
                None
            }
        })
}
