use askama::Template;
use axum::extract::State;
use axum::http::header;
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Form, Router};
use serde::Deserialize;

use crate::error::AppResult;
use crate::extractors::{MaybeUser, SessionToken};
use crate::routes::Html;
use crate::state::AppState;
use crate::store::{sessions, users};
use crate::validate::{validate_signup, SignupErrors};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", get(signup_form).post(signup))
        .route("/login", get(login_form).post(login))
        .route("/welcome", get(welcome))
        .route("/logout", get(logout))
        .route("/internal_error", get(internal_error))
}

// -- Templates --

#[derive(Template)]
#[template(path = "pages/signup.html")]
pub struct SignupTemplate {
    pub username: String,
    pub email: String,
    pub username_error: String,
    pub password_error: String,
    pub verify_error: String,
    pub email_error: String,
}

impl SignupTemplate {
    fn new(username: String, email: String, errors: SignupErrors) -> Self {
        Self {
            username,
            email,
            username_error: errors.username_error,
            password_error: errors.password_error,
            verify_error: errors.verify_error,
            email_error: errors.email_error,
        }
    }

    fn blank() -> Self {
        Self::new(String::new(), String::new(), SignupErrors::default())
    }
}

#[derive(Template)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate {
    pub username: String,
    pub login_error: String,
}

#[derive(Template)]
#[template(path = "pages/welcome.html")]
pub struct WelcomeTemplate {
    pub username: String,
}

#[derive(Template)]
#[template(path = "pages/error.html")]
pub struct ErrorTemplate {
    pub error: String,
}

// -- Form types --

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct SignupForm {
    pub username: String,
    pub password: String,
    pub verify: String,
    pub email: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

// -- Cookie helpers --

fn session_cookie(name: &str, token: &str, max_age_hours: u64) -> String {
    let max_age_secs = max_age_hours * 3600;
    format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        name, token, max_age_secs
    )
}

fn clear_session_cookie(name: &str) -> String {
    format!("{}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0", name)
}

// -- Handlers --

/// GET /signup — blank signup form
async fn signup_form() -> Html<SignupTemplate> {
    Html(SignupTemplate::blank())
}

/// POST /signup — create the account, start a session, go to /welcome
async fn signup(
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> AppResult<Response> {
    let (ok, errors) = validate_signup(&form.username, &form.password, &form.verify, &form.email);
    if !ok {
        tracing::info!("signup for {:?} did not validate", form.username);
        return Ok(Html(SignupTemplate::new(form.username, form.email, errors)).into_response());
    }

    if !users::add_user(&state.db, &form.username, &form.password, &form.email)? {
        // Duplicate username: recoverable, back to the form
        let errors = SignupErrors {
            username_error: "Username already in use, Please choose another".to_string(),
            ..SignupErrors::default()
        };
        return Ok(Html(SignupTemplate::new(form.username, form.email, errors)).into_response());
    }

    tracing::info!("signup: created user {}", form.username);
    let token = sessions::start_session(&state.db, &form.username, state.config.auth.session_hours)?;

    Ok((
        AppendHeaders([(
            header::SET_COOKIE,
            session_cookie(
                &state.config.auth.cookie_name,
                &token,
                state.config.auth.session_hours,
            ),
        )]),
        Redirect::to("/welcome"),
    )
        .into_response())
}

/// GET /login — blank login form
async fn login_form() -> Html<LoginTemplate> {
    Html(LoginTemplate {
        username: String::new(),
        login_error: String::new(),
    })
}

/// POST /login — authenticate and issue the session cookie. An invalid
/// login re-renders the form; no cookie is set.
async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> AppResult<Response> {
    let Some(user) = users::validate_login(&state.db, &form.username, &form.password)? else {
        return Ok(Html(LoginTemplate {
            username: form.username,
            login_error: "Invalid Login".to_string(),
        })
        .into_response());
    };

    let token = sessions::start_session(&state.db, &user.username, state.config.auth.session_hours)?;
    tracing::debug!("login: session started for {}", user.username);

    Ok((
        AppendHeaders([(
            header::SET_COOKIE,
            session_cookie(
                &state.config.auth.cookie_name,
                &token,
                state.config.auth.session_hours,
            ),
        )]),
        Redirect::to("/welcome"),
    )
        .into_response())
}

/// GET /welcome — post-signup/login landing page
async fn welcome(user: MaybeUser) -> AppResult<Response> {
    match user.username() {
        Some(username) => Ok(Html(WelcomeTemplate {
            username: username.to_string(),
        })
        .into_response()),
        None => {
            tracing::debug!("welcome: no identifiable user, redirecting to signup");
            Ok(Redirect::to("/signup").into_response())
        }
    }
}

/// GET /logout — end the session (idempotent) and clear the cookie
async fn logout(State(state): State<AppState>, token: SessionToken) -> AppResult<Response> {
    let Some(token) = token.0 else {
        // No session to end
        return Ok(Redirect::to("/login").into_response());
    };

    sessions::end_session(&state.db, &token)?;

    Ok((
        AppendHeaders([(
            header::SET_COOKIE,
            clear_session_cookie(&state.config.auth.cookie_name),
        )]),
        Redirect::to("/login"),
    )
        .into_response())
}

/// GET /internal_error — static error page
async fn internal_error() -> Html<ErrorTemplate> {
    Html(ErrorTemplate {
        error: "System has encountered an error.".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_carries_token_and_max_age() {
        let cookie = session_cookie("session", "abc123", 2);
        assert_eq!(
            cookie,
            "session=abc123; HttpOnly; SameSite=Strict; Path=/; Max-Age=7200"
        );
    }

    #[test]
    fn clear_cookie_has_zero_max_age() {
        let cookie = clear_session_cookie("session");
        assert!(cookie.starts_with("session=;"));
        assert!(cookie.ends_with("Max-Age=0"));
    }
}
