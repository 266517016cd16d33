use axum::response::{IntoResponse, Redirect, Response};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Nothing propagates to the transport layer uncaught: every error kind
/// becomes a redirect to one of the static pages. Not-found and
/// authentication failures have dedicated destinations; everything else is
/// logged and sent to the internal-error page.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::NotFound => Redirect::to("/post_not_found").into_response(),
            AppError::Unauthorized => Redirect::to("/login").into_response(),
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                Redirect::to("/internal_error").into_response()
            }
            AppError::Pool(e) => {
                tracing::error!("Pool error: {}", e);
                Redirect::to("/internal_error").into_response()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                Redirect::to("/internal_error").into_response()
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
