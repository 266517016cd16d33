use askama::Template;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;

use crate::db::models::Post;
use crate::error::AppResult;
use crate::extractors::{CurrentUser, MaybeUser};
use crate::routes::Html;
use crate::state::AppState;
use crate::store::posts;
use crate::tags::extract_tags;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/post/{permalink}", get(show_post))
        .route("/newpost", get(new_post_form).post(create_post))
        .route("/newcomment", post(new_comment))
        .route("/tag/{thetag}", get(posts_by_tag))
        .route("/like", post(like))
        .route("/post_not_found", get(post_not_found))
}

// -- Templates --

#[derive(Template)]
#[template(path = "pages/blog.html")]
pub struct BlogTemplate {
    pub username: Option<String>,
    pub posts: Vec<Post>,
}

#[derive(Template)]
#[template(path = "pages/entry.html")]
pub struct EntryTemplate {
    pub username: Option<String>,
    pub post: Post,
    pub comment_name: String,
    pub comment_email: String,
    pub comment_body: String,
    pub errors: String,
}

impl EntryTemplate {
    fn new(username: Option<String>, post: Post) -> Self {
        Self {
            username,
            post,
            comment_name: String::new(),
            comment_email: String::new(),
            comment_body: String::new(),
            errors: String::new(),
        }
    }
}

#[derive(Template)]
#[template(path = "pages/newpost.html")]
pub struct NewPostTemplate {
    pub username: String,
    pub subject: String,
    pub body: String,
    pub tags: String,
    pub errors: String,
}

#[derive(Template)]
#[template(path = "pages/post_not_found.html")]
pub struct PostNotFoundTemplate;

// -- Form types --

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct NewPostForm {
    pub subject: String,
    pub body: String,
    pub tags: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct NewCommentForm {
    #[serde(rename = "commentName")]
    pub name: String,
    #[serde(rename = "commentEmail")]
    pub email: String,
    #[serde(rename = "commentBody")]
    pub body: String,
    pub permalink: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LikeForm {
    pub permalink: String,
    pub comment_id: String,
}

// -- Handlers --

/// GET / — the blog home page, ten most recent posts
async fn index(State(state): State<AppState>, user: MaybeUser) -> AppResult<Response> {
    let posts = posts::find_by_date_descending(&state.db, 10)?;
    Ok(Html(BlogTemplate {
        username: user.username().map(str::to_string),
        posts,
    })
    .into_response())
}

/// GET /post/{permalink} — post detail page with the comment form
async fn show_post(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(permalink): Path<String>,
) -> AppResult<Response> {
    match posts::find_by_permalink(&state.db, &permalink)? {
        Some(post) => Ok(Html(EntryTemplate::new(
            user.username().map(str::to_string),
            post,
        ))
        .into_response()),
        None => Ok(Redirect::to("/post_not_found").into_response()),
    }
}

/// GET /newpost — the authoring form; only logged in users may post.
/// The `CurrentUser` rejection sends anonymous visitors to /login.
async fn new_post_form(user: CurrentUser) -> AppResult<Response> {
    Ok(Html(NewPostTemplate {
        username: user.username,
        subject: String::new(),
        body: String::new(),
        tags: String::new(),
        errors: String::new(),
    })
    .into_response())
}

/// POST /newpost — create the post and redirect to its permalink
async fn create_post(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<NewPostForm>,
) -> AppResult<Response> {
    if form.subject.is_empty() || form.body.is_empty() {
        return Ok(Html(NewPostTemplate {
            username: user.username,
            subject: form.subject,
            body: form.body,
            tags: form.tags,
            errors: "post must contain a title and blog entry.".to_string(),
        })
        .into_response());
    }

    let tags = extract_tags(&form.tags);
    let body = format_post_body(&form.body);
    let permalink = posts::add_post(&state.db, &form.subject, &body, &tags, &user.username)?;

    Ok(Redirect::to(&format!("/post/{}", permalink)).into_response())
}

/// POST /newcomment — append a comment to a post
async fn new_comment(
    State(state): State<AppState>,
    user: MaybeUser,
    Form(form): Form<NewCommentForm>,
) -> AppResult<Response> {
    let Some(post) = posts::find_by_permalink(&state.db, &form.permalink)? else {
        return Ok(Redirect::to("/post_not_found").into_response());
    };

    if form.name.is_empty() || form.body.is_empty() {
        // Bounce back to the entry page with the comment echoed for
        // correction
        let mut template = EntryTemplate::new(user.username().map(str::to_string), post);
        template.comment_name = form.name;
        template.comment_email = form.email;
        template.comment_body = form.body;
        template.errors = "Post must contain your name and an actual comment".to_string();
        return Ok(Html(template).into_response());
    }

    let email = if form.email.is_empty() {
        None
    } else {
        Some(form.email.as_str())
    };
    posts::add_comment(&state.db, &form.name, email, &form.body, &form.permalink)?;

    Ok(Redirect::to(&format!("/post/{}", form.permalink)).into_response())
}

/// GET /tag/{thetag} — posts filed under one tag
async fn posts_by_tag(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(thetag): Path<String>,
) -> AppResult<Response> {
    let posts = posts::find_by_tag_date_descending(&state.db, &thetag)?;
    Ok(Html(BlogTemplate {
        username: user.username().map(str::to_string),
        posts,
    })
    .into_response())
}

/// POST /like — increment a comment's like counter
async fn like(
    State(state): State<AppState>,
    user: MaybeUser,
    Form(form): Form<LikeForm>,
) -> AppResult<Response> {
    if user.0.is_none() {
        return Ok(Redirect::to("/").into_response());
    }

    if posts::find_by_permalink(&state.db, &form.permalink)?.is_none() {
        return Ok(Redirect::to("/post_not_found").into_response());
    }

    posts::like_comment(&state.db, &form.permalink, &form.comment_id)?;

    Ok(Redirect::to(&format!("/post/{}", form.permalink)).into_response())
}

/// GET /post_not_found — tells the user that the URL is dead
async fn post_not_found() -> Html<PostNotFoundTemplate> {
    Html(PostNotFoundTemplate)
}

/// Turn raw body text into display-ready HTML: escape it, then substitute
/// paragraph breaks for the newlines. Stored as-is; the templates render it
/// unescaped.
fn format_post_body(raw: &str) -> String {
    html_escape::encode_text(raw)
        .replace("\r\n", "<p>")
        .replace('\n', "<p>")
}
