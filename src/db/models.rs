use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub password: String,
    pub email: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub username: String,
    pub token: String,
    pub created_at: String,
    pub expires_at: String,
}

/// A blog post with its tags and comments loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub permalink: String,
    pub title: String,
    /// Display-ready HTML: escaped on input, newlines replaced with
    /// paragraph breaks.
    pub body: String,
    pub author: String,
    pub created_at: String,
    pub tags: Vec<String>,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub body: String,
    pub likes: i64,
}
