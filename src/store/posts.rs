use rand::Rng;
use rusqlite::{params, Connection};

use crate::db::models::{Comment, Post};
use crate::error::{AppError, AppResult};
use crate::state::DbPool;
use crate::store::now_rfc3339;

/// Create a new post and return its permalink.
///
/// The permalink is derived from the title; on collision (two posts with the
/// same title) a random suffix is appended and the insert retried, so
/// uniqueness holds even under concurrent creation. The post and its tag
/// rows are written in one transaction.
pub fn add_post(
    pool: &DbPool,
    title: &str,
    body: &str,
    tags: &[String],
    author: &str,
) -> AppResult<String> {
    let mut conn = pool.get()?;
    let tx = conn.transaction()?;

    let base = permalink_from_title(title);
    let created_at = now_rfc3339();

    let permalink = loop {
        let candidate = if tx
            .query_row(
                "SELECT COUNT(*) > 0 FROM posts WHERE permalink = ?1",
                params![base],
                |row| row.get::<_, bool>(0),
            )
            .unwrap_or(false)
        {
            format!("{}-{:06x}", base, rand::thread_rng().gen_range(0..0xffffffu32))
        } else {
            base.clone()
        };

        let result = tx.execute(
            "INSERT INTO posts (permalink, title, body, author, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![candidate, title, body, author, created_at],
        );

        match result {
            Ok(_) => break candidate,
            // Lost a race for the candidate permalink; pick another suffix
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                continue;
            }
            Err(e) => return Err(e.into()),
        }
    };

    for (position, tag) in tags.iter().enumerate() {
        tx.execute(
            "INSERT INTO post_tags (permalink, position, tag) VALUES (?1, ?2, ?3)",
            params![permalink, position as i64, tag],
        )?;
    }

    tx.commit()?;
    Ok(permalink)
}

/// Look up a single post with its tags and comments loaded.
pub fn find_by_permalink(pool: &DbPool, permalink: &str) -> AppResult<Option<Post>> {
    let conn = pool.get()?;

    let mut stmt = conn.prepare(
        "SELECT permalink, title, body, author, created_at FROM posts WHERE permalink = ?1",
    )?;
    let mut rows = stmt.query_map(params![permalink], post_from_row)?;

    match rows.next() {
        Some(row) => {
            let mut post = row?;
            load_details(&conn, &mut post)?;
            Ok(Some(post))
        }
        None => Ok(None),
    }
}

/// The `limit` most recent posts, newest first. Ties on creation time are
/// broken by insertion order.
pub fn find_by_date_descending(pool: &DbPool, limit: u32) -> AppResult<Vec<Post>> {
    let conn = pool.get()?;

    let mut stmt = conn.prepare(
        "SELECT permalink, title, body, author, created_at FROM posts
         ORDER BY created_at DESC, rowid DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit], post_from_row)?;

    collect_with_details(&conn, rows)
}

/// All posts carrying the given tag, newest first.
pub fn find_by_tag_date_descending(pool: &DbPool, tag: &str) -> AppResult<Vec<Post>> {
    let conn = pool.get()?;

    let mut stmt = conn.prepare(
        "SELECT p.permalink, p.title, p.body, p.author, p.created_at
         FROM posts p JOIN post_tags t ON t.permalink = p.permalink
         WHERE t.tag = ?1
         ORDER BY p.created_at DESC, p.rowid DESC",
    )?;
    let rows = stmt.query_map(params![tag], post_from_row)?;

    collect_with_details(&conn, rows)
}

/// Append a comment to a post. The like counter starts at zero. An unknown
/// permalink is a not-found error, not a silent no-op.
pub fn add_comment(
    pool: &DbPool,
    name: &str,
    email: Option<&str>,
    body: &str,
    permalink: &str,
) -> AppResult<()> {
    let conn = pool.get()?;

    let id = uuid::Uuid::now_v7().to_string();
    let result = conn.execute(
        "INSERT INTO comments (id, permalink, name, email, body, likes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
        params![id, permalink, name, email, body, now_rfc3339()],
    );

    match result {
        Ok(_) => Ok(()),
        // Foreign key violation: the post does not exist
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(AppError::NotFound)
        }
        Err(e) => Err(e.into()),
    }
}

/// Atomically increment the like counter of one comment. Comments are
/// addressed by their stable id, scoped to the post, so a concurrent
/// comment insert cannot shift the target. Unknown id or permalink is a
/// not-found error.
pub fn like_comment(pool: &DbPool, permalink: &str, comment_id: &str) -> AppResult<()> {
    let conn = pool.get()?;

    let changed = conn.execute(
        "UPDATE comments SET likes = likes + 1 WHERE id = ?1 AND permalink = ?2",
        params![comment_id, permalink],
    )?;

    if changed == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

/// Derive a URL-safe permalink base from a title: whitespace becomes
/// underscores, remaining non-word characters are dropped, the result is
/// lowercased.
fn permalink_from_title(title: &str) -> String {
    let slug: String = title
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect::<String>()
        .to_ascii_lowercase();

    if slug.is_empty() {
        "post".to_string()
    } else {
        slug
    }
}

fn post_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        permalink: row.get(0)?,
        title: row.get(1)?,
        body: row.get(2)?,
        author: row.get(3)?,
        created_at: row.get(4)?,
        tags: Vec::new(),
        comments: Vec::new(),
    })
}

fn load_details(conn: &Connection, post: &mut Post) -> AppResult<()> {
    let mut stmt =
        conn.prepare("SELECT tag FROM post_tags WHERE permalink = ?1 ORDER BY position")?;
    post.tags = stmt
        .query_map(params![post.permalink], |row| row.get(0))?
        .collect::<Result<_, _>>()?;

    let mut stmt = conn.prepare(
        "SELECT id, name, email, body, likes FROM comments WHERE permalink = ?1 ORDER BY rowid",
    )?;
    post.comments = stmt
        .query_map(params![post.permalink], |row| {
            Ok(Comment {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                body: row.get(3)?,
                likes: row.get(4)?,
            })
        })?
        .collect::<Result<_, _>>()?;

    Ok(())
}

fn collect_with_details(
    conn: &Connection,
    rows: impl Iterator<Item = rusqlite::Result<Post>>,
) -> AppResult<Vec<Post>> {
    let mut posts = Vec::new();
    for row in rows {
        let mut post = row?;
        load_details(conn, &mut post)?;
        posts.push(post);
    }
    Ok(posts)
}
