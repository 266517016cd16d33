use rusqlite::params;

use crate::db::models::User;
use crate::error::AppResult;
use crate::state::DbPool;
use crate::store::now_rfc3339;

/// Insert a new user. Returns false when the username is already taken.
///
/// Passwords are stored exactly as submitted; see DESIGN.md for why this
/// known weakness is preserved.
pub fn add_user(pool: &DbPool, username: &str, password: &str, email: &str) -> AppResult<bool> {
    let conn = pool.get()?;

    let result = conn.execute(
        "INSERT INTO users (username, password, email, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![username, password, email, now_rfc3339()],
    );

    match result {
        Ok(_) => Ok(true),
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

/// Look up a user by username and check the password by exact equality.
/// Unknown username and wrong password both come back as None, so the
/// caller cannot tell the two apart.
pub fn validate_login(pool: &DbPool, username: &str, password: &str) -> AppResult<Option<User>> {
    let conn = pool.get()?;

    let mut stmt = conn.prepare(
        "SELECT username, password, email, created_at FROM users WHERE username = ?1",
    )?;
    let mut rows = stmt.query_map(params![username], |row| {
        Ok(User {
            username: row.get(0)?,
            password: row.get(1)?,
            email: row.get(2)?,
            created_at: row.get(3)?,
        })
    })?;

    match rows.next() {
        Some(row) => {
            let user = row?;
            if user.password == password {
                Ok(Some(user))
            } else {
                Ok(None)
            }
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::test_pool;

    #[test]
    fn add_user_then_login_succeeds() {
        let pool = test_pool();
        assert!(add_user(&pool, "alice", "secret", "alice@example.com").unwrap());

        let user = validate_login(&pool, "alice", "secret").unwrap();
        let user = user.expect("login should succeed");
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "alice@example.com");
    }

    #[test]
    fn duplicate_username_returns_false() {
        let pool = test_pool();
        assert!(add_user(&pool, "alice", "secret", "").unwrap());
        assert!(!add_user(&pool, "alice", "other", "").unwrap());
    }

    #[test]
    fn wrong_password_is_absent() {
        let pool = test_pool();
        assert!(add_user(&pool, "alice", "secret", "").unwrap());
        assert!(validate_login(&pool, "alice", "wrong").unwrap().is_none());
    }

    #[test]
    fn unknown_user_is_absent() {
        let pool = test_pool();
        assert!(validate_login(&pool, "nobody", "secret").unwrap().is_none());
    }

    #[test]
    fn email_may_be_empty() {
        let pool = test_pool();
        assert!(add_user(&pool, "bob", "secret", "").unwrap());
        let user = validate_login(&pool, "bob", "secret").unwrap().unwrap();
        assert_eq!(user.email, "");
    }
}
