//! Signup form validation. The checks run in a fixed order and stop at the
//! first failure, so the user sees exactly one message per submission; the
//! remaining fields keep empty messages for the template.

/// Field-level error messages for the signup form. Empty string means no
/// error for that field.
#[derive(Debug, Clone, Default)]
pub struct SignupErrors {
    pub username_error: String,
    pub password_error: String,
    pub verify_error: String,
    pub email_error: String,
}

/// Validate a signup submission. Returns `(ok, errors)`; when `ok` is false
/// exactly one field of `errors` carries a message.
pub fn validate_signup(
    username: &str,
    password: &str,
    verify: &str,
    email: &str,
) -> (bool, SignupErrors) {
    let mut errors = SignupErrors::default();

    if !valid_username(username) {
        errors.username_error = "invalid username. try just letters and numbers".to_string();
        return (false, errors);
    }

    if !valid_password(password) {
        errors.password_error = "invalid password.".to_string();
        return (false, errors);
    }

    if password != verify {
        errors.verify_error = "password must match".to_string();
        return (false, errors);
    }

    if !email.is_empty() && !valid_email(email) {
        errors.email_error = "Invalid Email Address".to_string();
        return (false, errors);
    }

    (true, errors)
}

/// `^[a-zA-Z0-9_-]{3,20}$`
fn valid_username(username: &str) -> bool {
    (3..=20).contains(&username.chars().count())
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// `^.{3,20}$`
fn valid_password(password: &str) -> bool {
    (3..=20).contains(&password.chars().count()) && !password.contains('\n')
}

/// `^[\S]+@[\S]+\.[\S]+$` — no whitespace, something before an `@`, and a
/// dot with non-empty segments on both sides somewhere after it.
fn valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some(at) = email.find('@') else {
        return false;
    };
    if at == 0 {
        return false;
    }
    let domain = &email[at + 1..];
    match domain.rfind('.') {
        Some(dot) => dot > 0 && dot < domain.len() - 1,
        None => false,
    }
}
