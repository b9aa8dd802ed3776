//! Request body validation for the account surface.
//!
//! Limits mirror what the stores and hashing layer can sensibly accept:
//! names and emails up to 64 characters, passwords 6 to 128.

use crate::error::AuthError;

const NAME_MAX: usize = 64;
const EMAIL_MAX: usize = 64;
const PASSWORD_MIN: usize = 6;
const PASSWORD_MAX: usize = 128;

pub(crate) fn validate_name(name: &str) -> Result<(), AuthError> {
    if name.trim().is_empty() {
        return Err(AuthError::invalid_request("name must not be empty"));
    }
    if name.chars().count() > NAME_MAX {
        return Err(AuthError::invalid_request(format!(
            "name must be at most {NAME_MAX} characters"
        )));
    }
    Ok(())
}

pub(crate) fn validate_email(email: &str) -> Result<(), AuthError> {
    if email.is_empty() {
        return Err(AuthError::invalid_request("email must not be empty"));
    }
    if email.chars().count() > EMAIL_MAX {
        return Err(AuthError::invalid_request(format!(
            "email must be at most {EMAIL_MAX} characters"
        )));
    }
    if !is_plausible_email(email) {
        return Err(AuthError::invalid_request("email is not a valid address"));
    }
    Ok(())
}

pub(crate) fn validate_password(password: &str) -> Result<(), AuthError> {
    let len = password.chars().count();
    if len < PASSWORD_MIN {
        return Err(AuthError::invalid_request(format!(
            "password must be at least {PASSWORD_MIN} characters"
        )));
    }
    if len > PASSWORD_MAX {
        return Err(AuthError::invalid_request(format!(
            "password must be at most {PASSWORD_MAX} characters"
        )));
    }
    Ok(())
}

/// Shape check only; deliverability is the mail server's problem.
fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}
