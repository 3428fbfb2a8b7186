//! Field rules for account data.

use regex::Regex;
use std::sync::LazyLock;

pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MIN_USERNAME_LENGTH: usize = 3;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$")
        .expect("Invalid email regex")
});

static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z]+$").expect("Invalid username regex"));

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "The password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), String> {
    if !EMAIL_REGEX.is_match(email) {
        return Err("The email is not valid".to_string());
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), String> {
    if username.chars().count() < MIN_USERNAME_LENGTH {
        return Err(format!(
            "The username must be at least {} characters long",
            MIN_USERNAME_LENGTH
        ));
    }
    if !USERNAME_REGEX.is_match(username) {
        return Err("The username may only contain letters".to_string());
    }
    Ok(())
}

pub fn validate_nick(nick: &str) -> Result<(), String> {
    if nick.trim().is_empty() {
        return Err("The nick is required".to_string());
    }
    Ok(())
}
