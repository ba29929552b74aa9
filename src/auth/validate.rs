use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{AppError, AppResult};

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
    static ref UPPER_RE: Regex = Regex::new(r"[A-Z]").unwrap();
    static ref LOWER_RE: Regex = Regex::new(r"[a-z]").unwrap();
    static ref DIGIT_RE: Regex = Regex::new(r"\d").unwrap();
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Registration requires a well-formed `.edu` address.
pub(crate) fn check_school_email(email: &str) -> AppResult<()> {
    if email.is_empty() {
        return Err(AppError::validation("Email is required"));
    }
    if !is_valid_email(email) {
        return Err(AppError::validation("Invalid email format"));
    }
    if !email.to_lowercase().ends_with(".edu") {
        return Err(AppError::validation("Must use a school email address (.edu)"));
    }
    Ok(())
}

pub(crate) fn check_password_strength(password: &str) -> AppResult<()> {
    let problem = if password.is_empty() {
        "Password is required"
    } else if password.chars().count() < 8 {
        "Password must be at least 8 characters long"
    } else if !UPPER_RE.is_match(password) {
        "Password must contain at least one uppercase letter"
    } else if !LOWER_RE.is_match(password) {
        "Password must contain at least one lowercase letter"
    } else if !DIGIT_RE.is_match(password) {
        "Password must contain at least one number"
    } else {
        return Ok(());
    };
    Err(AppError::validation(problem))
}
