//! Form field rules for registration, login and profile edits.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::api::models::{NewUser, User};
use crate::storage::Upload;

pub const MAX_PICTURE_BYTES: usize = 5 * 1024 * 1024;

fn email_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Regex should compile"))
}

fn username_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]{3,20}$").expect("Regex should compile"))
}

pub fn validate_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// 3-20 letters, digits or underscores.
pub fn validate_username(username: &str) -> bool {
    username_regex().is_match(username)
}

/// At least 8 characters with a lowercase letter, an uppercase letter and
/// a digit.
pub fn validate_password(password: &str) -> bool {
    password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

pub fn validate_required(value: &str) -> bool {
    !value.trim().is_empty()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
}

pub fn password_strength(password: &str) -> PasswordStrength {
    let len = password.chars().count();
    let score = [
        len >= 8,
        len >= 12,
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_ascii_alphanumeric()),
    ]
    .into_iter()
    .filter(|hit| *hit)
    .count();

    match score {
        0..=2 => PasswordStrength::Weak,
        3..=4 => PasswordStrength::Medium,
        _ => PasswordStrength::Strong,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    FirstName,
    LastName,
    Username,
    Email,
    College,
    Semester,
    Batch,
    Gender,
    Password,
    ProfilePicture,
}

/// Per-field messages; empty means the form is valid.
pub type FieldErrors = BTreeMap<Field, &'static str>;

pub fn validate_login(username: &str, password: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if !validate_required(username) {
        errors.insert(Field::Username, "Username is required");
    }
    if !validate_required(password) {
        errors.insert(Field::Password, "Password is required");
    }
    errors
}

pub fn validate_registration(user: &NewUser) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let required = [
        (Field::FirstName, &user.first_name, "First name is required"),
        (Field::LastName, &user.last_name, "Last name is required"),
        (Field::College, &user.college, "College/University is required"),
        (Field::Semester, &user.semester, "Semester is required"),
        (Field::Batch, &user.batch, "Batch is required"),
        (Field::Gender, &user.gender, "Please select your gender"),
    ];
    for (field, value, message) in required {
        if !validate_required(value) {
            errors.insert(field, message);
        }
    }
    if !validate_username(&user.username) {
        errors.insert(
            Field::Username,
            "Username must be 3-20 characters (letters, numbers, underscores only)",
        );
    }
    if !validate_email(&user.email) {
        errors.insert(Field::Email, "Please enter a valid email address");
    }
    if !validate_password(&user.password) {
        errors.insert(
            Field::Password,
            "Password must be at least 8 characters with uppercase, lowercase, and number",
        );
    }
    errors
}

/// Fields a profile edit may change.
pub fn validate_profile(user: &User) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if !validate_required(&user.first_name) {
        errors.insert(Field::FirstName, "First name is required");
    }
    if !validate_required(&user.last_name) {
        errors.insert(Field::LastName, "Last name is required");
    }
    if !validate_email(&user.email) {
        errors.insert(Field::Email, "Please enter a valid email address");
    }
    errors
}

pub fn validate_profile_picture(upload: &Upload) -> Result<(), &'static str> {
    if upload.bytes.len() > MAX_PICTURE_BYTES {
        return Err("Image size must be less than 5MB");
    }
    if !upload.content_type.starts_with("image/") {
        return Err("Please upload a valid image file");
    }
    Ok(())
}
