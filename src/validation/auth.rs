use crate::error::{AppError, Result};

/// Smallest and largest accepted phone numbers (ten digits).
const PHONE_MIN: u64 = 1_000_000_000;
const PHONE_MAX: u64 = 9_999_999_999;

/// Validates a display name.
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("Name cannot be empty".to_string()));
    }

    if name.len() > 255 {
        return Err(AppError::Validation(
            "Name must be at most 255 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validates a username.
///
/// # Arguments
///
/// * `username` - The username to validate.
///
/// # Returns
///
/// A `Result<()>` indicating whether the username is valid.
pub fn validate_username(username: &str) -> Result<()> {
    if username.is_empty() || username.len() < 3 {
        return Err(AppError::Validation(
            "Username must be at least 3 characters long".to_string(),
        ));
    }

    if username.len() > 255 {
        return Err(AppError::Validation(
            "Username must be at most 255 characters".to_string(),
        ));
    }

    if !username.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return Err(AppError::Validation(
            "Username can only contain letters, numbers, underscores, and hyphens".to_string(),
        ));
    }

    Ok(())
}

/// Validates a password.
///
/// # Arguments
///
/// * `password` - The password to validate.
///
/// # Returns
///
/// A `Result<()>` indicating whether the password is valid.
pub fn validate_password(password: &str) -> Result<()> {
    if password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters long".to_string(),
        ));
    }

    if password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be at most 128 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validates a ten-digit phone number.
pub fn validate_phone(phone: u64) -> Result<()> {
    if !(PHONE_MIN..=PHONE_MAX).contains(&phone) {
        return Err(AppError::Validation(
            "Phone number must have exactly 10 digits".to_string(),
        ));
    }

    Ok(())
}

// garde adapters

fn into_garde(result: Result<()>) -> garde::Result {
    result.map_err(|e| match e {
        AppError::Validation(msg) => garde::Error::new(msg),
        other => garde::Error::new(other.to_string()),
    })
}

#[allow(clippy::ptr_arg)]
pub(crate) fn name_rule(value: &String, _ctx: &()) -> garde::Result {
    into_garde(validate_name(value))
}

#[allow(clippy::ptr_arg)]
pub(crate) fn username_rule(value: &String, _ctx: &()) -> garde::Result {
    into_garde(validate_username(value))
}

#[allow(clippy::ptr_arg)]
pub(crate) fn password_rule(value: &String, _ctx: &()) -> garde::Result {
    into_garde(validate_password(value))
}

pub(crate) fn phone_rule(value: &u64, _ctx: &()) -> garde::Result {
    into_garde(validate_phone(*value))
}
