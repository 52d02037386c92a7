//! Field validators shared by every handler. Each controller used to carry
//! its own copies of these rules; they live here once so register, login and
//! onboarding cannot drift apart.

use chrono::{Datelike, NaiveDate, Utc};

use crate::error::ApiError;

/// Exactly 10 digits.
pub fn validate_phone(phone: &str) -> Result<(), ApiError> {
    let p = phone.trim();
    if p.len() != 10 || !p.chars().all(|c| c.is_ascii_digit()) {
        return Err(ApiError::validation(
            "Phone number must be exactly 10 digits",
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ApiError> {
    let e = email.trim();
    let Some((local, domain)) = e.split_once('@') else {
        return Err(ApiError::validation("Invalid email format"));
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') || e.contains(' ') {
        return Err(ApiError::validation("Invalid email format"));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), ApiError> {
    let n = name.trim();
    if n.len() < 3 {
        return Err(ApiError::validation(
            "Full name must be at least 3 characters long",
        ));
    }
    if n.len() > 50 {
        return Err(ApiError::validation(
            "Full name must not exceed 50 characters",
        ));
    }
    Ok(())
}

/// 8-20 chars with at least one uppercase, one lowercase, one digit and one
/// special character.
pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < 8 {
        return Err(ApiError::validation(
            "Password must be at least 8 characters long",
        ));
    }
    if password.len() > 20 {
        return Err(ApiError::validation(
            "Password must not exceed 20 characters",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ApiError::validation(
            "Password must contain at least one uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(ApiError::validation(
            "Password must contain at least one lowercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ApiError::validation(
            "Password must contain at least one number",
        ));
    }
    if !password.chars().any(|c| "@$!%*?&#".contains(c)) {
        return Err(ApiError::validation(
            "Password must contain at least one special character",
        ));
    }
    Ok(())
}

/// Not in the future, not unrealistically old.
pub fn validate_date_of_birth(dob: NaiveDate) -> Result<(), ApiError> {
    let today = Utc::now().date_naive();
    let age = today.year() - dob.year();
    if !(0..=150).contains(&age) || dob > today {
        return Err(ApiError::validation("Date of birth must be a valid age"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_must_be_ten_digits() {
        assert!(validate_phone("9999999999").is_ok());
        assert!(validate_phone(" 9999999999 ").is_ok());
        assert!(validate_phone("999999999").is_err());
        assert!(validate_phone("99999999990").is_err());
        assert!(validate_phone("99999abc99").is_err());
    }

    #[test]
    fn email_shape() {
        assert!(validate_email("a@b.com").is_ok());
        assert!(validate_email("first.last@mail.example.org").is_ok());
        assert!(validate_email("nope").is_err());
        assert!(validate_email("@b.com").is_err());
        assert!(validate_email("a@").is_err());
        assert!(validate_email("a@nodot").is_err());
    }

    #[test]
    fn name_length_bounds() {
        assert!(validate_name("Rit").is_ok());
        assert!(validate_name("Ab").is_err());
        assert!(validate_name(&"x".repeat(51)).is_err());
    }

    #[test]
    fn password_character_classes() {
        assert!(validate_password("Aa1@aaaa").is_ok());
        assert!(validate_password("aa1@aaaa").is_err()); // no uppercase
        assert!(validate_password("AA1@AAAA").is_err()); // no lowercase
        assert!(validate_password("Aab@aaaa").is_err()); // no digit
        assert!(validate_password("Aa1baaaa").is_err()); // no special
        assert!(validate_password("Aa1@a").is_err()); // too short
        assert!(validate_password(&format!("Aa1@{}", "a".repeat(20))).is_err()); // too long
    }

    #[test]
    fn dob_bounds() {
        let today = Utc::now().date_naive();
        assert!(validate_date_of_birth(today).is_ok());
        assert!(validate_date_of_birth(today + chrono::Duration::days(1)).is_err());
        assert!(validate_date_of_birth(NaiveDate::from_ymd_opt(1700, 1, 1).unwrap()).is_err());
    }
}
