// Validation utilities module
// Provides custom validation functions for domain-specific rules

use std::sync::OnceLock;

use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use regex::Regex;
use validator::ValidationError;

/// Parse an ISO 8601 / RFC 3339 timestamp, e.g. `2024-09-13T14:33:10.123Z`
pub fn parse_iso8601(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

/// Check that a string is a valid ISO 8601 timestamp
pub fn is_valid_iso8601(value: &str) -> bool {
    parse_iso8601(value).is_some()
}

/// Format a timestamp the way dates are stored: millisecond precision, `Z` suffix
pub fn format_iso8601(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Whole years elapsed between `birthdate` and `now`
pub fn age_in_years(birthdate: DateTime<Utc>, now: DateTime<Utc>) -> i32 {
    let mut age = now.year() - birthdate.year();
    if (now.month(), now.day()) < (birthdate.month(), birthdate.day()) {
        age -= 1;
    }
    age
}

/// Validates an ISO 8601 date field
pub fn validate_iso8601(value: &str) -> Result<(), ValidationError> {
    if is_valid_iso8601(value) {
        Ok(())
    } else {
        Err(ValidationError::new("invalidDateFormat"))
    }
}

/// Validates a patient birthdate: ISO 8601 and an age strictly between 1 and 120
pub fn validate_birthdate(value: &str) -> Result<(), ValidationError> {
    let birthdate = parse_iso8601(value).ok_or_else(|| ValidationError::new("invalidDateFormat"))?;
    let age = age_in_years(birthdate, Utc::now());
    if 1 < age && age < 120 {
        Ok(())
    } else {
        Err(ValidationError::new("invalidAge"))
    }
}

fn medscope_id_regex() -> &'static Regex {
    static MEDSCOPE_ID: OnceLock<Regex> = OnceLock::new();
    MEDSCOPE_ID.get_or_init(|| Regex::new(r"^MEDP\d{4}$").expect("static pattern"))
}

/// Validates a Medscope patient identifier: `MEDP` followed by 4 digits
pub fn validate_medscope_id(value: &str) -> Result<(), ValidationError> {
    if medscope_id_regex().is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::new("invalidMedscopeID"))
    }
}

fn password_rules() -> &'static [(Regex, &'static str)] {
    static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    RULES.get_or_init(|| {
        [
            ("[A-Z]", "password.missingUppercase"),
            ("[0-9]", "password.missingDigit"),
            (r#"[!@#$%^&*(),.?":{}|<>\-_+=/\\\[\];'`~]"#, "password.missingSpecialCharacter"),
        ]
        .into_iter()
        .map(|(pattern, code)| (Regex::new(pattern).expect("static pattern"), code))
        .collect()
    })
}

/// Validates password strength
/// Rules: at least 8 characters, one uppercase letter, one digit, one special character.
/// Returns the code of the first rule broken, e.g. `password.missingDigit`.
pub fn check_password_strength(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < 8 {
        return Err("password.invalidLength");
    }

    match password_rules().iter().find(|(pattern, _)| !pattern.is_match(password)) {
        Some((_, code)) => Err(*code),
        None => Ok(()),
    }
}

/// At most two digits after the decimal point in the value's shortest printed form
pub fn has_at_most_two_decimals(value: f32) -> bool {
    let printed = value.to_string();
    printed.split('.').nth(1).map_or(0, str::len) <= 2
}

/// Trim and lowercase a name before storage
pub fn normalize_name(value: &str) -> String {
    value.trim().to_lowercase()
}
