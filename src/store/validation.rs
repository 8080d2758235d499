//! Field checks shared by the HTML-less forms and the CSV importer.

use super::models::{
    ArtistFields, MusicFields, UserFields, MAX_NAME_PART_LEN, MAX_PHONE_LEN, MAX_TITLE_LEN,
};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyField {
        field: &'static str,
    },
    TooLong {
        field: &'static str,
        max: usize,
    },
    InvalidValue {
        field: &'static str,
        value: String,
    },
    OutOfRange {
        field: &'static str,
        value: i64,
    },
    Mismatch {
        field: &'static str,
    },
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::EmptyField { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::InvalidValue { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::Mismatch { field } => field,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField { field } => {
                write!(f, "Field '{}' is required", field)
            }
            ValidationError::TooLong { field, max } => {
                write!(f, "Field '{}' must be at most {} characters", field, max)
            }
            ValidationError::InvalidValue { field, value } => {
                write!(f, "Field '{}' has an invalid value '{}'", field, value)
            }
            ValidationError::OutOfRange { field, value } => {
                write!(f, "Field '{}' is out of range: {}", field, value)
            }
            ValidationError::Mismatch { field } => {
                write!(f, "Field '{}' does not match", field)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

fn check_required(
    errors: &mut Vec<ValidationError>,
    field: &'static str,
    value: &str,
    max: usize,
) {
    if value.trim().is_empty() {
        errors.push(ValidationError::EmptyField { field });
    } else {
        check_len(errors, field, value, max);
    }
}

fn check_len(errors: &mut Vec<ValidationError>, field: &'static str, value: &str, max: usize) {
    if value.chars().count() > max {
        errors.push(ValidationError::TooLong { field, max });
    }
}

pub fn validate_user_fields(fields: &UserFields) -> Vec<ValidationError> {
    let mut errors = vec![];
    check_required(&mut errors, "first_name", &fields.first_name, MAX_NAME_PART_LEN);
    if let Some(last_name) = &fields.last_name {
        check_len(&mut errors, "last_name", last_name, MAX_NAME_PART_LEN);
    }
    if fields.email.trim().is_empty() {
        errors.push(ValidationError::EmptyField { field: "email" });
    }
    if let Some(phone) = &fields.phone {
        check_len(&mut errors, "phone", phone, MAX_PHONE_LEN);
    }
    errors
}

pub fn validate_artist_fields(fields: &ArtistFields) -> Vec<ValidationError> {
    let mut errors = vec![];
    check_required(&mut errors, "name", &fields.name, MAX_TITLE_LEN);
    if !(0..=9999).contains(&fields.first_release_year) {
        errors.push(ValidationError::OutOfRange {
            field: "first_release_year",
            value: fields.first_release_year as i64,
        });
    }
    errors
}

pub fn validate_music_fields(fields: &MusicFields) -> Vec<ValidationError> {
    let mut errors = vec![];
    check_required(&mut errors, "title", &fields.title, MAX_TITLE_LEN);
    check_required(&mut errors, "album_name", &fields.album_name, MAX_TITLE_LEN);
    errors
}
