//! Submitted forms and query strings.
//!
//! Everything arrives as strings so that an invalid submission can be sent
//! back as it was typed, together with per-field messages.

use super::errors::RouteError;
use crate::pagination::PaginationError;
use crate::store::models::{
    Artist, ArtistFields, Gender, Genre, Music, MusicFields, User, UserFields,
};
use crate::store::validation::{
    validate_artist_fields, validate_music_fields, validate_user_fields, ValidationError,
};
use crate::store::DATE_FORMAT;
use crate::user::Role;

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

pub type FieldErrors = BTreeMap<&'static str, Vec<String>>;

pub fn add_error(errors: &mut FieldErrors, field: &'static str, message: impl Into<String>) {
    errors.entry(field).or_default().push(message.into());
}

fn merge(errors: &mut FieldErrors, validation: Vec<ValidationError>) {
    for err in validation {
        add_error(errors, err.field(), err.to_string());
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_optional_date(
    errors: &mut FieldErrors,
    field: &'static str,
    value: &str,
) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(value, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            add_error(errors, field, "Enter a valid date (YYYY-MM-DD)");
            None
        }
    }
}

fn parse_gender(errors: &mut FieldErrors, value: &str) -> Option<Gender> {
    let parsed = Gender::from_code(value.trim());
    if parsed.is_none() {
        add_error(errors, "gender", "Select a valid choice");
    }
    parsed
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UserForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub dob: String,
    pub gender: String,
    pub address: String,
    pub role_type: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(skip_serializing)]
    pub confirm_password: String,
}

impl UserForm {
    pub fn from_user(user: &User) -> Self {
        UserForm {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone().unwrap_or_default(),
            email: user.email.clone(),
            phone: user.phone.clone().unwrap_or_default(),
            dob: format_date(user.dob),
            gender: user.gender.code().to_string(),
            address: user.address.clone().unwrap_or_default(),
            role_type: user.role_type.clone(),
            ..Default::default()
        }
    }

    fn collect_profile(&self, errors: &mut FieldErrors) -> Option<UserFields> {
        let email = self.email.trim().to_string();
        if !email.is_empty() && !EMAIL_REGEX.is_match(&email) {
            add_error(errors, "email", "Enter a valid email address");
        }
        let dob = parse_optional_date(errors, "dob", &self.dob);
        let gender = parse_gender(errors, &self.gender);
        let role = Role::from_str(self.role_type.trim());
        if role.is_none() {
            add_error(errors, "role_type", "Select a valid choice");
        }

        let (Some(gender), Some(role)) = (gender, role) else {
            return None;
        };
        let fields = UserFields {
            first_name: self.first_name.trim().to_string(),
            last_name: optional(&self.last_name),
            email,
            phone: optional(&self.phone),
            dob,
            gender,
            address: optional(&self.address),
            role,
        };
        merge(errors, validate_user_fields(&fields));
        Some(fields)
    }

    /// Profile fields only, as used by the update form.
    pub fn parse_profile(&self) -> Result<UserFields, FieldErrors> {
        let mut errors = FieldErrors::new();
        match self.collect_profile(&mut errors) {
            Some(fields) if errors.is_empty() => Ok(fields),
            _ => Err(errors),
        }
    }

    /// Profile fields plus the confirmed password, as used by the create and
    /// registration forms.
    pub fn parse_new(&self) -> Result<(UserFields, String), FieldErrors> {
        let mut errors = FieldErrors::new();
        let fields = self.collect_profile(&mut errors);
        if self.password.is_empty() {
            merge(
                &mut errors,
                vec![ValidationError::EmptyField { field: "password" }],
            );
        } else if self.password != self.confirm_password {
            merge(
                &mut errors,
                vec![ValidationError::Mismatch {
                    field: "confirm_password",
                }],
            );
        }
        match fields {
            Some(fields) if errors.is_empty() => Ok((fields, self.password.clone())),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ArtistForm {
    pub user_id: String,
    pub name: String,
    pub dob: String,
    pub gender: String,
    pub address: String,
    pub first_release_year: String,
    pub no_of_albums_released: String,
}

impl ArtistForm {
    pub fn from_artist(artist: &Artist) -> Self {
        ArtistForm {
            user_id: artist.user_id.map(|id| id.to_string()).unwrap_or_default(),
            name: artist.name.clone(),
            dob: format_date(artist.dob),
            gender: artist.gender.code().to_string(),
            address: artist.address.clone().unwrap_or_default(),
            first_release_year: artist.first_release_year.to_string(),
            no_of_albums_released: artist.no_of_albums_released.to_string(),
        }
    }

    pub fn parse(&self) -> Result<ArtistFields, FieldErrors> {
        let mut errors = FieldErrors::new();

        let user_id = match optional(&self.user_id) {
            None => None,
            Some(raw) => match raw.parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    add_error(&mut errors, "user_id", "Enter a whole number");
                    None
                }
            },
        };
        let dob = parse_optional_date(&mut errors, "dob", &self.dob);
        let gender = parse_gender(&mut errors, &self.gender);
        let first_release_year = match self.first_release_year.trim().parse::<i32>() {
            Ok(year) => Some(year),
            Err(_) => {
                add_error(&mut errors, "first_release_year", "Enter a valid year");
                None
            }
        };
        let no_of_albums_released = match self.no_of_albums_released.trim().parse::<u32>() {
            Ok(count) => Some(count),
            Err(_) => {
                add_error(
                    &mut errors,
                    "no_of_albums_released",
                    "Enter a non-negative whole number",
                );
                None
            }
        };

        let (Some(gender), Some(first_release_year), Some(no_of_albums_released)) =
            (gender, first_release_year, no_of_albums_released)
        else {
            return Err(errors);
        };
        let fields = ArtistFields {
            user_id,
            name: self.name.trim().to_string(),
            dob,
            gender,
            address: optional(&self.address),
            first_release_year,
            no_of_albums_released,
        };
        merge(&mut errors, validate_artist_fields(&fields));
        if errors.is_empty() {
            Ok(fields)
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MusicForm {
    pub title: String,
    pub album_name: String,
    pub genre: String,
}

impl MusicForm {
    pub fn from_song(song: &Music) -> Self {
        MusicForm {
            title: song.title.clone(),
            album_name: song.album_name.clone(),
            genre: song.genre.code().to_string(),
        }
    }

    pub fn parse(&self) -> Result<MusicFields, FieldErrors> {
        let mut errors = FieldErrors::new();
        let Some(genre) = Genre::from_code(self.genre.trim()) else {
            add_error(&mut errors, "genre", "Select a valid choice");
            return Err(errors);
        };
        let fields = MusicFields {
            title: self.title.trim().to_string(),
            album_name: self.album_name.trim().to_string(),
            genre,
        };
        merge(&mut errors, validate_music_fields(&fields));
        if errors.is_empty() {
            Ok(fields)
        } else {
            Err(errors)
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// `?page=&limit=` of the list views.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

fn parse_number(name: &str, value: Option<&String>, default: u64) -> Result<u64, RouteError> {
    match value.map(|v| v.trim()) {
        None | Some("") => Ok(default),
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|_| RouteError::BadRequest(format!("'{}' must be an integer", name))),
    }
}

impl ListParams {
    /// Returns `(page, limit)`. Zero values are rejected here, before anything
    /// is counted or fetched.
    pub fn resolve(&self, default_limit: u64) -> Result<(u64, u64), RouteError> {
        let page = parse_number("page", self.page.as_ref(), 1)?;
        let limit = parse_number("limit", self.limit.as_ref(), default_limit)?;
        if limit == 0 {
            return Err(PaginationError::ZeroLimit.into());
        }
        if page == 0 {
            return Err(PaginationError::ZeroPage.into());
        }
        Ok((page, limit))
    }
}
