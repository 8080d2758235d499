//! Records stored in the database and the field sets used to write them.

use crate::user::Role;
use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

pub const MAX_NAME_PART_LEN: usize = 50;
pub const MAX_PHONE_LEN: usize = 15;
pub const MAX_TITLE_LEN: usize = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "m")]
    Male,
    #[serde(rename = "f")]
    Female,
    #[serde(rename = "o")]
    Other,
}

impl Gender {
    pub fn code(self) -> &'static str {
        match self {
            Gender::Male => "m",
            Gender::Female => "f",
            Gender::Other => "o",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "m" => Some(Gender::Male),
            "f" => Some(Gender::Female),
            "o" => Some(Gender::Other),
            _ => None,
        }
    }

    /// Accepts either the one-letter code or the full name, ignoring case.
    pub fn parse_lenient(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m" | "male" => Some(Gender::Male),
            "f" | "female" => Some(Gender::Female),
            "o" | "other" => Some(Gender::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Genre {
    Rnb,
    Country,
    Classic,
    Rock,
    Jazz,
}

impl Genre {
    pub fn code(self) -> &'static str {
        match self {
            Genre::Rnb => "rnb",
            Genre::Country => "country",
            Genre::Classic => "classic",
            Genre::Rock => "rock",
            Genre::Jazz => "jazz",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "rnb" => Some(Genre::Rnb),
            "country" => Some(Genre::Country),
            "classic" => Some(Genre::Classic),
            "rock" => Some(Genre::Rock),
            "jazz" => Some(Genre::Jazz),
            _ => None,
        }
    }
}

macro_rules! code_column {
    ($ty:ty, $what:expr) => {
        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.code()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let s = value.as_str()?;
                <$ty>::from_code(s)
                    .ok_or_else(|| FromSqlError::Other(format!("Unknown {} {}", $what, s).into()))
            }
        }
    };
}

code_column!(Gender, "gender");
code_column!(Genre, "genre");

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Gender,
    pub address: Option<String>,
    /// Kept as stored; see [`User::role`].
    pub role_type: String,
    #[serde(skip)]
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl User {
    /// `None` when the stored role is not one we know, which denies everything.
    pub fn role(&self) -> Option<Role> {
        Role::from_str(&self.role_type)
    }
}

/// Editable profile fields of a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFields {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Gender,
    pub address: Option<String>,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub fields: UserFields,
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl NewUser {
    /// Creation by an administrator: staff flags follow the role.
    pub fn by_admin(fields: UserFields, password_hash: String) -> Self {
        let flags = fields.role.grants_staff_flags();
        NewUser {
            fields,
            password_hash,
            is_staff: flags,
            is_superuser: flags,
        }
    }

    /// Self-registration never grants staff flags, whatever the role.
    pub fn self_registered(fields: UserFields, password_hash: String) -> Self {
        NewUser {
            fields,
            password_hash,
            is_staff: false,
            is_superuser: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Artist {
    pub id: i64,
    pub user_id: Option<i64>,
    pub name: String,
    pub dob: Option<NaiveDate>,
    pub gender: Gender,
    pub address: Option<String>,
    pub first_release_year: i32,
    pub no_of_albums_released: u32,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistFields {
    pub user_id: Option<i64>,
    pub name: String,
    pub dob: Option<NaiveDate>,
    pub gender: Gender,
    pub address: Option<String>,
    pub first_release_year: i32,
    pub no_of_albums_released: u32,
}

impl From<&Artist> for ArtistFields {
    fn from(artist: &Artist) -> Self {
        ArtistFields {
            user_id: artist.user_id,
            name: artist.name.clone(),
            dob: artist.dob,
            gender: artist.gender,
            address: artist.address.clone(),
            first_release_year: artist.first_release_year,
            no_of_albums_released: artist.no_of_albums_released,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Music {
    pub id: i64,
    pub artist_id: i64,
    pub title: String,
    pub album_name: String,
    pub genre: Genre,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MusicFields {
    pub title: String,
    pub album_name: String,
    pub genre: Genre,
}

/// The part of a user a session resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub user_id: i64,
    pub email: String,
    pub role_type: String,
}

/// Outcome of an update or delete addressed by primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Applied,
    NotFound,
}
