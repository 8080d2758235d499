//! Repository traits.
//!
//! Handlers only see these traits, the server holds an `Arc<dyn FullStore>`.

use super::models::{
    Artist, ArtistFields, Music, MusicFields, Mutation, NewUser, SessionUser, User, UserFields,
};
use crate::user::auth::{AuthToken, AuthTokenValue};
use crate::user::Role;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint was violated (user email, artist user link, token).
    #[error("duplicate value: {0}")]
    Duplicate(String),

    /// A referenced row does not exist.
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    #[error("database error: {0}")]
    Sqlite(#[source] rusqlite::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        use rusqlite::ffi;
        if let rusqlite::Error::SqliteFailure(failure, message) = &err {
            let detail = message.clone().unwrap_or_else(|| failure.to_string());
            match failure.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    return StoreError::Duplicate(detail)
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => return StoreError::InvalidReference(detail),
                _ => {}
            }
        }
        StoreError::Sqlite(err)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

pub trait UserRepository: Send + Sync {
    /// Users ordered by id.
    fn list_users(&self, limit: u64, offset: u64) -> StoreResult<Vec<User>>;

    fn count_users(&self) -> StoreResult<u64>;

    fn get_user(&self, id: i64) -> StoreResult<Option<User>>;

    /// Looks up the login key.
    fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Returns the new user id. Fails with [`StoreError::Duplicate`] if the
    /// email is taken.
    fn create_user(&self, user: &NewUser) -> StoreResult<i64>;

    /// Replaces the profile fields. Password and staff flags are untouched.
    fn update_user(&self, id: i64, fields: &UserFields) -> StoreResult<Mutation>;

    fn set_user_password_hash(&self, id: i64, password_hash: &str) -> StoreResult<Mutation>;

    fn set_user_role(&self, id: i64, role: Role) -> StoreResult<Mutation>;

    fn delete_user(&self, id: i64) -> StoreResult<Mutation>;
}

pub trait ArtistRepository: Send + Sync {
    /// Artists ordered by id.
    fn list_artists(&self, limit: u64, offset: u64) -> StoreResult<Vec<Artist>>;

    /// Every artist ordered by id, for export.
    fn list_all_artists(&self) -> StoreResult<Vec<Artist>>;

    fn count_artists(&self) -> StoreResult<u64>;

    fn get_artist(&self, id: i64) -> StoreResult<Option<Artist>>;

    /// Returns the new artist id. A `user_id` that is already linked to another
    /// artist is a [`StoreError::Duplicate`], one that doesn't exist is a
    /// [`StoreError::InvalidReference`].
    fn create_artist(&self, fields: &ArtistFields) -> StoreResult<i64>;

    fn update_artist(&self, id: i64, fields: &ArtistFields) -> StoreResult<Mutation>;

    /// Also deletes the artist's songs.
    fn delete_artist(&self, id: i64) -> StoreResult<Mutation>;
}

pub trait MusicRepository: Send + Sync {
    /// Songs of one artist ordered by id.
    fn list_songs(&self, artist_id: i64, limit: u64, offset: u64) -> StoreResult<Vec<Music>>;

    fn count_songs(&self, artist_id: i64) -> StoreResult<u64>;

    fn get_song(&self, id: i64) -> StoreResult<Option<Music>>;

    /// Fails with [`StoreError::InvalidReference`] if the artist doesn't exist.
    fn create_song(&self, artist_id: i64, fields: &MusicFields) -> StoreResult<i64>;

    fn update_song(&self, id: i64, fields: &MusicFields) -> StoreResult<Mutation>;

    fn delete_song(&self, id: i64) -> StoreResult<Mutation>;
}

pub trait SessionStore: Send + Sync {
    /// Creates and stores a fresh token for the user.
    fn create_session(&self, user_id: i64) -> StoreResult<AuthToken>;

    /// Returns Ok(None) if the token does not exist.
    fn resolve_session(&self, token: &AuthTokenValue) -> StoreResult<Option<SessionUser>>;

    /// Updates the token's last used timestamp.
    fn touch_session(&self, token: &AuthTokenValue) -> StoreResult<()>;

    fn delete_session(&self, token: &AuthTokenValue) -> StoreResult<Mutation>;

    /// Deletes tokens that haven't been used for the given number of days.
    /// Returns the number of deleted tokens.
    fn prune_sessions(&self, unused_for_days: u64) -> StoreResult<usize>;
}

pub trait FullStore: UserRepository + ArtistRepository + MusicRepository + SessionStore {}

impl<T> FullStore for T where T: UserRepository + ArtistRepository + MusicRepository + SessionStore {}
