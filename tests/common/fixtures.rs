//! Test fixture creation
//!
//! Seeds one user per role plus a couple of artists and songs through the
//! same store the server uses.

use super::constants::*;
use anyhow::Result;
use artist_manager_server::store::{
    ArtistFields, ArtistRepository, Gender, Genre, MusicFields, MusicRepository, NewUser,
    SqliteStore, UserFields, UserRepository,
};
use artist_manager_server::user::auth::hash_password;
use artist_manager_server::user::Role;
use std::path::PathBuf;
use tempfile::TempDir;

fn user_fields(email: &str, first_name: &str, role: Role) -> UserFields {
    UserFields {
        first_name: first_name.to_string(),
        last_name: None,
        email: email.to_string(),
        phone: None,
        dob: None,
        gender: Gender::Other,
        address: None,
        role,
    }
}

/// Creates a temporary database with the seeded users, artists and songs.
/// Returns (temp_dir, db_path)
pub fn create_test_db() -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("test.db");
    let store = SqliteStore::new(&db_path)?;

    // Hashing is slow, all users share one
    let password_hash = hash_password(TEST_PASS)?;
    for (email, name, role) in [
        (SUPER_ADMIN_EMAIL, "Root", Role::SuperAdmin),
        (ARTIST_MANAGER_EMAIL, "Manager", Role::ArtistManager),
        (ARTIST_EMAIL, "Artist", Role::Artist),
        (ADMIN_EMAIL, "Admin", Role::Admin),
    ] {
        store.create_user(&NewUser::by_admin(
            user_fields(email, name, role),
            password_hash.clone(),
        ))?;
    }

    store.create_artist(&ArtistFields {
        user_id: Some(ARTIST_USER_ID),
        name: ARTIST_1_NAME.to_string(),
        dob: None,
        gender: Gender::Other,
        address: Some("1 Main Street".to_string()),
        first_release_year: 1999,
        no_of_albums_released: 3,
    })?;
    store.create_artist(&ArtistFields {
        user_id: None,
        name: ARTIST_2_NAME.to_string(),
        dob: None,
        gender: Gender::Female,
        address: None,
        first_release_year: 1965,
        no_of_albums_released: 12,
    })?;

    for (title, genre) in [(SONG_1_TITLE, Genre::Rock), ("Closing Track", Genre::Jazz)] {
        store.create_song(
            ARTIST_1_ID,
            &MusicFields {
                title: title.to_string(),
                album_name: "First Album".to_string(),
                genre,
            },
        )?;
    }

    Ok((dir, db_path))
}
