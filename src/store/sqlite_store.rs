use super::models::{
    Artist, ArtistFields, Music, MusicFields, Mutation, NewUser, SessionUser, User, UserFields,
};
use super::schema::VERSIONED_SCHEMAS;
use super::trait_def::{
    ArtistRepository, MusicRepository, SessionStore, StoreResult, UserRepository,
};
use crate::sqlite_persistence::{open_versioned_db, open_versioned_in_memory, DEFAULT_TIMESTAMP};
use crate::user::auth::{AuthToken, AuthTokenValue};
use crate::user::Role;

use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{params, types::Type, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

const USER_COLUMNS: &str = "id, first_name, last_name, email, phone, dob, gender, address, \
     role_type, password_hash, is_staff, is_superuser, created_at, updated_at";
const ARTIST_COLUMNS: &str = "id, user_id, name, dob, gender, address, first_release_year, \
     no_of_albums_released, created_at, updated_at";
const MUSIC_COLUMNS: &str = "id, artist_id, title, album_name, genre, created_at, updated_at";

/// Single SQLite database holding users, artists, music and sessions.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let conn = open_versioned_db(db_path, VERSIONED_SCHEMAS)?;
        Ok(SqliteStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = open_versioned_in_memory(VERSIONED_SCHEMAS)?;
        Ok(SqliteStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

fn sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn mutation(changed_rows: usize) -> Mutation {
    if changed_rows == 0 {
        Mutation::NotFound
    } else {
        Mutation::Applied
    }
}

fn date_to_sql(date: &Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DATE_FORMAT).to_string())
}

fn date_from_row(row: &Row, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    row.get::<_, Option<String>>(idx)?
        .map(|s| {
            NaiveDate::parse_from_str(&s, DATE_FORMAT)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
        })
        .transpose()
}

fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        dob: date_from_row(row, 5)?,
        gender: row.get(6)?,
        address: row.get(7)?,
        role_type: row.get(8)?,
        password_hash: row.get(9)?,
        is_staff: row.get(10)?,
        is_superuser: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

fn artist_from_row(row: &Row) -> rusqlite::Result<Artist> {
    Ok(Artist {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        dob: date_from_row(row, 3)?,
        gender: row.get(4)?,
        address: row.get(5)?,
        first_release_year: row.get(6)?,
        no_of_albums_released: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn music_from_row(row: &Row) -> rusqlite::Result<Music> {
    Ok(Music {
        id: row.get(0)?,
        artist_id: row.get(1)?,
        title: row.get(2)?,
        album_name: row.get(3)?,
        genre: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

impl UserRepository for SqliteStore {
    fn list_users(&self, limit: u64, offset: u64) -> StoreResult<Vec<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM user ORDER BY id LIMIT ?1 OFFSET ?2",
            USER_COLUMNS
        ))?;
        let users = stmt
            .query_map(params![sql_int(limit), sql_int(offset)], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    fn count_users(&self) -> StoreResult<u64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM user", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn get_user(&self, id: i64) -> StoreResult<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let user = conn
            .query_row(
                &format!("SELECT {} FROM user WHERE id = ?1", USER_COLUMNS),
                params![id],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let user = conn
            .query_row(
                &format!("SELECT {} FROM user WHERE email = ?1", USER_COLUMNS),
                params![email],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    fn create_user(&self, user: &NewUser) -> StoreResult<i64> {
        let conn = self.conn.lock().unwrap();
        let f = &user.fields;
        conn.execute(
            "INSERT INTO user (first_name, last_name, email, phone, dob, gender, address, \
             role_type, password_hash, is_staff, is_superuser) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                f.first_name,
                f.last_name,
                f.email,
                f.phone,
                date_to_sql(&f.dob),
                f.gender,
                f.address,
                f.role,
                user.password_hash,
                user.is_staff,
                user.is_superuser,
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!("Created user {} with id {}", f.email, id);
        Ok(id)
    }

    fn update_user(&self, id: i64, fields: &UserFields) -> StoreResult<Mutation> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            &format!(
                "UPDATE user SET first_name = ?1, last_name = ?2, email = ?3, phone = ?4, \
                 dob = ?5, gender = ?6, address = ?7, role_type = ?8, updated_at = {} \
                 WHERE id = ?9",
                DEFAULT_TIMESTAMP
            ),
            params![
                fields.first_name,
                fields.last_name,
                fields.email,
                fields.phone,
                date_to_sql(&fields.dob),
                fields.gender,
                fields.address,
                fields.role,
                id,
            ],
        )?;
        Ok(mutation(changed))
    }

    fn set_user_password_hash(&self, id: i64, password_hash: &str) -> StoreResult<Mutation> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            &format!(
                "UPDATE user SET password_hash = ?1, updated_at = {} WHERE id = ?2",
                DEFAULT_TIMESTAMP
            ),
            params![password_hash, id],
        )?;
        Ok(mutation(changed))
    }

    fn set_user_role(&self, id: i64, role: Role) -> StoreResult<Mutation> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            &format!(
                "UPDATE user SET role_type = ?1, updated_at = {} WHERE id = ?2",
                DEFAULT_TIMESTAMP
            ),
            params![role, id],
        )?;
        Ok(mutation(changed))
    }

    fn delete_user(&self, id: i64) -> StoreResult<Mutation> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute("DELETE FROM user WHERE id = ?1", params![id])?;
        Ok(mutation(changed))
    }
}

impl ArtistRepository for SqliteStore {
    fn list_artists(&self, limit: u64, offset: u64) -> StoreResult<Vec<Artist>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM artist ORDER BY id LIMIT ?1 OFFSET ?2",
            ARTIST_COLUMNS
        ))?;
        let artists = stmt
            .query_map(params![sql_int(limit), sql_int(offset)], artist_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(artists)
    }

    fn list_all_artists(&self) -> StoreResult<Vec<Artist>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare(&format!("SELECT {} FROM artist ORDER BY id", ARTIST_COLUMNS))?;
        let artists = stmt
            .query_map([], artist_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(artists)
    }

    fn count_artists(&self) -> StoreResult<u64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM artist", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn get_artist(&self, id: i64) -> StoreResult<Option<Artist>> {
        let conn = self.conn.lock().unwrap();
        let artist = conn
            .query_row(
                &format!("SELECT {} FROM artist WHERE id = ?1", ARTIST_COLUMNS),
                params![id],
                artist_from_row,
            )
            .optional()?;
        Ok(artist)
    }

    fn create_artist(&self, fields: &ArtistFields) -> StoreResult<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO artist (user_id, name, dob, gender, address, first_release_year, \
             no_of_albums_released) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                fields.user_id,
                fields.name,
                date_to_sql(&fields.dob),
                fields.gender,
                fields.address,
                fields.first_release_year,
                fields.no_of_albums_released,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update_artist(&self, id: i64, fields: &ArtistFields) -> StoreResult<Mutation> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            &format!(
                "UPDATE artist SET user_id = ?1, name = ?2, dob = ?3, gender = ?4, \
                 address = ?5, first_release_year = ?6, no_of_albums_released = ?7, \
                 updated_at = {} WHERE id = ?8",
                DEFAULT_TIMESTAMP
            ),
            params![
                fields.user_id,
                fields.name,
                date_to_sql(&fields.dob),
                fields.gender,
                fields.address,
                fields.first_release_year,
                fields.no_of_albums_released,
                id,
            ],
        )?;
        Ok(mutation(changed))
    }

    fn delete_artist(&self, id: i64) -> StoreResult<Mutation> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute("DELETE FROM artist WHERE id = ?1", params![id])?;
        Ok(mutation(changed))
    }
}

impl MusicRepository for SqliteStore {
    fn list_songs(&self, artist_id: i64, limit: u64, offset: u64) -> StoreResult<Vec<Music>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM music WHERE artist_id = ?1 ORDER BY id LIMIT ?2 OFFSET ?3",
            MUSIC_COLUMNS
        ))?;
        let songs = stmt
            .query_map(
                params![artist_id, sql_int(limit), sql_int(offset)],
                music_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(songs)
    }

    fn count_songs(&self, artist_id: i64) -> StoreResult<u64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM music WHERE artist_id = ?1",
            params![artist_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn get_song(&self, id: i64) -> StoreResult<Option<Music>> {
        let conn = self.conn.lock().unwrap();
        let song = conn
            .query_row(
                &format!("SELECT {} FROM music WHERE id = ?1", MUSIC_COLUMNS),
                params![id],
                music_from_row,
            )
            .optional()?;
        Ok(song)
    }

    fn create_song(&self, artist_id: i64, fields: &MusicFields) -> StoreResult<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO music (artist_id, title, album_name, genre) VALUES (?1, ?2, ?3, ?4)",
            params![artist_id, fields.title, fields.album_name, fields.genre],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update_song(&self, id: i64, fields: &MusicFields) -> StoreResult<Mutation> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            &format!(
                "UPDATE music SET title = ?1, album_name = ?2, genre = ?3, updated_at = {} \
                 WHERE id = ?4",
                DEFAULT_TIMESTAMP
            ),
            params![fields.title, fields.album_name, fields.genre, id],
        )?;
        Ok(mutation(changed))
    }

    fn delete_song(&self, id: i64) -> StoreResult<Mutation> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute("DELETE FROM music WHERE id = ?1", params![id])?;
        Ok(mutation(changed))
    }
}

impl SessionStore for SqliteStore {
    fn create_session(&self, user_id: i64) -> StoreResult<AuthToken> {
        let conn = self.conn.lock().unwrap();
        let value = AuthTokenValue::generate();
        conn.execute(
            "INSERT INTO session (user_id, value) VALUES (?1, ?2)",
            params![user_id, value.0],
        )?;
        let created = conn.query_row(
            "SELECT created FROM session WHERE value = ?1",
            params![value.0],
            |row| row.get(0),
        )?;
        Ok(AuthToken {
            user_id,
            value,
            created,
            last_used: None,
        })
    }

    fn resolve_session(&self, token: &AuthTokenValue) -> StoreResult<Option<SessionUser>> {
        let conn = self.conn.lock().unwrap();
        let user = conn
            .query_row(
                "SELECT user.id, user.email, user.role_type FROM session \
                 JOIN user ON user.id = session.user_id WHERE session.value = ?1",
                params![token.0],
                |row| {
                    Ok(SessionUser {
                        user_id: row.get(0)?,
                        email: row.get(1)?,
                        role_type: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    fn touch_session(&self, token: &AuthTokenValue) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "UPDATE session SET last_used = {} WHERE value = ?1",
                DEFAULT_TIMESTAMP
            ),
            params![token.0],
        )?;
        Ok(())
    }

    fn delete_session(&self, token: &AuthTokenValue) -> StoreResult<Mutation> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute("DELETE FROM session WHERE value = ?1", params![token.0])?;
        Ok(mutation(changed))
    }

    fn prune_sessions(&self, unused_for_days: u64) -> StoreResult<usize> {
        let conn = self.conn.lock().unwrap();
        let cutoff = chrono::Utc::now().timestamp() - sql_int(unused_for_days.saturating_mul(86400));
        let deleted = conn.execute(
            "DELETE FROM session WHERE COALESCE(last_used, created) < ?1",
            params![cutoff],
        )?;
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::models::{Gender, Genre};
    use crate::store::StoreError;
    use tempfile::TempDir;

    fn create_tmp_store() -> (SqliteStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let temp_file_path = temp_dir.path().join("test.db");
        let store = SqliteStore::new(&temp_file_path).unwrap();
        (store, temp_dir)
    }

    fn user_fields(email: &str, role: Role) -> UserFields {
        UserFields {
            first_name: "Test".to_string(),
            last_name: Some("User".to_string()),
            email: email.to_string(),
            phone: None,
            dob: NaiveDate::from_ymd_opt(1990, 4, 2),
            gender: Gender::Other,
            address: None,
            role,
        }
    }

    fn artist_fields(name: &str) -> ArtistFields {
        ArtistFields {
            user_id: None,
            name: name.to_string(),
            dob: None,
            gender: Gender::Male,
            address: Some("Somewhere, 12".to_string()),
            first_release_year: 1999,
            no_of_albums_released: 3,
        }
    }

    fn song_fields(title: &str) -> MusicFields {
        MusicFields {
            title: title.to_string(),
            album_name: "Album".to_string(),
            genre: Genre::Rock,
        }
    }

    #[test]
    fn creates_and_reads_user() {
        let (store, _temp_dir) = create_tmp_store();
        let id = store
            .create_user(&NewUser::by_admin(
                user_fields("a@example.com", Role::SuperAdmin),
                "hash".to_string(),
            ))
            .unwrap();

        let user = store.get_user(id).unwrap().unwrap();
        assert_eq!(user.email, "a@example.com");
        assert_eq!(user.role(), Some(Role::SuperAdmin));
        assert_eq!(user.dob, NaiveDate::from_ymd_opt(1990, 4, 2));
        assert!(user.is_staff && user.is_superuser);
        assert_eq!(user.password_hash, "hash");

        let by_email = store.get_user_by_email("a@example.com").unwrap().unwrap();
        assert_eq!(by_email.id, id);
        assert!(store.get_user_by_email("nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn duplicate_email_is_typed() {
        let (store, _temp_dir) = create_tmp_store();
        let new_user =
            NewUser::self_registered(user_fields("a@example.com", Role::Artist), "h".to_string());
        store.create_user(&new_user).unwrap();
        let result = store.create_user(&new_user);
        assert!(matches!(result, Err(StoreError::Duplicate(_))));
    }

    #[test]
    fn update_keeps_flags_and_password() {
        let (store, _temp_dir) = create_tmp_store();
        let id = store
            .create_user(&NewUser::by_admin(
                user_fields("a@example.com", Role::SuperAdmin),
                "hash".to_string(),
            ))
            .unwrap();

        let mut fields = user_fields("b@example.com", Role::Artist);
        fields.phone = Some("555".to_string());
        assert_eq!(store.update_user(id, &fields).unwrap(), Mutation::Applied);

        let user = store.get_user(id).unwrap().unwrap();
        assert_eq!(user.email, "b@example.com");
        assert_eq!(user.role(), Some(Role::Artist));
        assert!(user.is_staff);
        assert_eq!(user.password_hash, "hash");

        assert_eq!(store.update_user(999, &fields).unwrap(), Mutation::NotFound);
    }

    #[test]
    fn unknown_stored_role_resolves_to_none() {
        let (store, _temp_dir) = create_tmp_store();
        let id = store
            .create_user(&NewUser::by_admin(
                user_fields("a@example.com", Role::Admin),
                "hash".to_string(),
            ))
            .unwrap();
        store
            .conn
            .lock()
            .unwrap()
            .execute(
                "UPDATE user SET role_type = 'root' WHERE id = ?1",
                params![id],
            )
            .unwrap();
        assert_eq!(store.get_user(id).unwrap().unwrap().role(), None);
    }

    #[test]
    fn delete_twice_is_a_no_op() {
        let (store, _temp_dir) = create_tmp_store();
        let id = store.create_artist(&artist_fields("A")).unwrap();
        assert_eq!(store.delete_artist(id).unwrap(), Mutation::Applied);
        assert_eq!(store.delete_artist(id).unwrap(), Mutation::NotFound);
        assert_eq!(store.delete_artist(id).unwrap(), Mutation::NotFound);
    }

    #[test]
    fn lists_are_paged_in_id_order() {
        let (store, _temp_dir) = create_tmp_store();
        for name in ["A", "B", "C", "D", "E"] {
            store.create_artist(&artist_fields(name)).unwrap();
        }
        assert_eq!(store.count_artists().unwrap(), 5);

        let page: Vec<_> = store
            .list_artists(2, 2)
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(page, vec!["C", "D"]);

        let all: Vec<_> = store
            .list_all_artists()
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(all, vec!["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn artist_user_link_is_unique_and_checked() {
        let (store, _temp_dir) = create_tmp_store();
        let user_id = store
            .create_user(&NewUser::by_admin(
                user_fields("a@example.com", Role::Artist),
                "hash".to_string(),
            ))
            .unwrap();

        let mut fields = artist_fields("Linked");
        fields.user_id = Some(user_id);
        store.create_artist(&fields).unwrap();
        assert!(matches!(
            store.create_artist(&fields),
            Err(StoreError::Duplicate(_))
        ));

        fields.user_id = Some(user_id + 100);
        assert!(matches!(
            store.create_artist(&fields),
            Err(StoreError::InvalidReference(_))
        ));
    }

    #[test]
    fn deleting_user_unlinks_artist() {
        let (store, _temp_dir) = create_tmp_store();
        let user_id = store
            .create_user(&NewUser::by_admin(
                user_fields("a@example.com", Role::Artist),
                "hash".to_string(),
            ))
            .unwrap();
        let mut fields = artist_fields("Linked");
        fields.user_id = Some(user_id);
        let artist_id = store.create_artist(&fields).unwrap();

        store.delete_user(user_id).unwrap();
        let artist = store.get_artist(artist_id).unwrap().unwrap();
        assert_eq!(artist.user_id, None);
    }

    #[test]
    fn deleting_artist_deletes_songs() {
        let (store, _temp_dir) = create_tmp_store();
        let artist_id = store.create_artist(&artist_fields("A")).unwrap();
        let other_id = store.create_artist(&artist_fields("B")).unwrap();
        let song_id = store.create_song(artist_id, &song_fields("one")).unwrap();
        store.create_song(artist_id, &song_fields("two")).unwrap();
        store.create_song(other_id, &song_fields("three")).unwrap();

        assert_eq!(store.count_songs(artist_id).unwrap(), 2);
        assert_eq!(store.list_songs(artist_id, 10, 0).unwrap().len(), 2);

        store.delete_artist(artist_id).unwrap();
        assert!(store.get_song(song_id).unwrap().is_none());
        assert_eq!(store.count_songs(artist_id).unwrap(), 0);
        assert_eq!(store.count_songs(other_id).unwrap(), 1);
    }

    #[test]
    fn song_for_missing_artist_is_invalid_reference() {
        let (store, _temp_dir) = create_tmp_store();
        assert!(matches!(
            store.create_song(42, &song_fields("orphan")),
            Err(StoreError::InvalidReference(_))
        ));
    }

    #[test]
    fn updates_song() {
        let (store, _temp_dir) = create_tmp_store();
        let artist_id = store.create_artist(&artist_fields("A")).unwrap();
        let song_id = store.create_song(artist_id, &song_fields("one")).unwrap();

        let fields = MusicFields {
            title: "uno".to_string(),
            album_name: "Primo".to_string(),
            genre: Genre::Jazz,
        };
        assert_eq!(store.update_song(song_id, &fields).unwrap(), Mutation::Applied);
        let song = store.get_song(song_id).unwrap().unwrap();
        assert_eq!(song.title, "uno");
        assert_eq!(song.genre, Genre::Jazz);
        assert_eq!(song.artist_id, artist_id);
    }

    #[test]
    fn session_lifecycle() {
        let (store, _temp_dir) = create_tmp_store();
        let user_id = store
            .create_user(&NewUser::by_admin(
                user_fields("a@example.com", Role::Admin),
                "hash".to_string(),
            ))
            .unwrap();

        let token = store.create_session(user_id).unwrap();
        let resolved = store.resolve_session(&token.value).unwrap().unwrap();
        assert_eq!(resolved.user_id, user_id);
        assert_eq!(resolved.role_type, "admin");

        store.touch_session(&token.value).unwrap();
        assert_eq!(store.prune_sessions(1).unwrap(), 0);

        assert_eq!(
            store.delete_session(&token.value).unwrap(),
            Mutation::Applied
        );
        assert!(store.resolve_session(&token.value).unwrap().is_none());
    }

    #[test]
    fn prunes_stale_sessions() {
        let (store, _temp_dir) = create_tmp_store();
        let user_id = store
            .create_user(&NewUser::by_admin(
                user_fields("a@example.com", Role::Admin),
                "hash".to_string(),
            ))
            .unwrap();
        let stale = store.create_session(user_id).unwrap();
        let fresh = store.create_session(user_id).unwrap();
        store
            .conn
            .lock()
            .unwrap()
            .execute(
                "UPDATE session SET created = created - 10 * 86400 WHERE value = ?1",
                params![stale.value.0],
            )
            .unwrap();

        assert_eq!(store.prune_sessions(5).unwrap(), 1);
        assert!(store.resolve_session(&stale.value).unwrap().is_none());
        assert!(store.resolve_session(&fresh.value).unwrap().is_some());
    }

    #[test]
    fn sessions_go_away_with_user() {
        let (store, _temp_dir) = create_tmp_store();
        let user_id = store
            .create_user(&NewUser::by_admin(
                user_fields("a@example.com", Role::Admin),
                "hash".to_string(),
            ))
            .unwrap();
        let token = store.create_session(user_id).unwrap();
        store.delete_user(user_id).unwrap();
        assert!(store.resolve_session(&token.value).unwrap().is_none());
    }

    #[test]
    fn reopens_existing_database() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.db");
        {
            let store = SqliteStore::new(&path).unwrap();
            store.create_artist(&artist_fields("Persisted")).unwrap();
        }
        let store = SqliteStore::new(&path).unwrap();
        assert_eq!(store.list_all_artists().unwrap()[0].name, "Persisted");
    }
}
