use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    ArtistManager,
    Artist,
    Admin,
}

pub const ALL_ROLES: &[Role] = &[
    Role::SuperAdmin,
    Role::ArtistManager,
    Role::Artist,
    Role::Admin,
];

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::ArtistManager => "artist_manager",
            Role::Artist => "artist",
            Role::Admin => "admin",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "super_admin" => Some(Role::SuperAdmin),
            "artist_manager" => Some(Role::ArtistManager),
            "artist" => Some(Role::Artist),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Staff flags are only granted to super admins created by an admin.
    pub fn grants_staff_flags(self) -> bool {
        self == Role::SuperAdmin
    }
}

impl ToSql for Role {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Role {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        Role::from_str(s).ok_or_else(|| FromSqlError::Other(format!("Unknown role {}", s).into()))
    }
}

/// Whether `role` is in the allow-list. A missing or unrecognized role is
/// never allowed.
pub fn authorize(role: Option<Role>, allowed: &[Role]) -> bool {
    match role {
        Some(role) => allowed.contains(&role),
        None => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    ListUsers,
    CreateUser,
    UpdateUser,
    DeleteUser,
    ListArtists,
    CreateArtist,
    UpdateArtist,
    DeleteArtist,
    ImportArtists,
    ExportArtists,
    ListSongs,
    CreateSong,
    UpdateSong,
    DeleteSong,
}

pub const ALL_OPERATIONS: &[Operation] = &[
    Operation::ListUsers,
    Operation::CreateUser,
    Operation::UpdateUser,
    Operation::DeleteUser,
    Operation::ListArtists,
    Operation::CreateArtist,
    Operation::UpdateArtist,
    Operation::DeleteArtist,
    Operation::ImportArtists,
    Operation::ExportArtists,
    Operation::ListSongs,
    Operation::CreateSong,
    Operation::UpdateSong,
    Operation::DeleteSong,
];

const USER_MANAGERS: &[Role] = &[Role::SuperAdmin];
const ARTIST_MANAGERS: &[Role] = &[Role::SuperAdmin, Role::ArtistManager];
const SONG_VIEWERS: &[Role] = &[Role::SuperAdmin, Role::Admin];
const SONG_EDITORS: &[Role] = &[Role::SuperAdmin];

impl Operation {
    /// Allow-lists evaluated in order before the handler runs. Every one of them
    /// must admit the actor; the first that doesn't decides the denial.
    pub fn guards(self) -> &'static [&'static [Role]] {
        match self {
            Operation::ListUsers
            | Operation::CreateUser
            | Operation::UpdateUser
            | Operation::DeleteUser => &[USER_MANAGERS],
            Operation::ListArtists
            | Operation::CreateArtist
            | Operation::UpdateArtist
            | Operation::DeleteArtist
            | Operation::ImportArtists
            | Operation::ExportArtists => &[ARTIST_MANAGERS],
            Operation::ListSongs => &[ALL_ROLES, SONG_VIEWERS],
            Operation::CreateSong | Operation::UpdateSong | Operation::DeleteSong => {
                &[ALL_ROLES, SONG_EDITORS]
            }
        }
    }

    /// Index of the first guard rejecting `role`, if any.
    pub fn first_failing_guard(self, role: Option<Role>) -> Option<usize> {
        self.guards()
            .iter()
            .position(|allowed| !authorize(role, allowed))
    }

    pub fn permits(self, role: Option<Role>) -> bool {
        self.first_failing_guard(role).is_none()
    }
}
