pub mod models;
mod schema;
mod sqlite_store;
mod trait_def;
pub mod validation;

pub use models::{
    Artist, ArtistFields, Gender, Genre, Music, MusicFields, Mutation, NewUser, SessionUser, User,
    UserFields,
};
pub use sqlite_store::{SqliteStore, DATE_FORMAT};
pub use trait_def::{
    ArtistRepository, FullStore, MusicRepository, SessionStore, StoreError, StoreResult,
    UserRepository,
};
