//! Songs live under their artist: every route checks the artist in the path
//! first and the song's owner second.

use super::artist_routes::ARTISTS_PATH;
use super::errors::{RouteError, RouteResult};
use super::forms::{FieldErrors, ListParams, MusicForm};
use super::state::ServerState;
use super::views::{delete_view, form_view, list_view, music_choices};
use crate::pagination::paginate;
use crate::store::{Artist, FullStore, Music, Mutation, StoreError};

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
    Form, Json,
};
use tracing::{debug, info};

fn songs_path(artist_id: i64) -> String {
    format!("/artists/songs/{}/", artist_id)
}

fn create_path(artist_id: i64) -> String {
    format!("/artists/songs/create/{}/", artist_id)
}

fn update_path(artist_id: i64, song_id: i64) -> String {
    format!("/artists/songs/update/{}/{}/", artist_id, song_id)
}

fn delete_path(artist_id: i64, song_id: i64) -> String {
    format!("/artists/songs/delete/{}/{}/", artist_id, song_id)
}

fn load_artist(store: &dyn FullStore, artist_id: i64) -> Result<Artist, RouteError> {
    store
        .get_artist(artist_id)?
        .ok_or_else(|| RouteError::NotFound(ARTISTS_PATH.to_string()))
}

/// The song, provided it exists and belongs to the artist.
fn load_song(store: &dyn FullStore, artist_id: i64, song_id: i64) -> Result<Music, RouteError> {
    load_artist(store, artist_id)?;
    match store.get_song(song_id)? {
        Some(song) if song.artist_id == artist_id => Ok(song),
        _ => Err(RouteError::NotFound(songs_path(artist_id))),
    }
}

fn invalid_form(action: &str, form: &MusicForm, errors: &FieldErrors) -> RouteError {
    RouteError::Validation(form_view(
        "song_form",
        action,
        form,
        errors,
        music_choices(),
    ))
}

pub async fn list_songs(
    State(state): State<ServerState>,
    Path(artist_id): Path<i64>,
    Query(params): Query<ListParams>,
) -> RouteResult {
    let artist = load_artist(state.store.as_ref(), artist_id)?;
    let (page, limit) = params.resolve(state.config.default_page_size)?;
    let total = state.store.count_songs(artist_id)?;
    let info = paginate(total, page, limit, state.config.page_count_mode)?;
    let songs = state.store.list_songs(artist_id, info.limit, info.offset)?;
    Ok(Json(list_view("song_list", &songs, &info, Some(&artist))).into_response())
}

pub async fn create_song_form(
    State(state): State<ServerState>,
    Path(artist_id): Path<i64>,
) -> RouteResult {
    load_artist(state.store.as_ref(), artist_id)?;
    Ok(Json(form_view(
        "song_form",
        &create_path(artist_id),
        &MusicForm::default(),
        &FieldErrors::new(),
        music_choices(),
    ))
    .into_response())
}

pub async fn create_song(
    State(state): State<ServerState>,
    Path(artist_id): Path<i64>,
    Form(form): Form<MusicForm>,
) -> RouteResult {
    load_artist(state.store.as_ref(), artist_id)?;
    let fields = form
        .parse()
        .map_err(|errors| invalid_form(&create_path(artist_id), &form, &errors))?;

    match state.store.create_song(artist_id, &fields) {
        Ok(id) => {
            info!("Created song {} for artist {}", id, artist_id);
            Ok(Redirect::to(&songs_path(artist_id)).into_response())
        }
        // The artist went away after the check above
        Err(StoreError::InvalidReference(_)) => Err(RouteError::NotFound(ARTISTS_PATH.to_string())),
        Err(err) => Err(err.into()),
    }
}

pub async fn update_song_form(
    State(state): State<ServerState>,
    Path((artist_id, song_id)): Path<(i64, i64)>,
) -> RouteResult {
    let song = load_song(state.store.as_ref(), artist_id, song_id)?;
    Ok(Json(form_view(
        "song_form",
        &update_path(artist_id, song_id),
        &MusicForm::from_song(&song),
        &FieldErrors::new(),
        music_choices(),
    ))
    .into_response())
}

pub async fn update_song(
    State(state): State<ServerState>,
    Path((artist_id, song_id)): Path<(i64, i64)>,
    Form(form): Form<MusicForm>,
) -> RouteResult {
    load_song(state.store.as_ref(), artist_id, song_id)?;
    let fields = form
        .parse()
        .map_err(|errors| invalid_form(&update_path(artist_id, song_id), &form, &errors))?;

    match state.store.update_song(song_id, &fields)? {
        Mutation::Applied => info!("Updated song {}", song_id),
        Mutation::NotFound => debug!("Song {} was deleted meanwhile", song_id),
    }
    Ok(Redirect::to(&songs_path(artist_id)).into_response())
}

pub async fn delete_song_form(
    State(state): State<ServerState>,
    Path((artist_id, song_id)): Path<(i64, i64)>,
) -> RouteResult {
    let song = load_song(state.store.as_ref(), artist_id, song_id)?;
    Ok(Json(delete_view(
        "song_delete",
        &delete_path(artist_id, song_id),
        &song,
    ))
    .into_response())
}

pub async fn delete_song(
    State(state): State<ServerState>,
    Path((artist_id, song_id)): Path<(i64, i64)>,
) -> RouteResult {
    load_song(state.store.as_ref(), artist_id, song_id)?;
    match state.store.delete_song(song_id)? {
        Mutation::Applied => info!("Deleted song {}", song_id),
        Mutation::NotFound => debug!("Song {} was already gone", song_id),
    }
    Ok(Redirect::to(&songs_path(artist_id)).into_response())
}
