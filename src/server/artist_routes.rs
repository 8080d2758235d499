use super::errors::{RouteError, RouteResult};
use super::forms::{add_error, ArtistForm, FieldErrors, ListParams};
use super::state::ServerState;
use super::views::{
    artist_choices, delete_view, form_view, import_form_view, import_view, list_view,
};
use crate::artist_csv::{export_artists, import_artists, is_csv_filename};
use crate::pagination::paginate;
use crate::store::{Mutation, StoreError};

use axum::{
    extract::{Multipart, Path, Query, State},
    http::header,
    response::{IntoResponse, Redirect},
    Form, Json,
};
use tracing::{debug, info};

pub const ARTISTS_PATH: &str = "/artists/";
const CREATE_PATH: &str = "/artists/create/";
const UPLOAD_FIELD: &str = "file";
const EXPORT_FILE_NAME: &str = "artists.csv";

fn update_path(artist_id: i64) -> String {
    format!("/artists/update/{}/", artist_id)
}

fn delete_path(artist_id: i64) -> String {
    format!("/artists/delete/{}/", artist_id)
}

fn not_found() -> RouteError {
    RouteError::NotFound(ARTISTS_PATH.to_string())
}

fn invalid_form(action: &str, form: &ArtistForm, errors: &FieldErrors) -> RouteError {
    RouteError::Validation(form_view(
        "artist_form",
        action,
        form,
        errors,
        artist_choices(),
    ))
}

/// Turns a rejected user link into a form error, anything else is a real
/// storage failure.
fn store_failure(action: &str, form: &ArtistForm, err: StoreError) -> RouteError {
    let message = match &err {
        StoreError::Duplicate(_) => "This user is already linked to another artist",
        StoreError::InvalidReference(_) => "No user with this id",
        StoreError::Sqlite(_) => return err.into(),
    };
    let mut errors = FieldErrors::new();
    add_error(&mut errors, "user_id", message);
    invalid_form(action, form, &errors)
}

pub async fn list_artists(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
) -> RouteResult {
    let (page, limit) = params.resolve(state.config.default_page_size)?;
    let total = state.store.count_artists()?;
    let info = paginate(total, page, limit, state.config.page_count_mode)?;
    let artists = state.store.list_artists(info.limit, info.offset)?;
    Ok(Json(list_view("artist_list", &artists, &info, None)).into_response())
}

pub async fn create_artist_form() -> RouteResult {
    Ok(Json(form_view(
        "artist_form",
        CREATE_PATH,
        &ArtistForm::default(),
        &FieldErrors::new(),
        artist_choices(),
    ))
    .into_response())
}

pub async fn create_artist(
    State(state): State<ServerState>,
    Form(form): Form<ArtistForm>,
) -> RouteResult {
    let fields = form
        .parse()
        .map_err(|errors| invalid_form(CREATE_PATH, &form, &errors))?;

    let id = state
        .store
        .create_artist(&fields)
        .map_err(|err| store_failure(CREATE_PATH, &form, err))?;
    info!("Created artist {}", id);
    Ok(Redirect::to(ARTISTS_PATH).into_response())
}

pub async fn update_artist_form(
    State(state): State<ServerState>,
    Path(artist_id): Path<i64>,
) -> RouteResult {
    let artist = state.store.get_artist(artist_id)?.ok_or_else(not_found)?;
    Ok(Json(form_view(
        "artist_form",
        &update_path(artist_id),
        &ArtistForm::from_artist(&artist),
        &FieldErrors::new(),
        artist_choices(),
    ))
    .into_response())
}

pub async fn update_artist(
    State(state): State<ServerState>,
    Path(artist_id): Path<i64>,
    Form(form): Form<ArtistForm>,
) -> RouteResult {
    let action = update_path(artist_id);
    let fields = form
        .parse()
        .map_err(|errors| invalid_form(&action, &form, &errors))?;

    match state
        .store
        .update_artist(artist_id, &fields)
        .map_err(|err| store_failure(&action, &form, err))?
    {
        Mutation::Applied => {
            info!("Updated artist {}", artist_id);
            Ok(Redirect::to(ARTISTS_PATH).into_response())
        }
        Mutation::NotFound => Err(not_found()),
    }
}

pub async fn delete_artist_form(
    State(state): State<ServerState>,
    Path(artist_id): Path<i64>,
) -> RouteResult {
    let artist = state.store.get_artist(artist_id)?.ok_or_else(not_found)?;
    Ok(Json(delete_view(
        "artist_delete",
        &delete_path(artist_id),
        &artist,
    ))
    .into_response())
}

pub async fn delete_artist(
    State(state): State<ServerState>,
    Path(artist_id): Path<i64>,
) -> RouteResult {
    match state.store.delete_artist(artist_id)? {
        Mutation::Applied => info!("Deleted artist {}", artist_id),
        Mutation::NotFound => debug!("Artist {} was already gone", artist_id),
    }
    Ok(Redirect::to(ARTISTS_PATH).into_response())
}

pub async fn import_csv_form() -> RouteResult {
    Ok(Json(import_form_view()).into_response())
}

pub async fn import_csv(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> RouteResult {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        if !is_csv_filename(&file_name) {
            debug!("Rejected upload '{}': not a csv file", file_name);
            return Ok(Redirect::to(ARTISTS_PATH).into_response());
        }

        let bytes = field.bytes().await?;
        let report = import_artists(state.store.as_ref(), &bytes);
        info!(
            "Imported {} artists from '{}', {} rows failed",
            report.created,
            file_name,
            report.failures.len()
        );
        return Ok(Json(import_view(&report)).into_response());
    }

    debug!("Upload without a '{}' field", UPLOAD_FIELD);
    Ok(Redirect::to(ARTISTS_PATH).into_response())
}

pub async fn export_csv(State(state): State<ServerState>) -> RouteResult {
    let artists = state.store.list_all_artists()?;
    debug!("Exporting {} artists", artists.len());
    let body = export_artists(&artists);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
            ),
        ],
        body,
    )
        .into_response())
}
