use anyhow::{Context, Result};

use tracing::{debug, info, warn};

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tower_http::services::ServeDir;

use super::errors::{RouteError, RouteResult, DASHBOARD_PATH, LOGIN_PATH};
use super::forms::{add_error, FieldErrors, LoginForm, UserForm};
use super::guard::guarded;
use super::session::{Actor, COOKIE_SESSION_TOKEN_KEY};
use super::views::{dashboard_view, form_view, login_view, user_choices};
use super::{artist_routes, song_routes, user_routes};
use super::{log_requests, state::*, ServerConfig};
use crate::store::{NewUser, StoreError};
use crate::user::auth::{hash_password, verify_password};
use crate::user::Operation;

const REGISTER_PATH: &str = "/register/";
const LOGIN_FAILED_MESSAGE: &str = "Invalid email or password";

async fn login_page() -> Response {
    Json(login_view(None)).into_response()
}

fn login_failed() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(login_view(Some(LOGIN_FAILED_MESSAGE))),
    )
        .into_response()
}

async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> RouteResult {
    debug!("login() called with {:?}", form);
    let Some(user) = state.store.get_user_by_email(form.email.trim())? else {
        return Ok(login_failed());
    };
    match verify_password(&form.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => return Ok(login_failed()),
        Err(err) => {
            warn!("Stored password hash of user {} is unusable: {}", user.id, err);
            return Ok(login_failed());
        }
    }

    let auth_token = state.store.create_session(user.id)?;
    info!("User {} logged in", user.id);
    let cookie = Cookie::build((COOKIE_SESSION_TOKEN_KEY, auth_token.value.0))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    Ok((jar.add(cookie), Redirect::to(DASHBOARD_PATH)).into_response())
}

async fn logout(
    State(state): State<ServerState>,
    actor: Option<Actor>,
    jar: CookieJar,
) -> RouteResult {
    if let Some(actor) = actor {
        state.store.delete_session(&actor.token)?;
        info!("User {} logged out", actor.user_id);
    }
    let expired = Cookie::build((COOKIE_SESSION_TOKEN_KEY, ""))
        .path("/")
        .expires(time::OffsetDateTime::now_utc() - time::Duration::days(1)) // Expire it in the past
        .same_site(SameSite::Lax);
    Ok((jar.add(expired), Redirect::to(LOGIN_PATH)).into_response())
}

fn register_form_view(form: &UserForm, errors: &FieldErrors) -> serde_json::Value {
    form_view("register", REGISTER_PATH, form, errors, user_choices())
}

async fn register_page(State(state): State<ServerState>) -> Response {
    if !state.config.allow_registration {
        return Redirect::to(LOGIN_PATH).into_response();
    }
    Json(register_form_view(&UserForm::default(), &FieldErrors::new())).into_response()
}

async fn register(State(state): State<ServerState>, Form(form): Form<UserForm>) -> RouteResult {
    if !state.config.allow_registration {
        return Ok(Redirect::to(LOGIN_PATH).into_response());
    }
    let (fields, password) = form
        .parse_new()
        .map_err(|errors| RouteError::Validation(register_form_view(&form, &errors)))?;
    let password_hash = hash_password(&password)?;

    match state
        .store
        .create_user(&NewUser::self_registered(fields, password_hash))
    {
        Ok(id) => {
            info!("Registered user {}", id);
            Ok(Redirect::to(LOGIN_PATH).into_response())
        }
        Err(StoreError::Duplicate(_)) => {
            let mut errors = FieldErrors::new();
            add_error(&mut errors, "email", "A user with this email already exists");
            Err(RouteError::Validation(register_form_view(&form, &errors)))
        }
        Err(err) => Err(err.into()),
    }
}

async fn dashboard(actor: Actor, State(state): State<ServerState>) -> Response {
    Json(dashboard_view(
        &actor,
        state.start_time.elapsed(),
        &state.hash,
    ))
    .into_response()
}

fn make_user_routes(state: &ServerState) -> Router<ServerState> {
    use user_routes::*;
    Router::new()
        .route(
            "/users/",
            guarded(get(list_users), state, Operation::ListUsers),
        )
        .route(
            "/users/create/",
            guarded(
                get(create_user_form).post(create_user),
                state,
                Operation::CreateUser,
            ),
        )
        .route(
            "/users/update/{user_id}/",
            guarded(
                get(update_user_form).post(update_user),
                state,
                Operation::UpdateUser,
            ),
        )
        .route(
            "/users/delete/{user_id}/",
            guarded(
                get(delete_user_form).post(delete_user),
                state,
                Operation::DeleteUser,
            ),
        )
}

fn make_artist_routes(state: &ServerState) -> Router<ServerState> {
    use artist_routes::*;
    Router::new()
        .route(
            "/artists/",
            guarded(get(list_artists), state, Operation::ListArtists),
        )
        .route(
            "/artists/create/",
            guarded(
                get(create_artist_form).post(create_artist),
                state,
                Operation::CreateArtist,
            ),
        )
        .route(
            "/artists/update/{artist_id}/",
            guarded(
                get(update_artist_form).post(update_artist),
                state,
                Operation::UpdateArtist,
            ),
        )
        .route(
            "/artists/delete/{artist_id}/",
            guarded(
                get(delete_artist_form).post(delete_artist),
                state,
                Operation::DeleteArtist,
            ),
        )
        .route(
            "/artists/import_csv/",
            guarded(
                get(import_csv_form).post(import_csv),
                state,
                Operation::ImportArtists,
            )
            .layer(DefaultBodyLimit::max(state.config.max_import_bytes)),
        )
        .route(
            "/artists/export_csv/",
            guarded(get(export_csv), state, Operation::ExportArtists),
        )
}

fn make_song_routes(state: &ServerState) -> Router<ServerState> {
    use song_routes::*;
    Router::new()
        .route(
            "/artists/songs/{artist_id}/",
            guarded(get(list_songs), state, Operation::ListSongs),
        )
        .route(
            "/artists/songs/create/{artist_id}/",
            guarded(
                get(create_song_form).post(create_song),
                state,
                Operation::CreateSong,
            ),
        )
        .route(
            "/artists/songs/update/{artist_id}/{song_id}/",
            guarded(
                get(update_song_form).post(update_song),
                state,
                Operation::UpdateSong,
            ),
        )
        .route(
            "/artists/songs/delete/{artist_id}/{song_id}/",
            guarded(
                get(delete_song_form).post(delete_song),
                state,
                Operation::DeleteSong,
            ),
        )
}

pub fn make_app(config: ServerConfig, store: GuardedStore) -> Result<Router> {
    let state = ServerState::new(config.clone(), store);

    let auth_routes: Router<ServerState> = Router::new()
        .route("/", get(login_page).post(login))
        .route("/login/", get(login_page).post(login))
        .route("/logout/", get(logout))
        .route("/register/", get(register_page).post(register))
        .route("/dashboard/", get(dashboard));

    let mut app: Router = auth_routes
        .merge(make_user_routes(&state))
        .merge(make_artist_routes(&state))
        .merge(make_song_routes(&state))
        .with_state(state.clone());

    if let Some(frontend_path) = config.frontend_dir_path {
        let static_files_service =
            ServeDir::new(frontend_path).append_index_html_on_directories(true);
        app = app.fallback_service(static_files_service);
    }

    app = app.layer(middleware::from_fn_with_state(state.clone(), log_requests));

    Ok(app)
}

pub async fn run_server(config: ServerConfig, host: &str, store: GuardedStore) -> Result<()> {
    let address = format!("{}:{}", host, config.port);
    let app = make_app(config, store)?;

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Listening on {}", address);

    Ok(axum::serve(listener, app).await?)
}
