use super::errors::{RouteError, RouteResult};
use super::forms::{add_error, FieldErrors, ListParams, UserForm};
use super::state::ServerState;
use super::views::{delete_view, form_view, list_view, user_choices};
use crate::pagination::paginate;
use crate::store::{Mutation, NewUser, StoreError};
use crate::user::auth::hash_password;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
    Form, Json,
};
use tracing::{debug, info};

pub const USERS_PATH: &str = "/users/";
const CREATE_PATH: &str = "/users/create/";
const DUPLICATE_EMAIL: &str = "A user with this email already exists";

fn update_path(user_id: i64) -> String {
    format!("/users/update/{}/", user_id)
}

fn delete_path(user_id: i64) -> String {
    format!("/users/delete/{}/", user_id)
}

fn not_found() -> RouteError {
    RouteError::NotFound(USERS_PATH.to_string())
}

fn invalid_form(action: &str, form: &UserForm, errors: &FieldErrors) -> RouteError {
    RouteError::Validation(form_view("user_form", action, form, errors, user_choices()))
}

fn duplicate_email(action: &str, form: &UserForm) -> RouteError {
    let mut errors = FieldErrors::new();
    add_error(&mut errors, "email", DUPLICATE_EMAIL);
    invalid_form(action, form, &errors)
}

pub async fn list_users(
    State(state): State<ServerState>,
    Query(params): Query<ListParams>,
) -> RouteResult {
    let (page, limit) = params.resolve(state.config.default_page_size)?;
    let total = state.store.count_users()?;
    let info = paginate(total, page, limit, state.config.page_count_mode)?;
    let users = state.store.list_users(info.limit, info.offset)?;
    Ok(Json(list_view("user_list", &users, &info, None)).into_response())
}

pub async fn create_user_form() -> RouteResult {
    Ok(Json(form_view(
        "user_form",
        CREATE_PATH,
        &UserForm::default(),
        &FieldErrors::new(),
        user_choices(),
    ))
    .into_response())
}

pub async fn create_user(
    State(state): State<ServerState>,
    Form(form): Form<UserForm>,
) -> RouteResult {
    let (fields, password) = form
        .parse_new()
        .map_err(|errors| invalid_form(CREATE_PATH, &form, &errors))?;
    let password_hash = hash_password(&password)?;

    match state
        .store
        .create_user(&NewUser::by_admin(fields, password_hash))
    {
        Ok(id) => {
            info!("Created user {}", id);
            Ok(Redirect::to(USERS_PATH).into_response())
        }
        Err(StoreError::Duplicate(_)) => Err(duplicate_email(CREATE_PATH, &form)),
        Err(err) => Err(err.into()),
    }
}

pub async fn update_user_form(
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
) -> RouteResult {
    let user = state.store.get_user(user_id)?.ok_or_else(not_found)?;
    Ok(Json(form_view(
        "user_form",
        &update_path(user_id),
        &UserForm::from_user(&user),
        &FieldErrors::new(),
        user_choices(),
    ))
    .into_response())
}

pub async fn update_user(
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
    Form(form): Form<UserForm>,
) -> RouteResult {
    let action = update_path(user_id);
    let fields = form
        .parse_profile()
        .map_err(|errors| invalid_form(&action, &form, &errors))?;

    match state.store.update_user(user_id, &fields) {
        Ok(Mutation::Applied) => {
            info!("Updated user {}", user_id);
            Ok(Redirect::to(USERS_PATH).into_response())
        }
        Ok(Mutation::NotFound) => Err(not_found()),
        Err(StoreError::Duplicate(_)) => Err(duplicate_email(&action, &form)),
        Err(err) => Err(err.into()),
    }
}

pub async fn delete_user_form(
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
) -> RouteResult {
    let user = state.store.get_user(user_id)?.ok_or_else(not_found)?;
    Ok(Json(delete_view("user_delete", &delete_path(user_id), &user)).into_response())
}

pub async fn delete_user(
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
) -> RouteResult {
    match state.store.delete_user(user_id)? {
        Mutation::Applied => info!("Deleted user {}", user_id),
        Mutation::NotFound => debug!("User {} was already gone", user_id),
    }
    Ok(Redirect::to(USERS_PATH).into_response())
}
