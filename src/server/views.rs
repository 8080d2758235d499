//! JSON view payloads. Every payload names its `view` so a frontend can pick
//! the template to render it with.

use super::forms::FieldErrors;
use super::session::Actor;
use crate::artist_csv::ImportReport;
use crate::pagination::PageInfo;
use crate::store::models::{Artist, Gender, Genre};
use crate::user::{Operation, ALL_OPERATIONS, ALL_ROLES};

use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;

const GENDERS: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];
const GENRES: [Genre; 5] = [
    Genre::Rnb,
    Genre::Country,
    Genre::Classic,
    Genre::Rock,
    Genre::Jazz,
];

pub fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

fn gender_codes() -> Vec<&'static str> {
    GENDERS.iter().map(|g| g.code()).collect()
}

pub fn user_choices() -> Value {
    let roles: Vec<_> = ALL_ROLES.iter().map(|r| r.as_str()).collect();
    json!({ "gender": gender_codes(), "role_type": roles })
}

pub fn artist_choices() -> Value {
    json!({ "gender": gender_codes() })
}

pub fn music_choices() -> Value {
    let genres: Vec<_> = GENRES.iter().map(|g| g.code()).collect();
    json!({ "genre": genres })
}

pub fn list_view<T: Serialize>(
    view: &str,
    items: &[T],
    page: &PageInfo,
    artist: Option<&Artist>,
) -> Value {
    let mut value = json!({ "view": view, "items": items, "page": page });
    if let Some(artist) = artist {
        value["artist"] = json!(artist);
    }
    value
}

/// A create or update form. `values` is what gets shown in the inputs.
pub fn form_view<V: Serialize>(
    view: &str,
    action: &str,
    values: &V,
    errors: &FieldErrors,
    choices: Value,
) -> Value {
    json!({
        "view": view,
        "action": action,
        "values": values,
        "errors": errors,
        "choices": choices,
    })
}

pub fn delete_view<T: Serialize>(view: &str, action: &str, target: &T) -> Value {
    json!({ "view": view, "action": action, "target": target })
}

pub fn login_view(error_message: Option<&str>) -> Value {
    json!({
        "view": "login",
        "action": "/login/",
        "error_message": error_message,
    })
}

pub fn dashboard_view(actor: &Actor, uptime: Duration, hash: &str) -> Value {
    let allowed: Vec<Operation> = ALL_OPERATIONS
        .iter()
        .copied()
        .filter(|op| op.permits(actor.role))
        .collect();
    json!({
        "view": "dashboard",
        "email": actor.email,
        "role_type": actor.role.map(|r| r.as_str()),
        "allowed_operations": allowed,
        "uptime": format_uptime(uptime),
        "hash": hash,
    })
}

pub fn import_form_view() -> Value {
    json!({ "view": "artist_import", "action": "/artists/import_csv/" })
}

pub fn import_view(report: &ImportReport) -> Value {
    json!({
        "view": "artist_import_result",
        "created": report.created,
        "failed_rows": report.failed_rows(),
    })
}
