//! Role guards run in front of every protected handler.

use super::errors::RouteError;
use super::session::resolve_actor;
use super::state::ServerState;
use crate::user::Operation;

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::MethodRouter,
};
use tracing::debug;

#[derive(Clone)]
pub struct GuardState {
    pub server: ServerState,
    pub operation: Operation,
}

/// Authenticates the request and evaluates the operation's guards in order.
/// The handler only runs, and the store is only queried beyond the session
/// lookup, when every guard admits the actor.
pub async fn enforce_guards(
    State(guard): State<GuardState>,
    mut request: Request,
    next: Next,
) -> Response {
    let actor = match resolve_actor(request.headers(), guard.server.store.as_ref()) {
        Ok(Some(actor)) => actor,
        Ok(None) => return RouteError::AuthenticationRequired.into_response(),
        Err(err) => return RouteError::Store(err).into_response(),
    };

    if let Some(index) = guard.operation.first_failing_guard(actor.role) {
        debug!(
            "User {} denied {:?} by guard #{}",
            actor.user_id, guard.operation, index
        );
        return RouteError::AuthorizationDenied.into_response();
    }

    request.extensions_mut().insert(actor);
    next.run(request).await
}

pub fn guarded(
    route: MethodRouter<ServerState>,
    state: &ServerState,
    operation: Operation,
) -> MethodRouter<ServerState> {
    route.route_layer(middleware::from_fn_with_state(
        GuardState {
            server: state.clone(),
            operation,
        },
        enforce_guards,
    ))
}
