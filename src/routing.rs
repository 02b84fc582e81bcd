//! Application router configuration.

use axum::{
    Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::{
    AppState, Error,
    contribution::{
        create_contribution_endpoint, delete_contribution_endpoint, get_contribution_endpoint,
        get_contributions_endpoint, update_contribution_endpoint,
    },
    current_user::get_current_user,
    endpoints,
    goal::{
        create_goal_endpoint, delete_goal_endpoint, get_goal_endpoint, get_goals_endpoint,
        update_goal_endpoint,
    },
    logging::logging_middleware,
};

/// Return a router with all the app's routes.
///
/// Every route under `/api` expects an `Authorization: Bearer <token>` header.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route(endpoints::CURRENT_USER, get(get_current_user))
        .route(
            endpoints::SAVINGS,
            get(get_goals_endpoint).post(create_goal_endpoint),
        )
        .route(
            endpoints::SAVING,
            get(get_goal_endpoint)
                .put(update_goal_endpoint)
                .delete(delete_goal_endpoint),
        )
        .route(
            endpoints::CONTRIBUTIONS,
            get(get_contributions_endpoint).post(create_contribution_endpoint),
        )
        .route(
            endpoints::CONTRIBUTION,
            get(get_contribution_endpoint)
                .put(update_contribution_endpoint)
                .delete(delete_contribution_endpoint),
        );

    Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .merge(api_routes)
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, "I'm a teapot").into_response()
}

async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}
