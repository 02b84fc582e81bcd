//! HTTP handlers for savings goals.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    db::lock_connection,
    extract::{JsonBody, PathParam},
    goal::{
        CreateGoalForm, GoalId, SavingsGoal, UpdateGoalForm,
        create_savings_goal, delete_savings_goal, list_goals, update_savings_goal, view_goal,
    },
    identity::{ApiTokenResolver, Credential},
};

/// The state needed by the goal endpoints.
#[derive(Debug, Clone)]
pub struct GoalEndpointState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Resolves bearer credentials to users.
    pub identity_resolver: ApiTokenResolver,
}

impl FromRef<AppState> for GoalEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            identity_resolver: state.identity_resolver,
        }
    }
}

/// Open a new goal.
pub async fn create_goal_endpoint(
    credential: Credential,
    State(state): State<GoalEndpointState>,
    JsonBody(form): JsonBody<CreateGoalForm>,
) -> Result<(StatusCode, Json<SavingsGoal>), Error> {
    let connection = lock_connection(&state.db_connection)?;

    let goal = create_savings_goal(
        &form.name,
        form.goal,
        form.value,
        credential.as_ref(),
        &state.identity_resolver,
        &connection,
    )?;

    Ok((StatusCode::CREATED, Json(goal)))
}

/// List the caller's goals.
pub async fn get_goals_endpoint(
    State(state): State<GoalEndpointState>,
    credential: Credential,
) -> Result<Json<Vec<SavingsGoal>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    list_goals(credential.as_ref(), &state.identity_resolver, &connection).map(Json)
}

/// Get a single goal.
pub async fn get_goal_endpoint(
    credential: Credential,
    PathParam(goal_id): PathParam<GoalId>,
    State(state): State<GoalEndpointState>,
) -> Result<Json<SavingsGoal>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    view_goal(goal_id, credential.as_ref(), &state.identity_resolver, &connection).map(Json)
}

/// Rename a goal or change its target.
pub async fn update_goal_endpoint(
    credential: Credential,
    PathParam(goal_id): PathParam<GoalId>,
    State(state): State<GoalEndpointState>,
    JsonBody(form): JsonBody<UpdateGoalForm>,
) -> Result<Json<SavingsGoal>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    update_savings_goal(
        goal_id,
        &form.name,
        form.goal,
        credential.as_ref(),
        &state.identity_resolver,
        &connection,
    )
    .map(Json)
}

/// Delete a goal and its contributions.
pub async fn delete_goal_endpoint(
    credential: Credential,
    PathParam(goal_id): PathParam<GoalId>,
    State(state): State<GoalEndpointState>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_savings_goal(goal_id, credential.as_ref(), &state.identity_resolver, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
