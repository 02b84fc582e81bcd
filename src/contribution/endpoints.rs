//! HTTP handlers for contributions.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    contribution::{
        Contribution, ContributionId, CreateContributionForm, UpdateContributionForm,
        create_contribution, delete_contribution, edit_contribution, list_contributions,
        view_contribution,
    },
    db::lock_connection,
    extract::{JsonBody, PathParam},
    identity::{ApiTokenResolver, Credential},
};

/// The state needed by the contribution endpoints.
#[derive(Debug, Clone)]
pub struct ContributionEndpointState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Resolves bearer credentials to users.
    pub identity_resolver: ApiTokenResolver,
}

impl FromRef<AppState> for ContributionEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            identity_resolver: state.identity_resolver,
        }
    }
}

/// Contribute to one of the caller's goals.
pub async fn create_contribution_endpoint(
    credential: Credential,
    State(state): State<ContributionEndpointState>,
    JsonBody(form): JsonBody<CreateContributionForm>,
) -> Result<(StatusCode, Json<Contribution>), Error> {
    let connection = lock_connection(&state.db_connection)?;

    let contribution = create_contribution(
        form.saving_id,
        form.value,
        credential.as_ref(),
        &state.identity_resolver,
        &connection,
    )?;

    Ok((StatusCode::CREATED, Json(contribution)))
}

/// List the caller's contributions.
pub async fn get_contributions_endpoint(
    State(state): State<ContributionEndpointState>,
    credential: Credential,
) -> Result<Json<Vec<Contribution>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    list_contributions(credential.as_ref(), &state.identity_resolver, &connection).map(Json)
}

/// Get a single contribution.
pub async fn get_contribution_endpoint(
    credential: Credential,
    PathParam(contribution_id): PathParam<ContributionId>,
    State(state): State<ContributionEndpointState>,
) -> Result<Json<Contribution>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    view_contribution(
        contribution_id,
        credential.as_ref(),
        &state.identity_resolver,
        &connection,
    )
    .map(Json)
}

/// Change the amount of a contribution.
pub async fn update_contribution_endpoint(
    credential: Credential,
    PathParam(contribution_id): PathParam<ContributionId>,
    State(state): State<ContributionEndpointState>,
    JsonBody(form): JsonBody<UpdateContributionForm>,
) -> Result<Json<Contribution>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    edit_contribution(
        contribution_id,
        form.value,
        credential.as_ref(),
        &state.identity_resolver,
        &connection,
    )
    .map(Json)
}

/// Delete a contribution, taking its amount back out of the goal.
pub async fn delete_contribution_endpoint(
    credential: Credential,
    PathParam(contribution_id): PathParam<ContributionId>,
    State(state): State<ContributionEndpointState>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_contribution(
        contribution_id,
        credential.as_ref(),
        &state.identity_resolver,
        &connection,
    )?;

    Ok(StatusCode::NO_CONTENT)
}
