//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/savings/{saving_id}', use [format_endpoint].

/// The route to request a cup of coffee.
pub const COFFEE: &str = "/coffee";
/// The route for the user the bearer token belongs to.
pub const CURRENT_USER: &str = "/api/users/me";
/// The route to list and open savings goals.
pub const SAVINGS: &str = "/api/savings";
/// The route to access a single savings goal.
pub const SAVING: &str = "/api/savings/{saving_id}";
/// The route to list and create contributions.
pub const CONTRIBUTIONS: &str = "/api/contributions";
/// The route to access a single contribution.
pub const CONTRIBUTION: &str = "/api/contributions/{contribution_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/savings/{saving_id}', '{saving_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
