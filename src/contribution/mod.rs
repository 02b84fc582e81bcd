//! Contributions to savings goals and the ledger that keeps goals and exp consistent with them.

mod db;
mod domain;
mod endpoints;
mod ledger;
mod query;

pub use db::{
    create_contribution_table, get_contribution, get_contributions, get_goal_contributions,
    insert_contribution, soft_delete_contribution, sum_goal_contributions, update_contribution,
};
pub use domain::{
    Amount, Contribution, ContributionId, CreateContributionForm, UpdateContributionForm,
};
pub use endpoints::{
    ContributionEndpointState, create_contribution_endpoint, delete_contribution_endpoint,
    get_contribution_endpoint, get_contributions_endpoint, update_contribution_endpoint,
};
pub use ledger::{create_contribution, delete_contribution, edit_contribution};
pub use query::{list_contributions, view_contribution};

pub(crate) use ledger::{record_contribution, settle_goal_status};
