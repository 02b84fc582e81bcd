//! Savings goals: what a user is saving towards and how far along they are.

mod core;
mod db;
mod domain;
mod endpoints;

pub use core::{
    create_savings_goal, delete_savings_goal, list_goals, update_savings_goal, view_goal,
};
pub use db::{
    adjust_accumulated_value, create_goal_table, get_goal, get_goals, insert_goal,
    set_goal_status, soft_delete_goal, update_goal_details,
};
pub use domain::{
    CreateGoalForm, GoalId, GoalName, GoalStatus, SavingsGoal, TargetValue, Transition,
    UpdateGoalForm, evaluate_threshold,
};
pub use endpoints::{
    GoalEndpointState, create_goal_endpoint, delete_goal_endpoint, get_goal_endpoint,
    get_goals_endpoint, update_goal_endpoint,
};

pub(crate) use db::map_goal_columns;
