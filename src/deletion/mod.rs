//! Cascading deletion of users, artists, albums, playlists and songs.

mod executor;
mod plan;
mod report;

#[cfg(test)]
pub(crate) mod test_support;

pub use executor::{execute, DeletionError, StepOutcome, MAX_BOUND_IDS};
pub use plan::{
    plan_for, verify_plan, verify_plans, DeleteStep, DependencyPlan, EntityType, Predicate,
};
pub use report::{delete_entity, DeletionErrorKind, DeletionOutcome, DeletionReport};
