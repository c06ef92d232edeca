use super::plan::{DeleteStep, DependencyPlan, Predicate};
use crate::media_store::{RecordStore, RecordTransaction, StoreError};
use rusqlite::types::Value;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Maximum number of derived ids bound into a single statement.
pub const MAX_BOUND_IDS: usize = 500;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StepOutcome {
    pub table: &'static str,
    pub rows_affected: usize,
}

#[derive(Debug, Error)]
pub enum DeletionError {
    #[error("Failed to begin transaction: {0}")]
    Begin(StoreError),

    #[error("Failed to delete from {table}: {source}")]
    Step {
        table: &'static str,
        source: StoreError,
    },

    #[error("Failed to commit: {0}")]
    Commit(StoreError),
}

impl DeletionError {
    pub fn store_error(&self) -> &StoreError {
        match self {
            DeletionError::Begin(err) => err,
            DeletionError::Step { source, .. } => source,
            DeletionError::Commit(err) => err,
        }
    }

    pub fn table(&self) -> Option<&'static str> {
        match self {
            DeletionError::Step { table, .. } => Some(*table),
            _ => None,
        }
    }
}

/// Runs every step of `plan` for `key` inside one transaction.
///
/// Either all steps succeed and the transaction commits, or the first failing
/// step aborts the run and nothing is kept.
pub fn execute<S: RecordStore + ?Sized>(
    store: &S,
    plan: &DependencyPlan,
    key: i64,
) -> Result<Vec<StepOutcome>, DeletionError> {
    let mut tx = store.begin_transaction().map_err(DeletionError::Begin)?;

    let mut outcomes = Vec::with_capacity(plan.steps.len());
    for step in plan.steps {
        match run_step(tx.as_mut(), step, key) {
            Ok(rows_affected) => {
                debug!(
                    "Deleted {} rows from {} for {} {}",
                    rows_affected, step.table, plan.entity, key
                );
                outcomes.push(StepOutcome {
                    table: step.table,
                    rows_affected,
                });
            }
            Err(source) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!(
                        "Rollback after failed step on {} failed: {}",
                        step.table, rollback_err
                    );
                }
                return Err(DeletionError::Step {
                    table: step.table,
                    source,
                });
            }
        }
    }

    tx.commit().map_err(DeletionError::Commit)?;
    Ok(outcomes)
}

fn run_step(
    tx: &mut (dyn RecordTransaction + '_),
    step: &DeleteStep,
    key: i64,
) -> Result<usize, StoreError> {
    let mut resolved: Vec<(&'static str, Option<Vec<i64>>)> = Vec::with_capacity(step.filter.len());
    for predicate in step.filter {
        match predicate {
            Predicate::Equals(column) => resolved.push((*column, None)),
            Predicate::InKeySet { column, key_set } => {
                resolved.push((*column, Some(resolve_key_set(tx, key_set, key)?)));
            }
        }
    }

    // Long id lists are split over several statements. Rows removed by an
    // earlier statement no longer match, so the counts add up.
    let statements = resolved
        .iter()
        .filter_map(|(_, ids)| ids.as_ref())
        .map(|ids| ids.len().div_ceil(MAX_BOUND_IDS))
        .max()
        .unwrap_or(0)
        .max(1);

    let mut total = 0;
    for chunk_index in 0..statements {
        let mut clauses = Vec::new();
        let mut params = Vec::new();
        for (column, ids) in &resolved {
            match ids {
                None => {
                    params.push(Value::Integer(key));
                    clauses.push(format!("{} = ?{}", column, params.len()));
                }
                Some(ids) => {
                    let Some(chunk) = ids.chunks(MAX_BOUND_IDS).nth(chunk_index) else {
                        continue;
                    };
                    let placeholders: Vec<String> = chunk
                        .iter()
                        .map(|id| {
                            params.push(Value::Integer(*id));
                            format!("?{}", params.len())
                        })
                        .collect();
                    clauses.push(format!("{} IN ({})", column, placeholders.join(", ")));
                }
            }
        }
        if clauses.is_empty() {
            continue;
        }
        let sql = format!("DELETE FROM {} WHERE {}", step.table, clauses.join(" OR "));
        total += tx.execute(&sql, &params)?;
    }
    Ok(total)
}

fn resolve_key_set(
    tx: &mut (dyn RecordTransaction + '_),
    key_set: &str,
    key: i64,
) -> Result<Vec<i64>, StoreError> {
    let mut ids: Vec<i64> = tx
        .query(key_set, &[Value::Integer(key)])?
        .into_iter()
        .filter_map(|row| match row.first() {
            Some(Value::Integer(id)) => Some(*id),
            _ => None,
        })
        .collect();
    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}
