use super::executor::{execute, DeletionError, StepOutcome};
use super::plan::{plan_for, EntityType};
use crate::media_store::{RecordStore, StoreError};
use crate::server::metrics;
use serde::Serialize;
use std::time::Instant;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionOutcome {
    Deleted,
    AlreadyAbsent,
}

impl DeletionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeletionOutcome::Deleted => "deleted",
            DeletionOutcome::AlreadyAbsent => "already_absent",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionErrorKind {
    /// A row the plan does not cover still references the entity.
    ConstraintViolation,
    /// The database could not be reached. The whole deletion may be retried.
    Connectivity,
    StepFailure,
}

impl DeletionErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeletionErrorKind::ConstraintViolation => "constraint_violation",
            DeletionErrorKind::Connectivity => "connectivity",
            DeletionErrorKind::StepFailure => "step_failure",
        }
    }

    fn of(err: &DeletionError) -> Self {
        if let DeletionError::Begin(_) = err {
            return DeletionErrorKind::Connectivity;
        }
        match err.store_error() {
            StoreError::Connectivity(_) => DeletionErrorKind::Connectivity,
            StoreError::Constraint(_) => DeletionErrorKind::ConstraintViolation,
            StoreError::Statement(_) => DeletionErrorKind::StepFailure,
        }
    }
}

/// Result of one entity deletion, as returned to API clients.
#[derive(Debug, Clone, Serialize)]
pub struct DeletionReport {
    pub success: bool,
    pub entity: EntityType,
    pub key: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<DeletionOutcome>,
    pub rows_affected: Vec<StepOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<DeletionErrorKind>,
    pub message: String,
}

impl DeletionReport {
    pub fn total_rows(&self) -> usize {
        self.rows_affected.iter().map(|s| s.rows_affected).sum()
    }
}

fn capitalized(entity: EntityType) -> String {
    let name = entity.as_str();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Deletes an entity together with every dependent row and reports the result.
pub fn delete_entity<S: RecordStore + ?Sized>(
    store: &S,
    entity: EntityType,
    key: i64,
) -> DeletionReport {
    let start = Instant::now();
    let report = match execute(store, plan_for(entity), key) {
        Ok(steps) => {
            let existed = steps.last().is_some_and(|s| s.rows_affected > 0);
            let outcome = if existed {
                DeletionOutcome::Deleted
            } else {
                DeletionOutcome::AlreadyAbsent
            };
            let message = match outcome {
                DeletionOutcome::Deleted => {
                    format!("{} {} deleted successfully", capitalized(entity), key)
                }
                DeletionOutcome::AlreadyAbsent => {
                    format!("{} {} not found, nothing to delete", capitalized(entity), key)
                }
            };
            DeletionReport {
                success: true,
                entity,
                key,
                outcome: Some(outcome),
                rows_affected: steps,
                error_table: None,
                error_kind: None,
                message,
            }
        }
        Err(err) => {
            let kind = DeletionErrorKind::of(&err);
            DeletionReport {
                success: false,
                entity,
                key,
                outcome: None,
                rows_affected: vec![],
                error_table: err.table().map(str::to_string),
                error_kind: Some(kind),
                message: format!("Failed to delete {}: {}", entity, err),
            }
        }
    };
    let elapsed = start.elapsed();

    if report.success {
        let outcome = report.outcome.unwrap_or(DeletionOutcome::AlreadyAbsent);
        info!(
            "{} ({} rows across {} tables in {:?})",
            report.message,
            report.total_rows(),
            report.rows_affected.len(),
            elapsed
        );
        for step in &report.rows_affected {
            metrics::record_rows_deleted(step.table, step.rows_affected);
        }
        metrics::record_deletion(entity.as_str(), outcome.as_str(), elapsed);
    } else {
        let kind = report.error_kind.unwrap_or(DeletionErrorKind::StepFailure);
        match kind {
            DeletionErrorKind::Connectivity => warn!("{}", report.message),
            _ => error!("{}", report.message),
        }
        metrics::record_deletion(entity.as_str(), "failed", elapsed);
        metrics::record_deletion_failure(entity.as_str(), kind.as_str());
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deletion::test_support::*;
    use crate::media_store::{
        schema::MEDIA_TABLES, MediaStore, SocialStore, SqliteMediaStore, UserStore,
    };
    use std::sync::Arc;
    use std::thread;

    fn assert_no_references(store: &SqliteMediaStore, entity: EntityType, key: i64) {
        for fk in MEDIA_TABLES.iter().flat_map(|t| t.foreign_keys()) {
            if fk.foreign_table == entity.table() {
                assert_eq!(
                    store.count_references(fk.table, fk.column, key).unwrap(),
                    0,
                    "{}.{} still references {} {}",
                    fk.table,
                    fk.column,
                    entity,
                    key
                );
            }
        }
        assert_eq!(
            store
                .count_references(entity.table(), entity.primary_key(), key)
                .unwrap(),
            0
        );
    }

    #[test]
    fn user_scenario_removes_playlists_and_likes() {
        let (store, _temp_dir) = create_tmp_store();
        let fx = seed_catalog(&store);

        let report = delete_entity(&store, EntityType::User, fx.user);

        assert!(report.success, "{}", report.message);
        assert_eq!(report.outcome, Some(DeletionOutcome::Deleted));
        assert_eq!(report.rows_affected.len(), 9);
        assert_eq!(store.count_references("Likes", "user_id", fx.user).unwrap(), 0);
        assert_eq!(store.count_references("Playlists", "user_id", fx.user).unwrap(), 0);
        assert_eq!(
            store
                .count_references("Playlist_Songs", "playlist_id", fx.playlist)
                .unwrap(),
            0
        );
        // Songs are not owned by the user.
        assert_eq!(store.count_references("Songs", "song_id", fx.song_a).unwrap(), 1);
    }

    #[test]
    fn missing_artist_is_an_idempotent_success() {
        let (store, _temp_dir) = create_tmp_store();
        seed_catalog(&store);

        let report = delete_entity(&store, EntityType::Artist, 99);

        assert!(report.success);
        assert_eq!(report.outcome, Some(DeletionOutcome::AlreadyAbsent));
        assert_eq!(report.total_rows(), 0);
        assert_eq!(report.rows_affected.len(), 8);
        assert!(report.error_kind.is_none());
    }

    #[test]
    fn second_delete_finds_nothing() {
        let (store, _temp_dir) = create_tmp_store();
        let fx = seed_catalog(&store);

        let first = delete_entity(&store, EntityType::Album, fx.album);
        assert_eq!(first.outcome, Some(DeletionOutcome::Deleted));

        let second = delete_entity(&store, EntityType::Album, fx.album);
        assert!(second.success);
        assert_eq!(second.outcome, Some(DeletionOutcome::AlreadyAbsent));
        assert!(second.rows_affected.iter().all(|s| s.rows_affected == 0));
    }

    #[test]
    fn every_entity_leaves_no_references() {
        for entity in EntityType::ALL {
            let (store, _temp_dir) = create_tmp_store();
            let fx = seed_catalog(&store);
            let key = match entity {
                EntityType::User => fx.user,
                EntityType::Artist => fx.artist,
                EntityType::Album => fx.album,
                EntityType::Playlist => fx.playlist,
                EntityType::Song => fx.song_a,
            };

            let report = delete_entity(&store, entity, key);

            assert!(report.success, "{}: {}", entity, report.message);
            assert_eq!(report.outcome, Some(DeletionOutcome::Deleted));
            assert_no_references(&store, entity, key);
        }
    }

    #[test]
    fn follows_are_removed_in_both_directions() {
        let (store, _temp_dir) = create_tmp_store();
        let fx = seed_catalog(&store);
        store.add_follow(fx.guest_user, fx.user).unwrap();

        let report = delete_entity(&store, EntityType::User, fx.guest_user);
        assert!(report.success);

        let follows = report
            .rows_affected
            .iter()
            .find(|s| s.table == "Follows")
            .unwrap();
        assert_eq!(follows.rows_affected, 2);
        assert!(store.list_followers(fx.user).unwrap().is_empty());
        assert!(store.list_following(fx.user).unwrap().is_empty());
    }

    #[test]
    fn forced_failure_keeps_every_row() {
        let (store, _temp_dir) = create_tmp_store();
        let fx = seed_catalog(&store);
        block_deletes_on(&store, "Reports");

        let report = delete_entity(&store, EntityType::User, fx.user);

        assert!(!report.success);
        assert!(report.outcome.is_none());
        assert!(report.rows_affected.is_empty());
        assert_eq!(report.error_table.as_deref(), Some("Reports"));
        assert_eq!(
            report.error_kind,
            Some(DeletionErrorKind::ConstraintViolation)
        );
        assert!(report.message.contains("Reports rows are locked"), "{}", report.message);

        for (table, column) in [
            ("Likes", "user_id"),
            ("Follows", "follower_id"),
            ("Activity_Feed", "user_id"),
            ("Playlists", "user_id"),
            ("Comments", "user_id"),
            ("Users", "user_id"),
        ] {
            assert!(
                store.count_references(table, column, fx.user).unwrap() >= 1,
                "{} lost rows",
                table
            );
        }
        assert_eq!(
            store
                .count_references("Playlist_Songs", "playlist_id", fx.playlist)
                .unwrap(),
            2
        );
    }

    #[test]
    fn unreachable_store_reports_connectivity() {
        let report = delete_entity(&UnavailableStore, EntityType::Song, 5);

        assert!(!report.success);
        assert_eq!(report.error_kind, Some(DeletionErrorKind::Connectivity));
        assert!(report.error_table.is_none());
        assert!(report.message.contains("database is offline"));
    }

    #[test]
    fn uncovered_reference_is_a_constraint_violation() {
        let (store, _temp_dir) = create_tmp_store();
        let fx = seed_catalog(&store);

        // A table outside the schema that points at Songs.
        let mut tx = store.begin_transaction().unwrap();
        tx.execute(
            "CREATE TABLE Lyrics (song_id INTEGER NOT NULL REFERENCES Songs(song_id))",
            &[],
        )
        .unwrap();
        tx.execute(
            "INSERT INTO Lyrics (song_id) VALUES (?1)",
            &[rusqlite::types::Value::Integer(fx.song_b)],
        )
        .unwrap();
        tx.commit().unwrap();

        let report = delete_entity(&store, EntityType::Song, fx.song_b);

        assert!(!report.success);
        assert_eq!(report.error_table.as_deref(), Some("Songs"));
        assert_eq!(
            report.error_kind,
            Some(DeletionErrorKind::ConstraintViolation)
        );
        assert_eq!(store.count_references("Songs", "song_id", fx.song_b).unwrap(), 1);
    }

    #[test]
    fn concurrent_deletes_match_sequential_result() {
        let (sequential, _seq_dir) = create_tmp_store();
        let seq_fx = seed_catalog(&sequential);
        assert!(delete_entity(&sequential, EntityType::User, seq_fx.user).success);
        assert!(delete_entity(&sequential, EntityType::User, seq_fx.guest_user).success);

        let (concurrent, _con_dir) = create_tmp_store();
        let con_fx = seed_catalog(&concurrent);
        let concurrent = Arc::new(concurrent);
        let handles: Vec<_> = [con_fx.user, con_fx.guest_user]
            .into_iter()
            .map(|key| {
                let store = concurrent.clone();
                thread::spawn(move || delete_entity(store.as_ref(), EntityType::User, key))
            })
            .collect();
        for handle in handles {
            let report = handle.join().unwrap();
            assert!(report.success, "{}", report.message);
        }

        for fk in MEDIA_TABLES.iter().flat_map(|t| t.foreign_keys()) {
            for key in [seq_fx.user, seq_fx.guest_user] {
                assert_eq!(
                    sequential.count_references(fk.table, fk.column, key).unwrap(),
                    concurrent.count_references(fk.table, fk.column, key).unwrap(),
                    "{}.{}",
                    fk.table,
                    fk.column
                );
            }
        }
        assert!(concurrent.list_users().unwrap().is_empty());
        assert!(sequential.list_users().unwrap().is_empty());
    }

    #[test]
    fn report_serializes_snake_case() {
        let (store, _temp_dir) = create_tmp_store();
        let report = delete_entity(&store, EntityType::Playlist, 10);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["entity"], "playlist");
        assert_eq!(json["outcome"], "already_absent");
        assert_eq!(json["rows_affected"][0]["table"], "Playlist_Songs");
        assert!(json.get("error_kind").is_none());
    }
}
