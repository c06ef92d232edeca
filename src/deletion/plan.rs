//! Static cascade-delete plans, one per entity type.
//!
//! The database declares every foreign key as `ON DELETE NO ACTION`, so these
//! plans are the only cascade mechanism. Each plan lists its steps in an order
//! where no step removes a row that is still referenced by a live foreign key.

use crate::sqlite_persistence::Table;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    User,
    Artist,
    Album,
    Playlist,
    Song,
}

impl EntityType {
    pub const ALL: [EntityType; 5] = [
        EntityType::User,
        EntityType::Artist,
        EntityType::Album,
        EntityType::Playlist,
        EntityType::Song,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::User => "user",
            EntityType::Artist => "artist",
            EntityType::Album => "album",
            EntityType::Playlist => "playlist",
            EntityType::Song => "song",
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            EntityType::User => "Users",
            EntityType::Artist => "Artists",
            EntityType::Album => "Albums",
            EntityType::Playlist => "Playlists",
            EntityType::Song => "Songs",
        }
    }

    pub fn primary_key(&self) -> &'static str {
        match self {
            EntityType::User => "user_id",
            EntityType::Artist => "artist_id",
            EntityType::Album => "album_id",
            EntityType::Playlist => "playlist_id",
            EntityType::Song => "song_id",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(EntityType::User),
            "artist" => Ok(EntityType::Artist),
            "album" => Ok(EntityType::Album),
            "playlist" => Ok(EntityType::Playlist),
            "song" => Ok(EntityType::Song),
            other => bail!("Unknown entity type '{}'", other),
        }
    }
}

/// One disjunct of a step filter. `?1` in a key-set query is bound to the
/// key being deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    /// `column = key`
    Equals(&'static str),
    /// `column IN (ids returned by key_set)`, resolved right before the step runs.
    InKeySet {
        column: &'static str,
        key_set: &'static str,
    },
}

impl Predicate {
    pub fn column(&self) -> &'static str {
        match self {
            Predicate::Equals(column) => *column,
            Predicate::InKeySet { column, .. } => *column,
        }
    }
}

/// Deletes the rows of `table` matching any predicate of `filter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteStep {
    pub table: &'static str,
    pub filter: &'static [Predicate],
}

#[derive(Debug, Clone, Copy)]
pub struct DependencyPlan {
    pub entity: EntityType,
    pub steps: &'static [DeleteStep],
}

const USER_PLAYLISTS: &str = "SELECT playlist_id FROM Playlists WHERE user_id = ?1";

const ARTIST_ALBUMS: &str = "SELECT album_id FROM Albums WHERE artist_id = ?1";

const ARTIST_SONGS: &str = "SELECT song_id FROM Songs WHERE artist_id = ?1 \
     OR album_id IN (SELECT album_id FROM Albums WHERE artist_id = ?1)";

const ALBUM_SONGS: &str = "SELECT song_id FROM Songs WHERE album_id = ?1";

static USER_PLAN: DependencyPlan = DependencyPlan {
    entity: EntityType::User,
    steps: &[
        DeleteStep {
            table: "Likes",
            filter: &[Predicate::Equals("user_id")],
        },
        DeleteStep {
            table: "Follows",
            filter: &[
                Predicate::Equals("follower_id"),
                Predicate::Equals("followed_id"),
            ],
        },
        DeleteStep {
            table: "Activity_Feed",
            filter: &[Predicate::Equals("user_id")],
        },
        DeleteStep {
            table: "Playlist_Songs",
            filter: &[Predicate::InKeySet {
                column: "playlist_id",
                key_set: USER_PLAYLISTS,
            }],
        },
        DeleteStep {
            table: "Playlists",
            filter: &[Predicate::Equals("user_id")],
        },
        DeleteStep {
            table: "Comments",
            filter: &[Predicate::Equals("user_id")],
        },
        DeleteStep {
            table: "Notifications",
            filter: &[Predicate::Equals("user_id")],
        },
        DeleteStep {
            table: "Reports",
            filter: &[Predicate::Equals("user_id")],
        },
        DeleteStep {
            table: "Users",
            filter: &[Predicate::Equals("user_id")],
        },
    ],
};

static ARTIST_PLAN: DependencyPlan = DependencyPlan {
    entity: EntityType::Artist,
    steps: &[
        DeleteStep {
            table: "Playlist_Songs",
            filter: &[Predicate::InKeySet {
                column: "song_id",
                key_set: ARTIST_SONGS,
            }],
        },
        DeleteStep {
            table: "Contribution_Song_Table",
            filter: &[Predicate::InKeySet {
                column: "song_id",
                key_set: ARTIST_SONGS,
            }],
        },
        DeleteStep {
            table: "Songs",
            filter: &[
                Predicate::Equals("artist_id"),
                Predicate::InKeySet {
                    column: "album_id",
                    key_set: ARTIST_ALBUMS,
                },
            ],
        },
        DeleteStep {
            table: "Contribution_Album_Table",
            filter: &[Predicate::InKeySet {
                column: "album_id",
                key_set: ARTIST_ALBUMS,
            }],
        },
        DeleteStep {
            table: "Albums",
            filter: &[Predicate::Equals("artist_id")],
        },
        DeleteStep {
            table: "Contribution_Album_Table",
            filter: &[Predicate::Equals("artist_id")],
        },
        DeleteStep {
            table: "Contribution_Song_Table",
            filter: &[Predicate::Equals("artist_id")],
        },
        DeleteStep {
            table: "Artists",
            filter: &[Predicate::Equals("artist_id")],
        },
    ],
};

static ALBUM_PLAN: DependencyPlan = DependencyPlan {
    entity: EntityType::Album,
    steps: &[
        DeleteStep {
            table: "Playlist_Songs",
            filter: &[Predicate::InKeySet {
                column: "song_id",
                key_set: ALBUM_SONGS,
            }],
        },
        DeleteStep {
            table: "Contribution_Song_Table",
            filter: &[Predicate::InKeySet {
                column: "song_id",
                key_set: ALBUM_SONGS,
            }],
        },
        DeleteStep {
            table: "Songs",
            filter: &[Predicate::Equals("album_id")],
        },
        DeleteStep {
            table: "Contribution_Album_Table",
            filter: &[Predicate::Equals("album_id")],
        },
        DeleteStep {
            table: "Albums",
            filter: &[Predicate::Equals("album_id")],
        },
    ],
};

static PLAYLIST_PLAN: DependencyPlan = DependencyPlan {
    entity: EntityType::Playlist,
    steps: &[
        DeleteStep {
            table: "Playlist_Songs",
            filter: &[Predicate::Equals("playlist_id")],
        },
        DeleteStep {
            table: "Playlists",
            filter: &[Predicate::Equals("playlist_id")],
        },
    ],
};

static SONG_PLAN: DependencyPlan = DependencyPlan {
    entity: EntityType::Song,
    steps: &[
        DeleteStep {
            table: "Playlist_Songs",
            filter: &[Predicate::Equals("song_id")],
        },
        DeleteStep {
            table: "Contribution_Song_Table",
            filter: &[Predicate::Equals("song_id")],
        },
        DeleteStep {
            table: "Songs",
            filter: &[Predicate::Equals("song_id")],
        },
    ],
};

pub fn plan_for(entity: EntityType) -> &'static DependencyPlan {
    match entity {
        EntityType::User => &USER_PLAN,
        EntityType::Artist => &ARTIST_PLAN,
        EntityType::Album => &ALBUM_PLAN,
        EntityType::Playlist => &PLAYLIST_PLAN,
        EntityType::Song => &SONG_PLAN,
    }
}

/// Checks one plan against the declared schema.
///
/// Every foreign key pointing at a table purged by a step must be covered by an
/// earlier step on the referencing table and column. The last step must delete
/// the entity's own row by primary key.
pub fn verify_plan(plan: &DependencyPlan, tables: &[Table]) -> Result<()> {
    let entity = plan.entity;
    let Some(last) = plan.steps.last() else {
        bail!("Plan for {} has no steps", entity);
    };
    if last.table != entity.table() || last.filter != [Predicate::Equals(entity.primary_key())] {
        bail!(
            "Plan for {} must end by deleting from {} on {}",
            entity,
            entity.table(),
            entity.primary_key()
        );
    }

    for (index, step) in plan.steps.iter().enumerate() {
        let Some(table) = tables.iter().find(|t| t.name == step.table) else {
            bail!("Plan for {} deletes from unknown table {}", entity, step.table);
        };
        for predicate in step.filter {
            if !table.columns.iter().any(|c| c.name == predicate.column()) {
                bail!(
                    "Plan for {} filters {} on unknown column {}",
                    entity,
                    step.table,
                    predicate.column()
                );
            }
        }

        let referencing = tables
            .iter()
            .flat_map(|t| t.foreign_keys())
            .filter(|fk| fk.foreign_table == step.table && fk.table != step.table);
        for fk in referencing {
            let covered = plan.steps[..index].iter().any(|earlier| {
                earlier.table == fk.table && earlier.filter.iter().any(|p| p.column() == fk.column)
            });
            if !covered {
                bail!(
                    "Plan for {} deletes from {} before clearing {}.{}",
                    entity,
                    step.table,
                    fk.table,
                    fk.column
                );
            }
        }
    }
    Ok(())
}

/// Runs [`verify_plan`] for every entity type.
pub fn verify_plans(tables: &[Table]) -> Result<()> {
    for entity in EntityType::ALL {
        verify_plan(plan_for(entity), tables)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media_store::schema::MEDIA_TABLES;

    #[test]
    fn every_plan_matches_schema() {
        verify_plans(MEDIA_TABLES).unwrap();
    }

    #[test]
    fn plans_end_with_their_own_table() {
        for entity in EntityType::ALL {
            let plan = plan_for(entity);
            assert_eq!(plan.entity, entity);
            assert_eq!(plan.steps.last().unwrap().table, entity.table());
        }
    }

    #[test]
    fn rejects_reordered_plan() {
        const REORDERED: DependencyPlan = DependencyPlan {
            entity: EntityType::Song,
            steps: &[
                DeleteStep {
                    table: "Playlist_Songs",
                    filter: &[Predicate::Equals("song_id")],
                },
                DeleteStep {
                    table: "Songs",
                    filter: &[Predicate::Equals("song_id")],
                },
                DeleteStep {
                    table: "Contribution_Song_Table",
                    filter: &[Predicate::Equals("song_id")],
                },
                DeleteStep {
                    table: "Songs",
                    filter: &[Predicate::Equals("song_id")],
                },
            ],
        };
        let err = verify_plan(&REORDERED, MEDIA_TABLES).unwrap_err().to_string();
        assert!(err.contains("Contribution_Song_Table.song_id"), "{}", err);
    }

    #[test]
    fn rejects_plan_missing_a_dependent() {
        const MISSING_REPORTS: DependencyPlan = DependencyPlan {
            entity: EntityType::User,
            steps: &[
                DeleteStep {
                    table: "Likes",
                    filter: &[Predicate::Equals("user_id")],
                },
                DeleteStep {
                    table: "Users",
                    filter: &[Predicate::Equals("user_id")],
                },
            ],
        };
        assert!(verify_plan(&MISSING_REPORTS, MEDIA_TABLES).is_err());
    }

    #[test]
    fn rejects_plan_not_ending_on_entity() {
        const WRONG_TAIL: DependencyPlan = DependencyPlan {
            entity: EntityType::Playlist,
            steps: &[
                DeleteStep {
                    table: "Playlists",
                    filter: &[Predicate::Equals("playlist_id")],
                },
                DeleteStep {
                    table: "Playlist_Songs",
                    filter: &[Predicate::Equals("playlist_id")],
                },
            ],
        };
        let err = verify_plan(&WRONG_TAIL, MEDIA_TABLES).unwrap_err().to_string();
        assert!(err.contains("must end"), "{}", err);
    }

    #[test]
    fn parses_entity_names() {
        for entity in EntityType::ALL {
            assert_eq!(entity.as_str().parse::<EntityType>().unwrap(), entity);
        }
        assert!("genre".parse::<EntityType>().is_err());
    }
}
