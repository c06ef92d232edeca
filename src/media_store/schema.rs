use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP,
};

const USERS_TABLE: Table = Table {
    name: "Users",
    columns: &[
        sqlite_column!("user_id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("username", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("email", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("password_hash", &SqlType::Text, non_null = true),
        sqlite_column!("profile_picture", &SqlType::Text),
        sqlite_column!("bio", &SqlType::Text),
        sqlite_column!(
            "permission",
            &SqlType::Text,
            non_null = true,
            default_value = Some("'user'")
        ),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[],
    unique_constraints: &[],
};

const ARTISTS_TABLE: Table = Table {
    name: "Artists",
    columns: &[
        sqlite_column!("artist_id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("bio", &SqlType::Text),
        sqlite_column!("image_url", &SqlType::Text),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!(
            "updated_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[],
    unique_constraints: &[],
};

const ALBUMS_TABLE: Table = Table {
    name: "Albums",
    columns: &[
        sqlite_column!("album_id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!(
            "artist_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "Artists",
                foreign_column: "artist_id",
                on_delete: ForeignKeyOnChange::NoAction,
            })
        ),
        sqlite_column!("release_date", &SqlType::Text),
        sqlite_column!("cover_image_url", &SqlType::Text),
    ],
    indices: &[("idx_albums_artist_id", "artist_id")],
    unique_constraints: &[],
};

const SONGS_TABLE: Table = Table {
    name: "Songs",
    columns: &[
        sqlite_column!("song_id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!(
            "artist_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "Artists",
                foreign_column: "artist_id",
                on_delete: ForeignKeyOnChange::NoAction,
            })
        ),
        sqlite_column!(
            "album_id",
            &SqlType::Integer,
            foreign_key = Some(&ForeignKey {
                foreign_table: "Albums",
                foreign_column: "album_id",
                on_delete: ForeignKeyOnChange::NoAction,
            })
        ),
        sqlite_column!("genre_id", &SqlType::Integer),
        sqlite_column!("release_date", &SqlType::Text),
        sqlite_column!("duration", &SqlType::Integer),
    ],
    indices: &[
        ("idx_songs_artist_id", "artist_id"),
        ("idx_songs_album_id", "album_id"),
    ],
    unique_constraints: &[],
};

const PLAYLISTS_TABLE: Table = Table {
    name: "Playlists",
    columns: &[
        sqlite_column!("playlist_id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "Users",
                foreign_column: "user_id",
                on_delete: ForeignKeyOnChange::NoAction,
            })
        ),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!(
            "is_public",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("1")
        ),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!(
            "updated_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_playlists_user_id", "user_id")],
    unique_constraints: &[],
};

const PLAYLIST_SONGS_TABLE: Table = Table {
    name: "Playlist_Songs",
    columns: &[
        sqlite_column!(
            "playlist_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "Playlists",
                foreign_column: "playlist_id",
                on_delete: ForeignKeyOnChange::NoAction,
            })
        ),
        sqlite_column!(
            "song_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "Songs",
                foreign_column: "song_id",
                on_delete: ForeignKeyOnChange::NoAction,
            })
        ),
        sqlite_column!("position", &SqlType::Integer, non_null = true),
        sqlite_column!(
            "added_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_playlist_songs_song_id", "song_id")],
    unique_constraints: &[&["playlist_id", "song_id"]],
};

const CONTRIBUTION_ALBUM_TABLE: Table = Table {
    name: "Contribution_Album_Table",
    columns: &[
        sqlite_column!(
            "album_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "Albums",
                foreign_column: "album_id",
                on_delete: ForeignKeyOnChange::NoAction,
            })
        ),
        sqlite_column!(
            "artist_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "Artists",
                foreign_column: "artist_id",
                on_delete: ForeignKeyOnChange::NoAction,
            })
        ),
        sqlite_column!("role", &SqlType::Text),
    ],
    indices: &[("idx_contribution_album_artist_id", "artist_id")],
    unique_constraints: &[&["album_id", "artist_id"]],
};

const CONTRIBUTION_SONG_TABLE: Table = Table {
    name: "Contribution_Song_Table",
    columns: &[
        sqlite_column!(
            "song_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "Songs",
                foreign_column: "song_id",
                on_delete: ForeignKeyOnChange::NoAction,
            })
        ),
        sqlite_column!(
            "artist_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "Artists",
                foreign_column: "artist_id",
                on_delete: ForeignKeyOnChange::NoAction,
            })
        ),
        sqlite_column!("role", &SqlType::Text),
    ],
    indices: &[("idx_contribution_song_artist_id", "artist_id")],
    unique_constraints: &[&["song_id", "artist_id"]],
};

const LIKES_TABLE: Table = Table {
    name: "Likes",
    columns: &[
        sqlite_column!("like_id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "Users",
                foreign_column: "user_id",
                on_delete: ForeignKeyOnChange::NoAction,
            })
        ),
        sqlite_column!("content_type", &SqlType::Text, non_null = true),
        sqlite_column!("content_id", &SqlType::Integer, non_null = true),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[],
    unique_constraints: &[&["user_id", "content_type", "content_id"]],
};

const FOLLOWS_TABLE: Table = Table {
    name: "Follows",
    columns: &[
        sqlite_column!(
            "follower_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "Users",
                foreign_column: "user_id",
                on_delete: ForeignKeyOnChange::NoAction,
            })
        ),
        sqlite_column!(
            "followed_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "Users",
                foreign_column: "user_id",
                on_delete: ForeignKeyOnChange::NoAction,
            })
        ),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_follows_followed_id", "followed_id")],
    unique_constraints: &[&["follower_id", "followed_id"]],
};

const ACTIVITY_FEED_TABLE: Table = Table {
    name: "Activity_Feed",
    columns: &[
        sqlite_column!("activity_id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "Users",
                foreign_column: "user_id",
                on_delete: ForeignKeyOnChange::NoAction,
            })
        ),
        sqlite_column!("activity_type", &SqlType::Text, non_null = true),
        sqlite_column!("content_type", &SqlType::Text),
        sqlite_column!("content_id", &SqlType::Integer),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_activity_feed_user_id", "user_id")],
    unique_constraints: &[],
};

const COMMENTS_TABLE: Table = Table {
    name: "Comments",
    columns: &[
        sqlite_column!("comment_id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "Users",
                foreign_column: "user_id",
                on_delete: ForeignKeyOnChange::NoAction,
            })
        ),
        sqlite_column!("content_type", &SqlType::Text, non_null = true),
        sqlite_column!("content_id", &SqlType::Integer, non_null = true),
        sqlite_column!("body", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[
        ("idx_comments_user_id", "user_id"),
        ("idx_comments_content", "content_type, content_id"),
    ],
    unique_constraints: &[],
};

const NOTIFICATIONS_TABLE: Table = Table {
    name: "Notifications",
    columns: &[
        sqlite_column!("notification_id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "Users",
                foreign_column: "user_id",
                on_delete: ForeignKeyOnChange::NoAction,
            })
        ),
        sqlite_column!("message", &SqlType::Text, non_null = true),
        sqlite_column!(
            "is_read",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_notifications_user_id", "user_id")],
    unique_constraints: &[],
};

const REPORTS_TABLE: Table = Table {
    name: "Reports",
    columns: &[
        sqlite_column!("report_id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "Users",
                foreign_column: "user_id",
                on_delete: ForeignKeyOnChange::NoAction,
            })
        ),
        sqlite_column!("content_type", &SqlType::Text, non_null = true),
        sqlite_column!("content_id", &SqlType::Integer, non_null = true),
        sqlite_column!("reason", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_reports_user_id", "user_id")],
    unique_constraints: &[],
};

/// Every table of the current schema, parents before children.
pub const MEDIA_TABLES: &[Table] = &[
    USERS_TABLE,
    ARTISTS_TABLE,
    ALBUMS_TABLE,
    SONGS_TABLE,
    PLAYLISTS_TABLE,
    PLAYLIST_SONGS_TABLE,
    CONTRIBUTION_ALBUM_TABLE,
    CONTRIBUTION_SONG_TABLE,
    LIKES_TABLE,
    FOLLOWS_TABLE,
    ACTIVITY_FEED_TABLE,
    COMMENTS_TABLE,
    NOTIFICATIONS_TABLE,
    REPORTS_TABLE,
];

pub const VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: MEDIA_TABLES,
    migration: None,
}];

pub fn find_table(name: &str) -> Option<&'static Table> {
    MEDIA_TABLES.iter().find(|t| t.name == name)
}
