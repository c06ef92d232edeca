//! Test fixture creation for the media database
//!
//! Rows are inserted with direct SQL so that every id is known up front.

use super::constants::*;
use anyhow::Result;
use musicmedia_server::media_store::{hash_password, SqliteMediaStore};
use rusqlite::{params, Connection};
use std::path::PathBuf;
use tempfile::TempDir;

/// Creates a temporary database holding:
/// - users 1 and 2, user 1 following user 2
/// - artist 3 with album 4, songs 5 and 6 on the album and single 7
/// - playlist 10 of user 1 with songs 5 and 6
/// - one like of user 1 on song 5
/// - a comment of user 2 on song 6 and a report of user 1 on song 7
///
/// Returns (temp_dir, db_path)
pub fn create_test_db() -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("media.db");

    // Initialize the store (creates schema)
    drop(SqliteMediaStore::new(&db_path)?);

    let conn = Connection::open(&db_path)?;
    conn.pragma_update(None, "foreign_keys", true)?;
    let password_hash = hash_password(TEST_PASS)?;

    for (id, name) in [(USER_1_ID, USER_1_NAME), (USER_2_ID, USER_2_NAME)] {
        conn.execute(
            "INSERT INTO Users (user_id, username, email, password_hash) VALUES (?1, ?2, ?3, ?4)",
            params![id, name, format!("{}@example.com", name), password_hash],
        )?;
    }

    conn.execute(
        "INSERT INTO Artists (artist_id, name) VALUES (?1, ?2)",
        params![ARTIST_3_ID, ARTIST_3_NAME],
    )?;
    conn.execute(
        "INSERT INTO Albums (album_id, title, artist_id) VALUES (?1, ?2, ?3)",
        params![ALBUM_4_ID, ALBUM_4_TITLE, ARTIST_3_ID],
    )?;

    for (id, title, album) in [
        (SONG_5_ID, SONG_5_TITLE, Some(ALBUM_4_ID)),
        (SONG_6_ID, SONG_6_TITLE, Some(ALBUM_4_ID)),
        (SONG_7_ID, SONG_7_TITLE, None),
    ] {
        conn.execute(
            "INSERT INTO Songs (song_id, title, artist_id, album_id, duration) VALUES (?1, ?2, ?3, ?4, 200)",
            params![id, title, ARTIST_3_ID, album],
        )?;
    }

    conn.execute(
        "INSERT INTO Playlists (playlist_id, user_id, name) VALUES (?1, ?2, ?3)",
        params![PLAYLIST_10_ID, USER_1_ID, PLAYLIST_10_NAME],
    )?;
    for (position, song) in [(1, SONG_5_ID), (2, SONG_6_ID)] {
        conn.execute(
            "INSERT INTO Playlist_Songs (playlist_id, song_id, position) VALUES (?1, ?2, ?3)",
            params![PLAYLIST_10_ID, song, position],
        )?;
    }

    conn.execute(
        "INSERT INTO Likes (user_id, content_type, content_id) VALUES (?1, 'song', ?2)",
        params![USER_1_ID, SONG_5_ID],
    )?;
    conn.execute(
        "INSERT INTO Follows (follower_id, followed_id) VALUES (?1, ?2)",
        params![USER_1_ID, USER_2_ID],
    )?;
    conn.execute(
        "INSERT INTO Comments (user_id, content_type, content_id, body) VALUES (?1, 'song', ?2, 'great closer')",
        params![USER_2_ID, SONG_6_ID],
    )?;
    conn.execute(
        "INSERT INTO Reports (user_id, content_type, content_id, reason) VALUES (?1, 'song', ?2, 'wrong artist')",
        params![USER_1_ID, SONG_7_ID],
    )?;

    Ok((dir, db_path))
}
