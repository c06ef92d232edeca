use super::error::StoreError;
use super::models::*;
use super::password::hash_password;
use super::record_store::{RecordStore, RecordTransaction, SqlRow};
use super::schema::{find_table, VERSIONED_SCHEMAS};
use super::stores::*;
use crate::sqlite_persistence::BASE_DB_VERSION;
use anyhow::{anyhow, bail, Context, Result};
use rusqlite::{
    params, params_from_iter,
    types::{Type, Value},
    Connection, OptionalExtension, Row,
};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

const NOW: &str = "cast(strftime('%s','now') as int)";

#[derive(Clone)]
pub struct SqliteMediaStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteMediaStore {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        Self::with_busy_timeout(db_path, DEFAULT_BUSY_TIMEOUT)
    }

    pub fn with_busy_timeout<T: AsRef<Path>>(db_path: T, busy_timeout: Duration) -> Result<Self> {
        let db_path = db_path.as_ref();
        let conn = if db_path.exists() {
            Connection::open_with_flags(
                db_path,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .with_context(|| format!("Failed to open database {}", db_path.display()))?
        } else {
            info!("Creating media database at {}", db_path.display());
            let conn = Connection::open(db_path)
                .with_context(|| format!("Failed to create database {}", db_path.display()))?;
            VERSIONED_SCHEMAS
                .last()
                .context("No schema defined")?
                .create(&conn)?;
            conn
        };

        conn.busy_timeout(busy_timeout)?;
        conn.pragma_update(None, "foreign_keys", true)?;

        let db_version = conn
            .query_row("PRAGMA user_version;", [], |row| row.get::<usize, i64>(0))
            .context("Failed to read database version")?
            - BASE_DB_VERSION as i64;

        if db_version < 0 {
            bail!(
                "Database version {} is too old, does not contain base db version {}",
                db_version,
                BASE_DB_VERSION
            );
        }
        let version = db_version as usize;

        if db_version >= VERSIONED_SCHEMAS.len() as i64 {
            bail!("Database version {} is too new", db_version);
        }
        VERSIONED_SCHEMAS
            .get(version)
            .context("Failed to get schema")?
            .validate(&conn)?;

        Self::migrate_if_needed(&conn, version)?;

        Ok(SqliteMediaStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn migrate_if_needed(conn: &Connection, version: usize) -> Result<()> {
        let mut latest_from = version;
        for schema in VERSIONED_SCHEMAS.iter().skip(version + 1) {
            if let Some(migration_fn) = schema.migration {
                info!(
                    "Migrating db from version {} to {}",
                    latest_from, schema.version
                );
                migration_fn(conn)?;
                latest_from = schema.version;
            }
        }
        conn.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + latest_from),
            [],
        )?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Database connection mutex poisoned"))
    }

    fn list<T>(
        &self,
        sql: &str,
        params: &[Value],
        map: fn(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let items = stmt
            .query_map(params_from_iter(params.iter()), map)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    fn get<T>(
        &self,
        sql: &str,
        key: i64,
        map: fn(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Option<T>> {
        let conn = self.conn()?;
        Ok(conn.query_row(sql, params![key], map).optional()?)
    }

    fn insert(&self, sql: &str, values: &[Value]) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(sql, params_from_iter(values.iter()))?;
        Ok(conn.last_insert_rowid())
    }
}

/// Column assignments of a partial UPDATE.
#[derive(Default)]
struct Assignments(Vec<(&'static str, Value)>);

impl Assignments {
    fn text(mut self, column: &'static str, value: &Option<String>) -> Self {
        if let Some(value) = value {
            self.0.push((column, Value::Text(value.clone())));
        }
        self
    }

    fn integer(mut self, column: &'static str, value: Option<i64>) -> Self {
        if let Some(value) = value {
            self.0.push((column, Value::Integer(value)));
        }
        self
    }

    /// Returns Ok(false) when no row has the given key.
    fn apply(
        self,
        conn: &Connection,
        table: &str,
        key_column: &str,
        key: i64,
        touch_updated_at: bool,
    ) -> Result<bool> {
        if self.0.is_empty() {
            bail!("Nothing to update in {}", table);
        }
        let mut sets: Vec<String> = self
            .0
            .iter()
            .enumerate()
            .map(|(i, (column, _))| format!("{} = ?{}", column, i + 1))
            .collect();
        if touch_updated_at {
            sets.push(format!("updated_at = {}", NOW));
        }
        let mut values: Vec<Value> = self.0.into_iter().map(|(_, value)| value).collect();
        values.push(Value::Integer(key));

        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?{}",
            table,
            sets.join(", "),
            key_column,
            values.len()
        );
        let updated = conn
            .execute(&sql, params_from_iter(values.iter()))
            .with_context(|| format!("Failed to update {} {}", table, key))?;
        Ok(updated > 0)
    }
}

fn content_type_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<ContentType> {
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|err: anyhow::Error| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into()))
}

fn optional_content_type_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<ContentType>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(_) => content_type_at(row, idx).map(Some),
        None => Ok(None),
    }
}

const USER_COLUMNS: &str =
    "user_id, username, email, profile_picture, bio, permission, created_at";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        user_id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        profile_picture: row.get(3)?,
        bio: row.get(4)?,
        permission: row.get(5)?,
        created_at: row.get(6)?,
    })
}

const ARTIST_COLUMNS: &str = "artist_id, name, bio, image_url, created_at, updated_at";

fn artist_from_row(row: &Row<'_>) -> rusqlite::Result<Artist> {
    Ok(Artist {
        artist_id: row.get(0)?,
        name: row.get(1)?,
        bio: row.get(2)?,
        image_url: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

const ALBUM_COLUMNS: &str = "album_id, title, artist_id, release_date, cover_image_url";

fn album_from_row(row: &Row<'_>) -> rusqlite::Result<Album> {
    Ok(Album {
        album_id: row.get(0)?,
        title: row.get(1)?,
        artist_id: row.get(2)?,
        release_date: row.get(3)?,
        cover_image_url: row.get(4)?,
    })
}

const SONG_COLUMNS: &str =
    "song_id, title, artist_id, album_id, genre_id, release_date, duration";

fn song_from_row(row: &Row<'_>) -> rusqlite::Result<Song> {
    Ok(Song {
        song_id: row.get(0)?,
        title: row.get(1)?,
        artist_id: row.get(2)?,
        album_id: row.get(3)?,
        genre_id: row.get(4)?,
        release_date: row.get(5)?,
        duration: row.get(6)?,
    })
}

const PLAYLIST_COLUMNS: &str = "playlist_id, user_id, name, is_public, created_at, updated_at";

fn playlist_from_row(row: &Row<'_>) -> rusqlite::Result<Playlist> {
    Ok(Playlist {
        playlist_id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        is_public: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn playlist_song_from_row(row: &Row<'_>) -> rusqlite::Result<PlaylistSong> {
    Ok(PlaylistSong {
        playlist_id: row.get(0)?,
        song_id: row.get(1)?,
        position: row.get(2)?,
        added_at: row.get(3)?,
    })
}

fn like_from_row(row: &Row<'_>) -> rusqlite::Result<Like> {
    Ok(Like {
        like_id: row.get(0)?,
        user_id: row.get(1)?,
        content_type: content_type_at(row, 2)?,
        content_id: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        comment_id: row.get(0)?,
        user_id: row.get(1)?,
        content_type: content_type_at(row, 2)?,
        content_id: row.get(3)?,
        body: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn notification_from_row(row: &Row<'_>) -> rusqlite::Result<Notification> {
    Ok(Notification {
        notification_id: row.get(0)?,
        user_id: row.get(1)?,
        message: row.get(2)?,
        is_read: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn activity_from_row(row: &Row<'_>) -> rusqlite::Result<Activity> {
    Ok(Activity {
        activity_id: row.get(0)?,
        user_id: row.get(1)?,
        activity_type: row.get(2)?,
        content_type: optional_content_type_at(row, 3)?,
        content_id: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

fn optional_text(value: &Option<String>) -> Value {
    value.clone().map(Value::Text).unwrap_or(Value::Null)
}

fn optional_integer(value: Option<i64>) -> Value {
    value.map(Value::Integer).unwrap_or(Value::Null)
}

fn record_activity(
    conn: &Connection,
    user_id: i64,
    activity_type: &str,
    content_type: ContentType,
    content_id: i64,
) -> Result<()> {
    conn.execute(
        "INSERT INTO Activity_Feed (user_id, activity_type, content_type, content_id) VALUES (?1, ?2, ?3, ?4)",
        params![user_id, activity_type, content_type.as_str(), content_id],
    )?;
    Ok(())
}

impl UserStore for SqliteMediaStore {
    fn list_users(&self) -> Result<Vec<User>> {
        self.list(
            &format!("SELECT {} FROM Users ORDER BY user_id", USER_COLUMNS),
            &[],
            user_from_row,
        )
    }

    fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        self.get(
            &format!("SELECT {} FROM Users WHERE user_id = ?1", USER_COLUMNS),
            user_id,
            user_from_row,
        )
    }

    fn create_user(&self, user: &NewUser) -> Result<i64> {
        let password_hash = hash_password(&user.password)?;
        let id = self
            .insert(
                "INSERT INTO Users (username, email, password_hash, profile_picture, bio, permission) VALUES (?1, ?2, ?3, ?4, ?5, COALESCE(?6, 'user'))",
                &[
                    text(&user.username),
                    text(&user.email),
                    Value::Text(password_hash),
                    optional_text(&user.profile_picture),
                    optional_text(&user.bio),
                    optional_text(&user.permission),
                ],
            )
            .with_context(|| format!("Failed to create user {}", user.username))?;
        debug!("Created user {} with id {}", user.username, id);
        Ok(id)
    }

    fn update_user(&self, user_id: i64, update: &UserPayload) -> Result<bool> {
        let password_hash = update.password.as_deref().map(hash_password).transpose()?;
        let conn = self.conn()?;
        Assignments::default()
            .text("username", &update.username)
            .text("email", &update.email)
            .text("password_hash", &password_hash)
            .text("profile_picture", &update.profile_picture)
            .text("bio", &update.bio)
            .text("permission", &update.permission)
            .apply(&conn, "Users", "user_id", user_id, false)
    }
}

impl ArtistStore for SqliteMediaStore {
    fn list_artists(&self) -> Result<Vec<Artist>> {
        self.list(
            &format!("SELECT {} FROM Artists ORDER BY artist_id", ARTIST_COLUMNS),
            &[],
            artist_from_row,
        )
    }

    fn get_artist(&self, artist_id: i64) -> Result<Option<Artist>> {
        self.get(
            &format!("SELECT {} FROM Artists WHERE artist_id = ?1", ARTIST_COLUMNS),
            artist_id,
            artist_from_row,
        )
    }

    fn create_artist(&self, artist: &NewArtist) -> Result<i64> {
        self.insert(
            "INSERT INTO Artists (name, bio, image_url) VALUES (?1, ?2, ?3)",
            &[
                text(&artist.name),
                optional_text(&artist.bio),
                optional_text(&artist.image_url),
            ],
        )
        .with_context(|| format!("Failed to create artist {}", artist.name))
    }

    fn update_artist(&self, artist_id: i64, update: &ArtistPayload) -> Result<bool> {
        let conn = self.conn()?;
        Assignments::default()
            .text("name", &update.name)
            .text("bio", &update.bio)
            .text("image_url", &update.image_url)
            .apply(&conn, "Artists", "artist_id", artist_id, true)
    }
}

impl AlbumStore for SqliteMediaStore {
    fn list_albums(&self) -> Result<Vec<Album>> {
        self.list(
            &format!("SELECT {} FROM Albums ORDER BY album_id", ALBUM_COLUMNS),
            &[],
            album_from_row,
        )
    }

    fn get_album(&self, album_id: i64) -> Result<Option<Album>> {
        self.get(
            &format!("SELECT {} FROM Albums WHERE album_id = ?1", ALBUM_COLUMNS),
            album_id,
            album_from_row,
        )
    }

    fn create_album(&self, album: &NewAlbum) -> Result<i64> {
        self.insert(
            "INSERT INTO Albums (title, artist_id, release_date, cover_image_url) VALUES (?1, ?2, ?3, ?4)",
            &[
                text(&album.title),
                Value::Integer(album.artist_id),
                optional_text(&album.release_date),
                optional_text(&album.cover_image_url),
            ],
        )
        .with_context(|| format!("Failed to create album {}", album.title))
    }

    fn update_album(&self, album_id: i64, update: &AlbumPayload) -> Result<bool> {
        let conn = self.conn()?;
        Assignments::default()
            .text("title", &update.title)
            .integer("artist_id", update.artist_id)
            .text("release_date", &update.release_date)
            .text("cover_image_url", &update.cover_image_url)
            .apply(&conn, "Albums", "album_id", album_id, false)
    }

    fn add_album_contribution(
        &self,
        album_id: i64,
        artist_id: i64,
        role: Option<&str>,
    ) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO Contribution_Album_Table (album_id, artist_id, role) VALUES (?1, ?2, ?3)",
            params![album_id, artist_id, role],
        )
        .with_context(|| {
            format!(
                "Failed to add artist {} as contributor of album {}",
                artist_id, album_id
            )
        })?;
        Ok(())
    }
}

impl SongStore for SqliteMediaStore {
    fn list_songs(&self) -> Result<Vec<Song>> {
        self.list(
            &format!("SELECT {} FROM Songs ORDER BY song_id", SONG_COLUMNS),
            &[],
            song_from_row,
        )
    }

    fn get_song(&self, song_id: i64) -> Result<Option<Song>> {
        self.get(
            &format!("SELECT {} FROM Songs WHERE song_id = ?1", SONG_COLUMNS),
            song_id,
            song_from_row,
        )
    }

    fn create_song(&self, song: &NewSong) -> Result<i64> {
        self.insert(
            "INSERT INTO Songs (title, artist_id, album_id, genre_id, release_date, duration) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            &[
                text(&song.title),
                Value::Integer(song.artist_id),
                optional_integer(song.album_id),
                optional_integer(song.genre_id),
                optional_text(&song.release_date),
                optional_integer(song.duration),
            ],
        )
        .with_context(|| format!("Failed to create song {}", song.title))
    }

    fn update_song(&self, song_id: i64, update: &SongPayload) -> Result<bool> {
        let conn = self.conn()?;
        Assignments::default()
            .text("title", &update.title)
            .integer("artist_id", update.artist_id)
            .integer("album_id", update.album_id)
            .integer("genre_id", update.genre_id)
            .text("release_date", &update.release_date)
            .integer("duration", update.duration)
            .apply(&conn, "Songs", "song_id", song_id, false)
    }

    fn add_song_contribution(&self, song_id: i64, artist_id: i64, role: Option<&str>) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO Contribution_Song_Table (song_id, artist_id, role) VALUES (?1, ?2, ?3)",
            params![song_id, artist_id, role],
        )
        .with_context(|| {
            format!(
                "Failed to add artist {} as contributor of song {}",
                artist_id, song_id
            )
        })?;
        Ok(())
    }
}

impl PlaylistStore for SqliteMediaStore {
    fn list_playlists(&self) -> Result<Vec<Playlist>> {
        self.list(
            &format!("SELECT {} FROM Playlists ORDER BY playlist_id", PLAYLIST_COLUMNS),
            &[],
            playlist_from_row,
        )
    }

    fn get_playlist(&self, playlist_id: i64) -> Result<Option<Playlist>> {
        self.get(
            &format!(
                "SELECT {} FROM Playlists WHERE playlist_id = ?1",
                PLAYLIST_COLUMNS
            ),
            playlist_id,
            playlist_from_row,
        )
    }

    fn create_playlist(&self, playlist: &NewPlaylist) -> Result<i64> {
        self.insert(
            "INSERT INTO Playlists (user_id, name, is_public) VALUES (?1, ?2, ?3)",
            &[
                Value::Integer(playlist.user_id),
                text(&playlist.name),
                Value::Integer(playlist.is_public as i64),
            ],
        )
        .with_context(|| format!("Failed to create playlist {}", playlist.name))
    }

    fn update_playlist(&self, playlist_id: i64, update: &PlaylistPayload) -> Result<bool> {
        let conn = self.conn()?;
        Assignments::default()
            .integer("user_id", update.user_id)
            .text("name", &update.name)
            .integer("is_public", update.is_public.map(i64::from))
            .apply(&conn, "Playlists", "playlist_id", playlist_id, true)
    }

    fn add_playlist_song(
        &self,
        playlist_id: i64,
        song_id: i64,
        position: Option<i64>,
    ) -> Result<i64> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let position = match position {
            Some(position) => position,
            None => tx.query_row(
                "SELECT COALESCE(MAX(position), 0) + 1 FROM Playlist_Songs WHERE playlist_id = ?1",
                params![playlist_id],
                |row| row.get(0),
            )?,
        };
        tx.execute(
            "INSERT INTO Playlist_Songs (playlist_id, song_id, position) VALUES (?1, ?2, ?3)",
            params![playlist_id, song_id, position],
        )
        .with_context(|| format!("Failed to add song {} to playlist {}", song_id, playlist_id))?;
        tx.execute(
            &format!(
                "UPDATE Playlists SET updated_at = {} WHERE playlist_id = ?1",
                NOW
            ),
            params![playlist_id],
        )?;
        tx.commit()?;
        Ok(position)
    }

    fn list_playlist_songs(&self, playlist_id: i64) -> Result<Vec<PlaylistSong>> {
        self.list(
            "SELECT playlist_id, song_id, position, added_at FROM Playlist_Songs WHERE playlist_id = ?1 ORDER BY position, song_id",
            &[Value::Integer(playlist_id)],
            playlist_song_from_row,
        )
    }

    fn remove_playlist_song(&self, playlist_id: i64, song_id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM Playlist_Songs WHERE playlist_id = ?1 AND song_id = ?2",
            params![playlist_id, song_id],
        )?;
        Ok(removed > 0)
    }
}

impl SocialStore for SqliteMediaStore {
    fn add_like(&self, user_id: i64, content_type: ContentType, content_id: i64) -> Result<i64> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO Likes (user_id, content_type, content_id) VALUES (?1, ?2, ?3)",
            params![user_id, content_type.as_str(), content_id],
        )
        .with_context(|| {
            format!(
                "Failed to add like of {} {} for user {}",
                content_type, content_id, user_id
            )
        })?;
        let like_id = tx.last_insert_rowid();
        record_activity(&tx, user_id, "like", content_type, content_id)?;
        tx.commit()?;
        Ok(like_id)
    }

    fn list_likes(&self, user_id: i64) -> Result<Vec<Like>> {
        self.list(
            "SELECT like_id, user_id, content_type, content_id, created_at FROM Likes WHERE user_id = ?1 ORDER BY like_id",
            &[Value::Integer(user_id)],
            like_from_row,
        )
    }

    fn add_follow(&self, follower_id: i64, followed_id: i64) -> Result<()> {
        if follower_id == followed_id {
            bail!("User {} cannot follow themselves", follower_id);
        }
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO Follows (follower_id, followed_id) VALUES (?1, ?2)",
            params![follower_id, followed_id],
        )
        .with_context(|| format!("Failed to make user {} follow {}", follower_id, followed_id))?;
        let follower_name: String = tx.query_row(
            "SELECT username FROM Users WHERE user_id = ?1",
            params![follower_id],
            |row| row.get(0),
        )?;
        tx.execute(
            "INSERT INTO Notifications (user_id, message) VALUES (?1, ?2)",
            params![followed_id, format!("{} started following you", follower_name)],
        )?;
        record_activity(&tx, follower_id, "follow", ContentType::User, followed_id)?;
        tx.commit()?;
        Ok(())
    }

    fn list_followers(&self, user_id: i64) -> Result<Vec<i64>> {
        self.list(
            "SELECT follower_id FROM Follows WHERE followed_id = ?1 ORDER BY follower_id",
            &[Value::Integer(user_id)],
            |row| row.get(0),
        )
    }

    fn list_following(&self, user_id: i64) -> Result<Vec<i64>> {
        self.list(
            "SELECT followed_id FROM Follows WHERE follower_id = ?1 ORDER BY followed_id",
            &[Value::Integer(user_id)],
            |row| row.get(0),
        )
    }

    fn add_comment(
        &self,
        user_id: i64,
        content_type: ContentType,
        content_id: i64,
        body: &str,
    ) -> Result<i64> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO Comments (user_id, content_type, content_id, body) VALUES (?1, ?2, ?3, ?4)",
            params![user_id, content_type.as_str(), content_id, body],
        )
        .with_context(|| format!("Failed to add comment for user {}", user_id))?;
        let comment_id = tx.last_insert_rowid();
        record_activity(&tx, user_id, "comment", content_type, content_id)?;
        tx.commit()?;
        Ok(comment_id)
    }

    fn list_comments(&self, content_type: ContentType, content_id: i64) -> Result<Vec<Comment>> {
        self.list(
            "SELECT comment_id, user_id, content_type, content_id, body, created_at FROM Comments WHERE content_type = ?1 AND content_id = ?2 ORDER BY comment_id",
            &[text(content_type.as_str()), Value::Integer(content_id)],
            comment_from_row,
        )
    }

    fn add_report(
        &self,
        user_id: i64,
        content_type: ContentType,
        content_id: i64,
        reason: &str,
    ) -> Result<i64> {
        self.insert(
            "INSERT INTO Reports (user_id, content_type, content_id, reason) VALUES (?1, ?2, ?3, ?4)",
            &[
                Value::Integer(user_id),
                text(content_type.as_str()),
                Value::Integer(content_id),
                text(reason),
            ],
        )
        .with_context(|| format!("Failed to add report for user {}", user_id))
    }

    fn list_notifications(&self, user_id: i64) -> Result<Vec<Notification>> {
        self.list(
            "SELECT notification_id, user_id, message, is_read, created_at FROM Notifications WHERE user_id = ?1 ORDER BY created_at DESC, notification_id DESC",
            &[Value::Integer(user_id)],
            notification_from_row,
        )
    }

    fn list_activity(&self, user_id: i64) -> Result<Vec<Activity>> {
        self.list(
            "SELECT activity_id, user_id, activity_type, content_type, content_id, created_at FROM Activity_Feed WHERE user_id = ?1 ORDER BY created_at DESC, activity_id DESC",
            &[Value::Integer(user_id)],
            activity_from_row,
        )
    }
}

impl MediaStore for SqliteMediaStore {
    fn count_references(&self, table: &str, column: &str, key: i64) -> Result<usize> {
        let schema_table = find_table(table).with_context(|| format!("Unknown table {}", table))?;
        if !schema_table.columns.iter().any(|c| c.name == column) {
            bail!("Table {} has no column {}", table, column);
        }
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE {} = ?1", table, column),
            params![key],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

impl RecordStore for SqliteMediaStore {
    fn begin_transaction(&self) -> Result<Box<dyn RecordTransaction + '_>, StoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::Connectivity("Database connection mutex poisoned".to_string()))?;
        conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(Box::new(SqliteTransaction {
            conn,
            finished: false,
        }))
    }
}

/// Write transaction holding the connection lock until it ends.
struct SqliteTransaction<'a> {
    conn: MutexGuard<'a, Connection>,
    finished: bool,
}

impl RecordTransaction for SqliteTransaction<'_> {
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<usize, StoreError> {
        Ok(self.conn.execute(sql, params_from_iter(params.iter()))?)
    }

    fn query(&mut self, sql: &str, params: &[Value]) -> Result<Vec<SqlRow>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let column_count = stmt.column_count();
        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                (0..column_count)
                    .map(|i| row.get::<_, Value>(i))
                    .collect::<rusqlite::Result<SqlRow>>()
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn commit(mut self: Box<Self>) -> Result<(), StoreError> {
        self.conn.execute_batch("COMMIT")?;
        self.finished = true;
        Ok(())
    }

    fn rollback(mut self: Box<Self>) -> Result<(), StoreError> {
        self.finished = true;
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }
}

impl Drop for SqliteTransaction<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(err) = self.conn.execute_batch("ROLLBACK") {
            warn!("Failed to roll back abandoned transaction: {}", err);
        }
    }
}
