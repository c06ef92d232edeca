use crate::media_store::*;
use rusqlite::types::Value;
use tempfile::TempDir;

pub fn create_tmp_store() -> (SqliteMediaStore, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let temp_file_path = temp_dir.path().join("test.db");
    let store = SqliteMediaStore::new(&temp_file_path).unwrap();
    (store, temp_dir)
}

/// Ids of the rows created by [`seed_catalog`].
pub struct Fixture {
    pub user: i64,
    pub guest_user: i64,
    pub artist: i64,
    pub guest: i64,
    pub album: i64,
    /// By `artist`, on `album`.
    pub song_a: i64,
    /// By `artist`, no album.
    pub song_b: i64,
    /// By `guest`, on `album`.
    pub guest_song: i64,
    /// Owned by `user`, holds `song_a` and `guest_song`.
    pub playlist: i64,
}

fn new_user(name: &str) -> NewUser {
    NewUser {
        username: name.to_string(),
        email: format!("{}@example.com", name),
        password: "secret".to_string(),
        profile_picture: None,
        bio: None,
        permission: None,
    }
}

fn new_song(title: &str, artist_id: i64, album_id: Option<i64>) -> NewSong {
    NewSong {
        title: title.to_string(),
        artist_id,
        album_id,
        genre_id: None,
        release_date: None,
        duration: Some(180),
    }
}

pub fn seed_catalog(store: &SqliteMediaStore) -> Fixture {
    let user = store.create_user(&new_user("ann")).unwrap();
    let guest_user = store.create_user(&new_user("bob")).unwrap();

    let artist = store
        .create_artist(&NewArtist {
            name: "Nina".to_string(),
            bio: None,
            image_url: None,
        })
        .unwrap();
    let guest = store
        .create_artist(&NewArtist {
            name: "Guest".to_string(),
            bio: None,
            image_url: None,
        })
        .unwrap();
    let album = store
        .create_album(&NewAlbum {
            title: "Pastel Blues".to_string(),
            artist_id: artist,
            release_date: None,
            cover_image_url: None,
        })
        .unwrap();

    let song_a = store.create_song(&new_song("Sinnerman", artist, Some(album))).unwrap();
    let song_b = store.create_song(&new_song("Single", artist, None)).unwrap();
    let guest_song = store.create_song(&new_song("Feature", guest, Some(album))).unwrap();

    store.add_song_contribution(song_a, guest, Some("vocals")).unwrap();
    store.add_album_contribution(album, guest, Some("producer")).unwrap();

    let playlist = store
        .create_playlist(&NewPlaylist {
            user_id: user,
            name: "Mix".to_string(),
            is_public: true,
        })
        .unwrap();
    store.add_playlist_song(playlist, song_a, None).unwrap();
    store.add_playlist_song(playlist, guest_song, None).unwrap();

    store.add_like(user, ContentType::Song, song_a).unwrap();
    store.add_follow(user, guest_user).unwrap();
    store
        .add_comment(user, ContentType::Album, album, "classic")
        .unwrap();
    store
        .add_report(user, ContentType::Song, song_b, "wrong title")
        .unwrap();

    Fixture {
        user,
        guest_user,
        artist,
        guest,
        album,
        song_a,
        song_b,
        guest_song,
        playlist,
    }
}

/// Inserts `count` songs on an album in one transaction and returns their ids.
pub fn insert_album_songs(
    store: &SqliteMediaStore,
    album_id: i64,
    artist_id: i64,
    count: usize,
) -> Vec<i64> {
    let mut tx = store.begin_transaction().unwrap();
    for i in 0..count {
        tx.execute(
            "INSERT INTO Songs (title, artist_id, album_id) VALUES (?1, ?2, ?3)",
            &[
                Value::Text(format!("bulk-{}", i)),
                Value::Integer(artist_id),
                Value::Integer(album_id),
            ],
        )
        .unwrap();
    }
    let ids = tx
        .query(
            "SELECT song_id FROM Songs WHERE title LIKE 'bulk-%' ORDER BY song_id",
            &[],
        )
        .unwrap()
        .into_iter()
        .map(|row| match row[0] {
            Value::Integer(id) => id,
            _ => panic!("non-integer song id"),
        })
        .collect();
    tx.commit().unwrap();
    ids
}

/// Makes every delete on `table` abort.
pub fn block_deletes_on(store: &SqliteMediaStore, table: &str) {
    let mut tx = store.begin_transaction().unwrap();
    tx.execute(
        &format!(
            "CREATE TRIGGER block_{table}_delete BEFORE DELETE ON {table} \
             BEGIN SELECT RAISE(ABORT, '{table} rows are locked'); END"
        ),
        &[],
    )
    .unwrap();
    tx.commit().unwrap();
}

/// Store whose database can never be reached.
pub struct UnavailableStore;

impl RecordStore for UnavailableStore {
    fn begin_transaction(&self) -> Result<Box<dyn RecordTransaction + '_>, StoreError> {
        Err(StoreError::Connectivity("database is offline".to_string()))
    }
}
