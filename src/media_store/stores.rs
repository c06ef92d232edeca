use super::models::*;
use super::record_store::RecordStore;
use anyhow::Result;

pub trait UserStore: Send + Sync {
    fn list_users(&self) -> Result<Vec<User>>;

    /// Returns Ok(None) if the user does not exist.
    fn get_user(&self, user_id: i64) -> Result<Option<User>>;

    /// Creates a new user and returns its id. The password is stored hashed.
    fn create_user(&self, user: &NewUser) -> Result<i64>;

    /// Applies the fields present in the payload.
    /// Returns Ok(false) if the user does not exist.
    fn update_user(&self, user_id: i64, update: &UserPayload) -> Result<bool>;
}

pub trait ArtistStore: Send + Sync {
    fn list_artists(&self) -> Result<Vec<Artist>>;
    fn get_artist(&self, artist_id: i64) -> Result<Option<Artist>>;
    fn create_artist(&self, artist: &NewArtist) -> Result<i64>;
    fn update_artist(&self, artist_id: i64, update: &ArtistPayload) -> Result<bool>;
}

pub trait AlbumStore: Send + Sync {
    fn list_albums(&self) -> Result<Vec<Album>>;
    fn get_album(&self, album_id: i64) -> Result<Option<Album>>;
    fn create_album(&self, album: &NewAlbum) -> Result<i64>;
    fn update_album(&self, album_id: i64, update: &AlbumPayload) -> Result<bool>;
    fn add_album_contribution(&self, album_id: i64, artist_id: i64, role: Option<&str>)
        -> Result<()>;
}

pub trait SongStore: Send + Sync {
    fn list_songs(&self) -> Result<Vec<Song>>;
    fn get_song(&self, song_id: i64) -> Result<Option<Song>>;
    fn create_song(&self, song: &NewSong) -> Result<i64>;
    fn update_song(&self, song_id: i64, update: &SongPayload) -> Result<bool>;
    fn add_song_contribution(&self, song_id: i64, artist_id: i64, role: Option<&str>) -> Result<()>;
}

pub trait PlaylistStore: Send + Sync {
    fn list_playlists(&self) -> Result<Vec<Playlist>>;
    fn get_playlist(&self, playlist_id: i64) -> Result<Option<Playlist>>;
    fn create_playlist(&self, playlist: &NewPlaylist) -> Result<i64>;
    fn update_playlist(&self, playlist_id: i64, update: &PlaylistPayload) -> Result<bool>;

    /// Adds a song to a playlist. Without a position the song is appended.
    /// Returns the position the song was stored at.
    fn add_playlist_song(&self, playlist_id: i64, song_id: i64, position: Option<i64>)
        -> Result<i64>;

    /// Songs of a playlist, ordered by position.
    fn list_playlist_songs(&self, playlist_id: i64) -> Result<Vec<PlaylistSong>>;

    /// Returns Ok(false) if the song was not in the playlist.
    fn remove_playlist_song(&self, playlist_id: i64, song_id: i64) -> Result<bool>;
}

/// Likes, follows, comments, reports and the feeds derived from them.
pub trait SocialStore: Send + Sync {
    /// Records a like and the matching activity entry. Returns the like id.
    fn add_like(&self, user_id: i64, content_type: ContentType, content_id: i64) -> Result<i64>;
    fn list_likes(&self, user_id: i64) -> Result<Vec<Like>>;

    /// Records a follow, notifies the followed user and logs the activity.
    fn add_follow(&self, follower_id: i64, followed_id: i64) -> Result<()>;
    fn list_followers(&self, user_id: i64) -> Result<Vec<i64>>;
    fn list_following(&self, user_id: i64) -> Result<Vec<i64>>;

    fn add_comment(
        &self,
        user_id: i64,
        content_type: ContentType,
        content_id: i64,
        body: &str,
    ) -> Result<i64>;
    fn list_comments(&self, content_type: ContentType, content_id: i64) -> Result<Vec<Comment>>;

    fn add_report(
        &self,
        user_id: i64,
        content_type: ContentType,
        content_id: i64,
        reason: &str,
    ) -> Result<i64>;

    fn list_notifications(&self, user_id: i64) -> Result<Vec<Notification>>;
    fn list_activity(&self, user_id: i64) -> Result<Vec<Activity>>;
}

pub trait MediaStore:
    RecordStore + UserStore + ArtistStore + AlbumStore + SongStore + PlaylistStore + SocialStore
{
    /// Number of rows in `table` whose `column` equals `key`.
    /// Fails for tables or columns outside the schema.
    fn count_references(&self, table: &str, column: &str, key: i64) -> Result<usize>;
}
