//! Records and request payloads of the media store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of record a like, comment, report or activity points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Song,
    Album,
    Artist,
    Playlist,
    User,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Song => "song",
            ContentType::Album => "album",
            ContentType::Artist => "artist",
            ContentType::Playlist => "playlist",
            ContentType::User => "user",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "song" => Ok(ContentType::Song),
            "album" => Ok(ContentType::Album),
            "artist" => Ok(ContentType::Artist),
            "playlist" => Ok(ContentType::Playlist),
            "user" => Ok(ContentType::User),
            other => anyhow::bail!("Unknown content type '{}'", other),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct User {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub permission: String,
    pub created_at: i64,
}

/// Body of user create and update requests. Every field is optional so that
/// the same payload serves partial updates.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPayload {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub permission: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub permission: Option<String>,
}

impl UserPayload {
    /// Returns the first missing required field name on failure.
    pub fn into_new(self) -> Result<NewUser, &'static str> {
        Ok(NewUser {
            username: self.username.ok_or("username")?,
            email: self.email.ok_or("email")?,
            password: self.password.ok_or("password")?,
            profile_picture: self.profile_picture,
            bio: self.bio,
            permission: self.permission,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.profile_picture.is_none()
            && self.bio.is_none()
            && self.permission.is_none()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Artist {
    pub artist_id: i64,
    pub name: String,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArtistPayload {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewArtist {
    pub name: String,
    pub bio: Option<String>,
    pub image_url: Option<String>,
}

impl ArtistPayload {
    pub fn into_new(self) -> Result<NewArtist, &'static str> {
        Ok(NewArtist {
            name: self.name.ok_or("name")?,
            bio: self.bio,
            image_url: self.image_url,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.bio.is_none() && self.image_url.is_none()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Album {
    pub album_id: i64,
    pub title: String,
    pub artist_id: i64,
    pub release_date: Option<String>,
    pub cover_image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlbumPayload {
    pub title: Option<String>,
    pub artist_id: Option<i64>,
    pub release_date: Option<String>,
    pub cover_image_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewAlbum {
    pub title: String,
    pub artist_id: i64,
    pub release_date: Option<String>,
    pub cover_image_url: Option<String>,
}

impl AlbumPayload {
    pub fn into_new(self) -> Result<NewAlbum, &'static str> {
        Ok(NewAlbum {
            title: self.title.ok_or("title")?,
            artist_id: self.artist_id.ok_or("artist_id")?,
            release_date: self.release_date,
            cover_image_url: self.cover_image_url,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.artist_id.is_none()
            && self.release_date.is_none()
            && self.cover_image_url.is_none()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Song {
    pub song_id: i64,
    pub title: String,
    pub artist_id: i64,
    pub album_id: Option<i64>,
    pub genre_id: Option<i64>,
    pub release_date: Option<String>,
    /// Seconds.
    pub duration: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SongPayload {
    pub title: Option<String>,
    pub artist_id: Option<i64>,
    pub album_id: Option<i64>,
    pub genre_id: Option<i64>,
    pub release_date: Option<String>,
    pub duration: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewSong {
    pub title: String,
    pub artist_id: i64,
    pub album_id: Option<i64>,
    pub genre_id: Option<i64>,
    pub release_date: Option<String>,
    pub duration: Option<i64>,
}

impl SongPayload {
    pub fn into_new(self) -> Result<NewSong, &'static str> {
        Ok(NewSong {
            title: self.title.ok_or("title")?,
            artist_id: self.artist_id.ok_or("artist_id")?,
            album_id: self.album_id,
            genre_id: self.genre_id,
            release_date: self.release_date,
            duration: self.duration,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.artist_id.is_none()
            && self.album_id.is_none()
            && self.genre_id.is_none()
            && self.release_date.is_none()
            && self.duration.is_none()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Playlist {
    pub playlist_id: i64,
    pub user_id: i64,
    pub name: String,
    pub is_public: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaylistPayload {
    pub user_id: Option<i64>,
    pub name: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct NewPlaylist {
    pub user_id: i64,
    pub name: String,
    pub is_public: bool,
}

impl PlaylistPayload {
    pub fn into_new(self) -> Result<NewPlaylist, &'static str> {
        Ok(NewPlaylist {
            user_id: self.user_id.ok_or("user_id")?,
            name: self.name.ok_or("name")?,
            is_public: self.is_public.unwrap_or(true),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.user_id.is_none() && self.name.is_none() && self.is_public.is_none()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlaylistSong {
    pub playlist_id: i64,
    pub song_id: i64,
    pub position: i64,
    pub added_at: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistSongPayload {
    pub song_id: Option<i64>,
    /// Appended at the end when absent.
    pub position: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContributionPayload {
    pub artist_id: Option<i64>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Like {
    pub like_id: i64,
    pub user_id: i64,
    pub content_type: ContentType,
    pub content_id: i64,
    pub created_at: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LikePayload {
    pub content_type: Option<ContentType>,
    pub content_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FollowPayload {
    pub followed_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Comment {
    pub comment_id: i64,
    pub user_id: i64,
    pub content_type: ContentType,
    pub content_id: i64,
    pub body: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentPayload {
    pub user_id: Option<i64>,
    pub content_type: Option<ContentType>,
    pub content_id: Option<i64>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportPayload {
    pub user_id: Option<i64>,
    pub content_type: Option<ContentType>,
    pub content_id: Option<i64>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Notification {
    pub notification_id: i64,
    pub user_id: i64,
    pub message: String,
    pub is_read: bool,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Activity {
    pub activity_id: i64,
    pub user_id: i64,
    pub activity_type: String,
    pub content_type: Option<ContentType>,
    pub content_id: Option<i64>,
    pub created_at: i64,
}
