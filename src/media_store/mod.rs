mod error;
pub mod models;
mod password;
mod record_store;
pub mod schema;
mod sqlite_media_store;
mod stores;

pub use error::StoreError;
pub use models::{
    Activity, Album, AlbumPayload, Artist, ArtistPayload, Comment, CommentPayload, ContentType,
    ContributionPayload, FollowPayload, Like, LikePayload, NewAlbum, NewArtist, NewPlaylist,
    NewSong, NewUser, Notification, Playlist, PlaylistPayload, PlaylistSong, PlaylistSongPayload,
    ReportPayload, Song, SongPayload, User, UserPayload,
};
pub use password::{hash_password, verify_password};
pub use record_store::{RecordStore, RecordTransaction, SqlRow};
pub use sqlite_media_store::{SqliteMediaStore, DEFAULT_BUSY_TIMEOUT};
pub use stores::{
    AlbumStore, ArtistStore, MediaStore, PlaylistStore, SocialStore, SongStore, UserStore,
};
