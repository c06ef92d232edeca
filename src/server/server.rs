use anyhow::{Context, Result};
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{log_requests, metrics::metrics_handler, state::*, ServerConfig};
use crate::deletion::{delete_entity, EntityType};
use crate::media_store::*;

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
    };
    Json(stats)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

fn internal_error(action: &str, err: anyhow::Error) -> Response {
    error!("Failed to {}: {:#}", action, err);
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Failed to {}: {}", action, err),
    )
}

fn missing_field(field: &str) -> Response {
    error_response(StatusCode::BAD_REQUEST, format!("{} is required", field))
}

fn not_found(entity: EntityType, id: i64) -> Response {
    error_response(StatusCode::NOT_FOUND, format!("{} {} not found", entity, id))
}

fn list_response<T: Serialize>(what: &str, result: Result<Vec<T>>) -> Response {
    match result {
        Ok(items) => Json(items).into_response(),
        Err(err) => internal_error(&format!("fetch {}", what), err),
    }
}

fn get_response<T: Serialize>(entity: EntityType, id: i64, result: Result<Option<T>>) -> Response {
    match result {
        Ok(Some(record)) => Json(record).into_response(),
        Ok(None) => not_found(entity, id),
        Err(err) => internal_error(&format!("fetch {} {}", entity, id), err),
    }
}

fn created_response(entity: EntityType, result: Result<i64>) -> Response {
    match result {
        Ok(id) => (
            StatusCode::CREATED,
            Json(json!({
                "message": format!("{} {} created successfully", entity, id),
                "id": id,
            })),
        )
            .into_response(),
        Err(err) => internal_error(&format!("create {}", entity), err),
    }
}

fn updated_response(entity: EntityType, id: i64, result: Result<bool>) -> Response {
    match result {
        Ok(true) => Json(json!({
            "message": format!("{} {} updated successfully", entity, id)
        }))
        .into_response(),
        Ok(false) => not_found(entity, id),
        Err(err) => internal_error(&format!("update {} {}", entity, id), err),
    }
}

fn nothing_to_update() -> Response {
    error_response(StatusCode::BAD_REQUEST, "No fields to update")
}

/// Runs the cascading delete on a blocking worker and maps the report to a response.
async fn delete_response(store: GuardedMediaStore, entity: EntityType, id: i64) -> Response {
    let report =
        match tokio::task::spawn_blocking(move || delete_entity(store.as_ref(), entity, id)).await
        {
            Ok(report) => report,
            Err(err) => {
                error!("Deletion task for {} {} did not finish: {}", entity, id, err);
                return error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to delete {}: {}", entity, err),
                );
            }
        };
    let status = if report.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(report)).into_response()
}

// Users

async fn list_users(State(store): State<GuardedMediaStore>) -> Response {
    list_response("users", store.list_users())
}

async fn get_user(State(store): State<GuardedMediaStore>, Path(id): Path<i64>) -> Response {
    get_response(EntityType::User, id, store.get_user(id))
}

async fn create_user(
    State(store): State<GuardedMediaStore>,
    Json(payload): Json<UserPayload>,
) -> Response {
    match payload.into_new() {
        Ok(user) => created_response(EntityType::User, store.create_user(&user)),
        Err(field) => missing_field(field),
    }
}

async fn update_user(
    State(store): State<GuardedMediaStore>,
    Path(id): Path<i64>,
    Json(payload): Json<UserPayload>,
) -> Response {
    if payload.is_empty() {
        return nothing_to_update();
    }
    updated_response(EntityType::User, id, store.update_user(id, &payload))
}

async fn delete_user(State(store): State<GuardedMediaStore>, Path(id): Path<i64>) -> Response {
    delete_response(store, EntityType::User, id).await
}

// Artists

async fn list_artists(State(store): State<GuardedMediaStore>) -> Response {
    list_response("artists", store.list_artists())
}

async fn get_artist(State(store): State<GuardedMediaStore>, Path(id): Path<i64>) -> Response {
    get_response(EntityType::Artist, id, store.get_artist(id))
}

async fn create_artist(
    State(store): State<GuardedMediaStore>,
    Json(payload): Json<ArtistPayload>,
) -> Response {
    match payload.into_new() {
        Ok(artist) => created_response(EntityType::Artist, store.create_artist(&artist)),
        Err(field) => missing_field(field),
    }
}

async fn update_artist(
    State(store): State<GuardedMediaStore>,
    Path(id): Path<i64>,
    Json(payload): Json<ArtistPayload>,
) -> Response {
    if payload.is_empty() {
        return nothing_to_update();
    }
    updated_response(EntityType::Artist, id, store.update_artist(id, &payload))
}

async fn delete_artist(State(store): State<GuardedMediaStore>, Path(id): Path<i64>) -> Response {
    delete_response(store, EntityType::Artist, id).await
}

// Albums

async fn list_albums(State(store): State<GuardedMediaStore>) -> Response {
    list_response("albums", store.list_albums())
}

async fn get_album(State(store): State<GuardedMediaStore>, Path(id): Path<i64>) -> Response {
    get_response(EntityType::Album, id, store.get_album(id))
}

async fn create_album(
    State(store): State<GuardedMediaStore>,
    Json(payload): Json<AlbumPayload>,
) -> Response {
    match payload.into_new() {
        Ok(album) => created_response(EntityType::Album, store.create_album(&album)),
        Err(field) => missing_field(field),
    }
}

async fn update_album(
    State(store): State<GuardedMediaStore>,
    Path(id): Path<i64>,
    Json(payload): Json<AlbumPayload>,
) -> Response {
    if payload.is_empty() {
        return nothing_to_update();
    }
    updated_response(EntityType::Album, id, store.update_album(id, &payload))
}

async fn delete_album(State(store): State<GuardedMediaStore>, Path(id): Path<i64>) -> Response {
    delete_response(store, EntityType::Album, id).await
}

async fn add_album_contributor(
    State(store): State<GuardedMediaStore>,
    Path(id): Path<i64>,
    Json(payload): Json<ContributionPayload>,
) -> Response {
    let Some(artist_id) = payload.artist_id else {
        return missing_field("artist_id");
    };
    match store.add_album_contribution(id, artist_id, payload.role.as_deref()) {
        Ok(()) => (
            StatusCode::CREATED,
            Json(json!({
                "message": format!("artist {} credited on album {}", artist_id, id)
            })),
        )
            .into_response(),
        Err(err) => internal_error(&format!("add contributor to album {}", id), err),
    }
}

// Songs

async fn list_songs(State(store): State<GuardedMediaStore>) -> Response {
    list_response("songs", store.list_songs())
}

async fn get_song(State(store): State<GuardedMediaStore>, Path(id): Path<i64>) -> Response {
    get_response(EntityType::Song, id, store.get_song(id))
}

async fn create_song(
    State(store): State<GuardedMediaStore>,
    Json(payload): Json<SongPayload>,
) -> Response {
    match payload.into_new() {
        Ok(song) => created_response(EntityType::Song, store.create_song(&song)),
        Err(field) => missing_field(field),
    }
}

async fn update_song(
    State(store): State<GuardedMediaStore>,
    Path(id): Path<i64>,
    Json(payload): Json<SongPayload>,
) -> Response {
    if payload.is_empty() {
        return nothing_to_update();
    }
    updated_response(EntityType::Song, id, store.update_song(id, &payload))
}

async fn delete_song(State(store): State<GuardedMediaStore>, Path(id): Path<i64>) -> Response {
    delete_response(store, EntityType::Song, id).await
}

async fn add_song_contributor(
    State(store): State<GuardedMediaStore>,
    Path(id): Path<i64>,
    Json(payload): Json<ContributionPayload>,
) -> Response {
    let Some(artist_id) = payload.artist_id else {
        return missing_field("artist_id");
    };
    match store.add_song_contribution(id, artist_id, payload.role.as_deref()) {
        Ok(()) => (
            StatusCode::CREATED,
            Json(json!({
                "message": format!("artist {} credited on song {}", artist_id, id)
            })),
        )
            .into_response(),
        Err(err) => internal_error(&format!("add contributor to song {}", id), err),
    }
}

// Playlists

async fn list_playlists(State(store): State<GuardedMediaStore>) -> Response {
    list_response("playlists", store.list_playlists())
}

async fn get_playlist(State(store): State<GuardedMediaStore>, Path(id): Path<i64>) -> Response {
    get_response(EntityType::Playlist, id, store.get_playlist(id))
}

async fn create_playlist(
    State(store): State<GuardedMediaStore>,
    Json(payload): Json<PlaylistPayload>,
) -> Response {
    match payload.into_new() {
        Ok(playlist) => created_response(EntityType::Playlist, store.create_playlist(&playlist)),
        Err(field) => missing_field(field),
    }
}

async fn update_playlist(
    State(store): State<GuardedMediaStore>,
    Path(id): Path<i64>,
    Json(payload): Json<PlaylistPayload>,
) -> Response {
    if payload.is_empty() {
        return nothing_to_update();
    }
    updated_response(EntityType::Playlist, id, store.update_playlist(id, &payload))
}

async fn delete_playlist(State(store): State<GuardedMediaStore>, Path(id): Path<i64>) -> Response {
    delete_response(store, EntityType::Playlist, id).await
}

/// Resolves to a 404 response when the playlist is missing.
fn ensure_playlist(store: &GuardedMediaStore, id: i64) -> Result<(), Response> {
    match store.get_playlist(id) {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(not_found(EntityType::Playlist, id)),
        Err(err) => Err(internal_error(&format!("fetch playlist {}", id), err)),
    }
}

async fn list_playlist_songs(
    State(store): State<GuardedMediaStore>,
    Path(id): Path<i64>,
) -> Response {
    if let Err(response) = ensure_playlist(&store, id) {
        return response;
    }
    list_response("playlist songs", store.list_playlist_songs(id))
}

async fn add_playlist_song(
    State(store): State<GuardedMediaStore>,
    Path(id): Path<i64>,
    Json(payload): Json<PlaylistSongPayload>,
) -> Response {
    let Some(song_id) = payload.song_id else {
        return missing_field("song_id");
    };
    if let Err(response) = ensure_playlist(&store, id) {
        return response;
    }
    match store.add_playlist_song(id, song_id, payload.position) {
        Ok(position) => (
            StatusCode::CREATED,
            Json(json!({
                "message": format!("song {} added to playlist {}", song_id, id),
                "position": position,
            })),
        )
            .into_response(),
        Err(err) => internal_error(&format!("add song to playlist {}", id), err),
    }
}

async fn remove_playlist_song(
    State(store): State<GuardedMediaStore>,
    Path((id, song_id)): Path<(i64, i64)>,
) -> Response {
    match store.remove_playlist_song(id, song_id) {
        Ok(true) => Json(json!({
            "message": format!("song {} removed from playlist {}", song_id, id)
        }))
        .into_response(),
        Ok(false) => error_response(
            StatusCode::NOT_FOUND,
            format!("song {} is not in playlist {}", song_id, id),
        ),
        Err(err) => internal_error(&format!("remove song from playlist {}", id), err),
    }
}

// Social

async fn list_likes(State(store): State<GuardedMediaStore>, Path(id): Path<i64>) -> Response {
    list_response("likes", store.list_likes(id))
}

async fn add_like(
    State(store): State<GuardedMediaStore>,
    Path(id): Path<i64>,
    Json(payload): Json<LikePayload>,
) -> Response {
    let Some(content_type) = payload.content_type else {
        return missing_field("content_type");
    };
    let Some(content_id) = payload.content_id else {
        return missing_field("content_id");
    };
    match store.add_like(id, content_type, content_id) {
        Ok(like_id) => (
            StatusCode::CREATED,
            Json(json!({
                "message": format!("user {} liked {} {}", id, content_type, content_id),
                "id": like_id,
            })),
        )
            .into_response(),
        Err(err) => internal_error("add like", err),
    }
}

async fn add_follow(
    State(store): State<GuardedMediaStore>,
    Path(id): Path<i64>,
    Json(payload): Json<FollowPayload>,
) -> Response {
    let Some(followed_id) = payload.followed_id else {
        return missing_field("followed_id");
    };
    if followed_id == id {
        return error_response(StatusCode::BAD_REQUEST, "Users cannot follow themselves");
    }
    match store.add_follow(id, followed_id) {
        Ok(()) => (
            StatusCode::CREATED,
            Json(json!({
                "message": format!("user {} now follows user {}", id, followed_id)
            })),
        )
            .into_response(),
        Err(err) => internal_error("add follow", err),
    }
}

async fn list_followers(State(store): State<GuardedMediaStore>, Path(id): Path<i64>) -> Response {
    list_response("followers", store.list_followers(id))
}

async fn list_following(State(store): State<GuardedMediaStore>, Path(id): Path<i64>) -> Response {
    list_response("following", store.list_following(id))
}

async fn list_notifications(
    State(store): State<GuardedMediaStore>,
    Path(id): Path<i64>,
) -> Response {
    list_response("notifications", store.list_notifications(id))
}

async fn list_activity(State(store): State<GuardedMediaStore>, Path(id): Path<i64>) -> Response {
    list_response("activity", store.list_activity(id))
}

#[derive(Deserialize, Debug)]
struct CommentsQuery {
    pub content_type: Option<ContentType>,
    pub content_id: Option<i64>,
}

async fn list_comments(
    State(store): State<GuardedMediaStore>,
    Query(query): Query<CommentsQuery>,
) -> Response {
    let Some(content_type) = query.content_type else {
        return missing_field("content_type");
    };
    let Some(content_id) = query.content_id else {
        return missing_field("content_id");
    };
    list_response("comments", store.list_comments(content_type, content_id))
}

async fn add_comment(
    State(store): State<GuardedMediaStore>,
    Json(payload): Json<CommentPayload>,
) -> Response {
    let (user_id, content_type, content_id, body) = match (
        payload.user_id,
        payload.content_type,
        payload.content_id,
        payload.body,
    ) {
        (Some(u), Some(t), Some(c), Some(b)) => (u, t, c, b),
        (None, ..) => return missing_field("user_id"),
        (_, None, ..) => return missing_field("content_type"),
        (_, _, None, _) => return missing_field("content_id"),
        (.., None) => return missing_field("body"),
    };
    match store.add_comment(user_id, content_type, content_id, &body) {
        Ok(id) => (
            StatusCode::CREATED,
            Json(json!({ "message": "Comment added successfully", "id": id })),
        )
            .into_response(),
        Err(err) => internal_error("add comment", err),
    }
}

async fn add_report(
    State(store): State<GuardedMediaStore>,
    Json(payload): Json<ReportPayload>,
) -> Response {
    let (user_id, content_type, content_id, reason) = match (
        payload.user_id,
        payload.content_type,
        payload.content_id,
        payload.reason,
    ) {
        (Some(u), Some(t), Some(c), Some(r)) => (u, t, c, r),
        (None, ..) => return missing_field("user_id"),
        (_, None, ..) => return missing_field("content_type"),
        (_, _, None, _) => return missing_field("content_id"),
        (.., None) => return missing_field("reason"),
    };
    match store.add_report(user_id, content_type, content_id, &reason) {
        Ok(id) => (
            StatusCode::CREATED,
            Json(json!({ "message": "Report submitted successfully", "id": id })),
        )
            .into_response(),
        Err(err) => internal_error("add report", err),
    }
}

pub fn make_app(config: ServerConfig, store: GuardedMediaStore) -> Router {
    let state = ServerState {
        config,
        start_time: Instant::now(),
        store,
        hash: env!("GIT_HASH").to_owned(),
    };

    let user_routes: Router<ServerState> = Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/{id}/likes", get(list_likes).post(add_like))
        .route("/{id}/follows", post(add_follow))
        .route("/{id}/followers", get(list_followers))
        .route("/{id}/following", get(list_following))
        .route("/{id}/notifications", get(list_notifications))
        .route("/{id}/activity", get(list_activity));

    let artist_routes: Router<ServerState> = Router::new()
        .route("/", get(list_artists).post(create_artist))
        .route(
            "/{id}",
            get(get_artist).put(update_artist).delete(delete_artist),
        );

    let album_routes: Router<ServerState> = Router::new()
        .route("/", get(list_albums).post(create_album))
        .route("/{id}", get(get_album).put(update_album).delete(delete_album))
        .route("/{id}/contributors", post(add_album_contributor));

    let song_routes: Router<ServerState> = Router::new()
        .route("/", get(list_songs).post(create_song))
        .route("/{id}", get(get_song).put(update_song).delete(delete_song))
        .route("/{id}/contributors", post(add_song_contributor));

    let playlist_routes: Router<ServerState> = Router::new()
        .route("/", get(list_playlists).post(create_playlist))
        .route(
            "/{id}",
            get(get_playlist)
                .put(update_playlist)
                .delete(delete_playlist),
        )
        .route(
            "/{id}/songs",
            get(list_playlist_songs).post(add_playlist_song),
        )
        .route("/{id}/songs/{song_id}", delete(remove_playlist_song));

    let api_routes: Router<ServerState> = Router::new()
        .nest("/users", user_routes)
        .nest("/artists", artist_routes)
        .nest("/albums", album_routes)
        .nest("/songs", song_routes)
        .nest("/playlists", playlist_routes)
        .route("/comments", get(list_comments).post(add_comment))
        .route("/reports", post(add_report));

    Router::new()
        .route("/", get(home))
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .with_state(state)
}

pub fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

pub async fn run_server(config: ServerConfig, store: GuardedMediaStore) -> Result<()> {
    let port = config.port;
    let metrics_port = config.metrics_port;
    let app = make_app(config, store);

    let metrics_listener = tokio::net::TcpListener::bind(("0.0.0.0", metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", metrics_port))?;
    info!("Serving metrics on port {}", metrics_port);
    let metrics_server = tokio::spawn(async move {
        if let Err(err) = axum::serve(metrics_listener, make_metrics_app()).await {
            error!("Metrics server stopped: {}", err);
        }
    });

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Listening on port {}", port);

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    metrics_server.abort();
    Ok(result?)
}
