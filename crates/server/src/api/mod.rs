pub mod browse;
pub mod library;
pub mod tracks;

use std::sync::Arc;

use ::library::{Library, LibraryError};
use axum::{
    http::{header, StatusCode, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use crate::state::{AppState, ErrorResponse, HealthResponse};
use crate::utils::{json_error, json_error_response, library_error};

type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tracks", get(tracks::list_tracks))
        .route("/tracks/:track_id", get(tracks::get_track))
        .route("/tracks/:track_id/audio", get(tracks::get_audio))
        .route("/tracks/:track_id/cover", get(tracks::get_cover))
        .route("/tracks/:track_id/lyrics", get(tracks::get_lyrics))
        .route("/tracks/:track_id/lyrics/raw", get(tracks::get_raw_lyrics))
        .route("/albums", get(browse::list_albums))
        .route("/albums/:album_id", get(browse::get_album))
        .route("/albums/:album_id/tracks", get(browse::list_album_tracks_by_id))
        .route("/album_tracks", get(browse::list_album_tracks))
        .route("/artists", get(browse::list_artists))
        .route("/artists/:artist_id", get(browse::get_artist))
        .route("/artists/:artist_id/tracks", get(browse::list_artist_tracks_by_id))
        .route("/artist_tracks", get(browse::list_artist_tracks))
        .route(
            "/library/music_dir",
            get(library::get_music_dir).post(library::update_music_dir),
        )
        .route("/library/rescan", post(library::rescan))
        .with_state(state)
}

/// The whole HTTP surface: the API under `/api/v1` plus JSON answers for
/// unknown paths and unsupported methods.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_router(state))
        .fallback(not_found)
        .layer(middleware::map_response(json_method_not_allowed))
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

async fn not_found(uri: Uri) -> Response {
    json_error_response(StatusCode::NOT_FOUND, format!("no route for {}", uri.path()))
}

async fn json_method_not_allowed(response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }
    let allow = response.headers().get(header::ALLOW).cloned();
    let mut json = json_error_response(StatusCode::METHOD_NOT_ALLOWED, "method not allowed");
    if let Some(allow) = allow {
        json.headers_mut().insert(header::ALLOW, allow);
    }
    json
}

/// Runs blocking work (scans, tag reads) off the async workers.
pub(crate) async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|err| {
        json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("background task failed: {}", err),
        )
    })
}

pub(crate) async fn with_library<T, F>(state: &AppState, work: F) -> Result<T, ApiError>
where
    F: FnOnce(&Library) -> Result<T, LibraryError> + Send + 'static,
    T: Send + 'static,
{
    let library = Arc::clone(&state.library);
    run_blocking(move || work(&library))
        .await?
        .map_err(library_error)
}

pub(crate) fn parse_track_id(raw: &str) -> Result<u32, ApiError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| json_error(StatusCode::BAD_REQUEST, format!("invalid id: {}", raw)))
}

pub(crate) fn parse_derived_id(raw: &str) -> Result<usize, ApiError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| json_error(StatusCode::BAD_REQUEST, format!("invalid id: {}", raw)))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;
    use std::sync::Arc;

    use axum::body::to_bytes;
    use axum::response::Response;
    use library::Library;
    use metadata::fixtures::{write_flac, FixturePicture};
    use parking_lot::RwLock;

    use crate::config::ServerConfig;
    use crate::state::AppState;

    pub const COVER_PNG: [u8; 6] = [0x89, b'P', b'N', b'G', 7, 7];

    /// Three albums across three artists; only `Jay/b.flac` carries a cover
    /// and lyrics. Walk order gives ids 0..=3 in the order written here.
    pub fn music_tree(root: &Path) {
        let beatles = root.join("Beatles");
        std::fs::create_dir_all(&beatles).unwrap();
        write_flac(
            &beatles.join("01.flac"),
            &[("TITLE", "Come Together"), ("ARTIST", "The Beatles"), ("ALBUM", "Abbey Road")],
            None,
        )
        .unwrap();
        write_flac(
            &beatles.join("02.flac"),
            &[("TITLE", "Something"), ("ARTIST", "The Beatles "), ("ALBUM", "Abbey Road")],
            None,
        )
        .unwrap();
        let jay = root.join("Jay");
        std::fs::create_dir_all(&jay).unwrap();
        write_flac(
            &jay.join("a.flac"),
            &[("TITLE", "晴天"), ("ARTIST", "周杰伦"), ("ALBUM", "叶惠美")],
            None,
        )
        .unwrap();
        write_flac(
            &jay.join("b.flac"),
            &[
                ("TITLE", "七里香"),
                ("ARTIST", "周杰伦"),
                ("ALBUM", "七里香"),
                ("LYRICS", "[ti:七里香]\r\n[00:01.00]窗外的麻雀\r\n\r\n[00:05.20]在电线杆上多嘴"),
            ],
            Some(FixturePicture {
                mime: "image/png",
                data: &COVER_PNG,
            }),
        )
        .unwrap();
    }

    pub fn app_state(root: &Path, config_dir: &Path) -> AppState {
        let config = ServerConfig {
            music_root: root.to_string_lossy().to_string(),
            ..ServerConfig::default()
        };
        AppState {
            library: Arc::new(Library::new(root.to_path_buf())),
            config_path: config_dir.join("config.yaml"),
            config: Arc::new(RwLock::new(config)),
        }
    }

    pub async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}
