use std::path::PathBuf;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::Json;
use common::{Album, Artist, Category, LibraryStats};
use library::Library;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub library: Arc<Library>,
    pub config_path: PathBuf,
    pub config: Arc<RwLock<ServerConfig>>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub type JsonResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

/// Album as served to clients: the stored album plus the script category of
/// its artist and a link to its cover image.
#[derive(Debug, Serialize)]
pub struct AlbumView {
    #[serde(flatten)]
    pub album: Album,
    pub category: Category,
    pub cover: String,
}

#[derive(Debug, Serialize)]
pub struct ArtistView {
    #[serde(flatten)]
    pub artist: Artist,
    pub cover: String,
}

#[derive(Debug, Serialize)]
pub struct LyricsResponse {
    pub lyrics: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicDirResponse {
    pub music_dir: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicDirUpdated {
    pub music_dir: String,
    #[serde(flatten)]
    pub stats: LibraryStats,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMusicDirRequest {
    pub music_dir: String,
}

#[derive(Deserialize)]
pub struct AlbumTracksQuery {
    pub album: Option<String>,
    pub artist: Option<String>,
}

#[derive(Deserialize)]
pub struct ArtistTracksQuery {
    pub artist: Option<String>,
}
