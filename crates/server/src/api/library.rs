use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use common::LibraryStats;
use tracing::{info, warn};

use super::{run_blocking, with_library};
use crate::config::{resolve_path, save_config};
use crate::state::{
    AppState, JsonResult, MusicDirResponse, MusicDirUpdated, UpdateMusicDirRequest,
};
use crate::utils::{json_error, library_error};

pub async fn get_music_dir(State(state): State<AppState>) -> JsonResult<MusicDirResponse> {
    Ok(Json(MusicDirResponse {
        music_dir: state.library.root().to_string_lossy().to_string(),
    }))
}

/// Switches the library to a new root and rescans it. The root is only
/// persisted to the config file once the scan has accepted it. The config
/// lock is held across the rescan and the save, so the saved root always
/// matches the one the library ended up on.
pub async fn update_music_dir(
    State(state): State<AppState>,
    Json(payload): Json<UpdateMusicDirRequest>,
) -> JsonResult<MusicDirUpdated> {
    let requested = payload.music_dir.trim().to_string();
    if requested.is_empty() {
        return Err(json_error(StatusCode::BAD_REQUEST, "musicDir is required"));
    }

    let root = resolve_path(&state.config_path, &requested);
    let new_root = root.clone();
    let library = Arc::clone(&state.library);
    let config = Arc::clone(&state.config);
    let config_path = state.config_path.clone();
    let stats = run_blocking(move || {
        let mut config = config.write();
        let stats = library.rescan(Some(new_root))?;
        config.music_root = requested;
        if let Err(err) = save_config(&config_path, &config) {
            warn!("Failed to save config {:?}: {}", config_path, err);
        }
        Ok(stats)
    })
    .await?
    .map_err(library_error)?;

    info!(
        "Music directory set to {} ({} tracks)",
        root.display(),
        stats.tracks
    );

    Ok(Json(MusicDirUpdated {
        music_dir: root.to_string_lossy().to_string(),
        stats,
    }))
}

pub async fn rescan(State(state): State<AppState>) -> JsonResult<LibraryStats> {
    let stats = with_library(&state, |library| library.rescan(None)).await?;
    Ok(Json(stats))
}
