use axum::{
    extract::{Path as AxumPath, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use common::Track;
use metadata::MetadataError;
use tracing::warn;

use super::{parse_track_id, run_blocking, with_library};
use crate::state::{AppState, JsonResult, LyricsResponse};
use crate::streaming::{audio_response, cover_response};
use crate::utils::{json_error, json_error_response};

pub async fn list_tracks(State(state): State<AppState>) -> JsonResult<Vec<Track>> {
    let tracks = with_library(&state, |library| Ok(library.list_tracks())).await?;
    Ok(Json(tracks))
}

pub async fn get_track(
    State(state): State<AppState>,
    AxumPath(track_id): AxumPath<String>,
) -> JsonResult<Track> {
    let id = parse_track_id(&track_id)?;
    let track = with_library(&state, move |library| library.get_track(id)).await?;
    Ok(Json(track))
}

pub async fn get_audio(
    State(state): State<AppState>,
    AxumPath(track_id): AxumPath<String>,
    headers: HeaderMap,
) -> Response {
    let track = match lookup(&state, &track_id).await {
        Ok(track) => track,
        Err(response) => return response,
    };
    audio_response(&track.path, &headers).await
}

pub async fn get_cover(
    State(state): State<AppState>,
    AxumPath(track_id): AxumPath<String>,
) -> Response {
    let track = match lookup(&state, &track_id).await {
        Ok(track) => track,
        Err(response) => return response,
    };
    let path = track.path.clone();
    let cover = match run_blocking(move || metadata::read_cover(&path)).await {
        Ok(cover) => cover,
        Err(err) => return err.into_response(),
    };
    match cover {
        Ok(Some(cover)) => cover_response(cover),
        Ok(None) => json_error_response(StatusCode::NOT_FOUND, "cover not found"),
        Err(err) => tag_read_error(&track, err, "cover not found").into_response(),
    }
}

pub async fn get_lyrics(
    State(state): State<AppState>,
    AxumPath(track_id): AxumPath<String>,
) -> JsonResult<LyricsResponse> {
    let raw = read_lyrics(&state, &track_id).await?;
    Ok(Json(LyricsResponse {
        lyrics: metadata::clean_lyrics(&raw),
    }))
}

pub async fn get_raw_lyrics(
    State(state): State<AppState>,
    AxumPath(track_id): AxumPath<String>,
) -> JsonResult<LyricsResponse> {
    let lyrics = read_lyrics(&state, &track_id).await?;
    Ok(Json(LyricsResponse { lyrics }))
}

async fn lookup(state: &AppState, track_id: &str) -> Result<Track, Response> {
    let id = parse_track_id(track_id).map_err(IntoResponse::into_response)?;
    with_library(state, move |library| library.get_track(id))
        .await
        .map_err(IntoResponse::into_response)
}

async fn read_lyrics(
    state: &AppState,
    track_id: &str,
) -> Result<String, (StatusCode, Json<crate::state::ErrorResponse>)> {
    let id = parse_track_id(track_id)?;
    let track = with_library(state, move |library| library.get_track(id)).await?;
    let path = track.path.clone();
    match run_blocking(move || metadata::read_lyrics(&path)).await? {
        Ok(Some(lyrics)) => Ok(lyrics),
        Ok(None) => Err(json_error(StatusCode::NOT_FOUND, "lyrics not found")),
        Err(err) => Err(tag_read_error(&track, err, "lyrics not found")),
    }
}

/// Tags that no longer parse have nothing to serve. Any IO failure,
/// including a file removed after the scan, is a server error.
fn tag_read_error(
    track: &Track,
    err: MetadataError,
    missing: &str,
) -> (StatusCode, Json<crate::state::ErrorResponse>) {
    match err {
        MetadataError::Io(err) => {
            warn!("Failed to read tags of {:?}: {}", track.path, err);
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("failed to read track: {}", err),
            )
        }
        MetadataError::Lofty(err) => {
            warn!("No tags readable in {:?}: {}", track.path, err);
            json_error(StatusCode::NOT_FOUND, missing)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{get_audio, get_cover, get_lyrics, get_raw_lyrics, get_track, list_tracks};
    use crate::api::test_support::{app_state, body_json, music_tree, COVER_PNG};
    use axum::body::to_bytes;
    use axum::extract::{Path, State};
    use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
    use axum::response::IntoResponse;

    fn setup() -> (tempfile::TempDir, crate::state::AppState) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("music");
        music_tree(&root);
        let state = app_state(&root, dir.path());
        (dir, state)
    }

    #[tokio::test]
    async fn lists_every_track() {
        let (_dir, state) = setup();
        let tracks = list_tracks(State(state)).await.unwrap().0;
        assert_eq!(tracks.len(), 4);
        assert_eq!(tracks[0].title, "Come Together");
        assert!(tracks[3].has_cover);
        assert!(tracks[3].has_lyrics);
    }

    #[tokio::test]
    async fn track_lookup_reports_missing_and_malformed_ids() {
        let (_dir, state) = setup();
        let track = get_track(State(state.clone()), Path("2".to_string()))
            .await
            .unwrap()
            .0;
        assert_eq!(track.title, "晴天");

        let response = get_track(State(state.clone()), Path("99".to_string()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "track not found: 99");

        let response = get_track(State(state), Path("x".to_string()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn audio_honors_range() {
        let (_dir, state) = setup();
        let mut headers = HeaderMap::new();
        headers.insert(header::RANGE, HeaderValue::from_static("bytes=0-3"));
        let response = get_audio(State(state), Path("0".to_string()), headers).await;

        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/flac");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body.as_ref(), b"fLaC");
    }

    #[tokio::test]
    async fn audio_for_unknown_track_is_404() {
        let (_dir, state) = setup();
        let response = get_audio(State(state), Path("42".to_string()), HeaderMap::new()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cover_is_served_with_its_mime() {
        let (_dir, state) = setup();
        let response = get_cover(State(state.clone()), Path("3".to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body.as_ref(), &COVER_PNG);

        let response = get_cover(State(state), Path("0".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn lyrics_are_cleaned_and_raw_is_untouched() {
        let (_dir, state) = setup();
        let clean = get_lyrics(State(state.clone()), Path("3".to_string()))
            .await
            .unwrap()
            .0;
        assert_eq!(clean.lyrics, "窗外的麻雀\n在电线杆上多嘴");

        let raw = get_raw_lyrics(State(state.clone()), Path("3".to_string()))
            .await
            .unwrap()
            .0;
        assert!(raw.lyrics.starts_with("[ti:七里香]"));

        let response = get_lyrics(State(state), Path("1".to_string()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "lyrics not found");
    }

    #[tokio::test]
    async fn removed_file_is_a_server_error_for_every_read() {
        let (dir, state) = setup();
        state.library.ensure_scanned();
        std::fs::remove_file(dir.path().join("music").join("Jay").join("b.flac")).unwrap();

        let response = get_audio(State(state.clone()), Path("3".to_string()), HeaderMap::new()).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = get_cover(State(state.clone()), Path("3".to_string())).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = get_lyrics(State(state.clone()), Path("3".to_string()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = get_raw_lyrics(State(state), Path("3".to_string()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
