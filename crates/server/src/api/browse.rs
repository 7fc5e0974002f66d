use axum::{
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
    Json,
};
use common::Track;

use super::{parse_derived_id, with_library};
use crate::state::{
    AlbumTracksQuery, AlbumView, AppState, ArtistTracksQuery, ArtistView, JsonResult,
};
use crate::utils::{album_view, artist_view, json_error};

pub async fn list_albums(State(state): State<AppState>) -> JsonResult<Vec<AlbumView>> {
    let albums = with_library(&state, |library| Ok(library.list_albums())).await?;
    Ok(Json(albums.into_iter().map(album_view).collect()))
}

pub async fn get_album(
    State(state): State<AppState>,
    AxumPath(album_id): AxumPath<String>,
) -> JsonResult<AlbumView> {
    let id = parse_derived_id(&album_id)?;
    let album = with_library(&state, move |library| library.get_album(id)).await?;
    Ok(Json(album_view(album)))
}

pub async fn list_album_tracks_by_id(
    State(state): State<AppState>,
    AxumPath(album_id): AxumPath<String>,
) -> JsonResult<Vec<Track>> {
    let id = parse_derived_id(&album_id)?;
    let tracks = with_library(&state, move |library| library.get_album_tracks(id)).await?;
    Ok(Json(tracks))
}

pub async fn list_album_tracks(
    State(state): State<AppState>,
    Query(query): Query<AlbumTracksQuery>,
) -> JsonResult<Vec<Track>> {
    let album = match query.album.filter(|album| !album.trim().is_empty()) {
        Some(album) => album,
        None => return Err(json_error(StatusCode::BAD_REQUEST, "album is required")),
    };
    let artist = query.artist;
    let tracks = with_library(&state, move |library| {
        Ok(library.list_album_tracks(&album, artist.as_deref()))
    })
    .await?;
    Ok(Json(tracks))
}

pub async fn list_artists(State(state): State<AppState>) -> JsonResult<Vec<ArtistView>> {
    let artists = with_library(&state, |library| Ok(library.list_artists())).await?;
    Ok(Json(artists.into_iter().map(artist_view).collect()))
}

pub async fn get_artist(
    State(state): State<AppState>,
    AxumPath(artist_id): AxumPath<String>,
) -> JsonResult<ArtistView> {
    let id = parse_derived_id(&artist_id)?;
    let artist = with_library(&state, move |library| library.get_artist(id)).await?;
    Ok(Json(artist_view(artist)))
}

pub async fn list_artist_tracks_by_id(
    State(state): State<AppState>,
    AxumPath(artist_id): AxumPath<String>,
) -> JsonResult<Vec<Track>> {
    let id = parse_derived_id(&artist_id)?;
    let tracks = with_library(&state, move |library| library.get_artist_tracks(id)).await?;
    Ok(Json(tracks))
}

pub async fn list_artist_tracks(
    State(state): State<AppState>,
    Query(query): Query<ArtistTracksQuery>,
) -> JsonResult<Vec<Track>> {
    let artist = match query.artist.filter(|artist| !artist.trim().is_empty()) {
        Some(artist) => artist,
        None => return Err(json_error(StatusCode::BAD_REQUEST, "artist is required")),
    };
    let tracks =
        with_library(&state, move |library| Ok(library.list_artist_tracks(&artist))).await?;
    Ok(Json(tracks))
}

#[cfg(test)]
mod tests {
    use super::{
        get_album, get_artist, list_album_tracks, list_album_tracks_by_id, list_albums,
        list_artist_tracks, list_artist_tracks_by_id, list_artists,
    };
    use crate::api::test_support::{app_state, body_json, music_tree};
    use crate::state::{AlbumTracksQuery, ArtistTracksQuery};
    use axum::extract::{Path, Query, State};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    fn setup() -> (tempfile::TempDir, crate::state::AppState) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("music");
        music_tree(&root);
        let state = app_state(&root, dir.path());
        (dir, state)
    }

    #[tokio::test]
    async fn albums_carry_category_and_cover_link() {
        let (_dir, state) = setup();
        let response = list_albums(State(state)).await.into_response();
        let albums = body_json(response).await;
        let albums = albums.as_array().unwrap();
        assert_eq!(albums.len(), 3);

        let abbey = albums.iter().find(|a| a["name"] == "Abbey Road").unwrap();
        assert_eq!(abbey["artist"], "The Beatles");
        assert_eq!(abbey["songCount"], 2);
        assert_eq!(abbey["category"], "western");
        assert_eq!(abbey["cover"], "/api/v1/tracks/0/cover");

        let qilixiang = albums.iter().find(|a| a["name"] == "七里香").unwrap();
        assert_eq!(qilixiang["category"], "chinese");
        assert_eq!(qilixiang["coverTrackId"], 3);
    }

    #[tokio::test]
    async fn album_by_id_and_its_tracks() {
        let (_dir, state) = setup();
        let albums = list_albums(State(state.clone())).await.unwrap().0;
        let abbey = albums.iter().find(|a| a.album.name == "Abbey Road").unwrap();

        let album = get_album(State(state.clone()), Path(abbey.album.id.to_string()))
            .await
            .unwrap()
            .0;
        assert_eq!(album.album, abbey.album);

        let tracks = list_album_tracks_by_id(State(state.clone()), Path(abbey.album.id.to_string()))
            .await
            .unwrap()
            .0;
        let titles: Vec<&str> = tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Come Together", "Something"]);

        let response = get_album(State(state), Path("0".to_string()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn album_tracks_by_name_require_album() {
        let (_dir, state) = setup();
        let tracks = list_album_tracks(
            State(state.clone()),
            Query(AlbumTracksQuery {
                album: Some("Abbey Road".to_string()),
                artist: Some(" The Beatles".to_string()),
            }),
        )
        .await
        .unwrap()
        .0;
        assert_eq!(tracks.len(), 2);

        let response = list_album_tracks(
            State(state),
            Query(AlbumTracksQuery {
                album: None,
                artist: None,
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "album is required");
    }

    #[tokio::test]
    async fn artists_and_their_tracks() {
        let (_dir, state) = setup();
        let artists = list_artists(State(state.clone())).await.unwrap().0;
        assert_eq!(artists.len(), 2);
        let jay = artists.iter().find(|a| a.artist.name == "周杰伦").unwrap();
        assert_eq!(jay.artist.song_count, 2);
        assert_eq!(jay.cover, "/api/v1/tracks/3/cover");

        let artist = get_artist(State(state.clone()), Path(jay.artist.id.to_string()))
            .await
            .unwrap()
            .0;
        assert_eq!(artist.artist, jay.artist);

        let tracks = list_artist_tracks_by_id(State(state.clone()), Path(jay.artist.id.to_string()))
            .await
            .unwrap()
            .0;
        let titles: Vec<&str> = tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["七里香", "晴天"]);

        let by_name = list_artist_tracks(
            State(state.clone()),
            Query(ArtistTracksQuery {
                artist: Some("周杰伦".to_string()),
            }),
        )
        .await
        .unwrap()
        .0;
        assert_eq!(by_name, tracks);

        let response = get_artist(State(state), Path("nope".to_string()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
