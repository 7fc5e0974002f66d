use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::{Album, Artist, Category};
use library::LibraryError;

use crate::state::{AlbumView, ArtistView, ErrorResponse};

pub fn json_error(
    status: StatusCode,
    message: impl Into<String>,
) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub fn json_error_response(status: StatusCode, message: impl Into<String>) -> Response {
    json_error(status, message).into_response()
}

pub fn library_error(err: LibraryError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &err {
        LibraryError::RootMissing(_) => StatusCode::BAD_REQUEST,
        LibraryError::TrackNotFound(_)
        | LibraryError::AlbumNotFound(_)
        | LibraryError::ArtistNotFound(_) => StatusCode::NOT_FOUND,
    };
    json_error(status, err.to_string())
}

pub fn cover_url(track_id: u32) -> String {
    format!("/api/v1/tracks/{}/cover", track_id)
}

pub fn album_view(album: Album) -> AlbumView {
    AlbumView {
        category: Category::classify(&album.artist),
        cover: cover_url(album.cover_track_id),
        album,
    }
}

pub fn artist_view(artist: Artist) -> ArtistView {
    ArtistView {
        cover: cover_url(artist.cover_track_id),
        artist,
    }
}
