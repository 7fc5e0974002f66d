use std::io::SeekFrom;
use std::path::Path;

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use common::AUDIO_MIME;
use metadata::CoverArt;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;
use tracing::warn;

use crate::range::{parse_range_header, ByteRange, RangeError};
use crate::utils::json_error_response;

/// Streams an audio file, honoring a single-range `Range` header.
///
/// Files without a known length (anything that is not a regular file) are
/// always sent whole. Any failure to open the file, including one that was
/// removed after the scan, is a server error.
pub async fn audio_response(path: &Path, headers: &HeaderMap) -> Response {
    let mut file = match File::open(path).await {
        Ok(file) => file,
        Err(err) => {
            warn!("Failed to open {:?}: {}", path, err);
            return json_error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("failed to open audio: {}", err),
            );
        }
    };
    let meta = match file.metadata().await {
        Ok(meta) => meta,
        Err(err) => {
            warn!("Failed to stat {:?}: {}", path, err);
            return json_error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("failed to read audio: {}", err),
            );
        }
    };
    if !meta.is_file() {
        return full_response(file, None);
    }

    let size = meta.len();
    let requested = headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok());
    let range = match requested {
        Some(value) => parse_range_header(value, size),
        None => Ok(None),
    };

    match range {
        Ok(None) => full_response(file, Some(size)),
        Ok(Some(range)) => {
            if let Err(err) = file.seek(SeekFrom::Start(range.start)).await {
                warn!("Failed to seek {:?}: {}", path, err);
                return json_error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("failed to read audio: {}", err),
                );
            }
            partial_response(file, range, size)
        }
        Err(RangeError::Unsatisfiable) => unsatisfiable_response(size),
        Err(RangeError::Invalid) => json_error_response(StatusCode::BAD_REQUEST, "invalid range"),
    }
}

fn full_response(file: File, size: Option<u64>) -> Response {
    let mut response = Response::new(Body::from_stream(ReaderStream::new(file)));
    insert_audio_headers(response.headers_mut());
    if let Some(size) = size {
        response
            .headers_mut()
            .insert(header::CONTENT_LENGTH, HeaderValue::from(size));
    }
    response
}

fn partial_response(file: File, range: ByteRange, size: u64) -> Response {
    let body = ReaderStream::new(file.take(range.len()));
    let mut response = Response::new(Body::from_stream(body));
    *response.status_mut() = StatusCode::PARTIAL_CONTENT;
    let headers = response.headers_mut();
    insert_audio_headers(headers);
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(range.len()));
    if let Ok(value) =
        HeaderValue::from_str(&format!("bytes {}-{}/{}", range.start, range.end, size))
    {
        headers.insert(header::CONTENT_RANGE, value);
    }
    response
}

fn unsatisfiable_response(size: u64) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::RANGE_NOT_SATISFIABLE;
    let headers = response.headers_mut();
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    if let Ok(value) = HeaderValue::from_str(&format!("bytes */{}", size)) {
        headers.insert(header::CONTENT_RANGE, value);
    }
    response
}

fn insert_audio_headers(headers: &mut HeaderMap) {
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(AUDIO_MIME));
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
}

pub fn cover_response(cover: CoverArt) -> Response {
    let mut response = Response::new(Body::from(cover.data));
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&cover.mime)
            .unwrap_or(HeaderValue::from_static("application/octet-stream")),
    );
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=86400"),
    );
    response
}
