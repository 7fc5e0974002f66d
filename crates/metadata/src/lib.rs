mod lyrics;

#[cfg(any(test, feature = "test-util"))]
pub mod fixtures;

use std::fs::File;
use std::path::Path;

use lofty::error::LoftyError;
use lofty::picture::{Picture, PictureType};
use lofty::prelude::{ItemKey, TaggedFileExt};
use lofty::tag::Tag;
use tracing::debug;

pub use lyrics::clean_lyrics;

const DEFAULT_COVER_MIME: &str = "image/jpeg";
const RAW_LYRICS_KEYS: [&str; 2] = ["LYRICS", "UNSYNCEDLYRICS"];

/// What the scanner keeps from a file's tags.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TrackTags {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub has_cover: bool,
    pub has_lyrics: bool,
}

#[derive(Debug, Clone)]
pub struct CoverArt {
    pub data: Vec<u8>,
    pub mime: String,
}

#[derive(Debug)]
pub enum MetadataError {
    Io(std::io::Error),
    Lofty(LoftyError),
}

impl std::fmt::Display for MetadataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataError::Io(err) => write!(f, "io error: {}", err),
            MetadataError::Lofty(err) => write!(f, "tag error: {}", err),
        }
    }
}

impl std::error::Error for MetadataError {}

impl From<std::io::Error> for MetadataError {
    fn from(err: std::io::Error) -> Self {
        MetadataError::Io(err)
    }
}

impl From<LoftyError> for MetadataError {
    fn from(err: LoftyError) -> Self {
        MetadataError::Lofty(err)
    }
}

/// Reads the tags the catalog needs.
///
/// Only opening the file can fail. A tag container that does not parse is
/// logged and yields the fallback record: the file name as title, empty
/// artist and album, and no cover or lyrics.
pub fn extract(path: &Path) -> Result<TrackTags, MetadataError> {
    let mut file = File::open(path)?;
    let mut info = TrackTags {
        title: file_name(path),
        ..TrackTags::default()
    };

    let tagged_file = match lofty::read_from(&mut file) {
        Ok(tagged_file) => tagged_file,
        Err(err) => {
            debug!("Unreadable tags in {:?}: {}", path, err);
            return Ok(info);
        }
    };

    if let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) {
        if let Some(title) = non_empty(tag.get_string(&ItemKey::TrackTitle)) {
            info.title = title.to_string();
        }
        let track_artist = tag.get_string(&ItemKey::TrackArtist);
        let album_artist = tag.get_string(&ItemKey::AlbumArtist);
        info.artist = non_empty(track_artist)
            .or(album_artist)
            .map(|v| v.to_string())
            .unwrap_or_default();
        info.album = tag
            .get_string(&ItemKey::AlbumTitle)
            .map(|v| v.to_string())
            .unwrap_or_default();
        info.has_cover = pick_picture(tag.pictures()).is_some();
        info.has_lyrics = find_lyrics(tag).is_some();
    }

    Ok(info)
}

/// Returns the embedded cover, preferring the front cover picture.
///
/// The MIME type is taken from the picture block as-is; pictures without
/// one are reported as JPEG.
pub fn read_cover(path: &Path) -> Result<Option<CoverArt>, MetadataError> {
    let mut file = File::open(path)?;
    let tagged_file = lofty::read_from(&mut file)?;
    let tag = match tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) {
        Some(tag) => tag,
        None => return Ok(None),
    };

    let picture = match pick_picture(tag.pictures()) {
        Some(picture) => picture,
        None => return Ok(None),
    };

    let mime = picture
        .mime_type()
        .map(|mime| mime.as_str().to_string())
        .filter(|mime| !mime.is_empty())
        .unwrap_or_else(|| DEFAULT_COVER_MIME.to_string());
    Ok(Some(CoverArt {
        data: picture.data().to_vec(),
        mime,
    }))
}

/// Returns the embedded lyrics text untouched.
pub fn read_lyrics(path: &Path) -> Result<Option<String>, MetadataError> {
    let mut file = File::open(path)?;
    let tagged_file = lofty::read_from(&mut file)?;
    let lyrics = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag())
        .and_then(find_lyrics)
        .map(|text| text.to_string());
    Ok(lyrics)
}

fn find_lyrics(tag: &Tag) -> Option<&str> {
    if let Some(text) = non_empty(tag.get_string(&ItemKey::Lyrics)) {
        return Some(text);
    }
    // Fields lofty does not map keep their raw key.
    for item in tag.items() {
        if let ItemKey::Unknown(key) = item.key() {
            if !RAW_LYRICS_KEYS.iter().any(|k| key.eq_ignore_ascii_case(k)) {
                continue;
            }
            if let Some(text) = non_empty(item.value().text()) {
                return Some(text);
            }
        }
    }
    None
}

fn pick_picture(pictures: &[Picture]) -> Option<&Picture> {
    for picture in pictures {
        if picture.pic_type() == PictureType::CoverFront && !picture.data().is_empty() {
            return Some(picture);
        }
    }
    pictures.iter().find(|picture| !picture.data().is_empty())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
