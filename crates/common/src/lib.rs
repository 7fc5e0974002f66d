use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Audio extension picked up by the scanner, compared case-insensitively.
pub const AUDIO_EXTENSION: &str = "flac";

/// Content type sent with every audio response.
pub const AUDIO_MIME: &str = "audio/flac";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: u32,
    #[serde(skip)]
    pub path: PathBuf,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub has_cover: bool,
    pub has_lyrics: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: usize,
    pub name: String,
    pub artist: String,
    #[serde(rename = "songCount")]
    pub track_count: usize,
    pub cover_track_id: u32,
    pub first_track_id: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    pub id: usize,
    pub name: String,
    pub song_count: usize,
    pub cover_track_id: u32,
    pub category: Category,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Chinese,
    Japanese,
    Korean,
    Western,
    Other,
}

impl Category {
    /// Buckets a name by the scripts it contains.
    ///
    /// This is a code-point heuristic, not a language detector. Any CJK
    /// ideograph wins as `Chinese` (ideographs are shared with Japanese, so
    /// the Chinese test runs first), then kana makes it `Japanese`, then
    /// Hangul syllables make it `Korean`. Everything else, including
    /// romanized Asian names such as "BTS", lands in `Western`.
    pub fn classify(name: &str) -> Category {
        if name.chars().any(is_cjk_ideograph) {
            Category::Chinese
        } else if name.chars().any(is_japanese) {
            Category::Japanese
        } else if name.chars().any(is_hangul) {
            Category::Korean
        } else {
            Category::Western
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Chinese => "chinese",
            Category::Japanese => "japanese",
            Category::Korean => "korean",
            Category::Western => "western",
            Category::Other => "other",
        }
    }
}

fn is_cjk_ideograph(ch: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&ch)
}

fn is_japanese(ch: char) -> bool {
    // hiragana, katakana, shared ideographs
    ('\u{3040}'..='\u{309F}').contains(&ch)
        || ('\u{30A0}'..='\u{30FF}').contains(&ch)
        || ('\u{4E00}'..='\u{9FAF}').contains(&ch)
}

fn is_hangul(ch: char) -> bool {
    ('\u{AC00}'..='\u{D7AF}').contains(&ch)
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LibraryStats {
    pub artists: usize,
    pub albums: usize,
    pub tracks: usize,
}
