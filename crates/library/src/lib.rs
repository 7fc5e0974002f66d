pub mod aggregate;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use common::{Album, Artist, LibraryStats, Track, AUDIO_EXTENSION};
use metadata::MetadataError;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::aggregate::{group_albums, group_artists};

/// One completed scan. Readers only ever see a whole catalog.
#[derive(Debug)]
pub struct Catalog {
    pub generation: u64,
    pub tracks: Vec<Track>,
}

/// In-memory index of the audio files under one root directory.
///
/// The first read walks the tree; every later read is answered from the
/// cached [`Catalog`] until [`Library::rescan`] replaces it. Concurrent first
/// readers queue on the scan gate and all observe the same catalog.
pub struct Library {
    root: RwLock<PathBuf>,
    catalog: RwLock<Option<Arc<Catalog>>>,
    scan_gate: Mutex<()>,
}

impl Library {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root: RwLock::new(root),
            catalog: RwLock::new(None),
            scan_gate: Mutex::new(()),
        }
    }

    pub fn root(&self) -> PathBuf {
        self.root.read().clone()
    }

    pub fn is_scanned(&self) -> bool {
        self.catalog.read().is_some()
    }

    /// Returns the current catalog, scanning the root first if nothing has
    /// been scanned yet.
    pub fn ensure_scanned(&self) -> Arc<Catalog> {
        if let Some(catalog) = self.catalog.read().as_ref() {
            return Arc::clone(catalog);
        }

        let _gate = self.scan_gate.lock();
        if let Some(catalog) = self.catalog.read().as_ref() {
            return Arc::clone(catalog);
        }

        let root = self.root();
        let catalog = Arc::new(Catalog {
            generation: 1,
            tracks: scan_tracks(&root),
        });
        *self.catalog.write() = Some(Arc::clone(&catalog));
        catalog
    }

    /// Walks the tree again, optionally switching to `new_root` first.
    ///
    /// A `new_root` that is not an existing directory is rejected before
    /// anything changes. The new catalog is built off-lock and swapped in
    /// whole, so readers keep seeing the previous one until then.
    pub fn rescan(&self, new_root: Option<PathBuf>) -> Result<LibraryStats, LibraryError> {
        if let Some(path) = &new_root {
            if !path.is_dir() {
                return Err(LibraryError::RootMissing(path.clone()));
            }
        }

        let _gate = self.scan_gate.lock();
        let root = new_root.clone().unwrap_or_else(|| self.root());
        let tracks = scan_tracks(&root);

        let generation = self
            .catalog
            .read()
            .as_ref()
            .map(|catalog| catalog.generation + 1)
            .unwrap_or(1);
        let catalog = Arc::new(Catalog { generation, tracks });
        let stats = stats_for(&catalog.tracks);

        if let Some(path) = new_root {
            info!("Music root changed to {}", path.display());
            *self.root.write() = path;
        }
        *self.catalog.write() = Some(catalog);
        Ok(stats)
    }

    pub fn stats(&self) -> LibraryStats {
        stats_for(&self.ensure_scanned().tracks)
    }

    pub fn list_tracks(&self) -> Vec<Track> {
        self.ensure_scanned().tracks.clone()
    }

    pub fn get_track(&self, id: u32) -> Result<Track, LibraryError> {
        let catalog = self.ensure_scanned();
        // ids are positions in the walk
        catalog
            .tracks
            .get(id as usize)
            .cloned()
            .ok_or(LibraryError::TrackNotFound(id))
    }

    /// Tracks whose trimmed album (and, when given, trimmed artist) match,
    /// ordered by title ignoring case.
    pub fn list_album_tracks(&self, album: &str, artist: Option<&str>) -> Vec<Track> {
        let album = album.trim();
        let artist = artist.map(str::trim).filter(|value| !value.is_empty());
        let catalog = self.ensure_scanned();
        let mut tracks: Vec<Track> = catalog
            .tracks
            .iter()
            .filter(|track| track.album.trim() == album)
            .filter(|track| artist.map_or(true, |artist| track.artist.trim() == artist))
            .cloned()
            .collect();
        tracks.sort_by_cached_key(|track| track.title.to_lowercase());
        tracks
    }

    /// Tracks whose trimmed artist matches, ordered by album then title,
    /// both ignoring case.
    pub fn list_artist_tracks(&self, artist: &str) -> Vec<Track> {
        let artist = artist.trim();
        let catalog = self.ensure_scanned();
        let mut tracks: Vec<Track> = catalog
            .tracks
            .iter()
            .filter(|track| track.artist.trim() == artist)
            .cloned()
            .collect();
        tracks.sort_by_cached_key(|track| (track.album.to_lowercase(), track.title.to_lowercase()));
        tracks
    }

    pub fn list_albums(&self) -> Vec<Album> {
        group_albums(&self.ensure_scanned().tracks)
    }

    pub fn list_artists(&self) -> Vec<Artist> {
        group_artists(&self.ensure_scanned().tracks)
    }

    /// Looks up an album by its 1-based position in [`Library::list_albums`].
    pub fn get_album(&self, id: usize) -> Result<Album, LibraryError> {
        let mut albums = self.list_albums();
        if id == 0 || id > albums.len() {
            return Err(LibraryError::AlbumNotFound(id));
        }
        Ok(albums.swap_remove(id - 1))
    }

    /// Looks up an artist by its 1-based position in [`Library::list_artists`].
    pub fn get_artist(&self, id: usize) -> Result<Artist, LibraryError> {
        let mut artists = self.list_artists();
        if id == 0 || id > artists.len() {
            return Err(LibraryError::ArtistNotFound(id));
        }
        Ok(artists.swap_remove(id - 1))
    }

    /// Tracks of the album at 1-based `id`, matched on the exact trimmed
    /// album and artist pair (an empty artist included) from one catalog.
    pub fn get_album_tracks(&self, id: usize) -> Result<Vec<Track>, LibraryError> {
        let catalog = self.ensure_scanned();
        let albums = group_albums(&catalog.tracks);
        let album = match id.checked_sub(1).and_then(|index| albums.get(index)) {
            Some(album) => album,
            None => return Err(LibraryError::AlbumNotFound(id)),
        };
        let mut tracks: Vec<Track> = catalog
            .tracks
            .iter()
            .filter(|track| track.album.trim() == album.name && track.artist.trim() == album.artist)
            .cloned()
            .collect();
        tracks.sort_by_cached_key(|track| track.title.to_lowercase());
        Ok(tracks)
    }

    pub fn get_artist_tracks(&self, id: usize) -> Result<Vec<Track>, LibraryError> {
        let catalog = self.ensure_scanned();
        let artists = group_artists(&catalog.tracks);
        let artist = match id.checked_sub(1).and_then(|index| artists.get(index)) {
            Some(artist) => artist,
            None => return Err(LibraryError::ArtistNotFound(id)),
        };
        let mut tracks: Vec<Track> = catalog
            .tracks
            .iter()
            .filter(|track| track.artist.trim() == artist.name)
            .cloned()
            .collect();
        tracks.sort_by_cached_key(|track| (track.album.to_lowercase(), track.title.to_lowercase()));
        Ok(tracks)
    }
}

#[derive(Debug)]
pub enum LibraryError {
    RootMissing(PathBuf),
    TrackNotFound(u32),
    AlbumNotFound(usize),
    ArtistNotFound(usize),
}

impl std::fmt::Display for LibraryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LibraryError::RootMissing(path) => {
                write!(f, "directory does not exist: {}", path.display())
            }
            LibraryError::TrackNotFound(id) => write!(f, "track not found: {}", id),
            LibraryError::AlbumNotFound(id) => write!(f, "album not found: {}", id),
            LibraryError::ArtistNotFound(id) => write!(f, "artist not found: {}", id),
        }
    }
}

impl std::error::Error for LibraryError {}

fn stats_for(tracks: &[Track]) -> LibraryStats {
    LibraryStats {
        artists: group_artists(tracks).len(),
        albums: group_albums(tracks).len(),
        tracks: tracks.len(),
    }
}

/// Walks `root` in file-name order and indexes every audio file.
///
/// Entries that fail during the walk are skipped, as are files that cannot
/// be opened. Files whose tags do not parse are still indexed under their
/// file name. Ids are assigned from 0 in walk order.
fn scan_tracks(root: &Path) -> Vec<Track> {
    let started = Instant::now();
    info!("Scanning {}", root.display());

    let mut tracks = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Skipping unreadable entry: {}", err);
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_audio_file(entry.path()) {
            continue;
        }

        let tags = match metadata::extract(entry.path()) {
            Ok(tags) => tags,
            Err(MetadataError::Io(err)) => {
                warn!("Skipping {:?}: {}", entry.path(), err);
                continue;
            }
            Err(err) => {
                debug!("Indexing {:?} without tags: {}", entry.path(), err);
                metadata::TrackTags {
                    title: entry.file_name().to_string_lossy().to_string(),
                    ..metadata::TrackTags::default()
                }
            }
        };

        tracks.push(Track {
            id: tracks.len() as u32,
            path: entry.into_path(),
            title: tags.title,
            artist: tags.artist,
            album: tags.album,
            has_cover: tags.has_cover,
            has_lyrics: tags.has_lyrics,
        });
    }

    info!(
        "Indexed {} tracks under {} in {:?}",
        tracks.len(),
        root.display(),
        started.elapsed()
    );
    tracks
}

fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(AUDIO_EXTENSION))
        .unwrap_or(false)
}
