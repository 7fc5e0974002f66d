//! Album and artist views derived from the flat track list.

use std::collections::HashMap;

use common::{Album, Artist, Category, Track};

struct Group {
    name: String,
    artist: String,
    count: usize,
    first_track_id: u32,
    cover_track_id: u32,
    has_cover: bool,
}

impl Group {
    fn new(name: &str, artist: &str, track: &Track) -> Self {
        Self {
            name: name.to_string(),
            artist: artist.to_string(),
            count: 0,
            first_track_id: track.id,
            cover_track_id: track.id,
            has_cover: false,
        }
    }

    fn add(&mut self, track: &Track) {
        self.count += 1;
        if track.has_cover && !self.has_cover {
            self.cover_track_id = track.id;
            self.has_cover = true;
        }
    }
}

/// Groups tracks by trimmed (album, artist). Tracks with no album are left
/// out. Ids are 1-based positions after sorting by name, then artist.
pub fn group_albums(tracks: &[Track]) -> Vec<Album> {
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();

    for track in tracks {
        let name = track.album.trim();
        if name.is_empty() {
            continue;
        }
        let artist = track.artist.trim();
        let slot = *index
            .entry((name.to_string(), artist.to_string()))
            .or_insert_with(|| {
                groups.push(Group::new(name, artist, track));
                groups.len() - 1
            });
        groups[slot].add(track);
    }

    groups.sort_by_cached_key(|g| {
        (
            g.name.to_lowercase(),
            g.artist.to_lowercase(),
            g.name.clone(),
            g.artist.clone(),
        )
    });

    groups
        .into_iter()
        .enumerate()
        .map(|(idx, g)| Album {
            id: idx + 1,
            name: g.name,
            artist: g.artist,
            track_count: g.count,
            cover_track_id: g.cover_track_id,
            first_track_id: g.first_track_id,
        })
        .collect()
}

/// Groups tracks by trimmed artist name and tags each artist with its
/// script category. Tracks with no artist are left out.
pub fn group_artists(tracks: &[Track]) -> Vec<Artist> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();

    for track in tracks {
        let name = track.artist.trim();
        if name.is_empty() {
            continue;
        }
        let slot = *index.entry(name.to_string()).or_insert_with(|| {
            groups.push(Group::new(name, name, track));
            groups.len() - 1
        });
        groups[slot].add(track);
    }

    groups.sort_by_cached_key(|g| (g.name.to_lowercase(), g.name.clone()));

    groups
        .into_iter()
        .enumerate()
        .map(|(idx, g)| Artist {
            id: idx + 1,
            category: Category::classify(&g.name),
            name: g.name,
            song_count: g.count,
            cover_track_id: g.cover_track_id,
        })
        .collect()
}
