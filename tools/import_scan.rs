use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

use library::Library;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let music_root = env::args()
        .nth(1)
        .or_else(|| env::var("MUSIC_ROOT").ok())
        .ok_or("MUSIC_ROOT not set and no path argument")?;
    let music_root = PathBuf::from(music_root);
    if !music_root.is_dir() {
        return Err(format!("not a directory: {}", music_root.display()).into());
    }

    let library = Library::new(music_root);
    let stats = library.stats();
    println!(
        "Indexed: {} artists, {} albums, {} tracks",
        stats.artists, stats.albums, stats.tracks
    );

    let mut by_category: BTreeMap<&'static str, usize> = BTreeMap::new();
    for artist in library.list_artists() {
        *by_category.entry(artist.category.as_str()).or_default() += 1;
    }
    for (category, count) in by_category {
        println!("  {:<9} {}", category, count);
    }

    Ok(())
}
