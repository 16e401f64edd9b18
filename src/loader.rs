//! Resolving entries (file paths or URLs) into playable tracks.

use std::path::Path;

use anyhow::{Context, Result};
use futures::future::try_join_all;

use crate::args::Config;
use crate::model::Track;
use crate::playlist::Format;

/// Resolve every entry concurrently and flatten the results into one track
/// sequence that preserves the input order. The first failed entry resolves
/// the whole join and drops the loads still in flight.
pub async fn resolve_all(entries: &[String], config: &Config) -> Result<Vec<Track>> {
    let loaded = try_join_all(entries.iter().map(|entry| load(entry, config))).await?;
    Ok(loaded.into_iter().flatten().collect())
}

/// Load one entry. Entries with a playlist extension expand to the tracks
/// the playlist references; anything else passes through untouched as a
/// single track, without any I/O.
pub async fn load(entry: &str, config: &Config) -> Result<Vec<Track>> {
    match Format::detect(entry) {
        Some(format) => load_playlist(entry, format, config).await,
        None => {
            log::info!("have file {}", entry);
            Ok(vec![Track::new(entry)])
        }
    }
}

/// Expand a playlist entry one level. A playlist referenced from inside a
/// playlist is not expanded again; it passes through as a plain track.
async fn load_playlist(entry: &str, format: Format, config: &Config) -> Result<Vec<Track>> {
    log::info!("loading playlist {}", entry);
    let text = load_data(entry).await?;
    log::info!("parsing playlist {}", entry);
    let mut tracks = format
        .parse(&text)
        .with_context(|| format!("Failed resolving playlist {}", entry))?;
    if let Some(limit) = config.limit {
        if tracks.len() > limit {
            log::info!("limiting {} to its first {} entries", entry, limit);
            tracks.truncate(limit);
        }
    }
    Ok(tracks)
}

/// Fetch an entry's raw text, locally when its parent directory exists,
/// remotely otherwise.
///
/// The local/remote split probes the filesystem instead of sniffing URL
/// schemes: a URL's "parent directory" (`http:/radio.example`) never exists
/// locally, so URLs fall through to the fetch. The flip side is that a local
/// path under a missing directory is treated as a URL too.
async fn load_data(entry: &str) -> Result<String> {
    if tokio::fs::metadata(parent_dir(entry)).await.is_ok() {
        log::debug!("loading file {}", entry);
        tokio::fs::read_to_string(entry)
            .await
            .with_context(|| format!("Failed reading local file {}", entry))
    } else {
        log::debug!("fetching url {}", entry);
        let response = reqwest::get(entry)
            .await
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("Failed fetching {}", entry))?;
        response
            .text()
            .await
            .with_context(|| format!("Failed reading body of {}", entry))
    }
}

/// An entry's containing directory; bare names probe the working directory.
fn parent_dir(entry: &str) -> &Path {
    match Path::new(entry).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn config() -> Config {
        Config {
            entries: Vec::new(),
            playlist: None,
            limit: None,
            start: true,
            host: "localhost".to_string(),
            port: 6600,
            password: None,
            verbose: 0,
        }
    }

    #[tokio::test]
    async fn plain_entries_pass_through_unchanged() {
        let tracks = load("songs/one.mp3", &config()).await.unwrap();
        assert_eq!(tracks, vec![Track::new("songs/one.mp3")]);

        // No extension means no playlist and, crucially, no fetch.
        let tracks = load("http://radio.example/live", &config()).await.unwrap();
        assert_eq!(tracks, vec![Track::new("http://radio.example/live")]);
    }

    #[tokio::test]
    async fn playlist_files_expand_to_their_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("morning.m3u");
        fs::write(&path, "#EXTM3U\none.mp3\ntwo.mp3\n").unwrap();

        let tracks = load(path.to_str().unwrap(), &config()).await.unwrap();
        assert_eq!(tracks, vec![Track::new("one.mp3"), Track::new("two.mp3")]);
    }

    #[tokio::test]
    async fn limit_keeps_the_first_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long.m3u");
        fs::write(&path, "one.mp3\ntwo.mp3\nthree.mp3\nfour.mp3\n").unwrap();

        let mut config = config();
        config.limit = Some(2);
        let tracks = load(path.to_str().unwrap(), &config).await.unwrap();
        assert_eq!(tracks, vec![Track::new("one.mp3"), Track::new("two.mp3")]);
    }

    #[tokio::test]
    async fn playlists_expand_one_level_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outer.m3u");
        fs::write(&path, "inner.pls\nsong.mp3\n").unwrap();

        // A playlist referenced from inside a playlist stays a plain track.
        let tracks = load(path.to_str().unwrap(), &config()).await.unwrap();
        assert_eq!(tracks, vec![Track::new("inner.pls"), Track::new("song.mp3")]);
    }

    #[tokio::test]
    async fn flattening_preserves_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("first.m3u");
        fs::write(&path, "a1.mp3\na2.mp3\n").unwrap();

        let entries = vec![
            path.to_str().unwrap().to_string(),
            "b.mp3".to_string(),
        ];
        let tracks = resolve_all(&entries, &config()).await.unwrap();
        assert_eq!(
            tracks,
            vec![Track::new("a1.mp3"), Track::new("a2.mp3"), Track::new("b.mp3")]
        );
    }

    #[tokio::test]
    async fn missing_parent_directory_is_treated_as_a_url() {
        // The probe fails, so the entry goes down the fetch path and dies
        // there; it is never reported as a missing local file.
        let err = load("no-such-dir/live.pls", &config()).await.unwrap_err();
        assert!(format!("{:#}", err).contains("Failed fetching"));
    }
}
