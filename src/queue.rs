//! Enqueueing resolved tracks against the daemon.

use anyhow::Result;
use futures::future::try_join_all;
use mpd::song::Id;

use crate::args::Config;
use crate::model::Track;
use crate::session::DaemonSession;

/// Enqueue every track, concurrently and independently. The returned id sets
/// keep track order whatever order the requests completed in; the first
/// failed request resolves the join and drops the sibling futures.
pub async fn enqueue(
    tracks: &[Track],
    session: &DaemonSession,
    config: &Config,
) -> Result<Vec<Vec<Id>>> {
    try_join_all(
        tracks
            .iter()
            .map(|track| enqueue_track(track, session, config)),
    )
    .await
}

/// One track's request set: a playlist add when a target playlist is
/// configured, and a play-queue add when no playlist is configured or an
/// immediate start was asked for.
async fn enqueue_track(
    track: &Track,
    session: &DaemonSession,
    config: &Config,
) -> Result<Vec<Id>> {
    let mut ids = Vec::new();
    if let Some(playlist) = &config.playlist {
        log::info!("adding {} to playlist {}", track.file, playlist);
        session.playlist_add(playlist, &track.file).await?;
    }
    if config.playlist.is_none() || config.start {
        log::info!("adding {} to the current queue", track.file);
        ids.push(session.queue_add(&track.file).await?);
    }
    Ok(ids)
}

/// Start playback of the last id returned for the last track. A run that
/// queued nothing (no entries, or playlist-only adds) has nothing to play
/// and triggers nothing.
pub async fn play_last(queued: &[Vec<Id>], session: &DaemonSession) -> Result<()> {
    match queued.last().and_then(|ids| ids.last()) {
        Some(id) => {
            log::info!("playing id {}", id.0);
            session.play_id(*id).await
        }
        None => {
            log::debug!("nothing queued, skipping playback start");
            Ok(())
        }
    }
}
