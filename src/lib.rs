//! Cast files, URLs and playlists onto an mpd play queue.
//!
//! Entries that look like playlist documents (pls, m3u, asx) are resolved
//! into their tracks first, local or over HTTP; everything else is handed to
//! the daemon as-is.

pub mod args;
pub mod loader;
pub mod model;
pub mod playlist;
pub mod queue;
pub mod session;

pub use args::Config;
pub use model::Track;
pub use session::DaemonSession;

use anyhow::Result;

/// Resolve all configured entries, enqueue the resulting tracks and, when
/// requested, start playing the last of them. The daemon session is closed
/// on every path; an error from the pipeline outranks one from the close.
pub async fn run(config: Config) -> Result<()> {
    log::info!("casting {:?}", config.entries);
    let tracks = loader::resolve_all(&config.entries, &config).await?;
    let session = DaemonSession::connect(&config).await?;
    let outcome = cast(&tracks, &session, &config).await;
    let closed = session.disconnect().await;
    outcome.and(closed)
}

async fn cast(tracks: &[Track], session: &DaemonSession, config: &Config) -> Result<()> {
    let queued = queue::enqueue(tracks, session, config).await?;
    if config.start {
        queue::play_last(&queued, session).await?;
    }
    Ok(())
}
