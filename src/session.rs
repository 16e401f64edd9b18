//! The connection to the mpd daemon.

use anyhow::{anyhow, Context, Result};
use mpd::song::Id;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{self, JoinHandle};

use crate::args::Config;

/// One request to the daemon, answered over a oneshot channel with the
/// protocol client's own result type.
enum Request {
    QueueAdd {
        uri: String,
        reply: oneshot::Sender<Result<Id, mpd::error::Error>>,
    },
    PlaylistAdd {
        playlist: String,
        uri: String,
        reply: oneshot::Sender<Result<(), mpd::error::Error>>,
    },
    PlayId {
        id: Id,
        reply: oneshot::Sender<Result<(), mpd::error::Error>>,
    },
}

/// The single daemon connection for one invocation.
///
/// The sync protocol client lives on a dedicated blocking task; requests
/// reach it over a channel and execute one at a time, so concurrent callers
/// never interleave on the socket. Closing the channel winds the worker down
/// and with it the connection.
#[derive(Debug)]
pub struct DaemonSession {
    requests: mpsc::Sender<Request>,
    worker: JoinHandle<()>,
}

impl DaemonSession {
    /// Connect to the daemon, authenticating when a password is configured.
    ///
    /// Resolves once the daemon has sent its protocol greeting and accepted
    /// the password, i.e. once it is ready for commands.
    pub async fn connect(config: &Config) -> Result<Self> {
        let target = (config.host.clone(), config.port);
        let password = config.password.clone();
        let (ready_tx, ready_rx) = oneshot::channel();
        let (request_tx, mut request_rx) = mpsc::channel::<Request>(16);

        let worker = task::spawn_blocking(move || {
            let mut client = match establish(target, password) {
                Ok(client) => client,
                Err(err) => {
                    let _ = ready_tx.send(Err(err));
                    return;
                }
            };
            if ready_tx.send(Ok(())).is_err() {
                return;
            }
            while let Some(request) = request_rx.blocking_recv() {
                match request {
                    Request::QueueAdd { uri, reply } => {
                        let _ = reply.send(client.push(&song(uri)));
                    }
                    Request::PlaylistAdd {
                        playlist,
                        uri,
                        reply,
                    } => {
                        let _ = reply.send(client.pl_push(playlist.as_str(), &song(uri)));
                    }
                    Request::PlayId { id, reply } => {
                        let _ = reply.send(client.switch(id));
                    }
                }
            }
            // Dropping the client closes the socket.
        });

        ready_rx
            .await
            .context("Daemon session ended before signalling readiness")??;

        Ok(Self {
            requests: request_tx,
            worker,
        })
    }

    /// `addid`: append a track to the current play queue, returning the
    /// queue id the daemon assigned to it.
    pub async fn queue_add(&self, uri: &str) -> Result<Id> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.submit(Request::QueueAdd {
            uri: uri.to_string(),
            reply: reply_tx,
        })
        .await?;
        let id = recv(reply_rx)
            .await?
            .with_context(|| format!("Failed adding {} to the play queue", uri))?;
        Ok(id)
    }

    /// `playlistadd`: append a track to a named stored playlist.
    pub async fn playlist_add(&self, playlist: &str, uri: &str) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.submit(Request::PlaylistAdd {
            playlist: playlist.to_string(),
            uri: uri.to_string(),
            reply: reply_tx,
        })
        .await?;
        recv(reply_rx)
            .await?
            .with_context(|| format!("Failed adding {} to playlist {}", uri, playlist))?;
        Ok(())
    }

    /// `playid`: start playback of a queued track.
    pub async fn play_id(&self, id: Id) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.submit(Request::PlayId { id, reply: reply_tx }).await?;
        recv(reply_rx)
            .await?
            .with_context(|| format!("Failed starting playback of id {}", id.0))?;
        Ok(())
    }

    /// Close the connection and wait for the worker to wind down. Runs
    /// exactly once per established session, whichever way the pipeline went.
    pub async fn disconnect(self) -> Result<()> {
        log::info!("disconnect");
        drop(self.requests);
        self.worker
            .await
            .context("Daemon session worker failed during shutdown")?;
        Ok(())
    }

    async fn submit(&self, request: Request) -> Result<()> {
        self.requests
            .send(request)
            .await
            .map_err(|_| anyhow!("Daemon session is closed"))
    }
}

/// Open the TCP connection and consume the daemon's greeting; with a
/// password configured, authenticate before handing the client over.
fn establish(target: (String, u16), password: Option<String>) -> Result<mpd::Client> {
    let (host, port) = target;
    let mut client = mpd::Client::connect((host.as_str(), port))
        .with_context(|| format!("Failed connecting to mpd at {}:{}", host, port))?;
    if let Some(password) = password {
        client
            .login(&password)
            .with_context(|| format!("Failed authenticating with mpd at {}:{}", host, port))?;
    }
    Ok(client)
}

/// The protocol client queues songs rather than bare uris; an add only
/// needs the file set.
fn song(file: String) -> mpd::Song {
    mpd::Song {
        file,
        ..Default::default()
    }
}

async fn recv<T>(reply: oneshot::Receiver<T>) -> Result<T> {
    reply.await.context("Daemon session dropped a reply")
}
