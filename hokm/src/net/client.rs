//! The game session client.
//!
//! [`GameClient`] owns the connection for one session: it emits commands
//! (after checking them against the session state, so an illegal play is
//! rejected locally and never transmitted) and runs the background
//! receiver that feeds every inbound frame through deduplication, the
//! codec, and the dispatcher. Presentation layers consume the resulting
//! [`Notification`] stream on their own schedule.

use anyhow::{Context, Error, bail};
use log::{debug, error, info, warn};
use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};
use tokio::{
    io::{AsyncBufRead, AsyncRead, AsyncWrite, BufReader},
    net::TcpStream,
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
    time,
};

use super::{
    super::game::{
        entities::{Card, GamePhase, ScoreBoard, Suit, Username},
        session::{Effect, GameSession, Notification, TrumpAuthority},
    },
    dedup::DedupCache,
    messages::{self, ClientCommand},
    utils,
};

type SharedWriter = Arc<tokio::sync::Mutex<Box<dyn AsyncWrite + Send + Unpin>>>;

/// A connected client session: the command emitter plus a spawned
/// receiver task that keeps the session state current.
pub struct GameClient {
    username: Username,
    room: Username,
    session: Arc<Mutex<GameSession>>,
    writer: SharedWriter,
    receiver: JoinHandle<()>,
}

impl GameClient {
    /// Connect to a game server over TCP and join `room`.
    ///
    /// Connection attempts back off over three tries with decreasing
    /// timeouts before giving up.
    ///
    /// # Errors
    ///
    /// Returns an error if no attempt connects or the join request
    /// cannot be written.
    pub async fn connect(
        addr: &str,
        username: Username,
        room: Username,
        authority: TrumpAuthority,
    ) -> Result<(Self, UnboundedReceiver<Notification>), Error> {
        let mut connect_timeouts = vec![
            Duration::from_secs(1),
            Duration::from_millis(500),
            Duration::from_millis(100),
        ];
        while let Some(connect_timeout) = connect_timeouts.pop() {
            match time::timeout(connect_timeout, TcpStream::connect(addr)).await {
                Ok(Ok(stream)) => {
                    let (client, notifications) = Self::start(stream, username, room, authority);
                    client
                        .send(&ClientCommand::JoinRoom {
                            room: client.room.clone(),
                            player: client.username.clone(),
                        })
                        .await
                        .context("failed to join the room")?;
                    info!("connected to {addr} as {}", client.username);
                    return Ok((client, notifications));
                }
                _ => time::sleep(connect_timeout).await,
            }
        }
        bail!("couldn't connect to {addr} as {username}")
    }

    /// Start a session over an already established stream. The receiver
    /// task runs until the stream closes or the notification receiver is
    /// dropped.
    pub fn start<S>(
        stream: S,
        username: Username,
        room: Username,
        authority: TrumpAuthority,
    ) -> (Self, UnboundedReceiver<Notification>)
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (read_half, write_half) = tokio::io::split(stream);
        let writer: SharedWriter = Arc::new(tokio::sync::Mutex::new(Box::new(write_half)));
        let session = Arc::new(Mutex::new(
            GameSession::new(username.clone(), room.clone()).with_trump_authority(authority),
        ));
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let receiver = tokio::spawn(run_receiver(
            BufReader::new(read_half),
            Arc::clone(&session),
            Arc::clone(&writer),
            events_tx,
        ));
        let client = Self {
            username,
            room,
            session,
            writer,
            receiver,
        };
        (client, events_rx)
    }

    /// Play a card. Rejected locally when it is not the player's turn or
    /// the card breaks the suit-following rule; nothing is transmitted in
    /// that case. On success the card leaves the local hand.
    ///
    /// # Errors
    ///
    /// Returns the rejection reason, or the write failure if the command
    /// could not be sent.
    pub async fn play_card(&self, card: &Card) -> Result<(), Error> {
        self.lock_session().check_play(card)?;
        let cmd = ClientCommand::PlayCard {
            room: self.room.clone(),
            player: self.username.clone(),
            card: card.clone(),
        };
        self.send(&cmd).await?;
        self.lock_session().mark_played(card);
        Ok(())
    }

    /// Choose the trump suit. Only permitted for the player the trump
    /// authority designates.
    ///
    /// # Errors
    ///
    /// Returns the rejection reason or the write failure.
    pub async fn select_trump(&self, suit: Suit) -> Result<(), Error> {
        self.lock_session().check_select_trump()?;
        self.send(&ClientCommand::SetHokm {
            room: self.room.clone(),
            suit,
        })
        .await
    }

    /// Send a chat line.
    pub async fn send_chat(&self, text: &str) -> Result<(), Error> {
        self.send(&ClientCommand::Chat {
            room: self.room.clone(),
            player: self.username.clone(),
            text: text.to_string(),
        })
        .await
    }

    /// Ask the server for the current roster.
    pub async fn request_player_list(&self) -> Result<(), Error> {
        self.send(&ClientCommand::PlayerList {
            player: self.username.clone(),
        })
        .await
    }

    /// Start the game from the room preview. Creator only, full room
    /// only.
    pub async fn start_game(&self) -> Result<(), Error> {
        let (team_a, team_b) = self.lock_session().start_game_teams()?;
        self.send(&ClientCommand::StartGame {
            room: self.room.clone(),
            player: self.username.clone(),
            team_a,
            team_b,
        })
        .await
    }

    /// Kick a user from the room. Creator only.
    pub async fn kick_user(&self, target: &Username) -> Result<(), Error> {
        self.lock_session().check_kick()?;
        self.send(&ClientCommand::KickUser {
            room: self.room.clone(),
            player: target.clone(),
        })
        .await
    }

    /// Leave the room.
    pub async fn leave_room(&self) -> Result<(), Error> {
        self.send(&ClientCommand::LeaveRoom {
            room: self.room.clone(),
            player: self.username.clone(),
        })
        .await
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn room(&self) -> &Username {
        &self.room
    }

    /// Snapshot of the local hand. May trail the wire by the message the
    /// receiver is currently dispatching.
    pub fn hand(&self) -> Vec<Card> {
        self.lock_session().hand().cards().to_vec()
    }

    pub fn is_my_turn(&self) -> bool {
        self.lock_session().turn().is_local_turn
    }

    pub fn scoreboard(&self) -> ScoreBoard {
        self.lock_session().scoreboard()
    }

    pub fn phase(&self) -> GamePhase {
        self.lock_session().phase()
    }

    /// Read access to the full session state under its lock.
    pub fn with_session<T>(&self, f: impl FnOnce(&GameSession) -> T) -> T {
        f(&self.lock_session())
    }

    /// Stop the background receiver. The stream is dropped with it.
    pub fn close(&self) {
        self.receiver.abort();
    }

    async fn send(&self, cmd: &ClientCommand) -> Result<(), Error> {
        let frame = cmd.to_wire();
        debug!("sending: {frame}");
        let mut writer = self.writer.lock().await;
        utils::write_frame(&mut *writer, &frame)
            .await
            .with_context(|| format!("failed to send {frame}"))
    }

    fn lock_session(&self) -> MutexGuard<'_, GameSession> {
        self.session.lock().expect("session lock poisoned")
    }
}

/// The background receiver: pulls frames until the transport closes,
/// suppresses replays, decodes, dispatches, and carries out the effects.
/// Session state is only ever mutated here, one message at a time.
async fn run_receiver<R>(
    mut reader: R,
    session: Arc<Mutex<GameSession>>,
    writer: SharedWriter,
    events: UnboundedSender<Notification>,
) where
    R: AsyncBufRead + Unpin,
{
    // Owned by this task alone, which makes the evict/insert atomic with
    // respect to the membership check.
    let mut dedup = DedupCache::default();
    loop {
        let raw = match utils::read_frame(&mut reader).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!("server closed the connection");
                let _ = events.send(Notification::Disconnected {
                    reason: "connection closed".to_string(),
                });
                return;
            }
            Err(error) => {
                error!("read failed, tearing down the session: {error}");
                let _ = events.send(Notification::Disconnected {
                    reason: error.to_string(),
                });
                return;
            }
        };
        if !dedup.should_process(&raw, Instant::now()) {
            debug!("suppressed duplicate: {raw}");
            continue;
        }
        debug!("received: {raw}");
        let event = match messages::decode(&raw) {
            Ok(event) => event,
            Err(error) => {
                warn!("ignoring malformed message {raw:?}: {error}");
                continue;
            }
        };
        let effects = {
            let mut session = session.lock().expect("session lock poisoned");
            session.apply(event)
        };
        for effect in effects {
            match effect {
                Effect::Notify(notification) => {
                    if events.send(notification).is_err() {
                        // Presentation side is gone; stop receiving.
                        return;
                    }
                }
                Effect::Send(cmd) => {
                    let frame = cmd.to_wire();
                    let mut writer = writer.lock().await;
                    if let Err(error) = utils::write_frame(&mut *writer, &frame).await {
                        error!("failed to send {frame}: {error}");
                        let _ = events.send(Notification::SendFailed { command: frame });
                    }
                }
            }
        }
    }
}
