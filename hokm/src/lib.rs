//! # Hokm
//!
//! The client-side session engine for a four-player trick-taking card
//! game played over a persistent connection. Peers exchange short
//! colon-delimited text messages describing room membership, dealing,
//! turn order, trump ("hokm") selection, card plays, and scoring.
//!
//! The engine is message-driven: a background receiver ingests the frame
//! stream, suppresses replays, decodes each frame once into a typed
//! event, and dispatches it against the authoritative session state. The
//! presentation layer consumes the resulting notification channel and
//! issues commands back through [`GameClient`], which refuses to
//! transmit anything the session state says is illegal (out-of-turn or
//! suit-breaking plays in particular).
//!
//! ## Core modules
//!
//! - [`game`]: session entities and the dispatching state machine
//! - [`net`]: wire codec, deduplication, framing, and the client
//!
//! ## Example
//!
//! ```no_run
//! use hokm::{GameClient, TrumpAuthority, Username};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let (client, mut notifications) = GameClient::connect(
//!         "127.0.0.1:12345",
//!         Username::new("alice"),
//!         Username::new("bob"),
//!         TrumpAuthority::default(),
//!     )
//!     .await?;
//!     while let Some(notification) = notifications.recv().await {
//!         println!("{notification}");
//!     }
//!     client.close();
//!     Ok(())
//! }
//! ```

pub mod constants;

/// Session entities and the dispatching state machine.
pub mod game;
pub use game::{
    entities::{
        Card, GamePhase, Hand, Roster, ScoreBoard, Suit, TableSeating, TeamId, Trick, TrumpState,
        TurnState, Username,
    },
    session::{Effect, GameSession, Notification, PlayError, TrumpAuthority},
};

/// Networking: codec, dedup, framing, and the session client.
pub mod net;
pub use net::{
    client::GameClient,
    dedup::DedupCache,
    errors::ProtocolError,
    messages::{ClientCommand, ServerEvent, decode},
};
