//! The client-side session state machine.
//!
//! [`GameSession`] holds the authoritative client view (rosters, trump,
//! trick, hand, turn, scores) and dispatches every decoded server event
//! against it. Dispatch is pure with respect to I/O: it returns
//! [`Effect`]s (notifications for the presentation layer and commands to
//! put on the wire) and never touches the transport itself.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::entities::{
    Card, GamePhase, Hand, Roster, ScoreBoard, Suit, Trick, TrumpState, TurnState, Username,
};
use crate::net::messages::{ClientCommand, ServerEvent};

/// An action the player attempted that the session refuses to transmit.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum PlayError {
    #[error("not your turn")]
    NotYourTurn,
    #[error("must follow {led}")]
    MustFollowSuit { led: Suit },
    #[error("card is not in your hand")]
    CardNotInHand,
    #[error("not allowed to select the trump suit")]
    TrumpNotAuthorized,
    #[error("only the room creator can do that")]
    NotRoomCreator,
    #[error("the room is not full yet")]
    RoomNotFull,
}

/// Who is allowed to choose the trump suit. Observed deployments differ
/// on this, so the predicate is swappable.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum TrumpAuthority {
    /// The player announced via `MASTER_SELECTED` chooses.
    #[default]
    TrumpSelector,
    /// The room creator chooses.
    RoomCreator,
}

/// An immutable event published to the presentation layer.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Notification {
    RosterUpdated {
        team_a: Vec<Username>,
        team_b: Vec<Username>,
    },
    TeamsReady {
        team_a: Vec<Username>,
        team_b: Vec<Username>,
    },
    UserListUpdated {
        users: Vec<Username>,
    },
    TrumpSelectorChosen {
        player: Username,
    },
    HandDealt {
        cards: Vec<Card>,
    },
    TrumpChoiceRequired,
    TrumpSelected {
        suit: Suit,
    },
    TurnChanged {
        player: Username,
        is_yours: bool,
    },
    YourTurn,
    CardPlaced {
        player: Username,
        card: Card,
    },
    TrickWon {
        winner: Username,
    },
    RoundStarted,
    ScoreChanged {
        team_a: u32,
        team_b: u32,
    },
    RoundWinsChanged {
        team_a: u32,
        team_b: u32,
    },
    RoundWon {
        team: String,
    },
    GameOver {
        winner: String,
    },
    ChatReceived {
        text: String,
    },
    /// A line the codec did not recognize; forwarded as chat fallback.
    RawText {
        text: String,
    },
    Kicked,
    RoomClosed,
    Disconnected {
        reason: String,
    },
    SendFailed {
        command: String,
    },
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::RosterUpdated { team_a, team_b } => {
                write!(f, "teams: A {} / B {}", names(team_a), names(team_b))
            }
            Self::TeamsReady { team_a, team_b } => {
                write!(f, "game on: A {} vs B {}", names(team_a), names(team_b))
            }
            Self::UserListUpdated { users } => write!(f, "in room: {}", names(users)),
            Self::TrumpSelectorChosen { player } => write!(f, "{player} selects the hokm"),
            Self::HandDealt { cards } => write!(f, "dealt {} cards", cards.len()),
            Self::TrumpChoiceRequired => write!(f, "choose the hokm suit"),
            Self::TrumpSelected { suit } => write!(f, "hokm is {suit}"),
            Self::TurnChanged { player, .. } => write!(f, "{player}'s turn"),
            Self::YourTurn => write!(f, "it's your turn!"),
            Self::CardPlaced { player, card } => write!(f, "{player} played {card}"),
            Self::TrickWon { winner } => write!(f, "{winner} won the trick"),
            Self::RoundStarted => write!(f, "a new round has started"),
            Self::ScoreChanged { team_a, team_b } => {
                write!(f, "score: Team A {team_a} - Team B {team_b}")
            }
            Self::RoundWinsChanged { team_a, team_b } => {
                write!(f, "rounds: Team A {team_a} - Team B {team_b}")
            }
            Self::RoundWon { team } => write!(f, "{team} wins the round!"),
            Self::GameOver { winner } => write!(f, "{winner} wins the game!"),
            Self::ChatReceived { text } => write!(f, "{text}"),
            Self::RawText { text } => write!(f, "{text}"),
            Self::Kicked => write!(f, "you have been kicked from the room"),
            Self::RoomClosed => write!(f, "the room has been closed by the creator"),
            Self::Disconnected { reason } => write!(f, "disconnected: {reason}"),
            Self::SendFailed { command } => write!(f, "failed to send: {command}"),
        }
    }
}

fn names(players: &[Username]) -> String {
    let list: Vec<&str> = players.iter().map(Username::as_str).collect();
    list.join(", ")
}

/// What a dispatched event asks the surrounding loop to do.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Effect {
    /// Publish to the presentation layer.
    Notify(Notification),
    /// Put a command on the wire.
    Send(ClientCommand),
}

/// The authoritative client-side session model. All mutation happens in
/// [`GameSession::apply`] and the emitter-side checks; callers serialize
/// access (the receive loop holds a lock per dispatched message).
#[derive(Debug)]
pub struct GameSession {
    username: Username,
    room_creator: Username,
    authority: TrumpAuthority,
    phase: GamePhase,
    started: bool,
    closed: bool,
    roster: Roster,
    scoreboard: ScoreBoard,
    hand: Hand,
    trick: Trick,
    turn: TurnState,
    trump: TrumpState,
}

impl GameSession {
    pub fn new(username: Username, room_creator: Username) -> Self {
        Self {
            username,
            room_creator,
            authority: TrumpAuthority::default(),
            phase: GamePhase::default(),
            started: false,
            closed: false,
            roster: Roster::default(),
            scoreboard: ScoreBoard::default(),
            hand: Hand::default(),
            trick: Trick::default(),
            turn: TurnState::default(),
            trump: TrumpState::default(),
        }
    }

    pub fn with_trump_authority(mut self, authority: TrumpAuthority) -> Self {
        self.authority = authority;
        self
    }

    /// Dispatches one decoded server event against the session.
    pub fn apply(&mut self, event: ServerEvent) -> Vec<Effect> {
        match event {
            ServerEvent::PlayerList { team_a, team_b } => {
                self.roster.set_teams(team_a.clone(), team_b.clone());
                vec![Effect::Notify(Notification::RosterUpdated { team_a, team_b })]
            }
            ServerEvent::StartGame { team_a, team_b } => {
                if self.started {
                    warn!("ignoring START_GAME: game already started");
                    return Vec::new();
                }
                self.started = true;
                self.roster.set_teams(team_a.clone(), team_b.clone());
                vec![
                    Effect::Send(ClientCommand::GameStarted {
                        room: self.room_creator.clone(),
                        player: self.username.clone(),
                    }),
                    Effect::Notify(Notification::TeamsReady { team_a, team_b }),
                ]
            }
            ServerEvent::MasterSelected { player } => {
                // A new selector starts a fresh selection cycle.
                self.trump = TrumpState {
                    selector: Some(player.clone()),
                    suit: None,
                };
                vec![Effect::Notify(Notification::TrumpSelectorChosen { player })]
            }
            ServerEvent::DealCards { cards } => {
                self.hand.replace(cards.clone());
                if self.trump.suit.is_none() {
                    self.phase = GamePhase::AwaitingTrumpSelection;
                }
                vec![Effect::Notify(Notification::HandDealt { cards })]
            }
            ServerEvent::SelectTrump => {
                if self.may_select_trump() {
                    vec![Effect::Notify(Notification::TrumpChoiceRequired)]
                } else {
                    debug!("ignoring SELECT_HOKM: not authorized to choose");
                    Vec::new()
                }
            }
            ServerEvent::TrumpSelected { suit } => {
                self.trump.suit = Some(suit);
                self.phase = GamePhase::AwaitingTurn;
                vec![Effect::Notify(Notification::TrumpSelected { suit })]
            }
            ServerEvent::PlayerTurn { player } => {
                let is_yours = player == self.username;
                self.turn = TurnState {
                    current_player: Some(player.clone()),
                    is_local_turn: is_yours,
                };
                self.phase = if is_yours {
                    GamePhase::CardLegalToPlay
                } else {
                    GamePhase::AwaitingTurn
                };
                let mut effects = vec![Effect::Notify(Notification::TurnChanged {
                    player,
                    is_yours,
                })];
                if is_yours {
                    effects.push(Effect::Notify(Notification::YourTurn));
                }
                effects
            }
            ServerEvent::CardPlayed { player, card } => {
                self.trick.record(player.clone(), card.clone());
                if player == self.username {
                    self.turn.is_local_turn = false;
                    self.phase = GamePhase::CardPlayed;
                }
                vec![Effect::Notify(Notification::CardPlaced { player, card })]
            }
            ServerEvent::TrickWinner { player } => {
                self.trick.clear();
                self.phase = GamePhase::TrickResolved;
                vec![Effect::Notify(Notification::TrickWon { winner: player })]
            }
            ServerEvent::RoundStart => vec![Effect::Notify(Notification::RoundStarted)],
            ServerEvent::ScoreUpdate { team_a, team_b } => {
                self.scoreboard.team_a_points = team_a;
                self.scoreboard.team_b_points = team_b;
                vec![Effect::Notify(Notification::ScoreChanged { team_a, team_b })]
            }
            ServerEvent::RoundWinsUpdate { team_a, team_b } => {
                self.scoreboard.team_a_round_wins = team_a;
                self.scoreboard.team_b_round_wins = team_b;
                vec![Effect::Notify(Notification::RoundWinsChanged { team_a, team_b })]
            }
            ServerEvent::TeamWinsRound { team } => {
                self.phase = GamePhase::RoundResolved;
                vec![Effect::Notify(Notification::RoundWon { team })]
            }
            ServerEvent::GameOver { winner } => {
                self.phase = GamePhase::GameOver;
                vec![Effect::Notify(Notification::GameOver { winner })]
            }
            ServerEvent::Chat { text } => vec![Effect::Notify(Notification::ChatReceived { text })],
            ServerEvent::UserList { users } => {
                self.roster.set_from_user_list(&users);
                vec![Effect::Notify(Notification::UserListUpdated { users })]
            }
            ServerEvent::Kicked => {
                self.closed = true;
                vec![Effect::Notify(Notification::Kicked)]
            }
            ServerEvent::RoomClosed => {
                self.closed = true;
                vec![Effect::Notify(Notification::RoomClosed)]
            }
            ServerEvent::Unrecognized { raw } => {
                debug!("forwarding unrecognized message to chat: {raw}");
                vec![Effect::Notify(Notification::RawText { text: raw })]
            }
        }
    }

    /// The suit-following rule alone: a card is legal iff the player is
    /// leading, follows the led suit, or cannot follow it.
    pub fn can_play_card(&self, card: &Card) -> bool {
        match self.trick.led_suit() {
            None => true,
            Some(led) => card.suit == led || !self.hand.has_suit(led),
        }
    }

    /// Full emitter-side check for playing `card`: turn ownership, hand
    /// membership, then suit-following.
    pub fn check_play(&self, card: &Card) -> Result<(), PlayError> {
        if !self.turn.is_local_turn {
            return Err(PlayError::NotYourTurn);
        }
        if !self.hand.contains(card) {
            return Err(PlayError::CardNotInHand);
        }
        if !self.can_play_card(card) {
            let led = self
                .trick
                .led_suit()
                .expect("a followable trick has a led suit");
            return Err(PlayError::MustFollowSuit { led });
        }
        Ok(())
    }

    /// Removes a successfully transmitted card from the local hand. The
    /// turn flag stays set until the server echoes the play back.
    pub fn mark_played(&mut self, card: &Card) {
        self.hand.remove(card);
    }

    pub fn may_select_trump(&self) -> bool {
        match self.authority {
            TrumpAuthority::TrumpSelector => self.trump.selector.as_ref() == Some(&self.username),
            TrumpAuthority::RoomCreator => self.room_creator == self.username,
        }
    }

    pub fn check_select_trump(&self) -> Result<(), PlayError> {
        if self.may_select_trump() {
            Ok(())
        } else {
            Err(PlayError::TrumpNotAuthorized)
        }
    }

    /// Teams for an outbound `START_GAME`, taken from the room preview.
    /// Only the room creator may start, and only with a full table.
    pub fn start_game_teams(&self) -> Result<(Vec<Username>, Vec<Username>), PlayError> {
        if self.username != self.room_creator {
            return Err(PlayError::NotRoomCreator);
        }
        if !self.roster.is_complete() {
            return Err(PlayError::RoomNotFull);
        }
        Ok((self.roster.team_a().to_vec(), self.roster.team_b().to_vec()))
    }

    pub fn check_kick(&self) -> Result<(), PlayError> {
        if self.username == self.room_creator {
            Ok(())
        } else {
            Err(PlayError::NotRoomCreator)
        }
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn room_creator(&self) -> &Username {
        &self.room_creator
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn scoreboard(&self) -> ScoreBoard {
        self.scoreboard
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn trick(&self) -> &Trick {
        &self.trick
    }

    pub fn turn(&self) -> &TurnState {
        &self.turn
    }

    pub fn trump(&self) -> &TrumpState {
        &self.trump
    }
}
