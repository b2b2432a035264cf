//! The wire message codec.
//!
//! Messages are single text frames with colon-delimited fields. Inbound
//! frames decode once into a [`ServerEvent`]; handlers never re-match on
//! string prefixes. Outbound [`ClientCommand`]s encode into the same
//! grammar. Field values never contain a colon, with one exception: chat
//! bodies, which are carried as the final field of a bounded split.

use serde::{Deserialize, Serialize};

use super::errors::ProtocolError;
use crate::game::entities::{Card, Suit, Username};

/// A decoded inbound message, one variant per recognized wire kind.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ServerEvent {
    /// `PLAYER_LIST:Team A: <names>:Team B: <names>`
    PlayerList {
        team_a: Vec<Username>,
        team_b: Vec<Username>,
    },
    /// `CHAT:<text>` — the body is never split further.
    Chat { text: String },
    /// `SCORE_UPDATE:A:<points>:B:<points>`
    ScoreUpdate { team_a: u32, team_b: u32 },
    /// `TURN_WINNER:<player>`
    TrickWinner { player: Username },
    /// `START_GAME:<team a csv>:<team b csv>`
    StartGame {
        team_a: Vec<Username>,
        team_b: Vec<Username>,
    },
    /// `MASTER_SELECTED:<player>`
    MasterSelected { player: Username },
    /// `DEAL_CARDS:[<card>, <card>, ...]`
    DealCards { cards: Vec<Card> },
    /// Any frame containing `SELECT_HOKM`; matched only after every
    /// prefix rule has failed.
    SelectTrump,
    /// `CARD_PLAYED:<player>:<card>`
    CardPlayed { player: Username, card: Card },
    /// `PLAYER_TURN:<player>`
    PlayerTurn { player: Username },
    /// `HOKM_SELECTED:<suit>`
    TrumpSelected { suit: Suit },
    /// `ROUND_START:`
    RoundStart,
    /// `ROUND_WINS_UPDATE:A:<wins>:B:<wins>`
    RoundWinsUpdate { team_a: u32, team_b: u32 },
    /// `TEAM_WINS_ROUND:<team>`
    TeamWinsRound { team: String },
    /// `GAME_OVER:<team>`
    GameOver { winner: String },
    /// `USER_LIST:<name>:<name>:...`
    UserList { users: Vec<Username> },
    /// `KICKED`
    Kicked,
    /// `ROOM_CLOSED`
    RoomClosed,
    /// Anything else; forwarded verbatim to the chat fallback.
    Unrecognized { raw: String },
}

impl ServerEvent {
    /// The exact inverse of [`decode`] for every defined kind.
    pub fn to_wire(&self) -> String {
        match self {
            Self::PlayerList { team_a, team_b } => format!(
                "PLAYER_LIST:Team A: {}:Team B: {}",
                join_names(team_a),
                join_names(team_b)
            ),
            Self::Chat { text } => format!("CHAT:{text}"),
            Self::ScoreUpdate { team_a, team_b } => format!("SCORE_UPDATE:A:{team_a}:B:{team_b}"),
            Self::TrickWinner { player } => format!("TURN_WINNER:{player}"),
            Self::StartGame { team_a, team_b } => {
                format!("START_GAME:{}:{}", join_csv(team_a), join_csv(team_b))
            }
            Self::MasterSelected { player } => format!("MASTER_SELECTED:{player}"),
            Self::DealCards { cards } => {
                let list: Vec<String> = cards.iter().map(Card::to_string).collect();
                format!("DEAL_CARDS:[{}]", list.join(", "))
            }
            Self::SelectTrump => "SELECT_HOKM".to_string(),
            Self::CardPlayed { player, card } => format!("CARD_PLAYED:{player}:{card}"),
            Self::PlayerTurn { player } => format!("PLAYER_TURN:{player}"),
            Self::TrumpSelected { suit } => format!("HOKM_SELECTED:{suit}"),
            Self::RoundStart => "ROUND_START:".to_string(),
            Self::RoundWinsUpdate { team_a, team_b } => {
                format!("ROUND_WINS_UPDATE:A:{team_a}:B:{team_b}")
            }
            Self::TeamWinsRound { team } => format!("TEAM_WINS_ROUND:{team}"),
            Self::GameOver { winner } => format!("GAME_OVER:{winner}"),
            Self::UserList { users } => {
                let list: Vec<&str> = users.iter().map(Username::as_str).collect();
                format!("USER_LIST:{}", list.join(":"))
            }
            Self::Kicked => "KICKED".to_string(),
            Self::RoomClosed => "ROOM_CLOSED".to_string(),
            Self::Unrecognized { raw } => raw.clone(),
        }
    }
}

/// An outbound command, encoded with [`ClientCommand::to_wire`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ClientCommand {
    /// `PLAYER_LIST:<player>` — request the current roster.
    PlayerList { player: Username },
    /// `GAME_STARTED:<room>:<player>` — acknowledge `START_GAME`.
    GameStarted { room: Username, player: Username },
    /// `PLAY_CARD:<room>:<player>:<card>`
    PlayCard {
        room: Username,
        player: Username,
        card: Card,
    },
    /// `SET_HOKM:<room>:<suit>`
    SetHokm { room: Username, suit: Suit },
    /// `CHAT:<room>:<player>:<text>`
    Chat {
        room: Username,
        player: Username,
        text: String,
    },
    /// `JOIN_ROOM:<room>:<player>`
    JoinRoom { room: Username, player: Username },
    /// `LEAVE_ROOM:<room>:<player>`
    LeaveRoom { room: Username, player: Username },
    /// `KICK_USER:<room>:<player>`
    KickUser { room: Username, player: Username },
    /// `START_GAME:<room>:<player>:<team a csv>:<team b csv>`
    StartGame {
        room: Username,
        player: Username,
        team_a: Vec<Username>,
        team_b: Vec<Username>,
    },
}

impl ClientCommand {
    pub fn to_wire(&self) -> String {
        match self {
            Self::PlayerList { player } => format!("PLAYER_LIST:{player}"),
            Self::GameStarted { room, player } => format!("GAME_STARTED:{room}:{player}"),
            Self::PlayCard { room, player, card } => format!("PLAY_CARD:{room}:{player}:{card}"),
            Self::SetHokm { room, suit } => format!("SET_HOKM:{room}:{suit}"),
            Self::Chat { room, player, text } => format!("CHAT:{room}:{player}:{text}"),
            Self::JoinRoom { room, player } => format!("JOIN_ROOM:{room}:{player}"),
            Self::LeaveRoom { room, player } => format!("LEAVE_ROOM:{room}:{player}"),
            Self::KickUser { room, player } => format!("KICK_USER:{room}:{player}"),
            Self::StartGame {
                room,
                player,
                team_a,
                team_b,
            } => format!(
                "START_GAME:{room}:{player}:{}:{}",
                join_csv(team_a),
                join_csv(team_b)
            ),
        }
    }
}

/// Decodes one raw frame. Total over kinds: an unknown tag yields
/// `Ok(Unrecognized)`; a known tag with malformed fields is an error the
/// caller logs and drops.
pub fn decode(raw: &str) -> Result<ServerEvent, ProtocolError> {
    if raw.starts_with("PLAYER_LIST:") {
        // Bounded split: the team name lists themselves contain commas,
        // and the two halves are separated by the "Team B" label.
        let parts: Vec<&str> = raw.splitn(4, ':').collect();
        if parts.len() != 4 {
            return Err(ProtocolError::MissingField {
                kind: "PLAYER_LIST",
                index: 3,
            });
        }
        return Ok(ServerEvent::PlayerList {
            team_a: team_names(parts[2]),
            team_b: team_names(parts[3]),
        });
    }
    if let Some(text) = raw.strip_prefix("CHAT:") {
        return Ok(ServerEvent::Chat {
            text: text.to_string(),
        });
    }
    if let Some(rest) = raw.strip_prefix("SCORE_UPDATE:") {
        let (team_a, team_b) = labeled_pair("SCORE_UPDATE", rest)?;
        return Ok(ServerEvent::ScoreUpdate { team_a, team_b });
    }
    if let Some(rest) = raw.strip_prefix("TURN_WINNER:") {
        return Ok(ServerEvent::TrickWinner {
            player: username_field("TURN_WINNER", rest)?,
        });
    }
    if let Some(rest) = raw.strip_prefix("START_GAME:") {
        let (team_a, team_b) = rest.split_once(':').ok_or(ProtocolError::MissingField {
            kind: "START_GAME",
            index: 2,
        })?;
        return Ok(ServerEvent::StartGame {
            team_a: name_list(team_a),
            team_b: name_list(team_b),
        });
    }
    if let Some(rest) = raw.strip_prefix("MASTER_SELECTED:") {
        return Ok(ServerEvent::MasterSelected {
            player: username_field("MASTER_SELECTED", rest)?,
        });
    }
    if let Some(rest) = raw.strip_prefix("DEAL_CARDS:") {
        let inner = rest
            .strip_prefix('[')
            .and_then(|r| r.strip_suffix(']'))
            .ok_or_else(|| ProtocolError::MalformedPayload {
                kind: "DEAL_CARDS",
                value: rest.to_string(),
            })?;
        let cards = if inner.trim().is_empty() {
            Vec::new()
        } else {
            inner
                .split(", ")
                .map(str::parse)
                .collect::<Result<Vec<Card>, _>>()?
        };
        return Ok(ServerEvent::DealCards { cards });
    }
    if let Some(rest) = raw.strip_prefix("CARD_PLAYED:") {
        let (player, card) = rest.split_once(':').ok_or(ProtocolError::MissingField {
            kind: "CARD_PLAYED",
            index: 2,
        })?;
        return Ok(ServerEvent::CardPlayed {
            player: username_field("CARD_PLAYED", player)?,
            card: card.parse()?,
        });
    }
    if let Some(rest) = raw.strip_prefix("PLAYER_TURN:") {
        return Ok(ServerEvent::PlayerTurn {
            player: username_field("PLAYER_TURN", rest)?,
        });
    }
    if let Some(rest) = raw.strip_prefix("HOKM_SELECTED:") {
        return Ok(ServerEvent::TrumpSelected {
            suit: rest.parse()?,
        });
    }
    if raw.starts_with("ROUND_START:") {
        return Ok(ServerEvent::RoundStart);
    }
    if let Some(rest) = raw.strip_prefix("ROUND_WINS_UPDATE:") {
        let (team_a, team_b) = labeled_pair("ROUND_WINS_UPDATE", rest)?;
        return Ok(ServerEvent::RoundWinsUpdate { team_a, team_b });
    }
    if let Some(rest) = raw.strip_prefix("TEAM_WINS_ROUND:") {
        return Ok(ServerEvent::TeamWinsRound {
            team: rest.to_string(),
        });
    }
    if let Some(rest) = raw.strip_prefix("GAME_OVER:") {
        return Ok(ServerEvent::GameOver {
            winner: rest.to_string(),
        });
    }
    if let Some(rest) = raw.strip_prefix("USER_LIST:") {
        let users = rest
            .split(':')
            .filter(|n| !n.trim().is_empty())
            .map(Username::new)
            .collect();
        return Ok(ServerEvent::UserList { users });
    }
    if raw == "KICKED" || raw.starts_with("KICKED:") {
        return Ok(ServerEvent::Kicked);
    }
    if raw == "ROOM_CLOSED" || raw.starts_with("ROOM_CLOSED:") {
        return Ok(ServerEvent::RoomClosed);
    }
    // The one substring rule, explicitly after every prefix rule.
    if raw.contains("SELECT_HOKM") {
        return Ok(ServerEvent::SelectTrump);
    }
    Ok(ServerEvent::Unrecognized {
        raw: raw.to_string(),
    })
}

/// Splits a comma-separated name list, dropping empty entries.
fn name_list(part: &str) -> Vec<Username> {
    part.split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(Username::new)
        .collect()
}

/// Like [`name_list`], but tolerates a leading `Team A:`/`Team B:` label
/// left over from the bounded split.
fn team_names(part: &str) -> Vec<Username> {
    let part = part.trim();
    let part = part
        .strip_prefix("Team A:")
        .or_else(|| part.strip_prefix("Team B:"))
        .unwrap_or(part);
    name_list(part)
}

/// Parses `A:<n>:B:<n>` score-style payloads.
fn labeled_pair(kind: &'static str, rest: &str) -> Result<(u32, u32), ProtocolError> {
    let parts: Vec<&str> = rest.split(':').collect();
    if parts.len() < 4 {
        return Err(ProtocolError::MissingField {
            kind,
            index: parts.len(),
        });
    }
    Ok((numeric(kind, parts[1])?, numeric(kind, parts[3])?))
}

fn numeric(kind: &'static str, value: &str) -> Result<u32, ProtocolError> {
    value
        .trim()
        .parse()
        .map_err(|_| ProtocolError::InvalidNumber {
            kind,
            value: value.to_string(),
        })
}

fn username_field(kind: &'static str, value: &str) -> Result<Username, ProtocolError> {
    // Names never contain a colon, so take the first field and ignore
    // any trailing ones.
    let name = value.split(':').next().unwrap_or("").trim();
    if name.is_empty() {
        return Err(ProtocolError::MissingField { kind, index: 1 });
    }
    Ok(Username::new(name))
}

fn join_names(players: &[Username]) -> String {
    let list: Vec<&str> = players.iter().map(Username::as_str).collect();
    list.join(", ")
}

fn join_csv(players: &[Username]) -> String {
    let list: Vec<&str> = players.iter().map(Username::as_str).collect();
    list.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::Suit;

    fn user(name: &str) -> Username {
        Username::new(name)
    }

    #[test]
    fn decode_player_list() {
        let event = decode("PLAYER_LIST:Team A: alice, carol:Team B: bob, dave").unwrap();
        assert_eq!(
            event,
            ServerEvent::PlayerList {
                team_a: vec![user("alice"), user("carol")],
                team_b: vec![user("bob"), user("dave")],
            }
        );
    }

    #[test]
    fn decode_player_list_too_short() {
        assert!(decode("PLAYER_LIST:only:two").is_err());
    }

    #[test]
    fn decode_chat_keeps_colons_in_body() {
        let event = decode("CHAT:alice: hello there: everyone").unwrap();
        assert_eq!(
            event,
            ServerEvent::Chat {
                text: "alice: hello there: everyone".to_string(),
            }
        );
    }

    #[test]
    fn decode_score_update() {
        let event = decode("SCORE_UPDATE:A:3:B:5").unwrap();
        assert_eq!(
            event,
            ServerEvent::ScoreUpdate {
                team_a: 3,
                team_b: 5,
            }
        );
        assert!(decode("SCORE_UPDATE:A:x:B:5").is_err());
        assert!(decode("SCORE_UPDATE:A:3").is_err());
    }

    #[test]
    fn decode_deal_cards() {
        let event = decode("DEAL_CARDS:[Hearts-9, Spades-2, Clubs-Ace]").unwrap();
        assert_eq!(
            event,
            ServerEvent::DealCards {
                cards: vec![
                    Card::new(Suit::Hearts, "9"),
                    Card::new(Suit::Spades, "2"),
                    Card::new(Suit::Clubs, "Ace"),
                ],
            }
        );
    }

    #[test]
    fn decode_deal_cards_empty_and_malformed() {
        assert_eq!(
            decode("DEAL_CARDS:[]").unwrap(),
            ServerEvent::DealCards { cards: Vec::new() }
        );
        assert!(decode("DEAL_CARDS:Hearts-9").is_err());
        assert!(decode("DEAL_CARDS:[Hearts-9, Swords-3]").is_err());
    }

    #[test]
    fn decode_card_played() {
        let event = decode("CARD_PLAYED:carol:Spades-Ace").unwrap();
        assert_eq!(
            event,
            ServerEvent::CardPlayed {
                player: user("carol"),
                card: Card::new(Suit::Spades, "Ace"),
            }
        );
        assert!(decode("CARD_PLAYED:carol").is_err());
    }

    #[test]
    fn decode_turn_and_winner() {
        assert_eq!(
            decode("PLAYER_TURN:alice").unwrap(),
            ServerEvent::PlayerTurn {
                player: user("alice"),
            }
        );
        assert_eq!(
            decode("TURN_WINNER:bob").unwrap(),
            ServerEvent::TrickWinner {
                player: user("bob"),
            }
        );
        assert!(decode("PLAYER_TURN:").is_err());
    }

    #[test]
    fn decode_trump_messages() {
        assert_eq!(
            decode("MASTER_SELECTED:dave").unwrap(),
            ServerEvent::MasterSelected {
                player: user("dave"),
            }
        );
        assert_eq!(
            decode("HOKM_SELECTED:Hearts").unwrap(),
            ServerEvent::TrumpSelected { suit: Suit::Hearts }
        );
        assert!(decode("HOKM_SELECTED:Swords").is_err());
    }

    #[test]
    fn select_hokm_matches_as_substring_only_after_prefixes() {
        assert_eq!(decode("SELECT_HOKM").unwrap(), ServerEvent::SelectTrump);
        assert_eq!(
            decode("room1:SELECT_HOKM").unwrap(),
            ServerEvent::SelectTrump
        );
        // HOKM_SELECTED must not be shadowed by the substring rule.
        assert_eq!(
            decode("HOKM_SELECTED:Spades").unwrap(),
            ServerEvent::TrumpSelected { suit: Suit::Spades }
        );
    }

    #[test]
    fn decode_round_and_game_end() {
        assert_eq!(decode("ROUND_START:").unwrap(), ServerEvent::RoundStart);
        assert_eq!(
            decode("TEAM_WINS_ROUND:Team A").unwrap(),
            ServerEvent::TeamWinsRound {
                team: "Team A".to_string(),
            }
        );
        assert_eq!(
            decode("GAME_OVER:Team B").unwrap(),
            ServerEvent::GameOver {
                winner: "Team B".to_string(),
            }
        );
    }

    #[test]
    fn decode_room_messages() {
        assert_eq!(
            decode("USER_LIST:alice:bob:carol").unwrap(),
            ServerEvent::UserList {
                users: vec![user("alice"), user("bob"), user("carol")],
            }
        );
        assert_eq!(decode("KICKED").unwrap(), ServerEvent::Kicked);
        assert_eq!(decode("ROOM_CLOSED").unwrap(), ServerEvent::RoomClosed);
    }

    #[test]
    fn unknown_tag_degrades_to_unrecognized() {
        assert_eq!(
            decode("WHAT_IS_THIS:payload").unwrap(),
            ServerEvent::Unrecognized {
                raw: "WHAT_IS_THIS:payload".to_string(),
            }
        );
    }

    #[test]
    fn wire_roundtrip_for_defined_kinds() {
        let frames = [
            "PLAYER_LIST:Team A: alice, carol:Team B: bob, dave",
            "CHAT:hello: world",
            "SCORE_UPDATE:A:3:B:5",
            "TURN_WINNER:bob",
            "START_GAME:alice,carol:bob,dave",
            "MASTER_SELECTED:dave",
            "DEAL_CARDS:[Hearts-9, Spades-2, Clubs-Ace]",
            "SELECT_HOKM",
            "CARD_PLAYED:carol:Spades-Ace",
            "PLAYER_TURN:alice",
            "HOKM_SELECTED:Hearts",
            "ROUND_START:",
            "ROUND_WINS_UPDATE:A:1:B:0",
            "TEAM_WINS_ROUND:Team A",
            "GAME_OVER:Team B",
            "USER_LIST:alice:bob",
            "KICKED",
            "ROOM_CLOSED",
        ];
        for frame in frames {
            let event = decode(frame).unwrap();
            assert_eq!(event.to_wire(), frame, "round-trip failed for {frame}");
            assert_eq!(decode(&event.to_wire()).unwrap(), event);
        }
    }

    #[test]
    fn command_wire_forms() {
        let room = user("bob");
        let player = user("alice");
        assert_eq!(
            ClientCommand::PlayCard {
                room: room.clone(),
                player: player.clone(),
                card: Card::new(Suit::Hearts, "9"),
            }
            .to_wire(),
            "PLAY_CARD:bob:alice:Hearts-9"
        );
        assert_eq!(
            ClientCommand::SetHokm {
                room: room.clone(),
                suit: Suit::Spades,
            }
            .to_wire(),
            "SET_HOKM:bob:Spades"
        );
        assert_eq!(
            ClientCommand::Chat {
                room: room.clone(),
                player: player.clone(),
                text: "hi: all".to_string(),
            }
            .to_wire(),
            "CHAT:bob:alice:hi: all"
        );
        assert_eq!(
            ClientCommand::StartGame {
                room: room.clone(),
                player: player.clone(),
                team_a: vec![user("alice"), user("carol")],
                team_b: vec![user("bob"), user("dave")],
            }
            .to_wire(),
            "START_GAME:bob:alice:alice,carol:bob,dave"
        );
        assert_eq!(
            ClientCommand::JoinRoom {
                room,
                player,
            }
            .to_wire(),
            "JOIN_ROOM:bob:alice"
        );
    }
}
