use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};

use crate::constants::TEAM_SIZE;

/// The four playable suits. There are no jokers in Hokm.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Self::Hearts, Self::Diamonds, Self::Clubs, Self::Spades];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hearts => "Hearts",
            Self::Diamonds => "Diamonds",
            Self::Clubs => "Clubs",
            Self::Spades => "Spades",
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown suit: {0}")]
pub struct ParseSuitError(pub String);

impl FromStr for Suit {
    type Err = ParseSuitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Hearts" => Ok(Self::Hearts),
            "Diamonds" => Ok(Self::Diamonds),
            "Clubs" => Ok(Self::Clubs),
            "Spades" => Ok(Self::Spades),
            other => Err(ParseSuitError(other.to_string())),
        }
    }
}

/// A playing card, serialized on the wire as `<suit>-<rank>`
/// (e.g. `Hearts-9`, `Spades-Ace`). Ranks are carried as plain strings;
/// the server is the authority on rank ordering.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Card {
    pub suit: Suit,
    pub rank: String,
}

impl Card {
    pub fn new(suit: Suit, rank: impl Into<String>) -> Self {
        Self {
            suit,
            rank: rank.into(),
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}", self.suit, self.rank)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("malformed card: {0}")]
pub struct ParseCardError(pub String);

impl FromStr for Card {
    type Err = ParseCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (suit, rank) = trimmed
            .split_once('-')
            .ok_or_else(|| ParseCardError(trimmed.to_string()))?;
        let suit: Suit = suit.parse().map_err(|_| ParseCardError(trimmed.to_string()))?;
        if rank.is_empty() {
            return Err(ParseCardError(trimmed.to_string()));
        }
        Ok(Self::new(suit, rank))
    }
}

/// A player name. Colons are the wire field delimiter and so are never
/// allowed inside a name.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Username(String);

impl Username {
    pub fn new(s: &str) -> Self {
        let name: String = s
            .trim()
            .chars()
            .map(|c| if c == ':' { '_' } else { c })
            .collect();
        Self(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for Username {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl From<&str> for Username {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Username {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

/// One of the two fixed teams.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum TeamId {
    A,
    B,
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::A => "Team A",
            Self::B => "Team B",
        };
        write!(f, "{repr}")
    }
}

/// Relative seating around the table for one player's point of view:
/// partner across the table, opponents to either side.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TableSeating {
    pub top: Option<Username>,
    pub right: Option<Username>,
    pub left: Option<Username>,
    pub bottom: Username,
}

/// The two team rosters. Before the game starts this holds the room
/// preview; once the game starts it holds the authoritative teams.
/// A player appears in exactly one team.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Roster {
    team_a: Vec<Username>,
    team_b: Vec<Username>,
}

impl Roster {
    pub fn set_teams(&mut self, team_a: Vec<Username>, team_b: Vec<Username>) {
        self.team_a = team_a;
        self.team_b = team_b;
    }

    /// Room preview assignment: users alternate between the teams in
    /// join order (even index team A, odd index team B).
    pub fn set_from_user_list(&mut self, users: &[Username]) {
        self.team_a.clear();
        self.team_b.clear();
        for (i, user) in users.iter().enumerate() {
            if i % 2 == 0 {
                self.team_a.push(user.clone());
            } else {
                self.team_b.push(user.clone());
            }
        }
    }

    pub fn team_a(&self) -> &[Username] {
        &self.team_a
    }

    pub fn team_b(&self) -> &[Username] {
        &self.team_b
    }

    pub fn user_count(&self) -> usize {
        self.team_a.len() + self.team_b.len()
    }

    pub fn is_complete(&self) -> bool {
        self.team_a.len() == TEAM_SIZE && self.team_b.len() == TEAM_SIZE
    }

    pub fn team_of(&self, player: &Username) -> Option<TeamId> {
        if self.team_a.contains(player) {
            Some(TeamId::A)
        } else if self.team_b.contains(player) {
            Some(TeamId::B)
        } else {
            None
        }
    }

    /// Seating for a presentation layer: the local player sits at the
    /// bottom, their partner across the top, the first opponent to the
    /// right and the second to the left. `None` if `local` is not seated.
    pub fn seating(&self, local: &Username) -> Option<TableSeating> {
        let (own, other) = match self.team_of(local)? {
            TeamId::A => (&self.team_a, &self.team_b),
            TeamId::B => (&self.team_b, &self.team_a),
        };
        let partner = own.iter().find(|p| *p != local).cloned();
        Some(TableSeating {
            top: partner,
            right: other.first().cloned(),
            left: other.get(1).cloned(),
            bottom: local.clone(),
        })
    }
}

/// The local player's cards. Replaced wholesale by a deal, shrunk one
/// card at a time by plays.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Hand(Vec<Card>);

impl Hand {
    pub fn replace(&mut self, cards: Vec<Card>) {
        self.0 = cards;
    }

    /// Removes the first matching card. Returns whether one was removed.
    pub fn remove(&mut self, card: &Card) -> bool {
        match self.0.iter().position(|c| c == card) {
            Some(idx) => {
                self.0.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, card: &Card) -> bool {
        self.0.contains(card)
    }

    pub fn has_suit(&self, suit: Suit) -> bool {
        self.0.iter().any(|c| c.suit == suit)
    }

    pub fn cards(&self) -> &[Card] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The cards on the table for the current trick, in play order. The led
/// suit is fixed by the first card and cleared when the trick is won.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Trick {
    led_suit: Option<Suit>,
    played: Vec<(Username, Card)>,
}

impl Trick {
    pub fn record(&mut self, player: Username, card: Card) {
        if self.played.is_empty() {
            self.led_suit = Some(card.suit);
        }
        self.played.push((player, card));
    }

    pub fn clear(&mut self) {
        self.led_suit = None;
        self.played.clear();
    }

    pub fn led_suit(&self) -> Option<Suit> {
        self.led_suit
    }

    pub fn played(&self) -> &[(Username, Card)] {
        &self.played
    }

    pub fn len(&self) -> usize {
        self.played.len()
    }

    pub fn is_empty(&self) -> bool {
        self.played.is_empty()
    }
}

/// Cumulative points and round wins as last reported by the server.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ScoreBoard {
    pub team_a_points: u32,
    pub team_b_points: u32,
    pub team_a_round_wins: u32,
    pub team_b_round_wins: u32,
}

/// Whose turn it is. `is_local_turn` is derived from the current player
/// and only ever changes through `PLAYER_TURN` dispatch (and the local
/// echo of our own play).
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct TurnState {
    pub current_player: Option<Username>,
    pub is_local_turn: bool,
}

/// The trump ("Hokm") selection for the current round.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct TrumpState {
    pub selector: Option<Username>,
    pub suit: Option<Suit>,
}

/// Where the per-trick flow currently stands.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum GamePhase {
    #[default]
    AwaitingDeal,
    AwaitingTrumpSelection,
    AwaitingTurn,
    CardLegalToPlay,
    CardPlayed,
    TrickResolved,
    RoundResolved,
    GameOver,
}
