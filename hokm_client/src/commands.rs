use hokm::{Card, Suit, Username};
use std::fmt;

/// A parsed line of user input.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    /// Play a card from the hand.
    Play(Card),
    /// Choose the trump suit.
    SelectTrump(Suit),
    /// Send a chat line to the room.
    Chat(String),
    /// Ask the server for the current rosters.
    PlayerList,
    /// Start the game from the room preview (creator only).
    StartGame,
    /// Kick a user from the room (creator only).
    Kick(Username),
    /// Show the local hand.
    Hand,
    /// Show the table seating.
    Table,
    /// Show the scoreboard.
    Score,
    /// Show command help.
    Help,
    /// Leave the room and exit.
    Quit,
}

/// Errors that can occur during command parsing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseError {
    /// Play command missing its card.
    PlayMissingCard,
    /// Invalid card (not `<suit>-<rank>`).
    InvalidCard(String),
    /// Hokm command missing its suit.
    HokmMissingSuit,
    /// Invalid suit name.
    InvalidSuit(String),
    /// Chat command with nothing to say.
    ChatMissingText,
    /// Kick command missing a username.
    KickMissingUsername,
    /// Unrecognized command.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlayMissingCard => {
                write!(f, "Play requires a card (e.g. 'play Hearts-9')")
            }
            Self::InvalidCard(value) => write!(
                f,
                "Invalid card '{value}'. Cards look like 'Hearts-9' or 'Spades-Ace'"
            ),
            Self::HokmMissingSuit => {
                write!(f, "Hokm requires a suit (e.g. 'hokm Spades')")
            }
            Self::InvalidSuit(value) => write!(
                f,
                "Invalid suit '{value}'. Use Hearts, Diamonds, Clubs, or Spades"
            ),
            Self::ChatMissingText => write!(f, "Chat requires a message (e.g. 'chat hello')"),
            Self::KickMissingUsername => {
                write!(f, "Kick requires a username (e.g. 'kick alice')")
            }
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{cmd}'. Type 'help' to see available commands"
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse a line of user input into a [`Command`].
///
/// # Examples
///
/// ```
/// use hokm_client::commands::{Command, parse_command};
/// use hokm::{Card, Suit};
///
/// assert_eq!(parse_command("start"), Ok(Command::StartGame));
/// assert_eq!(
///     parse_command("play Hearts-9"),
///     Ok(Command::Play(Card::new(Suit::Hearts, "9")))
/// );
/// assert_eq!(
///     parse_command("hokm Spades"),
///     Ok(Command::SelectTrump(Suit::Spades))
/// );
/// assert!(parse_command("flip the table").is_err());
/// ```
pub fn parse_command(input: &str) -> Result<Command, ParseError> {
    let trimmed = input.trim();

    // Single-word commands first.
    match trimmed {
        "list" => return Ok(Command::PlayerList),
        "start" => return Ok(Command::StartGame),
        "hand" => return Ok(Command::Hand),
        "table" => return Ok(Command::Table),
        "score" => return Ok(Command::Score),
        "help" | "?" => return Ok(Command::Help),
        "quit" | "exit" => return Ok(Command::Quit),
        _ => {}
    }

    let (head, rest) = trimmed
        .split_once(char::is_whitespace)
        .unwrap_or((trimmed, ""));
    let rest = rest.trim();
    match head {
        "play" => {
            if rest.is_empty() {
                return Err(ParseError::PlayMissingCard);
            }
            let card = rest
                .parse::<Card>()
                .map_err(|_| ParseError::InvalidCard(rest.to_string()))?;
            Ok(Command::Play(card))
        }
        "hokm" => {
            if rest.is_empty() {
                return Err(ParseError::HokmMissingSuit);
            }
            let suit = rest
                .parse::<Suit>()
                .map_err(|_| ParseError::InvalidSuit(rest.to_string()))?;
            Ok(Command::SelectTrump(suit))
        }
        "chat" => {
            if rest.is_empty() {
                return Err(ParseError::ChatMissingText);
            }
            Ok(Command::Chat(rest.to_string()))
        }
        "kick" => {
            if rest.is_empty() {
                return Err(ParseError::KickMissingUsername);
            }
            Ok(Command::Kick(Username::new(rest)))
        }
        _ => Err(ParseError::UnrecognizedCommand(trimmed.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_word_commands() {
        assert_eq!(parse_command("list"), Ok(Command::PlayerList));
        assert_eq!(parse_command(" start "), Ok(Command::StartGame));
        assert_eq!(parse_command("hand"), Ok(Command::Hand));
        assert_eq!(parse_command("table"), Ok(Command::Table));
        assert_eq!(parse_command("score"), Ok(Command::Score));
        assert_eq!(parse_command("help"), Ok(Command::Help));
        assert_eq!(parse_command("?"), Ok(Command::Help));
        assert_eq!(parse_command("quit"), Ok(Command::Quit));
        assert_eq!(parse_command("exit"), Ok(Command::Quit));
    }

    #[test]
    fn play_commands() {
        assert_eq!(
            parse_command("play Spades-Ace"),
            Ok(Command::Play(Card::new(Suit::Spades, "Ace")))
        );
        assert_eq!(parse_command("play"), Err(ParseError::PlayMissingCard));
        assert_eq!(
            parse_command("play garbage"),
            Err(ParseError::InvalidCard("garbage".to_string()))
        );
    }

    #[test]
    fn hokm_commands() {
        assert_eq!(
            parse_command("hokm Diamonds"),
            Ok(Command::SelectTrump(Suit::Diamonds))
        );
        assert_eq!(parse_command("hokm"), Err(ParseError::HokmMissingSuit));
        assert_eq!(
            parse_command("hokm Swords"),
            Err(ParseError::InvalidSuit("Swords".to_string()))
        );
    }

    #[test]
    fn chat_preserves_the_whole_line() {
        assert_eq!(
            parse_command("chat hello there: everyone"),
            Ok(Command::Chat("hello there: everyone".to_string()))
        );
        assert_eq!(parse_command("chat"), Err(ParseError::ChatMissingText));
    }

    #[test]
    fn kick_commands() {
        assert_eq!(
            parse_command("kick mallory"),
            Ok(Command::Kick(Username::new("mallory")))
        );
        assert_eq!(parse_command("kick"), Err(ParseError::KickMissingUsername));
    }

    #[test]
    fn unrecognized_input() {
        assert_eq!(
            parse_command("flip the table"),
            Err(ParseError::UnrecognizedCommand("flip the table".to_string()))
        );
    }
}
