//! A Hokm client CLI.
//!
//! Connects to a game server, joins a room, and bridges the session
//! engine's notification stream to the terminal: notifications print as
//! timestamped records (or JSON lines), stdin lines parse into game
//! commands.

use anyhow::Result;
use chrono::Utc;
use pico_args::Arguments;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use hokm::{GameClient, Notification, TrumpAuthority, Username};
use hokm_client::{
    commands::{Command, parse_command},
    config::ClientConfig,
};

const HELP: &str = "\
Connect to a Hokm game server

USAGE:
  hokm_client [OPTIONS]

OPTIONS:
  --server ADDR         Server address  [default: 127.0.0.1:12345]
  --username NAME       Player name  [default: the OS login name]
  --room NAME           Room creator's name (the room to join)
  --creator-hokm        The room creator chooses the hokm suit
  --json                Print notifications as JSON lines

FLAGS:
  -h, --help            Print help information
";

const COMMANDS_HELP: &str = "\
play CARD
        Play a card from your hand, e.g. 'play Hearts-9'. Refused when
        it's not your turn or the card doesn't follow the led suit.
hokm SUIT
        Choose the trump suit when asked, e.g. 'hokm Spades'.
chat TEXT
        Send a chat line to the room.
list
        Ask the server for the team rosters.
start
        Start the game. Only the room creator with a full room.
kick NAME
        Kick a user from the room. Room creator only.
hand
        Show the cards currently in your hand.
table
        Show who sits where around the table.
score
        Show the current points and round wins.
quit
        Leave the room and exit.
";

struct Args {
    server: Option<String>,
    username: Option<String>,
    room: Option<String>,
    creator_hokm: bool,
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let mut pargs = Arguments::from_env();
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        server: pargs.opt_value_from_str("--server")?,
        username: pargs.opt_value_from_str("--username")?,
        room: pargs.opt_value_from_str("--room")?,
        creator_hokm: pargs.contains("--creator-hokm"),
        json: pargs.contains("--json"),
    };

    let config = ClientConfig::from_env(args.server, args.username, args.room)?;
    config.validate()?;

    run(config, args.creator_hokm, args.json).await
}

async fn run(config: ClientConfig, creator_hokm: bool, json: bool) -> Result<()> {
    let authority = if creator_hokm {
        TrumpAuthority::RoomCreator
    } else {
        TrumpAuthority::TrumpSelector
    };
    let username = Username::new(&config.username);
    let room = Username::new(&config.room);

    println!("Connecting to {} as {}...", config.server, username);
    let (client, mut notifications) =
        GameClient::connect(&config.server, username, room, authority).await?;
    println!(
        "Joined {}'s room. Type 'help' for commands.",
        client.room()
    );
    let client = Arc::new(client);

    let mut printer = tokio::spawn({
        let client = Arc::clone(&client);
        async move {
            while let Some(notification) = notifications.recv().await {
                print_record(&notification, json);
                match notification {
                    Notification::TeamsReady { .. } => {
                        // The game view just opened; fetch the roster.
                        if let Err(error) = client.request_player_list().await {
                            eprintln!("Error: {error}");
                        }
                    }
                    Notification::Kicked
                    | Notification::RoomClosed
                    | Notification::Disconnected { .. } => break,
                    _ => {}
                }
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = &mut printer => break,
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle_line(&client, &line).await {
                    break;
                }
            }
        }
    }

    printer.abort();
    client.close();
    println!("Disconnected.");
    Ok(())
}

/// Handles one line of input. Returns false when the session should end.
async fn handle_line(client: &GameClient, line: &str) -> bool {
    if line.trim().is_empty() {
        return true;
    }
    match parse_command(line) {
        Ok(Command::Play(card)) => report(client.play_card(&card).await),
        Ok(Command::SelectTrump(suit)) => report(client.select_trump(suit).await),
        Ok(Command::Chat(text)) => report(client.send_chat(&text).await),
        Ok(Command::PlayerList) => report(client.request_player_list().await),
        Ok(Command::StartGame) => report(client.start_game().await),
        Ok(Command::Kick(user)) => report(client.kick_user(&user).await),
        Ok(Command::Hand) => {
            let hand: Vec<String> = client.hand().iter().map(ToString::to_string).collect();
            if hand.is_empty() {
                println!("Your hand is empty.");
            } else {
                println!("Your hand: {}", hand.join(", "));
            }
        }
        Ok(Command::Table) => {
            let seating = client.with_session(|session| {
                session.roster().seating(session.username())
            });
            match seating {
                Some(seating) => {
                    let name = |seat: &Option<hokm::Username>| match seat {
                        Some(player) => player.to_string(),
                        None => "(empty)".to_string(),
                    };
                    println!("Across: {}", name(&seating.top));
                    println!("Right:  {}", name(&seating.right));
                    println!("Left:   {}", name(&seating.left));
                    println!("You:    {}", seating.bottom);
                }
                None => println!("You are not seated yet."),
            }
        }
        Ok(Command::Score) => {
            let scores = client.scoreboard();
            println!(
                "Points: Team A {} - Team B {} | Rounds: Team A {} - Team B {}",
                scores.team_a_points,
                scores.team_b_points,
                scores.team_a_round_wins,
                scores.team_b_round_wins
            );
        }
        Ok(Command::Help) => print!("{COMMANDS_HELP}"),
        Ok(Command::Quit) => {
            report(client.leave_room().await);
            return false;
        }
        Err(error) => eprintln!("{error}"),
    }
    true
}

fn report(result: Result<()>) {
    if let Err(error) = result {
        eprintln!("Error: {error}");
    }
}

/// Prints a notification as a timestamped record, or a JSON line in
/// `--json` mode (for piping into another presentation layer).
fn print_record(notification: &Notification, json: bool) {
    if json {
        match serde_json::to_string(notification) {
            Ok(line) => println!("{line}"),
            Err(error) => eprintln!("Error: failed to encode notification: {error}"),
        }
        return;
    }
    let label = match notification {
        Notification::ChatReceived { .. } | Notification::RawText { .. } => "CHAT",
        Notification::YourTurn | Notification::TrumpChoiceRequired => "ALERT",
        Notification::Kicked
        | Notification::RoomClosed
        | Notification::Disconnected { .. }
        | Notification::SendFailed { .. } => "ERROR",
        _ => "GAME",
    };
    println!(
        "[{} {label:5}]: {notification}",
        Utc::now().format("%H:%M:%S")
    );
}
