//! Property test: decoding is the exact inverse of encoding for every
//! defined message kind.

use proptest::{collection::vec, prelude::*, sample::select, strategy::Union};

use hokm::{Card, ServerEvent, Suit, Username, decode};

fn suit() -> impl Strategy<Value = Suit> {
    select(Suit::ALL.to_vec())
}

fn rank() -> impl Strategy<Value = String> {
    select(vec![
        "2", "3", "4", "5", "6", "7", "8", "9", "10", "Jack", "Queen", "King", "Ace",
    ])
    .prop_map(str::to_string)
}

fn card() -> impl Strategy<Value = Card> {
    (suit(), rank()).prop_map(|(suit, rank)| Card::new(suit, rank))
}

fn name() -> impl Strategy<Value = Username> {
    "[a-z][a-z0-9_]{0,7}".prop_map(|s| Username::new(&s))
}

fn team() -> impl Strategy<Value = String> {
    select(vec!["Team A", "Team B"]).prop_map(str::to_string)
}

fn chat_text() -> impl Strategy<Value = String> {
    // Printable ASCII, colons included: chat bodies are never split.
    "[ -~]{0,40}"
}

fn event() -> impl Strategy<Value = ServerEvent> {
    Union::new(vec![
        (vec(name(), 0..3), vec(name(), 0..3))
            .prop_map(|(team_a, team_b)| ServerEvent::PlayerList { team_a, team_b })
            .boxed(),
        chat_text().prop_map(|text| ServerEvent::Chat { text }).boxed(),
        (any::<u32>(), any::<u32>())
            .prop_map(|(team_a, team_b)| ServerEvent::ScoreUpdate { team_a, team_b })
            .boxed(),
        name()
            .prop_map(|player| ServerEvent::TrickWinner { player })
            .boxed(),
        (vec(name(), 2), vec(name(), 2))
            .prop_map(|(team_a, team_b)| ServerEvent::StartGame { team_a, team_b })
            .boxed(),
        name()
            .prop_map(|player| ServerEvent::MasterSelected { player })
            .boxed(),
        vec(card(), 0..13)
            .prop_map(|cards| ServerEvent::DealCards { cards })
            .boxed(),
        Just(ServerEvent::SelectTrump).boxed(),
        (name(), card())
            .prop_map(|(player, card)| ServerEvent::CardPlayed { player, card })
            .boxed(),
        name()
            .prop_map(|player| ServerEvent::PlayerTurn { player })
            .boxed(),
        suit()
            .prop_map(|suit| ServerEvent::TrumpSelected { suit })
            .boxed(),
        Just(ServerEvent::RoundStart).boxed(),
        (any::<u32>(), any::<u32>())
            .prop_map(|(team_a, team_b)| ServerEvent::RoundWinsUpdate { team_a, team_b })
            .boxed(),
        team()
            .prop_map(|team| ServerEvent::TeamWinsRound { team })
            .boxed(),
        team()
            .prop_map(|winner| ServerEvent::GameOver { winner })
            .boxed(),
        vec(name(), 1..5)
            .prop_map(|users| ServerEvent::UserList { users })
            .boxed(),
        Just(ServerEvent::Kicked).boxed(),
        Just(ServerEvent::RoomClosed).boxed(),
    ])
}

proptest! {
    #[test]
    fn decode_is_the_inverse_of_encode(event in event()) {
        let wire = event.to_wire();
        let decoded = decode(&wire).unwrap();
        prop_assert_eq!(decoded, event);
    }

    #[test]
    fn decode_is_total(raw in "[ -~]{0,60}") {
        // Any printable line decodes to some kind or falls back to
        // Unrecognized; it never panics.
        let _ = decode(&raw);
    }
}
