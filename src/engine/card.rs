use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::engine::error::RulesError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Color {
    Red,
    Black,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Suit {
    Hearts,
    Diamonds,
    Spades,
    Clubs,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Spades, Suit::Clubs];

    pub fn color(&self) -> Color {
        match self {
            Suit::Hearts | Suit::Diamonds => Color::Red,
            Suit::Spades | Suit::Clubs => Color::Black,
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suit::Hearts => write!(f, "♥"),
            Suit::Diamonds => write!(f, "♦"),
            Suit::Spades => write!(f, "♠"),
            Suit::Clubs => write!(f, "♣"),
        }
    }
}

/// The two suits that are neither `a` nor `b`.
///
/// Used to work out which copies of a rank could still complete a
/// two-card set. Passing the same suit twice is a caller bug.
pub fn other_two_suits(a: Suit, b: Suit) -> Result<[Suit; 2], RulesError> {
    if a == b {
        return Err(RulesError::SameSuit(a));
    }
    let mut rest = Suit::ALL.into_iter().filter(|s| *s != a && *s != b);
    match (rest.next(), rest.next()) {
        (Some(x), Some(y)) => Ok([x, y]),
        _ => Err(RulesError::SameSuit(a)),
    }
}

/// Ordinal used when a rank is resolved inside a run: an Ace opening a run
/// counts as one, below Two.
pub const ACE_LOW: u8 = 1;
pub const ACE_HIGH: u8 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
    Ace = 14,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// Scoring value of the rank when laid down.
    pub fn value(&self) -> u32 {
        match self {
            Rank::Jack | Rank::Queen | Rank::King => 10,
            Rank::Ace => 11,
            other => *other as u32,
        }
    }

    /// Ace-high ordinal (2..=14).
    pub fn ordinal(&self) -> u8 {
        *self as u8
    }

    /// Maps a resolved ordinal back to a rank. Both 1 and 14 are the Ace.
    pub fn from_ordinal(ordinal: u8) -> Option<Rank> {
        match ordinal {
            ACE_LOW | ACE_HIGH => Some(Rank::Ace),
            2..=13 => Rank::ALL.get(ordinal as usize - 2).copied(),
            _ => None,
        }
    }
}

/// Value contributed by a position whose rank was resolved to `ordinal`.
pub fn ordinal_value(ordinal: u8) -> u32 {
    match ordinal {
        ACE_LOW => 1,
        other => Rank::from_ordinal(other).map(|r| r.value()).unwrap_or(0),
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rank::Jack => write!(f, "J"),
            Rank::Queen => write!(f, "Q"),
            Rank::King => write!(f, "K"),
            Rank::Ace => write!(f, "A"),
            other => write!(f, "{}", *other as u8),
        }
    }
}

/// The face of a physical card. Two physical cards can share a face when
/// more than one deck is in play; identity is tracked by the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Card {
    Joker(Color),
    Standard { suit: Suit, rank: Rank },
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Card::Standard { suit, rank }
    }

    /// Value of the card on its own. A Joker only takes a value once a
    /// meld decides what it stands for.
    pub fn value(&self) -> u32 {
        match self {
            Card::Standard { rank, .. } => rank.value(),
            Card::Joker(_) => 0,
        }
    }

    pub fn is_joker(&self) -> bool {
        matches!(self, Card::Joker(_))
    }

    pub fn color(&self) -> Color {
        match self {
            Card::Standard { suit, .. } => suit.color(),
            Card::Joker(color) => *color,
        }
    }

    pub fn rank(&self) -> Option<Rank> {
        match self {
            Card::Standard { rank, .. } => Some(*rank),
            Card::Joker(_) => None,
        }
    }

    pub fn suit(&self) -> Option<Suit> {
        match self {
            Card::Standard { suit, .. } => Some(*suit),
            Card::Joker(_) => None,
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Card::Standard { suit, rank } => write!(f, "{}{}", rank, suit),
            Card::Joker(Color::Red) => write!(f, "🃏R"),
            Card::Joker(Color::Black) => write!(f, "🃏B"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot parse card from {0:?}")]
pub struct ParseCardError(pub String);

impl FromStr for Card {
    type Err = ParseCardError;

    /// Accepts the rendered form (`10♥`, `🃏B`) as well as ASCII shorthand
    /// (`10h`, `As`, `*r`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseCardError(s.to_string());
        let token = s.trim();
        if let Some(color) = token
            .strip_prefix("🃏")
            .or_else(|| token.strip_prefix('*'))
        {
            return match color.to_ascii_uppercase().as_str() {
                "R" => Ok(Card::Joker(Color::Red)),
                "B" => Ok(Card::Joker(Color::Black)),
                _ => Err(err()),
            };
        }

        let suit_char = token.chars().last().ok_or_else(err)?;
        let rank_part = &token[..token.len() - suit_char.len_utf8()];
        let suit = match suit_char {
            '♥' | 'h' | 'H' => Suit::Hearts,
            '♦' | 'd' | 'D' => Suit::Diamonds,
            '♠' | 's' | 'S' => Suit::Spades,
            '♣' | 'c' | 'C' => Suit::Clubs,
            _ => return Err(err()),
        };
        let rank = match rank_part.to_ascii_uppercase().as_str() {
            "J" => Rank::Jack,
            "Q" => Rank::Queen,
            "K" => Rank::King,
            "A" => Rank::Ace,
            "T" => Rank::Ten,
            digits => {
                let n: u8 = digits.parse().map_err(|_| err())?;
                match Rank::from_ordinal(n) {
                    Some(rank) if (2..=10).contains(&n) => rank,
                    _ => return Err(err()),
                }
            }
        };
        Ok(Card::Standard { suit, rank })
    }
}

/// Parses a whitespace separated list of cards. Test and fixture helper.
pub fn parse_cards(s: &str) -> Result<Vec<Card>, ParseCardError> {
    s.split_whitespace().map(str::parse).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_values() {
        assert_eq!(Card::new(Rank::Ace, Suit::Spades).value(), 11);
        assert_eq!(Card::new(Rank::Seven, Suit::Hearts).value(), 7);
        assert_eq!(Card::new(Rank::Jack, Suit::Clubs).value(), 10);
        assert_eq!(Card::new(Rank::King, Suit::Diamonds).value(), 10);
        assert_eq!(Card::Joker(Color::Red).value(), 0);
    }

    #[test]
    fn color_follows_suit_and_joker_carries_its_own() {
        assert_eq!(Card::new(Rank::Two, Suit::Hearts).color(), Color::Red);
        assert_eq!(Card::new(Rank::Two, Suit::Diamonds).color(), Color::Red);
        assert_eq!(Card::new(Rank::Two, Suit::Spades).color(), Color::Black);
        assert_eq!(Card::new(Rank::Two, Suit::Clubs).color(), Color::Black);
        assert_eq!(Card::Joker(Color::Black).color(), Color::Black);
        assert_eq!(Card::Joker(Color::Black).suit(), None);
    }

    #[test]
    fn joker_sorts_below_every_standard_card() {
        let mut cards = vec![
            Card::new(Rank::Two, Suit::Hearts),
            Card::Joker(Color::Black),
        ];
        cards.sort();
        assert!(cards[0].is_joker());
    }

    #[test]
    fn other_two_suits_returns_the_complement() {
        let mut rest = other_two_suits(Suit::Hearts, Suit::Spades).unwrap();
        rest.sort();
        assert_eq!(rest, [Suit::Diamonds, Suit::Clubs]);
    }

    #[test]
    fn other_two_suits_rejects_identical_suits() {
        assert_eq!(
            other_two_suits(Suit::Clubs, Suit::Clubs),
            Err(RulesError::SameSuit(Suit::Clubs))
        );
    }

    #[test]
    fn ordinals_map_both_aces() {
        assert_eq!(Rank::from_ordinal(1), Some(Rank::Ace));
        assert_eq!(Rank::from_ordinal(14), Some(Rank::Ace));
        assert_eq!(Rank::from_ordinal(10), Some(Rank::Ten));
        assert_eq!(Rank::from_ordinal(0), None);
        assert_eq!(Rank::from_ordinal(15), None);
        assert_eq!(ordinal_value(1), 1);
        assert_eq!(ordinal_value(14), 11);
        assert_eq!(ordinal_value(12), 10);
    }

    #[test]
    fn rendering_round_trips_through_parse() {
        let cards = parse_cards("10♥ A♠ 2♣ Q♦ 🃏R 🃏B").unwrap();
        let rendered: Vec<String> = cards.iter().map(|c| c.to_string()).collect();
        assert_eq!(rendered.join(" "), "10♥ A♠ 2♣ Q♦ 🃏R 🃏B");
    }

    #[test]
    fn parse_accepts_ascii_shorthand() {
        assert_eq!(
            parse_cards("10h Ts as *b").unwrap(),
            vec![
                Card::new(Rank::Ten, Suit::Hearts),
                Card::new(Rank::Ten, Suit::Spades),
                Card::new(Rank::Ace, Suit::Spades),
                Card::Joker(Color::Black),
            ]
        );
        assert!("1h".parse::<Card>().is_err());
        assert!("14s".parse::<Card>().is_err());
        assert!("5x".parse::<Card>().is_err());
        assert!("".parse::<Card>().is_err());
    }
}
