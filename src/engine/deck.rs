use crate::engine::card::{Card, Color, Rank, Suit};
use rand::rng;
use rand::seq::SliceRandom;

/// The draw stack: `decks` standard 52-card decks shuffled together, each
/// contributing one red and one black Joker.
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn new(decks: u8) -> Self {
        let mut cards = Vec::with_capacity(54 * decks as usize);

        for _ in 0..decks {
            for suit in Suit::ALL {
                for rank in Rank::ALL {
                    cards.push(Card::Standard { suit, rank });
                }
            }
            cards.push(Card::Joker(Color::Red));
            cards.push(Card::Joker(Color::Black));
        }

        Self { cards }
    }

    pub fn shuffle(&mut self) {
        let mut rng = rng();
        self.cards.shuffle(&mut rng);
    }

    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Draws up to `n` cards.
    pub fn deal(&mut self, n: usize) -> Vec<Card> {
        let keep = self.cards.len().saturating_sub(n);
        let mut dealt = self.cards.split_off(keep);
        dealt.reverse();
        dealt
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deck_creation() {
        let deck = Deck::new(2);
        assert_eq!(deck.remaining(), 108);

        let jokers: Vec<&Card> = deck.cards.iter().filter(|c| c.is_joker()).collect();
        assert_eq!(jokers.len(), 4);
        assert_eq!(jokers.iter().filter(|c| c.color() == Color::Red).count(), 2);
    }

    #[test]
    fn each_face_appears_once_per_deck() {
        let deck = Deck::new(3);
        let seven_hearts = Card::new(Rank::Seven, Suit::Hearts);
        assert_eq!(deck.cards.iter().filter(|c| **c == seven_hearts).count(), 3);
    }

    #[test]
    fn test_deck_draw_and_deal() {
        let mut deck = Deck::new(1);
        deck.shuffle();
        let initial_len = deck.remaining();

        assert!(deck.draw().is_some());
        assert_eq!(deck.remaining(), initial_len - 1);

        let hand = deck.deal(14);
        assert_eq!(hand.len(), 14);
        assert_eq!(deck.remaining(), initial_len - 15);

        let rest = deck.deal(100);
        assert_eq!(rest.len(), initial_len - 15);
        assert_eq!(deck.remaining(), 0);
        assert!(deck.draw().is_none());
    }
}
