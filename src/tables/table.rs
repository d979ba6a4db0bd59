use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::config::RuleContext;
use crate::engine::card::Card;
use crate::engine::error::RulesError;
use crate::engine::meld::Meld;
use crate::engine::spot::{Fit, Single, Spot, find_singles};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("table has no spot {0}")]
    NoSuchSpot(usize),
    #[error(transparent)]
    Rules(#[from] RulesError),
}

/// The melds laid down during one round, in the order they were laid.
#[derive(Debug, Clone)]
pub struct Table {
    pub id: Uuid,
    ctx: RuleContext,
    spots: Vec<Spot>,
}

impl Table {
    pub fn new(id: Uuid, ctx: RuleContext) -> Self {
        Self {
            id,
            ctx,
            spots: Vec::new(),
        }
    }

    pub fn ctx(&self) -> &RuleContext {
        &self.ctx
    }

    pub fn spots(&self) -> &[Spot] {
        &self.spots
    }

    pub fn spot(&self, index: usize) -> Result<&Spot, TableError> {
        self.spots.get(index).ok_or(TableError::NoSuchSpot(index))
    }

    /// Every card currently on the table, Jokers included.
    pub fn cards(&self) -> Vec<Card> {
        self.spots.iter().flat_map(|s| s.cards().iter().copied()).collect()
    }

    /// Lays `meld` into a fresh spot and returns its index.
    pub fn lay_down(&mut self, meld: Meld) -> Result<usize, TableError> {
        let mut spot = Spot::new();
        spot.lay_down(meld).map_err(|e| e.in_round(self.ctx.round))?;
        self.spots.push(spot);
        let index = self.spots.len() - 1;
        info!(table = %self.id, spot = index, round = self.ctx.round, "meld laid down");
        Ok(index)
    }

    pub fn fit(&self, index: usize, card: Card) -> Result<Fit, TableError> {
        Ok(self.spot(index)?.can_fit(card))
    }

    /// Puts `card` onto spot `index`, swapping out a Joker when the card
    /// stands where one is. Returns the displaced Joker.
    pub fn place(&mut self, index: usize, card: Card) -> Result<Option<Card>, TableError> {
        let round = self.ctx.round;
        let spot = self
            .spots
            .get_mut(index)
            .ok_or(TableError::NoSuchSpot(index))?;

        let joker = match spot.can_fit(card) {
            Fit::ReplaceJoker { .. } => Some(spot.replace_joker(card).map_err(|e| e.in_round(round))?),
            Fit::Extend | Fit::No => {
                spot.add_card(card).map_err(|e| e.in_round(round))?;
                None
            }
        };
        info!(table = %self.id, spot = index, %card, joker = joker.is_some(), "card placed");
        Ok(joker)
    }

    pub fn singles(&self, hand: &[Card]) -> Vec<Single> {
        find_singles(hand, &self.spots)
    }

    /// Clears every spot and moves on to the next round. Returns the cards
    /// that were on the table.
    pub fn reset(&mut self) -> Vec<Card> {
        let cards: Vec<Card> = self.spots.iter_mut().flat_map(|s| s.reset()).collect();
        self.spots.clear();
        self.ctx = self.ctx.with_round(self.ctx.round + 1);
        info!(table = %self.id, round = self.ctx.round, returned = cards.len(), "table reset");
        cards
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::card::{Color, parse_cards};

    fn cards(s: &str) -> Vec<Card> {
        parse_cards(s).unwrap()
    }

    fn table() -> Table {
        Table::new(Uuid::new_v4(), RuleContext::default())
    }

    #[test]
    fn lay_down_opens_a_new_spot_each_time() {
        let mut table = table();
        assert_eq!(table.lay_down(Meld::run(cards("5♥ 6♥ 7♥")).unwrap()), Ok(0));
        assert_eq!(table.lay_down(Meld::set(cards("9♠ 9♥ 9♦")).unwrap()), Ok(1));
        assert_eq!(table.spots().len(), 2);
        assert_eq!(table.cards().len(), 6);
    }

    #[test]
    fn place_extends_or_swaps_the_joker() {
        let mut table = table();
        table.lay_down(Meld::run(cards("5♥ 🃏R 7♥")).unwrap()).unwrap();
        assert_eq!(table.place(0, "8♥".parse().unwrap()), Ok(None));
        assert_eq!(table.place(0, "6♥".parse().unwrap()), Ok(Some(Card::Joker(Color::Red))));
        assert_eq!(table.spot(0).unwrap().cards(), cards("5♥ 6♥ 7♥ 8♥").as_slice());
    }

    #[test]
    fn misplaced_card_reports_the_round() {
        let mut table = table();
        table.lay_down(Meld::run(cards("5♥ 6♥ 7♥")).unwrap()).unwrap();
        table.reset();
        table.lay_down(Meld::run(cards("5♥ 6♥ 7♥")).unwrap()).unwrap();

        let err = table.place(0, "4♣".parse().unwrap()).unwrap_err();
        let TableError::Rules(rules) = err else {
            panic!("expected a rules error, got {err:?}");
        };
        assert!(matches!(rules, RulesError::InRound { round: 1, .. }));
        assert!(matches!(rules.root(), RulesError::InvalidMeld { .. }));
        assert_eq!(table.place(3, "8♥".parse().unwrap()), Err(TableError::NoSuchSpot(3)));
    }

    #[test]
    fn reset_returns_cards_and_advances_round() {
        let mut table = table();
        table.lay_down(Meld::set(cards("9♠ 9♥ 9♦")).unwrap()).unwrap();
        let returned = table.reset();
        assert_eq!(returned.len(), 3);
        assert!(table.spots().is_empty());
        assert_eq!(table.ctx().round, 1);
    }

    #[test]
    fn singles_cover_every_spot() {
        let mut table = table();
        table.lay_down(Meld::run(cards("5♥ 6♥ 7♥")).unwrap()).unwrap();
        table.lay_down(Meld::set(cards("9♠ 9♥ 9♦")).unwrap()).unwrap();
        let singles = table.singles(&cards("9♣ 4♥ K♠"));
        let placed: Vec<(usize, usize)> = singles.iter().map(|s| (s.hand_index, s.spot_index)).collect();
        assert_eq!(placed, vec![(0, 1), (1, 0)]);
    }
}
