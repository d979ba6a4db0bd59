pub mod card;
pub mod combo_finder;
pub mod deck;
pub mod duo;
pub mod error;
pub mod meld;
pub mod rules;
pub mod spot;
