//! Card drawing.
//!
//! A deck is the catalog's cards for one [`DeckType`], dealt in a fixed
//! round-robin over card categories so consecutive draws vary in kind:
//! - Categories cycle in [`CardCategory::ALL`] order
//! - Within a category, cards come out sorted by id
//! - When the deck runs out it starts over from the top

use crate::{CardCategory, Catalog, DeckType, Error, GameCard, Result};

/// Deterministic, cycling deck of cards
#[derive(Clone, Debug)]
pub struct Deck {
    deck_type: DeckType,
    order: Vec<GameCard>,
    position: usize,
}

impl Deck {
    /// Build a deck from the catalog's cards for `deck_type`
    pub fn new(catalog: &Catalog, deck_type: DeckType) -> Result<Self> {
        let order = deal_order(catalog, deck_type);
        if order.is_empty() {
            return Err(Error::CatalogValidation(format!(
                "No cards available for the {:?} deck",
                deck_type
            )));
        }

        tracing::info!("Built {:?} deck with {} cards", deck_type, order.len());
        Ok(Self {
            deck_type,
            order,
            position: 0,
        })
    }

    /// Start dealing part-way through, so two decks of the same type differ
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.position = offset % self.order.len();
        self
    }

    pub fn deck_type(&self) -> DeckType {
        self.deck_type
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Card the next draw will return
    pub fn peek(&self) -> &GameCard {
        &self.order[self.position % self.order.len()]
    }

    /// Draw the next card
    pub fn draw(&mut self) -> GameCard {
        let card = self.peek().clone();
        self.position = (self.position + 1) % self.order.len();
        tracing::debug!("Drew card '{}' from {:?} deck", card.id, self.deck_type);
        card
    }
}

fn deal_order(catalog: &Catalog, deck_type: DeckType) -> Vec<GameCard> {
    let cards = catalog.cards_for_deck(deck_type);

    let mut piles: Vec<Vec<&GameCard>> = CardCategory::ALL
        .iter()
        .map(|category| {
            cards
                .iter()
                .copied()
                .filter(|card| card.category == *category)
                .collect()
        })
        .collect();

    // Reverse so pop() yields ids in ascending order
    for pile in &mut piles {
        pile.reverse();
    }

    let mut order = Vec::with_capacity(cards.len());
    while order.len() < cards.len() {
        for pile in &mut piles {
            if let Some(card) = pile.pop() {
                order.push(card.clone());
            }
        }
    }
    order
}
