//! Bot strategy trait and implementations.

use rand::seq::SliceRandom;

use crate::engine::{Move, TableView};

/// A bot strategy selects one of the legal moves given its seat's view of
/// the table. It never sees hidden information: the view is the same
/// projection a remote client would render.
///
/// Returning `None`, returning a move that is not in `legal`, or panicking
/// are all survivable; the driver falls back to a neutral move.
pub trait Strategy: Send + Sync {
    fn name(&self) -> &str;

    fn choose(&self, view: &TableView, legal: &[Move]) -> Option<Move>;
}

/// Picks a uniformly random legal move.
pub struct RandomStrategy;

impl Strategy for RandomStrategy {
    fn name(&self) -> &str {
        "random"
    }

    fn choose(&self, _view: &TableView, legal: &[Move]) -> Option<Move> {
        let mut rng = rand::thread_rng();
        legal.choose(&mut rng).cloned()
    }
}

/// Builds the most expensive affordable district, hoards gold otherwise,
/// and spends abilities before ending the turn. Deliberately simple; it
/// exists to finish games, not to win tournaments.
pub struct GreedyStrategy;

impl Strategy for GreedyStrategy {
    fn name(&self) -> &str {
        "greedy"
    }

    fn choose(&self, view: &TableView, legal: &[Move]) -> Option<Move> {
        let own = &view.players[view.viewer];

        // Best build first.
        let best_build = legal
            .iter()
            .filter_map(|mv| match mv {
                Move::BuildDistrict { card } => {
                    let cost = own
                        .hand
                        .as_ref()?
                        .iter()
                        .find(|c| c.id == *card)
                        .map(|c| c.kind.cost())?;
                    Some((cost, mv))
                }
                _ => None,
            })
            .max_by_key(|(cost, _)| *cost);
        if let Some((_, mv)) = best_build {
            return Some(mv.clone());
        }

        // Low on cards: draw. Otherwise take the gold.
        let hand_size = own.hand_size;
        for mv in legal {
            match mv {
                Move::TakeIncome if hand_size >= 2 => return Some(mv.clone()),
                Move::DrawCards if hand_size < 2 => return Some(mv.clone()),
                _ => {}
            }
        }

        // Keep the most expensive drawn card.
        let best_keep = legal
            .iter()
            .filter_map(|mv| match mv {
                Move::KeepCard { card } => {
                    let cost = view
                        .drawn_cards
                        .as_ref()?
                        .iter()
                        .find(|c| c.id == *card)
                        .map(|c| c.kind.cost())?;
                    Some((cost, mv))
                }
                _ => None,
            })
            .max_by_key(|(cost, _)| *cost);
        if let Some((_, mv)) = best_keep {
            return Some(mv.clone());
        }

        // First role in rank order, first interaction answer, and any
        // remaining structural move, in the order the engine lists them.
        legal.first().cloned()
    }
}

/// Look up a strategy by the name used in bot profile files.
pub fn strategy_from_name(name: &str) -> Option<Box<dyn Strategy>> {
    match name {
        "random" => Some(Box::new(RandomStrategy)),
        "greedy" => Some(Box::new(GreedyStrategy)),
        _ => None,
    }
}
