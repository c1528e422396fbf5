//! Rules engine for a hidden-role city-building card game for 4 to 7
//! players: role draft, turn resolution, district abilities, and final
//! scoring, behind a single typed [`engine::GameEngine`] facade.
//!
//! The crate is transport-agnostic. A caller seats players, feeds
//! [`engine::Move`] values in, and renders the per-seat
//! [`engine::TableView`] projections that come back out; nothing here
//! opens a socket or draws a pixel.

pub mod bot;
pub mod catalog;
pub mod engine;

pub use engine::{GameConfig, GameEngine, GamePhase, Move, MoveRejection, PlayerId, TableView};
