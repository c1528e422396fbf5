//! Per-seat projection of the table. Everything a client renders comes from
//! here; the authoritative state itself never leaves the engine.
//!
//! Hidden information stays hidden: opponents' hands shrink to a count,
//! unrevealed roles are omitted, the deck is a size, and an assassinated
//! seat is not marked until the round plays out. The Assassin's and Thief's
//! declarations are public announcements, so the marked roles are visible
//! to everyone.

use serde::{Deserialize, Serialize};

use crate::catalog::Role;
use crate::engine::state::{
    DistrictCard, GamePhase, GameState, PendingInteraction, PlayerId, Standing,
};

/// What one seat is allowed to see.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableView {
    pub viewer: PlayerId,
    pub phase: GamePhase,
    pub round: u32,
    pub players: Vec<SeatView>,
    pub king: PlayerId,
    pub current_player: PlayerId,
    pub current_role: u8,
    /// Open pool, shown only to the seat whose pick it is.
    pub available_roles: Option<Vec<Role>>,
    pub removed_face_up: Vec<Role>,
    pub killed_role: Option<Role>,
    pub robbed_role: Option<Role>,
    pub deck_size: usize,
    pub discard_size: usize,
    /// Draw-and-choose cards, shown only to the drawer.
    pub drawn_cards: Option<Vec<DistrictCard>>,
    /// Pending interaction, shown only to the seat that must answer it.
    pub interaction: Option<PendingInteraction>,
    pub awaited_seat: Option<PlayerId>,
    pub standings: Vec<Standing>,
    pub log: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatView {
    pub seat: PlayerId,
    pub name: String,
    pub is_bot: bool,
    pub gold: u32,
    pub hand_size: usize,
    /// Present only for the viewer's own seat.
    pub hand: Option<Vec<DistrictCard>>,
    pub city: Vec<DistrictCard>,
    /// Present for the viewer's own seat, or once the role is revealed.
    pub role: Option<Role>,
    pub role_revealed: bool,
    pub has_taken_action: bool,
}

/// Project the state for one seat.
pub fn view_for(state: &GameState, viewer: PlayerId) -> TableView {
    let players = state
        .players
        .iter()
        .map(|p| {
            let own = p.seat == viewer;
            SeatView {
                seat: p.seat,
                name: p.name.clone(),
                is_bot: p.is_bot,
                gold: p.gold,
                hand_size: p.hand.len(),
                hand: own.then(|| p.hand.clone()),
                city: p.city.clone(),
                role: if own || p.role_revealed { p.role } else { None },
                role_revealed: p.role_revealed,
                has_taken_action: p.has_taken_action,
            }
        })
        .collect();

    let picking = state.phase == GamePhase::Draft && state.draft_seat == viewer;
    let drawing = state.current_player == viewer && !state.drawn_cards.is_empty();
    let interaction = state
        .interaction
        .as_ref()
        .filter(|pending| pending.actor == viewer)
        .cloned();

    TableView {
        viewer,
        phase: state.phase,
        round: state.round,
        players,
        king: state.king,
        current_player: state.current_player,
        current_role: state.current_role,
        available_roles: picking.then(|| state.available_roles.clone()),
        removed_face_up: state.removed_face_up.clone(),
        killed_role: state.killed_role,
        robbed_role: state.robbed_role,
        deck_size: state.deck.len(),
        discard_size: state.discard.len(),
        drawn_cards: drawing.then(|| state.drawn_cards.clone()),
        interaction,
        awaited_seat: state.awaited_seat(),
        standings: state.standings.clone(),
        log: state.log.clone(),
    }
}
