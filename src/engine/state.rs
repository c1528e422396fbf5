//! Authoritative game state. One mutable instance per table; every field is
//! serializable so a snapshot can cross any process or network boundary.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::catalog::{District, DistrictColor, Role};

/// Stable seat index, assigned at join time.
pub type PlayerId = usize;

/// Identity of one physical card. Two copies of the same district kind have
/// different card ids.
pub type CardId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictCard {
    pub id: CardId,
    pub kind: District,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Lobby,
    Draft,
    Action,
    /// Round finished and a completed city was flagged; awaiting the
    /// explicit scoring confirmation.
    RoundEndCheck,
    /// Round finished normally; awaiting the explicit new-round trigger.
    EndRound,
    GameOver,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub seat: PlayerId,
    pub name: String,
    pub is_bot: bool,
    pub gold: u32,
    pub hand: Vec<DistrictCard>,
    pub city: Vec<DistrictCard>,
    pub role: Option<Role>,
    pub role_revealed: bool,
    pub has_taken_action: bool,
    pub ability_used: bool,
    pub built_this_turn: u32,
    pub build_limit: u32,
    pub used_smithy: bool,
    pub used_laboratory: bool,
    /// Set when this player's role was assassinated this round.
    pub is_killed: bool,
    /// Round in which this player's city reached eight districts.
    pub completed_round: Option<u32>,
}

impl Player {
    pub fn new(seat: PlayerId, name: impl Into<String>, is_bot: bool) -> Self {
        Self {
            seat,
            name: name.into(),
            is_bot,
            gold: 0,
            hand: Vec::new(),
            city: Vec::new(),
            role: None,
            role_revealed: false,
            has_taken_action: false,
            ability_used: false,
            built_this_turn: 0,
            build_limit: 1,
            used_smithy: false,
            used_laboratory: false,
            is_killed: false,
            completed_round: None,
        }
    }

    pub fn owns(&self, kind: District) -> bool {
        self.city.iter().any(|c| c.kind == kind)
    }

    pub fn count_color(&self, color: DistrictColor) -> u32 {
        self.city.iter().filter(|c| c.kind.color() == color).count() as u32
    }

    pub fn reset_turn_flags(&mut self) {
        self.has_taken_action = false;
        self.ability_used = false;
        self.built_this_turn = 0;
        self.build_limit = 1;
        self.used_smithy = false;
        self.used_laboratory = false;
    }

    /// Round boundary: role goes back to the pool, gold/hand/city persist.
    pub fn reset_for_new_round(&mut self) {
        self.role = None;
        self.role_revealed = false;
        self.is_killed = false;
        self.reset_turn_flags();
    }
}

/// One destroyable target offered to the Warlord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestroyTarget {
    pub player: PlayerId,
    pub card: CardId,
    pub kind: District,
    /// Gold the Warlord must pay, Great Wall surcharge included.
    pub cost: u32,
}

/// A pending targeted choice. Blocks further actions by its owner until
/// resolved or cancelled; nothing times it out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Interaction {
    AssassinTarget,
    ThiefTarget,
    MagicianChoice,
    MagicianSwapPlayer,
    WarlordDestroy { candidates: Vec<DestroyTarget> },
    /// Victim-driven follow-up: pay 1 gold to reclaim the destroyed card.
    GraveyardRecovery { card: DistrictCard },
    LaboratoryDiscard,
}

/// A pending interaction together with the only seat allowed to resolve it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingInteraction {
    pub actor: PlayerId,
    pub request: Interaction,
}

/// Final placement of one player, produced by the scoring engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub seat: PlayerId,
    pub name: String,
    pub score: u32,
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base: u32,
    pub color_variety_bonus: u32,
    pub completion_bonus: u32,
    pub building_bonus: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    /// Round counter, 1-based once the game starts.
    pub round: u32,
    pub players: Vec<Player>,
    /// Seat that picks first in the next draft.
    pub king: PlayerId,
    pub current_player: PlayerId,
    /// Role-pointer rank within the action phase, 1..=8; 0 before the scan
    /// starts. Only ever advances within a round.
    pub current_role: u8,
    /// Roles still open for picking this draft, sorted by rank for display.
    pub available_roles: Vec<Role>,
    pub removed_face_down: Option<Role>,
    pub removed_face_up: Vec<Role>,
    /// Seat whose draft pick it is.
    pub draft_seat: PlayerId,
    /// Pending assassination, consumed when the scan reaches the role.
    pub killed_role: Option<Role>,
    /// Pending theft, consumed when the robbed role starts its turn.
    pub robbed_role: Option<Role>,
    pub deck: VecDeque<DistrictCard>,
    pub discard: Vec<DistrictCard>,
    /// Cards presented by a draw-and-choose still awaiting a keep.
    pub drawn_cards: Vec<DistrictCard>,
    pub interaction: Option<PendingInteraction>,
    /// First player to reach eight districts; earns the larger bonus.
    pub first_finisher: Option<PlayerId>,
    pub standings: Vec<Standing>,
    /// Append-only narrative of everything that happened.
    pub log: Vec<String>,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            phase: GamePhase::Lobby,
            round: 0,
            players: Vec::new(),
            king: 0,
            current_player: 0,
            current_role: 0,
            available_roles: Vec::new(),
            removed_face_down: None,
            removed_face_up: Vec::new(),
            draft_seat: 0,
            killed_role: None,
            robbed_role: None,
            deck: VecDeque::new(),
            discard: Vec::new(),
            drawn_cards: Vec::new(),
            interaction: None,
            first_finisher: None,
            standings: Vec::new(),
            log: Vec::new(),
        }
    }

    pub fn player(&self, seat: PlayerId) -> Option<&Player> {
        self.players.get(seat)
    }

    pub fn player_mut(&mut self, seat: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(seat)
    }

    /// Seat currently holding the given role, if anyone does.
    pub fn holder_of(&self, role: Role) -> Option<PlayerId> {
        self.players
            .iter()
            .find(|p| p.role == Some(role))
            .map(|p| p.seat)
    }

    /// Draw one card from the front of the deck.
    pub fn draw(&mut self) -> Option<DistrictCard> {
        self.deck.pop_front()
    }

    /// Return a card to the bottom of the deck.
    pub fn return_to_deck(&mut self, card: DistrictCard) {
        self.deck.push_back(card);
    }

    pub fn log_line(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::debug!(target: "citadels::log", "{line}");
        self.log.push(line);
    }

    /// The seat that must act for the game to progress, if any. Pending
    /// interactions take precedence (they may belong to a non-active seat,
    /// e.g. a Graveyard recovery).
    pub fn awaited_seat(&self) -> Option<PlayerId> {
        if let Some(pending) = &self.interaction {
            return Some(pending.actor);
        }
        match self.phase {
            GamePhase::Lobby | GamePhase::GameOver => None,
            GamePhase::Draft => Some(self.draft_seat),
            GamePhase::Action => Some(self.current_player),
            GamePhase::RoundEndCheck | GamePhase::EndRound => Some(self.king),
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
