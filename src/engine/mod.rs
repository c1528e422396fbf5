//! The engine facade: owns the authoritative state and the seeded RNG,
//! dispatches typed moves, and enumerates what each seat may legally do.

pub mod actions;
pub mod draft;
pub mod moves;
pub mod scoring;
pub mod state;
pub mod turn;
pub mod view;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

pub use moves::{Choice, Move, MoveRejection};
pub use state::{GamePhase, GameState, PlayerId};
pub use view::{view_for, TableView};

use crate::catalog::{District, Role};
use crate::engine::state::Interaction;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameConfig {
    /// Seed for the deck shuffle and draft removals. `None` means seed 0,
    /// so replays are deterministic unless a seed is chosen explicitly.
    pub random_seed: Option<u64>,
}

/// One table. The RNG lives here, next to the serializable state, so a
/// snapshot of [`GameState`] carries everything a client needs while the
/// dice stay server-side.
#[derive(Debug, Clone)]
pub struct GameEngine {
    state: GameState,
    rng: StdRng,
}

impl GameEngine {
    pub fn new(config: GameConfig) -> Self {
        Self {
            state: GameState::new(),
            rng: StdRng::seed_from_u64(config.random_seed.unwrap_or(0)),
        }
    }

    /// Seat a player in the lobby. Seats are handed out in join order.
    pub fn add_player(
        &mut self,
        name: impl Into<String>,
        is_bot: bool,
    ) -> Result<PlayerId, MoveRejection> {
        if self.state.phase != GamePhase::Lobby {
            return Err(MoveRejection::WrongPhase {
                phase: self.state.phase,
            });
        }
        if self.state.players.len() >= 7 {
            return Err(MoveRejection::BadPlayerCount { min: 4, max: 7 });
        }
        let seat = self.state.players.len();
        let player = state::Player::new(seat, name, is_bot);
        let player_name = player.name.clone();
        self.state.players.push(player);
        self.state.log_line(format!("{player_name} takes seat {seat}."));
        Ok(seat)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn view_for(&self, seat: PlayerId) -> TableView {
        view::view_for(&self.state, seat)
    }

    /// Apply one move for one seat. On success, returns the log lines the
    /// move produced; on rejection, the state is untouched.
    pub fn apply(&mut self, actor: PlayerId, mv: &Move) -> Result<Vec<String>, MoveRejection> {
        let log_mark = self.state.log.len();
        let state = &mut self.state;
        let result = match mv {
            Move::StartGame => actions::start_game(state, &mut self.rng, actor),
            Move::PickRole { role } => draft::pick_role(state, actor, *role),
            Move::TakeIncome => actions::take_income(state, actor),
            Move::DrawCards => actions::draw_cards(state, actor),
            Move::KeepCard { card } => actions::keep_card(state, actor, *card),
            Move::CancelDraw => actions::cancel_draw(state, actor),
            Move::BuildDistrict { card } => actions::build_district(state, actor, *card),
            Move::UseAbility => actions::use_ability(state, actor),
            Move::Resolve { choice } => actions::resolve(state, actor, choice),
            Move::UseSmithy => actions::use_smithy(state, actor),
            Move::UseLaboratory => actions::use_laboratory(state, actor),
            Move::EndTurn => turn::end_turn(state, actor),
            Move::StartNewRound => turn::start_new_round(state, &mut self.rng, actor),
            Move::EndGameScoring => scoring::end_game_scoring(state, actor),
        };
        match result {
            Ok(()) => Ok(self.state.log[log_mark..].to_vec()),
            Err(rejection) => {
                tracing::debug!(actor, ?mv, %rejection, "move rejected");
                Err(rejection)
            }
        }
    }

    /// Hot-seat variant: a rejection becomes an explanatory log line
    /// instead of an error, so a table of humans can fumble freely.
    pub fn apply_lenient(&mut self, actor: PlayerId, mv: &Move) -> Vec<String> {
        match self.apply(actor, mv) {
            Ok(lines) => lines,
            Err(rejection) => {
                let name = self
                    .state
                    .player(actor)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| format!("seat {actor}"));
                let line = format!("{name} cannot do that: {rejection}");
                self.state.log_line(line.clone());
                vec![line]
            }
        }
    }

    /// Every move `seat` could apply right now without being rejected.
    /// Drives the bots and doubles as the UI's enablement oracle.
    pub fn legal_moves(&self, seat: PlayerId) -> Vec<Move> {
        let state = &self.state;
        let mut moves = Vec::new();
        if state.player(seat).is_none() {
            return moves;
        }

        // A pending interaction preempts everything else at the table.
        if let Some(pending) = &state.interaction {
            if pending.actor == seat {
                self.interaction_answers(&pending.request, seat, &mut moves);
            }
            return moves;
        }

        match state.phase {
            GamePhase::Lobby => {
                if (4..=7).contains(&state.players.len()) {
                    moves.push(Move::StartGame);
                }
            }
            GamePhase::Draft => {
                if seat == state.draft_seat {
                    for role in &state.available_roles {
                        moves.push(Move::PickRole { role: *role });
                    }
                }
            }
            GamePhase::Action => {
                if seat == state.current_player {
                    self.action_phase_moves(seat, &mut moves);
                }
            }
            GamePhase::RoundEndCheck => moves.push(Move::EndGameScoring),
            GamePhase::EndRound => moves.push(Move::StartNewRound),
            GamePhase::GameOver => {}
        }
        moves
    }

    fn action_phase_moves(&self, seat: PlayerId, moves: &mut Vec<Move>) {
        let state = &self.state;
        if !state.drawn_cards.is_empty() {
            for card in &state.drawn_cards {
                moves.push(Move::KeepCard { card: card.id });
            }
            moves.push(Move::CancelDraw);
            return;
        }

        let player = &state.players[seat];
        if !player.has_taken_action {
            if !player.is_killed {
                moves.push(Move::TakeIncome);
            }
            moves.push(Move::DrawCards);
        } else {
            if player.built_this_turn < player.build_limit {
                for card in &player.hand {
                    if player.gold >= card.kind.cost() && !player.owns(card.kind) {
                        moves.push(Move::BuildDistrict { card: card.id });
                    }
                }
            }
            let has_ability = player.role.map(Role::has_active_ability).unwrap_or(false);
            if has_ability && !player.ability_used {
                moves.push(Move::UseAbility);
            }
        }

        if player.owns(District::Smithy) && !player.used_smithy && player.gold >= 2 {
            moves.push(Move::UseSmithy);
        }
        if player.owns(District::Laboratory) && !player.used_laboratory && !player.hand.is_empty()
        {
            moves.push(Move::UseLaboratory);
        }
        moves.push(Move::EndTurn);
    }

    fn interaction_answers(&self, request: &Interaction, seat: PlayerId, moves: &mut Vec<Move>) {
        let state = &self.state;
        match request {
            Interaction::AssassinTarget => {
                for role in Role::ALL {
                    if role != Role::Assassin {
                        moves.push(Move::Resolve {
                            choice: Choice::Assassinate { role },
                        });
                    }
                }
                moves.push(Move::Resolve {
                    choice: Choice::Cancel,
                });
            }
            Interaction::ThiefTarget => {
                for role in Role::ALL {
                    let untouchable = matches!(role, Role::Assassin | Role::Thief)
                        || state.killed_role == Some(role);
                    if !untouchable {
                        moves.push(Move::Resolve {
                            choice: Choice::Steal { role },
                        });
                    }
                }
                moves.push(Move::Resolve {
                    choice: Choice::Cancel,
                });
            }
            Interaction::MagicianChoice => {
                moves.push(Move::Resolve {
                    choice: Choice::MagicSwapDeck,
                });
                moves.push(Move::Resolve {
                    choice: Choice::MagicChoosePlayer,
                });
                moves.push(Move::Resolve {
                    choice: Choice::Cancel,
                });
            }
            Interaction::MagicianSwapPlayer => {
                for other in &state.players {
                    if other.seat != seat {
                        moves.push(Move::Resolve {
                            choice: Choice::MagicSwapWith { player: other.seat },
                        });
                    }
                }
                moves.push(Move::Resolve {
                    choice: Choice::Cancel,
                });
            }
            Interaction::WarlordDestroy { candidates } => {
                let gold = state.players[seat].gold;
                for target in candidates {
                    if gold >= target.cost {
                        moves.push(Move::Resolve {
                            choice: Choice::Destroy {
                                player: target.player,
                                card: target.card,
                            },
                        });
                    }
                }
                moves.push(Move::Resolve {
                    choice: Choice::Cancel,
                });
            }
            Interaction::GraveyardRecovery { .. } => {
                if state.players[seat].gold >= 1 {
                    moves.push(Move::Resolve {
                        choice: Choice::Recover { accept: true },
                    });
                }
                moves.push(Move::Resolve {
                    choice: Choice::Recover { accept: false },
                });
            }
            Interaction::LaboratoryDiscard => {
                for card in &state.players[seat].hand {
                    moves.push(Move::Resolve {
                        choice: Choice::Discard { card: card.id },
                    });
                }
                moves.push(Move::Resolve {
                    choice: Choice::Cancel,
                });
            }
        }
    }
}
