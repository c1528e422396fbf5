//! Draft allocator: removes the round's secret and face-up roles and walks
//! the pick order, starting at the crown.

use rand::rngs::StdRng;
use rand::Rng;

use crate::catalog::Role;
use crate::engine::moves::MoveRejection;
use crate::engine::state::{GamePhase, GameState, PlayerId};
use crate::engine::turn;

/// How often a face-up removal redraws after hitting the King before the
/// remainder of the removals is skipped.
const MAX_FACE_UP_RETRIES: u32 = 8;

pub struct DraftSetup {
    pub pool: Vec<Role>,
    pub face_down: Role,
    pub face_up: Vec<Role>,
}

/// Remove one secret role plus the player-count-dependent face-up roles.
/// The King is never removed face-up.
pub fn deal_roles(rng: &mut StdRng, player_count: usize) -> DraftSetup {
    let mut pool: Vec<Role> = Role::ALL.to_vec();
    let face_down = pool.remove(rng.gen_range(0..pool.len()));

    let face_up_count = match player_count {
        0..=4 => 2,
        5 => 1,
        _ => 0,
    };

    let mut face_up = Vec::new();
    'removals: for _ in 0..face_up_count {
        let mut retries = 0;
        loop {
            if pool.iter().all(|r| *r == Role::King) {
                break 'removals;
            }
            let idx = rng.gen_range(0..pool.len());
            if pool[idx] == Role::King {
                retries += 1;
                if retries >= MAX_FACE_UP_RETRIES {
                    break 'removals;
                }
                continue;
            }
            face_up.push(pool.remove(idx));
            break;
        }
    }

    pool.sort_by_key(|r| r.rank());
    DraftSetup {
        pool,
        face_down,
        face_up,
    }
}

/// Deal a fresh draft into the state and hand the first pick to the crown.
pub fn begin_draft(state: &mut GameState, rng: &mut StdRng) {
    let setup = deal_roles(rng, state.players.len());
    state.available_roles = setup.pool;
    state.removed_face_down = Some(setup.face_down);
    state.removed_face_up = setup.face_up;
    state.draft_seat = state.king;
    state.phase = GamePhase::Draft;
    state.current_role = 0;

    state.log_line("One role is set aside face down.".to_string());
    for role in state.removed_face_up.clone() {
        state.log_line(format!("The {} is set aside face up.", role.title()));
    }
    let king_name = state.players[state.king].name.clone();
    state.log_line(format!("{king_name} holds the crown and picks first."));
}

/// Draft verb: the picking seat secretly claims a role from the pool.
pub fn pick_role(state: &mut GameState, actor: PlayerId, role: Role) -> Result<(), MoveRejection> {
    if state.phase != GamePhase::Draft {
        return Err(MoveRejection::WrongPhase { phase: state.phase });
    }
    if actor != state.draft_seat || state.player(actor).is_none() {
        return Err(MoveRejection::NotYourTurn { seat: actor });
    }
    let Some(pos) = state.available_roles.iter().position(|r| *r == role) else {
        return Err(MoveRejection::RoleUnavailable { role });
    };

    state.available_roles.remove(pos);
    let name = {
        let player = state
            .player_mut(actor)
            .ok_or(MoveRejection::UnknownReference)?;
        player.role = Some(role);
        player.role_revealed = false;
        player.name.clone()
    };
    // The pick itself stays secret; only the fact of it is narrated.
    state.log_line(format!("{name} secretly takes a role."));

    match next_seat_without_role(state, actor) {
        Some(next) => {
            state.draft_seat = next;
            let next_name = state.players[next].name.clone();
            state.log_line(format!("{next_name} is picking a role."));
        }
        None => turn::enter_action_phase(state),
    }
    Ok(())
}

fn next_seat_without_role(state: &GameState, from: PlayerId) -> Option<PlayerId> {
    let n = state.players.len();
    (1..n)
        .map(|step| (from + step) % n)
        .find(|&seat| state.players[seat].role.is_none())
}
