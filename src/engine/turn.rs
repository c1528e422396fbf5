//! Turn/role state machine: the role-pointer scan, start-of-turn effects,
//! and the round boundary states.

use rand::rngs::StdRng;

use crate::catalog::{District, Role};
use crate::engine::draft;
use crate::engine::moves::MoveRejection;
use crate::engine::state::{GamePhase, GameState, PlayerId};

/// Architect builds up to three districts; everyone else builds one.
const ARCHITECT_BUILD_LIMIT: u32 = 3;

/// Draft just finished: start the role scan from the top.
pub fn enter_action_phase(state: &mut GameState) {
    state.log_line("All roles are taken. The round begins.".to_string());
    advance_role_scan(state, 0);
}

/// Walk the role pointer upward from `after` until a living, seated role is
/// found, applying its start-of-turn effects; past the Warlord the round is
/// over and the machine parks in a confirmation state.
pub fn advance_role_scan(state: &mut GameState, after: u8) {
    let mut rank = after;
    loop {
        rank += 1;
        let Some(role) = Role::from_rank(rank) else {
            finish_round_scan(state);
            return;
        };

        let holder = state.holder_of(role);
        if state.killed_role == Some(role) {
            // Skipped silently; the victim is only marked internally so the
            // view layer can keep the assassination hidden until round end.
            if let Some(seat) = holder {
                if let Some(p) = state.player_mut(seat) {
                    p.is_killed = true;
                }
            }
            continue;
        }

        if let Some(seat) = holder {
            begin_turn(state, seat, role);
            return;
        }
    }
}

fn finish_round_scan(state: &mut GameState) {
    if state.first_finisher.is_some() {
        state.phase = GamePhase::RoundEndCheck;
        state.log_line("A city stands complete. The game ends after this round.".to_string());
    } else {
        state.phase = GamePhase::EndRound;
        state.log_line("The round is over.".to_string());
    }
}

/// Start-of-turn effects, in the fixed order the rules demand: crown
/// transfer, flat income, color income, Architect draw, then theft.
fn begin_turn(state: &mut GameState, seat: PlayerId, role: Role) {
    let name = state.players[seat].name.clone();
    state.log_line(format!("The {} steps forward: {name}.", role.title()));

    if let Some(p) = state.player_mut(seat) {
        p.reset_turn_flags();
    }

    // (a) Crown transfer.
    if role == Role::King && state.king != seat {
        state.king = seat;
        state.log_line(format!("{name} receives the crown."));
    }

    // (b) Flat income.
    if role == Role::Merchant {
        if let Some(p) = state.player_mut(seat) {
            p.gold += 1;
        }
        state.log_line(format!("{name} earns 1 extra gold as the Merchant."));
    }

    // (c) Color-matched income. The Magic School counts as matching any
    // color here.
    if let Some(color) = role.income_color() {
        let income = {
            let p = &state.players[seat];
            p.count_color(color) + u32::from(p.owns(District::MagicSchool))
        };
        if income > 0 {
            if let Some(p) = state.player_mut(seat) {
                p.gold += income;
            }
            state.log_line(format!("{name} collects {income} gold from the city."));
        }
    }

    // (d) Architect draw and raised build limit.
    if role == Role::Architect {
        let mut drawn = 0;
        for _ in 0..2 {
            if let Some(card) = state.draw() {
                if let Some(p) = state.player_mut(seat) {
                    p.hand.push(card);
                    drawn += 1;
                }
            }
        }
        if let Some(p) = state.player_mut(seat) {
            p.build_limit = ARCHITECT_BUILD_LIMIT;
        }
        state.log_line(format!("{name} draws {drawn} cards as the Architect."));
    }

    // (e) Theft resolves after all bonuses so the whole purse transfers.
    if state.robbed_role == Some(role) {
        state.robbed_role = None;
        let thief = state
            .holder_of(Role::Thief)
            .filter(|_| state.killed_role != Some(Role::Thief));
        if let Some(thief_seat) = thief {
            let loot = state.players[seat].gold;
            state.players[seat].gold = 0;
            state.players[thief_seat].gold += loot;
            let thief_name = state.players[thief_seat].name.clone();
            state.log_line(format!("{thief_name} steals {loot} gold from {name}."));
        }
    }

    state.phase = GamePhase::Action;
    state.current_role = role.rank();
    state.current_player = seat;
}

/// Player-initiated end of turn: reveal the role and resume the scan.
pub fn end_turn(state: &mut GameState, actor: PlayerId) -> Result<(), MoveRejection> {
    if state.phase != GamePhase::Action {
        return Err(MoveRejection::WrongPhase { phase: state.phase });
    }
    if actor != state.current_player {
        return Err(MoveRejection::NotYourTurn { seat: actor });
    }
    if state.interaction.is_some() || !state.drawn_cards.is_empty() {
        return Err(MoveRejection::ChoicePending);
    }

    let name = {
        let player = state
            .player_mut(actor)
            .ok_or(MoveRejection::UnknownReference)?;
        player.role_revealed = true;
        player.name.clone()
    };
    state.log_line(format!("{name} ends the turn."));
    advance_role_scan(state, state.current_role);
    Ok(())
}

/// Explicit round confirmation: clear roles and pending effects, keep the
/// economy, and redraft.
pub fn start_new_round(
    state: &mut GameState,
    rng: &mut StdRng,
    actor: PlayerId,
) -> Result<(), MoveRejection> {
    if state.phase != GamePhase::EndRound {
        return Err(MoveRejection::WrongPhase { phase: state.phase });
    }
    if state.player(actor).is_none() {
        return Err(MoveRejection::NotYourTurn { seat: actor });
    }

    for player in &mut state.players {
        player.reset_for_new_round();
    }
    state.killed_role = None;
    state.robbed_role = None;
    state.interaction = None;
    state.drawn_cards.clear();
    state.round += 1;
    state.log_line(format!("--- Round {} ---", state.round));
    draft::begin_draft(state, rng);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use crate::engine::state::{DistrictCard, Player};

    use super::*;

    fn table(roles: &[(usize, Role)]) -> GameState {
        let mut state = GameState::new();
        for seat in 0..4 {
            let mut p = Player::new(seat, format!("p{seat}"), true);
            p.gold = 2;
            state.players.push(p);
        }
        for (seat, role) in roles {
            state.players[*seat].role = Some(*role);
        }
        state.round = 1;
        state
    }

    fn card(id: u32, kind: District) -> DistrictCard {
        DistrictCard { id, kind }
    }

    #[test]
    fn killed_role_is_skipped_without_pausing() {
        let mut state = table(&[(0, Role::Assassin), (1, Role::Bishop), (2, Role::Merchant)]);
        state.killed_role = Some(Role::Bishop);

        advance_role_scan(&mut state, Role::Assassin.rank());

        // Pointer lands on the Merchant; the Bishop never got a turn.
        assert_eq!(state.current_role, Role::Merchant.rank());
        assert_eq!(state.current_player, 2);
        assert!(state.players[1].is_killed);
        assert_eq!(state.players[1].gold, 2, "no income for the victim");
    }

    #[test]
    fn merchant_gets_flat_and_color_income() {
        let mut state = table(&[(0, Role::Merchant)]);
        state.players[0].city = vec![card(1, District::Tavern), card(2, District::Market)];

        advance_role_scan(&mut state, 0);

        // +1 flat, +2 trade districts.
        assert_eq!(state.players[0].gold, 2 + 1 + 2);
    }

    #[test]
    fn magic_school_matches_any_income_color() {
        let mut state = table(&[(1, Role::Bishop)]);
        state.players[1].city = vec![card(1, District::Temple), card(2, District::MagicSchool)];

        advance_role_scan(&mut state, 0);

        assert_eq!(state.players[1].gold, 2 + 1 + 1);
    }

    #[test]
    fn architect_draws_two_and_builds_three() {
        let mut state = table(&[(3, Role::Architect)]);
        state.deck = VecDeque::from(vec![card(1, District::Temple), card(2, District::Tavern)]);

        advance_role_scan(&mut state, 0);

        assert_eq!(state.players[3].hand.len(), 2);
        assert_eq!(state.players[3].build_limit, 3);
        assert!(state.deck.is_empty());
    }

    #[test]
    fn theft_transfers_the_whole_purse_after_bonuses() {
        let mut state = table(&[(0, Role::Thief), (1, Role::King)]);
        state.players[1].city = vec![card(1, District::Manor)];
        state.robbed_role = Some(Role::King);

        advance_role_scan(&mut state, Role::Thief.rank());

        // Victim had 2, gained +1 noble income, then lost everything.
        assert_eq!(state.players[1].gold, 0);
        assert_eq!(state.players[0].gold, 2 + 3);
        assert_eq!(state.robbed_role, None);
        assert_eq!(state.king, 1, "crown still moves to the King");
    }

    #[test]
    fn theft_fizzles_when_the_thief_is_dead() {
        let mut state = table(&[(0, Role::Thief), (1, Role::King)]);
        state.robbed_role = Some(Role::King);
        state.killed_role = Some(Role::Thief);

        advance_role_scan(&mut state, Role::Thief.rank());

        assert_eq!(state.players[1].gold, 2);
        assert_eq!(state.players[0].gold, 2);
        assert_eq!(state.robbed_role, None, "the mark is cleared regardless");
    }

    #[test]
    fn scan_past_warlord_parks_in_end_round() {
        let mut state = table(&[(0, Role::Assassin)]);
        state.phase = GamePhase::Action;
        state.current_role = Role::Assassin.rank();

        advance_role_scan(&mut state, Role::Assassin.rank());

        assert_eq!(state.phase, GamePhase::EndRound);
    }

    #[test]
    fn scan_past_warlord_with_a_finisher_awaits_scoring() {
        let mut state = table(&[(0, Role::Assassin)]);
        state.first_finisher = Some(0);

        advance_role_scan(&mut state, Role::Assassin.rank());

        assert_eq!(state.phase, GamePhase::RoundEndCheck);
    }

    #[test]
    fn end_turn_reveals_and_advances() {
        let mut state = table(&[(0, Role::King), (1, Role::Warlord)]);
        advance_role_scan(&mut state, 0);
        assert_eq!(state.current_player, 0);

        end_turn(&mut state, 0).unwrap();

        assert!(state.players[0].role_revealed);
        assert_eq!(state.current_player, 1);
        assert_eq!(state.current_role, Role::Warlord.rank());
    }

    #[test]
    fn end_turn_rejects_the_wrong_seat() {
        let mut state = table(&[(0, Role::King)]);
        advance_role_scan(&mut state, 0);

        let err = end_turn(&mut state, 3).unwrap_err();
        assert_eq!(err, MoveRejection::NotYourTurn { seat: 3 });
        assert_eq!(state.current_player, 0);
    }
}
