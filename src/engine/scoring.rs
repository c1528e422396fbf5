//! Final scoring: per-player breakdowns, bonuses, and the sorted standings.

use std::collections::HashSet;

use crate::catalog::{District, DistrictColor};
use crate::engine::moves::MoveRejection;
use crate::engine::state::{GamePhase, GameState, Player, PlayerId, ScoreBreakdown, Standing};

const ALL_COLORS_BONUS: u32 = 3;
const FIRST_FINISHER_BONUS: u32 = 4;
const OTHER_FINISHER_BONUS: u32 = 2;

/// Confirm the flagged game end: score every city, publish the standings,
/// and move to `GameOver`.
pub fn end_game_scoring(state: &mut GameState, actor: PlayerId) -> Result<(), MoveRejection> {
    if state.phase != GamePhase::RoundEndCheck {
        return Err(MoveRejection::WrongPhase { phase: state.phase });
    }
    if state.player(actor).is_none() {
        return Err(MoveRejection::NotYourTurn { seat: actor });
    }

    let mut standings: Vec<Standing> = state
        .players
        .iter()
        .map(|p| {
            let breakdown = score_player(p, state.first_finisher == Some(p.seat));
            Standing {
                seat: p.seat,
                name: p.name.clone(),
                score: breakdown.base
                    + breakdown.color_variety_bonus
                    + breakdown.completion_bonus
                    + breakdown.building_bonus,
                breakdown,
            }
        })
        .collect();
    // Stable sort: ties keep seat order.
    standings.sort_by(|a, b| b.score.cmp(&a.score));

    state.log_line("The game is over. Final standings:".to_string());
    for (place, standing) in standings.iter().enumerate() {
        state.log_line(format!(
            "{}. {} with {} points",
            place + 1,
            standing.name,
            standing.score
        ));
    }
    state.standings = standings;
    state.phase = GamePhase::GameOver;
    Ok(())
}

/// Score one city. The color-variety bonus counts the Haunted Quarter as a
/// wildcard: four distinct real colors plus the Quarter is enough. The
/// completion bonus follows the recorded completion, not the current city
/// size.
pub fn score_player(player: &Player, is_first_finisher: bool) -> ScoreBreakdown {
    let base: u32 = player.city.iter().map(|c| c.kind.cost()).sum();

    let colors: HashSet<DistrictColor> = player
        .city
        .iter()
        .filter(|c| c.kind != District::HauntedQuarter)
        .map(|c| c.kind.color())
        .collect();
    let haunted = player.owns(District::HauntedQuarter);
    let color_variety_bonus = if colors.len() >= 5 || (haunted && colors.len() >= 4) {
        ALL_COLORS_BONUS
    } else {
        0
    };

    let completion_bonus = if player.completed_round.is_some() {
        if is_first_finisher {
            FIRST_FINISHER_BONUS
        } else {
            OTHER_FINISHER_BONUS
        }
    } else {
        0
    };

    let mut building_bonus = 0;
    if player.owns(District::University) {
        building_bonus += 2;
    }
    if player.owns(District::DragonGate) {
        building_bonus += 2;
    }
    if player.owns(District::ImperialTreasury) {
        building_bonus += player.gold;
    }
    if player.owns(District::MapRoom) {
        building_bonus += player.hand.len() as u32;
    }

    ScoreBreakdown {
        base,
        color_variety_bonus,
        completion_bonus,
        building_bonus,
    }
}
