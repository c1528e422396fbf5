//! Action resolver: validates and applies every player intent. Each handler
//! checks all preconditions before touching state, so a rejected move leaves
//! the game exactly as it was.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::catalog::districts::DECK_TEMPLATE;
use crate::catalog::{District, Role};
use crate::engine::draft;
use crate::engine::moves::{Choice, MoveRejection};
use crate::engine::state::{
    DestroyTarget, DistrictCard, GamePhase, GameState, Interaction, PendingInteraction, PlayerId,
};

pub const STARTING_GOLD: u32 = 2;
pub const STARTING_HAND: usize = 4;
pub const INCOME_GOLD: u32 = 2;
/// A city of this many districts triggers the end of the game.
pub const CITY_COMPLETE_SIZE: usize = 8;

const MIN_PLAYERS: usize = 4;
const MAX_PLAYERS: usize = 7;

/// Deal starting hands and gold, shuffle the deck, and open the first draft.
pub fn start_game(
    state: &mut GameState,
    rng: &mut StdRng,
    actor: PlayerId,
) -> Result<(), MoveRejection> {
    if state.phase != GamePhase::Lobby {
        return Err(MoveRejection::WrongPhase { phase: state.phase });
    }
    if state.player(actor).is_none() {
        return Err(MoveRejection::NotYourTurn { seat: actor });
    }
    if state.players.len() < MIN_PLAYERS || state.players.len() > MAX_PLAYERS {
        return Err(MoveRejection::BadPlayerCount {
            min: MIN_PLAYERS,
            max: MAX_PLAYERS,
        });
    }

    let mut cards: Vec<DistrictCard> = DECK_TEMPLATE
        .iter()
        .enumerate()
        .map(|(i, kind)| DistrictCard {
            id: i as u32,
            kind: *kind,
        })
        .collect();
    cards.shuffle(rng);
    state.deck = cards.into();

    for seat in 0..state.players.len() {
        state.players[seat].gold = STARTING_GOLD;
        for _ in 0..STARTING_HAND {
            if let Some(card) = state.draw() {
                state.players[seat].hand.push(card);
            }
        }
    }

    state.round = 1;
    state.log_line(format!(
        "The game begins with {} players. Everyone receives {STARTING_GOLD} gold and {STARTING_HAND} cards.",
        state.players.len()
    ));
    state.log_line("--- Round 1 ---".to_string());
    draft::begin_draft(state, rng);
    Ok(())
}

/// Take 2 gold as the turn action.
pub fn take_income(state: &mut GameState, actor: PlayerId) -> Result<(), MoveRejection> {
    require_active(state, actor)?;
    require_no_pending(state)?;
    let player = &state.players[actor];
    if player.is_killed {
        return Err(MoveRejection::NotYourTurn { seat: actor });
    }
    if player.has_taken_action {
        return Err(MoveRejection::ActionAlreadyTaken);
    }

    let player = &mut state.players[actor];
    player.gold += INCOME_GOLD;
    player.has_taken_action = true;
    let name = player.name.clone();
    state.log_line(format!("{name} takes {INCOME_GOLD} gold from the treasury."));
    Ok(())
}

/// Draw cards as the turn action. Opens a keep-one choice unless the Library
/// keeps everything or the deck has nothing to offer.
pub fn draw_cards(state: &mut GameState, actor: PlayerId) -> Result<(), MoveRejection> {
    require_active(state, actor)?;
    require_no_pending(state)?;
    if state.players[actor].has_taken_action {
        return Err(MoveRejection::ActionAlreadyTaken);
    }

    let count = if state.players[actor].owns(District::Observatory) {
        3
    } else {
        2
    };
    let mut drawn = Vec::new();
    for _ in 0..count {
        match state.draw() {
            Some(card) => drawn.push(card),
            None => break,
        }
    }

    let name = state.players[actor].name.clone();
    if drawn.is_empty() {
        state.players[actor].has_taken_action = true;
        state.log_line(format!("{name} reaches for the deck, but it is empty."));
    } else if state.players[actor].owns(District::Library) {
        let kept = drawn.len();
        state.players[actor].hand.extend(drawn);
        state.players[actor].has_taken_action = true;
        state.log_line(format!("{name} draws {kept} cards straight into hand (Library)."));
    } else {
        let offered = drawn.len();
        state.drawn_cards = drawn;
        state.log_line(format!("{name} draws {offered} cards and considers which to keep."));
    }
    Ok(())
}

/// Resolve a pending draw by keeping one card; the rest go to the bottom of
/// the deck, not the discard pile.
pub fn keep_card(state: &mut GameState, actor: PlayerId, card: u32) -> Result<(), MoveRejection> {
    require_active(state, actor)?;
    if state.drawn_cards.is_empty() {
        return Err(MoveRejection::NoPendingChoice);
    }
    let Some(pos) = state.drawn_cards.iter().position(|c| c.id == card) else {
        return Err(MoveRejection::UnknownReference);
    };

    let kept = state.drawn_cards.remove(pos);
    let returned: Vec<DistrictCard> = state.drawn_cards.drain(..).collect();
    for leftover in returned {
        state.return_to_deck(leftover);
    }
    let player = &mut state.players[actor];
    player.hand.push(kept);
    player.has_taken_action = true;
    let name = player.name.clone();
    state.log_line(format!("{name} keeps a card; the rest return to the deck."));
    Ok(())
}

/// Abandon a pending draw. Does not consume the turn action; the deck ends
/// up with the same cards it started with.
pub fn cancel_draw(state: &mut GameState, actor: PlayerId) -> Result<(), MoveRejection> {
    require_active(state, actor)?;
    if state.drawn_cards.is_empty() {
        return Err(MoveRejection::NoPendingChoice);
    }

    let returned: Vec<DistrictCard> = state.drawn_cards.drain(..).collect();
    for card in returned {
        state.return_to_deck(card);
    }
    let name = state.players[actor].name.clone();
    state.log_line(format!("{name} puts the drawn cards back."));
    Ok(())
}

/// Pay the cost and move a hand card into the city. Flags the game-ending
/// completion when the city reaches eight districts.
pub fn build_district(
    state: &mut GameState,
    actor: PlayerId,
    card: u32,
) -> Result<(), MoveRejection> {
    require_active(state, actor)?;
    require_no_pending(state)?;
    let player = &state.players[actor];
    if !player.has_taken_action {
        return Err(MoveRejection::ActionNotTakenYet);
    }
    if player.built_this_turn >= player.build_limit {
        return Err(MoveRejection::BuildLimitReached);
    }
    let Some(pos) = player.hand.iter().position(|c| c.id == card) else {
        return Err(MoveRejection::UnknownReference);
    };
    let kind = player.hand[pos].kind;
    if player.owns(kind) {
        return Err(MoveRejection::DuplicateDistrict { kind });
    }
    let cost = kind.cost();
    if player.gold < cost {
        return Err(MoveRejection::NotEnoughGold {
            need: cost,
            have: player.gold,
        });
    }

    let player = &mut state.players[actor];
    player.gold -= cost;
    let built = player.hand.remove(pos);
    player.city.push(built);
    player.built_this_turn += 1;
    let name = player.name.clone();
    let city_size = player.city.len();
    state.log_line(format!("{name} builds {} for {cost} gold.", kind.name()));

    if city_size >= CITY_COMPLETE_SIZE && state.players[actor].completed_round.is_none() {
        state.players[actor].completed_round = Some(state.round);
        if state.first_finisher.is_none() {
            state.first_finisher = Some(actor);
        }
        state.log_line(format!(
            "{name} has raised a city of {CITY_COMPLETE_SIZE} districts!"
        ));
    }
    Ok(())
}

/// Open the current role's targeted ability as a pending interaction.
pub fn use_ability(state: &mut GameState, actor: PlayerId) -> Result<(), MoveRejection> {
    require_active(state, actor)?;
    require_no_pending(state)?;
    let player = &state.players[actor];
    let Some(role) = player.role else {
        return Err(MoveRejection::NoAbility);
    };
    if !role.has_active_ability() {
        return Err(MoveRejection::NoAbility);
    }
    if !player.has_taken_action {
        return Err(MoveRejection::ActionNotTakenYet);
    }
    if player.ability_used {
        return Err(MoveRejection::AbilityAlreadyUsed);
    }

    let name = player.name.clone();
    let request = match role {
        Role::Assassin => {
            state.log_line(format!("{name} eyes the other roles."));
            Interaction::AssassinTarget
        }
        Role::Thief => {
            state.log_line(format!("{name} looks for a purse to cut."));
            Interaction::ThiefTarget
        }
        Role::Magician => {
            state.log_line(format!("{name} weighs a trade of hands."));
            Interaction::MagicianChoice
        }
        Role::Warlord => {
            let candidates = destroy_candidates(state, actor);
            state.log_line(format!("{name} surveys the cities for a target."));
            Interaction::WarlordDestroy { candidates }
        }
        _ => return Err(MoveRejection::NoAbility),
    };
    state.interaction = Some(PendingInteraction { actor, request });
    Ok(())
}

/// Everything the Warlord may destroy right now. Completed cities and the
/// Bishop's whole city are off limits; so is the Keep.
pub fn destroy_candidates(state: &GameState, actor: PlayerId) -> Vec<DestroyTarget> {
    let bishop = state.holder_of(Role::Bishop);
    let mut candidates = Vec::new();
    for target in &state.players {
        if target.seat == actor {
            continue;
        }
        if target.city.len() >= CITY_COMPLETE_SIZE {
            continue;
        }
        if bishop == Some(target.seat) {
            continue;
        }
        let surcharge = u32::from(target.owns(District::GreatWall));
        for card in &target.city {
            if card.kind == District::Keep {
                continue;
            }
            candidates.push(DestroyTarget {
                player: target.seat,
                card: card.id,
                kind: card.kind,
                cost: card.kind.cost().saturating_sub(1) + surcharge,
            });
        }
    }
    candidates
}

/// Answer the pending interaction. Only the seat the interaction belongs to
/// may answer; `Cancel` abandons it without spending the ability.
pub fn resolve(state: &mut GameState, actor: PlayerId, choice: &Choice) -> Result<(), MoveRejection> {
    if state.phase != GamePhase::Action {
        return Err(MoveRejection::WrongPhase { phase: state.phase });
    }
    let Some(pending) = state.interaction.clone() else {
        return Err(MoveRejection::NoPendingChoice);
    };
    if actor != pending.actor {
        return Err(MoveRejection::NotYourTurn { seat: actor });
    }

    if let Choice::Cancel = choice {
        let name = state.players[actor].name.clone();
        state.interaction = None;
        if matches!(pending.request, Interaction::GraveyardRecovery { .. }) {
            state.log_line(format!("{name} lets the ruin lie."));
        } else {
            state.log_line(format!("{name} thinks better of it."));
        }
        return Ok(());
    }

    match (&pending.request, choice) {
        (Interaction::AssassinTarget, Choice::Assassinate { role }) => {
            if *role == Role::Assassin {
                return Err(MoveRejection::IllegalTarget);
            }
            state.killed_role = Some(*role);
            state.players[actor].ability_used = true;
            state.interaction = None;
            state.log_line(format!(
                "The Assassin declares the {} will not act this round.",
                role.title()
            ));
        }
        (Interaction::ThiefTarget, Choice::Steal { role }) => {
            if matches!(role, Role::Assassin | Role::Thief) || state.killed_role == Some(*role) {
                return Err(MoveRejection::IllegalTarget);
            }
            state.robbed_role = Some(*role);
            state.players[actor].ability_used = true;
            state.interaction = None;
            state.log_line(format!(
                "The Thief marks the {}'s purse.",
                role.title()
            ));
        }
        (Interaction::MagicianChoice, Choice::MagicSwapDeck) => {
            let hand_size = state.players[actor].hand.len();
            let mut fresh = Vec::with_capacity(hand_size);
            for _ in 0..hand_size {
                match state.draw() {
                    Some(card) => fresh.push(card),
                    None => break,
                }
            }
            let old = std::mem::replace(&mut state.players[actor].hand, fresh);
            for card in old {
                state.return_to_deck(card);
            }
            state.players[actor].ability_used = true;
            state.interaction = None;
            let name = state.players[actor].name.clone();
            state.log_line(format!("{name} trades {hand_size} cards with the deck."));
        }
        (Interaction::MagicianChoice, Choice::MagicChoosePlayer) => {
            state.interaction = Some(PendingInteraction {
                actor,
                request: Interaction::MagicianSwapPlayer,
            });
            let name = state.players[actor].name.clone();
            state.log_line(format!("{name} looks for a hand to trade."));
        }
        (Interaction::MagicianSwapPlayer, Choice::MagicSwapWith { player }) => {
            let other = *player;
            if other == actor {
                return Err(MoveRejection::IllegalTarget);
            }
            if state.player(other).is_none() {
                return Err(MoveRejection::UnknownReference);
            }
            let mine = std::mem::take(&mut state.players[actor].hand);
            let theirs = std::mem::replace(&mut state.players[other].hand, mine);
            state.players[actor].hand = theirs;
            state.players[actor].ability_used = true;
            state.interaction = None;
            let name = state.players[actor].name.clone();
            let other_name = state.players[other].name.clone();
            state.log_line(format!("{name} swaps hands with {other_name}."));
        }
        (Interaction::WarlordDestroy { .. }, Choice::Destroy { player, card }) => {
            destroy_district(state, actor, *player, *card)?;
        }
        (Interaction::GraveyardRecovery { card }, Choice::Recover { accept }) => {
            let card = *card;
            let name = state.players[actor].name.clone();
            if *accept {
                if state.players[actor].gold < 1 {
                    return Err(MoveRejection::NotEnoughGold {
                        need: 1,
                        have: state.players[actor].gold,
                    });
                }
                let Some(pos) = state.discard.iter().position(|c| c.id == card.id) else {
                    return Err(MoveRejection::UnknownReference);
                };
                let recovered = state.discard.remove(pos);
                state.players[actor].gold -= 1;
                state.players[actor].hand.push(recovered);
                state.interaction = None;
                state.log_line(format!(
                    "{name} pays 1 gold to pull the {} from the rubble.",
                    card.kind.name()
                ));
            } else {
                state.interaction = None;
                state.log_line(format!("{name} lets the ruin lie."));
            }
        }
        (Interaction::LaboratoryDiscard, Choice::Discard { card }) => {
            let Some(pos) = state.players[actor].hand.iter().position(|c| c.id == *card) else {
                return Err(MoveRejection::UnknownReference);
            };
            let discarded = state.players[actor].hand.remove(pos);
            state.discard.push(discarded);
            state.players[actor].gold += 2;
            state.players[actor].used_laboratory = true;
            state.interaction = None;
            let name = state.players[actor].name.clone();
            state.log_line(format!(
                "{name} distills {} into 2 gold at the Laboratory.",
                discarded.kind.name()
            ));
        }
        _ => return Err(MoveRejection::ChoiceMismatch),
    }
    Ok(())
}

fn destroy_district(
    state: &mut GameState,
    actor: PlayerId,
    target_seat: PlayerId,
    card: u32,
) -> Result<(), MoveRejection> {
    if target_seat == actor {
        return Err(MoveRejection::IllegalTarget);
    }
    if state.player(target_seat).is_none() {
        return Err(MoveRejection::UnknownReference);
    }
    if state.holder_of(Role::Bishop) == Some(target_seat) {
        return Err(MoveRejection::IllegalTarget);
    }
    if state.players[target_seat].city.len() >= CITY_COMPLETE_SIZE {
        return Err(MoveRejection::IllegalTarget);
    }
    let Some(pos) = state.players[target_seat]
        .city
        .iter()
        .position(|c| c.id == card)
    else {
        return Err(MoveRejection::UnknownReference);
    };
    let kind = state.players[target_seat].city[pos].kind;
    if kind == District::Keep {
        return Err(MoveRejection::IllegalTarget);
    }
    let cost =
        kind.cost().saturating_sub(1) + u32::from(state.players[target_seat].owns(District::GreatWall));
    if state.players[actor].gold < cost {
        return Err(MoveRejection::NotEnoughGold {
            need: cost,
            have: state.players[actor].gold,
        });
    }

    state.players[actor].gold -= cost;
    state.players[actor].ability_used = true;
    let razed = state.players[target_seat].city.remove(pos);
    state.discard.push(razed);
    let victim_name = state.players[target_seat].name.clone();
    state.log_line(format!(
        "The Warlord razes {} in {victim_name}'s city for {cost} gold.",
        kind.name()
    ));

    // Graveyard: the victim, not the Warlord, decides whether to pay.
    if state.players[target_seat].owns(District::Graveyard) && state.players[target_seat].gold >= 1 {
        state.interaction = Some(PendingInteraction {
            actor: target_seat,
            request: Interaction::GraveyardRecovery { card: razed },
        });
        state.log_line(format!(
            "{victim_name} may pay 1 gold to recover the {}.",
            razed.kind.name()
        ));
    } else {
        state.interaction = None;
    }
    Ok(())
}

/// Smithy: pay 2 gold for 3 cards, once per turn.
pub fn use_smithy(state: &mut GameState, actor: PlayerId) -> Result<(), MoveRejection> {
    require_active(state, actor)?;
    require_no_pending(state)?;
    let player = &state.players[actor];
    if !player.owns(District::Smithy) || player.used_smithy {
        return Err(MoveRejection::BuildingUnavailable);
    }
    if player.gold < 2 {
        return Err(MoveRejection::NotEnoughGold {
            need: 2,
            have: player.gold,
        });
    }

    state.players[actor].gold -= 2;
    state.players[actor].used_smithy = true;
    let mut drawn = 0;
    for _ in 0..3 {
        if let Some(card) = state.draw() {
            state.players[actor].hand.push(card);
            drawn += 1;
        }
    }
    let name = state.players[actor].name.clone();
    state.log_line(format!("{name} pays 2 gold at the Smithy for {drawn} cards."));
    Ok(())
}

/// Laboratory: open the discard-for-gold choice, once per turn.
pub fn use_laboratory(state: &mut GameState, actor: PlayerId) -> Result<(), MoveRejection> {
    require_active(state, actor)?;
    require_no_pending(state)?;
    let player = &state.players[actor];
    if !player.owns(District::Laboratory) || player.used_laboratory || player.hand.is_empty() {
        return Err(MoveRejection::BuildingUnavailable);
    }

    state.interaction = Some(PendingInteraction {
        actor,
        request: Interaction::LaboratoryDiscard,
    });
    let name = state.players[actor].name.clone();
    state.log_line(format!("{name} considers a card for the Laboratory."));
    Ok(())
}

fn require_active(state: &GameState, actor: PlayerId) -> Result<(), MoveRejection> {
    if state.phase != GamePhase::Action {
        return Err(MoveRejection::WrongPhase { phase: state.phase });
    }
    if actor != state.current_player || state.player(actor).is_none() {
        return Err(MoveRejection::NotYourTurn { seat: actor });
    }
    Ok(())
}

fn require_no_pending(state: &GameState) -> Result<(), MoveRejection> {
    if state.interaction.is_some() || !state.drawn_cards.is_empty() {
        return Err(MoveRejection::ChoicePending);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use rand::SeedableRng;

    use crate::engine::state::Player;

    use super::*;

    fn action_table(role: Role) -> GameState {
        let mut state = GameState::new();
        for seat in 0..4 {
            let mut p = Player::new(seat, format!("p{seat}"), true);
            p.gold = 2;
            state.players.push(p);
        }
        state.players[0].role = Some(role);
        state.round = 1;
        state.phase = GamePhase::Action;
        state.current_player = 0;
        state.current_role = role.rank();
        state
    }

    fn card(id: u32, kind: District) -> DistrictCard {
        DistrictCard { id, kind }
    }

    #[test]
    fn start_game_deals_hands_and_opens_the_draft() {
        let mut state = GameState::new();
        for seat in 0..4 {
            state.players.push(Player::new(seat, format!("p{seat}"), true));
        }
        let mut rng = StdRng::seed_from_u64(11);

        start_game(&mut state, &mut rng, 0).unwrap();

        assert_eq!(state.phase, GamePhase::Draft);
        assert_eq!(state.round, 1);
        for p in &state.players {
            assert_eq!(p.gold, STARTING_GOLD);
            assert_eq!(p.hand.len(), STARTING_HAND);
        }
        assert_eq!(state.deck.len(), DECK_TEMPLATE.len() - 4 * STARTING_HAND);
        assert!(state.removed_face_down.is_some());
        assert_eq!(state.removed_face_up.len(), 2);
        assert_eq!(state.draft_seat, state.king);
    }

    #[test]
    fn start_game_rejects_short_tables() {
        let mut state = GameState::new();
        for seat in 0..3 {
            state.players.push(Player::new(seat, format!("p{seat}"), true));
        }
        let mut rng = StdRng::seed_from_u64(0);

        let err = start_game(&mut state, &mut rng, 0).unwrap_err();
        assert_eq!(err, MoveRejection::BadPlayerCount { min: 4, max: 7 });
        assert_eq!(state.phase, GamePhase::Lobby);
    }

    #[test]
    fn income_cannot_be_taken_twice() {
        let mut state = action_table(Role::King);

        take_income(&mut state, 0).unwrap();
        assert_eq!(state.players[0].gold, 4);

        let err = take_income(&mut state, 0).unwrap_err();
        assert_eq!(err, MoveRejection::ActionAlreadyTaken);
        assert_eq!(state.players[0].gold, 4, "a rejection never mutates state");
    }

    #[test]
    fn draw_then_cancel_leaves_the_deck_intact() {
        let mut state = action_table(Role::King);
        state.deck = VecDeque::from(vec![
            card(1, District::Temple),
            card(2, District::Tavern),
            card(3, District::Manor),
        ]);
        let before: Vec<u32> = state.deck.iter().map(|c| c.id).collect();

        draw_cards(&mut state, 0).unwrap();
        assert_eq!(state.drawn_cards.len(), 2);
        cancel_draw(&mut state, 0).unwrap();

        let mut after: Vec<u32> = state.deck.iter().map(|c| c.id).collect();
        let mut sorted_before = before.clone();
        sorted_before.sort_unstable();
        after.sort_unstable();
        assert_eq!(after, sorted_before, "same multiset of cards");
        assert!(!state.players[0].has_taken_action, "the action is not spent");
    }

    #[test]
    fn keep_card_sends_the_rest_to_the_bottom() {
        let mut state = action_table(Role::King);
        state.deck = VecDeque::from(vec![
            card(1, District::Temple),
            card(2, District::Tavern),
            card(3, District::Manor),
        ]);

        draw_cards(&mut state, 0).unwrap();
        keep_card(&mut state, 0, 2).unwrap();

        assert_eq!(state.players[0].hand.len(), 1);
        assert_eq!(state.players[0].hand[0].id, 2);
        assert!(state.players[0].has_taken_action);
        // Manor was still on top; the rejected Temple went underneath it.
        assert_eq!(state.deck.front().map(|c| c.id), Some(3));
        assert_eq!(state.deck.back().map(|c| c.id), Some(1));
    }

    #[test]
    fn empty_deck_still_spends_the_draw_action() {
        let mut state = action_table(Role::King);

        draw_cards(&mut state, 0).unwrap();

        assert!(state.drawn_cards.is_empty());
        assert!(state.players[0].has_taken_action);
    }

    #[test]
    fn library_keeps_every_drawn_card() {
        let mut state = action_table(Role::King);
        state.players[0].city.push(card(90, District::Library));
        state.deck = VecDeque::from(vec![card(1, District::Temple), card(2, District::Tavern)]);

        draw_cards(&mut state, 0).unwrap();

        assert_eq!(state.players[0].hand.len(), 2);
        assert!(state.drawn_cards.is_empty());
        assert!(state.players[0].has_taken_action);
    }

    #[test]
    fn observatory_offers_a_third_card() {
        let mut state = action_table(Role::King);
        state.players[0].city.push(card(90, District::Observatory));
        state.deck = VecDeque::from(vec![
            card(1, District::Temple),
            card(2, District::Tavern),
            card(3, District::Manor),
            card(4, District::Market),
        ]);

        draw_cards(&mut state, 0).unwrap();

        assert_eq!(state.drawn_cards.len(), 3);
    }

    #[test]
    fn building_pays_gold_and_blocks_duplicates() {
        let mut state = action_table(Role::King);
        state.players[0].gold = 5;
        state.players[0].hand = vec![card(1, District::Market), card(2, District::Market)];
        state.players[0].has_taken_action = true;

        build_district(&mut state, 0, 1).unwrap();
        assert_eq!(state.players[0].gold, 3);
        assert_eq!(state.players[0].city.len(), 1);

        let err = build_district(&mut state, 0, 2).unwrap_err();
        assert_eq!(
            err,
            MoveRejection::BuildLimitReached,
            "the per-turn limit trips before the duplicate check"
        );

        state.players[0].built_this_turn = 0;
        let err = build_district(&mut state, 0, 2).unwrap_err();
        assert_eq!(
            err,
            MoveRejection::DuplicateDistrict {
                kind: District::Market
            }
        );
    }

    #[test]
    fn building_requires_the_turn_action_first() {
        let mut state = action_table(Role::King);
        state.players[0].hand = vec![card(1, District::Temple)];

        let err = build_district(&mut state, 0, 1).unwrap_err();
        assert_eq!(err, MoveRejection::ActionNotTakenYet);
    }

    #[test]
    fn eighth_district_flags_the_first_finisher() {
        let mut state = action_table(Role::King);
        state.players[0].gold = 10;
        state.players[0].has_taken_action = true;
        state.players[0].city = vec![
            card(1, District::Temple),
            card(2, District::Tavern),
            card(3, District::Manor),
            card(4, District::Market),
            card(5, District::Church),
            card(6, District::Castle),
            card(7, District::Watchtower),
        ];
        state.players[0].hand = vec![card(8, District::Docks)];

        build_district(&mut state, 0, 8).unwrap();

        assert_eq!(state.players[0].completed_round, Some(1));
        assert_eq!(state.first_finisher, Some(0));
    }

    #[test]
    fn smithy_trades_two_gold_for_three_cards_once() {
        let mut state = action_table(Role::King);
        state.players[0].city.push(card(90, District::Smithy));
        state.players[0].gold = 3;
        state.deck = VecDeque::from(vec![
            card(1, District::Temple),
            card(2, District::Tavern),
            card(3, District::Manor),
            card(4, District::Market),
        ]);

        use_smithy(&mut state, 0).unwrap();
        assert_eq!(state.players[0].gold, 1);
        assert_eq!(state.players[0].hand.len(), 3);
        assert_eq!(state.deck.len(), 1);

        let err = use_smithy(&mut state, 0).unwrap_err();
        assert_eq!(err, MoveRejection::BuildingUnavailable);
    }

    #[test]
    fn smithy_needs_the_building_and_the_gold() {
        let mut state = action_table(Role::King);
        state.players[0].gold = 10;
        assert_eq!(
            use_smithy(&mut state, 0).unwrap_err(),
            MoveRejection::BuildingUnavailable
        );

        state.players[0].city.push(card(90, District::Smithy));
        state.players[0].gold = 1;
        assert_eq!(
            use_smithy(&mut state, 0).unwrap_err(),
            MoveRejection::NotEnoughGold { need: 2, have: 1 }
        );
    }

    #[test]
    fn assassin_marks_a_role_and_spends_the_ability() {
        let mut state = action_table(Role::Assassin);
        state.players[0].has_taken_action = true;

        use_ability(&mut state, 0).unwrap();
        resolve(&mut state, 0, &Choice::Assassinate { role: Role::King }).unwrap();

        assert_eq!(state.killed_role, Some(Role::King));
        assert!(state.players[0].ability_used);
        assert!(state.interaction.is_none());

        let err = use_ability(&mut state, 0).unwrap_err();
        assert_eq!(err, MoveRejection::AbilityAlreadyUsed);
    }

    #[test]
    fn thief_cannot_rob_the_dead_or_the_untouchable() {
        let mut state = action_table(Role::Thief);
        state.players[0].has_taken_action = true;
        state.killed_role = Some(Role::King);

        use_ability(&mut state, 0).unwrap();
        for role in [Role::Assassin, Role::Thief, Role::King] {
            let err = resolve(&mut state, 0, &Choice::Steal { role }).unwrap_err();
            assert_eq!(err, MoveRejection::IllegalTarget);
        }

        resolve(&mut state, 0, &Choice::Steal { role: Role::Bishop }).unwrap();
        assert_eq!(state.robbed_role, Some(Role::Bishop));
    }

    #[test]
    fn cancel_keeps_the_ability_available() {
        let mut state = action_table(Role::Assassin);
        state.players[0].has_taken_action = true;

        use_ability(&mut state, 0).unwrap();
        resolve(&mut state, 0, &Choice::Cancel).unwrap();

        assert!(state.interaction.is_none());
        assert!(!state.players[0].ability_used);
        use_ability(&mut state, 0).unwrap();
    }

    #[test]
    fn magician_trades_the_hand_against_the_deck() {
        let mut state = action_table(Role::Magician);
        state.players[0].has_taken_action = true;
        state.players[0].hand = vec![card(1, District::Temple), card(2, District::Tavern)];
        state.deck = VecDeque::from(vec![card(3, District::Manor), card(4, District::Market)]);

        use_ability(&mut state, 0).unwrap();
        resolve(&mut state, 0, &Choice::MagicSwapDeck).unwrap();

        let hand_ids: Vec<u32> = state.players[0].hand.iter().map(|c| c.id).collect();
        assert_eq!(hand_ids, vec![3, 4]);
        // The old hand sits at the bottom of the deck.
        let deck_ids: Vec<u32> = state.deck.iter().map(|c| c.id).collect();
        assert_eq!(deck_ids, vec![1, 2]);
        assert!(state.players[0].ability_used);
    }

    #[test]
    fn magician_swaps_hands_with_a_chosen_player() {
        let mut state = action_table(Role::Magician);
        state.players[0].has_taken_action = true;
        state.players[0].hand = vec![card(1, District::Temple)];
        state.players[2].hand = vec![card(2, District::Tavern), card(3, District::Manor)];

        use_ability(&mut state, 0).unwrap();
        resolve(&mut state, 0, &Choice::MagicChoosePlayer).unwrap();
        resolve(&mut state, 0, &Choice::MagicSwapWith { player: 2 }).unwrap();

        assert_eq!(state.players[0].hand.len(), 2);
        assert_eq!(state.players[2].hand.len(), 1);
        assert!(state.players[0].ability_used);
    }

    #[test]
    fn warlord_candidates_respect_bishop_keep_and_complete_cities() {
        let mut state = action_table(Role::Warlord);
        state.players[1].role = Some(Role::Bishop);
        state.players[1].city = vec![card(1, District::Temple)];
        state.players[2].city = vec![card(2, District::Keep), card(3, District::Tavern)];
        state.players[3].city = (10..18).map(|id| card(id, DECK_TEMPLATE[id as usize])).collect();

        let candidates = destroy_candidates(&state, 0);

        assert_eq!(candidates.len(), 1, "only the Tavern is exposed");
        assert_eq!(candidates[0].card, 3);
        assert_eq!(candidates[0].cost, 0, "cost one, minus one for destruction");
    }

    #[test]
    fn great_wall_raises_the_destruction_price() {
        let mut state = action_table(Role::Warlord);
        state.players[0].has_taken_action = true;
        state.players[0].gold = 5;
        state.players[1].city = vec![card(1, District::Market), card(2, District::GreatWall)];

        use_ability(&mut state, 0).unwrap();
        resolve(&mut state, 0, &Choice::Destroy { player: 1, card: 1 }).unwrap();

        // Market costs 2: destruction is 2 - 1 + 1 surcharge = 2.
        assert_eq!(state.players[0].gold, 3);
        assert_eq!(state.players[1].city.len(), 1);
        assert_eq!(state.discard.len(), 1);
    }

    #[test]
    fn graveyard_lets_the_victim_buy_the_ruin_back() {
        let mut state = action_table(Role::Warlord);
        state.players[0].has_taken_action = true;
        state.players[0].gold = 5;
        state.players[1].gold = 3;
        state.players[1].city = vec![card(1, District::Market), card(2, District::Graveyard)];

        use_ability(&mut state, 0).unwrap();
        resolve(&mut state, 0, &Choice::Destroy { player: 1, card: 1 }).unwrap();

        // The follow-up belongs to the victim, not the Warlord.
        let pending = state.interaction.clone().unwrap();
        assert_eq!(pending.actor, 1);
        let err = resolve(&mut state, 0, &Choice::Recover { accept: true }).unwrap_err();
        assert_eq!(err, MoveRejection::NotYourTurn { seat: 0 });

        resolve(&mut state, 1, &Choice::Recover { accept: true }).unwrap();
        assert_eq!(state.players[1].gold, 2);
        assert_eq!(state.players[1].hand.len(), 1);
        assert_eq!(state.players[1].hand[0].id, 1);
        assert!(state.discard.is_empty());
    }

    #[test]
    fn destroying_the_graveyard_offers_no_recovery() {
        let mut state = action_table(Role::Warlord);
        state.players[0].has_taken_action = true;
        state.players[0].gold = 5;
        state.players[1].gold = 3;
        state.players[1].city = vec![card(2, District::Graveyard)];

        use_ability(&mut state, 0).unwrap();
        resolve(&mut state, 0, &Choice::Destroy { player: 1, card: 2 }).unwrap();

        assert!(state.interaction.is_none());
        assert_eq!(state.discard.len(), 1);
    }

    #[test]
    fn laboratory_converts_a_card_into_gold() {
        let mut state = action_table(Role::King);
        state.players[0].city.push(card(90, District::Laboratory));
        state.players[0].hand = vec![card(1, District::Temple)];

        use_laboratory(&mut state, 0).unwrap();
        resolve(&mut state, 0, &Choice::Discard { card: 1 }).unwrap();

        assert_eq!(state.players[0].gold, 4);
        assert!(state.players[0].hand.is_empty());
        assert_eq!(state.discard.len(), 1);
        assert!(state.players[0].used_laboratory);

        let err = use_laboratory(&mut state, 0).unwrap_err();
        assert_eq!(err, MoveRejection::BuildingUnavailable);
    }

    #[test]
    fn a_pending_choice_blocks_other_actions() {
        let mut state = action_table(Role::Assassin);
        state.players[0].has_taken_action = true;
        use_ability(&mut state, 0).unwrap();

        assert_eq!(
            take_income(&mut state, 0).unwrap_err(),
            MoveRejection::ChoicePending
        );
        assert_eq!(
            draw_cards(&mut state, 0).unwrap_err(),
            MoveRejection::ChoicePending
        );
    }

    #[test]
    fn mismatched_answers_are_rejected() {
        let mut state = action_table(Role::Assassin);
        state.players[0].has_taken_action = true;
        use_ability(&mut state, 0).unwrap();

        let err = resolve(&mut state, 0, &Choice::Steal { role: Role::King }).unwrap_err();
        assert_eq!(err, MoveRejection::ChoiceMismatch);
        assert!(state.interaction.is_some(), "the interaction survives");
    }
}
