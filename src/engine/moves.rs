//! The closed set of player verbs and the typed rejection they can earn.
//!
//! Every move either fully applies or is fully rejected; a rejection never
//! mutates state. The hot-seat variant downgrades rejections to log lines,
//! an authoritative server forwards them to the offending client as-is.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{District, Role};
use crate::engine::state::{CardId, GamePhase, PlayerId};

/// A player-initiated move. `actor` travels beside the move in
/// [`GameEngine::apply`](crate::engine::GameEngine::apply).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verb", rename_all = "snake_case")]
pub enum Move {
    /// Deal starting hands and gold and open the first draft.
    StartGame,
    /// Draft: secretly claim one role from the open pool.
    PickRole { role: Role },
    /// Take 2 gold as the turn action.
    TakeIncome,
    /// Draw cards as the turn action; may open a keep-one choice.
    DrawCards,
    /// Resolve a pending draw by keeping one card.
    KeepCard { card: CardId },
    /// Abandon a pending draw without consuming the turn action.
    CancelDraw,
    /// Pay the cost and move a hand card into the city.
    BuildDistrict { card: CardId },
    /// Open the current role's targeted ability.
    UseAbility,
    /// Answer a pending interaction.
    Resolve { choice: Choice },
    /// Smithy: pay 2 gold, draw 3 cards.
    UseSmithy,
    /// Laboratory: open a discard-for-gold choice.
    UseLaboratory,
    /// Finish the turn, reveal the role, resume the role scan.
    EndTurn,
    /// From `EndRound`: redraft and play another round.
    StartNewRound,
    /// From `RoundEndCheck`: run final scoring.
    EndGameScoring,
}

/// Answers to pending interactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "choice", rename_all = "snake_case")]
pub enum Choice {
    /// Assassin: mark a role to be skipped this round.
    Assassinate { role: Role },
    /// Thief: mark a role whose gold transfers on reveal.
    Steal { role: Role },
    /// Magician: trade the whole hand against the deck.
    MagicSwapDeck,
    /// Magician: proceed to choosing an opponent to swap hands with.
    MagicChoosePlayer,
    /// Magician follow-up: the opponent to swap hands with.
    MagicSwapWith { player: PlayerId },
    /// Warlord: destroy one district in another city.
    Destroy { player: PlayerId, card: CardId },
    /// Graveyard victim: pay 1 gold to reclaim the destroyed card, or not.
    Recover { accept: bool },
    /// Laboratory: the hand card to discard for 2 gold.
    Discard { card: CardId },
    /// Abandon the interaction without spending the ability.
    Cancel,
}

/// Why a move was refused. The wording doubles as the explanatory log line
/// in the lenient variant.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum MoveRejection {
    #[error("seat {seat} is not the one expected to act")]
    NotYourTurn { seat: PlayerId },
    #[error("not allowed while the game is in the {phase:?} phase")]
    WrongPhase { phase: GamePhase },
    #[error("the game needs between {min} and {max} seated players")]
    BadPlayerCount { min: usize, max: usize },
    #[error("the turn action has already been taken")]
    ActionAlreadyTaken,
    #[error("an action must be taken before doing that")]
    ActionNotTakenYet,
    #[error("a pending choice must be resolved first")]
    ChoicePending,
    #[error("there is no pending choice to resolve")]
    NoPendingChoice,
    #[error("that answer does not fit the pending choice")]
    ChoiceMismatch,
    #[error("not enough gold: need {need}, have {have}")]
    NotEnoughGold { need: u32, have: u32 },
    #[error("the build limit for this turn is spent")]
    BuildLimitReached,
    #[error("a {} already stands in that city", kind.name())]
    DuplicateDistrict { kind: District },
    #[error("the payload references a card, role, or player that does not exist")]
    UnknownReference,
    #[error("that target cannot be chosen")]
    IllegalTarget,
    #[error("the role ability was already used this turn")]
    AbilityAlreadyUsed,
    #[error("the current role has no targeted ability")]
    NoAbility,
    #[error("the required building is missing or already used this turn")]
    BuildingUnavailable,
    #[error("role {} is not available", role.title())]
    RoleUnavailable { role: Role },
}
