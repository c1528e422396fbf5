//! Supervised bot driver: advances a table by asking each awaited seat's
//! strategy for a move, with a failsafe so a misbehaving strategy can
//! never wedge the game.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use crate::engine::{Choice, GameEngine, GamePhase, Move, PlayerId};

/// Default cap on driver steps; generous for any real game, tight enough
/// to stop a livelocked strategy.
pub const DEFAULT_MAX_STEPS: usize = 5_000;

pub struct BotDriver {
    max_steps: usize,
    snapshot_dir: Option<PathBuf>,
}

/// What happened during one driven run.
#[derive(Debug)]
pub struct DriverReport {
    pub steps: usize,
    /// True when the table reached `GameOver` within the step budget.
    pub completed: bool,
    /// Steps where the strategy's answer was unusable and the failsafe
    /// moved instead.
    pub failsafe_moves: usize,
    pub snapshots: Vec<PathBuf>,
}

impl Default for BotDriver {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_STEPS)
    }
}

impl BotDriver {
    pub fn new(max_steps: usize) -> Self {
        Self {
            max_steps,
            snapshot_dir: None,
        }
    }

    /// Dump a full state snapshot into `dir` whenever the failsafe fires,
    /// for post-mortem diagnostics.
    pub fn with_snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = Some(dir.into());
        self
    }

    /// Drive the table until `GameOver` or the step budget runs out.
    /// Strategies are assigned per seat; a short list wraps around.
    pub fn run_to_completion(
        &self,
        engine: &mut GameEngine,
        strategies: &[Box<dyn super::Strategy>],
    ) -> DriverReport {
        assert!(!strategies.is_empty(), "at least one strategy is required");
        let mut report = DriverReport {
            steps: 0,
            completed: false,
            failsafe_moves: 0,
            snapshots: Vec::new(),
        };

        while report.steps < self.max_steps {
            if engine.state().phase == GamePhase::GameOver {
                report.completed = true;
                break;
            }
            let seat = match engine.state().awaited_seat() {
                Some(seat) => seat,
                // Only the lobby awaits nobody; any seat may start.
                None => 0,
            };
            let legal = engine.legal_moves(seat);
            if legal.is_empty() {
                tracing::error!(seat, phase = ?engine.state().phase, "no legal moves; aborting run");
                self.dump_snapshot(engine, seat, report.steps, &mut report.snapshots);
                break;
            }

            let strategy = &strategies[seat % strategies.len()];
            let view = engine.view_for(seat);
            let chosen = catch_unwind(AssertUnwindSafe(|| strategy.choose(&view, &legal)))
                .unwrap_or_else(|_| {
                    tracing::warn!(seat, strategy = strategy.name(), "strategy panicked");
                    None
                })
                .filter(|mv| legal.contains(mv));

            let mv = match chosen {
                Some(mv) => mv,
                None => {
                    tracing::warn!(
                        seat,
                        strategy = strategy.name(),
                        "unusable answer; taking the failsafe move"
                    );
                    report.failsafe_moves += 1;
                    self.dump_snapshot(engine, seat, report.steps, &mut report.snapshots);
                    failsafe_move(&legal)
                }
            };

            if let Err(rejection) = engine.apply(seat, &mv) {
                // legal_moves promises this cannot happen; if it does, the
                // snapshot is the bug report.
                tracing::error!(seat, ?mv, %rejection, "legal move rejected; aborting run");
                self.dump_snapshot(engine, seat, report.steps, &mut report.snapshots);
                break;
            }
            report.steps += 1;
        }

        if engine.state().phase == GamePhase::GameOver {
            report.completed = true;
        }
        report
    }

    fn dump_snapshot(
        &self,
        engine: &GameEngine,
        seat: PlayerId,
        step: usize,
        sink: &mut Vec<PathBuf>,
    ) {
        let Some(dir) = &self.snapshot_dir else { return };
        match write_snapshot(dir, engine, seat, step) {
            Ok(path) => sink.push(path),
            Err(err) => tracing::error!(%err, "failed to write diagnostics snapshot"),
        }
    }
}

/// The most neutral legal move: back out of pending modals, otherwise end
/// the turn, otherwise whatever keeps the game moving.
fn failsafe_move(legal: &[Move]) -> Move {
    for candidate in [
        Move::CancelDraw,
        Move::Resolve {
            choice: Choice::Cancel,
        },
        Move::Resolve {
            choice: Choice::Recover { accept: false },
        },
        Move::EndTurn,
    ] {
        if legal.contains(&candidate) {
            return candidate;
        }
    }
    legal[0].clone()
}

fn write_snapshot(
    dir: &Path,
    engine: &GameEngine,
    seat: PlayerId,
    step: usize,
) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("snapshot_step{step:05}_seat{seat}.json"));
    let json = serde_json::to_string_pretty(engine.state())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    std::fs::write(&path, json)?;
    Ok(path)
}
