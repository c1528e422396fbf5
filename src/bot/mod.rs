//! Bots: pluggable per-seat strategies and a supervised driver that can
//! push any table to completion.

pub mod driver;
pub mod strategy;

pub use driver::{BotDriver, DriverReport};
pub use strategy::{strategy_from_name, GreedyStrategy, RandomStrategy, Strategy};
