//! Pure scoring and month-by-month greedy budget allocation.
//!
//! Nothing in this crate performs I/O or keeps state between calls; the same
//! candidates and parameters always produce the same [`SimulationResult`].

pub mod ledger;
pub mod scoring;
pub mod simulation;

pub use contracts::{
    MonthlyPurchase, ScorableItem, ScoredItem, SimulationParameters, SimulationResult,
    MAX_SIMULATION_MONTHS,
};
pub use ledger::{verify_result, LedgerError};
pub use scoring::{rank_items, score, score_item, top_items};
pub use simulation::simulate;
