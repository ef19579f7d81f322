//! Debt repayment strategy engine.
//!
//! Given a user's debts and a monthly debt-attack budget, orders the
//! debts under South African credit rules, simulates repayment month by
//! month and recommends a strategy. Pure and synchronous: no I/O inside
//! a simulation, no state between calls.

pub mod attack_order;
pub mod budget;
pub mod clock;
pub mod comparator;
pub mod config;
pub mod debt;
pub mod engine;
pub mod error;
pub mod event;
pub mod legal;
pub mod snapshot;
pub mod types;

pub use attack_order::{generate_attack_order, Strategy};
pub use budget::{
    calculate_debt_attack_budget, calculate_fixed_obligations, calculate_total_income,
    calculate_variable_expenses, Budget,
};
pub use comparator::{simulate_all_strategies, StrategyComparison};
pub use config::EngineConfig;
pub use debt::{Debt, DebtWithPriority, InDuplumStatus, PriorityReason};
pub use engine::{simulate_strategy, SimEngine, StrategyOutcome};
pub use error::{SimError, SimResult};
