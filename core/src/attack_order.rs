//! Attack-order generation.
//!
//! Tiers always win over strategy:
//!   1. Section 129 notice with a deadline on file
//!   2. In duplum reached or approaching
//!   3. Everything else
//!
//! Within a tier the strategy decides. SMART_SA shares the avalanche
//! tie-break; what sets it apart is that it is recommended whenever
//! tiers 1 or 2 are populated.
//!
//! The order is computed once per run and never re-ranked.

use crate::{
    config::EngineConfig,
    debt::{Debt, DebtWithPriority},
    types::Money,
};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt, str::FromStr};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strategy {
    /// Smallest balance first.
    Snowball,
    /// Highest interest rate first.
    Avalanche,
    /// Legal tiers, then highest rate.
    SmartSa,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Snowball, Strategy::Avalanche, Strategy::SmartSa];

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Snowball  => "SNOWBALL",
            Strategy::Avalanche => "AVALANCHE",
            Strategy::SmartSa   => "SMART_SA",
        }
    }

    /// Secondary ordering within a tier.
    fn tie_break(self, a: &Debt, b: &Debt) -> Ordering {
        match self {
            Strategy::Snowball => a.current_balance.cmp(&b.current_balance),
            Strategy::Avalanche | Strategy::SmartSa => {
                b.annual_interest_rate.cmp(&a.annual_interest_rate)
            }
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "snowball"  => Ok(Strategy::Snowball),
            "avalanche" => Ok(Strategy::Avalanche),
            "smart_sa" | "smartsa" => Ok(Strategy::SmartSa),
            other => Err(format!("unknown strategy '{other}'")),
        }
    }
}

/// Order active debts for `strategy` using the default payoff threshold.
pub fn generate_attack_order(debts: &[Debt], strategy: Strategy) -> Vec<DebtWithPriority> {
    generate_attack_order_with(debts, strategy, EngineConfig::default().payoff_epsilon)
}

/// Drops settled, archived and dust-balance debts, tags the rest and
/// sorts them. The sort is stable, so equal keys keep input order.
pub fn generate_attack_order_with(
    debts: &[Debt],
    strategy: Strategy,
    epsilon: Money,
) -> Vec<DebtWithPriority> {
    let mut order: Vec<DebtWithPriority> = debts
        .iter()
        .filter(|d| d.is_active(epsilon))
        .cloned()
        .map(DebtWithPriority::new)
        .collect();

    order.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| strategy.tie_break(&a.debt, &b.debt))
    });

    log::debug!(
        "attack order {strategy}: {} of {} debts active, order=[{}]",
        order.len(),
        debts.len(),
        order
            .iter()
            .map(|d| d.debt.debt_id.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    order
}
