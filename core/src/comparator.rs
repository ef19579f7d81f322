//! Strategy comparison: runs every strategy over the same input and
//! picks one to recommend.

use crate::{
    attack_order::Strategy,
    debt::Debt,
    engine::{SimEngine, StrategyOutcome},
    types::{round_money, Money},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StrategyComparison {
    pub snowball:    StrategyOutcome,
    pub avalanche:   StrategyOutcome,
    #[serde(rename = "smartSA")]
    pub smart_sa:    StrategyOutcome,
    pub recommended: Strategy,
}

impl StrategyComparison {
    pub fn outcome(&self, strategy: Strategy) -> &StrategyOutcome {
        match strategy {
            Strategy::Snowball  => &self.snowball,
            Strategy::Avalanche => &self.avalanche,
            Strategy::SmartSa   => &self.smart_sa,
        }
    }

    pub fn recommended_outcome(&self) -> &StrategyOutcome {
        self.outcome(self.recommended)
    }

    /// Interest saved against the snowball baseline. Negative when the
    /// strategy costs more than snowball.
    pub fn interest_saved(&self, strategy: Strategy) -> Money {
        round_money(self.snowball.total_interest_paid - self.outcome(strategy).total_interest_paid)
    }
}

/// SMART_SA when any input debt is under a Section 129 notice or
/// flagged in duplum; AVALANCHE otherwise.
pub fn recommend(debts: &[Debt]) -> Strategy {
    let legal_pressure = debts
        .iter()
        .any(|d| d.section129_received || d.in_duplum_flagged());
    if legal_pressure {
        Strategy::SmartSa
    } else {
        Strategy::Avalanche
    }
}

impl SimEngine {
    pub fn simulate_all(&self, debts: &[Debt], monthly_budget: Money) -> StrategyComparison {
        let snowball = self.simulate(debts, Strategy::Snowball, monthly_budget);
        let avalanche = self.simulate(debts, Strategy::Avalanche, monthly_budget);
        let smart_sa = self.simulate(debts, Strategy::SmartSa, monthly_budget);
        let recommended = recommend(debts);

        log::debug!(
            "compare: snowball={}m avalanche={}m smart_sa={}m -> {recommended}",
            snowball.months_to_freedom,
            avalanche.months_to_freedom,
            smart_sa.months_to_freedom
        );

        StrategyComparison { snowball, avalanche, smart_sa, recommended }
    }
}

/// Run all three strategies from today with the default configuration.
pub fn simulate_all_strategies(debts: &[Debt], monthly_budget: Money) -> StrategyComparison {
    SimEngine::default().simulate_all(debts, monthly_budget)
}
