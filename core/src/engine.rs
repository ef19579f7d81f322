//! The amortization simulator — the heart of the repayment engine.
//!
//! ONE ITERATION = ONE CALENDAR MONTH:
//!   1. Every debt in attack order with a balance gets its minimum,
//!      run through the waterfall fees → interest → principal.
//!   2. Whatever budget is left goes to the target debt: the first
//!      in attack order still above the payoff threshold.
//!
//! RULES:
//!   - The attack order is fixed for the whole run.
//!   - Interest is only charged while it fits under the in duplum cap
//!     (accumulated interest and fees ≤ original principal).
//!   - Balances never increase.
//!   - Rounding happens once, on the way out.
//!   - The run stops at `max_months` whatever the state.

use crate::{
    attack_order::{generate_attack_order_with, Strategy},
    clock::{next_day, SimClock},
    config::EngineConfig,
    debt::{Debt, DebtWithPriority},
    event::{LogObserver, NullObserver, SimEvent, SimObserver},
    snapshot::{DebtBalance, MonthSnapshot},
    types::{round_money, saturating_sum, Money, MonthIndex},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StrategyOutcome {
    pub strategy:                 Strategy,
    pub months_to_freedom:        MonthIndex,
    /// Day after the last payoff seen in the run; `None` if nothing was paid off.
    pub debt_free_date:           Option<NaiveDate>,
    pub total_interest_paid:      Money,
    /// Original principal of every input debt plus interest charged.
    pub total_paid:               Money,
    pub attack_order:             Vec<DebtWithPriority>,
    /// False when the month cap stopped the run with balances left.
    pub converged:                bool,
    pub first_debt_cleared_month: Option<MonthIndex>,
    pub remaining_balance:        Money,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schedule:                 Vec<MonthSnapshot>,
}

#[derive(Debug, Clone, Default)]
pub struct SimEngine {
    pub config: EngineConfig,
    start_date: Option<NaiveDate>,
}

impl SimEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config, start_date: None }
    }

    /// Pin month 0 to `date` instead of today. Deterministic runs need this.
    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    fn clock(&self) -> SimClock {
        match self.start_date {
            Some(date) => SimClock::new(date),
            None       => SimClock::starting_today(),
        }
    }

    /// Traces every month through `LogObserver` when trace logging is on.
    pub fn simulate(&self, debts: &[Debt], strategy: Strategy, monthly_budget: Money) -> StrategyOutcome {
        if log::log_enabled!(log::Level::Trace) {
            self.simulate_observed(debts, strategy, monthly_budget, &mut LogObserver)
        } else {
            self.simulate_observed(debts, strategy, monthly_budget, &mut NullObserver)
        }
    }

    /// Run one strategy, reporting every step to `observer`.
    pub fn simulate_observed(
        &self,
        debts: &[Debt],
        strategy: Strategy,
        monthly_budget: Money,
        observer: &mut dyn SimObserver,
    ) -> StrategyOutcome {
        let epsilon = self.config.payoff_epsilon;
        let attack_order = generate_attack_order_with(debts, strategy, epsilon);
        let mut working: Vec<Debt> = attack_order.iter().map(|d| d.debt.clone()).collect();

        let mut clock = self.clock();
        let mut total_interest = Decimal::ZERO;
        let mut last_paid_off: Option<NaiveDate> = None;
        let mut first_cleared: Option<MonthIndex> = None;
        let mut schedule = Vec::new();
        let tracing = observer.enabled();

        log::debug!(
            "simulate {strategy}: {} debts, budget={monthly_budget}, start={}",
            working.len(),
            clock.start_date
        );
        if tracing {
            observer.on_event(&SimEvent::RunStarted {
                strategy,
                debt_count:     working.len(),
                total_balance:  outstanding(&working),
                monthly_budget,
            });
        }

        while working.iter().any(|d| d.current_balance > epsilon)
            && clock.month < self.config.max_months
        {
            let month = clock.advance();
            let date = clock.current_date();
            let mut remaining_budget = monthly_budget;
            let mut interest_this_month = Decimal::ZERO;
            let mut paid_this_month = Decimal::ZERO;

            // ── Minimums, in attack order ──────────────────────
            for debt in working.iter_mut() {
                if debt.current_balance <= Decimal::ZERO {
                    continue;
                }

                let minimum = debt.effective_minimum().min(debt.current_balance);
                let interest = charge_interest(debt);
                total_interest = total_interest.saturating_add(interest);
                interest_this_month = interest_this_month.saturating_add(interest);

                let fees = debt.monthly_fees();
                let after_fees = (minimum - fees).max(Decimal::ZERO);
                let principal = (after_fees - interest).max(Decimal::ZERO);

                let was_open = debt.current_balance > epsilon;
                debt.current_balance = (debt.current_balance - principal).max(Decimal::ZERO);
                remaining_budget = remaining_budget.saturating_sub(minimum);
                paid_this_month = paid_this_month.saturating_add(minimum);

                if tracing {
                    observer.on_event(&SimEvent::MinimumApplied {
                        month,
                        debt_id:       debt.debt_id.clone(),
                        payment:       minimum,
                        fees,
                        interest,
                        principal,
                        balance_after: debt.current_balance,
                    });
                }

                if was_open && debt.current_balance <= epsilon {
                    record_payoff(debt, month, date, &mut last_paid_off, &mut first_cleared, observer);
                }
            }

            // ── Surplus to the target debt ─────────────────────
            if remaining_budget > Decimal::ZERO {
                if let Some(target) = working.iter_mut().find(|d| d.current_balance > epsilon) {
                    let extra = remaining_budget.min(target.current_balance);
                    target.current_balance -= extra;
                    paid_this_month = paid_this_month.saturating_add(extra);

                    if tracing {
                        observer.on_event(&SimEvent::ExtraApplied {
                            month,
                            debt_id:       target.debt_id.clone(),
                            amount:        extra,
                            balance_after: target.current_balance,
                        });
                    }

                    if target.current_balance <= epsilon {
                        record_payoff(target, month, date, &mut last_paid_off, &mut first_cleared, observer);
                    }
                }
            }

            if self.config.record_schedule {
                let balances = working
                    .iter()
                    .map(|d| DebtBalance::new(&d.debt_id, d.current_balance, d.accumulated_interest_and_fees))
                    .collect();
                schedule.push(MonthSnapshot::new(month, date, interest_this_month, paid_this_month, balances));
            }

            if tracing {
                observer.on_event(&SimEvent::MonthCompleted {
                    month,
                    date,
                    remaining_budget,
                    outstanding: outstanding(&working),
                });
            }
        }

        let months = clock.month;
        let converged = !working.iter().any(|d| d.current_balance > epsilon);
        let remaining_balance = outstanding(&working);

        if converged {
            log::debug!("simulate {strategy}: debt-free after {months} months, interest={total_interest:.2}");
        } else {
            log::warn!(
                "simulate {strategy}: not converged after {months} months, {:.2} outstanding across {} debts",
                remaining_balance,
                working.iter().filter(|d| d.current_balance > epsilon).count()
            );
        }
        if tracing {
            observer.on_event(&SimEvent::RunCompleted {
                strategy,
                months,
                converged,
                total_interest,
            });
        }

        let principal_total = saturating_sum(debts.iter().map(|d| d.original_principal));

        StrategyOutcome {
            strategy,
            months_to_freedom: months,
            debt_free_date: last_paid_off.map(next_day),
            total_interest_paid: round_money(total_interest),
            total_paid: round_money(principal_total.saturating_add(total_interest)),
            attack_order,
            converged,
            first_debt_cleared_month: first_cleared,
            remaining_balance: round_money(remaining_balance),
            schedule,
        }
    }
}

/// Simulate one strategy from today with the default configuration.
pub fn simulate_strategy(debts: &[Debt], strategy: Strategy, monthly_budget: Money) -> StrategyOutcome {
    SimEngine::default().simulate(debts, strategy, monthly_budget)
}

/// This month's interest, or zero if charging it would break the in
/// duplum cap. Whatever is charged is added to the debt's running total.
fn charge_interest(debt: &mut Debt) -> Money {
    let interest = debt.monthly_interest();
    let accumulated = match debt.accumulated_interest_and_fees.checked_add(interest) {
        Some(total) if !debt.in_duplum_cap_reached && total <= debt.original_principal => total,
        _ => return Decimal::ZERO,
    };
    debt.accumulated_interest_and_fees = accumulated;
    interest
}

fn record_payoff(
    debt: &Debt,
    month: MonthIndex,
    date: NaiveDate,
    last_paid_off: &mut Option<NaiveDate>,
    first_cleared: &mut Option<MonthIndex>,
    observer: &mut dyn SimObserver,
) {
    *last_paid_off = Some(date);
    first_cleared.get_or_insert(month);
    log::debug!("month={month} {} paid off on {date}", debt.debt_id);
    if observer.enabled() {
        observer.on_event(&SimEvent::DebtPaidOff {
            month,
            debt_id: debt.debt_id.clone(),
            date,
        });
    }
}

fn outstanding(debts: &[Debt]) -> Money {
    saturating_sum(debts.iter().map(|d| d.current_balance))
}
