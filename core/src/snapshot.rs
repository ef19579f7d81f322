//! Per-month schedule rows.
//!
//! Only captured when `EngineConfig::record_schedule` is set. Values
//! are rounded to cents as they are recorded; the running state they
//! were taken from is not.

use crate::types::{round_money, saturating_sum, DebtId, Money, MonthIndex};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthSnapshot {
    pub month:            MonthIndex,
    pub date:             NaiveDate,
    pub interest_charged: Money,
    pub amount_paid:      Money,
    pub outstanding:      Money,
    pub debts:            Vec<DebtBalance>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DebtBalance {
    pub debt_id:                       DebtId,
    pub balance:                       Money,
    pub accumulated_interest_and_fees: Money,
}

impl MonthSnapshot {
    pub fn new(
        month: MonthIndex,
        date: NaiveDate,
        interest_charged: Money,
        amount_paid: Money,
        debts: Vec<DebtBalance>,
    ) -> Self {
        let outstanding = saturating_sum(debts.iter().map(|d| d.balance));
        Self {
            month,
            date,
            interest_charged: round_money(interest_charged),
            amount_paid:      round_money(amount_paid),
            outstanding,
            debts,
        }
    }
}

impl DebtBalance {
    pub fn new(debt_id: &str, balance: Money, accumulated: Money) -> Self {
        Self {
            debt_id:                       debt_id.to_string(),
            balance:                       round_money(balance),
            accumulated_interest_and_fees: round_money(accumulated),
        }
    }
}
