//! National Credit Act helpers: Section 129 response deadlines, the
//! in duplum cap audit and interest rate caps.

use crate::{
    config::{EngineConfig, NcaRateCaps},
    debt::{Debt, DebtType, InDuplumStatus},
    types::{round_money, Money},
};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde::{Deserialize, Serialize};

// ── Section 129 ────────────────────────────────────────────────

pub fn is_business_day(date: NaiveDate, holidays: &[NaiveDate]) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !holidays.contains(&date)
}

/// `letter_date` plus `business_days` business days. The letter date
/// itself never counts.
pub fn section129_deadline(letter_date: NaiveDate, holidays: &[NaiveDate], business_days: u32) -> NaiveDate {
    let mut deadline = letter_date;
    let mut counted = 0;
    while counted < business_days {
        deadline = match deadline.checked_add_days(Days::new(1)) {
            Some(d) => d,
            None    => return deadline,
        };
        if is_business_day(deadline, holidays) {
            counted += 1;
        }
    }
    deadline
}

/// Deadline for a debt's notice: the recorded deadline if present,
/// else computed from the notice date.
pub fn effective_section129_deadline(debt: &Debt, config: &EngineConfig) -> Option<NaiveDate> {
    if !debt.section129_received {
        return None;
    }
    debt.section129_deadline.or_else(|| {
        debt.section129_date.map(|letter| {
            section129_deadline(letter, &config.public_holidays, config.section129_business_days)
        })
    })
}

/// Calendar days left to respond. Negative once the deadline has passed.
pub fn days_until_deadline(debt: &Debt, today: NaiveDate, config: &EngineConfig) -> Option<i64> {
    effective_section129_deadline(debt, config).map(|deadline| (deadline - today).num_days())
}

// ── In duplum ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InDuplumAudit {
    pub debt_id:                 String,
    /// The cap equals the original principal.
    pub cap:                     Money,
    pub accumulated:             Money,
    pub cap_remaining:           Money,
    pub cap_exceeded:            bool,
    pub excess_amount:           Money,
    pub cap_percentage_used:     Money,
    pub status:                  InDuplumStatus,
    pub estimated_months_to_cap: Option<u32>,
}

pub fn classify_in_duplum(debt: &Debt, config: &EngineConfig) -> InDuplumStatus {
    if debt.in_duplum_cap_reached {
        return InDuplumStatus::Reached;
    }
    if debt.original_principal <= Decimal::ZERO {
        return InDuplumStatus::None;
    }
    let ratio = debt.accumulated_interest_and_fees / debt.original_principal;
    let t = &config.in_duplum;
    if ratio >= Decimal::ONE {
        InDuplumStatus::Reached
    } else if ratio >= t.near_cap_ratio {
        InDuplumStatus::NearCap
    } else if ratio >= t.approaching_ratio {
        InDuplumStatus::Approaching
    } else {
        InDuplumStatus::None
    }
}

/// Months until interest and fees at today's rate fill the cap.
/// `None` when already capped or nothing accrues.
pub fn estimate_months_to_cap(debt: &Debt) -> Option<u32> {
    let room = debt.original_principal - debt.accumulated_interest_and_fees;
    if room <= Decimal::ZERO || debt.in_duplum_cap_reached {
        return None;
    }
    let monthly = debt.monthly_interest() + debt.monthly_fees();
    if monthly <= Decimal::ZERO {
        return None;
    }
    (room / monthly).ceil().to_u32()
}

pub fn in_duplum_audit(debt: &Debt, config: &EngineConfig) -> InDuplumAudit {
    let cap = debt.original_principal;
    let accumulated = debt.accumulated_interest_and_fees;
    let cap_exceeded = accumulated > cap;
    let cap_percentage_used = if cap > Decimal::ZERO {
        accumulated / cap * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };

    InDuplumAudit {
        debt_id:                 debt.debt_id.clone(),
        cap,
        accumulated,
        cap_remaining:           round_money(cap - accumulated),
        cap_exceeded,
        excess_amount:           round_money((accumulated - cap).max(Decimal::ZERO)),
        cap_percentage_used:     round_money(cap_percentage_used),
        status:                  classify_in_duplum(debt, config),
        estimated_months_to_cap: if cap_exceeded { None } else { estimate_months_to_cap(debt) },
    }
}

// ── Rate caps ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RateValidation {
    pub valid:            bool,
    pub max_allowed_rate: Money,
    /// Percentage points above the cap, when over it.
    pub exceeds_by:       Option<Money>,
    pub warning:          Option<String>,
}

/// Cap for a debt type. Cards and personal loans are unsecured, as is
/// any debt without a recognised type.
pub fn rate_cap(debt_type: Option<DebtType>, caps: &NcaRateCaps) -> Money {
    match debt_type {
        Some(DebtType::Mortgage)  => caps.mortgage,
        Some(DebtType::Vehicle)   => caps.vehicle,
        Some(DebtType::ShortTerm) => caps.short_term,
        _                         => caps.unsecured,
    }
}

pub fn validate_interest_rate(debt: &Debt, config: &EngineConfig) -> RateValidation {
    let max_allowed_rate = rate_cap(debt.debt_type, &config.nca_rate_caps);
    let rate = debt.annual_interest_rate;
    if rate <= max_allowed_rate {
        return RateValidation { valid: true, max_allowed_rate, exceeds_by: None, warning: None };
    }
    log::debug!("Debt {} rate {rate}% exceeds NCA cap {max_allowed_rate}%", debt.debt_id);
    RateValidation {
        valid: false,
        max_allowed_rate,
        exceeds_by: Some(rate - max_allowed_rate),
        warning: Some(format!(
            "This rate exceeds the NCA maximum of {:.2}%. You may have grounds to dispute.",
            max_allowed_rate
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn deadline_skips_weekends() {
        // Monday letter, no holidays: two full working weeks later.
        let deadline = section129_deadline(ymd(2026, 10, 5), &[], 10);
        assert_eq!(deadline, ymd(2026, 10, 19));
    }

    #[test]
    fn deadline_skips_public_holidays() {
        // Freedom Day (Mon 27 Apr 2026) and Workers' Day (Fri 1 May) fall inside.
        let config = EngineConfig::default();
        let deadline = section129_deadline(ymd(2026, 4, 24), &config.public_holidays, 10);
        assert_eq!(deadline, ymd(2026, 5, 12));
    }

    #[test]
    fn letter_on_friday_starts_counting_monday() {
        assert_eq!(section129_deadline(ymd(2026, 10, 16), &[], 1), ymd(2026, 10, 19));
    }
}
