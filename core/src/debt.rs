//! Debt records as the engine sees them.
//!
//! A `Debt` is the caller's persisted record, deserialized from the
//! store's camelCase JSON. The engine only ever works on clones.

use crate::{
    error::{SimError, SimResult},
    types::{DebtId, Money, UserId},
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Debt {
    // ── Identity ──────────────────────────────────
    pub debt_id:        DebtId,
    pub user_id:        UserId,
    pub creditor:       String,
    pub debt_name:      String,
    pub account_number: Option<String>,
    pub debt_type:      Option<DebtType>,

    // ── Monetary state ────────────────────────────
    pub original_principal:            Money,
    pub current_balance:               Money,
    /// Percent per year, e.g. 24.5.
    pub annual_interest_rate:          Money,
    pub minimum_payment:               Money,
    /// Takes precedence over `minimum_payment` when present and non-zero.
    pub minimum_monthly_payment:       Option<Money>,
    pub monthly_service_fee:           Money,
    pub monthly_credit_life_insurance: Money,
    pub initiation_fee_balance:        Money,

    // ── Legal flags ───────────────────────────────
    pub section129_received:          bool,
    pub section129_date:              Option<NaiveDate>,
    pub section129_deadline:          Option<NaiveDate>,
    pub accumulated_interest_and_fees: Money,
    pub in_duplum_cap_reached:        bool,
    pub in_duplum_status:             InDuplumStatus,

    // ── Lifecycle ─────────────────────────────────
    pub is_paid_off: bool,
    pub paid_off_at: Option<DateTime<Utc>>,
    pub is_archived: bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InDuplumStatus {
    #[default]
    #[serde(alias = "compliant", alias = "COMPLIANT")]
    None,
    #[serde(alias = "APPROACHING")]
    Approaching,
    #[serde(alias = "NEAR_CAP")]
    NearCap,
    #[serde(alias = "breached", alias = "BREACHED")]
    Reached,
}

/// Credit agreement category; selects the NCA rate cap.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DebtType {
    Mortgage,
    Vehicle,
    Unsecured,
    ShortTerm,
    CreditCard,
    StoreCard,
    PersonalLoan,
    Other,
}

impl Debt {
    /// Contractual monthly floor: `minimumMonthlyPayment` when set and
    /// non-zero, otherwise `minimumPayment`.
    pub fn effective_minimum(&self) -> Money {
        match self.minimum_monthly_payment {
            Some(m) if !m.is_zero() => m,
            _ => self.minimum_payment,
        }
    }

    /// Service fee plus credit-life premium, charged every month.
    pub fn monthly_fees(&self) -> Money {
        self.monthly_service_fee + self.monthly_credit_life_insurance
    }

    /// One month of simple interest on the current balance.
    /// Zero if the product overflows `Decimal`.
    pub fn monthly_interest(&self) -> Money {
        self.current_balance
            .checked_mul(self.annual_interest_rate)
            .and_then(|v| v.checked_div(Decimal::from(1200)))
            .unwrap_or(Decimal::ZERO)
    }

    /// Still carrying a balance and neither settled nor archived.
    pub fn is_active(&self, epsilon: Money) -> bool {
        self.paid_off_at.is_none() && !self.is_archived && self.current_balance > epsilon
    }

    /// A Section 129 notice with a response deadline on file.
    pub fn has_legal_notice(&self) -> bool {
        self.section129_received && self.section129_deadline.is_some()
    }

    pub fn in_duplum_flagged(&self) -> bool {
        matches!(
            self.in_duplum_status,
            InDuplumStatus::Reached | InDuplumStatus::Approaching
        )
    }

    /// Reject records the engine's arithmetic is not defined for.
    pub fn validate(&self) -> SimResult<()> {
        let fail = |reason: &str| {
            Err(SimError::InvalidDebt {
                debt_id: self.debt_id.clone(),
                reason:  reason.to_string(),
            })
        };

        if self.original_principal <= Decimal::ZERO {
            return fail("originalPrincipal must be positive");
        }
        if self.current_balance < Decimal::ZERO {
            return fail("currentBalance must not be negative");
        }
        if self.current_balance > self.original_principal {
            return fail("currentBalance exceeds originalPrincipal");
        }
        if self.annual_interest_rate < Decimal::ZERO {
            return fail("annualInterestRate must not be negative");
        }
        if self.minimum_payment < Decimal::ZERO
            || self.minimum_monthly_payment.is_some_and(|m| m < Decimal::ZERO)
        {
            return fail("minimum payment must not be negative");
        }
        if self.monthly_service_fee < Decimal::ZERO
            || self.monthly_credit_life_insurance < Decimal::ZERO
        {
            return fail("monthly fees must not be negative");
        }
        if self.accumulated_interest_and_fees < Decimal::ZERO {
            return fail("accumulatedInterestAndFees must not be negative");
        }
        Ok(())
    }
}

/// Validate every debt, stopping at the first failure.
pub fn validate_debts(debts: &[Debt]) -> SimResult<()> {
    debts.iter().try_for_each(Debt::validate)
}

// ── Attack-order annotation ───────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriorityReason {
    #[serde(rename = "SECTION_129")]
    Section129,
    InDuplum,
    Strategy,
}

impl PriorityReason {
    /// Tier number: 1 is attacked first.
    pub fn tier(self) -> u8 {
        match self {
            PriorityReason::Section129 => 1,
            PriorityReason::InDuplum   => 2,
            PriorityReason::Strategy   => 3,
        }
    }

    pub fn for_debt(debt: &Debt) -> Self {
        if debt.has_legal_notice() {
            PriorityReason::Section129
        } else if debt.in_duplum_flagged() {
            PriorityReason::InDuplum
        } else {
            PriorityReason::Strategy
        }
    }
}

/// A debt tagged with its tier for one simulation run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DebtWithPriority {
    #[serde(flatten)]
    pub debt:            Debt,
    pub priority:        u8,
    pub priority_reason: PriorityReason,
}

impl DebtWithPriority {
    pub fn new(debt: Debt) -> Self {
        let reason = PriorityReason::for_debt(&debt);
        Self {
            debt,
            priority:        reason.tier(),
            priority_reason: reason,
        }
    }
}
