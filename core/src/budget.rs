//! Budget aggregation: reduces an itemized monthly budget to the
//! debt-attack budget the simulator spends each month.
//!
//! Every named field defaults to zero when absent. Custom items land
//! in exactly one bucket:
//!   1. income, if typed `income` or filed under an income category;
//!   2. fixed, if filed under a fixed-obligation category;
//!   3. variable, otherwise.
//!
//! Family support is a fixed obligation and is never diverted.

use crate::{
    config::EngineConfig,
    debt::Debt,
    error::{SimError, SimResult},
    types::{Money, UserId},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const INCOME_CATEGORIES: &[&str] =
    &["netSalary", "secondaryIncome", "partnerContribution", "grants"];

pub const FIXED_CATEGORIES: &[&str] =
    &["housing", "transport", "utilities", "insurance", "education", "familySupport"];

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Budget {
    pub budget_id: String,
    pub user_id:   UserId,
    /// Format: "YYYY-MM"
    pub month:     String,

    // ── Income ────────────────────────────────────
    pub net_salary:           Money,
    pub secondary_income:     Money,
    pub partner_contribution: Money,
    pub grants:               Money,

    // ── Fixed obligations ─────────────────────────
    pub housing:        Money,
    pub transport:      Money,
    pub utilities:      Money,
    pub insurance:      Money,
    pub education:      Money,
    pub family_support: Money,

    // ── Variable expenses ─────────────────────────
    pub groceries:     Money,
    pub personal_care: Money,
    pub health:        Money,
    pub entertainment: Money,
    pub other:         Money,

    pub custom_items: Vec<CustomItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomItem {
    pub id:        String,
    pub name:      String,
    pub category:  String,
    pub amount:    Money,
    #[serde(rename = "type")]
    pub item_type: Option<ItemType>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Income,
    Obligation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Income,
    Fixed,
    Variable,
}

impl CustomItem {
    pub fn bucket(&self) -> Bucket {
        let category = self.category.as_str();
        if self.item_type == Some(ItemType::Income) || INCOME_CATEGORIES.contains(&category) {
            Bucket::Income
        } else if FIXED_CATEGORIES.contains(&category) {
            Bucket::Fixed
        } else {
            Bucket::Variable
        }
    }
}

/// The three derived totals and what is left to attack debt with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetTotals {
    pub total_income:            Money,
    pub total_fixed_obligations: Money,
    pub total_variable_expenses: Money,
    /// May be negative.
    pub debt_attack_budget:      Money,
}

impl Budget {
    fn custom_total(&self, bucket: Bucket) -> Money {
        self.custom_items
            .iter()
            .filter(|item| item.bucket() == bucket)
            .map(|item| item.amount)
            .sum()
    }

    pub fn totals(&self) -> BudgetTotals {
        let total_income = calculate_total_income(self);
        let total_fixed_obligations = calculate_fixed_obligations(self);
        let total_variable_expenses = calculate_variable_expenses(self);
        BudgetTotals {
            total_income,
            total_fixed_obligations,
            total_variable_expenses,
            debt_attack_budget: total_income - total_fixed_obligations - total_variable_expenses,
        }
    }

    /// `month` must be YYYY-MM and named amounts must be non-negative.
    /// Custom item amounts are not checked.
    pub fn validate(&self) -> SimResult<()> {
        let month_ok = self.month.len() == 7
            && NaiveDate::parse_from_str(&format!("{}-01", self.month), "%Y-%m-%d").is_ok();
        if !month_ok {
            return Err(SimError::InvalidBudget {
                reason: format!("month '{}' is not YYYY-MM", self.month),
            });
        }

        let named = [
            ("netSalary", self.net_salary),
            ("secondaryIncome", self.secondary_income),
            ("partnerContribution", self.partner_contribution),
            ("grants", self.grants),
            ("housing", self.housing),
            ("transport", self.transport),
            ("utilities", self.utilities),
            ("insurance", self.insurance),
            ("education", self.education),
            ("familySupport", self.family_support),
            ("groceries", self.groceries),
            ("personalCare", self.personal_care),
            ("health", self.health),
            ("entertainment", self.entertainment),
            ("other", self.other),
        ];
        if let Some((field, _)) = named.iter().find(|(_, v)| *v < Decimal::ZERO) {
            return Err(SimError::InvalidBudget {
                reason: format!("{field} must not be negative"),
            });
        }
        Ok(())
    }
}

pub fn calculate_total_income(budget: &Budget) -> Money {
    budget.net_salary
        + budget.secondary_income
        + budget.partner_contribution
        + budget.grants
        + budget.custom_total(Bucket::Income)
}

/// Fixed obligations, family support included.
pub fn calculate_fixed_obligations(budget: &Budget) -> Money {
    budget.housing
        + budget.transport
        + budget.utilities
        + budget.insurance
        + budget.education
        + budget.family_support
        + budget.custom_total(Bucket::Fixed)
}

pub fn calculate_variable_expenses(budget: &Budget) -> Money {
    budget.groceries
        + budget.personal_care
        + budget.health
        + budget.entertainment
        + budget.other
        + budget.custom_total(Bucket::Variable)
}

/// Income minus fixed minus variable. Not clamped: a deficit comes back negative.
pub fn calculate_debt_attack_budget(budget: &Budget) -> Money {
    budget.totals().debt_attack_budget
}

// ── Viability ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViabilityStatus {
    /// Expenses exceed income before any debt is serviced.
    Deficit,
    /// Positive, but short of the sum of minimum payments.
    BelowMinimum,
    Tight,
    Healthy,
}

/// Next step suggested to the user for each viability band.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViabilityRecommendation {
    DebtCounsellingSuggested,
    ExpenseReviewOrCounselling,
    ProceedWithCaution,
    Proceed,
}

impl ViabilityStatus {
    pub fn recommendation(self) -> ViabilityRecommendation {
        match self {
            ViabilityStatus::Deficit      => ViabilityRecommendation::DebtCounsellingSuggested,
            ViabilityStatus::BelowMinimum => ViabilityRecommendation::ExpenseReviewOrCounselling,
            ViabilityStatus::Tight        => ViabilityRecommendation::ProceedWithCaution,
            ViabilityStatus::Healthy      => ViabilityRecommendation::Proceed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetViability {
    pub status:             ViabilityStatus,
    pub recommendation:     ViabilityRecommendation,
    pub debt_attack_budget: Money,
    pub minimum_required:   Money,
    /// Set for `Deficit` and `BelowMinimum`.
    pub shortfall:          Option<Money>,
    /// Set for `Tight` and `Healthy`.
    pub surplus:            Option<Money>,
    pub message:            String,
}

/// Compare the attack budget against the minimums of the active debts.
pub fn assess_viability(budget: &Budget, debts: &[Debt], config: &EngineConfig) -> BudgetViability {
    let attack = calculate_debt_attack_budget(budget);
    let minimum_required: Money = debts
        .iter()
        .filter(|d| d.is_active(config.payoff_epsilon))
        .map(Debt::effective_minimum)
        .sum();

    let (status, shortfall, surplus, message) = if attack < Decimal::ZERO {
        (
            ViabilityStatus::Deficit,
            Some(attack.abs()),
            None,
            "Your expenses exceed your income. Debt review may help restructure your payments.",
        )
    } else if attack < minimum_required {
        (
            ViabilityStatus::BelowMinimum,
            Some(minimum_required - attack),
            None,
            "Your budget doesn't cover minimum payments. Review expenses or consider debt review.",
        )
    } else if attack < minimum_required * config.viability_tight_factor {
        (
            ViabilityStatus::Tight,
            None,
            Some(attack - minimum_required),
            "Your budget is tight. Any unexpected expense could derail progress.",
        )
    } else {
        (
            ViabilityStatus::Healthy,
            None,
            Some(attack - minimum_required),
            "You have room to attack debt aggressively.",
        )
    };

    BudgetViability {
        status,
        recommendation: status.recommendation(),
        debt_attack_budget: attack,
        minimum_required,
        shortfall,
        surplus,
        message: message.to_string(),
    }
}
