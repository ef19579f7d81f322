//! Shared primitive types used across the entire engine.

use rust_decimal::{Decimal, RoundingStrategy};

/// All money, rates and fees. Never `f64`.
pub type Money = Decimal;

/// A simulated month. Month 1 is the first month after the start date.
pub type MonthIndex = u32;

/// A stable identifier for a debt record.
pub type DebtId = String;

/// The owning user.
pub type UserId = String;

/// Round to cents at an output boundary.
/// Half away from zero, so 0.125 becomes 0.13.
pub fn round_money(value: Money) -> Money {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Sum that clamps at `Decimal::MAX` instead of panicking on huge inputs.
pub fn saturating_sum(values: impl Iterator<Item = Money>) -> Money {
    values.fold(Decimal::ZERO, Decimal::saturating_add)
}
