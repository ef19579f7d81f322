//! Amortization simulator tests.

use chrono::NaiveDate;
use debtfree_core::{
    config::EngineConfig,
    debt::Debt,
    engine::SimEngine,
    event::RecordingObserver,
    Strategy,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
}

fn engine() -> SimEngine {
    SimEngine::new(EngineConfig::default().with_schedule()).with_start_date(start())
}

fn debt(id: &str, balance: Decimal, rate: Decimal, minimum: Decimal) -> Debt {
    Debt {
        debt_id: id.into(),
        debt_name: id.into(),
        original_principal: balance,
        current_balance: balance,
        annual_interest_rate: rate,
        minimum_payment: minimum,
        ..Debt::default()
    }
}

/// Zero-interest debt paid at its minimum clears in exactly principal / minimum months.
#[test]
fn zero_interest_debt_pays_off_in_ten_months() {
    let debts = vec![debt("a", dec!(1000), dec!(0), dec!(100))];

    let outcome = engine().simulate(&debts, Strategy::Avalanche, dec!(100));

    assert_eq!(outcome.months_to_freedom, 10);
    assert_eq!(outcome.total_interest_paid, dec!(0));
    assert_eq!(outcome.total_paid, dec!(1000));
    assert!(outcome.converged);
    assert_eq!(outcome.remaining_balance, dec!(0));
    assert_eq!(
        outcome.debt_free_date,
        NaiveDate::from_ymd_opt(2026, 11, 16),
        "debt-free date should be the day after month 10 (2026-11-15)"
    );
}

/// When this month's interest would push accumulated charges past the
/// original principal, no interest is charged that month.
#[test]
fn in_duplum_gate_blocks_interest_over_cap() {
    let mut d = debt("capped", dec!(1000), dec!(12), dec!(100));
    d.accumulated_interest_and_fees = dec!(995);
    let mut observer = RecordingObserver::new();

    let outcome = engine().simulate_observed(&[d], Strategy::Avalanche, dec!(100), &mut observer);

    let first_interest = observer
        .events
        .iter()
        .find_map(|e| match e {
            debtfree_core::event::SimEvent::MinimumApplied { month: 1, interest, .. } => Some(*interest),
            _ => None,
        })
        .expect("month 1 minimum event");
    assert_eq!(first_interest, dec!(0), "995 + 10 > 1000, so month 1 must charge nothing");

    // Month 6 is the only one where interest (5.00 on a 500 balance) still fits.
    assert_eq!(outcome.total_interest_paid, dec!(5));
    assert_eq!(outcome.months_to_freedom, 11);
    assert_eq!(outcome.total_paid, dec!(1005));
}

/// A debt already flagged as capped never accrues interest.
#[test]
fn cap_reached_flag_stops_all_interest() {
    let mut d = debt("flagged", dec!(5000), dec!(25), dec!(500));
    d.in_duplum_cap_reached = true;

    let outcome = engine().simulate(&[d], Strategy::Avalanche, dec!(500));

    assert_eq!(outcome.total_interest_paid, dec!(0));
    assert_eq!(outcome.months_to_freedom, 10);
}

/// Accumulated interest and fees never exceed the original principal.
#[test]
fn accumulated_charges_stay_under_principal() {
    let debts = vec![
        debt("hot", dec!(8000), dec!(28), dec!(200)),
        debt("warm", dec!(3000), dec!(18), dec!(90)),
    ];

    let outcome = engine().simulate(&debts, Strategy::Snowball, dec!(300));

    for row in &outcome.schedule {
        for (d, input) in row.debts.iter().zip(outcome.attack_order.iter()) {
            assert!(
                d.accumulated_interest_and_fees <= input.debt.original_principal + dec!(0.01),
                "month {}: {} accumulated {} over principal {}",
                row.month, d.debt_id, d.accumulated_interest_and_fees, input.debt.original_principal
            );
        }
    }
}

/// Balances never go up from one month to the next.
#[test]
fn balances_are_monotonic() {
    let debts = vec![
        debt("a", dec!(4500), dec!(22.5), dec!(150)),
        debt("b", dec!(12000), dec!(11.75), dec!(300)),
        debt("c", dec!(900), dec!(0), dec!(50)),
    ];

    let outcome = engine().simulate(&debts, Strategy::Avalanche, dec!(800));

    assert!(outcome.converged);
    for pair in outcome.schedule.windows(2) {
        for (before, after) in pair[0].debts.iter().zip(pair[1].debts.iter()) {
            assert!(
                after.balance <= before.balance,
                "{} rose from {} to {} in month {}",
                before.debt_id, before.balance, after.balance, pair[1].month
            );
        }
    }
}

/// Leftover budget goes to the first unpaid debt in attack order.
#[test]
fn surplus_goes_to_target_debt() {
    let debts = vec![
        debt("big", dec!(1000), dec!(0), dec!(50)),
        debt("small", dec!(300), dec!(0), dec!(50)),
    ];

    let outcome = engine().simulate(&debts, Strategy::Snowball, dec!(400));

    assert_eq!(outcome.attack_order[0].debt.debt_id, "small");
    assert_eq!(outcome.first_debt_cleared_month, Some(1));
    assert_eq!(outcome.months_to_freedom, 4);
    assert_eq!(outcome.schedule[0].debts[0].balance, dec!(0));
    assert_eq!(outcome.schedule[0].debts[1].balance, dec!(950));
}

/// Fees come out of the minimum first, then interest, then principal.
#[test]
fn waterfall_applies_fees_then_interest() {
    let mut d = debt("fees", dec!(1200), dec!(12), dec!(100));
    d.monthly_service_fee = dec!(60);
    d.monthly_credit_life_insurance = dec!(10);
    let mut cfg = EngineConfig::default().with_schedule();
    cfg.max_months = 1;
    let engine = SimEngine::new(cfg).with_start_date(start());

    let outcome = engine.simulate(&[d], Strategy::Avalanche, dec!(100));

    // 100 - 70 fees - 12 interest = 18 principal
    assert_eq!(outcome.schedule[0].debts[0].balance, dec!(1182));
    assert_eq!(outcome.total_interest_paid, dec!(12));
    assert!(!outcome.converged);
}

/// A budget that cannot cover fees and minimums runs to the month cap.
#[test]
fn deficit_budget_hits_month_cap() {
    let mut stuck = debt("stuck", dec!(5000), dec!(15), dec!(100));
    stuck.monthly_service_fee = dec!(120);
    let other = debt("other", dec!(2000), dec!(10), dec!(100));

    let outcome = SimEngine::default()
        .with_start_date(start())
        .simulate(&[stuck, other], Strategy::Avalanche, dec!(50));

    assert_eq!(outcome.months_to_freedom, 600);
    assert!(!outcome.converged, "fees swallow the minimum, so 'stuck' never shrinks");
    assert_eq!(outcome.remaining_balance, dec!(5000));
    // 'other' was still paid off along the way.
    assert!(outcome.debt_free_date.is_some());
}

/// The configured month cap is a hard stop.
#[test]
fn custom_month_cap_terminates() {
    let mut cfg = EngineConfig::default();
    cfg.max_months = 24;
    let d = debt("slow", dec!(100000), dec!(5), dec!(10));

    let outcome = SimEngine::new(cfg).with_start_date(start()).simulate(&[d], Strategy::Snowball, dec!(10));

    assert_eq!(outcome.months_to_freedom, 24);
    assert!(!outcome.converged);
    assert_eq!(outcome.debt_free_date, None);
}

/// No debts: nothing to simulate.
#[test]
fn empty_debt_list_is_trivial() {
    let outcome = engine().simulate(&[], Strategy::SmartSa, dec!(1000));

    assert_eq!(outcome.months_to_freedom, 0);
    assert_eq!(outcome.debt_free_date, None);
    assert_eq!(outcome.total_interest_paid, dec!(0));
    assert_eq!(outcome.total_paid, dec!(0));
    assert!(outcome.converged);
    assert!(outcome.attack_order.is_empty());
}

/// Total paid counts the principal of every input debt, filtered ones included.
#[test]
fn total_paid_includes_filtered_principal() {
    let mut archived = debt("old", dec!(500), dec!(0), dec!(50));
    archived.is_archived = true;
    let live = debt("live", dec!(300), dec!(0), dec!(100));

    let outcome = engine().simulate(&[archived, live], Strategy::Avalanche, dec!(100));

    assert_eq!(outcome.attack_order.len(), 1);
    assert_eq!(outcome.total_paid, dec!(800));
    assert_eq!(outcome.months_to_freedom, 3);
}

/// Monetary outputs are rounded to cents.
#[test]
fn outputs_rounded_to_cents() {
    let debts = vec![debt("odd", dec!(3333.33), dec!(17.9), dec!(123.45))];

    let outcome = engine().simulate(&debts, Strategy::Avalanche, dec!(250));

    assert!(outcome.total_interest_paid.scale() <= 2, "got {}", outcome.total_interest_paid);
    assert!(outcome.total_paid.scale() <= 2, "got {}", outcome.total_paid);
    assert!(outcome.total_interest_paid > dec!(0));
}

/// `minimumMonthlyPayment` wins over `minimumPayment` unless it is zero.
#[test]
fn minimum_monthly_payment_takes_precedence() {
    let mut d = debt("pref", dec!(1000), dec!(0), dec!(50));
    d.minimum_monthly_payment = Some(dec!(250));
    assert_eq!(engine().simulate(&[d.clone()], Strategy::Avalanche, dec!(0)).months_to_freedom, 4);

    d.minimum_monthly_payment = Some(dec!(0));
    assert_eq!(engine().simulate(&[d], Strategy::Avalanche, dec!(0)).months_to_freedom, 20);
}

/// The observer sees one minimum and one month-end per month, and the payoff.
#[test]
fn observer_receives_month_events() {
    let debts = vec![debt("a", dec!(1000), dec!(0), dec!(100))];
    let mut observer = RecordingObserver::new();

    engine().simulate_observed(&debts, Strategy::Avalanche, dec!(100), &mut observer);

    assert_eq!(observer.of_type("run_started").count(), 1);
    assert_eq!(observer.of_type("minimum_applied").count(), 10);
    assert_eq!(observer.of_type("month_completed").count(), 10);
    assert_eq!(observer.of_type("debt_paid_off").count(), 1);
    assert_eq!(observer.of_type("extra_applied").count(), 0);
    assert_eq!(observer.of_type("run_completed").count(), 1);
}

/// Schedule rows are only captured when asked for.
#[test]
fn schedule_off_by_default() {
    let debts = vec![debt("a", dec!(1000), dec!(10), dec!(100))];

    let quiet = SimEngine::default().with_start_date(start()).simulate(&debts, Strategy::Avalanche, dec!(100));
    let loud = engine().simulate(&debts, Strategy::Avalanche, dec!(100));

    assert!(quiet.schedule.is_empty());
    assert_eq!(loud.schedule.len() as u32, loud.months_to_freedom);
    assert_eq!(quiet.total_interest_paid, loud.total_interest_paid);
}

/// Interest on a balance too large for `Decimal` is charged as zero
/// instead of aborting the run.
#[test]
fn overflowing_interest_charges_nothing() {
    let huge = Decimal::from_i128_with_scale(10i128.pow(27), 0);
    let debts = vec![debt("huge", huge, dec!(200), dec!(100))];
    let engine = SimEngine::new(EngineConfig::default()).with_start_date(start());

    let outcome = engine.simulate(&debts, Strategy::Avalanche, dec!(100));

    assert_eq!(outcome.months_to_freedom, 600);
    assert!(!outcome.converged);
    assert_eq!(outcome.total_interest_paid, dec!(0));
    assert_eq!(outcome.remaining_balance, huge - dec!(60000));
}

/// With trace logging on, `simulate` routes through the logging
/// observer and still returns the same outcome.
#[test]
fn trace_logging_leaves_outcome_unchanged() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Trace)
        .try_init();
    assert!(log::log_enabled!(log::Level::Trace));

    let debts = vec![
        debt("a", dec!(1000), dec!(18), dec!(100)),
        debt("b", dec!(2500), dec!(24), dec!(150)),
    ];
    let mut observer = RecordingObserver::new();

    let traced = engine().simulate(&debts, Strategy::SmartSa, dec!(400));
    let recorded = engine().simulate_observed(&debts, Strategy::SmartSa, dec!(400), &mut observer);

    assert_eq!(traced, recorded);
    assert_eq!(observer.of_type("month_completed").count() as u32, traced.months_to_freedom);
}
