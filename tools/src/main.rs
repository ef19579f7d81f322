//! strategy-runner: headless repayment simulation for a plan file.
//!
//! Usage:
//!   strategy-runner --plan plan.json
//!   strategy-runner --plan plan.json --strategy avalanche --start 2026-01-01 --json
//!   strategy-runner --plan plan.json --data-dir ./data --schedule

use anyhow::{Context, Result};
use chrono::NaiveDate;
use debtfree_core::{
    budget::{assess_viability, Budget},
    debt::{validate_debts, Debt},
    engine::{SimEngine, StrategyOutcome},
    event::LogObserver,
    config::CONFIG_FILE_NAME,
    legal::{days_until_deadline, in_duplum_audit, validate_interest_rate},
    EngineConfig, Strategy,
};
use rust_decimal::Decimal;
use std::{env, path::Path};

/// What a caller would load from the budget and debt stores.
#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct Plan {
    budget: Budget,
    debts: Vec<Debt>,
    /// Overrides the budget-derived figure when present.
    #[serde(default)]
    monthly_budget: Option<Decimal>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let plan_path = arg_value(&args, "--plan").context("--plan <file> is required")?;
    let data_dir = arg_value(&args, "--data-dir").unwrap_or("./data");
    let json = args.iter().any(|a| a == "--json");
    let schedule = args.iter().any(|a| a == "--schedule");
    let strategy = arg_value(&args, "--strategy")
        .map(|s| s.parse::<Strategy>().map_err(anyhow::Error::msg))
        .transpose()?;
    let start = arg_value(&args, "--start")
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .context("--start must be YYYY-MM-DD")?
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    if !Path::new(data_dir).join(CONFIG_FILE_NAME).exists() {
        log::warn!("No {CONFIG_FILE_NAME} in {data_dir}; running with built-in defaults");
    }
    let mut config = EngineConfig::load_or_default(data_dir)?;
    if schedule {
        config = config.with_schedule();
    }

    let content = std::fs::read_to_string(plan_path)
        .with_context(|| format!("Cannot read {plan_path}"))?;
    let plan: Plan = serde_json::from_str(&content)
        .with_context(|| format!("Malformed plan file {plan_path}"))?;
    plan.budget.validate()?;
    validate_debts(&plan.debts)?;

    let totals = plan.budget.totals();
    let monthly_budget = plan.monthly_budget.unwrap_or(totals.debt_attack_budget);
    let viability = assess_viability(&plan.budget, &plan.debts, &config);
    let engine = SimEngine::new(config.clone()).with_start_date(start);

    if !json {
        println!("Debt repayment strategy runner");
        println!("  plan:      {plan_path}");
        println!("  debts:     {}", plan.debts.len());
        println!("  income:    {:.2}", totals.total_income);
        println!("  fixed:     {:.2}", totals.total_fixed_obligations);
        println!("  variable:  {:.2}", totals.total_variable_expenses);
        println!("  budget:    {monthly_budget:.2}");
        println!("  viability: {:?} ({})", viability.status, viability.message);
        println!("  start:     {start}");
        println!();
        print_legal_flags(&plan.debts, start, &config);
    }

    match strategy {
        Some(strategy) => {
            let outcome = engine.simulate_observed(&plan.debts, strategy, monthly_budget, &mut LogObserver);
            if let Some(warning) = convergence_warning(&outcome) {
                log::warn!("{warning}");
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_outcome(&outcome);
            }
        }
        None => {
            let comparison = engine.simulate_all(&plan.debts, monthly_budget);
            for strategy in Strategy::ALL {
                if let Some(warning) = convergence_warning(comparison.outcome(strategy)) {
                    log::warn!("{warning}");
                }
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&comparison)?);
            } else {
                for strategy in Strategy::ALL {
                    print_outcome(comparison.outcome(strategy));
                    if strategy != Strategy::Snowball {
                        println!("  saved vs snowball: {:.2}", comparison.interest_saved(strategy));
                    }
                    println!();
                }
                println!("Recommended: {}", comparison.recommended);
            }
        }
    }

    Ok(())
}

fn print_legal_flags(debts: &[Debt], today: NaiveDate, config: &EngineConfig) {
    for debt in debts {
        if let Some(days) = days_until_deadline(debt, today, config) {
            println!("  [s129] {}: {days} days to respond", debt.debt_name);
        }
        if let Some(warning) = validate_interest_rate(debt, config).warning {
            println!("  [rate] {}: {warning}", debt.debt_name);
        }
        let audit = in_duplum_audit(debt, config);
        if audit.status != debtfree_core::InDuplumStatus::None {
            println!(
                "  [in duplum] {}: {:?}, {}% of cap used",
                debt.debt_name, audit.status, audit.cap_percentage_used
            );
        }
    }
}

/// Message for a run that hit the month limit with balances left.
fn convergence_warning(outcome: &StrategyOutcome) -> Option<String> {
    if outcome.converged {
        return None;
    }
    Some(format!(
        "{} did not converge within {} months; {:.2} still outstanding",
        outcome.strategy, outcome.months_to_freedom, outcome.remaining_balance
    ))
}

fn print_outcome(outcome: &StrategyOutcome) {
    println!("=== {} ===", outcome.strategy);
    let order: Vec<&str> = outcome
        .attack_order
        .iter()
        .map(|d| d.debt.debt_name.as_str())
        .collect();
    println!("  attack order:   {}", order.join(" -> "));
    println!("  months:         {}", outcome.months_to_freedom);
    match outcome.debt_free_date {
        Some(date) => println!("  debt-free date: {date}"),
        None       => println!("  debt-free date: (none)"),
    }
    println!("  interest:       {:.2}", outcome.total_interest_paid);
    println!("  total paid:     {:.2}", outcome.total_paid);
    if !outcome.converged {
        println!(
            "  NOT CONVERGED:  {:.2} still outstanding; the budget cannot clear these debts",
            outcome.remaining_balance
        );
    }
    for row in &outcome.schedule {
        println!(
            "    m{:>3} {}  paid {:>10.2}  interest {:>8.2}  outstanding {:>12.2}",
            row.month, row.date, row.amount_paid, row.interest_charged, row.outstanding
        );
    }
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
