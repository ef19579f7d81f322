//! Simulation events and the observer hook that receives them.
//!
//! The engine never prints. Anything that wants a month-by-month trace
//! (debug UIs, tests, the runner's verbose mode) implements
//! `SimObserver` and is handed every event as it happens.

use crate::{
    attack_order::Strategy,
    types::{DebtId, Money, MonthIndex},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Every event emitted during a simulation run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    RunStarted {
        strategy:       Strategy,
        debt_count:     usize,
        total_balance:  Money,
        monthly_budget: Money,
    },
    /// Minimum payment run through the fees → interest → principal waterfall.
    MinimumApplied {
        month:         MonthIndex,
        debt_id:       DebtId,
        payment:       Money,
        fees:          Money,
        interest:      Money,
        principal:     Money,
        balance_after: Money,
    },
    /// Leftover budget thrown at the target debt.
    ExtraApplied {
        month:         MonthIndex,
        debt_id:       DebtId,
        amount:        Money,
        balance_after: Money,
    },
    DebtPaidOff {
        month:   MonthIndex,
        debt_id: DebtId,
        date:    NaiveDate,
    },
    MonthCompleted {
        month:            MonthIndex,
        date:             NaiveDate,
        remaining_budget: Money,
        outstanding:      Money,
    },
    RunCompleted {
        strategy:       Strategy,
        months:         MonthIndex,
        converged:      bool,
        total_interest: Money,
    },
}

impl SimEvent {
    /// Stable name for log lines and filtering.
    pub fn type_name(&self) -> &'static str {
        match self {
            SimEvent::RunStarted { .. }     => "run_started",
            SimEvent::MinimumApplied { .. } => "minimum_applied",
            SimEvent::ExtraApplied { .. }   => "extra_applied",
            SimEvent::DebtPaidOff { .. }    => "debt_paid_off",
            SimEvent::MonthCompleted { .. } => "month_completed",
            SimEvent::RunCompleted { .. }   => "run_completed",
        }
    }
}

pub trait SimObserver {
    /// When false the engine skips building events altogether.
    fn enabled(&self) -> bool {
        true
    }

    fn on_event(&mut self, event: &SimEvent);
}

/// Default observer: discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl SimObserver for NullObserver {
    fn enabled(&self) -> bool {
        false
    }

    fn on_event(&mut self, _event: &SimEvent) {}
}

/// Forwards every event to `log::trace!` as JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl SimObserver for LogObserver {
    fn enabled(&self) -> bool {
        log::log_enabled!(log::Level::Trace)
    }

    fn on_event(&mut self, event: &SimEvent) {
        match serde_json::to_string(event) {
            Ok(json) => log::trace!("{}: {json}", event.type_name()),
            Err(e)   => log::warn!("unserializable {} event: {e}", event.type_name()),
        }
    }
}

/// Keeps every event in memory. Used by tests and tooling.
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    pub events: Vec<SimEvent>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of_type<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a SimEvent> + 'a {
        self.events.iter().filter(move |e| e.type_name() == name)
    }
}

impl SimObserver for RecordingObserver {
    fn on_event(&mut self, event: &SimEvent) {
        self.events.push(event.clone());
    }
}
