//! Engine configuration.
//!
//! Every tunable lives here. `EngineConfig::default()` is what the
//! engine runs with when no data directory is supplied; `load()` reads
//! the same shape from `{data_dir}/engine.json`.

use crate::{
    error::{SimError, SimResult},
    types::Money,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "engine.json";

/// Hard safety stop: 50 years of simulated months.
pub const DEFAULT_MAX_MONTHS: u32 = 600;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub max_months: u32,
    /// Balances at or below this are treated as paid off.
    pub payoff_epsilon: Money,
    pub in_duplum: InDuplumThresholds,
    /// A budget under `factor × minimums` is reported as tight.
    pub viability_tight_factor: Money,
    pub section129_business_days: u32,
    pub public_holidays: Vec<NaiveDate>,
    /// Capture a per-month snapshot in every outcome.
    pub record_schedule: bool,
    pub nca_rate_caps: NcaRateCaps,
}

/// Maximum annual rates (percent) under the NCA regulations, derived
/// from a 7.00% repo rate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct NcaRateCaps {
    /// Repo + 12%.
    pub mortgage: Money,
    /// Repo + 17% (other credit agreements).
    pub vehicle: Money,
    /// Repo + 21%.
    pub unsecured: Money,
    /// 5% per month.
    pub short_term: Money,
}

impl Default for NcaRateCaps {
    fn default() -> Self {
        Self {
            mortgage:   Decimal::from(19),
            vehicle:    Decimal::from(24),
            unsecured:  Decimal::from(28),
            short_term: Decimal::from(60),
        }
    }
}

/// Fractions of the cap (accumulated / original principal).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct InDuplumThresholds {
    pub approaching_ratio: Money,
    pub near_cap_ratio: Money,
}

impl Default for InDuplumThresholds {
    fn default() -> Self {
        Self {
            approaching_ratio: Decimal::new(70, 2),
            near_cap_ratio:    Decimal::new(85, 2),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_months:               DEFAULT_MAX_MONTHS,
            payoff_epsilon:           Decimal::new(1, 2),
            in_duplum:                InDuplumThresholds::default(),
            viability_tight_factor:   Decimal::new(12, 1),
            section129_business_days: 10,
            public_holidays:          sa_public_holidays(),
            record_schedule:          false,
            nca_rate_caps:            NcaRateCaps::default(),
        }
    }
}

impl EngineConfig {
    /// Load from the data/ directory.
    /// In tests, use EngineConfig::default().
    pub fn load(data_dir: &str) -> SimResult<Self> {
        let path = format!("{data_dir}/{CONFIG_FILE_NAME}");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        log::debug!(
            "Loaded engine config from {path}: max_months={} epsilon={} holidays={}",
            config.max_months,
            config.payoff_epsilon,
            config.public_holidays.len()
        );
        Ok(config)
    }

    /// Like `load()`, but a missing file yields the defaults.
    /// A present but malformed file is still an error.
    pub fn load_or_default(data_dir: &str) -> SimResult<Self> {
        let path = Path::new(data_dir).join(CONFIG_FILE_NAME);
        if !path.exists() {
            log::debug!("No {} in {data_dir}; using defaults", CONFIG_FILE_NAME);
            return Ok(Self::default());
        }
        Self::load(data_dir)
    }

    /// Same defaults, with schedule capture switched on.
    pub fn with_schedule(mut self) -> Self {
        self.record_schedule = true;
        self
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.max_months == 0 {
            return Err(invalid("maxMonths must be at least 1"));
        }
        if self.payoff_epsilon < Decimal::ZERO {
            return Err(invalid("payoffEpsilon must not be negative"));
        }
        let t = &self.in_duplum;
        if t.approaching_ratio <= Decimal::ZERO || t.approaching_ratio > t.near_cap_ratio {
            return Err(invalid("inDuplum ratios must satisfy 0 < approaching <= nearCap"));
        }
        if t.near_cap_ratio > Decimal::ONE {
            return Err(invalid("inDuplum nearCapRatio must not exceed 1"));
        }
        if self.viability_tight_factor < Decimal::ONE {
            return Err(invalid("viabilityTightFactor must be at least 1"));
        }
        let caps = &self.nca_rate_caps;
        if [caps.mortgage, caps.vehicle, caps.unsecured, caps.short_term]
            .iter()
            .any(|cap| *cap <= Decimal::ZERO)
        {
            return Err(invalid("ncaRateCaps must all be positive"));
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> SimError {
    SimError::InvalidConfig { reason: reason.to_string() }
}

/// South African public holidays (Public Holidays Act, with Sunday
/// holidays moved to the Monday).
fn sa_public_holidays() -> Vec<NaiveDate> {
    const DATES: &[(i32, u32, u32)] = &[
        // 2025
        (2025, 1, 1), (2025, 3, 21), (2025, 4, 18), (2025, 4, 21),
        (2025, 4, 28), (2025, 5, 1), (2025, 6, 16), (2025, 8, 9),
        (2025, 9, 24), (2025, 12, 16), (2025, 12, 25), (2025, 12, 26),
        // 2026
        (2026, 1, 1), (2026, 3, 21), (2026, 4, 3), (2026, 4, 6),
        (2026, 4, 27), (2026, 5, 1), (2026, 6, 16), (2026, 8, 10),
        (2026, 9, 24), (2026, 12, 16), (2026, 12, 25), (2026, 12, 26),
    ];
    DATES
        .iter()
        .filter_map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
        .collect()
}
