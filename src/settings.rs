use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const WEEKS_PER_YEAR: f64 = 52.0;

/// How an annual decay rate is converted into a weekly rate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DiscountModel {
    /// `(1 + annual)^(1/52) - 1`
    #[default]
    Compounding,
    /// `annual / 52`
    Linear,
}

impl DiscountModel {
    /// Weekly rate as a decimal for an annual rate given in percent.
    pub fn weekly_rate(self, annual_rate_pct: f64) -> f64 {
        let annual = annual_rate_pct / 100.0;
        let weekly = match self {
            Self::Compounding => {
                let base = 1.0 + annual;
                if base <= 0.0 {
                    return 0.0;
                }
                base.powf(1.0 / WEEKS_PER_YEAR) - 1.0
            }
            Self::Linear => annual / WEEKS_PER_YEAR,
        };
        if weekly.is_finite() {
            weekly
        } else {
            0.0
        }
    }

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Compounding => "compounding",
            Self::Linear => "linear",
        }
    }
}

impl Display for DiscountModel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_slug())
    }
}

#[derive(Debug, Error)]
#[error("unknown discount model: {0} (expected compounding or linear)")]
pub struct DiscountModelParseError(pub String);

impl FromStr for DiscountModel {
    type Err = DiscountModelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compounding" | "compound" => Ok(Self::Compounding),
            "linear" | "simple" => Ok(Self::Linear),
            _ => Err(DiscountModelParseError(s.to_string())),
        }
    }
}

/// When a one-time benefit is assumed to land, for present-value purposes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BenefitTiming {
    /// Halfway through the analysis horizon.
    #[default]
    HorizonMidpoint,
    /// At go-live; no discounting.
    Immediate,
    /// A fixed number of weeks from now.
    AfterWeeks(f64),
}

impl BenefitTiming {
    pub fn delivery_weeks(self, analysis_horizon_weeks: f64) -> f64 {
        match self {
            Self::HorizonMidpoint => analysis_horizon_weeks / 2.0,
            Self::Immediate => 0.0,
            Self::AfterWeeks(weeks) => weeks,
        }
    }
}

/// Global assumptions shared by every recurring-delay calculation.
///
/// The weekly decay rate is always derived from `annual_decay_rate` and
/// `discount_model`; it is never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalculationSettings {
    #[serde(default = "default_analysis_horizon")]
    pub analysis_horizon_weeks: f64,
    /// Percent per year, 0-20.
    #[serde(default = "default_annual_decay_rate")]
    pub annual_decay_rate: f64,
    #[serde(default)]
    pub discount_model: DiscountModel,
    #[serde(default)]
    pub benefit_timing: BenefitTiming,
    /// Delay durations in weeks, in configured order.
    #[serde(default = "default_delay_scenarios")]
    pub delay_scenarios: Vec<f64>,
}

impl CalculationSettings {
    pub fn weekly_decay_rate(&self) -> f64 {
        self.discount_model.weekly_rate(self.annual_decay_rate)
    }

    pub fn benefit_delivery_weeks(&self) -> f64 {
        self.benefit_timing.delivery_weeks(self.analysis_horizon_weeks)
    }

    pub fn with_annual_decay_rate(mut self, percent: f64) -> Self {
        self.annual_decay_rate = percent;
        self
    }

    pub fn with_discount_model(mut self, model: DiscountModel) -> Self {
        self.discount_model = model;
        self
    }

    pub fn with_benefit_timing(mut self, timing: BenefitTiming) -> Self {
        self.benefit_timing = timing;
        self
    }

    pub fn with_analysis_horizon(mut self, weeks: f64) -> Self {
        self.analysis_horizon_weeks = weeks;
        self
    }

    pub fn with_delay_scenarios(mut self, weeks: Vec<f64>) -> Self {
        self.delay_scenarios = weeks;
        self
    }
}

impl Default for CalculationSettings {
    fn default() -> Self {
        Self {
            analysis_horizon_weeks: default_analysis_horizon(),
            annual_decay_rate: default_annual_decay_rate(),
            discount_model: DiscountModel::default(),
            benefit_timing: BenefitTiming::default(),
            delay_scenarios: default_delay_scenarios(),
        }
    }
}

fn default_analysis_horizon() -> f64 {
    52.0
}

fn default_annual_decay_rate() -> f64 {
    10.0
}

fn default_delay_scenarios() -> Vec<f64> {
    vec![4.0, 8.0, 12.0]
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{BenefitTiming, CalculationSettings, DiscountModel, WEEKS_PER_YEAR};

    #[test]
    fn linear_rate_matches_simple_division() {
        let weekly = DiscountModel::Linear.weekly_rate(5.0);
        assert!((weekly - 0.05 / 52.0).abs() < 1e-15);
        assert!((weekly - 0.000_961_5).abs() < 1e-7);
    }

    #[test]
    fn weekly_rate_tracks_annual_rate_changes() {
        let settings = CalculationSettings::default();
        let before = settings.weekly_decay_rate();
        let changed = settings.with_annual_decay_rate(20.0);
        assert!(changed.weekly_decay_rate() > before);
        assert_eq!(
            changed.weekly_decay_rate(),
            DiscountModel::Compounding.weekly_rate(20.0)
        );
    }

    #[test]
    fn zero_and_invalid_rates_are_zero() {
        assert_eq!(DiscountModel::Compounding.weekly_rate(0.0), 0.0);
        assert_eq!(DiscountModel::Compounding.weekly_rate(-150.0), 0.0);
        assert_eq!(DiscountModel::Linear.weekly_rate(0.0), 0.0);
    }

    #[test]
    fn benefit_timing_resolves_delivery_week() {
        let settings = CalculationSettings::default();
        assert_eq!(settings.benefit_delivery_weeks(), 26.0);
        let immediate = settings.clone().with_benefit_timing(BenefitTiming::Immediate);
        assert_eq!(immediate.benefit_delivery_weeks(), 0.0);
        let fixed = settings.with_benefit_timing(BenefitTiming::AfterWeeks(6.0));
        assert_eq!(fixed.benefit_delivery_weeks(), 6.0);
    }

    #[test]
    fn parses_model_names() {
        assert_eq!(
            "Linear".parse::<DiscountModel>().ok(),
            Some(DiscountModel::Linear)
        );
        assert_eq!(
            "compound".parse::<DiscountModel>().ok(),
            Some(DiscountModel::Compounding)
        );
        assert!("daily".parse::<DiscountModel>().is_err());
    }

    proptest! {
        #[test]
        fn compounding_rate_round_trips_to_annual(annual in 0.0f64..=20.0) {
            let weekly = DiscountModel::Compounding.weekly_rate(annual);
            let recovered = (1.0 + weekly).powf(WEEKS_PER_YEAR);
            prop_assert!((recovered - (1.0 + annual / 100.0)).abs() < 1e-12);
        }
    }
}
