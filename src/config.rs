use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::input::{clamp_decay_rate, clamp_non_negative};
use crate::settings::{BenefitTiming, CalculationSettings, DiscountModel};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub settings: CalculationSettings,
    #[serde(default)]
    pub portfolio: PortfolioConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PortfolioConfig {
    /// Portfolio TOML file; empty means the built-in sample portfolio.
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub annual_decay_rate: Option<f64>,
    pub analysis_horizon_weeks: Option<f64>,
    pub discount_model: Option<DiscountModel>,
    pub delay_scenarios: Option<Vec<f64>>,
    pub portfolio_path: Option<PathBuf>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/cost-of-delay/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed.clamped())
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(rate) = overrides.annual_decay_rate {
            self.settings.annual_decay_rate = rate;
        }
        if let Some(horizon) = overrides.analysis_horizon_weeks {
            self.settings.analysis_horizon_weeks = horizon;
        }
        if let Some(model) = overrides.discount_model {
            self.settings.discount_model = model;
        }
        if let Some(delays) = overrides.delay_scenarios {
            self.settings.delay_scenarios = delays;
        }
        if let Some(path) = overrides.portfolio_path {
            self.portfolio.path = path.display().to_string();
        }
        *self = self.clone().clamped();
    }

    /// Brings settings back into the ranges the input form allows.
    fn clamped(mut self) -> Self {
        let rate = clamp_decay_rate(self.settings.annual_decay_rate);
        if rate != self.settings.annual_decay_rate {
            warn!(
                "annual decay rate {} clamped to {rate}",
                self.settings.annual_decay_rate
            );
        }
        self.settings.annual_decay_rate = rate;
        let horizon = self.settings.analysis_horizon_weeks;
        if horizon.is_nan() || horizon <= 0.0 {
            warn!("analysis horizon {horizon} must be positive, using 52 weeks");
            self.settings.analysis_horizon_weeks = 52.0;
        }
        if let BenefitTiming::AfterWeeks(weeks) = self.settings.benefit_timing {
            let clamped = clamp_non_negative(weeks);
            if clamped != weeks {
                warn!("benefit delivery week {weeks} clamped to {clamped}");
                self.settings.benefit_timing = BenefitTiming::AfterWeeks(clamped);
            }
        }
        self.settings.delay_scenarios = self
            .settings
            .delay_scenarios
            .iter()
            .map(|weeks| clamp_non_negative(*weeks))
            .collect();
        self
    }

    pub fn portfolio_path(&self) -> Option<PathBuf> {
        let trimmed = self.portfolio.path.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(expand_tilde(trimmed))
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))?;
        Ok(())
    }

    pub fn default_template() -> String {
        let template = r#"[settings]
analysis_horizon_weeks = 52.0
# percent per year, 0-20
annual_decay_rate = 10.0
# "compounding" or "linear"
discount_model = "compounding"
# "horizon_midpoint", "immediate" or { after_weeks = 6.0 }
benefit_timing = "horizon_midpoint"
delay_scenarios = [4.0, 8.0, 12.0]

[portfolio]
path = ""

[output]
currency_symbol = "$"
"#;
        template.to_string()
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            currency_symbol: default_currency_symbol(),
        }
    }
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{Config, ConfigOverrides};
    use crate::engine::recurring_metrics;
    use crate::initiative::{InitiativeId, RecurringInitiative};
    use crate::settings::{BenefitTiming, CalculationSettings, DiscountModel};

    #[test]
    fn template_parses_to_defaults() {
        let parsed: Config = toml::from_str(&Config::default_template()).expect("template");
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::load(Some(&dir.path().join("absent.toml"))).expect("load");
        assert_eq!(config.settings, CalculationSettings::default());
        assert!(config.portfolio_path().is_none());
    }

    #[test]
    fn loads_partial_file_and_clamps_rate() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"[settings]
annual_decay_rate = 35.0
discount_model = "linear"
benefit_timing = { after_weeks = 6.0 }
"#,
        )
        .expect("write");
        let config = Config::load(Some(&path)).expect("load");
        assert_eq!(config.settings.annual_decay_rate, 20.0);
        assert_eq!(config.settings.discount_model, DiscountModel::Linear);
        assert_eq!(config.settings.benefit_timing, BenefitTiming::AfterWeeks(6.0));
        assert_eq!(config.settings.delay_scenarios, vec![4.0, 8.0, 12.0]);
        assert_eq!(config.output.currency_symbol, "$");
    }

    #[test]
    fn negative_benefit_week_is_clamped_to_go_live() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"[settings]
benefit_timing = { after_weeks = -52.0 }
"#,
        )
        .expect("write");
        let config = Config::load(Some(&path)).expect("load");
        assert_eq!(config.settings.benefit_timing, BenefitTiming::AfterWeeks(0.0));

        let initiative = RecurringInitiative::new(InitiativeId::from("x"), "X")
            .with_one_time_value(10_000.0);
        let metrics = recurring_metrics(&initiative, &config.settings);
        assert_eq!(metrics.one_time_benefit_npv, 10_000.0);
    }

    #[test]
    fn overrides_replace_and_clamp() {
        let mut config = Config::default();
        config.apply_overrides(ConfigOverrides {
            annual_decay_rate: Some(-3.0),
            analysis_horizon_weeks: Some(0.0),
            discount_model: Some(DiscountModel::Linear),
            delay_scenarios: Some(vec![2.0, 6.0]),
            portfolio_path: Some("portfolio.toml".into()),
        });
        assert_eq!(config.settings.annual_decay_rate, 0.0);
        assert_eq!(config.settings.analysis_horizon_weeks, 52.0);
        assert_eq!(config.settings.delay_scenarios, vec![2.0, 6.0]);
        assert_eq!(
            config.portfolio_path().as_deref(),
            Some(std::path::Path::new("portfolio.toml"))
        );
    }

    #[test]
    fn writes_template_to_nested_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested/config.toml");
        Config::write_template(&path).expect("write");
        let loaded = Config::load(Some(&path)).expect("load");
        assert_eq!(loaded, Config::default());
    }
}
