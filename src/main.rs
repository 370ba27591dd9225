use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use cost_of_delay::config::{Config, ConfigOverrides};
use cost_of_delay::initiative::{Identified, Initiative, Portfolio};
use cost_of_delay::engine::{select_strategies, Strategy};
use cost_of_delay::input::{parse_delay_list, parse_or};
use cost_of_delay::output::csv::{
    delays_to_csv, metrics_to_csv, recurring_to_csv, scenarios_to_csv,
};
use cost_of_delay::output::render_json;
use cost_of_delay::output::table::{
    render_delay_table, render_metrics_table, render_recurring_table, render_scenarios_table,
    render_settings_summary,
};
use cost_of_delay::portfolio_file::{
    load_portfolio_file, portfolio_template, write_portfolio_template, PortfolioSet,
};
use cost_of_delay::report::{
    build_prioritization_report, build_recurring_report, delay_projection, metrics_rows,
    SettingsSummary,
};
use cost_of_delay::settings::DiscountModel;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(
    name = "cost-of-delay",
    about = "Cost of Delay and CD3 prioritization calculator"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long)]
    portfolio: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[command(flatten)]
    settings: SettingsArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, clap::Args, Clone, Default)]
struct SettingsArgs {
    /// Annual decay rate in percent (0-20), e.g. "7.5%"
    #[arg(long = "decay-rate")]
    decay_rate: Option<String>,
    /// Analysis horizon in weeks
    #[arg(long)]
    horizon: Option<String>,
    /// compounding or linear
    #[arg(long)]
    model: Option<DiscountModel>,
    /// Comma separated delay durations in weeks, e.g. "4,8,12"
    #[arg(long)]
    delays: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Cost of delay and CD3 per initiative
    Metrics,
    /// Compare prioritization strategies
    Scenarios {
        /// Leave an initiative (name or id) out of the comparison
        #[arg(long)]
        exclude: Vec<String>,
        /// Only show these strategies (slug, e.g. "cd3"); the best is always shown
        #[arg(long)]
        strategy: Vec<Strategy>,
    },
    /// Recurring-delay summary ranked by CD3
    Recurring,
    /// Cost of delaying each recurring initiative
    Delays {
        #[arg(long)]
        initiative: Option<String>,
    },
    /// Show the effective config or write a template
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
    /// Print the sample portfolio file or write it to a path
    Portfolio {
        /// Write the sample portfolio to this path
        #[arg(long)]
        init: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    let overrides = ConfigOverrides {
        annual_decay_rate: cli
            .settings
            .decay_rate
            .as_deref()
            .map(|raw| parse_or(raw, config.settings.annual_decay_rate)),
        analysis_horizon_weeks: cli
            .settings
            .horizon
            .as_deref()
            .map(|raw| parse_or(raw, config.settings.analysis_horizon_weeks)),
        discount_model: cli.settings.model,
        delay_scenarios: cli
            .settings
            .delays
            .as_deref()
            .map(parse_delay_list)
            .filter(|delays| !delays.is_empty()),
        portfolio_path: cli.portfolio.clone(),
    };
    config.apply_overrides(overrides);

    match &cli.command {
        Commands::Config { init, show } => {
            return handle_config_command(*init, *show, &config, &config_path);
        }
        Commands::Portfolio { init } => return handle_portfolio_command(init.as_deref()),
        _ => {}
    }

    let portfolios = load_portfolios(&config)?;
    let currency = config.output.currency_symbol.as_str();

    match &cli.command {
        Commands::Metrics => {
            let rows = metrics_rows(portfolios.initiatives.as_slice());
            match cli.output {
                OutputFormat::Table => println!("{}", render_metrics_table(&rows, currency)),
                OutputFormat::Json => println!("{}", render_json(&rows)?),
                OutputFormat::Csv => println!("{}", metrics_to_csv(&rows)?),
            }
        }
        Commands::Scenarios { exclude, strategy } => {
            let mut initiatives = portfolios.initiatives;
            exclude_initiatives(&mut initiatives, exclude)?;
            let mut report = build_prioritization_report(&initiatives);
            report.scenarios = select_strategies(report.scenarios, strategy);
            match cli.output {
                OutputFormat::Table => println!(
                    "{}",
                    render_scenarios_table(&report.scenarios, initiatives.as_slice(), currency)
                ),
                OutputFormat::Json => println!("{}", render_json(&report)?),
                OutputFormat::Csv => println!("{}", scenarios_to_csv(&report.scenarios)?),
            }
        }
        Commands::Recurring => {
            let report = build_recurring_report(&portfolios.recurring, &config.settings);
            match cli.output {
                OutputFormat::Table => {
                    println!("{}", render_settings_summary(&report.settings));
                    println!("{}", render_recurring_table(&report.summary, currency));
                }
                OutputFormat::Json => println!("{}", render_json(&report)?),
                OutputFormat::Csv => println!("{}", recurring_to_csv(&report.summary)?),
            }
        }
        Commands::Delays { initiative } => {
            let selected = match initiative {
                Some(needle) => vec![portfolios
                    .recurring
                    .find(needle)
                    .ok_or_else(|| anyhow!("no recurring initiative named or with id {needle}"))?],
                None => portfolios.recurring.iter().collect(),
            };
            let projections = selected
                .into_iter()
                .map(|item| delay_projection(item, &config.settings))
                .collect::<Vec<_>>();
            match cli.output {
                OutputFormat::Table => {
                    println!(
                        "{}",
                        render_settings_summary(&SettingsSummary::from(&config.settings))
                    );
                    for projection in &projections {
                        println!("{}", render_delay_table(projection, currency));
                    }
                }
                OutputFormat::Json => println!("{}", render_json(&projections)?),
                OutputFormat::Csv => println!("{}", delays_to_csv(&projections)?),
            }
        }
        Commands::Config { .. } | Commands::Portfolio { .. } => {
            unreachable!("config and portfolio commands handled before dispatch")
        }
    }

    Ok(())
}

fn handle_config_command(
    init: bool,
    show: bool,
    config: &Config,
    config_path: &Path,
) -> Result<()> {
    if init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if show || !init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

fn handle_portfolio_command(init: Option<&Path>) -> Result<()> {
    match init {
        Some(path) => {
            write_portfolio_template(path)?;
            println!("Wrote portfolio template to {}", path.display());
        }
        None => println!("{}", portfolio_template(&PortfolioSet::default())?),
    }
    Ok(())
}

fn load_portfolios(config: &Config) -> Result<PortfolioSet> {
    match config.portfolio_path() {
        Some(path) => {
            info!("loading portfolio from {}", path.display());
            load_portfolio_file(&path)
        }
        None => {
            info!("no portfolio configured, using sample initiatives");
            Ok(PortfolioSet::default())
        }
    }
}

fn exclude_initiatives(portfolio: &mut Portfolio<Initiative>, exclude: &[String]) -> Result<()> {
    for needle in exclude {
        let Some(id) = portfolio.find(needle).map(|item| item.id().clone()) else {
            warn!("no initiative named or with id {needle}, nothing excluded");
            continue;
        };
        portfolio.remove(&id)?;
    }
    Ok(())
}
