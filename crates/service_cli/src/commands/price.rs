//! Price command implementation
//!
//! Runs the scenario pricer on the resolved configuration and prints the
//! result as a table or as JSON.

use pricer_models::models::VarianceFloor;
use pricer_pricing::mc::{PayoffType, ScenarioDraw, ScenarioPricer, SimulationResult};
use serde::Serialize;
use tracing::info;

use crate::config::PricingConfig;
use crate::{CliError, Result};

/// Command-line overrides, applied after file and environment settings
#[derive(Debug, Clone, Default)]
pub struct PriceOverrides {
    /// Paths per scenario
    pub paths: Option<usize>,
    /// Number of scenarios
    pub scenarios: Option<usize>,
    /// Time steps
    pub steps: Option<usize>,
    /// Master seed
    pub seed: Option<u64>,
    /// Strike
    pub strike: Option<f64>,
    /// Variance floor policy
    pub floor: Option<VarianceFloor>,
    /// Payoff type
    pub payoff: Option<PayoffType>,
    /// Disable the rayon fan-out
    pub sequential: bool,
    /// Include raw samples in the output
    pub keep_samples: bool,
}

impl PriceOverrides {
    /// Apply the overrides to `config`
    pub fn apply(self, mut config: PricingConfig) -> PricingConfig {
        if let Some(paths) = self.paths {
            config.simulation.n_paths = paths;
        }
        if let Some(scenarios) = self.scenarios {
            config.simulation.n_scenarios = scenarios;
        }
        if let Some(steps) = self.steps {
            config.model.n_steps = steps;
        }
        if let Some(seed) = self.seed {
            config.simulation.seed = seed;
        }
        if let Some(strike) = self.strike {
            config.model.strike = strike;
        }
        if let Some(floor) = self.floor {
            config.simulation.variance_floor = floor;
        }
        if let Some(payoff) = self.payoff {
            config.simulation.payoff = payoff;
        }
        if self.sequential {
            config.simulation.parallel = false;
        }
        if self.keep_samples {
            config.simulation.keep_samples = true;
        }
        config
    }
}

/// JSON view of a pricing run
#[derive(Debug, Serialize)]
struct PriceReport<'a> {
    payoff: PayoffType,
    option_price: f64,
    price_standard_error: f64,
    expected_payoff: f64,
    standard_error: f64,
    confidence_95: f64,
    payoff_std_dev: f64,
    payoff_mode: f64,
    expected_terminal_price: f64,
    terminal_std_error: f64,
    terminal_std_dev: f64,
    price_mode: f64,
    n_steps: usize,
    sample_count: usize,
    total_steps: usize,
    elapsed_seconds: f64,
    draws: &'a [ScenarioDraw],
    #[serde(skip_serializing_if = "Option::is_none")]
    payoffs: Option<&'a [f64]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    terminal_prices: Option<&'a [f64]>,
}

impl<'a> PriceReport<'a> {
    fn new(payoff: PayoffType, result: &'a SimulationResult) -> Self {
        Self {
            payoff,
            option_price: result.option_price,
            price_standard_error: result.price_standard_error(),
            expected_payoff: result.expected_payoff,
            standard_error: result.standard_error,
            confidence_95: result.confidence_95(),
            payoff_std_dev: result.payoff_std_dev,
            payoff_mode: result.payoff_mode,
            expected_terminal_price: result.expected_terminal_price,
            terminal_std_error: result.terminal_std_error,
            terminal_std_dev: result.terminal_std_dev,
            price_mode: result.price_mode,
            n_steps: result.n_steps,
            sample_count: result.sample_count,
            total_steps: result.total_steps(),
            elapsed_seconds: result.elapsed_seconds(),
            draws: &result.draws,
            payoffs: result.payoffs.as_deref(),
            terminal_prices: result.terminal_prices.as_deref(),
        }
    }
}

/// Run the price command
pub fn run(config: &PricingConfig, format: &str) -> Result<()> {
    if !matches!(format, "table" | "json") {
        return Err(CliError::InvalidArgument(format!(
            "Unknown format: {}. Supported: json, table",
            format
        )));
    }

    config.validate()?;
    let params = config.heston_params()?;
    let distribution = config.correlation_distribution()?;
    let sim_config = config.simulation_config()?;

    info!("Starting pricing...");
    info!("  Spot / strike: {} / {}", params.spot(), params.strike());
    info!("  Steps: {} (dt = {:.6})", params.n_steps(), params.dt());
    info!(
        "  Paths: {} x {} scenarios",
        sim_config.n_paths(),
        sim_config.n_scenarios()
    );

    let payoff = sim_config.payoff();
    let result = ScenarioPricer::new(sim_config).price(&params, &distribution)?;

    match format {
        "json" => {
            let report = PriceReport::new(payoff, &result);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => print!("{}", render_table(payoff, &result)),
    }

    info!("Pricing complete");
    Ok(())
}

/// Human-readable summary of a pricing run
pub fn render_table(payoff: PayoffType, result: &SimulationResult) -> String {
    let rows = [
        (
            "Expected price".to_string(),
            format!(
                "{:.6} ± {:.6}",
                result.expected_terminal_price, result.terminal_std_error
            ),
        ),
        (
            "Expected payoff".to_string(),
            format!("{:.6} ± {:.6}", result.expected_payoff, result.standard_error),
        ),
        (
            format!("Option price ({})", payoff),
            format!(
                "{:.6} ± {:.6}",
                result.option_price,
                result.price_standard_error()
            ),
        ),
        (
            "Price mean/mode/std".to_string(),
            format!(
                "{:.4} / {:.4} / {:.4}",
                result.expected_terminal_price, result.price_mode, result.terminal_std_dev
            ),
        ),
        (
            "Payoff mean/mode/std".to_string(),
            format!(
                "{:.4} / {:.4} / {:.4}",
                result.expected_payoff, result.payoff_mode, result.payoff_std_dev
            ),
        ),
        ("Time steps".to_string(), result.n_steps.to_string()),
        ("Simulations".to_string(), result.sample_count.to_string()),
        ("Total samples".to_string(), result.total_steps().to_string()),
        (
            "Elapsed".to_string(),
            format!("{:.3} s", result.elapsed_seconds()),
        ),
    ];

    let mut out = String::new();
    out.push_str("\n┌──────────────────────┬────────────────────────────────┐\n");
    for (label, value) in rows.iter() {
        out.push_str(&format!("│ {:<20} │ {:<30} │\n", label, value));
    }
    out.push_str("├──────────────────────┼────────────────────────────────┤\n");
    for draw in &result.draws {
        out.push_str(&format!(
            "│ {:<20} │ {:<30} │\n",
            format!("Scenario {}", draw.scenario),
            format!("rho = {:+.4}", draw.rho)
        ));
    }
    out.push_str("└──────────────────────┴────────────────────────────────┘\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sample_result() -> SimulationResult {
        SimulationResult {
            expected_payoff: 0.1417,
            option_price: 0.1373,
            standard_error: 0.0019,
            payoff_std_dev: 0.24,
            payoff_mode: 0.01,
            expected_terminal_price: 2.064,
            terminal_std_dev: 0.266,
            terminal_std_error: 0.0021,
            price_mode: 1.97,
            discount_factor: 0.9686,
            sample_count: 16_000,
            n_steps: 400,
            elapsed: Duration::from_millis(1500),
            draws: vec![
                ScenarioDraw {
                    scenario: 0,
                    index: 1,
                    rho: -0.7,
                },
                ScenarioDraw {
                    scenario: 1,
                    index: 2,
                    rho: -0.9,
                },
            ],
            payoffs: None,
            terminal_prices: None,
        }
    }

    #[test]
    fn test_overrides_apply() {
        let overrides = PriceOverrides {
            paths: Some(10),
            steps: Some(25),
            floor: Some(VarianceFloor::Absorption),
            sequential: true,
            ..Default::default()
        };
        let config = overrides.apply(PricingConfig::default());

        assert_eq!(config.simulation.n_paths, 10);
        assert_eq!(config.model.n_steps, 25);
        assert_eq!(config.simulation.variance_floor, VarianceFloor::Absorption);
        assert!(!config.simulation.parallel);
        assert_eq!(config.simulation.n_scenarios, 4);
    }

    #[test]
    fn test_table_lists_every_scenario() {
        let table = render_table(PayoffType::Call, &sample_result());
        assert!(table.contains("Option price (call)"));
        assert!(table.contains("Scenario 0"));
        assert!(table.contains("rho = -0.9000"));
        assert!(table.contains("16000"));
    }

    #[test]
    fn test_table_reports_distribution_summary() {
        let table = render_table(PayoffType::Call, &sample_result());
        assert!(table.contains("2.0640 / 1.9700 / 0.2660"));
        assert!(table.contains("0.1417 / 0.0100 / 0.2400"));
        assert!(table.contains("Time steps"));
        assert!(table.contains("6400000"));
    }

    #[test]
    fn test_json_report_omits_absent_samples() {
        let result = sample_result();
        let json = serde_json::to_value(PriceReport::new(PayoffType::Call, &result)).unwrap();

        assert_eq!(json["sample_count"], 16_000);
        assert_eq!(json["payoff"], "call");
        assert_eq!(json["draws"].as_array().map(Vec::len), Some(2));
        assert_eq!(json["n_steps"], 400);
        assert_eq!(json["total_steps"], 6_400_000);
        assert_eq!(json["price_mode"], 1.97);
        assert_eq!(json["payoff_mode"], 0.01);
        assert_eq!(json["terminal_std_dev"], 0.266);
        assert!(json.get("payoffs").is_none());
    }

    #[test]
    fn test_unknown_format_rejected() {
        let err = run(&PricingConfig::default(), "xml").unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument(_)));
    }

    #[test]
    fn test_small_run_succeeds() {
        let config = PriceOverrides {
            paths: Some(200),
            scenarios: Some(2),
            steps: Some(10),
            ..Default::default()
        }
        .apply(PricingConfig::default());

        assert!(run(&config, "json").is_ok());
    }
}
