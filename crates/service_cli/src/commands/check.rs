//! Check command implementation
//!
//! Validates the resolved configuration without running a simulation.

use pricer_models::analytical::BlackScholes;
use tracing::{info, warn};

use crate::config::PricingConfig;
use crate::Result;

/// Run the check command
pub fn run(config: &PricingConfig) -> Result<()> {
    info!("Checking configuration...");
    config.validate()?;

    let params = config.heston_params()?;
    let distribution = config.correlation_distribution()?;
    let sim_config = config.simulation_config()?;

    println!("Model");
    println!("  S0 = {}, K = {}, T = {}", params.spot(), params.strike(), params.maturity());
    println!(
        "  V0 = {}, kappa = {}, theta = {}, sigma = {}, r = {}",
        params.v0(),
        params.kappa(),
        params.theta(),
        params.sigma(),
        params.rate()
    );
    println!("  n = {} steps, dt = {:.6}", params.n_steps(), params.dt());
    println!(
        "  Feller ratio = {:.4} ({})",
        params.feller_ratio(),
        if params.satisfies_feller() {
            "satisfied"
        } else {
            "violated"
        }
    );
    if !params.satisfies_feller() {
        warn!(
            "Feller condition violated; {} floor will be active",
            sim_config.variance_floor()
        );
    }

    println!("Correlation");
    for (rho, p) in distribution.iter() {
        println!("  rho = {:+.4} with probability {:.4}", rho, p);
    }
    println!("  mean = {:+.4}", distribution.mean());

    println!("Simulation");
    println!(
        "  {} paths x {} scenarios = {} samples, seed {}",
        sim_config.n_paths(),
        sim_config.n_scenarios(),
        sim_config.total_samples(),
        sim_config.seed()
    );
    println!(
        "  floor = {}, payoff = {}, parallel = {}",
        sim_config.variance_floor(),
        sim_config.payoff(),
        sim_config.parallel()
    );

    if params.theta() > 0.0 {
        if let Ok(bs) = BlackScholes::new(params.spot(), params.rate(), params.theta().sqrt()) {
            println!(
                "  Black-Scholes call at long-run vol {:.4}: {:.6}",
                bs.volatility(),
                bs.price_call(params.strike(), params.maturity())
            );
        }
    }

    info!("Configuration OK");
    Ok(())
}
