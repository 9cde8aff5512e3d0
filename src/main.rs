//! SpellFX - spell and combat visual-effects engine
//!
//! Runs a headless scenario: loads the effect catalog, drives the caster
//! and timeline at a fixed timestep, and prints a summary.

use spellfx::cli;
use spellfx::headless::{run_scenario, ScenarioConfig};
use spellfx::registry::EffectRegistry;

fn main() {
    let args = cli::parse_args();

    let registry = match &args.catalog {
        Some(path) => EffectRegistry::load_from_file(&path.display().to_string()),
        None => EffectRegistry::load_default(),
    };
    let registry = match registry {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let mut scenario = match &args.scenario {
        Some(path) => match ScenarioConfig::load_from_file(path) {
            Ok(scenario) => scenario,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        None => {
            println!("No scenario supplied, running the built-in demo");
            ScenarioConfig::demo()
        }
    };
    if let Some(max) = args.max_duration {
        scenario.max_sim_secs = max;
    }
    if let Some(rate) = args.frame_rate {
        scenario.frame_rate = rate;
    }
    if let Some(output) = &args.output {
        scenario.output_path = Some(output.display().to_string());
    }

    match run_scenario(&registry, &scenario) {
        Ok(result) => {
            println!("Scenario complete in {:.2}s simulated", result.sim_time);
            println!("  casts completed:     {}", result.casts_completed);
            println!("  casts stopped:       {}", result.casts_stopped);
            println!("  persistents created: {}", result.persistents_created);
            println!("  persistents expired: {}", result.persistents_expired);
            println!("  journal entries:     {}", result.log_entries);
        }
        Err(e) => {
            eprintln!("Scenario failed: {}", e);
            std::process::exit(1);
        }
    }
}
