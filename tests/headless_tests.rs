//! Integration tests for headless scenario execution
//!
//! These tests verify that:
//! - Scenario JSON parses with defaults applied
//! - Invalid scenarios are rejected up front
//! - The built-in demo runs to completion with deterministic counts

use spellfx::headless::{run_scenario, ScenarioConfig, ScenarioStep};
use spellfx::registry::EffectRegistry;
use spellfx::FxError;
use std::path::PathBuf;

fn write_temp_scenario(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(name);
    std::fs::write(&path, contents).expect("temp scenario should write");
    path
}

#[test]
fn test_scenario_parses_with_defaults() {
    let path = write_temp_scenario(
        "spellfx_minimal_scenario.json",
        r#"{
            "casts": [
                {
                    "at": 0.0,
                    "effect": "Fireball",
                    "overrides": {
                        "origin": [-5.0, 1.0, 0.0],
                        "target": [5.0, 1.0, 0.0]
                    }
                }
            ]
        }"#,
    );
    let config = ScenarioConfig::load_from_file(&path).unwrap();
    assert_eq!(config.frame_rate, 60);
    assert_eq!(config.max_sim_secs, 30.0);
    assert_eq!(config.casts.len(), 1);
    assert!(config.schedule.is_empty());
    assert!(config.steps.is_empty());
    assert!(!config.casts[0].queued);
}

#[test]
fn test_scenario_steps_parse_by_op_tag() {
    let path = write_temp_scenario(
        "spellfx_steps_scenario.json",
        r#"{
            "steps": [
                { "op": "ExecuteRound", "at": 1.0, "round": 1, "event": 0 },
                { "op": "AdvanceRound", "at": 2.0 },
                { "op": "BreakConcentration", "at": 3.0, "caster_id": "wizard" }
            ]
        }"#,
    );
    let config = ScenarioConfig::load_from_file(&path).unwrap();
    assert_eq!(config.steps.len(), 3);
    assert!(matches!(
        config.steps[0],
        ScenarioStep::ExecuteRound { round: 1, event: 0, .. }
    ));
    assert_eq!(config.steps[2].at(), 3.0);
}

#[test]
fn test_invalid_frame_rate_is_rejected() {
    let path = write_temp_scenario(
        "spellfx_bad_scenario.json",
        r#"{ "frame_rate": 0 }"#,
    );
    let result = ScenarioConfig::load_from_file(&path);
    assert!(matches!(result, Err(FxError::Scenario { .. })));
}

#[test]
fn test_missing_scenario_file_is_an_error() {
    let result = ScenarioConfig::load_from_file(std::path::Path::new("no/such/scenario.json"));
    assert!(matches!(result, Err(FxError::Io { .. })));
}

#[test]
fn test_demo_scenario_runs_to_completion() {
    let registry = EffectRegistry::load_default().unwrap();
    let result = run_scenario(&registry, &ScenarioConfig::demo()).unwrap();

    // Fireball, the queued MagicMissile, and the scheduled Darkness cast
    assert_eq!(result.casts_completed, 3);
    assert_eq!(result.casts_stopped, 0);
    assert_eq!(result.persistents_created, 1);
    // Two round advancements outlive the 2-round Darkness
    assert_eq!(result.persistents_expired, 1);
    assert!(result.sim_time > 0.0);
    assert!(result.log_entries >= 6);
}

#[test]
fn test_demo_scenario_is_deterministic() {
    let registry = EffectRegistry::load_default().unwrap();
    let first = run_scenario(&registry, &ScenarioConfig::demo()).unwrap();
    let second = run_scenario(&registry, &ScenarioConfig::demo()).unwrap();
    assert_eq!(first.casts_completed, second.casts_completed);
    assert_eq!(first.persistents_created, second.persistents_created);
    assert_eq!(first.persistents_expired, second.persistents_expired);
    assert_eq!(first.log_entries, second.log_entries);
}

#[test]
fn test_scenario_log_is_written_to_output_path() {
    let registry = EffectRegistry::load_default().unwrap();
    let output = std::env::temp_dir().join("spellfx_scenario_log.json");
    let mut scenario = ScenarioConfig::demo();
    scenario.output_path = Some(output.display().to_string());
    run_scenario(&registry, &scenario).unwrap();

    let contents = std::fs::read_to_string(&output).expect("log file should exist");
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    let entries = parsed.as_array().expect("log file holds an entry array");
    assert!(!entries.is_empty());
    assert!(entries[0].get("event_type").is_some());
}
