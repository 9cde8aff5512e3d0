//! Headless scenario execution
//!
//! Runs a scenario at a fixed timestep with no graphical output,
//! suitable for automated testing. The caster and timeline are driven
//! directly, without a windowed app.

use bevy::prelude::*;

use crate::caster::{CastOptions, EffectCaster};
use crate::error::FxError;
use crate::log::{FxLog, FxLogEventType};
use crate::registry::EffectRegistry;
use crate::timeline::EffectTimeline;

use super::scenario::{ScenarioConfig, ScenarioStep};

/// Result of a completed headless run, counted from the merged journal.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Total simulated time in seconds
    pub sim_time: f32,
    pub casts_completed: usize,
    pub casts_stopped: usize,
    pub persistents_created: usize,
    pub persistents_expired: usize,
    /// Total journal entries across caster and timeline
    pub log_entries: usize,
}

/// Run a scenario to completion: fire scripted casts and timeline
/// operations at their times, tick at the fixed framerate until the
/// caster drains and the simulation horizon passes, then summarize the
/// merged journal.
pub fn run_scenario(
    registry: &EffectRegistry,
    config: &ScenarioConfig,
) -> Result<ScenarioResult, FxError> {
    let mut caster = EffectCaster::new();
    let mut timeline = EffectTimeline::new();

    for entry in &config.schedule {
        timeline.schedule_animation(
            entry.round,
            entry.event,
            &entry.effect,
            entry.overrides.clone(),
            entry.persistence.clone(),
        );
    }

    // Stable firing order regardless of authoring order
    let mut cast_order: Vec<usize> = (0..config.casts.len()).collect();
    cast_order.sort_by(|&a, &b| config.casts[a].at.total_cmp(&config.casts[b].at));
    let mut step_order: Vec<usize> = (0..config.steps.len()).collect();
    step_order.sort_by(|&a, &b| config.steps[a].at().total_cmp(&config.steps[b].at()));
    let mut next_cast = 0;
    let mut next_step = 0;

    let dt = 1.0 / config.frame_rate as f32;
    let mut sim_time = 0.0_f32;

    loop {
        while next_cast < cast_order.len() {
            let cast = &config.casts[cast_order[next_cast]];
            if cast.at > sim_time {
                break;
            }
            let options = CastOptions::delayed(cast.delay);
            if cast.queued {
                caster.queue_cast(&cast.effect, cast.overrides.clone(), options);
            } else if let Err(e) =
                caster.cast(registry, &cast.effect, cast.overrides.clone(), options)
            {
                warn!("scenario cast '{}' failed: {}", cast.effect, e);
            }
            next_cast += 1;
        }

        while next_step < step_order.len() {
            let step = &config.steps[step_order[next_step]];
            if step.at() > sim_time {
                break;
            }
            match step {
                ScenarioStep::ExecuteRound { round, event, .. } => {
                    timeline.execute_events_for_round(*round, *event, registry, &mut caster);
                }
                ScenarioStep::AdvanceRound { .. } => timeline.advance_round(),
                ScenarioStep::AdvanceEvent { .. } => timeline.advance_event(),
                ScenarioStep::BreakConcentration { caster_id, .. } => {
                    timeline.break_concentration(caster_id);
                }
            }
            next_step += 1;
        }

        caster.tick(dt, registry);
        timeline.tick(dt, registry);
        sim_time += dt;

        let script_done = next_cast >= cast_order.len() && next_step >= step_order.len();
        if sim_time >= config.max_sim_secs || (script_done && caster.is_idle()) {
            break;
        }
    }

    let mut merged = FxLog::default();
    merged.sim_time = sim_time;
    merged.extend_from(&caster.log);
    merged.extend_from(&timeline.log);

    if let Some(path) = &config.output_path {
        merged.save_to_file(path)?;
        info!("Scenario log written to {}", path);
    }

    Ok(ScenarioResult {
        sim_time,
        casts_completed: merged.count(FxLogEventType::CastComplete),
        casts_stopped: merged.count(FxLogEventType::CastStopped),
        persistents_created: merged.count(FxLogEventType::PersistentCreated),
        persistents_expired: merged.count(FxLogEventType::PersistentExpired),
        log_entries: merged.entries.len(),
    })
}
