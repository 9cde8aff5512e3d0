//! Combat-timeline scheduling: effects keyed to (round, event)
//! coordinates, plus persistent effects whose lifetime is measured in
//! wall seconds, elapsed rounds, or elapsed events.
//!
//! Counter-based persistents never expire from the passage of frame time
//! alone; only round/event advancement retires them. Expiry checks are
//! pure predicates so the cleanup sweep stays the single mutation point.

use bevy::prelude::*;
use serde::Deserialize;

use crate::caster::{CastHandle, CastOptions, EffectCaster};
use crate::effects::config::DurationType;
use crate::effects::{CounterExpiry, EffectInstance, EffectOverrides};
use crate::log::{FxLog, FxLogEventType};
use crate::registry::EffectRegistry;

/// Identifier for a scheduled timeline event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventId(u64);

/// Identifier for a live persistent effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EffectId(u64);

/// Declares that a scheduled effect leaves a lingering presence behind
/// once its initial cast resolves.
#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceSpec {
    pub duration_type: DurationType,
    /// Seconds, rounds, or events, per `duration_type`
    pub duration: f32,
    #[serde(default)]
    pub magnitude: f32,
    /// Concentration effects drop when their caster's concentration breaks
    #[serde(default)]
    pub concentration: bool,
    #[serde(default)]
    pub caster_id: Option<String>,
}

/// One effect scheduled against a timeline coordinate.
pub struct ScheduledEvent {
    pub id: EventId,
    pub round: u32,
    pub event: u32,
    pub effect: String,
    pub overrides: EffectOverrides,
    pub persistence: Option<PersistenceSpec>,
    pub completed: bool,
    pub completed_at: Option<f32>,
    handle: Option<CastHandle>,
}

/// A lingering effect materialized from a resolved scheduled cast.
pub struct PersistentEffect {
    pub id: EffectId,
    pub effect: String,
    pub instance: EffectInstance,
    pub created_at: f32,
    pub created_at_round: u32,
    pub created_at_event: u32,
    pub duration_type: DurationType,
    pub duration: f32,
    pub magnitude: f32,
    pub concentration: bool,
    pub caster_id: Option<String>,
}

impl PersistentEffect {
    /// Pure expiry predicate against the current clock and counters.
    pub fn is_expired(&self, now: f32, round: u32, event: u32) -> bool {
        match self.duration_type {
            DurationType::Time => now - self.created_at >= self.duration,
            DurationType::Rounds => {
                round.saturating_sub(self.created_at_round) as f32 >= self.duration
            }
            DurationType::Events => {
                event.saturating_sub(self.created_at_event) as f32 >= self.duration
            }
        }
    }
}

/// Timeline scheduler. Owns the scheduled-event list and the persistent
/// registry for one combat session.
#[derive(Resource)]
pub struct EffectTimeline {
    current_round: u32,
    current_event: u32,
    clock: f32,
    scheduled: Vec<ScheduledEvent>,
    persistent: Vec<PersistentEffect>,
    next_event_id: u64,
    next_effect_id: u64,
    /// Structured timeline journal
    pub log: FxLog,
}

impl Default for EffectTimeline {
    fn default() -> Self {
        Self {
            current_round: 1,
            current_event: 0,
            clock: 0.0,
            scheduled: Vec::new(),
            persistent: Vec::new(),
            next_event_id: 0,
            next_effect_id: 0,
            log: FxLog::default(),
        }
    }
}

impl EffectTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Scheduling
    // ========================================================================

    /// Register an effect to fire when the timeline reaches the given
    /// round/event coordinate.
    pub fn schedule_animation(
        &mut self,
        round: u32,
        event: u32,
        effect: &str,
        overrides: EffectOverrides,
        persistence: Option<PersistenceSpec>,
    ) -> EventId {
        if let Some(spec) = &persistence {
            if spec.concentration && spec.caster_id.is_none() {
                warn!(
                    "scheduled '{}' is concentration but has no caster id; \
                     it cannot be broken",
                    effect
                );
            }
        }
        let id = EventId(self.next_event_id);
        self.next_event_id += 1;
        self.scheduled.push(ScheduledEvent {
            id,
            round,
            event,
            effect: effect.to_string(),
            overrides,
            persistence,
            completed: false,
            completed_at: None,
            handle: None,
        });
        self.log.log(
            FxLogEventType::Scheduled,
            format!("Scheduled '{}' at round {} event {}", effect, round, event),
        );
        id
    }

    /// Fire every uncompleted event registered at (round, event),
    /// dispatching each through the caster. Also adopts the coordinate as
    /// the timeline's current position. A failed dispatch marks its event
    /// completed and never aborts the batch.
    pub fn execute_events_for_round(
        &mut self,
        round: u32,
        event: u32,
        registry: &EffectRegistry,
        caster: &mut EffectCaster,
    ) {
        self.current_round = round;
        self.current_event = event;
        for ev in self
            .scheduled
            .iter_mut()
            .filter(|ev| ev.round == round && ev.event == event && !ev.completed)
        {
            if ev.handle.is_some() {
                continue;
            }
            match caster.cast(
                registry,
                &ev.effect,
                ev.overrides.clone(),
                CastOptions::default(),
            ) {
                Ok(handle) => {
                    ev.handle = Some(handle);
                    self.log.log(
                        FxLogEventType::EventExecuted,
                        format!(
                            "Executed '{}' at round {} event {}",
                            ev.effect, round, event
                        ),
                    );
                }
                Err(e) => {
                    warn!("scheduled cast '{}' failed: {}", ev.effect, e);
                    ev.completed = true;
                    ev.completed_at = Some(self.clock);
                }
            }
        }
        self.cleanup_expired_effects();
    }

    // ========================================================================
    // Frame tick
    // ========================================================================

    /// Advance the timeline clock, animate persistent visuals, and
    /// materialize persistents from scheduled casts whose handles
    /// resolved this frame.
    pub fn tick(&mut self, dt: f32, registry: &EffectRegistry) {
        self.clock += dt;
        self.log.sim_time = self.clock;

        for effect in self.persistent.iter_mut() {
            effect.instance.tick(dt);
        }

        let mut materialized: Vec<(usize, EffectId)> = Vec::new();
        for idx in 0..self.scheduled.len() {
            let resolved = self.scheduled[idx]
                .handle
                .as_ref()
                .map(|h| h.is_resolved())
                .unwrap_or(false);
            if !resolved || self.scheduled[idx].completed {
                continue;
            }
            self.scheduled[idx].completed = true;
            self.scheduled[idx].completed_at = Some(self.clock);
            if self.scheduled[idx].persistence.is_some() {
                let id = EffectId(self.next_effect_id);
                self.next_effect_id += 1;
                materialized.push((idx, id));
            }
        }
        for (idx, id) in materialized {
            if let Err(e) = self.materialize_persistent(idx, id, registry) {
                warn!(
                    "could not materialize persistent '{}': {}",
                    self.scheduled[idx].effect, e
                );
            }
        }

        self.cleanup_expired_effects();
    }

    /// Spin up the lingering instance for a resolved scheduled cast.
    /// Creation stamps use the event's own coordinate, not the current
    /// one, so persistents are attributed to the round that cast them.
    fn materialize_persistent(
        &mut self,
        idx: usize,
        id: EffectId,
        registry: &EffectRegistry,
    ) -> Result<(), crate::error::FxError> {
        let ev = &self.scheduled[idx];
        let Some(spec) = ev.persistence.clone() else {
            return Ok(());
        };
        let mut instance = registry.create(&ev.effect, &ev.overrides)?;
        match spec.duration_type {
            DurationType::Time => instance.set_duration_override(spec.duration),
            DurationType::Rounds | DurationType::Events => {
                // Visuals run until the counter sweep retires them
                instance.set_duration_override(f32::INFINITY);
                instance.set_counter_expiry(CounterExpiry {
                    duration_type: spec.duration_type,
                    duration: spec.duration,
                    created_round: ev.round,
                    created_event: ev.event,
                });
            }
        }
        instance.play();
        self.log.log(
            FxLogEventType::PersistentCreated,
            format!(
                "Persistent '{}' created at round {} event {} ({:?} {})",
                ev.effect, ev.round, ev.event, spec.duration_type, spec.duration
            ),
        );
        self.persistent.push(PersistentEffect {
            id,
            effect: ev.effect.clone(),
            instance,
            created_at: self.clock,
            created_at_round: ev.round,
            created_at_event: ev.event,
            duration_type: spec.duration_type,
            duration: spec.duration,
            magnitude: spec.magnitude,
            concentration: spec.concentration,
            caster_id: spec.caster_id,
        });
        Ok(())
    }

    // ========================================================================
    // Counter advancement
    // ========================================================================

    /// Advance to the next round. The event counter is independent and
    /// keeps its value.
    pub fn advance_round(&mut self) {
        self.current_round += 1;
        self.cleanup_expired_effects();
    }

    pub fn advance_event(&mut self) {
        self.current_event += 1;
        self.cleanup_expired_effects();
    }

    /// Jump the timeline to an arbitrary coordinate, for rewinds and
    /// catch-up. Both counters move together.
    pub fn set_current_round(&mut self, round: u32, event: u32) {
        self.current_round = round;
        self.current_event = event;
        self.cleanup_expired_effects();
    }

    /// Retire every persistent whose expiry predicate holds at the
    /// current clock and counters.
    pub fn cleanup_expired_effects(&mut self) {
        let now = self.clock;
        let round = self.current_round;
        let event = self.current_event;
        let log = &mut self.log;
        self.persistent.retain_mut(|effect| {
            let expired =
                effect.is_expired(now, round, event) || effect.instance.is_expired(round, event);
            if expired {
                effect.instance.stop();
                log.log(
                    FxLogEventType::PersistentExpired,
                    format!("Persistent '{}' expired", effect.effect),
                );
            }
            !expired
        });
    }

    // ========================================================================
    // Removal
    // ========================================================================

    /// Drop every concentration persistent held by the given caster.
    /// Returns how many were broken.
    pub fn break_concentration(&mut self, caster_id: &str) -> usize {
        let log = &mut self.log;
        let before = self.persistent.len();
        self.persistent.retain_mut(|effect| {
            let breaks = effect.concentration
                && effect.caster_id.as_deref() == Some(caster_id);
            if breaks {
                effect.instance.stop();
                log.log(
                    FxLogEventType::ConcentrationBroken,
                    format!("Persistent '{}' dropped ({})", effect.effect, caster_id),
                );
            }
            !breaks
        });
        before - self.persistent.len()
    }

    /// Cancel a scheduled event before it fires. Returns false for
    /// unknown or already-dispatched events.
    pub fn cancel_event(&mut self, id: EventId) -> bool {
        let Some(pos) = self
            .scheduled
            .iter()
            .position(|ev| ev.id == id && ev.handle.is_none() && !ev.completed)
        else {
            return false;
        };
        let ev = self.scheduled.remove(pos);
        self.log.log(
            FxLogEventType::EventCancelled,
            format!("Cancelled '{}'", ev.effect),
        );
        true
    }

    /// Remove a live persistent early.
    pub fn remove_effect(&mut self, id: EffectId) -> bool {
        let Some(pos) = self.persistent.iter().position(|e| e.id == id) else {
            return false;
        };
        let mut effect = self.persistent.remove(pos);
        effect.instance.stop();
        self.log.log(
            FxLogEventType::PersistentRemoved,
            format!("Persistent '{}' removed", effect.effect),
        );
        true
    }

    // ========================================================================
    // Queries & lifecycle
    // ========================================================================

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn current_event(&self) -> u32 {
        self.current_event
    }

    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn scheduled_events(&self) -> &[ScheduledEvent] {
        &self.scheduled
    }

    /// Scheduled events registered at one coordinate, fired or not.
    pub fn events_for_round(&self, round: u32, event: u32) -> Vec<&ScheduledEvent> {
        self.scheduled
            .iter()
            .filter(|ev| ev.round == round && ev.event == event)
            .collect()
    }

    pub fn active_persistent_effects(&self) -> &[PersistentEffect] {
        &self.persistent
    }

    /// Live persistents held by one caster, concentration or not.
    pub fn effects_for_caster(&self, caster_id: &str) -> Vec<&PersistentEffect> {
        self.persistent
            .iter()
            .filter(|e| e.caster_id.as_deref() == Some(caster_id))
            .collect()
    }

    pub fn persistent_count(&self) -> usize {
        self.persistent.len()
    }

    /// Stop everything and rewind to the given coordinate, keeping the
    /// journal.
    pub fn reset(&mut self, round: u32, event: u32) {
        for effect in &mut self.persistent {
            effect.instance.stop();
        }
        self.persistent.clear();
        self.scheduled.clear();
        self.current_round = round;
        self.current_event = event;
        self.clock = 0.0;
    }

    /// Full wipe, journal included.
    pub fn clear(&mut self) {
        self.reset(1, 0);
        self.log.clear();
    }
}
