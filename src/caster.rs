//! Cast orchestration: single, sequential, parallel, staggered, and
//! queued casts over effect instances, with completion handles.
//!
//! Completion is exposed as a [`CastHandle`] the frame tick resolves
//! directly when the instance finishes — callers observe `is_resolved()`
//! instead of polling the frame loop. Handles never hang: a stopped or
//! failed cast still resolves, flagged as stopped.
//!
//! Execution is single-threaded and cooperative; the handle state is
//! atomic only because Bevy resources must be `Send + Sync`.

use bevy::prelude::*;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::effects::config::{CompleteHook, StartHook, UpdateHook};
use crate::effects::{EffectInstance, EffectOverrides, TickOutcome};
use crate::error::FxError;
use crate::log::{FxLog, FxLogEventType};
use crate::registry::EffectRegistry;

pub type ErrorHook = Box<dyn FnMut(&FxError) + Send + Sync>;

// ============================================================================
// Completion handles
// ============================================================================

#[derive(Debug, Default)]
struct HandleState {
    resolved: AtomicBool,
    stopped: AtomicBool,
}

impl HandleState {
    fn resolve_complete(&self) {
        self.resolved.store(true, Ordering::Release);
    }

    fn resolve_stopped(&self) {
        self.stopped.store(true, Ordering::Release);
        self.resolved.store(true, Ordering::Release);
    }
}

/// Completion future for a single cast. Cheap to clone; resolved exactly
/// once by the caster's tick (or immediately, for failed and zero-length
/// casts).
#[derive(Debug, Clone, Default)]
pub struct CastHandle(Arc<HandleState>);

impl CastHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the cast finished, was stopped, or failed.
    pub fn is_resolved(&self) -> bool {
        self.0.resolved.load(Ordering::Acquire)
    }

    /// True when the cast was stopped (or failed) rather than completing.
    pub fn was_stopped(&self) -> bool {
        self.0.stopped.load(Ordering::Acquire)
    }

    /// True when the cast ran to visual completion.
    pub fn is_complete(&self) -> bool {
        self.is_resolved() && !self.was_stopped()
    }

    pub(crate) fn resolve_complete(&self) {
        self.0.resolve_complete();
    }

    pub(crate) fn resolve_stopped(&self) {
        self.0.resolve_stopped();
    }
}

/// Completion future for a batch (sequence, parallel, staggered, or
/// wait-for-all). Resolves once every member resolves.
#[derive(Debug, Clone, Default)]
pub struct CastGroupHandle(Arc<HandleState>);

impl CastGroupHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_resolved(&self) -> bool {
        self.0.resolved.load(Ordering::Acquire)
    }

    pub fn was_stopped(&self) -> bool {
        self.0.stopped.load(Ordering::Acquire)
    }

    fn resolve_complete(&self) {
        self.0.resolve_complete();
    }

    fn resolve_stopped(&self) {
        self.0.resolve_stopped();
    }
}

// ============================================================================
// Cast options & requests
// ============================================================================

/// Identifier for one tracked cast, for targeted stop/retarget control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CastId(u64);

/// Per-cast options: start delay, cleanup policy, and caller lifecycle
/// callbacks. Caller callbacks run in addition to any hooks the instance
/// itself owns.
pub struct CastOptions {
    /// Seconds to wait before the first play
    pub delay: f32,
    /// Remove the cast from the active set once resolved (default true)
    pub auto_cleanup: bool,
    pub on_start: Option<StartHook>,
    pub on_update: Option<UpdateHook>,
    pub on_complete: Option<CompleteHook>,
    /// Invoked with creation failures before they propagate
    pub on_error: Option<ErrorHook>,
}

impl Default for CastOptions {
    fn default() -> Self {
        Self {
            delay: 0.0,
            auto_cleanup: true,
            on_start: None,
            on_update: None,
            on_complete: None,
            on_error: None,
        }
    }
}

impl CastOptions {
    pub fn delayed(delay: f32) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    pub fn keep_after_completion(mut self) -> Self {
        self.auto_cleanup = false;
        self
    }

    pub fn with_on_start(mut self, f: impl FnMut() + Send + Sync + 'static) -> Self {
        self.on_start = Some(Box::new(f));
        self
    }

    pub fn with_on_update(mut self, f: impl FnMut(f32) + Send + Sync + 'static) -> Self {
        self.on_update = Some(Box::new(f));
        self
    }

    pub fn with_on_complete(mut self, f: impl FnMut() + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub fn with_on_error(mut self, f: impl FnMut(&FxError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }
}

/// One cast in a batch operation.
pub struct CastRequest {
    pub name: String,
    pub overrides: EffectOverrides,
    pub options: CastOptions,
}

impl CastRequest {
    pub fn new(name: &str, overrides: EffectOverrides) -> Self {
        Self {
            name: name.to_string(),
            overrides,
            options: CastOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CastOptions) -> Self {
        self.options = options;
        self
    }
}

// ============================================================================
// Internal bookkeeping
// ============================================================================

struct ActiveCast {
    id: CastId,
    instance: EffectInstance,
    handle: CastHandle,
    delay_remaining: f32,
    started: bool,
    auto_cleanup: bool,
    on_start: Option<StartHook>,
    on_update: Option<UpdateHook>,
    on_complete: Option<CompleteHook>,
}

struct SequenceState {
    pending: VecDeque<CastRequest>,
    next_index: usize,
    stagger: f32,
    current: Option<CastHandle>,
    group: CastGroupHandle,
}

struct PendingGroup {
    members: Vec<CastHandle>,
    handle: CastGroupHandle,
}

struct QueuedCast {
    request: CastRequest,
    handle: CastHandle,
}

// ============================================================================
// The caster
// ============================================================================

/// Cast orchestrator. A constructible service: each combat session owns
/// its own, so sessions and tests never share active-cast state.
#[derive(Resource, Default)]
pub struct EffectCaster {
    active: Vec<ActiveCast>,
    queue: VecDeque<QueuedCast>,
    sequences: Vec<SequenceState>,
    groups: Vec<PendingGroup>,
    /// Drain guard: at most one queued cast runs at a time
    processing_queue: bool,
    current_queued: Option<CastHandle>,
    next_id: u64,
    clock: f32,
    /// Structured cast journal
    pub log: FxLog,
}

impl EffectCaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatch a single cast. The returned handle resolves when the
    /// instance finishes (or is stopped). Creation failures invoke
    /// `options.on_error`, resolve the would-be handle as stopped, and
    /// propagate.
    pub fn cast(
        &mut self,
        registry: &EffectRegistry,
        name: &str,
        overrides: EffectOverrides,
        options: CastOptions,
    ) -> Result<CastHandle, FxError> {
        let handle = CastHandle::new();
        self.cast_with_handle(registry, name, overrides, options, handle.clone())?;
        Ok(handle)
    }

    /// Like [`cast`](Self::cast), also returning a [`CastId`] for targeted
    /// control (stop, retarget) while in flight.
    pub fn cast_with_control(
        &mut self,
        registry: &EffectRegistry,
        name: &str,
        overrides: EffectOverrides,
        options: CastOptions,
    ) -> Result<(CastId, CastHandle), FxError> {
        let handle = CastHandle::new();
        let id = self.cast_with_handle(registry, name, overrides, options, handle.clone())?;
        Ok((id, handle))
    }

    fn cast_with_handle(
        &mut self,
        registry: &EffectRegistry,
        name: &str,
        overrides: EffectOverrides,
        mut options: CastOptions,
        handle: CastHandle,
    ) -> Result<CastId, FxError> {
        let instance = match registry.create(name, &overrides) {
            Ok(instance) => instance,
            Err(e) => {
                if let Some(f) = options.on_error.as_mut() {
                    f(&e);
                }
                // A failed cast's future still resolves
                handle.resolve_stopped();
                return Err(e);
            }
        };
        Ok(self.admit(instance, options, handle))
    }

    fn admit(&mut self, instance: EffectInstance, options: CastOptions, handle: CastHandle) -> CastId {
        let id = CastId(self.next_id);
        self.next_id += 1;
        self.log.log(
            FxLogEventType::Cast,
            format!("Cast '{}' dispatched", instance.name()),
        );

        let mut cast = ActiveCast {
            id,
            instance,
            handle,
            delay_remaining: options.delay.max(0.0),
            started: false,
            auto_cleanup: options.auto_cleanup,
            on_start: options.on_start,
            on_update: options.on_update,
            on_complete: options.on_complete,
        };
        if cast.delay_remaining <= 0.0 {
            Self::start_cast(&mut cast, &mut self.log);
        }
        if !(cast.auto_cleanup && cast.handle.is_resolved()) {
            self.active.push(cast);
        }
        id
    }

    /// Play an admitted cast and fire caller start hooks. Zero-duration
    /// effects complete inside their immediate first tick, so the handle
    /// can resolve before this returns.
    fn start_cast(cast: &mut ActiveCast, log: &mut FxLog) {
        cast.started = true;
        cast.instance.play();
        if let Some(f) = cast.on_start.as_mut() {
            f();
        }
        if let Some(f) = cast.on_update.as_mut() {
            f(cast.instance.progress());
        }
        if !cast.instance.is_animating() {
            if let Some(f) = cast.on_complete.as_mut() {
                f();
            }
            cast.handle.resolve_complete();
            log.log(
                FxLogEventType::CastComplete,
                format!("Cast '{}' completed", cast.instance.name()),
            );
        }
    }

    // ========================================================================
    // Batch casting
    // ========================================================================

    /// Cast in strict order: cast k+1 is not dispatched until cast k's
    /// handle resolves, and cast k's delay additionally gains
    /// `k * stagger` seconds. Guarantees start order, not completion
    /// order.
    pub fn cast_sequence(
        &mut self,
        registry: &EffectRegistry,
        casts: Vec<CastRequest>,
        stagger: f32,
    ) -> CastGroupHandle {
        let group = CastGroupHandle::new();
        let mut seq = SequenceState {
            pending: casts.into(),
            next_index: 0,
            stagger,
            current: None,
            group: group.clone(),
        };
        self.advance_sequence(&mut seq, registry);
        if !seq.group.is_resolved() {
            self.sequences.push(seq);
        }
        group
    }

    /// Start every cast now, resolving once all of them resolve.
    pub fn cast_parallel(
        &mut self,
        registry: &EffectRegistry,
        casts: Vec<CastRequest>,
    ) -> CastGroupHandle {
        self.cast_staggered(registry, casts, 0.0)
    }

    /// Start every cast now, adding `index * stagger` seconds to each
    /// cast's delay.
    pub fn cast_staggered(
        &mut self,
        registry: &EffectRegistry,
        casts: Vec<CastRequest>,
        stagger: f32,
    ) -> CastGroupHandle {
        let group = CastGroupHandle::new();
        let mut members = Vec::with_capacity(casts.len());
        for (index, mut request) in casts.into_iter().enumerate() {
            request.options.delay += stagger * index as f32;
            match self.cast(registry, &request.name, request.overrides, request.options) {
                Ok(handle) => members.push(handle),
                Err(e) => {
                    // One failed cast never aborts the batch
                    warn!("batch cast '{}' failed: {}", request.name, e);
                }
            }
        }
        self.groups.push(PendingGroup {
            members,
            handle: group.clone(),
        });
        group
    }

    /// Append to the cast queue. A single consumer drains it one cast at
    /// a time; each queued cast plays to resolution before the next
    /// starts.
    pub fn queue_cast(
        &mut self,
        name: &str,
        overrides: EffectOverrides,
        options: CastOptions,
    ) -> CastHandle {
        let handle = CastHandle::new();
        self.queue.push_back(QueuedCast {
            request: CastRequest {
                name: name.to_string(),
                overrides,
                options,
            },
            handle: handle.clone(),
        });
        handle
    }

    /// A handle resolving once every currently-active cast resolves.
    /// Starts nothing; an idle caster resolves immediately.
    pub fn wait_for_all(&mut self) -> CastGroupHandle {
        let group = CastGroupHandle::new();
        let members: Vec<CastHandle> = self
            .active
            .iter()
            .filter(|c| !c.handle.is_resolved())
            .map(|c| c.handle.clone())
            .collect();
        if members.is_empty() {
            group.resolve_complete();
        } else {
            self.groups.push(PendingGroup {
                members,
                handle: group.clone(),
            });
        }
        group
    }

    // ========================================================================
    // Control
    // ========================================================================

    /// Stop and clear every active cast. Handles resolve as stopped
    /// (completion callbacks do not fire); pending queue entries and
    /// unstarted sequence tails are abandoned.
    pub fn stop_all(&mut self) {
        for cast in &mut self.active {
            if !cast.handle.is_resolved() {
                cast.instance.stop();
                cast.handle.resolve_stopped();
                self.log.log(
                    FxLogEventType::CastStopped,
                    format!("Cast '{}' stopped", cast.instance.name()),
                );
            }
        }
        self.active.clear();
        for seq in &self.sequences {
            seq.group.resolve_stopped();
        }
        self.sequences.clear();
        for queued in &self.queue {
            queued.handle.resolve_stopped();
        }
        self.queue.clear();
        self.processing_queue = false;
        self.current_queued = None;
        for group in &self.groups {
            group.handle.resolve_stopped();
        }
        self.groups.clear();
    }

    /// Stop one in-flight cast by id. Returns false for unknown ids.
    pub fn stop_cast(&mut self, id: CastId) -> bool {
        let Some(cast) = self.active.iter_mut().find(|c| c.id == id) else {
            return false;
        };
        if !cast.handle.is_resolved() {
            cast.instance.stop();
            cast.handle.resolve_stopped();
            self.log.log(
                FxLogEventType::CastStopped,
                format!("Cast '{}' stopped", cast.instance.name()),
            );
        }
        self.active.retain(|c| !(c.auto_cleanup && c.handle.is_resolved()));
        true
    }

    /// Live-retarget an in-flight cast's destination.
    pub fn retarget(&mut self, id: CastId, target: Vec3) -> bool {
        match self.active.iter_mut().find(|c| c.id == id) {
            Some(cast) => {
                cast.instance.retarget(target);
                true
            }
            None => false,
        }
    }

    pub fn progress_of(&self, id: CastId) -> Option<f32> {
        self.active
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.instance.progress())
    }

    /// True while any tracked cast has not resolved.
    pub fn is_animating(&self) -> bool {
        self.active.iter().any(|c| !c.handle.is_resolved())
    }

    /// True once nothing is in flight, queued, or sequenced.
    pub fn is_idle(&self) -> bool {
        !self.is_animating() && self.queue.is_empty() && self.sequences.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|c| !c.handle.is_resolved()).count()
    }

    /// Names of unresolved casts, in dispatch order.
    pub fn active_animations(&self) -> Vec<String> {
        self.active
            .iter()
            .filter(|c| !c.handle.is_resolved())
            .map(|c| c.instance.name().to_string())
            .collect()
    }

    /// Drop resolved casts kept by `auto_cleanup: false`.
    pub fn clear_finished(&mut self) {
        self.active.retain(|c| !c.handle.is_resolved());
    }

    pub fn clock(&self) -> f32 {
        self.clock
    }

    // ========================================================================
    // Frame tick
    // ========================================================================

    /// Advance one frame: run delays, tick playing instances, resolve
    /// handles, advance sequences, drain the queue, settle group handles.
    pub fn tick(&mut self, dt: f32, registry: &EffectRegistry) {
        self.clock += dt;
        self.log.sim_time = self.clock;

        for cast in self.active.iter_mut() {
            if cast.handle.is_resolved() {
                continue;
            }
            if !cast.started {
                cast.delay_remaining -= dt;
                if cast.delay_remaining <= 0.0 {
                    Self::start_cast(cast, &mut self.log);
                }
                continue;
            }
            match cast.instance.tick(dt) {
                TickOutcome::Playing(progress) => {
                    if let Some(f) = cast.on_update.as_mut() {
                        f(progress);
                    }
                }
                TickOutcome::Completed => {
                    if let Some(f) = cast.on_update.as_mut() {
                        f(1.0);
                    }
                    if let Some(f) = cast.on_complete.as_mut() {
                        f();
                    }
                    cast.handle.resolve_complete();
                    self.log.log(
                        FxLogEventType::CastComplete,
                        format!("Cast '{}' completed", cast.instance.name()),
                    );
                }
                TickOutcome::Idle => {
                    // Externally halted instance: resolve rather than hang
                    cast.handle.resolve_stopped();
                }
            }
        }
        self.active.retain(|c| !(c.auto_cleanup && c.handle.is_resolved()));

        // Sequences: start the next cast once the current one resolves
        let mut sequences = std::mem::take(&mut self.sequences);
        for seq in &mut sequences {
            self.advance_sequence(seq, registry);
        }
        sequences.retain(|s| !s.group.is_resolved());
        self.sequences = sequences;

        // Queue: single consumer, one cast at a time
        if self.processing_queue {
            let current_done = self
                .current_queued
                .as_ref()
                .map(|h| h.is_resolved())
                .unwrap_or(true);
            if current_done {
                self.start_next_queued(registry);
            }
        } else if !self.queue.is_empty() {
            self.processing_queue = true;
            self.start_next_queued(registry);
        }

        // Group handles resolve once every member has
        for group in &self.groups {
            if group.handle.is_resolved() {
                continue;
            }
            if group.members.iter().all(|m| m.is_resolved()) {
                let all_stopped =
                    !group.members.is_empty() && group.members.iter().all(|m| m.was_stopped());
                if all_stopped {
                    group.handle.resolve_stopped();
                } else {
                    group.handle.resolve_complete();
                }
            }
        }
        self.groups.retain(|g| !g.handle.is_resolved());
    }

    fn advance_sequence(&mut self, seq: &mut SequenceState, registry: &EffectRegistry) {
        loop {
            if let Some(current) = &seq.current {
                if !current.is_resolved() {
                    return;
                }
            }
            let Some(mut request) = seq.pending.pop_front() else {
                seq.group.resolve_complete();
                return;
            };
            request.options.delay += seq.stagger * seq.next_index as f32;
            seq.next_index += 1;
            let handle = CastHandle::new();
            match self.cast_with_handle(
                registry,
                &request.name,
                request.overrides,
                request.options,
                handle.clone(),
            ) {
                Ok(_) => seq.current = Some(handle),
                Err(e) => {
                    warn!("sequence cast '{}' failed: {}", request.name, e);
                    seq.current = None;
                }
            }
        }
    }

    fn start_next_queued(&mut self, registry: &EffectRegistry) {
        loop {
            let Some(queued) = self.queue.pop_front() else {
                self.processing_queue = false;
                self.current_queued = None;
                return;
            };
            let name = queued.request.name.clone();
            match self.cast_with_handle(
                registry,
                &queued.request.name,
                queued.request.overrides,
                queued.request.options,
                queued.handle.clone(),
            ) {
                Ok(_) => {
                    self.current_queued = Some(queued.handle);
                    return;
                }
                Err(e) => {
                    // Handle already resolved as stopped; move on
                    warn!("queued cast '{}' failed: {}", name, e);
                }
            }
        }
    }
}
