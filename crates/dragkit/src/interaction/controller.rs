use std::fmt;

use thiserror::Error;
use tracing::{debug, error, warn};

use crate::app::{EntityHandle, EntityRegistry, PointerDevice, PointerPhase, PointerSample, Vec2};

use super::{
    CallbackFault, CallbackResult, DragConfig, DragEvent, DragPhase, DragSession, DragSubject,
    DropTarget, EventChannel, HitFilter, HitTester, ScreenProjection,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collaborator {
    HitTester,
    Projection,
    EventChannel,
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::HitTester => "hit tester",
            Self::Projection => "screen projection",
            Self::EventChannel => "event channel",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DragError {
    #[error("{0} is unavailable")]
    MissingCollaborator(Collaborator),
    #[error("{phase} callback failed on {entity_name} ({entity}): {source}")]
    CallbackFault {
        phase: DragPhase,
        entity: EntityHandle,
        entity_name: String,
        #[source]
        source: CallbackFault,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionMiss {
    NothingHit,
    NotDraggable,
    DragDisabled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeginOutcome {
    Started(EntityHandle),
    AlreadyDragging,
    Missed(ResolutionMiss),
    /// `on_begin_drag` failed; the session was discarded.
    Aborted(DragError),
    /// A collaborator was missing; nothing was attempted.
    Abandoned(DragError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Applied,
    NotDragging,
    /// `on_drag` failed; hover resolution and the update event were skipped.
    DragCallbackFailed,
    Abandoned(DragError),
    /// The dragged entity vanished; the drag was torn down.
    DraggableLost(EndReport),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    NoTarget,
    Rejected,
    Accepted,
    AcceptFailed,
    /// Forced end: drop resolution never ran.
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndReport {
    pub draggable: EntityHandle,
    pub succeeded: bool,
    pub distance_px: f32,
    pub drop: DropOutcome,
    pub forced: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SampleOutcome {
    Begin(BeginOutcome),
    Update(UpdateOutcome),
    End(Option<EndReport>),
    IgnoredIdle,
    IgnoredForeignDevice,
}

/// Collaborators for one controller call. `None` models a collaborator that is not
/// available yet.
pub struct DragServices<'a> {
    pub entities: &'a mut EntityRegistry,
    pub hit_tester: Option<&'a dyn HitTester>,
    pub projection: Option<&'a dyn ScreenProjection>,
    pub events: Option<&'a mut dyn EventChannel>,
}

impl<'a> DragServices<'a> {
    pub fn new(
        entities: &'a mut EntityRegistry,
        hit_tester: &'a dyn HitTester,
        projection: &'a dyn ScreenProjection,
        events: &'a mut dyn EventChannel,
    ) -> Self {
        Self {
            entities,
            hit_tester: Some(hit_tester),
            projection: Some(projection),
            events: Some(events),
        }
    }

    fn post(&mut self, operation: &'static str, event: DragEvent) {
        match self.events.as_deref_mut() {
            Some(events) => events.post(event),
            None => {
                let error = DragError::MissingCollaborator(Collaborator::EventChannel);
                error!(operation, error = %error, event = ?event.kind(), "drag_event_dropped");
            }
        }
    }
}

/// Owns the single drag session. Never returns an error to the host: every fault is
/// logged here and folded into the returned outcome.
#[derive(Debug, Default)]
pub struct DragController {
    config: DragConfig,
    session: Option<DragSession>,
}

impl DragController {
    pub fn new(config: DragConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    pub fn config(&self) -> &DragConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: DragConfig) {
        self.config = config;
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn active_draggable(&self) -> Option<EntityHandle> {
        self.session.map(|session| session.draggable)
    }

    pub fn active_target(&self) -> Option<EntityHandle> {
        self.session.and_then(|session| session.target)
    }

    pub fn handle_sample(
        &mut self,
        services: &mut DragServices<'_>,
        sample: PointerSample,
    ) -> SampleOutcome {
        if sample.phase == PointerPhase::Down {
            return SampleOutcome::Begin(self.begin_drag_with_device(
                services,
                sample.device,
                sample.position,
            ));
        }

        let Some(session) = self.session else {
            return SampleOutcome::IgnoredIdle;
        };
        if session.device != sample.device {
            if self.config.detailed_logging {
                debug!(
                    active_device = ?session.device,
                    sample_device = ?sample.device,
                    "pointer_sample_ignored_foreign_device"
                );
            }
            return SampleOutcome::IgnoredForeignDevice;
        }

        match sample.phase {
            PointerPhase::Move => SampleOutcome::Update(self.update_drag(services, sample.position)),
            PointerPhase::Up => SampleOutcome::End(self.end_drag(services, sample.position)),
            PointerPhase::Cancel => SampleOutcome::End(self.cancel_drag(services)),
            PointerPhase::Down => SampleOutcome::IgnoredIdle,
        }
    }

    pub fn begin_drag(&mut self, services: &mut DragServices<'_>, screen: Vec2) -> BeginOutcome {
        self.begin_drag_with_device(services, PointerDevice::Mouse, screen)
    }

    pub fn begin_drag_with_device(
        &mut self,
        services: &mut DragServices<'_>,
        device: PointerDevice,
        screen: Vec2,
    ) -> BeginOutcome {
        if let Some(session) = &self.session {
            debug!(active = %session.draggable, "begin_drag_ignored_already_dragging");
            return BeginOutcome::AlreadyDragging;
        }
        let Some(hit_tester) = services.hit_tester else {
            return BeginOutcome::Abandoned(missing("begin_drag", Collaborator::HitTester));
        };
        if services.events.is_none() {
            return BeginOutcome::Abandoned(missing("begin_drag", Collaborator::EventChannel));
        }

        let Some(handle) = hit_tester.hit_test(services.entities, screen, HitFilter::Any, None)
        else {
            return miss(ResolutionMiss::NothingHit, screen);
        };
        let Some(entity) = services.entities.get_mut(handle) else {
            return miss(ResolutionMiss::NothingHit, screen);
        };
        let start_position = entity.position();
        let Some(draggable) = entity.as_draggable_mut() else {
            return miss(ResolutionMiss::NotDraggable, screen);
        };
        if !draggable.can_drag() {
            return miss(ResolutionMiss::DragDisabled, screen);
        }

        let session = DragSession::new(handle, device, screen, start_position);
        if let Err(fault) = draggable.on_begin_drag(screen) {
            let error = callback_fault(services.entities, DragPhase::BeginDrag, handle, fault);
            return BeginOutcome::Aborted(error);
        }

        self.session = Some(session);
        debug!(
            draggable = %handle,
            device = ?device,
            x = screen.x,
            y = screen.y,
            "drag_started"
        );
        services.post(
            "begin_drag",
            DragEvent::Started {
                draggable: handle,
                start_position,
                start_input: screen,
            },
        );
        BeginOutcome::Started(handle)
    }

    pub fn update_drag(&mut self, services: &mut DragServices<'_>, screen: Vec2) -> UpdateOutcome {
        let Some(mut session) = self.session else {
            return UpdateOutcome::NotDragging;
        };
        let Some(hit_tester) = services.hit_tester else {
            return UpdateOutcome::Abandoned(missing("update_drag", Collaborator::HitTester));
        };
        let Some(projection) = services.projection else {
            return UpdateOutcome::Abandoned(missing("update_drag", Collaborator::Projection));
        };
        if services.events.is_none() {
            return UpdateOutcome::Abandoned(missing("update_drag", Collaborator::EventChannel));
        }

        let depth = session.start_entity_position.z;
        let world_start = projection.screen_to_world(session.start_input_position, depth);
        let world_current = projection.screen_to_world(screen, depth);
        let offset = world_current - world_start;
        let new_position = session.start_entity_position + offset;

        let drag_result = match services
            .entities
            .get_mut(session.draggable)
            .and_then(|entity| entity.as_draggable_mut())
        {
            Some(draggable) => draggable.on_drag(screen, new_position, offset),
            None => {
                self.session = None;
                let report = self.finish_lost_draggable(services, session, screen);
                return UpdateOutcome::DraggableLost(report);
            }
        };
        if let Err(fault) = drag_result {
            callback_fault(services.entities, DragPhase::Drag, session.draggable, fault);
            return UpdateOutcome::DragCallbackFailed;
        }

        let hovered = hit_tester.hit_test(
            services.entities,
            screen,
            HitFilter::DropTargets,
            Some(session.draggable),
        );
        if hovered != session.target {
            self.retarget(services, &mut session, hovered);
        }

        let current_position = services
            .entities
            .get(session.draggable)
            .map(|entity| entity.position())
            .unwrap_or(new_position);
        session.last_input_position = screen;
        session.last_entity_position = current_position;
        self.session = Some(session);

        if self.config.detailed_logging {
            debug!(
                draggable = %session.draggable,
                x = screen.x,
                y = screen.y,
                offset_x = offset.x,
                offset_y = offset.y,
                target = ?session.target,
                "drag_updated"
            );
        }
        services.post(
            "update_drag",
            DragEvent::Updated {
                draggable: session.draggable,
                current_position,
                current_input: screen,
                offset,
            },
        );
        UpdateOutcome::Applied
    }

    pub fn end_drag(&mut self, services: &mut DragServices<'_>, screen: Vec2) -> Option<EndReport> {
        // Taken up front: whatever the callbacks below do, the controller ends Idle.
        let session = self.session.take()?;
        if services.events.is_none() {
            missing("end_drag", Collaborator::EventChannel);
        }

        let distance = session.input_distance(screen);
        let succeeded = distance >= self.config.effective_threshold_px();

        let end_result = match services
            .entities
            .get_mut(session.draggable)
            .filter(|entity| entity.as_draggable().is_some())
        {
            Some(entity) => {
                let position = entity.position();
                let result = entity
                    .as_draggable_mut()
                    .map(|draggable| draggable.on_end_drag(screen, position, succeeded));
                (position, result)
            }
            None => return Some(self.finish_lost_draggable(services, session, screen)),
        };
        let (end_position, callback) = end_result;
        if let Some(Err(fault)) = callback {
            callback_fault(services.entities, DragPhase::EndDrag, session.draggable, fault);
        }

        let drop = resolve_drop(services, &session);
        if let Some(target) = session.target {
            if let Some(subject) = capture_subject(services.entities, session.draggable) {
                call_target(services.entities, target, DragPhase::DragExit, (), |target| {
                    target.on_drag_exit(&subject)
                });
            }
        }

        debug!(
            draggable = %session.draggable,
            distance,
            succeeded,
            drop = ?drop,
            "drag_ended"
        );
        services.post(
            "end_drag",
            DragEvent::Ended {
                draggable: session.draggable,
                start_position: session.start_entity_position,
                end_position,
                end_input: screen,
                distance,
                succeeded,
            },
        );
        Some(EndReport {
            draggable: session.draggable,
            succeeded,
            distance_px: distance,
            drop,
            forced: false,
        })
    }

    /// Forced end for teardown, focus loss and pointer cancel. Never succeeds and never
    /// resolves a drop.
    pub fn cancel_drag(&mut self, services: &mut DragServices<'_>) -> Option<EndReport> {
        let session = self.session.take()?;
        let screen = session.last_input_position;

        let end_position = match services
            .entities
            .get_mut(session.draggable)
            .filter(|entity| entity.as_draggable().is_some())
        {
            Some(entity) => {
                let position = entity.position();
                let result = entity
                    .as_draggable_mut()
                    .map(|draggable| draggable.on_end_drag(screen, position, false));
                if let Some(Err(fault)) = result {
                    callback_fault(services.entities, DragPhase::EndDrag, session.draggable, fault);
                }
                position
            }
            None => return Some(self.finish_lost_draggable(services, session, screen)),
        };

        let subject = capture_subject(services.entities, session.draggable)
            .unwrap_or_else(|| DragSubject::detached(session.draggable, end_position));
        release_hover(services, &session, &subject, "cancel_drag");

        let distance = session.input_distance(screen);
        debug!(draggable = %session.draggable, distance, "drag_cancelled");
        services.post(
            "cancel_drag",
            DragEvent::Ended {
                draggable: session.draggable,
                start_position: session.start_entity_position,
                end_position,
                end_input: screen,
                distance,
                succeeded: false,
            },
        );
        Some(EndReport {
            draggable: session.draggable,
            succeeded: false,
            distance_px: distance,
            drop: DropOutcome::Skipped,
            forced: true,
        })
    }

    fn retarget(
        &self,
        services: &mut DragServices<'_>,
        session: &mut DragSession,
        next: Option<EntityHandle>,
    ) {
        if self.config.detailed_logging {
            debug!(
                draggable = %session.draggable,
                previous = ?session.target,
                next = ?next,
                "drag_target_changed"
            );
        }
        let Some(subject) = capture_subject(services.entities, session.draggable) else {
            return;
        };

        release_hover(services, session, &subject, "update_drag");
        session.target = None;

        if let Some(next) = next {
            call_target(services.entities, next, DragPhase::DragEnter, (), |target| {
                target.on_drag_enter(&subject)
            });
            services.post(
                "update_drag",
                DragEvent::EnteredTarget {
                    draggable: session.draggable,
                    target: next,
                },
            );
            session.target = Some(next);
        }
    }

    fn finish_lost_draggable(
        &self,
        services: &mut DragServices<'_>,
        session: DragSession,
        end_input: Vec2,
    ) -> EndReport {
        warn!(
            draggable = %session.draggable,
            target = ?session.target,
            "drag_entity_lost"
        );
        let subject = DragSubject::detached(session.draggable, session.last_entity_position);
        release_hover(services, &session, &subject, "drag_entity_lost");

        let distance = session.input_distance(end_input);
        services.post(
            "drag_entity_lost",
            DragEvent::Ended {
                draggable: session.draggable,
                start_position: session.start_entity_position,
                end_position: session.last_entity_position,
                end_input,
                distance,
                succeeded: false,
            },
        );
        EndReport {
            draggable: session.draggable,
            succeeded: false,
            distance_px: distance,
            drop: DropOutcome::Skipped,
            forced: true,
        }
    }
}

/// Exits the hovered target, if any, and reports it on the channel.
fn release_hover(
    services: &mut DragServices<'_>,
    session: &DragSession,
    subject: &DragSubject,
    operation: &'static str,
) {
    let Some(previous) = session.target else {
        return;
    };
    call_target(services.entities, previous, DragPhase::DragExit, (), |target| {
        target.on_drag_exit(subject)
    });
    services.post(
        operation,
        DragEvent::ExitedTarget {
            draggable: session.draggable,
            target: previous,
        },
    );
}

fn resolve_drop(services: &mut DragServices<'_>, session: &DragSession) -> DropOutcome {
    let Some(target) = session.target else {
        return DropOutcome::NoTarget;
    };
    let target_alive = services
        .entities
        .get(target)
        .is_some_and(|entity| entity.as_drop_target().is_some());
    if !target_alive {
        debug!(target = %target, "drop_target_lost");
        return DropOutcome::NoTarget;
    }
    let Some(subject) = capture_subject(services.entities, session.draggable) else {
        return DropOutcome::Skipped;
    };

    let can_accept = call_target(services.entities, target, DragPhase::CanAccept, false, |t| {
        t.can_accept(&subject)
    });
    let accepted = can_accept
        && call_target(services.entities, target, DragPhase::Accept, false, |t| {
            t.accept(&subject)
        });

    services.post(
        "end_drag",
        DragEvent::Dropped {
            draggable: session.draggable,
            target,
            drop_position: subject.position,
            succeeded: accepted,
        },
    );
    match (can_accept, accepted) {
        (false, _) => DropOutcome::Rejected,
        (true, true) => DropOutcome::Accepted,
        (true, false) => DropOutcome::AcceptFailed,
    }
}

fn capture_subject(entities: &EntityRegistry, handle: EntityHandle) -> Option<DragSubject> {
    entities
        .get(handle)
        .and_then(|entity| DragSubject::capture(handle, entity))
}

/// Runs one drop-target callback, substituting `neutral` when the target is gone or the
/// callback faults.
fn call_target<T>(
    entities: &mut EntityRegistry,
    handle: EntityHandle,
    phase: DragPhase,
    neutral: T,
    call: impl FnOnce(&mut dyn DropTarget) -> CallbackResult<T>,
) -> T {
    let Some(target) = entities
        .get_mut(handle)
        .and_then(|entity| entity.as_drop_target_mut())
    else {
        debug!(target = %handle, phase = phase.as_str(), "drop_target_missing");
        return neutral;
    };
    match call(target) {
        Ok(value) => value,
        Err(fault) => {
            callback_fault(entities, phase, handle, fault);
            neutral
        }
    }
}

fn callback_fault(
    entities: &EntityRegistry,
    phase: DragPhase,
    entity: EntityHandle,
    fault: CallbackFault,
) -> DragError {
    let entity_name = entities
        .get(entity)
        .map(|entity| entity.debug_name().to_string())
        .unwrap_or_else(|| "<despawned>".to_string());
    let error = DragError::CallbackFault {
        phase,
        entity,
        entity_name,
        source: fault,
    };
    warn!(phase = phase.as_str(), entity = %entity, error = %error, "drag_callback_failed");
    error
}

fn missing(operation: &'static str, collaborator: Collaborator) -> DragError {
    let error = DragError::MissingCollaborator(collaborator);
    error!(operation, error = %error, "drag_collaborator_missing");
    error
}

fn miss(reason: ResolutionMiss, screen: Vec2) -> BeginOutcome {
    debug!(reason = ?reason, x = screen.x, y = screen.y, "begin_drag_missed");
    BeginOutcome::Missed(reason)
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
