use std::fmt;

use serde::Serialize;

use crate::app::{EntityHandle, Vec2, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DragEvent {
    Started {
        draggable: EntityHandle,
        start_position: Vec3,
        start_input: Vec2,
    },
    Updated {
        draggable: EntityHandle,
        current_position: Vec3,
        current_input: Vec2,
        offset: Vec3,
    },
    Ended {
        draggable: EntityHandle,
        start_position: Vec3,
        end_position: Vec3,
        end_input: Vec2,
        distance: f32,
        succeeded: bool,
    },
    EnteredTarget {
        draggable: EntityHandle,
        target: EntityHandle,
    },
    ExitedTarget {
        draggable: EntityHandle,
        target: EntityHandle,
    },
    Dropped {
        draggable: EntityHandle,
        target: EntityHandle,
        drop_position: Vec3,
        succeeded: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEventKind {
    Started,
    Updated,
    Ended,
    EnteredTarget,
    ExitedTarget,
    Dropped,
}

impl DragEvent {
    pub fn kind(&self) -> DragEventKind {
        match self {
            Self::Started { .. } => DragEventKind::Started,
            Self::Updated { .. } => DragEventKind::Updated,
            Self::Ended { .. } => DragEventKind::Ended,
            Self::EnteredTarget { .. } => DragEventKind::EnteredTarget,
            Self::ExitedTarget { .. } => DragEventKind::ExitedTarget,
            Self::Dropped { .. } => DragEventKind::Dropped,
        }
    }

    pub fn draggable(&self) -> EntityHandle {
        match *self {
            Self::Started { draggable, .. }
            | Self::Updated { draggable, .. }
            | Self::Ended { draggable, .. }
            | Self::EnteredTarget { draggable, .. }
            | Self::ExitedTarget { draggable, .. }
            | Self::Dropped { draggable, .. } => draggable,
        }
    }
}

/// Fire-and-forget sink for drag notifications.
pub trait EventChannel {
    fn post(&mut self, event: DragEvent);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragEventCounts {
    pub total: u32,
    pub started: u32,
    pub updated: u32,
    pub ended: u32,
    pub entered_target: u32,
    pub exited_target: u32,
    pub dropped: u32,
}

impl DragEventCounts {
    fn record(&mut self, kind: DragEventKind) {
        self.total = self.total.saturating_add(1);
        let counter = match kind {
            DragEventKind::Started => &mut self.started,
            DragEventKind::Updated => &mut self.updated,
            DragEventKind::Ended => &mut self.ended,
            DragEventKind::EnteredTarget => &mut self.entered_target,
            DragEventKind::ExitedTarget => &mut self.exited_target,
            DragEventKind::Dropped => &mut self.dropped,
        };
        *counter = counter.saturating_add(1);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&DragEvent)>;

/// In-process bus. Subscribers run synchronously inside `post` and must stay cheap.
/// Posted events are also buffered for the current tick so the scene can read them.
#[derive(Default)]
pub struct DragEventBus {
    next_subscription_id: u64,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    current_tick_events: Vec<DragEvent>,
    last_tick_events: Vec<DragEvent>,
    last_tick_counts: DragEventCounts,
}

impl fmt::Debug for DragEventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragEventBus")
            .field("subscribers", &self.subscribers.len())
            .field("current_tick_events", &self.current_tick_events)
            .field("last_tick_counts", &self.last_tick_counts)
            .finish()
    }
}

impl DragEventBus {
    pub fn subscribe(&mut self, subscriber: impl FnMut(&DragEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription_id);
        self.next_subscription_id = self.next_subscription_id.saturating_add(1);
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        self.subscribers.len() != before
    }

    pub fn current_tick_events(&self) -> &[DragEvent] {
        &self.current_tick_events
    }

    pub fn last_tick_events(&self) -> &[DragEvent] {
        &self.last_tick_events
    }

    pub fn last_tick_counts(&self) -> DragEventCounts {
        self.last_tick_counts
    }

    pub fn finish_tick_rollover(&mut self) {
        let mut counts = DragEventCounts::default();
        for event in &self.current_tick_events {
            counts.record(event.kind());
        }
        self.last_tick_counts = counts;
        self.last_tick_events.clear();
        self.last_tick_events.append(&mut self.current_tick_events);
    }
}

impl EventChannel for DragEventBus {
    fn post(&mut self, event: DragEvent) {
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&event);
        }
        self.current_tick_events.push(event);
    }
}

/// Plain recorder, handy for hosts that only want the event list.
impl EventChannel for Vec<DragEvent> {
    fn post(&mut self, event: DragEvent) {
        self.push(event);
    }
}
