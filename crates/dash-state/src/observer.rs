//! Explicit publish/subscribe for dashboard mutations

use dash_core::{ChartId, SeriesKey};

/// State slice a change belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slice {
    Charts,
    Series,
    Layouts,
    Selection,
}

impl Slice {
    pub fn all() -> &'static [Self] {
        &[Self::Charts, Self::Series, Self::Layouts, Self::Selection]
    }
}

/// Emitted after a mutation completes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardEvent {
    /// A chart was created, edited or removed
    ChartsChanged { chart_id: ChartId },
    /// A cache entry was regenerated
    SeriesChanged { key: SeriesKey },
    /// Cache entries were evicted or pruned
    SeriesEvicted { keys: Vec<SeriesKey> },
    LayoutsChanged,
    SelectionChanged,
}

impl DashboardEvent {
    pub fn slice(&self) -> Slice {
        match self {
            Self::ChartsChanged { .. } => Slice::Charts,
            Self::SeriesChanged { .. } | Self::SeriesEvicted { .. } => Slice::Series,
            Self::LayoutsChanged => Slice::Layouts,
            Self::SelectionChanged => Slice::Selection,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type Listener = Box<dyn FnMut(&DashboardEvent)>;

/// Registered listeners, notified in registration order
#[derive(Default)]
pub struct Observers {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Option<Slice>, Listener)>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen to every event
    pub fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        self.register(None, listener)
    }

    /// Listen to a single slice
    pub fn subscribe_slice(&mut self, slice: Slice, listener: Listener) -> SubscriptionId {
        self.register(Some(slice), listener)
    }

    fn register(&mut self, filter: Option<Slice>, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, filter, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _, _)| *sid != id);
        self.listeners.len() != before
    }

    pub fn notify(&mut self, event: &DashboardEvent) {
        let slice = event.slice();
        for (_, filter, listener) in self.listeners.iter_mut() {
            if filter.is_none_or(|f| f == slice) {
                listener(event);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
