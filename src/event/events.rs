use crate::element::ItemId;
use crate::scene::Placement;

/// Notifications raised by the editing surface for its host
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    /// The background was placed or re-placed inside the view
    PlacementChanged(Placement),
    /// A selected text item was double tapped and should be edited
    TextEditRequested(ItemId),
    ItemAdded(ItemId),
    ItemDeleted(ItemId),
    SelectionChanged(Option<ItemId>),
}

impl CanvasEvent {
    /// Item the event refers to, if any
    pub fn item(&self) -> Option<ItemId> {
        match self {
            CanvasEvent::PlacementChanged(_) => None,
            CanvasEvent::TextEditRequested(id)
            | CanvasEvent::ItemAdded(id)
            | CanvasEvent::ItemDeleted(id) => Some(*id),
            CanvasEvent::SelectionChanged(id) => *id,
        }
    }
}

/// Discriminant of [`CanvasEvent`], used to subscribe to a subset of events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Placement,
    TextEdit,
    ItemAdded,
    ItemDeleted,
    Selection,
}

impl CanvasEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            CanvasEvent::PlacementChanged(_) => EventKind::Placement,
            CanvasEvent::TextEditRequested(_) => EventKind::TextEdit,
            CanvasEvent::ItemAdded(_) => EventKind::ItemAdded,
            CanvasEvent::ItemDeleted(_) => EventKind::ItemDeleted,
            CanvasEvent::SelectionChanged(_) => EventKind::Selection,
        }
    }
}
