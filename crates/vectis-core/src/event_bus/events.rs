//! Event type definitions for the event bus.
//!
//! Events are cloneable and serializable so they can be logged or forwarded
//! to another thread.

use serde::{Deserialize, Serialize};

use crate::error::Severity;
use crate::types::{GradientId, LayerId};

/// Root event enum for all editor notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditorEvent {
    /// Parent/child structure of the tree changed
    Structure(StructureEvent),
    /// A layer's transform or geometry changed; bounds must be recomputed
    BoundsChanged {
        /// The layer whose bounds are stale.
        layer: LayerId,
    },
    /// A non-geometric layer property changed
    PropertyChanged {
        /// The layer that changed.
        layer: LayerId,
        /// Which property changed.
        property: PropertyKind,
    },
    /// A gradient resource in the swatch list changed
    ResourceChanged {
        /// The gradient that changed.
        gradient: GradientId,
    },
    /// History stack changes
    History(HistoryEvent),
    /// User-visible status messages
    Status(StatusEvent),
}

impl EditorEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            EditorEvent::Structure(_) => EventCategory::Structure,
            EditorEvent::BoundsChanged { .. } => EventCategory::Bounds,
            EditorEvent::PropertyChanged { .. } => EventCategory::Property,
            EditorEvent::ResourceChanged { .. } => EventCategory::Resource,
            EditorEvent::History(_) => EventCategory::History,
            EditorEvent::Status(_) => EventCategory::Status,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            EditorEvent::Structure(e) => e.description(),
            EditorEvent::BoundsChanged { layer } => format!("Bounds changed: {}", layer),
            EditorEvent::PropertyChanged { layer, property } => {
                format!("{} changed on {}", property, layer)
            }
            EditorEvent::ResourceChanged { gradient } => format!("{} changed", gradient),
            EditorEvent::History(e) => e.description(),
            EditorEvent::Status(e) => format!("[{}] {}", e.severity, e.message),
        }
    }

    /// Shorthand for a status event
    pub fn status(message: impl Into<String>, severity: Severity) -> Self {
        EditorEvent::Status(StatusEvent {
            message: message.into(),
            severity,
        })
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Tree structure events.
    Structure,
    /// Bounds invalidation events.
    Bounds,
    /// Layer property events.
    Property,
    /// Swatch resource events.
    Resource,
    /// History stack events.
    History,
    /// Status messages.
    Status,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Structure => write!(f, "Structure"),
            EventCategory::Bounds => write!(f, "Bounds"),
            EventCategory::Property => write!(f, "Property"),
            EventCategory::Resource => write!(f, "Resource"),
            EventCategory::History => write!(f, "History"),
            EventCategory::Status => write!(f, "Status"),
        }
    }
}

/// Structural changes to the layer tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StructureEvent {
    /// A child was inserted into a group.
    ChildAdded {
        /// The group.
        parent: LayerId,
        /// The inserted layer.
        child: LayerId,
        /// Its z-order index.
        index: usize,
    },
    /// A child was removed from a group.
    ChildRemoved {
        /// The group.
        parent: LayerId,
        /// The removed layer.
        child: LayerId,
        /// The index it occupied.
        index: usize,
    },
    /// A child changed z-order within its group.
    ChildMoved {
        /// The group.
        parent: LayerId,
        /// The moved layer.
        child: LayerId,
        /// Previous index.
        from: usize,
        /// New index.
        to: usize,
    },
    /// The node list of a path layer was edited.
    NodesChanged {
        /// The path layer.
        layer: LayerId,
    },
}

impl StructureEvent {
    /// Get a short description for logging
    pub fn description(&self) -> String {
        match self {
            StructureEvent::ChildAdded {
                parent,
                child,
                index,
            } => format!("{} added to {} at {}", child, parent, index),
            StructureEvent::ChildRemoved {
                parent,
                child,
                index,
            } => format!("{} removed from {} at {}", child, parent, index),
            StructureEvent::ChildMoved {
                parent,
                child,
                from,
                to,
            } => format!("{} moved in {} from {} to {}", child, parent, from, to),
            StructureEvent::NodesChanged { layer } => format!("Nodes changed on {}", layer),
        }
    }
}

/// Layer properties that raise change notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyKind {
    /// Display name.
    Name,
    /// Opacity.
    Opacity,
    /// Visibility flag.
    Visibility,
    /// Selection flag.
    Selection,
    /// Fill brush.
    Fill,
    /// Stroke pen.
    Stroke,
}

impl std::fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyKind::Name => write!(f, "Name"),
            PropertyKind::Opacity => write!(f, "Opacity"),
            PropertyKind::Visibility => write!(f, "Visibility"),
            PropertyKind::Selection => write!(f, "Selection"),
            PropertyKind::Fill => write!(f, "Fill"),
            PropertyKind::Stroke => write!(f, "Stroke"),
        }
    }
}

/// History engine events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HistoryEvent {
    /// A command was applied and recorded.
    Executed {
        /// Command id.
        id: u64,
        /// Command description.
        description: String,
    },
    /// A command was coalesced into the top entry.
    Merged {
        /// Id of the replacement entry.
        id: u64,
    },
    /// The log position moved.
    PositionChanged {
        /// The new position.
        position: u64,
    },
    /// All entries were dropped.
    Cleared,
}

impl HistoryEvent {
    /// Get a short description for logging
    pub fn description(&self) -> String {
        match self {
            HistoryEvent::Executed { id, description } => {
                format!("Executed #{}: {}", id, description)
            }
            HistoryEvent::Merged { id } => format!("Merged into #{}", id),
            HistoryEvent::PositionChanged { position } => format!("Position {}", position),
            HistoryEvent::Cleared => "History cleared".to_string(),
        }
    }
}

/// A non-fatal, user-visible status message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    /// Message text.
    pub message: String,
    /// How serious it is.
    pub severity: Severity,
}
