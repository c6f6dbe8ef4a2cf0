//! # Vectis Core
//!
//! Core types and utilities shared by the Vectis editing crates.
//! Provides the error taxonomy, the document event bus, editor
//! configuration and shared-ownership type aliases.

pub mod config;
pub mod error;
pub mod event_bus;
pub mod types;

pub use config::EditorConfig;

pub use error::{CommandError, ConfigError, Error, Result, SceneError, Severity};

pub use event_bus::{
    EditorEvent, EventBus, EventBusConfig, EventBusError, EventCategory, EventFilter,
    HistoryEvent, PropertyKind, StatusEvent, StructureEvent, SubscriptionId,
};

pub use types::{thread_safe, thread_safe_rw, GradientId, LayerId, ThreadSafe, ThreadSafeRw};
