//! # Event Bus Module
//!
//! Publish/subscribe notifications raised by the editing core.
//!
//! ## Overview
//!
//! The scene graph and history engine publish typed events without knowing
//! who listens. Renderer caches rebind on structural changes, selection
//! trackers recompute on bounds changes, and the host shows status messages
//! for rejected edits.
//! - Synchronous handlers run on the publishing (edit) thread
//! - A broadcast receiver serves readers on other threads
//!
//! Each document owns its own bus; there is no global instance.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vectis_core::event_bus::{EditorEvent, EventBus, EventCategory, EventFilter};
//!
//! let bus = EventBus::new();
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Structure]),
//!     |event| tracing::debug!("tree changed: {}", event.description()),
//! );
//!
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
