//! # Event Bus Module
//!
//! Publish/subscribe notifications for planner state changes.
//!
//! ## Overview
//!
//! - The planner publishes typed events without knowing who listens
//! - Subscribers filter by category and receive events of interest
//! - Synchronous handlers run on the publishing thread; async consumers
//!   poll a broadcast receiver
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mowplan_core::event_bus::{EventBus, EventCategory, EventFilter, PlannerEvent};
//!
//! let bus = EventBus::new();
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Progress]),
//!     |event| {
//!         if let PlannerEvent::ZoneCompleted { zone_id } = event {
//!             println!("zone {} done", zone_id);
//!         }
//!     },
//! );
//!
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
